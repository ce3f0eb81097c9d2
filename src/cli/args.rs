//! Command line argument parsing for the Quiver CLI using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// Quiver - score and explain search candidates
#[derive(Parser, Debug, Clone)]
#[command(name = "quiver")]
#[command(about = "Score and explain term and vector search candidates")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct QuiverArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl QuiverArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Score nearest-neighbor candidates
    Knn(KnnArgs),

    /// Score term postings
    Term(TermArgs),
}

/// Options shared by both scoring commands
#[derive(Args, Debug, Clone)]
pub struct ScoringArgs {
    /// JSON file holding an array of candidates
    #[arg(value_name = "CANDIDATES_FILE")]
    pub candidates: PathBuf,

    /// Field the clause targets
    #[arg(long)]
    pub field: String,

    /// Clause boost
    #[arg(long, default_value = "1.0")]
    pub boost: f64,

    /// Query norm to fix before scoring (defaults to 1.0)
    #[arg(long)]
    pub query_norm: Option<f64>,

    /// Attach explanation trees to the results
    #[arg(long)]
    pub explain: bool,

    /// Score mode ("include" or "none")
    #[arg(long, default_value = "include")]
    pub score_mode: String,
}

/// Arguments for scoring vector candidates
#[derive(Parser, Debug, Clone)]
pub struct KnnArgs {
    #[command(flatten)]
    pub scoring: ScoringArgs,

    /// Query vector, comma separated
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub vector: Vec<f32>,

    /// Similarity metric reported by the index (l2_norm, cosine, dot_product)
    #[arg(long, default_value = "cosine")]
    pub metric: String,
}

/// Arguments for scoring term postings
#[derive(Parser, Debug, Clone)]
pub struct TermArgs {
    #[command(flatten)]
    pub scoring: ScoringArgs,

    /// The query term
    #[arg(long)]
    pub term: String,

    /// Number of documents in the index
    #[arg(long)]
    pub doc_total: u64,

    /// Number of documents containing the term
    #[arg(long)]
    pub doc_term: u64,
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}
