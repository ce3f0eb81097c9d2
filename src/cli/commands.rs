//! Command implementations for the Quiver CLI.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::info;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::cli::args::*;
use crate::cli::output::*;
use crate::error::Result;
use crate::search::candidate::{TermMatch, VectorCandidate};
use crate::search::context::{ScoreMode, ScoringContext, SearcherOptions};
use crate::search::scorer::knn::KnnQueryScorer;
use crate::search::scorer::term::TermQueryScorer;
use crate::search::scorer::{ClauseWeight, QueryScorer};
use crate::search::similarity::SimilarityMetric;

/// A vector candidate as stored in a candidates file.
///
/// Other fields, such as the indexed vector, are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct VectorCandidateRecord {
    pub id: String,
    pub score: f64,
}

impl From<VectorCandidateRecord> for VectorCandidate {
    fn from(record: VectorCandidateRecord) -> Self {
        VectorCandidate {
            id: record.id.into_bytes(),
            score: record.score,
        }
    }
}

/// A term posting as stored in a candidates file.
#[derive(Debug, Clone, Deserialize)]
pub struct TermMatchRecord {
    pub id: String,
    pub freq: u64,
    #[serde(default = "default_norm")]
    pub norm: f64,
}

fn default_norm() -> f64 {
    1.0
}

impl From<TermMatchRecord> for TermMatch {
    fn from(record: TermMatchRecord) -> Self {
        TermMatch::new(record.id, record.freq, record.norm)
    }
}

/// Execute a CLI command.
pub fn execute_command(args: QuiverArgs) -> Result<()> {
    let results = match &args.command {
        Command::Knn(knn_args) => score_vectors(knn_args)?,
        Command::Term(term_args) => score_terms(term_args)?,
    };
    output_result(&results, &args)
}

/// Read a JSON array of records from a file.
pub fn load_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let reader = BufReader::new(File::open(path)?);
    let records: Vec<T> = serde_json::from_reader(reader)?;
    info!("loaded {} candidates from {}", records.len(), path.display());
    Ok(records)
}

/// Build the searcher options described by the shared arguments.
fn searcher_options(args: &ScoringArgs) -> Result<SearcherOptions> {
    let score_mode: ScoreMode = args.score_mode.parse()?;
    Ok(SearcherOptions::new()
        .with_score_mode(score_mode)
        .with_explain(args.explain))
}

/// Score vector candidates from a file.
pub fn score_vectors(args: &KnnArgs) -> Result<ScoringResults> {
    let options = searcher_options(&args.scoring)?;
    let metric: SimilarityMetric = args.metric.parse()?;
    let mut scorer = KnnQueryScorer::new(
        args.vector.clone(),
        args.scoring.field.clone(),
        args.scoring.boost,
        options,
        metric,
    )?;
    if let Some(query_norm) = args.scoring.query_norm {
        scorer.set_query_norm(query_norm)?;
    }

    let candidates: Vec<VectorCandidate> =
        load_records::<VectorCandidateRecord>(&args.scoring.candidates)?
            .into_iter()
            .map(VectorCandidate::from)
            .collect();

    run_scorer(&scorer, options, &candidates)
}

/// Score term postings from a file.
pub fn score_terms(args: &TermArgs) -> Result<ScoringResults> {
    let options = searcher_options(&args.scoring)?;
    let mut scorer = TermQueryScorer::new(
        args.term.clone(),
        args.scoring.field.clone(),
        args.scoring.boost,
        args.doc_total,
        args.doc_term,
        options,
    )?;
    if let Some(query_norm) = args.scoring.query_norm {
        scorer.set_query_norm(query_norm)?;
    }

    let candidates: Vec<TermMatch> = load_records::<TermMatchRecord>(&args.scoring.candidates)?
        .into_iter()
        .map(TermMatch::from)
        .collect();

    run_scorer(&scorer, options, &candidates)
}

/// Score every candidate, copying each match out before returning it to the pool.
pub fn run_scorer<S: QueryScorer>(
    scorer: &S,
    options: SearcherOptions,
    candidates: &[S::Candidate],
) -> Result<ScoringResults> {
    let mut ctx = ScoringContext::new(options, candidates.len().min(64));
    let mut hits = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        let mut document_match = scorer.score(&mut ctx, candidate)?;
        hits.push(ScoredHit {
            id: document_match.id_str().into_owned(),
            score: document_match.score,
            explanation: document_match.explanation.take(),
        });
        ctx.release_match(document_match);
    }

    Ok(ScoringResults {
        scorer: scorer.name().to_string(),
        query_norm: scorer.query_norm(),
        derived_weight: scorer.derived_weight(),
        hits,
    })
}
