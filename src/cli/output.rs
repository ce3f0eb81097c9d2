//! Output formatting for CLI commands.

use serde::{Deserialize, Serialize};

use crate::cli::args::{OutputFormat, QuiverArgs};
use crate::error::Result;
use crate::search::explanation::{Explanation, float_repr};

/// One scored candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredHit {
    pub id: String,
    #[serde(with = "float_repr")]
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<Explanation>,
}

/// Result structure for scoring commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringResults {
    pub scorer: String,
    #[serde(with = "float_repr")]
    pub query_norm: f64,
    #[serde(with = "float_repr")]
    pub derived_weight: f64,
    pub hits: Vec<ScoredHit>,
}

/// Output results in the requested format.
pub fn output_result(results: &ScoringResults, args: &QuiverArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            print!("{}", render_human(results, args.verbosity()));
            Ok(())
        }
        OutputFormat::Json => output_json(results, args),
    }
}

/// Render results as plain text, one hit per line followed by its explanation.
pub fn render_human(results: &ScoringResults, verbosity: u8) -> String {
    let mut out = String::new();
    if verbosity > 0 {
        out.push_str(&format!(
            "{} scorer: {} hits (query norm {}, weight {})\n\n",
            results.scorer,
            results.hits.len(),
            results.query_norm,
            results.derived_weight
        ));
    }

    for hit in &results.hits {
        out.push_str(&format!("{}\t{}\n", hit.id, hit.score));
        if let Some(explanation) = &hit.explanation {
            for line in explanation.to_string().lines() {
                out.push_str("    ");
                out.push_str(line);
                out.push('\n');
            }
        }
    }
    out
}

/// Output in JSON format.
fn output_json(results: &ScoringResults, args: &QuiverArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(results)?
    } else {
        serde_json::to_string(results)?
    };
    println!("{json}");
    Ok(())
}
