//! Per-query scoring options and context.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{QuiverError, Result};
use crate::search::document_match::{DocumentMatch, DocumentMatchPool};

/// Whether scorers compute a score at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreMode {
    /// Skip score computation; matches carry a zero score.
    None,
    /// Compute and record the score.
    #[default]
    Include,
}

impl ScoreMode {
    /// Get the tag of this mode.
    pub fn name(&self) -> &'static str {
        match self {
            ScoreMode::None => "none",
            ScoreMode::Include => "include",
        }
    }
}

impl fmt::Display for ScoreMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScoreMode {
    type Err = QuiverError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "none" => Ok(ScoreMode::None),
            "" | "include" => Ok(ScoreMode::Include),
            _ => Err(QuiverError::invalid_config(format!("Unknown score mode: {s}"))),
        }
    }
}

/// Options shared by every scorer of one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearcherOptions {
    /// Whether to compute scores.
    #[serde(default)]
    pub score: ScoreMode,

    /// Whether to build explanation trees.
    #[serde(default)]
    pub explain: bool,
}

impl SearcherOptions {
    /// Create options with the default score mode and explain disabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the score mode.
    pub fn with_score_mode(mut self, score: ScoreMode) -> Self {
        self.score = score;
        self
    }

    /// Enable or disable explanations.
    pub fn with_explain(mut self, explain: bool) -> Self {
        self.explain = explain;
        self
    }

    /// Whether scores are recorded on matches.
    pub fn includes_score(&self) -> bool {
        self.score == ScoreMode::Include
    }
}

/// State shared by all scoring calls of one query execution.
///
/// A context is owned by a single query and must not be shared between
/// concurrently executing queries; each query builds its own.
#[derive(Debug, Default)]
pub struct ScoringContext {
    options: SearcherOptions,
    pool: DocumentMatchPool,
}

impl ScoringContext {
    /// Create a context whose pool starts with `pool_size` records.
    pub fn new(options: SearcherOptions, pool_size: usize) -> Self {
        ScoringContext {
            options,
            pool: DocumentMatchPool::new(pool_size),
        }
    }

    /// Get the options of this query.
    ///
    /// Scorers refuse to score in a context whose options differ from their own.
    pub fn options(&self) -> &SearcherOptions {
        &self.options
    }

    /// Take a zeroed match from the pool.
    pub fn acquire_match(&mut self) -> DocumentMatch {
        self.pool.get()
    }

    /// Give a match back to the pool.
    pub fn release_match(&mut self, document_match: DocumentMatch) {
        self.pool.put(document_match);
    }

    /// Get the match pool.
    pub fn pool(&self) -> &DocumentMatchPool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_mode_parse() {
        assert_eq!("none".parse::<ScoreMode>().unwrap(), ScoreMode::None);
        assert_eq!("include".parse::<ScoreMode>().unwrap(), ScoreMode::Include);
        assert_eq!("".parse::<ScoreMode>().unwrap(), ScoreMode::Include);
        assert!(matches!(
            "sometimes".parse::<ScoreMode>(),
            Err(QuiverError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_options_default_and_builders() {
        let options = SearcherOptions::default();
        assert!(options.includes_score());
        assert!(!options.explain);

        let options = SearcherOptions::new()
            .with_score_mode(ScoreMode::None)
            .with_explain(true);
        assert!(!options.includes_score());
        assert!(options.explain);
    }

    #[test]
    fn test_options_deserialize() {
        let options: SearcherOptions =
            serde_json::from_str(r#"{"score":"none","explain":true}"#).unwrap();
        assert_eq!(options.score, ScoreMode::None);
        assert!(options.explain);

        let options: SearcherOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, SearcherOptions::default());
    }

    #[test]
    fn test_context_acquire_release() {
        let mut ctx = ScoringContext::new(SearcherOptions::default(), 1);
        let mut document_match = ctx.acquire_match();
        document_match.id.extend_from_slice(b"one");
        document_match.score = 1.0;

        ctx.release_match(document_match);
        assert_eq!(ctx.pool().available(), 1);

        let recycled = ctx.acquire_match();
        assert!(recycled.id.is_empty());
        assert_eq!(ctx.pool().allocated(), 1);
    }
}
