//! # Quiver
//!
//! Relevance scoring and score explanation for full-text and vector search.
//!
//! ## Features
//!
//! - Vector (nearest-neighbor) scoring over squared euclidean, cosine and dot product
//! - TF-IDF term scoring under the same contract
//! - Query normalization that makes clause scores comparable
//! - Explanation trees reproducing the arithmetic behind every score
//! - Pooled document matches for allocation-free scoring loops

pub mod cli;
pub mod error;
pub mod search;

pub mod prelude {
    pub use crate::error::{QuiverError, Result};
    pub use crate::search::candidate::{TermMatch, VectorCandidate};
    pub use crate::search::context::{ScoreMode, ScoringContext, SearcherOptions};
    pub use crate::search::document_match::{DocumentMatch, DocumentMatchPool};
    pub use crate::search::explanation::Explanation;
    pub use crate::search::scorer::compound::{ConjunctionQueryScorer, DisjunctionQueryScorer};
    pub use crate::search::scorer::knn::{KnnQueryScorer, KnnScorerConfig};
    pub use crate::search::scorer::term::TermQueryScorer;
    pub use crate::search::scorer::{ClauseWeight, QueryScorer, normalize_clauses};
    pub use crate::search::similarity::SimilarityMetric;
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
