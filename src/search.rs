//! Relevance scoring and score explanation.
//!
//! The index layer hands candidates (term postings or nearest-neighbor hits) to a
//! [`scorer::QueryScorer`], which turns each into a [`document_match::DocumentMatch`]
//! drawn from the [`context::ScoringContext`] pool, optionally carrying an
//! [`explanation::Explanation`] of the arithmetic behind the score.

pub mod candidate;
pub mod context;
pub mod document_match;
pub mod explanation;
pub mod scorer;
pub mod similarity;
