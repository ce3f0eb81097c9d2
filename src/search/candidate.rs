//! Candidate matches produced by the index layer.
//!
//! Candidates are read-only inputs to scoring. The scorer assumes they are well
//! formed; validating them is the index layer's job.

/// A nearest-neighbor hit from a vector index.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorCandidate {
    /// Index-internal document id.
    pub id: Vec<u8>,
    /// Raw value reported by the similarity metric.
    pub score: f64,
}

impl VectorCandidate {
    pub fn new<I: Into<Vec<u8>>>(id: I, score: f64) -> Self {
        VectorCandidate {
            id: id.into(),
            score,
        }
    }
}

/// A posting for one term in one document.
#[derive(Debug, Clone, PartialEq)]
pub struct TermMatch {
    /// Index-internal document id.
    pub id: Vec<u8>,
    /// Occurrences of the term in the field.
    pub freq: u64,
    /// Field length normalization factor.
    pub norm: f64,
}

impl TermMatch {
    pub fn new<I: Into<Vec<u8>>>(id: I, freq: u64, norm: f64) -> Self {
        TermMatch {
            id: id.into(),
            freq,
            norm,
        }
    }
}
