//! Document matches and the pool that recycles them.
//!
//! A scoring loop may produce millions of matches for one query. Matches are taken
//! from a [`DocumentMatchPool`], handed to the ranking layer by value and given back
//! with [`DocumentMatchPool::put`] once the caller is done, so the id buffers and
//! the records themselves are reused instead of reallocated.

use std::borrow::Cow;

use log::trace;
use serde::{Deserialize, Serialize};

use crate::search::explanation::{Explanation, float_repr};

/// The scored result for one candidate document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMatch {
    /// Index-internal document id.
    pub id: Vec<u8>,

    /// The relevance score (zero when scores are not requested).
    #[serde(with = "float_repr")]
    pub score: f64,

    /// How the score was derived (only present in explain mode).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<Explanation>,
}

impl DocumentMatch {
    /// Lossy UTF-8 view of the document id.
    pub fn id_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.id)
    }

    /// Clear all fields, keeping the capacity of the id buffer.
    pub fn reset(&mut self) {
        self.id.clear();
        self.score = 0.0;
        self.explanation = None;
    }
}

/// A free list of reusable [`DocumentMatch`] records.
#[derive(Debug, Default)]
pub struct DocumentMatchPool {
    /// Records ready to be handed out.
    avail: Vec<DocumentMatch>,
    /// Number of records this pool has ever created.
    allocated: usize,
}

impl DocumentMatchPool {
    /// Create a pool holding `size` pre-allocated records.
    pub fn new(size: usize) -> Self {
        DocumentMatchPool {
            avail: (0..size).map(|_| DocumentMatch::default()).collect(),
            allocated: size,
        }
    }

    /// Take a zeroed record from the pool, allocating one if the pool is empty.
    pub fn get(&mut self) -> DocumentMatch {
        match self.avail.pop() {
            Some(document_match) => document_match,
            None => {
                self.allocated += 1;
                trace!(
                    "document match pool exhausted, allocated record #{}",
                    self.allocated
                );
                DocumentMatch::default()
            }
        }
    }

    /// Give a record back to the pool.
    pub fn put(&mut self, mut document_match: DocumentMatch) {
        document_match.reset();
        self.avail.push(document_match);
    }

    /// Number of records currently free.
    pub fn available(&self) -> usize {
        self.avail.len()
    }

    /// Number of records this pool has ever created.
    pub fn allocated(&self) -> usize {
        self.allocated
    }
}
