//! Scorer contract and the query normalization protocol.
//!
//! Scores from structurally different clauses (lexical and vector, boosted and
//! unboosted) are made comparable in two phases:
//!
//! 1. Every clause reports [`ClauseWeight::weight`], which is `boost²`.
//! 2. The driver sums those weights, derives `query_norm = 1 / sqrt(sum)` and hands
//!    the norm back to every clause with [`ClauseWeight::set_query_norm`]. Each clause
//!    then multiplies its field score by `boost × query_norm`.
//!
//! [`normalize_clauses`] implements the driver. The norm of a clause can be fixed
//! exactly once: scoring a candidate before any norm was supplied fixes the default
//! norm of `1.0`, and any later `set_query_norm` is rejected.
//!
//! # Example
//!
//! ```
//! use quiver::search::context::{ScoringContext, SearcherOptions};
//! use quiver::search::candidate::VectorCandidate;
//! use quiver::search::scorer::{normalize_clauses, ClauseWeight, QueryScorer};
//! use quiver::search::scorer::knn::KnnQueryScorer;
//! use quiver::search::similarity::SimilarityMetric;
//!
//! # fn main() -> quiver::error::Result<()> {
//! let options = SearcherOptions::default();
//! let mut scorer = KnnQueryScorer::new(
//!     vec![0.1, 0.2], "embedding", 2.0, options, SimilarityMetric::DotProduct,
//! )?;
//! let norm = normalize_clauses(&mut [&mut scorer as &mut dyn ClauseWeight])?;
//! assert_eq!(norm, 0.5);
//!
//! let mut ctx = ScoringContext::new(options, 16);
//! let hit = scorer.score(&mut ctx, &VectorCandidate::new("doc-1", 0.8))?;
//! assert_eq!(hit.score, 0.8);
//! # Ok(())
//! # }
//! ```

pub mod compound;
pub mod knn;
pub mod term;

use std::fmt::Debug;
use std::sync::{Arc, OnceLock};

use log::{debug, warn};

use crate::error::{QuiverError, Result};
use crate::search::context::{ScoringContext, SearcherOptions};
use crate::search::document_match::DocumentMatch;
use crate::search::explanation::Explanation;

/// The per-clause half of the normalization protocol.
///
/// This part of the contract is object safe so a driver can normalize a list of
/// heterogeneous clauses.
pub trait ClauseWeight: Send + Sync + Debug {
    /// Contribution of this clause to the query normalization sum (`boost²`).
    fn weight(&self) -> f64;

    /// Fix the query norm of this clause.
    ///
    /// Fails with [`QuiverError::InvalidOperation`] if the norm was already fixed,
    /// either by an earlier call or by scoring a candidate.
    fn set_query_norm(&mut self, query_norm: f64) -> Result<()>;

    /// The query norm in effect (`1.0` until one is fixed).
    fn query_norm(&self) -> f64;

    /// The multiplier applied to field scores (`boost × query_norm`).
    fn derived_weight(&self) -> f64;
}

/// A scorer turning candidates of one kind into document matches.
pub trait QueryScorer: ClauseWeight {
    /// The candidate record this scorer consumes.
    type Candidate;

    /// Score one candidate.
    ///
    /// The returned match comes from the context's pool; the caller gives it back
    /// with [`ScoringContext::release_match`] when done.
    ///
    /// Fails with [`QuiverError::InvalidOperation`] if the context was created for
    /// different score or explain options than the scorer.
    fn score(
        &self,
        ctx: &mut ScoringContext,
        candidate: &Self::Candidate,
    ) -> Result<DocumentMatch>;

    /// Get the name of this scorer.
    fn name(&self) -> &'static str;
}

/// The fixed query weight of one clause.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryWeight {
    query_norm: f64,
    value: f64,
    explanation: Option<Arc<Explanation>>,
}

impl QueryWeight {
    pub fn new(query_norm: f64, value: f64, explanation: Option<Explanation>) -> Self {
        QueryWeight {
            query_norm,
            value,
            explanation: explanation.map(Arc::new),
        }
    }

    pub fn query_norm(&self) -> f64 {
        self.query_norm
    }

    /// The derived weight (`boost × query_norm` for a plain clause).
    pub fn value(&self) -> f64 {
        self.value
    }

    /// The cached `queryWeight` subtree, present in explain mode.
    pub fn explanation(&self) -> Option<&Arc<Explanation>> {
        self.explanation.as_ref()
    }
}

/// One-shot holder of a clause's [`QueryWeight`].
#[derive(Debug, Clone, Default)]
pub struct Normalization {
    fixed: OnceLock<QueryWeight>,
}

impl Normalization {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fix the query weight; fails if one is already fixed.
    pub fn fix(&self, weight: QueryWeight) -> Result<()> {
        self.fixed.set(weight).map_err(|rejected| {
            QuiverError::invalid_operation(format!(
                "query norm {} arrived after the clause was normalized or scored",
                rejected.query_norm
            ))
        })
    }

    /// Get the fixed weight, fixing `default` first if none is set yet.
    pub fn get_or_fix<F>(&self, default: F) -> &QueryWeight
    where
        F: FnOnce() -> QueryWeight,
    {
        self.fixed.get_or_init(default)
    }

    pub fn get(&self) -> Option<&QueryWeight> {
        self.fixed.get()
    }

    pub fn is_fixed(&self) -> bool {
        self.fixed.get().is_some()
    }
}

/// Build the `queryWeight` explanation subtree shared by every match of a clause.
pub(crate) fn query_weight_explanation(
    description: &str,
    boost: f64,
    query_norm: f64,
    value: f64,
) -> Explanation {
    Explanation::with_children(
        value,
        format!("queryWeight({description}), product of:"),
        vec![
            Arc::new(Explanation::new(boost, "boost")),
            Arc::new(Explanation::new(query_norm, "queryNorm")),
        ],
    )
}

/// Check that a context was created for the options a scorer was built with.
pub(crate) fn check_context(ctx: &ScoringContext, options: &SearcherOptions) -> Result<()> {
    if ctx.options() != options {
        return Err(QuiverError::invalid_operation(format!(
            "scoring context options {:?} differ from scorer options {:?}",
            ctx.options(),
            options
        )));
    }
    Ok(())
}

/// Reject boosts the normalization arithmetic cannot use.
pub(crate) fn validate_boost(boost: f64) -> Result<()> {
    if !boost.is_finite() || boost < 0.0 {
        return Err(QuiverError::invalid_config(format!(
            "boost must be a finite, non-negative number, got {boost}"
        )));
    }
    Ok(())
}

/// Compute the query norm for a set of clauses and fix it on each of them.
///
/// The norm is `1 / sqrt(Σ weight)`. A zero sum yields an infinite norm; it is
/// applied as computed.
pub fn normalize_clauses(clauses: &mut [&mut dyn ClauseWeight]) -> Result<f64> {
    let sum_of_squared_weights: f64 = clauses.iter().map(|clause| clause.weight()).sum();
    let query_norm = 1.0 / sum_of_squared_weights.sqrt();

    if sum_of_squared_weights == 0.0 || !sum_of_squared_weights.is_finite() {
        warn!("sum of clause weights is {sum_of_squared_weights}, query norm is {query_norm}");
    }
    debug!(
        "normalizing {} clauses: sum of weights {}, query norm {}",
        clauses.len(),
        sum_of_squared_weights,
        query_norm
    );

    for clause in clauses.iter_mut() {
        clause.set_query_norm(query_norm)?;
    }

    Ok(query_norm)
}
