//! Combining the matches of several clauses into one match.
//!
//! Both combiners reuse the first constituent record for the result and give the
//! remaining records back to the context's pool.

use std::sync::Arc;

use crate::error::{QuiverError, Result};
use crate::search::context::{ScoringContext, SearcherOptions};
use crate::search::document_match::DocumentMatch;
use crate::search::explanation::Explanation;
use crate::search::scorer::check_context;

/// Sum the scores and explanations of the constituents.
fn sum_constituents(
    constituents: &mut [DocumentMatch],
    explain: bool,
) -> (f64, Vec<Arc<Explanation>>) {
    let mut sum = 0.0;
    let mut children = Vec::with_capacity(if explain { constituents.len() } else { 0 });
    for document_match in constituents.iter_mut() {
        sum += document_match.score;
        if explain {
            children.extend(document_match.explanation.take().map(Arc::new));
        }
    }
    (sum, children)
}

/// Split off the record reused for the result and release the others.
fn reuse_first(ctx: &mut ScoringContext, constituents: Vec<DocumentMatch>) -> DocumentMatch {
    let mut constituents = constituents.into_iter();
    // Callers check for emptiness first.
    let first = constituents.next().unwrap_or_default();
    for rest in constituents {
        ctx.release_match(rest);
    }
    first
}

/// Scorer for clauses that must all match: the score is the plain sum.
#[derive(Debug, Clone, Default)]
pub struct ConjunctionQueryScorer {
    options: SearcherOptions,
}

impl ConjunctionQueryScorer {
    pub fn new(options: SearcherOptions) -> Self {
        ConjunctionQueryScorer { options }
    }

    /// Combine the matches of every clause for one document.
    pub fn score(
        &self,
        ctx: &mut ScoringContext,
        mut constituents: Vec<DocumentMatch>,
    ) -> Result<DocumentMatch> {
        check_context(ctx, &self.options)?;
        if constituents.is_empty() {
            return Err(QuiverError::invalid_operation(
                "conjunction needs at least one constituent match",
            ));
        }

        let (sum, children) = sum_constituents(&mut constituents, self.options.explain);
        let mut rv = reuse_first(ctx, constituents);
        rv.score = sum;
        rv.explanation = self
            .options
            .explain
            .then(|| Explanation::with_children(sum, "sum of:", children));
        Ok(rv)
    }
}

/// Scorer for clauses where any may match: the sum is scaled by the fraction of
/// clauses that matched.
#[derive(Debug, Clone, Default)]
pub struct DisjunctionQueryScorer {
    options: SearcherOptions,
}

impl DisjunctionQueryScorer {
    pub fn new(options: SearcherOptions) -> Self {
        DisjunctionQueryScorer { options }
    }

    /// Combine the matches of the `count_match` clauses (out of `count_total`)
    /// that matched one document.
    pub fn score(
        &self,
        ctx: &mut ScoringContext,
        mut constituents: Vec<DocumentMatch>,
        count_match: usize,
        count_total: usize,
    ) -> Result<DocumentMatch> {
        check_context(ctx, &self.options)?;
        if constituents.is_empty() {
            return Err(QuiverError::invalid_operation(
                "disjunction needs at least one constituent match",
            ));
        }
        if count_total == 0 || count_match > count_total {
            return Err(QuiverError::invalid_operation(format!(
                "disjunction coord {count_match}/{count_total} is out of range"
            )));
        }

        let (sum, children) = sum_constituents(&mut constituents, self.options.explain);
        let coord = count_match as f64 / count_total as f64;
        let new_score = sum * coord;

        let mut rv = reuse_first(ctx, constituents);
        rv.score = new_score;
        rv.explanation = self.options.explain.then(|| {
            let raw = Explanation::with_children(sum, "sum of:", children);
            let coord = Explanation::new(coord, format!("coord({count_match}/{count_total})"));
            Explanation::with_children(
                new_score,
                "product of:",
                vec![Arc::new(raw), Arc::new(coord)],
            )
        });
        Ok(rv)
    }
}
