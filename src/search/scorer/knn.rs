//! Scoring of nearest-neighbor vector matches.

use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::search::candidate::VectorCandidate;
use crate::search::context::{ScoringContext, SearcherOptions};
use crate::search::document_match::DocumentMatch;
use crate::search::explanation::{Explanation, format_float, format_vector};
use crate::search::scorer::{
    ClauseWeight, Normalization, QueryScorer, QueryWeight, check_context,
    query_weight_explanation, validate_boost,
};
use crate::search::similarity::SimilarityMetric;

#[cfg(test)]
thread_local! {
    static METRIC_NORMALIZATIONS: std::cell::Cell<usize> = const { std::cell::Cell::new(0) };
}

fn default_boost() -> f64 {
    1.0
}

/// Serializable description of a vector query clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnnScorerConfig {
    /// Field holding the indexed vectors.
    pub field: String,
    /// The query vector.
    pub vector: Vec<f32>,
    /// Clause boost.
    #[serde(default = "default_boost")]
    pub boost: f64,
    /// Metric the index reports raw values in.
    pub metric: SimilarityMetric,
    /// Score and explain options.
    #[serde(default)]
    pub options: SearcherOptions,
}

impl KnnScorerConfig {
    pub fn validate(&self) -> Result<()> {
        validate_boost(self.boost)
    }
}

/// Scorer for nearest-neighbor matches.
///
/// The raw metric value of a candidate is first mapped onto the ascending score
/// scale (squared euclidean distances are inverted) and then multiplied by the
/// clause's derived weight `boost × query_norm` unless that weight is exactly one.
#[derive(Debug, Clone)]
pub struct KnnQueryScorer {
    query_vector: Vec<f32>,
    query_field: String,
    query_boost: f64,
    options: SearcherOptions,
    include_score: bool,
    similarity_metric: SimilarityMetric,
    normalization: Normalization,
}

impl KnnQueryScorer {
    /// Create a new vector scorer.
    pub fn new<S: Into<String>>(
        query_vector: Vec<f32>,
        query_field: S,
        query_boost: f64,
        options: SearcherOptions,
        similarity_metric: SimilarityMetric,
    ) -> Result<Self> {
        validate_boost(query_boost)?;

        Ok(KnnQueryScorer {
            query_vector,
            query_field: query_field.into(),
            query_boost,
            include_score: options.includes_score(),
            options,
            similarity_metric,
            normalization: Normalization::new(),
        })
    }

    /// Create a scorer from a clause description.
    pub fn from_config(config: KnnScorerConfig) -> Result<Self> {
        config.validate()?;
        Self::new(
            config.vector,
            config.field,
            config.boost,
            config.options,
            config.metric,
        )
    }

    pub fn query_vector(&self) -> &[f32] {
        &self.query_vector
    }

    pub fn query_field(&self) -> &str {
        &self.query_field
    }

    pub fn boost(&self) -> f64 {
        self.query_boost
    }

    pub fn similarity_metric(&self) -> SimilarityMetric {
        self.similarity_metric
    }

    pub fn options(&self) -> &SearcherOptions {
        &self.options
    }

    fn query_weight(&self, query_norm: f64) -> QueryWeight {
        let value = self.query_boost * query_norm;
        let explanation = self.options.explain.then(|| {
            query_weight_explanation(
                &format!(
                    "{}:{}^{}",
                    self.query_field,
                    format_vector(&self.query_vector),
                    format_float(self.query_boost)
                ),
                self.query_boost,
                query_norm,
                value,
            )
        });
        QueryWeight::new(query_norm, value, explanation)
    }
}

impl ClauseWeight for KnnQueryScorer {
    fn weight(&self) -> f64 {
        self.query_boost * self.query_boost
    }

    fn set_query_norm(&mut self, query_norm: f64) -> Result<()> {
        let weight = self.query_weight(query_norm);
        debug!(
            "knn clause on {}: boost {}, query norm {}, derived weight {}",
            self.query_field,
            self.query_boost,
            query_norm,
            weight.value()
        );
        self.normalization.fix(weight)
    }

    fn query_norm(&self) -> f64 {
        self.normalization.get().map_or(1.0, |w| w.query_norm())
    }

    fn derived_weight(&self) -> f64 {
        self.normalization
            .get()
            .map_or(self.query_boost, |w| w.value())
    }
}

impl QueryScorer for KnnQueryScorer {
    type Candidate = VectorCandidate;

    fn score(
        &self,
        ctx: &mut ScoringContext,
        candidate: &VectorCandidate,
    ) -> Result<DocumentMatch> {
        check_context(ctx, &self.options)?;

        let mut rv = ctx.acquire_match();
        let query_weight = self.normalization.get_or_fix(|| self.query_weight(1.0));

        if self.include_score || self.options.explain {
            #[cfg(test)]
            METRIC_NORMALIZATIONS.with(|count| count.set(count.get() + 1));

            let mut score = self.similarity_metric.normalize(candidate.score);
            let mut explanation = None;

            if self.options.explain {
                let id = String::from_utf8_lossy(&candidate.id);
                let similarity = Explanation::new(
                    score,
                    format!(
                        "vector(field({}:{}) with similarity_metric({})={}",
                        self.query_field,
                        id,
                        self.similarity_metric,
                        format_float(score)
                    ),
                );
                explanation = Some(Explanation::with_children(
                    score,
                    format!("fieldWeight({} in doc {}), score of:", self.query_field, id),
                    vec![Arc::new(similarity)],
                ));
            }

            if query_weight.value() != 1.0 {
                score *= query_weight.value();
                explanation = explanation.map(|field_weight| {
                    let children = query_weight
                        .explanation()
                        .cloned()
                        .into_iter()
                        .chain(std::iter::once(Arc::new(field_weight)));
                    Explanation::with_children(
                        score,
                        format!(
                            "weight({}:{}^{} in {}), product of:",
                            self.query_field,
                            format_vector(&self.query_vector),
                            format_float(self.query_boost),
                            String::from_utf8_lossy(&candidate.id)
                        ),
                        children,
                    )
                });
            }

            if self.include_score {
                rv.score = score;
            }
            rv.explanation = explanation;
        }

        rv.id.extend_from_slice(&candidate.id);
        Ok(rv)
    }

    fn name(&self) -> &'static str {
        "knn"
    }
}
