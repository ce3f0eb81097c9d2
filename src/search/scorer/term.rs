//! TF-IDF scoring of term postings.

use std::sync::Arc;

use lazy_static::lazy_static;
use log::debug;

use crate::error::Result;
use crate::search::candidate::TermMatch;
use crate::search::context::{ScoringContext, SearcherOptions};
use crate::search::document_match::DocumentMatch;
use crate::search::explanation::{Explanation, format_float};
use crate::search::scorer::{
    ClauseWeight, Normalization, QueryScorer, QueryWeight, check_context,
    query_weight_explanation, validate_boost,
};

/// Term frequencies below this use the precomputed square roots.
pub const MAX_SQRT_CACHE: usize = 64;

lazy_static! {
    static ref SQRT_CACHE: [f64; MAX_SQRT_CACHE] = {
        let mut cache = [0.0; MAX_SQRT_CACHE];
        for (i, slot) in cache.iter_mut().enumerate() {
            *slot = (i as f64).sqrt();
        }
        cache
    };
}

fn term_frequency(freq: u64) -> f64 {
    if (freq as usize) < MAX_SQRT_CACHE {
        SQRT_CACHE[freq as usize]
    } else {
        (freq as f64).sqrt()
    }
}

/// Scorer for a single term in a single field.
///
/// The field score is `sqrt(freq) × norm × idf` with
/// `idf = 1 + ln(doc_total / (doc_term + 1))`; it is weighted by the clause's
/// `boost × query_norm` exactly like a vector clause.
#[derive(Debug, Clone)]
pub struct TermQueryScorer {
    query_term: String,
    query_field: String,
    query_boost: f64,
    doc_term: u64,
    doc_total: u64,
    idf: f64,
    options: SearcherOptions,
    include_score: bool,
    idf_explanation: Option<Arc<Explanation>>,
    normalization: Normalization,
}

impl TermQueryScorer {
    /// Create a scorer for a term found in `doc_term` of `doc_total` documents.
    pub fn new<T: Into<String>, F: Into<String>>(
        query_term: T,
        query_field: F,
        query_boost: f64,
        doc_total: u64,
        doc_term: u64,
        options: SearcherOptions,
    ) -> Result<Self> {
        validate_boost(query_boost)?;

        let idf = 1.0 + (doc_total as f64 / (doc_term as f64 + 1.0)).ln();
        let idf_explanation = options.explain.then(|| {
            Arc::new(Explanation::new(
                idf,
                format!("idf(docFreq={doc_term}, maxDocs={doc_total})"),
            ))
        });

        Ok(TermQueryScorer {
            query_term: query_term.into(),
            query_field: query_field.into(),
            query_boost,
            doc_term,
            doc_total,
            idf,
            include_score: options.includes_score(),
            options,
            idf_explanation,
            normalization: Normalization::new(),
        })
    }

    pub fn query_term(&self) -> &str {
        &self.query_term
    }

    pub fn query_field(&self) -> &str {
        &self.query_field
    }

    pub fn boost(&self) -> f64 {
        self.query_boost
    }

    pub fn idf(&self) -> f64 {
        self.idf
    }

    pub fn doc_term(&self) -> u64 {
        self.doc_term
    }

    pub fn doc_total(&self) -> u64 {
        self.doc_total
    }

    fn query_weight(&self, query_norm: f64) -> QueryWeight {
        let value = self.query_boost * query_norm;
        let explanation = self.options.explain.then(|| {
            query_weight_explanation(
                &format!(
                    "{}:{}^{}",
                    self.query_field,
                    self.query_term,
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

impl ClauseWeight for TermQueryScorer {
    fn weight(&self) -> f64 {
        self.query_boost * self.query_boost
    }

    fn set_query_norm(&mut self, query_norm: f64) -> Result<()> {
        let weight = self.query_weight(query_norm);
        debug!(
            "term clause {}:{}: boost {}, query norm {}, derived weight {}",
            self.query_field,
            self.query_term,
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

impl QueryScorer for TermQueryScorer {
    type Candidate = TermMatch;

    fn score(&self, ctx: &mut ScoringContext, term_match: &TermMatch) -> Result<DocumentMatch> {
        check_context(ctx, &self.options)?;

        let mut rv = ctx.acquire_match();
        let query_weight = self.normalization.get_or_fix(|| self.query_weight(1.0));

        if self.include_score || self.options.explain {
            let tf = term_frequency(term_match.freq);
            let mut score = tf * term_match.norm * self.idf;
            let mut explanation = None;

            if self.options.explain {
                let id = String::from_utf8_lossy(&term_match.id);
                let mut children = vec![
                    Arc::new(Explanation::new(
                        tf,
                        format!(
                            "tf(termFreq({}:{})={}",
                            self.query_field, self.query_term, term_match.freq
                        ),
                    )),
                    Arc::new(Explanation::new(
                        term_match.norm,
                        format!("fieldNorm(field={}, doc={})", self.query_field, id),
                    )),
                ];
                children.extend(self.idf_explanation.clone());
                explanation = Some(Explanation::with_children(
                    score,
                    format!(
                        "fieldWeight({}:{} in {}), product of:",
                        self.query_field, self.query_term, id
                    ),
                    children,
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
                            self.query_term,
                            format_float(self.query_boost),
                            String::from_utf8_lossy(&term_match.id)
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

        rv.id.extend_from_slice(&term_match.id);
        Ok(rv)
    }

    fn name(&self) -> &'static str {
        "term"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QuiverError;
    use crate::search::context::ScoreMode;

    const DOC_TOTAL: u64 = 100;
    const DOC_TERM: u64 = 9;

    fn expected_idf() -> f64 {
        1.0 + (DOC_TOTAL as f64 / (DOC_TERM as f64 + 1.0)).ln()
    }

    #[test]
    fn test_sqrt_cache() {
        assert_eq!(term_frequency(0), 0.0);
        assert_eq!(term_frequency(4), 2.0);
        assert_eq!(term_frequency(63), 63f64.sqrt());
        assert_eq!(term_frequency(100), 10.0);
    }

    #[test]
    fn test_idf() {
        let scorer =
            TermQueryScorer::new("beer", "desc", 1.0, DOC_TOTAL, DOC_TERM, SearcherOptions::default())
                .unwrap();
        assert_eq!(scorer.idf(), expected_idf());
        assert_eq!(scorer.doc_total(), DOC_TOTAL);
        assert_eq!(scorer.doc_term(), DOC_TERM);
    }

    #[test]
    fn test_score_without_weighting() {
        let options = SearcherOptions::new().with_explain(true);
        let mut scorer = TermQueryScorer::new("beer", "desc", 1.0, DOC_TOTAL, DOC_TERM, options)
            .unwrap();
        scorer.set_query_norm(1.0).unwrap();

        let mut ctx = ScoringContext::new(options, 1);
        let actual = scorer.score(&mut ctx, &TermMatch::new("one", 1, 1.0)).unwrap();

        let idf = expected_idf();
        let expected = Explanation::with_children(
            idf,
            "fieldWeight(desc:beer in one), product of:",
            vec![
                Arc::new(Explanation::new(1.0, "tf(termFreq(desc:beer)=1")),
                Arc::new(Explanation::new(1.0, "fieldNorm(field=desc, doc=one)")),
                Arc::new(Explanation::new(idf, "idf(docFreq=9, maxDocs=100)")),
            ],
        );
        assert_eq!(actual.score, idf);
        assert_eq!(actual.explanation, Some(expected));
        assert_eq!(actual.id, b"one");
    }

    #[test]
    fn test_score_with_weighting() {
        let options = SearcherOptions::new().with_explain(true);
        let mut scorer = TermQueryScorer::new("beer", "desc", 2.0, DOC_TOTAL, DOC_TERM, options)
            .unwrap();
        assert_eq!(scorer.weight(), 4.0);
        scorer.set_query_norm(0.25).unwrap();
        assert_eq!(scorer.derived_weight(), 0.5);

        let mut ctx = ScoringContext::new(options, 1);
        let actual = scorer.score(&mut ctx, &TermMatch::new("two", 4, 0.5)).unwrap();

        let field_score = 2.0 * 0.5 * expected_idf();
        let explanation = actual.explanation.unwrap();
        assert_eq!(actual.score, field_score * 0.5);
        assert_eq!(
            explanation.message(),
            "weight(desc:beer^2.000000 in two), product of:"
        );
        assert_eq!(explanation.children().len(), 2);

        let query_weight = &explanation.children()[0];
        assert_eq!(
            query_weight.message(),
            "queryWeight(desc:beer^2.000000), product of:"
        );
        assert_eq!(query_weight.value(), 0.5);
        assert_eq!(query_weight.children()[0].value(), 2.0);
        assert_eq!(query_weight.children()[1].value(), 0.25);
        assert_eq!(explanation.children()[1].value(), field_score);
    }

    #[test]
    fn test_score_mode_none() {
        let options = SearcherOptions::new().with_score_mode(ScoreMode::None);
        let scorer =
            TermQueryScorer::new("beer", "desc", 1.0, DOC_TOTAL, DOC_TERM, options).unwrap();
        let mut ctx = ScoringContext::new(options, 1);

        let actual = scorer.score(&mut ctx, &TermMatch::new("one", 3, 1.0)).unwrap();
        assert_eq!(actual.score, 0.0);
        assert!(actual.explanation.is_none());
        assert_eq!(scorer.name(), "term");
    }

    #[test]
    fn test_context_options_must_match() {
        let scorer = TermQueryScorer::new(
            "beer",
            "desc",
            1.0,
            DOC_TOTAL,
            DOC_TERM,
            SearcherOptions::new().with_explain(true),
        )
        .unwrap();
        let mut ctx = ScoringContext::new(SearcherOptions::default(), 1);

        let err = scorer
            .score(&mut ctx, &TermMatch::new("one", 1, 1.0))
            .unwrap_err();
        assert!(matches!(err, QuiverError::InvalidOperation(_)));
    }
}
