//! Similarity metrics reported by the vector index.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{QuiverError, Result};

/// The metric a nearest-neighbor index used to compare vectors.
///
/// Scores are combined on an ascending scale (higher is better). Cosine similarity
/// and dot product already follow that convention; squared euclidean distance does
/// not and is inverted by [`SimilarityMetric::normalize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SimilarityMetric {
    /// Squared euclidean (L2) distance, lower is more similar.
    #[serde(
        rename = "l2_norm",
        alias = "squared-euclidean",
        alias = "euclidean",
        alias = "l2"
    )]
    SquaredEuclidean,
    /// Cosine similarity, higher is more similar.
    #[serde(rename = "cosine")]
    Cosine,
    /// Dot product, higher is more similar.
    #[serde(rename = "dot_product", alias = "dot-product", alias = "dot")]
    DotProduct,
}

impl SimilarityMetric {
    /// Get the canonical tag of this metric.
    pub fn name(&self) -> &'static str {
        match self {
            SimilarityMetric::SquaredEuclidean => "l2_norm",
            SimilarityMetric::Cosine => "cosine",
            SimilarityMetric::DotProduct => "dot_product",
        }
    }

    /// Parse a metric from its tag or one of the accepted aliases.
    pub fn parse_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "l2_norm" | "squared-euclidean" | "euclidean" | "l2" => {
                Ok(SimilarityMetric::SquaredEuclidean)
            }
            "cosine" => Ok(SimilarityMetric::Cosine),
            "dot_product" | "dot-product" | "dot" => Ok(SimilarityMetric::DotProduct),
            _ => Err(QuiverError::invalid_config(format!(
                "Unknown similarity metric: {s}"
            ))),
        }
    }

    /// Map a raw metric value onto the ascending score scale.
    ///
    /// A distance of exactly zero maps to positive infinity.
    pub fn normalize(&self, raw: f64) -> f64 {
        match self {
            SimilarityMetric::SquaredEuclidean => 1.0 / raw,
            SimilarityMetric::Cosine | SimilarityMetric::DotProduct => raw,
        }
    }
}

impl fmt::Display for SimilarityMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SimilarityMetric {
    type Err = QuiverError;

    fn from_str(s: &str) -> Result<Self> {
        SimilarityMetric::parse_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tags_and_aliases() {
        assert_eq!(
            "l2_norm".parse::<SimilarityMetric>().unwrap(),
            SimilarityMetric::SquaredEuclidean
        );
        assert_eq!(
            SimilarityMetric::parse_str("Squared-Euclidean").unwrap(),
            SimilarityMetric::SquaredEuclidean
        );
        assert_eq!(
            SimilarityMetric::parse_str("cosine").unwrap(),
            SimilarityMetric::Cosine
        );
        assert_eq!(
            SimilarityMetric::parse_str("dot-product").unwrap(),
            SimilarityMetric::DotProduct
        );
    }

    #[test]
    fn test_unknown_metric_is_config_error() {
        let err = SimilarityMetric::parse_str("hamming").unwrap_err();
        assert!(matches!(err, QuiverError::InvalidConfig(_)));

        let err = serde_json::from_str::<SimilarityMetric>(r#""hamming""#);
        assert!(err.is_err());
    }

    #[test]
    fn test_serde_uses_canonical_tags() {
        let json = serde_json::to_string(&SimilarityMetric::SquaredEuclidean).unwrap();
        assert_eq!(json, r#""l2_norm""#);

        let metric: SimilarityMetric = serde_json::from_str(r#""dot""#).unwrap();
        assert_eq!(metric, SimilarityMetric::DotProduct);
    }

    #[test]
    fn test_normalize() {
        assert_eq!(SimilarityMetric::SquaredEuclidean.normalize(0.5), 2.0);
        assert_eq!(SimilarityMetric::Cosine.normalize(0.5), 0.5);
        assert_eq!(SimilarityMetric::DotProduct.normalize(0.5), 0.5);
        assert_eq!(
            SimilarityMetric::SquaredEuclidean.normalize(0.0),
            f64::INFINITY
        );
    }
}
