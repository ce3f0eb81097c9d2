//! Integration tests for the scoring commands.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use quiver::cli::args::{Command, QuiverArgs};
use quiver::cli::commands::{score_terms, score_vectors};
use quiver::cli::output::ScoringResults;
use quiver::error::QuiverError;
use tempfile::TempDir;

fn write_candidates(dir: &TempDir, name: &str, json: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, json).unwrap();
    path
}

fn parse(args: &[&str]) -> QuiverArgs {
    QuiverArgs::parse_from(args.iter().copied())
}

#[test]
fn test_knn_command_scores_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_candidates(
        &temp_dir,
        "hits.json",
        r#"[{"id":"one","score":0.5},{"id":"two","score":0.25,"vector":[1.0,2.0]}]"#,
    );

    let args = parse(&[
        "quiver",
        "knn",
        path.to_str().unwrap(),
        "--field",
        "desc",
        "--vector",
        "1,2",
        "--metric",
        "l2_norm",
        "--query-norm",
        "0.5",
        "--boost",
        "2",
        "--explain",
    ]);
    let Command::Knn(knn_args) = args.command else {
        panic!("Expected knn command");
    };

    let results = score_vectors(&knn_args).unwrap();
    assert_eq!(results.scorer, "knn");
    assert_eq!(results.query_norm, 0.5);
    assert_eq!(results.derived_weight, 1.0);
    assert_eq!(results.hits.len(), 2);
    assert_eq!(results.hits[0].id, "one");
    assert_eq!(results.hits[0].score, 2.0);
    assert_eq!(results.hits[1].score, 4.0);

    // Derived weight of exactly one leaves the field weight as the root.
    let explanation = results.hits[1].explanation.as_ref().unwrap();
    assert_eq!(explanation.message(), "fieldWeight(desc in doc two), score of:");
}

#[test]
fn test_knn_zero_distance_json_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_candidates(
        &temp_dir,
        "hits.json",
        r#"[{"id":"same","score":0.0},{"id":"near","score":0.5}]"#,
    );

    let args = parse(&[
        "quiver",
        "-f",
        "json",
        "knn",
        path.to_str().unwrap(),
        "--field",
        "desc",
        "--vector",
        "1,2",
        "--metric",
        "l2_norm",
        "--explain",
    ]);
    let Command::Knn(knn_args) = args.command else {
        panic!("Expected knn command");
    };

    let results = score_vectors(&knn_args).unwrap();
    assert_eq!(results.hits[0].score, f64::INFINITY);

    let json = serde_json::to_string(&results).unwrap();
    assert!(json.contains(r#""score":"+Inf""#));
    assert!(json.contains("similarity_metric(l2_norm)=+Inf"));

    let decoded: ScoringResults = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded.hits[0].score, f64::INFINITY);
    assert_eq!(decoded.hits[1].score, 2.0);
    let explanation = decoded.hits[0].explanation.as_ref().unwrap();
    assert_eq!(explanation.value(), f64::INFINITY);
}

#[test]
fn test_term_command_scores_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_candidates(
        &temp_dir,
        "postings.json",
        r#"[{"id":"a","freq":4,"norm":0.5},{"id":"b","freq":1}]"#,
    );

    let args = parse(&[
        "quiver",
        "term",
        path.to_str().unwrap(),
        "--field",
        "body",
        "--term",
        "beer",
        "--doc-total",
        "10",
        "--doc-term",
        "9",
    ]);
    let Command::Term(term_args) = args.command else {
        panic!("Expected term command");
    };

    // idf = 1 + ln(10 / 10) = 1
    let results = score_terms(&term_args).unwrap();
    assert_eq!(results.hits[0].score, 1.0);
    assert_eq!(results.hits[1].score, 1.0);
    assert!(results.hits[0].explanation.is_none());
}

#[test]
fn test_unknown_metric_reported() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_candidates(&temp_dir, "hits.json", "[]");

    let args = parse(&[
        "quiver",
        "knn",
        path.to_str().unwrap(),
        "--field",
        "desc",
        "--metric",
        "hamming",
    ]);
    let Command::Knn(knn_args) = args.command else {
        panic!("Expected knn command");
    };

    let err = score_vectors(&knn_args).unwrap_err();
    assert!(matches!(err, QuiverError::InvalidConfig(_)));
}

#[test]
fn test_missing_file_is_io_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("missing.json");

    let args = parse(&[
        "quiver",
        "knn",
        path.to_str().unwrap(),
        "--field",
        "desc",
    ]);
    let Command::Knn(knn_args) = args.command else {
        panic!("Expected knn command");
    };

    assert!(matches!(
        score_vectors(&knn_args),
        Err(QuiverError::Io(_))
    ));
}

#[test]
fn test_malformed_file_is_json_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_candidates(&temp_dir, "hits.json", r#"[{"id":"one"}]"#);

    let args = parse(&[
        "quiver",
        "knn",
        path.to_str().unwrap(),
        "--field",
        "desc",
    ]);
    let Command::Knn(knn_args) = args.command else {
        panic!("Expected knn command");
    };

    assert!(matches!(
        score_vectors(&knn_args),
        Err(QuiverError::Json(_))
    ));
}
