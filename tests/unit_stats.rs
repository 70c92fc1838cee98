// Unit tests for summary statistics.
//
// Covers the aggregate counts, the mean over finite scores, the offensive
// word ranking (count, then first appearance), the loosely typed table
// path used for re-loaded exports, and the plotting distribution.

use serde_json::json;
use toxiscan::models::ClassificationResult;
use toxiscan::stats::{summarize, summarize_table, toxicity_distribution, SummaryStats, TOP_WORDS};

fn result(is_toxic: bool, score: f64, words: &[&str]) -> ClassificationResult {
    ClassificationResult {
        comment: "c".to_string(),
        cleaned_comment: "c".to_string(),
        is_toxic,
        toxicity_score: score,
        severe_toxicity: score / 2.0,
        obscene: 0.0,
        threat: 0.0,
        insult: score,
        identity_hate: 0.0,
        offensive_words: words.iter().map(|w| w.to_string()).collect(),
        explanation: "ok".to_string(),
    }
}

// ============================================================
// summarize
// ============================================================

#[test]
fn empty_collection_is_all_zero() {
    let stats = summarize(&[]);
    assert_eq!(stats, SummaryStats::default());
    assert_eq!(
        serde_json::to_value(&stats).unwrap(),
        json!({
            "total_comments": 0,
            "toxic_comments": 0,
            "avg_toxicity": 0.0,
            "most_common_offensive_words": {}
        })
    );
}

#[test]
fn counts_and_mean() {
    let results = vec![
        result(true, 0.9, &[]),
        result(false, 0.1, &[]),
        result(true, 0.5, &[]),
    ];
    let stats = summarize(&results);
    assert_eq!(stats.total_comments, 3);
    assert_eq!(stats.toxic_comments, 2);
    assert!((stats.avg_toxicity - 0.5).abs() < 1e-9);
}

#[test]
fn word_counts_across_comments() {
    let results = vec![
        result(true, 0.9, &["idiot", "fool"]),
        result(true, 0.8, &["idiot"]),
        result(false, 0.0, &[]),
    ];
    let stats = summarize(&results);
    assert_eq!(
        serde_json::to_value(&stats.most_common_offensive_words).unwrap(),
        json!({ "idiot": 2, "fool": 1 })
    );
    let ranked: Vec<_> = stats.most_common_offensive_words.iter().collect();
    assert_eq!(ranked, vec![("idiot", 2), ("fool", 1)]);
}

#[test]
fn ties_keep_first_appearance_order() {
    let results = vec![
        result(true, 0.9, &["zebra", "apple"]),
        result(true, 0.9, &["mango"]),
    ];
    let stats = summarize(&results);
    let ranked: Vec<_> = stats.most_common_offensive_words.iter().collect();
    assert_eq!(ranked, vec![("zebra", 1), ("apple", 1), ("mango", 1)]);
}

#[test]
fn ranking_is_truncated_to_top_words() {
    let words: Vec<String> = (0..15).map(|i| format!("w{i}")).collect();
    let refs: Vec<&str> = words.iter().map(String::as_str).collect();
    // w14 appears twice so it must lead
    let results = vec![result(true, 1.0, &refs), result(true, 1.0, &["w14"])];

    let stats = summarize(&results);
    assert_eq!(stats.most_common_offensive_words.len(), TOP_WORDS);
    assert_eq!(stats.most_common_offensive_words.get("w14"), Some(2));
    assert_eq!(stats.most_common_offensive_words.iter().next(), Some(("w14", 2)));
    assert_eq!(stats.most_common_offensive_words.get("w0"), Some(1));
    assert_eq!(stats.most_common_offensive_words.get("w13"), None);
}

#[test]
fn degraded_results_count_toward_total_and_mean() {
    let degraded = ClassificationResult::degraded("x", "x".to_string(), "timeout");
    let results = vec![result(true, 1.0, &[]), degraded];
    let stats = summarize(&results);
    assert_eq!(stats.total_comments, 2);
    assert_eq!(stats.toxic_comments, 1);
    assert!((stats.avg_toxicity - 0.5).abs() < 1e-9);
}

#[test]
fn non_finite_scores_are_skipped_in_mean() {
    let results = vec![result(false, f64::NAN, &[]), result(true, 0.8, &[])];
    let stats = summarize(&results);
    assert_eq!(stats.total_comments, 2);
    assert!((stats.avg_toxicity - 0.8).abs() < 1e-9);
}

#[test]
fn mean_is_zero_when_no_score_is_finite() {
    let results = vec![result(false, f64::NAN, &[])];
    assert_eq!(summarize(&results).avg_toxicity, 0.0);
}

// ============================================================
// summarize_table
// ============================================================

#[test]
fn table_matches_typed_summary() {
    let results = vec![
        result(true, 0.9, &["idiot", "fool"]),
        result(false, 0.1, &["idiot"]),
        result(true, 0.5, &[]),
    ];
    let rows: Vec<_> = results
        .iter()
        .map(|r| serde_json::to_value(r).unwrap())
        .collect();
    assert_eq!(summarize_table(&rows), summarize(&results));
}

#[test]
fn table_missing_required_column_gives_zeroed_stats() {
    let rows = vec![
        json!({ "is_toxic": true, "toxicity_score": 0.9, "offensive_words": ["x"] }),
        json!({ "is_toxic": true, "toxicity_score": 0.9 }),
    ];
    assert_eq!(summarize_table(&rows), SummaryStats::default());
}

#[test]
fn empty_table_gives_zeroed_stats() {
    assert_eq!(summarize_table(&[]), SummaryStats::default());
}

#[test]
fn table_accepts_loose_cell_types() {
    let rows = vec![
        json!({ "is_toxic": "True", "toxicity_score": 0.6, "offensive_words": ["jerk"] }),
        json!({ "is_toxic": 0, "toxicity_score": null, "offensive_words": null }),
    ];
    let stats = summarize_table(&rows);
    assert_eq!(stats.total_comments, 2);
    assert_eq!(stats.toxic_comments, 1);
    assert!((stats.avg_toxicity - 0.6).abs() < 1e-9);
    assert_eq!(stats.most_common_offensive_words.get("jerk"), Some(1));
}

// ============================================================
// toxicity_distribution
// ============================================================

#[test]
fn distribution_keeps_input_order_per_column() {
    let results = vec![result(true, 0.9, &[]), result(false, 0.2, &[])];
    let dist = toxicity_distribution(&results);
    assert_eq!(dist.toxicity_score, vec![0.9, 0.2]);
    assert_eq!(dist.severe_toxicity, vec![0.45, 0.1]);
    assert_eq!(dist.insult, vec![0.9, 0.2]);

    let names: Vec<_> = dist.columns().iter().map(|(name, _)| *name).collect();
    assert_eq!(
        names,
        vec!["toxicity_score", "severe_toxicity", "obscene", "threat", "insult", "identity_hate"]
    );
    assert!(dist.columns().iter().all(|(_, values)| values.len() == 2));
}

#[test]
fn distribution_zeroes_non_finite_values() {
    let dist = toxicity_distribution(&[result(false, f64::INFINITY, &[])]);
    assert_eq!(dist.toxicity_score, vec![0.0]);
}
