// Result records produced by the classifier.
//
// Every comment yields exactly one ClassificationResult. A failed
// classification still produces a fully populated record (zeroed scores,
// explanation carrying the failure) so consumers never see a gap.

use serde::{Deserialize, Serialize};

/// Prefix that marks the explanation of a degraded result.
pub const DEGRADED_PREFIX: &str = "Analysis Error: ";

/// Names of the six numeric score columns, in field order.
pub const SCORE_FIELDS: [&str; 6] = [
    "toxicity_score",
    "severe_toxicity",
    "obscene",
    "threat",
    "insult",
    "identity_hate",
];

/// The verdict for a single comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Original comment text, exactly as submitted
    pub comment: String,
    /// Normalized text (lower-cased, URLs and punctuation stripped)
    pub cleaned_comment: String,
    pub is_toxic: bool,
    pub toxicity_score: f64,
    pub severe_toxicity: f64,
    pub obscene: f64,
    pub threat: f64,
    pub insult: f64,
    pub identity_hate: f64,
    pub offensive_words: Vec<String>,
    /// Model commentary, or the failure reason for a degraded result
    pub explanation: String,
}

impl ClassificationResult {
    /// Build the degraded placeholder for a comment whose classification failed.
    pub fn degraded(comment: &str, cleaned_comment: String, reason: &str) -> Self {
        Self {
            comment: comment.to_string(),
            cleaned_comment,
            is_toxic: false,
            toxicity_score: 0.0,
            severe_toxicity: 0.0,
            obscene: 0.0,
            threat: 0.0,
            insult: 0.0,
            identity_hate: 0.0,
            offensive_words: Vec::new(),
            explanation: format!("{DEGRADED_PREFIX}{reason}"),
        }
    }

    /// Merge a validated model verdict with the comment it describes.
    pub fn from_verdict(comment: &str, cleaned_comment: String, verdict: Verdict) -> Self {
        Self {
            comment: comment.to_string(),
            cleaned_comment,
            is_toxic: verdict.is_toxic,
            toxicity_score: verdict.toxicity_score,
            severe_toxicity: verdict.severe_toxicity,
            obscene: verdict.obscene,
            threat: verdict.threat,
            insult: verdict.insult,
            identity_hate: verdict.identity_hate,
            offensive_words: verdict.offensive_words,
            explanation: verdict.explanation,
        }
    }

    /// True if this record stands in for a failed classification.
    ///
    /// Detection is by the `DEGRADED_PREFIX` on the explanation alone, so a
    /// genuine model explanation that happens to start with that text is
    /// also reported as degraded.
    pub fn is_degraded(&self) -> bool {
        self.explanation.starts_with(DEGRADED_PREFIX)
    }

    /// The six scores in `SCORE_FIELDS` order.
    pub fn scores(&self) -> [f64; 6] {
        [
            self.toxicity_score,
            self.severe_toxicity,
            self.obscene,
            self.threat,
            self.insult,
            self.identity_hate,
        ]
    }
}

/// The nine fields the model is asked to return.
///
/// Scores are taken verbatim; nothing here clamps or rounds them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Verdict {
    pub is_toxic: bool,
    pub toxicity_score: f64,
    pub severe_toxicity: f64,
    pub obscene: f64,
    pub threat: f64,
    pub insult: f64,
    pub identity_hate: f64,
    pub offensive_words: Vec<String>,
    pub explanation: String,
}

impl Verdict {
    /// Keys that must be present in the model's JSON object.
    pub const REQUIRED_KEYS: [&'static str; 9] = [
        "is_toxic",
        "toxicity_score",
        "severe_toxicity",
        "obscene",
        "threat",
        "insult",
        "identity_hate",
        "offensive_words",
        "explanation",
    ];
}
