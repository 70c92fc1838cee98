// Comment classification: one throttled LLM call per comment.
//
// LlmClassifier never fails: malformed output, rate limiting and provider
// errors all turn into a degraded ClassificationResult so the batch keeps
// its one-result-per-comment shape. The CommentClassifier trait still
// returns a Result so the pipeline driver has a channel for unexpected
// errors from other implementations.

pub mod clean;
pub mod prompt;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use tokio::time::Duration;
use tracing::{debug, warn};

use crate::completion::throttle::Throttle;
use crate::completion::traits::{CompletionClient, CompletionError, CompletionOptions};
use crate::models::{ClassificationResult, Verdict};
use crate::output::truncate_chars;

use self::clean::clean_comment;
use self::prompt::build_prompt;

/// Extra pause after the provider reports a rate limit.
pub const RATE_LIMIT_PAUSE: Duration = Duration::from_secs(10);

/// Trait for classifying a single comment.
#[async_trait]
pub trait CommentClassifier: Send + Sync {
    /// Classify one comment. An `Err` means something unexpected went wrong
    /// and the batch should stop.
    async fn classify(&self, comment: &str) -> Result<ClassificationResult>;
}

/// Classifier backed by a hosted completion API.
pub struct LlmClassifier {
    client: Arc<dyn CompletionClient>,
    throttle: Throttle,
    options: CompletionOptions,
    rate_limit_pause: Duration,
}

impl LlmClassifier {
    /// Create a classifier that paces its calls through `throttle`.
    pub fn new(client: Arc<dyn CompletionClient>, throttle: Throttle) -> Self {
        Self {
            client,
            throttle,
            options: CompletionOptions::default(),
            rate_limit_pause: RATE_LIMIT_PAUSE,
        }
    }

    /// Override the pause taken after a rate-limit rejection.
    pub fn with_rate_limit_pause(mut self, pause: Duration) -> Self {
        self.rate_limit_pause = pause;
        self
    }

    async fn classify_comment(&self, comment: &str) -> ClassificationResult {
        self.throttle.wait_if_needed().await;

        let cleaned = clean_comment(comment);
        let prompt = build_prompt(comment);

        let content = match self.client.complete(&prompt, &self.options).await {
            Ok(content) => content,
            Err(CompletionError::RateLimited(detail)) => {
                warn!(
                    detail = %detail,
                    pause_secs = self.rate_limit_pause.as_secs(),
                    "Rate limit reached, pausing before next comment"
                );
                tokio::time::sleep(self.rate_limit_pause).await;
                let reason = format!(
                    "Rate limit hit, waited {}s.",
                    self.rate_limit_pause.as_secs()
                );
                return ClassificationResult::degraded(comment, cleaned, &reason);
            }
            Err(CompletionError::Failure(e)) => {
                warn!(
                    error = %e,
                    comment_preview = %truncate_chars(comment, 100),
                    "Error analyzing comment"
                );
                return ClassificationResult::degraded(comment, cleaned, &format!("{e:#}"));
            }
        };

        match parse_verdict(&content) {
            Ok(verdict) => {
                debug!(
                    is_toxic = verdict.is_toxic,
                    toxicity = verdict.toxicity_score,
                    comment_preview = %truncate_chars(comment, 50),
                    "Classified comment"
                );
                ClassificationResult::from_verdict(comment, cleaned, verdict)
            }
            Err(reason) => {
                warn!(
                    reason = %reason,
                    response = %truncate_chars(&content, 200),
                    "Model returned an unusable verdict"
                );
                ClassificationResult::degraded(comment, cleaned, &reason)
            }
        }
    }
}

#[async_trait]
impl CommentClassifier for LlmClassifier {
    async fn classify(&self, comment: &str) -> Result<ClassificationResult> {
        Ok(self.classify_comment(comment).await)
    }
}

/// Parse and validate the model's raw output.
///
/// The error string is the human-readable reason that ends up in the
/// degraded result's explanation.
pub fn parse_verdict(content: &str) -> std::result::Result<Verdict, String> {
    let value: Value = serde_json::from_str(content)
        .map_err(|e| format!("Failed to parse API JSON response: {e}"))?;

    let Some(object) = value.as_object() else {
        return Err("API response is not a JSON object".to_string());
    };

    let missing: Vec<&str> = Verdict::REQUIRED_KEYS
        .iter()
        .copied()
        .filter(|key| !object.contains_key(*key))
        .collect();
    if !missing.is_empty() {
        return Err(format!(
            "API response missing required keys: {}",
            missing.join(", ")
        ));
    }

    serde_json::from_value(value).map_err(|e| format!("API response has invalid field types: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD: &str = r#"{
        "is_toxic": true,
        "toxicity_score": 0.92,
        "severe_toxicity": 0.4,
        "obscene": 0.1,
        "threat": 0.0,
        "insult": 0.88,
        "identity_hate": 0.0,
        "offensive_words": ["idiot"],
        "explanation": "Direct insult."
    }"#;

    #[test]
    fn test_parse_valid_verdict() {
        let verdict = parse_verdict(GOOD).unwrap();
        assert!(verdict.is_toxic);
        assert_eq!(verdict.toxicity_score, 0.92);
        assert_eq!(verdict.offensive_words, vec!["idiot".to_string()]);
    }

    #[test]
    fn test_parse_keeps_out_of_range_scores() {
        let raw = GOOD.replace("0.92", "1.7");
        let verdict = parse_verdict(&raw).unwrap();
        assert_eq!(verdict.toxicity_score, 1.7);
    }

    #[test]
    fn test_parse_accepts_integer_scores() {
        let raw = GOOD.replace("0.92", "1");
        assert_eq!(parse_verdict(&raw).unwrap().toxicity_score, 1.0);
    }

    #[test]
    fn test_parse_rejects_non_json() {
        let err = parse_verdict("Sure! Here is the analysis:").unwrap_err();
        assert!(err.starts_with("Failed to parse API JSON response"));
    }

    #[test]
    fn test_parse_rejects_json_array() {
        let err = parse_verdict("[1, 2, 3]").unwrap_err();
        assert!(err.contains("not a JSON object"));
    }

    #[test]
    fn test_parse_names_missing_keys() {
        let err = parse_verdict(r#"{"is_toxic": false, "toxicity_score": 0.1}"#).unwrap_err();
        assert!(err.contains("missing required keys"));
        assert!(err.contains("explanation"));
        assert!(err.contains("offensive_words"));
        assert!(!err.contains("toxicity_score,"));
    }

    #[test]
    fn test_parse_rejects_wrong_types() {
        let raw = GOOD.replace("true", "\"yes\"");
        let err = parse_verdict(&raw).unwrap_err();
        assert!(err.contains("invalid field types"));
    }
}
