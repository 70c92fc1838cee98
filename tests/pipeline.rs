// Pipeline tests: classifier + throttle + batch driver with scripted fakes.
//
// No network and no real waiting. The completion client is a scripted fake
// that records when each call started, and every test runs on tokio's
// paused clock so throttle and rate-limit pauses complete instantly while
// still advancing time.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use async_trait::async_trait;
use serde_json::json;
use tokio::time::{Duration, Instant};

use toxiscan::classifier::{CommentClassifier, LlmClassifier};
use toxiscan::completion::throttle::{Throttle, REQUEST_INTERVAL};
use toxiscan::completion::traits::{CompletionClient, CompletionError, CompletionOptions};
use toxiscan::models::{ClassificationResult, DEGRADED_PREFIX};
use toxiscan::pipeline::batch::process_all;
use toxiscan::pipeline::progress::{NoopProgress, ProgressObserver};

// ============================================================
// Fakes
// ============================================================

type Reply = Result<String, CompletionError>;

/// Completion client that replays a script and records call start times.
/// Once the script runs out it answers with a clean verdict.
#[derive(Default)]
struct ScriptedClient {
    replies: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<Instant>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedClient {
    fn with_replies(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            ..Self::default()
        }
    }

    fn call_starts(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(&self, prompt: &str, options: &CompletionOptions) -> Reply {
        assert!(options.json_mode);
        self.calls.lock().unwrap().push(Instant::now());
        self.prompts.lock().unwrap().push(prompt.to_string());
        let next = self.replies.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(verdict(false, 0.05, &[])))
    }
}

fn verdict(is_toxic: bool, score: f64, words: &[&str]) -> String {
    json!({
        "is_toxic": is_toxic,
        "toxicity_score": score,
        "severe_toxicity": score / 4.0,
        "obscene": 0.0,
        "threat": 0.0,
        "insult": score,
        "identity_hate": 0.0,
        "offensive_words": words,
        "explanation": "scripted"
    })
    .to_string()
}

fn comments(texts: &[&str]) -> Vec<String> {
    texts.iter().map(|t| t.to_string()).collect()
}

fn assert_zeroed(r: &ClassificationResult) {
    assert!(!r.is_toxic);
    assert_eq!(r.scores(), [0.0; 6]);
    assert!(r.offensive_words.is_empty());
    assert!(r.is_degraded());
}

/// Classifier that fails (or panics) on one item and answers the rest.
struct FailingOn {
    index: usize,
    panic: bool,
    seen: Mutex<usize>,
}

#[async_trait]
impl CommentClassifier for FailingOn {
    async fn classify(&self, comment: &str) -> anyhow::Result<ClassificationResult> {
        let n = {
            let mut seen = self.seen.lock().unwrap();
            *seen += 1;
            *seen
        };
        if n == self.index {
            if self.panic {
                panic!("classifier blew up on item {n}");
            }
            return Err(anyhow!("socket closed unexpectedly"));
        }
        Ok(ClassificationResult::degraded(comment, comment.to_string(), "n/a"))
    }
}

#[derive(Default)]
struct RecordingProgress {
    updates: Mutex<Vec<(usize, usize)>>,
    halted: Mutex<Option<(usize, String)>>,
}

impl ProgressObserver for RecordingProgress {
    fn on_progress(&self, processed: usize, total: usize) {
        self.updates.lock().unwrap().push((processed, total));
    }

    fn on_halted(&self, processed: usize, error: &str) {
        *self.halted.lock().unwrap() = Some((processed, error.to_string()));
    }
}

// ============================================================
// Batch shape
// ============================================================

#[tokio::test(start_paused = true)]
async fn one_result_per_comment_in_input_order() {
    let client = Arc::new(ScriptedClient::with_replies(vec![
        Ok(verdict(true, 0.9, &["idiot"])),
        Ok(verdict(false, 0.1, &[])),
        Ok(verdict(true, 0.7, &["fool"])),
    ]));
    let classifier = LlmClassifier::new(client.clone(), Throttle::default());
    let input = comments(&["You IDIOT!", "nice post", "what a fool"]);
    let progress = RecordingProgress::default();

    let results = process_all(&classifier, &input, &progress).await;

    assert_eq!(results.len(), 3);
    let originals: Vec<_> = results.iter().map(|r| r.comment.as_str()).collect();
    assert_eq!(originals, vec!["You IDIOT!", "nice post", "what a fool"]);
    assert_eq!(results[0].cleaned_comment, "you idiot");
    assert!(results[0].is_toxic);
    assert_eq!(results[0].offensive_words, vec!["idiot".to_string()]);
    assert_eq!(results[0].explanation, "scripted");
    assert!(!results[1].is_toxic);

    assert_eq!(
        *progress.updates.lock().unwrap(),
        vec![(1, 3), (2, 3), (3, 3)]
    );
    assert!(progress.halted.lock().unwrap().is_none());
}

#[tokio::test(start_paused = true)]
async fn prompt_carries_the_raw_comment() {
    let client = Arc::new(ScriptedClient::default());
    let classifier = LlmClassifier::new(client.clone(), Throttle::default());

    classifier.classify("Check http://x.co NOW!!").await.unwrap();

    let prompts = client.prompts.lock().unwrap();
    assert!(prompts[0].contains("Check http://x.co NOW!!"));
}

#[tokio::test(start_paused = true)]
async fn empty_batch_makes_no_calls() {
    let client = Arc::new(ScriptedClient::default());
    let classifier = LlmClassifier::new(client.clone(), Throttle::default());

    let results = process_all(&classifier, &[], &NoopProgress).await;

    assert!(results.is_empty());
    assert!(client.call_starts().is_empty());
}

// ============================================================
// Throttle spacing
// ============================================================

#[tokio::test(start_paused = true)]
async fn call_starts_are_spaced_by_request_interval() {
    let client = Arc::new(ScriptedClient::default());
    let classifier = LlmClassifier::new(client.clone(), Throttle::default());
    let input = comments(&["a", "b", "c", "d"]);
    let start = Instant::now();

    process_all(&classifier, &input, &NoopProgress).await;

    let starts = client.call_starts();
    assert_eq!(starts.len(), 4);
    assert_eq!(starts[0], start);
    for pair in starts.windows(2) {
        assert!(pair[1] - pair[0] >= REQUEST_INTERVAL);
    }
}

#[tokio::test(start_paused = true)]
async fn shared_throttle_spaces_separate_classifiers() {
    let client = Arc::new(ScriptedClient::default());
    let throttle = Throttle::default();
    let first = LlmClassifier::new(client.clone(), throttle.clone());
    let second = LlmClassifier::new(client.clone(), throttle);

    first.classify("one").await.unwrap();
    second.classify("two").await.unwrap();

    let starts = client.call_starts();
    assert!(starts[1] - starts[0] >= REQUEST_INTERVAL);
}

// ============================================================
// Degraded results
// ============================================================

#[tokio::test(start_paused = true)]
async fn malformed_json_degrades_without_failing() {
    let client = Arc::new(ScriptedClient::with_replies(vec![Ok(
        "Sure! Here is the analysis: {not json".to_string(),
    )]));
    let classifier = LlmClassifier::new(client, Throttle::default());

    let result = classifier.classify("hello there").await.unwrap();

    assert_zeroed(&result);
    assert_eq!(result.comment, "hello there");
    assert_eq!(result.cleaned_comment, "hello there");
    assert!(result
        .explanation
        .starts_with("Analysis Error: Failed to parse API JSON response"));
}

#[tokio::test(start_paused = true)]
async fn missing_keys_degrade_and_name_the_keys() {
    let reply = json!({ "is_toxic": true, "toxicity_score": 0.9 }).to_string();
    let client = Arc::new(ScriptedClient::with_replies(vec![Ok(reply)]));
    let classifier = LlmClassifier::new(client, Throttle::default());

    let result = classifier.classify("x").await.unwrap();

    assert_zeroed(&result);
    assert!(result.explanation.contains("missing required keys"));
    assert!(result.explanation.contains("offensive_words"));
}

#[tokio::test(start_paused = true)]
async fn rate_limit_pauses_then_degrades() {
    let client = Arc::new(ScriptedClient::with_replies(vec![Err(
        CompletionError::RateLimited("slow down".to_string()),
    )]));
    let classifier = LlmClassifier::new(client.clone(), Throttle::default());
    let input = comments(&["first", "second"]);
    let start = Instant::now();

    let results = process_all(&classifier, &input, &NoopProgress).await;

    // The rate-limited comment is not retried; the batch moves on.
    assert_eq!(results.len(), 2);
    assert_zeroed(&results[0]);
    assert_eq!(
        results[0].explanation,
        format!("{DEGRADED_PREFIX}Rate limit hit, waited 10s.")
    );
    assert!(!results[1].is_degraded());
    assert_eq!(client.call_starts().len(), 2);
    assert!(Instant::now() - start >= Duration::from_secs(10));
}

#[tokio::test(start_paused = true)]
async fn rate_limit_pause_is_configurable() {
    let client = Arc::new(ScriptedClient::with_replies(vec![Err(
        CompletionError::RateLimited(String::new()),
    )]));
    let classifier = LlmClassifier::new(client, Throttle::new(Duration::ZERO))
        .with_rate_limit_pause(Duration::from_secs(2));
    let start = Instant::now();

    let result = classifier.classify("x").await.unwrap();

    assert_eq!(
        result.explanation,
        format!("{DEGRADED_PREFIX}Rate limit hit, waited 2s.")
    );
    let waited = Instant::now() - start;
    assert!(waited >= Duration::from_secs(2) && waited < Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn provider_failure_message_lands_in_explanation() {
    let client = Arc::new(ScriptedClient::with_replies(vec![Err(
        CompletionError::Failure(anyhow!("Groq API returned 500 Internal Server Error: boom")),
    )]));
    let classifier = LlmClassifier::new(client, Throttle::default());

    let result = classifier.classify("x").await.unwrap();

    assert_zeroed(&result);
    assert_eq!(
        result.explanation,
        "Analysis Error: Groq API returned 500 Internal Server Error: boom"
    );
}

#[tokio::test(start_paused = true)]
async fn every_failure_mode_keeps_batch_length() {
    let client = Arc::new(ScriptedClient::with_replies(vec![
        Ok("[]".to_string()),
        Err(CompletionError::Failure(anyhow!("connection reset"))),
        Ok(verdict(true, 0.8, &["jerk"])),
        Ok(json!({ "is_toxic": "yes" }).to_string()),
        Err(CompletionError::RateLimited("429".to_string())),
    ]));
    let classifier = LlmClassifier::new(client, Throttle::default());
    let input = comments(&["1", "2", "3", "4", "5"]);

    let results = process_all(&classifier, &input, &NoopProgress).await;

    assert_eq!(results.len(), 5);
    let degraded: Vec<_> = results.iter().map(|r| r.is_degraded()).collect();
    assert_eq!(degraded, vec![true, true, false, true, true]);
}

// ============================================================
// Halted batches
// ============================================================

#[tokio::test]
async fn loop_error_returns_completed_prefix() {
    let classifier = FailingOn {
        index: 3,
        panic: false,
        seen: Mutex::new(0),
    };
    let input = comments(&["a", "b", "c", "d", "e"]);
    let progress = RecordingProgress::default();

    let results = process_all(&classifier, &input, &progress).await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].comment, "a");
    assert_eq!(results[1].comment, "b");
    let halted = progress.halted.lock().unwrap().clone();
    assert_eq!(
        halted,
        Some((2, "socket closed unexpectedly".to_string()))
    );
}

#[tokio::test]
async fn panicking_classifier_returns_completed_prefix() {
    let classifier = FailingOn {
        index: 3,
        panic: true,
        seen: Mutex::new(0),
    };
    let input = comments(&["a", "b", "c", "d", "e"]);
    let progress = RecordingProgress::default();

    let results = process_all(&classifier, &input, &progress).await;

    assert_eq!(results.len(), 2);
    let (processed, message) = progress.halted.lock().unwrap().clone().unwrap();
    assert_eq!(processed, 2);
    assert!(message.contains("blew up on item 3"));
}

#[tokio::test]
async fn failure_on_first_item_returns_empty() {
    let classifier = FailingOn {
        index: 1,
        panic: false,
        seen: Mutex::new(0),
    };
    let results = process_all(&classifier, &comments(&["a", "b"]), &NoopProgress).await;
    assert!(results.is_empty());
}
