// Completion client trait: the swap-ready abstraction.
//
// The classifier only needs "send a prompt, get text back", plus the ability
// to tell a rate-limit rejection apart from every other failure.

use async_trait::async_trait;
use thiserror::Error;

/// Sampling and response-format options for a completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionOptions {
    pub temperature: f32,
    /// Ask the provider to constrain output to a single JSON object
    pub json_mode: bool,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            json_mode: true,
        }
    }
}

/// Why a completion call did not produce text.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// The provider rejected the call for exceeding its rate limit.
    #[error("rate limited: {0}")]
    RateLimited(String),
    /// Network, auth, malformed request, or any other provider failure.
    #[error(transparent)]
    Failure(#[from] anyhow::Error),
}

/// Trait for a hosted completion API. Async because every real provider is
/// an HTTP call.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send a single-turn prompt and return the raw message content.
    async fn complete(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<String, CompletionError>;
}
