use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::completion::groq::{DEFAULT_API_URL, DEFAULT_MODEL};

/// Default timeout for a single completion request.
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

/// Central configuration loaded from environment variables.
///
/// The API key comes from the environment (never hardcoded). The .env file
/// is loaded automatically at startup via dotenvy.
#[derive(Debug, Clone)]
pub struct Config {
    pub groq_api_key: String,
    /// Chat completions endpoint (GROQ_API_URL)
    pub api_url: String,
    /// Model id sent with every request (TOXISCAN_MODEL)
    pub model: String,
    /// Per-request timeout (TOXISCAN_HTTP_TIMEOUT_SECS)
    pub http_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A missing API key is not an error here. Commands that call the API
    /// check it with `require_api_key` before doing any work.
    pub fn load() -> Result<Self> {
        let http_timeout_secs = match env::var("TOXISCAN_HTTP_TIMEOUT_SECS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("TOXISCAN_HTTP_TIMEOUT_SECS is not a number: {raw}"))?,
            Err(_) => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        Ok(Self {
            groq_api_key: env::var("GROQ_API_KEY").unwrap_or_default(),
            api_url: env::var("GROQ_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            model: env::var("TOXISCAN_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            http_timeout: Duration::from_secs(http_timeout_secs),
        })
    }

    /// Check that the Groq API key is configured.
    /// Call this before any operation that classifies comments.
    pub fn require_api_key(&self) -> Result<()> {
        if self.groq_api_key.trim().is_empty() {
            anyhow::bail!(
                "GROQ_API_KEY not found in environment variables. Add it to your .env file.\n\
                 See .env.example for the required variables."
            );
        }
        Ok(())
    }
}
