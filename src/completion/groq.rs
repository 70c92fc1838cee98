// Groq chat completions client.
//
// Groq exposes an OpenAI-compatible `/chat/completions` endpoint. We send a
// single user message, ask for a JSON-object response, and hand back the
// message content untouched; parsing and validation belong to the
// classifier, not the transport.
//
// API docs: https://console.groq.com/docs/api-reference#chat-create

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::traits::{CompletionClient, CompletionError, CompletionOptions};

pub const DEFAULT_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gemma2-9b-it";

/// Groq API completion client.
pub struct GroqClient {
    client: Client,
    api_key: String,
    model: String,
    api_url: String,
}

impl GroqClient {
    /// Create a client for `model` at `api_url`, authenticating with `api_key`.
    pub fn new(api_key: String, model: String, api_url: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("toxiscan/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_key,
            model,
            api_url,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionClient for GroqClient {
    async fn complete(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<String, CompletionError> {
        let request = build_request(&self.model, prompt, options);

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to call Groq chat completions API")?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::RateLimited(body));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Groq API returned {}: {}", status, body).into());
        }

        let body = response
            .text()
            .await
            .context("Failed to read Groq API response body")?;

        let content = extract_content(&body)?;
        debug!(
            model = %self.model,
            response_len = content.len(),
            "Received completion"
        );
        Ok(content)
    }
}

fn build_request(model: &str, prompt: &str, options: &CompletionOptions) -> ChatRequest {
    ChatRequest {
        model: model.to_string(),
        messages: vec![ChatMessage {
            role: "user".to_string(),
            content: prompt.to_string(),
        }],
        temperature: options.temperature,
        response_format: options.json_mode.then(|| ResponseFormat {
            r#type: "json_object".to_string(),
        }),
    }
}

/// Pull `choices[0].message.content` out of a chat completions response body.
fn extract_content(body: &str) -> Result<String> {
    let response: ChatResponse =
        serde_json::from_str(body).context("Failed to parse Groq API response")?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .context("Groq API response contained no message content")
}

// --- Chat completions request/response types ---

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    r#type: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChatMessageResponse>,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}
