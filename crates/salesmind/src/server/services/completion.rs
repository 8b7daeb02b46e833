//! Chat-completion client for an OpenRouter-compatible API

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Referer sent with attributed requests
pub const APP_REFERER: &str = "https://sales-mind.vercel.app";
/// Title sent with attributed requests
pub const APP_TITLE: &str = "Sales Mind Platform";

#[derive(Error, Debug)]
pub enum CompletionError {
  #[error("completion request failed: {0}")]
  Request(#[from] reqwest::Error),

  #[error("completion API returned {status}: {body}")]
  Status { status: StatusCode, body: String },

  #[error("unable to parse completion response: {0}")]
  Json(#[from] serde_json::Error),

  #[error("completion response contained no choices")]
  NoChoices,

  #[error("completion API key not configured")]
  MissingApiKey,
}

impl CompletionError {
  /// Whether the request never produced an HTTP response
  pub fn is_transport(&self) -> bool {
    matches!(self, CompletionError::Request(e) if e.is_connect() || e.is_timeout() || e.is_request())
  }
}

/// Generation parameters for one call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sampling {
  pub temperature: f64,
  pub max_tokens: u32,
  pub timeout: Duration,
}

impl Sampling {
  pub const fn new(temperature: f64, max_tokens: u32, timeout_secs: u64) -> Self {
    Self { temperature, max_tokens, timeout: Duration::from_secs(timeout_secs) }
  }
}

#[derive(Debug, Clone)]
pub struct CompletionRequest {
  pub model: String,
  pub prompt: String,
  pub sampling: Sampling,
  /// Send the application referer and title headers
  pub attributed: bool,
}

#[derive(Serialize)]
struct ChatPayload<'a> {
  model: &'a str,
  messages: [ChatMessage<'a>; 1],
  temperature: f64,
  max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
  role: &'static str,
  content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
  #[serde(default)]
  choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
  message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
  #[serde(default)]
  content: Option<String>,
}

pub struct CompletionClient {
  http: Client,
  url: String,
  api_key: String,
}

impl CompletionClient {
  pub fn new(http: Client, url: &str, api_key: &str) -> Self {
    Self { http, url: url.to_string(), api_key: api_key.to_string() }
  }

  pub fn has_api_key(&self) -> bool {
    !self.api_key.is_empty()
  }

  /// Send a single-message chat and return the first choice's trimmed content
  pub async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
    if self.api_key.is_empty() {
      return Err(CompletionError::MissingApiKey);
    }

    let payload = ChatPayload {
      model: &request.model,
      messages: [ChatMessage { role: "user", content: &request.prompt }],
      temperature: request.sampling.temperature,
      max_tokens: request.sampling.max_tokens,
    };

    let mut builder = self
      .http
      .post(&self.url)
      .bearer_auth(&self.api_key)
      .json(&payload)
      .timeout(request.sampling.timeout);
    if request.attributed {
      builder = builder.header("HTTP-Referer", APP_REFERER).header("X-Title", APP_TITLE);
    }

    let response = builder.send().await?;
    let status = response.status();
    if status != StatusCode::OK {
      let body = response.text().await.unwrap_or_default();
      return Err(CompletionError::Status { status, body });
    }

    let body = response.text().await?;
    let parsed: ChatResponse = serde_json::from_str(&body)?;
    let choice = parsed.choices.into_iter().next().ok_or(CompletionError::NoChoices)?;

    tracing::debug!(model = %request.model, "completion received");
    Ok(choice.message.content.unwrap_or_default().trim().to_string())
  }
}
