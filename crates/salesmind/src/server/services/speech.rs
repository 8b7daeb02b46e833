//! Text-to-speech client for a Cartesia-compatible API

use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::{Client, StatusCode};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

use crate::server::models::clip_chars;

const SPEECH_TIMEOUT: Duration = Duration::from_secs(30);
const API_VERSION: &str = "2024-06-10";
const MODEL_ID: &str = "sonic-2";
const VOICE_ID: &str = "9cd158e5-ad4d-4849-8fe7-3c72fe1598c6";
const SAMPLE_RATE: u32 = 44_100;

/// Longest transcript sent to the provider, in characters
pub const TRANSCRIPT_LIMIT: usize = 2000;

#[derive(Error, Debug)]
pub enum SpeechError {
  #[error("speech request failed: {0}")]
  Request(#[from] reqwest::Error),

  #[error("speech credits exhausted")]
  QuotaExhausted,

  #[error("speech API returned {status}: {body}")]
  Status { status: StatusCode, body: String },

  #[error("nothing to synthesize")]
  EmptyText,

  #[error("speech API key not configured")]
  MissingApiKey,
}

/// Result of a synthesis attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Synthesis {
  /// Base64-encoded mp3
  Audio(String),
  QuotaExhausted,
  Unavailable,
}

pub struct SpeechClient {
  http: Client,
  url: String,
  api_key: String,
}

impl SpeechClient {
  pub fn new(http: Client, url: &str, api_key: &str) -> Self {
    Self { http, url: url.to_string(), api_key: api_key.to_string() }
  }

  pub fn has_api_key(&self) -> bool {
    !self.api_key.is_empty()
  }

  async fn try_synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError> {
    if text.is_empty() {
      return Err(SpeechError::EmptyText);
    }
    if self.api_key.is_empty() {
      return Err(SpeechError::MissingApiKey);
    }

    let payload = json!({
      "model_id": MODEL_ID,
      "transcript": clip_chars(text, TRANSCRIPT_LIMIT),
      "voice": { "mode": "id", "id": VOICE_ID },
      "output_format": { "container": "mp3", "encoding": "mp3", "sample_rate": SAMPLE_RATE }
    });

    let response = self
      .http
      .post(&self.url)
      .header("Cartesia-Version", API_VERSION)
      .header("X-API-Key", &self.api_key)
      .json(&payload)
      .timeout(SPEECH_TIMEOUT)
      .send()
      .await?;

    match response.status() {
      StatusCode::OK => Ok(response.bytes().await?.to_vec()),
      StatusCode::PAYMENT_REQUIRED => Err(SpeechError::QuotaExhausted),
      status => {
        let body = response.text().await.unwrap_or_default();
        Err(SpeechError::Status { status, body })
      }
    }
  }

  /// Render `text` as base64 mp3
  pub async fn synthesize(&self, text: &str) -> Synthesis {
    match self.try_synthesize(text).await {
      Ok(audio) => Synthesis::Audio(STANDARD.encode(audio)),
      Err(SpeechError::QuotaExhausted) => {
        tracing::error!("speech credits exhausted");
        Synthesis::QuotaExhausted
      }
      Err(e @ (SpeechError::EmptyText | SpeechError::MissingApiKey)) => {
        tracing::debug!("speech skipped: {e}");
        Synthesis::Unavailable
      }
      Err(e) => {
        tracing::error!("speech synthesis failed: {e}");
        Synthesis::Unavailable
      }
    }
  }
}
