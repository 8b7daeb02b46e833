//! Request and response bodies for the JSON API

use axum::{
  extract::rejection::JsonRejection,
  http::StatusCode,
  response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::server::models::research::Insight;
use crate::server::models::status::SystemStatus;

// Requests
// ========

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SearchRequest {
  #[serde(default)]
  pub company_name: String,
}

/// Body shared by the category insight and panel insight endpoints
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CategoryInsightRequest {
  #[serde(default)]
  pub insights: Vec<Insight>,
  #[serde(default)]
  pub company_name: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SpeechLineRequest {
  #[serde(default)]
  pub insight: String,
  #[serde(default)]
  pub company_name: String,
  #[serde(default)]
  pub category: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TtsRequest {
  #[serde(default)]
  pub text: String,
}

// Responses
// =========

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryInsightResponse {
  pub insight: String,
  pub category: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PanelInsightResponse {
  pub insight: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SpeechLineResponse {
  pub tts_text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AudioResponse {
  /// Base64-encoded mp3
  pub audio: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct KeyUpdateResponse {
  pub success: bool,
  pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryDeleteResponse {
  pub success: bool,
  pub deleted: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TtsStatus {
  pub available: bool,
  pub last_checked: Option<DateTime<Utc>>,
  pub error: Option<String>,
}

impl From<SystemStatus> for TtsStatus {
  fn from(status: SystemStatus) -> Self {
    Self { available: status.tts_available, last_checked: Some(status.last_checked), error: status.error }
  }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
  /// Whether the document store is reachable
  pub database: bool,
  pub tts: TtsStatus,
  pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
  pub status: String,
  pub version: String,
}

// Errors
// ======

/// Error returned from a handler, rendered as `{"error": message}`
#[derive(Debug)]
pub struct ApiError {
  pub status: StatusCode,
  pub message: String,
}

impl ApiError {
  pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
    Self { status, message: message.into() }
  }

  pub fn bad_request(message: impl Into<String>) -> Self {
    Self::new(StatusCode::BAD_REQUEST, message)
  }

  pub fn payment_required(message: impl Into<String>) -> Self {
    Self::new(StatusCode::PAYMENT_REQUIRED, message)
  }

  pub fn not_found(message: impl Into<String>) -> Self {
    Self::new(StatusCode::NOT_FOUND, message)
  }

  pub fn internal(message: impl Into<String>) -> Self {
    Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
  }

  pub fn service_unavailable(message: impl Into<String>) -> Self {
    Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    (self.status, Json(json!({ "error": self.message }))).into_response()
  }
}

/// Unwrap an extracted JSON body, answering 400 when it could not be parsed
pub fn parse_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
  match payload {
    Ok(Json(body)) => Ok(body),
    Err(rejection) => Err(ApiError::bad_request(format!("Invalid request body: {}", rejection.body_text()))),
  }
}
