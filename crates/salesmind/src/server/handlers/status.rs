//! Status and health endpoint handlers

use axum::{extract::State, response::Json};
use chrono::Utc;

use crate::server::state::AppState;
use crate::server::types::{HealthResponse, StatusResponse, TtsStatus};

const NOT_CONFIGURED: &str = "Not configured";

/// GET /api/status - Store reachability and last known speech availability
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
  let database = state.database.is_available();

  let stored = state.store().and_then(|store| match store.tts_status() {
    Ok(status) => status,
    Err(e) => {
      tracing::warn!("unable to read speech status: {e}");
      None
    }
  });

  let tts = match stored {
    Some(status) => TtsStatus::from(status),
    None if !state.api_keys().cartesia.is_empty() => {
      TtsStatus { available: true, last_checked: None, error: None }
    }
    None => TtsStatus { available: false, last_checked: None, error: Some(NOT_CONFIGURED.to_string()) },
  };

  Json(StatusResponse { database, tts, timestamp: Utc::now() })
}

/// GET /health - Liveness check
pub async fn health() -> Json<HealthResponse> {
  Json(HealthResponse { status: "healthy".to_string(), version: env!("CARGO_PKG_VERSION").to_string() })
}
