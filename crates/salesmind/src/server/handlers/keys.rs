//! API key handlers

use axum::{
  extract::{rejection::JsonRejection, Extension, State},
  response::Json,
};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::server::middleware::RequestContext;
use crate::server::models::api_keys::ApiKeyUpdate;
use crate::server::state::AppState;
use crate::server::types::{ApiError, KeyUpdateResponse};

const UPDATE_FAILED: &str = "Failed to update keys";

/// GET /api/keys - Every key, masked
pub async fn get_keys(State(state): State<AppState>) -> Json<BTreeMap<&'static str, String>> {
  Json(state.api_keys().masked())
}

/// POST /api/keys - Partial update; empty values and unknown providers are ignored
pub async fn update_keys(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
  payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<Json<KeyUpdateResponse>, ApiError> {
  let update = payload.map(|Json(fields)| ApiKeyUpdate::from_fields(&fields)).unwrap_or_default();

  let Some(store) = state.store() else {
    return Err(ApiError::internal(UPDATE_FAILED));
  };
  if update.is_empty() {
    return Err(ApiError::internal(UPDATE_FAILED));
  }

  match store.update_api_keys(&update) {
    Ok(_) => {
      let providers: Vec<&str> = update.providers().iter().map(|provider| provider.field_name()).collect();
      tracing::info!(request_id = %context.request_id, ?providers, "updated API keys");
      Ok(Json(KeyUpdateResponse { success: true, message: "API keys updated successfully".to_string() }))
    }
    Err(e) => {
      tracing::error!(request_id = %context.request_id, "unable to update API keys: {e}");
      Err(ApiError::internal(UPDATE_FAILED))
    }
  }
}
