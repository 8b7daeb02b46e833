//! Text-to-speech handler

use axum::{
  extract::{rejection::JsonRejection, Extension, State},
  response::Json,
};

use crate::server::middleware::RequestContext;
use crate::server::models::status::SystemStatus;
use crate::server::services::speech::Synthesis;
use crate::server::state::AppState;
use crate::server::types::{parse_body, ApiError, AudioResponse, TtsRequest};

/// POST /api/tts - Render text as base64 mp3
pub async fn text_to_speech(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
  payload: Result<Json<TtsRequest>, JsonRejection>,
) -> Result<Json<AudioResponse>, ApiError> {
  let request = parse_body(payload)?;
  if request.text.is_empty() {
    return Err(ApiError::bad_request("Text is required"));
  }

  let keys = state.api_keys();
  let speech = state.speech_client(&keys);
  if !speech.has_api_key() {
    tracing::warn!(request_id = %context.request_id, "speech requested without an API key");
    state.record_tts_status(&SystemStatus::tts_not_configured());
    return Err(ApiError::internal("TTS conversion failed"));
  }

  match speech.synthesize(&request.text).await {
    Synthesis::Audio(audio) => {
      state.record_tts_status(&SystemStatus::tts_available());
      Ok(Json(AudioResponse { audio }))
    }
    Synthesis::QuotaExhausted => {
      state.record_tts_status(&SystemStatus::tts_quota_exhausted());
      Err(ApiError::payment_required("TTS credits exhausted"))
    }
    Synthesis::Unavailable => Err(ApiError::internal("TTS conversion failed")),
  }
}
