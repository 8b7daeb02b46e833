//! Axum router configuration for all endpoints

use axum::{
  middleware,
  routing::{delete, get, post},
  Router,
};

use crate::server::handlers::{history, insights, keys, research, speech, status};
use crate::server::middleware::request_context_middleware;
use crate::server::state::AppState;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
  Router::new()
    // Health and status endpoints
    .route("/health", get(status::health))
    .route("/api/status", get(status::status))
    // Research endpoints
    .route("/api/search", post(research::search_company))
    .route("/api/research/{company_name}", get(research::cached_research))
    // Insight endpoints
    .route("/api/insight/{category}", post(insights::category_insight))
    .route("/api/panel-insight/{category}", post(insights::panel_insight))
    .route("/api/ultra-short-tts", post(insights::ultra_short_tts))
    // Speech
    .route("/api/tts", post(speech::text_to_speech))
    // Credentials
    .route("/api/keys", get(keys::get_keys).post(keys::update_keys))
    // History
    .route("/api/history", get(history::list_history))
    .route("/api/history/{company_name}", delete(history::delete_history))
    .layer(middleware::from_fn(request_context_middleware))
    .with_state(state)
}
