//! Search history handlers

use axum::{
  extract::{Path, State},
  response::Json,
};

use crate::server::models::history::{SearchHistoryEntry, HISTORY_LIMIT};
use crate::server::state::AppState;
use crate::server::types::{ApiError, HistoryDeleteResponse};

/// GET /api/history - Newest searches first; empty without a store
pub async fn list_history(State(state): State<AppState>) -> Json<Vec<SearchHistoryEntry>> {
  let Some(store) = state.store() else {
    return Json(Vec::new());
  };

  match store.recent_history(HISTORY_LIMIT) {
    Ok(entries) => Json(entries),
    Err(e) => {
      tracing::error!("unable to read search history: {e}");
      Json(Vec::new())
    }
  }
}

/// DELETE /api/history/{company_name} - Remove every entry for exactly this name
pub async fn delete_history(
  State(state): State<AppState>,
  Path(company_name): Path<String>,
) -> Result<Json<HistoryDeleteResponse>, ApiError> {
  let store = state.store().ok_or_else(|| ApiError::internal("Failed to delete"))?;

  match store.delete_history(&company_name) {
    Ok(deleted) => {
      tracing::info!(company = %company_name, deleted, "deleted search history");
      Ok(Json(HistoryDeleteResponse { success: true, deleted }))
    }
    Err(e) => {
      tracing::error!("unable to delete search history: {e}");
      Err(ApiError::internal("Failed to delete"))
    }
  }
}
