//! Company search and cached research handlers

use axum::{
  extract::{rejection::JsonRejection, Extension, Path, State},
  response::Json,
};
use chrono::Utc;

use crate::server::middleware::RequestContext;
use crate::server::models::history::SearchHistoryEntry;
use crate::server::models::research::{CachedResearch, ResearchRecord};
use crate::server::state::AppState;
use crate::server::types::{ApiError, SearchRequest};

/// POST /api/search - Research a company, summarize it and record the search
pub async fn search_company(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
  payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<ResearchRecord>, ApiError> {
  let company_name = payload.map(|Json(request)| request.company_name.trim().to_string()).unwrap_or_default();
  if company_name.is_empty() {
    return Err(ApiError::bad_request("Company name is required"));
  }

  tracing::info!(request_id = %context.request_id, company = %company_name, "researching company");

  let keys = state.api_keys();
  let mut record = state.search_client(&keys).company_research(&company_name).await;
  record.ai_analysis = state.insight_generator(&keys).analyze_company(&record).await;

  if let Some(store) = state.store() {
    if let Err(e) = store.insert_history(&SearchHistoryEntry::from_research(&record)) {
      tracing::warn!(request_id = %context.request_id, "unable to record search history: {e}");
    }
    if let Err(e) = store.upsert_research(&record, Utc::now()) {
      tracing::warn!(request_id = %context.request_id, "unable to cache research: {e}");
    }
  }

  Ok(Json(record))
}

/// GET /api/research/{company_name} - Most recent cached research for a company
pub async fn cached_research(
  State(state): State<AppState>,
  Path(company_name): Path<String>,
) -> Result<Json<CachedResearch>, ApiError> {
  let store = state.store().ok_or_else(|| ApiError::service_unavailable("Database not available"))?;

  match store.cached_research(&company_name) {
    Ok(Some(cached)) => Ok(Json(cached)),
    Ok(None) => Err(ApiError::not_found(format!("No research cached for {company_name}"))),
    Err(e) => {
      tracing::error!("unable to read research cache: {e}");
      Err(ApiError::internal("Failed to read research cache"))
    }
  }
}
