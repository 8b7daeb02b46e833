//! Category insight, panel insight and speech-line handlers

use axum::{
  extract::{rejection::JsonRejection, Extension, Path, State},
  response::Json,
};

use crate::server::middleware::RequestContext;
use crate::server::services::prompts::GuidanceTemplate;
use crate::server::state::AppState;
use crate::server::types::{
  parse_body, ApiError, CategoryInsightRequest, CategoryInsightResponse, PanelInsightResponse, SpeechLineRequest,
  SpeechLineResponse,
};

/// POST /api/insight/{category} - Recommendation condensed into CEO guidance
pub async fn category_insight(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
  Path(category): Path<String>,
  payload: Result<Json<CategoryInsightRequest>, JsonRejection>,
) -> Result<Json<CategoryInsightResponse>, ApiError> {
  let request = parse_body(payload)?;
  tracing::info!(
    request_id = %context.request_id,
    company = %request.company_name,
    category = %category,
    insights = request.insights.len(),
    "generating category guidance"
  );

  let keys = state.api_keys();
  let generator = state.insight_generator(&keys);
  let template = GuidanceTemplate::pick(&mut rand::rng());

  let recommendation = generator.category_recommendation(&category, &request.insights, &request.company_name).await;
  let insight = generator.ceo_guidance(&recommendation, &request.company_name, &category, template).await;

  Ok(Json(CategoryInsightResponse { insight, category }))
}

/// POST /api/panel-insight/{category} - Short business insight for a category panel
pub async fn panel_insight(
  State(state): State<AppState>,
  Path(category): Path<String>,
  payload: Result<Json<CategoryInsightRequest>, JsonRejection>,
) -> Result<Json<PanelInsightResponse>, ApiError> {
  let request = parse_body(payload)?;
  let keys = state.api_keys();
  let insight = state.insight_generator(&keys).panel_insight(&category, &request.insights, &request.company_name).await;

  Ok(Json(PanelInsightResponse { insight }))
}

/// POST /api/ultra-short-tts - One spoken line for the sales team
pub async fn ultra_short_tts(
  State(state): State<AppState>,
  payload: Result<Json<SpeechLineRequest>, JsonRejection>,
) -> Result<Json<SpeechLineResponse>, ApiError> {
  let request = parse_body(payload)?;
  let keys = state.api_keys();
  let tts_text = state
    .insight_generator(&keys)
    .speech_line(&request.insight, &request.company_name, &request.category)
    .await;

  Ok(Json(SpeechLineResponse { tts_text }))
}
