use axum::{
  body::Body,
  http::{Request, StatusCode},
  Router,
};
use mockito::{Matcher, Server, ServerGuard};
use serde_json::{json, Value};
use std::collections::HashMap;
use tempfile::TempDir;
use tower::ServiceExt;

use salesmind::config::{ProviderEndpoints, ServerConfig};
use salesmind::server::models::history::SearchHistoryEntry;
use salesmind::server::routing::create_router;
use salesmind::server::services::catalog::Catalog;
use salesmind::server::services::store::{Database, Store};
use salesmind::server::state::AppState;

fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
  pairs.iter().map(|(name, value)| (name.to_string(), value.to_string())).collect()
}

fn state(server: &ServerGuard, database: Database, vars: &[(&str, &str)]) -> AppState {
  let config = ServerConfig { endpoints: ProviderEndpoints::local(&server.url()), ..ServerConfig::default() };
  AppState::new(config, Catalog::builtin().unwrap()).unwrap().with_database(database).with_env(env(vars))
}

fn memory_database() -> Database {
  Database::from_store(Store::open_in_memory().unwrap())
}

/// A database whose path sits under a regular file, so it can never open
fn broken_database(temp: &TempDir) -> Database {
  let blocker = temp.path().join("blocker");
  std::fs::write(&blocker, "not a directory").unwrap();
  Database::new(blocker.join("salesmind.db"))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
  Request::builder()
    .method("POST")
    .uri(uri)
    .header("content-type", "application/json")
    .body(Body::from(body.to_string()))
    .unwrap()
}

fn get(uri: &str) -> Request<Body> {
  Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn delete(uri: &str) -> Request<Body> {
  Request::builder().method("DELETE").uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
  let response = app.clone().oneshot(request).await.unwrap();
  let status = response.status();
  let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
  let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
  (status, body)
}

fn completion(content: &str) -> String {
  json!({"choices": [{"message": {"content": content}}]}).to_string()
}

#[tokio::test]
async fn test_search_builds_record_and_records_history() {
  let mut server = Server::new_async().await;
  let organic: Vec<Value> = (0..4)
    .map(|i| json!({"title": format!("Acme result {i}"), "snippet": "Acme Corp expands", "link": "https://example.com"}))
    .collect();
  let search = server
    .mock("POST", "/search")
    .match_header("x-api-key", "serper-key")
    .with_status(200)
    .with_body(json!({ "organic": organic }).to_string())
    .expect(8)
    .create_async()
    .await;
  let news = server
    .mock("POST", "/news")
    .match_body(Matcher::PartialJson(json!({"q": "Acme Corp", "tbs": "qdr:m"})))
    .with_status(200)
    .with_body(json!({"news": [{"title": "Acme raises", "source": "Wire", "date": "1 day ago"}, {"title": "Acme hires"}]}).to_string())
    .create_async()
    .await;
  let llm = server
    .mock("POST", "/chat/completions")
    .match_header("authorization", "Bearer llm-key")
    .with_status(200)
    .with_body(completion("Acme Corp is scaling its cloud footprint."))
    .create_async()
    .await;

  let state = state(
    &server,
    memory_database(),
    &[("SERPER_API_KEY", "serper-key"), ("OPENROUTER_API_KEY", "llm-key")],
  );
  let app = create_router(state);

  let (status, body) = send(&app, post_json("/api/search", json!({"company_name": "  Acme Corp  "}))).await;
  assert_eq!(status, StatusCode::OK);
  search.assert_async().await;
  news.assert_async().await;
  llm.assert_async().await;

  assert_eq!(body["company_name"], "Acme Corp");
  let categories = body["categories"].as_object().unwrap();
  assert_eq!(categories.len(), 8);
  for research in categories.values() {
    assert_eq!(research["insights"].as_array().unwrap().len(), 3);
  }
  assert_eq!(body["categories"]["hiring"]["query"], "\"Acme Corp\" hiring jobs careers");
  assert_eq!(body["latest_news"].as_array().unwrap().len(), 2);
  assert_eq!(body["latest_news"][1]["source"], "Unknown");
  assert_eq!(body["ai_analysis"], "Acme Corp is scaling its cloud footprint.");

  let (status, history) = send(&app, get("/api/history")).await;
  assert_eq!(status, StatusCode::OK);
  let entries = history.as_array().unwrap();
  assert_eq!(entries.len(), 1);
  assert_eq!(entries[0]["company_name"], "Acme Corp");
  assert_eq!(entries[0]["categories"].as_array().unwrap().len(), 8);

  let (status, cached) = send(&app, get("/api/research/Acme%20Corp")).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(cached["company_name"], "Acme Corp");
  assert_eq!(cached["data"]["ai_analysis"], "Acme Corp is scaling its cloud footprint.");
}

#[tokio::test]
async fn test_blank_company_name_is_rejected_without_provider_calls() {
  let mut server = Server::new_async().await;
  let search = server.mock("POST", "/search").expect(0).create_async().await;
  let llm = server.mock("POST", "/chat/completions").expect(0).create_async().await;

  let app = create_router(state(&server, memory_database(), &[("SERPER_API_KEY", "serper-key")]));

  for body in [json!({"company_name": "   "}), json!({}), json!({"company_name": 42})] {
    let (status, response) = send(&app, post_json("/api/search", body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "Company name is required");
  }

  let malformed = Request::builder()
    .method("POST")
    .uri("/api/search")
    .header("content-type", "application/json")
    .body(Body::from("{not json"))
    .unwrap();
  let (status, _) = send(&app, malformed).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  search.assert_async().await;
  llm.assert_async().await;
}

#[tokio::test]
async fn test_category_insight_chains_recommendation_and_guidance() {
  let mut server = Server::new_async().await;
  let recommendation = server
    .mock("POST", "/chat/completions")
    .match_body(Matcher::PartialJson(json!({"temperature": 0.6, "max_tokens": 200})))
    .with_status(200)
    .with_body(completion("Pitch Fosfor for their data estate."))
    .create_async()
    .await;
  let guidance = server
    .mock("POST", "/chat/completions")
    .match_body(Matcher::PartialJson(json!({"temperature": 0.1, "max_tokens": 50})))
    .with_status(200)
    .with_body(completion("Team, Acme needs data help. Pitch Fosfor!"))
    .create_async()
    .await;

  let app = create_router(state(&server, memory_database(), &[("OPENROUTER_API_KEY", "llm-key")]));
  let body = json!({
    "company_name": "Acme",
    "insights": [{"title": "Acme data", "snippet": "Acme struggles with silos", "link": ""}]
  });

  let (status, response) = send(&app, post_json("/api/insight/technology", body)).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(response["insight"], "Team, Acme needs data help. Pitch Fosfor!");
  assert_eq!(response["category"], "technology");
  recommendation.assert_async().await;
  guidance.assert_async().await;
}

#[tokio::test]
async fn test_panel_insight_without_data_is_canned() {
  let mut server = Server::new_async().await;
  let llm = server.mock("POST", "/chat/completions").expect(0).create_async().await;

  let app = create_router(state(&server, memory_database(), &[("OPENROUTER_API_KEY", "llm-key")]));
  let (status, response) =
    send(&app, post_json("/api/panel-insight/financials", json!({"company_name": "Acme", "insights": []}))).await;

  assert_eq!(status, StatusCode::OK);
  assert_eq!(response, json!({"insight": "No data available for financials analysis."}));
  llm.assert_async().await;
}

#[tokio::test]
async fn test_ultra_short_tts_falls_back_without_insight() {
  let mut server = Server::new_async().await;
  let llm = server.mock("POST", "/chat/completions").expect(0).create_async().await;

  let app = create_router(state(&server, memory_database(), &[("OPENROUTER_API_KEY", "llm-key")]));
  let (status, response) = send(
    &app,
    post_json("/api/ultra-short-tts", json!({"insight": "", "company_name": "Acme", "category": "news"})),
  )
  .await;

  assert_eq!(status, StatusCode::OK);
  assert_eq!(response["tts_text"], "Acme benefits from LTIMindtree solutions.");
  llm.assert_async().await;
}

#[tokio::test]
async fn test_tts_quota_exhaustion_marks_speech_unavailable() {
  let mut server = Server::new_async().await;
  let _tts = server.mock("POST", "/tts/bytes").with_status(402).create_async().await;

  let app = create_router(state(&server, memory_database(), &[("CARTESIA_API_KEY", "tts-key")]));

  let (status, response) = send(&app, post_json("/api/tts", json!({"text": "Hello Acme"}))).await;
  assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
  assert_eq!(response["error"], "TTS credits exhausted");

  let (_, status_body) = send(&app, get("/api/status")).await;
  assert_eq!(status_body["database"], true);
  assert_eq!(status_body["tts"]["available"], false);
  assert_eq!(status_body["tts"]["error"], "Credits exhausted");
  assert!(status_body["tts"]["last_checked"].is_string());
}

#[tokio::test]
async fn test_tts_success_returns_audio_and_marks_available() {
  let mut server = Server::new_async().await;
  let _tts = server.mock("POST", "/tts/bytes").with_status(200).with_body(vec![0x49, 0x44, 0x33]).create_async().await;

  let app = create_router(state(&server, memory_database(), &[("CARTESIA_API_KEY", "tts-key")]));

  let (status, response) = send(&app, post_json("/api/tts", json!({"text": "Hello Acme"}))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(response["audio"], "SUQz");

  let (_, status_body) = send(&app, get("/api/status")).await;
  assert_eq!(status_body["tts"]["available"], true);
  assert!(status_body["tts"]["error"].is_null());
}

#[tokio::test]
async fn test_tts_without_key_records_not_configured() {
  let mut server = Server::new_async().await;
  let tts = server.mock("POST", "/tts/bytes").expect(0).create_async().await;

  let app = create_router(state(&server, memory_database(), &[]));

  let (status, response) = send(&app, post_json("/api/tts", json!({"text": "Hello"}))).await;
  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  assert_eq!(response["error"], "TTS conversion failed");

  let (_, status_body) = send(&app, get("/api/status")).await;
  assert_eq!(status_body["tts"]["error"], "API key not configured");
  tts.assert_async().await;
}

#[tokio::test]
async fn test_tts_requires_text() {
  let server = Server::new_async().await;
  let app = create_router(state(&server, memory_database(), &[("CARTESIA_API_KEY", "tts-key")]));

  let (status, response) = send(&app, post_json("/api/tts", json!({}))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(response["error"], "Text is required");
}

#[tokio::test]
async fn test_status_without_record_reflects_configured_key() {
  let server = Server::new_async().await;

  let configured = create_router(state(&server, memory_database(), &[("CARTESIA_API_KEY", "tts-key")]));
  let (_, body) = send(&configured, get("/api/status")).await;
  assert_eq!(body["tts"]["available"], true);
  assert!(body["tts"]["error"].is_null());

  let missing = create_router(state(&server, memory_database(), &[]));
  let (_, body) = send(&missing, get("/api/status")).await;
  assert_eq!(body["tts"]["available"], false);
  assert_eq!(body["tts"]["error"], "Not configured");
}

#[tokio::test]
async fn test_keys_update_and_read_back_masked() {
  let server = Server::new_async().await;
  let app = create_router(state(&server, memory_database(), &[("SONAR_API_KEY", "short")]));

  let (status, response) = send(
    &app,
    post_json(
      "/api/keys",
      json!({"serper": "abcdefghijklmnopqrstuvwxyz", "openrouter": "", "unknown": "ignored"}),
    ),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(response, json!({"success": true, "message": "API keys updated successfully"}));

  let (status, keys) = send(&app, get("/api/keys")).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(keys["serper"], "abcdefgh...wxyz");
  assert_eq!(keys["openrouter"], "");
  assert_eq!(keys["sonar"], "****");
  assert!(keys.get("unknown").is_none());
}

#[tokio::test]
async fn test_keys_update_with_nothing_to_store_fails() {
  let server = Server::new_async().await;
  let app = create_router(state(&server, memory_database(), &[]));

  let (status, response) = send(&app, post_json("/api/keys", json!({"serper": ""}))).await;
  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  assert_eq!(response["error"], "Failed to update keys");
}

#[tokio::test]
async fn test_history_delete_removes_only_exact_name() {
  let server = Server::new_async().await;
  let state = state(&server, memory_database(), &[]);
  let store = state.store().unwrap();
  let now = chrono::Utc::now();
  for name in ["Acme", "Acme", "Acme Corp"] {
    store.insert_history(&SearchHistoryEntry::new(name, now, Vec::new())).unwrap();
  }
  let app = create_router(state.clone());

  let (status, response) = send(&app, delete("/api/history/Acme")).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(response, json!({"success": true, "deleted": 2}));

  let (_, history) = send(&app, get("/api/history")).await;
  let entries = history.as_array().unwrap();
  assert_eq!(entries.len(), 1);
  assert_eq!(entries[0]["company_name"], "Acme Corp");
}

#[tokio::test]
async fn test_unavailable_store_degrades_every_data_path() {
  let temp = TempDir::new().unwrap();
  let mut server = Server::new_async().await;
  let llm = server.mock("POST", "/chat/completions").expect(0).create_async().await;

  let app = create_router(state(&server, broken_database(&temp), &[]));

  let (status, body) = send(&app, get("/api/status")).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["database"], false);
  assert_eq!(body["tts"]["error"], "Not configured");

  let (status, body) = send(&app, get("/api/history")).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!([]));

  let (status, _) = send(&app, delete("/api/history/Acme")).await;
  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

  let (status, _) = send(&app, get("/api/research/Acme")).await;
  assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

  let (status, body) = send(&app, post_json("/api/keys", json!({"serper": "new-key"}))).await;
  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  assert_eq!(body["error"], "Failed to update keys");

  // Searching still works, with every provider skipped for lack of keys
  let (status, body) = send(&app, post_json("/api/search", json!({"company_name": "Acme"}))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["categories"].as_object().unwrap().len(), 8);
  assert!(body["ai_analysis"].as_str().unwrap().contains("Acme"));
  llm.assert_async().await;
}

#[tokio::test]
async fn test_missing_cached_research_is_not_found() {
  let server = Server::new_async().await;
  let app = create_router(state(&server, memory_database(), &[]));

  let (status, body) = send(&app, get("/api/research/Globex")).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert!(body["error"].as_str().unwrap().contains("Globex"));
}

#[tokio::test]
async fn test_health_reports_version_and_request_id() {
  let server = Server::new_async().await;
  let app = create_router(state(&server, memory_database(), &[]));

  let response = app.clone().oneshot(get("/health")).await.unwrap();
  assert_eq!(response.status(), StatusCode::OK);
  assert!(response.headers().contains_key("x-request-id"));

  let (_, body) = send(&app, get("/health")).await;
  assert_eq!(body["status"], "healthy");
  assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}
