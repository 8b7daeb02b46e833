//! Web and news search client
//!
//! Talks to a Serper-compatible API. Every failure is soft: the caller gets an
//! empty result and a warning is logged, so one bad category never sinks a
//! whole research brief.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::server::models::research::{
  truncate_snippet, Category, CategoryResearch, Insight, NewsItem, ResearchRecord,
};

const SEARCH_TIMEOUT: Duration = Duration::from_secs(30);
const RESULTS_PER_QUERY: u32 = 10;
const NEWS_WINDOW: &str = "qdr:m";
const INSIGHTS_PER_CATEGORY: usize = 3;
const NEWS_ITEMS: usize = 5;

#[derive(Error, Debug)]
pub enum SearchError {
  #[error("search request failed: {0}")]
  Request(#[from] reqwest::Error),

  #[error("search API returned {status}: {body}")]
  Status { status: StatusCode, body: String },

  #[error("unable to parse search response: {0}")]
  Json(#[from] serde_json::Error),

  #[error("search API key not configured")]
  MissingApiKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
  Search,
  News,
}

impl SearchKind {
  fn path(&self) -> &'static str {
    match self {
      SearchKind::Search => "search",
      SearchKind::News => "news",
    }
  }
}

#[derive(Debug, Serialize)]
struct SearchPayload<'a> {
  q: &'a str,
  num: u32,
  #[serde(skip_serializing_if = "Option::is_none")]
  tbs: Option<&'static str>,
}

/// Raw provider response; only the lists this service reads are kept
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResult {
  #[serde(default)]
  pub organic: Vec<SearchHit>,
  #[serde(default)]
  pub news: Vec<SearchHit>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchHit {
  pub title: Option<String>,
  pub snippet: Option<String>,
  pub link: Option<String>,
  pub source: Option<String>,
  pub date: Option<String>,
}

impl SearchHit {
  fn to_insight(&self) -> Insight {
    Insight {
      title: self.title.clone().unwrap_or_else(|| "N/A".to_string()),
      snippet: truncate_snippet(self.snippet.as_deref().unwrap_or("N/A")),
      link: self.link.clone().unwrap_or_default(),
    }
  }

  fn to_news_item(&self) -> NewsItem {
    NewsItem {
      title: self.title.clone().unwrap_or_else(|| "N/A".to_string()),
      snippet: truncate_snippet(self.snippet.as_deref().unwrap_or("N/A")),
      source: self.source.clone().unwrap_or_else(|| "Unknown".to_string()),
      date: self.date.clone().unwrap_or_else(|| "N/A".to_string()),
      link: self.link.clone().unwrap_or_default(),
    }
  }
}

pub struct SearchClient {
  http: Client,
  base_url: String,
  api_key: String,
}

impl SearchClient {
  pub fn new(http: Client, base_url: &str, api_key: &str) -> Self {
    Self { http, base_url: base_url.trim_end_matches('/').to_string(), api_key: api_key.to_string() }
  }

  async fn try_search(&self, query: &str, kind: SearchKind) -> Result<SearchResult, SearchError> {
    if self.api_key.is_empty() {
      return Err(SearchError::MissingApiKey);
    }

    let url = format!("{}/{}", self.base_url, kind.path());
    let payload = SearchPayload {
      q: query,
      num: RESULTS_PER_QUERY,
      tbs: (kind == SearchKind::News).then_some(NEWS_WINDOW),
    };

    let response = self
      .http
      .post(&url)
      .header("X-API-KEY", &self.api_key)
      .json(&payload)
      .timeout(SEARCH_TIMEOUT)
      .send()
      .await?;

    match response.status() {
      StatusCode::OK => {
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
      }
      status => {
        let body = response.text().await.unwrap_or_default();
        Err(SearchError::Status { status, body })
      }
    }
  }

  /// Run one query, returning an empty result on any failure
  pub async fn search(&self, query: &str, kind: SearchKind) -> SearchResult {
    match self.try_search(query, kind).await {
      Ok(result) => result,
      Err(SearchError::MissingApiKey) => {
        tracing::debug!(query, "skipping search, no API key configured");
        SearchResult::default()
      }
      Err(e) => {
        tracing::warn!(query, "search failed: {e}");
        SearchResult::default()
      }
    }
  }

  /// Query every research category, then the latest news
  pub async fn company_research(&self, company_name: &str) -> ResearchRecord {
    let mut record = ResearchRecord::new(company_name);

    for category in Category::ALL {
      let query = category.query_for(company_name);
      let result = self.search(&query, SearchKind::Search).await;
      let insights =
        result.organic.iter().take(INSIGHTS_PER_CATEGORY).map(SearchHit::to_insight).collect();
      record.categories.insert(category, CategoryResearch { query, insights });
    }

    let news = self.search(company_name, SearchKind::News).await;
    record.latest_news = news.news.iter().take(NEWS_ITEMS).map(SearchHit::to_news_item).collect();

    tracing::info!(
      company = company_name,
      news = record.latest_news.len(),
      "collected research for {} categories",
      record.categories.len()
    );
    record
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use mockito::{Matcher, Server};
  use serde_json::json;

  fn organic(count: usize) -> String {
    let hits: Vec<_> = (0..count)
      .map(|i| json!({"title": format!("Result {i}"), "snippet": format!("Snippet {i}"), "link": format!("https://example.com/{i}")}))
      .collect();
    json!({ "organic": hits }).to_string()
  }

  #[tokio::test]
  async fn test_search_sends_query_and_key() {
    let mut server = Server::new_async().await;
    let mock = server
      .mock("POST", "/search")
      .match_header("x-api-key", "serper-key")
      .match_body(Matcher::Json(json!({"q": "\"Acme\"", "num": 10})))
      .with_status(200)
      .with_body(organic(2))
      .create_async()
      .await;

    let client = SearchClient::new(Client::new(), &server.url(), "serper-key");
    let result = client.search("\"Acme\"", SearchKind::Search).await;

    mock.assert_async().await;
    assert_eq!(result.organic.len(), 2);
  }

  #[tokio::test]
  async fn test_news_search_restricts_to_past_month() {
    let mut server = Server::new_async().await;
    let mock = server
      .mock("POST", "/news")
      .match_body(Matcher::PartialJson(json!({"q": "Acme", "tbs": "qdr:m"})))
      .with_status(200)
      .with_body(r#"{"news": []}"#)
      .create_async()
      .await;

    let client = SearchClient::new(Client::new(), &server.url(), "serper-key");
    client.search("Acme", SearchKind::News).await;

    mock.assert_async().await;
  }

  #[tokio::test]
  async fn test_search_failures_are_soft() {
    let mut server = Server::new_async().await;
    let _error = server.mock("POST", "/search").with_status(500).create_async().await;
    let _garbage = server.mock("POST", "/news").with_status(200).with_body("not json").create_async().await;

    let client = SearchClient::new(Client::new(), &server.url(), "serper-key");
    assert!(client.search("Acme", SearchKind::Search).await.organic.is_empty());
    assert!(client.search("Acme", SearchKind::News).await.news.is_empty());
  }

  #[tokio::test]
  async fn test_missing_key_skips_the_request() {
    let mut server = Server::new_async().await;
    let mock = server.mock("POST", "/search").expect(0).create_async().await;

    let client = SearchClient::new(Client::new(), &server.url(), "");
    let record = client.company_research("Acme").await;

    mock.assert_async().await;
    assert_eq!(record.categories.len(), 8);
    assert!(record.categories.values().all(|research| research.insights.is_empty()));
  }

  #[tokio::test]
  async fn test_company_research_keeps_three_insights_and_five_news_items() {
    let mut server = Server::new_async().await;
    let _search = server
      .mock("POST", "/search")
      .with_status(200)
      .with_body(organic(10))
      .expect(8)
      .create_async()
      .await;
    let news: Vec<_> = (0..7).map(|i| json!({"title": format!("Headline {i}")})).collect();
    let _news = server
      .mock("POST", "/news")
      .with_status(200)
      .with_body(json!({ "news": news }).to_string())
      .create_async()
      .await;

    let client = SearchClient::new(Client::new(), &server.url(), "serper-key");
    let record = client.company_research("Acme").await;

    assert_eq!(record.company_name, "Acme");
    assert_eq!(record.categories.len(), 8);
    let technology = &record.categories[&Category::Technology];
    assert_eq!(technology.query, "\"Acme\" technology cloud AI digital transformation");
    assert_eq!(technology.insights.len(), 3);
    assert_eq!(technology.insights[0].title, "Result 0");

    assert_eq!(record.latest_news.len(), 5);
    let first = &record.latest_news[0];
    assert_eq!(first.title, "Headline 0");
    assert_eq!(first.snippet, "N/A");
    assert_eq!(first.source, "Unknown");
    assert_eq!(first.date, "N/A");
    assert_eq!(first.link, "");
  }

  #[test]
  fn test_missing_hit_fields_get_defaults() {
    let hit = SearchHit { snippet: Some("x".repeat(250)), ..SearchHit::default() };
    let insight = hit.to_insight();
    assert_eq!(insight.title, "N/A");
    assert_eq!(insight.link, "");
    assert_eq!(insight.snippet.chars().count(), 203);
  }
}
