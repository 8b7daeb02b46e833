//! Research brief assembled from search results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::clip_chars;

/// Maximum snippet length kept from a search result
pub const SNIPPET_LIMIT: usize = 200;
const ELLIPSIS: &str = "...";

/// Fixed research topics, in the order they are queried
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
  Overview,
  News,
  Financials,
  Hiring,
  Technology,
  Acquisitions,
  Competitors,
  Challenges,
}

impl Category {
  pub const ALL: [Category; 8] = [
    Category::Overview,
    Category::News,
    Category::Financials,
    Category::Hiring,
    Category::Technology,
    Category::Acquisitions,
    Category::Competitors,
    Category::Challenges,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      Category::Overview => "overview",
      Category::News => "news",
      Category::Financials => "financials",
      Category::Hiring => "hiring",
      Category::Technology => "technology",
      Category::Acquisitions => "acquisitions",
      Category::Competitors => "competitors",
      Category::Challenges => "challenges",
    }
  }

  /// Search phrase for this category with the company name quoted
  pub fn query_for(&self, company_name: &str) -> String {
    let quoted = format!("\"{company_name}\"");
    match self {
      Category::Overview => quoted,
      Category::News => format!("{quoted} news"),
      Category::Financials => format!("{quoted} financial results earnings revenue"),
      Category::Hiring => format!("{quoted} hiring jobs careers"),
      Category::Technology => format!("{quoted} technology cloud AI digital transformation"),
      Category::Acquisitions => format!("{quoted} acquisitions mergers partnerships"),
      Category::Competitors => format!("{quoted} competitors rivals market position"),
      Category::Challenges => format!("{quoted} challenges problems issues"),
    }
  }
}

impl fmt::Display for Category {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A single search hit kept for a category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub snippet: String,
  #[serde(default)]
  pub link: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryResearch {
  /// Query sent to the search provider
  pub query: String,
  #[serde(default)]
  pub insights: Vec<Insight>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
  pub title: String,
  pub snippet: String,
  pub source: String,
  pub date: String,
  pub link: String,
}

/// Research brief for one company
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchRecord {
  pub company_name: String,
  pub categories: BTreeMap<Category, CategoryResearch>,
  #[serde(default)]
  pub latest_news: Vec<NewsItem>,
  #[serde(default)]
  pub ai_analysis: String,
}

impl ResearchRecord {
  pub fn new(company_name: &str) -> Self {
    Self { company_name: company_name.to_string(), ..Self::default() }
  }

  /// Names of the categories present, in query order
  pub fn category_names(&self) -> Vec<String> {
    self.categories.keys().map(|category| category.as_str().to_string()).collect()
  }
}

/// Research record as stored in the cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedResearch {
  pub company_name: String,
  pub data: ResearchRecord,
  pub updated_at: DateTime<Utc>,
}

/// Truncate a snippet to [`SNIPPET_LIMIT`] characters, marking the cut with an ellipsis
pub fn truncate_snippet(snippet: &str) -> String {
  let clipped = clip_chars(snippet, SNIPPET_LIMIT);
  if clipped.len() < snippet.len() {
    format!("{clipped}{ELLIPSIS}")
  } else {
    snippet.to_string()
  }
}
