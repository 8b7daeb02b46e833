//! Search history log entries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::research::ResearchRecord;

/// Number of entries returned by the history listing
pub const HISTORY_LIMIT: usize = 20;

/// One completed company search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHistoryEntry {
  pub company_name: String,
  pub timestamp: DateTime<Utc>,
  #[serde(default)]
  pub categories: Vec<String>,
}

impl SearchHistoryEntry {
  pub fn new(company_name: &str, timestamp: DateTime<Utc>, categories: Vec<String>) -> Self {
    Self { company_name: company_name.to_string(), timestamp, categories }
  }

  /// Entry recording the given research record, stamped now
  pub fn from_research(record: &ResearchRecord) -> Self {
    Self::new(&record.company_name, Utc::now(), record.category_names())
  }
}
