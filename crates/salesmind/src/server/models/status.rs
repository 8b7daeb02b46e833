//! Last known availability of the speech provider

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const CREDITS_EXHAUSTED: &str = "Credits exhausted";
pub const KEY_NOT_CONFIGURED: &str = "API key not configured";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemStatus {
  pub tts_available: bool,
  pub last_checked: DateTime<Utc>,
  #[serde(default)]
  pub error: Option<String>,
}

impl SystemStatus {
  /// Speech synthesis just succeeded
  pub fn tts_available() -> Self {
    Self { tts_available: true, last_checked: Utc::now(), error: None }
  }

  /// Provider reported exhausted credits
  pub fn tts_quota_exhausted() -> Self {
    Self::tts_unavailable(CREDITS_EXHAUSTED)
  }

  /// No speech credential is configured
  pub fn tts_not_configured() -> Self {
    Self::tts_unavailable(KEY_NOT_CONFIGURED)
  }

  fn tts_unavailable(reason: &str) -> Self {
    Self { tts_available: false, last_checked: Utc::now(), error: Some(reason.to_string()) }
  }
}
