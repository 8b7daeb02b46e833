//! Provider credentials
//!
//! A single key record covers every upstream provider. Values missing from the
//! stored record fall back to environment variables, then to the empty string.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};

const MASK_PREFIX: usize = 8;
const MASK_SUFFIX: usize = 4;
const MASK_MIN_LEN: usize = MASK_PREFIX + MASK_SUFFIX;

/// Upstream providers that need a credential
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Provider {
  /// Web and news search
  Serper,
  /// Chat completions
  OpenRouter,
  /// Text to speech
  Cartesia,
  /// Transcription
  Deepgram,
  /// Crawling
  Firecrawl,
  /// Alternative search
  Sonar,
}

impl Provider {
  pub const ALL: [Provider; 6] = [
    Provider::Serper,
    Provider::OpenRouter,
    Provider::Cartesia,
    Provider::Deepgram,
    Provider::Firecrawl,
    Provider::Sonar,
  ];

  /// Field name used in stored records and on the wire
  pub fn field_name(&self) -> &'static str {
    match self {
      Provider::Serper => "serper",
      Provider::OpenRouter => "openrouter",
      Provider::Cartesia => "cartesia",
      Provider::Deepgram => "deepgram",
      Provider::Firecrawl => "firecrawl",
      Provider::Sonar => "sonar",
    }
  }

  pub fn env_var(&self) -> &'static str {
    match self {
      Provider::Serper => "SERPER_API_KEY",
      Provider::OpenRouter => "OPENROUTER_API_KEY",
      Provider::Cartesia => "CARTESIA_API_KEY",
      Provider::Deepgram => "DEEPGRAM_API_KEY",
      Provider::Firecrawl => "FIRECRAWL_API_KEY",
      Provider::Sonar => "SONAR_API_KEY",
    }
  }

  pub fn from_field(name: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|provider| provider.field_name() == name)
  }
}

/// Source of environment variables, abstracted so key fallback can be tested
#[cfg_attr(test, mockall::automock)]
pub trait EnvSource {
  fn var(&self, name: &str) -> Option<String>;
}

/// The real process environment
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
  fn var(&self, name: &str) -> Option<String> {
    std::env::var(name).ok()
  }
}

impl EnvSource for HashMap<String, String> {
  fn var(&self, name: &str) -> Option<String> {
    self.get(name).cloned()
  }
}

/// Credentials for every provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeySet {
  #[serde(default)]
  pub serper: String,
  #[serde(default)]
  pub openrouter: String,
  #[serde(default)]
  pub cartesia: String,
  #[serde(default)]
  pub deepgram: String,
  #[serde(default)]
  pub firecrawl: String,
  #[serde(default)]
  pub sonar: String,
}

impl ApiKeySet {
  /// Read every key from its environment variable
  pub fn from_env(env: &dyn EnvSource) -> Self {
    let mut keys = Self::default();
    for provider in Provider::ALL {
      if let Some(value) = env.var(provider.env_var()) {
        *keys.slot_mut(provider) = value;
      }
    }
    keys
  }

  pub fn get(&self, provider: Provider) -> &str {
    match provider {
      Provider::Serper => &self.serper,
      Provider::OpenRouter => &self.openrouter,
      Provider::Cartesia => &self.cartesia,
      Provider::Deepgram => &self.deepgram,
      Provider::Firecrawl => &self.firecrawl,
      Provider::Sonar => &self.sonar,
    }
  }

  fn slot_mut(&mut self, provider: Provider) -> &mut String {
    match provider {
      Provider::Serper => &mut self.serper,
      Provider::OpenRouter => &mut self.openrouter,
      Provider::Cartesia => &mut self.cartesia,
      Provider::Deepgram => &mut self.deepgram,
      Provider::Firecrawl => &mut self.firecrawl,
      Provider::Sonar => &mut self.sonar,
    }
  }

  /// Fill empty keys from `fallback`
  pub fn with_fallback(mut self, fallback: &ApiKeySet) -> Self {
    for provider in Provider::ALL {
      if self.get(provider).is_empty() {
        *self.slot_mut(provider) = fallback.get(provider).to_string();
      }
    }
    self
  }

  /// Apply a partial update, leaving keys not named in it untouched
  pub fn apply(&mut self, update: &ApiKeyUpdate) {
    for (provider, value) in &update.values {
      *self.slot_mut(*provider) = value.clone();
    }
  }

  /// Redacted view of every key, keyed by provider field name
  pub fn masked(&self) -> BTreeMap<&'static str, String> {
    Provider::ALL
      .into_iter()
      .map(|provider| (provider.field_name(), mask_credential(self.get(provider))))
      .collect()
  }
}

/// Partial key update; only non-empty string values are kept
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiKeyUpdate {
  values: BTreeMap<Provider, String>,
}

impl ApiKeyUpdate {
  /// Build an update from a JSON object, ignoring unknown fields and empty or non-string values
  pub fn from_fields(fields: &Map<String, Value>) -> Self {
    let values = fields
      .iter()
      .filter_map(|(name, value)| {
        let provider = Provider::from_field(name)?;
        let value = value.as_str().filter(|text| !text.is_empty())?;
        Some((provider, value.to_string()))
      })
      .collect();
    Self { values }
  }

  pub fn from_pairs<I, S>(pairs: I) -> Self
  where
    I: IntoIterator<Item = (Provider, S)>,
    S: Into<String>,
  {
    let values = pairs
      .into_iter()
      .map(|(provider, value)| (provider, value.into()))
      .filter(|(_, value)| !value.is_empty())
      .collect();
    Self { values }
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  pub fn providers(&self) -> Vec<Provider> {
    self.values.keys().copied().collect()
  }
}

/// Redact a credential for display: first 8 and last 4 characters of long values, `****` otherwise
pub fn mask_credential(value: &str) -> String {
  let length = value.chars().count();
  if value.is_empty() {
    String::new()
  } else if length > MASK_MIN_LEN {
    let prefix: String = value.chars().take(MASK_PREFIX).collect();
    let suffix: String = value.chars().skip(length - MASK_SUFFIX).collect();
    format!("{prefix}...{suffix}")
  } else {
    "****".to_string()
  }
}
