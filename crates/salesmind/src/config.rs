//! Server configuration
//!
//! Holds the bind address, document store location, upstream provider
//! endpoints and model identifiers. Defaults point at the production
//! providers; every endpoint can be overridden so tests can aim at local stubs.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::server::services::catalog::{Catalog, CatalogError};

pub const DEFAULT_SEARCH_BASE: &str = "https://google.serper.dev";
pub const DEFAULT_LLM_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_TTS_URL: &str = "https://api.cartesia.ai/tts/bytes";

pub const DEFAULT_PRIMARY_MODEL: &str = "x-ai/grok-3-mini-beta";
pub const DEFAULT_COMPACT_MODEL: &str = "meta-llama/llama-3.2-3b-instruct:free";

/// Main configuration structure
#[derive(Debug, Clone)]
pub struct ServerConfig {
  /// Address the HTTP server binds to
  pub bind: SocketAddr,
  /// SQLite file backing the document store
  pub database_path: PathBuf,
  /// Optional YAML product catalog; the built-in catalog is used when absent
  pub catalog_path: Option<PathBuf>,
  /// Upstream provider endpoints
  pub endpoints: ProviderEndpoints,
  /// Chat-completion model identifiers
  pub models: ModelConfig,
}

/// Base URLs of the search, completion and speech providers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEndpoints {
  /// Search API base; `/search` and `/news` are appended
  pub search_base: String,
  /// Full chat-completions URL
  pub llm_url: String,
  /// Full text-to-speech URL
  pub tts_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelConfig {
  /// Model used for analysis, recommendations, panel insights and guidance
  pub primary: String,
  /// Smaller model used for ultra-short speech lines
  pub compact: String,
}

impl Default for ProviderEndpoints {
  fn default() -> Self {
    Self {
      search_base: DEFAULT_SEARCH_BASE.to_string(),
      llm_url: DEFAULT_LLM_URL.to_string(),
      tts_url: DEFAULT_TTS_URL.to_string(),
    }
  }
}

impl ProviderEndpoints {
  /// Point every provider at one base URL, using the default path layout
  pub fn local(base: &str) -> Self {
    let base = base.trim_end_matches('/');
    Self {
      search_base: base.to_string(),
      llm_url: format!("{base}/chat/completions"),
      tts_url: format!("{base}/tts/bytes"),
    }
  }
}

impl Default for ModelConfig {
  fn default() -> Self {
    Self { primary: DEFAULT_PRIMARY_MODEL.to_string(), compact: DEFAULT_COMPACT_MODEL.to_string() }
  }
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      bind: SocketAddr::from(([127, 0, 0, 1], 5000)),
      database_path: default_database_path(),
      catalog_path: None,
      endpoints: ProviderEndpoints::default(),
      models: ModelConfig::default(),
    }
  }
}

impl ServerConfig {
  /// Load the configured catalog, or the built-in one
  pub fn load_catalog(&self) -> Result<Catalog, CatalogError> {
    match &self.catalog_path {
      Some(path) => Catalog::load(path),
      None => Catalog::builtin(),
    }
  }

  pub fn with_database_path<P: AsRef<Path>>(mut self, path: P) -> Self {
    self.database_path = path.as_ref().to_path_buf();
    self
  }
}

/// Get the default path for the document store
pub fn default_database_path() -> PathBuf {
  dirs::home_dir()
    .unwrap_or_else(|| Path::new("/tmp").to_path_buf())
    .join(".salesmind")
    .join("salesmind.db")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_default_endpoints_target_production_providers() {
    let endpoints = ProviderEndpoints::default();
    assert_eq!(endpoints.search_base, "https://google.serper.dev");
    assert!(endpoints.llm_url.ends_with("/chat/completions"));
    assert!(endpoints.tts_url.ends_with("/tts/bytes"));
  }

  #[test]
  fn test_local_endpoints_share_one_base() {
    let endpoints = ProviderEndpoints::local("http://127.0.0.1:4010/");
    assert_eq!(endpoints.search_base, "http://127.0.0.1:4010");
    assert_eq!(endpoints.llm_url, "http://127.0.0.1:4010/chat/completions");
    assert_eq!(endpoints.tts_url, "http://127.0.0.1:4010/tts/bytes");
  }

  #[test]
  fn test_default_database_lives_under_salesmind_dir() {
    let path = default_database_path();
    assert!(path.ends_with(".salesmind/salesmind.db"));
  }

  #[test]
  fn test_missing_catalog_file_is_an_error() {
    let config = ServerConfig {
      catalog_path: Some(PathBuf::from("/definitely/not/here/catalog.yaml")),
      ..ServerConfig::default()
    };
    assert!(config.load_catalog().is_err());
  }
}
