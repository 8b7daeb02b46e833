//! Shared application state handed to every handler

use reqwest::Client;
use std::sync::Arc;

use crate::config::ServerConfig;
use crate::server::models::api_keys::{ApiKeySet, EnvSource, ProcessEnv};
use crate::server::models::status::SystemStatus;
use crate::server::services::catalog::Catalog;
use crate::server::services::completion::CompletionClient;
use crate::server::services::insights::InsightGenerator;
use crate::server::services::search::SearchClient;
use crate::server::services::speech::SpeechClient;
use crate::server::services::store::{Database, Store};

#[derive(Clone)]
pub struct AppState {
  pub config: Arc<ServerConfig>,
  pub database: Arc<Database>,
  pub catalog: Arc<Catalog>,
  pub env: Arc<dyn EnvSource + Send + Sync>,
  pub http: Client,
}

impl AppState {
  pub fn new(config: ServerConfig, catalog: Catalog) -> Result<Self, reqwest::Error> {
    let http = Client::builder().user_agent(concat!("salesmind/", env!("CARGO_PKG_VERSION"))).build()?;
    let database = Arc::new(Database::new(&config.database_path));

    Ok(Self {
      config: Arc::new(config),
      database,
      catalog: Arc::new(catalog),
      env: Arc::new(ProcessEnv),
      http,
    })
  }

  /// Replace the environment used for key fallback
  pub fn with_env<E: EnvSource + Send + Sync + 'static>(mut self, env: E) -> Self {
    self.env = Arc::new(env);
    self
  }

  pub fn with_database(mut self, database: Database) -> Self {
    self.database = Arc::new(database);
    self
  }

  /// The document store, if it could be opened
  pub fn store(&self) -> Option<&Store> {
    self.database.get()
  }

  /// Current credentials: stored values first, then the environment
  ///
  /// The stored record is seeded from the environment the first time it is read.
  pub fn api_keys(&self) -> ApiKeySet {
    let env_keys = ApiKeySet::from_env(self.env.as_ref());
    let Some(store) = self.store() else {
      return env_keys;
    };

    match store.api_keys() {
      Ok(Some(stored)) => stored.with_fallback(&env_keys),
      Ok(None) => {
        if let Err(e) = store.insert_api_keys_if_absent(&env_keys) {
          tracing::warn!("unable to seed API key record: {e}");
        }
        env_keys
      }
      Err(e) => {
        tracing::warn!("unable to read API key record: {e}");
        env_keys
      }
    }
  }

  pub fn search_client(&self, keys: &ApiKeySet) -> SearchClient {
    SearchClient::new(self.http.clone(), &self.config.endpoints.search_base, &keys.serper)
  }

  pub fn insight_generator(&self, keys: &ApiKeySet) -> InsightGenerator {
    let completion = CompletionClient::new(self.http.clone(), &self.config.endpoints.llm_url, &keys.openrouter);
    InsightGenerator::new(completion, self.config.models.clone(), self.catalog.clone())
  }

  pub fn speech_client(&self, keys: &ApiKeySet) -> SpeechClient {
    SpeechClient::new(self.http.clone(), &self.config.endpoints.tts_url, &keys.cartesia)
  }

  /// Persist the latest speech availability; silently skipped without a store
  pub fn record_tts_status(&self, status: &SystemStatus) {
    if let Some(store) = self.store() {
      if let Err(e) = store.record_tts_status(status) {
        tracing::warn!("unable to record speech status: {e}");
      }
    }
  }
}
