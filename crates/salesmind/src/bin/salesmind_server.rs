//! SalesMind REST Server
//!
//! HTTP API for company research, sales insights and spoken guidance.

use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use salesmind::config::{
  default_database_path, ModelConfig, ProviderEndpoints, ServerConfig, DEFAULT_COMPACT_MODEL, DEFAULT_LLM_URL,
  DEFAULT_PRIMARY_MODEL, DEFAULT_SEARCH_BASE, DEFAULT_TTS_URL,
};
use salesmind::server::startup::start_server;

#[derive(Parser)]
#[command(name = "salesmind_server")]
#[command(about = "SalesMind REST API Server")]
#[command(version)]
struct Args {
  /// Server bind address
  #[arg(long, env = "SALESMIND_BIND", default_value = "127.0.0.1:5000")]
  bind: SocketAddr,

  /// SQLite file for history, cached research, keys and status
  #[arg(long, env = "SALESMIND_DATABASE")]
  database: Option<PathBuf>,

  /// YAML product catalog; the built-in catalog is used when omitted
  #[arg(long, env = "SALESMIND_CATALOG")]
  catalog: Option<PathBuf>,

  /// Search API base URL
  #[arg(long, env = "SALESMIND_SEARCH_URL", default_value = DEFAULT_SEARCH_BASE)]
  search_url: String,

  /// Chat-completions URL
  #[arg(long, env = "SALESMIND_LLM_URL", default_value = DEFAULT_LLM_URL)]
  llm_url: String,

  /// Text-to-speech URL
  #[arg(long, env = "SALESMIND_TTS_URL", default_value = DEFAULT_TTS_URL)]
  tts_url: String,

  /// Model for analysis, recommendations and guidance
  #[arg(long, env = "SALESMIND_MODEL", default_value = DEFAULT_PRIMARY_MODEL)]
  model: String,

  /// Model for ultra-short speech lines
  #[arg(long, env = "SALESMIND_COMPACT_MODEL", default_value = DEFAULT_COMPACT_MODEL)]
  compact_model: String,

  /// Enable verbose logging
  #[arg(short, long)]
  verbose: bool,
}

impl Args {
  fn into_config(self) -> ServerConfig {
    ServerConfig {
      bind: self.bind,
      database_path: self.database.unwrap_or_else(default_database_path),
      catalog_path: self.catalog,
      endpoints: ProviderEndpoints { search_base: self.search_url, llm_url: self.llm_url, tts_url: self.tts_url },
      models: ModelConfig { primary: self.model, compact: self.compact_model },
    }
  }
}

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  let filter = if args.verbose {
    EnvFilter::new("salesmind=debug,tower_http=debug,info")
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("salesmind=info,tower_http=info,warn"))
  };

  tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

  tracing::info!("Starting SalesMind REST Server v{}", env!("CARGO_PKG_VERSION"));
  tracing::info!("Binding to address: {}", args.bind);

  start_server(args.into_config()).await?;

  Ok(())
}
