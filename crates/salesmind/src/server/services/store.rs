//! Document store backed by SQLite
//!
//! Each collection is a table holding JSON documents. The store is opened
//! lazily through [`Database`]; a failed open is remembered for the life of
//! the process and every caller takes its "no database" branch.

use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;

use crate::server::models::api_keys::{ApiKeySet, ApiKeyUpdate};
use crate::server::models::history::SearchHistoryEntry;
use crate::server::models::research::{CachedResearch, ResearchRecord};
use crate::server::models::status::SystemStatus;

const API_KEYS_ID: &str = "default";
const TTS_STATUS_ID: &str = "tts_status";

#[derive(Error, Debug)]
pub enum StoreError {
  #[error("database failure: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("unable to encode or decode document: {0}")]
  Json(#[from] serde_json::Error),

  #[error("unable to prepare database directory: {0}")]
  Io(#[from] std::io::Error),

  #[error("stored timestamp is out of range: {0}")]
  Timestamp(i64),

  #[error("database connection lock poisoned")]
  Poisoned,
}

pub struct Store {
  conn: Mutex<Connection>,
}

impl Store {
  /// Open (or create) the store at `path`, creating the parent directory if needed
  pub fn open(path: &Path) -> Result<Self, StoreError> {
    if let Some(parent) = path.parent() {
      if !parent.as_os_str().is_empty() && !parent.exists() {
        std::fs::create_dir_all(parent)?;
      }
    }
    Self::from_connection(Connection::open(path)?)
  }

  pub fn open_in_memory() -> Result<Self, StoreError> {
    Self::from_connection(Connection::open_in_memory()?)
  }

  fn from_connection(conn: Connection) -> Result<Self, StoreError> {
    conn.execute_batch(
      r#"
      CREATE TABLE IF NOT EXISTS api_keys (
          id TEXT PRIMARY KEY,
          document TEXT NOT NULL
      );

      CREATE TABLE IF NOT EXISTS research_cache (
          company_name TEXT PRIMARY KEY,
          document TEXT NOT NULL,
          updated_at INTEGER NOT NULL
      );

      CREATE TABLE IF NOT EXISTS search_history (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          company_name TEXT NOT NULL,
          timestamp INTEGER NOT NULL,
          categories TEXT NOT NULL
      );

      CREATE INDEX IF NOT EXISTS idx_search_history_company
          ON search_history(company_name);
      CREATE INDEX IF NOT EXISTS idx_search_history_timestamp
          ON search_history(timestamp DESC);

      CREATE TABLE IF NOT EXISTS system_status (
          id TEXT PRIMARY KEY,
          document TEXT NOT NULL
      );
      "#,
    )?;

    Ok(Self { conn: Mutex::new(conn) })
  }

  fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
    self.conn.lock().map_err(|_| StoreError::Poisoned)
  }
}

// API keys
impl Store {
  pub fn api_keys(&self) -> Result<Option<ApiKeySet>, StoreError> {
    let conn = self.conn()?;
    read_document(&conn, "SELECT document FROM api_keys WHERE id = ?1", API_KEYS_ID)
  }

  /// Seed the key record unless one already exists
  pub fn insert_api_keys_if_absent(&self, keys: &ApiKeySet) -> Result<(), StoreError> {
    let conn = self.conn()?;
    conn.execute(
      "INSERT OR IGNORE INTO api_keys (id, document) VALUES (?1, ?2)",
      params![API_KEYS_ID, serde_json::to_string(keys)?],
    )?;
    Ok(())
  }

  /// Merge `update` into the stored key record, creating it if absent
  pub fn update_api_keys(&self, update: &ApiKeyUpdate) -> Result<ApiKeySet, StoreError> {
    let conn = self.conn()?;
    let mut keys: ApiKeySet =
      read_document(&conn, "SELECT document FROM api_keys WHERE id = ?1", API_KEYS_ID)?
        .unwrap_or_default();
    keys.apply(update);

    conn.execute(
      "INSERT INTO api_keys (id, document) VALUES (?1, ?2)
       ON CONFLICT(id) DO UPDATE SET document = excluded.document",
      params![API_KEYS_ID, serde_json::to_string(&keys)?],
    )?;
    Ok(keys)
  }
}

// Research cache
impl Store {
  /// Replace the cached research for the record's company
  pub fn upsert_research(&self, record: &ResearchRecord, updated_at: DateTime<Utc>) -> Result<(), StoreError> {
    let conn = self.conn()?;
    conn.execute(
      "INSERT INTO research_cache (company_name, document, updated_at) VALUES (?1, ?2, ?3)
       ON CONFLICT(company_name) DO UPDATE SET document = excluded.document, updated_at = excluded.updated_at",
      params![record.company_name, serde_json::to_string(record)?, updated_at.timestamp_micros()],
    )?;
    Ok(())
  }

  pub fn cached_research(&self, company_name: &str) -> Result<Option<CachedResearch>, StoreError> {
    let conn = self.conn()?;
    let row: Option<(String, i64)> = conn
      .query_row(
        "SELECT document, updated_at FROM research_cache WHERE company_name = ?1",
        params![company_name],
        |row| Ok((row.get(0)?, row.get(1)?)),
      )
      .optional()?;

    row
      .map(|(document, updated_at)| -> Result<CachedResearch, StoreError> {
        Ok(CachedResearch {
          company_name: company_name.to_string(),
          data: serde_json::from_str(&document)?,
          updated_at: from_micros(updated_at)?,
        })
      })
      .transpose()
  }
}

// Search history
impl Store {
  pub fn insert_history(&self, entry: &SearchHistoryEntry) -> Result<(), StoreError> {
    let conn = self.conn()?;
    conn.execute(
      "INSERT INTO search_history (company_name, timestamp, categories) VALUES (?1, ?2, ?3)",
      params![
        entry.company_name,
        entry.timestamp.timestamp_micros(),
        serde_json::to_string(&entry.categories)?
      ],
    )?;
    Ok(())
  }

  /// Most recent entries first
  pub fn recent_history(&self, limit: usize) -> Result<Vec<SearchHistoryEntry>, StoreError> {
    let conn = self.conn()?;
    let mut statement = conn.prepare(
      "SELECT company_name, timestamp, categories FROM search_history
       ORDER BY timestamp DESC, id DESC LIMIT ?1",
    )?;
    let rows = statement
      .query_map(params![limit as i64], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?, row.get::<_, String>(2)?))
      })?
      .collect::<Result<Vec<_>, _>>()?;

    rows
      .into_iter()
      .map(|(company_name, timestamp, categories)| -> Result<SearchHistoryEntry, StoreError> {
        Ok(SearchHistoryEntry {
          company_name,
          timestamp: from_micros(timestamp)?,
          categories: serde_json::from_str(&categories)?,
        })
      })
      .collect()
  }

  /// Remove every entry for exactly this company name, returning how many were removed
  pub fn delete_history(&self, company_name: &str) -> Result<usize, StoreError> {
    let conn = self.conn()?;
    Ok(conn.execute("DELETE FROM search_history WHERE company_name = ?1", params![company_name])?)
  }
}

// System status
impl Store {
  pub fn record_tts_status(&self, status: &SystemStatus) -> Result<(), StoreError> {
    let conn = self.conn()?;
    conn.execute(
      "INSERT INTO system_status (id, document) VALUES (?1, ?2)
       ON CONFLICT(id) DO UPDATE SET document = excluded.document",
      params![TTS_STATUS_ID, serde_json::to_string(status)?],
    )?;
    Ok(())
  }

  pub fn tts_status(&self) -> Result<Option<SystemStatus>, StoreError> {
    let conn = self.conn()?;
    read_document(&conn, "SELECT document FROM system_status WHERE id = ?1", TTS_STATUS_ID)
  }
}

fn read_document<T: serde::de::DeserializeOwned>(
  conn: &Connection,
  sql: &str,
  id: &str,
) -> Result<Option<T>, StoreError> {
  let document: Option<String> =
    conn.query_row(sql, params![id], |row| row.get(0)).optional()?;
  document.map(|text| serde_json::from_str(&text)).transpose().map_err(StoreError::from)
}

fn from_micros(micros: i64) -> Result<DateTime<Utc>, StoreError> {
  DateTime::from_timestamp_micros(micros).ok_or(StoreError::Timestamp(micros))
}

/// Lazily opened handle to the document store
///
/// The first call to [`Database::get`] opens the store. If that fails the
/// failure is cached and the handle reports "unavailable" from then on.
pub struct Database {
  path: PathBuf,
  store: OnceCell<Option<Store>>,
}

impl Database {
  pub fn new<P: AsRef<Path>>(path: P) -> Self {
    Self { path: path.as_ref().to_path_buf(), store: OnceCell::new() }
  }

  /// Wrap an already opened store
  pub fn from_store(store: Store) -> Self {
    Self { path: PathBuf::from(":memory:"), store: OnceCell::with_value(Some(store)) }
  }

  /// A handle that never connects
  pub fn unavailable() -> Self {
    Self { path: PathBuf::new(), store: OnceCell::with_value(None) }
  }

  pub fn get(&self) -> Option<&Store> {
    self
      .store
      .get_or_init(|| match Store::open(&self.path) {
        Ok(store) => {
          tracing::info!(path = %self.path.display(), "connected to document store");
          Some(store)
        }
        Err(e) => {
          tracing::error!(path = %self.path.display(), "document store unavailable: {e}");
          None
        }
      })
      .as_ref()
  }

  pub fn is_available(&self) -> bool {
    self.get().is_some()
  }
}
