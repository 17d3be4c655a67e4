//! [`SqliteStorage`]: the SQLite implementation of [`Storage`].

use std::{
  path::Path,
  sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use chrono::{SecondsFormat, Utc};
use pitchside_core::{Storage, StorageKey};
use rusqlite::{Connection, OptionalExtension as _};

use crate::{
  Error, Result,
  schema::{SCHEMA, SCHEMA_VERSION},
};

// ─── Storage ─────────────────────────────────────────────────────────────────

/// Pitchside persistence backed by a single SQLite file.
///
/// Cloning is cheap; clones share one connection.
#[derive(Clone)]
pub struct SqliteStorage {
  conn: Arc<Mutex<Connection>>,
}

impl SqliteStorage {
  /// Open (or create) a database at `path` and run schema initialisation.
  pub fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "opening sqlite storage");
    Self::init(Connection::open(path)?)
  }

  /// Open an in-memory database, mostly for tests.
  pub fn open_in_memory() -> Result<Self> {
    Self::init(Connection::open_in_memory()?)
  }

  fn init(conn: Connection) -> Result<Self> {
    let found: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    if found > SCHEMA_VERSION {
      return Err(Error::UnsupportedSchema { found, supported: SCHEMA_VERSION });
    }
    conn.execute_batch(SCHEMA)?;
    Ok(Self { conn: Arc::new(Mutex::new(conn)) })
  }

  /// Every key currently holding a value, in key order.
  pub fn stored_keys(&self) -> Result<Vec<String>> {
    let conn = self.lock();
    let mut stmt = conn.prepare("SELECT key FROM kv ORDER BY key")?;
    let keys = stmt
      .query_map([], |row| row.get(0))?
      .collect::<rusqlite::Result<_>>()?;
    Ok(keys)
  }

  fn lock(&self) -> MutexGuard<'_, Connection> {
    self.conn.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

impl Storage for SqliteStorage {
  type Error = Error;

  fn load(&self, key: StorageKey) -> Result<Option<String>> {
    let value = self
      .lock()
      .query_row(
        "SELECT value_json FROM kv WHERE key = ?1",
        rusqlite::params![key.as_str()],
        |row| row.get(0),
      )
      .optional()?;
    Ok(value)
  }

  fn save(&self, key: StorageKey, json: &str) -> Result<()> {
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    self.lock().execute(
      "INSERT INTO kv (key, value_json, updated_at) VALUES (?1, ?2, ?3)
       ON CONFLICT(key) DO UPDATE SET
         value_json = excluded.value_json,
         updated_at = excluded.updated_at",
      rusqlite::params![key.as_str(), json, now],
    )?;
    tracing::trace!(key = key.as_str(), bytes = json.len(), "saved");
    Ok(())
  }

  fn remove(&self, key: StorageKey) -> Result<()> {
    self
      .lock()
      .execute("DELETE FROM kv WHERE key = ?1", rusqlite::params![key.as_str()])?;
    Ok(())
  }
}
