//! The `Storage` port and its in-memory implementation.
//!
//! The trait is implemented by durable backends (e.g.
//! `pitchside-store-sqlite`). The stores depend on this abstraction, never on
//! a concrete backend. Every collection is persisted independently as one
//! JSON document under its own [`StorageKey`].

use std::{
  collections::HashMap,
  convert::Infallible,
  sync::{Arc, Mutex, PoisonError},
};

use serde::{Serialize, de::DeserializeOwned};

use crate::{Error, Result};

// ─── Keys ────────────────────────────────────────────────────────────────────

/// The logical keys under which state is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
  Groups,
  Children,
  Sessions,
  Reports,
  JoinRequests,
  Notifications,
  ProgressEntries,
  CalendarEvents,
  Attendance,
  ReadSessionsByChild,
  ReadProgressByChild,
  Users,
  CurrentSession,
}

impl StorageKey {
  pub const ALL: [StorageKey; 13] = [
    Self::Groups,
    Self::Children,
    Self::Sessions,
    Self::Reports,
    Self::JoinRequests,
    Self::Notifications,
    Self::ProgressEntries,
    Self::CalendarEvents,
    Self::Attendance,
    Self::ReadSessionsByChild,
    Self::ReadProgressByChild,
    Self::Users,
    Self::CurrentSession,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Groups => "groups",
      Self::Children => "children",
      Self::Sessions => "sessions",
      Self::Reports => "reports",
      Self::JoinRequests => "join-requests",
      Self::Notifications => "notifications",
      Self::ProgressEntries => "progress-entries",
      Self::CalendarEvents => "calendar-events",
      Self::Attendance => "attendance",
      Self::ReadSessionsByChild => "read-sessions-by-child",
      Self::ReadProgressByChild => "read-progress-by-child",
      Self::Users => "users",
      Self::CurrentSession => "current-session",
    }
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Durable key-value persistence for JSON documents.
///
/// Writes are synchronous: when `save` returns `Ok`, the value is durable as
/// far as the backend is concerned. A missing key is not an error.
pub trait Storage: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Fetch the raw JSON stored under `key`, or `None` if absent.
  fn load(&self, key: StorageKey) -> Result<Option<String>, Self::Error>;

  /// Replace the value under `key`.
  fn save(&self, key: StorageKey, json: &str) -> Result<(), Self::Error>;

  /// Delete `key`. Removing an absent key succeeds.
  fn remove(&self, key: StorageKey) -> Result<(), Self::Error>;

  /// Load and deserialise `key`; `None` if the key has never been written.
  fn load_json<T: DeserializeOwned>(&self, key: StorageKey) -> Result<Option<T>>
  where
    Self: Sized,
  {
    let raw = self.load(key).map_err(|e| Error::Storage(Box::new(e)))?;
    raw.map(|s| serde_json::from_str(&s)).transpose().map_err(Error::from)
  }

  /// Serialise `value` and store it under `key`.
  fn save_json<T: Serialize + ?Sized>(&self, key: StorageKey, value: &T) -> Result<()>
  where
    Self: Sized,
  {
    let json = serde_json::to_string(value)?;
    self
      .save(key, &json)
      .map_err(|e| Error::Storage(Box::new(e)))
  }

  fn remove_key(&self, key: StorageKey) -> Result<()>
  where
    Self: Sized,
  {
    self.remove(key).map_err(|e| Error::Storage(Box::new(e)))
  }
}

// ─── In-memory backend ───────────────────────────────────────────────────────

/// A process-local [`Storage`] for tests and ephemeral runs.
///
/// Cloning is cheap; clones share the same map, so an identity store and a
/// domain store built from clones see each other's writes.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
  entries: Arc<Mutex<HashMap<StorageKey, String>>>,
}

impl MemoryStorage {
  pub fn new() -> Self { Self::default() }

  /// Seed a raw value, bypassing any store. Lets tests set up legacy data.
  pub fn insert_raw(&self, key: StorageKey, json: impl Into<String>) {
    self.lock().insert(key, json.into());
  }

  /// Peek at the raw value under `key`.
  pub fn raw(&self, key: StorageKey) -> Option<String> {
    self.lock().get(&key).cloned()
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<StorageKey, String>> {
    self.entries.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

impl Storage for MemoryStorage {
  type Error = Infallible;

  fn load(&self, key: StorageKey) -> Result<Option<String>, Infallible> {
    Ok(self.raw(key))
  }

  fn save(&self, key: StorageKey, json: &str) -> Result<(), Infallible> {
    self.lock().insert(key, json.to_owned());
    Ok(())
  }

  fn remove(&self, key: StorageKey) -> Result<(), Infallible> {
    self.lock().remove(&key);
    Ok(())
  }
}
