//! Error type for `pitchside-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] rusqlite::Error),

  /// The file was written by a newer release than this one.
  #[error("database schema version {found} is newer than supported version {supported}")]
  UnsupportedSchema { found: i32, supported: i32 },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
