//! SQL schema for the Pitchside SQLite backend.
//!
//! Executed at connection startup. The applied version is tracked in
//! `PRAGMA user_version`; later migrations are gated on that number.

/// Version written by [`SCHEMA`].
pub const SCHEMA_VERSION: i32 = 1;

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One JSON document per logical collection.
CREATE TABLE IF NOT EXISTS kv (
    key         TEXT PRIMARY KEY,
    value_json  TEXT NOT NULL,
    updated_at  TEXT NOT NULL    -- ISO 8601 UTC
);

PRAGMA user_version = 1;
";
