//! SQLite backend for the Pitchside stores.
//!
//! Every [`StorageKey`](pitchside_core::StorageKey) maps to one row of a
//! key-value table holding that collection's JSON document. The connection
//! sits behind a mutex, so a single [`SqliteStorage`] can be shared between
//! the domain and identity stores.

mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStorage;

#[cfg(test)]
mod tests;
