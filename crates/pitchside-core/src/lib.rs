//! Core types and port definitions for the Pitchside progress tracker.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Every other crate depends on it; it depends on nothing proprietary.

pub mod calendar;
pub mod clock;
pub mod error;
pub mod id;
pub mod notification;
pub mod progress;
pub mod roster;
pub mod session;
pub mod storage;
pub mod user;

pub use clock::{Clock, SystemClock};
pub use error::{Error, Result};
pub use id::Timestamp;
pub use storage::{MemoryStorage, Storage, StorageKey};
