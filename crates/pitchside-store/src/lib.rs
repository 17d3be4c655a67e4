//! The Pitchside stores: identity and domain.
//!
//! Both own their collections in memory, mirror every committed mutation to
//! a [`Storage`](pitchside_core::Storage) backend synchronously, and reload
//! from it once when opened. Neither performs access control; callers pass
//! ids they have already vetted.

mod calendar;
mod migrate;
mod progress;
mod reports;
mod roster;
mod store;

pub mod error;
pub mod identity;

pub use error::{AuthError, Error, Result};
pub use identity::IdentityStore;
pub use store::DomainStore;
