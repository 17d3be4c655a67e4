//! Error types for `pitchside-store`.
//!
//! Domain mutations only fail when persistence fails; acting on an unknown
//! id is a silent no-op. Registration and login have their own user-facing
//! error type.

use thiserror::Error;

pub use pitchside_core::{Error, Result};

/// Why a registration or login attempt was refused. The `Display` text is
/// meant to be shown to the user as-is.
#[derive(Debug, Error)]
pub enum AuthError {
  #[error("an account with this email already exists")]
  EmailTaken,

  #[error("password must be at least {min} characters")]
  PasswordTooShort { min: usize },

  #[error("no account found for this email")]
  UnknownEmail,

  #[error("incorrect password")]
  WrongPassword,

  #[error("password hashing failed: {0}")]
  Hash(String),

  #[error(transparent)]
  Persistence(#[from] Error),
}
