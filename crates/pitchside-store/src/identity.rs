//! [`IdentityStore`]: registered users and the current session.
//!
//! Passwords are stored as argon2 PHC strings. Registration doubles as login.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use pitchside_core::{
  Clock, Storage, StorageKey, SystemClock,
  id::UserId,
  user::{Role, User},
};
use rand_core::OsRng;

use crate::{AuthError, Result};

/// Shortest password `register` accepts unless configured otherwise.
pub const DEFAULT_MIN_PASSWORD_LEN: usize = 4;

pub struct IdentityStore<S, C = SystemClock> {
  storage:          S,
  clock:            C,
  users:            Vec<User>,
  current:          Option<UserId>,
  min_password_len: usize,
}

impl<S: Storage> IdentityStore<S> {
  pub fn open(storage: S) -> Result<Self> {
    Self::open_with_clock(storage, SystemClock)
  }
}

impl<S: Storage, C: Clock> IdentityStore<S, C> {
  /// Load users and the persisted session. A session pointing at a user who
  /// no longer exists is dropped.
  pub fn open_with_clock(storage: S, clock: C) -> Result<Self> {
    let users: Vec<User> = storage.load_json(StorageKey::Users)?.unwrap_or_default();
    let current = storage
      .load_json::<UserId>(StorageKey::CurrentSession)?
      .filter(|id| users.iter().any(|u| &u.id == id));

    Ok(Self {
      storage,
      clock,
      users,
      current,
      min_password_len: DEFAULT_MIN_PASSWORD_LEN,
    })
  }

  pub fn with_min_password_len(mut self, min: usize) -> Self {
    self.min_password_len = min;
    self
  }

  /// Create an account and log into it.
  pub fn register(
    &mut self,
    name: &str,
    email: &str,
    password: &str,
    role: Role,
  ) -> Result<User, AuthError> {
    let email = normalize_email(email);
    if self.find_by_email(&email).is_some() {
      return Err(AuthError::EmailTaken);
    }
    if password.chars().count() < self.min_password_len {
      return Err(AuthError::PasswordTooShort { min: self.min_password_len });
    }

    let user = User {
      id: UserId::generate(),
      role,
      name: name.trim().to_owned(),
      email,
      password_hash: hash_password(password)?,
      created_at: self.clock.now(),
    };

    self.users.push(user.clone());
    self.storage.save_json(StorageKey::Users, &self.users)?;
    self.start_session(&user.id)?;

    tracing::info!(user_id = %user.id, role = ?user.role, "user registered");
    Ok(user)
  }

  pub fn login(&mut self, email: &str, password: &str) -> Result<User, AuthError> {
    let user = self
      .find_by_email(&normalize_email(email))
      .ok_or(AuthError::UnknownEmail)?
      .clone();

    let parsed = PasswordHash::new(&user.password_hash)
      .map_err(|_| AuthError::WrongPassword)?;
    Argon2::default()
      .verify_password(password.as_bytes(), &parsed)
      .map_err(|_| AuthError::WrongPassword)?;

    self.start_session(&user.id)?;
    Ok(user)
  }

  /// End the current session. Registered users are untouched.
  pub fn logout(&mut self) -> Result<()> {
    self.current = None;
    self.storage.remove_key(StorageKey::CurrentSession)
  }

  pub fn current_user(&self) -> Option<&User> {
    let id = self.current.as_ref()?;
    self.users.iter().find(|u| &u.id == id)
  }

  pub fn all_users(&self) -> &[User] { &self.users }

  pub fn trainers(&self) -> impl Iterator<Item = &User> {
    self.users.iter().filter(|u| u.is_trainer())
  }

  pub fn user(&self, user_id: &UserId) -> Option<&User> {
    self.users.iter().find(|u| &u.id == user_id)
  }

  fn find_by_email(&self, email: &str) -> Option<&User> {
    self.users.iter().find(|u| u.email.eq_ignore_ascii_case(email))
  }

  fn start_session(&mut self, user_id: &UserId) -> Result<()> {
    self.current = Some(user_id.clone());
    self.storage.save_json(StorageKey::CurrentSession, user_id)
  }
}

fn normalize_email(email: &str) -> String { email.trim().to_lowercase() }

fn hash_password(password: &str) -> Result<String, AuthError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| AuthError::Hash(e.to_string()))
}

#[cfg(test)]
mod tests {
  use pitchside_core::{MemoryStorage, clock::ManualClock};

  use super::*;

  fn store() -> IdentityStore<MemoryStorage, ManualClock> {
    IdentityStore::open_with_clock(
      MemoryStorage::new(),
      ManualClock::new("2024-01-01T09:00:00.000Z"),
    )
    .expect("identity store")
  }

  #[test]
  fn register_logs_in_and_normalises() {
    let mut ids = store();
    let user = ids
      .register("  Anna Trener ", "Anna@Example.COM ", "secret", Role::Trainer)
      .unwrap();

    assert_eq!(user.name, "Anna Trener");
    assert_eq!(user.email, "anna@example.com");
    assert_ne!(user.password_hash, "secret");
    assert_eq!(ids.current_user().map(|u| &u.id), Some(&user.id));
    assert_eq!(ids.all_users().len(), 1);
    assert_eq!(ids.trainers().count(), 1);
  }

  #[test]
  fn register_rejects_duplicate_email_case_insensitively() {
    let mut ids = store();
    ids.register("A", "a@example.com", "secret", Role::Parent).unwrap();
    let err = ids
      .register("B", "A@EXAMPLE.com", "secret", Role::Parent)
      .unwrap_err();
    assert!(matches!(err, AuthError::EmailTaken));
    assert_eq!(ids.all_users().len(), 1);
  }

  #[test]
  fn register_rejects_short_password() {
    let mut ids = store();
    let err = ids
      .register("A", "a@example.com", "abc", Role::Parent)
      .unwrap_err();
    assert!(matches!(err, AuthError::PasswordTooShort { min: 4 }));
    assert!(ids.current_user().is_none());
  }

  #[test]
  fn min_password_len_is_configurable() {
    let mut ids = store().with_min_password_len(8);
    let err = ids
      .register("A", "a@example.com", "secret", Role::Parent)
      .unwrap_err();
    assert_eq!(err.to_string(), "password must be at least 8 characters");
  }

  #[test]
  fn login_checks_email_then_password() {
    let mut ids = store();
    ids.register("A", "a@example.com", "secret", Role::Parent).unwrap();
    ids.logout().unwrap();

    assert!(matches!(
      ids.login("nobody@example.com", "secret"),
      Err(AuthError::UnknownEmail)
    ));
    assert!(matches!(
      ids.login("a@example.com", "wrong"),
      Err(AuthError::WrongPassword)
    ));
    assert!(ids.current_user().is_none());

    let user = ids.login("A@Example.com", "secret").unwrap();
    assert_eq!(ids.current_user().map(|u| &u.id), Some(&user.id));
  }

  #[test]
  fn session_survives_reopen_and_logout_clears_it() {
    let storage = MemoryStorage::new();
    let clock = ManualClock::new("2024-01-01T09:00:00.000Z");
    let mut ids = IdentityStore::open_with_clock(storage.clone(), clock).unwrap();
    let user = ids.register("A", "a@example.com", "secret", Role::Parent).unwrap();

    let reopened = IdentityStore::open(storage.clone()).unwrap();
    assert_eq!(reopened.current_user().map(|u| &u.id), Some(&user.id));

    ids.logout().unwrap();
    assert!(storage.raw(StorageKey::CurrentSession).is_none());
    let reopened = IdentityStore::open(storage).unwrap();
    assert!(reopened.current_user().is_none());
    assert_eq!(reopened.all_users().len(), 1);
  }
}
