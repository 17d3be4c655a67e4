//! Registered accounts and the views derived from them.

use serde::{Deserialize, Serialize};

use crate::{Timestamp, id::UserId, roster::Group};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Parent,
  Trainer,
}

/// A registered account. `email` is stored lowercased and trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub id:            UserId,
  pub role:          Role,
  pub name:          String,
  pub email:         String,
  /// argon2 PHC string, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
  pub created_at:    Timestamp,
}

impl User {
  pub fn is_trainer(&self) -> bool { self.role == Role::Trainer }

  pub fn profile(&self) -> UserProfile {
    UserProfile {
      id:    self.id.clone(),
      role:  self.role,
      name:  self.name.clone(),
      email: self.email.clone(),
    }
  }
}

/// The credential-free projection of a [`User`] handed to other layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
  pub id:    UserId,
  pub role:  Role,
  pub name:  String,
  pub email: String,
}

/// A trainer-search hit: the trainer and every group they own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainerMatch {
  pub id:     UserId,
  pub name:   String,
  pub groups: Vec<Group>,
}
