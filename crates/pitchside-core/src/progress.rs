//! Trainer-authored progress notes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
  Timestamp,
  id::{ChildId, GroupId, ProgressEntryId, UserId},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
  Week,
  Month,
}

impl fmt::Display for Period {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Week => "weekly",
      Self::Month => "monthly",
    })
  }
}

/// A free-form note about a child, written once and never edited or
/// deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEntry {
  pub id:          ProgressEntryId,
  pub child_id:    ChildId,
  pub group_id:    GroupId,
  pub trainer_id:  UserId,
  pub period:      Period,
  pub description: String,
  pub created_at:  Timestamp,
}
