//! In-app notifications.

use serde::{Deserialize, Serialize};

use crate::{Timestamp, id::{NotificationId, UserId}};

/// What a notification links to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationAction {
  JoinRequest,
  ProgressEntry,
}

/// Created as a side effect of other mutations; only `read` ever changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
  pub id:          NotificationId,
  pub user_id:     UserId,
  pub message:     String,
  pub read:        bool,
  pub created_at:  Timestamp,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub action_type: Option<NotificationAction>,
  /// Id of the join request or progress entry this points at.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub action_id:   Option<String>,
}
