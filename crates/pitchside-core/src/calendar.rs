//! Calendar events and per-child attendance.

use serde::{Deserialize, Serialize};

use crate::{
  Timestamp,
  id::{AttendanceId, ChildId, EventId, GroupId, UserId},
};

/// A scheduled training or match belonging to a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
  pub id:         EventId,
  pub group_id:   GroupId,
  pub title:      String,
  /// `YYYY-MM-DD`.
  pub date:       Timestamp,
  /// `HH:MM`.
  pub time:       String,
  pub location:   String,
  pub created_by: UserId,
  pub created_at: Timestamp,
  pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AttendanceStatus {
  Present,
  Absent,
}

/// One child's presence or absence at one event. At most one row exists per
/// `(event_id, child_id)`; the id is derived from that pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventAttendance {
  pub id:        AttendanceId,
  pub event_id:  EventId,
  pub child_id:  ChildId,
  pub status:    AttendanceStatus,
  pub marked_by: UserId,
  pub marked_at: Timestamp,
}
