//! Typed identifiers and sortable timestamps.
//!
//! Ids are opaque strings, usually assigned by the caller. Each entity gets
//! its own newtype so a `GroupId` can never be passed where a `SessionId` is
//! expected. On the wire they are plain JSON strings.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! string_id {
  ($(#[$meta:meta])* $name:ident => $prefix:literal) => {
    $(#[$meta])*
    #[derive(
      Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    )]
    #[serde(transparent)]
    pub struct $name(String);

    impl $name {
      pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

      /// A fresh, random id.
      pub fn generate() -> Self {
        Self(format!(concat!($prefix, "-{}"), Uuid::new_v4()))
      }

      pub fn as_str(&self) -> &str { &self.0 }
    }

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
      }
    }

    impl From<&str> for $name {
      fn from(s: &str) -> Self { Self(s.to_owned()) }
    }

    impl From<String> for $name {
      fn from(s: String) -> Self { Self(s) }
    }
  };
}

string_id!(
  /// A registered account (parent or trainer).
  UserId => "user"
);
string_id!(GroupId => "group");
string_id!(ChildId => "child");
string_id!(JoinRequestId => "jr");
string_id!(
  /// A progress-report template ("session") created by a trainer.
  SessionId => "session"
);
string_id!(CategoryId => "cat");
string_id!(ReportId => "report");
string_id!(ProgressEntryId => "progress");
string_id!(
  /// A calendar event.
  EventId => "event"
);
string_id!(AttendanceId => "att");
string_id!(NotificationId => "notif");

impl AttendanceId {
  /// Attendance rows are keyed by `(event, child)`, so a repeated save for
  /// the same child always lands on the same id.
  pub fn for_pair(event: &EventId, child: &ChildId) -> Self {
    Self(format!("att-{event}-{child}"))
  }
}

// ─── Timestamp ───────────────────────────────────────────────────────────────

/// An ISO-8601 date or date-time string.
///
/// Ordering is plain string ordering. Producers must emit zero-padded,
/// UTC-normalised values (`2024-01-15`, `2024-01-15T10:00:00.000Z`) so that
/// lexicographic order equals chronological order; a bare date sorts before
/// any instant on that same day.
#[derive(
  Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(String);

impl Timestamp {
  pub fn new(value: impl Into<String>) -> Self { Self(value.into()) }

  pub fn as_str(&self) -> &str { &self.0 }

  /// Whether this timestamp falls in the given calendar month
  /// (`month` is 1-based).
  pub fn is_in_month(&self, year: i32, month: u32) -> bool {
    self.0.starts_with(&format!("{year:04}-{month:02}"))
  }
}

impl fmt::Display for Timestamp {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for Timestamp {
  fn from(s: &str) -> Self { Self(s.to_owned()) }
}

impl From<String> for Timestamp {
  fn from(s: String) -> Self { Self(s) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn date_sorts_before_instant_on_same_day() {
    let date = Timestamp::from("2024-01-15");
    let instant = Timestamp::from("2024-01-15T10:00:00.000Z");
    assert!(date < instant);
    assert!(Timestamp::from("2024-01-16") > instant);
  }

  #[test]
  fn month_prefix_is_zero_padded() {
    let ts = Timestamp::from("2024-03-09");
    assert!(ts.is_in_month(2024, 3));
    assert!(!ts.is_in_month(2024, 1));
  }

  #[test]
  fn attendance_id_is_deterministic() {
    let a = AttendanceId::for_pair(&"ev1".into(), &"c1".into());
    let b = AttendanceId::for_pair(&"ev1".into(), &"c1".into());
    assert_eq!(a, b);
    assert_eq!(a.as_str(), "att-ev1-c1");
  }

  #[test]
  fn generated_ids_are_prefixed_and_distinct() {
    let a = GroupId::generate();
    let b = GroupId::generate();
    assert!(a.as_str().starts_with("group-"));
    assert_ne!(a, b);
  }

  #[test]
  fn ids_serialise_as_bare_strings() {
    let id = GroupId::from("g1");
    assert_eq!(serde_json::to_string(&id).unwrap(), "\"g1\"");
  }
}
