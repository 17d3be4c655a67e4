//! Sessions (trainer-defined report templates) and the reports parents file
//! against them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
  Timestamp,
  id::{CategoryId, ChildId, GroupId, ReportId, SessionId, UserId},
};

// ─── Session ─────────────────────────────────────────────────────────────────

/// How a parent answers a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
  /// A non-negative tally (goals, assists, ...).
  Counter,
  /// Free text.
  Text,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
  pub id:   CategoryId,
  pub name: String,
  #[serde(rename = "type")]
  pub kind: CategoryKind,
}

/// A progress-report template a trainer creates within a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
  pub id:         SessionId,
  pub title:      String,
  pub date:       Timestamp,
  /// Ordered; never empty.
  pub categories: Vec<Category>,
  pub trainer_id: UserId,
  pub group_id:   GroupId,
}

// ─── Report ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
  Draft,
  Submitted,
}

/// One answer, keyed by category in [`Report::values`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReportValue {
  /// Any JSON number: counters are integral but stored data may not be.
  Number(serde_json::Number),
  Text(String),
}

/// A parent's answers to a session's categories for one child.
///
/// Submission is one-way: once `Submitted`, a report never reads as `Draft`
/// again, and `submitted_at` is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
  pub id:           ReportId,
  pub session_id:   SessionId,
  pub child_id:     ChildId,
  pub parent_id:    UserId,
  pub status:       ReportStatus,
  pub values:       BTreeMap<CategoryId, ReportValue>,
  pub updated_at:   Timestamp,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub submitted_at: Option<Timestamp>,
}

impl Report {
  pub fn is_submitted(&self) -> bool { self.status == ReportStatus::Submitted }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn category_kind_serialises_under_type() {
    let cat = Category {
      id:   "cat1".into(),
      name: "Goals".into(),
      kind: CategoryKind::Counter,
    };
    let json = serde_json::to_value(&cat).unwrap();
    assert_eq!(json["type"], "counter");
  }

  #[test]
  fn report_values_accept_numbers_and_strings() {
    let raw = r#"{
      "id": "r1", "sessionId": "s1", "childId": "c1", "parentId": "p1",
      "status": "draft", "values": {"goals": 3, "notes": "great game"},
      "updatedAt": "2024-02-01T10:00:00.000Z"
    }"#;
    let report: Report = serde_json::from_str(raw).unwrap();
    assert_eq!(report.values[&CategoryId::from("goals")], ReportValue::Number(3_i64.into()));
    assert_eq!(
      report.values[&CategoryId::from("notes")],
      ReportValue::Text("great game".into())
    );
    assert!(report.submitted_at.is_none());
    assert!(!report.is_submitted());
  }

  #[test]
  fn fractional_report_values_load() {
    let raw = r#"{
      "id": "r1", "sessionId": "s1", "childId": "c1", "parentId": "p1",
      "status": "draft", "values": {"minutes": 2.5},
      "updatedAt": "2024-02-01T10:00:00.000Z"
    }"#;
    let report: Report = serde_json::from_str(raw).unwrap();
    let ReportValue::Number(n) = &report.values[&CategoryId::from("minutes")] else {
      panic!("expected a number");
    };
    assert_eq!(n.as_f64(), Some(2.5));
    assert_eq!(serde_json::to_value(&report).unwrap()["values"]["minutes"], 2.5);
  }
}
