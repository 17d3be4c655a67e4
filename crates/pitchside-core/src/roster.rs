//! Groups, children, and the join requests that connect them.

use serde::{Deserialize, Serialize};

use crate::{
  Timestamp,
  id::{ChildId, GroupId, JoinRequestId, UserId},
};

// ─── Group ───────────────────────────────────────────────────────────────────

/// A trainer-owned training cohort. Sessions, calendar events, and children
/// are all scoped to a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
  pub id:         GroupId,
  pub name:       String,
  pub trainer_id: UserId,
}

// ─── Child ───────────────────────────────────────────────────────────────────

/// A parent-owned athlete profile, attached to at most one group.
///
/// `group_id`, `trainer_id` and `joined_group_at` are set and cleared
/// together; use [`Child::assign`] and [`Child::clear_membership`] rather
/// than touching them individually.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Child {
  pub id:              ChildId,
  pub name:            String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub birth_date:      Option<Timestamp>,
  pub parent_id:       UserId,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub group_id:        Option<GroupId>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub trainer_id:      Option<UserId>,
  /// Start of the child's visibility window in the current group. Sessions
  /// and events dated before this are not the child's concern.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub joined_group_at: Option<Timestamp>,
}

impl Child {
  /// A new child not yet in any group.
  pub fn new(
    id: impl Into<ChildId>,
    name: impl Into<String>,
    parent_id: impl Into<UserId>,
  ) -> Self {
    Self {
      id:              id.into(),
      name:            name.into(),
      birth_date:      None,
      parent_id:       parent_id.into(),
      group_id:        None,
      trainer_id:      None,
      joined_group_at: None,
    }
  }

  pub fn assign(
    &mut self,
    group_id: GroupId,
    trainer_id: UserId,
    joined_at: Timestamp,
  ) {
    self.group_id = Some(group_id);
    self.trainer_id = Some(trainer_id);
    self.joined_group_at = Some(joined_at);
  }

  pub fn clear_membership(&mut self) {
    self.group_id = None;
    self.trainer_id = None;
    self.joined_group_at = None;
  }

  pub fn is_in_group(&self, group_id: &GroupId) -> bool {
    self.group_id.as_ref() == Some(group_id)
  }

  /// Whether something dated `date` falls inside this child's membership
  /// window. A child with no join timestamp sees everything.
  pub fn can_see(&self, date: &Timestamp) -> bool {
    self.joined_group_at.as_ref().is_none_or(|joined| date >= joined)
  }
}

// ─── JoinRequest ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinStatus {
  Pending,
  Accepted,
  Rejected,
}

/// A parent's request for a child to join a trainer's group. Transitions
/// once from pending to accepted or rejected and is never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
  pub id:         JoinRequestId,
  pub child_id:   ChildId,
  pub group_id:   GroupId,
  pub trainer_id: UserId,
  pub parent_id:  UserId,
  pub status:     JoinStatus,
  pub created_at: Timestamp,
}

impl JoinRequest {
  pub fn is_pending(&self) -> bool { self.status == JoinStatus::Pending }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn child_json_uses_camel_case_and_omits_empty_membership() {
    let child = Child::new("c1", "Ola", "p1");
    let json = serde_json::to_value(&child).unwrap();
    assert_eq!(json["parentId"], "p1");
    assert!(json.get("groupId").is_none());
    assert!(json.get("joinedGroupAt").is_none());
  }

  #[test]
  fn assign_and_clear_move_all_three_fields() {
    let group = Group {
      id:         "g1".into(),
      name:       "U10".into(),
      trainer_id: "t1".into(),
    };
    let mut child = Child::new("c1", "Ola", "p1");

    child.assign(
      group.id.clone(),
      group.trainer_id.clone(),
      "2024-01-15T10:00:00.000Z".into(),
    );
    assert_eq!(child.group_id, Some("g1".into()));
    assert_eq!(child.trainer_id, Some("t1".into()));
    assert!(child.joined_group_at.is_some());

    child.clear_membership();
    assert_eq!(child.group_id, None);
    assert_eq!(child.trainer_id, None);
    assert_eq!(child.joined_group_at, None);
  }

  #[test]
  fn visibility_window_excludes_earlier_dates() {
    let mut child = Child::new("c1", "Ola", "p1");
    assert!(child.can_see(&"2000-01-01".into()));

    child.joined_group_at = Some("2024-01-15".into());
    assert!(!child.can_see(&"2024-01-10".into()));
    assert!(child.can_see(&"2024-01-15".into()));
    assert!(child.can_see(&"2024-02-01".into()));
  }

  #[test]
  fn join_status_wire_format() {
    assert_eq!(
      serde_json::to_string(&JoinStatus::Accepted).unwrap(),
      "\"accepted\""
    );
  }
}
