//! Groups, children, join requests, and trainer search.

use std::collections::HashSet;

use pitchside_core::{
  Clock, Storage, StorageKey, Timestamp,
  id::{ChildId, GroupId, JoinRequestId, NotificationId, UserId},
  notification::{Notification, NotificationAction},
  roster::{Child, Group, JoinRequest, JoinStatus},
  user::{TrainerMatch, User},
};

use crate::{DomainStore, Result};

impl<S: Storage, C: Clock> DomainStore<S, C> {
  // ── Groups ──────────────────────────────────────────────────────────────

  pub fn add_group(&mut self, group: Group) -> Result<()> {
    self.groups.insert(0, group);
    self.persist(StorageKey::Groups)
  }

  pub fn update_group(
    &mut self,
    group_id: &GroupId,
    name: impl Into<String>,
  ) -> Result<()> {
    let Some(group) = self.groups.iter_mut().find(|g| &g.id == group_id) else {
      tracing::debug!(%group_id, "update_group: no such group");
      return Ok(());
    };
    group.name = name.into();
    self.persist(StorageKey::Groups)
  }

  /// Delete a group together with its sessions, their reports, its calendar
  /// events, and their attendance. Children in the group are detached, not
  /// deleted.
  pub fn delete_group(&mut self, group_id: &GroupId) -> Result<()> {
    self.groups.retain(|g| &g.id != group_id);

    let session_ids: HashSet<_> = self
      .sessions
      .iter()
      .filter(|s| &s.group_id == group_id)
      .map(|s| s.id.clone())
      .collect();
    self.sessions.retain(|s| !session_ids.contains(&s.id));
    let reports_before = self.reports.len();
    self.reports.retain(|r| !session_ids.contains(&r.session_id));

    let event_ids: HashSet<_> = self
      .calendar_events
      .iter()
      .filter(|e| &e.group_id == group_id)
      .map(|e| e.id.clone())
      .collect();
    self.calendar_events.retain(|e| !event_ids.contains(&e.id));
    let attendance_before = self.attendance.len();
    self.attendance.retain(|a| !event_ids.contains(&a.event_id));

    let mut detached = 0usize;
    for child in self.children.iter_mut().filter(|c| c.is_in_group(group_id)) {
      child.clear_membership();
      detached += 1;
    }

    tracing::info!(
      %group_id,
      sessions = session_ids.len(),
      reports = reports_before - self.reports.len(),
      events = event_ids.len(),
      attendance = attendance_before - self.attendance.len(),
      children = detached,
      "group deleted"
    );

    self.persist_all(&[
      StorageKey::Groups,
      StorageKey::Sessions,
      StorageKey::Reports,
      StorageKey::CalendarEvents,
      StorageKey::Attendance,
      StorageKey::Children,
    ])
  }

  pub fn group(&self, group_id: &GroupId) -> Option<&Group> {
    self.groups.iter().find(|g| &g.id == group_id)
  }

  pub fn groups_for_trainer(&self, trainer_id: &UserId) -> Vec<&Group> {
    self
      .groups
      .iter()
      .filter(|g| &g.trainer_id == trainer_id)
      .collect()
  }

  // ── Children ────────────────────────────────────────────────────────────

  pub fn add_child(&mut self, child: Child) -> Result<()> {
    self.children.insert(0, child);
    self.persist(StorageKey::Children)
  }

  /// Rename a child and set (or clear) the birth date.
  pub fn update_child(
    &mut self,
    child_id: &ChildId,
    name: impl Into<String>,
    birth_date: Option<Timestamp>,
  ) -> Result<()> {
    let Some(child) = self.child_mut(child_id) else {
      tracing::debug!(%child_id, "update_child: no such child");
      return Ok(());
    };
    child.name = name.into();
    child.birth_date = birth_date.filter(|d| !d.as_str().is_empty());
    self.persist(StorageKey::Children)
  }

  pub fn remove_child_from_group(&mut self, child_id: &ChildId) -> Result<()> {
    let Some(child) = self.child_mut(child_id) else {
      tracing::debug!(%child_id, "remove_child_from_group: no such child");
      return Ok(());
    };
    child.clear_membership();
    self.persist(StorageKey::Children)
  }

  /// Move a child into another group. The join timestamp restarts now, so
  /// sessions already held in the new group are not owed by this child.
  pub fn move_child_to_group(
    &mut self,
    child_id: &ChildId,
    new_group_id: &GroupId,
  ) -> Result<()> {
    let Some(trainer_id) = self.group(new_group_id).map(|g| g.trainer_id.clone())
    else {
      tracing::debug!(%new_group_id, "move_child_to_group: no such group");
      return Ok(());
    };
    let now = self.clock.now();
    let Some(child) = self.child_mut(child_id) else {
      tracing::debug!(%child_id, "move_child_to_group: no such child");
      return Ok(());
    };
    child.assign(new_group_id.clone(), trainer_id, now);
    self.persist(StorageKey::Children)
  }

  pub fn child(&self, child_id: &ChildId) -> Option<&Child> {
    self.children.iter().find(|c| &c.id == child_id)
  }

  pub(crate) fn child_mut(&mut self, child_id: &ChildId) -> Option<&mut Child> {
    self.children.iter_mut().find(|c| &c.id == child_id)
  }

  pub fn children_for_parent(&self, parent_id: &UserId) -> Vec<&Child> {
    self
      .children
      .iter()
      .filter(|c| &c.parent_id == parent_id)
      .collect()
  }

  pub fn children_for_trainer(&self, trainer_id: &UserId) -> Vec<&Child> {
    self
      .children
      .iter()
      .filter(|c| c.trainer_id.as_ref() == Some(trainer_id))
      .collect()
  }

  pub fn children_for_group(&self, group_id: &GroupId) -> Vec<&Child> {
    self
      .children
      .iter()
      .filter(|c| c.is_in_group(group_id))
      .collect()
  }

  // ── Join requests ───────────────────────────────────────────────────────

  /// Record a join request and notify the trainer. The notification is only
  /// sent when both the child and the group resolve; the request is recorded
  /// regardless.
  pub fn send_join_request(&mut self, request: JoinRequest) -> Result<()> {
    let notification = match (self.child(&request.child_id), self.group(&request.group_id)) {
      (Some(child), Some(group)) => Some(Notification {
        id:          NotificationId::generate(),
        user_id:     request.trainer_id.clone(),
        message:     format!("{} wants to join group \"{}\"", child.name, group.name),
        read:        false,
        created_at:  self.clock.now(),
        action_type: Some(NotificationAction::JoinRequest),
        action_id:   Some(request.id.to_string()),
      }),
      _ => {
        tracing::debug!(
          request_id = %request.id,
          "join request references an unknown child or group; not notifying"
        );
        None
      }
    };

    self.join_requests.insert(0, request);
    match notification {
      Some(n) => {
        self.notifications.insert(0, n);
        self.persist_all(&[StorageKey::JoinRequests, StorageKey::Notifications])
      }
      None => self.persist(StorageKey::JoinRequests),
    }
  }

  /// Accept a pending request and place the child in the requested group,
  /// starting its visibility window at the acceptance instant.
  pub fn accept_join_request(&mut self, request_id: &JoinRequestId) -> Result<()> {
    let now = self.clock.now();
    let Some(request) = self.pending_request_mut(request_id) else {
      return Ok(());
    };
    request.status = JoinStatus::Accepted;
    let (child_id, group_id, trainer_id) = (
      request.child_id.clone(),
      request.group_id.clone(),
      request.trainer_id.clone(),
    );

    match self.child_mut(&child_id) {
      Some(child) => child.assign(group_id, trainer_id, now),
      None => tracing::debug!(%child_id, "accepted request for an unknown child"),
    }
    self.persist_all(&[StorageKey::JoinRequests, StorageKey::Children])
  }

  /// Reject a pending request. Nothing else changes.
  pub fn reject_join_request(&mut self, request_id: &JoinRequestId) -> Result<()> {
    let Some(request) = self.pending_request_mut(request_id) else {
      return Ok(());
    };
    request.status = JoinStatus::Rejected;
    self.persist(StorageKey::JoinRequests)
  }

  fn pending_request_mut(
    &mut self,
    request_id: &JoinRequestId,
  ) -> Option<&mut JoinRequest> {
    let request = self.join_requests.iter_mut().find(|r| &r.id == request_id);
    match request {
      Some(r) if r.is_pending() => Some(r),
      Some(r) => {
        tracing::debug!(%request_id, status = ?r.status, "join request already decided");
        None
      }
      None => {
        tracing::debug!(%request_id, "no such join request");
        None
      }
    }
  }

  pub fn join_request(&self, request_id: &JoinRequestId) -> Option<&JoinRequest> {
    self.join_requests.iter().find(|r| &r.id == request_id)
  }

  /// Newest first.
  pub fn join_requests_for_trainer(&self, trainer_id: &UserId) -> Vec<&JoinRequest> {
    self.sorted_requests(|r| &r.trainer_id == trainer_id)
  }

  /// Newest first.
  pub fn join_requests_for_parent(&self, parent_id: &UserId) -> Vec<&JoinRequest> {
    self.sorted_requests(|r| &r.parent_id == parent_id)
  }

  pub fn pending_requests_count(&self, trainer_id: &UserId) -> usize {
    self
      .join_requests
      .iter()
      .filter(|r| &r.trainer_id == trainer_id && r.is_pending())
      .count()
  }

  fn sorted_requests(&self, keep: impl Fn(&JoinRequest) -> bool) -> Vec<&JoinRequest> {
    let mut requests: Vec<_> = self.join_requests.iter().filter(|r| keep(r)).collect();
    requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    requests
  }

  // ── Trainer search ──────────────────────────────────────────────────────

  /// Case-insensitive substring match over trainer names. A blank query
  /// matches nobody.
  pub fn search_trainers(&self, users: &[User], query: &str) -> Vec<TrainerMatch> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
      return Vec::new();
    }

    users
      .iter()
      .filter(|u| u.is_trainer() && u.name.to_lowercase().contains(&needle))
      .map(|t| TrainerMatch {
        id:     t.id.clone(),
        name:   t.name.clone(),
        groups: self.groups_for_trainer(&t.id).into_iter().cloned().collect(),
      })
      .collect()
  }
}
