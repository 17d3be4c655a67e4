//! Progress entries, notifications, and read tracking.

use pitchside_core::{
  Clock, Storage, StorageKey,
  id::{ChildId, NotificationId, ProgressEntryId, SessionId, UserId},
  notification::{Notification, NotificationAction},
  progress::ProgressEntry,
};

use crate::{DomainStore, Result, store::ReadSets};

impl<S: Storage, C: Clock> DomainStore<S, C> {
  // ── Progress entries ────────────────────────────────────────────────────

  /// Record a progress entry and notify the child's parent. No notification
  /// is sent if the child does not resolve.
  pub fn add_progress_entry(&mut self, entry: ProgressEntry) -> Result<()> {
    let notification = self.child(&entry.child_id).map(|child| Notification {
      id:          NotificationId::generate(),
      user_id:     child.parent_id.clone(),
      message:     format!("New {} progress note for {}", entry.period, child.name),
      read:        false,
      created_at:  self.clock.now(),
      action_type: Some(NotificationAction::ProgressEntry),
      action_id:   Some(entry.id.to_string()),
    });

    self.progress_entries.insert(0, entry);
    match notification {
      Some(n) => {
        self.notifications.insert(0, n);
        self.persist_all(&[StorageKey::ProgressEntries, StorageKey::Notifications])
      }
      None => self.persist(StorageKey::ProgressEntries),
    }
  }

  /// Newest first.
  pub fn progress_entries_for_child(&self, child_id: &ChildId) -> Vec<&ProgressEntry> {
    let mut entries: Vec<_> = self
      .progress_entries
      .iter()
      .filter(|e| &e.child_id == child_id)
      .collect();
    entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    entries
  }

  pub fn unread_progress_count(&self, child_id: &ChildId) -> usize {
    let read = self.read_progress.get(child_id);
    self
      .progress_entries
      .iter()
      .filter(|e| &e.child_id == child_id)
      .filter(|e| read.is_none_or(|set| !set.contains(&e.id)))
      .count()
  }

  // ── Notifications ───────────────────────────────────────────────────────

  pub fn add_notification(&mut self, notification: Notification) -> Result<()> {
    self.notifications.insert(0, notification);
    self.persist(StorageKey::Notifications)
  }

  pub fn mark_notification_read(&mut self, notification_id: &NotificationId) -> Result<()> {
    let Some(n) = self
      .notifications
      .iter_mut()
      .find(|n| &n.id == notification_id)
    else {
      tracing::debug!(%notification_id, "mark_notification_read: no such notification");
      return Ok(());
    };
    if n.read {
      return Ok(());
    }
    n.read = true;
    self.persist(StorageKey::Notifications)
  }

  /// Newest first.
  pub fn notifications_for_user(&self, user_id: &UserId) -> Vec<&Notification> {
    let mut notifications: Vec<_> = self
      .notifications
      .iter()
      .filter(|n| &n.user_id == user_id)
      .collect();
    notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    notifications
  }

  pub fn unread_notifications(&self, user_id: &UserId) -> Vec<&Notification> {
    self
      .notifications
      .iter()
      .filter(|n| &n.user_id == user_id && !n.read)
      .collect()
  }

  // ── Read tracking ───────────────────────────────────────────────────────

  /// Add `session_ids` to the child's read set. Ids are never removed.
  pub fn mark_sessions_read(
    &mut self,
    child_id: &ChildId,
    session_ids: impl IntoIterator<Item = SessionId>,
  ) -> Result<()> {
    if union_into(&mut self.read_sessions, child_id, session_ids) {
      self.persist(StorageKey::ReadSessionsByChild)?;
    }
    Ok(())
  }

  /// Add `progress_ids` to the child's read set. Ids are never removed.
  pub fn mark_progress_read(
    &mut self,
    child_id: &ChildId,
    progress_ids: impl IntoIterator<Item = ProgressEntryId>,
  ) -> Result<()> {
    if union_into(&mut self.read_progress, child_id, progress_ids) {
      self.persist(StorageKey::ReadProgressByChild)?;
    }
    Ok(())
  }

  pub fn is_session_read(&self, child_id: &ChildId, session_id: &SessionId) -> bool {
    self
      .read_sessions
      .get(child_id)
      .is_some_and(|set| set.contains(session_id))
  }
}

/// Returns whether anything new was added.
fn union_into<T: Ord>(
  sets: &mut ReadSets<T>,
  child_id: &ChildId,
  ids: impl IntoIterator<Item = T>,
) -> bool {
  let mut ids = ids.into_iter().peekable();
  if ids.peek().is_none() {
    return false;
  }
  let set = sets.entry(child_id.clone()).or_default();
  let before = set.len();
  set.extend(ids);
  set.len() > before
}
