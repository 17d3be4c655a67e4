//! [`DomainStore`]: owner of every business entity.
//!
//! Operations are split by entity family across sibling modules (`roster`,
//! `reports`, `progress`, `calendar`); this module holds the state, loading,
//! and the persistence plumbing they share.

use std::collections::{BTreeMap, BTreeSet};

use pitchside_core::{
  Clock, Storage, StorageKey, SystemClock, Timestamp,
  calendar::{CalendarEvent, EventAttendance},
  id::{ChildId, ProgressEntryId, SessionId},
  notification::Notification,
  progress::ProgressEntry,
  roster::{Child, Group, JoinRequest},
  session::{Report, Session},
};

use crate::Result;

/// Per-child sets of ids a parent has already looked at.
pub(crate) type ReadSets<T> = BTreeMap<ChildId, BTreeSet<T>>;

// ─── Store ───────────────────────────────────────────────────────────────────

/// The in-memory relational store for groups, children, sessions, reports
/// and everything hanging off them.
///
/// Every mutation commits to memory first and then writes each touched
/// collection back to storage before returning. Reads are pure scans over
/// current state, so a read that follows a write always observes it.
pub struct DomainStore<S, C = SystemClock> {
  pub(crate) storage:          S,
  pub(crate) clock:            C,
  pub(crate) groups:           Vec<Group>,
  pub(crate) children:         Vec<Child>,
  pub(crate) sessions:         Vec<Session>,
  pub(crate) reports:          Vec<Report>,
  pub(crate) join_requests:    Vec<JoinRequest>,
  pub(crate) notifications:    Vec<Notification>,
  pub(crate) progress_entries: Vec<ProgressEntry>,
  pub(crate) calendar_events:  Vec<CalendarEvent>,
  pub(crate) attendance:       Vec<EventAttendance>,
  pub(crate) read_sessions:    ReadSets<SessionId>,
  pub(crate) read_progress:    ReadSets<ProgressEntryId>,
}

impl<S: Storage> DomainStore<S> {
  /// Open a store on `storage` using wall-clock time.
  pub fn open(storage: S) -> Result<Self> {
    Self::open_with_clock(storage, SystemClock)
  }
}

impl<S: Storage, C: Clock> DomainStore<S, C> {
  /// Load every collection from `storage`. Absent keys start empty. Runs the
  /// `joinedGroupAt` backfill once and persists its result.
  pub fn open_with_clock(storage: S, clock: C) -> Result<Self> {
    let mut store = Self {
      groups:           load_or_default(&storage, StorageKey::Groups)?,
      children:         load_or_default(&storage, StorageKey::Children)?,
      sessions:         load_or_default(&storage, StorageKey::Sessions)?,
      reports:          load_or_default(&storage, StorageKey::Reports)?,
      join_requests:    load_or_default(&storage, StorageKey::JoinRequests)?,
      notifications:    load_or_default(&storage, StorageKey::Notifications)?,
      progress_entries: load_or_default(&storage, StorageKey::ProgressEntries)?,
      calendar_events:  load_or_default(&storage, StorageKey::CalendarEvents)?,
      attendance:       load_or_default(&storage, StorageKey::Attendance)?,
      read_sessions:    load_or_default(&storage, StorageKey::ReadSessionsByChild)?,
      read_progress:    load_or_default(&storage, StorageKey::ReadProgressByChild)?,
      storage,
      clock,
    };

    if store.backfill_joined_group_at() > 0 {
      store.persist(StorageKey::Children)?;
    }

    tracing::debug!(
      groups = store.groups.len(),
      children = store.children.len(),
      sessions = store.sessions.len(),
      reports = store.reports.len(),
      "domain store loaded"
    );
    Ok(store)
  }

  /// The store's notion of "now", for callers stamping new entities.
  pub fn now(&self) -> Timestamp { self.clock.now() }

  /// Write one collection back to storage.
  pub(crate) fn persist(&self, key: StorageKey) -> Result<()> {
    match key {
      StorageKey::Groups => self.storage.save_json(key, &self.groups),
      StorageKey::Children => self.storage.save_json(key, &self.children),
      StorageKey::Sessions => self.storage.save_json(key, &self.sessions),
      StorageKey::Reports => self.storage.save_json(key, &self.reports),
      StorageKey::JoinRequests => self.storage.save_json(key, &self.join_requests),
      StorageKey::Notifications => self.storage.save_json(key, &self.notifications),
      StorageKey::ProgressEntries => {
        self.storage.save_json(key, &self.progress_entries)
      }
      StorageKey::CalendarEvents => {
        self.storage.save_json(key, &self.calendar_events)
      }
      StorageKey::Attendance => self.storage.save_json(key, &self.attendance),
      StorageKey::ReadSessionsByChild => {
        self.storage.save_json(key, &self.read_sessions)
      }
      StorageKey::ReadProgressByChild => {
        self.storage.save_json(key, &self.read_progress)
      }
      // Owned by the identity store.
      StorageKey::Users | StorageKey::CurrentSession => Ok(()),
    }
  }

  /// Write several collections back, in order.
  pub(crate) fn persist_all(&self, keys: &[StorageKey]) -> Result<()> {
    keys.iter().try_for_each(|&key| self.persist(key))
  }
}

fn load_or_default<S, T>(storage: &S, key: StorageKey) -> Result<T>
where
  S: Storage,
  T: serde::de::DeserializeOwned + Default,
{
  Ok(storage.load_json(key)?.unwrap_or_default())
}
