//! Calendar events and attendance.

use std::collections::BTreeMap;

use pitchside_core::{
  Clock, Storage, StorageKey,
  calendar::{AttendanceStatus, CalendarEvent, EventAttendance},
  id::{AttendanceId, ChildId, EventId, GroupId, UserId},
};

use crate::{DomainStore, Result};

impl<S: Storage, C: Clock> DomainStore<S, C> {
  // ── Events ──────────────────────────────────────────────────────────────

  pub fn add_calendar_event(&mut self, event: CalendarEvent) -> Result<()> {
    self.calendar_events.insert(0, event);
    self.persist(StorageKey::CalendarEvents)
  }

  /// Replace the event with the same id.
  pub fn update_calendar_event(&mut self, event: CalendarEvent) -> Result<()> {
    let Some(slot) = self.calendar_events.iter_mut().find(|e| e.id == event.id)
    else {
      tracing::debug!(event_id = %event.id, "update_calendar_event: no such event");
      return Ok(());
    };
    *slot = event;
    self.persist(StorageKey::CalendarEvents)
  }

  /// Delete an event and all attendance recorded for it.
  pub fn delete_calendar_event(&mut self, event_id: &EventId) -> Result<()> {
    self.calendar_events.retain(|e| &e.id != event_id);
    self.attendance.retain(|a| &a.event_id != event_id);
    self.persist_all(&[StorageKey::CalendarEvents, StorageKey::Attendance])
  }

  pub fn calendar_event(&self, event_id: &EventId) -> Option<&CalendarEvent> {
    self.calendar_events.iter().find(|e| &e.id == event_id)
  }

  /// Chronological: by date, then time of day.
  pub fn calendar_events_for_group(&self, group_id: &GroupId) -> Vec<&CalendarEvent> {
    self.sorted_events(|e| &e.group_id == group_id)
  }

  /// Events of one group in one calendar month (`month` is 1-based).
  pub fn calendar_events_for_month(
    &self,
    group_id: &GroupId,
    year: i32,
    month: u32,
  ) -> Vec<&CalendarEvent> {
    self.sorted_events(|e| &e.group_id == group_id && e.date.is_in_month(year, month))
  }

  /// Events of the group that fall inside the child's membership window.
  pub fn visible_calendar_events_for_child(
    &self,
    child_id: &ChildId,
    group_id: &GroupId,
  ) -> Vec<&CalendarEvent> {
    let child = self.child(child_id);
    self.sorted_events(|e| {
      &e.group_id == group_id && child.is_none_or(|c| c.can_see(&e.date))
    })
  }

  fn sorted_events(&self, keep: impl Fn(&CalendarEvent) -> bool) -> Vec<&CalendarEvent> {
    let mut events: Vec<_> = self.calendar_events.iter().filter(|e| keep(e)).collect();
    events.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.time.cmp(&b.time)));
    events
  }

  // ── Attendance ──────────────────────────────────────────────────────────

  /// Replace the whole attendance sheet for an event.
  ///
  /// Every existing row for the event is dropped; one row is written per
  /// marked child. `None` means "unmarked" and produces no row.
  pub fn save_attendance(
    &mut self,
    event_id: &EventId,
    statuses: &BTreeMap<ChildId, Option<AttendanceStatus>>,
    trainer_id: &UserId,
  ) -> Result<()> {
    let now = self.clock.now();
    self.attendance.retain(|a| &a.event_id != event_id);

    let rows = statuses.iter().filter_map(|(child_id, status)| {
      status.map(|status| EventAttendance {
        id: AttendanceId::for_pair(event_id, child_id),
        event_id: event_id.clone(),
        child_id: child_id.clone(),
        status,
        marked_by: trainer_id.clone(),
        marked_at: now.clone(),
      })
    });
    self.attendance.extend(rows);

    self.persist(StorageKey::Attendance)
  }

  /// The attendance sheet for an event as `child → status`.
  pub fn attendance_for_event(
    &self,
    event_id: &EventId,
  ) -> BTreeMap<ChildId, AttendanceStatus> {
    self
      .attendance
      .iter()
      .filter(|a| &a.event_id == event_id)
      .map(|a| (a.child_id.clone(), a.status))
      .collect()
  }

  /// Raw attendance rows for an event.
  pub fn attendance_rows(&self, event_id: &EventId) -> Vec<&EventAttendance> {
    self
      .attendance
      .iter()
      .filter(|a| &a.event_id == event_id)
      .collect()
  }
}
