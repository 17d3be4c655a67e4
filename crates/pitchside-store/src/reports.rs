//! Sessions, the reports filed against them, and the per-child pending and
//! unread counters that depend on both.

use std::collections::HashSet;

use pitchside_core::{
  Clock, Storage, StorageKey,
  id::{ChildId, GroupId, ReportId, SessionId, UserId},
  session::{Report, ReportStatus, Session},
};

use crate::{DomainStore, Result};

impl<S: Storage, C: Clock> DomainStore<S, C> {
  // ── Sessions ────────────────────────────────────────────────────────────

  pub fn add_session(&mut self, session: Session) -> Result<()> {
    if session.categories.is_empty() {
      tracing::warn!(session_id = %session.id, "session created without categories");
    }
    self.sessions.insert(0, session);
    self.persist(StorageKey::Sessions)
  }

  pub fn update_session_title(
    &mut self,
    session_id: &SessionId,
    title: impl Into<String>,
  ) -> Result<()> {
    let Some(session) = self.sessions.iter_mut().find(|s| &s.id == session_id)
    else {
      tracing::debug!(%session_id, "update_session_title: no such session");
      return Ok(());
    };
    session.title = title.into();
    self.persist(StorageKey::Sessions)
  }

  /// Delete a session and every report filed against it.
  pub fn delete_session(&mut self, session_id: &SessionId) -> Result<()> {
    self.sessions.retain(|s| &s.id != session_id);
    let before = self.reports.len();
    self.reports.retain(|r| &r.session_id != session_id);
    tracing::info!(
      %session_id,
      reports = before - self.reports.len(),
      "session deleted"
    );
    self.persist_all(&[StorageKey::Sessions, StorageKey::Reports])
  }

  pub fn session(&self, session_id: &SessionId) -> Option<&Session> {
    self.sessions.iter().find(|s| &s.id == session_id)
  }

  /// Newest first. Sessions sharing a date keep their stored order.
  pub fn sessions_for_group(&self, group_id: &GroupId) -> Vec<&Session> {
    self.sorted_sessions(|s| &s.group_id == group_id)
  }

  /// Every session a trainer created, across all their groups; newest first.
  pub fn sessions_for_trainer(&self, trainer_id: &UserId) -> Vec<&Session> {
    self.sorted_sessions(|s| &s.trainer_id == trainer_id)
  }

  /// The sessions of `group_id` that fall inside the child's membership
  /// window; newest first.
  pub fn visible_sessions_for_child(
    &self,
    child_id: &ChildId,
    group_id: &GroupId,
  ) -> Vec<&Session> {
    let child = self.child(child_id);
    self.sorted_sessions(|s| {
      &s.group_id == group_id && child.is_none_or(|c| c.can_see(&s.date))
    })
  }

  fn sorted_sessions(&self, keep: impl Fn(&Session) -> bool) -> Vec<&Session> {
    let mut sessions: Vec<_> = self.sessions.iter().filter(|s| keep(s)).collect();
    sessions.sort_by(|a, b| b.date.cmp(&a.date));
    sessions
  }

  // ── Reports ─────────────────────────────────────────────────────────────

  /// Insert a new report.
  ///
  /// At most one report exists per `(session, child)`; a second insert for
  /// the same pair is ignored. A report inserted as submitted without a
  /// `submitted_at` is stamped now.
  pub fn add_report(&mut self, mut report: Report) -> Result<()> {
    if let Some(existing) =
      self.report_for_session_and_child(&report.session_id, &report.child_id)
    {
      tracing::warn!(
        existing = %existing.id,
        rejected = %report.id,
        "a report for this session and child already exists"
      );
      return Ok(());
    }
    if report.is_submitted() && report.submitted_at.is_none() {
      report.submitted_at = Some(self.clock.now());
    }
    self.reports.insert(0, report);
    self.persist(StorageKey::Reports)
  }

  /// Replace the report with the same id and refresh `updated_at`.
  ///
  /// A submitted report stays submitted: its status and `submitted_at`
  /// survive the replacement. A draft replaced as submitted without a
  /// `submitted_at` is stamped now.
  pub fn update_report(&mut self, mut updated: Report) -> Result<()> {
    let now = self.clock.now();
    let Some(slot) = self.reports.iter_mut().find(|r| r.id == updated.id) else {
      tracing::debug!(report_id = %updated.id, "update_report: no such report");
      return Ok(());
    };
    if slot.is_submitted() {
      updated.status = ReportStatus::Submitted;
      updated.submitted_at = slot.submitted_at.clone();
    } else if updated.is_submitted() && updated.submitted_at.is_none() {
      updated.submitted_at = Some(now.clone());
    }
    updated.updated_at = now;
    *slot = updated;
    self.persist(StorageKey::Reports)
  }

  /// Mark a report submitted and stamp `submitted_at`. Resubmitting an
  /// already-submitted report moves its stamp forward.
  pub fn submit_report(&mut self, report_id: &ReportId) -> Result<()> {
    let now = self.clock.now();
    let Some(report) = self.reports.iter_mut().find(|r| &r.id == report_id) else {
      tracing::debug!(%report_id, "submit_report: no such report");
      return Ok(());
    };
    report.status = ReportStatus::Submitted;
    report.submitted_at = Some(now);
    self.persist(StorageKey::Reports)
  }

  pub fn report(&self, report_id: &ReportId) -> Option<&Report> {
    self.reports.iter().find(|r| &r.id == report_id)
  }

  pub fn report_for_session_and_child(
    &self,
    session_id: &SessionId,
    child_id: &ChildId,
  ) -> Option<&Report> {
    self
      .reports
      .iter()
      .find(|r| &r.session_id == session_id && &r.child_id == child_id)
  }

  pub fn submitted_reports_for_session(&self, session_id: &SessionId) -> Vec<&Report> {
    self
      .reports
      .iter()
      .filter(|r| &r.session_id == session_id && r.is_submitted())
      .collect()
  }

  /// A child's submitted reports, most recently submitted first.
  pub fn submitted_reports_for_child(&self, child_id: &ChildId) -> Vec<&Report> {
    let mut reports: Vec<_> = self
      .reports
      .iter()
      .filter(|r| &r.child_id == child_id && r.is_submitted())
      .collect();
    reports.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
    reports
  }

  /// Like [`Self::submitted_reports_for_child`], restricted to sessions of
  /// one group. This is a trainer's notebook view of a child.
  pub fn submitted_reports_for_child_in_group(
    &self,
    child_id: &ChildId,
    group_id: &GroupId,
  ) -> Vec<&Report> {
    let group_sessions: HashSet<_> = self
      .sessions
      .iter()
      .filter(|s| &s.group_id == group_id)
      .map(|s| &s.id)
      .collect();
    self
      .submitted_reports_for_child(child_id)
      .into_iter()
      .filter(|r| group_sessions.contains(&r.session_id))
      .collect()
  }

  // ── Counters ────────────────────────────────────────────────────────────

  /// Visible sessions in the group that the child has not yet submitted a
  /// report for (no report, or only a draft).
  pub fn pending_sessions_count_for_child(
    &self,
    child_id: &ChildId,
    group_id: &GroupId,
  ) -> usize {
    self
      .visible_sessions_for_child(child_id, group_id)
      .into_iter()
      .filter(|s| {
        self
          .report_for_session_and_child(&s.id, child_id)
          .is_none_or(|r| !r.is_submitted())
      })
      .count()
  }

  /// Visible sessions in the group not yet marked read for the child,
  /// newest first.
  pub fn unread_session_ids(
    &self,
    child_id: &ChildId,
    group_id: &GroupId,
  ) -> Vec<&SessionId> {
    let read = self.read_sessions.get(child_id);
    self
      .visible_sessions_for_child(child_id, group_id)
      .into_iter()
      .map(|s| &s.id)
      .filter(|id| read.is_none_or(|set| !set.contains(*id)))
      .collect()
  }

  pub fn unread_session_count(&self, child_id: &ChildId, group_id: &GroupId) -> usize {
    self.unread_session_ids(child_id, group_id).len()
  }
}
