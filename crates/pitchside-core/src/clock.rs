//! The clock port. Every "now" the store stamps comes through here.

use std::sync::{Mutex, PoisonError};

use chrono::{SecondsFormat, Utc};

use crate::Timestamp;

pub trait Clock: Send + Sync {
  fn now(&self) -> Timestamp;
}

/// Wall-clock time as RFC 3339 UTC with millisecond precision,
/// e.g. `2024-01-15T10:00:00.000Z`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> Timestamp {
    Timestamp::new(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true))
  }
}

/// A clock that only moves when told to. Used for deterministic tests and
/// replays.
#[derive(Debug)]
pub struct ManualClock {
  now: Mutex<Timestamp>,
}

impl ManualClock {
  pub fn new(start: impl Into<Timestamp>) -> Self {
    Self { now: Mutex::new(start.into()) }
  }

  pub fn set(&self, now: impl Into<Timestamp>) {
    *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now.into();
  }
}

impl Clock for ManualClock {
  fn now(&self) -> Timestamp {
    self.now.lock().unwrap_or_else(PoisonError::into_inner).clone()
  }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
  fn now(&self) -> Timestamp { (**self).now() }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn system_clock_emits_sortable_utc() {
    let ts = SystemClock.now();
    assert!(ts.as_str().ends_with('Z'));
    assert_eq!(ts.as_str().len(), "2024-01-15T10:00:00.000Z".len());
  }

  #[test]
  fn manual_clock_moves_on_set() {
    let clock = ManualClock::new("2024-01-15T10:00:00.000Z");
    clock.set("2024-02-01T08:00:00.000Z");
    assert_eq!(clock.now().as_str(), "2024-02-01T08:00:00.000Z");
  }
}
