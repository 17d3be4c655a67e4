//! JSON REST API for Pitchside.
//!
//! Exposes an axum [`Router`] over an [`AppStores`] pair (identity + domain)
//! held behind one async mutex. There is no access control: handlers trust
//! the ids they are given. TLS and transport concerns are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", pitchside_api::api_router(stores.clone()))
//! ```

pub mod auth;
pub mod calendar;
pub mod error;
pub mod progress;
pub mod reports;
pub mod roster;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use pitchside_core::{Clock, Storage, SystemClock};
use pitchside_store::{DomainStore, IdentityStore};
use tokio::sync::Mutex;

pub use error::ApiError;

// ─── Application state ────────────────────────────────────────────────────────

/// Both stores, opened over the same storage backend.
pub struct AppStores<S, C = SystemClock> {
  pub identity: IdentityStore<S, C>,
  pub domain:   DomainStore<S, C>,
}

/// Shared state threaded through all axum handlers.
pub type SharedStores<S, C = SystemClock> = Arc<Mutex<AppStores<S, C>>>;

impl<S: Storage + Clone> AppStores<S> {
  pub fn open(storage: S) -> pitchside_store::Result<Self> {
    Self::open_with_clock(storage, SystemClock)
  }
}

impl<S: Storage + Clone, C: Clock + Clone> AppStores<S, C> {
  pub fn open_with_clock(storage: S, clock: C) -> pitchside_store::Result<Self> {
    Ok(Self {
      identity: IdentityStore::open_with_clock(storage.clone(), clock.clone())?,
      domain:   DomainStore::open_with_clock(storage, clock)?,
    })
  }

  pub fn with_min_password_len(mut self, min: usize) -> Self {
    self.identity = self.identity.with_min_password_len(min);
    self
  }

  pub fn into_shared(self) -> SharedStores<S, C> { Arc::new(Mutex::new(self)) }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router over `stores`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, C>(stores: SharedStores<S, C>) -> Router<()>
where
  S: Storage + 'static,
  C: Clock + 'static,
{
  Router::new()
    // Auth
    .route("/auth/register", post(auth::register::<S, C>))
    .route("/auth/login", post(auth::login::<S, C>))
    .route("/auth/logout", post(auth::logout::<S, C>))
    .route("/auth/me", get(auth::me::<S, C>))
    // Groups
    .route(
      "/groups",
      get(roster::list_groups::<S, C>).post(roster::create_group::<S, C>),
    )
    .route(
      "/groups/{id}",
      get(roster::get_group::<S, C>)
        .put(roster::rename_group::<S, C>)
        .delete(roster::delete_group::<S, C>),
    )
    .route("/groups/{id}/children", get(roster::group_children::<S, C>))
    .route("/groups/{id}/sessions", get(reports::group_sessions::<S, C>))
    .route("/groups/{id}/events", get(calendar::group_events::<S, C>))
    // Children
    .route(
      "/children",
      get(roster::list_children::<S, C>).post(roster::create_child::<S, C>),
    )
    .route(
      "/children/{id}",
      get(roster::get_child::<S, C>).put(roster::update_child::<S, C>),
    )
    .route("/children/{id}/leave-group", post(roster::leave_group::<S, C>))
    .route("/children/{id}/move", post(roster::move_child::<S, C>))
    .route("/children/{id}/sessions", get(reports::visible_sessions::<S, C>))
    .route("/children/{id}/reports", get(reports::child_reports::<S, C>))
    .route("/children/{id}/counters", get(reports::counters::<S, C>))
    .route("/children/{id}/progress", get(progress::child_progress::<S, C>))
    .route("/children/{id}/events", get(calendar::visible_events::<S, C>))
    .route(
      "/children/{id}/unread-sessions",
      get(progress::unread_sessions::<S, C>),
    )
    .route("/children/{id}/read/sessions", post(progress::read_sessions::<S, C>))
    .route("/children/{id}/read/progress", post(progress::read_progress::<S, C>))
    // Join requests
    .route(
      "/join-requests",
      get(roster::list_join_requests::<S, C>).post(roster::send_join_request::<S, C>),
    )
    .route("/join-requests/{id}/accept", post(roster::accept_join_request::<S, C>))
    .route("/join-requests/{id}/reject", post(roster::reject_join_request::<S, C>))
    // Trainers
    .route("/trainers/search", get(roster::search_trainers::<S, C>))
    .route(
      "/trainers/{id}/pending-requests",
      get(roster::pending_requests::<S, C>),
    )
    .route("/trainers/{id}/sessions", get(reports::trainer_sessions::<S, C>))
    // Sessions and reports
    .route("/sessions", post(reports::create_session::<S, C>))
    .route(
      "/sessions/{id}",
      get(reports::get_session::<S, C>)
        .patch(reports::retitle_session::<S, C>)
        .delete(reports::delete_session::<S, C>),
    )
    .route("/sessions/{id}/reports", get(reports::session_reports::<S, C>))
    .route("/reports", post(reports::create_report::<S, C>))
    .route("/reports/lookup", get(reports::lookup_report::<S, C>))
    .route(
      "/reports/{id}",
      get(reports::get_report::<S, C>).put(reports::update_report::<S, C>),
    )
    .route("/reports/{id}/submit", post(reports::submit_report::<S, C>))
    // Progress and notifications
    .route("/progress", post(progress::create_entry::<S, C>))
    .route("/users/{id}/notifications", get(progress::notifications::<S, C>))
    .route("/notifications/{id}/read", post(progress::mark_notification_read::<S, C>))
    // Calendar
    .route("/events", post(calendar::create_event::<S, C>))
    .route(
      "/events/{id}",
      get(calendar::get_event::<S, C>)
        .put(calendar::update_event::<S, C>)
        .delete(calendar::delete_event::<S, C>),
    )
    .route(
      "/events/{id}/attendance",
      get(calendar::get_attendance::<S, C>).put(calendar::save_attendance::<S, C>),
    )
    .with_state(stores)
}

#[cfg(test)]
mod tests;
