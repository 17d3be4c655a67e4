//! Handlers for progress entries, notifications, and read tracking.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/progress` | Body: [`NewProgressEntry`]; notifies the parent |
//! | `GET`  | `/children/:id/progress` | Newest first |
//! | `GET`  | `/users/:id/notifications[?unread=true]` | Newest first |
//! | `POST` | `/notifications/:id/read` | 204 |
//! | `GET`  | `/children/:id/unread-sessions?groupId=` | Session ids |
//! | `POST` | `/children/:id/read/sessions` | Body: `{"ids":[...]}`; 204 |
//! | `POST` | `/children/:id/read/progress` | Body: `{"ids":[...]}`; 204 |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use pitchside_core::{
  Clock, Storage,
  id::{ChildId, GroupId, NotificationId, ProgressEntryId, SessionId, UserId},
  notification::Notification,
  progress::{Period, ProgressEntry},
};
use serde::Deserialize;

use crate::{SharedStores, error::ApiError, reports::GroupParams, roster::non_blank};

// ─── Progress entries ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProgressEntry {
  pub child_id:    ChildId,
  pub group_id:    GroupId,
  pub trainer_id:  UserId,
  pub period:      Period,
  pub description: String,
}

/// `POST /progress`
pub async fn create_entry<S: Storage, C: Clock>(
  State(state): State<SharedStores<S, C>>,
  Json(body): Json<NewProgressEntry>,
) -> Result<impl IntoResponse, ApiError> {
  let description = non_blank(body.description, "description")?;
  let mut stores = state.lock().await;
  let entry = ProgressEntry {
    id: ProgressEntryId::generate(),
    child_id: body.child_id,
    group_id: body.group_id,
    trainer_id: body.trainer_id,
    period: body.period,
    description,
    created_at: stores.domain.now(),
  };
  stores.domain.add_progress_entry(entry.clone())?;
  Ok((StatusCode::CREATED, Json(entry)))
}

/// `GET /children/:id/progress`
pub async fn child_progress<S: Storage, C: Clock>(
  State(state): State<SharedStores<S, C>>,
  Path(id): Path<ChildId>,
) -> Json<Vec<ProgressEntry>> {
  let stores = state.lock().await;
  Json(
    stores
      .domain
      .progress_entries_for_child(&id)
      .into_iter()
      .cloned()
      .collect(),
  )
}

// ─── Notifications ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct NotificationParams {
  #[serde(default)]
  pub unread: bool,
}

/// `GET /users/:id/notifications[?unread=true]`
pub async fn notifications<S: Storage, C: Clock>(
  State(state): State<SharedStores<S, C>>,
  Path(id): Path<UserId>,
  Query(params): Query<NotificationParams>,
) -> Json<Vec<Notification>> {
  let stores = state.lock().await;
  let mut notifications = stores.domain.notifications_for_user(&id);
  if params.unread {
    notifications.retain(|n| !n.read);
  }
  Json(notifications.into_iter().cloned().collect())
}

/// `POST /notifications/:id/read`
pub async fn mark_notification_read<S: Storage, C: Clock>(
  State(state): State<SharedStores<S, C>>,
  Path(id): Path<NotificationId>,
) -> Result<StatusCode, ApiError> {
  state.lock().await.domain.mark_notification_read(&id)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Read tracking ────────────────────────────────────────────────────────────

/// `GET /children/:id/unread-sessions?groupId=<id>`
pub async fn unread_sessions<S: Storage, C: Clock>(
  State(state): State<SharedStores<S, C>>,
  Path(id): Path<ChildId>,
  Query(params): Query<GroupParams>,
) -> Json<Vec<SessionId>> {
  let stores = state.lock().await;
  Json(
    stores
      .domain
      .unread_session_ids(&id, &params.group_id)
      .into_iter()
      .cloned()
      .collect(),
  )
}

#[derive(Debug, Deserialize)]
pub struct ReadBody<T> {
  pub ids: Vec<T>,
}

/// `POST /children/:id/read/sessions`
pub async fn read_sessions<S: Storage, C: Clock>(
  State(state): State<SharedStores<S, C>>,
  Path(id): Path<ChildId>,
  Json(body): Json<ReadBody<SessionId>>,
) -> Result<StatusCode, ApiError> {
  state.lock().await.domain.mark_sessions_read(&id, body.ids)?;
  Ok(StatusCode::NO_CONTENT)
}

/// `POST /children/:id/read/progress`
pub async fn read_progress<S: Storage, C: Clock>(
  State(state): State<SharedStores<S, C>>,
  Path(id): Path<ChildId>,
  Json(body): Json<ReadBody<ProgressEntryId>>,
) -> Result<StatusCode, ApiError> {
  state.lock().await.domain.mark_progress_read(&id, body.ids)?;
  Ok(StatusCode::NO_CONTENT)
}
