//! Handlers for sessions, reports, and the per-child counters.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/sessions` | Body: [`NewSession`] |
//! | `GET`    | `/sessions/:id` | |
//! | `PATCH`  | `/sessions/:id` | Body: `{"title":"..."}` |
//! | `DELETE` | `/sessions/:id` | Also deletes its reports |
//! | `GET`    | `/sessions/:id/reports` | Submitted reports only |
//! | `GET`    | `/groups/:id/sessions` | Newest first |
//! | `GET`    | `/trainers/:id/sessions` | Newest first |
//! | `GET`    | `/children/:id/sessions?groupId=` | Sessions since the child joined |
//! | `GET`    | `/children/:id/reports[?groupId=]` | Submitted, most recent first |
//! | `GET`    | `/children/:id/counters?groupId=` | [`Counters`] |
//! | `POST`   | `/reports` | Body: [`NewReport`]; 409 if one exists for the pair |
//! | `GET`    | `/reports/lookup?sessionId=&childId=` | 404 if none |
//! | `GET`    | `/reports/:id` | |
//! | `PUT`    | `/reports/:id` | Body: [`ReportUpdate`] |
//! | `POST`   | `/reports/:id/submit` | |

use std::collections::BTreeMap;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use pitchside_core::{
  Clock, Storage, Timestamp,
  id::{CategoryId, ChildId, GroupId, ReportId, SessionId, UserId},
  session::{Category, CategoryKind, Report, ReportStatus, ReportValue, Session},
};
use serde::{Deserialize, Serialize};

use crate::{SharedStores, error::ApiError, roster::non_blank};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupParams {
  pub group_id: GroupId,
}

// ─── Sessions ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct NewCategory {
  pub id:   Option<CategoryId>,
  pub name: String,
  #[serde(rename = "type")]
  pub kind: CategoryKind,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSession {
  pub title:      String,
  pub date:       Timestamp,
  pub categories: Vec<NewCategory>,
  pub trainer_id: UserId,
  pub group_id:   GroupId,
}

/// `POST /sessions`
pub async fn create_session<S: Storage, C: Clock>(
  State(state): State<SharedStores<S, C>>,
  Json(body): Json<NewSession>,
) -> Result<impl IntoResponse, ApiError> {
  let title = non_blank(body.title, "session title")?;
  if body.categories.is_empty() {
    return Err(ApiError::BadRequest(
      "a session needs at least one category".into(),
    ));
  }
  let mut stores = state.lock().await;
  if stores.domain.group(&body.group_id).is_none() {
    return Err(ApiError::not_found("group", &body.group_id));
  }
  let session = Session {
    id:         SessionId::generate(),
    title,
    date:       body.date,
    categories: body
      .categories
      .into_iter()
      .map(|c| Category {
        id:   c.id.unwrap_or_else(CategoryId::generate),
        name: c.name,
        kind: c.kind,
      })
      .collect(),
    trainer_id: body.trainer_id,
    group_id:   body.group_id,
  };
  stores.domain.add_session(session.clone())?;
  Ok((StatusCode::CREATED, Json(session)))
}

/// `GET /sessions/:id`
pub async fn get_session<S: Storage, C: Clock>(
  State(state): State<SharedStores<S, C>>,
  Path(id): Path<SessionId>,
) -> Result<Json<Session>, ApiError> {
  let stores = state.lock().await;
  let session = stores
    .domain
    .session(&id)
    .ok_or_else(|| ApiError::not_found("session", &id))?;
  Ok(Json(session.clone()))
}

#[derive(Debug, Deserialize)]
pub struct Retitle {
  pub title: String,
}

/// `PATCH /sessions/:id`
pub async fn retitle_session<S: Storage, C: Clock>(
  State(state): State<SharedStores<S, C>>,
  Path(id): Path<SessionId>,
  Json(body): Json<Retitle>,
) -> Result<Json<Session>, ApiError> {
  let title = non_blank(body.title, "session title")?;
  let mut stores = state.lock().await;
  stores.domain.update_session_title(&id, title)?;
  let session = stores
    .domain
    .session(&id)
    .ok_or_else(|| ApiError::not_found("session", &id))?;
  Ok(Json(session.clone()))
}

/// `DELETE /sessions/:id`
pub async fn delete_session<S: Storage, C: Clock>(
  State(state): State<SharedStores<S, C>>,
  Path(id): Path<SessionId>,
) -> Result<StatusCode, ApiError> {
  state.lock().await.domain.delete_session(&id)?;
  Ok(StatusCode::NO_CONTENT)
}

/// `GET /groups/:id/sessions`
pub async fn group_sessions<S: Storage, C: Clock>(
  State(state): State<SharedStores<S, C>>,
  Path(id): Path<GroupId>,
) -> Json<Vec<Session>> {
  let stores = state.lock().await;
  Json(stores.domain.sessions_for_group(&id).into_iter().cloned().collect())
}

/// `GET /trainers/:id/sessions`
pub async fn trainer_sessions<S: Storage, C: Clock>(
  State(state): State<SharedStores<S, C>>,
  Path(id): Path<UserId>,
) -> Json<Vec<Session>> {
  let stores = state.lock().await;
  Json(stores.domain.sessions_for_trainer(&id).into_iter().cloned().collect())
}

/// `GET /children/:id/sessions?groupId=<id>`
pub async fn visible_sessions<S: Storage, C: Clock>(
  State(state): State<SharedStores<S, C>>,
  Path(id): Path<ChildId>,
  Query(params): Query<GroupParams>,
) -> Json<Vec<Session>> {
  let stores = state.lock().await;
  Json(
    stores
      .domain
      .visible_sessions_for_child(&id, &params.group_id)
      .into_iter()
      .cloned()
      .collect(),
  )
}

/// `GET /sessions/:id/reports`
pub async fn session_reports<S: Storage, C: Clock>(
  State(state): State<SharedStores<S, C>>,
  Path(id): Path<SessionId>,
) -> Json<Vec<Report>> {
  let stores = state.lock().await;
  Json(
    stores
      .domain
      .submitted_reports_for_session(&id)
      .into_iter()
      .cloned()
      .collect(),
  )
}

// ─── Reports ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReport {
  pub session_id: SessionId,
  pub child_id:   ChildId,
  pub parent_id:  UserId,
  #[serde(default)]
  pub values:     BTreeMap<CategoryId, ReportValue>,
  /// Defaults to `draft`.
  pub status:     Option<ReportStatus>,
}

/// `POST /reports`
pub async fn create_report<S: Storage, C: Clock>(
  State(state): State<SharedStores<S, C>>,
  Json(body): Json<NewReport>,
) -> Result<impl IntoResponse, ApiError> {
  let mut stores = state.lock().await;
  if let Some(existing) = stores
    .domain
    .report_for_session_and_child(&body.session_id, &body.child_id)
  {
    return Err(ApiError::Conflict(format!(
      "report {} already exists for this session and child",
      existing.id
    )));
  }

  let id = ReportId::generate();
  let report = Report {
    id:           id.clone(),
    session_id:   body.session_id,
    child_id:     body.child_id,
    parent_id:    body.parent_id,
    status:       body.status.unwrap_or(ReportStatus::Draft),
    values:       body.values,
    updated_at:   stores.domain.now(),
    submitted_at: None,
  };
  stores.domain.add_report(report)?;
  let stored = stores
    .domain
    .report(&id)
    .ok_or_else(|| ApiError::not_found("report", &id))?;
  Ok((StatusCode::CREATED, Json(stored.clone())))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupParams {
  pub session_id: SessionId,
  pub child_id:   ChildId,
}

/// `GET /reports/lookup?sessionId=<id>&childId=<id>`
pub async fn lookup_report<S: Storage, C: Clock>(
  State(state): State<SharedStores<S, C>>,
  Query(params): Query<LookupParams>,
) -> Result<Json<Report>, ApiError> {
  let stores = state.lock().await;
  let report = stores
    .domain
    .report_for_session_and_child(&params.session_id, &params.child_id)
    .ok_or_else(|| {
      ApiError::NotFound(format!(
        "no report for session {} and child {}",
        params.session_id, params.child_id
      ))
    })?;
  Ok(Json(report.clone()))
}

/// `GET /reports/:id`
pub async fn get_report<S: Storage, C: Clock>(
  State(state): State<SharedStores<S, C>>,
  Path(id): Path<ReportId>,
) -> Result<Json<Report>, ApiError> {
  let stores = state.lock().await;
  let report = stores
    .domain
    .report(&id)
    .ok_or_else(|| ApiError::not_found("report", &id))?;
  Ok(Json(report.clone()))
}

#[derive(Debug, Deserialize)]
pub struct ReportUpdate {
  pub values: BTreeMap<CategoryId, ReportValue>,
  pub status: Option<ReportStatus>,
}

/// `PUT /reports/:id`
///
/// Replaces the values. A submitted report stays submitted whatever status
/// is sent.
pub async fn update_report<S: Storage, C: Clock>(
  State(state): State<SharedStores<S, C>>,
  Path(id): Path<ReportId>,
  Json(body): Json<ReportUpdate>,
) -> Result<Json<Report>, ApiError> {
  let mut stores = state.lock().await;
  let mut report = stores
    .domain
    .report(&id)
    .cloned()
    .ok_or_else(|| ApiError::not_found("report", &id))?;
  report.values = body.values;
  if let Some(status) = body.status {
    report.status = status;
  }
  stores.domain.update_report(report)?;

  let stored = stores
    .domain
    .report(&id)
    .ok_or_else(|| ApiError::not_found("report", &id))?;
  Ok(Json(stored.clone()))
}

/// `POST /reports/:id/submit`
pub async fn submit_report<S: Storage, C: Clock>(
  State(state): State<SharedStores<S, C>>,
  Path(id): Path<ReportId>,
) -> Result<Json<Report>, ApiError> {
  let mut stores = state.lock().await;
  stores.domain.submit_report(&id)?;
  let report = stores
    .domain
    .report(&id)
    .ok_or_else(|| ApiError::not_found("report", &id))?;
  Ok(Json(report.clone()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildReportParams {
  pub group_id: Option<GroupId>,
}

/// `GET /children/:id/reports[?groupId=<id>]`
pub async fn child_reports<S: Storage, C: Clock>(
  State(state): State<SharedStores<S, C>>,
  Path(id): Path<ChildId>,
  Query(params): Query<ChildReportParams>,
) -> Json<Vec<Report>> {
  let stores = state.lock().await;
  let reports = match &params.group_id {
    Some(group_id) => stores
      .domain
      .submitted_reports_for_child_in_group(&id, group_id),
    None => stores.domain.submitted_reports_for_child(&id),
  };
  Json(reports.into_iter().cloned().collect())
}

// ─── Counters ─────────────────────────────────────────────────────────────────

/// The badge numbers a parent sees for one child in one group.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Counters {
  pub pending_sessions: usize,
  pub unread_sessions:  usize,
  pub unread_progress:  usize,
}

/// `GET /children/:id/counters?groupId=<id>`
pub async fn counters<S: Storage, C: Clock>(
  State(state): State<SharedStores<S, C>>,
  Path(id): Path<ChildId>,
  Query(params): Query<GroupParams>,
) -> Json<Counters> {
  let stores = state.lock().await;
  let domain = &stores.domain;
  Json(Counters {
    pending_sessions: domain.pending_sessions_count_for_child(&id, &params.group_id),
    unread_sessions:  domain.unread_session_count(&id, &params.group_id),
    unread_progress:  domain.unread_progress_count(&id),
  })
}
