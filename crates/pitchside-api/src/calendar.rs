//! Handlers for calendar events and attendance.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/groups/:id/events[?year=&month=]` | Date then time ascending |
//! | `GET`    | `/children/:id/events?groupId=` | Events since the child joined |
//! | `POST`   | `/events` | Body: [`NewEvent`] |
//! | `GET`    | `/events/:id` | |
//! | `PUT`    | `/events/:id` | Body: [`EventUpdate`] |
//! | `DELETE` | `/events/:id` | Also deletes its attendance |
//! | `GET`    | `/events/:id/attendance` | `{"<childId>":"PRESENT"}` |
//! | `PUT`    | `/events/:id/attendance` | Body: [`AttendanceSheet`]; replaces the sheet |

use std::collections::BTreeMap;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use pitchside_core::{
  Clock, Storage, Timestamp,
  calendar::{AttendanceStatus, CalendarEvent},
  id::{ChildId, EventId, GroupId, UserId},
};
use serde::Deserialize;

use crate::{SharedStores, error::ApiError, reports::GroupParams, roster::non_blank};

// ─── Listing ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct MonthParams {
  pub year:  Option<i32>,
  /// 1-based.
  pub month: Option<u32>,
}

/// `GET /groups/:id/events[?year=<yyyy>&month=<m>]`
pub async fn group_events<S: Storage, C: Clock>(
  State(state): State<SharedStores<S, C>>,
  Path(id): Path<GroupId>,
  Query(params): Query<MonthParams>,
) -> Result<Json<Vec<CalendarEvent>>, ApiError> {
  let stores = state.lock().await;
  let events = match (params.year, params.month) {
    (Some(year), Some(month @ 1..=12)) => {
      stores.domain.calendar_events_for_month(&id, year, month)
    }
    (Some(_), Some(month)) => {
      return Err(ApiError::BadRequest(format!("month {month} is out of range")));
    }
    (None, None) => stores.domain.calendar_events_for_group(&id),
    _ => {
      return Err(ApiError::BadRequest("year and month go together".into()));
    }
  };
  Ok(Json(events.into_iter().cloned().collect()))
}

/// `GET /children/:id/events?groupId=<id>`
pub async fn visible_events<S: Storage, C: Clock>(
  State(state): State<SharedStores<S, C>>,
  Path(id): Path<ChildId>,
  Query(params): Query<GroupParams>,
) -> Json<Vec<CalendarEvent>> {
  let stores = state.lock().await;
  Json(
    stores
      .domain
      .visible_calendar_events_for_child(&id, &params.group_id)
      .into_iter()
      .cloned()
      .collect(),
  )
}

// ─── Events ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
  pub group_id:   GroupId,
  pub title:      String,
  pub date:       Timestamp,
  pub time:       String,
  #[serde(default)]
  pub location:   String,
  pub created_by: UserId,
}

/// `POST /events`
pub async fn create_event<S: Storage, C: Clock>(
  State(state): State<SharedStores<S, C>>,
  Json(body): Json<NewEvent>,
) -> Result<impl IntoResponse, ApiError> {
  let title = non_blank(body.title, "event title")?;
  let mut stores = state.lock().await;
  if stores.domain.group(&body.group_id).is_none() {
    return Err(ApiError::not_found("group", &body.group_id));
  }
  let now = stores.domain.now();
  let event = CalendarEvent {
    id: EventId::generate(),
    group_id: body.group_id,
    title,
    date: body.date,
    time: body.time,
    location: body.location,
    created_by: body.created_by,
    created_at: now.clone(),
    updated_at: now,
  };
  stores.domain.add_calendar_event(event.clone())?;
  Ok((StatusCode::CREATED, Json(event)))
}

/// `GET /events/:id`
pub async fn get_event<S: Storage, C: Clock>(
  State(state): State<SharedStores<S, C>>,
  Path(id): Path<EventId>,
) -> Result<Json<CalendarEvent>, ApiError> {
  let stores = state.lock().await;
  let event = stores
    .domain
    .calendar_event(&id)
    .ok_or_else(|| ApiError::not_found("event", &id))?;
  Ok(Json(event.clone()))
}

#[derive(Debug, Deserialize)]
pub struct EventUpdate {
  pub title:    String,
  pub date:     Timestamp,
  pub time:     String,
  #[serde(default)]
  pub location: String,
}

/// `PUT /events/:id`
pub async fn update_event<S: Storage, C: Clock>(
  State(state): State<SharedStores<S, C>>,
  Path(id): Path<EventId>,
  Json(body): Json<EventUpdate>,
) -> Result<Json<CalendarEvent>, ApiError> {
  let title = non_blank(body.title, "event title")?;
  let mut stores = state.lock().await;
  let mut event = stores
    .domain
    .calendar_event(&id)
    .cloned()
    .ok_or_else(|| ApiError::not_found("event", &id))?;
  event.title = title;
  event.date = body.date;
  event.time = body.time;
  event.location = body.location;
  event.updated_at = stores.domain.now();
  stores.domain.update_calendar_event(event.clone())?;
  Ok(Json(event))
}

/// `DELETE /events/:id`
pub async fn delete_event<S: Storage, C: Clock>(
  State(state): State<SharedStores<S, C>>,
  Path(id): Path<EventId>,
) -> Result<StatusCode, ApiError> {
  state.lock().await.domain.delete_calendar_event(&id)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Attendance ───────────────────────────────────────────────────────────────

/// `GET /events/:id/attendance`
pub async fn get_attendance<S: Storage, C: Clock>(
  State(state): State<SharedStores<S, C>>,
  Path(id): Path<EventId>,
) -> Json<BTreeMap<ChildId, AttendanceStatus>> {
  Json(state.lock().await.domain.attendance_for_event(&id))
}

/// A full attendance sheet. `null` leaves a child unmarked.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSheet {
  pub marked_by: UserId,
  pub statuses:  BTreeMap<ChildId, Option<AttendanceStatus>>,
}

/// `PUT /events/:id/attendance`
pub async fn save_attendance<S: Storage, C: Clock>(
  State(state): State<SharedStores<S, C>>,
  Path(id): Path<EventId>,
  Json(body): Json<AttendanceSheet>,
) -> Result<Json<BTreeMap<ChildId, AttendanceStatus>>, ApiError> {
  let mut stores = state.lock().await;
  if stores.domain.calendar_event(&id).is_none() {
    return Err(ApiError::not_found("event", &id));
  }
  stores
    .domain
    .save_attendance(&id, &body.statuses, &body.marked_by)?;
  Ok(Json(stores.domain.attendance_for_event(&id)))
}
