//! Handlers for groups, children, join requests, and trainer search.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/groups?trainerId=` | A trainer's groups |
//! | `POST`   | `/groups` | Body: `{"name":"U10","trainerId":"..."}` |
//! | `GET`    | `/groups/:id` | 404 if not found |
//! | `PUT`    | `/groups/:id` | Body: `{"name":"..."}` |
//! | `DELETE` | `/groups/:id` | Cascades to sessions, reports, events, attendance |
//! | `GET`    | `/groups/:id/children` | |
//! | `GET`    | `/children?parentId=` or `?trainerId=` | Exactly one filter |
//! | `POST`   | `/children` | Body: [`NewChild`] |
//! | `GET`    | `/children/:id` | |
//! | `PUT`    | `/children/:id` | Body: [`ChildUpdate`] |
//! | `POST`   | `/children/:id/leave-group` | |
//! | `POST`   | `/children/:id/move` | Body: `{"groupId":"..."}` |
//! | `GET`    | `/join-requests?trainerId=` or `?parentId=` | Newest first |
//! | `POST`   | `/join-requests` | Body: `{"childId":"...","groupId":"..."}` |
//! | `POST`   | `/join-requests/:id/accept` | |
//! | `POST`   | `/join-requests/:id/reject` | |
//! | `GET`    | `/trainers/search?q=` | Case-insensitive name match |
//! | `GET`    | `/trainers/:id/pending-requests` | `{"count":n}` |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use pitchside_core::{
  Clock, Storage, Timestamp,
  id::{ChildId, GroupId, JoinRequestId, UserId},
  roster::{Child, Group, JoinRequest, JoinStatus},
  user::TrainerMatch,
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{SharedStores, error::ApiError};

/// Filter accepted by the list endpoints that are scoped to one user.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerParams {
  pub trainer_id: Option<UserId>,
  pub parent_id:  Option<UserId>,
}

// ─── Groups ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainerParams {
  pub trainer_id: UserId,
}

/// `GET /groups?trainerId=<id>`
pub async fn list_groups<S: Storage, C: Clock>(
  State(state): State<SharedStores<S, C>>,
  Query(params): Query<TrainerParams>,
) -> Json<Vec<Group>> {
  let stores = state.lock().await;
  Json(
    stores
      .domain
      .groups_for_trainer(&params.trainer_id)
      .into_iter()
      .cloned()
      .collect(),
  )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGroup {
  pub name:       String,
  pub trainer_id: UserId,
}

/// `POST /groups`
pub async fn create_group<S: Storage, C: Clock>(
  State(state): State<SharedStores<S, C>>,
  Json(body): Json<NewGroup>,
) -> Result<impl IntoResponse, ApiError> {
  let group = Group {
    id:         GroupId::generate(),
    name:       non_blank(body.name, "group name")?,
    trainer_id: body.trainer_id,
  };
  state.lock().await.domain.add_group(group.clone())?;
  Ok((StatusCode::CREATED, Json(group)))
}

/// `GET /groups/:id`
pub async fn get_group<S: Storage, C: Clock>(
  State(state): State<SharedStores<S, C>>,
  Path(id): Path<GroupId>,
) -> Result<Json<Group>, ApiError> {
  let stores = state.lock().await;
  let group = stores
    .domain
    .group(&id)
    .ok_or_else(|| ApiError::not_found("group", &id))?;
  Ok(Json(group.clone()))
}

#[derive(Debug, Deserialize)]
pub struct Rename {
  pub name: String,
}

/// `PUT /groups/:id`
pub async fn rename_group<S: Storage, C: Clock>(
  State(state): State<SharedStores<S, C>>,
  Path(id): Path<GroupId>,
  Json(body): Json<Rename>,
) -> Result<Json<Group>, ApiError> {
  let name = non_blank(body.name, "group name")?;
  let mut stores = state.lock().await;
  stores.domain.update_group(&id, name)?;
  let group = stores
    .domain
    .group(&id)
    .ok_or_else(|| ApiError::not_found("group", &id))?;
  Ok(Json(group.clone()))
}

/// `DELETE /groups/:id`
pub async fn delete_group<S: Storage, C: Clock>(
  State(state): State<SharedStores<S, C>>,
  Path(id): Path<GroupId>,
) -> Result<StatusCode, ApiError> {
  state.lock().await.domain.delete_group(&id)?;
  Ok(StatusCode::NO_CONTENT)
}

/// `GET /groups/:id/children`
pub async fn group_children<S: Storage, C: Clock>(
  State(state): State<SharedStores<S, C>>,
  Path(id): Path<GroupId>,
) -> Json<Vec<Child>> {
  let stores = state.lock().await;
  Json(stores.domain.children_for_group(&id).into_iter().cloned().collect())
}

// ─── Children ─────────────────────────────────────────────────────────────────

/// `GET /children?parentId=<id>` or `GET /children?trainerId=<id>`
pub async fn list_children<S: Storage, C: Clock>(
  State(state): State<SharedStores<S, C>>,
  Query(params): Query<OwnerParams>,
) -> Result<Json<Vec<Child>>, ApiError> {
  let stores = state.lock().await;
  let children = match (&params.parent_id, &params.trainer_id) {
    (Some(parent), None) => stores.domain.children_for_parent(parent),
    (None, Some(trainer)) => stores.domain.children_for_trainer(trainer),
    _ => return Err(one_owner_filter()),
  };
  Ok(Json(children.into_iter().cloned().collect()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewChild {
  pub name:       String,
  pub parent_id:  UserId,
  pub birth_date: Option<Timestamp>,
}

/// `POST /children`
pub async fn create_child<S: Storage, C: Clock>(
  State(state): State<SharedStores<S, C>>,
  Json(body): Json<NewChild>,
) -> Result<impl IntoResponse, ApiError> {
  let mut child = Child::new(
    ChildId::generate(),
    non_blank(body.name, "child name")?,
    body.parent_id,
  );
  child.birth_date = body.birth_date.filter(|d| !d.as_str().is_empty());
  state.lock().await.domain.add_child(child.clone())?;
  Ok((StatusCode::CREATED, Json(child)))
}

/// `GET /children/:id`
pub async fn get_child<S: Storage, C: Clock>(
  State(state): State<SharedStores<S, C>>,
  Path(id): Path<ChildId>,
) -> Result<Json<Child>, ApiError> {
  let stores = state.lock().await;
  Ok(Json(find_child(&stores.domain, &id)?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildUpdate {
  pub name:       String,
  pub birth_date: Option<Timestamp>,
}

/// `PUT /children/:id`
pub async fn update_child<S: Storage, C: Clock>(
  State(state): State<SharedStores<S, C>>,
  Path(id): Path<ChildId>,
  Json(body): Json<ChildUpdate>,
) -> Result<Json<Child>, ApiError> {
  let name = non_blank(body.name, "child name")?;
  let mut stores = state.lock().await;
  stores.domain.update_child(&id, name, body.birth_date)?;
  Ok(Json(find_child(&stores.domain, &id)?))
}

/// `POST /children/:id/leave-group`
pub async fn leave_group<S: Storage, C: Clock>(
  State(state): State<SharedStores<S, C>>,
  Path(id): Path<ChildId>,
) -> Result<Json<Child>, ApiError> {
  let mut stores = state.lock().await;
  stores.domain.remove_child_from_group(&id)?;
  Ok(Json(find_child(&stores.domain, &id)?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveBody {
  pub group_id: GroupId,
}

/// `POST /children/:id/move`
pub async fn move_child<S: Storage, C: Clock>(
  State(state): State<SharedStores<S, C>>,
  Path(id): Path<ChildId>,
  Json(body): Json<MoveBody>,
) -> Result<Json<Child>, ApiError> {
  let mut stores = state.lock().await;
  if stores.domain.group(&body.group_id).is_none() {
    return Err(ApiError::not_found("group", &body.group_id));
  }
  stores.domain.move_child_to_group(&id, &body.group_id)?;
  Ok(Json(find_child(&stores.domain, &id)?))
}

// ─── Join requests ────────────────────────────────────────────────────────────

/// `GET /join-requests?trainerId=<id>` or `GET /join-requests?parentId=<id>`
pub async fn list_join_requests<S: Storage, C: Clock>(
  State(state): State<SharedStores<S, C>>,
  Query(params): Query<OwnerParams>,
) -> Result<Json<Vec<JoinRequest>>, ApiError> {
  let stores = state.lock().await;
  let requests = match (&params.parent_id, &params.trainer_id) {
    (Some(parent), None) => stores.domain.join_requests_for_parent(parent),
    (None, Some(trainer)) => stores.domain.join_requests_for_trainer(trainer),
    _ => return Err(one_owner_filter()),
  };
  Ok(Json(requests.into_iter().cloned().collect()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJoinRequest {
  pub child_id: ChildId,
  pub group_id: GroupId,
}

/// `POST /join-requests`
///
/// The trainer and parent are taken from the group and child.
pub async fn send_join_request<S: Storage, C: Clock>(
  State(state): State<SharedStores<S, C>>,
  Json(body): Json<NewJoinRequest>,
) -> Result<impl IntoResponse, ApiError> {
  let mut stores = state.lock().await;
  let child = find_child(&stores.domain, &body.child_id)?;
  let trainer_id = stores
    .domain
    .group(&body.group_id)
    .ok_or_else(|| ApiError::not_found("group", &body.group_id))?
    .trainer_id
    .clone();

  let request = JoinRequest {
    id: JoinRequestId::generate(),
    child_id: child.id,
    group_id: body.group_id,
    trainer_id,
    parent_id: child.parent_id,
    status: JoinStatus::Pending,
    created_at: stores.domain.now(),
  };
  stores.domain.send_join_request(request.clone())?;
  Ok((StatusCode::CREATED, Json(request)))
}

/// `POST /join-requests/:id/accept`
pub async fn accept_join_request<S: Storage, C: Clock>(
  State(state): State<SharedStores<S, C>>,
  Path(id): Path<JoinRequestId>,
) -> Result<Json<JoinRequest>, ApiError> {
  let mut stores = state.lock().await;
  stores.domain.accept_join_request(&id)?;
  let request = stores
    .domain
    .join_request(&id)
    .ok_or_else(|| ApiError::not_found("join request", &id))?;
  Ok(Json(request.clone()))
}

/// `POST /join-requests/:id/reject`
pub async fn reject_join_request<S: Storage, C: Clock>(
  State(state): State<SharedStores<S, C>>,
  Path(id): Path<JoinRequestId>,
) -> Result<Json<JoinRequest>, ApiError> {
  let mut stores = state.lock().await;
  stores.domain.reject_join_request(&id)?;
  let request = stores
    .domain
    .join_request(&id)
    .ok_or_else(|| ApiError::not_found("join request", &id))?;
  Ok(Json(request.clone()))
}

// ─── Trainers ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct SearchParams {
  #[serde(default)]
  pub q: String,
}

/// `GET /trainers/search?q=<text>`
pub async fn search_trainers<S: Storage, C: Clock>(
  State(state): State<SharedStores<S, C>>,
  Query(params): Query<SearchParams>,
) -> Json<Vec<TrainerMatch>> {
  let stores = state.lock().await;
  Json(
    stores
      .domain
      .search_trainers(stores.identity.all_users(), &params.q),
  )
}

/// `GET /trainers/:id/pending-requests`
pub async fn pending_requests<S: Storage, C: Clock>(
  State(state): State<SharedStores<S, C>>,
  Path(id): Path<UserId>,
) -> Json<Value> {
  let count = state.lock().await.domain.pending_requests_count(&id);
  Json(json!({ "count": count }))
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn find_child<S: Storage, C: Clock>(
  domain: &pitchside_store::DomainStore<S, C>,
  id: &ChildId,
) -> Result<Child, ApiError> {
  domain
    .child(id)
    .cloned()
    .ok_or_else(|| ApiError::not_found("child", id))
}

pub(crate) fn non_blank(value: String, what: &str) -> Result<String, ApiError> {
  let trimmed = value.trim();
  if trimmed.is_empty() {
    return Err(ApiError::BadRequest(format!("{what} must not be empty")));
  }
  Ok(trimmed.to_owned())
}

fn one_owner_filter() -> ApiError {
  ApiError::BadRequest("pass exactly one of parentId or trainerId".into())
}
