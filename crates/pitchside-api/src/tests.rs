//! Router-level tests driving the API through `tower::ServiceExt::oneshot`.

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use pitchside_core::MemoryStorage;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::{AppStores, api_router};

fn app() -> Router {
  let stores = AppStores::open(MemoryStorage::new())
    .expect("in-memory stores")
    .into_shared();
  api_router(stores)
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
  let builder = Request::builder().method(method).uri(uri);
  let req = match body {
    Some(json) => builder
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(json.to_string()))
      .unwrap(),
    None => builder.body(Body::empty()).unwrap(),
  };
  let resp = app.clone().oneshot(req).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
    .await
    .unwrap();
  let value = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, value)
}

/// A trainer with group "U10" and a parent with child "Ola" in it.
struct Club {
  trainer: String,
  parent:  String,
  group:   String,
  child:   String,
}

async fn club(app: &Router) -> Club {
  let (_, trainer) = call(
    app,
    "POST",
    "/auth/register",
    Some(json!({"name":"Anna Nowak","email":"anna@example.com","password":"secret","role":"trainer"})),
  )
  .await;
  let (_, parent) = call(
    app,
    "POST",
    "/auth/register",
    Some(json!({"name":"Piotr","email":"piotr@example.com","password":"secret","role":"parent"})),
  )
  .await;
  let trainer = trainer["id"].as_str().unwrap().to_owned();
  let parent = parent["id"].as_str().unwrap().to_owned();

  let (_, group) = call(
    app,
    "POST",
    "/groups",
    Some(json!({"name":"U10","trainerId": trainer})),
  )
  .await;
  let (_, child) = call(
    app,
    "POST",
    "/children",
    Some(json!({"name":"Ola","parentId": parent})),
  )
  .await;
  let group = group["id"].as_str().unwrap().to_owned();
  let child = child["id"].as_str().unwrap().to_owned();

  let (_, request) = call(
    app,
    "POST",
    "/join-requests",
    Some(json!({"childId": child, "groupId": group})),
  )
  .await;
  let uri = format!("/join-requests/{}/accept", request["id"].as_str().unwrap());
  call(app, "POST", &uri, None).await;

  Club { trainer, parent, group, child }
}

async fn create_session(app: &Router, club: &Club, date: &str) -> String {
  let (status, session) = call(
    app,
    "POST",
    "/sessions",
    Some(json!({
      "title": "Passing drills",
      "date": date,
      "categories": [{"name":"Goals","type":"counter"}],
      "trainerId": club.trainer,
      "groupId": club.group,
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  session["id"].as_str().unwrap().to_owned()
}

// ── Auth ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn register_signs_in_and_logout_signs_out() {
  let app = app();
  let (status, profile) = call(
    &app,
    "POST",
    "/auth/register",
    Some(json!({"name":"Anna","email":"Anna@Example.com","password":"secret","role":"trainer"})),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(profile["email"], "anna@example.com");
  assert!(profile.get("passwordHash").is_none());

  let (_, me) = call(&app, "GET", "/auth/me", None).await;
  assert_eq!(me["id"], profile["id"]);

  let (status, _) = call(&app, "POST", "/auth/logout", None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  let (_, me) = call(&app, "GET", "/auth/me", None).await;
  assert!(me.is_null());

  let (status, _) = call(
    &app,
    "POST",
    "/auth/login",
    Some(json!({"email":"anna@example.com","password":"secret"})),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn auth_validation_is_400_with_message() {
  let app = app();
  let (status, body) = call(
    &app,
    "POST",
    "/auth/register",
    Some(json!({"name":"A","email":"a@example.com","password":"abc","role":"parent"})),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "password must be at least 4 characters");

  let (status, body) = call(
    &app,
    "POST",
    "/auth/login",
    Some(json!({"email":"nobody@example.com","password":"secret"})),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "no account found for this email");
}

// ── Roster ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn join_request_flow_places_child_in_group() {
  let app = app();
  let club = club(&app).await;

  let (_, child) = call(&app, "GET", &format!("/children/{}", club.child), None).await;
  assert_eq!(child["groupId"], club.group.as_str());
  assert_eq!(child["trainerId"], club.trainer.as_str());
  assert!(child["joinedGroupAt"].is_string());

  let (_, notes) = call(
    &app,
    "GET",
    &format!("/users/{}/notifications", club.trainer),
    None,
  )
  .await;
  assert_eq!(notes.as_array().unwrap().len(), 1);
  assert_eq!(notes[0]["message"], "Ola wants to join group \"U10\"");
  assert_eq!(notes[0]["actionType"], "join_request");

  let (_, pending) = call(
    &app,
    "GET",
    &format!("/trainers/{}/pending-requests", club.trainer),
    None,
  )
  .await;
  assert_eq!(pending["count"], 0);

  let (_, requests) = call(
    &app,
    "GET",
    &format!("/join-requests?parentId={}", club.parent),
    None,
  )
  .await;
  assert_eq!(requests[0]["status"], "accepted");
}

#[tokio::test]
async fn missing_entities_are_404() {
  let app = app();
  let (status, body) = call(&app, "GET", "/groups/nope", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["error"], "group nope not found");

  let (status, _) = call(
    &app,
    "POST",
    "/join-requests",
    Some(json!({"childId":"ghost","groupId":"nope"})),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sessions_and_events_need_an_existing_group() {
  let app = app();
  let club = club(&app).await;

  let (status, body) = call(
    &app,
    "POST",
    "/sessions",
    Some(json!({
      "title": "Passing drills",
      "date": "2999-01-01",
      "categories": [{"name":"Goals","type":"counter"}],
      "trainerId": club.trainer,
      "groupId": "no-such-group",
    })),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["error"], "group no-such-group not found");

  let (status, body) = call(
    &app,
    "POST",
    "/sessions",
    Some(json!({
      "title": "Passing drills",
      "date": "2999-01-01",
      "categories": [],
      "trainerId": club.trainer,
      "groupId": club.group,
    })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "a session needs at least one category");

  let (status, _) = call(
    &app,
    "POST",
    "/events",
    Some(json!({
      "groupId": "no-such-group",
      "title": "Friendly",
      "date": "2999-02-03",
      "time": "17:00",
      "createdBy": club.trainer,
    })),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (_, sessions) =
    call(&app, "GET", &format!("/trainers/{}/sessions", club.trainer), None).await;
  assert_eq!(sessions, json!([]));
}

#[tokio::test]
async fn list_children_needs_exactly_one_filter() {
  let app = app();
  let (status, _) = call(&app, "GET", "/children", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  let (status, _) = call(&app, "GET", "/children?parentId=a&trainerId=b", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_group_detaches_children() {
  let app = app();
  let club = club(&app).await;
  create_session(&app, &club, "2999-01-01").await;

  let (status, _) = call(&app, "DELETE", &format!("/groups/{}", club.group), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);

  let (_, sessions) = call(
    &app,
    "GET",
    &format!("/groups/{}/sessions", club.group),
    None,
  )
  .await;
  assert_eq!(sessions, json!([]));
  let (_, child) = call(&app, "GET", &format!("/children/{}", club.child), None).await;
  assert!(child.get("groupId").is_none());
}

#[tokio::test]
async fn trainer_search_returns_groups() {
  let app = app();
  let club = club(&app).await;

  let (_, hits) = call(&app, "GET", "/trainers/search?q=nowak", None).await;
  assert_eq!(hits.as_array().unwrap().len(), 1);
  assert_eq!(hits[0]["id"], club.trainer.as_str());
  assert_eq!(hits[0]["groups"][0]["name"], "U10");

  let (_, hits) = call(&app, "GET", "/trainers/search?q=", None).await;
  assert_eq!(hits, json!([]));
  // Parents never match.
  let (_, hits) = call(&app, "GET", "/trainers/search?q=piotr", None).await;
  assert_eq!(hits, json!([]));
}

// ── Sessions and reports ────────────────────────────────────────────────────

#[tokio::test]
async fn submitting_a_report_clears_the_pending_counter() {
  let app = app();
  let club = club(&app).await;
  let session = create_session(&app, &club, "2999-01-01").await;
  let counters_uri = format!("/children/{}/counters?groupId={}", club.child, club.group);

  let (_, counters) = call(&app, "GET", &counters_uri, None).await;
  assert_eq!(counters["pendingSessions"], 1);
  assert_eq!(counters["unreadSessions"], 1);

  let (status, report) = call(
    &app,
    "POST",
    "/reports",
    Some(json!({
      "sessionId": session,
      "childId": club.child,
      "parentId": club.parent,
      "values": {"goals": 3},
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(report["status"], "draft");
  let (_, counters) = call(&app, "GET", &counters_uri, None).await;
  assert_eq!(counters["pendingSessions"], 1);

  let uri = format!("/reports/{}/submit", report["id"].as_str().unwrap());
  let (_, submitted) = call(&app, "POST", &uri, None).await;
  assert_eq!(submitted["status"], "submitted");
  assert!(submitted["submittedAt"].is_string());

  let (_, counters) = call(&app, "GET", &counters_uri, None).await;
  assert_eq!(counters["pendingSessions"], 0);

  let (status, _) = call(
    &app,
    "POST",
    "/reports",
    Some(json!({"sessionId": session, "childId": club.child, "parentId": club.parent})),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn updating_a_submitted_report_keeps_it_submitted() {
  let app = app();
  let club = club(&app).await;
  let session = create_session(&app, &club, "2999-01-01").await;

  let (_, report) = call(
    &app,
    "POST",
    "/reports",
    Some(json!({
      "sessionId": session,
      "childId": club.child,
      "parentId": club.parent,
      "status": "submitted",
      "values": {"notes": "good game"},
    })),
  )
  .await;
  let uri = format!("/reports/{}", report["id"].as_str().unwrap());

  let (status, updated) = call(
    &app,
    "PUT",
    &uri,
    Some(json!({"values": {"notes": "great game"}, "status": "draft"})),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(updated["status"], "submitted");
  assert_eq!(updated["submittedAt"], report["submittedAt"]);
  assert_eq!(updated["values"]["notes"], "great game");

  let (_, lookup) = call(
    &app,
    "GET",
    &format!("/reports/lookup?sessionId={session}&childId={}", club.child),
    None,
  )
  .await;
  assert_eq!(lookup["id"], report["id"]);
}

#[tokio::test]
async fn putting_a_draft_as_submitted_stamps_it() {
  let app = app();
  let club = club(&app).await;
  let session = create_session(&app, &club, "2999-01-01").await;

  let (_, report) = call(
    &app,
    "POST",
    "/reports",
    Some(json!({"sessionId": session, "childId": club.child, "parentId": club.parent})),
  )
  .await;
  assert_eq!(report["status"], "draft");
  let uri = format!("/reports/{}", report["id"].as_str().unwrap());

  let (status, updated) = call(
    &app,
    "PUT",
    &uri,
    Some(json!({"values": {"notes": "late goal"}, "status": "submitted"})),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(updated["status"], "submitted");
  assert!(updated["submittedAt"].is_string());
}

#[tokio::test]
async fn read_tracking_lowers_unread_counts() {
  let app = app();
  let club = club(&app).await;
  let session = create_session(&app, &club, "2999-01-01").await;

  let (status, _) = call(
    &app,
    "POST",
    &format!("/children/{}/read/sessions", club.child),
    Some(json!({"ids": [session]})),
  )
  .await;
  assert_eq!(status, StatusCode::NO_CONTENT);

  let (_, unread) = call(
    &app,
    "GET",
    &format!("/children/{}/unread-sessions?groupId={}", club.child, club.group),
    None,
  )
  .await;
  assert_eq!(unread, json!([]));
}

// ── Progress ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn progress_entry_notifies_parent() {
  let app = app();
  let club = club(&app).await;

  let (status, entry) = call(
    &app,
    "POST",
    "/progress",
    Some(json!({
      "childId": club.child,
      "groupId": club.group,
      "trainerId": club.trainer,
      "period": "month",
      "description": "Much better positioning",
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);

  let (_, notes) = call(
    &app,
    "GET",
    &format!("/users/{}/notifications?unread=true", club.parent),
    None,
  )
  .await;
  assert_eq!(notes[0]["message"], "New monthly progress note for Ola");
  assert_eq!(notes[0]["actionId"], entry["id"]);

  let uri = format!("/notifications/{}/read", notes[0]["id"].as_str().unwrap());
  call(&app, "POST", &uri, None).await;
  let (_, notes) = call(
    &app,
    "GET",
    &format!("/users/{}/notifications?unread=true", club.parent),
    None,
  )
  .await;
  assert_eq!(notes, json!([]));
}

// ── Calendar ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn attendance_sheet_is_replaced_wholesale() {
  let app = app();
  let club = club(&app).await;
  let (_, event) = call(
    &app,
    "POST",
    "/events",
    Some(json!({
      "groupId": club.group,
      "title": "Match vs Orły",
      "date": "2999-02-03",
      "time": "17:00",
      "createdBy": club.trainer,
    })),
  )
  .await;
  let uri = format!("/events/{}/attendance", event["id"].as_str().unwrap());

  call(
    &app,
    "PUT",
    &uri,
    Some(json!({"markedBy": club.trainer, "statuses": {club.child.clone(): "PRESENT", "c2": "ABSENT"}})),
  )
  .await;
  let (status, sheet) = call(
    &app,
    "PUT",
    &uri,
    Some(json!({"markedBy": club.trainer, "statuses": {club.child.clone(): "ABSENT", "c2": null}})),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(sheet, json!({club.child.clone(): "ABSENT"}));

  let (_, month) = call(
    &app,
    "GET",
    &format!("/groups/{}/events?year=2999&month=2", club.group),
    None,
  )
  .await;
  assert_eq!(month.as_array().unwrap().len(), 1);
  let (status, _) = call(
    &app,
    "GET",
    &format!("/groups/{}/events?year=2999&month=13", club.group),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}
