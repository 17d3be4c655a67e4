//! Handlers for `/auth` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/auth/register` | Body: [`RegisterBody`]; 201 + profile, signs the user in |
//! | `POST` | `/auth/login` | Body: [`LoginBody`] |
//! | `POST` | `/auth/logout` | 204 |
//! | `GET`  | `/auth/me` | Profile of the signed-in user, or `null` |

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use pitchside_core::{
  Clock, Storage,
  user::{Role, UserProfile},
};
use serde::Deserialize;

use crate::{SharedStores, error::ApiError};

// ─── Register ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  pub name:     String,
  pub email:    String,
  pub password: String,
  pub role:     Role,
}

/// `POST /auth/register`
pub async fn register<S: Storage, C: Clock>(
  State(state): State<SharedStores<S, C>>,
  Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse, ApiError> {
  let mut stores = state.lock().await;
  let user = stores
    .identity
    .register(&body.name, &body.email, &body.password, body.role)?;
  Ok((StatusCode::CREATED, Json(user.profile())))
}

// ─── Login / logout ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub email:    String,
  pub password: String,
}

/// `POST /auth/login`
pub async fn login<S: Storage, C: Clock>(
  State(state): State<SharedStores<S, C>>,
  Json(body): Json<LoginBody>,
) -> Result<Json<UserProfile>, ApiError> {
  let mut stores = state.lock().await;
  let user = stores.identity.login(&body.email, &body.password)?;
  Ok(Json(user.profile()))
}

/// `POST /auth/logout`
pub async fn logout<S: Storage, C: Clock>(
  State(state): State<SharedStores<S, C>>,
) -> Result<StatusCode, ApiError> {
  state.lock().await.identity.logout()?;
  Ok(StatusCode::NO_CONTENT)
}

/// `GET /auth/me`
pub async fn me<S: Storage, C: Clock>(
  State(state): State<SharedStores<S, C>>,
) -> Json<Option<UserProfile>> {
  Json(state.lock().await.identity.current_user().map(|u| u.profile()))
}
