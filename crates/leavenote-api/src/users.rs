//! Handlers for `/api/auth` endpoints.

use axum::{Json, extract::State};
use leavenote_core::{
  store::NoteStore,
  user::{ProfileUpdate, User},
};
use serde::Serialize;

use crate::{AppState, auth::Principal, error::ApiError, extract::ValidJson};

#[derive(Serialize)]
pub struct UserBody {
  pub user: User,
}

/// `GET /auth/me`
pub async fn me<S>(
  State(state): State<AppState<S>>,
  Principal(user): Principal,
) -> Result<Json<UserBody>, ApiError>
where
  S: NoteStore + 'static,
{
  let user = state.users().get_current_user(user.id).await?;
  Ok(Json(UserBody { user }))
}

/// `PUT /auth/profile`
pub async fn update_profile<S>(
  State(state): State<AppState<S>>,
  Principal(user): Principal,
  ValidJson(body): ValidJson<ProfileUpdate>,
) -> Result<Json<UserBody>, ApiError>
where
  S: NoteStore + 'static,
{
  let user = state.users().update_profile(user.id, body).await?;
  Ok(Json(UserBody { user }))
}
