//! Handlers for `/api/notes` endpoints.
//!
//! | Method   | Path                          | Notes                              |
//! |----------|-------------------------------|------------------------------------|
//! | `GET`    | `/notes`                      | `?status&page&limit&sort`          |
//! | `POST`   | `/notes`                      | 201; children created atomically   |
//! | `GET`    | `/notes/{id}`                 | Full detail                        |
//! | `PUT`    | `/notes/{id}`                 | Partial update                     |
//! | `DELETE` | `/notes/{id}`                 | 204; refused while active          |
//! | `PATCH`  | `/notes/{id}/status`          | Body: `{"status":"active"}`        |
//! | `PUT`    | `/notes/{id}/reflection`      | Create or replace                  |
//! | `POST`   | `/notes/{id}/share`           | Issues a fresh token               |
//! | `DELETE` | `/notes/{id}/share`           | 204                                |

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use leavenote_core::{
  note::{NewNote, NotePatch, NoteStatus, Reflection, ReflectionInput},
  service::NoteFilter,
  store::NoteStore,
  view::{NotePage, ShareLink},
};
use serde::{Deserialize, Serialize};

use crate::{
  AppState,
  auth::Principal,
  error::ApiError,
  extract::{NoteId, ValidJson, ValidQuery},
};

/// `{"note": ...}` response body.
#[derive(Serialize)]
pub struct NoteBody<T> {
  pub note: T,
}

#[derive(Serialize)]
pub struct ReflectionBody {
  pub reflection: Reflection,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatusBody {
  pub status: NoteStatus,
}

// ─── Collection ──────────────────────────────────────────────────────────────

/// `GET /notes`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Principal(user): Principal,
  ValidQuery(filter): ValidQuery<NoteFilter>,
) -> Result<Json<NotePage>, ApiError>
where
  S: NoteStore + 'static,
{
  Ok(Json(state.notes().list_notes(user.id, filter).await?))
}

/// `POST /notes`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Principal(user): Principal,
  ValidJson(body): ValidJson<NewNote>,
) -> Result<impl IntoResponse, ApiError>
where
  S: NoteStore + 'static,
{
  let note = state.notes().create_note(user.id, body).await?;
  Ok((StatusCode::CREATED, Json(NoteBody { note })))
}

// ─── Single note ─────────────────────────────────────────────────────────────

/// `GET /notes/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Principal(user): Principal,
  NoteId(id): NoteId,
) -> Result<impl IntoResponse, ApiError>
where
  S: NoteStore + 'static,
{
  let note = state.notes().get_note(id, user.id).await?;
  Ok(Json(NoteBody { note }))
}

/// `PUT /notes/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  Principal(user): Principal,
  NoteId(id): NoteId,
  ValidJson(patch): ValidJson<NotePatch>,
) -> Result<impl IntoResponse, ApiError>
where
  S: NoteStore + 'static,
{
  let note = state.notes().update_note(id, user.id, patch).await?;
  Ok(Json(NoteBody { note }))
}

/// `DELETE /notes/{id}`
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  Principal(user): Principal,
  NoteId(id): NoteId,
) -> Result<StatusCode, ApiError>
where
  S: NoteStore + 'static,
{
  state.notes().delete_note(id, user.id).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `PATCH /notes/{id}/status`
pub async fn update_status<S>(
  State(state): State<AppState<S>>,
  Principal(user): Principal,
  NoteId(id): NoteId,
  ValidJson(body): ValidJson<StatusBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: NoteStore + 'static,
{
  let note = state.notes().update_status(id, user.id, body.status).await?;
  Ok(Json(NoteBody { note }))
}

/// `PUT /notes/{id}/reflection`
pub async fn save_reflection<S>(
  State(state): State<AppState<S>>,
  Principal(user): Principal,
  NoteId(id): NoteId,
  ValidJson(body): ValidJson<ReflectionInput>,
) -> Result<Json<ReflectionBody>, ApiError>
where
  S: NoteStore + 'static,
{
  let reflection = state.notes().save_reflection(id, user.id, body).await?;
  Ok(Json(ReflectionBody { reflection }))
}

// ─── Sharing ─────────────────────────────────────────────────────────────────

/// `POST /notes/{id}/share`
pub async fn share<S>(
  State(state): State<AppState<S>>,
  Principal(user): Principal,
  NoteId(id): NoteId,
) -> Result<Json<ShareLink>, ApiError>
where
  S: NoteStore + 'static,
{
  Ok(Json(state.notes().generate_share_token(id, user.id).await?))
}

/// `DELETE /notes/{id}/share`
pub async fn unshare<S>(
  State(state): State<AppState<S>>,
  Principal(user): Principal,
  NoteId(id): NoteId,
) -> Result<StatusCode, ApiError>
where
  S: NoteStore + 'static,
{
  state.notes().disable_sharing(id, user.id).await?;
  Ok(StatusCode::NO_CONTENT)
}
