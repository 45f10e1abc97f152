//! The public, unauthenticated read of a shared note.

use axum::{
  Json,
  extract::{Path, State},
};
use leavenote_core::{store::NoteStore, view::RedactedNote};

use crate::{AppState, error::ApiError, notes::NoteBody};

/// `GET /shared/{token}`; no principal required.
pub async fn get_shared<S>(
  State(state): State<AppState<S>>,
  Path(token): Path<String>,
) -> Result<Json<NoteBody<RedactedNote>>, ApiError>
where
  S: NoteStore + 'static,
{
  let note = state.sharing().get_shared_note(&token).await?;
  Ok(Json(NoteBody { note }))
}
