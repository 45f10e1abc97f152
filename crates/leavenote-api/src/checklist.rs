//! Handlers for checklist items.
//!
//! | Method   | Path                     | Notes                        |
//! |----------|--------------------------|------------------------------|
//! | `POST`   | `/notes/{id}/checklist`  | 201; `sortOrder` defaults 0  |
//! | `PUT`    | `/checklist/{itemId}`    | Only supplied fields change  |
//! | `DELETE` | `/checklist/{itemId}`    | 204                          |

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use leavenote_core::{
  note::{ChecklistItem, ChecklistItemPatch, NewChecklistItem},
  store::NoteStore,
};
use serde::Serialize;

use crate::{
  AppState,
  auth::Principal,
  error::ApiError,
  extract::{ItemId, NoteId, ValidJson},
};

#[derive(Serialize)]
pub struct ItemBody {
  pub item: ChecklistItem,
}

/// `POST /notes/{id}/checklist`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Principal(user): Principal,
  NoteId(note_id): NoteId,
  ValidJson(body): ValidJson<NewChecklistItem>,
) -> Result<impl IntoResponse, ApiError>
where
  S: NoteStore + 'static,
{
  let item = state.checklist().create_item(note_id, user.id, body).await?;
  Ok((StatusCode::CREATED, Json(ItemBody { item })))
}

/// `PUT /checklist/{itemId}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  Principal(user): Principal,
  ItemId(item_id): ItemId,
  ValidJson(patch): ValidJson<ChecklistItemPatch>,
) -> Result<Json<ItemBody>, ApiError>
where
  S: NoteStore + 'static,
{
  let item = state.checklist().update_item(item_id, user.id, patch).await?;
  Ok(Json(ItemBody { item }))
}

/// `DELETE /checklist/{itemId}`
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  Principal(user): Principal,
  ItemId(item_id): ItemId,
) -> Result<StatusCode, ApiError>
where
  S: NoteStore + 'static,
{
  state.checklist().delete_item(item_id, user.id).await?;
  Ok(StatusCode::NO_CONTENT)
}
