//! Extractors whose rejections use the uniform error body.

use axum::{
  extract::{FromRequest, FromRequestParts, Path},
  http::request::Parts,
};
use leavenote_core::guard::{self, Resource};
use uuid::Uuid;

use crate::error::ApiError;

/// `axum::Json` with malformed bodies and unknown fields rejected as 422.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ValidJson<T>(pub T);

/// `axum::extract::Query` with bad parameters rejected as 422.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ValidQuery<T>(pub T);

/// Parse the `{id}` segment. Anything that does not parse cannot name a
/// stored record, so it is reported exactly like a missing `kind`.
async fn id_segment<S>(parts: &mut Parts, state: &S, kind: Resource) -> Result<Uuid, ApiError>
where
  S: Send + Sync,
{
  let Path(id) = Path::<Uuid>::from_request_parts(parts, state)
    .await
    .map_err(|_| guard::not_found(kind))?;
  Ok(id)
}

/// The `{id}` of a note route.
pub struct NoteId(pub Uuid);

impl<S> FromRequestParts<S> for NoteId
where
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
    id_segment(parts, state, Resource::Note).await.map(Self)
  }
}

/// The `{id}` of a checklist item route.
pub struct ItemId(pub Uuid);

impl<S> FromRequestParts<S> for ItemId
where
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
    id_segment(parts, state, Resource::ChecklistItem).await.map(Self)
  }
}
