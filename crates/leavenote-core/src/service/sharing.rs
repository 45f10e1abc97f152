//! [`SharingService`]: the anonymous read path behind share links.

use std::sync::Arc;

use crate::{
  Error, Result,
  share::SHARE_TOKEN_LEN,
  store::NoteStore,
  view::RedactedNote,
};

const SHARED_NOTE_MISSING: &str = "shared note not found";

pub struct SharingService<S> {
  store: Arc<S>,
}

impl<S: NoteStore> SharingService<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// Revoked, replaced and never-issued tokens all fail the same way.
  pub async fn get_shared_note(&self, token: &str) -> Result<RedactedNote> {
    let missing = || Error::NotFound(SHARED_NOTE_MISSING.into());

    if token.len() != SHARE_TOKEN_LEN {
      return Err(missing());
    }

    let note = self
      .store
      .find_shared_note(token.to_owned())
      .await
      .map_err(Into::into)?
      .ok_or_else(missing)?;
    let owner = self
      .store
      .get_user(note.user_id)
      .await
      .map_err(Into::into)?
      .ok_or_else(missing)?;
    let children = self
      .store
      .get_note_children(note.id)
      .await
      .map_err(Into::into)?;

    Ok(RedactedNote::project(note, owner.name, children))
  }
}
