//! [`NoteService`]: CRUD over the note aggregate, status transitions,
//! reflections, and share-token management.

use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;

use crate::{
  Error, Result,
  guard::{self, Resource, assert_ownership},
  note::{
    NewNote, Note, NoteDetail, NotePatch, NoteStatus, Reflection,
    ReflectionInput, Sharing,
  },
  share::{generate_share_token, share_url},
  store::{NoteDeletion, NoteQuery, NoteSort, NoteStore},
  validate,
  view::{NoteListItem, NotePage, Pagination, ShareLink},
};

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Larger requested page sizes are clamped, not rejected.
pub const MAX_PAGE_SIZE: u32 = 50;

/// Listing parameters as they arrive from a caller; all optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NoteFilter {
  pub status: Option<NoteStatus>,
  pub page:   Option<u32>,
  pub limit:  Option<u32>,
  pub sort:   Option<NoteSort>,
}

pub struct NoteService<S> {
  store:           Arc<S>,
  public_base_url: String,
}

impl<S: NoteStore> NoteService<S> {
  /// `public_base_url` is the origin share links are built on.
  pub fn new(store: Arc<S>, public_base_url: impl Into<String>) -> Self {
    Self { store, public_base_url: public_base_url.into() }
  }

  async fn owned_note(&self, note_id: Uuid, user_id: Uuid) -> Result<Note> {
    let note = self.store.get_note(note_id).await.map_err(Into::into)?;
    assert_ownership(note, user_id, Resource::Note)
  }

  async fn detail(&self, note: Note) -> Result<NoteDetail> {
    let children = self
      .store
      .get_note_children(note.id)
      .await
      .map_err(Into::into)?;
    Ok(NoteDetail::assemble(note, children))
  }

  pub async fn list_notes(&self, user_id: Uuid, filter: NoteFilter) -> Result<NotePage> {
    let page = filter.page.unwrap_or(1).max(1);
    let limit = filter.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);

    let rows = self
      .store
      .list_notes(NoteQuery {
        owner: user_id,
        status: filter.status,
        sort: filter.sort.unwrap_or_default(),
        limit,
        offset: u64::from(page - 1) * u64::from(limit),
      })
      .await
      .map_err(Into::into)?;

    let notes = rows
      .rows
      .into_iter()
      .map(|(note, counts)| NoteListItem { note, checklist_progress: counts.into() })
      .collect();

    Ok(NotePage { notes, pagination: Pagination::new(page, limit, rows.total) })
  }

  pub async fn get_note(&self, note_id: Uuid, user_id: Uuid) -> Result<NoteDetail> {
    let note = self.owned_note(note_id, user_id).await?;
    self.detail(note).await
  }

  /// Creates the note and every child it lists in one atomic unit.
  pub async fn create_note(&self, user_id: Uuid, input: NewNote) -> Result<Note> {
    let input = validate::new_note(input)?;
    let note = self
      .store
      .create_note(user_id, input)
      .await
      .map_err(Into::into)?;
    tracing::info!(note_id = %note.id, %user_id, "note created");
    Ok(note)
  }

  /// A date supplied alone is checked against the other, persisted date.
  pub async fn update_note(
    &self,
    note_id: Uuid,
    user_id: Uuid,
    patch: NotePatch,
  ) -> Result<NoteDetail> {
    let existing = self.owned_note(note_id, user_id).await?;
    let patch = validate::note_patch(patch)?;

    if patch.departure_date.is_some() || patch.return_date.is_some() {
      validate::ensure_date_order(
        patch.departure_date.unwrap_or(existing.departure_date),
        patch.return_date.unwrap_or(existing.return_date),
      )?;
    }

    let note = self
      .store
      .update_note(note_id, patch)
      .await
      .map_err(Into::into)?
      .ok_or_else(|| guard::not_found(Resource::Note))?;
    tracing::debug!(%note_id, %user_id, "note updated");
    self.detail(note).await
  }

  pub async fn update_status(
    &self,
    note_id: Uuid,
    user_id: Uuid,
    status: NoteStatus,
  ) -> Result<Note> {
    self.owned_note(note_id, user_id).await?;
    let note = self
      .store
      .update_note(note_id, NotePatch { status: Some(status), ..Default::default() })
      .await
      .map_err(Into::into)?
      .ok_or_else(|| guard::not_found(Resource::Note))?;
    tracing::info!(%note_id, %status, "note status changed");
    Ok(note)
  }

  /// Active notes must be moved to another status before they can go. The
  /// store re-checks the status in the delete itself.
  pub async fn delete_note(&self, note_id: Uuid, user_id: Uuid) -> Result<()> {
    self.owned_note(note_id, user_id).await?;

    match self.store.delete_note(note_id).await.map_err(Into::into)? {
      NoteDeletion::Deleted => {}
      NoteDeletion::Missing => return Err(guard::not_found(Resource::Note)),
      NoteDeletion::Active => {
        return Err(Error::BusinessRule(
          "an active note cannot be deleted; change its status first".into(),
        ));
      }
    }
    tracing::info!(%note_id, %user_id, "note deleted");
    Ok(())
  }

  /// Issues a new token, replacing (and thereby revoking) any previous one.
  pub async fn generate_share_token(&self, note_id: Uuid, user_id: Uuid) -> Result<ShareLink> {
    self.owned_note(note_id, user_id).await?;

    let token = generate_share_token();
    let found = self
      .store
      .set_sharing(note_id, Sharing::Enabled { token: token.clone() })
      .await
      .map_err(Into::into)?;
    if !found {
      return Err(guard::not_found(Resource::Note));
    }
    tracing::info!(%note_id, "sharing enabled");

    Ok(ShareLink {
      share_url:   share_url(&self.public_base_url, &token),
      share_token: token,
      is_shared:   true,
    })
  }

  pub async fn disable_sharing(&self, note_id: Uuid, user_id: Uuid) -> Result<()> {
    self.owned_note(note_id, user_id).await?;
    let found = self
      .store
      .set_sharing(note_id, Sharing::Disabled)
      .await
      .map_err(Into::into)?;
    if !found {
      return Err(guard::not_found(Resource::Note));
    }
    tracing::info!(%note_id, "sharing disabled");
    Ok(())
  }

  pub async fn save_reflection(
    &self,
    note_id: Uuid,
    user_id: Uuid,
    input: ReflectionInput,
  ) -> Result<Reflection> {
    self.owned_note(note_id, user_id).await?;
    let input = validate::reflection(input)?;
    self
      .store
      .save_reflection(note_id, input)
      .await
      .map_err(Into::into)
  }
}
