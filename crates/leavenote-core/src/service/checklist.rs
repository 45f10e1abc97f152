//! [`ChecklistService`]: single checklist items, authorised through the
//! owner of the parent note.

use std::sync::Arc;

use uuid::Uuid;

use crate::{
  Result,
  guard::{self, Resource, assert_ownership},
  note::{ChecklistItem, ChecklistItemPatch, NewChecklistItem},
  store::NoteStore,
  validate,
};

pub struct ChecklistService<S> {
  store: Arc<S>,
}

impl<S: NoteStore> ChecklistService<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// Resolve the item, then its parent note, then check the note's owner.
  async fn owned_item(&self, item_id: Uuid, user_id: Uuid) -> Result<ChecklistItem> {
    let item = self
      .store
      .get_checklist_item(item_id)
      .await
      .map_err(Into::into)?
      .ok_or_else(|| guard::not_found(Resource::ChecklistItem))?;
    let note = self.store.get_note(item.note_id).await.map_err(Into::into)?;
    assert_ownership(note, user_id, Resource::ChecklistItem)?;
    Ok(item)
  }

  pub async fn create_item(
    &self,
    note_id: Uuid,
    user_id: Uuid,
    input: NewChecklistItem,
  ) -> Result<ChecklistItem> {
    let note = self.store.get_note(note_id).await.map_err(Into::into)?;
    assert_ownership(note, user_id, Resource::Note)?;
    let input = validate::new_checklist_item(input)?;

    let item = self
      .store
      .create_checklist_item(note_id, input)
      .await
      .map_err(Into::into)?;
    tracing::debug!(%note_id, item_id = %item.id, "checklist item created");
    Ok(item)
  }

  /// Only the supplied fields change.
  pub async fn update_item(
    &self,
    item_id: Uuid,
    user_id: Uuid,
    patch: ChecklistItemPatch,
  ) -> Result<ChecklistItem> {
    self.owned_item(item_id, user_id).await?;
    let patch = validate::checklist_item_patch(patch)?;
    self
      .store
      .update_checklist_item(item_id, patch)
      .await
      .map_err(Into::into)?
      .ok_or_else(|| guard::not_found(Resource::ChecklistItem))
  }

  pub async fn delete_item(&self, item_id: Uuid, user_id: Uuid) -> Result<()> {
    self.owned_item(item_id, user_id).await?;
    let deleted = self
      .store
      .delete_checklist_item(item_id)
      .await
      .map_err(Into::into)?;
    if !deleted {
      return Err(guard::not_found(Resource::ChecklistItem));
    }
    tracing::debug!(%item_id, "checklist item deleted");
    Ok(())
  }
}
