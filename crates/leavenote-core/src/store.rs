//! The `NoteStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g.
//! `leavenote-store-sqlite`). Services receive a store handle explicitly and
//! never reach for a global client, so tests can inject a double.

use std::future::Future;

use serde::Deserialize;
use uuid::Uuid;

use crate::{
  note::{
    ChecklistItem, ChecklistItemPatch, NewChecklistItem, NewNote, Note,
    NoteChildren, NotePatch, NoteStatus, Reflection, ReflectionInput, Sharing,
  },
  user::{NewUser, User},
  view::ChecklistCounts,
};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Ordering of a note listing. The `created_at_*` / `departure_date_*`
/// spellings are accepted as aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum NoteSort {
  #[default]
  #[serde(rename = "created_desc", alias = "created_at_desc")]
  CreatedDesc,
  #[serde(rename = "created_asc", alias = "created_at_asc")]
  CreatedAsc,
  #[serde(rename = "departure_desc", alias = "departure_date_desc")]
  DepartureDesc,
  #[serde(rename = "departure_asc", alias = "departure_date_asc")]
  DepartureAsc,
}

/// Outcome of [`NoteStore::delete_note`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteDeletion {
  Deleted,
  Missing,
  /// The note exists but is active; nothing was removed.
  Active,
}

/// Parameters for [`NoteStore::list_notes`], already clamped by the service.
#[derive(Debug, Clone)]
pub struct NoteQuery {
  pub owner:  Uuid,
  pub status: Option<NoteStatus>,
  pub sort:   NoteSort,
  pub limit:  u32,
  pub offset: u64,
}

/// One page of notes with their checklist tallies, plus the unpaged count.
#[derive(Debug, Clone, Default)]
pub struct NoteRows {
  pub rows:  Vec<(Note, ChecklistCounts)>,
  pub total: u64,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a leavenote storage backend.
///
/// Methods never check ownership; that is the services' job. Every method
/// returns a `Send` future so the trait can be used from a multi-threaded
/// runtime (e.g. tokio with `axum`).
pub trait NoteStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static + Into<crate::Error>;

  // ── Users ─────────────────────────────────────────────────────────────

  fn find_user_by_subject(
    &self,
    subject: String,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Fails with a conflict if the subject is already registered.
  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Returns `None` if the user does not exist.
  fn update_user_name(
    &self,
    id: Uuid,
    name: String,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  // ── Notes ─────────────────────────────────────────────────────────────

  fn list_notes(
    &self,
    query: NoteQuery,
  ) -> impl Future<Output = Result<NoteRows, Self::Error>> + Send + '_;

  fn get_note(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Note>, Self::Error>> + Send + '_;

  /// All children of a note, each collection ascending by `sort_order`.
  fn get_note_children(
    &self,
    note_id: Uuid,
  ) -> impl Future<Output = Result<NoteChildren, Self::Error>> + Send + '_;

  /// Persist a note and every child listed in `input` atomically: either
  /// all rows are written or none are.
  fn create_note(
    &self,
    owner: Uuid,
    input: NewNote,
  ) -> impl Future<Output = Result<Note, Self::Error>> + Send + '_;

  /// Apply the `Some` fields of `patch`, replacing any supplied child
  /// collection, in one atomic unit. Returns `None` if the note is gone.
  fn update_note(
    &self,
    id: Uuid,
    patch: NotePatch,
  ) -> impl Future<Output = Result<Option<Note>, Self::Error>> + Send + '_;

  /// Delete a note and, transitively, all of its children, unless it is
  /// active at the moment of deletion.
  fn delete_note(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<NoteDeletion, Self::Error>> + Send + '_;

  /// Write the sharing flag and token in a single atomic step. Returns
  /// whether the note existed.
  fn set_sharing(
    &self,
    id: Uuid,
    sharing: Sharing,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Find the note whose token equals `token` *and* whose sharing flag is
  /// set.
  fn find_shared_note(
    &self,
    token: String,
  ) -> impl Future<Output = Result<Option<Note>, Self::Error>> + Send + '_;

  // ── Checklist items ───────────────────────────────────────────────────

  fn get_checklist_item(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<ChecklistItem>, Self::Error>> + Send + '_;

  fn create_checklist_item(
    &self,
    note_id: Uuid,
    input: NewChecklistItem,
  ) -> impl Future<Output = Result<ChecklistItem, Self::Error>> + Send + '_;

  /// Apply the `Some` fields of `patch`. Returns `None` if the item is gone.
  fn update_checklist_item(
    &self,
    id: Uuid,
    patch: ChecklistItemPatch,
  ) -> impl Future<Output = Result<Option<ChecklistItem>, Self::Error>> + Send + '_;

  fn delete_checklist_item(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Reflection ────────────────────────────────────────────────────────

  /// Create the note's reflection or replace the existing one.
  fn save_reflection(
    &self,
    note_id: Uuid,
    input: ReflectionInput,
  ) -> impl Future<Output = Result<Reflection, Self::Error>> + Send + '_;
}
