//! The note aggregate root and its four child collections.
//!
//! A note is owned by exactly one user. Checklist items, emergency contacts,
//! delegation requests and the (at most one) reflection belong to exactly one
//! note and are removed with it.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{
  Deserialize, Serialize, Serializer,
  ser::SerializeStruct as _,
};
use uuid::Uuid;

// ─── Enums ───────────────────────────────────────────────────────────────────

/// Lifecycle of a trip note.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NoteStatus {
  #[default]
  Draft,
  Active,
  Completed,
}

/// Urgency of a delegation request.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Priority {
  High,
  Medium,
  Low,
}

// ─── Sharing ─────────────────────────────────────────────────────────────────

/// Whether a note is readable through a share link.
///
/// The flag and the token only ever move together, so they are one value
/// here. It serialises as the `isShared` / `shareToken` pair.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Sharing {
  #[default]
  Disabled,
  Enabled { token: String },
}

impl Sharing {
  pub fn is_shared(&self) -> bool { matches!(self, Self::Enabled { .. }) }

  pub fn token(&self) -> Option<&str> {
    match self {
      Self::Enabled { token } => Some(token),
      Self::Disabled => None,
    }
  }
}

impl Serialize for Sharing {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut s = serializer.serialize_struct("Sharing", 2)?;
    s.serialize_field("isShared", &self.is_shared())?;
    s.serialize_field("shareToken", &self.token())?;
    s.end()
  }
}

// ─── Note ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
  pub id:             Uuid,
  pub user_id:        Uuid,
  pub title:          String,
  pub destination:    String,
  /// Always strictly before `return_date`.
  pub departure_date: NaiveDate,
  pub return_date:    NaiveDate,
  pub description:    Option<String>,
  pub status:         NoteStatus,
  #[serde(flatten)]
  pub sharing:        Sharing,
  pub created_at:     DateTime<Utc>,
  pub updated_at:     DateTime<Utc>,
}

// ─── Children ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
  pub id:         Uuid,
  pub note_id:    Uuid,
  pub text:       String,
  pub completed:  bool,
  pub sort_order: i32,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyContact {
  pub id:           Uuid,
  pub note_id:      Uuid,
  pub name:         String,
  /// Free-text label, e.g. "father" or "neighbour".
  pub relationship: String,
  pub phone:        Option<String>,
  pub email:        Option<String>,
  pub sort_order:   i32,
}

/// A delegation memo: something another person was asked to look after.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
  pub id:         Uuid,
  pub note_id:    Uuid,
  pub person:     String,
  pub request:    String,
  pub priority:   Priority,
  pub sort_order: i32,
}

/// Post-trip reflection; at most one per note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reflection {
  pub id:                 Uuid,
  pub note_id:            Uuid,
  pub what_worked:        String,
  pub what_didnt_work:    String,
  pub improvements:       String,
  pub next_time_reminder: String,
  pub created_at:         DateTime<Utc>,
  pub updated_at:         DateTime<Utc>,
}

/// Children of one note, each collection ascending by `sort_order`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteChildren {
  pub checklist_items:    Vec<ChecklistItem>,
  pub emergency_contacts: Vec<EmergencyContact>,
  pub requests:           Vec<Request>,
  pub reflection:         Option<Reflection>,
}

/// Owner-facing view of a note with all of its children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteDetail {
  #[serde(flatten)]
  pub note:               Note,
  pub checklist_items:    Vec<ChecklistItem>,
  pub emergency_contacts: Vec<EmergencyContact>,
  pub requests:           Vec<Request>,
  pub reflection:         Option<Reflection>,
}

impl NoteDetail {
  pub fn assemble(note: Note, children: NoteChildren) -> Self {
    Self {
      note,
      checklist_items: children.checklist_items,
      emergency_contacts: children.emergency_contacts,
      requests: children.requests,
      reflection: children.reflection,
    }
  }
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Body of a note creation. Children listed here are persisted in the same
/// transaction as the note.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewNote {
  pub title:              String,
  pub destination:        String,
  pub departure_date:     NaiveDate,
  pub return_date:        NaiveDate,
  #[serde(default)]
  pub description:        Option<String>,
  #[serde(default)]
  pub checklist_items:    Vec<NewChecklistItem>,
  #[serde(default)]
  pub emergency_contacts: Vec<NewEmergencyContact>,
  #[serde(default)]
  pub requests:           Vec<NewRequest>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewChecklistItem {
  pub text:       String,
  #[serde(default)]
  pub sort_order: i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewEmergencyContact {
  pub name:         String,
  pub relationship: String,
  #[serde(default)]
  pub phone:        Option<String>,
  #[serde(default)]
  pub email:        Option<String>,
  #[serde(default)]
  pub sort_order:   i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewRequest {
  pub person:     String,
  pub request:    String,
  pub priority:   Priority,
  #[serde(default)]
  pub sort_order: i32,
}

/// Partial note update; only `Some` fields are written.
///
/// A `description` that is empty after trimming clears the stored value. A
/// supplied child collection replaces the stored one wholesale, so an empty
/// list removes every child of that kind.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NotePatch {
  pub title:              Option<String>,
  pub destination:        Option<String>,
  pub departure_date:     Option<NaiveDate>,
  pub return_date:        Option<NaiveDate>,
  pub description:        Option<String>,
  pub status:             Option<NoteStatus>,
  pub checklist_items:    Option<Vec<NewChecklistItem>>,
  pub emergency_contacts: Option<Vec<NewEmergencyContact>>,
  pub requests:           Option<Vec<NewRequest>>,
}

/// Partial checklist item update; only `Some` fields are written.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ChecklistItemPatch {
  pub text:       Option<String>,
  pub completed:  Option<bool>,
  pub sort_order: Option<i32>,
}

/// Body of a reflection save; replaces the note's reflection wholesale.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ReflectionInput {
  #[serde(default)]
  pub what_worked:        String,
  #[serde(default)]
  pub what_didnt_work:    String,
  #[serde(default)]
  pub improvements:       String,
  #[serde(default)]
  pub next_time_reminder: String,
}
