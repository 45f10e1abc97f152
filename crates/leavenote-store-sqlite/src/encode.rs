//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings with microsecond precision so that they
//! sort lexically. Calendar dates are `YYYY-MM-DD`. UUIDs are stored as
//! hyphenated lowercase strings. Enums use their lowercase wire names.

use chrono::{DateTime, NaiveDate, SecondsFormat, SubsecRound as _, Utc};
use leavenote_core::{
  note::{
    ChecklistItem, EmergencyContact, Note, NoteStatus, Priority, Reflection,
    Request, Sharing,
  },
  user::User,
  view::ChecklistCounts,
};
use rusqlite::Row;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

/// The current time at the precision it is stored with, so values returned
/// from writes compare equal to what a later read yields.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Enums ───────────────────────────────────────────────────────────────────

pub fn decode_status(s: &str) -> Result<NoteStatus> {
  s.parse()
    .map_err(|_| Error::Decode(format!("unknown note status: {s:?}")))
}

pub fn decode_priority(s: &str) -> Result<Priority> {
  s.parse()
    .map_err(|_| Error::Decode(format!("unknown priority: {s:?}")))
}

/// The flag and token columns are written together; any other pairing means
/// the row was edited outside this crate.
pub fn decode_sharing(is_shared: bool, token: Option<String>) -> Result<Sharing> {
  match (is_shared, token) {
    (true, Some(token)) => Ok(Sharing::Enabled { token }),
    (false, None) => Ok(Sharing::Disabled),
    (shared, _) => Err(Error::Decode(format!(
      "share flag {shared} does not match share token column"
    ))),
  }
}

pub fn encode_sharing(sharing: &Sharing) -> (bool, Option<String>) {
  (sharing.is_shared(), sharing.token().map(str::to_owned))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawUser::from_row`].
pub const USER_COLUMNS: &str = "user_id, subject, name, email, created_at, updated_at";

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:    String,
  pub subject:    String,
  pub name:       String,
  pub email:      String,
  pub created_at: String,
  pub updated_at: String,
}

impl RawUser {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:    row.get(0)?,
      subject:    row.get(1)?,
      name:       row.get(2)?,
      email:      row.get(3)?,
      created_at: row.get(4)?,
      updated_at: row.get(5)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      id:         decode_uuid(&self.user_id)?,
      subject:    self.subject,
      name:       self.name,
      email:      self.email,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Column list matching [`RawNote::from_row`]; the table is aliased `n`.
pub const NOTE_COLUMNS: &str = "n.note_id, n.user_id, n.title, n.destination, \
   n.departure_date, n.return_date, n.description, n.status, n.is_shared, \
   n.share_token, n.created_at, n.updated_at";

/// Raw strings read directly from a `notes` row.
pub struct RawNote {
  pub note_id:        String,
  pub user_id:        String,
  pub title:          String,
  pub destination:    String,
  pub departure_date: String,
  pub return_date:    String,
  pub description:    Option<String>,
  pub status:         String,
  pub is_shared:      bool,
  pub share_token:    Option<String>,
  pub created_at:     String,
  pub updated_at:     String,
}

impl RawNote {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      note_id:        row.get(0)?,
      user_id:        row.get(1)?,
      title:          row.get(2)?,
      destination:    row.get(3)?,
      departure_date: row.get(4)?,
      return_date:    row.get(5)?,
      description:    row.get(6)?,
      status:         row.get(7)?,
      is_shared:      row.get(8)?,
      share_token:    row.get(9)?,
      created_at:     row.get(10)?,
      updated_at:     row.get(11)?,
    })
  }

  pub fn into_note(self) -> Result<Note> {
    Ok(Note {
      id:             decode_uuid(&self.note_id)?,
      user_id:        decode_uuid(&self.user_id)?,
      title:          self.title,
      destination:    self.destination,
      departure_date: decode_date(&self.departure_date)?,
      return_date:    decode_date(&self.return_date)?,
      description:    self.description,
      status:         decode_status(&self.status)?,
      sharing:        decode_sharing(self.is_shared, self.share_token)?,
      created_at:     decode_dt(&self.created_at)?,
      updated_at:     decode_dt(&self.updated_at)?,
    })
  }
}

/// A note row followed by its completed and total checklist tallies.
pub struct RawNoteWithCounts {
  pub note:      RawNote,
  pub completed: u32,
  pub total:     u32,
}

impl RawNoteWithCounts {
  pub fn into_pair(self) -> Result<(Note, ChecklistCounts)> {
    Ok((
      self.note.into_note()?,
      ChecklistCounts { completed: self.completed, total: self.total },
    ))
  }
}

pub const CHECKLIST_COLUMNS: &str =
  "item_id, note_id, text, completed, sort_order, created_at, updated_at";

pub struct RawChecklistItem {
  pub item_id:    String,
  pub note_id:    String,
  pub text:       String,
  pub completed:  bool,
  pub sort_order: i32,
  pub created_at: String,
  pub updated_at: String,
}

impl RawChecklistItem {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      item_id:    row.get(0)?,
      note_id:    row.get(1)?,
      text:       row.get(2)?,
      completed:  row.get(3)?,
      sort_order: row.get(4)?,
      created_at: row.get(5)?,
      updated_at: row.get(6)?,
    })
  }

  pub fn into_item(self) -> Result<ChecklistItem> {
    Ok(ChecklistItem {
      id:         decode_uuid(&self.item_id)?,
      note_id:    decode_uuid(&self.note_id)?,
      text:       self.text,
      completed:  self.completed,
      sort_order: self.sort_order,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

pub const CONTACT_COLUMNS: &str =
  "contact_id, note_id, name, relationship, phone, email, sort_order";

pub struct RawContact {
  pub contact_id:   String,
  pub note_id:      String,
  pub name:         String,
  pub relationship: String,
  pub phone:        Option<String>,
  pub email:        Option<String>,
  pub sort_order:   i32,
}

impl RawContact {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      contact_id:   row.get(0)?,
      note_id:      row.get(1)?,
      name:         row.get(2)?,
      relationship: row.get(3)?,
      phone:        row.get(4)?,
      email:        row.get(5)?,
      sort_order:   row.get(6)?,
    })
  }

  pub fn into_contact(self) -> Result<EmergencyContact> {
    Ok(EmergencyContact {
      id:           decode_uuid(&self.contact_id)?,
      note_id:      decode_uuid(&self.note_id)?,
      name:         self.name,
      relationship: self.relationship,
      phone:        self.phone,
      email:        self.email,
      sort_order:   self.sort_order,
    })
  }
}

pub const REQUEST_COLUMNS: &str = "request_id, note_id, person, request, priority, sort_order";

pub struct RawRequest {
  pub request_id: String,
  pub note_id:    String,
  pub person:     String,
  pub request:    String,
  pub priority:   String,
  pub sort_order: i32,
}

impl RawRequest {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      request_id: row.get(0)?,
      note_id:    row.get(1)?,
      person:     row.get(2)?,
      request:    row.get(3)?,
      priority:   row.get(4)?,
      sort_order: row.get(5)?,
    })
  }

  pub fn into_request(self) -> Result<Request> {
    Ok(Request {
      id:         decode_uuid(&self.request_id)?,
      note_id:    decode_uuid(&self.note_id)?,
      person:     self.person,
      request:    self.request,
      priority:   decode_priority(&self.priority)?,
      sort_order: self.sort_order,
    })
  }
}

pub const REFLECTION_COLUMNS: &str = "reflection_id, note_id, what_worked, \
   what_didnt_work, improvements, next_time_reminder, created_at, updated_at";

pub struct RawReflection {
  pub reflection_id:      String,
  pub note_id:            String,
  pub what_worked:        String,
  pub what_didnt_work:    String,
  pub improvements:       String,
  pub next_time_reminder: String,
  pub created_at:         String,
  pub updated_at:         String,
}

impl RawReflection {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      reflection_id:      row.get(0)?,
      note_id:            row.get(1)?,
      what_worked:        row.get(2)?,
      what_didnt_work:    row.get(3)?,
      improvements:       row.get(4)?,
      next_time_reminder: row.get(5)?,
      created_at:         row.get(6)?,
      updated_at:         row.get(7)?,
    })
  }

  pub fn into_reflection(self) -> Result<Reflection> {
    Ok(Reflection {
      id:                 decode_uuid(&self.reflection_id)?,
      note_id:            decode_uuid(&self.note_id)?,
      what_worked:        self.what_worked,
      what_didnt_work:    self.what_didnt_work,
      improvements:       self.improvements,
      next_time_reminder: self.next_time_reminder,
      created_at:         decode_dt(&self.created_at)?,
      updated_at:         decode_dt(&self.updated_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn timestamps_keep_micros_and_sort_lexically() {
    let a = DateTime::parse_from_rfc3339("2024-08-15T09:00:00.000001Z")
      .unwrap()
      .with_timezone(&Utc);
    let b = DateTime::parse_from_rfc3339("2024-08-15T09:00:00.000010Z")
      .unwrap()
      .with_timezone(&Utc);
    assert!(encode_dt(a) < encode_dt(b));
    assert_eq!(decode_dt(&encode_dt(a)).unwrap(), a);
  }

  #[test]
  fn mismatched_sharing_columns_are_rejected() {
    assert!(decode_sharing(true, None).is_err());
    assert!(decode_sharing(false, Some("t".into())).is_err());
    assert_eq!(decode_sharing(false, None).unwrap(), Sharing::Disabled);
  }
}
