//! Read models computed from stored rows. None of these are persisted.

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::note::{
  ChecklistItem, EmergencyContact, Note, NoteChildren, NoteStatus, Priority,
  Request,
};

// ─── Listing ─────────────────────────────────────────────────────────────────

/// Raw checklist tallies for one note, as counted by the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChecklistCounts {
  pub completed: u32,
  pub total:     u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChecklistProgress {
  pub completed:  u32,
  pub total:      u32,
  /// `round(completed / total * 100)`, or 0 for an empty checklist.
  pub percentage: u32,
}

impl From<ChecklistCounts> for ChecklistProgress {
  fn from(c: ChecklistCounts) -> Self {
    let percentage = if c.total == 0 {
      0
    } else {
      // Integer form of round-half-up on completed * 100 / total.
      let (done, total) = (u64::from(c.completed), u64::from(c.total));
      ((done * 200 + total) / (total * 2)) as u32
    };
    Self { completed: c.completed, total: c.total, percentage }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteListItem {
  #[serde(flatten)]
  pub note:               Note,
  pub checklist_progress: ChecklistProgress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
  pub page:        u32,
  /// Effective (clamped) page size.
  pub limit:       u32,
  pub total:       u64,
  pub total_pages: u64,
}

impl Pagination {
  pub fn new(page: u32, limit: u32, total: u64) -> Self {
    Self { page, limit, total, total_pages: total.div_ceil(u64::from(limit)) }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotePage {
  pub notes:      Vec<NoteListItem>,
  pub pagination: Pagination,
}

// ─── Sharing ─────────────────────────────────────────────────────────────────

/// Result of enabling sharing on a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareLink {
  pub share_url:   String,
  pub share_token: String,
  pub is_shared:   bool,
}

/// The public, read-only projection of a shared note.
///
/// Carries the owner's display name only, no child ids, no sort keys and no
/// timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedactedNote {
  pub id:                 Uuid,
  pub title:              String,
  pub destination:        String,
  pub departure_date:     NaiveDate,
  pub return_date:        NaiveDate,
  pub description:        Option<String>,
  pub status:             NoteStatus,
  pub owner:              SharedOwner,
  pub checklist_items:    Vec<SharedChecklistItem>,
  pub emergency_contacts: Vec<SharedEmergencyContact>,
  pub requests:           Vec<SharedRequest>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SharedOwner {
  pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SharedChecklistItem {
  pub text:      String,
  pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SharedEmergencyContact {
  pub name:         String,
  pub relationship: String,
  pub phone:        Option<String>,
  pub email:        Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SharedRequest {
  pub person:   String,
  pub request:  String,
  pub priority: Priority,
}

impl From<ChecklistItem> for SharedChecklistItem {
  fn from(i: ChecklistItem) -> Self {
    Self { text: i.text, completed: i.completed }
  }
}

impl From<EmergencyContact> for SharedEmergencyContact {
  fn from(c: EmergencyContact) -> Self {
    Self {
      name:         c.name,
      relationship: c.relationship,
      phone:        c.phone,
      email:        c.email,
    }
  }
}

impl From<Request> for SharedRequest {
  fn from(r: Request) -> Self {
    Self { person: r.person, request: r.request, priority: r.priority }
  }
}

impl RedactedNote {
  /// Project a note for anonymous readers. The reflection is dropped.
  pub fn project(note: Note, owner_name: String, children: NoteChildren) -> Self {
    Self {
      id:                 note.id,
      title:              note.title,
      destination:        note.destination,
      departure_date:     note.departure_date,
      return_date:        note.return_date,
      description:        note.description,
      status:             note.status,
      owner:              SharedOwner { name: owner_name },
      checklist_items:    children.checklist_items.into_iter().map(Into::into).collect(),
      emergency_contacts: children.emergency_contacts.into_iter().map(Into::into).collect(),
      requests:           children.requests.into_iter().map(Into::into).collect(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn progress(completed: u32, total: u32) -> ChecklistProgress {
    ChecklistCounts { completed, total }.into()
  }

  #[test]
  fn empty_checklist_has_zero_percent() {
    assert_eq!(progress(0, 0).percentage, 0);
  }

  #[test]
  fn percentage_rounds_half_up() {
    assert_eq!(progress(0, 2).percentage, 0);
    assert_eq!(progress(1, 3).percentage, 33);
    assert_eq!(progress(2, 3).percentage, 67);
    assert_eq!(progress(1, 8).percentage, 13);
    assert_eq!(progress(5, 5).percentage, 100);
  }

  #[test]
  fn total_pages_rounds_up() {
    assert_eq!(Pagination::new(1, 10, 0).total_pages, 0);
    assert_eq!(Pagination::new(1, 10, 10).total_pages, 1);
    assert_eq!(Pagination::new(1, 10, 25).total_pages, 3);
    assert_eq!(Pagination::new(2, 50, 51).total_pages, 2);
  }
}
