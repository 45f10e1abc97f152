//! Input normalisation and validation.
//!
//! Each function trims the text fields of an input, checks them, and returns
//! the normalised value or a single `Validation` error listing every
//! offending field.

use chrono::{Datelike as _, NaiveDate};

use crate::{
  Error, Result,
  error::FieldError,
  note::{
    ChecklistItemPatch, NewChecklistItem, NewEmergencyContact, NewNote,
    NewRequest, NotePatch, ReflectionInput,
  },
};

pub const TITLE_MAX: usize = 200;
pub const DESTINATION_MAX: usize = 100;
pub const DESCRIPTION_MAX: usize = 2000;
pub const CHECKLIST_TEXT_MAX: usize = 500;
pub const REQUEST_TEXT_MAX: usize = 500;
pub const SHORT_TEXT_MAX: usize = 100;
pub const REFLECTION_FIELD_MAX: usize = 2000;
pub const MIN_YEAR: i32 = 1;
pub const MAX_YEAR: i32 = 9999;

#[derive(Default)]
struct Checks {
  details: Vec<FieldError>,
}

impl Checks {
  fn required(&mut self, field: &str, value: &str, max: usize) -> String {
    let value = value.trim();
    if value.is_empty() {
      self.details.push(FieldError::new(field, "must not be empty"));
    } else {
      self.max_len(field, value, max);
    }
    value.to_owned()
  }

  fn optional(&mut self, field: &str, value: Option<&str>, max: usize) -> Option<String> {
    let value = value.map(str::trim).filter(|v| !v.is_empty())?;
    self.max_len(field, value, max);
    Some(value.to_owned())
  }

  fn email(&mut self, field: &str, value: Option<&str>) -> Option<String> {
    let value = self.optional(field, value, SHORT_TEXT_MAX * 2)?;
    if !looks_like_email(&value) {
      self.details.push(FieldError::new(field, "must be a valid email address"));
    }
    Some(value)
  }

  /// Stored dates are compared as `YYYY-MM-DD` text, which only orders
  /// correctly for four-digit years.
  fn date(&mut self, field: &str, value: NaiveDate) {
    if !(MIN_YEAR..=MAX_YEAR).contains(&value.year()) {
      self
        .details
        .push(FieldError::new(field, format!("year must be between {MIN_YEAR} and {MAX_YEAR}")));
    }
  }

  fn max_len(&mut self, field: &str, value: &str, max: usize) {
    if value.chars().count() > max {
      self
        .details
        .push(FieldError::new(field, format!("must be at most {max} characters")));
    }
  }

  fn finish(self) -> Result<()> {
    if self.details.is_empty() {
      return Ok(());
    }
    Err(Error::Validation {
      message: "request validation failed".into(),
      details: self.details,
    })
  }
}

fn looks_like_email(value: &str) -> bool {
  match value.split_once('@') {
    Some((local, domain)) => {
      !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !value.chars().any(char::is_whitespace)
    }
    None => false,
  }
}

/// The departure date must fall strictly before the return date.
pub fn ensure_date_order(departure: NaiveDate, return_date: NaiveDate) -> Result<()> {
  if departure >= return_date {
    return Err(Error::BusinessRule(
      "departure date must be before return date".into(),
    ));
  }
  Ok(())
}

pub fn new_note(input: NewNote) -> Result<NewNote> {
  let mut c = Checks::default();

  let title = c.required("title", &input.title, TITLE_MAX);
  let destination = c.required("destination", &input.destination, DESTINATION_MAX);
  let description = c.optional("description", input.description.as_deref(), DESCRIPTION_MAX);
  c.date("departureDate", input.departure_date);
  c.date("returnDate", input.return_date);
  let checklist_items = checklist_checks(&mut c, &input.checklist_items);
  let emergency_contacts = contacts_checks(&mut c, &input.emergency_contacts);
  let requests = requests_checks(&mut c, &input.requests);

  c.finish()?;
  ensure_date_order(input.departure_date, input.return_date)?;

  Ok(NewNote {
    title,
    destination,
    departure_date: input.departure_date,
    return_date: input.return_date,
    description,
    checklist_items,
    emergency_contacts,
    requests,
  })
}

fn checklist_checks(c: &mut Checks, items: &[NewChecklistItem]) -> Vec<NewChecklistItem> {
  items
    .iter()
    .enumerate()
    .map(|(i, item)| NewChecklistItem {
      text:       c.required(&format!("checklistItems[{i}].text"), &item.text, CHECKLIST_TEXT_MAX),
      sort_order: item.sort_order,
    })
    .collect()
}

fn contacts_checks(c: &mut Checks, contacts: &[NewEmergencyContact]) -> Vec<NewEmergencyContact> {
  contacts
    .iter()
    .enumerate()
    .map(|(i, contact)| NewEmergencyContact {
      name:         c.required(&format!("emergencyContacts[{i}].name"), &contact.name, SHORT_TEXT_MAX),
      relationship: c.required(
        &format!("emergencyContacts[{i}].relationship"),
        &contact.relationship,
        SHORT_TEXT_MAX,
      ),
      phone:        c.optional(
        &format!("emergencyContacts[{i}].phone"),
        contact.phone.as_deref(),
        SHORT_TEXT_MAX,
      ),
      email:        c.email(&format!("emergencyContacts[{i}].email"), contact.email.as_deref()),
      sort_order:   contact.sort_order,
    })
    .collect()
}

fn requests_checks(c: &mut Checks, requests: &[NewRequest]) -> Vec<NewRequest> {
  requests
    .iter()
    .enumerate()
    .map(|(i, r)| NewRequest {
      person:     c.required(&format!("requests[{i}].person"), &r.person, SHORT_TEXT_MAX),
      request:    c.required(&format!("requests[{i}].request"), &r.request, REQUEST_TEXT_MAX),
      priority:   r.priority,
      sort_order: r.sort_order,
    })
    .collect()
}

/// Dates are not cross-checked here; that needs the persisted note.
pub fn note_patch(patch: NotePatch) -> Result<NotePatch> {
  let mut c = Checks::default();
  let title = patch.title.as_deref().map(|t| c.required("title", t, TITLE_MAX));
  let destination = patch
    .destination
    .as_deref()
    .map(|d| c.required("destination", d, DESTINATION_MAX));
  let description = patch.description.as_deref().map(|d| {
    c.optional("description", Some(d), DESCRIPTION_MAX).unwrap_or_default()
  });
  if let Some(d) = patch.departure_date {
    c.date("departureDate", d);
  }
  if let Some(d) = patch.return_date {
    c.date("returnDate", d);
  }
  let checklist_items = patch.checklist_items.as_deref().map(|i| checklist_checks(&mut c, i));
  let emergency_contacts = patch
    .emergency_contacts
    .as_deref()
    .map(|ec| contacts_checks(&mut c, ec));
  let requests = patch.requests.as_deref().map(|r| requests_checks(&mut c, r));
  c.finish()?;

  Ok(NotePatch {
    title,
    destination,
    description,
    checklist_items,
    emergency_contacts,
    requests,
    ..patch
  })
}

pub fn new_checklist_item(input: NewChecklistItem) -> Result<NewChecklistItem> {
  let mut c = Checks::default();
  let text = c.required("text", &input.text, CHECKLIST_TEXT_MAX);
  c.finish()?;
  Ok(NewChecklistItem { text, sort_order: input.sort_order })
}

pub fn checklist_item_patch(patch: ChecklistItemPatch) -> Result<ChecklistItemPatch> {
  let mut c = Checks::default();
  let text = patch.text.as_deref().map(|t| c.required("text", t, CHECKLIST_TEXT_MAX));
  c.finish()?;
  Ok(ChecklistItemPatch { text, ..patch })
}

pub fn reflection(input: ReflectionInput) -> Result<ReflectionInput> {
  let mut c = Checks::default();
  let mut field = |name: &str, value: &str| {
    let value = value.trim();
    c.max_len(name, value, REFLECTION_FIELD_MAX);
    value.to_owned()
  };
  let out = ReflectionInput {
    what_worked:        field("whatWorked", &input.what_worked),
    what_didnt_work:    field("whatDidntWork", &input.what_didnt_work),
    improvements:       field("improvements", &input.improvements),
    next_time_reminder: field("nextTimeReminder", &input.next_time_reminder),
  };
  c.finish()?;
  Ok(out)
}

pub fn display_name(name: &str) -> Result<String> {
  let mut c = Checks::default();
  let name = c.required("name", name, SHORT_TEXT_MAX);
  c.finish()?;
  Ok(name)
}
