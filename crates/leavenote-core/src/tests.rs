//! Service tests against an in-memory `NoteStore` double.

use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::{
  Error, Result,
  note::{
    ChecklistItem, ChecklistItemPatch, EmergencyContact, NewChecklistItem,
    NewEmergencyContact, NewNote, NewRequest, Note, NoteChildren, NotePatch,
    NoteStatus, Priority, Reflection, ReflectionInput, Request, Sharing,
  },
  service::{ChecklistService, NoteFilter, NoteService, SharingService, UserService},
  store::{NoteDeletion, NoteQuery, NoteRows, NoteSort, NoteStore},
  user::{NewUser, ProfileUpdate, User, VerifiedIdentity},
  view::ChecklistCounts,
};

// ─── Test double ─────────────────────────────────────────────────────────────

#[derive(Default)]
struct State {
  users:       Vec<User>,
  notes:       Vec<Note>,
  items:       Vec<ChecklistItem>,
  contacts:    Vec<EmergencyContact>,
  requests:    Vec<Request>,
  reflections: Vec<Reflection>,
}

impl State {
  fn push_children(
    &mut self,
    note_id: Uuid,
    items: Vec<NewChecklistItem>,
    contacts: Vec<NewEmergencyContact>,
    requests: Vec<NewRequest>,
  ) {
    let now = Utc::now();
    self.items.extend(items.into_iter().map(|item| ChecklistItem {
      id:         Uuid::new_v4(),
      note_id,
      text:       item.text,
      completed:  false,
      sort_order: item.sort_order,
      created_at: now,
      updated_at: now,
    }));
    self.contacts.extend(contacts.into_iter().map(|c| EmergencyContact {
      id:           Uuid::new_v4(),
      note_id,
      name:         c.name,
      relationship: c.relationship,
      phone:        c.phone,
      email:        c.email,
      sort_order:   c.sort_order,
    }));
    self.requests.extend(requests.into_iter().map(|r| Request {
      id:         Uuid::new_v4(),
      note_id,
      person:     r.person,
      request:    r.request,
      priority:   r.priority,
      sort_order: r.sort_order,
    }));
  }
}

#[derive(Default)]
struct MemoryStore {
  state: Mutex<State>,
}

impl MemoryStore {
  fn state(&self) -> std::sync::MutexGuard<'_, State> { self.state.lock().unwrap() }
}

impl NoteStore for MemoryStore {
  type Error = Error;

  async fn find_user_by_subject(&self, subject: String) -> Result<Option<User>> {
    Ok(self.state().users.iter().find(|u| u.subject == subject).cloned())
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    Ok(self.state().users.iter().find(|u| u.id == id).cloned())
  }

  async fn create_user(&self, input: NewUser) -> Result<User> {
    let mut state = self.state();
    if state.users.iter().any(|u| u.subject == input.subject) {
      return Err(Error::Conflict("subject already registered".into()));
    }
    let now = Utc::now();
    let user = User {
      id:         Uuid::new_v4(),
      subject:    input.subject,
      name:       input.name,
      email:      input.email,
      created_at: now,
      updated_at: now,
    };
    state.users.push(user.clone());
    Ok(user)
  }

  async fn update_user_name(&self, id: Uuid, name: String) -> Result<Option<User>> {
    let mut state = self.state();
    Ok(state.users.iter_mut().find(|u| u.id == id).map(|u| {
      u.name = name;
      u.updated_at = Utc::now();
      u.clone()
    }))
  }

  async fn list_notes(&self, query: NoteQuery) -> Result<NoteRows> {
    let state = self.state();
    let mut notes: Vec<Note> = state
      .notes
      .iter()
      .filter(|n| n.user_id == query.owner)
      .filter(|n| query.status.is_none_or(|s| n.status == s))
      .cloned()
      .collect();
    match query.sort {
      NoteSort::CreatedDesc => notes.reverse(),
      NoteSort::CreatedAsc => {}
      NoteSort::DepartureDesc => notes.sort_by(|a, b| b.departure_date.cmp(&a.departure_date)),
      NoteSort::DepartureAsc => notes.sort_by_key(|n| n.departure_date),
    }
    let total = notes.len() as u64;
    let rows = notes
      .into_iter()
      .skip(query.offset as usize)
      .take(query.limit as usize)
      .map(|n| {
        let items = state.items.iter().filter(|i| i.note_id == n.id);
        let counts = ChecklistCounts {
          completed: items.clone().filter(|i| i.completed).count() as u32,
          total:     items.count() as u32,
        };
        (n, counts)
      })
      .collect();
    Ok(NoteRows { rows, total })
  }

  async fn get_note(&self, id: Uuid) -> Result<Option<Note>> {
    Ok(self.state().notes.iter().find(|n| n.id == id).cloned())
  }

  async fn get_note_children(&self, note_id: Uuid) -> Result<NoteChildren> {
    let state = self.state();
    let mut checklist_items: Vec<_> =
      state.items.iter().filter(|i| i.note_id == note_id).cloned().collect();
    checklist_items.sort_by_key(|i| i.sort_order);
    let mut emergency_contacts: Vec<_> =
      state.contacts.iter().filter(|c| c.note_id == note_id).cloned().collect();
    emergency_contacts.sort_by_key(|c| c.sort_order);
    let mut requests: Vec<_> =
      state.requests.iter().filter(|r| r.note_id == note_id).cloned().collect();
    requests.sort_by_key(|r| r.sort_order);
    let reflection = state.reflections.iter().find(|r| r.note_id == note_id).cloned();
    Ok(NoteChildren { checklist_items, emergency_contacts, requests, reflection })
  }

  async fn create_note(&self, owner: Uuid, input: NewNote) -> Result<Note> {
    let mut state = self.state();
    let now = Utc::now();
    let note = Note {
      id:             Uuid::new_v4(),
      user_id:        owner,
      title:          input.title,
      destination:    input.destination,
      departure_date: input.departure_date,
      return_date:    input.return_date,
      description:    input.description,
      status:         NoteStatus::Draft,
      sharing:        Sharing::Disabled,
      created_at:     now,
      updated_at:     now,
    };
    state.push_children(note.id, input.checklist_items, input.emergency_contacts, input.requests);
    state.notes.push(note.clone());
    Ok(note)
  }

  async fn update_note(&self, id: Uuid, patch: NotePatch) -> Result<Option<Note>> {
    let mut state = self.state();
    let Some(n) = state.notes.iter_mut().find(|n| n.id == id) else {
      return Ok(None);
    };
    if let Some(v) = patch.title { n.title = v; }
    if let Some(v) = patch.destination { n.destination = v; }
    if let Some(v) = patch.departure_date { n.departure_date = v; }
    if let Some(v) = patch.return_date { n.return_date = v; }
    if let Some(v) = patch.description { n.description = (!v.is_empty()).then_some(v); }
    if let Some(v) = patch.status { n.status = v; }
    n.updated_at = Utc::now();
    let note = n.clone();

    if patch.checklist_items.is_some() { state.items.retain(|i| i.note_id != id); }
    if patch.emergency_contacts.is_some() { state.contacts.retain(|c| c.note_id != id); }
    if patch.requests.is_some() { state.requests.retain(|r| r.note_id != id); }
    state.push_children(
      id,
      patch.checklist_items.unwrap_or_default(),
      patch.emergency_contacts.unwrap_or_default(),
      patch.requests.unwrap_or_default(),
    );
    Ok(Some(note))
  }

  async fn delete_note(&self, id: Uuid) -> Result<NoteDeletion> {
    let mut state = self.state();
    match state.notes.iter().find(|n| n.id == id) {
      None => return Ok(NoteDeletion::Missing),
      Some(n) if n.status == NoteStatus::Active => return Ok(NoteDeletion::Active),
      Some(_) => {}
    }
    state.notes.retain(|n| n.id != id);
    state.items.retain(|i| i.note_id != id);
    state.contacts.retain(|c| c.note_id != id);
    state.requests.retain(|r| r.note_id != id);
    state.reflections.retain(|r| r.note_id != id);
    Ok(NoteDeletion::Deleted)
  }

  async fn set_sharing(&self, id: Uuid, sharing: Sharing) -> Result<bool> {
    let mut state = self.state();
    Ok(state.notes.iter_mut().find(|n| n.id == id).map(|n| n.sharing = sharing).is_some())
  }

  async fn find_shared_note(&self, token: String) -> Result<Option<Note>> {
    Ok(
      self
        .state()
        .notes
        .iter()
        .find(|n| n.sharing.token() == Some(token.as_str()))
        .cloned(),
    )
  }

  async fn get_checklist_item(&self, id: Uuid) -> Result<Option<ChecklistItem>> {
    Ok(self.state().items.iter().find(|i| i.id == id).cloned())
  }

  async fn create_checklist_item(&self, note_id: Uuid, input: NewChecklistItem) -> Result<ChecklistItem> {
    let now = Utc::now();
    let item = ChecklistItem {
      id: Uuid::new_v4(),
      note_id,
      text: input.text,
      completed: false,
      sort_order: input.sort_order,
      created_at: now,
      updated_at: now,
    };
    self.state().items.push(item.clone());
    Ok(item)
  }

  async fn update_checklist_item(&self, id: Uuid, patch: ChecklistItemPatch) -> Result<Option<ChecklistItem>> {
    let mut state = self.state();
    Ok(state.items.iter_mut().find(|i| i.id == id).map(|i| {
      if let Some(v) = patch.text { i.text = v; }
      if let Some(v) = patch.completed { i.completed = v; }
      if let Some(v) = patch.sort_order { i.sort_order = v; }
      i.clone()
    }))
  }

  async fn delete_checklist_item(&self, id: Uuid) -> Result<bool> {
    let mut state = self.state();
    let before = state.items.len();
    state.items.retain(|i| i.id != id);
    Ok(state.items.len() != before)
  }

  async fn save_reflection(&self, note_id: Uuid, input: ReflectionInput) -> Result<Reflection> {
    let mut state = self.state();
    let now = Utc::now();
    state.reflections.retain(|r| r.note_id != note_id);
    let reflection = Reflection {
      id:                 Uuid::new_v4(),
      note_id,
      what_worked:        input.what_worked,
      what_didnt_work:    input.what_didnt_work,
      improvements:       input.improvements,
      next_time_reminder: input.next_time_reminder,
      created_at:         now,
      updated_at:         now,
    };
    state.reflections.push(reflection.clone());
    Ok(reflection)
  }
}

// ─── Fixtures ────────────────────────────────────────────────────────────────

struct Fixture {
  store: Arc<MemoryStore>,
  alice: User,
  bob:   User,
}

impl Fixture {
  async fn new() -> Self {
    let store = Arc::new(MemoryStore::default());
    let users = UserService::new(store.clone());
    let alice = users.resolve_principal(identity("alice")).await.unwrap();
    let bob = users.resolve_principal(identity("bob")).await.unwrap();
    Self { store, alice, bob }
  }

  fn notes(&self) -> NoteService<MemoryStore> {
    NoteService::new(self.store.clone(), "https://leavenote.app")
  }

  fn checklist(&self) -> ChecklistService<MemoryStore> { ChecklistService::new(self.store.clone()) }

  fn sharing(&self) -> SharingService<MemoryStore> { SharingService::new(self.store.clone()) }
}

fn identity(who: &str) -> VerifiedIdentity {
  VerifiedIdentity {
    subject: format!("subject-{who}"),
    name:    Some(who.to_uppercase()),
    email:   Some(format!("{who}@example.com")),
  }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(y, m, d).unwrap() }

fn okinawa() -> NewNote {
  NewNote {
    title:              "Okinawa trip".into(),
    destination:        "Okinawa".into(),
    departure_date:     date(2024, 8, 15),
    return_date:        date(2024, 8, 20),
    description:        None,
    checklist_items:    vec![
      NewChecklistItem { text: "Turn off the air conditioner".into(), sort_order: 2 },
      NewChecklistItem { text: "Lock the front door".into(), sort_order: 1 },
    ],
    emergency_contacts: vec![NewEmergencyContact {
      name:         "Taro".into(),
      relationship: "father".into(),
      phone:        Some("090-1234-5678".into()),
      email:        None,
      sort_order:   1,
    }],
    requests:           vec![NewRequest {
      person:     "Neighbour".into(),
      request:    "Check the mailbox".into(),
      priority:   Priority::High,
      sort_order: 1,
    }],
  }
}

// ─── Notes ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn created_note_lists_children_in_sort_order() {
  let f = Fixture::new().await;
  let note = f.notes().create_note(f.alice.id, okinawa()).await.unwrap();

  let detail = f.notes().get_note(note.id, f.alice.id).await.unwrap();
  let texts: Vec<_> = detail.checklist_items.iter().map(|i| i.text.as_str()).collect();
  assert_eq!(texts, ["Lock the front door", "Turn off the air conditioner"]);
  assert_eq!(detail.emergency_contacts.len(), 1);
  assert_eq!(detail.requests.len(), 1);
  assert!(detail.reflection.is_none());
  assert_eq!(detail.note.status, NoteStatus::Draft);
}

#[tokio::test]
async fn listing_reports_checklist_progress() {
  let f = Fixture::new().await;
  f.notes().create_note(f.alice.id, okinawa()).await.unwrap();

  let page = f.notes().list_notes(f.alice.id, NoteFilter::default()).await.unwrap();
  assert_eq!(page.notes.len(), 1);
  let progress = page.notes[0].checklist_progress;
  assert_eq!((progress.completed, progress.total, progress.percentage), (0, 2, 0));
  assert_eq!(page.pagination.page, 1);
  assert_eq!(page.pagination.limit, 10);
  assert_eq!(page.pagination.total, 1);
  assert_eq!(page.pagination.total_pages, 1);
}

#[tokio::test]
async fn empty_checklist_progress_is_zero() {
  let f = Fixture::new().await;
  let mut input = okinawa();
  input.checklist_items.clear();
  f.notes().create_note(f.alice.id, input).await.unwrap();

  let page = f.notes().list_notes(f.alice.id, NoteFilter::default()).await.unwrap();
  assert_eq!(page.notes[0].checklist_progress.percentage, 0);
  assert_eq!(page.notes[0].checklist_progress.total, 0);
}

#[tokio::test]
async fn listing_clamps_limit_and_scopes_to_owner() {
  let f = Fixture::new().await;
  f.notes().create_note(f.alice.id, okinawa()).await.unwrap();
  f.notes().create_note(f.bob.id, okinawa()).await.unwrap();

  let filter = NoteFilter { limit: Some(500), ..Default::default() };
  let page = f.notes().list_notes(f.alice.id, filter).await.unwrap();
  assert_eq!(page.pagination.limit, 50);
  assert_eq!(page.pagination.total, 1);
  assert!(page.notes.iter().all(|n| n.note.user_id == f.alice.id));
}

#[tokio::test]
async fn listing_filters_by_status() {
  let f = Fixture::new().await;
  let a = f.notes().create_note(f.alice.id, okinawa()).await.unwrap();
  f.notes().create_note(f.alice.id, okinawa()).await.unwrap();
  f.notes().update_status(a.id, f.alice.id, NoteStatus::Active).await.unwrap();

  let filter = NoteFilter { status: Some(NoteStatus::Active), ..Default::default() };
  let page = f.notes().list_notes(f.alice.id, filter).await.unwrap();
  assert_eq!(page.pagination.total, 1);
  assert_eq!(page.notes[0].note.id, a.id);
}

#[tokio::test]
async fn foreign_note_is_forbidden_and_missing_note_not_found() {
  let f = Fixture::new().await;
  let note = f.notes().create_note(f.bob.id, okinawa()).await.unwrap();

  let err = f.notes().get_note(note.id, f.alice.id).await.err().unwrap();
  assert!(matches!(err, Error::Authorization(_)));
  assert_eq!(err.status(), 403);

  let err = f.notes().get_note(Uuid::new_v4(), f.alice.id).await.err().unwrap();
  assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn create_rejects_inverted_dates_and_stores_nothing() {
  let f = Fixture::new().await;
  let mut input = okinawa();
  input.return_date = input.departure_date;

  let err = f.notes().create_note(f.alice.id, input).await.err().unwrap();
  assert!(matches!(err, Error::BusinessRule(_)));
  assert!(f.store.state().notes.is_empty());
  assert!(f.store.state().items.is_empty());
}

#[tokio::test]
async fn single_date_update_is_checked_against_persisted_date() {
  let f = Fixture::new().await;
  let note = f.notes().create_note(f.alice.id, okinawa()).await.unwrap();

  let patch = NotePatch { departure_date: Some(date(2024, 8, 21)), ..Default::default() };
  let err = f.notes().update_note(note.id, f.alice.id, patch).await.err().unwrap();
  assert!(matches!(err, Error::BusinessRule(_)));

  let stored = f.notes().get_note(note.id, f.alice.id).await.unwrap();
  assert_eq!(stored.note.departure_date, date(2024, 8, 15));

  let patch = NotePatch { return_date: Some(date(2024, 8, 25)), ..Default::default() };
  let updated = f.notes().update_note(note.id, f.alice.id, patch).await.unwrap();
  assert_eq!(updated.note.return_date, date(2024, 8, 25));
  assert_eq!(updated.checklist_items.len(), 2);
}

#[tokio::test]
async fn partial_update_keeps_other_fields() {
  let f = Fixture::new().await;
  let note = f.notes().create_note(f.alice.id, okinawa()).await.unwrap();

  let patch = NotePatch { title: Some("  Family trip ".into()), ..Default::default() };
  let updated = f.notes().update_note(note.id, f.alice.id, patch).await.unwrap();
  assert_eq!(updated.note.title, "Family trip");
  assert_eq!(updated.note.destination, "Okinawa");
}

#[tokio::test]
async fn update_by_non_owner_is_forbidden() {
  let f = Fixture::new().await;
  let note = f.notes().create_note(f.alice.id, okinawa()).await.unwrap();

  let patch = NotePatch { title: Some("mine now".into()), ..Default::default() };
  let err = f.notes().update_note(note.id, f.bob.id, patch).await.err().unwrap();
  assert!(matches!(err, Error::Authorization(_)));
}

#[tokio::test]
async fn update_replaces_only_the_supplied_child_collections() {
  let f = Fixture::new().await;
  let note = f.notes().create_note(f.alice.id, okinawa()).await.unwrap();

  let patch = NotePatch {
    title: Some("Okinawa again".into()),
    checklist_items: Some(vec![NewChecklistItem { text: " Pack sunscreen ".into(), sort_order: 0 }]),
    requests: Some(vec![]),
    ..Default::default()
  };
  let detail = f.notes().update_note(note.id, f.alice.id, patch).await.unwrap();

  assert_eq!(detail.note.title, "Okinawa again");
  let texts: Vec<_> = detail.checklist_items.iter().map(|i| i.text.as_str()).collect();
  assert_eq!(texts, ["Pack sunscreen"]);
  assert!(detail.requests.is_empty());
  assert_eq!(detail.emergency_contacts.len(), 1);
}

#[tokio::test]
async fn invalid_children_in_an_update_change_nothing() {
  let f = Fixture::new().await;
  let note = f.notes().create_note(f.alice.id, okinawa()).await.unwrap();

  let patch = NotePatch {
    title: Some("changed".into()),
    checklist_items: Some(vec![NewChecklistItem { text: "  ".into(), sort_order: 0 }]),
    ..Default::default()
  };
  let err = f.notes().update_note(note.id, f.alice.id, patch).await.err().unwrap();
  assert_eq!(err.details()[0].field.as_deref(), Some("checklistItems[0].text"));

  let detail = f.notes().get_note(note.id, f.alice.id).await.unwrap();
  assert_eq!(detail.note.title, "Okinawa trip");
  assert_eq!(detail.checklist_items.len(), 2);
}

#[tokio::test]
async fn five_digit_years_are_rejected_before_storage() {
  let f = Fixture::new().await;
  let mut input = okinawa();
  input.return_date = date(10000, 1, 1);
  let err = f.notes().create_note(f.alice.id, input).await.err().unwrap();
  assert_eq!(err.status(), 422);
  assert_eq!(err.details()[0].field.as_deref(), Some("returnDate"));
  assert!(f.store.state().notes.is_empty());
}

#[tokio::test]
async fn active_note_cannot_be_deleted_until_status_changes() {
  let f = Fixture::new().await;
  let note = f.notes().create_note(f.alice.id, okinawa()).await.unwrap();
  f.notes().update_status(note.id, f.alice.id, NoteStatus::Active).await.unwrap();

  let err = f.notes().delete_note(note.id, f.alice.id).await.err().unwrap();
  assert!(matches!(err, Error::BusinessRule(_)));
  assert_eq!(f.store.state().notes.len(), 1);

  f.notes().update_status(note.id, f.alice.id, NoteStatus::Completed).await.unwrap();
  f.notes().delete_note(note.id, f.alice.id).await.unwrap();

  let state = f.store.state();
  assert!(state.notes.is_empty());
  assert!(state.items.is_empty());
  assert!(state.contacts.is_empty());
  assert!(state.requests.is_empty());
}

#[tokio::test]
async fn reflection_is_saved_once_per_note() {
  let f = Fixture::new().await;
  let note = f.notes().create_note(f.alice.id, okinawa()).await.unwrap();
  let input = ReflectionInput { what_worked: " neighbour help ".into(), ..Default::default() };
  f.notes().save_reflection(note.id, f.alice.id, input).await.unwrap();

  let input = ReflectionInput { improvements: "check earlier".into(), ..Default::default() };
  f.notes().save_reflection(note.id, f.alice.id, input).await.unwrap();

  let detail = f.notes().get_note(note.id, f.alice.id).await.unwrap();
  let reflection = detail.reflection.unwrap();
  assert_eq!(reflection.improvements, "check earlier");
  assert_eq!(reflection.what_worked, "");
  assert_eq!(f.store.state().reflections.len(), 1);
}

// ─── Sharing ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn share_link_serves_redacted_note() {
  let f = Fixture::new().await;
  let note = f.notes().create_note(f.alice.id, okinawa()).await.unwrap();
  let link = f.notes().generate_share_token(note.id, f.alice.id).await.unwrap();
  assert!(link.is_shared);
  assert_eq!(link.share_url, format!("https://leavenote.app/shared/{}", link.share_token));

  let shared = f.sharing().get_shared_note(&link.share_token).await.unwrap();
  assert_eq!(shared.id, note.id);
  assert_eq!(shared.owner.name, "ALICE");
  assert_eq!(shared.checklist_items[0].text, "Lock the front door");

  let json = serde_json::to_value(&shared).unwrap();
  assert!(json.get("userId").is_none());
  assert!(json.get("createdAt").is_none());
  assert!(json.get("shareToken").is_none());
  assert!(json["checklistItems"][0].get("id").is_none());
}

#[tokio::test]
async fn disabled_share_is_indistinguishable_from_unknown_token() {
  let f = Fixture::new().await;
  let note = f.notes().create_note(f.alice.id, okinawa()).await.unwrap();
  let link = f.notes().generate_share_token(note.id, f.alice.id).await.unwrap();
  f.notes().disable_sharing(note.id, f.alice.id).await.unwrap();

  let revoked = f.sharing().get_shared_note(&link.share_token).await.err().unwrap();
  let unknown = f.sharing().get_shared_note(&crate::share::generate_share_token()).await.err().unwrap();
  assert!(matches!(revoked, Error::NotFound(_)));
  assert_eq!(revoked.to_string(), unknown.to_string());

  let stored = f.notes().get_note(note.id, f.alice.id).await.unwrap();
  assert_eq!(stored.note.sharing, Sharing::Disabled);
}

#[tokio::test]
async fn regenerating_invalidates_previous_token() {
  let f = Fixture::new().await;
  let note = f.notes().create_note(f.alice.id, okinawa()).await.unwrap();
  let first = f.notes().generate_share_token(note.id, f.alice.id).await.unwrap();
  let second = f.notes().generate_share_token(note.id, f.alice.id).await.unwrap();
  assert_ne!(first.share_token, second.share_token);

  assert!(f.sharing().get_shared_note(&first.share_token).await.is_err());
  assert!(f.sharing().get_shared_note(&second.share_token).await.is_ok());
}

#[tokio::test]
async fn only_the_owner_can_share() {
  let f = Fixture::new().await;
  let note = f.notes().create_note(f.alice.id, okinawa()).await.unwrap();
  let err = f.notes().generate_share_token(note.id, f.bob.id).await.err().unwrap();
  assert!(matches!(err, Error::Authorization(_)));
  assert_eq!(f.store.state().notes[0].sharing, Sharing::Disabled);
}

// ─── Checklist ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn toggling_completed_leaves_other_fields() {
  let f = Fixture::new().await;
  let note = f.notes().create_note(f.alice.id, okinawa()).await.unwrap();
  let item = f
    .checklist()
    .create_item(note.id, f.alice.id, NewChecklistItem { text: " Water plants ".into(), sort_order: 7 })
    .await
    .unwrap();
  assert_eq!(item.text, "Water plants");

  let patch = ChecklistItemPatch { completed: Some(true), ..Default::default() };
  let updated = f.checklist().update_item(item.id, f.alice.id, patch).await.unwrap();
  assert!(updated.completed);
  assert_eq!(updated.text, "Water plants");
  assert_eq!(updated.sort_order, 7);
}

#[tokio::test]
async fn checklist_items_are_guarded_by_the_parent_owner() {
  let f = Fixture::new().await;
  let note = f.notes().create_note(f.alice.id, okinawa()).await.unwrap();
  let item_id = f.store.state().items[0].id;

  let patch = ChecklistItemPatch { completed: Some(true), ..Default::default() };
  let forbidden = f.checklist().update_item(item_id, f.bob.id, patch).await.err().unwrap();
  let missing = f.checklist().delete_item(Uuid::new_v4(), f.bob.id).await.err().unwrap();
  assert!(matches!(forbidden, Error::Authorization(_)));
  assert!(matches!(missing, Error::NotFound(_)));
  assert_eq!(forbidden.to_string(), missing.to_string());

  let err = f
    .checklist()
    .create_item(note.id, f.bob.id, NewChecklistItem { text: "sneaky".into(), sort_order: 0 })
    .await
    .err()
    .unwrap();
  assert!(matches!(err, Error::Authorization(_)));

  f.checklist().delete_item(item_id, f.alice.id).await.unwrap();
  assert_eq!(f.store.state().items.len(), 1);
}

#[tokio::test]
async fn blank_checklist_text_is_a_validation_error() {
  let f = Fixture::new().await;
  let note = f.notes().create_note(f.alice.id, okinawa()).await.unwrap();
  let err = f
    .checklist()
    .create_item(note.id, f.alice.id, NewChecklistItem { text: "   ".into(), sort_order: 0 })
    .await
    .err()
    .unwrap();
  assert_eq!(err.status(), 422);
}

#[tokio::test]
async fn ownership_is_checked_before_the_body() {
  let f = Fixture::new().await;
  let note = f.notes().create_note(f.alice.id, okinawa()).await.unwrap();
  let item_id = f.store.state().items[0].id;

  let err = f
    .checklist()
    .create_item(note.id, f.bob.id, NewChecklistItem { text: "  ".into(), sort_order: 0 })
    .await
    .err()
    .unwrap();
  assert!(matches!(err, Error::Authorization(_)));

  let patch = ChecklistItemPatch { text: Some(String::new()), ..Default::default() };
  let err = f.checklist().update_item(item_id, f.bob.id, patch).await.err().unwrap();
  assert!(matches!(err, Error::Authorization(_)));

  let blank = NewChecklistItem { text: " ".into(), sort_order: 0 };
  let err = f.checklist().create_item(Uuid::new_v4(), f.bob.id, blank).await.err().unwrap();
  assert!(matches!(err, Error::NotFound(_)));
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn first_authentication_registers_the_subject_once() {
  let f = Fixture::new().await;
  let users = UserService::new(f.store.clone());
  let again = users.resolve_principal(identity("alice")).await.unwrap();
  assert_eq!(again.id, f.alice.id);
  assert_eq!(f.store.state().users.len(), 2);
}

#[tokio::test]
async fn identity_without_email_cannot_register() {
  let f = Fixture::new().await;
  let users = UserService::new(f.store.clone());
  let err = users
    .resolve_principal(VerifiedIdentity { subject: "new".into(), name: None, email: None })
    .await
    .err()
    .unwrap();
  assert!(matches!(err, Error::Authentication(_)));
}

#[tokio::test]
async fn profile_update_trims_and_validates_name() {
  let f = Fixture::new().await;
  let users = UserService::new(f.store.clone());
  let user = users
    .update_profile(f.alice.id, ProfileUpdate { name: "  Hanako ".into() })
    .await
    .unwrap();
  assert_eq!(user.name, "Hanako");

  let err = users
    .update_profile(f.alice.id, ProfileUpdate { name: " ".into() })
    .await
    .err()
    .unwrap();
  assert_eq!(err.details()[0].field.as_deref(), Some("name"));
}
