//! [`SqliteStore`]: the SQLite implementation of [`NoteStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use leavenote_core::{
  note::{
    ChecklistItem, ChecklistItemPatch, NewChecklistItem, NewEmergencyContact,
    NewNote, NewRequest, Note, NoteChildren, NotePatch, NoteStatus, Reflection,
    ReflectionInput, Sharing,
  },
  store::{NoteDeletion, NoteQuery, NoteRows, NoteSort, NoteStore},
  user::{NewUser, User},
};

use crate::{
  Result,
  encode::{
    CHECKLIST_COLUMNS, CONTACT_COLUMNS, NOTE_COLUMNS, REFLECTION_COLUMNS,
    REQUEST_COLUMNS, RawChecklistItem, RawContact, RawNote, RawNoteWithCounts,
    RawReflection, RawRequest, RawUser, USER_COLUMNS, encode_date, encode_dt,
    encode_sharing, encode_uuid, now,
  },
  error::Error,
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A leavenote store backed by a single SQLite file.
///
/// Cloning shares the underlying connection.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

/// Raw child rows of one note, read in a single connection call.
struct RawChildren {
  items:      Vec<RawChecklistItem>,
  contacts:   Vec<RawContact>,
  requests:   Vec<RawRequest>,
  reflection: Option<RawReflection>,
}

fn order_clause(sort: NoteSort) -> &'static str {
  // rowid breaks ties between notes created in the same microsecond.
  match sort {
    NoteSort::CreatedDesc => "n.created_at DESC, n.rowid DESC",
    NoteSort::CreatedAsc => "n.created_at ASC, n.rowid ASC",
    NoteSort::DepartureDesc => "n.departure_date DESC, n.created_at DESC, n.rowid DESC",
    NoteSort::DepartureAsc => "n.departure_date ASC, n.created_at ASC, n.rowid ASC",
  }
}

// ─── Child rows ──────────────────────────────────────────────────────────────

fn insert_checklist_items(
  conn: &rusqlite::Connection,
  note_id: &str,
  items: Vec<NewChecklistItem>,
  at: &str,
) -> rusqlite::Result<()> {
  for item in items {
    conn.execute(
      "INSERT INTO checklist_items
         (item_id, note_id, text, completed, sort_order, created_at, updated_at)
       VALUES (?1, ?2, ?3, 0, ?4, ?5, ?5)",
      rusqlite::params![encode_uuid(Uuid::new_v4()), note_id, item.text, item.sort_order, at],
    )?;
  }
  Ok(())
}

fn insert_contacts(
  conn: &rusqlite::Connection,
  note_id: &str,
  contacts: Vec<NewEmergencyContact>,
) -> rusqlite::Result<()> {
  for contact in contacts {
    conn.execute(
      "INSERT INTO emergency_contacts
         (contact_id, note_id, name, relationship, phone, email, sort_order)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
      rusqlite::params![
        encode_uuid(Uuid::new_v4()),
        note_id,
        contact.name,
        contact.relationship,
        contact.phone,
        contact.email,
        contact.sort_order,
      ],
    )?;
  }
  Ok(())
}

fn insert_requests(
  conn: &rusqlite::Connection,
  note_id: &str,
  requests: Vec<NewRequest>,
) -> rusqlite::Result<()> {
  for request in requests {
    conn.execute(
      "INSERT INTO requests
         (request_id, note_id, person, request, priority, sort_order)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
      rusqlite::params![
        encode_uuid(Uuid::new_v4()),
        note_id,
        request.person,
        request.request,
        request.priority.as_ref(),
        request.sort_order,
      ],
    )?;
  }
  Ok(())
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open a fresh in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn select_note(&self, id: Uuid) -> Result<Option<Note>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawNote> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {NOTE_COLUMNS} FROM notes n WHERE n.note_id = ?1"),
              rusqlite::params![id_str],
              RawNote::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawNote::into_note).transpose()
  }

  async fn select_checklist_item(&self, id: Uuid) -> Result<Option<ChecklistItem>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawChecklistItem> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {CHECKLIST_COLUMNS} FROM checklist_items WHERE item_id = ?1"),
              rusqlite::params![id_str],
              RawChecklistItem::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawChecklistItem::into_item).transpose()
  }
}

// ─── NoteStore impl ──────────────────────────────────────────────────────────

impl NoteStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn find_user_by_subject(&self, subject: String) -> Result<Option<User>> {
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLUMNS} FROM users WHERE subject = ?1"),
              rusqlite::params![subject],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1"),
              rusqlite::params![id_str],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn create_user(&self, input: NewUser) -> Result<User> {
    let now = now();
    let user = User {
      id:         Uuid::new_v4(),
      subject:    input.subject,
      name:       input.name,
      email:      input.email,
      created_at: now,
      updated_at: now,
    };

    let id_str  = encode_uuid(user.id);
    let subject = user.subject.clone();
    let name    = user.name.clone();
    let email   = user.email.clone();
    let at_str  = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (user_id, subject, name, email, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
          rusqlite::params![id_str, subject, name, email, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(user)
  }

  async fn update_user_name(&self, id: Uuid, name: String) -> Result<Option<User>> {
    let id_str = encode_uuid(id);
    let at_str = encode_dt(now());

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE users SET name = ?2, updated_at = ?3 WHERE user_id = ?1",
          rusqlite::params![id_str, name, at_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    self.get_user(id).await
  }

  // ── Notes ─────────────────────────────────────────────────────────────────

  async fn list_notes(&self, query: NoteQuery) -> Result<NoteRows> {
    let owner_str  = encode_uuid(query.owner);
    let status_str = query.status.map(|s| s.as_ref().to_owned());
    let order      = order_clause(query.sort);
    let limit_val  = i64::from(query.limit);
    let offset_val = i64::try_from(query.offset).unwrap_or(i64::MAX);

    let (raws, total): (Vec<RawNoteWithCounts>, i64) = self
      .conn
      .call(move |conn| {
        let total: i64 = conn.query_row(
          "SELECT COUNT(*) FROM notes n
           WHERE n.user_id = ?1 AND (?2 IS NULL OR n.status = ?2)",
          rusqlite::params![owner_str, status_str],
          |r| r.get(0),
        )?;

        let sql = format!(
          "SELECT {NOTE_COLUMNS},
             (SELECT COUNT(*) FROM checklist_items c
               WHERE c.note_id = n.note_id AND c.completed = 1),
             (SELECT COUNT(*) FROM checklist_items c WHERE c.note_id = n.note_id)
           FROM notes n
           WHERE n.user_id = ?1 AND (?2 IS NULL OR n.status = ?2)
           ORDER BY {order}
           LIMIT ?3 OFFSET ?4"
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![owner_str, status_str, limit_val, offset_val],
            |row| {
              Ok(RawNoteWithCounts {
                note:      RawNote::from_row(row)?,
                completed: row.get(12)?,
                total:     row.get(13)?,
              })
            },
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((rows, total))
      })
      .await?;

    let rows = raws
      .into_iter()
      .map(RawNoteWithCounts::into_pair)
      .collect::<Result<_>>()?;

    Ok(NoteRows { rows, total: u64::try_from(total).unwrap_or_default() })
  }

  async fn get_note(&self, id: Uuid) -> Result<Option<Note>> { self.select_note(id).await }

  async fn get_note_children(&self, note_id: Uuid) -> Result<NoteChildren> {
    let id_str = encode_uuid(note_id);

    let raw: RawChildren = self
      .conn
      .call(move |conn| {
        let items = conn
          .prepare(&format!(
            "SELECT {CHECKLIST_COLUMNS} FROM checklist_items
             WHERE note_id = ?1 ORDER BY sort_order, rowid"
          ))?
          .query_map(rusqlite::params![id_str], RawChecklistItem::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let contacts = conn
          .prepare(&format!(
            "SELECT {CONTACT_COLUMNS} FROM emergency_contacts
             WHERE note_id = ?1 ORDER BY sort_order, rowid"
          ))?
          .query_map(rusqlite::params![id_str], RawContact::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let requests = conn
          .prepare(&format!(
            "SELECT {REQUEST_COLUMNS} FROM requests
             WHERE note_id = ?1 ORDER BY sort_order, rowid"
          ))?
          .query_map(rusqlite::params![id_str], RawRequest::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let reflection = conn
          .query_row(
            &format!("SELECT {REFLECTION_COLUMNS} FROM reflections WHERE note_id = ?1"),
            rusqlite::params![id_str],
            RawReflection::from_row,
          )
          .optional()?;

        Ok(RawChildren { items, contacts, requests, reflection })
      })
      .await?;

    Ok(NoteChildren {
      checklist_items:    raw
        .items
        .into_iter()
        .map(RawChecklistItem::into_item)
        .collect::<Result<_>>()?,
      emergency_contacts: raw
        .contacts
        .into_iter()
        .map(RawContact::into_contact)
        .collect::<Result<_>>()?,
      requests:           raw
        .requests
        .into_iter()
        .map(RawRequest::into_request)
        .collect::<Result<_>>()?,
      reflection:         raw
        .reflection
        .map(RawReflection::into_reflection)
        .transpose()?,
    })
  }

  async fn create_note(&self, owner: Uuid, input: NewNote) -> Result<Note> {
    let now = now();
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

    let note_id_str = encode_uuid(note.id);
    let owner_str   = encode_uuid(owner);
    let title       = note.title.clone();
    let destination = note.destination.clone();
    let departure   = encode_date(note.departure_date);
    let return_date = encode_date(note.return_date);
    let description = note.description.clone();
    let status_str  = note.status.as_ref().to_owned();
    let at_str      = encode_dt(now);
    let items       = input.checklist_items;
    let contacts    = input.emergency_contacts;
    let requests    = input.requests;

    self
      .conn
      .call(move |conn| {
        // Dropping the transaction without commit rolls every insert back.
        let tx = conn.transaction()?;

        tx.execute(
          "INSERT INTO notes (
             note_id, user_id, title, destination, departure_date, return_date,
             description, status, is_shared, share_token, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0, NULL, ?9, ?9)",
          rusqlite::params![
            note_id_str,
            owner_str,
            title,
            destination,
            departure,
            return_date,
            description,
            status_str,
            at_str,
          ],
        )?;

        insert_checklist_items(&tx, &note_id_str, items, &at_str)?;
        insert_contacts(&tx, &note_id_str, contacts)?;
        insert_requests(&tx, &note_id_str, requests)?;

        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(note)
  }

  async fn update_note(&self, id: Uuid, patch: NotePatch) -> Result<Option<Note>> {
    let id_str      = encode_uuid(id);
    let departure   = patch.departure_date.map(encode_date);
    let return_date = patch.return_date.map(encode_date);
    let status_str  = patch.status.map(|s| s.as_ref().to_owned());
    let at_str      = encode_dt(now());
    let items       = patch.checklist_items;
    let contacts    = patch.emergency_contacts;
    let requests    = patch.requests;

    // An empty description clears the column; `None` leaves it alone.
    let changed = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let changed = tx.execute(
          "UPDATE notes SET
             title          = COALESCE(?2, title),
             destination    = COALESCE(?3, destination),
             departure_date = COALESCE(?4, departure_date),
             return_date    = COALESCE(?5, return_date),
             description    = CASE
                                WHEN ?6 IS NULL THEN description
                                WHEN ?6 = ''    THEN NULL
                                ELSE ?6
                              END,
             status         = COALESCE(?7, status),
             updated_at     = ?8
           WHERE note_id = ?1",
          rusqlite::params![
            id_str,
            patch.title,
            patch.destination,
            departure,
            return_date,
            patch.description,
            status_str,
            at_str,
          ],
        )?;
        if changed == 0 {
          return Ok(0);
        }

        if let Some(items) = items {
          tx.execute("DELETE FROM checklist_items WHERE note_id = ?1", [&id_str])?;
          insert_checklist_items(&tx, &id_str, items, &at_str)?;
        }
        if let Some(contacts) = contacts {
          tx.execute("DELETE FROM emergency_contacts WHERE note_id = ?1", [&id_str])?;
          insert_contacts(&tx, &id_str, contacts)?;
        }
        if let Some(requests) = requests {
          tx.execute("DELETE FROM requests WHERE note_id = ?1", [&id_str])?;
          insert_requests(&tx, &id_str, requests)?;
        }

        tx.commit()?;
        Ok(changed)
      })
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    self.select_note(id).await
  }

  async fn delete_note(&self, id: Uuid) -> Result<NoteDeletion> {
    let id_str = encode_uuid(id);
    let active = NoteStatus::Active.as_ref().to_owned();

    // The status condition lives in the DELETE so a concurrent activation
    // cannot slip between a check and the removal.
    let outcome = self
      .conn
      .call(move |conn| {
        let deleted = conn.execute(
          "DELETE FROM notes WHERE note_id = ?1 AND status <> ?2",
          rusqlite::params![id_str, active],
        )?;
        if deleted > 0 {
          return Ok(NoteDeletion::Deleted);
        }
        let exists = conn
          .query_row("SELECT 1 FROM notes WHERE note_id = ?1", [&id_str], |_| Ok(()))
          .optional()?
          .is_some();
        Ok(if exists { NoteDeletion::Active } else { NoteDeletion::Missing })
      })
      .await?;

    Ok(outcome)
  }

  async fn set_sharing(&self, id: Uuid, sharing: Sharing) -> Result<bool> {
    let id_str             = encode_uuid(id);
    let (is_shared, token) = encode_sharing(&sharing);
    let at_str             = encode_dt(now());

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE notes SET is_shared = ?2, share_token = ?3, updated_at = ?4
           WHERE note_id = ?1",
          rusqlite::params![id_str, is_shared, token, at_str],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }

  async fn find_shared_note(&self, token: String) -> Result<Option<Note>> {
    let raw: Option<RawNote> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {NOTE_COLUMNS} FROM notes n
                 WHERE n.share_token = ?1 AND n.is_shared = 1"
              ),
              rusqlite::params![token],
              RawNote::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawNote::into_note).transpose()
  }

  // ── Checklist items ───────────────────────────────────────────────────────

  async fn get_checklist_item(&self, id: Uuid) -> Result<Option<ChecklistItem>> {
    self.select_checklist_item(id).await
  }

  async fn create_checklist_item(
    &self,
    note_id: Uuid,
    input: NewChecklistItem,
  ) -> Result<ChecklistItem> {
    let now = now();
    let item = ChecklistItem {
      id: Uuid::new_v4(),
      note_id,
      text: input.text,
      completed: false,
      sort_order: input.sort_order,
      created_at: now,
      updated_at: now,
    };

    let item_id_str = encode_uuid(item.id);
    let note_id_str = encode_uuid(note_id);
    let text        = item.text.clone();
    let sort_order  = item.sort_order;
    let at_str      = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO checklist_items
             (item_id, note_id, text, completed, sort_order, created_at, updated_at)
           VALUES (?1, ?2, ?3, 0, ?4, ?5, ?5)",
          rusqlite::params![item_id_str, note_id_str, text, sort_order, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(item)
  }

  async fn update_checklist_item(
    &self,
    id: Uuid,
    patch: ChecklistItemPatch,
  ) -> Result<Option<ChecklistItem>> {
    let id_str = encode_uuid(id);
    let at_str = encode_dt(now());

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE checklist_items SET
             text       = COALESCE(?2, text),
             completed  = COALESCE(?3, completed),
             sort_order = COALESCE(?4, sort_order),
             updated_at = ?5
           WHERE item_id = ?1",
          rusqlite::params![id_str, patch.text, patch.completed, patch.sort_order, at_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    self.select_checklist_item(id).await
  }

  async fn delete_checklist_item(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM checklist_items WHERE item_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    Ok(deleted > 0)
  }

  // ── Reflection ────────────────────────────────────────────────────────────

  async fn save_reflection(&self, note_id: Uuid, input: ReflectionInput) -> Result<Reflection> {
    let new_id_str  = encode_uuid(Uuid::new_v4());
    let note_id_str = encode_uuid(note_id);
    let at_str      = encode_dt(now());

    // The upsert keeps the original id and creation time.
    let raw: RawReflection = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          &format!(
            "INSERT INTO reflections (
               reflection_id, note_id, what_worked, what_didnt_work,
               improvements, next_time_reminder, created_at, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
             ON CONFLICT (note_id) DO UPDATE SET
               what_worked        = excluded.what_worked,
               what_didnt_work    = excluded.what_didnt_work,
               improvements       = excluded.improvements,
               next_time_reminder = excluded.next_time_reminder,
               updated_at         = excluded.updated_at
             RETURNING {REFLECTION_COLUMNS}"
          ),
          rusqlite::params![
            new_id_str,
            note_id_str,
            input.what_worked,
            input.what_didnt_work,
            input.improvements,
            input.next_time_reminder,
            at_str,
          ],
          RawReflection::from_row,
        )?)
      })
      .await?;

    raw.into_reflection()
  }
}
