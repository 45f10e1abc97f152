//! SQL schema for the leavenote SQLite store.
//!
//! Executed once at connection startup. `PRAGMA foreign_keys` is a
//! per-connection setting, so it lives here rather than in a migration.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id     TEXT PRIMARY KEY,
    subject     TEXT NOT NULL UNIQUE,   -- identity provider subject
    name        TEXT NOT NULL,
    email       TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS notes (
    note_id         TEXT PRIMARY KEY,
    user_id         TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    title           TEXT NOT NULL,
    destination     TEXT NOT NULL,
    departure_date  TEXT NOT NULL,      -- YYYY-MM-DD
    return_date     TEXT NOT NULL,      -- YYYY-MM-DD
    description     TEXT,
    status          TEXT NOT NULL DEFAULT 'draft',
    is_shared       INTEGER NOT NULL DEFAULT 0,
    share_token     TEXT UNIQUE,
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL,
    CHECK (status IN ('draft', 'active', 'completed')),
    CHECK (departure_date < return_date),
    CHECK (is_shared IN (0, 1)),
    CHECK ((is_shared = 1) = (share_token IS NOT NULL))
);

CREATE TABLE IF NOT EXISTS checklist_items (
    item_id     TEXT PRIMARY KEY,
    note_id     TEXT NOT NULL REFERENCES notes(note_id) ON DELETE CASCADE,
    text        TEXT NOT NULL CHECK (length(text) > 0),
    completed   INTEGER NOT NULL DEFAULT 0,
    sort_order  INTEGER NOT NULL DEFAULT 0,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS emergency_contacts (
    contact_id    TEXT PRIMARY KEY,
    note_id       TEXT NOT NULL REFERENCES notes(note_id) ON DELETE CASCADE,
    name          TEXT NOT NULL,
    relationship  TEXT NOT NULL,
    phone         TEXT,
    email         TEXT,
    sort_order    INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS requests (
    request_id  TEXT PRIMARY KEY,
    note_id     TEXT NOT NULL REFERENCES notes(note_id) ON DELETE CASCADE,
    person      TEXT NOT NULL,
    request     TEXT NOT NULL,
    priority    TEXT NOT NULL DEFAULT 'medium',
    sort_order  INTEGER NOT NULL DEFAULT 0,
    CHECK (priority IN ('high', 'medium', 'low'))
);

-- At most one reflection per note.
CREATE TABLE IF NOT EXISTS reflections (
    reflection_id       TEXT PRIMARY KEY,
    note_id             TEXT NOT NULL UNIQUE REFERENCES notes(note_id) ON DELETE CASCADE,
    what_worked         TEXT NOT NULL DEFAULT '',
    what_didnt_work     TEXT NOT NULL DEFAULT '',
    improvements        TEXT NOT NULL DEFAULT '',
    next_time_reminder  TEXT NOT NULL DEFAULT '',
    created_at          TEXT NOT NULL,
    updated_at          TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS notes_user_created_idx ON notes(user_id, created_at);
CREATE INDEX IF NOT EXISTS notes_user_status_idx  ON notes(user_id, status);
CREATE INDEX IF NOT EXISTS checklist_note_idx     ON checklist_items(note_id);
CREATE INDEX IF NOT EXISTS contacts_note_idx      ON emergency_contacts(note_id);
CREATE INDEX IF NOT EXISTS requests_note_idx      ON requests(note_id);

PRAGMA user_version = 1;
";
