//! Error type for `leavenote-store-sqlite`.

use rusqlite::ffi;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A column held a value no domain type maps to.
  #[error("decode error: {0}")]
  Decode(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
  /// The SQLite extended result code, if this is a constraint failure.
  fn constraint_code(&self) -> Option<i32> {
    match self {
      Error::Database(tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(
        e,
        _,
      ))) if e.code == rusqlite::ErrorCode::ConstraintViolation => Some(e.extended_code),
      _ => None,
    }
  }
}

impl From<Error> for leavenote_core::Error {
  fn from(e: Error) -> Self {
    match e.constraint_code() {
      Some(ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY) => {
        leavenote_core::Error::Conflict("record already exists".into())
      }
      Some(ffi::SQLITE_CONSTRAINT_CHECK) => leavenote_core::Error::BusinessRule(
        "the change would break a stored invariant".into(),
      ),
      _ => leavenote_core::Error::store(e),
    }
  }
}
