//! Ownership guard.
//!
//! Every single-item read and every mutation of a note or one of its children
//! goes through [`assert_ownership`] before touching anything. A missing
//! resource and a foreign resource produce the same message; only the
//! category (and therefore the status) differs.

use std::fmt;

use uuid::Uuid;

use crate::{Error, Result, note::Note};

/// What kind of resource a guard check is about; used in messages only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
  Note,
  ChecklistItem,
}

impl fmt::Display for Resource {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Note => "note",
      Self::ChecklistItem => "checklist item",
    })
  }
}

/// Anything bound to a single owning user.
pub trait Owned {
  fn owner_id(&self) -> Uuid;
}

impl Owned for Note {
  fn owner_id(&self) -> Uuid { self.user_id }
}

fn unavailable(kind: Resource) -> String { format!("{kind} is not available") }

/// Fails with `NotFound` when `resource` is absent and with `Authorization`
/// when it belongs to someone other than `user_id`.
pub fn assert_ownership<R: Owned>(
  resource: Option<R>,
  user_id: Uuid,
  kind: Resource,
) -> Result<R> {
  let resource = resource.ok_or_else(|| Error::NotFound(unavailable(kind)))?;
  if resource.owner_id() != user_id {
    tracing::warn!(%user_id, owner_id = %resource.owner_id(), %kind, "ownership check denied");
    return Err(Error::Authorization(unavailable(kind)));
  }
  Ok(resource)
}

/// The `NotFound` a guard would raise for `kind`, for callers that fail
/// before a parent can be looked up.
pub fn not_found(kind: Resource) -> Error { Error::NotFound(unavailable(kind)) }
