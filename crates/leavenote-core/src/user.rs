//! The identity record behind every owned note.
//!
//! Users are keyed by the subject identifier issued by the external
//! authentication provider. A user row is created the first time a verified
//! subject reaches the API and is never hard-deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub id:         Uuid,
  /// Subject identifier from the external auth provider.
  pub subject:    String,
  pub name:       String,
  pub email:      String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Input to [`crate::store::NoteStore::create_user`].
#[derive(Debug, Clone)]
pub struct NewUser {
  pub subject: String,
  pub name:    String,
  pub email:   String,
}

/// What a token verifier vouches for after checking a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
  pub subject: String,
  pub name:    Option<String>,
  pub email:   Option<String>,
}

/// Body of a profile update.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileUpdate {
  pub name: String,
}
