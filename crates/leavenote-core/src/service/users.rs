//! [`UserService`]: principal resolution and profile management.

use std::sync::Arc;

use uuid::Uuid;

use crate::{
  Error, Result,
  store::NoteStore,
  user::{NewUser, ProfileUpdate, User, VerifiedIdentity},
  validate,
};

pub struct UserService<S> {
  store: Arc<S>,
}

fn user_missing() -> Error { Error::NotFound("user is not available".into()) }

impl<S: NoteStore> UserService<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// Map a verified identity to its user row, registering the subject on
  /// its first successful authentication.
  pub async fn resolve_principal(&self, identity: VerifiedIdentity) -> Result<User> {
    if let Some(user) = self
      .store
      .find_user_by_subject(identity.subject.clone())
      .await
      .map_err(Into::into)?
    {
      return Ok(user);
    }

    let email = identity
      .email
      .map(|e| e.trim().to_owned())
      .filter(|e| !e.is_empty())
      .ok_or_else(|| Error::Authentication("identity carries no email address".into()))?;
    let name = identity
      .name
      .map(|n| n.trim().to_owned())
      .filter(|n| !n.is_empty())
      .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_owned());

    let created = self
      .store
      .create_user(NewUser { subject: identity.subject.clone(), name, email })
      .await
      .map_err(Into::into);

    match created {
      Ok(user) => {
        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
      }
      // Two first requests raced; the other one registered the subject.
      Err(Error::Conflict(_)) => self
        .store
        .find_user_by_subject(identity.subject)
        .await
        .map_err(Into::into)?
        .ok_or_else(|| Error::Authentication("user could not be registered".into())),
      Err(e) => Err(e),
    }
  }

  pub async fn get_current_user(&self, user_id: Uuid) -> Result<User> {
    self
      .store
      .get_user(user_id)
      .await
      .map_err(Into::into)?
      .ok_or_else(user_missing)
  }

  pub async fn update_profile(&self, user_id: Uuid, update: ProfileUpdate) -> Result<User> {
    let name = validate::display_name(&update.name)?;
    self
      .store
      .update_user_name(user_id, name)
      .await
      .map_err(Into::into)?
      .ok_or_else(user_missing)
  }
}
