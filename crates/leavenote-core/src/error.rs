//! Error taxonomy for `leavenote-core`.
//!
//! Every failure a service can raise falls into one of a fixed set of
//! categories. Each category carries a stable machine-readable code and the
//! HTTP-style status number the boundary layer answers with; the core itself
//! knows nothing about HTTP.

use serde::Serialize;
use thiserror::Error;

/// A single field-level complaint attached to a [`Error::Validation`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub field:   Option<String>,
  pub message: String,
}

impl FieldError {
  pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
    Self { field: Some(field.into()), message: message.into() }
  }
}

#[derive(Debug, Error)]
pub enum Error {
  /// Malformed or invalid input.
  #[error("{message}")]
  Validation {
    message: String,
    details: Vec<FieldError>,
  },

  /// Missing or invalid principal.
  #[error("{0}")]
  Authentication(String),

  /// The principal resolved but has no rights over the target resource.
  #[error("{0}")]
  Authorization(String),

  #[error("{0}")]
  NotFound(String),

  /// A domain rule refused the operation (e.g. deleting an active note).
  #[error("{0}")]
  BusinessRule(String),

  /// Reserved for uniqueness violations.
  #[error("{0}")]
  Conflict(String),

  /// Anything the store could not classify. Never shown to clients.
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// A validation failure pinned to one field.
  pub fn invalid_field(
    field: impl Into<String>,
    message: impl Into<String>,
  ) -> Self {
    let message = message.into();
    Self::Validation {
      message: message.clone(),
      details: vec![FieldError::new(field, message)],
    }
  }

  /// Wrap an unclassified store failure.
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }

  /// Stable error code used in response bodies.
  pub fn code(&self) -> &'static str {
    match self {
      Self::Validation { .. } => "VALIDATION_ERROR",
      Self::Authentication(_) => "AUTHENTICATION_ERROR",
      Self::Authorization(_) => "AUTHORIZATION_ERROR",
      Self::NotFound(_) => "NOT_FOUND",
      Self::BusinessRule(_) => "BUSINESS_RULE_ERROR",
      Self::Conflict(_) => "DUPLICATE_ERROR",
      Self::Store(_) => "INTERNAL_SERVER_ERROR",
    }
  }

  /// Status number for the boundary layer.
  pub fn status(&self) -> u16 {
    match self {
      Self::Validation { .. } => 422,
      Self::Authentication(_) => 401,
      Self::Authorization(_) => 403,
      Self::NotFound(_) => 404,
      Self::BusinessRule(_) => 400,
      Self::Conflict(_) => 409,
      Self::Store(_) => 500,
    }
  }

  /// Field-level details; empty for every category except validation.
  pub fn details(&self) -> &[FieldError] {
    match self {
      Self::Validation { details, .. } => details,
      _ => &[],
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
