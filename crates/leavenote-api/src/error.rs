//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every failure leaves the server as
//! `{"error":{"code","message","details"?}}` with the status of its class.

use axum::{
  Json,
  extract::rejection::{JsonRejection, QueryRejection},
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use leavenote_core::{Error, FieldError};
use serde::Serialize;

/// Opaque message for failures that are not part of the error taxonomy.
const INTERNAL_MESSAGE: &str = "internal server error";

/// An error returned by an API handler.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
  fn from(e: Error) -> Self { Self(e) }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    Self(Error::Validation { message: rejection.body_text(), details: Vec::new() })
  }
}

impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self {
    Self(Error::Validation { message: rejection.body_text(), details: Vec::new() })
  }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
  code:    &'static str,
  message: String,
  #[serde(skip_serializing_if = "no_details")]
  details: &'a [FieldError],
}

fn no_details(details: &&[FieldError]) -> bool { details.is_empty() }

#[derive(Serialize)]
struct Envelope<'a> {
  error: ErrorBody<'a>,
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let err = &self.0;
    let status =
      StatusCode::from_u16(err.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let message = match err {
      Error::Store(source) => {
        tracing::error!(error = %source, "unclassified store failure");
        INTERNAL_MESSAGE.to_owned()
      }
      other => other.to_string(),
    };

    let body = Envelope {
      error: ErrorBody { code: err.code(), message, details: err.details() },
    };
    let mut res = (status, Json(body)).into_response();

    if status == StatusCode::UNAUTHORIZED {
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Bearer realm=\"leavenote\""),
      );
    }
    res
  }
}
