//! Bearer-token authentication: the [`Principal`] extractor and the
//! pluggable [`TokenVerifier`] implementations behind it.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, header, request::Parts};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use leavenote_core::{
  Error, Result,
  store::NoteStore,
  user::{User, VerifiedIdentity},
};
use serde::Deserialize;
use sha2::{Digest as _, Sha256};
use thiserror::Error;

use crate::{
  AppState,
  config::{AuthSettings, StaticToken},
  error::ApiError,
};

const BEARER_PREFIX: &str = "Bearer ";

/// Longer bearer tokens are rejected before any verification work.
const MAX_TOKEN_LENGTH: usize = 8192;

const INVALID_TOKEN: &str = "invalid or expired token";

/// Lowercase hex SHA-256 of a bearer token, as stored in the static table.
pub fn token_digest(token: &str) -> String { hex::encode(Sha256::digest(token.as_bytes())) }

/// Pull the token out of an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str> {
  let value = headers
    .get(header::AUTHORIZATION)
    .ok_or_else(|| Error::Authentication("missing bearer token".into()))?
    .to_str()
    .map_err(|_| Error::Authentication("malformed authorization header".into()))?;

  let token = value
    .strip_prefix(BEARER_PREFIX)
    .ok_or_else(|| Error::Authentication("authorization scheme must be Bearer".into()))?
    .trim();

  if token.is_empty() || token.len() > MAX_TOKEN_LENGTH {
    return Err(Error::Authentication("malformed bearer token".into()));
  }
  Ok(token)
}

// ─── Verifiers ───────────────────────────────────────────────────────────────

/// Turns a bearer token into the identity it was issued for.
pub trait TokenVerifier: Send + Sync {
  fn verify(&self, token: &str) -> Result<VerifiedIdentity>;
}

/// Startup failures while building a verifier from configuration.
#[derive(Debug, Error)]
pub enum SetupError {
  #[error("static token for subject {0:?} is not a hex SHA-256 digest")]
  BadDigest(String),

  #[error("jwt secret must not be empty")]
  EmptySecret,
}

struct StaticEntry {
  digest:   [u8; 32],
  identity: VerifiedIdentity,
}

/// Matches tokens against a fixed table of SHA-256 digests.
pub struct StaticTokenVerifier {
  entries: Vec<StaticEntry>,
}

/// Compares every byte so timing does not depend on the first mismatch.
fn digests_equal(a: &[u8], b: &[u8]) -> bool {
  a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

impl StaticTokenVerifier {
  pub fn new(tokens: &[StaticToken]) -> Result<Self, SetupError> {
    let entries = tokens
      .iter()
      .map(|t| {
        let mut digest = [0u8; 32];
        hex::decode_to_slice(t.token_sha256.trim(), &mut digest)
          .map_err(|_| SetupError::BadDigest(t.subject.clone()))?;
        Ok(StaticEntry {
          digest,
          identity: VerifiedIdentity {
            subject: t.subject.clone(),
            name:    t.name.clone(),
            email:   t.email.clone(),
          },
        })
      })
      .collect::<Result<_, SetupError>>()?;
    Ok(Self { entries })
  }
}

impl TokenVerifier for StaticTokenVerifier {
  fn verify(&self, token: &str) -> Result<VerifiedIdentity> {
    let presented = Sha256::digest(token.as_bytes());
    // Scan the whole table regardless of where a match sits.
    let found = self
      .entries
      .iter()
      .filter(|e| digests_equal(&e.digest, presented.as_slice()))
      .last();
    found
      .map(|e| e.identity.clone())
      .ok_or_else(|| Error::Authentication(INVALID_TOKEN.into()))
  }
}

#[derive(Debug, Deserialize)]
struct Claims {
  sub:   String,
  #[serde(default)]
  name:  Option<String>,
  #[serde(default)]
  email: Option<String>,
}

/// Verifies HS256 JWTs; `exp` is always required.
pub struct JwtVerifier {
  key:        DecodingKey,
  validation: Validation,
}

impl JwtVerifier {
  pub fn new(
    secret: &str,
    issuer: Option<&str>,
    audience: Option<&str>,
  ) -> Result<Self, SetupError> {
    if secret.is_empty() {
      return Err(SetupError::EmptySecret);
    }

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    if let Some(iss) = issuer {
      validation.set_issuer(&[iss]);
    }
    match audience {
      Some(aud) => validation.set_audience(&[aud]),
      None => validation.validate_aud = false,
    }

    Ok(Self { key: DecodingKey::from_secret(secret.as_bytes()), validation })
  }
}

impl TokenVerifier for JwtVerifier {
  fn verify(&self, token: &str) -> Result<VerifiedIdentity> {
    let data = jsonwebtoken::decode::<Claims>(token, &self.key, &self.validation).map_err(|e| {
      tracing::debug!(error = %e, "jwt rejected");
      Error::Authentication(INVALID_TOKEN.into())
    })?;

    let claims = data.claims;
    if claims.sub.trim().is_empty() {
      return Err(Error::Authentication(INVALID_TOKEN.into()));
    }
    Ok(VerifiedIdentity { subject: claims.sub, name: claims.name, email: claims.email })
  }
}

/// Build the verifier selected by `settings`.
pub fn build_verifier(settings: &AuthSettings) -> Result<Arc<dyn TokenVerifier>, SetupError> {
  Ok(match settings {
    AuthSettings::Static { tokens } => Arc::new(StaticTokenVerifier::new(tokens)?),
    AuthSettings::Jwt { secret, issuer, audience } => {
      Arc::new(JwtVerifier::new(secret, issuer.as_deref(), audience.as_deref())?)
    }
  })
}

// ─── Extractor ───────────────────────────────────────────────────────────────

/// The authenticated user. Its presence in a handler means the request
/// carried a valid bearer token; first-time subjects are registered here.
pub struct Principal(pub User);

impl<S> FromRequestParts<AppState<S>> for Principal
where
  S: NoteStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let token = bearer_token(&parts.headers)?;
    let identity = state.verifier.verify(token)?;
    let user = state.users().resolve_principal(identity).await?;
    Ok(Principal(user))
  }
}
