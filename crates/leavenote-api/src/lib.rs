//! JSON REST API for leavenote.
//!
//! Exposes an axum [`Router`] backed by any [`NoteStore`]. Every `/api`
//! route except the public shared-note read requires a bearer token.

pub mod auth;
pub mod checklist;
pub mod config;
pub mod error;
pub mod extract;
pub mod notes;
pub mod sharing;
pub mod users;

pub use config::ServerConfig;
pub use error::ApiError;

use std::sync::Arc;

use axum::{
  Json, Router,
  routing::{get, patch, post, put},
};
use chrono::{DateTime, Utc};
use leavenote_core::{
  Error,
  service::{ChecklistService, NoteService, SharingService, UserService},
  store::NoteStore,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use auth::TokenVerifier;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub store:    Arc<S>,
  pub verifier: Arc<dyn TokenVerifier>,
  pub config:   Arc<ServerConfig>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:    self.store.clone(),
      verifier: self.verifier.clone(),
      config:   self.config.clone(),
    }
  }
}

impl<S: NoteStore> AppState<S> {
  pub fn notes(&self) -> NoteService<S> {
    NoteService::new(self.store.clone(), self.config.public_base_url.clone())
  }

  pub fn checklist(&self) -> ChecklistService<S> { ChecklistService::new(self.store.clone()) }

  pub fn sharing(&self) -> SharingService<S> { SharingService::new(self.store.clone()) }

  pub fn users(&self) -> UserService<S> { UserService::new(self.store.clone()) }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the full application router for `state`.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: NoteStore + 'static,
{
  let api = Router::new()
    // Users
    .route("/auth/me", get(users::me::<S>))
    .route("/auth/profile", put(users::update_profile::<S>))
    // Notes
    .route("/notes", get(notes::list::<S>).post(notes::create::<S>))
    .route(
      "/notes/{id}",
      get(notes::get_one::<S>).put(notes::update::<S>).delete(notes::delete::<S>),
    )
    .route("/notes/{id}/status", patch(notes::update_status::<S>))
    .route("/notes/{id}/reflection", put(notes::save_reflection::<S>))
    .route("/notes/{id}/share", post(notes::share::<S>).delete(notes::unshare::<S>))
    // Checklist
    .route("/notes/{id}/checklist", post(checklist::create::<S>))
    .route("/checklist/{id}", put(checklist::update::<S>).delete(checklist::delete::<S>))
    // Public
    .route("/shared/{token}", get(sharing::get_shared::<S>));

  Router::new()
    .route("/health", get(health))
    .nest("/api", api)
    .fallback(fallback)
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

#[derive(Serialize)]
pub struct Health {
  pub status:    &'static str,
  pub timestamp: DateTime<Utc>,
}

/// `GET /health`
async fn health() -> Json<Health> { Json(Health { status: "OK", timestamp: Utc::now() }) }

async fn fallback() -> ApiError { ApiError(Error::NotFound("route not found".into())) }

// ─── Integration tests ───────────────────────────────────────────────────────
