//! Core types, services and trait definitions for leavenote, a
//! travel-preparation notebook.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage backends implement [`store::NoteStore`]; the API crate drives the
//! [`service`] layer.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod guard;
pub mod note;
pub mod service;
pub mod share;
pub mod store;
pub mod user;
pub mod validate;
pub mod view;

pub use error::{Error, FieldError, Result};

#[cfg(test)]
mod tests;
