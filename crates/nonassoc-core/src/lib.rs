//! Core types and engine for the non-associations store.
//!
//! A non-association records that two prisoners must be kept apart. This
//! crate holds the record model, the legacy/modern vocabulary translation,
//! the open/closed lifecycle, list filtering and sorting, and the
//! prisoner-merge reconciler. It is deliberately free of HTTP and database
//! dependencies; storage backends implement [`repository::Repository`] and
//! [`repository::NonAssociationStore`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod clock;
pub mod directory;
pub mod error;
pub mod lifecycle;
pub mod listing;
pub mod merge;
pub mod record;
pub mod repository;
pub mod service;
pub mod sync;
pub mod vocabulary;

pub use error::{Error, Result};

#[cfg(test)]
mod testing;
