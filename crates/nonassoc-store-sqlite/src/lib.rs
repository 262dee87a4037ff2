//! SQLite backend for the non-associations store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Every engine operation runs inside
//! one SQLite transaction.

mod encode;
mod repository;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
