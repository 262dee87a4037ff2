//! Error types for `nonassoc-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Malformed or missing input; never retried.
  #[error("validation failed: {0}")]
  Validation(String),

  #[error("an open non-association already exists between {first} and {second}")]
  OpenPairAlreadyExists { first: String, second: String },

  #[error("non-association {0} is already closed")]
  AlreadyClosed(i64),

  #[error("non-association {0} is already open")]
  AlreadyOpen(i64),

  #[error("non-association not found: {0}")]
  NotFound(i64),

  /// The prisoner directory could not resolve a prisoner number.
  #[error("could not find details for prisoner {0}")]
  UpstreamLookupGap(String),

  /// `is_closed` disagrees with the closed-by/reason/at fields.
  #[error("non-association {0} has inconsistent closure fields")]
  InconsistentClosure(i64),

  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend error raised from inside a [`crate::repository::Repository`].
  pub fn storage(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Storage(Box::new(e))
  }

  /// True for the three conflict kinds.
  pub fn is_conflict(&self) -> bool {
    matches!(
      self,
      Self::OpenPairAlreadyExists { .. }
        | Self::AlreadyClosed(_)
        | Self::AlreadyOpen(_)
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
