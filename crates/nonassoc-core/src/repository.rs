//! Storage abstractions.
//!
//! [`Repository`] is the synchronous view the engine works against; every
//! call happens inside one transaction. [`NonAssociationStore`] is what
//! higher layers (`nonassoc-api`) hold: it opens that transaction, runs an
//! engine operation against a [`Repository`], and commits only if the
//! operation succeeded.

use std::future::Future;

use crate::{
  Result,
  record::{NewNonAssociation, NonAssociation},
};

/// Record access within a single transaction.
///
/// Implementations report backend failures as
/// [`Error::Storage`](crate::Error::Storage).
pub trait Repository {
  fn find_by_id(&mut self, id: i64) -> Result<Option<NonAssociation>>;

  /// Every record with `prisoner_number` on either side, open or closed.
  fn find_all_by_either_prisoner_number(
    &mut self,
    prisoner_number: &str,
  ) -> Result<Vec<NonAssociation>>;

  /// Every record stored as exactly `(first, second)`; the reversed pairing
  /// is not included.
  fn find_by_exact_pair(
    &mut self,
    first: &str,
    second: &str,
  ) -> Result<Vec<NonAssociation>>;

  /// Persist a new record and return it with its assigned id.
  fn insert(&mut self, record: NewNonAssociation) -> Result<NonAssociation>;

  /// Overwrite an existing record. Fails with
  /// [`Error::NotFound`](crate::Error::NotFound) if the id does not exist.
  fn save(&mut self, record: &NonAssociation) -> Result<()>;

  fn delete(&mut self, id: i64) -> Result<()>;
}

/// A transactional store of non-associations.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait NonAssociationStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Run `op` inside one transaction.
  ///
  /// The transaction commits when `op` returns `Ok` and rolls back when it
  /// returns `Err`; partial writes are never observable. The inner result
  /// carries engine errors, the outer one backend failures.
  fn transact<T, F>(
    &self,
    op: F,
  ) -> impl Future<Output = Result<Result<T>, Self::Error>> + Send + '_
  where
    T: Send + 'static,
    F: FnOnce(&mut dyn Repository) -> Result<T> + Send + 'static;
}
