//! [`SqliteStore`]: the SQLite implementation of [`NonAssociationStore`].

use std::path::Path;

use nonassoc_core::repository::{NonAssociationStore, Repository};

use crate::{Result, repository::TxRepository, schema::SCHEMA};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A non-associations store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run raw SQL against the connection. Test-only escape hatch for
  /// provoking states the engine never produces.
  #[cfg(test)]
  pub(crate) async fn execute_raw(&self, sql: &'static str) -> Result<usize> {
    Ok(self.conn.call(move |conn| Ok(conn.execute(sql, [])?)).await?)
  }
}

// ─── NonAssociationStore impl ────────────────────────────────────────────────

impl NonAssociationStore for SqliteStore {
  type Error = crate::Error;

  async fn transact<T, F>(&self, op: F) -> Result<nonassoc_core::Result<T>>
  where
    T: Send + 'static,
    F: FnOnce(&mut dyn Repository) -> nonassoc_core::Result<T> + Send + 'static,
  {
    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let outcome = op(&mut TxRepository { tx: &tx });
        match &outcome {
          Ok(_) => tx.commit()?,
          Err(e) => tracing::debug!(error = %e, "rolling back transaction"),
        }
        Ok(outcome)
      })
      .await?;
    Ok(outcome)
  }
}
