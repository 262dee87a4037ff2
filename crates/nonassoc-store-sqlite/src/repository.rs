//! [`TxRepository`]: the [`Repository`] view of one open SQLite transaction.

use nonassoc_core::{
  record::{NewNonAssociation, NonAssociation},
  repository::Repository,
};
use rusqlite::{OptionalExtension as _, Transaction};

use crate::encode::{COLUMNS, EncodedFields, RawNonAssociation};

fn storage(e: impl std::error::Error + Send + Sync + 'static) -> nonassoc_core::Error {
  nonassoc_core::Error::storage(e)
}

fn decode_all(raws: Vec<RawNonAssociation>) -> nonassoc_core::Result<Vec<NonAssociation>> {
  raws.into_iter().map(decode_one).collect()
}

fn decode_one(raw: RawNonAssociation) -> nonassoc_core::Result<NonAssociation> {
  raw.into_record().map_err(|e| match e {
    crate::Error::Core(core) => core,
    other => storage(other),
  })
}

/// Borrowed for the duration of a single [`crate::SqliteStore`] transaction.
pub struct TxRepository<'t, 'c> {
  pub tx: &'t Transaction<'c>,
}

impl TxRepository<'_, '_> {
  fn query(
    &self,
    sql: &str,
    params: impl rusqlite::Params,
  ) -> nonassoc_core::Result<Vec<NonAssociation>> {
    let mut stmt = self.tx.prepare(sql).map_err(storage)?;
    let raws = stmt
      .query_map(params, RawNonAssociation::from_row)
      .map_err(storage)?
      .collect::<rusqlite::Result<Vec<_>>>()
      .map_err(storage)?;
    decode_all(raws)
  }
}

impl Repository for TxRepository<'_, '_> {
  fn find_by_id(&mut self, id: i64) -> nonassoc_core::Result<Option<NonAssociation>> {
    let raw = self
      .tx
      .query_row(
        &format!("SELECT {COLUMNS} FROM non_associations WHERE id = ?1"),
        rusqlite::params![id],
        RawNonAssociation::from_row,
      )
      .optional()
      .map_err(storage)?;
    raw.map(decode_one).transpose()
  }

  fn find_all_by_either_prisoner_number(
    &mut self,
    prisoner_number: &str,
  ) -> nonassoc_core::Result<Vec<NonAssociation>> {
    self.query(
      &format!(
        "SELECT {COLUMNS} FROM non_associations
         WHERE first_prisoner_number = ?1 OR second_prisoner_number = ?1
         ORDER BY id"
      ),
      rusqlite::params![prisoner_number],
    )
  }

  fn find_by_exact_pair(
    &mut self,
    first: &str,
    second: &str,
  ) -> nonassoc_core::Result<Vec<NonAssociation>> {
    self.query(
      &format!(
        "SELECT {COLUMNS} FROM non_associations
         WHERE first_prisoner_number = ?1 AND second_prisoner_number = ?2
         ORDER BY id"
      ),
      rusqlite::params![first, second],
    )
  }

  fn insert(&mut self, record: NewNonAssociation) -> nonassoc_core::Result<NonAssociation> {
    let f = EncodedFields::from_new(&record);
    self
      .tx
      .execute(
        "INSERT INTO non_associations (
           first_prisoner_number, first_role, second_prisoner_number, second_role,
           reason, restriction_type, comment, authorised_by, updated_by,
           is_closed, closed_by, closed_reason, closed_at,
           when_created, when_updated
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        rusqlite::params![
          f.first_prisoner_number,
          f.first_role,
          f.second_prisoner_number,
          f.second_role,
          f.reason,
          f.restriction_type,
          f.comment,
          f.authorised_by,
          f.updated_by,
          f.is_closed,
          f.closed_by,
          f.closed_reason,
          f.closed_at,
          f.when_created,
          f.when_updated,
        ],
      )
      .map_err(storage)?;
    Ok(record.with_id(self.tx.last_insert_rowid()))
  }

  fn save(&mut self, record: &NonAssociation) -> nonassoc_core::Result<()> {
    let f = EncodedFields::from_record(record);
    let changed = self
      .tx
      .execute(
        "UPDATE non_associations SET
           first_prisoner_number = ?2, first_role = ?3,
           second_prisoner_number = ?4, second_role = ?5,
           reason = ?6, restriction_type = ?7, comment = ?8,
           authorised_by = ?9, updated_by = ?10,
           is_closed = ?11, closed_by = ?12, closed_reason = ?13, closed_at = ?14,
           when_created = ?15, when_updated = ?16
         WHERE id = ?1",
        rusqlite::params![
          record.id,
          f.first_prisoner_number,
          f.first_role,
          f.second_prisoner_number,
          f.second_role,
          f.reason,
          f.restriction_type,
          f.comment,
          f.authorised_by,
          f.updated_by,
          f.is_closed,
          f.closed_by,
          f.closed_reason,
          f.closed_at,
          f.when_created,
          f.when_updated,
        ],
      )
      .map_err(storage)?;
    if changed == 0 {
      return Err(nonassoc_core::Error::NotFound(record.id));
    }
    Ok(())
  }

  fn delete(&mut self, id: i64) -> nonassoc_core::Result<()> {
    self
      .tx
      .execute("DELETE FROM non_associations WHERE id = ?1", rusqlite::params![id])
      .map_err(storage)?;
    Ok(())
  }
}
