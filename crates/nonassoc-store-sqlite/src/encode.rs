//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings. Vocabulary enums are stored as
//! their SCREAMING_SNAKE_CASE names.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use nonassoc_core::record::{Closure, NewNonAssociation, NonAssociation};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Vocabulary ──────────────────────────────────────────────────────────────

pub fn decode_enum<T: FromStr>(column: &'static str, s: &str) -> Result<T> {
  s.parse().map_err(|_| Error::UnknownValue { column, value: s.to_owned() })
}

// ─── Row type ────────────────────────────────────────────────────────────────

/// Column list shared by every `SELECT`, in [`RawNonAssociation`] order.
pub const COLUMNS: &str = "id, first_prisoner_number, first_role,
  second_prisoner_number, second_role, reason, restriction_type, comment,
  authorised_by, updated_by, is_closed, closed_by, closed_reason, closed_at,
  when_created, when_updated";

/// Raw values read directly from a `non_associations` row.
pub struct RawNonAssociation {
  pub id:                     i64,
  pub first_prisoner_number:  String,
  pub first_role:             String,
  pub second_prisoner_number: String,
  pub second_role:            String,
  pub reason:                 String,
  pub restriction_type:       String,
  pub comment:                String,
  pub authorised_by:          String,
  pub updated_by:             String,
  pub is_closed:              bool,
  pub closed_by:              Option<String>,
  pub closed_reason:          Option<String>,
  pub closed_at:              Option<String>,
  pub when_created:           String,
  pub when_updated:           String,
}

impl RawNonAssociation {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                     row.get(0)?,
      first_prisoner_number:  row.get(1)?,
      first_role:             row.get(2)?,
      second_prisoner_number: row.get(3)?,
      second_role:            row.get(4)?,
      reason:                 row.get(5)?,
      restriction_type:       row.get(6)?,
      comment:                row.get(7)?,
      authorised_by:          row.get(8)?,
      updated_by:             row.get(9)?,
      is_closed:              row.get(10)?,
      closed_by:              row.get(11)?,
      closed_reason:          row.get(12)?,
      closed_at:              row.get(13)?,
      when_created:           row.get(14)?,
      when_updated:           row.get(15)?,
    })
  }

  /// Decode into a record, rejecting rows whose closure columns disagree.
  pub fn into_record(self) -> Result<NonAssociation> {
    let closed_at = self.closed_at.as_deref().map(decode_dt).transpose()?;
    let closure = Closure::from_columns(
      self.id,
      self.is_closed,
      self.closed_by,
      self.closed_reason,
      closed_at,
    )?;

    Ok(NonAssociation {
      id:                     self.id,
      first_prisoner_number:  self.first_prisoner_number,
      first_role:             decode_enum("first_role", &self.first_role)?,
      second_prisoner_number: self.second_prisoner_number,
      second_role:            decode_enum("second_role", &self.second_role)?,
      reason:                 decode_enum("reason", &self.reason)?,
      restriction_type:       decode_enum("restriction_type", &self.restriction_type)?,
      comment:                self.comment,
      authorised_by:          self.authorised_by,
      updated_by:             self.updated_by,
      closure,
      when_created:           decode_dt(&self.when_created)?,
      when_updated:           decode_dt(&self.when_updated)?,
    })
  }
}

/// Owned column values for an `INSERT` or `UPDATE`, in [`COLUMNS`] order
/// minus `id`.
pub struct EncodedFields {
  pub first_prisoner_number:  String,
  pub first_role:             String,
  pub second_prisoner_number: String,
  pub second_role:            String,
  pub reason:                 String,
  pub restriction_type:       String,
  pub comment:                String,
  pub authorised_by:          String,
  pub updated_by:             String,
  pub is_closed:              bool,
  pub closed_by:              Option<String>,
  pub closed_reason:          Option<String>,
  pub closed_at:              Option<String>,
  pub when_created:           String,
  pub when_updated:           String,
}

impl EncodedFields {
  pub fn from_new(record: &NewNonAssociation) -> Self {
    Self {
      first_prisoner_number:  record.first_prisoner_number.clone(),
      first_role:             record.first_role.to_string(),
      second_prisoner_number: record.second_prisoner_number.clone(),
      second_role:            record.second_role.to_string(),
      reason:                 record.reason.to_string(),
      restriction_type:       record.restriction_type.to_string(),
      comment:                record.comment.clone(),
      authorised_by:          record.authorised_by.clone(),
      updated_by:             record.updated_by.clone(),
      is_closed:              record.closure.is_some(),
      closed_by:              record.closure.as_ref().map(|c| c.closed_by.clone()),
      closed_reason:          record.closure.as_ref().map(|c| c.closed_reason.clone()),
      closed_at:              record.closure.as_ref().map(|c| encode_dt(c.closed_at)),
      when_created:           encode_dt(record.when_created),
      when_updated:           encode_dt(record.when_updated),
    }
  }

  pub fn from_record(record: &NonAssociation) -> Self {
    Self {
      first_prisoner_number:  record.first_prisoner_number.clone(),
      first_role:             record.first_role.to_string(),
      second_prisoner_number: record.second_prisoner_number.clone(),
      second_role:            record.second_role.to_string(),
      reason:                 record.reason.to_string(),
      restriction_type:       record.restriction_type.to_string(),
      comment:                record.comment.clone(),
      authorised_by:          record.authorised_by.clone(),
      updated_by:             record.updated_by.clone(),
      is_closed:              record.closure.is_some(),
      closed_by:              record.closure.as_ref().map(|c| c.closed_by.clone()),
      closed_reason:          record.closure.as_ref().map(|c| c.closed_reason.clone()),
      closed_at:              record.closure.as_ref().map(|c| encode_dt(c.closed_at)),
      when_created:           encode_dt(record.when_created),
      when_updated:           encode_dt(record.when_updated),
    }
  }
}
