//! The open/closed lifecycle of a non-association.
//!
//! Transitions are pure: they consume a record and return the transitioned
//! record, leaving persistence to the caller.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  record::{Closure, NonAssociation},
};

/// Whether a non-association is currently in effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleState {
  Open,
  Closed,
}

impl LifecycleState {
  pub fn is_open(self) -> bool { matches!(self, Self::Open) }

  pub fn is_closed(self) -> bool { matches!(self, Self::Closed) }

  pub fn of(record: &NonAssociation) -> Self {
    if record.is_closed() { Self::Closed } else { Self::Open }
  }
}

/// Derive the state implied by an effective-from date and an optional expiry.
///
/// Open when it has started (`effective_from <= today`) and has not yet
/// expired (`expiry > today`). An expiry of today is already closed; a start
/// date in the future is closed regardless of expiry.
pub fn derive_lifecycle(
  effective_from: NaiveDate,
  expiry: Option<NaiveDate>,
  today: NaiveDate,
) -> LifecycleState {
  let started = effective_from <= today;
  let unexpired = expiry.is_none_or(|e| e > today);
  if started && unexpired {
    LifecycleState::Open
  } else {
    LifecycleState::Closed
  }
}

/// Close an open record.
///
/// `updated_by` and `when_updated` follow the closure.
pub fn close(record: NonAssociation, closure: Closure) -> Result<NonAssociation> {
  if record.is_closed() {
    return Err(Error::AlreadyClosed(record.id));
  }
  Ok(NonAssociation {
    updated_by: closure.closed_by.clone(),
    when_updated: closure.closed_at,
    closure: Some(closure),
    ..record
  })
}

/// Reopen a closed record.
///
/// The reopen reason replaces the record's comment; the original comment is
/// not kept.
pub fn reopen(
  record: NonAssociation,
  reopened_at: DateTime<Utc>,
  reopened_by: &str,
  reopened_reason: &str,
) -> Result<NonAssociation> {
  if record.is_open() {
    return Err(Error::AlreadyOpen(record.id));
  }
  if reopened_by.trim().is_empty() {
    return Err(Error::Validation("reopenedBy must not be blank".into()));
  }
  if reopened_reason.trim().is_empty() {
    return Err(Error::Validation("reopen reason must not be blank".into()));
  }
  Ok(NonAssociation {
    closure: None,
    updated_by: reopened_by.to_owned(),
    when_updated: reopened_at,
    comment: reopened_reason.to_owned(),
    ..record
  })
}
