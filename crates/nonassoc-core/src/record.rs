//! The non-association record and its inputs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  vocabulary::{Reason, RestrictionType, Role},
};

// ─── Closure ─────────────────────────────────────────────────────────────────

/// Who closed a non-association, why, and when.
///
/// The three fields travel together: a record is closed exactly when it
/// carries a `Closure`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Closure {
  pub closed_by:     String,
  pub closed_reason: String,
  pub closed_at:     DateTime<Utc>,
}

impl Closure {
  /// Build a closure, rejecting blank `closed_by` or `closed_reason`.
  pub fn new(
    closed_by: impl Into<String>,
    closed_reason: impl Into<String>,
    closed_at: DateTime<Utc>,
  ) -> Result<Self> {
    let closed_by = closed_by.into();
    let closed_reason = closed_reason.into();
    if closed_by.trim().is_empty() {
      return Err(Error::Validation("closedBy must not be blank".into()));
    }
    if closed_reason.trim().is_empty() {
      return Err(Error::Validation("closedReason must not be blank".into()));
    }
    Ok(Self { closed_by, closed_reason, closed_at })
  }

  /// Reassemble a closure from the four persisted columns.
  ///
  /// Either `is_closed` is set and all three fields are present, or it is
  /// clear and all three are absent. Anything else is
  /// [`Error::InconsistentClosure`].
  pub fn from_columns(
    id: i64,
    is_closed: bool,
    closed_by: Option<String>,
    closed_reason: Option<String>,
    closed_at: Option<DateTime<Utc>>,
  ) -> Result<Option<Self>> {
    match (is_closed, closed_by, closed_reason, closed_at) {
      (true, Some(closed_by), Some(closed_reason), Some(closed_at)) => {
        Ok(Some(Self { closed_by, closed_reason, closed_at }))
      }
      (false, None, None, None) => Ok(None),
      _ => Err(Error::InconsistentClosure(id)),
    }
  }
}

// ─── NonAssociation ──────────────────────────────────────────────────────────

/// A directive that two prisoners must be kept apart.
///
/// The pair is stored in the order it was recorded; `(A, B)` and `(B, A)` are
/// different stored pairs describing the same unordered pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NonAssociation {
  /// Assigned by the store on first persistence.
  pub id:                     i64,
  pub first_prisoner_number:  String,
  pub first_role:             Role,
  pub second_prisoner_number: String,
  pub second_role:            Role,
  pub reason:                 Reason,
  pub restriction_type:       RestrictionType,
  pub comment:                String,
  /// May be empty for rows migrated from the legacy system.
  pub authorised_by:          String,
  pub updated_by:             String,
  #[serde(flatten)]
  pub closure:                Option<Closure>,
  pub when_created:           DateTime<Utc>,
  pub when_updated:           DateTime<Utc>,
}

impl NonAssociation {
  pub fn is_closed(&self) -> bool { self.closure.is_some() }

  pub fn is_open(&self) -> bool { self.closure.is_none() }

  /// True if either side is `prisoner_number`.
  pub fn involves(&self, prisoner_number: &str) -> bool {
    self.first_prisoner_number == prisoner_number
      || self.second_prisoner_number == prisoner_number
  }

  /// The prisoner number on the side opposite `prisoner_number`, if the
  /// record involves it.
  pub fn other_party(&self, prisoner_number: &str) -> Option<&str> {
    if self.first_prisoner_number == prisoner_number {
      Some(&self.second_prisoner_number)
    } else if self.second_prisoner_number == prisoner_number {
      Some(&self.first_prisoner_number)
    } else {
      None
    }
  }

  /// True if this record describes the unordered pair `{a, b}`.
  pub fn is_between(&self, a: &str, b: &str) -> bool {
    (self.first_prisoner_number == a && self.second_prisoner_number == b)
      || (self.first_prisoner_number == b && self.second_prisoner_number == a)
  }
}

// ─── NewNonAssociation ───────────────────────────────────────────────────────

/// Input to [`crate::repository::Repository::insert`].
///
/// `id` is always assigned by the store; it is not accepted from callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNonAssociation {
  pub first_prisoner_number:  String,
  pub first_role:             Role,
  pub second_prisoner_number: String,
  pub second_role:            Role,
  pub reason:                 Reason,
  pub restriction_type:       RestrictionType,
  pub comment:                String,
  pub authorised_by:          String,
  pub updated_by:             String,
  pub closure:                Option<Closure>,
  pub when_created:           DateTime<Utc>,
  pub when_updated:           DateTime<Utc>,
}

impl NewNonAssociation {
  /// Attach the store-assigned id.
  pub fn with_id(self, id: i64) -> NonAssociation {
    NonAssociation {
      id,
      first_prisoner_number: self.first_prisoner_number,
      first_role: self.first_role,
      second_prisoner_number: self.second_prisoner_number,
      second_role: self.second_role,
      reason: self.reason,
      restriction_type: self.restriction_type,
      comment: self.comment,
      authorised_by: self.authorised_by,
      updated_by: self.updated_by,
      closure: self.closure,
      when_created: self.when_created,
      when_updated: self.when_updated,
    }
  }
}

// ─── Requests ────────────────────────────────────────────────────────────────

/// A caller's request to record a new, open non-association.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNonAssociation {
  pub first_prisoner_number:  String,
  pub first_role:             Role,
  pub second_prisoner_number: String,
  pub second_role:            Role,
  pub reason:                 Reason,
  pub restriction_type:       RestrictionType,
  pub comment:                String,
  /// Defaults to the acting user.
  #[serde(default)]
  pub authorised_by:          Option<String>,
}

/// A partial update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NonAssociationPatch {
  pub first_role:       Option<Role>,
  pub second_role:      Option<Role>,
  pub reason:           Option<Reason>,
  pub restriction_type: Option<RestrictionType>,
  pub comment:          Option<String>,
  pub authorised_by:    Option<String>,
}

impl NonAssociationPatch {
  pub fn is_empty(&self) -> bool { *self == Self::default() }
}

/// Reject blank or identical prisoner numbers.
pub fn validate_pair(first: &str, second: &str) -> Result<()> {
  if first.trim().is_empty() || second.trim().is_empty() {
    return Err(Error::Validation("prisoner numbers must not be blank".into()));
  }
  if first == second {
    return Err(Error::Validation(format!(
      "a prisoner cannot be non-associated with themselves ({first})"
    )));
  }
  Ok(())
}
