//! Response bodies.

use chrono::{DateTime, Utc};
use nonassoc_core::{
  directory::PrisonerDetails,
  listing::ListedNonAssociation,
  merge::{MergeOutcome, Supersession},
  record::NonAssociation,
  vocabulary::{Reason, RestrictionType, Role},
};
use serde::Serialize;

/// A non-association as returned by every endpoint. Closure fields are
/// always present and `null` while the record is open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NonAssociationResponse {
  pub id:                     i64,
  pub first_prisoner_number:  String,
  pub first_role:             Role,
  pub second_prisoner_number: String,
  pub second_role:            Role,
  pub reason:                 Reason,
  pub restriction_type:       RestrictionType,
  pub comment:                String,
  pub authorised_by:          String,
  pub updated_by:             String,
  pub is_closed:              bool,
  pub closed_by:              Option<String>,
  pub closed_reason:          Option<String>,
  pub closed_at:              Option<DateTime<Utc>>,
  pub when_created:           DateTime<Utc>,
  pub when_updated:           DateTime<Utc>,
}

impl From<NonAssociation> for NonAssociationResponse {
  fn from(r: NonAssociation) -> Self {
    let is_closed = r.is_closed();
    let (closed_by, closed_reason, closed_at) = match r.closure {
      Some(c) => (Some(c.closed_by), Some(c.closed_reason), Some(c.closed_at)),
      None => (None, None, None),
    };
    Self {
      id: r.id,
      first_prisoner_number: r.first_prisoner_number,
      first_role: r.first_role,
      second_prisoner_number: r.second_prisoner_number,
      second_role: r.second_role,
      reason: r.reason,
      restriction_type: r.restriction_type,
      comment: r.comment,
      authorised_by: r.authorised_by,
      updated_by: r.updated_by,
      is_closed,
      closed_by,
      closed_reason,
      closed_at,
      when_created: r.when_created,
      when_updated: r.when_updated,
    }
  }
}

/// One entry of a prisoner's list, with the other party's details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListedResponse {
  #[serde(flatten)]
  pub non_association:        NonAssociationResponse,
  pub other_prisoner_details: PrisonerDetails,
}

impl From<ListedNonAssociation> for ListedResponse {
  fn from(item: ListedNonAssociation) -> Self {
    Self {
      non_association:        item.record.into(),
      other_prisoner_details: item.other_prisoner,
    }
  }
}

/// Body of `GET /prisoner/{number}/non-associations`.
///
/// The counts cover every record involving the prisoner, regardless of the
/// inclusion filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrisonerNonAssociations {
  pub prisoner_number:  String,
  pub open_count:       usize,
  pub closed_count:     usize,
  pub non_associations: Vec<ListedResponse>,
}

// ─── Merge ───────────────────────────────────────────────────────────────────

/// A record removed by a merge and the open record that replaced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupersessionResponse {
  pub removed:       NonAssociationResponse,
  pub superseded_by: NonAssociationResponse,
}

impl From<Supersession> for SupersessionResponse {
  fn from(s: Supersession) -> Self {
    Self { removed: s.removed.into(), superseded_by: s.superseded_by.into() }
  }
}

/// Body of `POST /merge`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeResponse {
  pub renamed:    Vec<NonAssociationResponse>,
  pub superseded: Vec<SupersessionResponse>,
  pub collapsed:  Vec<NonAssociationResponse>,
}

impl From<MergeOutcome> for MergeResponse {
  fn from(outcome: MergeOutcome) -> Self {
    Self {
      renamed:    outcome.renamed.into_iter().map(Into::into).collect(),
      superseded: outcome.superseded.into_iter().map(Into::into).collect(),
      collapsed:  outcome.collapsed.into_iter().map(Into::into).collect(),
    }
  }
}
