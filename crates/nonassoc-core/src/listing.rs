//! Filtering and sorting of a prisoner's non-associations.
//!
//! Request options are resolved once into a [`ListPlan`], which supplies
//! the filter predicate and the comparator.

use std::{cmp::Ordering, collections::HashMap};

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::{directory::PrisonerDetails, record::NonAssociation};

// ─── Options ─────────────────────────────────────────────────────────────────

/// Which lifecycle states to include.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Inclusion {
  OpenOnly,
  ClosedOnly,
  All,
}

impl Inclusion {
  pub fn matches(self, record: &NonAssociation) -> bool {
    match self {
      Self::OpenOnly => record.is_open(),
      Self::ClosedOnly => record.is_closed(),
      Self::All => true,
    }
  }
}

/// `None` when neither open nor closed records are wanted; the caller returns
/// an empty list rather than an error.
pub fn resolve_inclusion(include_open: bool, include_closed: bool) -> Option<Inclusion> {
  match (include_open, include_closed) {
    (true, false) => Some(Inclusion::OpenOnly),
    (false, true) => Some(Inclusion::ClosedOnly),
    (true, true) => Some(Inclusion::All),
    (false, false) => None,
  }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SortDirection {
  Asc,
  Desc,
}

/// The field to sort by. Name, prison and cell fields refer to the *other*
/// prisoner in each non-association.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
  Display, EnumString, AsRefStr, EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SortField {
  #[default]
  WhenCreated,
  WhenUpdated,
  WhenClosed,
  LastName,
  FirstName,
  PrisonerNumber,
  PrisonId,
  PrisonName,
  CellLocation,
}

impl SortField {
  /// Direction used when the caller does not give one: newest first for
  /// timestamps, alphabetical otherwise.
  pub fn default_direction(self) -> SortDirection {
    match self {
      Self::WhenCreated | Self::WhenUpdated | Self::WhenClosed => SortDirection::Desc,
      Self::LastName
      | Self::FirstName
      | Self::PrisonerNumber
      | Self::PrisonId
      | Self::PrisonName
      | Self::CellLocation => SortDirection::Asc,
    }
  }
}

/// Listing options as received from a caller.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListOptions {
  pub include_open:   bool,
  pub include_closed: bool,
  pub sort_by:        Option<SortField>,
  pub sort_direction: Option<SortDirection>,
}

impl Default for ListOptions {
  fn default() -> Self {
    Self {
      include_open:   true,
      include_closed: false,
      sort_by:        None,
      sort_direction: None,
    }
  }
}

// ─── Plan ────────────────────────────────────────────────────────────────────

/// A non-association seen from one prisoner, with the other prisoner's
/// details resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListedNonAssociation {
  pub record:         NonAssociation,
  pub other_prisoner: PrisonerDetails,
}

/// Resolved listing options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListPlan {
  /// `None` means the result is empty.
  pub inclusion: Option<Inclusion>,
  pub sort_by:   SortField,
  pub direction: SortDirection,
}

pub fn resolve_list_options(options: &ListOptions) -> ListPlan {
  let sort_by = options.sort_by.unwrap_or_default();
  ListPlan {
    inclusion: resolve_inclusion(options.include_open, options.include_closed),
    sort_by,
    direction: options.sort_direction.unwrap_or(sort_by.default_direction()),
  }
}

impl ListPlan {
  pub fn keeps(&self, record: &NonAssociation) -> bool {
    self.inclusion.is_some_and(|i| i.matches(record))
  }

  /// Compare in ascending field order, then reverse for descending.
  pub fn compare(&self, a: &ListedNonAssociation, b: &ListedNonAssociation) -> Ordering {
    let ascending = compare_field(self.sort_by, a, b);
    match self.direction {
      SortDirection::Asc => ascending,
      SortDirection::Desc => ascending.reverse(),
    }
  }

  /// Filter and sort `items`. Stable for equal keys.
  pub fn apply(&self, mut items: Vec<ListedNonAssociation>) -> Vec<ListedNonAssociation> {
    items.retain(|item| self.keeps(&item.record));
    items.sort_by(|a, b| self.compare(a, b));
    items
  }
}

fn compare_field(
  field: SortField,
  a: &ListedNonAssociation,
  b: &ListedNonAssociation,
) -> Ordering {
  let (ra, rb) = (&a.record, &b.record);
  let (pa, pb) = (&a.other_prisoner, &b.other_prisoner);
  match field {
    SortField::WhenCreated => ra.when_created.cmp(&rb.when_created),
    SortField::WhenUpdated => ra.when_updated.cmp(&rb.when_updated),
    // Open records have no closed_at and sort before any closed one.
    SortField::WhenClosed => ra
      .closure
      .as_ref()
      .map(|c| c.closed_at)
      .cmp(&rb.closure.as_ref().map(|c| c.closed_at)),
    SortField::LastName => pa.last_name.cmp(&pb.last_name),
    SortField::FirstName => pa.first_name.cmp(&pb.first_name),
    SortField::PrisonerNumber => pa.prisoner_number.cmp(&pb.prisoner_number),
    SortField::PrisonId => pa.prison_id.cmp(&pb.prison_id),
    SortField::PrisonName => pa.prison_name.cmp(&pb.prison_name),
    SortField::CellLocation => pa.cell_location.cmp(&pb.cell_location),
  }
}

/// Pair each record with the details of the prisoner opposite
/// `prisoner_number`. Records not involving the prisoner, or whose other
/// party is missing from `details`, are skipped.
pub fn listed_for(
  prisoner_number: &str,
  records: Vec<NonAssociation>,
  details: &HashMap<String, PrisonerDetails>,
) -> Vec<ListedNonAssociation> {
  records
    .into_iter()
    .filter_map(|record| {
      let other = details.get(record.other_party(prisoner_number)?)?.clone();
      Some(ListedNonAssociation { record, other_prisoner: other })
    })
    .collect()
}

/// The other party of every record, deduplicated, in first-seen order.
pub fn other_parties(prisoner_number: &str, records: &[NonAssociation]) -> Vec<String> {
  let mut out: Vec<String> = Vec::new();
  for number in records.iter().filter_map(|r| r.other_party(prisoner_number)) {
    if !out.iter().any(|n| n == number) {
      out.push(number.to_owned());
    }
  }
  out
}
