//! Reconciliation of non-associations when two prisoner records are merged.
//!
//! When prisoner `old` is merged into prisoner `new`, every record naming
//! `old` is classified as one of:
//!
//! - **collapsed**: the other side is already `new`, so renaming would pair
//!   `new` with itself. The record is deleted.
//! - **superseded**: a record already exists for `new` and the other prisoner,
//!   in the same side order. The record is deleted and the existing one
//!   stands in for the pair.
//! - **renamed**: otherwise `old` is replaced by `new` in place, keeping the
//!   id and every other field.
//!
//! Open and closed records are treated alike. Duplicate detection only
//! checks the side order `old` occupied; a duplicate stored in the reverse
//! order is not found.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
  Error, Result,
  record::{NonAssociation, validate_pair},
  repository::Repository,
};

/// Which side of a record a prisoner number sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
  First,
  Second,
}

/// A record deleted in favour of an existing record for the same pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Supersession {
  pub removed:       NonAssociation,
  pub superseded_by: NonAssociation,
}

/// The classified result of a merge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeOutcome {
  /// Records now naming `new` in place of `old`, as saved.
  pub renamed:    Vec<NonAssociation>,
  pub superseded: Vec<Supersession>,
  /// Records deleted because they would have become self-pairs.
  pub collapsed:  Vec<NonAssociation>,
}

impl MergeOutcome {
  pub fn is_empty(&self) -> bool {
    self.renamed.is_empty() && self.superseded.is_empty() && self.collapsed.is_empty()
  }
}

/// Reconcile every record naming `old` after `old` was merged into `new`.
///
/// Must run inside one transaction. Repeating a completed merge finds no
/// records naming `old` and returns an empty outcome.
pub fn reconcile_merge(
  repo: &mut dyn Repository,
  old: &str,
  new: &str,
  now: DateTime<Utc>,
) -> Result<MergeOutcome> {
  validate_pair(old, new).map_err(|_| {
    Error::Validation(format!("cannot merge prisoner {old:?} into {new:?}"))
  })?;

  let mut outcome = MergeOutcome::default();

  for record in repo.find_all_by_either_prisoner_number(old)? {
    let side = if record.first_prisoner_number == old {
      Side::First
    } else {
      Side::Second
    };
    let other = match side {
      Side::First => record.second_prisoner_number.clone(),
      Side::Second => record.first_prisoner_number.clone(),
    };

    if other == new {
      repo.delete(record.id)?;
      tracing::info!(id = record.id, old, new, "deleted non-association that would pair a prisoner with themselves");
      outcome.collapsed.push(record);
      continue;
    }

    let existing = match side {
      Side::First => repo.find_by_exact_pair(new, &other)?,
      Side::Second => repo.find_by_exact_pair(&other, new)?,
    };

    if let Some(representative) = pick_representative(existing) {
      repo.delete(record.id)?;
      tracing::info!(
        id = record.id,
        superseded_by = representative.id,
        old,
        new,
        "deleted non-association superseded by existing record for merged prisoner"
      );
      outcome.superseded.push(Supersession {
        removed:       record,
        superseded_by: representative,
      });
      continue;
    }

    let renamed = rename(record, side, new, now);
    repo.save(&renamed)?;
    tracing::info!(id = renamed.id, old, new, "renamed prisoner on non-association");
    outcome.renamed.push(renamed);
  }

  tracing::info!(
    old,
    new,
    renamed = outcome.renamed.len(),
    superseded = outcome.superseded.len(),
    collapsed = outcome.collapsed.len(),
    "merged prisoner non-associations"
  );
  Ok(outcome)
}

/// The open record if there is one, otherwise the most recently updated.
fn pick_representative(candidates: Vec<NonAssociation>) -> Option<NonAssociation> {
  candidates
    .into_iter()
    .max_by_key(|r| (r.is_open(), r.when_updated, r.id))
}

fn rename(record: NonAssociation, side: Side, new: &str, now: DateTime<Utc>) -> NonAssociation {
  let mut record = record;
  match side {
    Side::First => record.first_prisoner_number = new.to_owned(),
    Side::Second => record.second_prisoner_number = new.to_owned(),
  }
  record.when_updated = now;
  record
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone as _;

  use super::*;
  use crate::{
    lifecycle::close,
    record::Closure,
    testing::{MemoryRepository, open_record},
  };

  fn now() -> DateTime<Utc> { Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap() }

  fn closed_record(id: i64, first: &str, second: &str) -> NonAssociation {
    let at = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
    close(open_record(id, first, second), Closure::new("U", "done", at).unwrap()).unwrap()
  }

  #[test]
  fn no_records_is_a_no_op() {
    let mut repo = MemoryRepository::with(vec![open_record(1, "X1", "Y1")]);
    let outcome = reconcile_merge(&mut repo, "OLD", "NEW", now()).unwrap();
    assert!(outcome.is_empty());
    assert_eq!(repo.records.len(), 1);
  }

  #[test]
  fn renames_first_side_in_place() {
    let mut repo = MemoryRepository::with(vec![open_record(1, "OLD", "X")]);
    let outcome = reconcile_merge(&mut repo, "OLD", "NEW", now()).unwrap();

    assert_eq!(outcome.renamed.len(), 1);
    let saved = repo.get(1).unwrap();
    assert_eq!(saved.first_prisoner_number, "NEW");
    assert_eq!(saved.second_prisoner_number, "X");
    assert_eq!(saved.comment, "seen fighting");
    assert_eq!(saved.when_updated, now());
  }

  #[test]
  fn renames_second_side_in_place() {
    let mut repo = MemoryRepository::with(vec![open_record(1, "X", "OLD")]);
    reconcile_merge(&mut repo, "OLD", "NEW", now()).unwrap();
    let saved = repo.get(1).unwrap();
    assert_eq!(saved.first_prisoner_number, "X");
    assert_eq!(saved.second_prisoner_number, "NEW");
  }

  #[test]
  fn self_pair_is_collapsed_not_renamed() {
    // (A, B) with B merged into A.
    let mut repo = MemoryRepository::with(vec![open_record(1, "A", "B")]);
    let outcome = reconcile_merge(&mut repo, "B", "A", now()).unwrap();

    assert_eq!(outcome.collapsed.len(), 1);
    assert!(outcome.renamed.is_empty());
    assert!(repo.records.is_empty());
  }

  #[test]
  fn duplicate_pair_is_superseded() {
    // (A, X) and (B, X); A merged into B.
    let mut repo = MemoryRepository::with(vec![open_record(1, "A", "X"), open_record(2, "B", "X")]);
    let outcome = reconcile_merge(&mut repo, "A", "B", now()).unwrap();

    assert_eq!(outcome.superseded.len(), 1);
    assert_eq!(outcome.superseded[0].removed.id, 1);
    assert_eq!(outcome.superseded[0].superseded_by.id, 2);
    assert!(repo.get(1).is_none());

    let open_between: Vec<_> = repo
      .records
      .iter()
      .filter(|r| r.is_between("B", "X") && r.is_open())
      .collect();
    assert_eq!(open_between.len(), 1);
  }

  #[test]
  fn open_duplicate_is_preferred_as_representative() {
    let mut repo = MemoryRepository::with(vec![
      open_record(1, "A", "X"),
      closed_record(2, "B", "X"),
      open_record(3, "B", "X"),
    ]);
    let outcome = reconcile_merge(&mut repo, "A", "B", now()).unwrap();
    assert_eq!(outcome.superseded[0].superseded_by.id, 3);
  }

  #[test]
  fn closed_history_is_renamed_too() {
    let mut repo = MemoryRepository::with(vec![closed_record(1, "OLD", "X"), open_record(2, "Y", "OLD")]);
    let outcome = reconcile_merge(&mut repo, "OLD", "NEW", now()).unwrap();
    assert_eq!(outcome.renamed.len(), 2);
    let closed = repo.get(1).unwrap();
    assert!(closed.is_closed());
    assert_eq!(closed.first_prisoner_number, "NEW");
  }

  #[test]
  fn reversed_duplicate_is_not_detected() {
    // (A, X) and (X, B): merging A into B renames rather than supersedes.
    let mut repo = MemoryRepository::with(vec![open_record(1, "A", "X"), open_record(2, "X", "B")]);
    let outcome = reconcile_merge(&mut repo, "A", "B", now()).unwrap();
    assert_eq!(outcome.renamed.len(), 1);
    assert!(outcome.superseded.is_empty());
    assert_eq!(repo.records.len(), 2);
  }

  #[test]
  fn repeating_a_merge_is_a_no_op() {
    let mut repo = MemoryRepository::with(vec![
      open_record(1, "OLD", "X"),
      open_record(2, "NEW", "Y"),
      open_record(3, "Y", "OLD"),
    ]);
    let first = reconcile_merge(&mut repo, "OLD", "NEW", now()).unwrap();
    assert!(!first.is_empty());
    let snapshot = repo.records.clone();

    let second = reconcile_merge(&mut repo, "OLD", "NEW", now()).unwrap();
    assert!(second.is_empty());
    assert_eq!(repo.records, snapshot);
  }

  #[test]
  fn merging_into_same_number_is_rejected() {
    let mut repo = MemoryRepository::with(vec![open_record(1, "A", "X")]);
    let err = reconcile_merge(&mut repo, "A", "A", now()).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(repo.records.len(), 1);
  }
}
