//! Engine operations over a [`Repository`].
//!
//! Each function is one unit of work and is expected to run inside a single
//! [`NonAssociationStore::transact`](crate::repository::NonAssociationStore::transact)
//! call. The acting user is always an explicit argument.

use chrono::{DateTime, Utc};

use crate::{
  Error, Result,
  lifecycle,
  record::{
    Closure, CreateNonAssociation, NewNonAssociation, NonAssociation,
    NonAssociationPatch, validate_pair,
  },
  repository::Repository,
};

/// Fail with [`Error::OpenPairAlreadyExists`] if an open record other than
/// `except` exists for the unordered pair `{first, second}`.
pub fn ensure_no_open_pair(
  repo: &mut dyn Repository,
  first: &str,
  second: &str,
  except: Option<i64>,
) -> Result<()> {
  let mut candidates = repo.find_by_exact_pair(first, second)?;
  candidates.extend(repo.find_by_exact_pair(second, first)?);
  let clash = candidates
    .iter()
    .any(|r| r.is_open() && Some(r.id) != except);
  if clash {
    return Err(Error::OpenPairAlreadyExists {
      first:  first.to_owned(),
      second: second.to_owned(),
    });
  }
  Ok(())
}

pub fn get(repo: &mut dyn Repository, id: i64) -> Result<NonAssociation> {
  repo.find_by_id(id)?.ok_or(Error::NotFound(id))
}

/// Record a new, open non-association.
pub fn create(
  repo: &mut dyn Repository,
  request: CreateNonAssociation,
  actor: &str,
  now: DateTime<Utc>,
) -> Result<NonAssociation> {
  validate_pair(&request.first_prisoner_number, &request.second_prisoner_number)?;
  if request.comment.trim().is_empty() {
    return Err(Error::Validation("comment must not be blank".into()));
  }
  ensure_no_open_pair(
    repo,
    &request.first_prisoner_number,
    &request.second_prisoner_number,
    None,
  )?;

  let record = repo.insert(NewNonAssociation {
    first_prisoner_number:  request.first_prisoner_number,
    first_role:             request.first_role,
    second_prisoner_number: request.second_prisoner_number,
    second_role:            request.second_role,
    reason:                 request.reason,
    restriction_type:       request.restriction_type,
    comment:                request.comment,
    authorised_by:          request.authorised_by.unwrap_or_else(|| actor.to_owned()),
    updated_by:             actor.to_owned(),
    closure:                None,
    when_created:           now,
    when_updated:           now,
  })?;
  tracing::info!(id = record.id, actor, "created non-association");
  Ok(record)
}

/// Apply a partial update.
pub fn update(
  repo: &mut dyn Repository,
  id: i64,
  patch: NonAssociationPatch,
  actor: &str,
  now: DateTime<Utc>,
) -> Result<NonAssociation> {
  if patch.is_empty() {
    return Err(Error::Validation("no fields to update".into()));
  }
  if patch.comment.as_deref().is_some_and(|c| c.trim().is_empty()) {
    return Err(Error::Validation("comment must not be blank".into()));
  }

  let current = get(repo, id)?;
  let updated = NonAssociation {
    first_role:       patch.first_role.unwrap_or(current.first_role),
    second_role:      patch.second_role.unwrap_or(current.second_role),
    reason:           patch.reason.unwrap_or(current.reason),
    restriction_type: patch.restriction_type.unwrap_or(current.restriction_type),
    comment:          patch.comment.unwrap_or(current.comment),
    authorised_by:    patch.authorised_by.unwrap_or(current.authorised_by),
    updated_by:       actor.to_owned(),
    when_updated:     now,
    ..current
  };
  repo.save(&updated)?;
  tracing::info!(id, actor, "updated non-association");
  Ok(updated)
}

pub fn close(
  repo: &mut dyn Repository,
  id: i64,
  closed_reason: &str,
  actor: &str,
  now: DateTime<Utc>,
) -> Result<NonAssociation> {
  let closure = Closure::new(actor, closed_reason, now)?;
  let closed = lifecycle::close(get(repo, id)?, closure)?;
  repo.save(&closed)?;
  tracing::info!(id, actor, "closed non-association");
  Ok(closed)
}

/// Reopen a closed record, provided no other open record exists for the
/// pair.
pub fn reopen(
  repo: &mut dyn Repository,
  id: i64,
  reopen_reason: &str,
  actor: &str,
  now: DateTime<Utc>,
) -> Result<NonAssociation> {
  let current = get(repo, id)?;
  if current.is_open() {
    return Err(Error::AlreadyOpen(id));
  }
  ensure_no_open_pair(
    repo,
    &current.first_prisoner_number,
    &current.second_prisoner_number,
    Some(id),
  )?;
  let reopened = lifecycle::reopen(current, now, actor, reopen_reason)?;
  repo.save(&reopened)?;
  tracing::info!(id, actor, "reopened non-association");
  Ok(reopened)
}

/// Every record involving `prisoner_number`, open or closed.
pub fn for_prisoner(
  repo: &mut dyn Repository,
  prisoner_number: &str,
) -> Result<Vec<NonAssociation>> {
  if prisoner_number.trim().is_empty() {
    return Err(Error::Validation("prisoner number must not be blank".into()));
  }
  repo.find_all_by_either_prisoner_number(prisoner_number)
}
