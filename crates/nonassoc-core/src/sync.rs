//! Synchronisation and migration from the legacy system of record.
//!
//! Legacy records arrive in the legacy vocabulary with an effective-from date
//! and an optional expiry. They are translated into the modern vocabulary and
//! their open/closed state is derived from the dates as of today.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  lifecycle::{self, LifecycleState, derive_lifecycle},
  record::{Closure, NewNonAssociation, NonAssociation, validate_pair},
  repository::Repository,
  service::{ensure_no_open_pair, get},
  vocabulary::{
    LegacyReason, LegacyRestrictionType, legacy_to_restriction, restriction_to_legacy,
    to_legacy_pair, to_roles_and_reason,
  },
};

/// Stored when the legacy record carried no comment.
pub const NO_COMMENT_PROVIDED: &str = "No comment provided";

/// Recorded as the closed reason when a record is closed by its dates.
pub const UNDEFINED_CLOSED_REASON: &str = "UNDEFINED";

/// A non-association as described by the legacy system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyRecord {
  pub first_prisoner_number:     String,
  pub first_prisoner_reason:     LegacyReason,
  pub second_prisoner_number:    String,
  pub second_prisoner_reason:    LegacyReason,
  pub restriction_type:          LegacyRestrictionType,
  #[serde(default)]
  pub comment:                   Option<String>,
  #[serde(default)]
  pub authorised_by:             Option<String>,
  /// Overrides the acting user as `updated_by` when present.
  #[serde(default)]
  pub last_modified_by_username: Option<String>,
  pub effective_from_date:       NaiveDate,
  #[serde(default)]
  pub expiry_date:               Option<NaiveDate>,
}

/// A sync request: update record `id` when given, otherwise create.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
  #[serde(default)]
  pub id:     Option<i64>,
  #[serde(flatten)]
  pub record: LegacyRecord,
}

/// A stored record rendered in the legacy vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyView {
  pub id:                     i64,
  pub first_prisoner_number:  String,
  pub first_prisoner_reason:  LegacyReason,
  pub second_prisoner_number: String,
  pub second_prisoner_reason: LegacyReason,
  pub restriction_type:       LegacyRestrictionType,
  pub comment:                String,
  pub authorised_by:          String,
  pub updated_by:             String,
  pub is_closed:              bool,
  pub closed_at:              Option<DateTime<Utc>>,
}

/// Render `record` in the legacy vocabulary.
pub fn legacy_view(record: &NonAssociation) -> LegacyView {
  let (first_reason, second_reason) =
    to_legacy_pair(record.first_role, record.second_role, record.reason);
  LegacyView {
    id:                     record.id,
    first_prisoner_number:  record.first_prisoner_number.clone(),
    first_prisoner_reason:  first_reason,
    second_prisoner_number: record.second_prisoner_number.clone(),
    second_prisoner_reason: second_reason,
    restriction_type:       restriction_to_legacy(record.restriction_type),
    comment:                record.comment.clone(),
    authorised_by:          record.authorised_by.clone(),
    updated_by:             record.updated_by.clone(),
    is_closed:              record.is_closed(),
    closed_at:              record.closure.as_ref().map(|c| c.closed_at),
  }
}

// ─── Translation ─────────────────────────────────────────────────────────────

/// A legacy record translated into the modern model, as of `now`.
#[derive(Debug, Clone)]
struct Translated {
  record:     NewNonAssociation,
  state:      LifecycleState,
  updated_by: String,
}

fn translate(legacy: LegacyRecord, actor: &str, now: DateTime<Utc>) -> Result<Translated> {
  validate_pair(&legacy.first_prisoner_number, &legacy.second_prisoner_number)?;
  if let Some(expiry) = legacy.expiry_date
    && expiry < legacy.effective_from_date
  {
    return Err(Error::Validation(format!(
      "expiry date {expiry} is before effective date {}",
      legacy.effective_from_date
    )));
  }

  let today = now.date_naive();
  let state = derive_lifecycle(legacy.effective_from_date, legacy.expiry_date, today);
  let roles = to_roles_and_reason(legacy.first_prisoner_reason, legacy.second_prisoner_reason);
  let updated_by = legacy
    .last_modified_by_username
    .filter(|u| !u.trim().is_empty())
    .unwrap_or_else(|| actor.to_owned());

  let closure = match state {
    LifecycleState::Open => None,
    LifecycleState::Closed => Some(Closure::new(
      updated_by.clone(),
      UNDEFINED_CLOSED_REASON,
      closed_at(legacy.expiry_date, today, now),
    )?),
  };

  let record = NewNonAssociation {
    first_prisoner_number:  legacy.first_prisoner_number,
    first_role:             roles.first_role,
    second_prisoner_number: legacy.second_prisoner_number,
    second_role:            roles.second_role,
    reason:                 roles.reason,
    restriction_type:       legacy_to_restriction(legacy.restriction_type),
    comment:                legacy
      .comment
      .filter(|c| !c.trim().is_empty())
      .unwrap_or_else(|| NO_COMMENT_PROVIDED.to_owned()),
    authorised_by:          legacy.authorised_by.unwrap_or_default(),
    updated_by:             updated_by.clone(),
    closure,
    when_created:           now,
    when_updated:           now,
  };

  Ok(Translated { record, state, updated_by })
}

/// Midnight UTC on the expiry date when it has passed, otherwise `now`.
fn closed_at(expiry: Option<NaiveDate>, today: NaiveDate, now: DateTime<Utc>) -> DateTime<Utc> {
  match expiry {
    Some(e) if e <= today => e.and_time(NaiveTime::MIN).and_utc(),
    _ => now,
  }
}

// ─── Operations ──────────────────────────────────────────────────────────────

/// Import a legacy record as a new record, closed immediately if its dates
/// say so.
pub fn migrate(
  repo: &mut dyn Repository,
  legacy: LegacyRecord,
  actor: &str,
  now: DateTime<Utc>,
) -> Result<NonAssociation> {
  let translated = translate(legacy, actor, now)?;
  if translated.state.is_open() {
    ensure_no_open_pair(
      repo,
      &translated.record.first_prisoner_number,
      &translated.record.second_prisoner_number,
      None,
    )?;
  }
  let record = repo.insert(translated.record)?;
  tracing::info!(id = record.id, closed = record.is_closed(), "migrated non-association");
  Ok(record)
}

/// Create or update from a legacy record.
///
/// On update the translated fields overwrite the stored ones and the
/// record's state follows the dates: an open record whose dates now say
/// closed is closed, a closed record whose dates now say open is reopened
/// with the legacy comment as the reopen reason, and a record that stays
/// closed takes the closure derived from the new dates. A result that is
/// open must not share its pair with another open record.
pub fn sync_upsert(
  repo: &mut dyn Repository,
  request: SyncRequest,
  actor: &str,
  now: DateTime<Utc>,
) -> Result<NonAssociation> {
  let Some(id) = request.id else {
    return migrate(repo, request.record, actor, now);
  };

  let current = get(repo, id)?;
  let Translated { record: incoming, state, updated_by } = translate(request.record, actor, now)?;

  let mut updated = NonAssociation {
    first_prisoner_number:  incoming.first_prisoner_number,
    first_role:             incoming.first_role,
    second_prisoner_number: incoming.second_prisoner_number,
    second_role:            incoming.second_role,
    reason:                 incoming.reason,
    restriction_type:       incoming.restriction_type,
    comment:                incoming.comment.clone(),
    authorised_by:          incoming.authorised_by,
    updated_by:             updated_by.clone(),
    when_updated:           now,
    ..current
  };

  updated = match (LifecycleState::of(&updated), state) {
    (LifecycleState::Open, LifecycleState::Closed) => {
      let closure = incoming.closure.ok_or(Error::InconsistentClosure(id))?;
      NonAssociation { when_updated: now, ..lifecycle::close(updated, closure)? }
    }
    (LifecycleState::Closed, LifecycleState::Open) => {
      lifecycle::reopen(updated, now, &updated_by, &incoming.comment)?
    }
    (LifecycleState::Closed, LifecycleState::Closed) => {
      let closure = incoming.closure.ok_or(Error::InconsistentClosure(id))?;
      NonAssociation { closure: Some(closure), ..updated }
    }
    (LifecycleState::Open, LifecycleState::Open) => updated,
  };

  if updated.is_open() {
    ensure_no_open_pair(
      repo,
      &updated.first_prisoner_number,
      &updated.second_prisoner_number,
      Some(id),
    )?;
  }
  repo.save(&updated)?;
  tracing::info!(id, closed = updated.is_closed(), "synced non-association");
  Ok(updated)
}
