//! The two vocabularies a non-association can be described in, and the
//! translation between them.
//!
//! The modern vocabulary gives each prisoner a [`Role`] and the pair a single
//! [`Reason`]. The legacy vocabulary gives each prisoner a [`LegacyReason`]
//! code. Legacy codes are translated on the way in and out; they are never
//! stored.
//!
//! The translation is lossy: `RIV` and `BUL` on either side force the pair's
//! reason, and the reason in turn forces both legacy codes on the way back.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

// ─── Modern vocabulary ───────────────────────────────────────────────────────

/// The part a prisoner plays in a non-association.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
  Display, EnumString, AsRefStr, EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
  Victim,
  Perpetrator,
  NotRelevant,
  Unknown,
}

/// Why the two prisoners must be kept apart.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
  Display, EnumString, AsRefStr, EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Reason {
  Bullying,
  GangRelated,
  OrganisedCrime,
  LegalRequest,
  Threat,
  Violence,
  Other,
}

/// Where the two prisoners must not be located together.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
  Display, EnumString, AsRefStr, EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RestrictionType {
  Cell,
  Landing,
  Wing,
}

// ─── Legacy vocabulary ───────────────────────────────────────────────────────

/// Per-prisoner reason codes from the legacy system of record.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
  Display, EnumString, AsRefStr, EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum LegacyReason {
  /// Bully.
  #[serde(rename = "BUL")]
  #[strum(serialize = "BUL")]
  Bul,
  /// Perpetrator.
  #[serde(rename = "PER")]
  #[strum(serialize = "PER")]
  Per,
  /// Rival gang.
  #[serde(rename = "RIV")]
  #[strum(serialize = "RIV")]
  Riv,
  /// Victim.
  #[serde(rename = "VIC")]
  #[strum(serialize = "VIC")]
  Vic,
  NotRelevant,
  Unknown,
}

/// Restriction codes from the legacy system of record.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
  Display, EnumString, AsRefStr, EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum LegacyRestrictionType {
  Cell,
  Landing,
  Exercise,
  Total,
  Wing,
}

// ─── Mapping tables ──────────────────────────────────────────────────────────

/// What one legacy code does to its own side's role and to the pair's reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegacyCodeEffect {
  pub role:   Role,
  /// `None` leaves the reason as it was.
  pub reason: Option<Reason>,
}

/// Forward table: legacy code → effect.
pub fn legacy_code_effect(code: LegacyReason) -> LegacyCodeEffect {
  let (role, reason) = match code {
    LegacyReason::Bul => (Role::Unknown, Some(Reason::Bullying)),
    LegacyReason::Riv => (Role::NotRelevant, Some(Reason::GangRelated)),
    LegacyReason::Vic => (Role::Victim, None),
    LegacyReason::Per => (Role::Perpetrator, None),
    LegacyReason::NotRelevant => (Role::NotRelevant, None),
    LegacyReason::Unknown => (Role::Unknown, None),
  };
  LegacyCodeEffect { role, reason }
}

/// Reverse table for roles, used when the reason does not force the codes.
pub fn role_to_legacy(role: Role) -> LegacyReason {
  match role {
    Role::Victim => LegacyReason::Vic,
    Role::Perpetrator => LegacyReason::Per,
    Role::NotRelevant => LegacyReason::NotRelevant,
    Role::Unknown => LegacyReason::Unknown,
  }
}

/// Reasons that force both legacy codes regardless of roles.
pub fn reason_forced_legacy(reason: Reason) -> Option<LegacyReason> {
  match reason {
    Reason::GangRelated => Some(LegacyReason::Riv),
    Reason::Bullying => Some(LegacyReason::Bul),
    _ => None,
  }
}

pub fn legacy_to_restriction(legacy: LegacyRestrictionType) -> RestrictionType {
  match legacy {
    LegacyRestrictionType::Cell => RestrictionType::Cell,
    LegacyRestrictionType::Landing => RestrictionType::Landing,
    LegacyRestrictionType::Wing
    | LegacyRestrictionType::Exercise
    | LegacyRestrictionType::Total => RestrictionType::Wing,
  }
}

pub fn restriction_to_legacy(restriction: RestrictionType) -> LegacyRestrictionType {
  match restriction {
    RestrictionType::Cell => LegacyRestrictionType::Cell,
    RestrictionType::Landing => LegacyRestrictionType::Landing,
    RestrictionType::Wing => LegacyRestrictionType::Wing,
  }
}

// ─── Translation ─────────────────────────────────────────────────────────────

/// The modern description of a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RolesAndReason {
  pub first_role:  Role,
  pub second_role: Role,
  pub reason:      Reason,
}

/// Translate a pair of legacy codes into roles and a reason.
///
/// Sides are evaluated first then second. When both sides force a reason
/// the second one wins.
pub fn to_roles_and_reason(first: LegacyReason, second: LegacyReason) -> RolesAndReason {
  let mut reason = Reason::Other;

  let first_effect = legacy_code_effect(first);
  if let Some(r) = first_effect.reason {
    reason = r;
  }
  let second_effect = legacy_code_effect(second);
  if let Some(r) = second_effect.reason {
    reason = r;
  }

  RolesAndReason {
    first_role: first_effect.role,
    second_role: second_effect.role,
    reason,
  }
}

/// Translate roles and a reason back into a pair of legacy codes.
pub fn to_legacy_pair(
  first_role: Role,
  second_role: Role,
  reason: Reason,
) -> (LegacyReason, LegacyReason) {
  match reason_forced_legacy(reason) {
    Some(code) => (code, code),
    None => (role_to_legacy(first_role), role_to_legacy(second_role)),
  }
}
