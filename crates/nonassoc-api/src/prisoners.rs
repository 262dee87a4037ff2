//! Handlers for per-prisoner views.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/prisoner/:number/non-associations` | `includeOpen`, `includeClosed`, `sortBy`, `sortDirection` |
//! | `GET`  | `/legacy/prisoner/:number/non-associations` | Every record, in legacy codes |

use axum::{
  Json,
  extract::{Path, Query, State},
};
use nonassoc_core::{
  directory::{PrisonerDirectory, index_details},
  listing::{ListOptions, listed_for, other_parties, resolve_list_options},
  repository::NonAssociationStore,
  service,
  sync::{LegacyView, legacy_view},
};

use crate::{
  AppState,
  error::ApiError,
  response::{ListedResponse, PrisonerNonAssociations},
  transact,
};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /prisoner/:number/non-associations`
pub async fn list<S, D>(
  State(state): State<AppState<S, D>>,
  Path(number): Path<String>,
  Query(options): Query<ListOptions>,
) -> Result<Json<PrisonerNonAssociations>, ApiError>
where
  S: NonAssociationStore,
  D: PrisonerDirectory,
{
  let plan = resolve_list_options(&options);
  let lookup = number.clone();
  let records = transact(&*state.store, move |repo| service::for_prisoner(repo, &lookup)).await?;

  let closed_count = records.iter().filter(|r| r.is_closed()).count();
  let open_count = records.len() - closed_count;
  let kept: Vec<_> = records.into_iter().filter(|r| plan.keeps(r)).collect();

  let mut response = PrisonerNonAssociations {
    prisoner_number: number,
    open_count,
    closed_count,
    non_associations: Vec::new(),
  };
  if kept.is_empty() {
    return Ok(Json(response));
  }

  let others = other_parties(&response.prisoner_number, &kept);
  let details = state
    .directory
    .lookup(&others)
    .await
    .map_err(|e| ApiError::Directory(Box::new(e)))?;
  let index = index_details(&others, details).inspect_err(|e| {
    tracing::warn!(prisoner = %response.prisoner_number, error = %e, "prisoner directory lookup gap");
  })?;

  let listed = plan.apply(listed_for(&response.prisoner_number, kept, &index));
  response.non_associations = listed.into_iter().map(ListedResponse::from).collect();
  Ok(Json(response))
}

// ─── Legacy view ──────────────────────────────────────────────────────────────

/// `GET /legacy/prisoner/:number/non-associations`
pub async fn legacy_list<S, D>(
  State(state): State<AppState<S, D>>,
  Path(number): Path<String>,
) -> Result<Json<Vec<LegacyView>>, ApiError>
where
  S: NonAssociationStore,
  D: PrisonerDirectory,
{
  let records = transact(&*state.store, move |repo| service::for_prisoner(repo, &number)).await?;
  Ok(Json(records.iter().map(legacy_view).collect()))
}
