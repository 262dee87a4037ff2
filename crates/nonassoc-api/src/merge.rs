//! Handler for `POST /merge`.
//!
//! Body: `{"oldPrisonerNumber":"...","newPrisonerNumber":"..."}`. Returns the
//! merge outcome with every record in the usual response shape; repeating a
//! merge returns an empty outcome.

use axum::{Json, extract::State};
use nonassoc_core::{
  directory::PrisonerDirectory,
  merge::reconcile_merge,
  repository::NonAssociationStore,
};
use serde::Deserialize;

use crate::{AppState, error::ApiError, response::MergeResponse, transact};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeBody {
  pub old_prisoner_number: String,
  pub new_prisoner_number: String,
}

/// `POST /merge`
pub async fn merge<S, D>(
  State(state): State<AppState<S, D>>,
  Json(body): Json<MergeBody>,
) -> Result<Json<MergeResponse>, ApiError>
where
  S: NonAssociationStore,
  D: PrisonerDirectory,
{
  let now = state.clock.now();
  let outcome = transact(&*state.store, move |repo| {
    reconcile_merge(repo, &body.old_prisoner_number, &body.new_prisoner_number, now)
  })
  .await?;
  Ok(Json(outcome.into()))
}
