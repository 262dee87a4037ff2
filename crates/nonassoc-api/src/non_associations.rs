//! Handlers for `/non-associations` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `POST`  | `/non-associations` | Body: [`CreateNonAssociation`]; returns 201 |
//! | `GET`   | `/non-associations/:id` | 404 if not found |
//! | `PATCH` | `/non-associations/:id` | Body: [`NonAssociationPatch`] |
//! | `PUT`   | `/non-associations/:id/close` | Body: `{"closedReason":"..."}` |
//! | `PUT`   | `/non-associations/:id/reopen` | Body: `{"reopenReason":"..."}` |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use nonassoc_core::{
  directory::PrisonerDirectory,
  record::{CreateNonAssociation, NonAssociationPatch},
  repository::NonAssociationStore,
  service,
};
use serde::Deserialize;

use crate::{AppState, actor::Actor, error::ApiError, response::NonAssociationResponse, transact};

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /non-associations`
pub async fn create<S, D>(
  State(state): State<AppState<S, D>>,
  actor: Actor,
  Json(body): Json<CreateNonAssociation>,
) -> Result<impl IntoResponse, ApiError>
where
  S: NonAssociationStore,
  D: PrisonerDirectory,
{
  let now = state.clock.now();
  let record =
    transact(&*state.store, move |repo| service::create(repo, body, actor.as_str(), now)).await?;
  Ok((StatusCode::CREATED, Json(NonAssociationResponse::from(record))))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /non-associations/:id`
pub async fn get_one<S, D>(
  State(state): State<AppState<S, D>>,
  Path(id): Path<i64>,
) -> Result<Json<NonAssociationResponse>, ApiError>
where
  S: NonAssociationStore,
  D: PrisonerDirectory,
{
  let record = transact(&*state.store, move |repo| service::get(repo, id)).await?;
  Ok(Json(record.into()))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PATCH /non-associations/:id`
pub async fn update<S, D>(
  State(state): State<AppState<S, D>>,
  Path(id): Path<i64>,
  actor: Actor,
  Json(patch): Json<NonAssociationPatch>,
) -> Result<Json<NonAssociationResponse>, ApiError>
where
  S: NonAssociationStore,
  D: PrisonerDirectory,
{
  let now = state.clock.now();
  let record =
    transact(&*state.store, move |repo| service::update(repo, id, patch, actor.as_str(), now))
      .await?;
  Ok(Json(record.into()))
}

// ─── Close / reopen ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseBody {
  pub closed_reason: String,
}

/// `PUT /non-associations/:id/close`
pub async fn close<S, D>(
  State(state): State<AppState<S, D>>,
  Path(id): Path<i64>,
  actor: Actor,
  Json(body): Json<CloseBody>,
) -> Result<Json<NonAssociationResponse>, ApiError>
where
  S: NonAssociationStore,
  D: PrisonerDirectory,
{
  let now = state.clock.now();
  let record = transact(&*state.store, move |repo| {
    service::close(repo, id, &body.closed_reason, actor.as_str(), now)
  })
  .await?;
  Ok(Json(record.into()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReopenBody {
  pub reopen_reason: String,
}

/// `PUT /non-associations/:id/reopen`
pub async fn reopen<S, D>(
  State(state): State<AppState<S, D>>,
  Path(id): Path<i64>,
  actor: Actor,
  Json(body): Json<ReopenBody>,
) -> Result<Json<NonAssociationResponse>, ApiError>
where
  S: NonAssociationStore,
  D: PrisonerDirectory,
{
  let now = state.clock.now();
  let record = transact(&*state.store, move |repo| {
    service::reopen(repo, id, &body.reopen_reason, actor.as_str(), now)
  })
  .await?;
  Ok(Json(record.into()))
}
