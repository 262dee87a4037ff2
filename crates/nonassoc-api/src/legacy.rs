//! Handlers for the legacy system of record.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `PUT`  | `/sync/upsert` | Body: [`SyncRequest`]; creates when `id` is absent |
//! | `POST` | `/migrate` | Body: [`LegacyRecord`]; returns 201 |
//!
//! Both record the configured system username unless the legacy record names
//! its last modifier.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use nonassoc_core::{
  directory::PrisonerDirectory,
  repository::NonAssociationStore,
  sync::{self, LegacyRecord, SyncRequest},
};

use crate::{AppState, error::ApiError, response::NonAssociationResponse, transact};

/// `PUT /sync/upsert`
pub async fn sync_upsert<S, D>(
  State(state): State<AppState<S, D>>,
  Json(request): Json<SyncRequest>,
) -> Result<Json<NonAssociationResponse>, ApiError>
where
  S: NonAssociationStore,
  D: PrisonerDirectory,
{
  let now = state.clock.now();
  let actor = state.system_username.clone();
  let record =
    transact(&*state.store, move |repo| sync::sync_upsert(repo, request, &actor, now)).await?;
  Ok(Json(record.into()))
}

/// `POST /migrate`
pub async fn migrate<S, D>(
  State(state): State<AppState<S, D>>,
  Json(legacy): Json<LegacyRecord>,
) -> Result<impl IntoResponse, ApiError>
where
  S: NonAssociationStore,
  D: PrisonerDirectory,
{
  let now = state.clock.now();
  let actor = state.system_username.clone();
  let record = transact(&*state.store, move |repo| sync::migrate(repo, legacy, &actor, now)).await?;
  Ok((StatusCode::CREATED, Json(NonAssociationResponse::from(record))))
}
