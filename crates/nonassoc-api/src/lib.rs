//! JSON REST API for non-associations.
//!
//! Exposes an axum [`Router`] backed by any
//! [`NonAssociationStore`] and [`PrisonerDirectory`]. Authentication is the
//! caller's responsibility: the router expects an [`Actor`] in the request
//! extensions of every request that records provenance.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = nonassoc_api::api_router(state).layer(auth_layer);
//! ```

pub mod actor;
pub mod error;
pub mod legacy;
pub mod merge;
pub mod non_associations;
pub mod prisoners;
pub mod response;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use nonassoc_core::{
  clock::Clock,
  directory::PrisonerDirectory,
  repository::{NonAssociationStore, Repository},
};

pub use actor::Actor;
pub use error::ApiError;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct AppState<S, D> {
  pub store:           Arc<S>,
  pub directory:       Arc<D>,
  pub clock:           Arc<dyn Clock>,
  /// Recorded as the acting user for changes driven by the legacy system
  /// when the incoming record names no modifier.
  pub system_username: Arc<str>,
}

impl<S, D> Clone for AppState<S, D> {
  fn clone(&self) -> Self {
    Self {
      store:           self.store.clone(),
      directory:       self.directory.clone(),
      clock:           self.clock.clone(),
      system_username: self.system_username.clone(),
    }
  }
}

/// Run `op` in one store transaction, flattening both error layers.
pub(crate) async fn transact<S, T, F>(store: &S, op: F) -> Result<T, ApiError>
where
  S: NonAssociationStore,
  T: Send + 'static,
  F: FnOnce(&mut dyn Repository) -> nonassoc_core::Result<T> + Send + 'static,
{
  store
    .transact(op)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .map_err(ApiError::from)
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router.
pub fn api_router<S, D>(state: AppState<S, D>) -> Router<()>
where
  S: NonAssociationStore + 'static,
  D: PrisonerDirectory + 'static,
{
  Router::new()
    // Records
    .route("/non-associations", post(non_associations::create::<S, D>))
    .route(
      "/non-associations/{id}",
      get(non_associations::get_one::<S, D>).patch(non_associations::update::<S, D>),
    )
    .route("/non-associations/{id}/close", put(non_associations::close::<S, D>))
    .route("/non-associations/{id}/reopen", put(non_associations::reopen::<S, D>))
    // Per-prisoner views
    .route("/prisoner/{number}/non-associations", get(prisoners::list::<S, D>))
    .route(
      "/legacy/prisoner/{number}/non-associations",
      get(prisoners::legacy_list::<S, D>),
    )
    // Legacy system
    .route("/sync/upsert", put(legacy::sync_upsert::<S, D>))
    .route("/migrate", post(legacy::migrate::<S, D>))
    // Identity
    .route("/merge", post(merge::merge::<S, D>))
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicUsize, Ordering};

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use chrono::{TimeZone as _, Utc};
  use nonassoc_core::{clock::FixedClock, directory::PrisonerDetails};
  use nonassoc_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  use super::*;

  /// Serves a fixed set of prisoners and counts lookups.
  #[derive(Default)]
  struct StubDirectory {
    prisoners: Vec<PrisonerDetails>,
    lookups:   AtomicUsize,
  }

  impl PrisonerDirectory for StubDirectory {
    type Error = std::convert::Infallible;

    async fn lookup<'a>(
      &'a self,
      prisoner_numbers: &'a [String],
    ) -> Result<Vec<PrisonerDetails>, Self::Error> {
      self.lookups.fetch_add(1, Ordering::SeqCst);
      Ok(
        self
          .prisoners
          .iter()
          .filter(|p| prisoner_numbers.contains(&p.prisoner_number))
          .cloned()
          .collect(),
      )
    }
  }

  fn prisoner(number: &str, last_name: &str, cell: &str) -> PrisonerDetails {
    PrisonerDetails {
      prisoner_number: number.into(),
      first_name:      "JOHN".into(),
      last_name:       last_name.into(),
      prison_id:       Some("MDI".into()),
      prison_name:     Some("Moorland (HMP & YOI)".into()),
      cell_location:   Some(cell.into()),
    }
  }

  async fn make_state() -> AppState<SqliteStore, StubDirectory> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    AppState {
      store:           Arc::new(store),
      directory:       Arc::new(StubDirectory {
        prisoners: vec![
          prisoner("B2345CD", "SMITH", "1-1-001"),
          prisoner("C3456DE", "ADAMS", "2-1-004"),
        ],
        lookups:   AtomicUsize::new(0),
      }),
      clock:           Arc::new(FixedClock(Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap())),
      system_username: "NON_ASSOCIATIONS_API".into(),
    }
  }

  async fn send(
    state:  &AppState<SqliteStore, StubDirectory>,
    method: &str,
    uri:    &str,
    body:   Option<Value>,
  ) -> (StatusCode, Value) {
    send_as(state, Some("OFFICER"), method, uri, body).await
  }

  async fn send_as(
    state:  &AppState<SqliteStore, StubDirectory>,
    actor:  Option<&str>,
    method: &str,
    uri:    &str,
    body:   Option<Value>,
  ) -> (StatusCode, Value) {
    let builder = Request::builder()
      .method(method)
      .uri(uri)
      .header(header::CONTENT_TYPE, "application/json");
    let mut req = builder
      .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
      .unwrap();
    if let Some(actor) = actor {
      req.extensions_mut().insert(Actor(actor.to_string()));
    }

    let resp = api_router(state.clone()).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
  }

  fn create_body(first: &str, second: &str) -> Value {
    json!({
      "firstPrisonerNumber":  first,
      "firstRole":            "VICTIM",
      "secondPrisonerNumber": second,
      "secondRole":           "PERPETRATOR",
      "reason":               "VIOLENCE",
      "restrictionType":      "CELL",
      "comment":              "fight in the servery",
    })
  }

  async fn create(state: &AppState<SqliteStore, StubDirectory>, first: &str, second: &str) -> i64 {
    let (status, body) = send(state, "POST", "/non-associations", Some(create_body(first, second))).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_i64().unwrap()
  }

  // ── Records ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_returns_201_with_open_record() {
    let state = make_state().await;
    let (status, body) =
      send(&state, "POST", "/non-associations", Some(create_body("A1234BC", "B2345CD"))).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["firstRole"], "VICTIM");
    assert_eq!(body["authorisedBy"], "OFFICER");
    assert_eq!(body["updatedBy"], "OFFICER");
    assert_eq!(body["isClosed"], false);
    assert_eq!(body["closedAt"], Value::Null);
    assert_eq!(body["whenCreated"], "2024-06-15T12:00:00Z");
  }

  #[tokio::test]
  async fn create_without_actor_is_401() {
    let state = make_state().await;
    let (status, body) = send_as(
      &state,
      None,
      "POST",
      "/non-associations",
      Some(create_body("A1234BC", "B2345CD")),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
  }

  #[tokio::test]
  async fn create_same_prisoner_twice_is_400() {
    let state = make_state().await;
    let (status, _) =
      send(&state, "POST", "/non-associations", Some(create_body("A1234BC", "A1234BC"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn duplicate_open_pair_is_409() {
    let state = make_state().await;
    create(&state, "A1234BC", "B2345CD").await;
    let (status, body) =
      send(&state, "POST", "/non-associations", Some(create_body("B2345CD", "A1234BC"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("already exists"));
  }

  #[tokio::test]
  async fn get_missing_is_404() {
    let state = make_state().await;
    let (status, _) = send(&state, "GET", "/non-associations/77", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn patch_updates_fields() {
    let state = make_state().await;
    let id = create(&state, "A1234BC", "B2345CD").await;
    let (status, body) = send_as(
      &state,
      Some("SUPERVISOR"),
      "PATCH",
      &format!("/non-associations/{id}"),
      Some(json!({ "restrictionType": "WING" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["restrictionType"], "WING");
    assert_eq!(body["updatedBy"], "SUPERVISOR");

    let (_, fetched) = send(&state, "GET", &format!("/non-associations/{id}"), None).await;
    assert_eq!(fetched["restrictionType"], "WING");
  }

  #[tokio::test]
  async fn close_then_reopen() {
    let state = make_state().await;
    let id = create(&state, "A1234BC", "B2345CD").await;

    let (status, closed) = send(
      &state,
      "PUT",
      &format!("/non-associations/{id}/close"),
      Some(json!({ "closedReason": "moved prison" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(closed["isClosed"], true);
    assert_eq!(closed["closedBy"], "OFFICER");
    assert_eq!(closed["closedReason"], "moved prison");

    let (status, _) = send(
      &state,
      "PUT",
      &format!("/non-associations/{id}/close"),
      Some(json!({ "closedReason": "again" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, reopened) = send(
      &state,
      "PUT",
      &format!("/non-associations/{id}/reopen"),
      Some(json!({ "reopenReason": "returned" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reopened["isClosed"], false);
    assert_eq!(reopened["closedBy"], Value::Null);
    assert_eq!(reopened["comment"], "returned");
  }

  // ── Listing ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn list_joins_other_party_and_sorts() {
    let state = make_state().await;
    create(&state, "A1234BC", "B2345CD").await;
    create(&state, "C3456DE", "A1234BC").await;

    let (status, body) = send(
      &state,
      "GET",
      "/prisoner/A1234BC/non-associations?sortBy=LAST_NAME&sortDirection=ASC",
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prisonerNumber"], "A1234BC");
    assert_eq!(body["openCount"], 2);
    let items = body["nonAssociations"].as_array().unwrap();
    let names: Vec<_> = items
      .iter()
      .map(|i| i["otherPrisonerDetails"]["lastName"].as_str().unwrap())
      .collect();
    assert_eq!(names, vec!["ADAMS", "SMITH"]);
  }

  #[tokio::test]
  async fn list_excludes_closed_by_default() {
    let state = make_state().await;
    let id = create(&state, "A1234BC", "B2345CD").await;
    create(&state, "A1234BC", "C3456DE").await;
    send(
      &state,
      "PUT",
      &format!("/non-associations/{id}/close"),
      Some(json!({ "closedReason": "resolved" })),
    )
    .await;

    let (_, open) = send(&state, "GET", "/prisoner/A1234BC/non-associations", None).await;
    assert_eq!(open["nonAssociations"].as_array().unwrap().len(), 1);
    assert_eq!(open["closedCount"], 1);

    let (_, closed) = send(
      &state,
      "GET",
      "/prisoner/A1234BC/non-associations?includeOpen=false&includeClosed=true",
      None,
    )
    .await;
    let items = closed["nonAssociations"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], id);
  }

  #[tokio::test]
  async fn list_with_nothing_included_skips_directory() {
    let state = make_state().await;
    create(&state, "A1234BC", "B2345CD").await;

    let (status, body) = send(
      &state,
      "GET",
      "/prisoner/A1234BC/non-associations?includeOpen=false&includeClosed=false",
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["nonAssociations"].as_array().unwrap().is_empty());
    assert_eq!(state.directory.lookups.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn list_with_unknown_other_party_is_502() {
    let state = make_state().await;
    create(&state, "A1234BC", "Z9999ZZ").await;
    let (status, body) = send(&state, "GET", "/prisoner/A1234BC/non-associations", None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().contains("Z9999ZZ"));
  }

  #[tokio::test]
  async fn legacy_list_uses_legacy_codes() {
    let state = make_state().await;
    create(&state, "A1234BC", "B2345CD").await;
    let (status, body) =
      send(&state, "GET", "/legacy/prisoner/A1234BC/non-associations", None).await;
    assert_eq!(status, StatusCode::OK);
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["firstPrisonerReason"], "VIC");
    assert_eq!(items[0]["secondPrisonerReason"], "PER");
  }

  // ── Legacy system ───────────────────────────────────────────────────────────

  fn legacy_body() -> Value {
    json!({
      "firstPrisonerNumber":  "A1234BC",
      "firstPrisonerReason":  "BUL",
      "secondPrisonerNumber": "B2345CD",
      "secondPrisonerReason": "VIC",
      "restrictionType":      "EXERCISE",
      "effectiveFromDate":    "2024-01-01",
      "expiryDate":           "2024-03-01",
    })
  }

  #[tokio::test]
  async fn migrate_expired_record_is_closed() {
    let state = make_state().await;
    let (status, body) = send(&state, "POST", "/migrate", Some(legacy_body())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["reason"], "BULLYING");
    assert_eq!(body["restrictionType"], "WING");
    assert_eq!(body["isClosed"], true);
    assert_eq!(body["closedReason"], "UNDEFINED");
    assert_eq!(body["closedAt"], "2024-03-01T00:00:00Z");
    assert_eq!(body["updatedBy"], "NON_ASSOCIATIONS_API");
    assert_eq!(body["comment"], "No comment provided");
  }

  #[tokio::test]
  async fn sync_upsert_creates_then_updates() {
    let state = make_state().await;
    let mut body = legacy_body();
    body["expiryDate"] = Value::Null;
    let (status, created) = send(&state, "PUT", "/sync/upsert", Some(body.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["isClosed"], false);

    body["id"] = created["id"].clone();
    body["expiryDate"] = json!("2024-06-01");
    body["lastModifiedByUsername"] = json!("NOMIS_USER");
    let (status, updated) = send(&state, "PUT", "/sync/upsert", Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], created["id"]);
    assert_eq!(updated["isClosed"], true);
    assert_eq!(updated["closedBy"], "NOMIS_USER");
  }

  // ── Merge ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn merge_moves_records_to_new_number() {
    let state = make_state().await;
    let id = create(&state, "A1234BC", "B2345CD").await;

    let (status, body) = send(
      &state,
      "POST",
      "/merge",
      Some(json!({ "oldPrisonerNumber": "A1234BC", "newPrisonerNumber": "C3456DE" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["renamed"].as_array().unwrap().len(), 1);
    assert_eq!(body["renamed"][0]["isClosed"], false);
    assert!(body["renamed"][0]["closedBy"].is_null());
    assert!(body["renamed"][0]["closedAt"].is_null());
    assert_eq!(body["renamed"][0]["firstRole"], "VICTIM");

    let (_, fetched) = send(&state, "GET", &format!("/non-associations/{id}"), None).await;
    assert_eq!(fetched["firstPrisonerNumber"], "C3456DE");
  }

  #[tokio::test]
  async fn merge_reports_superseded_records_in_response_shape() {
    let state = make_state().await;
    let old_id = create(&state, "A1234BC", "B2345CD").await;
    let kept_id = create(&state, "C3456DE", "B2345CD").await;

    let (status, body) = send(
      &state,
      "POST",
      "/merge",
      Some(json!({ "oldPrisonerNumber": "A1234BC", "newPrisonerNumber": "C3456DE" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let superseded = &body["superseded"][0];
    assert_eq!(superseded["removed"]["id"], old_id);
    assert_eq!(superseded["supersededBy"]["id"], kept_id);
    assert_eq!(superseded["supersededBy"]["isClosed"], false);
    assert!(superseded["supersededBy"]["closedReason"].is_null());
  }

  #[tokio::test]
  async fn merge_into_same_number_is_400() {
    let state = make_state().await;
    let (status, _) = send(
      &state,
      "POST",
      "/merge",
      Some(json!({ "oldPrisonerNumber": "A1234BC", "newPrisonerNumber": "A1234BC" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }
}
