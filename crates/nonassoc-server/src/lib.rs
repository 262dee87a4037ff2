//! HTTP server for the non-associations API.
//!
//! Wraps [`nonassoc_api::api_router`] with Basic authentication (which
//! supplies the acting user) and request tracing.

pub mod auth;
pub mod directory;
pub mod error;

pub use error::Error;

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::{Router, middleware};
use nonassoc_api::AppState;
use nonassoc_core::{directory::PrisonerDirectory, repository::NonAssociationStore};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::{AuthConfig, require_auth};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `NONASSOC_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:                String,
  pub port:                u16,
  pub store_path:          PathBuf,
  pub auth_username:       String,
  pub auth_password_hash:  String,
  /// Base URL of the prisoner search service.
  pub prisoner_search_url: String,
  #[serde(default = "default_system_username")]
  pub system_username:     String,
}

fn default_system_username() -> String { "NON_ASSOCIATIONS_API".to_string() }

impl ServerConfig {
  /// `store_path` with a leading `~/` resolved against `home`.
  pub fn resolved_store_path(&self, home: Option<&Path>) -> PathBuf {
    match (self.store_path.strip_prefix("~"), home) {
      (Ok(rest), Some(home)) => home.join(rest),
      _ => self.store_path.clone(),
    }
  }

  /// The `host:port` the server listens on.
  pub fn listen_address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn auth(&self) -> AuthConfig {
    AuthConfig {
      username:      self.auth_username.clone(),
      password_hash: self.auth_password_hash.clone(),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application: API routes behind Basic auth, traced.
pub fn router<S, D>(state: AppState<S, D>, auth: Arc<AuthConfig>) -> Router
where
  S: NonAssociationStore + 'static,
  D: PrisonerDirectory + 'static,
{
  nonassoc_api::api_router(state)
    .layer(middleware::from_fn_with_state(auth, require_auth))
    .layer(TraceLayer::new_for_http())
}

// ─── Integration tests ────────────────────────────────────────────────────────
