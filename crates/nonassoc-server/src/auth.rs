//! HTTP Basic-auth middleware yielding the acting user.

use std::sync::Arc;

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  extract::{Request, State},
  http::HeaderMap,
  middleware::Next,
  response::Response,
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use nonassoc_api::Actor;

use crate::error::Error;

/// Credentials accepted as valid for this server instance.
#[derive(Clone)]
pub struct AuthConfig {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

/// Verify Basic credentials from `headers`, returning the username.
pub fn verify_auth(headers: &HeaderMap, config: &AuthConfig) -> Result<String, Error> {
  let header_val = headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(Error::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(Error::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| Error::Unauthorized)?;
  let creds   = std::str::from_utf8(&decoded).map_err(|_| Error::Unauthorized)?;

  let (username, password) = creds.split_once(':').ok_or(Error::Unauthorized)?;

  if username != config.username {
    return Err(Error::Unauthorized);
  }

  let parsed_hash = PasswordHash::new(&config.password_hash)
    .map_err(|_| Error::Unauthorized)?;

  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| Error::Unauthorized)?;

  Ok(username.to_owned())
}

/// Reject unauthenticated requests; otherwise record the user as the
/// request's [`Actor`].
pub async fn require_auth(
  State(config): State<Arc<AuthConfig>>,
  mut req: Request,
  next: Next,
) -> Result<Response, Error> {
  let username = verify_auth(req.headers(), &config).inspect_err(|_| {
    tracing::debug!(path = %req.uri().path(), "rejected unauthenticated request");
  })?;
  req.extensions_mut().insert(Actor(username));
  Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
  use super::*;
  use argon2::{PasswordHasher, password_hash::SaltString};
  use axum::{
    Router,
    body::Body,
    http::{StatusCode, header},
    middleware,
    routing::get,
  };
  use rand_core::OsRng;
  use tower::ServiceExt as _;

  fn make_config(password: &str) -> AuthConfig {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string();
    AuthConfig {
      username:      "user".to_string(),
      password_hash: hash,
    }
  }

  fn basic(user: &str, pass: &str) -> String {
    format!("Basic {}", B64.encode(format!("{user}:{pass}")))
  }

  fn headers(value: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::AUTHORIZATION, value.parse().unwrap());
    headers
  }

  #[test]
  fn correct_credentials() {
    let config = make_config("secret");
    let user = verify_auth(&headers(&basic("user", "secret")), &config).unwrap();
    assert_eq!(user, "user");
  }

  #[test]
  fn wrong_password() {
    let config = make_config("secret");
    assert!(matches!(
      verify_auth(&headers(&basic("user", "wrong")), &config),
      Err(Error::Unauthorized)
    ));
  }

  #[test]
  fn wrong_username() {
    let config = make_config("secret");
    assert!(matches!(
      verify_auth(&headers(&basic("other", "secret")), &config),
      Err(Error::Unauthorized)
    ));
  }

  #[test]
  fn missing_header() {
    let config = make_config("secret");
    assert!(matches!(verify_auth(&HeaderMap::new(), &config), Err(Error::Unauthorized)));
  }

  #[test]
  fn invalid_base64() {
    let config = make_config("secret");
    assert!(matches!(
      verify_auth(&headers("Basic !!!not-base64!!!"), &config),
      Err(Error::Unauthorized)
    ));
  }

  async fn whoami(actor: Actor) -> String { actor.0 }

  fn guarded(config: AuthConfig) -> Router {
    Router::new()
      .route("/whoami", get(whoami))
      .layer(middleware::from_fn_with_state(Arc::new(config), require_auth))
  }

  #[tokio::test]
  async fn middleware_inserts_actor() {
    let req = axum::http::Request::builder()
      .uri("/whoami")
      .header(header::AUTHORIZATION, basic("user", "secret"))
      .body(Body::empty())
      .unwrap();
    let resp = guarded(make_config("secret")).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"user");
  }

  #[tokio::test]
  async fn middleware_challenges_anonymous_requests() {
    let req = axum::http::Request::builder()
      .uri("/whoami")
      .body(Body::empty())
      .unwrap();
    let resp = guarded(make_config("secret")).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));
  }
}
