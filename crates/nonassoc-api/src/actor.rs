//! The acting user of a request.
//!
//! The API does not authenticate anyone itself. Whatever sits in front of it
//! (the server's Basic-auth middleware, or a test) inserts an [`Actor`] into
//! the request extensions; handlers that record provenance extract it.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::ApiError;

/// Username recorded as `updatedBy` / `closedBy` for this request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor(pub String);

impl Actor {
  pub fn as_str(&self) -> &str { &self.0 }
}

impl<S> FromRequestParts<S> for Actor
where
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
    parts
      .extensions
      .get::<Actor>()
      .cloned()
      .ok_or(ApiError::Unauthorized)
  }
}
