//! Error types and axum `IntoResponse` implementation.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unauthorized")]
  Unauthorized,
  #[error("prisoner directory request failed: {0}")]
  Directory(#[from] reqwest::Error),
  #[error("prisoner directory returned status {0}")]
  DirectoryStatus(u16),
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    match self {
      Error::Unauthorized => {
        let mut res =
          (StatusCode::UNAUTHORIZED, Json(json!({ "error": "unauthorized" }))).into_response();
        res.headers_mut().insert(
          header::WWW_AUTHENTICATE,
          HeaderValue::from_static("Basic realm=\"non-associations\""),
        );
        res
      }
      e @ (Error::Directory(_) | Error::DirectoryStatus(_)) => {
        (StatusCode::BAD_GATEWAY, Json(json!({ "error": e.to_string() }))).into_response()
      }
    }
  }
}
