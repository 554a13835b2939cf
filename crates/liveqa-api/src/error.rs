//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Board(#[from] liveqa_core::Error),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("unknown or malformed user id")]
  Unauthorized,

  #[error("this action requires an admin")]
  Forbidden,
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    use liveqa_core::Error as E;
    match self {
      Self::Board(E::ValidationFailed(_)) => StatusCode::UNPROCESSABLE_ENTITY,
      Self::Board(E::NotFound(_) | E::UserNotFound(_)) => StatusCode::NOT_FOUND,
      Self::Board(E::Conflict(_)) => StatusCode::CONFLICT,
      Self::Board(E::UpstreamUnavailable(_)) => StatusCode::BAD_GATEWAY,
      Self::Board(E::StoreUnavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
      Self::Board(E::Serialization(_)) => StatusCode::INTERNAL_SERVER_ERROR,
      Self::BadRequest(_) => StatusCode::BAD_REQUEST,
      Self::Unauthorized => StatusCode::UNAUTHORIZED,
      Self::Forbidden => StatusCode::FORBIDDEN,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      error!(error = %self, "request failed");
    }
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}
