//! Error types for `liveqa-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::assistant::AssistantError;

#[derive(Debug, Error)]
pub enum Error {
  #[error("validation failed: {0}")]
  ValidationFailed(String),

  #[error("question not found: {0}")]
  NotFound(Uuid),

  #[error("user not found: {0}")]
  UserNotFound(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("AI service unavailable: {0}")]
  UpstreamUnavailable(#[from] AssistantError),

  #[error("store unavailable: {0}")]
  StoreUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  pub(crate) fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::StoreUnavailable(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
