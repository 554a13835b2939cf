//! Resolving who is making a request.
//!
//! Identity is the optional `x-liveqa-user` header carrying a user id. No
//! credential is checked: the header only selects which registered user the
//! request acts as.

use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};
use liveqa_core::{
  assistant::AnswerGenerator, board::Board, store::QuestionStore, user::User,
  validate::TextValidator,
};
use uuid::Uuid;

use crate::error::ApiError;

/// Header naming the acting user.
pub const USER_HEADER: &str = "x-liveqa-user";

/// The acting user, or `None` for a guest.
#[derive(Debug, Clone)]
pub struct Caller(pub Option<User>);

impl Caller {
  pub fn user(&self) -> Option<&User> { self.0.as_ref() }

  pub fn is_admin(&self) -> bool { self.0.as_ref().is_some_and(User::is_admin) }

  pub fn require_admin(&self) -> Result<&User, ApiError> {
    self.0.as_ref().filter(|u| u.is_admin()).ok_or(ApiError::Forbidden)
  }
}

impl<S, A, V> FromRequestParts<Arc<Board<S, A, V>>> for Caller
where
  S: QuestionStore + 'static,
  A: AnswerGenerator + 'static,
  V: TextValidator + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    board: &Arc<Board<S, A, V>>,
  ) -> Result<Self, Self::Rejection> {
    let Some(raw) = parts.headers.get(USER_HEADER) else {
      return Ok(Caller(None));
    };

    let id = raw
      .to_str()
      .ok()
      .and_then(|s| Uuid::parse_str(s.trim()).ok())
      .ok_or(ApiError::Unauthorized)?;

    match board.user(id).await? {
      Some(user) => Ok(Caller(Some(user))),
      None => Err(ApiError::Unauthorized),
    }
  }
}
