//! Handlers for user registration and login.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/users` | Body: `{"username":"…","email":"…","role":"user"}` |
//! | `POST` | `/login` | Body: `{"email":"…"}`; 404 if unknown |

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use liveqa_core::{
  assistant::AnswerGenerator,
  board::Board,
  store::QuestionStore,
  user::{User, UserRole},
  validate::TextValidator,
};
use serde::Deserialize;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  pub username: String,
  pub email:    String,
  #[serde(default)]
  pub role:     UserRole,
}

/// `POST /users`
pub async fn register<S, A, V>(
  State(board): State<Arc<Board<S, A, V>>>,
  Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: QuestionStore,
  A: AnswerGenerator,
  V: TextValidator,
{
  let user = board.register(&body.username, &body.email, body.role).await?;
  Ok((StatusCode::CREATED, Json(user)))
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub email: String,
}

/// `POST /login`
pub async fn login<S, A, V>(
  State(board): State<Arc<Board<S, A, V>>>,
  Json(body): Json<LoginBody>,
) -> Result<Json<User>, ApiError>
where
  S: QuestionStore,
  A: AnswerGenerator,
  V: TextValidator,
{
  Ok(Json(board.login(&body.email).await?))
}
