//! Handlers for `/questions` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/questions` | Feed order; optional `?status=pending\|answered\|escalated` |
//! | `POST` | `/questions` | Body: `{"content":"…","name":"…"}` |
//! | `GET`  | `/questions/{id}` | 404 if not found |
//! | `PUT`  | `/questions/{id}/status` | Admin only. Body: `{"status":"answered"}` |
//! | `GET`  | `/stats` | Per-status counts |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use liveqa_core::{
  assistant::AnswerGenerator,
  board::Board,
  feed::StatusCounts,
  question::{NewQuestion, Question, QuestionStatus},
  store::QuestionStore,
  validate::TextValidator,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{caller::Caller, error::ApiError};

fn parse_status(raw: &str) -> Result<QuestionStatus, ApiError> {
  raw.parse().map_err(ApiError::BadRequest)
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub status: Option<String>,
}

/// `GET /questions[?status=<status>]`
pub async fn list<S, A, V>(
  State(board): State<Arc<Board<S, A, V>>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Question>>, ApiError>
where
  S: QuestionStore,
  A: AnswerGenerator,
  V: TextValidator,
{
  let filter = params.status.as_deref().map(parse_status).transpose()?;
  let mut feed = board.feed().await;
  if let Some(status) = filter {
    feed.retain(|q| q.status == status);
  }
  Ok(Json(feed))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub content: String,
  /// Display name for guests. Ignored for registered callers.
  pub name:    Option<String>,
}

/// `POST /questions`
pub async fn create<S, A, V>(
  State(board): State<Arc<Board<S, A, V>>>,
  caller: Caller,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: QuestionStore,
  A: AnswerGenerator,
  V: TextValidator,
{
  let mut input = NewQuestion::new(body.content);
  if let Some(name) = body.name {
    input = input.with_guest_name(name);
  }
  if let Caller(Some(user)) = caller {
    input = input.with_user(user);
  }

  let question = board.submit_question(input).await?;
  Ok((StatusCode::CREATED, Json(question)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /questions/{id}`
pub async fn get_one<S, A, V>(
  State(board): State<Arc<Board<S, A, V>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Question>, ApiError>
where
  S: QuestionStore,
  A: AnswerGenerator,
  V: TextValidator,
{
  Ok(Json(board.question(id).await?))
}

// ─── Status ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StatusBody {
  pub status: String,
}

/// `PUT /questions/{id}/status`
pub async fn set_status<S, A, V>(
  State(board): State<Arc<Board<S, A, V>>>,
  caller: Caller,
  Path(id): Path<Uuid>,
  Json(body): Json<StatusBody>,
) -> Result<Json<Question>, ApiError>
where
  S: QuestionStore,
  A: AnswerGenerator,
  V: TextValidator,
{
  caller.require_admin()?;
  let status = parse_status(&body.status)?;
  Ok(Json(board.set_status(id, status).await?))
}

// ─── Stats ────────────────────────────────────────────────────────────────────

/// `GET /stats`
pub async fn stats<S, A, V>(
  State(board): State<Arc<Board<S, A, V>>>,
) -> Json<StatusCounts>
where
  S: QuestionStore,
  A: AnswerGenerator,
  V: TextValidator,
{
  Json(board.stats().await)
}
