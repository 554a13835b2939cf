//! Handlers for answers under `/questions/{id}`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/questions/{id}/answers` | Body: `{"content":"…","name":"…","mark_answered":true}` |
//! | `POST` | `/questions/{id}/ai-answer` | Appends an AI answer, or a system notice on failure |
//! | `POST` | `/questions/{id}/ai-draft` | Admin only. Nothing is stored |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use liveqa_core::{
  assistant::AnswerGenerator,
  board::Board,
  question::{Answer, NewAnswer},
  store::QuestionStore,
  validate::TextValidator,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{caller::Caller, error::ApiError};

// ─── Human answers ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub content:       String,
  pub name:          Option<String>,
  /// Defaults to `true` for admins and `false` for everyone else. Only
  /// admins may set it.
  pub mark_answered: Option<bool>,
}

/// `POST /questions/{id}/answers`
pub async fn create<S, A, V>(
  State(board): State<Arc<Board<S, A, V>>>,
  caller: Caller,
  Path(id): Path<Uuid>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: QuestionStore,
  A: AnswerGenerator,
  V: TextValidator,
{
  let mark_answered = body.mark_answered.unwrap_or(caller.is_admin());
  if mark_answered {
    caller.require_admin()?;
  }

  let mut input = NewAnswer::new(body.content);
  if let Some(name) = body.name {
    input = input.with_guest_name(name);
  }
  if let Caller(Some(user)) = caller {
    input = input.with_user(user);
  }

  let answer = board.reply_as_moderator(id, input, mark_answered).await?;
  Ok((StatusCode::CREATED, Json(answer)))
}

// ─── AI answers ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct AiAnswerResponse {
  pub answer:       Answer,
  pub failed:       bool,
  pub rate_limited: bool,
}

/// `POST /questions/{id}/ai-answer`
///
/// Upstream failures still return 201: the stored answer is then a system
/// notice and `failed` is set.
pub async fn ai_answer<S, A, V>(
  State(board): State<Arc<Board<S, A, V>>>,
  Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
  S: QuestionStore,
  A: AnswerGenerator,
  V: TextValidator,
{
  let reply = board.post_ai_answer(id).await?;
  let body = AiAnswerResponse {
    failed:       reply.failed(),
    rate_limited: reply.failure.as_ref().is_some_and(|e| e.is_rate_limited()),
    answer:       reply.answer,
  };
  Ok((StatusCode::CREATED, Json(body)))
}

#[derive(Debug, Serialize)]
pub struct AiDraftResponse {
  pub draft:  String,
  pub failed: bool,
}

/// `POST /questions/{id}/ai-draft`
pub async fn ai_draft<S, A, V>(
  State(board): State<Arc<Board<S, A, V>>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<AiDraftResponse>, ApiError>
where
  S: QuestionStore,
  A: AnswerGenerator,
  V: TextValidator,
{
  caller.require_admin()?;
  let draft = board.draft_ai_answer(id).await?;
  Ok(Json(AiDraftResponse { failed: draft.failure.is_some(), draft: draft.text }))
}
