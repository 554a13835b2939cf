//! JSON REST API for the live Q&A board.
//!
//! Exposes an axum [`Router`] over a shared [`Board`]. TLS and transport
//! concerns are the caller's responsibility; identity is the `x-liveqa-user`
//! header resolved by [`Caller`].
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", liveqa_api::api_router(board.clone()))
//! ```

pub mod answers;
pub mod caller;
pub mod error;
pub mod questions;
pub mod users;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use liveqa_core::{
  assistant::AnswerGenerator, board::Board, store::QuestionStore,
  validate::TextValidator,
};

pub use caller::{Caller, USER_HEADER};
pub use error::ApiError;

/// Build a fully-materialised API router for `board`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, A, V>(board: Arc<Board<S, A, V>>) -> Router<()>
where
  S: QuestionStore + 'static,
  A: AnswerGenerator + 'static,
  V: TextValidator + 'static,
{
  Router::new()
    // Questions
    .route(
      "/questions",
      get(questions::list::<S, A, V>).post(questions::create::<S, A, V>),
    )
    .route("/questions/{id}", get(questions::get_one::<S, A, V>))
    .route("/questions/{id}/status", put(questions::set_status::<S, A, V>))
    .route("/stats", get(questions::stats::<S, A, V>))
    // Answers
    .route("/questions/{id}/answers", post(answers::create::<S, A, V>))
    .route("/questions/{id}/ai-answer", post(answers::ai_answer::<S, A, V>))
    .route("/questions/{id}/ai-draft", post(answers::ai_draft::<S, A, V>))
    // Users
    .route("/users", post(users::register::<S, A, V>))
    .route("/login", post(users::login::<S, A, V>))
    .with_state(board)
}

#[cfg(test)]
mod tests {
  use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
  };
  use liveqa_core::{
    assistant::{AssistantError, BUSY_MESSAGE, CANNED_ANSWER, CannedAssistant},
    store::{DocumentStore, KeyValueStore, MemoryStore},
    validate::NonEmptyValidator,
  };
  use serde_json::{Value, json};
  use tower::ServiceExt;
  use uuid::Uuid;

  use super::*;

  /// Always rate limited.
  struct BusyAssistant;

  impl AnswerGenerator for BusyAssistant {
    async fn generate_answer(&self, _: &str) -> Result<String, AssistantError> {
      Err(AssistantError::RateLimited { retry_after: Some(5) })
    }
  }

  /// A backend that cannot be read.
  struct DownStore;

  #[derive(Debug, thiserror::Error)]
  #[error("backend unreachable")]
  struct Down;

  impl KeyValueStore for DownStore {
    type Error = Down;
    async fn get(&self, _: &str) -> Result<Option<String>, Down> { Err(Down) }
    async fn set(&self, _: &str, _: String) -> Result<(), Down> { Ok(()) }
  }

  type Store = DocumentStore<MemoryStore>;

  fn board() -> Arc<Board<Store>> {
    Arc::new(Board::with_defaults(DocumentStore::new(MemoryStore::new())))
  }

  fn busy_board() -> Arc<Board<Store, BusyAssistant>> {
    Arc::new(Board::new(
      DocumentStore::new(MemoryStore::new()),
      BusyAssistant,
      NonEmptyValidator,
    ))
  }

  async fn send<S, A, V>(
    board: &Arc<Board<S, A, V>>,
    method: &str,
    uri: &str,
    user: Option<Uuid>,
    body: Option<Value>,
  ) -> (StatusCode, Value)
  where
    S: QuestionStore + 'static,
    A: AnswerGenerator + 'static,
    V: TextValidator + 'static,
  {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(id) = user {
      req = req.header(USER_HEADER, id.to_string());
    }
    let req = match body {
      Some(json) => req
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json.to_string())),
      None => req.body(Body::empty()),
    }
    .unwrap();

    let resp = api_router(Arc::clone(board)).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
  }

  async fn register<S, A, V>(board: &Arc<Board<S, A, V>>, name: &str, role: &str) -> Uuid
  where
    S: QuestionStore + 'static,
    A: AnswerGenerator + 'static,
    V: TextValidator + 'static,
  {
    let email = format!("{}@example.com", name.to_lowercase());
    let (status, user) = send(
      board,
      "POST",
      "/users",
      None,
      Some(json!({ "username": name, "email": email, "role": role })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    user["id"].as_str().unwrap().parse().unwrap()
  }

  async fn ask<S, A, V>(board: &Arc<Board<S, A, V>>, content: &str) -> Uuid
  where
    S: QuestionStore + 'static,
    A: AnswerGenerator + 'static,
    V: TextValidator + 'static,
  {
    let (status, q) =
      send(board, "POST", "/questions", None, Some(json!({ "content": content }))).await;
    assert_eq!(status, StatusCode::CREATED);
    q["id"].as_str().unwrap().parse().unwrap()
  }

  // ── Questions ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn empty_board_lists_nothing() {
    let b = board();
    let (status, body) = send(&b, "GET", "/questions", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
  }

  #[tokio::test]
  async fn guest_question_is_pending_and_attributed() {
    let b = board();
    let (status, q) = send(
      &b,
      "POST",
      "/questions",
      None,
      Some(json!({ "content": "Is this free?", "name": "Ana" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(q["author"], "Ana");
    assert_eq!(q["authorId"], Value::Null);
    assert_eq!(q["status"], "Pending");
    assert_eq!(q["answers"], json!([]));

    let (_, anon) =
      send(&b, "POST", "/questions", None, Some(json!({ "content": "hi" }))).await;
    assert!(anon["author"].as_str().unwrap().starts_with("Guest_"));
  }

  #[tokio::test]
  async fn blank_question_is_422() {
    let b = board();
    let (status, body) =
      send(&b, "POST", "/questions", None, Some(json!({ "content": "   " }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("validation"));
    assert!(b.questions().await.is_empty());
  }

  #[tokio::test]
  async fn registered_caller_is_the_author() {
    let b = board();
    let jane = register(&b, "Jane", "user").await;
    let (status, q) = send(
      &b,
      "POST",
      "/questions",
      Some(jane),
      Some(json!({ "content": "Reset password?", "name": "ignored" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(q["author"], "Jane");
    assert_eq!(q["authorId"], jane.to_string());
  }

  #[tokio::test]
  async fn unknown_or_malformed_user_header_is_401() {
    let b = board();
    let (status, _) = send(&b, "GET", "/questions", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
      &b,
      "POST",
      "/questions",
      Some(Uuid::now_v7()),
      Some(json!({ "content": "who am i" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let req = Request::builder()
      .method("POST")
      .uri("/questions")
      .header(USER_HEADER, "not-a-uuid")
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(json!({ "content": "x" }).to_string()))
      .unwrap();
    let resp = api_router(Arc::clone(&b)).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn missing_question_is_404() {
    let b = board();
    let uri = format!("/questions/{}", Uuid::now_v7());
    let (status, body) = send(&b, "GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
  }

  #[tokio::test]
  async fn feed_puts_escalated_first_and_filters() {
    let b = board();
    let admin = register(&b, "Admin", "admin").await;
    let older = ask(&b, "older").await;
    let newer = ask(&b, "newer").await;

    let (status, _) = send(
      &b,
      "PUT",
      &format!("/questions/{older}/status"),
      Some(admin),
      Some(json!({ "status": "escalated" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, feed) = send(&b, "GET", "/questions", None, None).await;
    let ids: Vec<_> = feed.as_array().unwrap().iter().map(|q| q["id"].clone()).collect();
    assert_eq!(ids, [json!(older.to_string()), json!(newer.to_string())]);

    let (_, escalated) = send(&b, "GET", "/questions?status=Escalated", None, None).await;
    assert_eq!(escalated.as_array().unwrap().len(), 1);

    let (status, _) = send(&b, "GET", "/questions?status=closed", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn status_change_requires_admin() {
    let b = board();
    let member = register(&b, "Member", "user").await;
    let q = ask(&b, "please escalate").await;
    let uri = format!("/questions/{q}/status");
    let body = json!({ "status": "answered" });

    let (status, _) = send(&b, "PUT", &uri, None, Some(body.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&b, "PUT", &uri, Some(member), Some(body)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(b.question(q).await.unwrap().status.as_str(), "Pending");
  }

  #[tokio::test]
  async fn stats_count_each_status() {
    let b = board();
    let admin = register(&b, "Admin", "admin").await;
    ask(&b, "one").await;
    let two = ask(&b, "two").await;
    send(
      &b,
      "PUT",
      &format!("/questions/{two}/status"),
      Some(admin),
      Some(json!({ "status": "answered" })),
    )
    .await;

    let (status, counts) = send(&b, "GET", "/stats", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
      counts,
      json!({ "total": 2, "pending": 1, "answered": 1, "escalated": 0 })
    );
  }

  // ── Answers ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn admin_reply_marks_question_answered() {
    let b = board();
    let admin = register(&b, "Admin", "admin").await;
    let q = ask(&b, "Is this free?").await;

    let (status, answer) = send(
      &b,
      "POST",
      &format!("/questions/{q}/answers"),
      Some(admin),
      Some(json!({ "content": "Yes, the basic tier is free." })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(answer["author"], "Admin");
    assert_eq!(answer["isAiGenerated"], false);

    let stored = b.question(q).await.unwrap();
    assert_eq!(stored.status.as_str(), "Answered");
    assert_eq!(stored.answers.len(), 1);
  }

  #[tokio::test]
  async fn guest_reply_leaves_status_alone() {
    let b = board();
    let q = ask(&b, "anyone?").await;

    let (status, answer) = send(
      &b,
      "POST",
      &format!("/questions/{q}/answers"),
      None,
      Some(json!({ "content": "me too" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(answer["author"], "Guest");
    assert_eq!(b.question(q).await.unwrap().status.as_str(), "Pending");

    let (status, _) = send(
      &b,
      "POST",
      &format!("/questions/{q}/answers"),
      None,
      Some(json!({ "content": "done", "mark_answered": true })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(b.question(q).await.unwrap().answers.len(), 1);
  }

  #[tokio::test]
  async fn answer_to_missing_question_is_404() {
    let b = board();
    let (status, _) = send(
      &b,
      "POST",
      &format!("/questions/{}/answers", Uuid::now_v7()),
      None,
      Some(json!({ "content": "lost" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn ai_answer_is_appended() {
    let b = board();
    let q = ask(&b, "How do I reset my password?").await;

    let (status, body) =
      send(&b, "POST", &format!("/questions/{q}/ai-answer"), None, None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["failed"], false);
    assert_eq!(body["rate_limited"], false);
    assert_eq!(body["answer"]["author"], "AI Assistant");
    assert_eq!(body["answer"]["isAiGenerated"], true);
    assert_eq!(body["answer"]["content"], CANNED_ANSWER);
    assert_eq!(b.question(q).await.unwrap().status.as_str(), "Pending");
  }

  #[tokio::test]
  async fn rate_limited_ai_answer_posts_system_notice() {
    let b = busy_board();
    let q = ask(&b, "busy?").await;

    let (status, body) =
      send(&b, "POST", &format!("/questions/{q}/ai-answer"), None, None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["failed"], true);
    assert_eq!(body["rate_limited"], true);
    assert_eq!(body["answer"]["author"], "System");
    assert_eq!(body["answer"]["isAiGenerated"], false);
    assert_eq!(body["answer"]["content"], BUSY_MESSAGE);

    let stored = b.question(q).await.unwrap();
    assert_eq!(stored.answers.len(), 1);
    assert_eq!(stored.status.as_str(), "Pending");
  }

  #[tokio::test]
  async fn ai_draft_is_admin_only_and_stores_nothing() {
    let b: Arc<Board<Store, CannedAssistant>> = board();
    let admin = register(&b, "Admin", "admin").await;
    let q = ask(&b, "draft me").await;
    let uri = format!("/questions/{q}/ai-draft");

    let (status, _) = send(&b, "POST", &uri, None, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&b, "POST", &uri, Some(admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "draft": CANNED_ANSWER, "failed": false }));
    assert!(b.question(q).await.unwrap().answers.is_empty());
  }

  // ── Users ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn duplicate_email_is_409() {
    let b = board();
    register(&b, "Jane", "user").await;
    let (status, _) = send(
      &b,
      "POST",
      "/users",
      None,
      Some(json!({ "username": "Other", "email": "JANE@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
  }

  #[tokio::test]
  async fn login_finds_registered_email() {
    let b = board();
    let jane = register(&b, "Jane", "user").await;

    let (status, user) =
      send(&b, "POST", "/login", None, Some(json!({ "email": "jane@example.com" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["id"], jane.to_string());
    assert_eq!(user["role"], "user");

    let (status, _) =
      send(&b, "POST", "/login", None, Some(json!({ "email": "nobody@example.com" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  // ── Store outages ───────────────────────────────────────────────────────────

  #[tokio::test]
  async fn unreadable_store_is_503_not_404() {
    let b = Arc::new(Board::with_defaults(DocumentStore::new(DownStore)));
    let id = Uuid::now_v7();

    let (status, body) = send(&b, "GET", &format!("/questions/{id}"), None, None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].as_str().unwrap().contains("store unavailable"));

    let (status, _) =
      send(&b, "POST", "/questions", None, Some(json!({ "content": "lost?" }))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, _) = send(&b, "POST", &format!("/questions/{id}/ai-answer"), None, None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
  }
}
