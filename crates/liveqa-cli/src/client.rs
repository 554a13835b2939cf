//! Async HTTP client wrapping the live Q&A JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use liveqa_core::{
  feed::StatusCounts,
  question::{Answer, Question, QuestionStatus},
  sync::FeedSource,
  user::User,
};
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Value, json};
use uuid::Uuid;

/// Header naming the acting user. Must match the server's.
const USER_HEADER: &str = "x-liveqa-user";

/// Connection settings for the API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  /// Registered user to act as; `None` acts as a guest.
  pub user:     Option<Uuid>,
}

/// Body of `POST /questions/{id}/ai-answer`.
#[derive(Debug, Clone, Deserialize)]
pub struct AiAnswer {
  pub answer:       Answer,
  pub failed:       bool,
  pub rate_limited: bool,
}

/// Async HTTP client for the live Q&A REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.config.base_url.trim_end_matches('/'), path)
  }

  fn identify(&self, req: RequestBuilder) -> RequestBuilder {
    match self.config.user {
      Some(id) => req.header(USER_HEADER, id.to_string()),
      None => req,
    }
  }

  /// Send `req`, turning non-2xx responses into errors that carry the
  /// server's `{"error": ...}` message.
  async fn send<T: DeserializeOwned>(&self, req: RequestBuilder, what: &str) -> Result<T> {
    let resp = self
      .identify(req)
      .send()
      .await
      .with_context(|| format!("{what} failed"))?;
    let resp = check(resp, what).await?;
    resp.json().await.with_context(|| format!("deserialising {what} response"))
  }

  // ── Questions ─────────────────────────────────────────────────────────────

  /// `GET /api/questions[?status=<s>]`, already in feed order.
  pub async fn list_questions(&self, status: Option<QuestionStatus>) -> Result<Vec<Question>> {
    let mut req = self.client.get(self.url("/questions"));
    if let Some(status) = status {
      req = req.query(&[("status", status.as_str())]);
    }
    self.send(req, "GET /questions").await
  }

  /// `GET /api/questions/{id}`
  pub async fn get_question(&self, id: Uuid) -> Result<Question> {
    self
      .send(self.client.get(self.url(&format!("/questions/{id}"))), "GET /questions/{id}")
      .await
  }

  /// `POST /api/questions`
  pub async fn ask(&self, content: &str, name: Option<&str>) -> Result<Question> {
    let body = json!({ "content": content, "name": name });
    self
      .send(self.client.post(self.url("/questions")).json(&body), "POST /questions")
      .await
  }

  /// `PUT /api/questions/{id}/status`
  pub async fn set_status(&self, id: Uuid, status: QuestionStatus) -> Result<Question> {
    let body = json!({ "status": status.as_str() });
    self
      .send(
        self.client.put(self.url(&format!("/questions/{id}/status"))).json(&body),
        "PUT /questions/{id}/status",
      )
      .await
  }

  /// `GET /api/stats`
  pub async fn stats(&self) -> Result<StatusCounts> {
    self.send(self.client.get(self.url("/stats")), "GET /stats").await
  }

  // ── Answers ───────────────────────────────────────────────────────────────

  /// `POST /api/questions/{id}/answers`. `mark_answered = None` leaves the
  /// choice to the server.
  pub async fn answer(
    &self,
    id: Uuid,
    content: &str,
    name: Option<&str>,
    mark_answered: Option<bool>,
  ) -> Result<Answer> {
    let body = json!({ "content": content, "name": name, "mark_answered": mark_answered });
    self
      .send(
        self.client.post(self.url(&format!("/questions/{id}/answers"))).json(&body),
        "POST /questions/{id}/answers",
      )
      .await
  }

  /// `POST /api/questions/{id}/ai-answer`
  pub async fn ai_answer(&self, id: Uuid) -> Result<AiAnswer> {
    self
      .send(
        self.client.post(self.url(&format!("/questions/{id}/ai-answer"))),
        "POST /questions/{id}/ai-answer",
      )
      .await
  }

  // ── Users ─────────────────────────────────────────────────────────────────

  /// `POST /api/users`
  pub async fn register(&self, username: &str, email: &str) -> Result<User> {
    let body = json!({ "username": username, "email": email });
    self.send(self.client.post(self.url("/users")).json(&body), "POST /users").await
  }

  /// `POST /api/login`
  pub async fn login(&self, email: &str) -> Result<User> {
    let body = json!({ "email": email });
    self.send(self.client.post(self.url("/login")).json(&body), "POST /login").await
  }
}

impl FeedSource for ApiClient {
  type Error = anyhow::Error;

  async fn load_feed(&self) -> Result<Vec<Question>> { self.list_questions(None).await }
}

async fn check(resp: Response, what: &str) -> Result<Response> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }
  let message = resp
    .json::<Value>()
    .await
    .ok()
    .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_owned));
  Err(match message {
    Some(m) => anyhow!("{what} → {status}: {m}"),
    None => anyhow!("{what} → {status}"),
  })
}
