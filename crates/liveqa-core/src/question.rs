//! Questions and their embedded answers.
//!
//! A question is created once by a submit action and never deleted. Its
//! answers are append-only: once pushed, an answer is never edited or
//! removed. Only the `status` field of a question is mutable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::user::User;

/// Display name attached to answers produced by the AI collaborator.
pub const AI_AUTHOR: &str = "AI Assistant";

/// Display name attached to system notices (e.g. a failed AI request).
pub const SYSTEM_AUTHOR: &str = "System";

/// Display name for a human answer with neither an identity nor a name.
pub const GUEST_AUTHOR: &str = "Guest";

// ─── Status ──────────────────────────────────────────────────────────────────

/// Moderation state of a question. Any state is reachable from any other.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
pub enum QuestionStatus {
  #[default]
  Pending,
  Answered,
  Escalated,
}

impl QuestionStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Pending => "Pending",
      Self::Answered => "Answered",
      Self::Escalated => "Escalated",
    }
  }

  pub fn is_escalated(self) -> bool { matches!(self, Self::Escalated) }
}

impl std::fmt::Display for QuestionStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

impl std::str::FromStr for QuestionStatus {
  type Err = String;

  /// Case-insensitive; accepts the serialized names.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "pending" => Ok(Self::Pending),
      "answered" => Ok(Self::Answered),
      "escalated" => Ok(Self::Escalated),
      other => Err(format!("unknown question status: {other:?}")),
    }
  }
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// A response attached to a [`Question`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
  pub id:              Uuid,
  /// Back-reference to the owning question. Lookup only.
  pub question_id:     Uuid,
  pub author:          String,
  /// Registered user who wrote the answer; `None` for guests, the AI and
  /// system notices.
  #[serde(default)]
  pub author_id:       Option<Uuid>,
  pub content:         String,
  pub created_at:      DateTime<Utc>,
  #[serde(default)]
  pub is_ai_generated: bool,
}

impl Answer {
  /// A notice written by the board itself rather than a person or the AI.
  pub fn is_system_notice(&self) -> bool {
    !self.is_ai_generated && self.author_id.is_none() && self.author == SYSTEM_AUTHOR
  }
}

/// A submitted query together with the answers it has received so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
  pub id:         Uuid,
  pub author:     String,
  #[serde(default)]
  pub author_id:  Option<Uuid>,
  pub content:    String,
  pub status:     QuestionStatus,
  pub created_at: DateTime<Utc>,
  #[serde(default)]
  pub answers:    Vec<Answer>,
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Input for [`Board::submit_question`](crate::board::Board::submit_question).
#[derive(Debug, Clone, Default)]
pub struct NewQuestion {
  pub content:    String,
  /// Name typed by a guest. Ignored when `user` is set.
  pub guest_name: Option<String>,
  pub user:       Option<User>,
}

impl NewQuestion {
  pub fn new(content: impl Into<String>) -> Self {
    Self { content: content.into(), ..Default::default() }
  }

  pub fn with_guest_name(mut self, name: impl Into<String>) -> Self {
    self.guest_name = Some(name.into());
    self
  }

  pub fn with_user(mut self, user: User) -> Self {
    self.user = Some(user);
    self
  }
}

/// Input for [`Board::post_answer`](crate::board::Board::post_answer).
#[derive(Debug, Clone, Default)]
pub struct NewAnswer {
  pub content:    String,
  pub guest_name: Option<String>,
  pub user:       Option<User>,
}

impl NewAnswer {
  pub fn new(content: impl Into<String>) -> Self {
    Self { content: content.into(), ..Default::default() }
  }

  pub fn with_guest_name(mut self, name: impl Into<String>) -> Self {
    self.guest_name = Some(name.into());
    self
  }

  pub fn with_user(mut self, user: User) -> Self {
    self.user = Some(user);
    self
  }
}

/// Trim a caller-supplied name, discarding it if nothing is left.
pub(crate) fn clean_name(name: Option<&str>) -> Option<String> {
  name.map(str::trim).filter(|n| !n.is_empty()).map(str::to_owned)
}
