//! The AI-answer collaborator contract.
//!
//! An [`AnswerGenerator`] turns question text into answer text. It is
//! fallible, and its failures are classified so that callers can word a rate
//! limit differently from an outage.

use std::future::Future;

use thiserror::Error;

/// Message shown when the upstream service is rate limiting us.
pub const BUSY_MESSAGE: &str =
  "AI service is temporarily busy. Please try again in a moment.";

/// Message shown for every other upstream failure.
pub const UNAVAILABLE_MESSAGE: &str =
  "AI service is temporarily unavailable. Please try again later.";

/// Answer returned by [`CannedAssistant`].
pub const CANNED_ANSWER: &str = "Thanks for your question! A community member or \
  admin should be able to help you with this shortly. In the meantime, please \
  check the relevant documentation or previous discussions for similar topics.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssistantError {
  #[error("rate limited by upstream")]
  RateLimited {
    /// Seconds the upstream asked us to wait, if it said.
    retry_after: Option<u64>,
  },

  #[error("upstream returned status {status}: {message}")]
  Upstream { status: u16, message: String },

  #[error("malformed upstream response: {0}")]
  Malformed(String),

  #[error("network error: {0}")]
  Network(String),

  #[error("AI service is not configured")]
  NotConfigured,
}

impl AssistantError {
  pub fn is_rate_limited(&self) -> bool { matches!(self, Self::RateLimited { .. }) }

  /// Text suitable for showing to the person who asked.
  pub fn user_message(&self) -> &'static str {
    if self.is_rate_limited() { BUSY_MESSAGE } else { UNAVAILABLE_MESSAGE }
  }
}

pub trait AnswerGenerator: Send + Sync {
  /// Produce a concise answer to `question`.
  fn generate_answer<'a>(
    &'a self,
    question: &'a str,
  ) -> impl Future<Output = Result<String, AssistantError>> + Send + 'a;
}

/// Offline stand-in used when no AI service is configured. Always answers
/// with the same courteous holding message.
#[derive(Debug, Clone, Copy, Default)]
pub struct CannedAssistant;

impl AnswerGenerator for CannedAssistant {
  async fn generate_answer(&self, _question: &str) -> Result<String, AssistantError> {
    Ok(CANNED_ANSWER.to_owned())
  }
}

impl<T: AnswerGenerator> AnswerGenerator for std::sync::Arc<T> {
  fn generate_answer<'a>(
    &'a self,
    question: &'a str,
  ) -> impl Future<Output = Result<String, AssistantError>> + Send + 'a {
    (**self).generate_answer(question)
  }
}
