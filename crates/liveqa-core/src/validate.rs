//! The pluggable text-validation boundary.
//!
//! Validation is asynchronous because real deployments may ask a remote
//! service. The board calls it before accepting a question.

use std::future::Future;

pub trait TextValidator: Send + Sync {
  /// `true` if `text` may be accepted as question content.
  fn validate<'a>(&'a self, text: &'a str) -> impl Future<Output = bool> + Send + 'a;
}

/// Accepts anything that is not empty after trimming.
#[derive(Debug, Clone, Copy, Default)]
pub struct NonEmptyValidator;

impl TextValidator for NonEmptyValidator {
  async fn validate(&self, text: &str) -> bool { !text.trim().is_empty() }
}

/// Non-empty after trimming and at most `max_chars` characters long.
#[derive(Debug, Clone, Copy)]
pub struct MaxLengthValidator {
  pub max_chars: usize,
}

impl MaxLengthValidator {
  pub fn new(max_chars: usize) -> Self { Self { max_chars } }
}

impl TextValidator for MaxLengthValidator {
  async fn validate(&self, text: &str) -> bool {
    let trimmed = text.trim();
    !trimmed.is_empty() && trimmed.chars().count() <= self.max_chars
  }
}
