//! Wire types for the `generateContent` endpoint. Only the fields we use.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
  pub contents:          Vec<Content>,
  pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Content {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub role:  Option<String>,
  #[serde(default)]
  pub parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Part {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
  pub max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
  #[serde(default)]
  pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
  pub content: Option<Content>,
}

impl GenerateResponse {
  /// Text of the first part of the first candidate, if any.
  pub fn first_text(self) -> Option<String> {
    self
      .candidates
      .into_iter()
      .next()?
      .content?
      .parts
      .into_iter()
      .next()?
      .text
  }
}

#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
  pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
  #[serde(default)]
  pub message: String,
}
