//! `generateContent` client.

use std::time::Duration;

use liveqa_core::assistant::{AnswerGenerator, AssistantError};
use reqwest::{Client, StatusCode, header::RETRY_AFTER};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::types::{
  Content, ErrorResponse, GenerateRequest, GenerateResponse, GenerationConfig,
  Part,
};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

fn default_base_url() -> String { DEFAULT_BASE_URL.to_owned() }
fn default_model() -> String { DEFAULT_MODEL.to_owned() }
fn default_max_output_tokens() -> u32 { 256 }
fn default_timeout_secs() -> u64 { 30 }

/// Connection settings. Deserializable so the server can embed it in its
/// own configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
  #[serde(default)]
  pub api_key:           Option<String>,
  #[serde(default = "default_model")]
  pub model:             String,
  #[serde(default = "default_base_url")]
  pub base_url:          String,
  #[serde(default = "default_max_output_tokens")]
  pub max_output_tokens: u32,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs:      u64,
}

impl Default for GeminiConfig {
  fn default() -> Self {
    Self {
      api_key:           None,
      model:             default_model(),
      base_url:          default_base_url(),
      max_output_tokens: default_max_output_tokens(),
      timeout_secs:      default_timeout_secs(),
    }
  }
}

impl GeminiConfig {
  /// `true` when an API key is present and not blank.
  pub fn has_api_key(&self) -> bool {
    self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
  }
}

/// Answers questions through the Gemini API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct GeminiAssistant {
  client: Client,
  config: GeminiConfig,
}

impl std::fmt::Debug for GeminiAssistant {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("GeminiAssistant")
      .field("model", &self.config.model)
      .field("base_url", &self.config.base_url)
      .finish_non_exhaustive()
  }
}

impl GeminiAssistant {
  pub fn new(config: GeminiConfig) -> Result<Self, AssistantError> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()
      .map_err(|e| AssistantError::Network(e.to_string()))?;
    Ok(Self { client, config })
  }

  pub fn config(&self) -> &GeminiConfig { &self.config }

  fn url(&self) -> String {
    format!(
      "{}/v1beta/models/{}:generateContent",
      self.config.base_url.trim_end_matches('/'),
      self.config.model
    )
  }

  async fn request(&self, question: &str) -> Result<String, AssistantError> {
    let api_key = match self.config.api_key.as_deref().map(str::trim) {
      Some(key) if !key.is_empty() => key,
      _ => return Err(AssistantError::NotConfigured),
    };

    let body = GenerateRequest {
      contents:          vec![Content {
        role:  Some("user".into()),
        parts: vec![Part { text: Some(prompt(question)) }],
      }],
      generation_config: GenerationConfig {
        max_output_tokens: self.config.max_output_tokens,
      },
    };

    debug!(model = %self.config.model, "requesting AI answer");
    let resp = self
      .client
      .post(self.url())
      .header("x-goog-api-key", api_key)
      .json(&body)
      .send()
      .await
      .map_err(|e| AssistantError::Network(e.to_string()))?;

    let status = resp.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
      let retry_after = resp
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok());
      warn!(?retry_after, "AI service rate limited the request");
      return Err(AssistantError::RateLimited { retry_after });
    }

    if !status.is_success() {
      let text = resp.text().await.unwrap_or_default();
      let message = serde_json::from_str::<ErrorResponse>(&text)
        .map(|e| e.error.message)
        .unwrap_or(text);
      return Err(AssistantError::Upstream { status: status.as_u16(), message });
    }

    let parsed: GenerateResponse = resp
      .json()
      .await
      .map_err(|e| AssistantError::Malformed(e.to_string()))?;
    parsed
      .first_text()
      .ok_or_else(|| AssistantError::Malformed("response had no candidate text".into()))
  }
}

impl AnswerGenerator for GeminiAssistant {
  async fn generate_answer(&self, question: &str) -> Result<String, AssistantError> {
    self.request(question).await
  }
}

fn prompt(question: &str) -> String {
  format!(
    "You are a helpful Q&A assistant on a community forum. Please provide a \
     concise, helpful, and polite answer to the following question. Keep it \
     under 50 words if possible.\n\nQuestion: \"{question}\""
  )
}
