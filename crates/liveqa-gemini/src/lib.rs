//! Google Gemini implementation of the AI-answer collaborator.
//!
//! [`GeminiAssistant`] sends one `generateContent` request per question and
//! classifies every failure into an
//! [`AssistantError`](liveqa_core::assistant::AssistantError), so the board
//! can word a rate limit differently from an outage.

mod client;
mod types;

pub use client::{DEFAULT_BASE_URL, DEFAULT_MODEL, GeminiAssistant, GeminiConfig};
