//! Encoding and decoding of the stored documents.
//!
//! Each document is a single JSON array. Decoding validates shape record by
//! record and fails closed: a record that is missing a field, carries an
//! unknown status, or breaks a model invariant is treated as absent rather
//! than trusted. A document that is not an array at all decodes as empty.

use std::collections::HashSet;

use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::{
  Result,
  question::{Answer, Question, QuestionStatus},
  user::User,
};

// ─── Questions ───────────────────────────────────────────────────────────────

/// Wire shape of a question before its answers are checked.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuestion {
  id:         Uuid,
  author:     String,
  #[serde(default)]
  author_id:  Option<Uuid>,
  content:    String,
  status:     QuestionStatus,
  created_at: chrono::DateTime<chrono::Utc>,
  #[serde(default)]
  answers:    Vec<Value>,
}

pub fn encode_questions(questions: &[Question]) -> Result<String> {
  Ok(serde_json::to_string(questions)?)
}

/// Decode a question document, dropping every record that fails validation.
pub fn decode_questions(raw: &str) -> Vec<Question> {
  let mut seen = HashSet::new();
  array_items(raw, "question")
    .into_iter()
    .enumerate()
    .filter_map(|(index, item)| match decode_question(item) {
      Ok(q) if !seen.insert(q.id) => {
        warn!(index, id = %q.id, "dropping duplicate question record");
        None
      }
      Ok(q) => Some(q),
      Err(reason) => {
        warn!(index, %reason, "dropping malformed question record");
        None
      }
    })
    .collect()
}

fn decode_question(item: Value) -> Result<Question, String> {
  let raw: RawQuestion =
    serde_json::from_value(item).map_err(|e| e.to_string())?;

  if raw.content.trim().is_empty() {
    return Err("empty content".into());
  }

  let mut answers = Vec::with_capacity(raw.answers.len());
  for (index, item) in raw.answers.into_iter().enumerate() {
    match decode_answer(item, raw.id) {
      Ok(a) => answers.push(a),
      Err(reason) => {
        warn!(question = %raw.id, index, %reason, "dropping malformed answer record");
      }
    }
  }

  Ok(Question {
    id: raw.id,
    author: raw.author,
    author_id: raw.author_id,
    content: raw.content,
    status: raw.status,
    created_at: raw.created_at,
    answers,
  })
}

fn decode_answer(item: Value, question_id: Uuid) -> Result<Answer, String> {
  let answer: Answer = serde_json::from_value(item).map_err(|e| e.to_string())?;
  if answer.question_id != question_id {
    return Err(format!(
      "answer references question {} but is stored under {question_id}",
      answer.question_id
    ));
  }
  if answer.content.trim().is_empty() {
    return Err("empty content".into());
  }
  Ok(answer)
}

// ─── Users ───────────────────────────────────────────────────────────────────

pub fn encode_users(users: &[User]) -> Result<String> {
  Ok(serde_json::to_string(users)?)
}

pub fn decode_users(raw: &str) -> Vec<User> {
  decode_records(raw, "user")
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn decode_records<T: DeserializeOwned>(raw: &str, kind: &'static str) -> Vec<T> {
  array_items(raw, kind)
    .into_iter()
    .enumerate()
    .filter_map(|(index, item)| {
      serde_json::from_value(item)
        .map_err(|e| warn!(index, error = %e, "dropping malformed {kind} record"))
        .ok()
    })
    .collect()
}

fn array_items(raw: &str, kind: &'static str) -> Vec<Value> {
  match serde_json::from_str::<Value>(raw) {
    Ok(Value::Array(items)) => items,
    Ok(_) => {
      warn!("{kind} document is not a JSON array; treating as empty");
      Vec::new()
    }
    Err(e) => {
      warn!(error = %e, "{kind} document is not valid JSON; treating as empty");
      Vec::new()
    }
  }
}
