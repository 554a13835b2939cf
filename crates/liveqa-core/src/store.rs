//! The persistence boundary.
//!
//! Two layers live here:
//!
//! - [`KeyValueStore`] is the raw backend contract: `get`/`set` of serialized
//!   documents by key. Backends (`liveqa-store-sqlite`, [`MemoryStore`])
//!   implement only this.
//! - [`QuestionStore`] is the whole-document abstraction the board depends
//!   on. [`DocumentStore`] implements it over any key-value backend.
//!
//! There is no row-level update. Every mutation reads the whole question
//! list, changes it in memory, and writes the whole list back.

use std::{
  collections::HashMap,
  future::Future,
  sync::{Arc, Mutex},
};

use chrono::{Duration, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
  Error, Result,
  document::{decode_questions, decode_users, encode_questions, encode_users},
  question::{Answer, Question, QuestionStatus},
  user::{User, UserRole},
};

/// Key holding the question list.
pub const QUESTIONS_KEY: &str = "liveqa_questions";

/// Key holding the user records.
pub const USERS_KEY: &str = "liveqa_users";

// ─── Key-value backend ───────────────────────────────────────────────────────

/// A key-value backend holding serialized documents.
///
/// All methods return `Send` futures so implementations can be shared across
/// a multi-threaded runtime.
pub trait KeyValueStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Fetch the document stored under `key`, or `None` if it was never set.
  fn get<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + 'a;

  /// Replace the document stored under `key`.
  fn set<'a>(
    &'a self,
    key: &'a str,
    value: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

/// A process-local backend. Cloning shares the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  entries: Arc<Mutex<HashMap<String, String>>>,
}

/// The memory backend never fails; this exists only to satisfy the trait.
#[derive(Debug, thiserror::Error)]
#[error("memory store lock poisoned")]
pub struct MemoryStoreError;

impl MemoryStore {
  pub fn new() -> Self { Self::default() }
}

impl KeyValueStore for MemoryStore {
  type Error = MemoryStoreError;

  async fn get(&self, key: &str) -> Result<Option<String>, MemoryStoreError> {
    let entries = self.entries.lock().map_err(|_| MemoryStoreError)?;
    Ok(entries.get(key).cloned())
  }

  async fn set(&self, key: &str, value: String) -> Result<(), MemoryStoreError> {
    let mut entries = self.entries.lock().map_err(|_| MemoryStoreError)?;
    entries.insert(key.to_owned(), value);
    Ok(())
  }
}

// ─── Document store ──────────────────────────────────────────────────────────

/// Whole-document access to the question list and the user records.
pub trait QuestionStore: Send + Sync {
  /// Current question list. Never fails: an absent document is an empty
  /// board, and an unreachable backend degrades to an empty board too.
  fn load_all(&self) -> impl Future<Output = Vec<Question>> + Send + '_;

  /// Strict read for read-modify-write cycles. A backend failure is reported
  /// instead of being mistaken for an empty board.
  fn load_for_update(
    &self,
  ) -> impl Future<Output = Result<Vec<Question>>> + Send + '_;

  /// Replace the entire stored question list.
  fn save_all<'a>(
    &'a self,
    questions: &'a [Question],
  ) -> impl Future<Output = Result<()>> + Send + 'a;

  fn load_users(&self) -> impl Future<Output = Result<Vec<User>>> + Send + '_;

  fn save_users<'a>(
    &'a self,
    users: &'a [User],
  ) -> impl Future<Output = Result<()>> + Send + 'a;
}

/// [`QuestionStore`] over any [`KeyValueStore`], one JSON document per key.
///
/// Cloning is cheap when the backend is.
#[derive(Debug, Clone)]
pub struct DocumentStore<K> {
  backend: K,
}

impl<K: KeyValueStore> DocumentStore<K> {
  pub fn new(backend: K) -> Self { Self { backend } }

  pub fn backend(&self) -> &K { &self.backend }

  /// Write a small demo board, but only into a completely fresh store.
  ///
  /// Returns `true` if anything was written.
  pub async fn seed_if_empty(&self) -> Result<bool> {
    let questions = self.backend.get(QUESTIONS_KEY).await.map_err(Error::store)?;
    let users = self.backend.get(USERS_KEY).await.map_err(Error::store)?;
    if questions.is_some() || users.is_some() {
      return Ok(false);
    }

    let (users, questions) = demo_board();
    self.save_users(&users).await?;
    self.save_all(&questions).await?;
    info!(users = users.len(), questions = questions.len(), "seeded empty store");
    Ok(true)
  }
}

impl<K: KeyValueStore> QuestionStore for DocumentStore<K> {
  async fn load_all(&self) -> Vec<Question> {
    match self.load_for_update().await {
      Ok(questions) => questions,
      Err(e) => {
        warn!(error = %e, "question store unreadable; showing an empty board");
        Vec::new()
      }
    }
  }

  async fn load_for_update(&self) -> Result<Vec<Question>> {
    let raw = self.backend.get(QUESTIONS_KEY).await.map_err(Error::store)?;
    Ok(raw.as_deref().map(decode_questions).unwrap_or_default())
  }

  async fn save_all(&self, questions: &[Question]) -> Result<()> {
    let doc = encode_questions(questions)?;
    self.backend.set(QUESTIONS_KEY, doc).await.map_err(Error::store)
  }

  async fn load_users(&self) -> Result<Vec<User>> {
    let raw = self.backend.get(USERS_KEY).await.map_err(Error::store)?;
    Ok(raw.as_deref().map(decode_users).unwrap_or_default())
  }

  async fn save_users(&self, users: &[User]) -> Result<()> {
    let doc = encode_users(users)?;
    self.backend.set(USERS_KEY, doc).await.map_err(Error::store)
  }
}

impl<T: QuestionStore> QuestionStore for Arc<T> {
  fn load_all(&self) -> impl Future<Output = Vec<Question>> + Send + '_ {
    (**self).load_all()
  }

  fn load_for_update(
    &self,
  ) -> impl Future<Output = Result<Vec<Question>>> + Send + '_ {
    (**self).load_for_update()
  }

  fn save_all<'a>(
    &'a self,
    questions: &'a [Question],
  ) -> impl Future<Output = Result<()>> + Send + 'a {
    (**self).save_all(questions)
  }

  fn load_users(&self) -> impl Future<Output = Result<Vec<User>>> + Send + '_ {
    (**self).load_users()
  }

  fn save_users<'a>(
    &'a self,
    users: &'a [User],
  ) -> impl Future<Output = Result<()>> + Send + 'a {
    (**self).save_users(users)
  }
}

// ─── Seed data ───────────────────────────────────────────────────────────────

fn demo_board() -> (Vec<User>, Vec<Question>) {
  let now = Utc::now();
  let admin = User {
    id:         Uuid::now_v7(),
    username:   "Admin User".into(),
    email:      "admin@qna.com".into(),
    role:       UserRole::Admin,
    created_at: now,
  };
  let member = User {
    id:         Uuid::now_v7(),
    username:   "Jane Doe".into(),
    email:      "jane@example.com".into(),
    role:       UserRole::User,
    created_at: now,
  };

  let reset = Question {
    id:         Uuid::now_v7(),
    author:     member.username.clone(),
    author_id:  Some(member.id),
    content:    "How do I reset my password?".into(),
    status:     QuestionStatus::Pending,
    created_at: now - Duration::seconds(10_000),
    answers:    vec![],
  };

  let free_id = Uuid::now_v7();
  let free = Question {
    id:         free_id,
    author:     "Guest_102".into(),
    author_id:  None,
    content:    "Is this service free to use?".into(),
    status:     QuestionStatus::Answered,
    created_at: now - Duration::seconds(5_000),
    answers:    vec![Answer {
      id:              Uuid::now_v7(),
      question_id:     free_id,
      author:          admin.username.clone(),
      author_id:       Some(admin.id),
      content:         "Yes, the basic tier is completely free!".into(),
      created_at:      now,
      is_ai_generated: false,
    }],
  };

  (vec![admin, member], vec![reset, free])
}
