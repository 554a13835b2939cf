//! Board operations: the mutations of the shared question document.
//!
//! Every mutation is a read-modify-write of the whole question list. Within
//! one process the cycles are serialised by an async lock, so two requests
//! handled concurrently cannot overwrite each other. Across processes the
//! store is last-write-wins.

use chrono::Utc;
use rand_core::{OsRng, RngCore};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
  Error, Result,
  assistant::{AnswerGenerator, AssistantError, CannedAssistant},
  feed::{StatusCounts, feed_order},
  question::{
    AI_AUTHOR, Answer, GUEST_AUTHOR, NewAnswer, NewQuestion, Question,
    QuestionStatus, SYSTEM_AUTHOR, clean_name,
  },
  store::QuestionStore,
  user::{User, UserRole},
  validate::{NonEmptyValidator, TextValidator},
};

// ─── Results ─────────────────────────────────────────────────────────────────

/// Outcome of [`Board::post_ai_answer`].
///
/// The answer is always appended. On failure it is a system notice carrying
/// the user-facing message, and `failure` holds the classified cause.
#[derive(Debug, Clone)]
pub struct AiReply {
  pub answer:  Answer,
  pub failure: Option<AssistantError>,
}

impl AiReply {
  pub fn failed(&self) -> bool { self.failure.is_some() }
}

/// Outcome of [`Board::draft_ai_answer`]. Nothing is stored.
#[derive(Debug, Clone)]
pub struct AiDraft {
  pub text:    String,
  pub failure: Option<AssistantError>,
}

// ─── Board ───────────────────────────────────────────────────────────────────

/// The question board over an injected [`QuestionStore`].
pub struct Board<S, A = CannedAssistant, V = NonEmptyValidator> {
  store:      S,
  assistant:  A,
  validator:  V,
  write_lock: Mutex<()>,
}

impl<S: QuestionStore> Board<S> {
  /// A board with the offline assistant and the non-empty validator.
  pub fn with_defaults(store: S) -> Self {
    Self::new(store, CannedAssistant, NonEmptyValidator)
  }
}

impl<S, A, V> Board<S, A, V>
where
  S: QuestionStore,
  A: AnswerGenerator,
  V: TextValidator,
{
  pub fn new(store: S, assistant: A, validator: V) -> Self {
    Self { store, assistant, validator, write_lock: Mutex::new(()) }
  }

  pub fn store(&self) -> &S { &self.store }

  // ── Reads ─────────────────────────────────────────────────────────────────

  /// The stored question list, in storage order.
  pub async fn questions(&self) -> Vec<Question> { self.store.load_all().await }

  /// The question list in feed order.
  pub async fn feed(&self) -> Vec<Question> {
    feed_order(&self.store.load_all().await)
  }

  pub async fn stats(&self) -> StatusCounts {
    StatusCounts::tally(&self.store.load_all().await)
  }

  /// One question by id. Uses the strict read, so a store outage is
  /// reported as `StoreUnavailable` rather than `NotFound`.
  pub async fn question(&self, id: Uuid) -> Result<Question> {
    self
      .store
      .load_for_update()
      .await?
      .into_iter()
      .find(|q| q.id == id)
      .ok_or(Error::NotFound(id))
  }

  // ── Questions ─────────────────────────────────────────────────────────────

  /// Validate, attribute and append a new `Pending` question.
  pub async fn submit_question(&self, input: NewQuestion) -> Result<Question> {
    if !self.validator.validate(&input.content).await {
      return Err(Error::ValidationFailed(
        "question is empty or too long".into(),
      ));
    }

    let author = match &input.user {
      Some(user) => user.username.clone(),
      None => clean_name(input.guest_name.as_deref())
        .unwrap_or_else(random_guest_name),
    };

    let question = Question {
      id: Uuid::now_v7(),
      author,
      author_id: input.user.as_ref().map(|u| u.id),
      content: input.content.trim().to_owned(),
      status: QuestionStatus::Pending,
      created_at: Utc::now(),
      answers: Vec::new(),
    };

    let stored = question.clone();
    self
      .update(move |questions| {
        questions.push(stored);
        Ok(((), true))
      })
      .await?;

    info!(id = %question.id, author = %question.author, "question submitted");
    Ok(question)
  }

  /// Overwrite a question's status. Setting the current status again is a
  /// no-op and does not rewrite the document.
  pub async fn set_status(
    &self,
    question_id: Uuid,
    status: QuestionStatus,
  ) -> Result<Question> {
    let updated = self
      .update(move |questions| {
        let question = find_mut(questions, question_id)?;
        let changed = question.status != status;
        question.status = status;
        Ok((question.clone(), changed))
      })
      .await?;

    info!(id = %question_id, %status, "question status set");
    Ok(updated)
  }

  // ── Answers ───────────────────────────────────────────────────────────────

  /// Append a human answer. The question's status is left untouched.
  pub async fn post_answer(
    &self,
    question_id: Uuid,
    input: NewAnswer,
  ) -> Result<Answer> {
    let content = input.content.trim();
    if content.is_empty() {
      return Err(Error::ValidationFailed("answer cannot be empty".into()));
    }

    let author = match &input.user {
      Some(user) => user.username.clone(),
      None => clean_name(input.guest_name.as_deref())
        .unwrap_or_else(|| GUEST_AUTHOR.to_owned()),
    };

    let answer = Answer {
      id: Uuid::now_v7(),
      question_id,
      author,
      author_id: input.user.as_ref().map(|u| u.id),
      content: content.to_owned(),
      created_at: Utc::now(),
      is_ai_generated: false,
    };
    self.append_answer(answer).await
  }

  /// A moderator reply: post the answer, then mark the question answered
  /// when `mark_answered` is set. These are two independent writes.
  pub async fn reply_as_moderator(
    &self,
    question_id: Uuid,
    input: NewAnswer,
    mark_answered: bool,
  ) -> Result<Answer> {
    let answer = self.post_answer(question_id, input).await?;
    if mark_answered {
      self.set_status(question_id, QuestionStatus::Answered).await?;
    }
    Ok(answer)
  }

  /// Ask the AI collaborator to answer and append the result.
  ///
  /// An upstream failure does not propagate: a system notice with a
  /// user-facing message is appended instead. Only `NotFound` and store
  /// errors are returned as `Err`.
  pub async fn post_ai_answer(&self, question_id: Uuid) -> Result<AiReply> {
    let question = self.question(question_id).await?;

    let (answer, failure) = match self.generate(&question.content).await {
      Ok(text) => (
        Answer {
          id: Uuid::now_v7(),
          question_id,
          author: AI_AUTHOR.to_owned(),
          author_id: None,
          content: text,
          created_at: Utc::now(),
          is_ai_generated: true,
        },
        None,
      ),
      Err(e) => {
        warn!(id = %question_id, error = %e, "AI answer failed; posting notice");
        (system_notice(question_id, e.user_message()), Some(e))
      }
    };

    let answer = self.append_answer(answer).await?;
    Ok(AiReply { answer, failure })
  }

  /// Ask the AI collaborator for a draft without storing anything.
  pub async fn draft_ai_answer(&self, question_id: Uuid) -> Result<AiDraft> {
    let question = self.question(question_id).await?;
    Ok(match self.generate(&question.content).await {
      Ok(text) => AiDraft { text, failure: None },
      Err(e) => {
        warn!(id = %question_id, error = %e, "AI draft failed");
        AiDraft { text: e.user_message().to_owned(), failure: Some(e) }
      }
    })
  }

  // ── Users ─────────────────────────────────────────────────────────────────

  /// Register a user. Emails are unique, compared case-insensitively.
  pub async fn register(
    &self,
    username: &str,
    email: &str,
    role: UserRole,
  ) -> Result<User> {
    let username = username.trim();
    let email = email.trim();
    if username.is_empty() || email.is_empty() {
      return Err(Error::ValidationFailed(
        "username and email are required".into(),
      ));
    }

    let _guard = self.write_lock.lock().await;
    let mut users = self.store.load_users().await?;
    if users.iter().any(|u| u.email.eq_ignore_ascii_case(email)) {
      return Err(Error::Conflict(format!("email {email} is already registered")));
    }

    let user = User {
      id: Uuid::now_v7(),
      username: username.to_owned(),
      email: email.to_owned(),
      role,
      created_at: Utc::now(),
    };
    users.push(user.clone());
    self.store.save_users(&users).await?;

    info!(id = %user.id, username = %user.username, "user registered");
    Ok(user)
  }

  /// Look a user up by email. No credential is checked.
  pub async fn login(&self, email: &str) -> Result<User> {
    let email = email.trim();
    self
      .store
      .load_users()
      .await?
      .into_iter()
      .find(|u| u.email.eq_ignore_ascii_case(email))
      .ok_or_else(|| Error::UserNotFound(email.to_owned()))
  }

  pub async fn user(&self, id: Uuid) -> Result<Option<User>> {
    Ok(self.store.load_users().await?.into_iter().find(|u| u.id == id))
  }

  // ── Internals ─────────────────────────────────────────────────────────────

  /// One read-modify-write cycle. `f` reports whether it changed anything;
  /// unchanged lists are not written back.
  async fn update<T, F>(&self, f: F) -> Result<T>
  where
    F: FnOnce(&mut Vec<Question>) -> Result<(T, bool)> + Send,
    T: Send,
  {
    let _guard = self.write_lock.lock().await;
    let mut questions = self.store.load_for_update().await?;
    let (out, changed) = f(&mut questions)?;
    if changed {
      self.store.save_all(&questions).await?;
    } else {
      debug!("mutation left the document unchanged; skipping write");
    }
    Ok(out)
  }

  async fn append_answer(&self, answer: Answer) -> Result<Answer> {
    let question_id = answer.question_id;
    let stored = answer.clone();
    self
      .update(move |questions| {
        find_mut(questions, question_id)?.answers.push(stored);
        Ok(((), true))
      })
      .await?;

    info!(
      id = %answer.id,
      question = %question_id,
      author = %answer.author,
      ai = answer.is_ai_generated,
      "answer posted"
    );
    Ok(answer)
  }

  async fn generate(&self, question: &str) -> Result<String, AssistantError> {
    let text = self.assistant.generate_answer(question).await?;
    let text = text.trim();
    if text.is_empty() {
      return Err(AssistantError::Malformed("empty answer".into()));
    }
    Ok(text.to_owned())
  }
}

fn find_mut(questions: &mut [Question], id: Uuid) -> Result<&mut Question> {
  questions
    .iter_mut()
    .find(|q| q.id == id)
    .ok_or(Error::NotFound(id))
}

fn system_notice(question_id: Uuid, message: &str) -> Answer {
  Answer {
    id: Uuid::now_v7(),
    question_id,
    author: SYSTEM_AUTHOR.to_owned(),
    author_id: None,
    content: message.to_owned(),
    created_at: Utc::now(),
    is_ai_generated: false,
  }
}

/// `Guest_<0..=999>`, used when a guest gives no name.
pub fn random_guest_name() -> String {
  format!("Guest_{}", OsRng.next_u32() % 1000)
}
