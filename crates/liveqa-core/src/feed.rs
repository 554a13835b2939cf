//! Display ordering of the question feed.
//!
//! Escalated questions come first; within each partition the newest question
//! comes first. Ties on `created_at` fall back to the id, which is time-ordered,
//! so the order is total. The ordering is a pure function of the list and is
//! recomputed on every read.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::question::{Question, QuestionStatus};

/// Total order used by the feed.
pub fn feed_cmp(a: &Question, b: &Question) -> Ordering {
  b.status
    .is_escalated()
    .cmp(&a.status.is_escalated())
    .then_with(|| b.created_at.cmp(&a.created_at))
    .then_with(|| b.id.cmp(&a.id))
}

/// Sort `questions` into feed order in place.
pub fn sort_feed(questions: &mut [Question]) { questions.sort_by(feed_cmp); }

/// Return a feed-ordered copy of `questions`.
pub fn feed_order(questions: &[Question]) -> Vec<Question> {
  let mut ordered = questions.to_vec();
  sort_feed(&mut ordered);
  ordered
}

/// Number of questions in each status, for feed headers and dashboards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
  pub total:     usize,
  pub pending:   usize,
  pub answered:  usize,
  pub escalated: usize,
}

impl StatusCounts {
  pub fn tally(questions: &[Question]) -> Self {
    questions.iter().fold(Self::default(), |mut acc, q| {
      acc.total += 1;
      match q.status {
        QuestionStatus::Pending => acc.pending += 1,
        QuestionStatus::Answered => acc.answered += 1,
        QuestionStatus::Escalated => acc.escalated += 1,
      }
      acc
    })
  }
}
