//! Plain-text rendering of questions for the terminal.

use std::fmt::Write as _;

use chrono::{DateTime, Local, Utc};
use liveqa_core::{
  feed::StatusCounts,
  question::{Answer, Question, QuestionStatus},
  user::User,
};

fn when(at: DateTime<Utc>) -> String {
  at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

fn badge(status: QuestionStatus) -> &'static str {
  match status {
    QuestionStatus::Pending => "[pending]  ",
    QuestionStatus::Answered => "[answered] ",
    QuestionStatus::Escalated => "[ESCALATED]",
  }
}

/// Header line with per-status counts.
pub fn summary(counts: &StatusCounts) -> String {
  format!(
    "{} questions: {} pending, {} answered, {} escalated",
    counts.total, counts.pending, counts.answered, counts.escalated
  )
}

pub fn answer(a: &Answer) -> String {
  let tag = if a.is_ai_generated {
    " (AI)"
  } else if a.is_system_notice() {
    " (notice)"
  } else {
    ""
  };
  format!("    ↳ {}{}: {}", a.author, tag, a.content)
}

/// One question with its answers, oldest answer first.
pub fn question(q: &Question) -> String {
  let mut out = format!("{} {}\n", badge(q.status), q.content);
  let _ = writeln!(out, "    by {} at {}  id {}", q.author, when(q.created_at), q.id);
  for a in &q.answers {
    let _ = writeln!(out, "{}", answer(a));
  }
  out
}

/// The whole feed, in the order given, under a summary header.
pub fn feed(questions: &[Question]) -> String {
  let mut out = summary(&StatusCounts::tally(questions));
  out.push('\n');
  if questions.is_empty() {
    out.push_str("\n(no questions yet)\n");
  }
  for q in questions {
    out.push('\n');
    out.push_str(&question(q));
  }
  out
}

pub fn user(u: &User) -> String {
  format!("{} <{}> ({:?}) id {}", u.username, u.email, u.role, u.id)
}
