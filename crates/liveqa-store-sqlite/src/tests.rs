//! Integration tests for `SqliteStore` against an in-memory database.

use liveqa_core::{
  board::Board,
  question::{NewAnswer, NewQuestion, QuestionStatus},
  store::{DocumentStore, KeyValueStore, QUESTIONS_KEY, QuestionStore, USERS_KEY},
  user::UserRole,
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

// ─── Raw key-value access ────────────────────────────────────────────────────

#[tokio::test]
async fn missing_key_is_none() {
  let s = store().await;
  assert_eq!(s.get("nothing-here").await.unwrap(), None);
}

#[tokio::test]
async fn set_then_get() {
  let s = store().await;
  s.set("greeting", "hello".into()).await.unwrap();
  assert_eq!(s.get("greeting").await.unwrap().as_deref(), Some("hello"));
}

#[tokio::test]
async fn set_replaces_the_whole_value() {
  let s = store().await;
  s.set("doc", "[1,2,3]".into()).await.unwrap();
  s.set("doc", "[]".into()).await.unwrap();
  assert_eq!(s.get("doc").await.unwrap().as_deref(), Some("[]"));
  assert_eq!(s.keys().await.unwrap(), vec!["doc".to_string()]);
}

#[tokio::test]
async fn clones_share_the_connection() {
  let a = store().await;
  let b = a.clone();
  a.set("k", "v".into()).await.unwrap();
  assert_eq!(b.get("k").await.unwrap().as_deref(), Some("v"));
}

// ─── Documents ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn question_document_round_trips() {
  let docs = DocumentStore::new(store().await);
  let board = Board::with_defaults(docs.clone());

  let q = board
    .submit_question(NewQuestion::new("Is this service free to use?"))
    .await
    .unwrap();
  board
    .post_answer(q.id, NewAnswer::new("Yes, the basic tier is free."))
    .await
    .unwrap();
  board.set_status(q.id, QuestionStatus::Answered).await.unwrap();

  let loaded = docs.load_all().await;
  assert_eq!(loaded.len(), 1);
  assert_eq!(loaded[0].status, QuestionStatus::Answered);
  assert_eq!(loaded[0].answers.len(), 1);

  docs.save_all(&loaded).await.unwrap();
  assert_eq!(docs.load_all().await, loaded);
}

#[tokio::test]
async fn users_and_questions_use_separate_keys() {
  let sqlite = store().await;
  let board = Board::with_defaults(DocumentStore::new(sqlite.clone()));

  board.register("Jane Doe", "jane@example.com", UserRole::User).await.unwrap();
  board.submit_question(NewQuestion::new("hello")).await.unwrap();

  let mut keys = sqlite.keys().await.unwrap();
  keys.sort();
  let mut expected = vec![QUESTIONS_KEY.to_string(), USERS_KEY.to_string()];
  expected.sort();
  assert_eq!(keys, expected);
}

#[tokio::test]
async fn corrupt_document_reads_as_empty_board() {
  let sqlite = store().await;
  sqlite.set(QUESTIONS_KEY, "{ definitely not a list".into()).await.unwrap();

  let docs = DocumentStore::new(sqlite);
  assert!(docs.load_all().await.is_empty());
}

#[tokio::test]
async fn seeding_writes_demo_board_once() {
  let docs = DocumentStore::new(store().await);
  assert!(docs.seed_if_empty().await.unwrap());
  assert!(!docs.seed_if_empty().await.unwrap());
  assert_eq!(docs.load_all().await.len(), 2);
}

#[tokio::test]
async fn file_backed_store_survives_reopen() {
  let dir = std::env::temp_dir().join(format!("liveqa-test-{}", uuid::Uuid::new_v4()));
  std::fs::create_dir_all(&dir).unwrap();
  let path = dir.join("board.sqlite");

  {
    let board = Board::with_defaults(DocumentStore::new(SqliteStore::open(&path).await.unwrap()));
    board.submit_question(NewQuestion::new("persisted?")).await.unwrap();
  }

  let reopened = DocumentStore::new(SqliteStore::open(&path).await.unwrap());
  let questions = reopened.load_all().await;
  assert_eq!(questions.len(), 1);
  assert_eq!(questions[0].content, "persisted?");

  let _ = std::fs::remove_dir_all(&dir);
}
