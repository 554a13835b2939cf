//! Wiring for the `liveqa-server` binary.
//!
//! Turns a [`ServerConfig`] into a running [`Board`]: picks the storage
//! backend, picks the AI collaborator, and mounts the API under `/api`.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use axum::{Router, routing::get};
use liveqa_core::{
  assistant::{AnswerGenerator, AssistantError, CannedAssistant},
  board::Board,
  store::{DocumentStore, KeyValueStore, MemoryStore, MemoryStoreError},
  validate::MaxLengthValidator,
};
use liveqa_gemini::{GeminiAssistant, GeminiConfig};
use liveqa_store_sqlite::SqliteStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::info;

/// The board type served by the binary.
pub type AppBoard =
  Board<DocumentStore<ConfiguredStore>, ConfiguredAssistant, MaxLengthValidator>;

// ─── Configuration ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
  #[default]
  Sqlite,
  Memory,
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 8080 }
fn default_store_path() -> PathBuf { PathBuf::from("liveqa.sqlite") }
fn default_max_question_len() -> usize { 2000 }

/// Runtime server configuration, deserialised from `config.toml` with
/// `LIVEQA_*` environment overrides (`LIVEQA_GEMINI__API_KEY` for nested
/// keys).
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:             String,
  #[serde(default = "default_port")]
  pub port:             u16,
  #[serde(default)]
  pub backend:          Backend,
  #[serde(default = "default_store_path")]
  pub store_path:       PathBuf,
  /// Write the demo board into a completely empty store at startup.
  #[serde(default)]
  pub seed:             bool,
  #[serde(default = "default_max_question_len")]
  pub max_question_len: usize,
  #[serde(default)]
  pub gemini:           GeminiConfig,
}

impl ServerConfig {
  /// Read `path` (optional) layered under the environment.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    Self::from_source(config::File::from(path).required(false))
  }

  pub fn from_source<T>(file: T) -> Result<Self, config::ConfigError>
  where
    T: config::Source + Send + Sync + 'static,
  {
    config::Config::builder()
      .add_source(file)
      .add_source(
        config::Environment::with_prefix("LIVEQA")
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      )
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Storage backend ──────────────────────────────────────────────────────────

/// The key-value backend chosen at startup.
#[derive(Clone)]
pub enum ConfiguredStore {
  Sqlite(SqliteStore),
  Memory(MemoryStore),
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
  #[error(transparent)]
  Sqlite(#[from] liveqa_store_sqlite::Error),
  #[error(transparent)]
  Memory(#[from] MemoryStoreError),
}

impl KeyValueStore for ConfiguredStore {
  type Error = StoreError;

  async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
    Ok(match self {
      Self::Sqlite(s) => s.get(key).await?,
      Self::Memory(m) => m.get(key).await?,
    })
  }

  async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
    match self {
      Self::Sqlite(s) => s.set(key, value).await?,
      Self::Memory(m) => m.set(key, value).await?,
    }
    Ok(())
  }
}

impl ConfiguredStore {
  pub async fn open(config: &ServerConfig) -> anyhow::Result<Self> {
    match config.backend {
      Backend::Memory => {
        info!("using in-memory store; nothing will be persisted");
        Ok(Self::Memory(MemoryStore::new()))
      }
      Backend::Sqlite => {
        let path = expand_tilde(&config.store_path);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
          std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {parent:?}"))?;
        }
        let store = SqliteStore::open(&path)
          .await
          .with_context(|| format!("failed to open store at {path:?}"))?;
        info!(path = %path.display(), "opened SQLite store");
        Ok(Self::Sqlite(store))
      }
    }
  }
}

// ─── AI collaborator ──────────────────────────────────────────────────────────

/// Gemini when an API key is configured, the offline assistant otherwise.
#[derive(Debug, Clone)]
pub enum ConfiguredAssistant {
  Canned(CannedAssistant),
  Gemini(GeminiAssistant),
}

impl ConfiguredAssistant {
  pub fn from_config(config: &GeminiConfig) -> Result<Self, AssistantError> {
    if config.has_api_key() {
      info!(model = %config.model, "AI answers use Gemini");
      Ok(Self::Gemini(GeminiAssistant::new(config.clone())?))
    } else {
      info!("no Gemini API key configured; AI answers use the offline message");
      Ok(Self::Canned(CannedAssistant))
    }
  }
}

impl AnswerGenerator for ConfiguredAssistant {
  async fn generate_answer(&self, question: &str) -> Result<String, AssistantError> {
    match self {
      Self::Canned(c) => c.generate_answer(question).await,
      Self::Gemini(g) => g.generate_answer(question).await,
    }
  }
}

// ─── Assembly ─────────────────────────────────────────────────────────────────

/// Open the configured store, seed it if asked, and build the board.
pub async fn build_board(config: &ServerConfig) -> anyhow::Result<Arc<AppBoard>> {
  let store = DocumentStore::new(ConfiguredStore::open(config).await?);
  if config.seed && store.seed_if_empty().await.context("failed to seed store")? {
    info!("store was empty; wrote demo board");
  }

  let assistant = ConfiguredAssistant::from_config(&config.gemini)
    .context("failed to build AI client")?;
  let validator = MaxLengthValidator::new(config.max_question_len);

  Ok(Arc::new(Board::new(store, assistant, validator)))
}

/// The top-level router: the API under `/api` plus a liveness check.
pub fn app(board: Arc<AppBoard>) -> Router {
  Router::new()
    .nest("/api", liveqa_api::api_router(board))
    .route("/health", get(|| async { "ok" }))
    .layer(TraceLayer::new_for_http())
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
