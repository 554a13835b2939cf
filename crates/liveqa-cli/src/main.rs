//! `liveqa`: command-line client for the live Q&A board.
//!
//! # Usage
//!
//! ```text
//! liveqa --url http://localhost:8080 feed
//! liveqa ask "Is this service free to use?" --name Ana
//! liveqa --user <id> answer <question-id> "Yes, the basic tier is free." --resolve
//! liveqa watch --interval-ms 2000
//! ```

mod client;
mod render;

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use liveqa_core::{
  question::QuestionStatus,
  sync::{DEFAULT_POLL_INTERVAL, FeedSync},
};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

const DEFAULT_URL: &str = "http://localhost:8080";

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "liveqa", about = "Command-line client for the live Q&A board")]
struct Args {
  /// Path to a TOML config file (url, user).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the server (default: http://localhost:8080).
  #[arg(long, env = "LIVEQA_URL")]
  url: Option<String>,

  /// Id of the registered user to act as. Omit to act as a guest.
  #[arg(long, env = "LIVEQA_USER")]
  user: Option<Uuid>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Print the feed once.
  Feed {
    /// Only show questions in this status.
    #[arg(long)]
    status: Option<QuestionStatus>,
  },
  /// Follow the feed, reprinting it whenever it changes. Ctrl-C stops.
  Watch {
    #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL.as_millis() as u64)]
    interval_ms: u64,
  },
  /// Print one question with its answers.
  Show { id: Uuid },
  /// Submit a question.
  Ask {
    content: String,
    /// Display name when asking as a guest.
    #[arg(long)]
    name:    Option<String>,
  },
  /// Answer a question.
  Answer {
    id:      Uuid,
    content: String,
    #[arg(long)]
    name:    Option<String>,
    /// Also mark the question answered (admins only; the default for admins).
    #[arg(long)]
    resolve: bool,
  },
  /// Ask the AI assistant to answer a question.
  AiAnswer { id: Uuid },
  /// Set a question's status (admins only).
  Status { id: Uuid, status: QuestionStatus },
  /// Register a new user.
  Register { username: String, email: String },
  /// Look up a registered user by email and print their id.
  Login { email: String },
  /// Print per-status counts.
  Stats,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:  String,
  #[serde(default)]
  user: Option<Uuid>,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags and env override the config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url: args
      .url
      .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
      .unwrap_or_else(|| DEFAULT_URL.to_string()),
    user:     args.user.or(file_cfg.user),
  };

  let client = ApiClient::new(api_config)?;
  run(client, args.command).await
}

async fn run(client: ApiClient, command: Command) -> Result<()> {
  match command {
    Command::Feed { status } => {
      let questions = client.list_questions(status).await?;
      print!("{}", render::feed(&questions));
    }
    Command::Watch { interval_ms } => watch(client, Duration::from_millis(interval_ms)).await?,
    Command::Show { id } => print!("{}", render::question(&client.get_question(id).await?)),
    Command::Ask { content, name } => {
      let q = client.ask(&content, name.as_deref()).await?;
      println!("asked as {}: {}", q.author, q.id);
    }
    Command::Answer { id, content, name, resolve } => {
      let a = client
        .answer(id, &content, name.as_deref(), resolve.then_some(true))
        .await?;
      println!("{}", render::answer(&a));
    }
    Command::AiAnswer { id } => {
      let reply = client.ai_answer(id).await?;
      println!("{}", render::answer(&reply.answer));
      if reply.failed {
        eprintln!(
          "AI answer failed{}; a notice was posted instead",
          if reply.rate_limited { " (rate limited)" } else { "" }
        );
      }
    }
    Command::Status { id, status } => {
      let q = client.set_status(id, status).await?;
      println!("{} is now {}", q.id, q.status);
    }
    Command::Register { username, email } => {
      let user = client.register(&username, &email).await?;
      println!("{}", render::user(&user));
      println!("export LIVEQA_USER={}", user.id);
    }
    Command::Login { email } => {
      let user = client.login(&email).await?;
      println!("{}", render::user(&user));
      println!("export LIVEQA_USER={}", user.id);
    }
    Command::Stats => println!("{}", render::summary(&client.stats().await?)),
  }
  Ok(())
}

/// Poll the feed until Ctrl-C, redrawing on every published change.
async fn watch(client: ApiClient, period: Duration) -> Result<()> {
  let sync = FeedSync::start(Arc::new(client), period);
  let mut rx = sync.subscribe();

  // The loop's first poll is immediate; draw whatever is current until then.
  redraw(&rx.borrow_and_update());

  let ctrl_c = tokio::signal::ctrl_c();
  tokio::pin!(ctrl_c);

  loop {
    tokio::select! {
      changed = rx.changed() => {
        if changed.is_err() {
          break;
        }
        let snapshot = rx.borrow_and_update().clone();
        redraw(&snapshot);
      }
      signal = &mut ctrl_c => {
        signal.context("listening for Ctrl-C")?;
        break;
      }
    }
  }

  sync.stop().await;
  Ok(())
}

fn redraw(questions: &[liveqa_core::question::Question]) {
  // Clear the screen and home the cursor.
  print!("\x1b[2J\x1b[H{}", render::feed(questions));
}
