//! SQLite backend for the live Q&A board.
//!
//! Implements [`liveqa_core::store::KeyValueStore`] over a single table.
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime.

mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
