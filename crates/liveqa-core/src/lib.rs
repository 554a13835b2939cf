//! Core types and operations for the live Q&A board.
//!
//! No HTTP or database code lives here. The crate owns the question/answer
//! model, the whole-document store contract, the board operations that
//! mutate it, feed ordering, and the polling loop that keeps a view in sync
//! with the shared store.

// Trait futures spell out their `Send` bounds where callers need them.
#![allow(async_fn_in_trait)]

pub mod assistant;
pub mod board;
pub mod document;
pub mod error;
pub mod feed;
pub mod question;
pub mod store;
pub mod sync;
pub mod user;
pub mod validate;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
