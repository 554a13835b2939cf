//! Test doubles shared by the unit tests.

use std::sync::{
  Arc,
  atomic::{AtomicBool, AtomicUsize, Ordering},
};

use crate::store::{KeyValueStore, MemoryStore};

#[derive(Debug, thiserror::Error)]
#[error("backend unreachable")]
pub struct Unreachable;

/// A [`MemoryStore`] whose reads can be switched off at runtime. Writes
/// always succeed and are counted, so a test can tell "no write happened"
/// apart from "write failed".
#[derive(Debug, Clone, Default)]
pub struct FlakyStore {
  inner:      MemoryStore,
  reads_fail: Arc<AtomicBool>,
  sets:       Arc<AtomicUsize>,
}

impl FlakyStore {
  pub fn new() -> Self { Self::default() }

  pub fn fail_reads(&self, fail: bool) { self.reads_fail.store(fail, Ordering::SeqCst); }

  pub fn sets(&self) -> usize { self.sets.load(Ordering::SeqCst) }
}

impl KeyValueStore for FlakyStore {
  type Error = Unreachable;

  async fn get(&self, key: &str) -> Result<Option<String>, Unreachable> {
    if self.reads_fail.load(Ordering::SeqCst) {
      return Err(Unreachable);
    }
    self.inner.get(key).await.map_err(|_| Unreachable)
  }

  async fn set(&self, key: &str, value: String) -> Result<(), Unreachable> {
    self.sets.fetch_add(1, Ordering::SeqCst);
    self.inner.set(key, value).await.map_err(|_| Unreachable)
  }
}
