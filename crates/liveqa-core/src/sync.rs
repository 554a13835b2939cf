//! Keeping a view's snapshot in step with the shared store.
//!
//! There are no push notifications. Each view owns a [`FeedSync`], a tokio
//! task that reloads the question list on a fixed period and publishes the
//! feed-ordered result through a [`watch`] channel, but only when it differs
//! from what the view already holds. Other writers' changes therefore become
//! visible within one period.
//!
//! The loop lives exactly as long as the view: [`FeedSync::stop`] ends it
//! cleanly, and dropping the handle aborts the task.

use std::{future::Future, sync::Arc, time::Duration};

use tokio::{
  sync::{oneshot, watch},
  task::JoinHandle,
  time::MissedTickBehavior,
};
use tracing::{debug, warn};

use crate::{
  Error, Result,
  assistant::AnswerGenerator,
  board::Board,
  feed::feed_order,
  question::Question,
  store::{DocumentStore, KeyValueStore, QuestionStore},
  validate::TextValidator,
};

/// Poll period used when the caller has no preference.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// An immutable, shareable feed snapshot.
pub type Snapshot = Arc<Vec<Question>>;

// ─── Source ──────────────────────────────────────────────────────────────────

/// Anything a view can poll for the current question list.
pub trait FeedSource: Send + Sync {
  type Error: std::fmt::Display + Send + 'static;

  fn load_feed(
    &self,
  ) -> impl Future<Output = Result<Vec<Question>, Self::Error>> + Send + '_;
}

// In-process sources use the strict read; an outage keeps the previous
// snapshot rather than publishing an empty board.

impl<K: KeyValueStore> FeedSource for DocumentStore<K> {
  type Error = Error;

  async fn load_feed(&self) -> Result<Vec<Question>> { self.load_for_update().await }
}

impl<S, A, V> FeedSource for Board<S, A, V>
where
  S: QuestionStore,
  A: AnswerGenerator,
  V: TextValidator,
{
  type Error = Error;

  async fn load_feed(&self) -> Result<Vec<Question>> {
    self.store().load_for_update().await
  }
}

impl<T: FeedSource> FeedSource for Arc<T> {
  type Error = T::Error;

  fn load_feed(
    &self,
  ) -> impl Future<Output = Result<Vec<Question>, Self::Error>> + Send + '_ {
    (**self).load_feed()
  }
}

// ─── Loop ────────────────────────────────────────────────────────────────────

/// A running poll loop bound to one view.
pub struct FeedSync<F> {
  source:   Arc<F>,
  tx:       Arc<watch::Sender<Snapshot>>,
  shutdown: Option<oneshot::Sender<()>>,
  task:     Option<JoinHandle<()>>,
}

impl<F> FeedSync<F>
where
  F: FeedSource + 'static,
{
  /// Start polling `source` every `period`. The first poll happens
  /// immediately. Must be called from within a tokio runtime.
  pub fn start(source: Arc<F>, period: Duration) -> Self {
    let (tx, _) = watch::channel(Snapshot::default());
    let tx = Arc::new(tx);
    let (shutdown, mut stopped) = oneshot::channel();

    let task = tokio::spawn({
      let source = Arc::clone(&source);
      let tx = Arc::clone(&tx);
      async move {
        let mut interval = tokio::time::interval(period.max(Duration::from_millis(1)));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
          tokio::select! {
            biased;
            _ = &mut stopped => break,
            _ = interval.tick() => {
              poll_once(&*source, &tx).await;
            }
          }
        }
        debug!("feed sync stopped");
      }
    });

    Self { source, tx, shutdown: Some(shutdown), task: Some(task) }
  }

  /// The latest published snapshot.
  pub fn snapshot(&self) -> Snapshot { Arc::clone(&self.tx.borrow()) }

  /// A receiver notified on every published change.
  pub fn subscribe(&self) -> watch::Receiver<Snapshot> { self.tx.subscribe() }

  /// Reload now instead of waiting for the next tick, e.g. right after this
  /// view wrote to the store. Returns `true` if a new snapshot was published.
  pub async fn refresh(&self) -> bool { poll_once(&*self.source, &self.tx).await }

  pub fn is_running(&self) -> bool {
    self.task.as_ref().is_some_and(|t| !t.is_finished())
  }

  /// Stop the loop and wait for it to exit. No tick runs after this returns.
  pub async fn stop(mut self) {
    if let Some(shutdown) = self.shutdown.take() {
      let _ = shutdown.send(());
    }
    if let Some(task) = self.task.take() {
      let _ = task.await;
    }
  }
}

impl<F> Drop for FeedSync<F> {
  fn drop(&mut self) {
    if let Some(task) = self.task.take() {
      task.abort();
    }
  }
}

/// Load, order, and publish if different. Errors keep the old snapshot.
async fn poll_once<F: FeedSource>(source: &F, tx: &watch::Sender<Snapshot>) -> bool {
  match source.load_feed().await {
    Ok(questions) => publish(tx, feed_order(&questions)),
    Err(e) => {
      warn!(error = %e, "feed poll failed; keeping previous snapshot");
      false
    }
  }
}

fn publish(tx: &watch::Sender<Snapshot>, fresh: Vec<Question>) -> bool {
  tx.send_if_modified(move |current| {
    if **current == fresh {
      false
    } else {
      *current = Arc::new(fresh);
      true
    }
  })
}
