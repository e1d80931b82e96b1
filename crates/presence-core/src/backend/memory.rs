//! In-process backend.
//!
//! Liveness markers are expiry deadlines checked lazily on read, so the
//! backend clock (here `tokio::time`) stays the single source of truth and
//! paused-clock tests behave deterministically. Topics fan out over broadcast
//! channels. Useful for tests and single-process deployments.

use crate::backend::{Backend, Subscription};
use crate::error::BackendError;
use crate::types::Identifier;
use async_trait::async_trait;
use dashmap::DashMap;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::Instant;

/// Per-topic broadcast capacity
const TOPIC_CAPACITY: usize = 256;
/// Subscription forwarding channel capacity
const FEED_CAPACITY: usize = 64;

/// In-memory [`Backend`] implementation.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    /// Liveness marker deadlines by identifier
    markers: DashMap<Identifier, Instant>,
    /// Fan-out senders by topic name
    topics: DashMap<String, broadcast::Sender<Vec<u8>>>,
}

impl MemoryBackend {
    /// Create an empty backend
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of markers currently held, expired ones included
    #[must_use]
    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    fn topic_sender(&self, topic: &str) -> broadcast::Sender<Vec<u8>> {
        self.topics
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(TOPIC_CAPACITY).0)
            .clone()
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn refresh(&self, ids: &[Identifier], ttl: Duration) -> Result<(), BackendError> {
        let deadline = Instant::now() + ttl;
        for id in ids {
            self.markers.insert(id.clone(), deadline);
        }
        Ok(())
    }

    async fn exists(&self, ids: &[Identifier]) -> Result<Vec<bool>, BackendError> {
        let now = Instant::now();
        let live = ids
            .iter()
            .map(|id| {
                let is_live = self
                    .markers
                    .get(id)
                    .is_some_and(|deadline| *deadline > now);
                if !is_live {
                    // Lazy expiry: drop the marker on first read past its deadline
                    self.markers.remove_if(id, |_, deadline| *deadline <= now);
                }
                is_live
            })
            .collect();
        Ok(live)
    }

    async fn delete(&self, ids: &[Identifier]) -> Result<(), BackendError> {
        for id in ids {
            self.markers.remove(id);
        }
        Ok(())
    }

    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), BackendError> {
        // A send error only means nobody is subscribed right now
        let _ = self.topic_sender(topic).send(payload.to_vec());
        Ok(())
    }

    async fn subscribe(&self, topic: &str) -> Result<Subscription, BackendError> {
        let mut feed = self.topic_sender(topic).subscribe();
        let (tx, messages) = mpsc::channel(FEED_CAPACITY);
        let (stop_tx, mut stop_rx) = oneshot::channel();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    msg = feed.recv() => match msg {
                        Ok(payload) => {
                            if tx.send(Ok(payload)).await.is_err() {
                                break;
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "Memory backend subscription lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
            }
        });

        Ok(Subscription::new(messages, stop_tx))
    }
}
