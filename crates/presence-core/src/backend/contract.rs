//! The contract every durable store must satisfy.

use crate::error::BackendError;
use crate::types::Identifier;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

/// A single delivery from a backend subscription.
///
/// An `Err` item means the subscription broke; the channel closes right after.
pub type SubscriptionItem = Result<Vec<u8>, BackendError>;

/// Live subscription to a pub/sub topic.
///
/// A closed `messages` channel means the feed ended. Cancelling (or dropping
/// the handle) asks the backend to unsubscribe and stop the feed.
pub struct Subscription {
    messages: mpsc::Receiver<SubscriptionItem>,
    stop: Option<oneshot::Sender<()>>,
}

impl Subscription {
    /// Couple a message channel with its stop signal
    #[must_use]
    pub fn new(messages: mpsc::Receiver<SubscriptionItem>, stop: oneshot::Sender<()>) -> Self {
        Self {
            messages,
            stop: Some(stop),
        }
    }

    /// Receive the next raw payload; `None` means the feed ended
    pub async fn recv(&mut self) -> Option<SubscriptionItem> {
        self.messages.recv().await
    }

    /// Ask the backend to tear down the feed. Idempotent.
    pub fn cancel(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("cancelled", &self.stop.is_none())
            .finish()
    }
}

/// Durable store providing TTL-bearing liveness markers and pub/sub.
///
/// Adapters own their transport: connection pooling, serialization of a
/// non-concurrent wire protocol, and any retry policy happen below this
/// contract without changing its observable semantics. The session never
/// retries.
#[async_trait]
pub trait Backend: Send + Sync + 'static {
    /// Create-or-renew liveness markers for all ids in one round trip.
    ///
    /// Semantics per id: set if absent or overwrite, with the given expiry,
    /// confirmed by the store before this returns.
    async fn refresh(&self, ids: &[Identifier], ttl: Duration) -> Result<(), BackendError>;

    /// Ordered batch existence check: one boolean per input id, duplicates
    /// keeping their slots. Missing or expired markers report `false`.
    async fn exists(&self, ids: &[Identifier]) -> Result<Vec<bool>, BackendError>;

    /// Unconditionally remove liveness markers. Removing a marker that does
    /// not exist is not an error.
    async fn delete(&self, ids: &[Identifier]) -> Result<(), BackendError>;

    /// Publish a raw payload on a topic.
    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), BackendError>;

    /// Open a live subscription to a topic.
    async fn subscribe(&self, topic: &str) -> Result<Subscription, BackendError>;

    /// Release the underlying connection. Pooled backends have nothing to do.
    async fn close(&self) -> Result<(), BackendError> {
        Ok(())
    }
}

/// Sessions on one process can share a single backend instance.
#[async_trait]
impl<B: Backend + ?Sized> Backend for Arc<B> {
    async fn refresh(&self, ids: &[Identifier], ttl: Duration) -> Result<(), BackendError> {
        (**self).refresh(ids, ttl).await
    }

    async fn exists(&self, ids: &[Identifier]) -> Result<Vec<bool>, BackendError> {
        (**self).exists(ids).await
    }

    async fn delete(&self, ids: &[Identifier]) -> Result<(), BackendError> {
        (**self).delete(ids).await
    }

    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), BackendError> {
        (**self).publish(topic, payload).await
    }

    async fn subscribe(&self, topic: &str) -> Result<Subscription, BackendError> {
        (**self).subscribe(topic).await
    }

    async fn close(&self) -> Result<(), BackendError> {
        (**self).close().await
    }
}
