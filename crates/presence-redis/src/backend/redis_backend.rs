//! Redis backend: pooled connections for commands, a dedicated pub/sub
//! connection per subscription.
//!
//! Liveness markers are plain keys set with a millisecond expiry; Redis's own
//! clock drives every transition to offline.

use crate::pool::{RedisPool, RedisPoolConfig};
use async_trait::async_trait;
use futures_util::StreamExt;
use presence_core::{Backend, BackendError, Identifier, Subscription};
use redis::AsyncCommands;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

/// Default key namespace for liveness markers
pub const MARKER_PREFIX: &str = "presence:";

/// Marker value; existence is all that matters
const MARKER_VALUE: &str = "1";

/// Subscription forwarding channel capacity
const FEED_CAPACITY: usize = 64;

/// Redis-backed [`Backend`] implementation.
pub struct RedisBackend {
    pool: RedisPool,
    /// Dedicated client for pub/sub connections; the pool's multiplexed
    /// connections cannot enter subscriber mode
    client: redis::Client,
    key_prefix: String,
}

impl RedisBackend {
    /// Build the backend without touching the network.
    ///
    /// Prefer [`connect`](Self::connect) when an unreachable store should
    /// fail at construction time.
    pub fn new(config: &RedisPoolConfig) -> Result<Self, BackendError> {
        let client =
            redis::Client::open(config.url.as_str()).map_err(BackendError::connection)?;
        let pool = RedisPool::new(config).map_err(BackendError::connection)?;

        Ok(Self {
            pool,
            client,
            key_prefix: MARKER_PREFIX.to_string(),
        })
    }

    /// Build the backend and verify the store is reachable with one PING.
    pub async fn connect(config: &RedisPoolConfig) -> Result<Self, BackendError> {
        let backend = Self::new(config)?;
        backend
            .pool
            .health_check()
            .await
            .map_err(BackendError::connection)?;
        Ok(backend)
    }

    /// Override the key namespace for liveness markers
    #[must_use]
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    fn marker_key(&self, id: &Identifier) -> String {
        format!("{}{}", self.key_prefix, id)
    }

    fn ttl_millis(ttl: Duration) -> u64 {
        u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
    }
}

impl std::fmt::Debug for RedisBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisBackend")
            .field("key_prefix", &self.key_prefix)
            .field("pool", &self.pool)
            .finish()
    }
}

#[async_trait]
impl Backend for RedisBackend {
    async fn refresh(&self, ids: &[Identifier], ttl: Duration) -> Result<(), BackendError> {
        if ids.is_empty() {
            return Ok(());
        }
        let mut conn = self.pool.get().await.map_err(BackendError::connection)?;

        // One pipelined round trip regardless of fan-out
        let mut pipe = redis::pipe();
        for id in ids {
            pipe.cmd("SET")
                .arg(self.marker_key(id))
                .arg(MARKER_VALUE)
                .arg("PX")
                .arg(Self::ttl_millis(ttl))
                .ignore();
        }
        pipe.query_async::<()>(&mut conn)
            .await
            .map_err(BackendError::operation)?;

        tracing::trace!(count = ids.len(), ttl_ms = Self::ttl_millis(ttl), "Refreshed markers");
        Ok(())
    }

    async fn exists(&self, ids: &[Identifier]) -> Result<Vec<bool>, BackendError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(BackendError::connection)?;

        // Per-key EXISTS keeps input order and duplicate slots
        let mut pipe = redis::pipe();
        for id in ids {
            pipe.cmd("EXISTS").arg(self.marker_key(id));
        }
        let live: Vec<bool> = pipe
            .query_async(&mut conn)
            .await
            .map_err(BackendError::operation)?;
        Ok(live)
    }

    async fn delete(&self, ids: &[Identifier]) -> Result<(), BackendError> {
        if ids.is_empty() {
            return Ok(());
        }
        let mut conn = self.pool.get().await.map_err(BackendError::connection)?;

        let keys: Vec<String> = ids.iter().map(|id| self.marker_key(id)).collect();
        conn.del::<_, ()>(keys)
            .await
            .map_err(BackendError::operation)?;
        Ok(())
    }

    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), BackendError> {
        let mut conn = self.pool.get().await.map_err(BackendError::connection)?;
        conn.publish::<_, _, ()>(topic, payload)
            .await
            .map_err(BackendError::operation)?;
        Ok(())
    }

    async fn subscribe(&self, topic: &str) -> Result<Subscription, BackendError> {
        let mut pubsub = self
            .client
            .get_async_pubsub()
            .await
            .map_err(BackendError::connection)?;
        pubsub
            .subscribe(topic)
            .await
            .map_err(BackendError::subscription)?;

        let topic = topic.to_string();
        let (tx, messages) = mpsc::channel(FEED_CAPACITY);
        let (stop_tx, mut stop_rx) = oneshot::channel();

        tokio::spawn(async move {
            let mut stream = pubsub.on_message();
            loop {
                tokio::select! {
                    _ = &mut stop_rx => {
                        tracing::debug!(topic = %topic, "Unsubscribed from presence topic");
                        break;
                    }
                    msg = stream.next() => match msg {
                        Some(msg) => {
                            let payload: Vec<u8> = msg.get_payload().unwrap_or_default();
                            if tx.send(Ok(payload)).await.is_err() {
                                break;
                            }
                        }
                        None => {
                            // Connection dropped out from under the subscriber
                            let _ = tx
                                .send(Err(BackendError::subscription(
                                    "pub/sub connection lost",
                                )))
                                .await;
                            break;
                        }
                    }
                }
            }
            // Dropping the pub/sub connection performs the server-side
            // unsubscribe
        });

        Ok(Subscription::new(messages, stop_tx))
    }
}
