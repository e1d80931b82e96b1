//! The presence session.

use crate::backend::Backend;
use crate::config::SessionConfig;
use crate::error::{PresenceError, PresenceResult};
use crate::events::StatusChangeBatch;
use crate::session::listener::{pump_events, ListenerHandle, ListenerSlot, StatusStream};
use crate::types::{Identifier, PresenceState, StatusResult};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use tokio::sync::{broadcast, oneshot};

/// Long-lived presence handle bound to one backend.
///
/// Safe for concurrent use: all methods take `&self` and may be called from
/// any number of tasks. `online`/`offline`/`status` are bounded by backend
/// round-trip latency and never block on a notification consumer.
///
/// The session holds no local clock or per-identifier state; liveness truth
/// is entirely the backend's, so replicas sharing a backend agree.
pub struct Session<B: Backend> {
    backend: B,
    config: SessionConfig,
    closed: AtomicBool,
    listener: ListenerSlot,
    dropped_events: Arc<AtomicU64>,
}

impl<B: Backend> Session<B> {
    /// Create a session over a backend.
    ///
    /// Fails with [`PresenceError::Config`] on a zero TTL, empty topic, or
    /// zero event buffer. Does not touch the backend; connection failures
    /// surface on the first call.
    pub fn new(backend: B, config: SessionConfig) -> PresenceResult<Self> {
        config.validate().map_err(PresenceError::Config)?;
        Ok(Self {
            backend,
            config,
            closed: AtomicBool::new(false),
            listener: Arc::new(tokio::sync::Mutex::new(None)),
            dropped_events: Arc::new(AtomicU64::new(0)),
        })
    }

    /// The session's configuration
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Mark identifiers alive for one TTL window (the heartbeat call).
    ///
    /// All markers are refreshed in a single backend round trip, then one
    /// batch of Online events is published on the session topic. If the
    /// refresh fails, no identifier is reported online and nothing is
    /// published.
    pub async fn online(&self, ids: &[Identifier]) -> PresenceResult<()> {
        self.ensure_open()?;
        if ids.is_empty() {
            return Ok(());
        }

        self.backend.refresh(ids, self.config.ttl).await?;
        self.publish_changes(ids, PresenceState::Online).await
    }

    /// Force identifiers offline immediately, regardless of remaining TTL.
    ///
    /// Idempotent: taking an already-offline identifier offline succeeds.
    /// By default the Offline event is published either way; with
    /// [`SessionConfig::suppress_redundant_offline`] set, identifiers that
    /// were already offline are omitted from the published batch.
    pub async fn offline(&self, ids: &[Identifier]) -> PresenceResult<()> {
        self.ensure_open()?;
        if ids.is_empty() {
            return Ok(());
        }

        let announce: Vec<Identifier> = if self.config.suppress_redundant_offline {
            let live = self.backend.exists(ids).await?;
            ids.iter()
                .zip(live)
                .filter_map(|(id, was_online)| was_online.then(|| id.clone()))
                .collect()
        } else {
            ids.to_vec()
        };

        self.backend.delete(ids).await?;

        if announce.is_empty() {
            return Ok(());
        }
        self.publish_changes(&announce, PresenceState::Offline).await
    }

    /// Point-in-time liveness query.
    ///
    /// Returns one result per input id in input order, duplicates included.
    /// Never-seen identifiers report Offline. No side effects: TTLs are not
    /// refreshed and nothing is published.
    pub async fn status(&self, ids: &[Identifier]) -> PresenceResult<Vec<StatusResult>> {
        self.ensure_open()?;

        let live = self.backend.exists(ids).await?;
        Ok(ids
            .iter()
            .zip(live)
            .map(|(id, is_live)| {
                let state = if is_live {
                    PresenceState::Online
                } else {
                    PresenceState::Offline
                };
                StatusResult::new(id.clone(), state)
            })
            .collect())
    }

    /// Open a stream of presence transitions on the session topic.
    ///
    /// The first call subscribes the session to the backend topic and starts
    /// the decode task; later calls attach further streams to the same
    /// subscription. The stream reflects transitions from every session
    /// sharing the backend and topic. Abandoning a stream does not
    /// unsubscribe; only [`close`](Self::close) does.
    pub async fn listen_status_changes(&self) -> PresenceResult<StatusStream> {
        self.ensure_open()?;

        let mut slot = self.listener.lock().await;
        // close() flips the flag before draining this slot under the same
        // lock; re-check so no subscription is installed after teardown
        self.ensure_open()?;
        if slot.is_none() {
            let subscription = self.backend.subscribe(&self.config.topic).await?;
            let (events, _) = broadcast::channel(self.config.event_buffer);
            let (stop_tx, stop_rx) = oneshot::channel();
            let failure = Arc::new(OnceLock::new());

            let task = tokio::spawn(pump_events(
                subscription,
                events.clone(),
                Arc::clone(&self.listener),
                Arc::clone(&failure),
                stop_rx,
            ));
            tracing::debug!(topic = %self.config.topic, "Presence listener started");

            *slot = Some(ListenerHandle {
                events,
                stop: stop_tx,
                failure,
                task,
            });
        }

        let handle = slot.as_ref().ok_or_else(|| {
            PresenceError::Subscription("listener torn down concurrently".into())
        })?;
        Ok(StatusStream::new(
            handle.events.subscribe(),
            Arc::clone(&handle.failure),
            Arc::clone(&self.dropped_events),
        ))
    }

    /// Total events dropped across this session's listeners because a
    /// consumer did not keep up with the bounded event buffer
    #[must_use]
    pub fn dropped_events(&self) -> u64 {
        self.dropped_events.load(Ordering::Relaxed)
    }

    /// Whether `close` has been called
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Tear the session down: cancel the topic subscription, close every
    /// notification stream, and release the backend connection.
    ///
    /// Runs exactly once; a second call is a no-op success. Every other API
    /// call after this returns [`PresenceError::SessionClosed`] without
    /// backend I/O.
    pub async fn close(&self) -> PresenceResult<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let handle = self.listener.lock().await.take();
        if let Some(handle) = handle {
            let _ = handle.stop.send(());
            // Streams must be closed by the time close returns
            let _ = handle.task.await;
        }

        self.backend.close().await?;
        tracing::debug!("Presence session closed");
        Ok(())
    }

    fn ensure_open(&self) -> PresenceResult<()> {
        if self.is_closed() {
            return Err(PresenceError::SessionClosed);
        }
        Ok(())
    }

    async fn publish_changes(
        &self,
        ids: &[Identifier],
        state: PresenceState,
    ) -> PresenceResult<()> {
        let batch = StatusChangeBatch::new(ids, state);
        let payload = batch.encode()?;
        self.backend.publish(&self.config.topic, &payload).await?;

        tracing::debug!(
            topic = %self.config.topic,
            count = ids.len(),
            state = %state,
            "Published status change"
        );
        Ok(())
    }
}

impl<B: Backend> std::fmt::Debug for Session<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("topic", &self.config.topic)
            .field("ttl", &self.config.ttl)
            .field("closed", &self.is_closed())
            .finish()
    }
}
