//! Notification stream plumbing.
//!
//! A background task decodes raw subscription payloads into typed change
//! events and fans them out over a bounded broadcast channel. Session calls
//! never block on a slow consumer: when a listener falls behind, the oldest
//! buffered events are dropped and counted.

use crate::backend::Subscription;
use crate::error::PresenceError;
use crate::events::{ChangeEvent, StatusChangeBatch};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use tokio::sync::{broadcast, oneshot, Mutex};
use tokio::task::JoinHandle;

/// Shared slot holding the session's active listener, if any
pub(crate) type ListenerSlot = Arc<Mutex<Option<ListenerHandle>>>;

/// State of an active subscription held by the session
pub(crate) struct ListenerHandle {
    /// Fan-out sender; each `listen_status_changes` call attaches a receiver
    pub(crate) events: broadcast::Sender<ChangeEvent>,
    /// Cancels the backend subscription on teardown
    pub(crate) stop: oneshot::Sender<()>,
    /// Set when the subscription breaks, readable from every stream
    pub(crate) failure: Arc<OnceLock<PresenceError>>,
    /// The decode task, awaited on close so the stream ends before close returns
    pub(crate) task: JoinHandle<()>,
}

/// Decode loop: raw payloads in, per-identifier change events out.
///
/// Exits when the stop signal fires (session close) or the subscription ends.
/// On an unexpected end it records the failure and clears the listener slot,
/// which drops the last fan-out sender and closes every attached stream.
pub(crate) async fn pump_events(
    mut subscription: Subscription,
    events: broadcast::Sender<ChangeEvent>,
    slot: ListenerSlot,
    failure: Arc<OnceLock<PresenceError>>,
    mut stop: oneshot::Receiver<()>,
) {
    let broke = loop {
        tokio::select! {
            _ = &mut stop => {
                subscription.cancel();
                break false;
            }
            item = subscription.recv() => match item {
                Some(Ok(payload)) => match StatusChangeBatch::decode(&payload) {
                    Ok(batch) => {
                        for event in batch.changes {
                            // Send errors only mean no listener is attached
                            let _ = events.send(event);
                        }
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "Discarding undecodable status payload");
                    }
                },
                Some(Err(err)) => {
                    tracing::error!(error = %err, "Presence subscription broke");
                    let _ = failure.set(PresenceError::from(err));
                    break true;
                }
                None => {
                    let _ = failure.set(PresenceError::Subscription(
                        "subscription ended unexpectedly".into(),
                    ));
                    break true;
                }
            }
        }
    };

    if broke {
        // Drop the slot's sender so attached streams observe closure
        slot.lock().await.take();
    }
}

/// Read-only, ordered stream of presence transitions.
///
/// Reflects transitions triggered by any session sharing the backend and
/// topic, not only the owning handle. `recv` returning `None` means the
/// stream ended: either the session was closed (normal end, [`failure`]
/// is `None`) or the underlying subscription broke ([`failure`] is set).
///
/// [`failure`]: StatusStream::failure
pub struct StatusStream {
    events: broadcast::Receiver<ChangeEvent>,
    failure: Arc<OnceLock<PresenceError>>,
    dropped: Arc<AtomicU64>,
}

impl StatusStream {
    pub(crate) fn new(
        events: broadcast::Receiver<ChangeEvent>,
        failure: Arc<OnceLock<PresenceError>>,
        dropped: Arc<AtomicU64>,
    ) -> Self {
        Self {
            events,
            failure,
            dropped,
        }
    }

    /// Receive the next change event.
    ///
    /// Events arrive in backend delivery order, without reordering or
    /// deduplication. If this consumer fell behind the buffer, the skipped
    /// events are added to the drop counter and reception continues with the
    /// oldest retained event.
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.events.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    self.dropped.fetch_add(skipped, Ordering::Relaxed);
                    tracing::warn!(skipped, "Listener lagged, dropped oldest events");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// The error that ended the stream, if it ended abnormally
    #[must_use]
    pub fn failure(&self) -> Option<&PresenceError> {
        self.failure.get()
    }

    /// Total events dropped on the owning session due to slow consumers
    #[must_use]
    pub fn dropped_events(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for StatusStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusStream")
            .field("failed", &self.failure.get().is_some())
            .field("dropped", &self.dropped.load(Ordering::Relaxed))
            .finish()
    }
}
