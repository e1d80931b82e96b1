//! Presence session configuration.

use std::time::Duration;

/// Default pub/sub topic shared by sessions that observe each other
pub const DEFAULT_TOPIC: &str = "presence:status";

/// Default liveness window applied by `online`
const DEFAULT_TTL: Duration = Duration::from_secs(30);

/// Default per-listener event buffer capacity
const DEFAULT_EVENT_BUFFER: usize = 1024;

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Liveness window applied by `online`; the backend's clock drives expiry
    pub ttl: Duration,
    /// Pub/sub topic name. Sessions sharing a backend observe each other's
    /// transitions only when they share a topic, so isolated presence domains
    /// can coexist on one backend under different topics.
    pub topic: String,
    /// Capacity of the listener event buffer. When a consumer does not keep
    /// up, the oldest buffered events are dropped and counted; session calls
    /// never block on a slow consumer.
    pub event_buffer: usize,
    /// When set, `offline` skips publishing events for identifiers that were
    /// already offline, at the cost of one extra existence check. Default:
    /// off; redundant offline calls re-announce the state.
    pub suppress_redundant_offline: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            topic: DEFAULT_TOPIC.to_string(),
            event_buffer: DEFAULT_EVENT_BUFFER,
            suppress_redundant_offline: false,
        }
    }
}

impl SessionConfig {
    /// Set the liveness window
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the pub/sub topic
    #[must_use]
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    /// Set the listener event buffer capacity
    #[must_use]
    pub fn with_event_buffer(mut self, capacity: usize) -> Self {
        self.event_buffer = capacity;
        self
    }

    /// Toggle suppression of redundant offline events
    #[must_use]
    pub fn with_suppress_redundant_offline(mut self, suppress: bool) -> Self {
        self.suppress_redundant_offline = suppress;
        self
    }

    /// Validate the configuration
    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.ttl.is_zero() {
            return Err("ttl must be non-zero".to_string());
        }
        if self.topic.is_empty() {
            return Err("topic must not be empty".to_string());
        }
        if self.event_buffer == 0 {
            return Err("event_buffer must be non-zero".to_string());
        }
        Ok(())
    }
}
