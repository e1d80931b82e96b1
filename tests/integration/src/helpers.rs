//! Test fixtures: sessions over a shared in-process backend.

use presence_core::{ChangeEvent, Identifier, MemoryBackend, Session, SessionConfig, StatusStream};
use std::sync::Arc;
use std::time::Duration;

/// Topic used by memory-backend tests; isolation comes from each test
/// creating its own backend instance
pub const TEST_TOPIC: &str = "presence:test";

/// Build identifiers from string literals
pub fn ids(raw: &[&str]) -> Vec<Identifier> {
    raw.iter().map(|s| Identifier::from(*s)).collect()
}

/// A backend several sessions can share
pub fn shared_backend() -> Arc<MemoryBackend> {
    Arc::new(MemoryBackend::new())
}

/// Session on the given backend with the given TTL
pub fn session_on(backend: Arc<MemoryBackend>, ttl: Duration) -> Session<Arc<MemoryBackend>> {
    let config = SessionConfig::default().with_ttl(ttl).with_topic(TEST_TOPIC);
    Session::new(backend, config).expect("valid test config")
}

/// Session with a private backend
pub fn test_session(ttl: Duration) -> Session<Arc<MemoryBackend>> {
    session_on(shared_backend(), ttl)
}

/// Receive one event, bounded so a missing event fails the test instead of
/// hanging it
pub async fn recv_within(stream: &mut StatusStream, window: Duration) -> Option<ChangeEvent> {
    tokio::time::timeout(window, stream.recv()).await.ok().flatten()
}
