//! Live-Redis scenarios, mirroring the memory-backend suite against a real
//! store. Each test namespaces its keys and topic so parallel runs do not
//! interfere.
//!
//! All tests are ignored by default; run them against a local server with
//! `cargo test -p integration-tests -- --ignored`.

use integration_tests::helpers::ids;
use presence_core::{PresenceState, Session, SessionConfig};
use presence_redis::{RedisBackend, RedisPoolConfig};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

const REDIS_URL: &str = "redis://127.0.0.1:6379";
const TTL: Duration = Duration::from_secs(1);

static NEXT_NAMESPACE: AtomicU64 = AtomicU64::new(0);

async fn redis_session(label: &str) -> Session<RedisBackend> {
    let seq = NEXT_NAMESPACE.fetch_add(1, Ordering::Relaxed);
    let namespace = format!("presence-test:{label}:{seq}");

    let backend = RedisBackend::connect(&RedisPoolConfig::from_url(REDIS_URL))
        .await
        .expect("redis reachable")
        .with_key_prefix(format!("{namespace}:"));

    let config = SessionConfig::default()
        .with_ttl(TTL)
        .with_topic(format!("{namespace}:status"));
    Session::new(backend, config).expect("valid test config")
}

#[tokio::test]
#[ignore = "requires a running Redis server"]
async fn redis_single_ping() {
    let session = redis_session("single-ping").await;
    session.online(&ids(&["id"])).await.unwrap();
    session.close().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running Redis server"]
async fn redis_online_then_status() {
    let session = redis_session("online-status").await;
    session.online(&ids(&["id3"])).await.unwrap();

    let status = session.status(&ids(&["id3"])).await.unwrap();
    assert_eq!(status[0].state, PresenceState::Online);
    session.close().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running Redis server"]
async fn redis_disjoint_ids_report_offline() {
    let session = redis_session("disjoint").await;
    session.online(&ids(&["id8", "id9"])).await.unwrap();

    let status = session.status(&ids(&["id10", "id11"])).await.unwrap();
    for result in status {
        assert_eq!(result.state, PresenceState::Offline);
    }
    session.close().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running Redis server"]
async fn redis_marker_expires() {
    let session = redis_session("expiry").await;
    session.online(&ids(&["12"])).await.unwrap();

    tokio::time::sleep(Duration::from_secs(2)).await;
    let status = session.status(&ids(&["12"])).await.unwrap();
    assert_eq!(status[0].state, PresenceState::Offline);
    session.close().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running Redis server"]
async fn redis_offline_overrides_ttl() {
    let session = redis_session("override").await;
    session.online(&ids(&["id20", "id21"])).await.unwrap();
    session.offline(&ids(&["id20", "id21"])).await.unwrap();

    let status = session.status(&ids(&["id20", "id21"])).await.unwrap();
    for result in status {
        assert_eq!(result.state, PresenceState::Offline);
    }
    session.close().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running Redis server"]
async fn redis_listener_observes_transitions() {
    let session = redis_session("listener").await;
    let mut stream = session.listen_status_changes().await.unwrap();

    session.online(&ids(&["13", "14", "15"])).await.unwrap();

    let mut online_count = 0;
    for _ in 0..3 {
        let event = tokio::time::timeout(Duration::from_secs(5), stream.recv())
            .await
            .expect("event within window")
            .expect("stream open");
        if event.state.is_online() {
            online_count += 1;
        }
    }
    assert_eq!(online_count, 3);
    session.close().await.unwrap();
}
