//! Presence session scenarios over the in-process backend.
//!
//! TTL-sensitive cases run under a paused tokio clock so expiry timing is
//! deterministic and instant.

use integration_tests::helpers::{
    ids, recv_within, session_on, shared_backend, test_session, TEST_TOPIC,
};
use presence_core::{PresenceState, Session, SessionConfig};
use std::time::Duration;

const TTL: Duration = Duration::from_secs(1);
const EVENT_WINDOW: Duration = Duration::from_secs(2);

#[tokio::test]
async fn single_ping() {
    let session = test_session(TTL);
    session.online(&ids(&["id"])).await.unwrap();
    session.close().await.unwrap();
}

#[tokio::test]
async fn multi_ping() {
    let session = test_session(TTL);
    session.online(&ids(&["id", "id2"])).await.unwrap();
    session.close().await.unwrap();
}

#[tokio::test]
async fn online_then_status_reports_online() {
    let session = test_session(TTL);
    session.online(&ids(&["id3"])).await.unwrap();

    let status = session.status(&ids(&["id3"])).await.unwrap();
    assert_eq!(status[0].state, PresenceState::Online);
    session.close().await.unwrap();
}

#[tokio::test]
async fn unknown_id_reports_offline() {
    let session = test_session(TTL);
    session.online(&ids(&["id4"])).await.unwrap();

    let status = session.status(&ids(&["id5"])).await.unwrap();
    assert_eq!(status[0].state, PresenceState::Offline);
    session.close().await.unwrap();
}

#[tokio::test]
async fn multi_status_all_online() {
    let session = test_session(TTL);
    session.online(&ids(&["id6", "id7"])).await.unwrap();

    let status = session.status(&ids(&["id6", "id7"])).await.unwrap();
    assert_eq!(status.len(), 2);
    for result in status {
        assert_eq!(result.state, PresenceState::Online, "{} should be online", result.id);
    }
    session.close().await.unwrap();
}

#[tokio::test]
async fn multi_status_all_offline() {
    let session = test_session(TTL);
    session.online(&ids(&["id8", "id9"])).await.unwrap();

    let status = session.status(&ids(&["id10", "id11"])).await.unwrap();
    assert_eq!(status.len(), 2);
    for result in status {
        assert_eq!(result.state, PresenceState::Offline, "{} should be offline", result.id);
    }
    session.close().await.unwrap();
}

#[tokio::test]
async fn status_preserves_order_and_duplicates() {
    let session = test_session(TTL);
    session.online(&ids(&["a"])).await.unwrap();

    let queried = ids(&["a", "b", "a"]);
    let status = session.status(&queried).await.unwrap();

    assert_eq!(status.len(), 3);
    assert_eq!(status[0].id, queried[0]);
    assert_eq!(status[0].state, PresenceState::Online);
    assert_eq!(status[1].id, queried[1]);
    assert_eq!(status[1].state, PresenceState::Offline);
    assert_eq!(status[2].id, queried[2]);
    assert_eq!(status[2].state, PresenceState::Online);
    session.close().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn marker_expires_after_ttl() {
    let session = test_session(TTL);
    session.online(&ids(&["12"])).await.unwrap();

    tokio::time::sleep(Duration::from_millis(500)).await;
    let status = session.status(&ids(&["12"])).await.unwrap();
    assert_eq!(status[0].state, PresenceState::Online);

    tokio::time::sleep(Duration::from_millis(1500)).await;
    let status = session.status(&ids(&["12"])).await.unwrap();
    assert_eq!(status[0].state, PresenceState::Offline);
    session.close().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn heartbeat_extends_liveness() {
    let session = test_session(TTL);
    let id = ids(&["hb"]);

    session.online(&id).await.unwrap();
    tokio::time::sleep(Duration::from_millis(700)).await;
    session.online(&id).await.unwrap();
    tokio::time::sleep(Duration::from_millis(700)).await;

    // 1.4s after the first ping, still alive thanks to the refresh
    let status = session.status(&id).await.unwrap();
    assert_eq!(status[0].state, PresenceState::Online);

    tokio::time::sleep(Duration::from_millis(1500)).await;
    let status = session.status(&id).await.unwrap();
    assert_eq!(status[0].state, PresenceState::Offline);
    session.close().await.unwrap();
}

#[tokio::test]
async fn offline_overrides_remaining_ttl() {
    let session = test_session(Duration::from_secs(3600));
    session.online(&ids(&["id20", "id21"])).await.unwrap();
    session.offline(&ids(&["id20", "id21"])).await.unwrap();

    let status = session.status(&ids(&["id20", "id21"])).await.unwrap();
    for result in status {
        assert_eq!(result.state, PresenceState::Offline);
    }
    session.close().await.unwrap();
}

#[tokio::test]
async fn offline_is_idempotent() {
    let session = test_session(TTL);
    for _ in 0..3 {
        session.offline(&ids(&["id16", "id17"])).await.unwrap();
    }
    session.close().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn listener_observes_online_events() {
    let session = test_session(TTL);
    let mut stream = session.listen_status_changes().await.unwrap();

    session.online(&ids(&["a", "b", "c"])).await.unwrap();

    let mut seen = Vec::new();
    for _ in 0..3 {
        let event = recv_within(&mut stream, EVENT_WINDOW)
            .await
            .expect("expected an online event");
        assert_eq!(event.state, PresenceState::Online);
        seen.push(event.id.into_inner());
    }
    seen.sort();
    assert_eq!(seen, vec!["a", "b", "c"]);
    session.close().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn listener_sees_transitions_from_other_sessions() {
    let backend = shared_backend();
    let observer = session_on(backend.clone(), TTL);
    let publisher = session_on(backend, TTL);

    let mut stream = observer.listen_status_changes().await.unwrap();
    publisher.online(&ids(&["remote"])).await.unwrap();

    let event = recv_within(&mut stream, EVENT_WINDOW)
        .await
        .expect("expected the other session's event");
    assert_eq!(event.id.as_str(), "remote");
    assert_eq!(event.state, PresenceState::Online);

    observer.close().await.unwrap();
    publisher.close().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn topics_isolate_presence_domains() {
    let backend = shared_backend();
    let observer = Session::new(
        backend.clone(),
        SessionConfig::default().with_ttl(TTL).with_topic("presence:domain-a"),
    )
    .unwrap();
    let publisher = Session::new(
        backend,
        SessionConfig::default().with_ttl(TTL).with_topic("presence:domain-b"),
    )
    .unwrap();

    let mut stream = observer.listen_status_changes().await.unwrap();
    publisher.online(&ids(&["x"])).await.unwrap();

    assert!(
        recv_within(&mut stream, Duration::from_millis(200)).await.is_none(),
        "events must not cross topics"
    );
    observer.close().await.unwrap();
    publisher.close().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn offline_publishes_events_by_default() {
    let session = test_session(TTL);
    let mut stream = session.listen_status_changes().await.unwrap();

    // Never-seen id: delete is a no-op but the event is still announced
    session.offline(&ids(&["ghost"])).await.unwrap();

    let event = recv_within(&mut stream, EVENT_WINDOW)
        .await
        .expect("redundant offline should still publish");
    assert_eq!(event.id.as_str(), "ghost");
    assert_eq!(event.state, PresenceState::Offline);
    session.close().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn suppression_drops_redundant_offline_events() {
    let backend = shared_backend();
    let config = SessionConfig::default()
        .with_ttl(TTL)
        .with_topic(TEST_TOPIC)
        .with_suppress_redundant_offline(true);
    let session = Session::new(backend, config).unwrap();

    let mut stream = session.listen_status_changes().await.unwrap();

    session.online(&ids(&["s1"])).await.unwrap();
    let event = recv_within(&mut stream, EVENT_WINDOW).await.unwrap();
    assert_eq!(event.state, PresenceState::Online);

    // First offline transitions the id and is announced
    session.offline(&ids(&["s1"])).await.unwrap();
    let event = recv_within(&mut stream, EVENT_WINDOW).await.unwrap();
    assert_eq!(event.state, PresenceState::Offline);

    // Second offline is redundant and suppressed
    session.offline(&ids(&["s1"])).await.unwrap();
    assert!(recv_within(&mut stream, Duration::from_millis(200)).await.is_none());
    session.close().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn close_ends_stream_cleanly() {
    let session = test_session(TTL);
    let mut stream = session.listen_status_changes().await.unwrap();

    session.close().await.unwrap();

    assert!(stream.recv().await.is_none(), "closed channel = stream ended");
    assert!(stream.failure().is_none(), "close is a normal end, not a failure");
}

#[tokio::test(start_paused = true)]
async fn slow_consumer_drops_oldest_and_counts() {
    let backend = shared_backend();
    let config = SessionConfig::default()
        .with_ttl(TTL)
        .with_topic(TEST_TOPIC)
        .with_event_buffer(2);
    let session = Session::new(backend, config).unwrap();

    let mut stream = session.listen_status_changes().await.unwrap();

    // Eight events into a two-slot buffer with nobody draining
    session
        .online(&ids(&["d1", "d2", "d3", "d4", "d5", "d6", "d7", "d8"]))
        .await
        .unwrap();
    // Let the decode task flood the buffer
    tokio::time::sleep(Duration::from_millis(50)).await;

    let event = recv_within(&mut stream, EVENT_WINDOW)
        .await
        .expect("newest events are retained");
    assert_eq!(event.state, PresenceState::Online);
    assert!(
        session.dropped_events() > 0,
        "drop counter must record the overflow"
    );
    assert_eq!(stream.dropped_events(), session.dropped_events());
    session.close().await.unwrap();
}
