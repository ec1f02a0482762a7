use huddle_core::{RoomId, SignalEvent, SignalRequest};

use crate::integration::{create_test_relay, init_tracing};
use crate::utils::{connect_and_join, disconnect, send, settle};

/// The room "abc123" walkthrough: host A, participant B, mute then kick.
#[tokio::test]
async fn test_host_mutes_then_kicks_participant() {
    init_tracing();

    let (relay_tx, sink) = create_test_relay();

    let a = connect_and_join(&relay_tx, "abc123", true)
        .await
        .expect("A failed to join");
    let b = connect_and_join(&relay_tx, "abc123", false)
        .await
        .expect("B failed to join");

    settle(&relay_tx, &sink).await.expect("Relay stalled");
    sink.clear().await;

    let room = RoomId::from("abc123");

    send(
        &relay_tx,
        a,
        SignalRequest::MuteUser {
            room_id: room.clone(),
            user_id: b,
        },
    )
    .await
    .expect("Mute send failed");

    send(
        &relay_tx,
        a,
        SignalRequest::KickUser {
            room_id: room,
            user_id: b,
        },
    )
    .await
    .expect("Kick send failed");

    settle(&relay_tx, &sink).await.expect("Relay stalled");

    let b_events = sink.events_for(&b).await;
    assert_eq!(
        b_events,
        vec![
            SignalEvent::RemoteMute,
            SignalEvent::Kicked,
            // Still a member until it disconnects, so it hears the room
            // broadcast about itself.
            SignalEvent::UserKicked { id: b },
        ]
    );

    assert_eq!(
        sink.events_for(&a).await,
        vec![SignalEvent::UserKicked { id: b }]
    );

    // The kicked client self-terminates; only then does the count drop.
    sink.clear().await;
    disconnect(&relay_tx, b).await.expect("Disconnect failed");
    settle(&relay_tx, &sink).await.expect("Relay stalled");

    let a_events = sink.events_for(&a).await;
    assert_eq!(
        a_events,
        vec![
            SignalEvent::UserDisconnected { id: b },
            SignalEvent::UserCount { count: 1 },
        ]
    );
}

/// Weak invariant pinned: kicking a fellow host does not revoke the
/// flag, so the kicked host keeps acting until their socket drops.
#[tokio::test]
async fn test_kicked_host_keeps_host_flag_until_disconnect() {
    init_tracing();

    let (relay_tx, sink) = create_test_relay();

    let a = connect_and_join(&relay_tx, "abc123", true)
        .await
        .expect("A failed to join");
    let b = connect_and_join(&relay_tx, "abc123", true)
        .await
        .expect("B failed to join");

    settle(&relay_tx, &sink).await.expect("Relay stalled");
    sink.clear().await;

    let room = RoomId::from("abc123");

    send(
        &relay_tx,
        a,
        SignalRequest::KickUser {
            room_id: room.clone(),
            user_id: b,
        },
    )
    .await
    .expect("Kick send failed");
    settle(&relay_tx, &sink).await.expect("Relay stalled");
    sink.clear().await;

    // B ignores the kick and mutes A right back. It still succeeds.
    send(
        &relay_tx,
        b,
        SignalRequest::MuteUser {
            room_id: room,
            user_id: a,
        },
    )
    .await
    .expect("Mute send failed");
    settle(&relay_tx, &sink).await.expect("Relay stalled");

    assert_eq!(sink.events_for(&a).await, vec![SignalEvent::RemoteMute]);
}
