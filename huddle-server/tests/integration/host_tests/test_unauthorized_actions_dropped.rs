use huddle_core::{RoomId, SignalRequest};

use crate::integration::{create_test_relay, init_tracing};
use crate::utils::{connect_and_join, disconnect, send, settle};

#[tokio::test]
async fn test_non_host_actions_produce_no_events() {
    init_tracing();

    let (relay_tx, sink) = create_test_relay();

    let host = connect_and_join(&relay_tx, "abc123", true)
        .await
        .expect("Host failed to join");
    let guest = connect_and_join(&relay_tx, "abc123", false)
        .await
        .expect("Guest failed to join");

    settle(&relay_tx, &sink).await.expect("Relay stalled");
    sink.clear().await;

    let room = RoomId::from("abc123");
    let attempts = vec![
        SignalRequest::KickUser {
            room_id: room.clone(),
            user_id: host,
        },
        SignalRequest::MuteUser {
            room_id: room.clone(),
            user_id: host,
        },
        SignalRequest::AddHost {
            room_id: room.clone(),
            user_id: guest,
        },
        SignalRequest::RemoveHost {
            room_id: room.clone(),
            user_id: host,
        },
    ];

    for attempt in attempts {
        send(&relay_tx, guest, attempt)
            .await
            .expect("Send failed");
    }

    settle(&relay_tx, &sink).await.expect("Relay stalled");

    // Silent-failure policy: no mutation, no notification to anyone,
    // not even an error back to the offender.
    assert!(sink.events_for(&host).await.is_empty());
    assert!(sink.events_for(&guest).await.is_empty());

    // And the host set is untouched: the real host can still act.
    sink.clear().await;
    send(
        &relay_tx,
        host,
        SignalRequest::MuteUser {
            room_id: room,
            user_id: guest,
        },
    )
    .await
    .expect("Send failed");
    settle(&relay_tx, &sink).await.expect("Relay stalled");

    assert_eq!(sink.events_for(&guest).await.len(), 1);
}

#[tokio::test]
async fn test_sole_host_disconnect_leaves_room_unprivileged() {
    init_tracing();

    let (relay_tx, sink) = create_test_relay();

    let host = connect_and_join(&relay_tx, "abc123", true)
        .await
        .expect("Host failed to join");
    let guest = connect_and_join(&relay_tx, "abc123", false)
        .await
        .expect("Guest failed to join");

    settle(&relay_tx, &sink).await.expect("Relay stalled");

    disconnect(&relay_tx, host)
        .await
        .expect("Disconnect failed");
    settle(&relay_tx, &sink).await.expect("Relay stalled");
    sink.clear().await;

    // The host set was dropped with its last member; nobody can mint new
    // hosts in this room anymore, not even for themselves.
    send(
        &relay_tx,
        guest,
        SignalRequest::AddHost {
            room_id: RoomId::from("abc123"),
            user_id: guest,
        },
    )
    .await
    .expect("Send failed");

    settle(&relay_tx, &sink).await.expect("Relay stalled");
    assert!(sink.events_for(&guest).await.is_empty());
}
