use huddle_core::{SignalEvent, SignalRequest};

use crate::integration::{create_test_relay, init_tracing};
use crate::utils::{connect_and_join, send, settle};

#[tokio::test]
async fn test_offer_routed_to_target_with_sender_attached() {
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

    let offer = serde_json::json!({ "type": "offer", "sdp": "v=0\r\no=a" });
    let answer = serde_json::json!({ "type": "answer", "sdp": "v=0\r\no=b" });

    send(
        &relay_tx,
        a,
        SignalRequest::Offer {
            to: b,
            offer: offer.clone(),
        },
    )
    .await
    .expect("Offer send failed");

    send(
        &relay_tx,
        b,
        SignalRequest::Answer {
            to: a,
            answer: answer.clone(),
        },
    )
    .await
    .expect("Answer send failed");

    settle(&relay_tx, &sink).await.expect("Relay stalled");

    assert_eq!(
        sink.events_for(&b).await,
        vec![SignalEvent::Offer { from: a, offer }],
        "Target should receive the offer with the sender rewritten in"
    );
    assert_eq!(
        sink.events_for(&a).await,
        vec![SignalEvent::Answer { from: b, answer }],
    );
}

#[tokio::test]
async fn test_candidates_preserve_sender_order() {
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

    let candidates: Vec<_> = (0..5)
        .map(|i| serde_json::json!({ "candidate": format!("candidate:{i}"), "sdpMLineIndex": 0 }))
        .collect();

    for candidate in &candidates {
        send(
            &relay_tx,
            a,
            SignalRequest::IceCandidate {
                to: b,
                candidate: candidate.clone(),
            },
        )
        .await
        .expect("Candidate send failed");
    }

    settle(&relay_tx, &sink).await.expect("Relay stalled");

    let received = sink.events_for(&b).await;
    let expected: Vec<_> = candidates
        .into_iter()
        .map(|candidate| SignalEvent::IceCandidate { from: a, candidate })
        .collect();

    assert_eq!(received, expected, "Per-recipient order must match emission order");
}
