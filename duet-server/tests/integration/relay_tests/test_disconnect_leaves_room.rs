use duet_core::{PeerSignal, RelayError, RoomId, ServerMessage, SessionDescription};

use crate::integration::{create_test_relay, init_tracing};

#[tokio::test]
async fn test_disconnect_mid_offer() {
    init_tracing();

    let (relay, output, h) = create_test_relay(2);
    let room = RoomId::from("42");
    relay.join(h[0], room.clone(), "one".into()).await.unwrap();
    relay.join(h[1], room.clone(), "two".into()).await.unwrap();

    // c1 has an offer in flight when it goes away.
    relay
        .relay(
            h[0],
            h[1],
            PeerSignal::CallOffer {
                offer: SessionDescription::offer("v=0"),
                seq: 1,
            },
        )
        .await
        .unwrap();
    let delivered_to_c1 = output.messages_for(&h[0]).await.len();

    relay.disconnect(h[0]).await;

    assert_eq!(relay.directory().members(&room), vec![h[1]]);
    assert!(!relay.directory().registry().contains(&h[0]));
    assert_eq!(
        output.messages_for(&h[1]).await.last(),
        Some(&ServerMessage::PeerLeft { connection: h[0] })
    );

    // The answer has nowhere to go.
    let err = relay
        .relay(
            h[1],
            h[0],
            PeerSignal::CallAnswer {
                answer: SessionDescription::answer("v=0"),
                seq: 1,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RelayError::NotInSameRoom { .. }));
    assert_eq!(output.messages_for(&h[0]).await.len(), delivered_to_c1);
}

#[tokio::test]
async fn test_silent_leave_when_notifications_disabled() {
    let (relay, output, h) = create_test_relay(2);
    let relay = relay.with_peer_left_notifications(false);
    let room = RoomId::from("42");
    relay.join(h[0], room.clone(), "one".into()).await.unwrap();
    relay.join(h[1], room.clone(), "two".into()).await.unwrap();
    let before = output.total().await;

    relay.leave(h[0]).await.unwrap();

    assert_eq!(output.total().await, before);
    assert_eq!(relay.directory().members(&room), vec![h[1]]);
}

#[tokio::test]
async fn test_last_leave_destroys_room() {
    let (relay, _output, h) = create_test_relay(1);
    relay.join(h[0], RoomId::from("42"), "one".into()).await.unwrap();
    assert_eq!(relay.directory().room_count(), 1);

    relay.leave(h[0]).await.unwrap();
    assert_eq!(relay.directory().room_count(), 0);

    let err = relay.leave(h[0]).await.unwrap_err();
    assert_eq!(err, RelayError::NotInRoom(h[0]));
}
