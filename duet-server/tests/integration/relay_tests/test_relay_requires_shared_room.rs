use duet_core::{PeerSignal, RelayError, RoomId, ServerMessage, SessionDescription};

use crate::integration::{create_test_relay, init_tracing};

#[tokio::test]
async fn test_offer_is_forwarded_verbatim() {
    init_tracing();

    let (relay, output, h) = create_test_relay(2);
    let room = RoomId::from("42");
    relay.join(h[0], room.clone(), "one".into()).await.unwrap();
    relay.join(h[1], room.clone(), "two".into()).await.unwrap();

    let offer = SessionDescription::offer("v=0\r\no=- 1 1 IN IP4 0.0.0.0\r\n");
    relay
        .relay(
            h[0],
            h[1],
            PeerSignal::CallOffer {
                offer: offer.clone(),
                seq: 1,
            },
        )
        .await
        .expect("relay failed");

    let to_c2 = output.messages_for(&h[1]).await;
    assert_eq!(
        to_c2.last(),
        Some(&ServerMessage::Signal {
            from: h[0],
            signal: PeerSignal::CallOffer { offer, seq: 1 },
        })
    );
}

#[tokio::test]
async fn test_relay_across_rooms_is_rejected() {
    init_tracing();

    let (relay, output, h) = create_test_relay(3);
    relay.join(h[0], RoomId::from("a"), "one".into()).await.unwrap();
    relay.join(h[1], RoomId::from("b"), "two".into()).await.unwrap();
    let before = output.total().await;

    let err = relay
        .relay(h[0], h[1], PeerSignal::ScreenShareStart)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        RelayError::NotInSameRoom {
            sender: h[0],
            target: h[1]
        }
    );

    // Not in any room at all.
    let err = relay
        .relay(h[2], h[0], PeerSignal::ScreenShareStart)
        .await
        .unwrap_err();
    assert!(matches!(err, RelayError::NotInSameRoom { .. }));

    assert_eq!(output.total().await, before, "Nothing may be forwarded");
}

#[tokio::test]
async fn test_relay_to_self_is_rejected() {
    let (relay, _output, h) = create_test_relay(1);
    relay.join(h[0], RoomId::from("a"), "one".into()).await.unwrap();

    let err = relay
        .relay(h[0], h[0], PeerSignal::ScreenShareStart)
        .await
        .unwrap_err();
    assert!(matches!(err, RelayError::NotInSameRoom { .. }));
}
