use duet_core::{RelayError, RoomId, ServerMessage};

use crate::integration::{create_test_relay, init_tracing};

#[tokio::test]
async fn test_room_full() {
    init_tracing();

    let (relay, output, h) = create_test_relay(3);
    let room = RoomId::from("42");

    relay.join(h[0], room.clone(), "one".into()).await.unwrap();
    relay.join(h[1], room.clone(), "two".into()).await.unwrap();
    let before = output.total().await;

    let err = relay
        .join(h[2], room.clone(), "three".into())
        .await
        .unwrap_err();

    assert_eq!(err, RelayError::RoomFull(room.clone()));
    assert_eq!(relay.directory().members(&room), vec![h[0], h[1]]);
    assert_eq!(relay.directory().registry().room_of(&h[2]), None);
    assert_eq!(
        output.total().await,
        before,
        "A rejected join must not notify anyone"
    );
    assert!(
        !output
            .messages_for(&h[0])
            .await
            .iter()
            .any(|m| matches!(m, ServerMessage::PeerJoined { connection, .. } if *connection == h[2]))
    );
}
