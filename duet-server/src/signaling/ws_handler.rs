use crate::AppState;
use axum::extract::State;
use axum::extract::WebSocketUpgrade;
use axum::extract::ws::{Message, WebSocket};
use axum::response::IntoResponse;
use duet_core::{ClientMessage, ConnectionHandle, ErrorKind, RelayError, ServerMessage};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let connection = ConnectionHandle::new();
    info!("New WebSocket connection: {}", connection);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    state.signaling.add_peer(connection, tx);
    state.relay.connect(connection);
    state.signaling.send_signal(
        connection,
        &ServerMessage::Welcome {
            connection,
            ice_servers: state.signaling.get_ice_servers(),
        },
    );

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let state = state.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                        Ok(message) => dispatch(&state, connection, message).await,
                        Err(e) => {
                            warn!("Invalid ClientMessage from {}: {:?}", connection, e);
                            state.signaling.send_signal(
                                connection,
                                &ServerMessage::Error {
                                    kind: ErrorKind::InvalidMessage,
                                    message: e.to_string(),
                                },
                            );
                        }
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    state.signaling.remove_peer(&connection);
    state.relay.disconnect(connection).await;
    info!("WebSocket disconnected: {}", connection);
}

/// Route one client message. Errors are local to the message and never
/// close the socket.
async fn dispatch(state: &AppState, connection: ConnectionHandle, message: ClientMessage) {
    let result = match message {
        ClientMessage::Join {
            room,
            display_identity,
        } => state
            .relay
            .join(connection, room, display_identity)
            .await
            .map(|_| ()),
        ClientMessage::Leave => state.relay.leave(connection).await,
        ClientMessage::Signal { to, signal } => state.relay.relay(connection, to, signal).await,
    };

    let Err(e) = result else {
        return;
    };

    match e {
        RelayError::NotInSameRoom { .. } => {
            warn!("Dropped signal from {}: {}", connection, e);
        }
        _ => {
            warn!("Request from {} rejected: {}", connection, e);
            state.signaling.send_signal(
                connection,
                &ServerMessage::Error {
                    kind: e.kind(),
                    message: e.to_string(),
                },
            );
        }
    }
}
