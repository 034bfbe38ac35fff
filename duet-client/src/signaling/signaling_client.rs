use crate::error::SignalingError;
use crate::signaling::SignalSink;
use async_trait::async_trait;
use duet_core::{ClientMessage, ServerMessage};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

/// WebSocket connection to the relay.
///
/// Outgoing messages are queued on an unbounded channel and written by a
/// background task in send order. Incoming frames are parsed and forwarded
/// on the receiver returned by [`SignalingClient::connect`], which closes
/// when the socket does.
#[derive(Clone)]
pub struct SignalingClient {
    tx: mpsc::UnboundedSender<ClientMessage>,
}

impl SignalingClient {
    pub async fn connect(
        url: &str,
    ) -> Result<(Self, mpsc::UnboundedReceiver<ServerMessage>), SignalingError> {
        let (socket, _) = connect_async(url).await?;
        info!("Connected to relay at {}", url);

        let (mut sink, mut stream) = socket.split();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<ClientMessage>();
        let (in_tx, in_rx) = mpsc::unbounded_channel();

        let mut send_task = tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                let json = match serde_json::to_string(&msg) {
                    Ok(json) => json,
                    Err(e) => {
                        warn!("Failed to encode {:?}: {}", msg, e);
                        continue;
                    }
                };
                if sink.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
            }
            let _ = sink.close().await;
        });

        let mut recv_task = tokio::spawn(async move {
            while let Some(Ok(frame)) = stream.next().await {
                match frame {
                    Message::Text(text) => {
                        match serde_json::from_str::<ServerMessage>(text.as_str()) {
                            Ok(msg) => {
                                if in_tx.send(msg).is_err() {
                                    break;
                                }
                            }
                            Err(e) => warn!("Invalid ServerMessage: {}", e),
                        }
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        });

        tokio::spawn(async move {
            tokio::select! {
                _ = (&mut send_task) => recv_task.abort(),
                _ = (&mut recv_task) => send_task.abort(),
            };
            debug!("Relay connection closed");
        });

        Ok((Self { tx: out_tx }, in_rx))
    }

    pub fn send(&self, msg: ClientMessage) -> Result<(), SignalingError> {
        self.tx.send(msg).map_err(|_| SignalingError::Closed)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

#[async_trait]
impl SignalSink for SignalingClient {
    async fn send(&self, message: ClientMessage) {
        if let Err(e) = SignalingClient::send(self, message) {
            warn!("Dropping outgoing message: {}", e);
        }
    }
}
