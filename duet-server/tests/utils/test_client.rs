use anyhow::{Context, Result, bail};
use duet_core::{ClientMessage, ConnectionHandle, PeerSignal, RoomId, ServerMessage};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Timeout for a single expected server message (ms).
pub const RECV_TIMEOUT_MS: u64 = 2000;

/// A raw WebSocket participant talking JSON to the relay.
pub struct TestClient {
    /// Handle assigned by the relay in `Welcome`.
    pub connection: ConnectionHandle,
    sink: SplitSink<Socket, Message>,
    stream: SplitStream<Socket>,
}

impl TestClient {
    /// Connect and consume the `Welcome` message.
    pub async fn connect(addr: SocketAddr) -> Result<Self> {
        let (socket, _) = connect_async(format!("ws://{}/ws", addr))
            .await
            .context("Failed to open WebSocket")?;
        let (sink, stream) = socket.split();

        let mut client = Self {
            connection: ConnectionHandle::new(),
            sink,
            stream,
        };

        match client.recv().await? {
            ServerMessage::Welcome { connection, .. } => client.connection = connection,
            other => bail!("Expected Welcome, got {:?}", other),
        }

        Ok(client)
    }

    pub async fn send(&mut self, msg: &ClientMessage) -> Result<()> {
        let json = serde_json::to_string(msg)?;
        self.sink.send(Message::Text(json.into())).await?;
        Ok(())
    }

    pub async fn send_raw(&mut self, text: &str) -> Result<()> {
        self.sink.send(Message::Text(text.to_string().into())).await?;
        Ok(())
    }

    pub async fn join(&mut self, room: &str, identity: &str) -> Result<ServerMessage> {
        self.send(&ClientMessage::Join {
            room: RoomId::from(room),
            display_identity: identity.to_string(),
        })
        .await?;
        self.recv().await
    }

    pub async fn signal(&mut self, to: ConnectionHandle, signal: PeerSignal) -> Result<()> {
        self.send(&ClientMessage::Signal { to, signal }).await
    }

    /// Next server message, or an error after [`RECV_TIMEOUT_MS`].
    pub async fn recv(&mut self) -> Result<ServerMessage> {
        self.recv_within(RECV_TIMEOUT_MS).await
    }

    pub async fn recv_within(&mut self, timeout_ms: u64) -> Result<ServerMessage> {
        loop {
            let frame = tokio::time::timeout(Duration::from_millis(timeout_ms), self.stream.next())
                .await
                .context("Timeout waiting for server message")?;

            match frame {
                Some(Ok(Message::Text(text))) => {
                    return serde_json::from_str(text.as_str())
                        .context("Server sent an invalid message");
                }
                Some(Ok(Message::Close(_))) | None => bail!("Socket closed"),
                Some(Ok(_)) => continue,
                Some(Err(e)) => bail!("WebSocket error: {}", e),
            }
        }
    }

    /// True if nothing arrives within `ms`.
    pub async fn expect_silence(&mut self, ms: u64) -> bool {
        self.recv_within(ms).await.is_err()
    }

    pub async fn close(mut self) -> Result<()> {
        self.sink.send(Message::Close(None)).await?;
        Ok(())
    }
}
