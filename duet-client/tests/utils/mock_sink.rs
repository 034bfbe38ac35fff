use async_trait::async_trait;
use duet_client::SignalSink;
use duet_core::{ClientMessage, ConnectionHandle, PeerSignal};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};

/// Mock SignalSink that captures everything the client sends to the relay.
#[derive(Clone)]
pub struct MockSink {
    tx: mpsc::UnboundedSender<ClientMessage>,
    sent: Arc<Mutex<Vec<ClientMessage>>>,
}

impl MockSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ClientMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sink = Self {
            tx,
            sent: Arc::new(Mutex::new(Vec::new())),
        };
        (sink, rx)
    }

    pub fn new_stored_only() -> Self {
        Self::new().0
    }

    pub async fn sent(&self) -> Vec<ClientMessage> {
        self.sent.lock().await.clone()
    }

    /// Peer signals in send order, with their target.
    pub async fn signals(&self) -> Vec<(ConnectionHandle, PeerSignal)> {
        self.sent
            .lock()
            .await
            .iter()
            .filter_map(|msg| match msg {
                ClientMessage::Signal { to, signal } => Some((*to, signal.clone())),
                _ => None,
            })
            .collect()
    }

    /// Names of the sent signals, e.g. `["CallOffer", "CallAnswer"]`.
    pub async fn signal_names(&self) -> Vec<&'static str> {
        self.signals()
            .await
            .iter()
            .map(|(_, signal)| signal.name())
            .collect()
    }

    pub async fn offers(&self) -> usize {
        self.signals()
            .await
            .iter()
            .filter(|(_, signal)| {
                matches!(
                    signal,
                    PeerSignal::CallOffer { .. } | PeerSignal::NegotiationOffer { .. }
                )
            })
            .count()
    }

    /// `seq` of the most recent offer sent, 0 before any.
    pub async fn last_offer_seq(&self) -> u64 {
        self.signals()
            .await
            .iter()
            .rev()
            .find_map(|(_, signal)| match signal {
                PeerSignal::CallOffer { seq, .. } | PeerSignal::NegotiationOffer { seq, .. } => {
                    Some(*seq)
                }
                _ => None,
            })
            .unwrap_or(0)
    }
}

#[async_trait]
impl SignalSink for MockSink {
    async fn send(&self, message: ClientMessage) {
        tracing::debug!("[MockSink] {:?}", message);

        self.sent.lock().await.push(message.clone());
        let _ = self.tx.send(message);
    }
}

/// Next peer signal from `rx`, skipping relay-level messages.
pub async fn next_signal(
    rx: &mut mpsc::UnboundedReceiver<ClientMessage>,
) -> anyhow::Result<(ConnectionHandle, PeerSignal)> {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await?
            .ok_or_else(|| anyhow::anyhow!("sink closed"))?;
        if let ClientMessage::Signal { to, signal } = msg {
            return Ok((to, signal));
        }
    }
}
