pub mod relay_tests;

use std::net::SocketAddr;
use std::sync::Arc;

use duet_core::ConnectionHandle;
use duet_server::{AppState, ConnectionRegistry, Relay, RelayConfig, RoomDirectory, router};
use tokio::net::TcpListener;
use tracing::Level;

use crate::utils::MockSignalingOutput;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// A relay wired to a capturing output, with `n` connected participants.
pub fn create_test_relay(n: usize) -> (Relay, MockSignalingOutput, Vec<ConnectionHandle>) {
    let output = MockSignalingOutput::new_stored_only();
    let relay = Relay::new(
        RoomDirectory::new(ConnectionRegistry::new()),
        Arc::new(output.clone()),
    );

    let handles = (0..n)
        .map(|_| {
            let handle = ConnectionHandle::new();
            relay.connect(handle);
            handle
        })
        .collect();

    (relay, output, handles)
}

/// Start a real relay on an ephemeral port.
pub async fn spawn_test_server() -> (SocketAddr, Arc<AppState>) {
    let state = AppState::new(&RelayConfig::default());
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("No local addr");

    let app = router(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (addr, state)
}
