use crate::config::EngineConfig;
use crate::media::{BindingKind, MediaCapture};
use crate::negotiation::NegotiationEngine;
use crate::session::{CallView, SessionCommand, SessionEvent};
use crate::signaling::SignalSink;
use crate::tracks::TrackManager;
use crate::transport::{PeerTransport, TransportEvent, TransportState};
use duet_core::{ClientMessage, PeerSignal, ServerMessage};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// The UI side of a running [`CallSession`].
pub struct CallHandle {
    commands: mpsc::UnboundedSender<SessionCommand>,
    pub view: watch::Receiver<CallView>,
    pub events: mpsc::UnboundedReceiver<SessionEvent>,
}

impl CallHandle {
    /// Returns `false` once the session has ended.
    pub fn send(&self, command: SessionCommand) -> bool {
        self.commands.send(command).is_ok()
    }
}

/// Single owner of a call's negotiation engine and local tracks.
///
/// Relay messages, transport events, user commands and the offer timeout
/// are handled one at a time, so negotiation steps never interleave.
///
/// A session lasts for one call with one peer. When that peer leaves the
/// session leaves the room and shuts down like a hangup; a new call needs a
/// new session and a new transport.
pub struct CallSession<T: PeerTransport + ?Sized, C: MediaCapture + ?Sized> {
    engine: NegotiationEngine<T>,
    tracks: TrackManager,
    capture: Arc<C>,
    sink: Arc<dyn SignalSink>,
    commands: mpsc::UnboundedReceiver<SessionCommand>,
    view: watch::Sender<CallView>,
    events: mpsc::UnboundedSender<SessionEvent>,
}

impl<T: PeerTransport + ?Sized, C: MediaCapture + ?Sized> CallSession<T, C> {
    pub fn new(
        transport: Arc<T>,
        capture: Arc<C>,
        sink: Arc<dyn SignalSink>,
        config: &EngineConfig,
    ) -> (Self, CallHandle) {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (view_tx, view_rx) = watch::channel(CallView::default());
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let session = Self {
            engine: NegotiationEngine::new(transport, sink.clone(), config),
            tracks: TrackManager::new(),
            capture,
            sink,
            commands: commands_rx,
            view: view_tx,
            events: events_tx,
        };

        let handle = CallHandle {
            commands: commands_tx,
            view: view_rx,
            events: events_rx,
        };

        (session, handle)
    }

    pub fn engine(&self) -> &NegotiationEngine<T> {
        &self.engine
    }

    /// Run until hangup, the handle is dropped, or the relay goes away.
    pub async fn run(
        mut self,
        mut server: mpsc::UnboundedReceiver<ServerMessage>,
        mut transport_events: mpsc::UnboundedReceiver<TransportEvent>,
    ) {
        loop {
            let deadline = self.engine.offer_deadline();

            tokio::select! {
                msg = server.recv() => match msg {
                    Some(msg) => {
                        if !self.on_server_message(msg).await {
                            self.sink.send(ClientMessage::Leave).await;
                            break;
                        }
                    }
                    None => {
                        info!("Relay connection closed, ending call");
                        break;
                    }
                },
                Some(event) = transport_events.recv() => self.on_transport_event(event).await,
                command = self.commands.recv() => match command {
                    Some(SessionCommand::Hangup) | None => {
                        self.sink.send(ClientMessage::Leave).await;
                        break;
                    }
                    Some(command) => self.on_command(command).await,
                },
                _ = wait_until(deadline) => {
                    if let Err(e) = self.engine.check_offer_timeout(Instant::now()).await {
                        self.negotiation_failed(e);
                    }
                }
            }
        }

        self.shutdown().await;
    }

    /// Returns `false` once the call is over.
    async fn on_server_message(&mut self, msg: ServerMessage) -> bool {
        match msg {
            ServerMessage::Welcome { connection, .. } => {
                debug!("Relay assigned handle {}", connection);
                self.engine.set_local(connection);
            }
            ServerMessage::Joined {
                room,
                connection,
                peers,
            } => {
                self.engine.set_local(connection);
                if let Some(peer) = peers.first() {
                    self.engine.set_remote(peer.connection);
                }
                self.sync_connected();
                self.emit(SessionEvent::Joined { room, peers });
            }
            ServerMessage::PeerJoined {
                display_identity,
                connection,
            } => {
                info!("{} ({}) joined", display_identity, connection);
                self.engine.set_remote(connection);
                self.sync_connected();
                self.emit(SessionEvent::PeerJoined {
                    display_identity,
                    connection,
                });
            }
            ServerMessage::PeerLeft { connection } => {
                self.emit(SessionEvent::PeerLeft { connection });
                if self.engine.remote() == Some(connection) {
                    info!("{} left, ending call", connection);
                    return false;
                }
            }
            ServerMessage::Signal {
                from,
                signal: PeerSignal::ScreenShareStart,
            } => {
                if self.engine.remote() == Some(from) {
                    self.emit(SessionEvent::ScreenShareStarted { from });
                } else {
                    warn!("Ignoring ScreenShareStart from {}", from);
                }
            }
            ServerMessage::Signal { from, signal } => {
                let accepted = matches!(signal, PeerSignal::CallAnswer { .. });
                if matches!(signal, PeerSignal::CallOffer { .. }) && self.tracks.stream().is_none()
                {
                    self.preview(BindingKind::Camera).await;
                }
                match self.engine.handle_signal(from, signal).await {
                    Ok(()) => {
                        let unsent = !self.tracks.binding().is_some_and(|b| b.is_attached());
                        if accepted && unsent && self.engine.is_established() {
                            info!("Call accepted by {}, sending streams", from);
                            self.send_streams().await;
                        }
                    }
                    Err(e) => self.negotiation_failed(e),
                }
                self.sync_connected();
            }
            ServerMessage::Error { kind, message } => {
                warn!("Relay rejected a request ({:?}): {}", kind, message);
                self.emit(SessionEvent::RelayError { kind, message });
            }
        }
        true
    }

    async fn on_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::NegotiationNeeded => {
                if let Err(e) = self.engine.on_negotiation_needed().await {
                    self.negotiation_failed(e);
                }
            }
            TransportEvent::RemoteTrack(track) => {
                self.view.send_modify(|view| view.add_remote_track(track));
            }
            TransportEvent::StateChanged(state) => {
                info!("Transport {:?}", state);
                if matches!(state, TransportState::Failed | TransportState::Closed) {
                    self.view.send_modify(|view| view.remote_stream = None);
                }
            }
        }
    }

    async fn on_command(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Call => {
                self.preview(BindingKind::Camera).await;
                if let Err(e) = self.engine.create_offer().await {
                    self.negotiation_failed(e);
                }
            }
            SessionCommand::SendStreams => self.send_streams().await,
            SessionCommand::ToggleScreenShare => {
                let target = self
                    .tracks
                    .kind()
                    .map_or(BindingKind::Screen, BindingKind::toggled);
                let result = self
                    .tracks
                    .switch_to(self.engine.transport(), self.capture.as_ref(), target)
                    .await;

                match result {
                    Ok(stream) => {
                        let sharing = target == BindingKind::Screen;
                        self.view.send_modify(|view| {
                            view.local_stream = Some(stream);
                            view.screen_sharing = sharing;
                        });
                        if let (true, Some(to)) = (sharing, self.engine.remote()) {
                            self.sink
                                .send(ClientMessage::Signal {
                                    to,
                                    signal: PeerSignal::ScreenShareStart,
                                })
                                .await;
                        }
                    }
                    Err(e) => {
                        self.view.send_modify(|view| {
                            view.local_stream = None;
                            view.screen_sharing = false;
                        });
                        self.media_failed(e);
                    }
                }
            }
            SessionCommand::Hangup => {}
        }
    }

    /// Attach the current (or a fresh camera) stream to the transport.
    async fn send_streams(&mut self) {
        let kind = self.tracks.kind().unwrap_or(BindingKind::Camera);
        let stream = match self.tracks.acquire(self.capture.as_ref(), kind).await {
            Ok(stream) => stream,
            Err(e) => return self.media_failed(e),
        };
        let result = self
            .tracks
            .attach_initial(self.engine.transport(), stream.clone(), kind)
            .await;
        match result {
            Ok(()) => self.view.send_modify(|view| view.local_stream = Some(stream)),
            Err(e) => self.media_failed(e),
        }
    }

    async fn preview(&mut self, kind: BindingKind) {
        match self.tracks.acquire(self.capture.as_ref(), kind).await {
            Ok(stream) => self.view.send_modify(|view| view.local_stream = Some(stream)),
            Err(e) => self.media_failed(e),
        }
    }

    async fn shutdown(&mut self) {
        self.tracks.release(self.engine.transport()).await;
        self.engine.reset().await;
        if let Err(e) = self.engine.transport().close().await {
            warn!("Failed to close transport: {}", e);
        }
        self.view.send_replace(CallView::default());
        info!("Call ended");
    }

    fn sync_connected(&self) {
        let connected = self.engine.remote().is_some();
        self.view.send_if_modified(|view| {
            let changed = view.connected != connected;
            view.connected = connected;
            changed
        });
    }

    fn negotiation_failed(&self, e: crate::error::NegotiationError) {
        warn!("Negotiation failed: {}", e);
        self.emit(SessionEvent::NegotiationFailed(e.to_string()));
    }

    fn media_failed(&self, e: crate::error::MediaError) {
        warn!("Media failed: {}", e);
        self.emit(SessionEvent::MediaFailed(e.to_string()));
    }

    fn emit(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
