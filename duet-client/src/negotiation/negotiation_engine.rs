use crate::config::EngineConfig;
use crate::error::NegotiationError;
use crate::negotiation::NegotiationState;
use crate::signaling::SignalSink;
use crate::transport::PeerTransport;
use duet_core::{ClientMessage, ConnectionHandle, PeerSignal, SessionDescription};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Drives offer/answer for one call over a single transport.
///
/// Only one local offer is ever outstanding. Renegotiation requests that
/// arrive while an exchange is in flight set a pending flag and are issued
/// once the engine is back in `Stable`.
pub struct NegotiationEngine<T: PeerTransport + ?Sized> {
    transport: Arc<T>,
    sink: Arc<dyn SignalSink>,
    local: Option<ConnectionHandle>,
    remote: Option<ConnectionHandle>,
    state: NegotiationState,
    /// Where an abandoned offer returns to.
    settled: NegotiationState,
    renegotiation_pending: bool,
    /// Sequence number of the last offer issued.
    offer_seq: u64,
    offer_sent_at: Option<Instant>,
    offer_timeout: Duration,
}

impl<T: PeerTransport + ?Sized> NegotiationEngine<T> {
    pub fn new(transport: Arc<T>, sink: Arc<dyn SignalSink>, config: &EngineConfig) -> Self {
        Self {
            transport,
            sink,
            local: None,
            remote: None,
            state: NegotiationState::Idle,
            settled: NegotiationState::Idle,
            renegotiation_pending: false,
            offer_seq: 0,
            offer_sent_at: None,
            offer_timeout: config.offer_timeout,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn state(&self) -> NegotiationState {
        self.state
    }

    pub fn local(&self) -> Option<ConnectionHandle> {
        self.local
    }

    pub fn set_local(&mut self, handle: ConnectionHandle) {
        self.local = Some(handle);
    }

    pub fn remote(&self) -> Option<ConnectionHandle> {
        self.remote
    }

    pub fn set_remote(&mut self, handle: ConnectionHandle) {
        if let Some(previous) = self.remote.replace(handle)
            && previous != handle
        {
            warn!("Remote peer changed from {} to {}", previous, handle);
        }
    }

    /// Whether an offer/answer exchange has completed with the remote.
    pub fn is_established(&self) -> bool {
        self.state == NegotiationState::Stable || self.settled == NegotiationState::Stable
    }

    pub fn is_renegotiation_pending(&self) -> bool {
        self.renegotiation_pending
    }

    /// When the outstanding offer will be given up on.
    pub fn offer_deadline(&self) -> Option<Instant> {
        match self.state {
            NegotiationState::OfferSent => self.offer_sent_at.map(|at| at + self.offer_timeout),
            _ => None,
        }
    }

    /// Start an exchange. Returns `false` if one is already in flight, in
    /// which case the request is remembered and issued later.
    pub async fn create_offer(&mut self) -> Result<bool, NegotiationError> {
        let remote = self.remote.ok_or(NegotiationError::NoRemotePeer)?;

        if !self.state.is_settled() {
            debug!(
                "Negotiation with {} deferred while {:?}",
                remote, self.state
            );
            self.renegotiation_pending = true;
            return Ok(false);
        }

        let offer = self.transport.create_offer().await?;
        self.transport
            .set_local_description(offer.clone())
            .await
            .map_err(NegotiationError::DescriptionApplyFailure)?;

        self.offer_seq += 1;
        let seq = self.offer_seq;
        let signal = match self.state {
            NegotiationState::Idle => PeerSignal::CallOffer { offer, seq },
            _ => PeerSignal::NegotiationOffer { offer, seq },
        };

        self.settled = self.state;
        self.state = NegotiationState::OfferSent;
        self.renegotiation_pending = false;
        self.offer_sent_at = Some(Instant::now());

        info!("Sending {} #{} to {}", signal.name(), seq, remote);
        self.emit(remote, signal).await;
        Ok(true)
    }

    /// The transport's track set changed.
    pub async fn on_negotiation_needed(&mut self) -> Result<(), NegotiationError> {
        if self.remote.is_none() {
            debug!("Negotiation needed but no remote peer yet");
            return Ok(());
        }
        self.create_offer().await.map(|_| ())
    }

    pub async fn handle_signal(
        &mut self,
        from: ConnectionHandle,
        signal: PeerSignal,
    ) -> Result<(), NegotiationError> {
        let is_offer = matches!(
            signal,
            PeerSignal::CallOffer { .. } | PeerSignal::NegotiationOffer { .. }
        );

        match self.remote {
            None if is_offer => self.remote = Some(from),
            Some(remote) if remote != from => {
                warn!(
                    "Ignoring {} from {}, in a call with {}",
                    signal.name(),
                    from,
                    remote
                );
                return Ok(());
            }
            _ => {}
        }

        let name = signal.name();
        match signal {
            PeerSignal::CallOffer { offer, seq } => {
                self.handle_offer(from, offer, seq, true, name).await
            }
            PeerSignal::NegotiationOffer { offer, seq } => {
                self.handle_offer(from, offer, seq, false, name).await
            }
            PeerSignal::CallAnswer { answer, seq }
            | PeerSignal::NegotiationAnswer { answer, seq } => {
                self.handle_answer(answer, seq, name).await
            }
            PeerSignal::ScreenShareStart => Ok(()),
        }
    }

    /// Roll back and re-issue an offer that has gone unanswered for too long.
    /// Returns `true` if the offer was re-issued.
    pub async fn check_offer_timeout(&mut self, now: Instant) -> Result<bool, NegotiationError> {
        let Some(deadline) = self.offer_deadline() else {
            return Ok(false);
        };
        if now < deadline {
            return Ok(false);
        }

        warn!(
            "Offer to {:?} unanswered after {:?}, abandoning",
            self.remote, self.offer_timeout
        );
        self.abandon_offer().await;
        self.create_offer().await
    }

    /// Forget the remote peer and any exchange in flight.
    pub async fn reset(&mut self) {
        if self.state == NegotiationState::OfferSent {
            self.abandon_offer().await;
        }
        self.remote = None;
        self.state = NegotiationState::Idle;
        self.settled = NegotiationState::Idle;
        self.renegotiation_pending = false;
        self.offer_sent_at = None;
    }

    async fn handle_offer(
        &mut self,
        from: ConnectionHandle,
        offer: SessionDescription,
        seq: u64,
        initial: bool,
        name: &'static str,
    ) -> Result<(), NegotiationError> {
        if !offer.is_offer() {
            return Err(NegotiationError::UnexpectedDescription { signal: name });
        }

        if self.state == NegotiationState::OfferSent {
            if !self.is_polite() {
                info!("Offer collision with {}, keeping ours", from);
                return Ok(());
            }
            info!("Offer collision with {}, yielding", from);
            self.abandon_offer().await;
            self.renegotiation_pending = true;
        }

        let prior = self.state;
        self.state = NegotiationState::OfferReceived;

        if let Err(e) = self.transport.set_remote_description(offer).await {
            self.state = prior;
            return Err(NegotiationError::DescriptionApplyFailure(e));
        }

        let answer = match self.transport.create_answer().await {
            Ok(answer) => answer,
            Err(e) => {
                self.revert(prior).await;
                return Err(e.into());
            }
        };

        if let Err(e) = self.transport.set_local_description(answer.clone()).await {
            self.revert(prior).await;
            return Err(NegotiationError::DescriptionApplyFailure(e));
        }

        let signal = if initial {
            PeerSignal::CallAnswer { answer, seq }
        } else {
            PeerSignal::NegotiationAnswer { answer, seq }
        };

        self.state = NegotiationState::Stable;
        info!("Sending {} to {}", signal.name(), from);
        self.emit(from, signal).await;
        self.resume_pending().await
    }

    async fn handle_answer(
        &mut self,
        answer: SessionDescription,
        seq: u64,
        name: &'static str,
    ) -> Result<(), NegotiationError> {
        if self.state != NegotiationState::OfferSent {
            warn!("Dropping {} received while {:?}", name, self.state);
            return Err(NegotiationError::UnexpectedAnswer(self.state));
        }
        // Answer to an offer that was since abandoned.
        if seq != self.offer_seq {
            warn!(
                "Dropping stale {} #{}, waiting on #{}",
                name, seq, self.offer_seq
            );
            return Ok(());
        }
        if answer.is_offer() {
            return Err(NegotiationError::UnexpectedDescription { signal: name });
        }

        if let Err(e) = self.transport.set_remote_description(answer).await {
            warn!("Remote answer rejected: {}", e);
            self.abandon_offer().await;
            return Err(NegotiationError::DescriptionApplyFailure(e));
        }

        self.state = NegotiationState::Stable;
        self.offer_sent_at = None;
        self.resume_pending().await
    }

    async fn resume_pending(&mut self) -> Result<(), NegotiationError> {
        if !self.renegotiation_pending {
            return Ok(());
        }
        info!("Issuing deferred offer");
        self.create_offer().await.map(|_| ())
    }

    /// Lower handle yields on collision.
    fn is_polite(&self) -> bool {
        match (self.local, self.remote) {
            (Some(local), Some(remote)) => local < remote,
            _ => true,
        }
    }

    async fn abandon_offer(&mut self) {
        self.revert(self.settled).await;
        self.offer_sent_at = None;
    }

    async fn revert(&mut self, to: NegotiationState) {
        if let Err(e) = self.transport.rollback().await {
            warn!("Rollback failed: {}", e);
        }
        self.state = to;
    }

    async fn emit(&self, to: ConnectionHandle, signal: PeerSignal) {
        self.sink.send(ClientMessage::Signal { to, signal }).await;
    }
}
