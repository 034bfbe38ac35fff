use crate::error::MediaError;
use crate::media::{BindingKind, MediaCapture, MediaStream};
use crate::transport::PeerTransport;
use tracing::{debug, info, warn};

/// The local stream currently owned by the call, and which of its tracks the
/// transport is sending.
#[derive(Debug, Clone)]
pub struct TrackBinding {
    pub kind: BindingKind,
    pub stream: MediaStream,
    pub attached: Vec<String>,
}

impl TrackBinding {
    pub fn is_attached(&self) -> bool {
        !self.attached.is_empty()
    }
}

/// Owns at most one [`TrackBinding`].
///
/// Changing the track set only touches the transport. Renegotiation follows
/// from the transport's negotiation-needed event, never from here.
#[derive(Debug, Default)]
pub struct TrackManager {
    binding: Option<TrackBinding>,
}

impl TrackManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn binding(&self) -> Option<&TrackBinding> {
        self.binding.as_ref()
    }

    pub fn stream(&self) -> Option<&MediaStream> {
        self.binding.as_ref().map(|b| &b.stream)
    }

    pub fn kind(&self) -> Option<BindingKind> {
        self.binding.as_ref().map(|b| b.kind)
    }

    /// Capture a stream for preview without sending it. Reuses the current
    /// binding if there is one.
    pub async fn acquire<C: MediaCapture + ?Sized>(
        &mut self,
        capture: &C,
        kind: BindingKind,
    ) -> Result<MediaStream, MediaError> {
        if let Some(binding) = &self.binding {
            return Ok(binding.stream.clone());
        }

        let stream = capture.acquire(kind).await?;
        debug!("Acquired {:?} stream {}", kind, stream.id);
        self.binding = Some(TrackBinding {
            kind,
            stream: stream.clone(),
            attached: Vec::new(),
        });
        Ok(stream)
    }

    /// Add every track of `stream` to the transport.
    ///
    /// Fails with `BindingConflict` if tracks of a different stream are
    /// already attached. An unattached preview of another stream is stopped
    /// and replaced.
    pub async fn attach_initial<T: PeerTransport + ?Sized>(
        &mut self,
        transport: &T,
        stream: MediaStream,
        kind: BindingKind,
    ) -> Result<(), MediaError> {
        if let Some(active) = &self.binding
            && active.stream.id != stream.id
        {
            if active.is_attached() {
                return Err(MediaError::BindingConflict {
                    active: active.stream.id.clone(),
                    requested: stream.id,
                });
            }
            active.stream.stop_all();
        }

        let mut binding = match self.binding.take() {
            Some(binding) if binding.stream.id == stream.id => binding,
            _ => TrackBinding {
                kind,
                stream,
                attached: Vec::new(),
            },
        };

        let result = attach_tracks(transport, &mut binding).await;
        self.binding = Some(binding);
        result
    }

    /// Replace the active binding with a fresh stream from `kind`.
    ///
    /// Every old track is stopped and removed from the transport before the
    /// new stream is requested, so the device is free. On acquisition
    /// failure the call is left with no local stream.
    pub async fn switch_to<T, C>(
        &mut self,
        transport: &T,
        capture: &C,
        kind: BindingKind,
    ) -> Result<MediaStream, MediaError>
    where
        T: PeerTransport + ?Sized,
        C: MediaCapture + ?Sized,
    {
        self.release(transport).await;

        let stream = capture.acquire(kind).await?;
        info!("Switching to {:?} stream {}", kind, stream.id);

        let mut binding = TrackBinding {
            kind,
            stream: stream.clone(),
            attached: Vec::new(),
        };
        let result = attach_tracks(transport, &mut binding).await;
        self.binding = Some(binding);
        result.map(|_| stream)
    }

    /// Stop and detach everything.
    pub async fn release<T: PeerTransport + ?Sized>(&mut self, transport: &T) {
        let Some(binding) = self.binding.take() else {
            return;
        };

        binding.stream.stop_all();
        for track_id in &binding.attached {
            if let Err(e) = transport.remove_track(track_id).await {
                warn!("Failed to remove track {}: {}", track_id, e);
            }
        }
        debug!("Released {:?} stream {}", binding.kind, binding.stream.id);
    }
}

async fn attach_tracks<T: PeerTransport + ?Sized>(
    transport: &T,
    binding: &mut TrackBinding,
) -> Result<(), MediaError> {
    for track in &binding.stream.tracks {
        if binding.attached.contains(&track.id) {
            continue;
        }
        transport.add_track(track).await?;
        binding.attached.push(track.id.clone());
    }
    Ok(())
}
