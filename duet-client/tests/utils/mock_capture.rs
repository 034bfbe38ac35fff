use async_trait::async_trait;
use duet_client::{BindingKind, MediaCapture, MediaError, MediaStream, TrackKind};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

/// Capture that hands out synthetic streams and remembers whether any
/// earlier stream was still live when a new one was requested.
#[derive(Default)]
pub struct MockCapture {
    issued: Mutex<Vec<MediaStream>>,
    live_at_request: Mutex<Vec<bool>>,
    deny_display: AtomicBool,
    deny_camera: AtomicBool,
}

impl MockCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deny_display(&self) {
        self.deny_display.store(true, Ordering::SeqCst);
    }

    pub fn deny_camera(&self) {
        self.deny_camera.store(true, Ordering::SeqCst);
    }

    pub async fn issued(&self) -> Vec<MediaStream> {
        self.issued.lock().await.clone()
    }

    /// For each request, whether an earlier stream still held a device.
    pub async fn live_at_request(&self) -> Vec<bool> {
        self.live_at_request.lock().await.clone()
    }

    async fn issue(&self, kind: BindingKind, kinds: &[TrackKind]) -> Result<MediaStream, MediaError> {
        let mut issued = self.issued.lock().await;
        self.live_at_request
            .lock()
            .await
            .push(issued.iter().any(|s| s.is_live()));

        let denied = match kind {
            BindingKind::Camera => self.deny_camera.load(Ordering::SeqCst),
            BindingKind::Screen => self.deny_display.load(Ordering::SeqCst),
        };
        if denied {
            return Err(MediaError::AcquisitionFailure {
                kind,
                reason: "permission denied".into(),
            });
        }

        let stream = MediaStream::with_kinds(kinds);
        issued.push(stream.clone());
        Ok(stream)
    }
}

#[async_trait]
impl MediaCapture for MockCapture {
    async fn user_media(&self) -> Result<MediaStream, MediaError> {
        self.issue(BindingKind::Camera, &[TrackKind::Audio, TrackKind::Video])
            .await
    }

    async fn display_media(&self) -> Result<MediaStream, MediaError> {
        self.issue(BindingKind::Screen, &[TrackKind::Video]).await
    }
}
