use crate::error::MediaError;
use crate::media::MediaStream;
use async_trait::async_trait;

/// Which capture source a binding came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Camera,
    Screen,
}

impl BindingKind {
    pub fn toggled(self) -> Self {
        match self {
            BindingKind::Camera => BindingKind::Screen,
            BindingKind::Screen => BindingKind::Camera,
        }
    }
}

/// Platform media capture: camera/microphone and display.
#[async_trait]
pub trait MediaCapture: Send + Sync {
    async fn user_media(&self) -> Result<MediaStream, MediaError>;

    async fn display_media(&self) -> Result<MediaStream, MediaError>;

    async fn acquire(&self, kind: BindingKind) -> Result<MediaStream, MediaError> {
        match kind {
            BindingKind::Camera => self.user_media().await,
            BindingKind::Screen => self.display_media().await,
        }
    }
}
