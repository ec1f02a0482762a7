use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum MediaError {
    /// Capture device unavailable or permission denied. Recoverable: the
    /// caller may retry the join.
    #[error("media acquisition failed: {0}")]
    Acquisition(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Audio,
    Video,
}

/// Opaque handle to one locally captured track, attached to every peer
/// transport in the mesh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalTrack {
    pub id: Uuid,
    pub kind: TrackKind,
}

impl LocalTrack {
    pub fn new(kind: TrackKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
        }
    }
}

/// Opaque handle to a renderable remote stream. The peer link owns the
/// transport that produced it; consumers only observe the handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamHandle(pub Uuid);

impl StreamHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for StreamHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Seam to the capture/render side. Acquisition is the one-time blocking
/// step that gates room entry; the enable toggles act on the already
/// captured tracks.
#[async_trait]
pub trait MediaSubsystem: Send + Sync {
    async fn acquire_local(&self) -> Result<Vec<LocalTrack>, MediaError>;

    fn set_audio_enabled(&self, enabled: bool);

    fn set_video_enabled(&self, enabled: bool);
}
