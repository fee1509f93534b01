use crate::kind::OverlayKind;

/// Kind-specific playback options.
///
/// Video defaults follow the reference behavior: muted, looping, autoplay.
/// `size_pct` applies to image/video only and is a percentage of the render
/// surface's current bounding box, clamped to 10..=100.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayOptions {
    pub muted: bool,
    pub looped: bool,
    pub autoplay: bool,
    pub size_pct: Option<u8>,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            muted: true,
            looped: true,
            autoplay: true,
            size_pct: None,
        }
    }
}

impl OverlayOptions {
    pub fn clamped(mut self) -> Self {
        self.size_pct = self.size_pct.map(|p| p.clamp(10, 100));
        self
    }
}

/// What the registry asks the host to attach.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachRequest {
    pub path: String,
    pub options: OverlayOptions,
}

/// Host-side handle for an attached media resource.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ResourceHandle(pub u64);

/// Playback start or attach was rejected by the host. Always reported,
/// never propagated out of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackError(pub String);

impl std::fmt::Display for PlaybackError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "playback failed: {}", self.0)
    }
}

impl std::error::Error for PlaybackError {}

/// The host's media surface. The registry drives it; it owns the actual
/// nodes, players, and the process-wide resize listener.
pub trait MediaBackend {
    fn attach(
        &mut self,
        kind: OverlayKind,
        request: &AttachRequest,
    ) -> Result<ResourceHandle, PlaybackError>;

    /// Releases an attached resource: pause and clear the source for
    /// audio/video, clear the source for an image.
    fn release(&mut self, kind: OverlayKind, handle: ResourceHandle);

    fn set_close_control(&mut self, kind: OverlayKind, visible: bool);

    /// Keeps the video's displayed size synchronized with the render
    /// surface. Called at most once per registry lifetime.
    fn install_resize_hook(&mut self);
}
