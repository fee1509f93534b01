use tracing::{debug, info, warn};

use foundation::paths::{self, PathError};

use crate::backend::{AttachRequest, MediaBackend, OverlayOptions, ResourceHandle};
use crate::kind::{OverlayKind, normalize_name};

#[derive(Debug, Clone, PartialEq)]
pub enum OverlayError {
    /// Security rejection: playback never starts on an unsafe path.
    InvalidPath(PathError),
    Playback(String),
}

impl std::fmt::Display for OverlayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OverlayError::InvalidPath(e) => write!(f, "unsafe media path: {e}"),
            OverlayError::Playback(msg) => write!(f, "playback failed: {msg}"),
        }
    }
}

impl std::error::Error for OverlayError {}

#[derive(Debug, Clone, PartialEq)]
struct ActiveResource {
    handle: ResourceHandle,
    path: String,
    /// Surface generation the resource was attached under. If the surface
    /// has been torn down and rebuilt since, the host already destroyed
    /// the nodes and the handle must not be released into the new surface.
    surface_generation: u64,
}

#[derive(Debug, Default)]
struct OverlaySlot {
    active: Option<ActiveResource>,
    close_control_created: bool,
}

/// Owns the three overlay singletons: one typed slot per media kind.
///
/// Within a kind the old resource is always stopped before a new one is
/// attached; the kinds are mutually independent. All host interaction goes
/// through an injected [`MediaBackend`], so staleness against an externally
/// destroyable render surface is checked here, explicitly, before every
/// backend mutation.
#[derive(Debug, Default)]
pub struct OverlayRegistry {
    audio: OverlaySlot,
    image: OverlaySlot,
    video: OverlaySlot,
    resize_hook_installed: bool,
}

impl OverlayRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, kind: OverlayKind) -> &OverlaySlot {
        match kind {
            OverlayKind::Audio => &self.audio,
            OverlayKind::Image => &self.image,
            OverlayKind::Video => &self.video,
        }
    }

    fn slot_mut(&mut self, kind: OverlayKind) -> &mut OverlaySlot {
        match kind {
            OverlayKind::Audio => &mut self.audio,
            OverlayKind::Image => &mut self.image,
            OverlayKind::Video => &mut self.video,
        }
    }

    pub fn is_active(&self, kind: OverlayKind) -> bool {
        self.slot(kind).active.is_some()
    }

    pub fn active_path(&self, kind: OverlayKind) -> Option<&str> {
        self.slot(kind).active.as_ref().map(|a| a.path.as_str())
    }

    /// Normalizes and validates `raw_name`, stops whatever resource of
    /// this kind is active, then attaches the new one.
    ///
    /// Fails closed on an unsafe path: the backend is never touched.
    pub fn play(
        &mut self,
        kind: OverlayKind,
        raw_name: &str,
        options: OverlayOptions,
        surface_generation: u64,
        backend: &mut dyn MediaBackend,
    ) -> Result<(), OverlayError> {
        let path = normalize_name(kind, raw_name);
        paths::validate_relative(&path).map_err(OverlayError::InvalidPath)?;

        self.stop(kind, surface_generation, backend);

        if kind == OverlayKind::Video && !self.resize_hook_installed {
            backend.install_resize_hook();
            self.resize_hook_installed = true;
        }

        let request = AttachRequest {
            path: path.clone(),
            options: options.clamped(),
        };
        let handle = match backend.attach(kind, &request) {
            Ok(handle) => handle,
            Err(e) => {
                warn!(kind = kind.label(), path = path.as_str(), error = %e, "overlay attach rejected");
                return Err(OverlayError::Playback(e.0));
            }
        };

        let slot = self.slot_mut(kind);
        slot.active = Some(ActiveResource {
            handle,
            path: path.clone(),
            surface_generation,
        });
        slot.close_control_created = true;
        backend.set_close_control(kind, true);
        info!(kind = kind.label(), path = path.as_str(), "overlay attached");
        Ok(())
    }

    /// Stops the kind's active resource, hides its close control, and
    /// returns the slot to idle. Idempotent, and safe to call after the
    /// surface holding the resource was torn down: a stale handle is
    /// dropped without a backend release.
    pub fn stop(
        &mut self,
        kind: OverlayKind,
        surface_generation: u64,
        backend: &mut dyn MediaBackend,
    ) {
        let slot = self.slot_mut(kind);
        if let Some(active) = slot.active.take() {
            if active.surface_generation == surface_generation {
                backend.release(kind, active.handle);
            } else {
                debug!(
                    kind = kind.label(),
                    path = active.path.as_str(),
                    "overlay handle is stale; skipping release"
                );
            }
        }
        if slot.close_control_created {
            backend.set_close_control(kind, false);
        }
    }

    /// Stops all three kinds. Used when the whole scene goes away.
    pub fn stop_all(&mut self, surface_generation: u64, backend: &mut dyn MediaBackend) {
        for kind in OverlayKind::ALL {
            self.stop(kind, surface_generation, backend);
        }
    }
}
