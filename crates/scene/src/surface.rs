use std::collections::HashMap;

use tracing::{debug, warn};

use foundation::config::MapConfig;
use foundation::paths::{self, PathError};
use formats::{MapDocument, Rgba, parse_hex_color};

use crate::events::{EventRegistry, ZoneSubscription};

const IMAGES_FOLDER: &str = "images";

/// The host's script-execution collaborator. Zone scripts are opaque
/// strings handed over verbatim on activation.
pub trait ScriptExecutor {
    fn execute(&mut self, script: &str) -> Result<(), ScriptError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptError(pub String);

impl std::fmt::Display for ScriptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "script execution failed: {}", self.0)
    }
}

impl std::error::Error for ScriptError {}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    /// The host tore down the target container; nothing can be drawn.
    ContainerMissing,
    InvalidBackground(PathError),
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::ContainerMissing => write!(f, "render surface container is missing"),
            RenderError::InvalidBackground(e) => write!(f, "unsafe background path: {e}"),
        }
    }
}

impl std::error::Error for RenderError {}

#[derive(Debug, Clone, PartialEq)]
pub enum Fill {
    Transparent,
    Hover(Rgba),
}

/// One rendered interactive region.
#[derive(Debug, Clone, PartialEq)]
pub struct HitZone {
    pub id: String,
    /// Vector path data, opaque to this system.
    pub path_data: String,
    pub color: String,
    pub script: String,
    pub tooltip: Option<String>,
    pub fill: Fill,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Background {
    pub file: String,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationResult {
    Executed,
    /// The executor rejected the script; reported, never propagated.
    Failed(String),
    NoSuchZone,
}

/// Retained-mode render surface: background plus one hit-zone per shape,
/// each carrying a subscription record so teardown removes exactly the
/// handlers that were attached.
///
/// `generation` increases every time the rendered content is cleared or the
/// container detaches; overlay singletons compare it against the generation
/// they attached under before touching anything.
#[derive(Debug)]
pub struct InteractiveSurface {
    hover_opacity: f64,
    enable_tooltips: bool,
    registry: EventRegistry,
    zones: Vec<HitZone>,
    zone_index: HashMap<String, usize>,
    subscriptions: Vec<ZoneSubscription>,
    background: Option<Background>,
    background_error: Option<String>,
    loaded: bool,
    attached: bool,
    generation: u64,
}

impl InteractiveSurface {
    pub fn new(config: &MapConfig) -> Self {
        Self {
            hover_opacity: config.hover_opacity,
            enable_tooltips: config.enable_tooltips,
            registry: EventRegistry::new(),
            zones: Vec::new(),
            zone_index: HashMap::new(),
            subscriptions: Vec::new(),
            background: None,
            background_error: None,
            loaded: false,
            attached: true,
            generation: 0,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn zones(&self) -> &[HitZone] {
        &self.zones
    }

    pub fn zone(&self, zone_id: &str) -> Option<&HitZone> {
        self.zone_index.get(zone_id).map(|&i| &self.zones[i])
    }

    pub fn background(&self) -> Option<&Background> {
        self.background.as_ref()
    }

    /// Surface bounding box; overlay percent sizing is computed against
    /// this.
    pub fn bounding_size(&self) -> Option<(f64, f64)> {
        self.background.as_ref().map(|b| (b.width, b.height))
    }

    /// Live attached-handler count. Zero after `clear()`.
    pub fn subscription_count(&self) -> usize {
        self.registry.active_count()
    }

    /// Tears down all rendered state: every stored subscription is
    /// disposed by token, zones are dropped, loaded-state flags reset.
    pub fn clear(&mut self) {
        for sub in self.subscriptions.drain(..) {
            self.registry.unsubscribe(&sub);
        }
        self.zones.clear();
        self.zone_index.clear();
        self.background = None;
        self.background_error = None;
        self.loaded = false;
        self.generation += 1;
    }

    /// The host loads the background image asynchronously; a load failure
    /// lands here as a report rather than an exception.
    pub fn report_background_error(&mut self, reason: &str) {
        warn!(reason, "background image failed to load");
        self.background_error = Some(reason.to_string());
    }

    pub fn background_error(&self) -> Option<&str> {
        self.background_error.as_deref()
    }

    /// Models the host destroying the container (e.g. the window closed).
    pub fn detach(&mut self) {
        self.attached = false;
        self.clear();
    }

    /// Models the host re-creating the container.
    pub fn reattach(&mut self) {
        self.attached = true;
    }

    /// Clears prior state, draws the background at the document's declared
    /// dimensions, and builds one hit-zone per shape in document order.
    pub fn render(&mut self, document: &MapDocument) -> Result<(), RenderError> {
        if !self.attached {
            return Err(RenderError::ContainerMissing);
        }

        self.clear();

        let file = paths::resolve(&document.background_image.file, IMAGES_FOLDER)
            .map_err(RenderError::InvalidBackground)?;
        self.background = Some(Background {
            file,
            width: document.background_image.width,
            height: document.background_image.height,
        });

        for shape in &document.shapes {
            let tooltip = if self.enable_tooltips {
                shape.tooltip.clone()
            } else {
                None
            };
            let zone = HitZone {
                id: shape.id.clone(),
                path_data: shape.path.clone(),
                color: shape.color.clone(),
                script: shape.script.clone(),
                tooltip,
                fill: Fill::Transparent,
            };
            self.zone_index.insert(zone.id.clone(), self.zones.len());
            self.zones.push(zone);
            self.subscriptions.push(self.registry.subscribe_zone(&shape.id));
        }

        self.loaded = true;
        debug!(zones = self.zones.len(), generation = self.generation, "surface rendered");
        Ok(())
    }

    /// Hover-in: decode the zone's configured color and apply it as a
    /// translucent fill at the configured hover opacity.
    pub fn pointer_enter(&mut self, zone_id: &str) -> bool {
        let Some(&index) = self.zone_index.get(zone_id) else {
            return false;
        };
        let sub = &self.subscriptions[index];
        if !self.registry.is_active(sub.hover_in) {
            return false;
        }
        let Some(rgb) = parse_hex_color(&self.zones[index].color) else {
            // Validated documents always carry decodable colors.
            return false;
        };
        self.zones[index].fill = Fill::Hover(rgb.with_opacity(self.hover_opacity));
        true
    }

    /// Hover-out: reset the fill to fully transparent.
    pub fn pointer_leave(&mut self, zone_id: &str) -> bool {
        let Some(&index) = self.zone_index.get(zone_id) else {
            return false;
        };
        if !self.registry.is_active(self.subscriptions[index].hover_out) {
            return false;
        }
        self.zones[index].fill = Fill::Transparent;
        true
    }

    /// Activation: hand the zone's opaque script to the host's executor.
    /// Execution failure is reported in the result, never propagated.
    pub fn activate(
        &mut self,
        zone_id: &str,
        executor: &mut dyn ScriptExecutor,
    ) -> ActivationResult {
        let Some(&index) = self.zone_index.get(zone_id) else {
            return ActivationResult::NoSuchZone;
        };
        if !self.registry.is_active(self.subscriptions[index].activate) {
            return ActivationResult::NoSuchZone;
        }
        match executor.execute(&self.zones[index].script) {
            Ok(()) => ActivationResult::Executed,
            Err(e) => {
                warn!(zone = zone_id, error = %e, "zone script failed");
                ActivationResult::Failed(e.to_string())
            }
        }
    }
}
