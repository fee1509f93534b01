use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Recognized extension options with their reference defaults.
///
/// A host deserializes this from its settings JSON; unknown fields are
/// ignored and missing fields take the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MapConfig {
    /// Fill opacity applied to a hit-zone on hover, in 0..=1.
    pub hover_opacity: f64,
    /// Reserved for hover fade-in/out; carried but unused by core logic.
    #[serde(rename = "transitionDuration")]
    pub transition_duration_ms: u64,
    pub enable_tooltips: bool,
    /// Gates diagnostic logging only; never changes behavior.
    pub debug_mode: bool,
    /// Document cache capacity (entries, not bytes).
    pub max_map_cache: usize,
    /// Document fetch timeout, milliseconds.
    #[serde(rename = "fetchTimeout")]
    pub fetch_timeout_ms: u64,
    /// Listing fetch timeout, milliseconds (the listing is optional
    /// metadata, so this one is much shorter).
    #[serde(rename = "indexTimeout")]
    pub index_timeout_ms: u64,
    /// Identifier used when discovery finds no listing.
    pub default_map: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            hover_opacity: 0.3,
            transition_duration_ms: 200,
            enable_tooltips: true,
            debug_mode: false,
            max_map_cache: 10,
            fetch_timeout_ms: 10_000,
            index_timeout_ms: 3_000,
            default_map: "maps/default.json".to_string(),
        }
    }
}

impl MapConfig {
    /// Clamps out-of-range values to usable ones. Applied after
    /// deserializing host-supplied settings.
    pub fn sanitized(mut self) -> Self {
        self.hover_opacity = self.hover_opacity.clamp(0.0, 1.0);
        if !self.hover_opacity.is_finite() {
            self.hover_opacity = 0.3;
        }
        self.max_map_cache = self.max_map_cache.max(1);
        self
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn index_timeout(&self) -> Duration {
        Duration::from_millis(self.index_timeout_ms)
    }
}
