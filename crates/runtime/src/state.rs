use std::fmt::Display;

/// Process-wide extension state. Initialized at startup, mutated as maps
/// load and commands run, never persisted.
#[derive(Debug, Default)]
pub struct ExtensionState {
    pub current_loaded_map: Option<String>,
    pub available_maps: Vec<String>,
    pub is_map_loaded: bool,
    /// Last failure, kept for later inspection. Recording it is non-fatal
    /// bookkeeping; the failure is also reported to the caller.
    pub last_error: Option<String>,
}

impl ExtensionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_error(&mut self, error: &impl Display) {
        self.last_error = Some(error.to_string());
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }
}
