use tracing::{debug, warn};

use catalog::{RawInput, normalize_input};
use foundation::config::MapConfig;
use overlay::{MediaBackend, OverlayKind, OverlayOptions, OverlayRegistry};
use scene::{ActivationResult, InteractiveSurface, ScriptExecutor};
use streaming::{DocumentFetcher, DocumentLoader};

use crate::commands::{CommandOutcome, ParsedArgs, canonical_command, parse_command_args};
use crate::state::ExtensionState;

/// Top-level wiring: one loader, one render surface, the three overlay
/// singletons, and the process-wide state, driven by the host's commands.
///
/// Handlers never let an error escape: every failure becomes a
/// [`CommandOutcome::Reported`] and is recorded in `ExtensionState`.
#[derive(Debug)]
pub struct MapExtension<F, B> {
    loader: DocumentLoader<F>,
    surface: InteractiveSurface,
    overlays: OverlayRegistry,
    backend: B,
    state: ExtensionState,
    config: MapConfig,
}

impl<F: DocumentFetcher, B: MediaBackend> MapExtension<F, B> {
    pub fn new(fetcher: F, backend: B, config: MapConfig) -> Self {
        let config = config.sanitized();
        Self {
            loader: DocumentLoader::new(fetcher, config.clone()),
            surface: InteractiveSurface::new(&config),
            overlays: OverlayRegistry::new(),
            backend,
            state: ExtensionState::new(),
            config,
        }
    }

    pub fn state(&self) -> &ExtensionState {
        &self.state
    }

    pub fn surface(&self) -> &InteractiveSurface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut InteractiveSurface {
        &mut self.surface
    }

    pub fn overlays(&self) -> &OverlayRegistry {
        &self.overlays
    }

    /// One-time startup: discover the listing (never fails; falls back to
    /// the default map).
    pub async fn startup(&mut self) {
        self.state.available_maps = self.loader.discover_available_maps().await;
    }

    /// Manual refresh: drop every cached document, then re-discover.
    pub async fn refresh_maps(&mut self) {
        self.loader.clear_cache();
        self.state.available_maps = self.loader.discover_available_maps().await;
    }

    /// Entry point for the host's command execution. Unknown commands are
    /// reported, not errored.
    pub async fn dispatch(&mut self, command: &str, raw_args: &str) -> CommandOutcome {
        let Some(name) = canonical_command(command) else {
            return CommandOutcome::Reported(format!("unknown command: {command}"));
        };
        if self.config.debug_mode {
            debug!(command = name, args = raw_args, "dispatching command");
        }

        match name {
            "showmap" => self.show_map(raw_args).await,
            "showmap_sound" => self.show_map_sound(raw_args).await,
            "stopsound" => self.stop_overlay(OverlayKind::Audio),
            "showmap_image" => self.show_image(raw_args),
            "stopimage" => self.stop_overlay(OverlayKind::Image),
            "showmap_video" => self.show_video(raw_args),
            "stopvideo" => self.stop_overlay(OverlayKind::Video),
            _ => unreachable!("canonical_command only returns registered names"),
        }
    }

    /// Host input plumbing calls this on zone activation.
    pub fn activate_zone(
        &mut self,
        zone_id: &str,
        executor: &mut dyn ScriptExecutor,
    ) -> ActivationResult {
        let result = self.surface.activate(zone_id, executor);
        if let ActivationResult::Failed(msg) = &result {
            self.state.record_error(msg);
        }
        result
    }

    fn resolve_name(&self, parsed: &ParsedArgs) -> String {
        let input = match &parsed.name {
            Some(text) => RawInput::Text(text.clone()),
            None => RawInput::Interaction,
        };
        let term = normalize_input(&input).unwrap_or_else(|| self.config.default_map.clone());
        catalog::resolve(&term, &self.state.available_maps)
    }

    async fn show_map(&mut self, raw_args: &str) -> CommandOutcome {
        let parsed = parse_command_args(raw_args);
        let id = self.resolve_name(&parsed);

        let document = match self.loader.load(&id).await {
            Ok(document) => document,
            Err(e) => {
                self.state.record_error(&e);
                return CommandOutcome::Reported(e.to_string());
            }
        };
        if let Err(e) = self.surface.render(&document) {
            self.state.record_error(&e);
            return CommandOutcome::Reported(e.to_string());
        }

        self.state.current_loaded_map = Some(id.clone());
        self.state.is_map_loaded = true;

        let mut message = format!("map '{}' loaded ({} zones)", id, document.shapes.len());
        if let Some(sound) = &document.map_sound {
            // The map itself loaded; an ambient-sound failure only annotates
            // the outcome.
            if let Err(e) = self.overlays.play(
                OverlayKind::Audio,
                sound,
                OverlayOptions::default(),
                self.surface.generation(),
                &mut self.backend,
            ) {
                self.state.record_error(&e);
                warn!(map = id.as_str(), error = %e, "ambient sound failed to start");
                message.push_str("; ambient sound failed");
            }
        }
        CommandOutcome::Ok(message)
    }

    /// Plays the named map's declared ambient sound, or an explicit
    /// `sound=alt` override. Without a name, the currently loaded map is
    /// used.
    async fn show_map_sound(&mut self, raw_args: &str) -> CommandOutcome {
        let parsed = parse_command_args(raw_args);
        let override_name = parsed.option("sound").map(str::to_string);

        let sound = match override_name {
            Some(sound) => sound,
            None => {
                let id = match (&parsed.name, &self.state.current_loaded_map) {
                    (Some(_), _) => self.resolve_name(&parsed),
                    (None, Some(current)) => current.clone(),
                    (None, None) => self.resolve_name(&parsed),
                };
                match self.loader.load(&id).await {
                    Ok(document) => match document.map_sound {
                        Some(sound) => sound,
                        None => {
                            return CommandOutcome::Reported(format!(
                                "map '{id}' declares no ambient sound"
                            ));
                        }
                    },
                    Err(e) => {
                        self.state.record_error(&e);
                        return CommandOutcome::Reported(e.to_string());
                    }
                }
            }
        };

        self.play_overlay(OverlayKind::Audio, &sound, OverlayOptions::default())
    }

    fn show_image(&mut self, raw_args: &str) -> CommandOutcome {
        let parsed = parse_command_args(raw_args);
        let Some(name) = parsed.name.clone() else {
            return CommandOutcome::Reported("showmap_image needs an image name".to_string());
        };
        let options = OverlayOptions {
            size_pct: parsed.number("size"),
            ..OverlayOptions::default()
        };
        self.play_overlay(OverlayKind::Image, &name, options)
    }

    fn show_video(&mut self, raw_args: &str) -> CommandOutcome {
        let parsed = parse_command_args(raw_args);
        let Some(name) = parsed.name.clone() else {
            return CommandOutcome::Reported("showmap_video needs a video name".to_string());
        };
        let options = OverlayOptions {
            muted: parsed.flag("muted").unwrap_or(true),
            looped: parsed.flag("loop").unwrap_or(true),
            autoplay: true,
            size_pct: parsed.number("size"),
        };
        self.play_overlay(OverlayKind::Video, &name, options)
    }

    fn play_overlay(
        &mut self,
        kind: OverlayKind,
        name: &str,
        options: OverlayOptions,
    ) -> CommandOutcome {
        match self.overlays.play(
            kind,
            name,
            options,
            self.surface.generation(),
            &mut self.backend,
        ) {
            Ok(()) => {
                let path = self.overlays.active_path(kind).unwrap_or(name);
                CommandOutcome::Ok(format!("{} playing: {path}", kind.label()))
            }
            Err(e) => {
                self.state.record_error(&e);
                CommandOutcome::Reported(e.to_string())
            }
        }
    }

    fn stop_overlay(&mut self, kind: OverlayKind) -> CommandOutcome {
        self.overlays
            .stop(kind, self.surface.generation(), &mut self.backend);
        CommandOutcome::Ok(format!("{} stopped", kind.label()))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use foundation::config::MapConfig;
    use overlay::{AttachRequest, MediaBackend, OverlayKind, PlaybackError, ResourceHandle};
    use scene::{ActivationResult, ScriptError, ScriptExecutor};
    use streaming::{DocumentFetcher, FetchError};

    use super::MapExtension;

    const CITY: &str = r##"{
        "backgroundImage": {"file": "city.png", "width": 800, "height": 600},
        "shapes": [
            {"id": "tavern", "path": "M0 0L10 0L10 10Z", "color": "#F00", "script": "/join tavern"}
        ],
        "mapSound": "sounds/city-ambience.mp3"
    }"##;

    struct FakeFetcher {
        bodies: HashMap<String, String>,
        calls: RefCell<Vec<String>>,
    }

    impl FakeFetcher {
        fn new() -> Self {
            Self {
                bodies: HashMap::new(),
                calls: RefCell::new(Vec::new()),
            }
        }

        fn with_body(mut self, path: &str, body: &str) -> Self {
            self.bodies.insert(path.to_string(), body.to_string());
            self
        }
    }

    impl DocumentFetcher for FakeFetcher {
        async fn fetch_text(&self, path: &str) -> Result<String, FetchError> {
            self.calls.borrow_mut().push(path.to_string());
            self.bodies.get(path).cloned().ok_or(FetchError::Http {
                status: Some(404),
                message: format!("GET {path} returned 404 Not Found"),
            })
        }
    }

    #[derive(Debug, Default)]
    struct RecordingBackend {
        next_handle: u64,
        attaches: Vec<(OverlayKind, AttachRequest)>,
        releases: Vec<(OverlayKind, ResourceHandle)>,
    }

    impl MediaBackend for RecordingBackend {
        fn attach(
            &mut self,
            kind: OverlayKind,
            request: &AttachRequest,
        ) -> Result<ResourceHandle, PlaybackError> {
            self.next_handle += 1;
            self.attaches.push((kind, request.clone()));
            Ok(ResourceHandle(self.next_handle))
        }

        fn release(&mut self, kind: OverlayKind, handle: ResourceHandle) {
            self.releases.push((kind, handle));
        }

        fn set_close_control(&mut self, _kind: OverlayKind, _visible: bool) {}

        fn install_resize_hook(&mut self) {}
    }

    struct OkExecutor(Vec<String>);

    impl ScriptExecutor for OkExecutor {
        fn execute(&mut self, script: &str) -> Result<(), ScriptError> {
            self.0.push(script.to_string());
            Ok(())
        }
    }

    async fn extension_with(
        fetcher: FakeFetcher,
    ) -> MapExtension<FakeFetcher, RecordingBackend> {
        let mut ext = MapExtension::new(fetcher, RecordingBackend::default(), MapConfig::default());
        ext.startup().await;
        ext
    }

    #[tokio::test]
    async fn showmap_resolves_loads_renders_and_autoplays_the_ambient_sound() {
        let fetcher = FakeFetcher::new()
            .with_body("index.json", r#"["maps/city.json"]"#)
            .with_body("maps/city.json", CITY);
        let mut ext = extension_with(fetcher).await;

        let outcome = ext.dispatch("showmap", "city").await;
        assert!(outcome.is_ok(), "unexpected outcome: {outcome:?}");

        assert_eq!(
            ext.state().current_loaded_map.as_deref(),
            Some("maps/city.json")
        );
        assert!(ext.state().is_map_loaded);
        assert_eq!(ext.surface().zones().len(), 1);
        assert_eq!(
            ext.overlays().active_path(OverlayKind::Audio),
            Some("sounds/city-ambience.mp3")
        );

        let mut exec = OkExecutor(Vec::new());
        assert_eq!(
            ext.activate_zone("tavern", &mut exec),
            ActivationResult::Executed
        );
        assert_eq!(exec.0, vec!["/join tavern".to_string()]);
    }

    #[tokio::test]
    async fn unknown_names_fall_back_to_a_direct_path_and_report_the_http_error() {
        let fetcher = FakeFetcher::new().with_body("index.json", r#"["maps/city.json"]"#);
        let mut ext = extension_with(fetcher).await;

        let outcome = ext.dispatch("showmap", "nonexistent").await;
        assert!(!outcome.is_ok());
        assert!(outcome.message().contains("404"), "got: {}", outcome.message());

        // The fallback identifier was tried as a direct path under maps/.
        assert!(
            ext.loader_calls().contains(&"maps/nonexistent.json".to_string()),
            "calls: {:?}",
            ext.loader_calls()
        );
        assert!(!ext.state().is_map_loaded);
        assert!(ext.state().last_error.is_some());
    }

    #[tokio::test]
    async fn video_options_flow_through_to_the_backend() {
        let fetcher = FakeFetcher::new().with_body("index.json", "[]");
        let mut ext = extension_with(fetcher).await;

        let outcome = ext
            .dispatch("showmap_video", "intro muted=0 loop=1 size=50")
            .await;
        assert!(outcome.is_ok());

        let (kind, request) = ext.backend.attaches.last().expect("attach");
        assert_eq!(*kind, OverlayKind::Video);
        assert_eq!(request.path, "movies/intro.mp4");
        assert!(!request.options.muted);
        assert!(request.options.looped);
        assert!(request.options.autoplay);
        assert_eq!(request.options.size_pct, Some(50));
    }

    #[tokio::test]
    async fn stop_commands_are_idempotent() {
        let fetcher = FakeFetcher::new().with_body("index.json", "[]");
        let mut ext = extension_with(fetcher).await;

        assert!(ext.dispatch("stopsound", "").await.is_ok());
        assert!(ext.dispatch("stopsound", "").await.is_ok());
        assert!(ext.backend.releases.is_empty());
    }

    #[tokio::test]
    async fn showmap_sound_honors_the_explicit_override() {
        let fetcher = FakeFetcher::new()
            .with_body("index.json", r#"["maps/city.json"]"#)
            .with_body("maps/city.json", CITY);
        let mut ext = extension_with(fetcher).await;

        let outcome = ext.dispatch("showmap_sound", "city sound=forest").await;
        assert!(outcome.is_ok());
        assert_eq!(
            ext.overlays().active_path(OverlayKind::Audio),
            Some("sounds/forest.mp3")
        );
    }

    #[tokio::test]
    async fn showmap_sound_reads_the_declared_sound_of_the_named_map() {
        let fetcher = FakeFetcher::new()
            .with_body("index.json", r#"["maps/city.json"]"#)
            .with_body("maps/city.json", CITY);
        let mut ext = extension_with(fetcher).await;

        let outcome = ext.dispatch("showmap_sound", "city").await;
        assert!(outcome.is_ok());
        assert_eq!(
            ext.overlays().active_path(OverlayKind::Audio),
            Some("sounds/city-ambience.mp3")
        );
    }

    #[tokio::test]
    async fn refresh_drops_the_cache_and_rediscovers() {
        let fetcher = FakeFetcher::new()
            .with_body("index.json", r#"["maps/city.json"]"#)
            .with_body("maps/city.json", CITY);
        let mut ext = extension_with(fetcher).await;

        ext.dispatch("showmap", "city").await;
        ext.refresh_maps().await;
        ext.dispatch("showmap", "city").await;

        let document_fetches = ext
            .loader_calls()
            .iter()
            .filter(|p| p.as_str() == "maps/city.json")
            .count();
        assert_eq!(document_fetches, 2);
    }

    #[tokio::test]
    async fn unknown_commands_are_reported_not_errored() {
        let fetcher = FakeFetcher::new().with_body("index.json", "[]");
        let mut ext = extension_with(fetcher).await;

        let outcome = ext.dispatch("teleport", "city").await;
        assert!(!outcome.is_ok());
        assert!(outcome.message().contains("unknown command"));
    }

    impl MapExtension<FakeFetcher, RecordingBackend> {
        fn loader_calls(&self) -> Vec<String> {
            self.loader.fetcher().calls.borrow().clone()
        }
    }
}
