use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};

use foundation::config::MapConfig;
use foundation::paths::{self, PathError};
use formats::{MapDocument, validate_value};

use crate::cache::DocumentCache;
use crate::fetch::{DocumentFetcher, FetchError};

pub const LISTING_PATH: &str = "index.json";
const MAPS_FOLDER: &str = "maps";

/// Everything that can end a document load. Each variant renders a
/// distinct user-facing message; a timeout is never conflated with a
/// network failure.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadError {
    InvalidPath(PathError),
    Timeout { after: Duration },
    Http { status: Option<u16>, message: String },
    Network(String),
    Parse(String),
    Validation(Vec<String>),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::InvalidPath(e) => write!(f, "unsafe map path: {e}"),
            LoadError::Timeout { after } => {
                write!(f, "map fetch timed out after {}ms", after.as_millis())
            }
            LoadError::Http {
                status: Some(code),
                message,
            } => write!(f, "map fetch failed (http {code}): {message}"),
            LoadError::Http {
                status: None,
                message,
            } => write!(f, "map fetch failed: {message}"),
            LoadError::Network(message) => write!(f, "map fetch failed: {message}"),
            LoadError::Parse(message) => write!(f, "map document is not valid JSON: {message}"),
            LoadError::Validation(errors) => {
                write!(f, "map document failed validation: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for LoadError {}

impl From<FetchError> for LoadError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::Http { status, message } => LoadError::Http { status, message },
            FetchError::Network(message) => LoadError::Network(message),
        }
    }
}

/// Fetches, validates, and caches map documents.
///
/// Per-load ordering is strict: cache probe → path check → bounded fetch →
/// JSON parse → schema validation → cache insert. A document that fails any
/// stage is never cached, so the cache only ever holds validated documents.
#[derive(Debug)]
pub struct DocumentLoader<F> {
    fetcher: F,
    cache: DocumentCache,
    config: MapConfig,
}

impl<F: DocumentFetcher> DocumentLoader<F> {
    pub fn new(fetcher: F, config: MapConfig) -> Self {
        let cache = DocumentCache::new(config.max_map_cache);
        Self {
            fetcher,
            cache,
            config,
        }
    }

    pub fn cache(&self) -> &DocumentCache {
        &self.cache
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Loads the document identified by `name` (e.g. `maps/city.json`).
    ///
    /// A cache hit returns immediately with no I/O. The fetch is bounded by
    /// `fetch_timeout`; on expiry the in-flight request is dropped and
    /// `LoadError::Timeout` is surfaced.
    pub async fn load(&mut self, name: &str) -> Result<MapDocument, LoadError> {
        if let Some(doc) = self.cache.get(name) {
            debug!(map = name, "document cache hit");
            return Ok(doc.clone());
        }

        let path = paths::resolve(name, MAPS_FOLDER).map_err(LoadError::InvalidPath)?;

        let timeout = self.config.fetch_timeout();
        let body = match tokio::time::timeout(timeout, self.fetcher.fetch_text(&path)).await {
            Err(_) => {
                warn!(map = name, timeout_ms = timeout.as_millis() as u64, "map fetch timed out");
                return Err(LoadError::Timeout { after: timeout });
            }
            Ok(result) => result?,
        };

        let raw: Value =
            serde_json::from_str(&body).map_err(|e| LoadError::Parse(e.to_string()))?;
        let validation = validate_value(&raw);
        if !validation.valid {
            return Err(LoadError::Validation(validation.errors));
        }
        let document: MapDocument =
            serde_json::from_value(raw).map_err(|e| LoadError::Parse(e.to_string()))?;

        if let Some(evicted) = self.cache.put(name.to_string(), document.clone()) {
            debug!(evicted = evicted.as_str(), "document cache evicted oldest entry");
        }
        info!(map = name, shapes = document.shapes.len(), "map document loaded");
        Ok(document)
    }

    /// Fetches the optional `index.json` listing with the shorter timeout.
    ///
    /// The listing is optional metadata: every failure mode (timeout, HTTP
    /// error, malformed content, wrong shape) degrades to the configured
    /// default map and is never surfaced to the caller.
    pub async fn discover_available_maps(&self) -> Vec<String> {
        let fallback = vec![self.config.default_map.clone()];
        let timeout = self.config.index_timeout();

        let body = match tokio::time::timeout(timeout, self.fetcher.fetch_listing(LISTING_PATH))
            .await
        {
            Err(_) => {
                warn!("map listing fetch timed out; falling back to the default map");
                return fallback;
            }
            Ok(Err(e)) => {
                warn!(error = %e, "map listing fetch failed; falling back to the default map");
                return fallback;
            }
            Ok(Ok(body)) => body,
        };

        match parse_listing(&body) {
            Some(maps) if !maps.is_empty() => {
                info!(count = maps.len(), "map listing discovered");
                maps
            }
            _ => {
                warn!("map listing is malformed; falling back to the default map");
                fallback
            }
        }
    }
}

/// The listing is either a bare array of identifiers or `{"maps": [...]}`.
fn parse_listing(body: &str) -> Option<Vec<String>> {
    let raw: Value = serde_json::from_str(body).ok()?;
    let entries = match &raw {
        Value::Array(entries) => entries,
        Value::Object(obj) => obj.get("maps")?.as_array()?,
        _ => return None,
    };
    entries
        .iter()
        .map(|v| v.as_str().map(str::to_string))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use foundation::config::MapConfig;
    use foundation::paths::PathError;

    use super::{DocumentLoader, LoadError, parse_listing};
    use crate::fetch::{DocumentFetcher, FetchError};

    const CITY: &str = r##"{
        "backgroundImage": {"file": "city.png", "width": 800, "height": 600},
        "shapes": [
            {"id": "tavern", "path": "M0 0L10 0L10 10Z", "color": "#F00", "script": "/join tavern"}
        ]
    }"##;

    struct FakeFetcher {
        bodies: HashMap<String, Result<String, FetchError>>,
        delay: Option<Duration>,
        calls: RefCell<Vec<String>>,
    }

    impl FakeFetcher {
        fn new() -> Self {
            Self {
                bodies: HashMap::new(),
                delay: None,
                calls: RefCell::new(Vec::new()),
            }
        }

        fn with_body(mut self, path: &str, body: &str) -> Self {
            self.bodies.insert(path.to_string(), Ok(body.to_string()));
            self
        }

        fn with_error(mut self, path: &str, error: FetchError) -> Self {
            self.bodies.insert(path.to_string(), Err(error));
            self
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }
    }

    impl DocumentFetcher for FakeFetcher {
        async fn fetch_text(&self, path: &str) -> Result<String, FetchError> {
            self.calls.borrow_mut().push(path.to_string());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.bodies.get(path).cloned().unwrap_or_else(|| {
                Err(FetchError::Http {
                    status: Some(404),
                    message: format!("GET {path} returned 404 Not Found"),
                })
            })
        }
    }

    fn not_found(status: u16) -> FetchError {
        FetchError::Http {
            status: Some(status),
            message: "nope".to_string(),
        }
    }

    #[tokio::test]
    async fn cache_hit_skips_io() {
        let fetcher = FakeFetcher::new().with_body("maps/city.json", CITY);
        let mut loader = DocumentLoader::new(fetcher, MapConfig::default());

        let first = loader.load("maps/city.json").await.expect("first load");
        let second = loader.load("maps/city.json").await.expect("second load");
        assert_eq!(first, second);
        assert_eq!(loader.fetcher.calls.borrow().len(), 1);
    }

    #[tokio::test]
    async fn bare_names_are_rooted_under_the_maps_folder() {
        let fetcher = FakeFetcher::new().with_body("maps/city.json", CITY);
        let mut loader = DocumentLoader::new(fetcher, MapConfig::default());

        loader.load("city.json").await.expect("load");
        assert_eq!(loader.fetcher.calls.borrow()[0], "maps/city.json");
    }

    #[tokio::test]
    async fn traversal_paths_never_reach_the_fetcher() {
        let fetcher = FakeFetcher::new();
        let mut loader = DocumentLoader::new(fetcher, MapConfig::default());

        let err = loader.load("../secrets.json").await.unwrap_err();
        assert_eq!(
            err,
            LoadError::InvalidPath(PathError::Traversal("../secrets.json".into()))
        );
        assert!(loader.fetcher.calls.borrow().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_fetch_surfaces_a_timeout_distinct_from_http_failure() {
        let fetcher = FakeFetcher::new()
            .with_body("maps/city.json", CITY)
            .with_delay(Duration::from_secs(60));
        let mut loader = DocumentLoader::new(fetcher, MapConfig::default());

        let err = loader.load("maps/city.json").await.unwrap_err();
        assert_eq!(
            err,
            LoadError::Timeout {
                after: Duration::from_secs(10)
            }
        );
    }

    #[tokio::test]
    async fn quoted_dimensions_survive_the_whole_pipeline() {
        let body = r##"{
            "backgroundImage": {"file": "city.png", "width": "800", "height": "600"},
            "shapes": [
                {"id": "tavern", "path": "M0 0L10 0L10 10Z", "color": "#F00", "script": "/join tavern"}
            ]
        }"##;
        let fetcher = FakeFetcher::new().with_body("maps/city.json", body);
        let mut loader = DocumentLoader::new(fetcher, MapConfig::default());

        let doc = loader.load("maps/city.json").await.expect("load");
        assert_eq!(doc.background_image.width, 800.0);
        assert_eq!(doc.background_image.height, 600.0);
        assert!(!loader.cache().is_empty());
    }

    #[tokio::test]
    async fn http_failure_is_reported_with_its_status() {
        let fetcher = FakeFetcher::new().with_error("maps/city.json", not_found(404));
        let mut loader = DocumentLoader::new(fetcher, MapConfig::default());

        match loader.load("maps/city.json").await.unwrap_err() {
            LoadError::Http { status, .. } => assert_eq!(status, Some(404)),
            other => panic!("expected http error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_json_is_a_parse_error() {
        let fetcher = FakeFetcher::new().with_body("maps/city.json", "{not json");
        let mut loader = DocumentLoader::new(fetcher, MapConfig::default());

        assert!(matches!(
            loader.load("maps/city.json").await.unwrap_err(),
            LoadError::Parse(_)
        ));
    }

    #[tokio::test]
    async fn invalid_documents_are_never_cached() {
        let fetcher =
            FakeFetcher::new().with_body("maps/bad.json", r#"{"backgroundImage": {}, "shapes": []}"#);
        let mut loader = DocumentLoader::new(fetcher, MapConfig::default());

        match loader.load("maps/bad.json").await.unwrap_err() {
            LoadError::Validation(errors) => assert!(!errors.is_empty()),
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(loader.cache().is_empty());
    }

    #[tokio::test]
    async fn discovery_reads_both_listing_shapes() {
        let bare = FakeFetcher::new().with_body("index.json", r#"["maps/a.json", "maps/b.json"]"#);
        let loader = DocumentLoader::new(bare, MapConfig::default());
        assert_eq!(
            loader.discover_available_maps().await,
            vec!["maps/a.json".to_string(), "maps/b.json".to_string()]
        );

        let wrapped =
            FakeFetcher::new().with_body("index.json", r#"{"maps": ["maps/c.json"]}"#);
        let loader = DocumentLoader::new(wrapped, MapConfig::default());
        assert_eq!(
            loader.discover_available_maps().await,
            vec!["maps/c.json".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn discovery_timeout_falls_back_to_the_default_map() {
        let fetcher = FakeFetcher::new()
            .with_body("index.json", r#"["maps/a.json"]"#)
            .with_delay(Duration::from_secs(30));
        let loader = DocumentLoader::new(fetcher, MapConfig::default());

        assert_eq!(
            loader.discover_available_maps().await,
            vec!["maps/default.json".to_string()]
        );
    }

    #[tokio::test]
    async fn discovery_swallows_http_and_parse_failures() {
        let broken = FakeFetcher::new().with_error("index.json", not_found(500));
        let loader = DocumentLoader::new(broken, MapConfig::default());
        assert_eq!(
            loader.discover_available_maps().await,
            vec!["maps/default.json".to_string()]
        );

        let garbage = FakeFetcher::new().with_body("index.json", "not json at all");
        let loader = DocumentLoader::new(garbage, MapConfig::default());
        assert_eq!(
            loader.discover_available_maps().await,
            vec!["maps/default.json".to_string()]
        );
    }

    #[test]
    fn listing_with_non_string_entries_is_rejected_whole() {
        assert_eq!(parse_listing(r#"["maps/a.json", 7]"#), None);
        assert_eq!(parse_listing(r#"{"maps": "maps/a.json"}"#), None);
        assert_eq!(parse_listing("3"), None);
    }
}
