/// Fetch-layer failures, kept distinct from timeouts so callers can present
/// different diagnostics (see `LoadError`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The server answered with a non-success status.
    Http {
        status: Option<u16>,
        message: String,
    },
    /// The request never completed (DNS, connection reset, body read).
    Network(String),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Http {
                status: Some(code),
                message,
            } => write!(f, "http {code}: {message}"),
            FetchError::Http {
                status: None,
                message,
            } => write!(f, "http error: {message}"),
            FetchError::Network(message) => write!(f, "network error: {message}"),
        }
    }
}

impl std::error::Error for FetchError {}

/// The one seam where this crate performs I/O.
///
/// `DocumentLoader` is generic over it so tests run against an in-memory
/// fake under a paused clock.
#[allow(async_fn_in_trait)]
pub trait DocumentFetcher {
    async fn fetch_text(&self, path: &str) -> Result<String, FetchError>;

    /// Listing fetch. Same contract as [`fetch_text`](Self::fetch_text) but
    /// with no-cache semantics, since a stale index defeats a manual
    /// refresh.
    async fn fetch_listing(&self, path: &str) -> Result<String, FetchError> {
        self.fetch_text(path).await
    }
}

/// HTTP fetcher over the extension root.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFetcher {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn read_response(
        url: &str,
        response: Result<reqwest::Response, reqwest::Error>,
    ) -> Result<String, FetchError> {
        let response = response.map_err(|e| FetchError::Network(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                status: Some(status.as_u16()),
                message: format!("GET {url} returned {status}"),
            });
        }
        response
            .text()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))
    }
}

impl DocumentFetcher for HttpFetcher {
    async fn fetch_text(&self, path: &str) -> Result<String, FetchError> {
        let url = self.url_for(path);
        let response = self.client.get(&url).send().await;
        Self::read_response(&url, response).await
    }

    async fn fetch_listing(&self, path: &str) -> Result<String, FetchError> {
        let url = self.url_for(path);
        let response = self
            .client
            .get(&url)
            .header("Cache-Control", "no-cache")
            .header("Pragma", "no-cache")
            .send()
            .await;
        Self::read_response(&url, response).await
    }
}
