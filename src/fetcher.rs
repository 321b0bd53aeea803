use crate::metadata_api::MetadataApiResponse;
use crate::PreviewError;
use reqwest::header::{HeaderMap, ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error, instrument, warn};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; safe-preview/0.1; Link Preview Generator)";
pub const DEFAULT_METADATA_API: &str = "https://api.microlink.io";
const METADATA_SERVICE: &str = "metadata API";

/// Outcome of a direct page fetch.
#[derive(Debug, Clone)]
pub enum FetchResult {
    /// Markup that can be scraped for preview fields.
    Html(String),
    /// A successful response whose body is not markup. Extraction falls back to defaults.
    Opaque { content_type: Option<String> },
}

/// Creates a fetcher with custom configuration.
///
/// # Examples
/// ```ignore
/// let fetcher = Fetcher::new_with_config(
///     FetcherConfig::default()
///         .with_timeout(Duration::from_secs(3))
///         .with_metadata_api("http://localhost:3000/lookup"),
/// )?;
/// ```
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    pub user_agent: String,
    /// Applied to both the page fetch and the metadata lookup
    pub timeout: Duration,
    /// Page bodies above this size are treated as a failed fetch
    pub max_content_size: usize,
    /// Base URL of the metadata service; the target is passed as the `url` query parameter
    pub metadata_api: String,
    pub headers: Option<HeaderMap>,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(5),
            max_content_size: 5 * 1024 * 1024,
            metadata_api: DEFAULT_METADATA_API.to_string(),
            headers: None,
        }
    }
}

impl FetcherConfig {
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_content_size(mut self, max_content_size: usize) -> Self {
        self.max_content_size = max_content_size;
        self
    }

    pub fn with_metadata_api(mut self, metadata_api: impl Into<String>) -> Self {
        self.metadata_api = metadata_api.into();
        self
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = Some(headers);
        self
    }
}

#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    config: FetcherConfig,
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetcher {
    pub fn new() -> Self {
        Self::new_with_config(FetcherConfig::default()).unwrap_or_else(|e| {
            error!(error = %e, "Failed to create configured HTTP client, using reqwest defaults");
            Self::with_client(Client::new(), FetcherConfig::default())
        })
    }

    pub fn new_with_config(config: FetcherConfig) -> Result<Self, PreviewError> {
        let mut client_builder = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .pool_max_idle_per_host(10);

        if let Some(headers) = config.headers.clone() {
            client_builder = client_builder.default_headers(headers);
        }

        let client = client_builder
            .build()
            .map_err(|e| PreviewError::FetchError(format!("Failed to build HTTP client: {e}")))?;
        debug!(timeout = ?config.timeout, api = %config.metadata_api, "Fetcher initialized");

        Ok(Self { client, config })
    }

    /// Uses a caller-provided client. Timeouts from `config` are still applied per request.
    pub fn with_client(client: Client, config: FetcherConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    /// Direct fetch of the target page.
    #[instrument(level = "debug", skip(self), err)]
    pub async fn fetch(&self, url: &str) -> Result<FetchResult, PreviewError> {
        debug!(url = %url, "Starting fetch request");

        let mut response = self
            .client
            .get(url)
            .header(ACCEPT, "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8")
            .timeout(self.config.timeout)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, url = %url, "Failed to send request");
                PreviewError::from_reqwest(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PreviewError::HttpError {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string(),
            });
        }

        if let Some(len) = response.content_length() {
            if len as usize > self.config.max_content_size {
                return Err(PreviewError::ContentTooLarge(len as usize));
            }
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_ascii_lowercase);
        if let Some(ct) = content_type.as_deref() {
            if !is_markup(ct) {
                debug!(url = %url, content_type = %ct, "Response is not markup");
                return Ok(FetchResult::Opaque { content_type });
            }
        }

        // Read chunk by chunk so a body without Content-Length is cut off at the cap.
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| {
            warn!(error = %e, url = %url, "Failed to read response body");
            PreviewError::from_reqwest(e)
        })? {
            body.extend_from_slice(&chunk);
            if body.len() > self.config.max_content_size {
                return Err(PreviewError::ContentTooLarge(body.len()));
            }
        }
        let content = String::from_utf8_lossy(&body).into_owned();

        debug!(url = %url, content_length = content.len(), "Successfully fetched webpage");
        Ok(FetchResult::Html(content))
    }

    /// Secondary path: asks the metadata service about `url`.
    #[instrument(level = "debug", skip(self), err)]
    pub async fn fetch_metadata_api(&self, url: &str) -> Result<MetadataApiResponse, PreviewError> {
        let service_error = |message: String| PreviewError::ExternalServiceError {
            service: METADATA_SERVICE.to_string(),
            message,
        };

        let response = self
            .client
            .get(&self.config.metadata_api)
            .query(&[("url", url)])
            .timeout(self.config.timeout)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, url = %url, "Metadata API request failed");
                service_error(e.to_string())
            })?;

        if !response.status().is_success() {
            return Err(service_error(format!(
                "Proxy fetch failed: {}",
                response.status().as_u16()
            )));
        }

        let payload: MetadataApiResponse = response.json().await.map_err(|e| {
            error!(error = %e, url = %url, "Failed to parse metadata API response");
            service_error(e.to_string())
        })?;

        if !payload.is_success() {
            return Err(service_error(payload.failure_reason()));
        }

        debug!(url = %url, "Successfully fetched metadata API data");
        Ok(payload)
    }
}

fn is_markup(content_type: &str) -> bool {
    content_type.contains("html")
        || content_type.contains("xml")
        || content_type.starts_with("text/plain")
}
