use crate::{
    CacheStrategy, Fetcher, PreviewCache, PreviewError, PreviewGenerator, PreviewResult,
    RiskAssessor, RiskConfig, UrlPreviewGenerator, DEFAULT_CACHE_CAPACITY, DEFAULT_MAX_CACHE_AGE,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, instrument};

pub const MAX_CONCURRENT_REQUESTS: usize = 500;

/// Options bag owned by the settings collaborator. The core only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreviewSettings {
    pub enable_previews: bool,
    pub show_images: bool,
    /// Hover delay in milliseconds before the UI asks for a preview
    pub preview_delay: u64,
    pub security_check: bool,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            enable_previews: true,
            show_images: true,
            preview_delay: 300,
            security_check: true,
        }
    }
}

impl PreviewSettings {
    pub fn preview_delay(&self) -> Duration {
        Duration::from_millis(self.preview_delay)
    }
}

/// Inbound message, e.g. `{"type": "GET_PREVIEW_DATA", "url": "https://..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PreviewRequest {
    #[serde(rename = "GET_PREVIEW_DATA")]
    GetPreviewData { url: String },
}

/// Request/response entry point used by whatever transport carries preview requests.
#[derive(Clone)]
pub struct PreviewService {
    pub generator: Arc<UrlPreviewGenerator>,
    settings: PreviewSettings,
    // Max Concurrent Requests
    semaphore: Arc<Semaphore>,
}

impl Default for PreviewService {
    fn default() -> Self {
        Self::new()
    }
}

impl PreviewService {
    pub fn new() -> Self {
        Self::with_cache_cap(DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_cache_cap(cache_capacity: usize) -> Self {
        Self::new_with_config(PreviewServiceConfig::new(cache_capacity))
    }

    pub fn no_cache() -> Self {
        Self::new_with_config(
            PreviewServiceConfig::new(0).with_cache_strategy(CacheStrategy::NoCache),
        )
    }

    pub fn new_with_config(config: PreviewServiceConfig) -> Self {
        debug!(
            cache_capacity = config.cache_capacity,
            max_cache_age = ?config.max_cache_age,
            "Initializing PreviewService"
        );

        let generator = UrlPreviewGenerator::new_with_fetcher(
            config.cache_capacity,
            config.cache_strategy,
            config.fetcher.unwrap_or_default(),
        )
        .with_cache(PreviewCache::with_max_age(
            config.cache_capacity,
            config.max_cache_age,
        ))
        .with_assessor(RiskAssessor::new(config.risk));

        Self {
            generator: Arc::new(generator),
            settings: config.settings,
            // A zero-permit semaphore would park every request forever.
            semaphore: Arc::new(Semaphore::new(config.max_concurrent_requests.max(1))),
        }
    }

    pub fn settings(&self) -> &PreviewSettings {
        &self.settings
    }

    pub fn cache(&self) -> &PreviewCache {
        &self.generator.cache
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn get_metadata(&self, url: &str) -> PreviewResult {
        if !self.settings.enable_previews {
            let e = PreviewError::PreviewsDisabled;
            e.log();
            return PreviewResult::unavailable(&e, self.generator.assessor().assess_str(url));
        }

        let _permit = match self.semaphore.acquire().await {
            Ok(permit) => permit,
            Err(_) => {
                let e = PreviewError::ConcurrencyLimitError;
                e.log();
                return PreviewResult::unavailable(&e, self.generator.assessor().assess_str(url));
            }
        };

        let preview = self.generator.get_metadata(url).await;
        self.apply_settings(preview)
    }

    pub async fn handle(&self, request: PreviewRequest) -> PreviewResult {
        match request {
            PreviewRequest::GetPreviewData { url } => self.get_metadata(&url).await,
        }
    }

    /// JSON in, JSON out. Only a malformed request is an error; every preview
    /// outcome, failed ones included, is a serialized [`PreviewResult`].
    pub async fn handle_json(&self, raw: &str) -> Result<String, PreviewError> {
        let request: PreviewRequest = serde_json::from_str(raw).map_err(|e| {
            let e = PreviewError::InvalidRequest(e.to_string());
            e.log();
            e
        })?;
        let preview = self.handle(request).await;
        serde_json::to_string(&preview)
            .map_err(|e| PreviewError::ExtractError(format!("failed to serialize preview: {e}")))
    }

    /// Previews several URLs concurrently, results in input order.
    pub async fn get_metadata_batch(&self, urls: &[&str]) -> Vec<PreviewResult> {
        let futures = urls.iter().map(|url| self.get_metadata(url));
        futures::future::join_all(futures).await
    }

    // Applied to the returned copy only; the cached value keeps every field.
    fn apply_settings(&self, mut preview: PreviewResult) -> PreviewResult {
        if !self.settings.show_images {
            preview.image_url = None;
        }
        preview
    }
}

pub struct PreviewServiceConfig {
    pub cache_capacity: usize,
    pub max_cache_age: Duration,
    pub cache_strategy: CacheStrategy,
    pub max_concurrent_requests: usize,
    pub fetcher: Option<Fetcher>,
    pub risk: RiskConfig,
    pub settings: PreviewSettings,
}

impl Default for PreviewServiceConfig {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl PreviewServiceConfig {
    pub fn new(cache_capacity: usize) -> Self {
        Self {
            cache_capacity,
            max_cache_age: DEFAULT_MAX_CACHE_AGE,
            cache_strategy: CacheStrategy::UseCache,
            max_concurrent_requests: MAX_CONCURRENT_REQUESTS,
            fetcher: None,
            risk: RiskConfig::default(),
            settings: PreviewSettings::default(),
        }
    }

    pub fn with_max_cache_age(mut self, max_cache_age: Duration) -> Self {
        self.max_cache_age = max_cache_age;
        self
    }

    pub fn with_cache_strategy(mut self, cache_strategy: CacheStrategy) -> Self {
        self.cache_strategy = cache_strategy;
        self
    }

    pub fn with_max_concurrent_requests(mut self, max_concurrent_requests: usize) -> Self {
        self.max_concurrent_requests = max_concurrent_requests;
        self
    }

    pub fn with_fetcher(mut self, fetcher: Fetcher) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn with_risk_config(mut self, risk: RiskConfig) -> Self {
        self.risk = risk;
        self
    }

    pub fn with_settings(mut self, settings: PreviewSettings) -> Self {
        self.settings = settings;
        self
    }
}
