use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt::Display;

mod cache;
mod error;
mod extractor;
mod fetcher;
#[cfg(feature = "logging")]
mod logging;
mod metadata_api;
mod preview_generator;
mod preview_service;
mod security;
mod utils;

pub use cache::{
    CacheEntry, CacheStrategy, PreviewCache, DEFAULT_CACHE_CAPACITY, DEFAULT_MAX_CACHE_AGE,
};
pub use error::PreviewError;
pub use extractor::{MetadataExtractor, PageMetadata, MAX_DESCRIPTION_CHARS, NO_DESCRIPTION};
pub use fetcher::{FetchResult, Fetcher, FetcherConfig};
#[cfg(feature = "logging")]
pub use logging::{log_error_card, log_preview_card, setup_logging, LogConfig, LogLevelGuard};
pub use metadata_api::{MetadataApiData, MetadataApiResponse, MetadataApiUrl};
pub use preview_generator::UrlPreviewGenerator;
pub use preview_service::{
    PreviewRequest, PreviewService, PreviewServiceConfig, PreviewSettings, MAX_CONCURRENT_REQUESTS,
};
pub use security::{
    RiskAssessment, RiskAssessor, RiskConfig, RiskDetails, RiskFactor, RiskLevel, RiskSignal,
    DEFAULT_RISK_FACTORS,
};
pub use utils::{truncate_chars, truncate_str};

pub const UNAVAILABLE_TITLE: &str = "Preview Unavailable";

/// Risk-scored preview of a link target, serialized in the shape the UI card consumes.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResult {
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub favicon_url: Option<String>,
    pub last_updated: DateTime<Utc>,
    pub security: RiskAssessment,
    #[serde(default)]
    pub error: bool,
}

impl PreviewResult {
    pub fn from_metadata(metadata: PageMetadata, security: RiskAssessment) -> Self {
        Self {
            title: metadata.title,
            description: metadata.description,
            image_url: metadata.image_url,
            favicon_url: metadata.favicon_url,
            last_updated: Utc::now(),
            security,
            error: false,
        }
    }

    /// Error-flagged placeholder that still carries the risk assessment.
    pub fn unavailable(reason: impl Display, security: RiskAssessment) -> Self {
        Self {
            title: UNAVAILABLE_TITLE.to_string(),
            description: format!("Could not load preview: {reason}"),
            image_url: None,
            favicon_url: None,
            last_updated: Utc::now(),
            security,
            error: true,
        }
    }
}

#[async_trait]
pub trait PreviewGenerator {
    /// Never fails: every error path ends in an error-flagged [`PreviewResult`].
    async fn get_metadata(&self, url: &str) -> PreviewResult;
}
