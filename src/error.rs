use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("Failed to parse URL: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("Unsupported URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to fetch content: {0}")]
    FetchError(String),

    #[error("HTTP {status}: {message}")]
    HttpError { status: u16, message: String },

    #[error("Request timeout: {0}")]
    TimeoutError(String),

    #[error("Content too large: {0} bytes")]
    ContentTooLarge(usize),

    #[error("External service error: {service} - {message}")]
    ExternalServiceError { service: String, message: String },

    #[error("Failed to extract metadata: {0}")]
    ExtractError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Previews are disabled")]
    PreviewsDisabled,

    #[error("Concurrency limit reached")]
    ConcurrencyLimitError,
}

impl PreviewError {
    /// Maps a transport error, keeping timeouts distinguishable from other failures.
    pub fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            PreviewError::TimeoutError(e.to_string())
        } else {
            PreviewError::FetchError(e.to_string())
        }
    }

    pub fn log(&self) {
        match self {
            PreviewError::UrlParseError(e) => {
                warn!(error = %e, "URL parsing failed");
            }
            PreviewError::InvalidUrl(e) => {
                warn!(error = %e, "URL cannot be previewed");
            }
            PreviewError::FetchError(e) => {
                warn!(error = %e, "Content fetch failed");
            }
            PreviewError::HttpError { status, message } => {
                warn!(status = %status, error = %message, "Unexpected HTTP status");
            }
            PreviewError::TimeoutError(e) => {
                warn!(error = %e, "Request timed out");
            }
            PreviewError::ContentTooLarge(size) => {
                warn!(size = %size, "Response body exceeds limit");
            }
            PreviewError::ExternalServiceError { service, message } => {
                error!(
                    service = %service,
                    error = %message,
                    "External service error occurred"
                );
            }
            PreviewError::ExtractError(e) => {
                error!(error = %e, "Metadata extraction failed");
            }
            PreviewError::InvalidRequest(e) => {
                warn!(error = %e, "Rejected preview request");
            }
            PreviewError::PreviewsDisabled => {
                warn!("Preview requested while previews are disabled");
            }
            PreviewError::ConcurrencyLimitError => {
                error!("Concurrency semaphore closed");
            }
        }
    }
}
