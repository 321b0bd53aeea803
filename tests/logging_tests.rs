#![cfg(feature = "logging")]

use safe_preview::{
    log_error_card, log_preview_card, LogLevelGuard, PreviewError, PreviewResult, RiskAssessor,
};

#[test]
fn test_cards_render_for_success_and_failure() {
    let _guard = LogLevelGuard::set_level("debug");
    let security = RiskAssessor::with_default_config().assess_str("https://github.com/tokio-rs");

    let ok = PreviewResult {
        title: "tokio-rs".to_string(),
        description: "A runtime for writing reliable asynchronous applications with Rust."
            .to_string(),
        image_url: Some("https://github.com/tokio-rs.png".to_string()),
        favicon_url: Some("https://github.com/favicon.ico".to_string()),
        last_updated: chrono::Utc::now(),
        security: security.clone(),
        error: false,
    };
    log_preview_card(&ok, "https://github.com/tokio-rs");

    let error = PreviewError::HttpError {
        status: 502,
        message: "Bad Gateway".to_string(),
    };
    log_error_card("https://github.com/tokio-rs", &error);
    log_preview_card(
        &PreviewResult::unavailable(&error, security),
        "https://github.com/tokio-rs",
    );
}
