use safe_preview::{log_preview_card, setup_logging, LogConfig, PreviewService};
use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    setup_logging(LogConfig {
        file_output: false,
        ..LogConfig::default()
    })?;

    let service = PreviewService::new();
    let urls: Vec<String> = std::env::args().skip(1).collect();
    let urls = if urls.is_empty() {
        vec!["https://www.rust-lang.org".to_string()]
    } else {
        urls
    };

    for url in &urls {
        let preview = service.get_metadata(url).await;
        log_preview_card(&preview, url);
        println!("{}", serde_json::to_string_pretty(&preview)?);
    }

    Ok(())
}
