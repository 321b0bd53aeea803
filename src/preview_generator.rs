use crate::fetcher::FetchResult;
use crate::{
    CacheStrategy, Fetcher, MetadataExtractor, PreviewCache, PreviewError, PreviewGenerator,
    PreviewResult, RiskAssessment, RiskAssessor,
};
use async_trait::async_trait;
use tracing::{debug, instrument, warn};
use url::Url;

/// Single-URL preview pipeline: cache, risk scoring, direct fetch, metadata API fallback.
#[derive(Clone)]
pub struct UrlPreviewGenerator {
    pub cache: PreviewCache,
    pub cache_strategy: CacheStrategy,
    pub fetcher: Fetcher,
    extractor: MetadataExtractor,
    assessor: RiskAssessor,
}

impl UrlPreviewGenerator {
    pub fn new(cache_capacity: usize, cache_strategy: CacheStrategy) -> Self {
        Self::new_with_fetcher(cache_capacity, cache_strategy, Fetcher::new())
    }

    pub fn new_with_fetcher(
        cache_capacity: usize,
        cache_strategy: CacheStrategy,
        fetcher: Fetcher,
    ) -> Self {
        Self {
            cache: PreviewCache::new(cache_capacity),
            cache_strategy,
            fetcher,
            extractor: MetadataExtractor::new(),
            assessor: RiskAssessor::with_default_config(),
        }
    }

    pub fn with_cache(mut self, cache: PreviewCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_assessor(mut self, assessor: RiskAssessor) -> Self {
        self.assessor = assessor;
        self
    }

    pub fn assessor(&self) -> &RiskAssessor {
        &self.assessor
    }

    /// Only absolute http(s) URLs are fetched.
    fn parse_target(url: &str) -> Result<Url, PreviewError> {
        let parsed = Url::parse(url.trim())?;
        match parsed.scheme() {
            "http" | "https" => Ok(parsed),
            other => Err(PreviewError::InvalidUrl(format!(
                "unsupported scheme '{other}'"
            ))),
        }
    }

    async fn fetch_direct(
        &self,
        page_url: &Url,
        security: &RiskAssessment,
    ) -> Result<PreviewResult, PreviewError> {
        let metadata = match self.fetcher.fetch(page_url.as_str()).await? {
            FetchResult::Html(html) => self.extractor.extract(&html, page_url),
            FetchResult::Opaque { .. } => self.extractor.extract("", page_url),
        };
        Ok(PreviewResult::from_metadata(metadata, security.clone()))
    }

    async fn fetch_with_proxy(
        &self,
        page_url: &Url,
        security: RiskAssessment,
    ) -> Result<PreviewResult, PreviewError> {
        let response = self.fetcher.fetch_metadata_api(page_url.as_str()).await?;
        let metadata = self.extractor.extract_from_api(&response, page_url);
        Ok(PreviewResult::from_metadata(metadata, security))
    }

    #[instrument(level = "debug", skip(self))]
    async fn generate(&self, url: &str) -> PreviewResult {
        let page_url = match Self::parse_target(url) {
            Ok(page_url) => page_url,
            Err(e) => {
                e.log();
                return PreviewResult::unavailable(&e, self.assessor.assess_str(url));
            }
        };

        if self.cache_strategy == CacheStrategy::UseCache {
            if let Some(cached) = self.cache.get(url).await {
                debug!(url = %url, "Returning cached preview");
                return cached;
            }
        }

        // Scored before any fetch and handed to whichever path succeeds.
        let security = self.assessor.assess(&page_url);

        let result = match self.fetch_direct(&page_url, &security).await {
            Ok(preview) => Ok(preview),
            Err(e) => {
                e.log();
                warn!(url = %url, "Direct fetch failed, trying metadata API");
                self.fetch_with_proxy(&page_url, security.clone()).await
            }
        };

        match result {
            Ok(preview) => {
                if self.cache_strategy == CacheStrategy::UseCache {
                    self.cache.set(url.to_string(), preview.clone()).await;
                }
                preview
            }
            Err(e) => {
                e.log();
                PreviewResult::unavailable(&e, security)
            }
        }
    }
}

#[async_trait]
impl PreviewGenerator for UrlPreviewGenerator {
    async fn get_metadata(&self, url: &str) -> PreviewResult {
        self.generate(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_target() {
        assert!(UrlPreviewGenerator::parse_target("https://example.com").is_ok());
        assert!(UrlPreviewGenerator::parse_target("  http://example.com/a  ").is_ok());
        assert!(matches!(
            UrlPreviewGenerator::parse_target("not a url"),
            Err(PreviewError::UrlParseError(_))
        ));
        assert!(matches!(
            UrlPreviewGenerator::parse_target("javascript:alert(1)"),
            Err(PreviewError::InvalidUrl(_))
        ));
    }
}
