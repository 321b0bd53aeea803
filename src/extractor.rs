use crate::metadata_api::MetadataApiResponse;
use crate::utils::{self, truncate_chars};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

pub const MAX_DESCRIPTION_CHARS: usize = 200;
pub const NO_DESCRIPTION: &str = "No description available";

/// Preview fields harvested from one page, before the risk assessment is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMetadata {
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub favicon_url: Option<String>,
}

/// Metadata extractor, responsible for extracting preview information from webpage content
#[derive(Clone)]
pub struct MetadataExtractor;

impl Default for MetadataExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extracts preview fields from raw markup. Missing fields fall back to
    /// defaults, so empty or non-HTML input still produces a usable value.
    pub fn extract(&self, html: &str, page_url: &Url) -> PageMetadata {
        let document = Html::parse_document(html);

        let title = self
            .extract_title(&document)
            .unwrap_or_else(|| utils::hostname_or_url(page_url));
        let description = self
            .extract_description(&document)
            .map(|d| truncate_chars(&d, MAX_DESCRIPTION_CHARS))
            .unwrap_or_else(|| NO_DESCRIPTION.to_string());
        let image_url = self
            .extract_image(&document)
            .and_then(|src| resolve(page_url, &src));
        let favicon_url = self
            .extract_favicon(&document)
            .and_then(|href| resolve(page_url, &href))
            .or_else(|| utils::default_favicon(page_url));

        debug!(
            url = %page_url,
            title = %title,
            has_image = image_url.is_some(),
            "Extracted page metadata"
        );

        PageMetadata {
            title,
            description,
            image_url,
            favicon_url,
        }
    }

    /// Maps the metadata service's payload onto the same fields and defaults as [`extract`](Self::extract).
    pub fn extract_from_api(&self, response: &MetadataApiResponse, page_url: &Url) -> PageMetadata {
        PageMetadata {
            title: response
                .title()
                .map(str::to_string)
                .unwrap_or_else(|| utils::hostname_or_url(page_url)),
            description: response
                .description()
                .map(|d| truncate_chars(d, MAX_DESCRIPTION_CHARS))
                .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
            image_url: response.image_url().and_then(|u| resolve(page_url, u)),
            favicon_url: response
                .logo_url()
                .and_then(|u| resolve(page_url, u))
                .or_else(|| utils::default_favicon(page_url)),
        }
    }

    fn extract_title(&self, document: &Html) -> Option<String> {
        meta_content(document, "og:title")
            .or_else(|| meta_content(document, "twitter:title"))
            .or_else(|| first_text(document, "title"))
    }

    fn extract_description(&self, document: &Html) -> Option<String> {
        meta_content(document, "og:description")
            .or_else(|| meta_content(document, "twitter:description"))
            .or_else(|| meta_content(document, "description"))
            .or_else(|| first_text(document, "p"))
    }

    fn extract_image(&self, document: &Html) -> Option<String> {
        meta_content(document, "og:image")
            .or_else(|| meta_content(document, "twitter:image"))
            .or_else(|| first_attr(document, "img[src]", "src"))
    }

    fn extract_favicon(&self, document: &Html) -> Option<String> {
        // `~=` matches "icon" and "shortcut icon" but not "apple-touch-icon".
        first_attr(document, "link[rel~='icon'][href]", "href")
            .or_else(|| first_attr(document, "link[rel~='apple-touch-icon'][href]", "href"))
    }
}

/// First non-empty `content` of a meta tag keyed by either `property` or `name`,
/// compared case-insensitively.
fn meta_content(document: &Html, key: &str) -> Option<String> {
    let selector =
        Selector::parse(&format!("meta[property='{key}' i], meta[name='{key}' i]")).ok()?;
    document
        .select(&selector)
        .filter_map(|el| el.value().attr("content"))
        .find_map(non_empty)
}

fn first_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .map(element_text)
        .find_map(|text| non_empty(&text))
}

fn first_attr(document: &Html, selector: &str, attr: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .filter_map(|el| el.value().attr(attr))
        .find_map(non_empty)
}

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn resolve(base: &Url, reference: &str) -> Option<String> {
    base.join(reference).ok().map(String::from)
}
