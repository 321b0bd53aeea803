use safe_preview::{
    MetadataApiResponse, MetadataExtractor, MAX_DESCRIPTION_CHARS, NO_DESCRIPTION,
};
use url::Url;

fn page_url() -> Url {
    Url::parse("https://news.example.com/2024/story.html").unwrap()
}

fn extract(html: &str) -> safe_preview::PageMetadata {
    MetadataExtractor::new().extract(html, &page_url())
}

#[test]
fn test_social_card_title_beats_title_element() {
    let metadata = extract(
        r#"<html><head>
            <title>Plain title</title>
            <meta property="og:title" content="Social title">
        </head></html>"#,
    );
    assert_eq!(metadata.title, "Social title");
}

#[test]
fn test_title_precedence_chain() {
    let twitter = extract(
        r#"<head><meta name="twitter:title" content="Card title"><title>Plain</title></head>"#,
    );
    assert_eq!(twitter.title, "Card title");

    let plain = extract("<head><title>  Plain &amp; simple  </title></head>");
    assert_eq!(plain.title, "Plain & simple");

    let fallback = extract("<body><p>no title here</p></body>");
    assert_eq!(fallback.title, "news.example.com");
}

#[test]
fn test_meta_attribute_order_does_not_matter() {
    let metadata = extract(r#"<head><meta content="Reversed" property="og:title"></head>"#);
    assert_eq!(metadata.title, "Reversed");
}

#[test]
fn test_description_precedence_chain() {
    let og = extract(
        r#"<head>
            <meta name="description" content="Generic">
            <meta name="twitter:description" content="Card">
            <meta property="og:description" content="Open Graph">
        </head>"#,
    );
    assert_eq!(og.description, "Open Graph");

    let twitter = extract(
        r#"<head><meta name="description" content="Generic"><meta name="twitter:description" content="Card"></head>"#,
    );
    assert_eq!(twitter.description, "Card");

    let generic = extract(
        r#"<head><meta name="description" content="Generic"></head><body><p>Paragraph</p></body>"#,
    );
    assert_eq!(generic.description, "Generic");

    let paragraph = extract("<body><p>   </p><p>First real paragraph.</p><p>Second.</p></body>");
    assert_eq!(paragraph.description, "First real paragraph.");

    let nothing = extract("<body><div>only divs</div></body>");
    assert_eq!(nothing.description, NO_DESCRIPTION);
}

#[test]
fn test_long_description_is_truncated() {
    let text = "x".repeat(250);
    let metadata = extract(&format!("<body><p>{text}</p></body>"));

    assert_eq!(metadata.description.chars().count(), MAX_DESCRIPTION_CHARS + 3);
    assert_eq!(metadata.description, format!("{}...", "x".repeat(200)));

    let exact = "y".repeat(200);
    let metadata = extract(&format!(r#"<meta name="description" content="{exact}">"#));
    assert_eq!(metadata.description, exact);
}

#[test]
fn test_image_precedence_and_resolution() {
    let og = extract(
        r#"<head>
            <meta name="twitter:image" content="https://cdn.example.com/card.png">
            <meta property="og:image" content="/images/og.png">
        </head><body><img src="inline.png"></body>"#,
    );
    assert_eq!(og.image_url.as_deref(), Some("https://news.example.com/images/og.png"));

    let twitter = extract(
        r#"<head><meta name="twitter:image" content="https://cdn.example.com/card.png"></head>
           <body><img src="inline.png"></body>"#,
    );
    assert_eq!(twitter.image_url.as_deref(), Some("https://cdn.example.com/card.png"));

    let inline = extract(r#"<body><img alt="no source"><img src="inline.png"></body>"#);
    assert_eq!(
        inline.image_url.as_deref(),
        Some("https://news.example.com/2024/inline.png")
    );

    let none = extract("<body><p>text only</p></body>");
    assert_eq!(none.image_url, None);
}

#[test]
fn test_favicon_precedence() {
    let icon = extract(
        r#"<head>
            <link rel="apple-touch-icon" href="/apple.png">
            <link rel="icon" href="/icon.svg">
        </head>"#,
    );
    assert_eq!(icon.favicon_url.as_deref(), Some("https://news.example.com/icon.svg"));

    let shortcut = extract(r#"<head><link href="/legacy.ico" rel="shortcut icon"></head>"#);
    assert_eq!(
        shortcut.favicon_url.as_deref(),
        Some("https://news.example.com/legacy.ico")
    );

    let apple = extract(r#"<head><link rel="apple-touch-icon" href="/apple.png"></head>"#);
    assert_eq!(apple.favicon_url.as_deref(), Some("https://news.example.com/apple.png"));

    let default = extract("<head><title>t</title></head>");
    assert_eq!(
        default.favicon_url.as_deref(),
        Some("https://news.example.com/favicon.ico")
    );
}

#[test]
fn test_empty_document_yields_defaults() {
    let metadata = extract("");
    assert_eq!(metadata.title, "news.example.com");
    assert_eq!(metadata.description, NO_DESCRIPTION);
    assert_eq!(metadata.image_url, None);
    assert_eq!(
        metadata.favicon_url.as_deref(),
        Some("https://news.example.com/favicon.ico")
    );
}

#[test]
fn test_api_response_mapping() {
    let extractor = MetadataExtractor::new();

    let response: MetadataApiResponse = serde_json::from_value(serde_json::json!({
        "status": "success",
        "data": {
            "title": "From API",
            "description": "d".repeat(220),
            "image": { "url": "https://cdn.example.com/api.png" },
            "logo": { "url": "https://news.example.com/logo.png" }
        }
    }))
    .unwrap();
    let metadata = extractor.extract_from_api(&response, &page_url());
    assert_eq!(metadata.title, "From API");
    assert_eq!(metadata.description, format!("{}...", "d".repeat(200)));
    assert_eq!(metadata.image_url.as_deref(), Some("https://cdn.example.com/api.png"));
    assert_eq!(
        metadata.favicon_url.as_deref(),
        Some("https://news.example.com/logo.png")
    );

    let empty: MetadataApiResponse =
        serde_json::from_value(serde_json::json!({ "data": null })).unwrap();
    let metadata = extractor.extract_from_api(&empty, &page_url());
    assert_eq!(metadata.title, "news.example.com");
    assert_eq!(metadata.description, NO_DESCRIPTION);
    assert_eq!(metadata.image_url, None);
    assert_eq!(
        metadata.favicon_url.as_deref(),
        Some("https://news.example.com/favicon.ico")
    );
}

#[test]
fn test_meta_keys_match_case_insensitively() {
    let metadata = extract(
        r#"<html><head>
            <meta name="Description" content="Generic">
            <meta PROPERTY="OG:Title" content="Shouted title">
        </head><body><p>Para</p></body></html>"#,
    );
    assert_eq!(metadata.description, "Generic");
    assert_eq!(metadata.title, "Shouted title");
}
