use serde::Deserialize;

/// Response of the external metadata lookup service,
/// `{status, data: {title, description, image: {url}, logo: {url}}}`.
///
/// Every field is optional; the service omits or nulls whatever it could not find.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetadataApiResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<MetadataApiData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetadataApiData {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<MetadataApiUrl>,
    #[serde(default)]
    pub logo: Option<MetadataApiUrl>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetadataApiUrl {
    #[serde(default)]
    pub url: Option<String>,
}

impl MetadataApiResponse {
    /// A missing status is taken as success.
    pub fn is_success(&self) -> bool {
        self.status.as_deref().map_or(true, |s| s == "success")
    }

    pub fn failure_reason(&self) -> String {
        self.message
            .clone()
            .or_else(|| self.status.clone())
            .unwrap_or_else(|| "unknown failure".to_string())
    }

    pub fn title(&self) -> Option<&str> {
        non_empty(self.data.as_ref()?.title.as_deref())
    }

    pub fn description(&self) -> Option<&str> {
        non_empty(self.data.as_ref()?.description.as_deref())
    }

    pub fn image_url(&self) -> Option<&str> {
        non_empty(self.data.as_ref()?.image.as_ref()?.url.as_deref())
    }

    pub fn logo_url(&self) -> Option<&str> {
        non_empty(self.data.as_ref()?.logo.as_ref()?.url.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_partial_payloads() {
        let full: MetadataApiResponse = serde_json::from_str(
            r#"{"status":"success","data":{"title":"Rust","description":"A language",
                "image":{"url":"https://rust-lang.org/og.png"},"logo":{"url":"https://rust-lang.org/logo.svg"}}}"#,
        )
        .unwrap();
        assert!(full.is_success());
        assert_eq!(full.title(), Some("Rust"));
        assert_eq!(full.image_url(), Some("https://rust-lang.org/og.png"));
        assert_eq!(full.logo_url(), Some("https://rust-lang.org/logo.svg"));

        let sparse: MetadataApiResponse =
            serde_json::from_str(r#"{"data":{"title":"  ","image":null}}"#).unwrap();
        assert!(sparse.is_success());
        assert_eq!(sparse.title(), None);
        assert_eq!(sparse.image_url(), None);
        assert_eq!(sparse.logo_url(), None);

        let failed: MetadataApiResponse =
            serde_json::from_str(r#"{"status":"fail","message":"invalid url"}"#).unwrap();
        assert!(!failed.is_success());
        assert_eq!(failed.failure_reason(), "invalid url");
    }
}
