use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

/// Dotted-quad IPv4 literal anywhere in the host
#[allow(clippy::expect_used)]
static IPV4_HOST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}").expect("valid regex")
});

/// Any host character outside letters, digits, dot and hyphen
#[allow(clippy::expect_used)]
static SPECIAL_HOST_CHAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9.-]").expect("valid regex"));

/// Credential-phishing style host, e.g. `secure-login.example.com`
#[allow(clippy::expect_used)]
static PHISHING_HOST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(login|account|secure|bank).*\.(com|net|org)$").expect("valid regex")
});

/// Patterns penalised anywhere in the serialized URL. Each one costs 0.2.
#[allow(clippy::expect_used)]
static URL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)password|login|account",
        r#"[<>'"{}()]"#,
        r"(?i)\.(exe|dll|bat|sh|msi)$",
        r"[^\x20-\x7E]",
        r"[A-Za-z0-9]{30,}",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

const PATTERN_FLOOR: f64 = 0.1;

/// Independent heuristics contributing to the composite score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RiskSignal {
    Protocol,
    Domain,
    Certificate,
    UrlPattern,
}

impl RiskSignal {
    pub fn name(&self) -> &'static str {
        match self {
            RiskSignal::Protocol => "protocol",
            RiskSignal::Domain => "domain",
            RiskSignal::Certificate => "certificate",
            RiskSignal::UrlPattern => "urlPattern",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskFactor {
    pub signal: RiskSignal,
    pub weight: f64,
}

pub const DEFAULT_RISK_FACTORS: [RiskFactor; 4] = [
    RiskFactor {
        signal: RiskSignal::Protocol,
        weight: 0.3,
    },
    RiskFactor {
        signal: RiskSignal::Domain,
        weight: 0.3,
    },
    RiskFactor {
        signal: RiskSignal::Certificate,
        weight: 0.2,
    },
    RiskFactor {
        signal: RiskSignal::UrlPattern,
        weight: 0.2,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Safe,
    Moderate,
    Caution,
    High,
}

impl RiskLevel {
    /// Step function over the composite score, lower bounds inclusive.
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            RiskLevel::Safe
        } else if score >= 0.6 {
            RiskLevel::Moderate
        } else if score >= 0.4 {
            RiskLevel::Caution
        } else {
            RiskLevel::High
        }
    }
}

/// Per-signal scores, or the reason the assessment could not be made.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RiskDetails {
    Error { error: String },
    Signals(BTreeMap<String, f64>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub score: f64,
    pub risk: RiskLevel,
    pub details: RiskDetails,
}

impl RiskAssessment {
    /// The zero-score, high-risk value used whenever assessment itself fails.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            score: 0.0,
            risk: RiskLevel::High,
            details: RiskDetails::Error {
                error: message.into(),
            },
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.details, RiskDetails::Error { .. })
    }

    pub fn signal(&self, signal: RiskSignal) -> Option<f64> {
        match &self.details {
            RiskDetails::Signals(scores) => scores.get(signal.name()).copied(),
            RiskDetails::Error { .. } => None,
        }
    }
}

#[derive(Debug, Error)]
enum SignalError {
    #[error("URL has no host")]
    MissingHost,
}

/// Weights and reputation lists used by [`RiskAssessor`]
#[derive(Debug, Clone)]
pub struct RiskConfig {
    pub factors: Vec<RiskFactor>,
    /// Low-trust TLD suffixes, matched against the end of the host (e.g. ".tk")
    pub suspicious_tlds: Vec<String>,
    /// Well-known domains; matches the domain itself and any subdomain
    pub trusted_domains: Vec<String>,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            factors: DEFAULT_RISK_FACTORS.to_vec(),
            suspicious_tlds: [".xyz", ".tk", ".ml", ".ga", ".cf"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            trusted_domains: [
                "google.com",
                "microsoft.com",
                "apple.com",
                "amazon.com",
                "github.com",
                "linkedin.com",
                "twitter.com",
                "facebook.com",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Scores a URL from independent heuristics. Never fails: problems surface in
/// the returned assessment instead.
#[derive(Debug, Clone)]
pub struct RiskAssessor {
    config: RiskConfig,
}

impl Default for RiskAssessor {
    fn default() -> Self {
        Self::with_default_config()
    }
}

impl RiskAssessor {
    pub fn new(config: RiskConfig) -> Self {
        Self { config }
    }

    pub fn with_default_config() -> Self {
        Self::new(RiskConfig::default())
    }

    pub fn factors(&self) -> &[RiskFactor] {
        &self.config.factors
    }

    /// Parses and assesses a raw URL string; unparseable input yields a failed assessment.
    pub fn assess_str(&self, raw: &str) -> RiskAssessment {
        match Url::parse(raw.trim()) {
            Ok(url) => self.assess(&url),
            Err(e) => {
                warn!(url = %raw, error = %e, "Risk assessment failed");
                RiskAssessment::failed(e.to_string())
            }
        }
    }

    pub fn assess(&self, url: &Url) -> RiskAssessment {
        let mut details = BTreeMap::new();
        let mut weighted = 0.0;
        let mut total_weight = 0.0;

        for factor in &self.config.factors {
            if !(factor.weight.is_finite() && factor.weight > 0.0) {
                continue;
            }
            match self.evaluate(factor.signal, url) {
                Ok(score) => {
                    let score = score.clamp(0.0, 1.0);
                    weighted += score * factor.weight;
                    total_weight += factor.weight;
                    details.insert(factor.signal.name().to_string(), score);
                }
                Err(e) => {
                    warn!(signal = factor.signal.name(), error = %e, "Risk signal skipped");
                }
            }
        }

        if total_weight <= 0.0 {
            return RiskAssessment::failed("no risk signal could be computed");
        }

        let score = weighted / total_weight;
        if !score.is_finite() {
            return RiskAssessment::failed("risk score is not finite");
        }
        let score = score.clamp(0.0, 1.0);
        let risk = RiskLevel::from_score(score);
        debug!(url = %url, score, ?risk, "Risk assessed");

        RiskAssessment {
            score,
            risk,
            details: RiskDetails::Signals(details),
        }
    }

    fn evaluate(&self, signal: RiskSignal, url: &Url) -> Result<f64, SignalError> {
        match signal {
            RiskSignal::Protocol => Ok(protocol_score(url)),
            RiskSignal::Domain => self.domain_score(url),
            RiskSignal::Certificate => Ok(certificate_score(url)),
            RiskSignal::UrlPattern => Ok(url_pattern_score(url.as_str())),
        }
    }

    fn domain_score(&self, url: &Url) -> Result<f64, SignalError> {
        let host = url.host_str().ok_or(SignalError::MissingHost)?;
        let host = host.to_ascii_lowercase();

        if self.is_suspicious_tld(&host) {
            return Ok(0.2);
        }
        if self.is_trusted(&host) {
            return Ok(1.0);
        }
        if IPV4_HOST.is_match(&host)
            || SPECIAL_HOST_CHAR.is_match(&host)
            || PHISHING_HOST.is_match(&host)
        {
            return Ok(0.3);
        }
        Ok(0.7)
    }

    fn is_suspicious_tld(&self, host: &str) -> bool {
        self.config.suspicious_tlds.iter().any(|tld| {
            host.ends_with(tld.as_str()) || host == tld.trim_start_matches('.')
        })
    }

    fn is_trusted(&self, host: &str) -> bool {
        self.config
            .trusted_domains
            .iter()
            .any(|trusted| host == trusted || host.ends_with(&format!(".{trusted}")))
    }
}

fn protocol_score(url: &Url) -> f64 {
    if url.scheme() == "https" {
        1.0
    } else {
        0.2
    }
}

// No certificate is inspected; secure transport stands in for it.
fn certificate_score(url: &Url) -> f64 {
    if url.scheme() == "https" {
        1.0
    } else {
        0.5
    }
}

fn url_pattern_score(full_url: &str) -> f64 {
    let hits = URL_PATTERNS
        .iter()
        .filter(|pattern| pattern.is_match(full_url))
        .count() as i32;
    // Tenths keep 1.0 - 3 * 0.2 at exactly 0.4.
    (f64::from(10 - 2 * hits) / 10.0).max(PATTERN_FLOOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_protocol_and_certificate() {
        assert_eq!(protocol_score(&parse("https://example.com")), 1.0);
        assert_eq!(protocol_score(&parse("http://example.com")), 0.2);
        assert_eq!(certificate_score(&parse("https://example.com")), 1.0);
        assert_eq!(certificate_score(&parse("ftp://example.com")), 0.5);
    }

    #[test]
    fn test_domain_priority() {
        let assessor = RiskAssessor::with_default_config();
        let score = |s: &str| assessor.domain_score(&parse(s)).unwrap();

        assert_eq!(score("https://free-stuff.tk"), 0.2);
        assert_eq!(score("https://github.com"), 1.0);
        assert_eq!(score("https://gist.github.com"), 1.0);
        // Trusted wins over the phishing pattern.
        assert_eq!(score("https://secure-login.github.com"), 1.0);
        assert_eq!(score("https://notgithub.com"), 0.7);
        assert_eq!(score("http://192.168.0.10"), 0.3);
        assert_eq!(score("https://bank-login.com"), 0.3);
        assert_eq!(score("http://[::1]"), 0.3);
        assert_eq!(score("https://example.org"), 0.7);
    }

    #[test]
    fn test_domain_without_host_fails() {
        let assessor = RiskAssessor::with_default_config();
        assert!(assessor.domain_score(&parse("mailto:someone@example.com")).is_err());
    }

    #[test]
    fn test_url_pattern_penalties() {
        assert_eq!(url_pattern_score("https://example.com/about"), 1.0);
        assert_eq!(url_pattern_score("https://example.com/login"), 0.8);
        assert_eq!(url_pattern_score("https://example.com/setup.exe"), 0.8);
        assert_eq!(
            url_pattern_score(
                "https://example.com/password/(x)/abcdefghijklmnopqrstuvwxyz0123456789"
            ),
            0.4
        );
        assert_eq!(
            url_pattern_score(
                "https://example.com/account/(é)/abcdefghijklmnopqrstuvwxyz0123456789.exe"
            ),
            0.1
        );
    }

    #[test]
    fn test_risk_level_thresholds() {
        assert_eq!(RiskLevel::from_score(1.0), RiskLevel::Safe);
        assert_eq!(RiskLevel::from_score(0.8), RiskLevel::Safe);
        assert_eq!(RiskLevel::from_score(0.75), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_score(0.6), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_score(0.59), RiskLevel::Caution);
        assert_eq!(RiskLevel::from_score(0.4), RiskLevel::Caution);
        assert_eq!(RiskLevel::from_score(0.39), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(0.0), RiskLevel::High);
    }
}
