//! URL records: the normalized unit every sitemap document is made of.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// Site root every location in a run is built from. Never ends with a slash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl(String);

impl BaseUrl {
    /// Validates an absolute http(s) URL with a host and strips trailing slashes.
    pub fn new(raw: &str) -> Result<Self> {
        let trimmed = raw.trim().trim_end_matches('/');
        let invalid = |reason: &str| Error::InvalidBaseUrl {
            url: raw.to_string(),
            reason: reason.to_string(),
        };

        let parsed = url::Url::parse(trimmed).map_err(|e| invalid(&e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid("scheme must be http or https"));
        }
        if parsed.host_str().is_none() {
            return Err(invalid("missing host"));
        }
        if parsed.query().is_some() || parsed.fragment().is_some() {
            return Err(invalid("must not carry a query or fragment"));
        }

        Ok(BaseUrl(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Joins an absolute path (`/blog/x`) onto the base. The empty path is the site root.
    pub fn join(&self, path: &str) -> String {
        format!("{}{}", self.0, path)
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An absolute URL, kept exactly as built (escaping happens at render time).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location(String);

impl Location {
    /// Kept verbatim, so control characters are refused here: the parser would percent-encode
    /// them in its own copy, but they would reach the XML raw.
    pub fn new(raw: String) -> Result<Self> {
        if raw.chars().any(char::is_control) {
            return Err(Error::InvalidLocation(raw));
        }
        match url::Url::parse(&raw) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.host_str().is_some() => {
                Ok(Location(raw))
            }
            _ => Err(Error::InvalidLocation(raw)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Crawl priority in [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Priority(f64);

impl Priority {
    pub const HIGHEST: Priority = Priority(1.0);

    pub fn new(value: f64) -> Result<Self> {
        if (0.0..=1.0).contains(&value) {
            Ok(Priority(value))
        } else {
            Err(Error::InvalidPriority(value))
        }
    }

    /// For the builder's constants, which are in range by construction.
    pub(crate) const fn constant(value: f64) -> Self {
        Priority(value)
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for Priority {
    /// Always with a decimal point: `1.0`, `0.8`, `0.85`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.fract() == 0.0 {
            write!(f, "{:.1}", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// How often a page is expected to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFrequency {
    Always,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Never,
}

impl ChangeFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Always => "always",
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
            Self::Never => "never",
        }
    }
}

impl fmt::Display for ChangeFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One `<url>` entry.
#[derive(Debug, Clone, PartialEq)]
pub struct UrlRecord {
    pub location: Location,
    pub last_modified: Option<DateTime<Utc>>,
    pub change_frequency: Option<ChangeFrequency>,
    pub priority: Option<Priority>,
}

impl UrlRecord {
    pub fn new(location: Location) -> Self {
        UrlRecord {
            location,
            last_modified: None,
            change_frequency: None,
            priority: None,
        }
    }

    pub fn last_modified(mut self, at: DateTime<Utc>) -> Self {
        self.last_modified = Some(at);
        self
    }

    pub fn change_frequency(mut self, frequency: ChangeFrequency) -> Self {
        self.change_frequency = Some(frequency);
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }
}

/// One `<sitemap>` entry of the index document.
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapRef {
    pub location: Location,
    pub last_modified: DateTime<Utc>,
}

/// W3C datetime with milliseconds in UTC, e.g. `2024-01-15T00:00:00.000Z`.
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_base_url_strips_trailing_slashes() {
        let base = BaseUrl::new("https://rusdecor.info//").unwrap();
        assert_eq!(base.as_str(), "https://rusdecor.info");
        assert_eq!(base.join("/blog"), "https://rusdecor.info/blog");
        assert_eq!(base.join(""), "https://rusdecor.info");
    }

    #[test]
    fn test_base_url_keeps_path_prefix() {
        let base = BaseUrl::new(" https://example.com/shop/ ").unwrap();
        assert_eq!(base.as_str(), "https://example.com/shop");
    }

    #[test]
    fn test_base_url_rejects_bad_input() {
        for raw in ["", "rusdecor.info", "ftp://rusdecor.info", "https://rusdecor.info/?a=b"] {
            assert!(
                matches!(BaseUrl::new(raw), Err(Error::InvalidBaseUrl { .. })),
                "expected '{}' to be rejected",
                raw
            );
        }
    }

    #[test]
    fn test_location_requires_absolute_http_url() {
        assert!(Location::new("https://example.com/a?b=1&c=2".to_string()).is_ok());
        assert!(Location::new("/relative/path".to_string()).is_err());
        assert!(Location::new("mailto:someone@example.com".to_string()).is_err());
    }

    #[test]
    fn test_location_rejects_control_characters() {
        for raw in ["https://example.com/sof\u{1}as", "https://example.com/a\u{b}", "https://example.com/\u{1f}"] {
            assert!(
                matches!(Location::new(raw.to_string()), Err(Error::InvalidLocation(_))),
                "{:?} should be rejected",
                raw
            );
        }
    }

    #[test]
    fn test_priority_range() {
        assert!(Priority::new(0.0).is_ok());
        assert!(Priority::new(1.0).is_ok());
        assert!(Priority::new(-0.1).is_err());
        assert!(Priority::new(1.01).is_err());
        assert!(Priority::new(f64::NAN).is_err());
    }

    #[test]
    fn test_priority_display() {
        assert_eq!(Priority::HIGHEST.to_string(), "1.0");
        assert_eq!(Priority::new(0.0).unwrap().to_string(), "0.0");
        assert_eq!(Priority::new(0.8).unwrap().to_string(), "0.8");
        assert_eq!(Priority::new(0.85).unwrap().to_string(), "0.85");
    }

    #[test]
    fn test_format_timestamp_has_millis_and_zulu() {
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        assert_eq!(format_timestamp(&at), "2024-01-15T00:00:00.000Z");
    }

    #[test]
    fn test_change_frequency_serde_names() {
        let json = serde_json::to_string(&ChangeFrequency::Weekly).unwrap();
        assert_eq!(json, "\"weekly\"");
        let parsed: ChangeFrequency = serde_json::from_str("\"monthly\"").unwrap();
        assert_eq!(parsed, ChangeFrequency::Monthly);
    }
}
