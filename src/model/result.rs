//! Scan results: the cache key, the raw detection payload, and the aggregate

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Output of the technology-resolution source (opaque to the core)
pub type TechResult = Value;

/// Output of the company-profile lookup (opaque to the core)
pub type CompanyInfo = Value;

/// Output of the SEO/traffic lookup (opaque to the core)
pub type SeoMetrics = Value;

/// URL identifying one scanned page; the cache key.
///
/// Never empty. Construct with [`ScanUrl::parse`], which trims surrounding
/// whitespace and rejects blank input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScanUrl(String);

impl ScanUrl {
    /// Returns `None` for empty or whitespace-only input.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ScanUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the DOM scanner reported for a page.
///
/// Passed through unmodified to the technology resolver; the core never
/// looks inside it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DetectionPayload(Value);

impl DetectionPayload {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for DetectionPayload {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// The combined output of all three enrichment sources for one URL.
///
/// Serializes with explicit `null`s for absent parts, which is also the
/// durable layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    #[serde(default)]
    pub techs: Option<TechResult>,
    #[serde(default)]
    pub company: Option<CompanyInfo>,
    #[serde(default)]
    pub seo: Option<SeoMetrics>,
}

impl AggregateResult {
    /// Assemble an aggregate from raw source outputs; JSON `null` becomes `None`.
    pub fn assemble(techs: TechResult, company: CompanyInfo, seo: SeoMetrics) -> Self {
        fn present(value: Value) -> Option<Value> {
            if value.is_null() {
                None
            } else {
                Some(value)
            }
        }

        Self {
            techs: present(techs),
            company: present(company),
            seo: present(seo),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scan_url_rejects_blank_input() {
        assert!(ScanUrl::parse("").is_none());
        assert!(ScanUrl::parse("   ").is_none());
    }

    #[test]
    fn scan_url_trims_whitespace() {
        let url = ScanUrl::parse("  a.com \n").unwrap();
        assert_eq!(url.as_str(), "a.com");
    }

    #[test]
    fn aggregate_serializes_absent_parts_as_null() {
        let result = AggregateResult::assemble(json!([{"name": "React"}]), Value::Null, json!({}));
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(
            value,
            json!({"techs": [{"name": "React"}], "company": null, "seo": {}})
        );
    }

    #[test]
    fn aggregate_tolerates_missing_fields_on_load() {
        let result: AggregateResult =
            serde_json::from_value(json!({"seo": {"visits": 3}})).unwrap();
        assert!(result.techs.is_none());
        assert!(result.company.is_none());
        assert_eq!(result.seo, Some(json!({"visits": 3})));
    }
}
