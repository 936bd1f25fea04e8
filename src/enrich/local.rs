//! Local stand-ins for the external enrichment services
//!
//! Used by the binary when no remote lookups are wired in. The technology
//! resolver reads detections straight out of the payload; the company and
//! SEO lookups answer with empty profiles.

use super::sources::{CompanyLookup, SeoLookup, SourceError, TechResolver};
use crate::model::{CompanyInfo, DetectionPayload, ScanUrl, SeoMetrics, TechResult};
use async_trait::async_trait;
use serde_json::{json, Value};

/// Payload field the DOM scanner fills with matched technologies
const TECHNOLOGIES_FIELD: &str = "technologies";

/// Returns the payload's `technologies` array, or an empty list.
#[derive(Debug, Default)]
pub struct PayloadTechResolver;

#[async_trait]
impl TechResolver for PayloadTechResolver {
    fn id(&self) -> &str {
        "payload-tech"
    }

    async fn resolve(&self, payload: &DetectionPayload) -> Result<TechResult, SourceError> {
        match payload.as_value().get(TECHNOLOGIES_FIELD) {
            Some(Value::Array(items)) => Ok(Value::Array(items.clone())),
            Some(other) => Err(SourceError::new(
                self.id(),
                format!("expected '{}' to be an array, got {}", TECHNOLOGIES_FIELD, other),
            )),
            None => Ok(json!([])),
        }
    }
}

/// Answers every company lookup with an empty profile.
#[derive(Debug, Default)]
pub struct EmptyCompanyLookup;

#[async_trait]
impl CompanyLookup for EmptyCompanyLookup {
    fn id(&self) -> &str {
        "empty-company"
    }

    async fn lookup(&self, _url: &ScanUrl) -> Result<CompanyInfo, SourceError> {
        Ok(json!({}))
    }
}

/// Answers every SEO lookup with empty metrics.
#[derive(Debug, Default)]
pub struct EmptySeoLookup;

#[async_trait]
impl SeoLookup for EmptySeoLookup {
    fn id(&self) -> &str {
        "empty-seo"
    }

    async fn metrics(&self, _url: &ScanUrl) -> Result<SeoMetrics, SourceError> {
        Ok(json!({}))
    }
}
