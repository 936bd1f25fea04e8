//! Enrichment source contracts
//!
//! Each source is an external service reached through an async call. The
//! coordinator only depends on these traits.

use crate::model::{CompanyInfo, DetectionPayload, ScanUrl, SeoMetrics, TechResult};
use async_trait::async_trait;
use std::any::Any;
use thiserror::Error;

/// A source rejected its call.
///
/// Displays as the bare message so the text reaches the listener unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SourceError {
    /// Which source failed
    pub source_id: String,
    pub message: String,
}

impl SourceError {
    pub fn new(source_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            message: message.into(),
        }
    }
}

/// Text of a panic payload, for reporting a crashed task as an error
pub(crate) fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Resolves a detection payload into the page's technology stack.
#[async_trait]
pub trait TechResolver: Send + Sync {
    fn id(&self) -> &str;

    async fn resolve(&self, payload: &DetectionPayload) -> Result<TechResult, SourceError>;
}

/// Looks up the company behind a URL.
#[async_trait]
pub trait CompanyLookup: Send + Sync {
    fn id(&self) -> &str;

    async fn lookup(&self, url: &ScanUrl) -> Result<CompanyInfo, SourceError>;
}

/// Fetches SEO and traffic metrics for a URL.
#[async_trait]
pub trait SeoLookup: Send + Sync {
    fn id(&self) -> &str;

    async fn metrics(&self, url: &ScanUrl) -> Result<SeoMetrics, SourceError>;
}
