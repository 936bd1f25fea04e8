//! Scripted enrichment sources for integration tests
//!
//! Every source counts its calls and answers with a fixed outcome, so
//! tests can assert exactly which sources ran.

use async_trait::async_trait;
use serde_json::Value;
use sitelens::{
    CompanyLookup, DetectionPayload, ScanUrl, SeoLookup, SourceError, TechResolver,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// A source with a fixed answer and a call counter
pub struct MockSource {
    id: String,
    outcome: Result<Value, String>,
    calls: AtomicUsize,
}

impl MockSource {
    pub fn ok(id: &str, value: Value) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            outcome: Ok(value),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(id: &str, message: &str) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            outcome: Err(message.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn answer(&self) -> Result<Value, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.outcome
            .clone()
            .map_err(|message| SourceError::new(self.id.clone(), message))
    }
}

#[async_trait]
impl TechResolver for MockSource {
    fn id(&self) -> &str {
        &self.id
    }

    async fn resolve(&self, _payload: &DetectionPayload) -> Result<Value, SourceError> {
        self.answer().await
    }
}

#[async_trait]
impl CompanyLookup for MockSource {
    fn id(&self) -> &str {
        &self.id
    }

    async fn lookup(&self, _url: &ScanUrl) -> Result<Value, SourceError> {
        self.answer().await
    }
}

#[async_trait]
impl SeoLookup for MockSource {
    fn id(&self) -> &str {
        &self.id
    }

    async fn metrics(&self, _url: &ScanUrl) -> Result<Value, SourceError> {
        self.answer().await
    }
}
