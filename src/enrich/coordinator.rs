//! Enrichment coordinator: cache check, fan-out, fan-in, write-through
//!
//! Fan-out: technology resolution, company lookup and SEO lookup each run
//! on their own task, started together and joined all-or-nothing. Any
//! rejection, including a panicking source, fails the whole enrichment and
//! nothing is cached.

use super::sources::{panic_message, CompanyLookup, SeoLookup, SourceError, TechResolver};
use crate::cache::ResultCache;
use crate::model::{AggregateResult, DetectionPayload, ScanUrl};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Enrichment for a URL failed; carries the failing source's message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("enrichment of {url} failed: {message}")]
pub struct EnrichError {
    pub message: String,
    pub url: String,
}

/// Produces aggregates for URLs, at most once per URL per process lifetime.
///
/// Concurrent calls for the same uncached URL each run the full fan-out;
/// there is no in-flight de-duplication.
pub struct EnrichmentCoordinator {
    cache: Arc<ResultCache>,
    tech: Arc<dyn TechResolver>,
    company: Arc<dyn CompanyLookup>,
    seo: Arc<dyn SeoLookup>,
}

impl EnrichmentCoordinator {
    pub fn new(
        cache: Arc<ResultCache>,
        tech: Arc<dyn TechResolver>,
        company: Arc<dyn CompanyLookup>,
        seo: Arc<dyn SeoLookup>,
    ) -> Self {
        Self {
            cache,
            tech,
            company,
            seo,
        }
    }

    /// The cache this coordinator writes through
    pub fn cache(&self) -> &Arc<ResultCache> {
        &self.cache
    }

    /// Return the cached aggregate for `url`, or build, store and return one.
    pub async fn enrich(
        &self,
        url: &ScanUrl,
        payload: &DetectionPayload,
    ) -> Result<Arc<AggregateResult>, EnrichError> {
        if let Some(hit) = self.cache.get(url) {
            debug!(url = %url, "cache hit");
            return Ok(hit);
        }
        debug!(url = %url, "cache miss; enriching");

        let tech = {
            let source = Arc::clone(&self.tech);
            let payload = payload.clone();
            tokio::spawn(async move { source.resolve(&payload).await })
        };
        let company = {
            let source = Arc::clone(&self.company);
            let url = url.clone();
            tokio::spawn(async move { source.lookup(&url).await })
        };
        let seo = {
            let source = Arc::clone(&self.seo);
            let url = url.clone();
            tokio::spawn(async move { source.metrics(&url).await })
        };

        let joined = tokio::try_join!(
            settle(self.tech.id(), tech),
            settle(self.company.id(), company),
            settle(self.seo.id(), seo),
        );

        match joined {
            Ok((techs, company, seo)) => {
                let result = Arc::new(AggregateResult::assemble(techs, company, seo));
                self.cache.put(url, Arc::clone(&result));
                Ok(result)
            }
            Err(e) => {
                warn!(url = %url, source = %e.source_id, error = %e, "enrichment source failed");
                Err(EnrichError {
                    message: e.message,
                    url: url.to_string(),
                })
            }
        }
    }
}

/// Await one source task; a panic becomes that source's rejection.
async fn settle<T>(
    source_id: &str,
    task: JoinHandle<Result<T, SourceError>>,
) -> Result<T, SourceError> {
    match task.await {
        Ok(outcome) => outcome,
        Err(e) if e.is_panic() => Err(SourceError::new(source_id, panic_message(e.into_panic()))),
        Err(e) => Err(SourceError::new(source_id, e.to_string())),
    }
}
