//! Sitelens: scan orchestration with a two-tier result cache
//!
//! Receives DOM detection payloads for URLs, enriches each URL at most once
//! per process lifetime by fanning out to three independent sources, and
//! reports the aggregate (or a failure) to a listener.
//!
//! # Core Concepts
//!
//! - **ResultCache**: in-memory map backed by a durable store, rehydrated once at startup
//! - **EnrichmentCoordinator**: cache check, concurrent fan-out, all-or-nothing join
//! - **MessageRouter**: dispatches inbound messages, emits `SCAN_DATA` / `SCAN_ERROR`
//!
//! # Example
//!
//! ```
//! use sitelens::{MemoryStore, ResultCache, ScanUrl};
//! use std::sync::Arc;
//!
//! let cache = ResultCache::new(Arc::new(MemoryStore::new()));
//! assert!(cache.get(&ScanUrl::parse("a.com").unwrap()).is_none());
//! ```

pub mod cache;
pub mod config;
pub mod enrich;
pub mod model;
pub mod router;
pub mod storage;

pub use cache::{RehydrateReport, ResultCache};
pub use enrich::{
    CompanyLookup, EnrichError, EnrichmentCoordinator, SeoLookup, SourceError, TechResolver,
};
pub use model::{AggregateResult, DetectionPayload, ErrorNotification, Notification, ScanUrl};
pub use router::{Ack, MessageRouter, MessageSender, NotificationSink, ScanTarget, ScanTrigger};
pub use storage::{DurableStore, MemoryStore, OpenStore, SqliteStore, StorageError, StorageResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
