//! Two-tier result cache
//!
//! The memory tier answers every read for the life of the process. The
//! durable tier is written behind `put` on a detached task and read exactly
//! once, by `rehydrate()`, to warm the memory tier at startup.

use crate::model::{AggregateResult, ScanUrl};
use crate::storage::DurableStore;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::Notify;
use tracing::{debug, info, warn};

/// Reserved key namespace for persisted results
pub const KEY_PREFIX: &str = "scanResult:";

/// Durable key for a URL
pub fn storage_key(url: &ScanUrl) -> String {
    format!("{}{}", KEY_PREFIX, url.as_str())
}

/// Outcome of a rehydration pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RehydrateReport {
    /// Entries copied into the memory tier
    pub loaded: usize,
    /// Namespaced entries that could not be used (bad key or bad value)
    pub skipped: usize,
    /// Entries outside the namespace, left alone
    pub foreign: usize,
}

/// Durable writes spawned by `put` that have not finished yet
#[derive(Default)]
struct PendingWrites {
    count: AtomicUsize,
    idle: Notify,
}

/// Marks one pending write as finished when dropped, including when the
/// write task panics or is cancelled.
struct PendingGuard(Arc<PendingWrites>);

impl PendingGuard {
    fn start(pending: &Arc<PendingWrites>) -> Self {
        pending.count.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(pending))
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        if self.0.count.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.0.idle.notify_waiters();
        }
    }
}

/// URL → aggregate map with write-behind persistence.
///
/// Shared by `Arc` between the coordinator and anything that inspects the
/// cache. The durable store is touched by nothing else.
pub struct ResultCache {
    memory: DashMap<ScanUrl, Arc<AggregateResult>>,
    store: Arc<dyn DurableStore>,
    rehydrated: AtomicBool,
    pending: Arc<PendingWrites>,
}

impl ResultCache {
    pub fn new(store: Arc<dyn DurableStore>) -> Self {
        Self {
            memory: DashMap::new(),
            store,
            rehydrated: AtomicBool::new(false),
            pending: Arc::default(),
        }
    }

    /// Look up a URL in the memory tier. Never touches durable storage.
    pub fn get(&self, url: &ScanUrl) -> Option<Arc<AggregateResult>> {
        self.memory.get(url).map(|r| Arc::clone(r.value()))
    }

    /// Store a result: memory tier now, durable tier on a detached task.
    ///
    /// Returns as soon as the memory tier is updated. A durable failure is
    /// logged and dropped; the memory tier keeps the result either way.
    pub fn put(&self, url: &ScanUrl, result: Arc<AggregateResult>) {
        self.memory.insert(url.clone(), Arc::clone(&result));

        let value = match serde_json::to_value(result.as_ref()) {
            Ok(value) => value,
            Err(e) => {
                warn!(url = %url, error = %e, "could not serialize result for persistence");
                return;
            }
        };
        let Ok(runtime) = Handle::try_current() else {
            warn!(url = %url, "no async runtime; result kept in memory only");
            return;
        };

        let store = Arc::clone(&self.store);
        let guard = PendingGuard::start(&self.pending);
        let key = storage_key(url);
        let url = url.clone();
        runtime.spawn(async move {
            let _guard = guard;
            if let Err(e) = store.write(&key, &value).await {
                warn!(url = %url, error = %e, "durable write failed; keeping in-memory result");
            }
        });
    }

    /// Wait until every durable write started by `put` has finished.
    pub async fn flush(&self) {
        loop {
            let idle = self.pending.idle.notified();
            if self.pending.count.load(Ordering::SeqCst) == 0 {
                return;
            }
            idle.await;
        }
    }

    /// Load every namespaced entry from the durable tier into memory.
    ///
    /// Runs once; later calls return an empty report. An unavailable store
    /// leaves the memory tier empty and is not an error.
    pub async fn rehydrate(&self) -> RehydrateReport {
        if self.rehydrated.swap(true, Ordering::SeqCst) {
            debug!("rehydrate called again; ignoring");
            return RehydrateReport::default();
        }

        let entries = match self.store.read_all().await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "durable store unavailable; starting with an empty cache");
                return RehydrateReport::default();
            }
        };

        let mut report = RehydrateReport::default();
        for (key, value) in entries {
            let Some(raw_url) = key.strip_prefix(KEY_PREFIX) else {
                report.foreign += 1;
                continue;
            };
            let Some(url) = ScanUrl::parse(raw_url) else {
                report.skipped += 1;
                continue;
            };
            match serde_json::from_value::<AggregateResult>(value) {
                Ok(result) => {
                    self.memory.insert(url, Arc::new(result));
                    report.loaded += 1;
                }
                Err(e) => {
                    warn!(key = %key, error = %e, "skipping unreadable persisted result");
                    report.skipped += 1;
                }
            }
        }

        info!(
            loaded = report.loaded,
            skipped = report.skipped,
            "rehydrated result cache"
        );
        report
    }

    /// Number of URLs in the memory tier
    pub fn len(&self) -> usize {
        self.memory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memory.is_empty()
    }

    /// Cached URLs, sorted
    pub fn urls(&self) -> Vec<ScanUrl> {
        let mut urls: Vec<ScanUrl> = self.memory.iter().map(|r| r.key().clone()).collect();
        urls.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        urls
    }
}
