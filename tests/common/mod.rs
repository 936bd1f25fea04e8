//! Common test utilities: scripted sources and a wired-up router harness

#![allow(dead_code)]

pub mod mock_sources;

pub use mock_sources::MockSource;

use sitelens::router::{ChannelSink, ChannelTrigger, TriggerCommand};
use sitelens::{
    DurableStore, EnrichmentCoordinator, MessageRouter, Notification, ResultCache,
};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver};

/// A router wired to channel-backed listener and trigger, plus handles to
/// everything a test wants to inspect.
pub struct Harness {
    pub router: Arc<MessageRouter>,
    pub cache: Arc<ResultCache>,
    pub tech: Arc<MockSource>,
    pub company: Arc<MockSource>,
    pub seo: Arc<MockSource>,
    pub notifications: UnboundedReceiver<Notification>,
    pub triggers: UnboundedReceiver<TriggerCommand>,
}

impl Harness {
    pub fn new(
        store: Arc<dyn DurableStore>,
        tech: Arc<MockSource>,
        company: Arc<MockSource>,
        seo: Arc<MockSource>,
    ) -> Self {
        let cache = Arc::new(ResultCache::new(store));
        let coordinator = Arc::new(EnrichmentCoordinator::new(
            cache.clone(),
            tech.clone(),
            company.clone(),
            seo.clone(),
        ));
        let (note_tx, notifications) = mpsc::unbounded_channel();
        let (trigger_tx, triggers) = mpsc::unbounded_channel();
        let router = Arc::new(MessageRouter::new(
            coordinator,
            Arc::new(ChannelTrigger::new(trigger_tx)),
            Arc::new(ChannelSink::new(note_tx)),
        ));

        Self {
            router,
            cache,
            tech,
            company,
            seo,
            notifications,
            triggers,
        }
    }

    /// Everything emitted so far, without waiting
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        let mut out = Vec::new();
        while let Ok(n) = self.notifications.try_recv() {
            out.push(n);
        }
        out
    }

    /// Total source invocations across all three sources
    pub fn source_calls(&self) -> usize {
        self.tech.calls() + self.company.calls() + self.seo.calls()
    }
}
