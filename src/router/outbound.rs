//! Outbound edges of the router: the notification listener and the scan trigger
//!
//! Both are external collaborators. The listener is async and may fail;
//! the trigger is a one-way command with no completion guarantee.

use crate::model::Notification;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;

/// The downstream listener could not take a notification.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("listener channel closed")]
    Closed,
    #[error("transport error: {0}")]
    Other(String),
}

/// Where notifications go.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, notification: Notification) -> Result<(), TransportError>;
}

/// Which execution context a scan should run in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScanTarget {
    /// A specific context, by id
    Context(u64),
    /// Whatever context is active when the trigger resolves it
    ActiveContext,
}

/// Fires a DOM scan. One-way: nothing comes back and nothing can fail
/// visibly; the scan result, if any, arrives later as a new inbound message.
pub trait ScanTrigger: Send + Sync {
    fn trigger_scan(&self, target: ScanTarget);
}

/// A trigger addressed to a context, as written to a transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerCommand {
    pub target: ScanTarget,
    pub message: Notification,
}

/// Listener backed by an unbounded tokio channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: UnboundedSender<Notification>,
}

impl ChannelSink {
    pub fn new(tx: UnboundedSender<Notification>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl NotificationSink for ChannelSink {
    async fn send(&self, notification: Notification) -> Result<(), TransportError> {
        self.tx.send(notification).map_err(|_| TransportError::Closed)
    }
}

/// Trigger that queues `TRIGGER_DOM_SCAN` commands on a channel.
#[derive(Debug, Clone)]
pub struct ChannelTrigger {
    tx: UnboundedSender<TriggerCommand>,
}

impl ChannelTrigger {
    pub fn new(tx: UnboundedSender<TriggerCommand>) -> Self {
        Self { tx }
    }
}

impl ScanTrigger for ChannelTrigger {
    fn trigger_scan(&self, target: ScanTarget) {
        let command = TriggerCommand {
            target,
            message: Notification::TriggerDomScan,
        };
        if self.tx.send(command).is_err() {
            tracing::debug!(?target, "trigger channel closed; scan request dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn channel_sink_delivers() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = ChannelSink::new(tx);
        sink.send(Notification::TriggerDomScan).await.unwrap();
        assert_eq!(rx.recv().await, Some(Notification::TriggerDomScan));
    }

    #[tokio::test]
    async fn channel_sink_reports_closed_listener() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let sink = ChannelSink::new(tx);
        let result = sink.send(Notification::TriggerDomScan).await;
        assert!(matches!(result, Err(TransportError::Closed)));
    }

    #[test]
    fn trigger_command_wire_shape() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        ChannelTrigger::new(tx).trigger_scan(ScanTarget::Context(3));

        let command = rx.try_recv().unwrap();
        assert_eq!(
            serde_json::to_value(&command).unwrap(),
            json!({"target": {"context": 3}, "message": {"type": "TRIGGER_DOM_SCAN"}})
        );
    }

    #[test]
    fn trigger_with_closed_channel_is_silent() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        ChannelTrigger::new(tx).trigger_scan(ScanTarget::ActiveContext);
    }
}
