//! Message router: dispatches inbound messages by type
//!
//! Each message is handled on its own task so a panicking handler turns
//! into an error notification instead of taking the process down. Messages
//! are independent; several may be in flight at once.

use super::message::{message_type, InboundMessage, MessageSender, RouterError};
use super::outbound::{NotificationSink, ScanTarget, ScanTrigger};
use crate::enrich::{panic_message, EnrichmentCoordinator};
use crate::model::{ErrorNotification, Notification};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Returned to the transport for every handled message: a response may
/// still follow asynchronously.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ack {
    ResponsePending,
}

/// Stateless dispatcher between the transport, the coordinator, the scan
/// trigger and the listener.
pub struct MessageRouter {
    coordinator: Arc<EnrichmentCoordinator>,
    trigger: Arc<dyn ScanTrigger>,
    listener: Arc<dyn NotificationSink>,
}

impl MessageRouter {
    pub fn new(
        coordinator: Arc<EnrichmentCoordinator>,
        trigger: Arc<dyn ScanTrigger>,
        listener: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            coordinator,
            trigger,
            listener,
        }
    }

    /// Handle one inbound message to completion.
    ///
    /// Any failure at this boundary becomes a `SCAN_ERROR` with the
    /// message's type as context. Always acknowledges.
    pub async fn handle(self: &Arc<Self>, raw: Value, sender: MessageSender) -> Ack {
        let context = message_type(&raw);
        let router = Arc::clone(self);

        let task = tokio::spawn(async move { router.dispatch(&raw, sender).await });
        let outcome = match task.await {
            Ok(result) => result,
            Err(e) if e.is_panic() => {
                Err(RouterError::HandlerPanicked(panic_message(e.into_panic())))
            }
            Err(e) => Err(RouterError::Task(e.to_string())),
        };

        if let Err(e) = outcome {
            warn!(context = ?context, error = %e, "message handling failed");
            self.emit(Notification::ScanError(ErrorNotification::background(
                e.to_string(),
                context,
            )))
            .await;
        }

        Ack::ResponsePending
    }

    async fn dispatch(&self, raw: &Value, sender: MessageSender) -> Result<(), RouterError> {
        match InboundMessage::parse(raw)? {
            InboundMessage::ScanSiteRequest => {
                let target = sender
                    .context_id
                    .map(ScanTarget::Context)
                    .unwrap_or(ScanTarget::ActiveContext);
                debug!(?target, "triggering DOM scan");
                self.trigger.trigger_scan(target);
            }
            InboundMessage::DomScanResult { url: None, .. } => {
                debug!("dropping scan result without url");
            }
            InboundMessage::DomScanResult {
                url: Some(url),
                data,
            } => {
                let notification = match self.coordinator.enrich(&url, &data).await {
                    Ok(result) => Notification::ScanData(result.as_ref().clone()),
                    Err(e) => Notification::ScanError(ErrorNotification::enrichment_failed(
                        e.message, e.url,
                    )),
                };
                self.emit(notification).await;
            }
            InboundMessage::Unrecognized(kind) => {
                debug!(kind = ?kind, "ignoring unrecognized message");
            }
        }
        Ok(())
    }

    async fn emit(&self, notification: Notification) {
        let kind = notification.kind();
        if let Err(e) = self.listener.send(notification).await {
            warn!(kind, error = %e, "listener rejected notification");
        }
    }
}
