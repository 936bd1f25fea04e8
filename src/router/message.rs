//! Inbound messages: a closed set, validated at the router boundary

use crate::model::{DetectionPayload, ScanUrl};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const SCAN_SITE_REQUEST: &str = "SCAN_SITE_REQUEST";
pub const DOM_SCAN_RESULT: &str = "DOM_SCAN_RESULT";

/// Errors raised while routing a message
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("message is not an object")]
    NotAnObject,

    #[error("malformed {kind} message: {reason}")]
    MalformedMessage { kind: String, reason: String },

    #[error("handler panicked: {0}")]
    HandlerPanicked(String),

    #[error("handler task failed: {0}")]
    Task(String),
}

/// Who sent a message. `context_id` identifies the originating page
/// context (a browser tab, for instance) when the transport knows it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSender {
    #[serde(default)]
    pub context_id: Option<u64>,
}

impl MessageSender {
    pub fn from_context(context_id: u64) -> Self {
        Self {
            context_id: Some(context_id),
        }
    }
}

/// A parsed inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    /// Ask for a DOM scan in the sender's (or the active) context
    ScanSiteRequest,
    /// A DOM scan finished. `url` is `None` when missing or blank.
    DomScanResult {
        url: Option<ScanUrl>,
        data: DetectionPayload,
    },
    /// Any other `type`, including a missing one. Handled as a no-op.
    Unrecognized(Option<String>),
}

#[derive(Deserialize)]
struct DomScanFields {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    data: Value,
}

impl InboundMessage {
    /// Validate a raw JSON message.
    pub fn parse(raw: &Value) -> Result<Self, RouterError> {
        let obj = raw.as_object().ok_or(RouterError::NotAnObject)?;
        let kind = obj.get("type").and_then(Value::as_str);

        match kind {
            Some(SCAN_SITE_REQUEST) => Ok(Self::ScanSiteRequest),
            Some(DOM_SCAN_RESULT) => {
                let fields: DomScanFields =
                    serde_json::from_value(raw.clone()).map_err(|e| RouterError::MalformedMessage {
                        kind: DOM_SCAN_RESULT.to_string(),
                        reason: e.to_string(),
                    })?;
                Ok(Self::DomScanResult {
                    url: fields.url.as_deref().and_then(ScanUrl::parse),
                    data: DetectionPayload::new(fields.data),
                })
            }
            other => Ok(Self::Unrecognized(other.map(str::to_string))),
        }
    }
}

/// The `type` of a raw message, if it has one
pub fn message_type(raw: &Value) -> Option<String> {
    raw.get("type").and_then(Value::as_str).map(str::to_string)
}

/// A message plus its sender, as read off a line-oriented transport.
///
/// Accepts either a bare message or `{"message": ..., "sender": {...}}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub message: Value,
    pub sender: MessageSender,
}

impl Envelope {
    pub fn from_value(value: Value) -> Self {
        let wrapped = value.get("type").is_none() && value.get("message").is_some();
        if !wrapped {
            return Self {
                message: value,
                sender: MessageSender::default(),
            };
        }

        let sender = value
            .get("sender")
            .cloned()
            .and_then(|s| serde_json::from_value(s).ok())
            .unwrap_or_default();
        let message = value.get("message").cloned().unwrap_or(Value::Null);
        Self { message, sender }
    }
}
