//! Outbound notifications emitted to the downstream listener

use super::result::AggregateResult;
use serde::{Deserialize, Serialize};

/// Message used when an enrichment fails.
pub const ENRICHMENT_FAILED: &str = "Failed to complete scan enrichment";

/// Message used for any failure caught at the router boundary.
pub const BACKGROUND_ERROR: &str = "Background error";

/// A terminal failure report. Never cached.
///
/// Carries `url` for enrichment failures and `context` (the inbound message
/// type) for routing failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorNotification {
    pub message: String,
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl ErrorNotification {
    pub fn enrichment_failed(error: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            message: ENRICHMENT_FAILED.to_string(),
            error: error.into(),
            url: Some(url.into()),
            context: None,
        }
    }

    pub fn background(error: impl Into<String>, context: Option<String>) -> Self {
        Self {
            message: BACKGROUND_ERROR.to_string(),
            error: error.into(),
            url: None,
            context,
        }
    }
}

/// Everything the orchestrator sends outward.
///
/// Wire form is `{"type": "...", "data": ...}`; `TRIGGER_DOM_SCAN` has no data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Notification {
    /// Enrichment complete (cache hit or fresh)
    ScanData(AggregateResult),
    /// Enrichment or routing failure
    ScanError(ErrorNotification),
    /// One-way signal asking a content context to re-scan
    TriggerDomScan,
}

impl Notification {
    /// The wire `type` tag
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ScanData(_) => "SCAN_DATA",
            Self::ScanError(_) => "SCAN_ERROR",
            Self::TriggerDomScan => "TRIGGER_DOM_SCAN",
        }
    }
}
