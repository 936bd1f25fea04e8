//! Data model shared by the cache, coordinator and router

mod notification;
mod result;

pub use notification::{ErrorNotification, Notification, BACKGROUND_ERROR, ENRICHMENT_FAILED};
pub use result::{AggregateResult, CompanyInfo, DetectionPayload, ScanUrl, SeoMetrics, TechResult};
