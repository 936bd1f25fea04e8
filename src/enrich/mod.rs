//! Enrichment: source contracts and the coordinator that joins them

mod coordinator;
mod local;
mod sources;

pub use coordinator::{EnrichError, EnrichmentCoordinator};
pub use local::{EmptyCompanyLookup, EmptySeoLookup, PayloadTechResolver};
pub(crate) use sources::panic_message;
pub use sources::{CompanyLookup, SeoLookup, SourceError, TechResolver};
