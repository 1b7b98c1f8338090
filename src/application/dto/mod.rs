pub mod enrichment_event;
pub mod enrichment_summary;

pub use enrichment_event::{EnrichmentEvent, ProjectRef};
pub use enrichment_summary::EnrichmentSummary;
