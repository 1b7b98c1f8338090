use crate::enrichment::domain::Purl;
use chrono::{DateTime, Utc};

/// RetryMemory port - tracks the last failed-fetch timestamp per component
/// identity.
///
/// Entries are created or overwritten on fetch failure and never explicitly
/// deleted; absence means "never failed". The cooldown comparison itself is
/// the orchestrator's job - this port is pure lookup/write.
pub trait RetryMemory: Send + Sync {
    fn recall(&self, purl: &Purl) -> Option<DateTime<Utc>>;

    fn remember(&self, purl: &Purl, timestamp: DateTime<Utc>);
}
