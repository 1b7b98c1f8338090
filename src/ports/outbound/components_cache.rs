use crate::enrichment::domain::{Component, LicenseDetails, Purl};
use crate::shared::Result;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// ComponentsCache port - the cache-aside store mapping a component identity
/// to previously resolved license details.
///
/// Entries have no TTL; staleness is governed entirely by the orchestrator's
/// cooldown policy for re-fetching. Reads and writes are independent
/// operations: every write fully replaces the entry for its purl, so no
/// read-modify-write atomicity is required across them.
///
/// Production backings are expected to be durable across process restarts -
/// the orchestration relies on this to avoid redundant fetching across runs.
pub trait ComponentsCache: Send + Sync {
    /// Returns cached details for the purls actually present; purls without
    /// an entry are simply absent from the result.
    fn get_components(&self, purls: &[Purl]) -> Result<HashMap<Purl, LicenseDetails>>;

    /// Persists the license details of each given component, overwriting any
    /// existing entry. Components without a purl are ignored.
    fn cache_components(&self, components: &[Component], cached_at: DateTime<Utc>) -> Result<()>;
}
