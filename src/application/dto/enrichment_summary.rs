use serde::Serialize;

/// Counters describing one completed enrichment cycle.
///
/// Per-component fetch and update failures are reflected here (and in the
/// logs) only - they never turn into a run-level error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnrichmentSummary {
    /// Components listed for the project.
    pub total_components: usize,
    /// Components carrying a package URL; only these participate.
    pub with_identity: usize,
    /// Components answered from the cache.
    pub cache_hits: usize,
    /// Cache misses skipped because their last failure is within cooldown.
    pub skipped_cooldown: usize,
    /// Fetches that returned license data.
    pub fetched: usize,
    /// Fetches answered definitively "unknown component" by the provider.
    pub not_found: usize,
    /// Fetches that failed and were put on cooldown.
    pub fetch_failures: usize,
    /// Inventory updates that succeeded.
    pub updated: usize,
    /// Inventory updates that failed (retried naturally on the next cycle).
    pub update_failures: usize,
}
