use crate::enrichment::domain::{Component, LicenseDetails};
use async_trait::async_trait;

/// Outcome of one license fetch.
///
/// Not-found and failure carry different retry semantics: a definitive
/// "component unknown to provider" answer yields no data for this cycle but
/// is never penalized with a cooldown, while a failure (transport error,
/// unexpected status, parse error) puts the component on cooldown. The
/// orchestrator partitions on these variants, so they are an explicit tagged
/// union rather than a nested Result.
#[derive(Debug)]
pub enum RetrieveOutcome {
    /// The provider knows the component and returned license data.
    Found(LicenseDetails),
    /// The provider definitively does not know the component.
    NotFound,
    /// The fetch itself failed; the component may be retried after cooldown.
    Failed(anyhow::Error),
}

impl RetrieveOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, RetrieveOutcome::Found(_))
    }
}

/// LicenseSource port for one external license-data provider.
///
/// Implementations must tag every returned value with a provenance label
/// unique to the provider + field kind, so the selection policy can rank
/// candidates (see `LicenseSelection`).
///
/// # Async Support
/// Implementations must be `Send + Sync`; the orchestrator issues all fetches
/// for one cycle concurrently.
#[async_trait]
pub trait LicenseSource: Send + Sync {
    /// Human-readable provider name, used in logs.
    fn source_name(&self) -> &'static str;

    /// Fetches license details for one component.
    ///
    /// Infallible at the signature level: every failure mode is folded into
    /// `RetrieveOutcome::Failed` so a single misbehaving fetch can never
    /// abort the surrounding cycle.
    async fn retrieve(&self, component: &Component) -> RetrieveOutcome;
}
