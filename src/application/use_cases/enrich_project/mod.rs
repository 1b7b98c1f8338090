use crate::application::dto::{EnrichmentEvent, EnrichmentSummary};
use crate::enrichment::domain::{Component, Purl};
use crate::enrichment::policies::LicenseSelection;
use crate::ports::outbound::{
    Clock, ComponentsCache, InventoryClient, LicenseSource, RetrieveOutcome, RetryMemory,
};
use crate::shared::Result;
use chrono::{DateTime, Duration, Utc};
use futures::future::join_all;
use tracing::{debug, info, warn};

/// EnrichProjectUseCase - the enrichment orchestration engine.
///
/// One `execute` call runs a single cache-aside enrichment cycle for one
/// project: list components, answer what the cache can, fetch the rest
/// (minus components on cooldown) through the rate-limited source, persist
/// new results, and push selected license expressions back to the inventory
/// system.
///
/// No state survives between runs inside this type; everything persistent
/// lives in the cache and retry-memory collaborators, so concurrent runs for
/// different projects are safe as long as those backings are.
///
/// # Type Parameters
/// * `I` - InventoryClient implementation
/// * `C` - ComponentsCache implementation
/// * `R` - RetryMemory implementation
/// * `S` - LicenseSource implementation (typically `RateLimited<_>`)
/// * `K` - Clock implementation
pub struct EnrichProjectUseCase<I, C, R, S, K> {
    inventory: I,
    cache: C,
    retry_memory: R,
    license_source: S,
    clock: K,
    fetch_cooldown: Duration,
}

impl<I, C, R, S, K> EnrichProjectUseCase<I, C, R, S, K>
where
    I: InventoryClient,
    C: ComponentsCache,
    R: RetryMemory,
    S: LicenseSource,
    K: Clock,
{
    /// Creates a new use case with injected collaborators.
    ///
    /// `fetch_cooldown` is the minimum time after a failed fetch before the
    /// same identity may be fetched again.
    pub fn new(
        inventory: I,
        cache: C,
        retry_memory: R,
        license_source: S,
        clock: K,
        fetch_cooldown: Duration,
    ) -> Self {
        Self {
            inventory,
            cache,
            retry_memory,
            license_source,
            clock,
            fetch_cooldown,
        }
    }

    /// Runs one enrichment cycle.
    ///
    /// Only a component-listing failure aborts the run; fetch and update
    /// failures stay local to their component and are reported through the
    /// returned summary and the logs.
    pub async fn execute(&self, event: &EnrichmentEvent) -> Result<EnrichmentSummary> {
        // Captured exactly once; every cooldown comparison and cache write
        // in this run uses the same instant.
        let cycle_start = self.clock.now();
        info!(
            project = %event.project.name,
            content = %event.content,
            "enriching from event"
        );

        let components = self.inventory.list_components(event.project.uuid).await?;
        let mut summary = EnrichmentSummary {
            total_components: components.len(),
            ..EnrichmentSummary::default()
        };

        // Components without an identity are excluded from everything:
        // no cache lookup, no fetch, no update.
        let identified: Vec<(Purl, Component)> = components
            .iter()
            .filter_map(|component| {
                component
                    .purl()
                    .map(|purl| (purl.clone(), component.clone()))
            })
            .collect();
        summary.with_identity = identified.len();
        info!(
            "{}/{} components have purls and can be processed",
            identified.len(),
            components.len()
        );

        let purls: Vec<Purl> = identified.iter().map(|(purl, _)| purl.clone()).collect();
        let cached = self.cache.get_components(&purls)?;
        summary.cache_hits = cached.len();
        info!(
            "using cache for {}/{} components",
            cached.len(),
            identified.len()
        );

        let misses: Vec<(Purl, Component)> = identified
            .iter()
            .filter(|(purl, _)| !cached.contains_key(purl))
            .cloned()
            .collect();
        let miss_count = misses.len();
        let (to_fetch, on_cooldown): (Vec<(Purl, Component)>, Vec<(Purl, Component)>) = misses
            .into_iter()
            .partition(|(purl, _)| self.eligible_for_fetch(purl, cycle_start));
        summary.skipped_cooldown = on_cooldown.len();
        for (purl, _) in &on_cooldown {
            debug!(%purl, "skipping fetch, still on cooldown");
        }
        info!(
            "{}/{} missing components are not on cooldown and will be fetched",
            to_fetch.len(),
            miss_count
        );

        // Fetch phase: everything at once, bounded by the source's rate
        // limiter; nothing is acted upon until every fetch has settled.
        let source = &self.license_source;
        let outcomes = join_all(to_fetch.iter().map(|(purl, component)| async move {
            let outcome = source.retrieve(component).await;
            (purl, component, outcome)
        }))
        .await;

        let mut enriched: Vec<Component> = Vec::new();
        for (purl, component, outcome) in outcomes {
            match outcome {
                RetrieveOutcome::Found(details) => {
                    enriched.push(component.with_license_details(details));
                }
                RetrieveOutcome::NotFound => {
                    // Definitive answer, not a failure: no cache entry, no
                    // cooldown penalty. The provider may learn about the
                    // component later.
                    summary.not_found += 1;
                    debug!(%purl, "provider has no license data");
                }
                RetrieveOutcome::Failed(e) => {
                    summary.fetch_failures += 1;
                    warn!(%purl, error = %e, "fetch failed, component put on cooldown");
                    self.retry_memory.remember(purl, cycle_start);
                }
            }
        }
        summary.fetched = enriched.len();
        info!(
            "license data for {}/{} components successfully fetched",
            enriched.len(),
            to_fetch.len()
        );

        // The only cache write path.
        self.cache.cache_components(&enriched, cycle_start)?;

        // Update set: cache hits rematerialized with their cached details,
        // plus this cycle's successes.
        let mut to_update: Vec<Component> = identified
            .iter()
            .filter_map(|(purl, component)| {
                cached
                    .get(purl)
                    .map(|details| component.with_license_details(details.clone()))
            })
            .collect();
        to_update.extend(enriched.iter().cloned());

        // Update phase: concurrent, no mutual ordering; one failed update
        // must not cancel or block the others.
        let inventory = &self.inventory;
        let update_results = join_all(
            to_update
                .iter()
                .filter_map(|component| {
                    LicenseSelection::select(component.license_details())
                        .map(|expression| (component.uuid(), expression.to_string()))
                })
                .map(|(component_uuid, expression)| async move {
                    let result = inventory
                        .update_license_expression(component_uuid, &expression)
                        .await;
                    (component_uuid, result)
                }),
        )
        .await;

        for (component_uuid, result) in update_results {
            match result {
                Ok(()) => summary.updated += 1,
                Err(e) => {
                    summary.update_failures += 1;
                    warn!(component = %component_uuid, error = %e, "inventory update failed");
                }
            }
        }

        info!(
            project = %event.project.name,
            updated = summary.updated,
            "enrichment cycle complete"
        );
        Ok(summary)
    }

    /// A cache miss may be fetched iff it never failed, or its last failure
    /// is older than the cooldown window.
    fn eligible_for_fetch(&self, purl: &Purl, cycle_start: DateTime<Utc>) -> bool {
        match self.retry_memory.recall(purl) {
            None => true,
            Some(last_failure) => cycle_start - last_failure > self.fetch_cooldown,
        }
    }
}
