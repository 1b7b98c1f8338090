use crate::enrichment::domain::Component;
use crate::ports::outbound::{LicenseSource, RetrieveOutcome};
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::Semaphore;

/// RateLimited wraps a LicenseSource and throttles it.
///
/// Two limits compose here:
/// - a counting semaphore bounds the number of in-flight requests; callers
///   beyond the bound suspend until a permit frees;
/// - after each answered request (found or not-found) a fixed minimum spacing
///   delay elapses before the permit is released, throttling the absolute
///   request rate and not just the concurrency. Failed requests release
///   their permit immediately.
///
/// This is the decorator pattern: any provider implementation can be wrapped
/// without knowing about rate limits.
pub struct RateLimited<S> {
    inner: S,
    permits: Semaphore,
    min_spacing: Duration,
}

impl<S: LicenseSource> RateLimited<S> {
    pub fn new(inner: S, max_in_flight: usize, min_spacing: Duration) -> Self {
        Self {
            inner,
            permits: Semaphore::new(max_in_flight.max(1)),
            min_spacing,
        }
    }
}

#[async_trait]
impl<S: LicenseSource> LicenseSource for RateLimited<S> {
    fn source_name(&self) -> &'static str {
        self.inner.source_name()
    }

    async fn retrieve(&self, component: &Component) -> RetrieveOutcome {
        let permit = match self.permits.acquire().await {
            Ok(permit) => permit,
            // The semaphore is never closed; this arm exists to keep the
            // signature honest without panicking.
            Err(e) => return RetrieveOutcome::Failed(anyhow::anyhow!(e)),
        };

        let outcome = self.inner.retrieve(component).await;
        if !matches!(outcome, RetrieveOutcome::Failed(_)) {
            tokio::time::sleep(self.min_spacing).await;
        }
        drop(permit);
        outcome
    }
}
