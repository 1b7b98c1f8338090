use crate::enrichment::domain::{Component, LicenseDetails, Purl};
use crate::ports::outbound::{ComponentsCache, RetryMemory};
use crate::shared::Result;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::collections::HashMap;

/// In-memory ComponentsCache backed by a concurrent map.
///
/// Not durable - suited to tests and single-shot runs. The map is safe for
/// concurrent enrichment runs; each entry is fully replaced per write, so no
/// cross-entry atomicity is needed.
#[derive(Default)]
pub struct InMemoryComponentsCache {
    entries: DashMap<Purl, CachedEntry>,
}

#[derive(Debug, Clone)]
struct CachedEntry {
    details: LicenseDetails,
    #[allow(dead_code)]
    cached_at: DateTime<Utc>,
}

impl InMemoryComponentsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ComponentsCache for InMemoryComponentsCache {
    fn get_components(&self, purls: &[Purl]) -> Result<HashMap<Purl, LicenseDetails>> {
        Ok(purls
            .iter()
            .filter_map(|purl| {
                self.entries
                    .get(purl)
                    .map(|entry| (purl.clone(), entry.details.clone()))
            })
            .collect())
    }

    fn cache_components(&self, components: &[Component], cached_at: DateTime<Utc>) -> Result<()> {
        for component in components {
            if let Some(purl) = component.purl() {
                self.entries.insert(
                    purl.clone(),
                    CachedEntry {
                        details: component.license_details().clone(),
                        cached_at,
                    },
                );
            }
        }
        Ok(())
    }
}

/// In-memory RetryMemory backed by a concurrent map.
#[derive(Default)]
pub struct InMemoryRetryMemory {
    memory: DashMap<Purl, DateTime<Utc>>,
}

impl InMemoryRetryMemory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RetryMemory for InMemoryRetryMemory {
    fn recall(&self, purl: &Purl) -> Option<DateTime<Utc>> {
        self.memory.get(purl).map(|entry| *entry)
    }

    fn remember(&self, purl: &Purl, timestamp: DateTime<Utc>) {
        self.memory.insert(purl.clone(), timestamp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrichment::domain::SourcedValue;
    use uuid::Uuid;

    fn component(purl: &str, expression: &str) -> Component {
        Component::new(
            Uuid::new_v4(),
            Some(Purl::parse(purl).unwrap()),
            LicenseDetails::from_expressions(vec![SourcedValue::new(expression, "Snyk")]),
        )
    }

    #[test]
    fn test_cache_round_trip() {
        let cache = InMemoryComponentsCache::new();
        let lodash = component("pkg:npm/lodash@4.17.21", "MIT");
        cache
            .cache_components(std::slice::from_ref(&lodash), Utc::now())
            .unwrap();

        let purl = Purl::parse("pkg:npm/lodash@4.17.21").unwrap();
        let other = Purl::parse("pkg:npm/left-pad@1.3.0").unwrap();
        let cached = cache.get_components(&[purl.clone(), other]).unwrap();

        // Missing purls are simply absent, not an error.
        assert_eq!(cached.len(), 1);
        assert_eq!(cached.get(&purl), Some(lodash.license_details()));
    }

    #[test]
    fn test_cache_write_fully_replaces_entry() {
        let cache = InMemoryComponentsCache::new();
        let purl = Purl::parse("pkg:npm/lodash@4.17.21").unwrap();
        cache
            .cache_components(&[component("pkg:npm/lodash@4.17.21", "MIT")], Utc::now())
            .unwrap();
        cache
            .cache_components(
                &[component("pkg:npm/lodash@4.17.21", "Apache-2.0")],
                Utc::now(),
            )
            .unwrap();

        let cached = cache.get_components(std::slice::from_ref(&purl)).unwrap();
        let expressions = cached[&purl].license_expressions();
        assert_eq!(expressions.len(), 1);
        assert_eq!(expressions[0].value, "Apache-2.0");
    }

    #[test]
    fn test_cache_ignores_components_without_purl() {
        let cache = InMemoryComponentsCache::new();
        let anonymous = Component::new(Uuid::new_v4(), None, LicenseDetails::default());
        cache.cache_components(&[anonymous], Utc::now()).unwrap();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_retry_memory_recall_absent_then_remember() {
        let memory = InMemoryRetryMemory::new();
        let purl = Purl::parse("pkg:npm/lodash@4.17.21").unwrap();
        assert!(memory.recall(&purl).is_none());

        let timestamp = Utc::now();
        memory.remember(&purl, timestamp);
        assert_eq!(memory.recall(&purl), Some(timestamp));
    }

    #[test]
    fn test_retry_memory_overwrites_on_repeat_failure() {
        let memory = InMemoryRetryMemory::new();
        let purl = Purl::parse("pkg:npm/lodash@4.17.21").unwrap();
        let first = Utc::now();
        let second = first + chrono::Duration::hours(1);
        memory.remember(&purl, first);
        memory.remember(&purl, second);
        assert_eq!(memory.recall(&purl), Some(second));
    }
}
