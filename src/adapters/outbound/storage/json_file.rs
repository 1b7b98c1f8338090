use crate::enrichment::domain::{Component, LicenseDetails, Purl};
use crate::ports::outbound::{ComponentsCache, RetryMemory};
use crate::shared::Result;
use anyhow::Context;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// One persisted cache record: identity, last-update timestamp, and the
/// resolved license details.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CacheRecord {
    purl: Purl,
    updated_at: DateTime<Utc>,
    license_details: LicenseDetails,
}

/// Durable ComponentsCache persisting records to a JSON file.
///
/// The whole store loads at open and is rewritten after every
/// `cache_components` call. That is deliberately simple: one enrichment run
/// writes at most once per cycle, and entries are always fully replaced, so
/// there is no partial-update state to protect beyond serializing the file
/// writes themselves.
#[derive(Debug)]
pub struct JsonFileCache {
    path: PathBuf,
    entries: DashMap<Purl, CacheRecord>,
    write_lock: Mutex<()>,
}

impl JsonFileCache {
    /// Opens the cache at `path`, loading any existing records. A missing
    /// file is an empty cache, not an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = DashMap::new();

        if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read cache file: {}", path.display()))?;
            let records: Vec<CacheRecord> = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse cache file: {}", path.display()))?;
            for record in records {
                entries.insert(record.purl.clone(), record);
            }
        }

        Ok(Self {
            path,
            entries,
            write_lock: Mutex::new(()),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| anyhow::anyhow!("cache write lock poisoned"))?;

        let mut records: Vec<CacheRecord> =
            self.entries.iter().map(|entry| entry.value().clone()).collect();
        // Stable on-disk ordering keeps the file diffable.
        records.sort_by(|a, b| a.purl.as_str().cmp(b.purl.as_str()));

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create cache directory: {}", parent.display())
                })?;
            }
        }
        let content = serde_json::to_string_pretty(&records)?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write cache file: {}", self.path.display()))?;
        Ok(())
    }
}

impl ComponentsCache for JsonFileCache {
    fn get_components(&self, purls: &[Purl]) -> Result<HashMap<Purl, LicenseDetails>> {
        Ok(purls
            .iter()
            .filter_map(|purl| {
                self.entries
                    .get(purl)
                    .map(|record| (purl.clone(), record.license_details.clone()))
            })
            .collect())
    }

    fn cache_components(&self, components: &[Component], cached_at: DateTime<Utc>) -> Result<()> {
        for component in components {
            if let Some(purl) = component.purl() {
                self.entries.insert(
                    purl.clone(),
                    CacheRecord {
                        purl: purl.clone(),
                        updated_at: cached_at,
                        license_details: component.license_details().clone(),
                    },
                );
            }
        }
        self.persist()
    }
}

/// One persisted retry record: identity and the timestamp of its last
/// failed fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RetryRecord {
    purl: Purl,
    last_failure_at: DateTime<Utc>,
}

/// Durable RetryMemory persisting failure timestamps to a JSON file.
///
/// Same storage scheme as `JsonFileCache`: load everything at open, rewrite
/// the sorted file after every change. The cooldown window spans days, so
/// retry state must outlive the process that recorded the failure.
#[derive(Debug)]
pub struct JsonFileRetryMemory {
    path: PathBuf,
    entries: DashMap<Purl, DateTime<Utc>>,
    write_lock: Mutex<()>,
}

impl JsonFileRetryMemory {
    /// Opens the retry memory at `path`, loading any existing records. A
    /// missing file means no recorded failures.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = DashMap::new();

        if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read retry file: {}", path.display()))?;
            let records: Vec<RetryRecord> = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse retry file: {}", path.display()))?;
            for record in records {
                entries.insert(record.purl, record.last_failure_at);
            }
        }

        Ok(Self {
            path,
            entries,
            write_lock: Mutex::new(()),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn persist(&self) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| anyhow::anyhow!("retry write lock poisoned"))?;

        let mut records: Vec<RetryRecord> = self
            .entries
            .iter()
            .map(|entry| RetryRecord {
                purl: entry.key().clone(),
                last_failure_at: *entry.value(),
            })
            .collect();
        records.sort_by(|a, b| a.purl.as_str().cmp(b.purl.as_str()));

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create retry directory: {}", parent.display())
                })?;
            }
        }
        let content = serde_json::to_string_pretty(&records)?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write retry file: {}", self.path.display()))?;
        Ok(())
    }
}

impl RetryMemory for JsonFileRetryMemory {
    fn recall(&self, purl: &Purl) -> Option<DateTime<Utc>> {
        self.entries.get(purl).map(|entry| *entry)
    }

    fn remember(&self, purl: &Purl, timestamp: DateTime<Utc>) {
        self.entries.insert(purl.clone(), timestamp);
        // The port is infallible by contract. A lost write costs at most one
        // redundant fetch on a later run; the in-memory entry still covers
        // the current one.
        if let Err(e) = self.persist() {
            warn!(%purl, error = %e, "persisting retry memory failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrichment::domain::SourcedValue;
    use tempfile::TempDir;
    use uuid::Uuid;

    fn component(purl: &str, expression: &str) -> Component {
        Component::new(
            Uuid::new_v4(),
            Some(Purl::parse(purl).unwrap()),
            LicenseDetails::from_expressions(vec![SourcedValue::new(expression, "Snyk")]),
        )
    }

    #[test]
    fn test_open_missing_file_is_empty_cache() {
        let dir = TempDir::new().unwrap();
        let cache = JsonFileCache::open(dir.path().join("cache.json")).unwrap();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_entries_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");

        let cache = JsonFileCache::open(&path).unwrap();
        cache
            .cache_components(&[component("pkg:npm/lodash@4.17.21", "MIT")], Utc::now())
            .unwrap();
        drop(cache);

        let reopened = JsonFileCache::open(&path).unwrap();
        let purl = Purl::parse("pkg:npm/lodash@4.17.21").unwrap();
        let cached = reopened
            .get_components(std::slice::from_ref(&purl))
            .unwrap();
        assert_eq!(cached[&purl].license_expressions()[0].value, "MIT");
    }

    #[test]
    fn test_newer_write_overwrites_entry_across_restart() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");

        let cache = JsonFileCache::open(&path).unwrap();
        cache
            .cache_components(&[component("pkg:npm/lodash@4.17.21", "MIT")], Utc::now())
            .unwrap();
        cache
            .cache_components(
                &[component("pkg:npm/lodash@4.17.21", "Apache-2.0")],
                Utc::now(),
            )
            .unwrap();
        drop(cache);

        let reopened = JsonFileCache::open(&path).unwrap();
        assert_eq!(reopened.len(), 1);
        let purl = Purl::parse("pkg:npm/lodash@4.17.21").unwrap();
        let cached = reopened
            .get_components(std::slice::from_ref(&purl))
            .unwrap();
        assert_eq!(cached[&purl].license_expressions()[0].value, "Apache-2.0");
    }

    #[test]
    fn test_parse_error_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(&path, "not json").unwrap();

        let result = JsonFileCache::open(&path);
        assert!(result.is_err());
        assert!(format!("{}", result.unwrap_err()).contains("Failed to parse cache file"));
    }

    #[test]
    fn test_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("dirs").join("cache.json");

        let cache = JsonFileCache::open(&path).unwrap();
        cache
            .cache_components(&[component("pkg:npm/lodash@4.17.21", "MIT")], Utc::now())
            .unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_retry_memory_open_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let memory = JsonFileRetryMemory::open(dir.path().join("retry.json")).unwrap();
        assert!(memory.is_empty());
    }

    #[test]
    fn test_retry_memory_failures_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("retry.json");
        let purl = Purl::parse("pkg:npm/left-pad@1.3.0").unwrap();
        let timestamp = Utc::now();

        let memory = JsonFileRetryMemory::open(&path).unwrap();
        memory.remember(&purl, timestamp);
        drop(memory);

        let reopened = JsonFileRetryMemory::open(&path).unwrap();
        assert_eq!(reopened.recall(&purl), Some(timestamp));
    }

    #[test]
    fn test_retry_memory_overwrite_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("retry.json");
        let purl = Purl::parse("pkg:npm/left-pad@1.3.0").unwrap();
        let first = Utc::now();
        let second = first + chrono::Duration::hours(6);

        let memory = JsonFileRetryMemory::open(&path).unwrap();
        memory.remember(&purl, first);
        memory.remember(&purl, second);
        drop(memory);

        let reopened = JsonFileRetryMemory::open(&path).unwrap();
        assert_eq!(reopened.len(), 1);
        assert_eq!(reopened.recall(&purl), Some(second));
    }

    #[test]
    fn test_retry_memory_parse_error_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("retry.json");
        std::fs::write(&path, "not json").unwrap();

        let result = JsonFileRetryMemory::open(&path);
        assert!(result.is_err());
        assert!(format!("{}", result.unwrap_err()).contains("Failed to parse retry file"));
    }
}
