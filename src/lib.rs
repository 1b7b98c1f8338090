//! dt-license-enricher - license enrichment for Dependency-Track projects
//!
//! This library fills in missing license data for the components of a
//! Dependency-Track project. It lists the project's components, answers what
//! it can from a cache, fetches the rest from an external license data
//! provider through a rate limiter, and writes the selected license
//! expressions back to Dependency-Track.
//!
//! # Architecture
//!
//! The library is organized into the following layers:
//!
//! - **Domain Layer** (`enrichment`): Component identity, license details,
//!   and the source-priority selection policy
//! - **Application Layer** (`application`): The enrichment use case and its
//!   DTOs
//! - **Ports** (`ports`): Interface definitions for infrastructure
//! - **Adapters** (`adapters`): Concrete implementations of ports
//! - **Shared** (`shared`): Common utilities and error types
//!
//! # Example
//!
//! ```no_run
//! use dt_license_enricher::prelude::*;
//! use chrono::Utc;
//! use std::time::Duration;
//! use uuid::Uuid;
//!
//! # async fn demo() -> Result<()> {
//! // Create adapters
//! let inventory = DependencyTrackClient::new("https://dtrack.example.org/api", "key")?;
//! let cache = JsonFileCache::open("license-cache.json")?;
//! let retry_memory = JsonFileRetryMemory::open("retry-memory.json")?;
//! let source = RateLimited::new(ClearlyDefinedSource::new()?, 4, Duration::from_secs(1));
//!
//! // Create use case
//! let use_case = EnrichProjectUseCase::new(
//!     inventory,
//!     cache,
//!     retry_memory,
//!     source,
//!     SystemClock,
//!     chrono::Duration::days(30),
//! );
//!
//! // Execute
//! let event = EnrichmentEvent::new(
//!     Utc::now(),
//!     "BOM processed",
//!     ProjectRef {
//!         uuid: Uuid::new_v4(),
//!         name: "billing-service".to_string(),
//!         version: "1.4.2".to_string(),
//!         purl: None,
//!     },
//! );
//! let summary = use_case.execute(&event).await?;
//! println!("updated {} components", summary.updated);
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod application;
pub mod config;
pub mod enrichment;
pub mod ports;
pub mod shared;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::adapters::outbound::network::{
        ClearlyDefinedSource, DependencyTrackClient, RateLimited, SnykSource,
    };
    pub use crate::adapters::outbound::storage::{
        InMemoryComponentsCache, InMemoryRetryMemory, JsonFileCache, JsonFileRetryMemory,
    };
    pub use crate::application::dto::{EnrichmentEvent, EnrichmentSummary, ProjectRef};
    pub use crate::application::use_cases::EnrichProjectUseCase;
    pub use crate::config::EnricherConfig;
    pub use crate::enrichment::domain::{Component, LicenseDetails, Purl, SourcedValue};
    pub use crate::enrichment::policies::LicenseSelection;
    pub use crate::ports::outbound::{
        Clock, ComponentsCache, FixedClock, InventoryClient, LicenseSource, RetrieveOutcome,
        RetryMemory, SystemClock,
    };
    pub use crate::shared::{EnrichmentError, Result};
}
