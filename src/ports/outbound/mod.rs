//! Outbound ports (Driven ports) - Infrastructure interfaces
//!
//! These ports define the interfaces the enrichment core uses to interact
//! with external systems (inventory system, license-data providers, the
//! cache and retry-memory backing stores, and time).

pub mod clock;
pub mod components_cache;
pub mod inventory;
pub mod license_source;
pub mod retry_memory;

pub use clock::{Clock, FixedClock, SystemClock};
pub use components_cache::ComponentsCache;
pub use inventory::InventoryClient;
pub use license_source::{LicenseSource, RetrieveOutcome};
pub use retry_memory::RetryMemory;
