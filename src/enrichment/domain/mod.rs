//! Pure domain types for license enrichment.

pub mod component;
pub mod license_details;
pub mod purl;

pub use component::Component;
pub use license_details::{LicenseDetails, SourcedValue};
pub use purl::Purl;
