pub mod error;
pub mod result;

pub use error::EnrichmentError;
pub use result::Result;
