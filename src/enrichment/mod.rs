//! Enrichment domain: component identity, license metadata, and the
//! selection policy.

pub mod domain;
pub mod policies;
