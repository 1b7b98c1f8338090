pub mod clearly_defined;
pub mod dependency_track;
pub mod rate_limited;
pub mod snyk;

pub use clearly_defined::ClearlyDefinedSource;
pub use dependency_track::DependencyTrackClient;
pub use rate_limited::RateLimited;
pub use snyk::SnykSource;
