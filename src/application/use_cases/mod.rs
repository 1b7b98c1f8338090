pub mod enrich_project;

pub use enrich_project::EnrichProjectUseCase;
