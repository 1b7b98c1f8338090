pub mod json_file;
pub mod memory;

pub use json_file::{JsonFileCache, JsonFileRetryMemory};
pub use memory::{InMemoryComponentsCache, InMemoryRetryMemory};
