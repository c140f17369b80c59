//! Durable store adapters for the competition catalog.

mod in_memory;
mod json_file;

pub use in_memory::InMemoryCompetitionRepository;
pub use json_file::JsonFileRepository;
