//! Similarity infrastructure - matrix loaders and the load-once cache

mod cached;
mod csv_repository;
mod in_memory;

pub use cached::CachedSimilarityRepository;
pub use csv_repository::{artifact_path, parse_matrix, CsvSimilarityRepository};
pub use in_memory::InMemorySimilarityRepository;
