//! Similarity domain - static per-category score matrices

mod matrix;
mod repository;

pub use matrix::{MAX_SCORE, MIN_SCORE, SimilarityMatrix, SimilarityMatrixBuilder};
pub use repository::SimilarityRepository;

#[cfg(test)]
pub use repository::MockSimilarityRepository;
