//! In-memory similarity repository

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::image::CategoryKey;
use crate::domain::similarity::{SimilarityMatrix, SimilarityRepository};
use crate::domain::DomainError;

/// Fixed set of matrices, useful for tests and generated workloads
#[derive(Debug, Default)]
pub struct InMemorySimilarityRepository {
    matrices: HashMap<CategoryKey, Arc<SimilarityMatrix>>,
}

impl InMemorySimilarityRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_matrix(mut self, matrix: SimilarityMatrix) -> Self {
        self.matrices
            .insert(matrix.category().clone(), Arc::new(matrix));
        self
    }
}

#[async_trait]
impl SimilarityRepository for InMemorySimilarityRepository {
    async fn load(&self, category: &CategoryKey) -> Result<Arc<SimilarityMatrix>, DomainError> {
        self.matrices
            .get(category)
            .cloned()
            .ok_or_else(|| DomainError::similarity_artifact_missing(category.to_string()))
    }
}
