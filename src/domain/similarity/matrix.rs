//! Per-category similarity matrix

use std::collections::HashMap;

use tracing::warn;

use crate::domain::image::{CategoryKey, ImageIdentity};
use crate::domain::DomainError;

/// Lowest rung of the rating scale; also the score of undefined pairs
pub const MIN_SCORE: u8 = 0;

/// Highest rung of the rating scale
pub const MAX_SCORE: u8 = 4;

/// Symmetric table of pairwise replaceability scores within one category
///
/// Symmetry is established when the matrix is built: every pair is stored
/// under both orientations, so lookups never need to special-case order.
#[derive(Debug, Clone)]
pub struct SimilarityMatrix {
    category: CategoryKey,
    rows: HashMap<ImageIdentity, HashMap<ImageIdentity, u8>>,
}

impl SimilarityMatrix {
    pub fn builder(category: CategoryKey) -> SimilarityMatrixBuilder {
        SimilarityMatrixBuilder {
            matrix: SimilarityMatrix {
                category,
                rows: HashMap::new(),
            },
        }
    }

    pub fn category(&self) -> &CategoryKey {
        &self.category
    }

    /// Score of the pair `(a, b)`; undefined pairs score [`MIN_SCORE`]
    pub fn score(&self, a: &ImageIdentity, b: &ImageIdentity) -> u8 {
        self.rows
            .get(a)
            .and_then(|row| row.get(b))
            .copied()
            .unwrap_or(MIN_SCORE)
    }

    /// Whether the pair has an explicit score
    pub fn is_defined(&self, a: &ImageIdentity, b: &ImageIdentity) -> bool {
        self.rows.get(a).is_some_and(|row| row.contains_key(b))
    }

    /// Number of images present on either axis
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn contains(&self, id: &ImageIdentity) -> bool {
        self.rows.contains_key(id)
    }
}

/// Builds a [`SimilarityMatrix`], validating scores and enforcing symmetry
#[derive(Debug)]
pub struct SimilarityMatrixBuilder {
    matrix: SimilarityMatrix,
}

impl SimilarityMatrixBuilder {
    /// Records `score(a, b) == score(b, a) == score`
    ///
    /// When the opposite orientation was already recorded with a different
    /// value, the lower of the two is kept.
    pub fn insert(
        &mut self,
        a: ImageIdentity,
        b: ImageIdentity,
        score: u8,
    ) -> Result<&mut Self, DomainError> {
        if score > MAX_SCORE {
            return Err(DomainError::validation(format!(
                "Similarity score {} for ({}, {}) outside [{}, {}]",
                score, a, b, MIN_SCORE, MAX_SCORE
            )));
        }

        let score = match self.matrix.rows.get(&b).and_then(|row| row.get(&a)) {
            Some(&existing) if existing != score => {
                warn!(
                    category = %self.matrix.category,
                    a = %a,
                    b = %b,
                    existing = existing,
                    score = score,
                    "Asymmetric similarity pair, keeping the lower score"
                );
                existing.min(score)
            }
            _ => score,
        };

        self.matrix
            .rows
            .entry(a.clone())
            .or_default()
            .insert(b.clone(), score);
        self.matrix.rows.entry(b).or_default().insert(a, score);

        Ok(self)
    }

    /// Builder-style variant of [`insert`](Self::insert)
    pub fn with_score(mut self, a: ImageIdentity, b: ImageIdentity, score: u8) -> Result<Self, DomainError> {
        self.insert(a, b, score)?;
        Ok(self)
    }

    /// Registers an image with no defined pairs
    pub fn touch(&mut self, id: ImageIdentity) -> &mut Self {
        self.matrix.rows.entry(id).or_default();
        self
    }

    pub fn build(self) -> SimilarityMatrix {
        self.matrix
    }
}
