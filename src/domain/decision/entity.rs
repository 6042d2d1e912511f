//! Decision request and outcome types

use std::collections::BTreeSet;

use crate::domain::image::{CategoryKey, ImageIdentity, ImagePayload};

/// Default minimum score for reuse when callers do not pass one
pub const DEFAULT_THRESHOLD: i32 = 1;

/// Inputs to a single reuse-or-fetch decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionRequest {
    pub requested: ImageIdentity,
    pub category: CategoryKey,
    pub threshold: i32,
    /// Images the caller already holds in `category`
    pub cached: BTreeSet<ImageIdentity>,
}

impl DecisionRequest {
    pub fn new(requested: ImageIdentity, category: CategoryKey) -> Self {
        Self {
            requested,
            category,
            threshold: DEFAULT_THRESHOLD,
            cached: BTreeSet::new(),
        }
    }

    pub fn with_threshold(mut self, threshold: i32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_cached(mut self, cached: impl IntoIterator<Item = ImageIdentity>) -> Self {
        self.cached.extend(cached);
        self
    }
}

/// A cached image judged close enough to stand in for the requested one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReuseCandidate {
    pub id: ImageIdentity,
    pub score: u8,
}

/// Outcome of a decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The caller should display `existing`, which it already holds
    Reuse { existing: ImageIdentity },
    /// The caller must receive the real image bytes
    Fetch(ImagePayload),
}

impl Decision {
    pub fn is_reuse(&self) -> bool {
        matches!(self, Self::Reuse { .. })
    }
}
