//! Domain layer - Core types, decision logic and collaborator traits

pub mod client;
pub mod decision;
pub mod error;
pub mod image;
pub mod similarity;

pub use client::{CacheEntry, CacheMode, DecisionClient, FetchOutcome, FetchSource};
pub use decision::{
    select_reuse_candidate, Decision, DecisionRequest, DecisionService, ReuseCandidate,
    DEFAULT_THRESHOLD,
};
pub use error::DomainError;
pub use image::{CategoryKey, ImageCatalog, ImageIdentity, ImagePayload};
pub use similarity::{SimilarityMatrix, SimilarityRepository, MAX_SCORE, MIN_SCORE};
