use thiserror::Error;

/// Core domain errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("Category not found for image: {image_id}")]
    CategoryNotFound { image_id: String },

    #[error("Similarity artifact missing for category: {category}")]
    SimilarityArtifactMissing { category: String },

    #[error("Image not found: {image_id} in category {category}")]
    ImageNotFound { image_id: String, category: String },

    #[error("Duplicate cache entry: {image_id}")]
    DuplicateCacheEntry { image_id: String },

    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Protocol error: {message}")]
    Protocol { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn category_not_found(image_id: impl Into<String>) -> Self {
        Self::CategoryNotFound {
            image_id: image_id.into(),
        }
    }

    pub fn similarity_artifact_missing(category: impl Into<String>) -> Self {
        Self::SimilarityArtifactMissing {
            category: category.into(),
        }
    }

    pub fn image_not_found(image_id: impl Into<String>, category: impl Into<String>) -> Self {
        Self::ImageNotFound {
            image_id: image_id.into(),
            category: category.into(),
        }
    }

    pub fn duplicate_cache_entry(image_id: impl Into<String>) -> Self {
        Self::DuplicateCacheEntry {
            image_id: image_id.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether retrying the same call may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Errors that indicate a broken client/server contract rather than bad data
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::DuplicateCacheEntry { .. } | Self::Protocol { .. }
        )
    }

    /// Stable machine-readable code, also used on the wire
    pub fn code(&self) -> &'static str {
        match self {
            Self::CategoryNotFound { .. } => "category_not_found",
            Self::SimilarityArtifactMissing { .. } => "similarity_artifact_missing",
            Self::ImageNotFound { .. } => "image_not_found",
            Self::DuplicateCacheEntry { .. } => "duplicate_cache_entry",
            Self::Transport { .. } => "transport_error",
            Self::Validation { .. } => "validation_error",
            Self::Protocol { .. } => "protocol_error",
            Self::Storage { .. } => "storage_error",
            Self::Configuration { .. } => "configuration_error",
            Self::Internal { .. } => "internal_error",
        }
    }
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        Self::storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_not_found_error() {
        let error = DomainError::category_not_found("12_3");
        assert_eq!(error.to_string(), "Category not found for image: 12_3");
        assert_eq!(error.code(), "category_not_found");
    }

    #[test]
    fn test_image_not_found_error() {
        let error = DomainError::image_not_found("12_3", "shop - shoes");
        assert_eq!(
            error.to_string(),
            "Image not found: 12_3 in category shop - shoes"
        );
    }

    #[test]
    fn test_only_transport_is_transient() {
        assert!(DomainError::transport("connection reset").is_transient());
        assert!(!DomainError::category_not_found("1_1").is_transient());
        assert!(!DomainError::image_not_found("1_1", "a - b").is_transient());
    }

    #[test]
    fn test_fatal_errors() {
        assert!(DomainError::duplicate_cache_entry("1_1").is_fatal());
        assert!(DomainError::protocol("unexpected reuse").is_fatal());
        assert!(!DomainError::transport("timeout").is_fatal());
    }
}
