//! Decision service trait

use async_trait::async_trait;

use super::{Decision, DecisionRequest};
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Decides whether a cached image may substitute for a requested one
///
/// Implementations must be free of side effects: identical requests yield
/// identical decisions.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DecisionService: Send + Sync {
    async fn decide(&self, request: &DecisionRequest) -> Result<Decision, DomainError>;
}
