//! Decision domain - reuse-vs-fetch for a requested image

mod entity;
mod policy;
mod service;

pub use entity::{DEFAULT_THRESHOLD, Decision, DecisionRequest, ReuseCandidate};
pub use policy::select_reuse_candidate;
pub use service::DecisionService;

#[cfg(test)]
pub use service::MockDecisionService;
