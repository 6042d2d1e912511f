//! Infrastructure layer - Storage, transport and simulation implementations

pub mod catalog;
pub mod client;
pub mod logging;
pub mod services;
pub mod similarity;
pub mod simulation;
