//! Simulation - replays sampled workloads against both cache modes

mod harness;
mod log;
mod workload;

pub use harness::{HarnessConfig, ModeTotals, SimulationHarness, SimulationReport, TrialResult};
pub use log::{SimulationLog, SimulationRow};
pub use workload::{sample_images, trial_rng, CategoryImages, SimulationWorkload, Trial};
