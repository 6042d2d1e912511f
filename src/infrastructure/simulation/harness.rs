//! Simulation harness - many clients, both cache modes, paired comparison

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{info, warn};
use uuid::Uuid;

use super::workload::{sample_images, trial_rng, CategoryImages};
use super::{SimulationLog, SimulationRow, SimulationWorkload, Trial};
use crate::config::SimulationConfig;
use crate::domain::{CacheMode, DecisionClient, DomainError, FetchSource, ImageCatalog};
use crate::infrastructure::client::{ClientCacheStore, RequestCoordinator};

#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub num_clients: usize,
    pub category_counts: Vec<usize>,
    pub image_counts: Vec<usize>,
    pub threshold: i32,
    pub concurrency: usize,
    pub seed: u64,
    /// Root for per-trial on-disk caches; in-memory when `None`
    pub cache_dir: Option<PathBuf>,
}

impl HarnessConfig {
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            num_clients: config.num_clients,
            category_counts: config.category_counts.clone(),
            image_counts: config.image_counts.clone(),
            threshold: config.threshold,
            concurrency: config.concurrency.max(1),
            seed: config.seed.unwrap_or_else(rand::random),
            cache_dir: config.cache_dir.clone(),
        }
    }
}

/// Totals for one cache mode within one trial
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModeTotals {
    pub bytes: u64,
    pub failed: usize,
    pub reused: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialResult {
    pub list_index: usize,
    pub client_id: usize,
    pub workload: SimulationWorkload,
    pub similarity: ModeTotals,
    pub simple: ModeTotals,
}

/// Aggregate over a whole run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimulationReport {
    pub run_id: Uuid,
    pub seed: u64,
    pub trials: usize,
    pub simple_bytes: u64,
    pub similarity_bytes: u64,
    pub failed_requests: usize,
    pub reused_images: usize,
}

impl SimulationReport {
    fn add(&mut self, result: &TrialResult) {
        self.trials += 1;
        self.simple_bytes += result.simple.bytes;
        self.similarity_bytes += result.similarity.bytes;
        self.failed_requests += result.simple.failed + result.similarity.failed;
        self.reused_images += result.similarity.reused;
    }

    /// Fraction of simple-cache bytes avoided by similarity reuse
    pub fn savings_ratio(&self) -> f64 {
        if self.simple_bytes == 0 {
            return 0.0;
        }
        1.0 - self.similarity_bytes as f64 / self.simple_bytes as f64
    }
}

pub struct SimulationHarness {
    client: Arc<dyn DecisionClient>,
    catalog: Arc<dyn ImageCatalog>,
    config: HarnessConfig,
}

impl SimulationHarness {
    pub fn new(
        client: Arc<dyn DecisionClient>,
        catalog: Arc<dyn ImageCatalog>,
        config: HarnessConfig,
    ) -> Self {
        Self {
            client,
            catalog,
            config,
        }
    }

    /// Runs every `(categories, images)` workload for every client
    ///
    /// Trials run concurrently up to `concurrency`, but rows reach the log in
    /// trial order through this single writer. A fatal client error aborts
    /// the run; other request failures are counted.
    pub async fn run<W: Write>(
        &self,
        log: &mut SimulationLog<W>,
    ) -> Result<SimulationReport, DomainError> {
        let categories = self.load_categories().await?;
        let trials = self.plan_trials(&categories)?;
        let mut report = SimulationReport {
            run_id: Uuid::new_v4(),
            seed: self.config.seed,
            ..SimulationReport::default()
        };

        info!(
            run_id = %report.run_id,
            seed = report.seed,
            trials = trials.len(),
            categories = categories.len(),
            "Starting simulation"
        );

        let mut results = stream::iter(trials)
            .map(|trial| self.run_trial(trial))
            .buffered(self.config.concurrency.max(1));

        while let Some(result) = results.next().await {
            let result = result?;
            log.write(&SimulationRow::from_result(report.run_id, &result))?;
            report.add(&result);
        }

        info!(
            run_id = %report.run_id,
            trials = report.trials,
            simple_bytes = report.simple_bytes,
            similarity_bytes = report.similarity_bytes,
            failed = report.failed_requests,
            savings = %format!("{:.1}%", report.savings_ratio() * 100.0),
            "Simulation finished"
        );

        Ok(report)
    }

    async fn load_categories(&self) -> Result<Vec<CategoryImages>, DomainError> {
        let mut categories = Vec::new();
        for category in self.catalog.categories().await? {
            let images = self.catalog.images_in(&category).await?;
            if !images.is_empty() {
                categories.push((category, images));
            }
        }
        Ok(categories)
    }

    fn plan_trials(&self, categories: &[CategoryImages]) -> Result<Vec<Trial>, DomainError> {
        let workloads = self
            .config
            .category_counts
            .iter()
            .flat_map(|&c| {
                self.config
                    .image_counts
                    .iter()
                    .map(move |&i| SimulationWorkload::new(c, i))
            });

        let mut trials = Vec::new();
        for (list_index, workload) in workloads.enumerate() {
            for client_id in 0..self.config.num_clients {
                let mut rng = trial_rng(self.config.seed, list_index, client_id);
                trials.push(Trial {
                    list_index,
                    client_id,
                    workload,
                    images: sample_images(&mut rng, categories, workload)?,
                });
            }
        }
        Ok(trials)
    }

    async fn run_trial(&self, trial: Trial) -> Result<TrialResult, DomainError> {
        // Same sequence for both modes keeps the comparison paired
        let similarity = self.replay(&trial, CacheMode::Similarity).await?;
        let simple = self.replay(&trial, CacheMode::Simple).await?;

        Ok(TrialResult {
            list_index: trial.list_index,
            client_id: trial.client_id,
            workload: trial.workload,
            similarity,
            simple,
        })
    }

    async fn replay(&self, trial: &Trial, mode: CacheMode) -> Result<ModeTotals, DomainError> {
        let store = match &self.config.cache_dir {
            Some(dir) => {
                let path = dir.join(format!("trial_{}_{}", trial.list_index, trial.client_id));
                ClientCacheStore::restore(path).await?
            }
            None => ClientCacheStore::in_memory(),
        };

        let mut coordinator = RequestCoordinator::new(Arc::clone(&self.client), store);
        coordinator.clear_cache().await?;

        let mut totals = ModeTotals::default();
        for image in &trial.images {
            match coordinator.fetch(image, mode, self.config.threshold).await {
                Ok(outcome) => {
                    totals.bytes += outcome.bytes_downloaded;
                    if outcome.source == FetchSource::Reused {
                        totals.reused += 1;
                    }
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!(
                        client_id = trial.client_id,
                        image_id = %image,
                        mode = %mode,
                        error = %e,
                        "Request failed"
                    );
                    totals.failed += 1;
                }
            }
        }

        coordinator.clear_cache().await?;
        Ok(totals)
    }
}
