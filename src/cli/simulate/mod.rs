//! Simulate command - replays sampled workloads in both cache modes

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use tracing::info;

use crate::config::{AppConfig, TransportKind};
use crate::domain::{DecisionClient, ImageCatalog};
use crate::infrastructure::catalog::FileSystemCatalog;
use crate::infrastructure::client::{HttpDecisionClient, LocalDecisionClient};
use crate::infrastructure::simulation::{HarnessConfig, SimulationHarness, SimulationLog};

#[derive(Args, Debug, Default)]
pub struct SimulateArgs {
    /// In-process service or a running server
    #[arg(long, value_enum)]
    pub transport: Option<TransportKind>,

    /// Clients per workload
    #[arg(long)]
    pub clients: Option<usize>,

    /// Seed for reproducible workloads
    #[arg(long)]
    pub seed: Option<u64>,

    /// Minimum similarity score required for reuse
    #[arg(long)]
    pub threshold: Option<i32>,

    /// CSV output path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Trials in flight at once
    #[arg(long)]
    pub concurrency: Option<usize>,
}

impl SimulateArgs {
    /// Flags win over configuration
    fn apply(self, config: &mut AppConfig) {
        let simulation = &mut config.simulation;
        if let Some(transport) = self.transport {
            simulation.transport = transport;
        }
        if let Some(clients) = self.clients {
            simulation.num_clients = clients;
        }
        if self.seed.is_some() {
            simulation.seed = self.seed;
        }
        if let Some(threshold) = self.threshold {
            simulation.threshold = threshold;
        }
        if let Some(log_file) = self.log_file {
            simulation.log_file = log_file;
        }
        if let Some(concurrency) = self.concurrency {
            simulation.concurrency = concurrency;
        }
    }
}

pub async fn run(args: SimulateArgs) -> anyhow::Result<()> {
    let mut config = super::bootstrap();
    args.apply(&mut config);

    // The harness samples from the same catalog the service serves
    let (client, catalog): (Arc<dyn DecisionClient>, Arc<dyn ImageCatalog>) =
        match config.simulation.transport {
            TransportKind::Local => {
                let state = crate::create_app_state_with_config(&config).await?;
                let client: Arc<dyn DecisionClient> = Arc::new(LocalDecisionClient::new(
                    state.decision_service,
                    state.catalog.clone(),
                ));
                (client, state.catalog)
            }
            TransportKind::Http => {
                let client: Arc<dyn DecisionClient> =
                    Arc::new(HttpDecisionClient::from_config(&config.client)?);
                let catalog: Arc<dyn ImageCatalog> = Arc::new(
                    FileSystemCatalog::load(
                        config.data.image_dir.clone(),
                        &config.data.category_map,
                    )
                    .await?,
                );
                (client, catalog)
            }
        };

    let harness_config = HarnessConfig::from_config(&config.simulation);
    info!(
        transport = ?config.simulation.transport,
        clients = harness_config.num_clients,
        seed = harness_config.seed,
        log_file = %config.simulation.log_file.display(),
        "Running simulation"
    );

    let mut log = SimulationLog::create(&config.simulation.log_file)?;
    let report = SimulationHarness::new(client, catalog, harness_config)
        .run(&mut log)
        .await?;

    println!(
        "{} trials: simple {} bytes, similarity {} bytes ({:.1}% saved), {} failed requests",
        report.trials,
        report.simple_bytes,
        report.similarity_bytes,
        report.savings_ratio() * 100.0,
        report.failed_requests
    );
    println!("Seed {}, log written to {}", report.seed, config.simulation.log_file.display());

    Ok(())
}
