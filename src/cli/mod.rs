//! CLI module for simcache
//!
//! - `serve`: decision service over HTTP
//! - `fetch`: request one image through the local client cache
//! - `clear-cache`: empty the local client cache
//! - `simulate`: compare similarity reuse against a plain cache

pub mod client;
pub mod serve;
pub mod simulate;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// simcache - similarity-aware image cache
#[derive(Parser)]
#[command(name = "simcache")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the decision service
    Serve,

    /// Fetch one image through the local cache
    Fetch(client::FetchArgs),

    /// Remove every image from the local cache
    ClearCache(client::ClearCacheArgs),

    /// Run the cache simulation
    Simulate(simulate::SimulateArgs),
}

/// Loads `.env`, the layered configuration and the global subscriber
pub fn bootstrap() -> AppConfig {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_else(|e| {
        eprintln!("Invalid configuration, using defaults: {}", e);
        AppConfig::default()
    });
    logging::init_logging(&config.logging);

    config
}
