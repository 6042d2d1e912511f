use clap::Parser;
use simcache::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve => cli::serve::run().await,
        Command::Fetch(args) => cli::client::fetch(args).await,
        Command::ClearCache(args) => cli::client::clear_cache(args).await,
        Command::Simulate(args) => cli::simulate::run(args).await,
    }
}
