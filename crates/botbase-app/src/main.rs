//! Botbase console entry point.
//!
//! Binary name: `botbase`
//!
//! Parses startup flags, resolves the store location, opens the store and
//! runs the interactive console until the operator quits.

mod cli;
mod state;

use anyhow::Context;
use clap::Parser;

use botbase_infra::config::{config_dir, load_store_config, resolve_store_location};
use botbase_observe::tracing_setup::{init_tracing, verbosity_filter};

use cli::Cli;
use state::AppState;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(verbosity_filter(cli.verbose, cli.quiet), cli.log_format.into())
        .map_err(|e| anyhow::anyhow!(e))?;

    let store_path = resolve_store_location(cli.db)?;
    let config = load_store_config(&config_dir(&store_path)).await;
    tracing::debug!(
        store = %store_path.display(),
        busy_timeout_secs = config.busy_timeout_secs,
        max_readers = config.max_readers,
        "starting"
    );

    let state = AppState::init(store_path.clone(), &config)
        .await
        .with_context(|| format!("failed to open store at {}", store_path.display()))?;

    let outcome = cli::shell::run(&state).await;
    state.shutdown().await;
    outcome
}
