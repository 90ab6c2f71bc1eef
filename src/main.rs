use clap::Parser;
use model::{
    cli_output::CliResult,
    config::Config,
    outcome::{Phase, RunError},
};
use orchestrator::Orchestrator;
use services::{download::HttpFetcher, host::SystemHost, process::SystemRunner};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod credentials;
mod installer;
mod model;
mod orchestrator;
mod role;
mod services;
#[cfg(test)]
mod testing;

#[tokio::main]
async fn main() {
    let config = Config::parse();
    init_logging(&config.log_level);

    // A cancelled run stops at the next phase boundary. The subprocess that
    // is already running is left to finish.
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, stopping after the current step");
                cancel.cancel();
            }
        });
    }

    let result = async {
        let fetcher = HttpFetcher::new().map_err(|e| RunError::new(Phase::Install, e))?;
        Orchestrator::new(&SystemHost, &SystemRunner, &fetcher)
            .run(&config, &cancel)
            .await
    }
    .await;

    let report = CliResult::new(result).exit_on_error();
    info!(
        installation = ?report.installation,
        role_assumed = report.role_assumed,
        "Done"
    );
}

fn init_logging(level: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(env_filter)
        .init();
}
