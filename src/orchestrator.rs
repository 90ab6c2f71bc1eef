//! Runs the plugin phases in order: install, search path update, credential
//! configuration, and role assumption when a role is configured.

use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, Instrument};

use crate::{
    credentials::configure_credentials,
    installer::Installer,
    model::{
        cli_error::CliError,
        config::Config,
        outcome::{Phase, RunError, RunReport},
    },
    role::assume_role_with_web_identity,
    services::{aws_cli::AwsCli, download::Fetcher, host::Host, process::CommandRunner},
};

pub struct Orchestrator<'a> {
    host: &'a dyn Host,
    runner: &'a dyn CommandRunner,
    fetcher: &'a dyn Fetcher,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        host: &'a dyn Host,
        runner: &'a dyn CommandRunner,
        fetcher: &'a dyn Fetcher,
    ) -> Self {
        Orchestrator {
            host,
            runner,
            fetcher,
        }
    }

    /// Runs every phase once. The first failure ends the run; nothing that
    /// was already written is undone. `cancel` is honoured between phases.
    pub async fn run(
        &self,
        config: &Config,
        cancel: &CancellationToken,
    ) -> Result<RunReport, RunError> {
        info!("Starting AWS CLI plugin");
        let platform = self.host.platform();
        let config = config.with_default_dirs(&platform);

        checkpoint(cancel, Phase::Install)?;
        let installation = Installer::new(self.host, self.runner, self.fetcher)
            .ensure_installed(&config, &platform)
            .instrument(info_span!("install"))
            .await
            .map_err(|e| RunError::new(Phase::Install, e))?;

        // Done even when the install was skipped, so later `aws` calls from
        // this process and the rest of the pipeline find the binary.
        if let Some(binary_dir) = config.binary_dir() {
            info!(path = %binary_dir.display(), "AWS CLI binary path");
            self.host
                .prepend_to_path(&binary_dir)
                .map_err(|e| RunError::new(Phase::Install, e))?;
        }

        let cli = AwsCli::new(self.runner);

        checkpoint(cancel, Phase::Configure)?;
        configure_credentials(&cli, &config)
            .instrument(info_span!("configure", profile = %config.profile_name))
            .await
            .map_err(|e| RunError::new(Phase::Configure, e))?;

        let role_assumed = if config.wants_role_assumption() {
            checkpoint(cancel, Phase::AssumeRole)?;
            assume_role_with_web_identity(&cli, &config)
                .instrument(info_span!("assume_role", role_arn = %config.role_arn))
                .await
                .map_err(|e| RunError::new(Phase::AssumeRole, e))?;
            true
        } else {
            info!("No role ARN and session name pair configured, skipping role assumption");
            false
        };

        info!("AWS CLI plugin completed successfully");
        Ok(RunReport {
            installation,
            role_assumed,
        })
    }
}

fn checkpoint(cancel: &CancellationToken, next: Phase) -> Result<(), RunError> {
    if cancel.is_cancelled() {
        Err(RunError::new(next, CliError::Cancelled))
    } else {
        Ok(())
    }
}
