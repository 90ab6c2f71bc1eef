use std::path::PathBuf;

use tracing::info;

use crate::model::cli_error::CliError;

use super::process::{CommandOutput, CommandRunner, Invocation};

pub const AWS_EXECUTABLE: &str = "aws";

/// The parts of the `aws` command line this plugin relies on.
pub struct AwsCli<'a> {
    runner: &'a dyn CommandRunner,
    program: PathBuf,
}

impl<'a> AwsCli<'a> {
    /// Resolves `aws` through the search path at call time.
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self::at(runner, AWS_EXECUTABLE)
    }

    pub fn at(runner: &'a dyn CommandRunner, program: impl Into<PathBuf>) -> Self {
        AwsCli {
            runner,
            program: program.into(),
        }
    }

    /// `aws configure set <key> <value> --profile <profile>`
    pub async fn configure_set(
        &self,
        key: &str,
        value: &str,
        profile: &str,
    ) -> Result<(), CliError> {
        self.configure(key, value, profile, false).await
    }

    /// Same as [`AwsCli::configure_set`], but the value never shows up in logs.
    pub async fn configure_set_secret(
        &self,
        key: &str,
        value: &str,
        profile: &str,
    ) -> Result<(), CliError> {
        self.configure(key, value, profile, true).await
    }

    async fn configure(
        &self,
        key: &str,
        value: &str,
        profile: &str,
        secret: bool,
    ) -> Result<(), CliError> {
        let invocation = Invocation::new(&self.program).args(["configure", "set", key]);
        let invocation = if secret {
            invocation.secret_arg(value)
        } else {
            invocation.arg(value)
        };
        let invocation = invocation.args(["--profile", profile]);

        info!(command = %invocation, "Configuring profile");
        let output = self
            .runner
            .run(&invocation)
            .await
            .map_err(|e| CliError::ConfigureFailed {
                key: key.to_owned(),
                reason: e.to_string(),
            })?;

        if output.success() {
            Ok(())
        } else {
            Err(CliError::ConfigureFailed {
                key: key.to_owned(),
                reason: describe(&output),
            })
        }
    }

    /// `aws sts assume-role-with-web-identity ...`, returning the combined
    /// output of a successful call.
    pub async fn assume_role_with_web_identity(
        &self,
        request: &WebIdentityRequest<'_>,
    ) -> Result<String, CliError> {
        let mut invocation = Invocation::new(&self.program)
            .args(["sts", "assume-role-with-web-identity"])
            .args(["--role-arn", request.role_arn])
            .args(["--role-session-name", request.role_session_name])
            .args(["--duration-seconds", request.duration_seconds])
            .args(["--profile", request.profile]);
        if let Some(token) = request.web_identity_token {
            invocation = invocation.arg("--web-identity-token").secret_arg(token);
        }

        info!(command = %invocation, "Assuming role");
        let output = self
            .runner
            .run(&invocation)
            .await
            .map_err(|e| CliError::RoleAssumptionFailed {
                status: "not started".to_owned(),
                output: e.to_string(),
            })?;

        if output.success() {
            Ok(output.output)
        } else {
            Err(CliError::RoleAssumptionFailed {
                status: output.status(),
                output: output.output,
            })
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct WebIdentityRequest<'a> {
    pub role_arn: &'a str,
    pub role_session_name: &'a str,
    pub duration_seconds: &'a str,
    pub profile: &'a str,
    pub web_identity_token: Option<&'a str>,
}

fn describe(output: &CommandOutput) -> String {
    let text = output.output.trim();
    if text.is_empty() {
        output.status()
    } else {
        format!("{}: {}", output.status(), text)
    }
}
