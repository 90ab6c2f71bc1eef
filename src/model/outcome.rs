use std::fmt;

use thiserror::Error;

use super::cli_error::CliError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallationOutcome {
    Installed,
    /// An `aws` executable was already on the search path.
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Install,
    Configure,
    AssumeRole,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Install => f.write_str("install"),
            Phase::Configure => f.write_str("configure"),
            Phase::AssumeRole => f.write_str("assume-role"),
        }
    }
}

/// A failed run, tagged with the phase that stopped it.
#[derive(Error, Debug)]
#[error("{phase} failed: {source}")]
pub struct RunError {
    pub phase: Phase,
    #[source]
    pub source: CliError,
}

impl RunError {
    pub fn new(phase: Phase, source: CliError) -> Self {
        RunError { phase, source }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub installation: InstallationOutcome,
    pub role_assumed: bool,
}
