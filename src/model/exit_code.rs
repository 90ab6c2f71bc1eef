use super::{
    cli_error::CliError,
    outcome::{Phase, RunError},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Install = 2,
    Configure = 3,
    AssumeRole = 4,
    Cancelled = 130,
}

impl From<&RunError> for ExitCode {
    fn from(error: &RunError) -> Self {
        if matches!(error.source, CliError::Cancelled) {
            return ExitCode::Cancelled;
        }
        match error.phase {
            Phase::Install => ExitCode::Install,
            Phase::Configure => ExitCode::Configure,
            Phase::AssumeRole => ExitCode::AssumeRole,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_code_follows_phase() {
        let error = RunError::new(Phase::Configure, CliError::MissingRegion);
        assert_eq!(ExitCode::from(&error) as i32, 3);

        let error = RunError::new(Phase::AssumeRole, CliError::Cancelled);
        assert_eq!(ExitCode::from(&error), ExitCode::Cancelled);
    }
}
