//! Running external programs.

use std::{ffi::OsString, fmt, io, path::PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

const MASK: &str = "****";

/// A program call: what to run, with which arguments and extra environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub env: Vec<(String, OsString)>,
    secret_args: Vec<usize>,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Invocation {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
            secret_args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Adds an argument that is masked whenever the invocation is displayed.
    pub fn secret_arg(mut self, arg: impl Into<String>) -> Self {
        self.secret_args.push(self.args.len());
        self.args.push(arg.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<OsString>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Runs `program` with the current arguments as `wrapper program args..`,
    /// e.g. to go through `sudo`.
    pub fn wrapped_in(self, wrapper: impl Into<PathBuf>) -> Self {
        let mut args = Vec::with_capacity(self.args.len() + 1);
        args.push(self.program.display().to_string());
        args.extend(self.args);
        Invocation {
            program: wrapper.into(),
            args,
            env: self.env,
            secret_args: self.secret_args.into_iter().map(|i| i + 1).collect(),
        }
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for (i, arg) in self.args.iter().enumerate() {
            if self.secret_args.contains(&i) {
                write!(f, " {MASK}")?;
            } else if arg.is_empty() || arg.contains(' ') {
                write!(f, " {arg:?}")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    /// Standard output followed by standard error.
    pub output: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    pub fn status(&self) -> String {
        match self.code {
            Some(code) => format!("exit status {code}"),
            None => "terminated by signal".to_owned(),
        }
    }
}

#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs the invocation to completion. An `Err` means the program could
    /// not be started at all; a non-zero exit is reported in the output.
    async fn run(&self, invocation: &Invocation) -> io::Result<CommandOutput>;
}

/// Spawns real processes, inheriting the current process environment.
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, invocation: &Invocation) -> io::Result<CommandOutput> {
        debug!(command = %invocation, "Running");
        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args);
        command.envs(invocation.env.iter().map(|(k, v)| (k, v)));
        command.kill_on_drop(true);

        let output = command.output().await?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(CommandOutput {
            code: output.status.code(),
            output: combined,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_masks_secret_args() {
        let invocation = Invocation::new("aws")
            .args(["configure", "set", "aws_secret_access_key"])
            .secret_arg("wJalrXUtnFEMI")
            .args(["--profile", "ci"]);

        assert_eq!(
            invocation.to_string(),
            "aws configure set aws_secret_access_key **** --profile ci"
        );
    }

    #[test]
    fn wrapping_keeps_masks_aligned() {
        let invocation = Invocation::new("/tmp/aws/install")
            .arg("-i")
            .secret_arg("hidden")
            .env("PLUGIN_BINARY_DIR", "/usr/local/bin")
            .wrapped_in("sudo");

        assert_eq!(invocation.program, PathBuf::from("sudo"));
        assert_eq!(invocation.args, vec!["/tmp/aws/install", "-i", "hidden"]);
        assert_eq!(invocation.to_string(), "sudo /tmp/aws/install -i ****");
        assert_eq!(invocation.env.len(), 1);
    }

    #[test]
    fn empty_args_are_quoted() {
        let invocation = Invocation::new("aws").args(["configure", "set", "cli_pager", ""]);
        assert_eq!(invocation.to_string(), r#"aws configure set cli_pager """#);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn system_runner_combines_output_and_reports_status() {
        let output = SystemRunner
            .run(&Invocation::new("sh").args(["-c", "echo out; echo err >&2; exit 3"]))
            .await
            .unwrap();

        assert!(!output.success());
        assert_eq!(output.code, Some(3));
        assert_eq!(output.output, "out\nerr\n");
    }

    #[tokio::test]
    async fn system_runner_fails_for_missing_program() {
        let result = SystemRunner
            .run(&Invocation::new("definitely-not-a-real-program-7f3a"))
            .await;
        assert!(result.is_err());
    }
}
