use std::{
    io,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use tracing::{info, warn};

use crate::{
    model::{
        cli_error::CliError,
        config::Config,
        outcome::InstallationOutcome,
        platform::{InstallerStrategy, PlatformTarget},
    },
    services::{
        aws_cli::{AwsCli, AWS_EXECUTABLE},
        download::Fetcher,
        host::Host,
        process::{CommandRunner, Invocation},
    },
};

pub struct Installer<'a> {
    host: &'a dyn Host,
    runner: &'a dyn CommandRunner,
    fetcher: &'a dyn Fetcher,
}

impl<'a> Installer<'a> {
    pub fn new(
        host: &'a dyn Host,
        runner: &'a dyn CommandRunner,
        fetcher: &'a dyn Fetcher,
    ) -> Self {
        Installer {
            host,
            runner,
            fetcher,
        }
    }

    /// Makes sure an `aws` executable is available, installing it unless one
    /// is already on the search path and `override_installed` is off.
    pub async fn ensure_installed(
        &self,
        config: &Config,
        platform: &PlatformTarget,
    ) -> Result<InstallationOutcome, CliError> {
        let existing = if config.override_installed {
            None
        } else {
            self.host.find_executable(AWS_EXECUTABLE)
        };

        let (outcome, aws) = match existing {
            Some(path) => {
                info!(
                    path = %path.display(),
                    "AWS CLI is already installed. Skipping installation."
                );
                (InstallationOutcome::Skipped, path)
            }
            None => {
                let aws = self.install(config, platform).await?;
                (InstallationOutcome::Installed, aws)
            }
        };

        if config.disable_aws_pager {
            AwsCli::at(self.runner, aws)
                .configure_set("cli_pager", "", &config.profile_name)
                .await?;
        }

        Ok(outcome)
    }

    /// Returns the path of the freshly installed `aws` executable.
    async fn install(
        &self,
        config: &Config,
        platform: &PlatformTarget,
    ) -> Result<PathBuf, CliError> {
        // Resolved before anything touches the filesystem.
        let strategy = platform.installer_strategy(&config.version_override)?;

        let (default_install_dir, default_binary_dir) = platform.default_dirs();
        let install_dir = config.install_dir().unwrap_or(default_install_dir.clone());
        let binary_dir = config.binary_dir().unwrap_or(default_binary_dir.clone());

        info!(
            %platform,
            install_dir = %install_dir.display(),
            binary_dir = %binary_dir.display(),
            "Installing AWS CLI"
        );
        let started = Instant::now();

        let scratch = tempfile::Builder::new().prefix("awscli-").tempdir()?;
        let result = self
            .download_and_run(
                &strategy,
                scratch.path(),
                &install_dir,
                &binary_dir,
                config.override_installed,
            )
            .await;

        let scratch_path = scratch.path().to_path_buf();
        if let Err(e) = scratch.close() {
            warn!(path = %scratch_path.display(), error = %e, "Failed to remove installer files");
        }
        result?;

        info!(
            elapsed = %humantime::format_duration(Duration::from_secs(started.elapsed().as_secs())),
            "AWS CLI installed successfully"
        );
        // The macOS package always links into the default binary directory.
        let linked_into = match strategy {
            InstallerStrategy::MacPkg { .. } => default_binary_dir,
            InstallerStrategy::LinuxZip { .. } => binary_dir,
        };
        Ok(linked_into.join(AWS_EXECUTABLE))
    }

    async fn download_and_run(
        &self,
        strategy: &InstallerStrategy,
        scratch: &Path,
        install_dir: &Path,
        binary_dir: &Path,
        update: bool,
    ) -> Result<(), CliError> {
        let artifact = scratch.join(strategy.artifact_name());
        self.fetcher.fetch(strategy.url(), &artifact).await?;

        let invocation = match strategy {
            InstallerStrategy::MacPkg { .. } => Invocation::new("installer")
                .arg("-pkg")
                .arg(artifact.display().to_string())
                .args(["-target", "/"]),
            InstallerStrategy::LinuxZip { .. } => {
                let script = unpack(&artifact, scratch).await?;
                let invocation = Invocation::new(script)
                    .arg("-i")
                    .arg(install_dir.display().to_string())
                    .arg("-b")
                    .arg(binary_dir.display().to_string());
                // Without it the bundled script refuses to touch an existing install.
                if update {
                    invocation.arg("--update")
                } else {
                    invocation
                }
            }
        }
        .env("PLUGIN_INSTALL_DIR", install_dir.as_os_str())
        .env("PLUGIN_BINARY_DIR", binary_dir.as_os_str());

        let invocation = match self.host.find_executable("sudo") {
            Some(sudo) => invocation.wrapped_in(sudo),
            None => invocation,
        };

        info!(command = %invocation, "Running installer");
        let output = self
            .runner
            .run(&invocation)
            .await
            .map_err(|e| CliError::InstallFailed {
                command: invocation.to_string(),
                status: "not started".to_owned(),
                output: e.to_string(),
            })?;

        if output.success() {
            Ok(())
        } else {
            Err(CliError::InstallFailed {
                command: invocation.to_string(),
                status: output.status(),
                output: output.output.trim().to_owned(),
            })
        }
    }
}

/// Extracts the Linux bundle next to the archive and returns the path of its
/// install script.
async fn unpack(archive: &Path, dest: &Path) -> Result<PathBuf, CliError> {
    let archive = archive.to_path_buf();
    let dest = dest.to_path_buf();

    tokio::task::spawn_blocking(move || -> Result<PathBuf, CliError> {
        let file = std::fs::File::open(&archive)?;
        let mut zip = zip::ZipArchive::new(file)?;
        zip.extract(&dest)?;

        let script = dest.join("aws").join("install");
        if !script.is_file() {
            return Err(CliError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} is missing from the archive", script.display()),
            )));
        }
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755))?;
        }
        Ok(script)
    })
    .await
    .map_err(|e| CliError::Io(io::Error::new(io::ErrorKind::Other, e)))?
}
