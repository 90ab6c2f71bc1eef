//! Facts about the host and the process environment the plugin runs in.

use std::{
    env,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::model::{cli_error::CliError, platform::PlatformTarget};

pub trait Host: Send + Sync {
    fn platform(&self) -> PlatformTarget;

    /// Looks `name` up on the current search path.
    fn find_executable(&self, name: &str) -> Option<PathBuf>;

    /// Puts `dir` in front of the search path of this process, and therefore
    /// of every process it spawns afterwards.
    fn prepend_to_path(&self, dir: &Path) -> Result<(), CliError>;
}

pub struct SystemHost;

impl Host for SystemHost {
    fn platform(&self) -> PlatformTarget {
        PlatformTarget::current()
    }

    fn find_executable(&self, name: &str) -> Option<PathBuf> {
        which::which(name).ok()
    }

    fn prepend_to_path(&self, dir: &Path) -> Result<(), CliError> {
        let current = env::var_os("PATH").unwrap_or_default();
        let joined = prepend(dir, &current)?;
        debug!(path = ?joined, "Updated PATH");
        env::set_var("PATH", joined);
        Ok(())
    }
}

fn prepend(dir: &Path, current: &std::ffi::OsStr) -> Result<std::ffi::OsString, CliError> {
    let paths = std::iter::once(dir.to_path_buf())
        .chain(env::split_paths(current).filter(|p| !p.as_os_str().is_empty()));
    env::join_paths(paths)
        .map_err(|e| CliError::Io(std::io::Error::new(std::io::ErrorKind::InvalidInput, e)))
}
