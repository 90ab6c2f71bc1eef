//! Maps the host operating system and CPU architecture onto the way the AWS
//! CLI is provisioned there.

use std::{fmt, path::PathBuf};

use super::cli_error::CliError;

const DOWNLOAD_BASE: &str = "https://awscli.amazonaws.com";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Os {
    MacOs,
    Linux,
    Windows,
    Other(String),
}

impl Os {
    pub fn parse(os: &str) -> Self {
        match os {
            "macos" | "darwin" => Os::MacOs,
            "linux" => Os::Linux,
            "windows" => Os::Windows,
            other => Os::Other(other.to_owned()),
        }
    }

    pub fn is_windows(&self) -> bool {
        matches!(self, Os::Windows)
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Os::MacOs => f.write_str("macos"),
            Os::Linux => f.write_str("linux"),
            Os::Windows => f.write_str("windows"),
            Os::Other(os) => f.write_str(os),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arch {
    Amd64,
    Arm64,
    Other(String),
}

impl Arch {
    /// Accepts both the Go (`amd64`, `arm64`) and Rust (`x86_64`, `aarch64`)
    /// spellings.
    pub fn parse(arch: &str) -> Self {
        match arch {
            "amd64" | "x86_64" => Arch::Amd64,
            "arm64" | "aarch64" => Arch::Arm64,
            other => Arch::Other(other.to_owned()),
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arch::Amd64 => f.write_str("amd64"),
            Arch::Arm64 => f.write_str("arm64"),
            Arch::Other(arch) => f.write_str(arch),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformTarget {
    pub os: Os,
    pub arch: Arch,
}

impl PlatformTarget {
    pub fn new(os: &str, arch: &str) -> Self {
        PlatformTarget {
            os: Os::parse(os),
            arch: Arch::parse(arch),
        }
    }

    pub fn current() -> Self {
        Self::new(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Install and binary directories used when none are configured.
    pub fn default_dirs(&self) -> (PathBuf, PathBuf) {
        if self.os.is_windows() {
            (
                PathBuf::from(r"C:\Program Files\Amazon\AWSCLI"),
                PathBuf::from(r"C:\Program Files\Amazon\AWSCLI\bin"),
            )
        } else {
            (
                PathBuf::from("/usr/local/aws-cli"),
                PathBuf::from("/usr/local/bin"),
            )
        }
    }

    pub fn installer_strategy(&self, version: &str) -> Result<InstallerStrategy, CliError> {
        let suffix = version_suffix(version);
        match (&self.os, &self.arch) {
            (Os::MacOs, _) => Ok(InstallerStrategy::MacPkg {
                url: format!("{DOWNLOAD_BASE}/AWSCLIV2{suffix}.pkg"),
            }),
            (Os::Linux, Arch::Amd64) => Ok(InstallerStrategy::LinuxZip {
                url: format!("{DOWNLOAD_BASE}/awscli-exe-linux-x86_64{suffix}.zip"),
            }),
            (Os::Linux, Arch::Arm64) => Ok(InstallerStrategy::LinuxZip {
                url: format!("{DOWNLOAD_BASE}/awscli-exe-linux-aarch64{suffix}.zip"),
            }),
            _ => Err(CliError::UnsupportedPlatform {
                os: self.os.to_string(),
                arch: self.arch.to_string(),
            }),
        }
    }
}

impl fmt::Display for PlatformTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}

/// How the AWS CLI gets onto a supported platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallerStrategy {
    /// Signed `.pkg` handed to the macOS `installer` tool.
    MacPkg { url: String },
    /// Zip bundle carrying an `aws/install` script.
    LinuxZip { url: String },
}

impl InstallerStrategy {
    pub fn url(&self) -> &str {
        match self {
            InstallerStrategy::MacPkg { url } | InstallerStrategy::LinuxZip { url } => url,
        }
    }

    pub fn artifact_name(&self) -> &'static str {
        match self {
            InstallerStrategy::MacPkg { .. } => "AWSCLIV2.pkg",
            InstallerStrategy::LinuxZip { .. } => "awscliv2.zip",
        }
    }
}

// An empty version selects the unversioned "latest" artifact.
fn version_suffix(version: &str) -> String {
    let version = version.trim();
    if version.is_empty() {
        String::new()
    } else if version.starts_with('-') {
        version.to_owned()
    } else {
        format!("-{version}")
    }
}
