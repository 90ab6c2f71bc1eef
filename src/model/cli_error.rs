use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Download failed: {0}")]
    Download(#[from] reqwest::Error),
    #[error("Invalid installer archive: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("unsupported platform: {os}/{arch}")]
    UnsupportedPlatform { os: String, arch: String },
    #[error("AWS {0} not provided")]
    MissingCredentials(&'static str),
    #[error("AWS region not provided")]
    MissingRegion,
    #[error("installer `{command}` failed ({status}): {output}")]
    InstallFailed {
        command: String,
        status: String,
        output: String,
    },
    #[error("failed to set `{key}`: {reason}")]
    ConfigureFailed { key: String, reason: String },
    #[error("failed to assume role with web identity ({status})\n{output}")]
    RoleAssumptionFailed { status: String, output: String },
    #[error("cancelled")]
    Cancelled,
}
