use std::path::PathBuf;

use clap::{ArgAction, Parser};

use super::platform::PlatformTarget;

/// Provision the AWS CLI on this host and configure a profile for later
/// pipeline steps.
///
/// Every option can also be supplied through its `PLUGIN_*` environment
/// variable. Empty values are treated as unset.
#[derive(Parser, Debug, Clone, Default)]
#[command(version, long_about = None)]
pub struct Config {
    /// AWS access key ID written to the profile
    #[arg(long, env = "PLUGIN_AWS_ACCESS_KEY_ID", default_value = "", hide_env_values = true)]
    pub aws_access_key_id: String,
    /// AWS secret access key written to the profile
    #[arg(long, env = "PLUGIN_AWS_SECRET_ACCESS_KEY", default_value = "", hide_env_values = true)]
    pub aws_secret_access_key: String,
    /// Optional AWS session token written to the profile
    #[arg(long, env = "PLUGIN_AWS_SESSION_TOKEN", default_value = "", hide_env_values = true)]
    pub aws_session_token: String,
    /// Region used by the region configuration flags
    #[arg(long, env = "PLUGIN_AWS_REGION", default_value = "")]
    pub aws_region: String,
    /// Installation directory for the AWS CLI
    #[arg(long, env = "PLUGIN_INSTALL_DIR", default_value = "")]
    pub install_dir: String,
    /// Directory the `aws` executable is linked into
    #[arg(long, env = "PLUGIN_BINARY_DIR", default_value = "")]
    pub binary_dir: String,
    /// Disable AWS CLI output paging
    #[arg(
        long,
        env = "PLUGIN_DISABLE_AWS_PAGER",
        action = ArgAction::SetTrue,
        value_parser = parse_flag,
    )]
    pub disable_aws_pager: bool,
    /// Install even when an `aws` executable is already on the search path
    #[arg(
        long,
        env = "PLUGIN_OVERRIDE_INSTALLED",
        action = ArgAction::SetTrue,
        value_parser = parse_flag,
    )]
    pub override_installed: bool,
    /// Profile every setting is written to
    #[arg(long, env = "PLUGIN_PROFILE_NAME", default_value = "default")]
    pub profile_name: String,
    /// Role to assume with a web identity
    #[arg(long, env = "PLUGIN_ROLE_ARN", default_value = "")]
    pub role_arn: String,
    /// Session name for the assumed role
    #[arg(long, env = "PLUGIN_ROLE_SESSION_NAME", default_value = "")]
    pub role_session_name: String,
    /// Session duration in seconds, passed through to STS verbatim
    #[arg(long, env = "PLUGIN_SESSION_DURATION", default_value = "3600")]
    pub session_duration: String,
    /// Web identity token presented when assuming the role
    #[arg(long, env = "PLUGIN_WEB_IDENTITY_TOKEN", default_value = "", hide_env_values = true)]
    pub web_identity_token: String,
    /// AWS CLI version to install, e.g. 2.15.30. Empty installs the latest
    #[arg(long, env = "PLUGIN_VERSION", default_value = "")]
    pub version_override: String,
    /// Write the region as the profile's `default.region`
    #[arg(
        long,
        env = "PLUGIN_CONFIGURE_DEFAULT_REGION",
        action = ArgAction::SetTrue,
        value_parser = parse_flag,
    )]
    pub configure_default_region: bool,
    /// Write the region as the profile's `region`
    #[arg(
        long,
        env = "PLUGIN_CONFIGURE_PROFILE_REGION",
        action = ArgAction::SetTrue,
        value_parser = parse_flag,
    )]
    pub configure_profile_region: bool,
    /// Log filter, overridden by RUST_LOG
    #[arg(long, env = "PLUGIN_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Config {
    /// Fills in install and binary directories for `platform` where they are
    /// unset or empty. The receiver is left untouched.
    pub fn with_default_dirs(&self, platform: &PlatformTarget) -> Config {
        let (install_dir, binary_dir) = platform.default_dirs();
        let mut resolved = self.clone();
        if resolved.install_dir().is_none() {
            resolved.install_dir = install_dir.display().to_string();
        }
        if resolved.binary_dir().is_none() {
            resolved.binary_dir = binary_dir.display().to_string();
        }
        resolved
    }

    pub fn install_dir(&self) -> Option<PathBuf> {
        non_empty(&self.install_dir).map(PathBuf::from)
    }

    pub fn binary_dir(&self) -> Option<PathBuf> {
        non_empty(&self.binary_dir).map(PathBuf::from)
    }

    pub fn access_key_id(&self) -> Option<&str> {
        non_empty(&self.aws_access_key_id)
    }

    pub fn secret_access_key(&self) -> Option<&str> {
        non_empty(&self.aws_secret_access_key)
    }

    pub fn session_token(&self) -> Option<&str> {
        non_empty(&self.aws_session_token)
    }

    pub fn region(&self) -> Option<&str> {
        non_empty(&self.aws_region)
    }

    pub fn web_identity_token(&self) -> Option<&str> {
        non_empty(&self.web_identity_token)
    }

    /// Both the role ARN and the session name are needed. Either one alone is
    /// not an error, the step is just skipped.
    pub fn wants_role_assumption(&self) -> bool {
        non_empty(&self.role_arn).is_some() && non_empty(&self.role_session_name).is_some()
    }
}

/// Boolean flag values as pipelines pass them. Empty reads as false.
fn parse_flag(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "false" | "f" | "no" | "n" | "off" | "0" => Ok(false),
        "true" | "t" | "yes" | "y" | "on" | "1" => Ok(true),
        other => Err(format!("`{other}` is not a boolean")),
    }
}

fn non_empty(value: &str) -> Option<&str> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
