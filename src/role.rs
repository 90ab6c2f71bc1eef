use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    model::{cli_error::CliError, config::Config},
    services::aws_cli::{AwsCli, WebIdentityRequest},
};

/// What a successful role assumption reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssumedRole {
    /// Output of the CLI call as-is, credentials included.
    pub raw_output: String,
    pub assumed_role_arn: Option<String>,
    pub expiration: Option<DateTime<Utc>>,
}

// Only the fields worth logging. The credentials themselves are skipped.
#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WebIdentityResponse {
    assumed_role_user: Option<AssumedRoleUser>,
    credentials: Option<CredentialsExpiry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AssumedRoleUser {
    arn: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CredentialsExpiry {
    expiration: DateTime<Utc>,
}

pub async fn assume_role_with_web_identity(
    cli: &AwsCli<'_>,
    config: &Config,
) -> Result<AssumedRole, CliError> {
    let request = WebIdentityRequest {
        role_arn: &config.role_arn,
        role_session_name: &config.role_session_name,
        duration_seconds: &config.session_duration,
        profile: &config.profile_name,
        web_identity_token: config.web_identity_token(),
    };

    let raw_output = cli.assume_role_with_web_identity(&request).await?;
    println!("Assumed role with web identity:\n{}", redact(&raw_output));

    let mut assumed = AssumedRole {
        raw_output,
        assumed_role_arn: None,
        expiration: None,
    };
    match serde_json::from_str::<WebIdentityResponse>(&assumed.raw_output) {
        Ok(response) => {
            assumed.assumed_role_arn = response.assumed_role_user.map(|u| u.arn);
            assumed.expiration = response.credentials.map(|c| c.expiration);
            info!(
                arn = assumed.assumed_role_arn.as_deref().unwrap_or("unknown"),
                expiration = ?assumed.expiration,
                "Role assumed"
            );
        }
        Err(e) => warn!(error = %e, "Could not read the assume-role response as JSON"),
    }

    Ok(assumed)
}

const SECRET_FIELDS: [&str; 2] = ["SecretAccessKey", "SessionToken"];

/// Masks the temporary secrets in an STS response so it can be printed.
/// Output that is not JSON is returned unchanged.
fn redact(raw: &str) -> String {
    let mut value: serde_json::Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(_) => return raw.to_owned(),
    };
    if let Some(credentials) = value
        .get_mut("Credentials")
        .and_then(serde_json::Value::as_object_mut)
    {
        for field in SECRET_FIELDS {
            if let Some(secret) = credentials.get_mut(field) {
                *secret = serde_json::Value::from("****");
            }
        }
    }
    serde_json::to_string_pretty(&value).unwrap_or_else(|_| raw.to_owned())
}
