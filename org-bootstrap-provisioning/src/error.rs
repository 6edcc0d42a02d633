//! Error types for provisioning operations.

use std::path::PathBuf;

use thiserror::Error;

use crate::aws::AwsError;

/// Errors that can occur while loading configuration or provisioning resources.
#[derive(Debug, Error)]
pub enum ProvisioningError {
    /// Required configuration keys are absent. One entry per missing key.
    #[error("{}", .0.join("\n"))]
    MissingKeys(Vec<String>),

    /// Configuration is present but not usable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A configuration or account file could not be read.
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A configuration or account file is not valid JSON.
    #[error("Malformed JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Role assumption failed with an error that retrying will not fix.
    #[error("Failed to assume role {role_arn}: {source}")]
    CredentialsRejected {
        role_arn: String,
        #[source]
        source: AwsError,
    },

    /// Role assumption kept failing transiently until the attempt budget ran out.
    #[error("Gave up assuming role {role_arn} after {attempts} attempts: {source}")]
    CredentialsExhausted {
        role_arn: String,
        attempts: u32,
        #[source]
        source: AwsError,
    },

    /// A reconciliation step failed; the user is left partially provisioned.
    #[error("Failed to make {resource} {target}: {source}")]
    Step {
        resource: String,
        target: &'static str,
        #[source]
        source: AwsError,
    },

    /// The organization reported that a member account could not be created.
    #[error("Account creation failed: {0}")]
    AccountCreation(String),

    /// Polling an accepted `CreateAccount` request failed for good.
    ///
    /// The organization may still finish the account; the request id lets
    /// the operator look it up.
    #[error("Lost track of account creation request {request_id}: {source}")]
    AccountStatus {
        request_id: String,
        #[source]
        source: AwsError,
    },

    /// Reading the operator's answer failed.
    #[error("Failed to read confirmation: {0}")]
    Prompt(#[from] std::io::Error),

    /// Any other remote call failure.
    #[error(transparent)]
    Aws(#[from] AwsError),
}

impl ProvisioningError {
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}

/// Result type alias for provisioning operations.
pub type ProvisioningResult<T> = Result<T, ProvisioningError>;
