//! This crate provides the core logic of org-bootstrap:
//! - Configuration parsing and presence validation
//! - Cross-account role assumption with bounded retry
//! - Idempotent IAM user reconciliation (inline or managed policy strategy)
//! - Batch provisioning across accounts and member account creation
//!

mod aws;
pub mod commands;
mod config;
mod confirm;
mod error;
mod password;
mod synthesis;
mod types;

#[cfg(test)]
mod testing;

// Re-exports for a small, focused public API
pub use aws::iam_client::{AwsDirectoryFactory, AwsIamClient, DirectoryFactory, IamDirectory};
pub use aws::organizations::{AwsOrganizationsClient, CreateAccountStatus, OrganizationsDirectory};
pub use aws::sts::{role_arn, RoleAssumer, StsRoleAssumer, SESSION_NAME};
pub use aws::{AwsError, AwsResult};
pub use commands::{
    reconcile_user, render_account_table, render_request_table, Outcome, ProvisioningService,
    RetryPolicy,
};
pub use config::{
    load_json, AccountsConfig, EmailConfig, NumberRange, ProvisioningSpec, ProvisioningStrategy,
};
pub use confirm::{parse_yes_no, AssumeYes, Confirmation, PromptConfirmation};
pub use error::{ProvisioningError, ProvisioningResult};
pub use password::{generate_password, PASSWORD_LENGTH};
pub use synthesis::{inline_user_policy, managed_user_policy};
pub use types::{
    console_url, AccountRef, AccountRequest, CreatedAccount, Effect, OneOrMany, PolicyDocument,
    ProvisionedUserResult, Statement, TemporaryCredentials,
};
