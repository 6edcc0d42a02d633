//! Resource reconciler: drives one IAM user and its credentials to the desired state.
//!
//! Each managed resource moves between two states, `Absent` and `Present`.
//! Removing an already absent resource and creating an already present one
//! are both no-ops, so re-running the reconciler is safe. Steps run in a
//! fixed order with no rollback: a failed step leaves the earlier ones applied.

use std::fmt;

use log::{debug, info};

use crate::aws::iam_client::IamDirectory;
use crate::aws::AwsResult;
use crate::config::{ProvisioningSpec, ProvisioningStrategy};
use crate::error::{ProvisioningError, ProvisioningResult};
use crate::password::generate_password;
use crate::synthesis::{inline_user_policy, managed_user_policy};
use crate::types::{PolicyDocument, ProvisionedUserResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ResourceState {
    Absent,
    Present,
}

impl ResourceState {
    fn as_str(self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Present => "present",
        }
    }
}

/// An IAM resource addressed by exact key, with what is needed to create it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Resource<'a> {
    LoginProfile {
        user_name: &'a str,
        password: &'a str,
    },
    InlinePolicy {
        user_name: &'a str,
        policy_name: &'a str,
        document: &'a PolicyDocument,
    },
    User {
        user_name: &'a str,
    },
    ManagedPolicy {
        policy_name: &'a str,
        policy_arn: &'a str,
        document: &'a PolicyDocument,
    },
    PolicyAttachment {
        user_name: &'a str,
        policy_arn: &'a str,
    },
}

impl fmt::Display for Resource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LoginProfile { user_name, .. } => write!(f, "login profile of {user_name}"),
            Self::InlinePolicy {
                user_name,
                policy_name,
                ..
            } => write!(f, "inline policy {policy_name} of {user_name}"),
            Self::User { user_name } => write!(f, "IAM user {user_name}"),
            Self::ManagedPolicy { policy_arn, .. } => write!(f, "managed policy {policy_arn}"),
            Self::PolicyAttachment {
                user_name,
                policy_arn,
            } => write!(f, "attachment of {policy_arn} to {user_name}"),
        }
    }
}

impl Resource<'_> {
    async fn remove(&self, directory: &dyn IamDirectory) -> AwsResult<()> {
        match self {
            Self::LoginProfile { user_name, .. } => directory.delete_login_profile(user_name).await,
            Self::InlinePolicy {
                user_name,
                policy_name,
                ..
            } => directory.delete_user_policy(user_name, policy_name).await,
            Self::User { user_name } => directory.delete_user(user_name).await,
            Self::ManagedPolicy { policy_arn, .. } => directory.delete_policy(policy_arn).await,
            Self::PolicyAttachment {
                user_name,
                policy_arn,
            } => directory.detach_user_policy(user_name, policy_arn).await,
        }
    }

    async fn create(&self, directory: &dyn IamDirectory) -> AwsResult<()> {
        match self {
            Self::LoginProfile {
                user_name,
                password,
            } => directory.create_login_profile(user_name, password).await,
            Self::InlinePolicy {
                user_name,
                policy_name,
                document,
            } => {
                directory
                    .put_user_policy(user_name, policy_name, document)
                    .await
            }
            Self::User { user_name } => directory.create_user(user_name).await,
            Self::ManagedPolicy {
                policy_name,
                document,
                ..
            } => directory.create_policy(policy_name, document).await,
            Self::PolicyAttachment {
                user_name,
                policy_arn,
            } => directory.attach_user_policy(user_name, policy_arn).await,
        }
    }

    /// A login profile that already exists would keep an unknown password.
    fn tolerates_existing(&self) -> bool {
        !matches!(self, Self::LoginProfile { .. })
    }
}

/// Drive one resource to `target`.
pub(crate) async fn ensure(
    directory: &dyn IamDirectory,
    resource: &Resource<'_>,
    target: ResourceState,
) -> ProvisioningResult<()> {
    let outcome = match target {
        ResourceState::Absent => match resource.remove(directory).await {
            Ok(()) => {
                info!("    Deleted existing {resource}.");
                Ok(())
            }
            Err(err) if err.is_not_found() => {
                debug!("    No existing {resource}.");
                Ok(())
            }
            Err(err) => Err(err),
        },
        ResourceState::Present => match resource.create(directory).await {
            Ok(()) => {
                info!("    Created {resource}.");
                Ok(())
            }
            Err(err) if err.is_conflict() && resource.tolerates_existing() => {
                debug!("    {resource} already exists.");
                Ok(())
            }
            Err(err) => Err(err),
        },
    };

    outcome.map_err(|source| ProvisioningError::Step {
        resource: resource.to_string(),
        target: target.as_str(),
        source,
    })
}

/// ARN of a customer managed policy addressed by name.
pub(crate) fn managed_policy_arn(account_id: &str, policy_name: &str) -> String {
    format!("arn:aws:iam::{account_id}:policy/{policy_name}")
}

/// Ordered transitions that replace a user and its credentials.
///
/// Dependents are removed before the user, and the user is created before
/// anything that attaches to it.
pub(crate) fn plan<'a>(
    strategy: &ProvisioningStrategy,
    user_name: &'a str,
    policy_name: &'a str,
    policy_arn: &'a str,
    document: &'a PolicyDocument,
    password: &'a str,
) -> Vec<(Resource<'a>, ResourceState)> {
    let login_profile = Resource::LoginProfile {
        user_name,
        password,
    };
    let user = Resource::User { user_name };

    match strategy {
        ProvisioningStrategy::InlinePolicy { .. } => {
            let inline = Resource::InlinePolicy {
                user_name,
                policy_name,
                document,
            };
            vec![
                (login_profile.clone(), ResourceState::Absent),
                (inline.clone(), ResourceState::Absent),
                (user.clone(), ResourceState::Absent),
                (user, ResourceState::Present),
                (inline, ResourceState::Present),
                (login_profile, ResourceState::Present),
            ]
        }
        ProvisioningStrategy::ManagedPolicy { .. } => {
            let attachment = Resource::PolicyAttachment {
                user_name,
                policy_arn,
            };
            let managed = Resource::ManagedPolicy {
                policy_name,
                policy_arn,
                document,
            };
            vec![
                (login_profile.clone(), ResourceState::Absent),
                (attachment.clone(), ResourceState::Absent),
                (managed.clone(), ResourceState::Absent),
                (user.clone(), ResourceState::Absent),
                (user, ResourceState::Present),
                (managed, ResourceState::Present),
                (attachment, ResourceState::Present),
                (login_profile, ResourceState::Present),
            ]
        }
    }
}

/// Replace `user_name` in one account and hand back its console login.
pub async fn reconcile_user(
    directory: &dyn IamDirectory,
    account_id: &str,
    user_name: &str,
    spec: &ProvisioningSpec,
) -> ProvisioningResult<ProvisionedUserResult> {
    info!("  Create or replace IAM user({user_name})");

    let document = match &spec.strategy {
        ProvisioningStrategy::InlinePolicy { prefix, .. } => {
            inline_user_policy(&spec.account_role, prefix)
        }
        ProvisioningStrategy::ManagedPolicy { .. } => {
            managed_user_policy(&spec.policy_name, user_name)
        }
    };
    let policy_arn = managed_policy_arn(account_id, &spec.policy_name);
    let password = generate_password();

    let steps = plan(
        &spec.strategy,
        user_name,
        &spec.policy_name,
        &policy_arn,
        &document,
        &password,
    );
    for (resource, target) in &steps {
        ensure(directory, resource, *target).await?;
    }

    Ok(ProvisionedUserResult::new(account_id, user_name, password))
}
