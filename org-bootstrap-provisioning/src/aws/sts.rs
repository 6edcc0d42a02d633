//! STS helpers for cross-account role assumption

use async_trait::async_trait;
use aws_sdk_sts::Client as StsClient;

use crate::aws::{classify, AwsError, AwsResult};
use crate::types::TemporaryCredentials;

/// Session name recorded in CloudTrail for every assumed role session.
pub const SESSION_NAME: &str = "NewAccountRole";

/// ARN of a role in a member account.
pub fn role_arn(account_id: &str, role_name: &str) -> String {
    format!("arn:aws:iam::{account_id}:role/{role_name}")
}

/// Exchanges a role ARN for temporary credentials.
#[async_trait]
pub trait RoleAssumer: Send + Sync {
    async fn assume_role(&self, role_arn: &str, session_name: &str)
        -> AwsResult<TemporaryCredentials>;
}

pub struct StsRoleAssumer {
    client: StsClient,
}

impl StsRoleAssumer {
    pub fn new(client: StsClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RoleAssumer for StsRoleAssumer {
    async fn assume_role(
        &self,
        role_arn: &str,
        session_name: &str,
    ) -> AwsResult<TemporaryCredentials> {
        let response = self
            .client
            .assume_role()
            .role_arn(role_arn)
            .role_session_name(session_name)
            .send()
            .await
            .map_err(|e| classify("AssumeRole", e))?;

        let creds = response.credentials().ok_or(AwsError::MissingField {
            operation: "AssumeRole",
            field: "Credentials",
        })?;

        Ok(TemporaryCredentials {
            access_key_id: creds.access_key_id().to_string(),
            secret_access_key: creds.secret_access_key().to_string(),
            session_token: creds.session_token().to_string(),
        })
    }
}
