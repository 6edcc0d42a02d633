//! AWS IAM client wrapper for the resources the reconciler manages
//!
//! Every operation addresses its resource by exact key (user name, policy
//! ARN) so a missing resource surfaces as [`AwsError::NotFound`] and an
//! existing one as [`AwsError::Conflict`].

use async_trait::async_trait;
use aws_sdk_iam::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_iam::Client as IamClient;

use crate::aws::{classify, AwsError, AwsResult};
use crate::types::{PolicyDocument, TemporaryCredentials};

/// IAM operations within one account.
#[async_trait]
pub trait IamDirectory: Send + Sync {
    async fn create_user(&self, user_name: &str) -> AwsResult<()>;
    async fn delete_user(&self, user_name: &str) -> AwsResult<()>;

    async fn create_login_profile(&self, user_name: &str, password: &str) -> AwsResult<()>;
    async fn delete_login_profile(&self, user_name: &str) -> AwsResult<()>;

    async fn put_user_policy(
        &self,
        user_name: &str,
        policy_name: &str,
        policy_document: &PolicyDocument,
    ) -> AwsResult<()>;
    async fn delete_user_policy(&self, user_name: &str, policy_name: &str) -> AwsResult<()>;

    async fn create_policy(
        &self,
        policy_name: &str,
        policy_document: &PolicyDocument,
    ) -> AwsResult<()>;
    async fn delete_policy(&self, policy_arn: &str) -> AwsResult<()>;

    async fn attach_user_policy(&self, user_name: &str, policy_arn: &str) -> AwsResult<()>;
    async fn detach_user_policy(&self, user_name: &str, policy_arn: &str) -> AwsResult<()>;
}

/// Builds an [`IamDirectory`] bound to one account's assumed-role credentials.
pub trait DirectoryFactory: Send + Sync {
    fn directory(&self, credentials: &TemporaryCredentials, region: &str)
        -> Box<dyn IamDirectory>;
}

pub struct AwsIamClient {
    client: IamClient,
}

impl AwsIamClient {
    pub fn new(client: IamClient) -> Self {
        Self { client }
    }
}

fn policy_json(policy_document: &PolicyDocument) -> AwsResult<String> {
    serde_json::to_string(policy_document).map_err(|e| AwsError::Service {
        operation: "SerializePolicy",
        code: None,
        message: format!("Failed to serialize policy: {e}"),
    })
}

#[async_trait]
impl IamDirectory for AwsIamClient {
    async fn create_user(&self, user_name: &str) -> AwsResult<()> {
        self.client
            .create_user()
            .path("/")
            .user_name(user_name)
            .send()
            .await
            .map_err(|e| classify("CreateUser", e))?;
        Ok(())
    }

    async fn delete_user(&self, user_name: &str) -> AwsResult<()> {
        self.client
            .delete_user()
            .user_name(user_name)
            .send()
            .await
            .map_err(|e| classify("DeleteUser", e))?;
        Ok(())
    }

    async fn create_login_profile(&self, user_name: &str, password: &str) -> AwsResult<()> {
        self.client
            .create_login_profile()
            .user_name(user_name)
            .password(password)
            .password_reset_required(false)
            .send()
            .await
            .map_err(|e| classify("CreateLoginProfile", e))?;
        Ok(())
    }

    async fn delete_login_profile(&self, user_name: &str) -> AwsResult<()> {
        self.client
            .delete_login_profile()
            .user_name(user_name)
            .send()
            .await
            .map_err(|e| classify("DeleteLoginProfile", e))?;
        Ok(())
    }

    async fn put_user_policy(
        &self,
        user_name: &str,
        policy_name: &str,
        policy_document: &PolicyDocument,
    ) -> AwsResult<()> {
        let policy_json = policy_json(policy_document)?;
        self.client
            .put_user_policy()
            .user_name(user_name)
            .policy_name(policy_name)
            .policy_document(policy_json)
            .send()
            .await
            .map_err(|e| classify("PutUserPolicy", e))?;
        Ok(())
    }

    async fn delete_user_policy(&self, user_name: &str, policy_name: &str) -> AwsResult<()> {
        self.client
            .delete_user_policy()
            .user_name(user_name)
            .policy_name(policy_name)
            .send()
            .await
            .map_err(|e| classify("DeleteUserPolicy", e))?;
        Ok(())
    }

    async fn create_policy(
        &self,
        policy_name: &str,
        policy_document: &PolicyDocument,
    ) -> AwsResult<()> {
        let policy_json = policy_json(policy_document)?;
        self.client
            .create_policy()
            .policy_name(policy_name)
            .policy_document(policy_json)
            .send()
            .await
            .map_err(|e| classify("CreatePolicy", e))?;
        Ok(())
    }

    async fn delete_policy(&self, policy_arn: &str) -> AwsResult<()> {
        self.client
            .delete_policy()
            .policy_arn(policy_arn)
            .send()
            .await
            .map_err(|e| classify("DeletePolicy", e))?;
        Ok(())
    }

    async fn attach_user_policy(&self, user_name: &str, policy_arn: &str) -> AwsResult<()> {
        self.client
            .attach_user_policy()
            .user_name(user_name)
            .policy_arn(policy_arn)
            .send()
            .await
            .map_err(|e| classify("AttachUserPolicy", e))?;
        Ok(())
    }

    async fn detach_user_policy(&self, user_name: &str, policy_arn: &str) -> AwsResult<()> {
        self.client
            .detach_user_policy()
            .user_name(user_name)
            .policy_arn(policy_arn)
            .send()
            .await
            .map_err(|e| classify("DetachUserPolicy", e))?;
        Ok(())
    }
}

/// Creates IAM clients from assumed-role credentials.
#[derive(Debug, Clone, Copy, Default)]
pub struct AwsDirectoryFactory;

impl DirectoryFactory for AwsDirectoryFactory {
    fn directory(
        &self,
        credentials: &TemporaryCredentials,
        region: &str,
    ) -> Box<dyn IamDirectory> {
        let provider = Credentials::new(
            credentials.access_key_id.clone(),
            credentials.secret_access_key.clone(),
            Some(credentials.session_token.clone()),
            None,
            "org-bootstrap-assumed-role",
        );
        let config = aws_sdk_iam::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .credentials_provider(provider)
            .build();
        Box::new(AwsIamClient::new(IamClient::from_conf(config)))
    }
}
