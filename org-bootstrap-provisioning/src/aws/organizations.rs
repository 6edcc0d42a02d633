//! AWS Organizations wrapper for member account creation

use async_trait::async_trait;
use aws_sdk_organizations::types::{CreateAccountState, IamUserAccessToBilling};
use aws_sdk_organizations::Client as OrganizationsClient;

use crate::aws::{classify, AwsError, AwsResult};
use crate::types::CreatedAccount;

/// Progress of an asynchronous `CreateAccount` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateAccountStatus {
    InProgress,
    Succeeded { account_id: String },
    Failed { reason: String },
}

/// Organization management operations used by the account creator.
#[async_trait]
pub trait OrganizationsDirectory: Send + Sync {
    /// Start creating a member account; returns the request id to poll.
    async fn create_account(&self, email: &str, account_name: &str) -> AwsResult<String>;
    async fn create_account_status(&self, request_id: &str) -> AwsResult<CreateAccountStatus>;
    /// Id of the first root of the organization.
    async fn root_id(&self) -> AwsResult<String>;
    async fn describe_organizational_unit(&self, ou_id: &str) -> AwsResult<()>;
    async fn move_account(
        &self,
        account_id: &str,
        source_parent_id: &str,
        destination_parent_id: &str,
    ) -> AwsResult<()>;
    async fn describe_account(&self, account_id: &str) -> AwsResult<CreatedAccount>;
}

pub struct AwsOrganizationsClient {
    client: OrganizationsClient,
}

impl AwsOrganizationsClient {
    pub fn new(client: OrganizationsClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl OrganizationsDirectory for AwsOrganizationsClient {
    async fn create_account(&self, email: &str, account_name: &str) -> AwsResult<String> {
        let response = self
            .client
            .create_account()
            .email(email)
            .account_name(account_name)
            .iam_user_access_to_billing(IamUserAccessToBilling::Deny)
            .send()
            .await
            .map_err(|e| classify("CreateAccount", e))?;

        response
            .create_account_status()
            .and_then(|status| status.id())
            .map(str::to_string)
            .ok_or(AwsError::MissingField {
                operation: "CreateAccount",
                field: "CreateAccountStatus.Id",
            })
    }

    async fn create_account_status(&self, request_id: &str) -> AwsResult<CreateAccountStatus> {
        let response = self
            .client
            .describe_create_account_status()
            .create_account_request_id(request_id)
            .send()
            .await
            .map_err(|e| classify("DescribeCreateAccountStatus", e))?;

        let status = response
            .create_account_status()
            .ok_or(AwsError::MissingField {
                operation: "DescribeCreateAccountStatus",
                field: "CreateAccountStatus",
            })?;

        match status.state() {
            Some(CreateAccountState::Succeeded) => {
                let account_id = status.account_id().ok_or(AwsError::MissingField {
                    operation: "DescribeCreateAccountStatus",
                    field: "CreateAccountStatus.AccountId",
                })?;
                Ok(CreateAccountStatus::Succeeded {
                    account_id: account_id.to_string(),
                })
            }
            Some(CreateAccountState::Failed) => Ok(CreateAccountStatus::Failed {
                reason: status
                    .failure_reason()
                    .map_or_else(|| "unknown".to_string(), |r| r.as_str().to_string()),
            }),
            _ => Ok(CreateAccountStatus::InProgress),
        }
    }

    async fn root_id(&self) -> AwsResult<String> {
        let response = self
            .client
            .list_roots()
            .send()
            .await
            .map_err(|e| classify("ListRoots", e))?;

        response
            .roots()
            .first()
            .and_then(|root| root.id())
            .map(str::to_string)
            .ok_or(AwsError::MissingField {
                operation: "ListRoots",
                field: "Roots[0].Id",
            })
    }

    async fn describe_organizational_unit(&self, ou_id: &str) -> AwsResult<()> {
        self.client
            .describe_organizational_unit()
            .organizational_unit_id(ou_id)
            .send()
            .await
            .map_err(|e| classify("DescribeOrganizationalUnit", e))?;
        Ok(())
    }

    async fn move_account(
        &self,
        account_id: &str,
        source_parent_id: &str,
        destination_parent_id: &str,
    ) -> AwsResult<()> {
        self.client
            .move_account()
            .account_id(account_id)
            .source_parent_id(source_parent_id)
            .destination_parent_id(destination_parent_id)
            .send()
            .await
            .map_err(|e| classify("MoveAccount", e))?;
        Ok(())
    }

    async fn describe_account(&self, account_id: &str) -> AwsResult<CreatedAccount> {
        let response = self
            .client
            .describe_account()
            .account_id(account_id)
            .send()
            .await
            .map_err(|e| classify("DescribeAccount", e))?;

        let account = response.account().ok_or(AwsError::MissingField {
            operation: "DescribeAccount",
            field: "Account",
        })?;

        Ok(CreatedAccount {
            id: account.id().unwrap_or(account_id).to_string(),
            arn: account.arn().map(str::to_string),
            email: account.email().map(str::to_string),
            name: account.name().unwrap_or_default().to_string(),
        })
    }
}
