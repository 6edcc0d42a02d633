//! Account creator: creates member accounts and files them under an OU.

use log::{error, info, warn};

use super::provision::Outcome;
use crate::aws::organizations::CreateAccountStatus;
use crate::confirm::Confirmation;
use crate::error::{ProvisioningError, ProvisioningResult};
use crate::types::{AccountRequest, CreatedAccount};

const REQUEST_TABLE_RULE: &str =
    "--------------+---------------------------------------+----------------";

/// Planned account requests as shown to the operator.
pub fn render_request_table(requests: &[AccountRequest]) -> String {
    let mut table = String::new();
    table.push_str(&format!("{:15}{:40}{}\n", "AccountName", "e-mail address", "ouid"));
    table.push_str(REQUEST_TABLE_RULE);
    table.push('\n');
    for request in requests {
        table.push_str(&format!(
            "{:15}{:40}{}\n",
            request.name,
            request.mail,
            request.ou_id.as_deref().unwrap_or("None")
        ));
    }
    table.push_str(REQUEST_TABLE_RULE);
    table
}

impl super::service::ProvisioningService {
    /// Create each requested account; failed requests are logged and skipped.
    pub async fn create_accounts(&self, requests: &[AccountRequest]) -> Vec<CreatedAccount> {
        let mut created = Vec::new();
        for request in requests {
            info!(
                "create account(name={}  email={})",
                request.name, request.mail
            );
            match self.create_account(request).await {
                Ok(account) => created.push(account),
                Err(err) => error!("{err}"),
            }
        }
        created
    }

    /// Show the planned requests, ask the operator, then create the accounts.
    pub async fn create_accounts_confirmed(
        &self,
        requests: &[AccountRequest],
        confirmation: &mut dyn Confirmation,
    ) -> ProvisioningResult<Outcome<Vec<CreatedAccount>>> {
        if !confirmation.confirm(&render_request_table(requests), "Are you OK?")? {
            return Ok(Outcome::Declined);
        }
        Ok(Outcome::Completed(self.create_accounts(requests).await))
    }

    async fn create_account(&self, request: &AccountRequest) -> ProvisioningResult<CreatedAccount> {
        let request_id = self
            .organizations
            .create_account(&request.mail, &request.name)
            .await?;

        let account_id = self.wait_for_account(request_id).await?;

        if let Some(ou_id) = &request.ou_id {
            if let Err(err) = self.move_to_organizational_unit(&account_id, ou_id).await {
                warn!("Could not move account {account_id} to {ou_id}: {err}");
            }
        }

        Ok(self.organizations.describe_account(&account_id).await?)
    }

    /// Poll until the request is terminal.
    ///
    /// The request keeps running on the organization side, so transient
    /// poll failures back off and poll again instead of dropping it.
    async fn wait_for_account(&self, request_id: String) -> ProvisioningResult<String> {
        let mut failures = 0;
        loop {
            tokio::time::sleep(self.poll_interval).await;
            match self.organizations.create_account_status(&request_id).await {
                Ok(CreateAccountStatus::InProgress) => failures = 0,
                Ok(CreateAccountStatus::Succeeded { account_id }) => return Ok(account_id),
                Ok(CreateAccountStatus::Failed { reason }) => {
                    return Err(ProvisioningError::AccountCreation(reason));
                }
                Err(err) if err.is_transient() && failures + 1 < self.retry.max_attempts => {
                    failures += 1;
                    let delay = self.retry.delay_for_attempt(failures);
                    warn!("{err}");
                    info!("Polling request {request_id} again in {delay:?}");
                    tokio::time::sleep(delay).await;
                }
                Err(source) => {
                    return Err(ProvisioningError::AccountStatus { request_id, source });
                }
            }
        }
    }

    async fn move_to_organizational_unit(
        &self,
        account_id: &str,
        ou_id: &str,
    ) -> ProvisioningResult<()> {
        let root_id = self.organizations.root_id().await?;
        self.organizations.describe_organizational_unit(ou_id).await?;
        self.organizations
            .move_account(account_id, &root_id, ou_id)
            .await?;
        info!("  Moved {account_id} from {root_id} to {ou_id}");
        Ok(())
    }
}
