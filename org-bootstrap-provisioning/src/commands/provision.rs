//! Batch driver: provisions users across every target account.

use log::{error, info};

use super::reconcile::reconcile_user;
use crate::config::ProvisioningSpec;
use crate::confirm::Confirmation;
use crate::error::ProvisioningResult;
use crate::types::{AccountRef, ProvisionedUserResult};

/// Result of a confirmation-gated command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The operator answered "no"; nothing was changed.
    Declined,
    Completed(T),
}

const ACCOUNT_TABLE_RULE: &str = "------------+--------------------";

/// Account list as shown to the operator before provisioning.
pub fn render_account_table(accounts: &[AccountRef]) -> String {
    let mut table = String::new();
    table.push_str(ACCOUNT_TABLE_RULE);
    table.push('\n');
    table.push_str(&format!("{:13}{:20}\n", "Account ID", "Account Name"));
    table.push_str(ACCOUNT_TABLE_RULE);
    table.push('\n');
    for account in accounts {
        table.push_str(&format!("{:13}{:20}\n", account.id, account.name));
    }
    table.push_str(ACCOUNT_TABLE_RULE);
    table
}

impl super::service::ProvisioningService {
    /// Provision every user of `spec` in each account, in input order.
    ///
    /// Failures are logged and dropped: a broker failure skips the account,
    /// a reconcile failure skips the user.
    pub async fn provision_all(
        &self,
        spec: &ProvisioningSpec,
        accounts: &[AccountRef],
    ) -> Vec<ProvisionedUserResult> {
        let mut results = Vec::new();

        for account in accounts {
            info!("Account ID: {}", account.id);

            let credentials = match self.assume_role(&account.id, &spec.account_role).await {
                Ok(credentials) => credentials,
                Err(err) => {
                    error!("Skipping account {}: {err}", account.id);
                    continue;
                }
            };
            let directory = self.directories.directory(&credentials, &spec.region);

            for user_name in spec.strategy.user_names() {
                match reconcile_user(directory.as_ref(), &account.id, &user_name, spec).await {
                    Ok(result) => results.push(result),
                    Err(err) => error!("Skipping user {user_name} in {}: {err}", account.id),
                }
            }
        }

        info!("Provisioned {} user(s)", results.len());
        results
    }

    /// Show the account table, ask the operator, then provision.
    pub async fn provision(
        &self,
        spec: &ProvisioningSpec,
        accounts: &[AccountRef],
        confirmation: &mut dyn Confirmation,
    ) -> ProvisioningResult<Outcome<Vec<ProvisionedUserResult>>> {
        if !confirmation.confirm(&render_account_table(accounts), "Are you OK?")? {
            return Ok(Outcome::Declined);
        }
        Ok(Outcome::Completed(self.provision_all(spec, accounts).await))
    }
}
