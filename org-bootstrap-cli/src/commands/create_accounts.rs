use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use log::info;
use org_bootstrap_provisioning::{load_json, AccountsConfig, Outcome, ProvisioningService};

use super::output::write_private_json;
use super::{confirmation, Status};

#[derive(Debug, Clone, Args)]
pub struct CreateAccountsCommand {
    #[arg(
        required_unless_present = "skeleton",
        help = "Accounts config file (name head, e-mail parts, number range, OU)"
    )]
    pub accounts_conf: Option<PathBuf>,

    #[arg(short = 'o', long, default_value = "accounts.json", help = "Where to write the created accounts")]
    pub output: PathBuf,

    #[arg(short = 'd', long, help = "Print the planned account requests")]
    pub debug: bool,

    #[arg(short = 's', long, help = "Print a config file template and exit")]
    pub skeleton: bool,

    #[arg(short = 'y', long, help = "Do not ask for confirmation")]
    pub yes: bool,
}

impl CreateAccountsCommand {
    pub async fn execute(self) -> Result<Status> {
        if self.skeleton {
            println!(
                "{}",
                serde_json::to_string_pretty(&AccountsConfig::skeleton())?
            );
            return Ok(Status::Done);
        }

        let path = self
            .accounts_conf
            .as_deref()
            .context("ACCOUNTS_CONF is required")?;
        let config = AccountsConfig::from_value(&load_json(path).await?)?;
        let requests = config.account_requests()?;

        if self.debug {
            println!("{}", serde_json::to_string_pretty(&requests)?);
        }

        let service = ProvisioningService::new().await;
        let mut confirmation = confirmation(self.yes);
        match service
            .create_accounts_confirmed(&requests, confirmation.as_mut())
            .await?
        {
            Outcome::Declined => Ok(Status::Declined),
            Outcome::Completed(accounts) => {
                write_private_json(&self.output, &accounts).await?;
                info!(
                    "Wrote {} account(s) to {}",
                    accounts.len(),
                    self.output.display()
                );
                Ok(Status::Done)
            }
        }
    }
}
