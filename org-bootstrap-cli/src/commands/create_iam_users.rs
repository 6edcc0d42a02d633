use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use log::info;
use org_bootstrap_provisioning::{
    load_json, AccountRef, Outcome, ProvisioningService, ProvisioningSpec,
};

use super::output::write_private_json;
use super::{confirmation, Status};

pub const DEFAULT_CONFIG_FILE: &str = "create_iamuser_config.json";
pub const DEFAULT_OUTPUT_FILE: &str = "iamuserlogin.json";

#[derive(Debug, Clone, Args)]
pub struct CreateIamUsersCommand {
    #[arg(
        required_unless_present = "skeleton",
        help = "JSON list of target accounts ([{\"Id\": ..., \"Name\": ...}])"
    )]
    pub account_json: Option<PathBuf>,

    #[arg(
        short = 'c',
        long,
        env = "ORG_BOOTSTRAP_IAM_USER_CONFIG",
        default_value = DEFAULT_CONFIG_FILE,
        help = "Provisioning config file"
    )]
    pub config: PathBuf,

    #[arg(short = 'o', long, default_value = DEFAULT_OUTPUT_FILE, help = "Where to write the login sheet")]
    pub output: PathBuf,

    #[arg(short = 'd', long, help = "Print the parsed input files")]
    pub debug: bool,

    #[arg(short = 's', long, help = "Print a config file template and exit")]
    pub skeleton: bool,

    #[arg(short = 'y', long, help = "Do not ask for confirmation")]
    pub yes: bool,
}

impl CreateIamUsersCommand {
    pub async fn execute(self) -> Result<Status> {
        if self.skeleton {
            println!(
                "{}",
                serde_json::to_string_pretty(&ProvisioningSpec::skeleton())?
            );
            return Ok(Status::Done);
        }

        let config = load_json(&self.config).await?;
        let spec = ProvisioningSpec::from_value(&config)?;

        let account_json = self
            .account_json
            .as_deref()
            .context("ACCOUNT_JSON is required")?;
        let accounts = load_accounts(account_json).await?;

        if self.debug {
            println!("{}", serde_json::to_string_pretty(&config)?);
            println!("{}", serde_json::to_string_pretty(&accounts)?);
        }

        let service = ProvisioningService::new().await;
        let mut confirmation = confirmation(self.yes);
        match service
            .provision(&spec, &accounts, confirmation.as_mut())
            .await?
        {
            Outcome::Declined => Ok(Status::Declined),
            Outcome::Completed(results) => {
                write_private_json(&self.output, &results).await?;
                info!(
                    "Wrote {} login(s) to {}",
                    results.len(),
                    self.output.display()
                );
                Ok(Status::Done)
            }
        }
    }
}

async fn load_accounts(path: &Path) -> Result<Vec<AccountRef>> {
    let value = load_json(path).await?;
    serde_json::from_value(value)
        .with_context(|| format!("{} is not a list of accounts", path.display()))
}
