use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use crate::commands::{CreateAccountsCommand, CreateIamUsersCommand, Status};

#[derive(Debug, Clone, Parser)]
#[command(
    name = "org-bootstrap",
    version,
    about = "Create member accounts and provision IAM users across an AWS organization",
    long_about = None
)]
pub struct Cli {
    #[arg(short = 'v', long, global = true, action = ArgAction::Count, conflicts_with = "quiet", help = "Increase verbosity (-v debug, -vv trace)")]
    pub verbose: u8,

    #[arg(short = 'q', long, global = true, help = "Only print warnings and errors")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    #[command(about = "Create member accounts in the organization and move them into an OU")]
    CreateAccounts(CreateAccountsCommand),
    #[command(
        about = "Create or replace IAM users with console logins in every listed account"
    )]
    CreateIamUsers(CreateIamUsersCommand),
}

impl Cli {
    pub async fn execute(self) -> Result<Status> {
        match self.command {
            Commands::CreateAccounts(cmd) => cmd.execute().await,
            Commands::CreateIamUsers(cmd) => cmd.execute().await,
        }
    }
}
