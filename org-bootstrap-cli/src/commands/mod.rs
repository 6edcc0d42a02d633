pub mod create_accounts;
pub mod create_iam_users;
mod output;

use std::io;

use org_bootstrap_provisioning::{AssumeYes, Confirmation, PromptConfirmation};

pub use create_accounts::CreateAccountsCommand;
pub use create_iam_users::CreateIamUsersCommand;

/// How a command finished when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Done,
    Declined,
}

/// Stdin prompt, or an automatic "yes" for `--yes`.
fn confirmation(assume_yes: bool) -> Box<dyn Confirmation> {
    if assume_yes {
        Box::new(AssumeYes)
    } else {
        Box::new(PromptConfirmation::new(io::stdin().lock(), io::stdout()))
    }
}
