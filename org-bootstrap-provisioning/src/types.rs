//! Shared data types: account references, credentials, results and policy documents.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A target account read from the account list file.
///
/// Account files written by `create-accounts` also carry `Arn` and `Email`;
/// those are ignored here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccountRef {
    pub id: String,
    pub name: String,
}

/// Short-lived credentials for one assumed role session.
#[derive(Clone, PartialEq, Eq)]
pub struct TemporaryCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
}

impl fmt::Debug for TemporaryCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemporaryCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"** redacted **")
            .field("session_token", &"** redacted **")
            .finish()
    }
}

/// Login handoff record for one provisioned user.
///
/// The password is kept in clear text: the output file is the handoff to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProvisionedUserResult {
    pub account_id: String,
    pub console_url: String,
    pub user_name: String,
    pub password: String,
}

impl ProvisionedUserResult {
    pub fn new(account_id: &str, user_name: &str, password: String) -> Self {
        Self {
            account_id: account_id.to_string(),
            console_url: console_url(account_id),
            user_name: user_name.to_string(),
            password,
        }
    }
}

/// Console sign-in URL for an account.
pub fn console_url(account_id: &str) -> String {
    format!("https://{account_id}.signin.aws.amazon.com/console")
}

/// One member account to be created in the organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountRequest {
    pub name: String,
    pub mail: String,
    #[serde(rename = "ouid")]
    pub ou_id: Option<String>,
}

/// A member account as described by the organization after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreatedAccount {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Allow,
    Deny,
}

/// A policy field that may hold a single string or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    pub effect: Effect,
    pub action: OneOrMany,
    pub resource: OneOrMany,
}

/// IAM policy document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: String,
    pub statement: Vec<Statement>,
}
