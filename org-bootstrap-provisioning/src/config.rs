//! JSON configuration: loading, presence validation and strategy selection.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::fs;

use crate::error::{ProvisioningError, ProvisioningResult};
use crate::types::AccountRequest;

const REQUIRED_KEYS: [&str; 3] = ["AccountRole", "Region", "Iam"];
const REQUIRED_IAM_KEYS: [&str; 2] = ["PolicyName", "UserName"];
const RANGE_KEYS: [&str; 2] = ["Min", "Max"];

/// Read and parse a JSON file.
pub async fn load_json(path: impl AsRef<Path>) -> ProvisioningResult<Value> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .await
        .map_err(|source| ProvisioningError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    serde_json::from_str(&content).map_err(|source| ProvisioningError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Which users are provisioned in every account, and with which kind of policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisioningStrategy {
    /// Users `{prefix}{i:02}` for `i` in `min..=max`, each with an inline policy.
    InlinePolicy { prefix: String, min: u32, max: u32 },
    /// One user sharing a managed policy.
    ManagedPolicy { user_name: String },
}

impl ProvisioningStrategy {
    /// User names in provisioning order, produced lazily.
    pub fn user_names(&self) -> impl Iterator<Item = String> + '_ {
        let (numbered, shared) = match self {
            Self::InlinePolicy { prefix, min, max } => (
                Some((*min..=*max).map(move |i| numbered_user_name(prefix, i))),
                None,
            ),
            Self::ManagedPolicy { user_name } => (None, Some(user_name.clone())),
        };
        numbered.into_iter().flatten().chain(shared)
    }
}

/// Zero-pads to two digits; wider numbers are kept whole.
pub(crate) fn numbered_user_name(prefix: &str, i: u32) -> String {
    format!("{prefix}{i:02}")
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawSpec {
    account_role: String,
    region: String,
    iam: RawIam,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawIam {
    policy_name: String,
    user_name: String,
    min: Option<u32>,
    max: Option<u32>,
}

/// Desired state for IAM provisioning across the target accounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningSpec {
    /// Role assumable in every target account.
    pub account_role: String,
    pub region: String,
    pub policy_name: String,
    pub strategy: ProvisioningStrategy,
}

impl ProvisioningSpec {
    /// Validate presence of every required key, then parse.
    ///
    /// All missing keys are collected before failing so the operator can fix
    /// the file in one pass.
    pub fn from_value(value: &Value) -> ProvisioningResult<Self> {
        let missing = missing_keys(value);
        if !missing.is_empty() {
            return Err(ProvisioningError::MissingKeys(missing));
        }

        let raw: RawSpec = serde_json::from_value(value.clone())
            .map_err(|e| ProvisioningError::invalid_config(e.to_string()))?;

        let strategy = match (raw.iam.min, raw.iam.max) {
            (Some(min), Some(max)) => {
                if u64::from(min) > u64::from(max) + 1 {
                    return Err(ProvisioningError::invalid_config(format!(
                        "\"Min\" ({min}) must not exceed \"Max\" ({max}) + 1"
                    )));
                }
                ProvisioningStrategy::InlinePolicy {
                    prefix: raw.iam.user_name,
                    min,
                    max,
                }
            }
            _ => ProvisioningStrategy::ManagedPolicy {
                user_name: raw.iam.user_name,
            },
        };

        Ok(Self {
            account_role: raw.account_role,
            region: raw.region,
            policy_name: raw.iam.policy_name,
            strategy,
        })
    }

    /// Template printed by `--skeleton`.
    pub fn skeleton() -> Value {
        json!({
            "AccountRole": "OrganizationAccountAccessRole",
            "Region": "ap-northeast-1",
            "Iam": {
                "PolicyName": "HandsonIamUserPolicy",
                "UserName": "user",
                "Min": 1,
                "Max": 1
            }
        })
    }
}

/// Diagnostics for every required key absent from a provisioning config.
fn missing_keys(value: &Value) -> Vec<String> {
    let mut missing: Vec<String> = REQUIRED_KEYS
        .iter()
        .filter(|key| value.get(**key).is_none())
        .map(|key| format!("Not found \"{key}\""))
        .collect();

    if let Some(iam) = value.get("Iam") {
        missing.extend(
            REQUIRED_IAM_KEYS
                .iter()
                .filter(|key| iam.get(**key).is_none())
                .map(|key| format!("Not found \"{key}\" in \"Iam\"")),
        );

        // Min and Max come as a pair: one without the other is incomplete.
        let present = RANGE_KEYS.iter().filter(|key| iam.get(**key).is_some()).count();
        if present == 1 {
            missing.extend(
                RANGE_KEYS
                    .iter()
                    .filter(|key| iam.get(**key).is_none())
                    .map(|key| format!("Not found \"{key}\" in \"Iam\"")),
            );
        }
    }

    missing
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailConfig {
    pub local: String,
    pub domain: String,
    #[serde(rename = "ailias")]
    pub alias: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberRange {
    pub min: u32,
    pub max: u32,
}

/// Input of `create-accounts`: a numbered series of member accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountsConfig {
    #[serde(rename = "AccountNameHead")]
    pub account_name_head: String,
    #[serde(rename = "OuId", default)]
    pub ou_id: Option<String>,
    pub email: EmailConfig,
    pub number: NumberRange,
}

impl AccountsConfig {
    pub fn from_value(value: &Value) -> ProvisioningResult<Self> {
        serde_json::from_value(value.clone())
            .map_err(|e| ProvisioningError::invalid_config(e.to_string()))
    }

    /// Expand the numbered range into one request per account.
    ///
    /// Mail addresses use plus-addressing so every account gets a distinct
    /// root address delivered to the same mailbox.
    pub fn account_requests(&self) -> ProvisioningResult<Vec<AccountRequest>> {
        let NumberRange { min, max } = self.number;
        if u64::from(min) > u64::from(max) + 1
            || self.email.local.is_empty()
            || self.email.alias.is_empty()
            || self.email.domain.is_empty()
        {
            return Err(ProvisioningError::invalid_config(
                "invalid accounts configuration: check \"number\" range and \"email\" fields",
            ));
        }

        Ok((min..=max)
            .map(|i| AccountRequest {
                name: format!("{}{i:03}", self.account_name_head),
                mail: format!(
                    "{}+{}{i:03}@{}",
                    self.email.local, self.email.alias, self.email.domain
                ),
                ou_id: self.ou_id.clone(),
            })
            .collect())
    }

    /// Template printed by `--skeleton`.
    pub fn skeleton() -> Value {
        json!({
            "AccountNameHead": "Workshop",
            "OuId": "ou-xxxx-xxxxxxxx",
            "email": {
                "local": "MailAccount",
                "domain": "Mail.domain.com",
                "ailias": "workshop"
            },
            "number": {
                "min": 0,
                "max": 10
            }
        })
    }
}
