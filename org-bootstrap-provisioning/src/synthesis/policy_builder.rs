//! Policy documents granted to provisioned users.
//!
//! Both documents allow everything, then deny the IAM actions that would let
//! a provisioned user tamper with the cross-account role or with the
//! provisioned identities themselves.

use crate::types::{Effect, OneOrMany, PolicyDocument, Statement};

const POLICY_VERSION: &str = "2012-10-17";

/// Role the shared managed policy protects.
pub const PROTECTED_ROLE: &str = "OrganizationAccountAccessRole";

fn allow_all() -> Statement {
    Statement {
        effect: Effect::Allow,
        action: OneOrMany::One("*".to_string()),
        resource: OneOrMany::One("*".to_string()),
    }
}

/// Inline policy for numbered users: denies every IAM action on the switch
/// role and on every user sharing the prefix.
pub fn inline_user_policy(switch_role: &str, user_name_prefix: &str) -> PolicyDocument {
    PolicyDocument {
        version: POLICY_VERSION.to_string(),
        statement: vec![
            allow_all(),
            Statement {
                effect: Effect::Deny,
                action: OneOrMany::Many(vec!["iam:*".to_string()]),
                resource: OneOrMany::Many(vec![
                    format!("arn:aws:iam::*:role/{switch_role}"),
                    format!("arn:aws:iam::*:user/{user_name_prefix}*"),
                ]),
            },
        ],
    }
}

/// Managed policy for the shared user: denies deleting or updating the
/// protected role, the policy itself and the user.
pub fn managed_user_policy(policy_name: &str, user_name: &str) -> PolicyDocument {
    PolicyDocument {
        version: POLICY_VERSION.to_string(),
        statement: vec![
            allow_all(),
            Statement {
                effect: Effect::Deny,
                action: OneOrMany::Many(vec![
                    "iam:Delete*".to_string(),
                    "iam:Update*".to_string(),
                ]),
                resource: OneOrMany::Many(vec![
                    format!("arn:aws:iam::*:role/{PROTECTED_ROLE}"),
                    format!("arn:aws:iam::*:policy/{policy_name}"),
                    format!("arn:aws:iam::*:user/{user_name}"),
                ]),
            },
        ],
    }
}
