//! Console password generation for provisioned users.

use rand::distributions::Alphanumeric;
use rand::Rng;

/// Length of generated console passwords.
pub const PASSWORD_LENGTH: usize = 8;

/// Generate a console password drawn uniformly from `[A-Za-z0-9]`.
///
/// Kept short and symbol-free so existing handoff sheets stay compatible.
pub fn generate_password() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(PASSWORD_LENGTH)
        .map(char::from)
        .collect()
}
