//! Credential broker: assumes the administrative role in a member account.

use std::time::Duration;

use log::{debug, info, warn};

use crate::aws::sts::{role_arn, SESSION_NAME};
use crate::aws::AwsError;
use crate::error::{ProvisioningError, ProvisioningResult};
use crate::types::TemporaryCredentials;

/// Bounded exponential backoff for role assumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub multiplier: u32,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 8,
            initial_delay: Duration::from_secs(10),
            multiplier: 2,
            max_delay: Duration::from_secs(120),
        }
    }
}

impl RetryPolicy {
    /// Delay after the given failed attempt (1-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = self
            .multiplier
            .checked_pow(attempt.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.initial_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }
}

/// Whether retrying role assumption may succeed.
///
/// `AccessDenied` is retried: a freshly created account answers it until the
/// administrative role has propagated.
pub(crate) fn is_retryable(err: &AwsError) -> bool {
    err.is_transient() || err.code() == Some("AccessDenied")
}

impl super::service::ProvisioningService {
    /// Obtain temporary credentials for the configured role in `account_id`.
    pub async fn assume_role(
        &self,
        account_id: &str,
        role_name: &str,
    ) -> ProvisioningResult<TemporaryCredentials> {
        let role_arn = role_arn(account_id, role_name);
        debug!("Assuming {role_arn}");

        let mut attempt = 1;
        loop {
            match self.assumer.assume_role(&role_arn, SESSION_NAME).await {
                Ok(credentials) => return Ok(credentials),
                Err(err) if !is_retryable(&err) => {
                    return Err(ProvisioningError::CredentialsRejected {
                        role_arn,
                        source: err,
                    });
                }
                Err(err) if attempt >= self.retry.max_attempts => {
                    return Err(ProvisioningError::CredentialsExhausted {
                        role_arn,
                        attempts: attempt,
                        source: err,
                    });
                }
                Err(err) => {
                    let delay = self.retry.delay_for_attempt(attempt);
                    warn!("{err}");
                    info!(
                        "Retrying in {:?} (attempt {}/{})...",
                        delay,
                        attempt + 1,
                        self.retry.max_attempts
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
