//! Provisioning Service Layer
//!
//! The service holds the AWS clients and provides the high-level operations
//! (assume role, provision users, create accounts) used by the CLI.

use std::time::Duration;

use aws_config::{BehaviorVersion, Region};
use aws_sdk_organizations::Client as OrganizationsClient;
use aws_sdk_sts::Client as StsClient;
use log::debug;

use super::broker::RetryPolicy;
use crate::aws::iam_client::{AwsDirectoryFactory, DirectoryFactory};
use crate::aws::organizations::{AwsOrganizationsClient, OrganizationsDirectory};
use crate::aws::sts::{RoleAssumer, StsRoleAssumer};

/// Region used for the global STS and Organizations endpoints when none is configured.
const DEFAULT_AWS_REGION: &str = "us-east-1";

/// Interval between `DescribeCreateAccountStatus` polls.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Main service struct that holds AWS clients and provides business logic operations
pub struct ProvisioningService {
    pub(crate) assumer: Box<dyn RoleAssumer>,
    pub(crate) directories: Box<dyn DirectoryFactory>,
    pub(crate) organizations: Box<dyn OrganizationsDirectory>,
    pub(crate) retry: RetryPolicy,
    pub(crate) poll_interval: Duration,
}

impl ProvisioningService {
    /// Create a new service instance with AWS clients
    ///
    /// Configuration comes from the standard credential provider chain of
    /// the management account; the region falls back to us-east-1.
    pub async fn new() -> Self {
        let loaded = aws_config::defaults(BehaviorVersion::latest()).load().await;
        let config = if loaded.region().is_some() {
            loaded
        } else {
            debug!("No region configured, using default {DEFAULT_AWS_REGION}");
            aws_config::defaults(BehaviorVersion::latest())
                .region(Region::new(DEFAULT_AWS_REGION))
                .load()
                .await
        };

        Self::with_clients(
            Box::new(StsRoleAssumer::new(StsClient::new(&config))),
            Box::new(AwsDirectoryFactory),
            Box::new(AwsOrganizationsClient::new(OrganizationsClient::new(
                &config,
            ))),
        )
    }

    /// Assemble a service from explicit collaborators.
    pub fn with_clients(
        assumer: Box<dyn RoleAssumer>,
        directories: Box<dyn DirectoryFactory>,
        organizations: Box<dyn OrganizationsDirectory>,
    ) -> Self {
        Self {
            assumer,
            directories,
            organizations,
            retry: RetryPolicy::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    // assume_role() is in broker.rs
    // provision_all() and provision() are in provision.rs
    // create_accounts() is in accounts.rs
}
