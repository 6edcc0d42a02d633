//! In-memory fakes of the AWS collaborators for unit tests.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::aws::iam_client::{DirectoryFactory, IamDirectory};
use crate::aws::organizations::{CreateAccountStatus, OrganizationsDirectory};
use crate::aws::sts::RoleAssumer;
use crate::aws::{classify_code, AwsError, AwsResult};
use crate::commands::{ProvisioningService, RetryPolicy};
use crate::confirm::Confirmation;
use crate::error::ProvisioningResult;
use crate::types::{CreatedAccount, PolicyDocument, TemporaryCredentials};

fn not_found(operation: &'static str, what: &str) -> AwsError {
    classify_code(operation, Some("NoSuchEntity"), format!("{what} not found"))
}

fn already_exists(operation: &'static str, what: &str) -> AwsError {
    classify_code(operation, Some("EntityAlreadyExists"), format!("{what} exists"))
}

fn delete_conflict(operation: &'static str, what: &str) -> AwsError {
    classify_code(
        operation,
        Some("DeleteConflict"),
        format!("{what} has dependent entities"),
    )
}

// ---------------------------------------------------------------------------
// STS

#[derive(Default)]
struct AssumerState {
    calls: Vec<(String, String)>,
    transient: BTreeMap<String, u32>,
    rejected: BTreeSet<String>,
}

/// Hands out credentials whose access key id is the account id.
#[derive(Clone, Default)]
pub(crate) struct FakeAssumer {
    state: Arc<Mutex<AssumerState>>,
}

impl FakeAssumer {
    pub fn calls(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Fail the next `times` attempts for `account_id` with throttling.
    pub fn fail_transiently(&self, account_id: &str, times: u32) {
        self.state
            .lock()
            .unwrap()
            .transient
            .insert(account_id.to_string(), times);
    }

    pub fn reject(&self, account_id: &str) {
        self.state
            .lock()
            .unwrap()
            .rejected
            .insert(account_id.to_string());
    }
}

#[async_trait]
impl RoleAssumer for FakeAssumer {
    async fn assume_role(
        &self,
        role_arn: &str,
        session_name: &str,
    ) -> AwsResult<TemporaryCredentials> {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push((role_arn.to_string(), session_name.to_string()));

        let account_id = role_arn.split(':').nth(4).unwrap_or_default().to_string();
        if state.rejected.contains(&account_id) {
            return Err(classify_code(
                "AssumeRole",
                Some("InvalidClientTokenId"),
                "The security token included in the request is invalid".to_string(),
            ));
        }
        if let Some(remaining) = state.transient.get_mut(&account_id) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(classify_code(
                    "AssumeRole",
                    Some("Throttling"),
                    "Rate exceeded".to_string(),
                ));
            }
        }

        Ok(TemporaryCredentials {
            access_key_id: account_id,
            secret_access_key: "secret".to_string(),
            session_token: "token".to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// IAM

/// Snapshot of one account's IAM resources.
#[derive(Debug, Clone, Default)]
pub(crate) struct IamState {
    pub users: BTreeSet<String>,
    pub login_profiles: BTreeMap<String, String>,
    /// Keyed by (user name, policy name).
    pub inline_policies: BTreeMap<(String, String), PolicyDocument>,
    /// Keyed by policy ARN.
    pub managed_policies: BTreeMap<String, PolicyDocument>,
    /// (user name, policy ARN) pairs.
    pub attachments: BTreeSet<(String, String)>,
}

struct Failure {
    operation: &'static str,
    target: Option<String>,
    code: &'static str,
}

#[derive(Default)]
struct IamInner {
    resources: IamState,
    calls: Vec<String>,
    failures: Vec<Failure>,
}

impl IamInner {
    /// Record the call and return an injected failure, if any.
    fn enter(&mut self, operation: &'static str, args: &[&str]) -> AwsResult<()> {
        let mut call = operation.to_string();
        for arg in args {
            call.push(' ');
            call.push_str(arg);
        }
        self.calls.push(call);

        let target = args.first().copied();
        match self.failures.iter().find(|f| {
            f.operation == operation && f.target.as_deref().map_or(true, |t| Some(t) == target)
        }) {
            Some(failure) => Err(classify_code(
                operation,
                Some(failure.code),
                format!("injected {}", failure.code),
            )),
            None => Ok(()),
        }
    }
}

/// IAM of a single account, with the dependency rules the real service enforces.
#[derive(Clone)]
pub(crate) struct FakeIam {
    account_id: String,
    inner: Arc<Mutex<IamInner>>,
}

impl FakeIam {
    pub fn new(account_id: &str) -> Self {
        Self {
            account_id: account_id.to_string(),
            inner: Arc::default(),
        }
    }

    pub fn state(&self) -> IamState {
        self.inner.lock().unwrap().resources.clone()
    }

    pub fn calls(&self) -> Vec<String> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn seed_user(&self, user_name: &str, password: Option<&str>) {
        let mut inner = self.inner.lock().unwrap();
        inner.resources.users.insert(user_name.to_string());
        if let Some(password) = password {
            inner
                .resources
                .login_profiles
                .insert(user_name.to_string(), password.to_string());
        }
    }

    /// Make every call to `operation` fail with `code`.
    pub fn fail(&self, operation: &'static str, code: &'static str) {
        self.inner.lock().unwrap().failures.push(Failure {
            operation,
            target: None,
            code,
        });
    }

    /// Make calls to `operation` for `user_name` fail with `code`.
    pub fn fail_for_user(&self, operation: &'static str, user_name: &str, code: &'static str) {
        self.inner.lock().unwrap().failures.push(Failure {
            operation,
            target: Some(user_name.to_string()),
            code,
        });
    }
}

#[async_trait]
impl IamDirectory for FakeIam {
    async fn create_user(&self, user_name: &str) -> AwsResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.enter("CreateUser", &[user_name])?;
        if !inner.resources.users.insert(user_name.to_string()) {
            return Err(already_exists("CreateUser", user_name));
        }
        Ok(())
    }

    async fn delete_user(&self, user_name: &str) -> AwsResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.enter("DeleteUser", &[user_name])?;
        let resources = &mut inner.resources;
        if !resources.users.contains(user_name) {
            return Err(not_found("DeleteUser", user_name));
        }
        let has_dependents = resources.login_profiles.contains_key(user_name)
            || resources.inline_policies.keys().any(|(u, _)| u == user_name)
            || resources.attachments.iter().any(|(u, _)| u == user_name);
        if has_dependents {
            return Err(delete_conflict("DeleteUser", user_name));
        }
        resources.users.remove(user_name);
        Ok(())
    }

    async fn create_login_profile(&self, user_name: &str, password: &str) -> AwsResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.enter("CreateLoginProfile", &[user_name])?;
        let resources = &mut inner.resources;
        if !resources.users.contains(user_name) {
            return Err(not_found("CreateLoginProfile", user_name));
        }
        if resources.login_profiles.contains_key(user_name) {
            return Err(already_exists("CreateLoginProfile", user_name));
        }
        resources
            .login_profiles
            .insert(user_name.to_string(), password.to_string());
        Ok(())
    }

    async fn delete_login_profile(&self, user_name: &str) -> AwsResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.enter("DeleteLoginProfile", &[user_name])?;
        match inner.resources.login_profiles.remove(user_name) {
            Some(_) => Ok(()),
            None => Err(not_found("DeleteLoginProfile", user_name)),
        }
    }

    async fn put_user_policy(
        &self,
        user_name: &str,
        policy_name: &str,
        policy_document: &PolicyDocument,
    ) -> AwsResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.enter("PutUserPolicy", &[user_name, policy_name])?;
        let resources = &mut inner.resources;
        if !resources.users.contains(user_name) {
            return Err(not_found("PutUserPolicy", user_name));
        }
        resources.inline_policies.insert(
            (user_name.to_string(), policy_name.to_string()),
            policy_document.clone(),
        );
        Ok(())
    }

    async fn delete_user_policy(&self, user_name: &str, policy_name: &str) -> AwsResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.enter("DeleteUserPolicy", &[user_name, policy_name])?;
        let key = (user_name.to_string(), policy_name.to_string());
        match inner.resources.inline_policies.remove(&key) {
            Some(_) => Ok(()),
            None => Err(not_found("DeleteUserPolicy", policy_name)),
        }
    }

    async fn create_policy(
        &self,
        policy_name: &str,
        policy_document: &PolicyDocument,
    ) -> AwsResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.enter("CreatePolicy", &[policy_name])?;
        let arn = format!("arn:aws:iam::{}:policy/{policy_name}", self.account_id);
        if inner.resources.managed_policies.contains_key(&arn) {
            return Err(already_exists("CreatePolicy", &arn));
        }
        inner
            .resources
            .managed_policies
            .insert(arn, policy_document.clone());
        Ok(())
    }

    async fn delete_policy(&self, policy_arn: &str) -> AwsResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.enter("DeletePolicy", &[policy_arn])?;
        let resources = &mut inner.resources;
        if !resources.managed_policies.contains_key(policy_arn) {
            return Err(not_found("DeletePolicy", policy_arn));
        }
        if resources.attachments.iter().any(|(_, arn)| arn == policy_arn) {
            return Err(delete_conflict("DeletePolicy", policy_arn));
        }
        resources.managed_policies.remove(policy_arn);
        Ok(())
    }

    async fn attach_user_policy(&self, user_name: &str, policy_arn: &str) -> AwsResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.enter("AttachUserPolicy", &[user_name, policy_arn])?;
        let resources = &mut inner.resources;
        if !resources.users.contains(user_name) {
            return Err(not_found("AttachUserPolicy", user_name));
        }
        if !resources.managed_policies.contains_key(policy_arn) {
            return Err(not_found("AttachUserPolicy", policy_arn));
        }
        resources
            .attachments
            .insert((user_name.to_string(), policy_arn.to_string()));
        Ok(())
    }

    async fn detach_user_policy(&self, user_name: &str, policy_arn: &str) -> AwsResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.enter("DetachUserPolicy", &[user_name, policy_arn])?;
        let key = (user_name.to_string(), policy_arn.to_string());
        if inner.resources.attachments.remove(&key) {
            Ok(())
        } else {
            Err(not_found("DetachUserPolicy", policy_arn))
        }
    }
}

#[derive(Default)]
struct FactoryState {
    accounts: BTreeMap<String, FakeIam>,
    regions: Vec<String>,
}

/// Routes credentials to the [`FakeIam`] of the account they were issued for.
#[derive(Clone, Default)]
pub(crate) struct FakeDirectoryFactory {
    state: Arc<Mutex<FactoryState>>,
}

impl FakeDirectoryFactory {
    pub fn iam(&self, account_id: &str) -> FakeIam {
        self.state
            .lock()
            .unwrap()
            .accounts
            .entry(account_id.to_string())
            .or_insert_with(|| FakeIam::new(account_id))
            .clone()
    }

    /// Region of every directory handed out, in order.
    pub fn regions(&self) -> Vec<String> {
        self.state.lock().unwrap().regions.clone()
    }
}

impl DirectoryFactory for FakeDirectoryFactory {
    fn directory(
        &self,
        credentials: &TemporaryCredentials,
        region: &str,
    ) -> Box<dyn IamDirectory> {
        self.state.lock().unwrap().regions.push(region.to_string());
        Box::new(self.iam(&credentials.access_key_id))
    }
}

// ---------------------------------------------------------------------------
// Organizations

struct PendingRequest {
    name: String,
    email: String,
    polls: u32,
}

struct OrganizationsState {
    next_account: u64,
    polls_before_success: u32,
    status_polls: u32,
    /// Error code returned by the next status polls, and how many of them.
    status_failures: Option<(&'static str, u32)>,
    requests: BTreeMap<String, PendingRequest>,
    failing: BTreeMap<String, String>,
    rejected: BTreeSet<String>,
    organizational_units: BTreeSet<String>,
    accounts: BTreeMap<String, CreatedAccount>,
    moves: Vec<(String, String, String)>,
}

impl Default for OrganizationsState {
    fn default() -> Self {
        Self {
            next_account: 100_000_000_000,
            polls_before_success: 1,
            status_polls: 0,
            status_failures: None,
            requests: BTreeMap::new(),
            failing: BTreeMap::new(),
            rejected: BTreeSet::new(),
            organizational_units: BTreeSet::new(),
            accounts: BTreeMap::new(),
            moves: Vec::new(),
        }
    }
}

#[derive(Clone, Default)]
pub(crate) struct FakeOrganizations {
    state: Arc<Mutex<OrganizationsState>>,
}

impl FakeOrganizations {
    /// Report success on the `polls`-th status poll of each request.
    pub fn set_polls_before_success(&self, polls: u32) {
        self.state.lock().unwrap().polls_before_success = polls;
    }

    pub fn status_polls(&self) -> u32 {
        self.state.lock().unwrap().status_polls
    }

    /// Answer the next `times` status polls with `code`.
    pub fn fail_status_polls(&self, code: &'static str, times: u32) {
        self.state.lock().unwrap().status_failures = Some((code, times));
    }

    pub fn add_organizational_unit(&self, ou_id: &str) {
        self.state
            .lock()
            .unwrap()
            .organizational_units
            .insert(ou_id.to_string());
    }

    /// Accept the request for `name` but report it as failed.
    pub fn fail_creation(&self, name: &str, reason: &str) {
        self.state
            .lock()
            .unwrap()
            .failing
            .insert(name.to_string(), reason.to_string());
    }

    /// Refuse `CreateAccount` for `name` outright.
    pub fn reject_request(&self, name: &str) {
        self.state
            .lock()
            .unwrap()
            .rejected
            .insert(name.to_string());
    }

    pub fn moves(&self) -> Vec<(String, String, String)> {
        self.state.lock().unwrap().moves.clone()
    }

    /// Names of every accepted `CreateAccount` request.
    pub fn created(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .requests
            .values()
            .map(|r| r.name.clone())
            .collect()
    }
}

#[async_trait]
impl OrganizationsDirectory for FakeOrganizations {
    async fn create_account(&self, email: &str, account_name: &str) -> AwsResult<String> {
        let mut state = self.state.lock().unwrap();
        if state.rejected.contains(account_name) {
            return Err(classify_code(
                "CreateAccount",
                Some("ConstraintViolationException"),
                "account limit exceeded".to_string(),
            ));
        }
        let request_id = format!("car-{}", state.requests.len());
        state.requests.insert(
            request_id.clone(),
            PendingRequest {
                name: account_name.to_string(),
                email: email.to_string(),
                polls: 0,
            },
        );
        Ok(request_id)
    }

    async fn create_account_status(&self, request_id: &str) -> AwsResult<CreateAccountStatus> {
        let mut guard = self.state.lock().unwrap();
        let state = &mut *guard;
        state.status_polls += 1;
        if let Some((code, remaining)) = state.status_failures.as_mut() {
            if *remaining > 0 {
                *remaining -= 1;
                let code: &'static str = *code;
                return Err(classify_code(
                    "DescribeCreateAccountStatus",
                    Some(code),
                    format!("injected {code}"),
                ));
            }
        }
        let Some(request) = state.requests.get_mut(request_id) else {
            return Err(classify_code(
                "DescribeCreateAccountStatus",
                Some("CreateAccountStatusNotFoundException"),
                request_id.to_string(),
            ));
        };
        request.polls += 1;

        if let Some(reason) = state.failing.get(&request.name) {
            return Ok(CreateAccountStatus::Failed {
                reason: reason.clone(),
            });
        }
        if request.polls < state.polls_before_success {
            return Ok(CreateAccountStatus::InProgress);
        }

        let account_id = state.next_account.to_string();
        state.next_account += 1;
        state.accounts.insert(
            account_id.clone(),
            CreatedAccount {
                id: account_id.clone(),
                arn: Some(format!(
                    "arn:aws:organizations::000000000000:account/o-example/{account_id}"
                )),
                email: Some(request.email.clone()),
                name: request.name.clone(),
            },
        );
        Ok(CreateAccountStatus::Succeeded { account_id })
    }

    async fn root_id(&self) -> AwsResult<String> {
        Ok("r-root".to_string())
    }

    async fn describe_organizational_unit(&self, ou_id: &str) -> AwsResult<()> {
        if self
            .state
            .lock()
            .unwrap()
            .organizational_units
            .contains(ou_id)
        {
            Ok(())
        } else {
            Err(classify_code(
                "DescribeOrganizationalUnit",
                Some("OrganizationalUnitNotFoundException"),
                ou_id.to_string(),
            ))
        }
    }

    async fn move_account(
        &self,
        account_id: &str,
        source_parent_id: &str,
        destination_parent_id: &str,
    ) -> AwsResult<()> {
        self.state.lock().unwrap().moves.push((
            account_id.to_string(),
            source_parent_id.to_string(),
            destination_parent_id.to_string(),
        ));
        Ok(())
    }

    async fn describe_account(&self, account_id: &str) -> AwsResult<CreatedAccount> {
        self.state
            .lock()
            .unwrap()
            .accounts
            .get(account_id)
            .cloned()
            .ok_or_else(|| {
                classify_code(
                    "DescribeAccount",
                    Some("AccountNotFoundException"),
                    account_id.to_string(),
                )
            })
    }
}

// ---------------------------------------------------------------------------
// Confirmation and service assembly

/// Gives a fixed answer and remembers what it was shown.
pub(crate) struct ScriptedConfirmation {
    answer: bool,
    summaries: Vec<String>,
}

impl ScriptedConfirmation {
    pub fn new(answer: bool) -> Self {
        Self {
            answer,
            summaries: Vec::new(),
        }
    }

    pub fn summaries(&self) -> &[String] {
        &self.summaries
    }
}

impl Confirmation for ScriptedConfirmation {
    fn confirm(&mut self, summary: &str, _question: &str) -> ProvisioningResult<bool> {
        self.summaries.push(summary.to_string());
        Ok(self.answer)
    }
}

fn instant_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        initial_delay: Duration::ZERO,
        multiplier: 2,
        max_delay: Duration::ZERO,
    }
}

/// A service wired to `assumer` and fresh fakes, with no waiting.
pub(crate) fn service(assumer: FakeAssumer) -> ProvisioningService {
    ProvisioningService::with_clients(
        Box::new(assumer),
        Box::new(FakeDirectoryFactory::default()),
        Box::new(FakeOrganizations::default()),
    )
    .with_retry_policy(instant_retry())
    .with_poll_interval(Duration::ZERO)
}

/// A service together with handles on every fake behind it.
pub(crate) struct Fixture {
    pub service: ProvisioningService,
    pub assumer: FakeAssumer,
    pub directories: FakeDirectoryFactory,
    pub organizations: FakeOrganizations,
}

impl Fixture {
    pub fn new() -> Self {
        let assumer = FakeAssumer::default();
        let directories = FakeDirectoryFactory::default();
        let organizations = FakeOrganizations::default();
        let service = ProvisioningService::with_clients(
            Box::new(assumer.clone()),
            Box::new(directories.clone()),
            Box::new(organizations.clone()),
        )
        .with_retry_policy(instant_retry())
        .with_poll_interval(Duration::ZERO);
        Self {
            service,
            assumer,
            directories,
            organizations,
        }
    }
}
