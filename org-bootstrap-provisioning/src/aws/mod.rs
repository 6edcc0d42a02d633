//! AWS SDK integration: STS role assumption, IAM directory, Organizations.

pub mod iam_client;
pub mod organizations;
pub mod sts;

use aws_sdk_iam::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use thiserror::Error;

/// A failed remote call, classified by how the caller should react.
#[derive(Error, Debug)]
pub enum AwsError {
    /// The addressed resource does not exist.
    #[error("{operation}: not found: {message}")]
    NotFound {
        operation: &'static str,
        message: String,
    },
    /// The resource already exists.
    #[error("{operation}: already exists: {message}")]
    Conflict {
        operation: &'static str,
        message: String,
    },
    /// Throttling, service unavailability or a transport failure.
    #[error("{operation}: transient failure: {message}")]
    Transient {
        operation: &'static str,
        message: String,
    },
    /// Any other error answered by the service.
    #[error("{operation} failed: {message}")]
    Service {
        operation: &'static str,
        code: Option<String>,
        message: String,
    },
    /// The call succeeded but a required field was missing from the response.
    #[error("{operation}: response missing {field}")]
    MissingField {
        operation: &'static str,
        field: &'static str,
    },
}

impl AwsError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }

    /// Service error code, when the service answered with one.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Service { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

pub type AwsResult<T> = Result<T, AwsError>;

const NOT_FOUND_CODES: &[&str] = &[
    "NoSuchEntity",
    "NoSuchEntityException",
    "AccountNotFoundException",
    "OrganizationalUnitNotFoundException",
    "CreateAccountStatusNotFoundException",
    "ParentNotFoundException",
];

const CONFLICT_CODES: &[&str] = &["EntityAlreadyExists", "EntityAlreadyExistsException"];

const TRANSIENT_CODES: &[&str] = &[
    "Throttling",
    "ThrottlingException",
    "TooManyRequestsException",
    "RequestLimitExceeded",
    "ServiceUnavailable",
    "ServiceUnavailableException",
    "ServiceFailure",
    "ServiceException",
    "InternalFailure",
    "IDPCommunicationError",
];

/// Classify a service error code.
pub(crate) fn classify_code(operation: &'static str, code: Option<&str>, message: String) -> AwsError {
    match code {
        Some(c) if NOT_FOUND_CODES.contains(&c) => AwsError::NotFound { operation, message },
        Some(c) if CONFLICT_CODES.contains(&c) => AwsError::Conflict { operation, message },
        Some(c) if TRANSIENT_CODES.contains(&c) => AwsError::Transient { operation, message },
        _ => AwsError::Service {
            operation,
            code: code.map(str::to_string),
            message,
        },
    }
}

/// Convert an SDK error into an [`AwsError`].
///
/// Timeouts and dispatch or response failures never reached a service
/// decision and are always transient.
pub(crate) fn classify<E, R>(operation: &'static str, err: SdkError<E, R>) -> AwsError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let message = DisplayErrorContext(&err).to_string();
    match &err {
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => {
            AwsError::Transient { operation, message }
        }
        _ => classify_code(operation, err.code(), message),
    }
}
