// crates/stackctl-core/src/error.rs
// ============================================================================
// Module: Stack Errors
// Description: Error taxonomy for stack operations.
// Purpose: Classify CloudFormation service failures into matchable variants.
// Dependencies: aws-sdk-cloudformation, thiserror
// ============================================================================

//! ## Overview
//! CloudFormation reports most client-side failures as `ValidationError`
//! with a free-form message. [`classify_sdk_error`] maps the well-known
//! messages onto dedicated variants so callers never match on strings.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::error::Error as StdError;
use std::fmt;

use aws_sdk_cloudformation::error::DisplayErrorContext;
use aws_sdk_cloudformation::error::ProvideErrorMetadata;
use aws_sdk_cloudformation::error::SdkError;
use thiserror::Error;

use crate::parameters::ParameterError;
use crate::template::TemplateError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Error code used by CloudFormation for request validation failures.
const VALIDATION_ERROR_CODE: &str = "ValidationError";
/// Message fragment returned when an update carries no changes.
const NO_UPDATES_FRAGMENT: &str = "No updates are to be performed";
/// Message fragment returned for unknown stacks.
const NOT_FOUND_FRAGMENT: &str = "does not exist";
/// Error code returned when creating a stack that already exists.
const ALREADY_EXISTS_CODE: &str = "AlreadyExistsException";
/// Error code returned when required capabilities are not acknowledged.
const INSUFFICIENT_CAPABILITIES_CODE: &str = "InsufficientCapabilitiesException";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Stack operation failures.
#[derive(Debug, Error)]
pub enum StackError {
    /// Template could not be loaded or parsed.
    #[error(transparent)]
    Template(#[from] TemplateError),
    /// Parameters could not be resolved.
    #[error(transparent)]
    Parameters(#[from] ParameterError),
    /// The stack does not exist.
    #[error("stack {0} does not exist")]
    NotFound(String),
    /// The stack already exists.
    #[error("stack {0} already exists")]
    AlreadyExists(String),
    /// The update carried no changes.
    #[error("stack {0} has no updates to perform")]
    NoUpdates(String),
    /// The template requires capabilities that were not acknowledged.
    #[error("insufficient capabilities: {0}")]
    InsufficientCapabilities(String),
    /// Any other service-reported error.
    #[error("{operation} failed with {code}: {message}")]
    Service {
        /// Operation that failed.
        operation: StackOperation,
        /// Service error code.
        code: String,
        /// Service error message.
        message: String,
    },
    /// The request never produced a service response (connect, timeout, parse).
    #[error("{operation} transport failure: {message}")]
    Transport {
        /// Operation that failed.
        operation: StackOperation,
        /// Rendered error chain.
        message: String,
    },
    /// The stack did not reach a stable status within the polling budget.
    #[error("stack {stack} still {status} after {attempts} status checks")]
    WaitTimeout {
        /// Stack name.
        stack: String,
        /// Last observed status.
        status: String,
        /// Number of status checks performed.
        attempts: u32,
    },
    /// The service response was missing a required field.
    #[error("{operation} returned an incomplete response: missing {field}")]
    IncompleteResponse {
        /// Operation that returned the response.
        operation: StackOperation,
        /// Missing field name.
        field: &'static str,
    },
}

impl StackError {
    /// Returns the service error code when one is known.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::NotFound(_) | Self::NoUpdates(_) => Some(VALIDATION_ERROR_CODE),
            Self::AlreadyExists(_) => Some(ALREADY_EXISTS_CODE),
            Self::InsufficientCapabilities(_) => Some(INSUFFICIENT_CAPABILITIES_CODE),
            Self::Service {
                code, ..
            } => Some(code.as_str()),
            Self::Template(_)
            | Self::Parameters(_)
            | Self::Transport {
                ..
            }
            | Self::WaitTimeout {
                ..
            }
            | Self::IncompleteResponse {
                ..
            } => None,
        }
    }

    /// Stable label for audit events.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Template(_) => "template",
            Self::Parameters(_) => "parameters",
            Self::NotFound(_) => "not_found",
            Self::AlreadyExists(_) => "already_exists",
            Self::NoUpdates(_) => "no_updates",
            Self::InsufficientCapabilities(_) => "insufficient_capabilities",
            Self::Service {
                ..
            } => "service",
            Self::Transport {
                ..
            } => "transport",
            Self::WaitTimeout {
                ..
            } => "wait_timeout",
            Self::IncompleteResponse {
                ..
            } => "incomplete_response",
        }
    }
}

// ============================================================================
// SECTION: Operations
// ============================================================================

/// CloudFormation operations issued by the stack manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StackOperation {
    /// `ValidateTemplate`.
    ValidateTemplate,
    /// `DescribeStacks` used as an existence probe.
    Exists,
    /// `CreateStack`.
    CreateStack,
    /// `UpdateStack`.
    UpdateStack,
    /// `DeleteStack`.
    DeleteStack,
    /// `DescribeStacks`.
    DescribeStack,
}

impl StackOperation {
    /// Returns the API action name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ValidateTemplate => "ValidateTemplate",
            Self::Exists | Self::DescribeStack => "DescribeStacks",
            Self::CreateStack => "CreateStack",
            Self::UpdateStack => "UpdateStack",
            Self::DeleteStack => "DeleteStack",
        }
    }
}

impl fmt::Display for StackOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Classification
// ============================================================================

/// Maps an SDK error into a [`StackError`].
pub(crate) fn classify_sdk_error<E, R>(
    operation: StackOperation,
    stack_name: &str,
    err: SdkError<E, R>,
) -> StackError
where
    E: ProvideErrorMetadata + StdError + Send + Sync + 'static,
    R: fmt::Debug,
{
    let Some(code) = err.code().map(str::to_string) else {
        return StackError::Transport {
            operation,
            message: DisplayErrorContext(&err).to_string(),
        };
    };
    let message = err.message().unwrap_or_default().to_string();
    classify_service_error(operation, stack_name, code, message)
}

/// Maps a service error code and message into a [`StackError`].
pub(crate) fn classify_service_error(
    operation: StackOperation,
    stack_name: &str,
    code: String,
    message: String,
) -> StackError {
    match code.as_str() {
        VALIDATION_ERROR_CODE if message.contains(NO_UPDATES_FRAGMENT) => {
            StackError::NoUpdates(stack_name.to_string())
        }
        VALIDATION_ERROR_CODE if message.contains(NOT_FOUND_FRAGMENT) => {
            StackError::NotFound(stack_name.to_string())
        }
        ALREADY_EXISTS_CODE => StackError::AlreadyExists(stack_name.to_string()),
        INSUFFICIENT_CAPABILITIES_CODE => StackError::InsufficientCapabilities(message),
        _ => StackError::Service {
            operation,
            code,
            message,
        },
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
