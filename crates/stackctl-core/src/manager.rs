// crates/stackctl-core/src/manager.rs
// ============================================================================
// Module: Stack Manager
// Description: CloudFormation stack lifecycle operations.
// Purpose: Validate, create, update, describe, and delete a single stack.
// Dependencies: aws-sdk-cloudformation, tokio, crate::{audit, error, stack}
// ============================================================================

//! ## Overview
//! [`StackManager`] issues one CloudFormation call per operation and records
//! one audit event per call. Service errors are classified into
//! [`StackError`] variants; an update that carries no changes is reported as
//! [`UpdateOutcome::Unchanged`] rather than an error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use aws_sdk_cloudformation::Client;
use aws_sdk_cloudformation::error::ProvideErrorMetadata;
use aws_sdk_cloudformation::primitives::DateTimeFormat;
use aws_sdk_cloudformation::types::Capability;
use aws_sdk_cloudformation::types::Stack;
use serde::Serialize;

use crate::audit::StackAuditEvent;
use crate::audit::StackAuditSink;
use crate::audit::StackOutcome;
use crate::client::ClientSettings;
use crate::client::build_client;
use crate::error::StackError;
use crate::error::StackOperation;
use crate::error::classify_sdk_error;
use crate::parameters::StackParameter;
use crate::stack::StackDefinition;
use crate::template::TemplateBody;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Status reported for stacks that have been deleted.
const DELETE_COMPLETE_STATUS: &str = "DELETE_COMPLETE";
/// Suffix shared by every transitional stack status.
const IN_PROGRESS_SUFFIX: &str = "_IN_PROGRESS";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Snapshot of a stack returned by `DescribeStacks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StackSummary {
    /// Stack identifier (ARN).
    pub stack_id: Option<String>,
    /// Stack name.
    pub stack_name: String,
    /// Stack status (e.g. `CREATE_COMPLETE`).
    pub status: String,
    /// Status reason when provided.
    pub status_reason: Option<String>,
    /// Creation time in RFC 3339 format.
    pub creation_time: Option<String>,
    /// Current stack parameters.
    pub parameters: Vec<StackParameter>,
}

impl StackSummary {
    /// Returns true when the stack is in a transitional state.
    #[must_use]
    pub fn is_in_progress(&self) -> bool {
        self.status.ends_with(IN_PROGRESS_SUFFIX)
    }

    /// Builds a summary from an SDK stack record.
    fn from_sdk(operation: StackOperation, stack: &Stack) -> Result<Self, StackError> {
        let status = stack.stack_status().map(|status| status.as_str().to_string()).ok_or(
            StackError::IncompleteResponse {
                operation,
                field: "StackStatus",
            },
        )?;
        let parameters = stack
            .parameters()
            .iter()
            .filter_map(|param| {
                param
                    .parameter_key()
                    .map(|key| StackParameter::new(key, param.parameter_value().unwrap_or_default()))
            })
            .collect();
        Ok(Self {
            stack_id: stack.stack_id().map(str::to_string),
            stack_name: stack.stack_name().unwrap_or_default().to_string(),
            status,
            status_reason: stack.stack_status_reason().map(str::to_string),
            creation_time: stack
                .creation_time()
                .and_then(|time| time.fmt(DateTimeFormat::DateTime).ok()),
            parameters,
        })
    }
}

/// Result of an update request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum UpdateOutcome {
    /// The update was accepted.
    Updated {
        /// Stack identifier returned by the service.
        stack_id: String,
    },
    /// The service reported that no updates are to be performed.
    Unchanged,
}

impl UpdateOutcome {
    /// Stable outcome label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Updated {
                ..
            } => "updated",
            Self::Unchanged => "unchanged",
        }
    }
}

/// Update outcome plus the raw service response text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateReport {
    /// Classified outcome.
    pub outcome: UpdateOutcome,
    /// Raw response rendering (response object or service message).
    pub raw_response: String,
}

/// Result of a remote template validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateValidation {
    /// Template description, when present.
    pub description: Option<String>,
    /// Parameter keys reported by the service.
    pub parameters: Vec<String>,
}

/// Polling budget for stack status waits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Maximum number of status checks.
    pub attempts: u32,
    /// Delay between status checks.
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            attempts: 60,
            interval: Duration::from_secs(1),
        }
    }
}

// ============================================================================
// SECTION: Manager
// ============================================================================

/// CloudFormation stack manager.
pub struct StackManager {
    /// SDK client handle.
    client: Client,
    /// Audit sink for operation events.
    audit: Arc<dyn StackAuditSink>,
}

impl StackManager {
    /// Creates a manager from an existing client.
    #[must_use]
    pub fn new(client: Client, audit: Arc<dyn StackAuditSink>) -> Self {
        Self {
            client,
            audit,
        }
    }

    /// Builds a client from settings and wraps it in a manager.
    pub async fn connect(settings: &ClientSettings, audit: Arc<dyn StackAuditSink>) -> Self {
        Self::new(build_client(settings).await, audit)
    }

    /// Returns the underlying SDK client.
    #[must_use]
    pub const fn client(&self) -> &Client {
        &self.client
    }

    /// Validates a template with the remote `ValidateTemplate` API.
    ///
    /// # Errors
    ///
    /// Returns [`StackError`] when the service rejects the template.
    pub async fn validate_template(
        &self,
        template: &TemplateBody,
    ) -> Result<TemplateValidation, StackError> {
        let started = Instant::now();
        let operation = StackOperation::ValidateTemplate;
        let result = self
            .client
            .validate_template()
            .template_body(template.as_str())
            .send()
            .await
            .map(|output| TemplateValidation {
                description: output.description().map(str::to_string),
                parameters: output
                    .parameters()
                    .iter()
                    .filter_map(|param| param.parameter_key().map(str::to_string))
                    .collect(),
            })
            .map_err(|err| classify_sdk_error(operation, "", err));
        self.record(operation, None, started, &result, StackOutcome::Ok);
        result
    }

    /// Returns true when the stack exists and has not been deleted.
    ///
    /// # Errors
    ///
    /// Returns [`StackError`] for failures other than "does not exist".
    pub async fn exists(&self, stack_name: &str) -> Result<bool, StackError> {
        let started = Instant::now();
        let operation = StackOperation::Exists;
        let result = match self.fetch_stack(operation, stack_name).await {
            Ok(summary) => Ok(summary.status != DELETE_COMPLETE_STATUS),
            Err(StackError::NotFound(_)) => Ok(false),
            Err(err) => Err(err),
        };
        self.record(operation, Some(stack_name), started, &result, StackOutcome::Ok);
        result
    }

    /// Creates the stack and returns its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StackError`] when inputs cannot be loaded or the service rejects the request.
    pub async fn create_stack(&self, definition: &StackDefinition) -> Result<String, StackError> {
        let started = Instant::now();
        let operation = StackOperation::CreateStack;
        let result = self.send_create(definition).await;
        self.record(operation, Some(&definition.name), started, &result, StackOutcome::Ok);
        result
    }

    /// Updates the stack with the definition's template and parameters.
    ///
    /// # Errors
    ///
    /// Returns [`StackError`] when inputs cannot be loaded or the service rejects the request.
    pub async fn update_stack(
        &self,
        definition: &StackDefinition,
    ) -> Result<UpdateReport, StackError> {
        let started = Instant::now();
        let operation = StackOperation::UpdateStack;
        let result = self.send_update(definition).await;
        let success = match &result {
            Ok(UpdateReport {
                outcome: UpdateOutcome::Unchanged,
                ..
            }) => StackOutcome::Unchanged,
            _ => StackOutcome::Ok,
        };
        self.record(operation, Some(&definition.name), started, &result, success);
        result
    }

    /// Deletes the stack. Deleting an unknown stack succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`StackError`] when the service rejects the request.
    pub async fn delete_stack(&self, stack_name: &str) -> Result<(), StackError> {
        let started = Instant::now();
        let operation = StackOperation::DeleteStack;
        let result = self
            .client
            .delete_stack()
            .stack_name(stack_name)
            .send()
            .await
            .map(|_| ())
            .map_err(|err| classify_sdk_error(operation, stack_name, err));
        self.record(operation, Some(stack_name), started, &result, StackOutcome::Ok);
        result
    }

    /// Describes the stack.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::NotFound`] for unknown stacks and other variants for service failures.
    pub async fn describe_stack(&self, stack_name: &str) -> Result<StackSummary, StackError> {
        let started = Instant::now();
        let operation = StackOperation::DescribeStack;
        let result = self.fetch_stack(operation, stack_name).await;
        self.record(operation, Some(stack_name), started, &result, StackOutcome::Ok);
        result
    }

    /// Returns the current stack status string.
    ///
    /// # Errors
    ///
    /// Returns [`StackError`] when the stack cannot be described.
    pub async fn stack_status(&self, stack_name: &str) -> Result<String, StackError> {
        Ok(self.describe_stack(stack_name).await?.status)
    }

    /// Polls until the stack leaves every `*_IN_PROGRESS` status.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::WaitTimeout`] when the polling budget is exhausted.
    pub async fn wait_for_stable(
        &self,
        stack_name: &str,
        policy: PollPolicy,
    ) -> Result<StackSummary, StackError> {
        let mut attempts = 0u32;
        loop {
            attempts = attempts.saturating_add(1);
            let summary = self.describe_stack(stack_name).await?;
            if !summary.is_in_progress() {
                return Ok(summary);
            }
            if attempts >= policy.attempts {
                return Err(StackError::WaitTimeout {
                    stack: stack_name.to_string(),
                    status: summary.status,
                    attempts,
                });
            }
            tokio::time::sleep(policy.interval).await;
        }
    }

    // ------------------------------------------------------------------------
    // Request helpers
    // ------------------------------------------------------------------------

    /// Issues `DescribeStacks` for a single stack.
    async fn fetch_stack(
        &self,
        operation: StackOperation,
        stack_name: &str,
    ) -> Result<StackSummary, StackError> {
        let output = self
            .client
            .describe_stacks()
            .stack_name(stack_name)
            .send()
            .await
            .map_err(|err| classify_sdk_error(operation, stack_name, err))?;
        let stack = output
            .stacks()
            .first()
            .ok_or_else(|| StackError::NotFound(stack_name.to_string()))?;
        StackSummary::from_sdk(operation, stack)
    }

    /// Issues `CreateStack` for a definition.
    async fn send_create(&self, definition: &StackDefinition) -> Result<String, StackError> {
        let operation = StackOperation::CreateStack;
        let template = definition.load_template()?;
        let parameters = definition.resolve_parameters()?;
        let output = self
            .client
            .create_stack()
            .stack_name(&definition.name)
            .template_body(template.as_str())
            .set_parameters(Some(parameters.to_sdk()))
            .set_capabilities(Some(sdk_capabilities(&definition.capabilities)))
            .disable_rollback(definition.disable_rollback)
            .set_timeout_in_minutes(definition.timeout_minutes)
            .send()
            .await
            .map_err(|err| classify_sdk_error(operation, &definition.name, err))?;
        output.stack_id().map(str::to_string).ok_or(StackError::IncompleteResponse {
            operation,
            field: "StackId",
        })
    }

    /// Issues `UpdateStack` for a definition.
    async fn send_update(&self, definition: &StackDefinition) -> Result<UpdateReport, StackError> {
        let operation = StackOperation::UpdateStack;
        let template = definition.load_template()?;
        let parameters = definition.resolve_parameters()?;
        let response = self
            .client
            .update_stack()
            .stack_name(&definition.name)
            .template_body(template.as_str())
            .set_parameters(Some(parameters.to_sdk()))
            .set_capabilities(Some(sdk_capabilities(&definition.capabilities)))
            .send()
            .await;
        match response {
            Ok(output) => {
                let stack_id = output.stack_id().map(str::to_string).ok_or(
                    StackError::IncompleteResponse {
                        operation,
                        field: "StackId",
                    },
                )?;
                Ok(UpdateReport {
                    outcome: UpdateOutcome::Updated {
                        stack_id,
                    },
                    raw_response: render_raw(&output),
                })
            }
            Err(err) => {
                let raw_response = format!(
                    "{}: {}",
                    err.code().unwrap_or("Unknown"),
                    err.message().unwrap_or_default()
                );
                match classify_sdk_error(operation, &definition.name, err) {
                    StackError::NoUpdates(_) => Ok(UpdateReport {
                        outcome: UpdateOutcome::Unchanged,
                        raw_response,
                    }),
                    other => Err(other),
                }
            }
        }
    }

    /// Records an audit event for an operation result.
    fn record<T>(
        &self,
        operation: StackOperation,
        stack_name: Option<&str>,
        started: Instant,
        result: &Result<T, StackError>,
        success: StackOutcome,
    ) {
        let elapsed = started.elapsed();
        let event = match result {
            Ok(_) => StackAuditEvent::new(operation, stack_name, success, elapsed),
            Err(err) => StackAuditEvent::failed(operation, stack_name, err, elapsed),
        };
        self.audit.record(&event);
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Converts capability labels into SDK capability values.
fn sdk_capabilities(capabilities: &[String]) -> Vec<Capability> {
    capabilities.iter().map(|capability| Capability::from(capability.as_str())).collect()
}

/// Renders an SDK response object for display.
#[allow(clippy::use_debug, reason = "The raw response is the SDK's own debug rendering.")]
fn render_raw<T: std::fmt::Debug>(response: &T) -> String {
    format!("{response:?}")
}

// ============================================================================
// SECTION: Tests
// ============================================================================
