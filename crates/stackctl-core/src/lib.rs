// crates/stackctl-core/src/lib.rs
// ============================================================================
// Module: Stackctl Core Library
// Description: Public API surface for CloudFormation stack management.
// Purpose: Expose template, parameter, stack, endpoint, and smoke helpers.
// Dependencies: aws-config, aws-sdk-cloudformation, tokio
// ============================================================================

//! ## Overview
//! `stackctl-core` manages a single CloudFormation stack against a real or
//! mock endpoint. It loads templates and parameter files, issues stack
//! lifecycle calls with classified errors and JSON-line audit events, and
//! controls local mock endpoints.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod client;
pub mod endpoint;
pub mod error;
pub mod manager;
pub mod parameters;
pub mod smoke;
pub mod stack;
pub mod template;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::StackAuditEvent;
pub use audit::StackAuditSink;
pub use audit::StackOutcome;
pub use audit::StderrAuditSink;
pub use client::ClientSettings;
pub use client::StaticCredentials;
pub use client::build_client;
pub use endpoint::EndpointError;
pub use endpoint::MockServer;
pub use endpoint::ReadinessPolicy;
pub use error::StackError;
pub use error::StackOperation;
pub use manager::PollPolicy;
pub use manager::StackManager;
pub use manager::StackSummary;
pub use manager::TemplateValidation;
pub use manager::UpdateOutcome;
pub use manager::UpdateReport;
pub use parameters::ParameterError;
pub use parameters::ParameterSet;
pub use parameters::StackParameter;
pub use smoke::ExpectedOutcome;
pub use smoke::SmokeReport;
pub use smoke::SmokeRequest;
pub use smoke::run_update_smoke;
pub use stack::ParameterCheck;
pub use stack::StackDefinition;
pub use stack::check_parameters;
pub use template::TemplateBody;
pub use template::TemplateError;
