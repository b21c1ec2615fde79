// crates/stackctl-core/src/audit.rs
// ============================================================================
// Module: Stack Audit Logging
// Description: Structured audit events for CloudFormation stack operations.
// Purpose: Emit JSON-line operation logs without hard logging dependencies.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Every stack operation produces exactly one [`StackAuditEvent`]. Sinks
//! serialize events as JSON lines so operators can route them into any
//! log pipeline.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::error::StackError;
use crate::error::StackOperation;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Outcome classification for audit events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StackOutcome {
    /// The operation succeeded.
    Ok,
    /// The operation succeeded without changing the stack.
    Unchanged,
    /// The operation failed.
    Error,
}

/// Stack operation audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct StackAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Operation issued.
    pub operation: StackOperation,
    /// Stack name, when the operation targets a stack.
    pub stack_name: Option<String>,
    /// Operation outcome.
    pub outcome: StackOutcome,
    /// Normalized error kind label.
    pub error_kind: Option<&'static str>,
    /// Service error code when present.
    pub error_code: Option<String>,
    /// Wall-clock duration of the operation in milliseconds.
    pub duration_ms: u128,
}

impl StackAuditEvent {
    /// Creates a new audit event with a consistent timestamp.
    #[must_use]
    pub fn new(
        operation: StackOperation,
        stack_name: Option<&str>,
        outcome: StackOutcome,
        elapsed: Duration,
    ) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event: "stack_operation",
            timestamp_ms,
            operation,
            stack_name: stack_name.map(str::to_string),
            outcome,
            error_kind: None,
            error_code: None,
            duration_ms: elapsed.as_millis(),
        }
    }

    /// Creates a failure event carrying the error classification.
    #[must_use]
    pub fn failed(
        operation: StackOperation,
        stack_name: Option<&str>,
        error: &StackError,
        elapsed: Duration,
    ) -> Self {
        let mut event = Self::new(operation, stack_name, StackOutcome::Error, elapsed);
        event.error_kind = Some(error.kind());
        event.error_code = error.code().map(str::to_string);
        event
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Audit sink for stack operation events.
pub trait StackAuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: &StackAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl StackAuditSink for StderrAuditSink {
    fn record(&self, event: &StackAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl StackAuditSink for FileAuditSink {
    fn record(&self, event: &StackAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl StackAuditSink for NoopAuditSink {
    fn record(&self, _event: &StackAuditEvent) {}
}
