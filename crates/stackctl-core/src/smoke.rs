// crates/stackctl-core/src/smoke.rs
// ============================================================================
// Module: Update Smoke Scenario
// Description: One update-stack call against a mock endpoint.
// Purpose: Exercise UpdateStack with a fixed template and parameter list.
// Dependencies: serde, crate::{manager, parameters, stack}
// ============================================================================

//! ## Overview
//! The smoke scenario reads a template, issues a single `UpdateStack` for the
//! requested definition, and reports the raw response. Re-submitting the
//! template and parameters a stack already has yields
//! [`UpdateOutcome::Unchanged`]; callers can require a specific outcome with
//! [`ExpectedOutcome`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

use crate::error::StackError;
use crate::manager::StackManager;
use crate::manager::UpdateOutcome;
use crate::parameters::ParameterSet;
use crate::stack::StackDefinition;

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default smoke stack name.
pub const DEFAULT_SMOKE_STACK: &str = "TestStack";
/// Default smoke template path.
pub const DEFAULT_SMOKE_TEMPLATE: &str = "fixtures/templates/valid_template.yaml";
/// Default smoke parameter key.
pub const DEFAULT_SMOKE_PARAMETER_KEY: &str = "TopicName";
/// Default smoke parameter value.
pub const DEFAULT_SMOKE_PARAMETER_VALUE: &str = "ParameterValue";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Inputs for a smoke run.
#[derive(Debug, Clone)]
pub struct SmokeRequest {
    /// Stack sent with the update.
    pub definition: StackDefinition,
    /// Create the stack before updating it.
    pub create_first: bool,
}

impl Default for SmokeRequest {
    fn default() -> Self {
        Self::from_definition(StackDefinition::new(DEFAULT_SMOKE_STACK, DEFAULT_SMOKE_TEMPLATE))
    }
}

impl SmokeRequest {
    /// Builds a request from a configured definition.
    ///
    /// A definition with neither inline parameters nor a parameter file gets
    /// the fixed `TopicName=ParameterValue` pair.
    #[must_use]
    pub fn from_definition(mut definition: StackDefinition) -> Self {
        if definition.parameters.is_empty() && definition.parameters_file.is_none() {
            definition.parameters = ParameterSet::from_pairs([(
                DEFAULT_SMOKE_PARAMETER_KEY,
                DEFAULT_SMOKE_PARAMETER_VALUE,
            )]);
        }
        Self {
            definition,
            create_first: false,
        }
    }
}

/// Outcome a caller requires from the smoke run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpectedOutcome {
    /// Accept any successful response.
    #[default]
    Any,
    /// Require the update to be accepted.
    Updated,
    /// Require the service to report no updates.
    Unchanged,
}

impl ExpectedOutcome {
    /// Stable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Updated => "updated",
            Self::Unchanged => "unchanged",
        }
    }
}

/// Smoke run report.
#[derive(Debug, Clone, Serialize)]
pub struct SmokeReport {
    /// Stack name.
    pub stack_name: String,
    /// Stack identifier from the pre-create step, when run.
    pub created_stack_id: Option<String>,
    /// Update outcome.
    pub outcome: UpdateOutcome,
    /// Raw response rendering.
    pub raw_response: String,
}

impl SmokeReport {
    /// Returns true when the outcome satisfies the expectation.
    #[must_use]
    pub const fn satisfies(&self, expected: ExpectedOutcome) -> bool {
        match expected {
            ExpectedOutcome::Any => true,
            ExpectedOutcome::Updated => matches!(self.outcome, UpdateOutcome::Updated { .. }),
            ExpectedOutcome::Unchanged => matches!(self.outcome, UpdateOutcome::Unchanged),
        }
    }
}

// ============================================================================
// SECTION: Execution
// ============================================================================

/// Runs the update smoke scenario.
///
/// # Errors
///
/// Returns [`StackError`] when the template is missing or the update fails
/// for any reason other than "no updates".
pub async fn run_update_smoke(
    manager: &StackManager,
    request: &SmokeRequest,
) -> Result<SmokeReport, StackError> {
    let definition = &request.definition;
    let created_stack_id = if request.create_first {
        Some(manager.create_stack(definition).await?)
    } else {
        None
    };
    let report = manager.update_stack(definition).await?;
    Ok(SmokeReport {
        stack_name: definition.name.clone(),
        created_stack_id,
        outcome: report.outcome,
        raw_response: report.raw_response,
    })
}
