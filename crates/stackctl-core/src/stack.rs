// crates/stackctl-core/src/stack.rs
// ============================================================================
// Module: Stack Definitions
// Description: Desired-state description of a single CloudFormation stack.
// Purpose: Resolve template and parameter inputs for create/update requests.
// Dependencies: serde, crate::{parameters, template}
// ============================================================================

//! ## Overview
//! A [`StackDefinition`] names a stack and points at its template and
//! parameter sources. Parameters from the optional YAML file are applied
//! first, then inline parameters on top.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;

use serde::Serialize;

use crate::parameters::ParameterError;
use crate::parameters::ParameterSet;
use crate::template::TemplateBody;
use crate::template::TemplateError;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Desired state for one stack.
#[derive(Debug, Clone)]
pub struct StackDefinition {
    /// Stack name.
    pub name: String,
    /// Template file path.
    pub template_path: PathBuf,
    /// Optional YAML parameter file.
    pub parameters_file: Option<PathBuf>,
    /// Inline parameters applied after the parameter file.
    pub parameters: ParameterSet,
    /// Capabilities acknowledged on create/update (e.g. `CAPABILITY_IAM`).
    pub capabilities: Vec<String>,
    /// Disable rollback on create failure.
    pub disable_rollback: bool,
    /// Create timeout in minutes.
    pub timeout_minutes: Option<i32>,
}

impl StackDefinition {
    /// Creates a definition with no parameters or capabilities.
    #[must_use]
    pub fn new(name: impl Into<String>, template_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            template_path: template_path.into(),
            parameters_file: None,
            parameters: ParameterSet::new(),
            capabilities: Vec::new(),
            disable_rollback: false,
            timeout_minutes: None,
        }
    }

    /// Loads the template body referenced by this definition.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError`] when the template cannot be read.
    pub fn load_template(&self) -> Result<TemplateBody, TemplateError> {
        TemplateBody::load(&self.template_path)
    }

    /// Resolves file parameters overlaid with inline parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError`] when the parameter file cannot be loaded.
    pub fn resolve_parameters(&self) -> Result<ParameterSet, ParameterError> {
        let mut resolved = match &self.parameters_file {
            Some(path) => ParameterSet::load_yaml(path)?,
            None => ParameterSet::new(),
        };
        resolved.merge(&self.parameters);
        Ok(resolved)
    }
}

/// Mismatches between supplied parameters and template declarations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParameterCheck {
    /// Supplied keys the template does not declare.
    pub undeclared: Vec<String>,
    /// Declared keys without a default that were not supplied.
    pub missing: Vec<String>,
}

impl ParameterCheck {
    /// Returns true when no mismatches were found.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.undeclared.is_empty() && self.missing.is_empty()
    }
}

/// Compares a parameter set against the template's declared parameters.
///
/// # Errors
///
/// Returns [`TemplateError::Syntax`] when the template cannot be parsed.
pub fn check_parameters(
    template: &TemplateBody,
    parameters: &ParameterSet,
) -> Result<ParameterCheck, TemplateError> {
    let declared = template.declared_parameters()?;
    let undeclared = parameters
        .iter()
        .filter(|param| !declared.iter().any(|decl| decl.key == param.key))
        .map(|param| param.key)
        .collect();
    let missing = declared
        .iter()
        .filter(|decl| !decl.has_default && !parameters.contains(&decl.key))
        .map(|decl| decl.key.clone())
        .collect();
    Ok(ParameterCheck {
        undeclared,
        missing,
    })
}
