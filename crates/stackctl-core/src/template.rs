// crates/stackctl-core/src/template.rs
// ============================================================================
// Module: Template Loading
// Description: Bounded reads of CloudFormation template bodies from disk.
// Purpose: Provide template text for stack requests and local inspection.
// Dependencies: serde_yaml, thiserror
// ============================================================================

//! ## Overview
//! Templates are read as raw UTF-8 text and sent inline as `TemplateBody`.
//! Reads are bounded by the inline body limit enforced by the service so an
//! oversized template fails locally instead of on the wire.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde_yaml::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum inline template body size accepted by CloudFormation, in bytes.
pub const MAX_TEMPLATE_BODY_BYTES: usize = 51_200;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Template loading and inspection failures.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The template file could not be read.
    #[error("template io error for {path}: {error}")]
    Io {
        /// Template path.
        path: PathBuf,
        /// Underlying error text.
        error: String,
    },
    /// The template exceeds the inline body limit.
    #[error("template {path} exceeds size limit ({actual} > {limit} bytes)")]
    TooLarge {
        /// Template path.
        path: PathBuf,
        /// Configured limit.
        limit: usize,
        /// Actual size.
        actual: usize,
    },
    /// The template is not valid UTF-8.
    #[error("template {0} must be utf-8")]
    Encoding(PathBuf),
    /// The template could not be parsed as a YAML/JSON document.
    #[error("template {path} is not a valid document: {error}")]
    Syntax {
        /// Template path.
        path: PathBuf,
        /// Parser error text.
        error: String,
    },
}

// ============================================================================
// SECTION: Types
// ============================================================================

/// Parameter declared in a template's `Parameters` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredParameter {
    /// Parameter key.
    pub key: String,
    /// Whether the template supplies a `Default`.
    pub has_default: bool,
}

/// Raw template text paired with its source path.
#[derive(Debug, Clone)]
pub struct TemplateBody {
    /// Source path the body was read from.
    path: PathBuf,
    /// Template text.
    body: String,
}

impl TemplateBody {
    /// Reads a template body from disk.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError`] when the file is missing, too large, or not UTF-8.
    pub fn load(path: &Path) -> Result<Self, TemplateError> {
        let bytes = fs::read(path).map_err(|err| TemplateError::Io {
            path: path.to_path_buf(),
            error: err.to_string(),
        })?;
        if bytes.len() > MAX_TEMPLATE_BODY_BYTES {
            return Err(TemplateError::TooLarge {
                path: path.to_path_buf(),
                limit: MAX_TEMPLATE_BODY_BYTES,
                actual: bytes.len(),
            });
        }
        let body =
            String::from_utf8(bytes).map_err(|_| TemplateError::Encoding(path.to_path_buf()))?;
        Ok(Self {
            path: path.to_path_buf(),
            body,
        })
    }

    /// Wraps in-memory template text.
    #[must_use]
    pub fn from_text(path: impl Into<PathBuf>, body: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            body: body.into(),
        }
    }

    /// Returns the template text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.body
    }

    /// Returns the path the template was read from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lists the parameters declared by the template, sorted by key.
    ///
    /// Short-form intrinsic tags (`!Ref`, `!Sub`, ...) parse as tagged values
    /// and do not affect the `Parameters` section.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Syntax`] when the body is not a valid document.
    pub fn declared_parameters(&self) -> Result<Vec<DeclaredParameter>, TemplateError> {
        let document: Value = serde_yaml::from_str(&self.body).map_err(|err| {
            TemplateError::Syntax {
                path: self.path.clone(),
                error: err.to_string(),
            }
        })?;
        let Some(section) = document.get("Parameters").and_then(Value::as_mapping) else {
            return Ok(Vec::new());
        };
        let mut declared: Vec<DeclaredParameter> = section
            .iter()
            .filter_map(|(key, spec)| {
                key.as_str().map(|key| DeclaredParameter {
                    key: key.to_string(),
                    has_default: spec.get("Default").is_some(),
                })
            })
            .collect();
        declared.sort_by(|left, right| left.key.cmp(&right.key));
        Ok(declared)
    }
}
