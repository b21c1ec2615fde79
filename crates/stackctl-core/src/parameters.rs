// crates/stackctl-core/src/parameters.rs
// ============================================================================
// Module: Stack Parameters
// Description: Parameter key/value sets for stack create and update requests.
// Purpose: Merge literal, file-based, and command-line parameters deterministically.
// Dependencies: aws-sdk-cloudformation, serde_yaml, thiserror
// ============================================================================

//! ## Overview
//! A [`ParameterSet`] is an ordered key/value map. Sources are merged in the
//! order they are applied, later values winning, and requests always carry
//! parameters sorted by key.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use aws_sdk_cloudformation::types::Parameter;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum parameter file size in bytes.
pub const MAX_PARAMETER_FILE_BYTES: usize = 64 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Parameter loading and parsing failures.
#[derive(Debug, Error)]
pub enum ParameterError {
    /// The parameter file could not be read.
    #[error("parameter file io error for {path}: {error}")]
    Io {
        /// Parameter file path.
        path: PathBuf,
        /// Underlying error text.
        error: String,
    },
    /// The parameter file exceeds the size limit.
    #[error("parameter file {0} exceeds size limit")]
    TooLarge(PathBuf),
    /// The parameter file is not a YAML map of strings.
    #[error("parameter file {path} is not a map of strings: {error}")]
    Parse {
        /// Parameter file path.
        path: PathBuf,
        /// Parser error text.
        error: String,
    },
    /// A `KEY=VALUE` override was malformed.
    #[error("invalid parameter override `{0}`: expected KEY=VALUE")]
    Override(String),
}

// ============================================================================
// SECTION: Types
// ============================================================================

/// Single `ParameterKey` / `ParameterValue` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackParameter {
    /// Parameter key.
    pub key: String,
    /// Parameter value.
    pub value: String,
}

impl StackParameter {
    /// Creates a parameter pair.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Ordered set of stack parameters keyed by parameter name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSet {
    /// Parameters keyed by name.
    entries: BTreeMap<String, String>,
}

impl ParameterSet {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a parameter set from literal pairs.
    #[must_use]
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut set = Self::new();
        for (key, value) in pairs {
            set.insert(key, value);
        }
        set
    }

    /// Loads a YAML map of `key: value` strings.
    ///
    /// An empty file yields an empty set.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError`] when the file cannot be read or parsed.
    pub fn load_yaml(path: &Path) -> Result<Self, ParameterError> {
        let bytes = fs::read(path).map_err(|err| ParameterError::Io {
            path: path.to_path_buf(),
            error: err.to_string(),
        })?;
        if bytes.len() > MAX_PARAMETER_FILE_BYTES {
            return Err(ParameterError::TooLarge(path.to_path_buf()));
        }
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::new());
        }
        let entries: BTreeMap<String, String> =
            serde_yaml::from_slice(&bytes).map_err(|err| ParameterError::Parse {
                path: path.to_path_buf(),
                error: err.to_string(),
            })?;
        Ok(Self {
            entries,
        })
    }

    /// Inserts or replaces a parameter value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Applies every entry of `other` on top of this set.
    pub fn merge(&mut self, other: &Self) {
        for (key, value) in &other.entries {
            self.entries.insert(key.clone(), value.clone());
        }
    }

    /// Returns the value for a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Returns true when the set contains the key.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates parameters sorted by key.
    pub fn iter(&self) -> impl Iterator<Item = StackParameter> + '_ {
        self.entries.iter().map(|(key, value)| StackParameter::new(key, value))
    }

    /// Converts the set into SDK request parameters.
    #[must_use]
    pub fn to_sdk(&self) -> Vec<Parameter> {
        self.entries
            .iter()
            .map(|(key, value)| Parameter::builder().parameter_key(key).parameter_value(value).build())
            .collect()
    }
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

/// Parses a `KEY=VALUE` command-line override.
///
/// Only the first `=` separates key from value, so values may contain `=`.
///
/// # Errors
///
/// Returns [`ParameterError::Override`] when no `=` is present or the key is empty.
pub fn parse_override(input: &str) -> Result<StackParameter, ParameterError> {
    let Some((key, value)) = input.split_once('=') else {
        return Err(ParameterError::Override(input.to_string()));
    };
    let key = key.trim();
    if key.is_empty() {
        return Err(ParameterError::Override(input.to_string()));
    }
    Ok(StackParameter::new(key, value))
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions.")]

    use super::ParameterSet;
    use super::parse_override;

    #[test]
    fn merge_overrides_earlier_values() {
        let mut base = ParameterSet::from_pairs([("TopicName", "FromFile"), ("Env", "dev")]);
        base.merge(&ParameterSet::from_pairs([("TopicName", "FromCli")]));
        assert_eq!(base.get("TopicName"), Some("FromCli"));
        assert_eq!(base.get("Env"), Some("dev"));
        assert_eq!(base.len(), 2);
    }

    #[test]
    fn sdk_parameters_are_sorted_by_key() {
        let set = ParameterSet::from_pairs([("Zeta", "1"), ("Alpha", "2")]);
        let keys: Vec<_> =
            set.to_sdk().iter().map(|p| p.parameter_key().unwrap().to_string()).collect();
        assert_eq!(keys, vec!["Alpha".to_string(), "Zeta".to_string()]);
    }

    #[test]
    fn override_keeps_equals_in_value() {
        let parsed = parse_override("Query=a=b").unwrap();
        assert_eq!(parsed.key, "Query");
        assert_eq!(parsed.value, "a=b");
    }

    #[test]
    fn override_rejects_missing_separator_and_empty_key() {
        assert!(parse_override("TopicName").is_err());
        assert!(parse_override("=value").is_err());
    }
}
