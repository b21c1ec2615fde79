//! Template and parameter input tests for stackctl-core.
// crates/stackctl-core/tests/template_inputs.rs
// ============================================================================
// Module: Template and Parameter Input Tests
// Description: Validate template reads, parameter files, and declared-parameter checks.
// Purpose: Ensure local inputs fail closed before any request is issued.
// ============================================================================

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use std::io::Write;

use stackctl_core::ParameterError;
use stackctl_core::ParameterSet;
use stackctl_core::StackDefinition;
use stackctl_core::TemplateBody;
use stackctl_core::TemplateError;
use stackctl_core::check_parameters;
use stackctl_core::template::MAX_TEMPLATE_BODY_BYTES;
use tempfile::NamedTempFile;

use crate::common::fixture;

// ============================================================================
// SECTION: Templates
// ============================================================================

#[test]
fn load_reads_fixture_template() {
    let path = fixture("templates/valid_template.yaml");
    let template = TemplateBody::load(&path).unwrap();
    assert!(template.as_str().contains("AWS::SNS::Topic"));
    assert_eq!(template.path(), path.as_path());
}

#[test]
fn load_rejects_missing_file() {
    let err = TemplateBody::load(&fixture("templates/nonExistingPath.yaml")).unwrap_err();
    assert!(matches!(err, TemplateError::Io { .. }));
}

#[test]
fn load_rejects_oversized_template() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&vec![b'#'; MAX_TEMPLATE_BODY_BYTES + 1]).unwrap();
    let err = TemplateBody::load(file.path()).unwrap_err();
    assert!(matches!(err, TemplateError::TooLarge { .. }));
}

#[test]
fn load_rejects_non_utf8_template() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&[0xFF, 0xFE, 0xFF]).unwrap();
    let err = TemplateBody::load(file.path()).unwrap_err();
    assert!(matches!(err, TemplateError::Encoding(_)));
}

#[test]
fn declared_parameters_tolerate_intrinsic_tags() {
    let template = TemplateBody::load(&fixture("templates/update_template.yaml")).unwrap();
    let declared = template.declared_parameters().unwrap();
    assert_eq!(declared.len(), 1);
    assert_eq!(declared[0].key, "TopicName");
    assert!(!declared[0].has_default);
}

#[test]
fn declared_parameters_reject_malformed_document() {
    let template = TemplateBody::load(&fixture("templates/invalid_template.yaml")).unwrap();
    assert!(matches!(template.declared_parameters(), Err(TemplateError::Syntax { .. })));
}

// ============================================================================
// SECTION: Parameters
// ============================================================================

#[test]
fn parameter_file_loads_string_map() {
    let set = ParameterSet::load_yaml(&fixture("parameters/parameters.yaml")).unwrap();
    assert_eq!(set.get("TopicName"), Some("MyTopic"));
}

#[test]
fn empty_parameter_file_is_empty_set() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"\n  \n").unwrap();
    assert!(ParameterSet::load_yaml(file.path()).unwrap().is_empty());
}

#[test]
fn parameter_file_rejects_nested_values() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"TopicName:\n  nested: true\n").unwrap();
    let err = ParameterSet::load_yaml(file.path()).unwrap_err();
    assert!(matches!(err, ParameterError::Parse { .. }));
}

#[test]
fn definition_applies_inline_parameters_last() {
    let mut definition =
        StackDefinition::new("Existing", fixture("templates/valid_template.yaml"));
    definition.parameters_file = Some(fixture("parameters/parameters.yaml"));
    definition.parameters = ParameterSet::from_pairs([("TopicName", "Inline"), ("Extra", "x")]);

    let resolved = definition.resolve_parameters().unwrap();

    assert_eq!(resolved.get("TopicName"), Some("Inline"));
    assert_eq!(resolved.get("Extra"), Some("x"));
}

#[test]
fn parameter_check_reports_undeclared_and_missing() {
    let template = TemplateBody::load(&fixture("templates/valid_template.yaml")).unwrap();

    let clean = check_parameters(&template, &ParameterSet::from_pairs([("TopicName", "t")])).unwrap();
    assert!(clean.is_clean());

    let mismatched = check_parameters(&template, &ParameterSet::from_pairs([("Other", "x")])).unwrap();
    assert_eq!(mismatched.undeclared, vec!["Other".to_string()]);
    assert_eq!(mismatched.missing, vec!["TopicName".to_string()]);
}
