//! Update smoke scenario tests for stackctl-core.
// crates/stackctl-core/tests/smoke_update.rs
// ============================================================================
// Module: Update Smoke Tests
// Description: Run the update smoke scenario against a mock endpoint.
// Purpose: Ensure the smoke run reports raw responses and enforces expectations.
// ============================================================================

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use stackctl_core::ExpectedOutcome;
use stackctl_core::ParameterSet;
use stackctl_core::SmokeRequest;
use stackctl_core::StackDefinition;
use stackctl_core::StackError;
use stackctl_core::UpdateOutcome;
use stackctl_core::run_update_smoke;

use crate::common::MockCloudFormation;
use crate::common::fixture;

fn smoke_request() -> SmokeRequest {
    let mut request = SmokeRequest::default();
    request.definition.template_path = fixture("templates/valid_template.yaml");
    request
}

#[test]
fn default_request_matches_the_fixed_scenario() {
    let request = SmokeRequest::default();
    assert_eq!(request.definition.name, "TestStack");
    assert_eq!(
        request.definition.template_path.to_str(),
        Some("fixtures/templates/valid_template.yaml")
    );
    assert_eq!(request.definition.parameters.get("TopicName"), Some("ParameterValue"));
    assert_eq!(request.definition.parameters.len(), 1);
    assert!(!request.create_first);
}

#[test]
fn configured_parameters_replace_the_fixed_pair() {
    let mut definition = StackDefinition::new("Configured", "other.yaml");
    definition.parameters = ParameterSet::from_pairs([("TopicName", "FromConfig")]);
    let request = SmokeRequest::from_definition(definition);
    assert_eq!(request.definition.parameters.get("TopicName"), Some("FromConfig"));

    let mut definition = StackDefinition::new("Configured", "other.yaml");
    definition.parameters_file = Some(fixture("parameters/parameters.yaml"));
    let request = SmokeRequest::from_definition(definition);
    assert!(request.definition.parameters.is_empty());
}

#[tokio::test]
async fn smoke_against_missing_stack_fails() {
    let mock = MockCloudFormation::start();
    let (manager, _) = mock.manager().await;

    let err = run_update_smoke(&manager, &smoke_request()).await.unwrap_err();

    assert!(matches!(err, StackError::NotFound(name) if name == "TestStack"));
    assert_eq!(mock.actions(), vec!["UpdateStack".to_string()]);
}

#[tokio::test]
async fn smoke_after_create_reports_unchanged() {
    let mock = MockCloudFormation::start();
    let (manager, _) = mock.manager().await;
    let request = SmokeRequest {
        create_first: true,
        ..smoke_request()
    };

    let report = run_update_smoke(&manager, &request).await.unwrap();

    assert!(report.created_stack_id.is_some());
    assert_eq!(report.outcome, UpdateOutcome::Unchanged);
    assert!(report.raw_response.contains("No updates are to be performed"));
    assert!(report.satisfies(ExpectedOutcome::Unchanged));
    assert!(report.satisfies(ExpectedOutcome::Any));
    assert!(!report.satisfies(ExpectedOutcome::Updated));
    assert_eq!(mock.actions(), vec!["CreateStack".to_string(), "UpdateStack".to_string()]);
}

#[tokio::test]
async fn smoke_with_changed_parameters_reports_updated() {
    let mock = MockCloudFormation::start();
    let body = std::fs::read_to_string(fixture("templates/valid_template.yaml")).unwrap();
    mock.seed_stack("TestStack", &body, &[("TopicName", "Original")], "CREATE_COMPLETE");
    let (manager, _) = mock.manager().await;

    let report = run_update_smoke(&manager, &smoke_request()).await.unwrap();

    assert!(matches!(report.outcome, UpdateOutcome::Updated { .. }));
    assert!(report.satisfies(ExpectedOutcome::Updated));
    assert!(!report.satisfies(ExpectedOutcome::Unchanged));
}

#[tokio::test]
async fn smoke_with_missing_template_fails_without_request() {
    let mock = MockCloudFormation::start();
    let (manager, _) = mock.manager().await;
    let mut request = SmokeRequest::default();
    request.definition.template_path = fixture("templates/missing.yaml");

    let err = run_update_smoke(&manager, &request).await.unwrap_err();

    assert!(matches!(err, StackError::Template(_)));
    assert!(mock.actions().is_empty());
}
