// crates/stackctl-core/tests/common/mod.rs
// ============================================================================
// Module: Mock CloudFormation Endpoint
// Description: In-process awsQuery stub for stack lifecycle tests.
// Purpose: Exercise the SDK wire path without an external mock server.
// Dependencies: tiny_http, url, serde_yaml
// ============================================================================

//! ## Overview
//! A single-threaded `tiny_http` server that speaks enough of the
//! CloudFormation awsQuery protocol for the lifecycle tests. Stack state is
//! kept in memory and follows service semantics: unknown stacks and no-op
//! updates are `ValidationError`s, deletes are idempotent.

#![allow(
    dead_code,
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Shared test helpers; not every test binary uses every helper."
)]

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::thread;

use stackctl_core::ClientSettings;
use stackctl_core::StackAuditEvent;
use stackctl_core::StackAuditSink;
use stackctl_core::StackManager;
use stackctl_core::StaticCredentials;
use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Returns the absolute path of a repository fixture.
pub fn fixture(relative: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("../../fixtures");
    path.push(relative);
    path
}

/// Audit sink capturing events in memory.
#[derive(Default)]
pub struct RecordingAuditSink {
    /// Captured events.
    pub events: Mutex<Vec<StackAuditEvent>>,
}

impl StackAuditSink for RecordingAuditSink {
    fn record(&self, event: &StackAuditEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

// ============================================================================
// SECTION: Stack State
// ============================================================================

const NAMESPACE: &str = "http://cloudformation.amazonaws.com/doc/2010-05-15/";
const CREATION_TIME: &str = "2026-01-01T00:00:00Z";

#[derive(Clone)]
struct MockStack {
    stack_id: String,
    template_body: String,
    parameters: BTreeMap<String, String>,
    status: String,
}

#[derive(Default)]
struct MockState {
    stacks: BTreeMap<String, MockStack>,
    next_id: u32,
    requests: Vec<String>,
    failures: BTreeMap<String, (String, String)>,
}

/// Handle for a running mock endpoint.
pub struct MockCloudFormation {
    endpoint: String,
    state: Arc<Mutex<MockState>>,
}

impl MockCloudFormation {
    /// Starts the mock endpoint on an ephemeral loopback port.
    pub fn start() -> Self {
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        let state = Arc::new(Mutex::new(MockState::default()));
        let thread_state = Arc::clone(&state);
        thread::spawn(move || {
            for mut request in server.incoming_requests() {
                let mut body = String::new();
                let _ = request.as_reader().read_to_string(&mut body);
                let (status, xml) = handle(&thread_state, &body);
                let header =
                    Header::from_bytes(&b"Content-Type"[..], &b"text/xml"[..]).unwrap();
                let response = Response::from_string(xml).with_status_code(status).with_header(header);
                let _ = request.respond(response);
            }
        });
        Self {
            endpoint: format!("http://{addr}"),
            state,
        }
    }

    /// Endpoint URL of the mock.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Client settings targeting the mock with static credentials.
    pub fn settings(&self) -> ClientSettings {
        ClientSettings {
            region: "us-east-1".to_string(),
            endpoint_url: Some(self.endpoint.clone()),
            credentials: Some(StaticCredentials {
                access_key_id: "testing".to_string(),
                secret_access_key: "testing".to_string(),
            }),
            operation_timeout: None,
        }
    }

    /// Builds a manager against the mock with a recording audit sink.
    pub async fn manager(&self) -> (StackManager, Arc<RecordingAuditSink>) {
        let sink = Arc::new(RecordingAuditSink::default());
        let manager = StackManager::connect(&self.settings(), sink.clone()).await;
        (manager, sink)
    }

    /// Seeds a stack directly into mock state.
    pub fn seed_stack(&self, name: &str, template_body: &str, parameters: &[(&str, &str)], status: &str) {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let stack_id = stack_arn(name, state.next_id);
        state.stacks.insert(
            name.to_string(),
            MockStack {
                stack_id,
                template_body: template_body.to_string(),
                parameters: parameters
                    .iter()
                    .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
                    .collect(),
                status: status.to_string(),
            },
        );
    }

    /// Makes every later request for `action` fail with a service error.
    pub fn fail_action(&self, action: &str, code: &str, message: &str) {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert(action.to_string(), (code.to_string(), message.to_string()));
    }

    /// Actions received so far, in order.
    pub fn actions(&self) -> Vec<String> {
        self.state.lock().unwrap().requests.clone()
    }
}

// ============================================================================
// SECTION: Request Handling
// ============================================================================

fn handle(state: &Mutex<MockState>, body: &str) -> (u16, String) {
    let form: BTreeMap<String, String> = url::form_urlencoded::parse(body.as_bytes())
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    let action = form.get("Action").cloned().unwrap_or_default();
    let mut state = state.lock().unwrap();
    state.requests.push(action.clone());
    if let Some((code, message)) = state.failures.get(&action) {
        return error_response(code, message);
    }
    match action.as_str() {
        "ValidateTemplate" => validate_template(&form),
        "CreateStack" => create_stack(&mut state, &form),
        "UpdateStack" => update_stack(&mut state, &form),
        "DeleteStack" => {
            if let Some(name) = form.get("StackName") {
                state.stacks.remove(name);
            }
            (200, envelope("DeleteStack", None))
        }
        "DescribeStacks" => describe_stacks(&state, &form),
        other => error_response("InvalidAction", &format!("unsupported action {other}")),
    }
}

fn validate_template(form: &BTreeMap<String, String>) -> (u16, String) {
    let body = form.get("TemplateBody").cloned().unwrap_or_default();
    let Ok(document) = serde_yaml::from_str::<serde_yaml::Value>(&body) else {
        return error_response("ValidationError", "Template format error: YAML not well-formed.");
    };
    if document.get("Resources").is_none() {
        return error_response(
            "ValidationError",
            "Template format error: At least one Resources member must be defined.",
        );
    }
    let mut members = String::new();
    if let Some(params) = document.get("Parameters").and_then(serde_yaml::Value::as_mapping) {
        for key in params.keys().filter_map(serde_yaml::Value::as_str) {
            members.push_str(&format!(
                "<member><ParameterKey>{key}</ParameterKey><NoEcho>false</NoEcho></member>"
            ));
        }
    }
    let description = document
        .get("Description")
        .and_then(serde_yaml::Value::as_str)
        .map(|text| format!("<Description>{text}</Description>"))
        .unwrap_or_default();
    let result = format!("<Parameters>{members}</Parameters>{description}");
    (200, envelope("ValidateTemplate", Some(&result)))
}

fn create_stack(state: &mut MockState, form: &BTreeMap<String, String>) -> (u16, String) {
    let name = form.get("StackName").cloned().unwrap_or_default();
    if state.stacks.contains_key(&name) {
        return error_response("AlreadyExistsException", &format!("Stack [{name}] already exists"));
    }
    state.next_id += 1;
    let stack_id = stack_arn(&name, state.next_id);
    state.stacks.insert(
        name,
        MockStack {
            stack_id: stack_id.clone(),
            template_body: form.get("TemplateBody").cloned().unwrap_or_default(),
            parameters: form_parameters(form),
            status: "CREATE_COMPLETE".to_string(),
        },
    );
    (200, envelope("CreateStack", Some(&format!("<StackId>{stack_id}</StackId>"))))
}

fn update_stack(state: &mut MockState, form: &BTreeMap<String, String>) -> (u16, String) {
    let name = form.get("StackName").cloned().unwrap_or_default();
    let Some(stack) = state.stacks.get_mut(&name) else {
        return error_response("ValidationError", &format!("Stack [{name}] does not exist"));
    };
    let template_body = form.get("TemplateBody").cloned().unwrap_or_default();
    let parameters = form_parameters(form);
    if stack.template_body == template_body && stack.parameters == parameters {
        return error_response("ValidationError", "No updates are to be performed.");
    }
    stack.template_body = template_body;
    stack.parameters = parameters;
    stack.status = "UPDATE_COMPLETE".to_string();
    let result = format!("<StackId>{}</StackId>", stack.stack_id);
    (200, envelope("UpdateStack", Some(&result)))
}

fn describe_stacks(state: &MockState, form: &BTreeMap<String, String>) -> (u16, String) {
    let name = form.get("StackName").cloned().unwrap_or_default();
    let Some(stack) = state.stacks.get(&name) else {
        return error_response("ValidationError", &format!("Stack with id {name} does not exist"));
    };
    let mut parameters = String::new();
    for (key, value) in &stack.parameters {
        parameters.push_str(&format!(
            "<member><ParameterKey>{key}</ParameterKey><ParameterValue>{value}</ParameterValue></member>"
        ));
    }
    let member = format!(
        "<Stacks><member><StackName>{name}</StackName><StackId>{}</StackId>\
         <CreationTime>{CREATION_TIME}</CreationTime><StackStatus>{}</StackStatus>\
         <Parameters>{parameters}</Parameters></member></Stacks>",
        stack.stack_id, stack.status
    );
    (200, envelope("DescribeStacks", Some(&member)))
}

// ============================================================================
// SECTION: Wire Helpers
// ============================================================================

fn form_parameters(form: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    let mut parameters = BTreeMap::new();
    let mut index = 1;
    while let Some(key) = form.get(&format!("Parameters.member.{index}.ParameterKey")) {
        let value = form
            .get(&format!("Parameters.member.{index}.ParameterValue"))
            .cloned()
            .unwrap_or_default();
        parameters.insert(key.clone(), value);
        index += 1;
    }
    parameters
}

fn stack_arn(name: &str, id: u32) -> String {
    format!("arn:aws:cloudformation:us-east-1:123456789012:stack/{name}/{id:08}")
}

fn envelope(action: &str, result: Option<&str>) -> String {
    let result = result
        .map(|inner| format!("<{action}Result>{inner}</{action}Result>"))
        .unwrap_or_default();
    format!(
        "<{action}Response xmlns=\"{NAMESPACE}\">{result}\
         <ResponseMetadata><RequestId>mock-request</RequestId></ResponseMetadata>\
         </{action}Response>"
    )
}

fn error_response(code: &str, message: &str) -> (u16, String) {
    (
        400,
        format!(
            "<ErrorResponse xmlns=\"{NAMESPACE}\"><Error><Type>Sender</Type><Code>{code}</Code>\
             <Message>{message}</Message></Error><RequestId>mock-request</RequestId></ErrorResponse>"
        ),
    )
}
