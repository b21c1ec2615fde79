// crates/stackctl-cli/src/main.rs
// ============================================================================
// Module: Stackctl CLI Entry Point
// Description: Command dispatcher for stack lifecycle and update smoke runs.
// Purpose: Drive CloudFormation-compatible endpoints from the command line.
// Dependencies: clap, serde, serde_json, stackctl-config, stackctl-core, thiserror, tokio.
// ============================================================================

//! ## Overview
//! `stackctl` loads `stackctl.toml` (optional), applies global overrides, and
//! dispatches one command per invocation. Results go to stdout as JSON or
//! text, errors go to stderr, and audit events go to the configured sink.
//!
//! Exit codes: `0` success, `1` error, `2` when `smoke --expect` or `exists`
//! is not satisfied.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use serde::Serialize;
use stackctl_config::ConfigError;
use stackctl_config::StackctlConfig;
use stackctl_core::EndpointError;
use stackctl_core::ExpectedOutcome;
use stackctl_core::MockServer;
use stackctl_core::ParameterCheck;
use stackctl_core::ParameterError;
use stackctl_core::ParameterSet;
use stackctl_core::SmokeReport;
use stackctl_core::SmokeRequest;
use stackctl_core::StackDefinition;
use stackctl_core::StackError;
use stackctl_core::StackManager;
use stackctl_core::StackSummary;
use stackctl_core::TemplateBody;
use stackctl_core::TemplateValidation;
use stackctl_core::UpdateOutcome;
use stackctl_core::check_parameters;
use stackctl_core::client::DEFAULT_ENDPOINT_URL;
use stackctl_core::endpoint::endpoint_address;
use stackctl_core::endpoint::probe;
use stackctl_core::endpoint::wait_until_ready;
use stackctl_core::parameters::parse_override;
use stackctl_core::run_update_smoke;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Exit code for unmet expectations (`smoke --expect`, `exists`).
const EXIT_UNMET: u8 = 2;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "stackctl", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Config file path (overrides `STACKCTL_CONFIG` and `./stackctl.toml`).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Endpoint URL override; pass an empty string for the regional endpoint.
    #[arg(long, value_name = "URL", global = true)]
    endpoint: Option<String>,
    /// Region override.
    #[arg(long, value_name = "REGION", global = true)]
    region: Option<String>,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json, global = true)]
    format: OutputFormat,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Update the configured stack and report the raw response.
    Smoke(SmokeCommand),
    /// Validate a template remotely and check parameters locally.
    Validate(StackArgs),
    /// Create a stack.
    Create(StackArgs),
    /// Update a stack.
    Update(StackArgs),
    /// Delete a stack.
    Delete(StackArgs),
    /// Describe a stack.
    Describe(StackArgs),
    /// Print the stack status.
    Status(StackArgs),
    /// Report whether a stack exists (exit code 2 when absent).
    Exists(StackArgs),
    /// Poll until a stack leaves every in-progress status.
    Wait(WaitCommand),
    /// Parameter utilities.
    Params {
        /// Selected params subcommand.
        #[command(subcommand)]
        command: ParamsCommand,
    },
    /// Endpoint readiness utilities.
    Endpoint {
        /// Selected endpoint subcommand.
        #[command(subcommand)]
        command: EndpointCommand,
    },
}

/// Stack selection flags shared by lifecycle commands.
#[derive(Args, Debug, Clone, Default)]
struct StackArgs {
    /// Stack name (overrides `stack.name`).
    #[arg(long, value_name = "NAME")]
    stack_name: Option<String>,
    /// Template path (overrides `stack.template`).
    #[arg(long, value_name = "PATH")]
    template: Option<PathBuf>,
    /// YAML parameter file (overrides `stack.parameters_file`).
    #[arg(long, value_name = "PATH")]
    parameters_file: Option<PathBuf>,
    /// Parameter override in `KEY=VALUE` form (repeatable).
    #[arg(long = "param", value_name = "KEY=VALUE")]
    params: Vec<String>,
    /// Capability to acknowledge (repeatable).
    #[arg(long = "capability", value_name = "CAPABILITY")]
    capabilities: Vec<String>,
}

/// Configuration for the `smoke` command.
#[derive(Args, Debug)]
struct SmokeCommand {
    /// Template path.
    #[arg(long, value_name = "PATH")]
    template: Option<PathBuf>,
    /// Stack name.
    #[arg(long, value_name = "NAME")]
    stack_name: Option<String>,
    /// Parameter override in `KEY=VALUE` form (repeatable).
    #[arg(long = "param", value_name = "KEY=VALUE")]
    params: Vec<String>,
    /// Required update outcome.
    #[arg(long, value_enum, default_value_t = ExpectArg::Any)]
    expect: ExpectArg,
    /// Create the stack before updating it.
    #[arg(long, action = ArgAction::SetTrue)]
    create_first: bool,
    /// Start the configured mock server when the endpoint is not reachable.
    #[arg(long, action = ArgAction::SetTrue)]
    start_mock: bool,
}

/// Configuration for the `wait` command.
#[derive(Args, Debug)]
struct WaitCommand {
    /// Stack selection flags.
    #[command(flatten)]
    stack: StackArgs,
    /// Maximum status checks (overrides `wait.attempts`).
    #[arg(long, value_name = "N")]
    attempts: Option<u32>,
    /// Delay between checks in milliseconds (overrides `wait.interval_ms`).
    #[arg(long, value_name = "MS")]
    interval_ms: Option<u64>,
}

/// Params subcommands.
#[derive(Subcommand, Debug)]
enum ParamsCommand {
    /// Print the merged parameter map.
    Show(StackArgs),
}

/// Endpoint subcommands.
#[derive(Subcommand, Debug)]
enum EndpointCommand {
    /// Probe the endpoint once.
    Probe,
    /// Wait until the endpoint accepts connections.
    Wait {
        /// Maximum probes (overrides `mock_server.attempts`).
        #[arg(long, value_name = "N")]
        attempts: Option<u32>,
    },
}

/// Output format for command results.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Pretty-printed JSON.
    Json,
    /// Human-readable text.
    Text,
}

/// Expected smoke outcome.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum ExpectArg {
    /// Accept any successful response.
    Any,
    /// Require an accepted update.
    Updated,
    /// Require "no updates are to be performed".
    Unchanged,
}

impl From<ExpectArg> for ExpectedOutcome {
    fn from(value: ExpectArg) -> Self {
        match value {
            ExpectArg::Any => Self::Any,
            ExpectArg::Updated => Self::Updated,
            ExpectArg::Unchanged => Self::Unchanged,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

impl From<StackError> for CliError {
    fn from(err: StackError) -> Self {
        Self::new(err.to_string())
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::new(err.to_string())
    }
}

impl From<ParameterError> for CliError {
    fn from(err: ParameterError) -> Self {
        Self::new(err.to_string())
    }
}

impl From<EndpointError> for CliError {
    fn from(err: EndpointError) -> Self {
        Self::new(err.to_string())
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();

    if cli.show_version {
        write_stdout_line(&format!("stackctl {}", env!("CARGO_PKG_VERSION")))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    let config = load_config(cli.config.as_deref(), cli.endpoint, cli.region)?;
    let format = cli.format;

    match command {
        Commands::Smoke(command) => command_smoke(&config, format, &command).await,
        Commands::Validate(args) => command_validate(&config, format, &args).await,
        Commands::Create(args) => command_create(&config, format, &args).await,
        Commands::Update(args) => command_update(&config, format, &args).await,
        Commands::Delete(args) => command_delete(&config, format, &args).await,
        Commands::Describe(args) => command_describe(&config, format, &args).await,
        Commands::Status(args) => command_status(&config, format, &args).await,
        Commands::Exists(args) => command_exists(&config, format, &args).await,
        Commands::Wait(command) => command_wait(&config, format, &command).await,
        Commands::Params {
            command: ParamsCommand::Show(args),
        } => command_params_show(&config, format, &args),
        Commands::Endpoint {
            command,
        } => command_endpoint(&config, format, command).await,
    }
}

/// Loads configuration and applies global flag overrides.
fn load_config(
    path: Option<&std::path::Path>,
    endpoint: Option<String>,
    region: Option<String>,
) -> CliResult<StackctlConfig> {
    let mut config = StackctlConfig::load(path)?;
    apply_global_overrides(&mut config, endpoint, region)?;
    Ok(config)
}

/// Applies `--endpoint` and `--region` and revalidates.
fn apply_global_overrides(
    config: &mut StackctlConfig,
    endpoint: Option<String>,
    region: Option<String>,
) -> CliResult<()> {
    if let Some(endpoint) = endpoint {
        config.endpoint.url = Some(endpoint);
    }
    if let Some(region) = region {
        config.endpoint.region = region;
    }
    config.validate()?;
    Ok(())
}

/// Connects a stack manager using the configured endpoint and audit sink.
async fn connect(config: &StackctlConfig) -> CliResult<StackManager> {
    let audit = config.audit_sink()?;
    Ok(StackManager::connect(&config.client_settings(), audit).await)
}

// ============================================================================
// SECTION: Smoke Command
// ============================================================================

/// JSON output for the `smoke` command.
#[derive(Debug, Serialize)]
struct SmokeOutput<'a> {
    /// Smoke report.
    #[serde(flatten)]
    report: &'a SmokeReport,
    /// Required outcome.
    expected: &'static str,
    /// Whether the report satisfies the expectation.
    satisfied: bool,
}

/// Executes the `smoke` command.
async fn command_smoke(
    config: &StackctlConfig,
    format: OutputFormat,
    command: &SmokeCommand,
) -> CliResult<ExitCode> {
    let request = smoke_request(config, command)?;
    let expected = ExpectedOutcome::from(command.expect);

    let server = if command.start_mock {
        let url = config.endpoint_url().ok_or_else(|| {
            CliError::new("--start-mock requires an endpoint url".to_string())
        })?;
        let address = endpoint_address(url)?;
        Some(
            MockServer::ensure_running(
                &config.mock_server.command,
                &address,
                config.readiness_policy(),
            )
            .await?,
        )
    } else {
        None
    };

    let result = match connect(config).await {
        Ok(manager) => run_update_smoke(&manager, &request).await.map_err(CliError::from),
        Err(err) => Err(err),
    };
    let stopped = match server {
        Some(server) => server.stop().await.map(|_| ()),
        None => Ok(()),
    };
    let report = settle_smoke(result, stopped)?;

    let satisfied = report.satisfies(expected);
    match format {
        OutputFormat::Json => write_json(&SmokeOutput {
            report: &report,
            expected: expected.label(),
            satisfied,
        })?,
        OutputFormat::Text => write_text(&report.raw_response)?,
    }
    if satisfied {
        return Ok(ExitCode::SUCCESS);
    }
    write_stderr_line(&format!(
        "expected outcome {} but update was {}",
        expected.label(),
        report.outcome.label()
    ))
    .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    Ok(ExitCode::from(EXIT_UNMET))
}

/// Builds the smoke request from the `[stack]` section with command overrides.
fn smoke_request(config: &StackctlConfig, command: &SmokeCommand) -> CliResult<SmokeRequest> {
    let mut request = SmokeRequest::from_definition(config.stack_definition());
    if let Some(name) = &command.stack_name {
        request.definition.name.clone_from(name);
    }
    if let Some(template) = &command.template {
        request.definition.template_path.clone_from(template);
    }
    for raw in &command.params {
        let parameter = parse_override(raw)?;
        request.definition.parameters.insert(parameter.key, parameter.value);
    }
    request.create_first = command.create_first;
    Ok(request)
}

/// Returns the smoke result; a mock server stop failure is only reported.
fn settle_smoke(
    result: CliResult<SmokeReport>,
    stopped: Result<(), EndpointError>,
) -> CliResult<SmokeReport> {
    if let Err(err) = stopped {
        let _ = write_stderr_line(&format!("warning: {err}"));
    }
    result
}

// ============================================================================
// SECTION: Stack Commands
// ============================================================================

/// JSON output for the `validate` command.
#[derive(Debug, Serialize)]
struct ValidateOutput {
    /// Template path.
    template: String,
    /// Remote validation result.
    validation: TemplateValidation,
    /// Local parameter check; absent when the template cannot be parsed locally.
    #[serde(skip_serializing_if = "Option::is_none")]
    parameter_check: Option<ParameterCheck>,
}

/// JSON output for the `update` command.
#[derive(Debug, Serialize)]
struct UpdateOutput<'a> {
    /// Stack name.
    stack_name: &'a str,
    /// Update outcome.
    #[serde(flatten)]
    outcome: &'a UpdateOutcome,
    /// Raw service response.
    raw_response: &'a str,
}

/// Executes the `validate` command.
async fn command_validate(
    config: &StackctlConfig,
    format: OutputFormat,
    args: &StackArgs,
) -> CliResult<ExitCode> {
    let definition = stack_definition(config, args)?;
    let template = definition.load_template().map_err(StackError::from)?;
    let parameters = definition.resolve_parameters()?;
    let parameter_check = local_parameter_check(&template, &parameters);
    let manager = connect(config).await?;
    let validation = manager.validate_template(&template).await?;
    let output = ValidateOutput {
        template: definition.template_path.display().to_string(),
        validation,
        parameter_check,
    };
    match format {
        OutputFormat::Json => write_json(&output)?,
        OutputFormat::Text => write_text(&render_validation(&output))?,
    }
    Ok(ExitCode::SUCCESS)
}

/// Compares parameters with the template's declarations when the template
/// parses locally; the service remains the authority on template syntax.
fn local_parameter_check(
    template: &TemplateBody,
    parameters: &ParameterSet,
) -> Option<ParameterCheck> {
    check_parameters(template, parameters).ok()
}

/// Executes the `create` command.
async fn command_create(
    config: &StackctlConfig,
    format: OutputFormat,
    args: &StackArgs,
) -> CliResult<ExitCode> {
    let definition = stack_definition(config, args)?;
    let manager = connect(config).await?;
    let stack_id = manager.create_stack(&definition).await?;
    match format {
        OutputFormat::Json => write_json(&serde_json::json!({
            "stack_name": definition.name,
            "stack_id": stack_id,
        }))?,
        OutputFormat::Text => write_text(&stack_id)?,
    }
    Ok(ExitCode::SUCCESS)
}

/// Executes the `update` command.
async fn command_update(
    config: &StackctlConfig,
    format: OutputFormat,
    args: &StackArgs,
) -> CliResult<ExitCode> {
    let definition = stack_definition(config, args)?;
    let manager = connect(config).await?;
    let report = manager.update_stack(&definition).await?;
    match format {
        OutputFormat::Json => write_json(&UpdateOutput {
            stack_name: &definition.name,
            outcome: &report.outcome,
            raw_response: &report.raw_response,
        })?,
        OutputFormat::Text => write_text(&report.raw_response)?,
    }
    Ok(ExitCode::SUCCESS)
}

/// Executes the `delete` command.
async fn command_delete(
    config: &StackctlConfig,
    format: OutputFormat,
    args: &StackArgs,
) -> CliResult<ExitCode> {
    let name = stack_name(config, args);
    let manager = connect(config).await?;
    manager.delete_stack(&name).await?;
    match format {
        OutputFormat::Json => write_json(&serde_json::json!({
            "stack_name": name,
            "deleted": true,
        }))?,
        OutputFormat::Text => write_text(&format!("deleted {name}"))?,
    }
    Ok(ExitCode::SUCCESS)
}

/// Executes the `describe` command.
async fn command_describe(
    config: &StackctlConfig,
    format: OutputFormat,
    args: &StackArgs,
) -> CliResult<ExitCode> {
    let name = stack_name(config, args);
    let manager = connect(config).await?;
    let summary = manager.describe_stack(&name).await?;
    match format {
        OutputFormat::Json => write_json(&summary)?,
        OutputFormat::Text => write_text(&render_summary(&summary))?,
    }
    Ok(ExitCode::SUCCESS)
}

/// Executes the `status` command.
async fn command_status(
    config: &StackctlConfig,
    format: OutputFormat,
    args: &StackArgs,
) -> CliResult<ExitCode> {
    let name = stack_name(config, args);
    let manager = connect(config).await?;
    let status = manager.stack_status(&name).await?;
    match format {
        OutputFormat::Json => write_json(&serde_json::json!({
            "stack_name": name,
            "status": status,
        }))?,
        OutputFormat::Text => write_text(&status)?,
    }
    Ok(ExitCode::SUCCESS)
}

/// Executes the `exists` command.
async fn command_exists(
    config: &StackctlConfig,
    format: OutputFormat,
    args: &StackArgs,
) -> CliResult<ExitCode> {
    let name = stack_name(config, args);
    let manager = connect(config).await?;
    let exists = manager.exists(&name).await?;
    match format {
        OutputFormat::Json => write_json(&serde_json::json!({
            "stack_name": name,
            "exists": exists,
        }))?,
        OutputFormat::Text => write_text(if exists { "true" } else { "false" })?,
    }
    Ok(if exists { ExitCode::SUCCESS } else { ExitCode::from(EXIT_UNMET) })
}

/// Executes the `wait` command.
async fn command_wait(
    config: &StackctlConfig,
    format: OutputFormat,
    command: &WaitCommand,
) -> CliResult<ExitCode> {
    let name = stack_name(config, &command.stack);
    let mut policy = config.poll_policy();
    if let Some(attempts) = command.attempts {
        if attempts == 0 {
            return Err(CliError::new("--attempts must be > 0".to_string()));
        }
        policy.attempts = attempts;
    }
    if let Some(interval_ms) = command.interval_ms {
        policy.interval = Duration::from_millis(interval_ms);
    }
    let manager = connect(config).await?;
    let summary = manager.wait_for_stable(&name, policy).await?;
    match format {
        OutputFormat::Json => write_json(&summary)?,
        OutputFormat::Text => write_text(&render_summary(&summary))?,
    }
    Ok(ExitCode::SUCCESS)
}

/// Executes `params show`.
fn command_params_show(
    config: &StackctlConfig,
    format: OutputFormat,
    args: &StackArgs,
) -> CliResult<ExitCode> {
    let definition = stack_definition(config, args)?;
    let parameters = definition.resolve_parameters()?;
    match format {
        OutputFormat::Json => write_json(&parameters)?,
        OutputFormat::Text => write_text(&render_parameters(&parameters))?,
    }
    Ok(ExitCode::SUCCESS)
}

/// Resolves the stack name from flags or config.
fn stack_name(config: &StackctlConfig, args: &StackArgs) -> String {
    args.stack_name.clone().unwrap_or_else(|| config.stack.name.clone())
}

/// Builds a stack definition from config with flag overrides applied.
fn stack_definition(config: &StackctlConfig, args: &StackArgs) -> CliResult<StackDefinition> {
    let mut definition = config.stack_definition();
    if let Some(name) = &args.stack_name {
        definition.name.clone_from(name);
    }
    if let Some(template) = &args.template {
        definition.template_path.clone_from(template);
    }
    if let Some(parameters_file) = &args.parameters_file {
        definition.parameters_file = Some(parameters_file.clone());
    }
    for raw in &args.params {
        let parameter = parse_override(raw)?;
        definition.parameters.insert(parameter.key, parameter.value);
    }
    for capability in &args.capabilities {
        if !definition.capabilities.contains(capability) {
            definition.capabilities.push(capability.clone());
        }
    }
    Ok(definition)
}

// ============================================================================
// SECTION: Endpoint Commands
// ============================================================================

/// Executes the `endpoint` subcommands.
async fn command_endpoint(
    config: &StackctlConfig,
    format: OutputFormat,
    command: EndpointCommand,
) -> CliResult<ExitCode> {
    let url = config.endpoint_url().unwrap_or(DEFAULT_ENDPOINT_URL);
    let address = endpoint_address(url)?;
    let mut policy = config.readiness_policy();
    match command {
        EndpointCommand::Probe => {
            if !probe(&address, policy.probe_timeout).await {
                return Err(CliError::new(format!("endpoint {address} is not reachable")));
            }
            match format {
                OutputFormat::Json => write_json(&serde_json::json!({
                    "address": address,
                    "ready": true,
                }))?,
                OutputFormat::Text => write_text(&format!("{address} ready"))?,
            }
        }
        EndpointCommand::Wait {
            attempts,
        } => {
            if let Some(attempts) = attempts {
                if attempts == 0 {
                    return Err(CliError::new("--attempts must be > 0".to_string()));
                }
                policy.attempts = attempts;
            }
            let used = wait_until_ready(&address, policy).await?;
            match format {
                OutputFormat::Json => write_json(&serde_json::json!({
                    "address": address,
                    "ready": true,
                    "attempts": used,
                }))?,
                OutputFormat::Text => {
                    write_text(&format!("{address} ready after {used} attempt(s)"))?;
                }
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Renders a stack summary as text.
fn render_summary(summary: &StackSummary) -> String {
    let mut output = format!("{} {}", summary.stack_name, summary.status);
    if let Some(reason) = &summary.status_reason {
        let _ = write!(output, " ({reason})");
    }
    if let Some(stack_id) = &summary.stack_id {
        let _ = write!(output, "\nid: {stack_id}");
    }
    if let Some(created) = &summary.creation_time {
        let _ = write!(output, "\ncreated: {created}");
    }
    for parameter in &summary.parameters {
        let _ = write!(output, "\n{}={}", parameter.key, parameter.value);
    }
    output
}

/// Renders a parameter set as `KEY=VALUE` lines.
fn render_parameters(parameters: &ParameterSet) -> String {
    parameters
        .iter()
        .map(|parameter| format!("{}={}", parameter.key, parameter.value))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders a validation result as text.
fn render_validation(output: &ValidateOutput) -> String {
    let mut text = format!("{} valid", output.template);
    if let Some(description) = &output.validation.description {
        let _ = write!(text, "\ndescription: {description}");
    }
    if !output.validation.parameters.is_empty() {
        let _ = write!(text, "\nparameters: {}", output.validation.parameters.join(", "));
    }
    if let Some(check) = &output.parameter_check {
        if !check.undeclared.is_empty() {
            let _ = write!(text, "\nundeclared: {}", check.undeclared.join(", "));
        }
        if !check.missing.is_empty() {
            let _ = write!(text, "\nmissing: {}", check.missing.join(", "));
        }
    }
    text
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Prints CLI help.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a value as pretty JSON to stdout.
fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::new(format!("failed to render json: {err}")))?;
    write_text(&rendered)
}

/// Writes text to stdout.
fn write_text(message: &str) -> CliResult<()> {
    write_stdout_line(message).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
