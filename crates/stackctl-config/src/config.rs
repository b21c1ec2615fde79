// crates/stackctl-config/src/config.rs
// ============================================================================
// Module: Stackctl Configuration
// Description: Configuration model and loading for stackctl.toml.
// Purpose: Resolve endpoint, stack, audit, and mock-server settings.
// Dependencies: serde, toml, url, stackctl-core
// ============================================================================

//! ## Overview
//! Configuration is optional. When no file is given and neither
//! `STACKCTL_CONFIG` nor `./stackctl.toml` is present, built-in defaults
//! target a local mock endpoint. Explicitly named files must exist. Unknown
//! fields are rejected.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use stackctl_core::ClientSettings;
use stackctl_core::FileAuditSink;
use stackctl_core::NoopAuditSink;
use stackctl_core::ParameterSet;
use stackctl_core::PollPolicy;
use stackctl_core::ReadinessPolicy;
use stackctl_core::StackAuditSink;
use stackctl_core::StackDefinition;
use stackctl_core::StaticCredentials;
use stackctl_core::StderrAuditSink;
use stackctl_core::client::DEFAULT_ENDPOINT_URL;
use stackctl_core::client::DEFAULT_REGION;
use stackctl_core::endpoint::DEFAULT_MOCK_COMMAND;
use stackctl_core::smoke::DEFAULT_SMOKE_STACK;
use stackctl_core::smoke::DEFAULT_SMOKE_TEMPLATE;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Default config file name.
pub(crate) const DEFAULT_CONFIG_NAME: &str = "stackctl.toml";
/// Environment variable for config path override.
pub(crate) const CONFIG_ENV_VAR: &str = "STACKCTL_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Top-level stackctl configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StackctlConfig {
    /// Endpoint settings.
    #[serde(default)]
    pub endpoint: EndpointConfig,
    /// Stack settings.
    #[serde(default)]
    pub stack: StackConfig,
    /// Audit logging settings.
    #[serde(default)]
    pub audit: AuditConfig,
    /// Mock server settings.
    #[serde(default)]
    pub mock_server: MockServerConfig,
    /// Stack status polling settings.
    #[serde(default)]
    pub wait: WaitConfig,
}

/// CloudFormation endpoint settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointConfig {
    /// Endpoint URL; an empty string uses the SDK's regional endpoint.
    #[serde(default = "default_endpoint_url")]
    pub url: Option<String>,
    /// AWS region.
    #[serde(default = "default_region")]
    pub region: String,
    /// Static credentials for mock endpoints.
    #[serde(default)]
    pub credentials: Option<CredentialsConfig>,
    /// Per-operation timeout in milliseconds.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url: default_endpoint_url(),
            region: default_region(),
            credentials: None,
            timeout_ms: None,
        }
    }
}

/// Static credential settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CredentialsConfig {
    /// Access key id.
    pub access_key_id: String,
    /// Secret access key.
    pub secret_access_key: String,
}

/// Stack settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StackConfig {
    /// Stack name.
    #[serde(default = "default_stack_name")]
    pub name: String,
    /// Template path.
    #[serde(default = "default_template")]
    pub template: PathBuf,
    /// Optional YAML parameter file.
    #[serde(default)]
    pub parameters_file: Option<PathBuf>,
    /// Inline parameters applied after the parameter file.
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
    /// Acknowledged capabilities.
    #[serde(default)]
    pub capabilities: Vec<String>,
    /// Disable rollback on create failure.
    #[serde(default)]
    pub disable_rollback: bool,
    /// Create timeout in minutes.
    #[serde(default)]
    pub timeout_minutes: Option<i32>,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            name: default_stack_name(),
            template: default_template(),
            parameters_file: None,
            parameters: BTreeMap::new(),
            capabilities: Vec::new(),
            disable_rollback: false,
            timeout_minutes: None,
        }
    }
}

/// Audit sink selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// JSON lines to stderr.
    #[default]
    Stderr,
    /// JSON lines appended to a file.
    File,
    /// Discard audit events.
    None,
}

/// Audit logging settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Sink kind.
    #[serde(default)]
    pub sink: AuditSinkKind,
    /// Audit log path (required for the file sink).
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Local mock server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MockServerConfig {
    /// Command used to start the mock server.
    #[serde(default = "default_mock_command")]
    pub command: Vec<String>,
    /// Maximum readiness probes.
    #[serde(default = "default_mock_attempts")]
    pub attempts: u32,
    /// Delay between readiness probes in milliseconds.
    #[serde(default = "default_mock_interval_ms")]
    pub interval_ms: u64,
    /// Connect timeout per probe in milliseconds.
    #[serde(default = "default_mock_interval_ms")]
    pub probe_timeout_ms: u64,
}

impl Default for MockServerConfig {
    fn default() -> Self {
        Self {
            command: default_mock_command(),
            attempts: default_mock_attempts(),
            interval_ms: default_mock_interval_ms(),
            probe_timeout_ms: default_mock_interval_ms(),
        }
    }
}

/// Stack status polling settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WaitConfig {
    /// Maximum status checks.
    #[serde(default = "default_mock_attempts")]
    pub attempts: u32,
    /// Delay between status checks in milliseconds.
    #[serde(default = "default_mock_interval_ms")]
    pub interval_ms: u64,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            attempts: default_mock_attempts(),
            interval_ms: default_mock_interval_ms(),
        }
    }
}

// ============================================================================
// SECTION: Loading and Validation
// ============================================================================

impl StackctlConfig {
    /// Loads configuration from an explicit path, `STACKCTL_CONFIG`, or
    /// `./stackctl.toml`, falling back to defaults when the implicit default
    /// file is absent.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, parsed, or validated.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let env_path = env::var(CONFIG_ENV_VAR).ok();
        let Some(resolved) = resolve_path(path, env_path)? else {
            return Ok(Self::default());
        };
        Self::load_file(&resolved)
    }

    /// Loads and validates a specific configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, parsed, or validated.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        if path.to_string_lossy().len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        let bytes = fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first violation found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = self.endpoint_url() {
            let parsed = Url::parse(url)
                .map_err(|err| ConfigError::Invalid(format!("endpoint.url is invalid: {err}")))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ConfigError::Invalid(
                    "endpoint.url must use http or https".to_string(),
                ));
            }
        }
        if self.endpoint.region.trim().is_empty() {
            return Err(ConfigError::Invalid("endpoint.region must be set".to_string()));
        }
        if let Some(credentials) = &self.endpoint.credentials
            && (credentials.access_key_id.is_empty() || credentials.secret_access_key.is_empty())
        {
            return Err(ConfigError::Invalid(
                "endpoint.credentials requires access_key_id and secret_access_key".to_string(),
            ));
        }
        if matches!(self.endpoint.timeout_ms, Some(0)) {
            return Err(ConfigError::Invalid("endpoint.timeout_ms must be > 0".to_string()));
        }
        if self.stack.name.trim().is_empty() {
            return Err(ConfigError::Invalid("stack.name must be set".to_string()));
        }
        if matches!(self.stack.timeout_minutes, Some(minutes) if minutes <= 0) {
            return Err(ConfigError::Invalid("stack.timeout_minutes must be > 0".to_string()));
        }
        if self.audit.sink == AuditSinkKind::File && self.audit.path.is_none() {
            return Err(ConfigError::Invalid("audit.path is required for the file sink".to_string()));
        }
        if self.mock_server.command.first().is_none_or(|program| program.trim().is_empty()) {
            return Err(ConfigError::Invalid("mock_server.command must be non-empty".to_string()));
        }
        if self.mock_server.attempts == 0 {
            return Err(ConfigError::Invalid("mock_server.attempts must be > 0".to_string()));
        }
        if self.wait.attempts == 0 {
            return Err(ConfigError::Invalid("wait.attempts must be > 0".to_string()));
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Conversions into core types
    // ------------------------------------------------------------------------

    /// Returns the endpoint override, treating an empty URL as unset.
    #[must_use]
    pub fn endpoint_url(&self) -> Option<&str> {
        self.endpoint.url.as_deref().filter(|url| !url.trim().is_empty())
    }

    /// Builds SDK client settings.
    #[must_use]
    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            region: self.endpoint.region.clone(),
            endpoint_url: self.endpoint_url().map(str::to_string),
            credentials: self.endpoint.credentials.as_ref().map(|credentials| StaticCredentials {
                access_key_id: credentials.access_key_id.clone(),
                secret_access_key: credentials.secret_access_key.clone(),
            }),
            operation_timeout: self.endpoint.timeout_ms.map(Duration::from_millis),
        }
    }

    /// Builds the configured stack definition.
    #[must_use]
    pub fn stack_definition(&self) -> StackDefinition {
        let mut definition = StackDefinition::new(&self.stack.name, &self.stack.template);
        definition.parameters_file.clone_from(&self.stack.parameters_file);
        definition.parameters = ParameterSet::from_pairs(self.stack.parameters.clone());
        definition.capabilities.clone_from(&self.stack.capabilities);
        definition.disable_rollback = self.stack.disable_rollback;
        definition.timeout_minutes = self.stack.timeout_minutes;
        definition
    }

    /// Builds the mock server readiness policy.
    #[must_use]
    pub const fn readiness_policy(&self) -> ReadinessPolicy {
        ReadinessPolicy {
            attempts: self.mock_server.attempts,
            interval: Duration::from_millis(self.mock_server.interval_ms),
            probe_timeout: Duration::from_millis(self.mock_server.probe_timeout_ms),
        }
    }

    /// Builds the stack status polling policy.
    #[must_use]
    pub const fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            attempts: self.wait.attempts,
            interval: Duration::from_millis(self.wait.interval_ms),
        }
    }

    /// Opens the configured audit sink.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the audit file cannot be opened.
    pub fn audit_sink(&self) -> Result<Arc<dyn StackAuditSink>, ConfigError> {
        match self.audit.sink {
            AuditSinkKind::Stderr => Ok(Arc::new(StderrAuditSink)),
            AuditSinkKind::None => Ok(Arc::new(NoopAuditSink)),
            AuditSinkKind::File => {
                let path = self.audit.path.as_deref().ok_or_else(|| {
                    ConfigError::Invalid("audit.path is required for the file sink".to_string())
                })?;
                let sink = FileAuditSink::new(path).map_err(|err| ConfigError::Io(err.to_string()))?;
                Ok(Arc::new(sink))
            }
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from the argument, then the `STACKCTL_CONFIG`
/// value, then `./stackctl.toml`; `None` means "use defaults".
fn resolve_path(
    path: Option<&Path>,
    env_path: Option<String>,
) -> Result<Option<PathBuf>, ConfigError> {
    if let Some(path) = path {
        return Ok(Some(path.to_path_buf()));
    }
    if let Some(env_path) = env_path {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(Some(PathBuf::from(env_path)));
    }
    let default_path = PathBuf::from(DEFAULT_CONFIG_NAME);
    Ok(default_path.is_file().then_some(default_path))
}

/// Default endpoint URL.
fn default_endpoint_url() -> Option<String> {
    Some(DEFAULT_ENDPOINT_URL.to_string())
}

/// Default region.
fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

/// Default stack name.
fn default_stack_name() -> String {
    DEFAULT_SMOKE_STACK.to_string()
}

/// Default template path.
fn default_template() -> PathBuf {
    PathBuf::from(DEFAULT_SMOKE_TEMPLATE)
}

/// Default mock server command.
fn default_mock_command() -> Vec<String> {
    DEFAULT_MOCK_COMMAND.iter().map(|part| (*part).to_string()).collect()
}

/// Default readiness/poll attempts.
const fn default_mock_attempts() -> u32 {
    60
}

/// Default readiness/poll interval in milliseconds.
const fn default_mock_interval_ms() -> u64 {
    1_000
}

// ============================================================================
// SECTION: Tests
// ============================================================================
