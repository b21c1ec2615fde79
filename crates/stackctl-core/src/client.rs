// crates/stackctl-core/src/client.rs
// ============================================================================
// Module: CloudFormation Client
// Description: SDK client construction for real and mock endpoints.
// Purpose: Build a CloudFormation client from explicit settings.
// Dependencies: aws-config, aws-sdk-cloudformation
// ============================================================================

//! ## Overview
//! Client settings are resolved by the caller (config file, CLI flags) and
//! applied on top of the SDK default chain. Retries are always disabled: every
//! API call is attempted exactly once.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use aws_config::BehaviorVersion;
use aws_config::Region;
use aws_config::retry::RetryConfig;
use aws_config::timeout::TimeoutConfig;
use aws_sdk_cloudformation::Client;
use aws_sdk_cloudformation::config::Credentials;

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default local mock endpoint.
pub const DEFAULT_ENDPOINT_URL: &str = "http://localhost:5000";
/// Default AWS region.
pub const DEFAULT_REGION: &str = "us-east-1";
/// Provider name reported for static credentials.
const STATIC_CREDENTIALS_PROVIDER: &str = "stackctl-static";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Static access keys, typically used against mock endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticCredentials {
    /// Access key id.
    pub access_key_id: String,
    /// Secret access key.
    pub secret_access_key: String,
}

/// Settings used to construct a CloudFormation client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    /// AWS region.
    pub region: String,
    /// Endpoint override (mock servers, LocalStack).
    pub endpoint_url: Option<String>,
    /// Static credentials; the SDK default chain is used when absent.
    pub credentials: Option<StaticCredentials>,
    /// Per-operation timeout.
    pub operation_timeout: Option<Duration>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            endpoint_url: Some(DEFAULT_ENDPOINT_URL.to_string()),
            credentials: None,
            operation_timeout: None,
        }
    }
}

// ============================================================================
// SECTION: Construction
// ============================================================================

/// Builds a CloudFormation client from settings.
pub async fn build_client(settings: &ClientSettings) -> Client {
    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(settings.region.clone()))
        .retry_config(RetryConfig::disabled());
    if let Some(endpoint) = &settings.endpoint_url {
        loader = loader.endpoint_url(endpoint);
    }
    if let Some(credentials) = &settings.credentials {
        loader = loader.credentials_provider(Credentials::new(
            credentials.access_key_id.clone(),
            credentials.secret_access_key.clone(),
            None,
            None,
            STATIC_CREDENTIALS_PROVIDER,
        ));
    }
    if let Some(timeout) = settings.operation_timeout {
        loader = loader.timeout_config(TimeoutConfig::builder().operation_timeout(timeout).build());
    }
    let shared_config = loader.load().await;
    Client::new(&shared_config)
}
