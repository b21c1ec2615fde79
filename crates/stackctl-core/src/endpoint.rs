// crates/stackctl-core/src/endpoint.rs
// ============================================================================
// Module: Endpoint Readiness
// Description: TCP readiness probes and mock-server process control.
// Purpose: Ensure a local CloudFormation endpoint is up before issuing calls.
// Dependencies: tokio, url, thiserror
// ============================================================================

//! ## Overview
//! Mock endpoints (moto, LocalStack) are plain HTTP servers. Readiness is a
//! successful TCP connect to the endpoint's `host:port`. [`MockServer`]
//! either adopts a server that is already listening or spawns one and waits
//! for it; only servers it spawned are stopped.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpStream;
use tokio::process::Child;
use tokio::process::Command;
use tokio::time::sleep;
use tokio::time::timeout;
use url::Url;

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default command used to start a local mock endpoint.
pub const DEFAULT_MOCK_COMMAND: &[&str] = &["python", "-m", "moto.server"];

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Endpoint readiness and process control failures.
#[derive(Debug, Error)]
pub enum EndpointError {
    /// The endpoint URL is malformed or unsupported.
    #[error("invalid endpoint url {url}: {reason}")]
    InvalidUrl {
        /// Offending URL.
        url: String,
        /// Failure reason.
        reason: String,
    },
    /// The endpoint did not accept connections within the readiness budget.
    #[error("endpoint {address} not ready after {attempts} attempts")]
    NotReady {
        /// Probed address.
        address: String,
        /// Probes performed.
        attempts: u32,
    },
    /// The mock server command is empty.
    #[error("mock server command is empty")]
    EmptyCommand,
    /// The mock server process could not be started or stopped.
    #[error("mock server process error: {0}")]
    Process(String),
}

// ============================================================================
// SECTION: Probing
// ============================================================================

/// Readiness polling budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessPolicy {
    /// Maximum number of probes.
    pub attempts: u32,
    /// Delay between failed probes.
    pub interval: Duration,
    /// Connect timeout for a single probe.
    pub probe_timeout: Duration,
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self {
            attempts: 60,
            interval: Duration::from_secs(1),
            probe_timeout: Duration::from_secs(1),
        }
    }
}

/// Resolves the `host:port` address of an http(s) endpoint URL.
///
/// # Errors
///
/// Returns [`EndpointError::InvalidUrl`] for unparsable URLs, non-http(s)
/// schemes, or URLs without a host.
pub fn endpoint_address(endpoint_url: &str) -> Result<String, EndpointError> {
    let invalid = |reason: &str| EndpointError::InvalidUrl {
        url: endpoint_url.to_string(),
        reason: reason.to_string(),
    };
    let url = Url::parse(endpoint_url).map_err(|err| invalid(&err.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    let host = url.host_str().ok_or_else(|| invalid("missing host"))?;
    let port = url.port_or_known_default().ok_or_else(|| invalid("missing port"))?;
    Ok(format!("{host}:{port}"))
}

/// Performs a single TCP connect probe.
pub async fn probe(address: &str, probe_timeout: Duration) -> bool {
    matches!(timeout(probe_timeout, TcpStream::connect(address)).await, Ok(Ok(_)))
}

/// Probes until the address accepts connections, returning the attempts used.
///
/// # Errors
///
/// Returns [`EndpointError::NotReady`] when every probe fails.
pub async fn wait_until_ready(address: &str, policy: ReadinessPolicy) -> Result<u32, EndpointError> {
    let mut attempts = 0u32;
    while attempts < policy.attempts {
        attempts = attempts.saturating_add(1);
        if probe(address, policy.probe_timeout).await {
            return Ok(attempts);
        }
        if attempts < policy.attempts {
            sleep(policy.interval).await;
        }
    }
    Err(EndpointError::NotReady {
        address: address.to_string(),
        attempts,
    })
}

// ============================================================================
// SECTION: Mock Server
// ============================================================================

/// Handle for a local mock endpoint.
pub enum MockServer {
    /// Server was already running; it is never stopped by this handle.
    External {
        /// Endpoint address.
        address: String,
    },
    /// Server process spawned by this handle.
    Owned {
        /// Endpoint address.
        address: String,
        /// Child process (killed on drop).
        child: Child,
    },
}

/// Result of stopping a mock server handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// The owned process was terminated.
    Stopped,
    /// The server was started externally and left running.
    LeftRunning,
}

impl MockServer {
    /// Adopts a running endpoint or spawns `command` and waits for readiness.
    ///
    /// # Errors
    ///
    /// Returns [`EndpointError`] when the command is empty, cannot be spawned,
    /// or the spawned server never becomes ready.
    pub async fn ensure_running(
        command: &[String],
        address: &str,
        policy: ReadinessPolicy,
    ) -> Result<Self, EndpointError> {
        if probe(address, policy.probe_timeout).await {
            return Ok(Self::External {
                address: address.to_string(),
            });
        }
        let (program, args) = command.split_first().ok_or(EndpointError::EmptyCommand)?;
        let mut child = Command::new(program)
            .args(args)
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| EndpointError::Process(format!("spawn {program} failed: {err}")))?;
        if let Err(err) = wait_until_ready(address, policy).await {
            let _ = child.kill().await;
            return Err(err);
        }
        Ok(Self::Owned {
            address: address.to_string(),
            child,
        })
    }

    /// Returns the endpoint address.
    #[must_use]
    pub fn address(&self) -> &str {
        match self {
            Self::External {
                address,
            }
            | Self::Owned {
                address, ..
            } => address,
        }
    }

    /// Returns true when this handle owns the server process.
    #[must_use]
    pub const fn is_owned(&self) -> bool {
        matches!(self, Self::Owned { .. })
    }

    /// Stops an owned server; external servers are left running.
    ///
    /// # Errors
    ///
    /// Returns [`EndpointError::Process`] when the process cannot be killed.
    pub async fn stop(self) -> Result<StopOutcome, EndpointError> {
        match self {
            Self::External {
                ..
            } => Ok(StopOutcome::LeftRunning),
            Self::Owned {
                mut child, ..
            } => {
                let pid = child.id();
                child.kill().await.map_err(|err| {
                    EndpointError::Process(format!(
                        "failed to stop mock server (pid {}): {err}",
                        pid.map_or_else(|| "unknown".to_string(), |pid| pid.to_string())
                    ))
                })?;
                Ok(StopOutcome::Stopped)
            }
        }
    }
}
