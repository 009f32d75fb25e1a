// crates/gateway-cli/src/config.rs
// ============================================================================
// Module: Gateway Configuration
// Description: Configuration loading and validation for the MCP gateway.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with a hard size limit. Missing
//! or invalid configuration fails closed rather than silently falling back
//! to permissive defaults for the security-relevant fields (`allow_private_ips`).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "mcp-gateway.toml";
/// Environment variable used to override the config path.
const CONFIG_ENV_VAR: &str = "MCP_GATEWAY_CONFIG";
/// Maximum configuration file size in bytes.
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Top-level gateway configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Address the HTTP listener binds to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,
    /// HTTP path the JSON-RPC endpoint is mounted at.
    #[serde(default = "default_endpoint_path")]
    pub endpoint_path: String,
    /// Circuit breaker settings.
    #[serde(default)]
    pub breaker: BreakerSettings,
    /// Outbound proxy settings.
    #[serde(default)]
    pub proxy: ProxySettings,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            endpoint_path: default_endpoint_path(),
            breaker: BreakerSettings::default(),
            proxy: ProxySettings::default(),
        }
    }
}

/// Circuit breaker configuration, applied uniformly to every upstream.
#[derive(Debug, Clone, Deserialize)]
pub struct BreakerSettings {
    /// Consecutive failures required to trip the breaker.
    #[serde(default = "default_fail_threshold")]
    pub fail_threshold: u32,
    /// Milliseconds the breaker stays open before allowing a probe.
    #[serde(default = "default_open_duration_ms")]
    pub open_duration_ms: u64,
}

impl Default for BreakerSettings {
    fn default() -> Self {
        Self {
            fail_threshold: default_fail_threshold(),
            open_duration_ms: default_open_duration_ms(),
        }
    }
}

impl BreakerSettings {
    /// Converts the settings into the runtime [`gateway_breaker::BreakerConfig`].
    #[must_use]
    pub fn to_breaker_config(&self) -> gateway_breaker::BreakerConfig {
        gateway_breaker::BreakerConfig::new(self.fail_threshold, Duration::from_millis(self.open_duration_ms))
    }
}

/// Outbound proxy configuration.
///
/// # Security
/// `allow_private_ips` MUST default to `false`; it exists only so
/// integration tests can target loopback upstreams.
#[derive(Debug, Clone, Deserialize)]
pub struct ProxySettings {
    /// Allows the proxy client to dial private/loopback/link-local addresses.
    #[serde(default)]
    pub allow_private_ips: bool,
    /// Companion flag that must also be set for `allow_private_ips` to take
    /// effect; without it, [`GatewayConfig::validate`] rejects the config.
    #[serde(default)]
    pub insecure_test_mode: bool,
    /// Hard cap on bytes read from an upstream response body.
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
    /// Per-call timeout for the outbound request.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for ProxySettings {
    fn default() -> Self {
        Self {
            allow_private_ips: false,
            insecure_test_mode: false,
            max_response_bytes: default_max_response_bytes(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl ProxySettings {
    /// Converts the settings into the runtime [`gateway_proxy::ProxyConfig`].
    #[must_use]
    pub fn to_proxy_config(&self) -> gateway_proxy::ProxyConfig {
        gateway_proxy::ProxyConfig {
            allow_private_ips: self.allow_private_ips,
            max_response_bytes: self.max_response_bytes,
            request_timeout: Duration::from_millis(self.request_timeout_ms),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    "127.0.0.1:8743".parse().expect("literal listen address is valid")
}

fn default_endpoint_path() -> String {
    "/mcp".to_string()
}

const fn default_fail_threshold() -> u32 {
    5
}

const fn default_open_duration_ms() -> u64 {
    30_000
}

const fn default_max_response_bytes() -> usize {
    10 * 1024 * 1024
}

const fn default_request_timeout_ms() -> u64 {
    30_000
}

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// Path that failed to read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The config file exceeded [`MAX_CONFIG_FILE_SIZE`].
    #[error("config file {path} is too large ({size} bytes, max {MAX_CONFIG_FILE_SIZE})")]
    TooLarge {
        /// Path that was rejected.
        path: String,
        /// Size in bytes that was rejected.
        size: u64,
    },
    /// The config file was not valid TOML for [`GatewayConfig`].
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    /// `proxy.allow_private_ips` was set without the companion
    /// `proxy.insecure_test_mode` flag.
    #[error(
        "proxy.allow_private_ips=true requires proxy.insecure_test_mode=true; \
         refusing to disable SSRF protection without an explicit opt-in"
    )]
    PrivateIpsRequireTestMode,
}

impl GatewayConfig {
    /// Loads configuration from `MCP_GATEWAY_CONFIG`, or `mcp-gateway.toml`
    /// in the current directory if that variable is unset and the file
    /// exists; otherwise returns [`GatewayConfig::default`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a configured path exists but cannot be
    /// read or parsed, or fails [`GatewayConfig::validate`]. A missing
    /// default path is not an error.
    pub fn load() -> Result<Self, ConfigError> {
        let path = env::var(CONFIG_ENV_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_NAME.to_string());
        if !Path::new(&path).exists() {
            if env::var(CONFIG_ENV_VAR).is_ok() {
                return Err(ConfigError::Read {
                    path,
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                });
            }
            let config = Self::default();
            config.validate()?;
            return Ok(config);
        }
        Self::load_from_path(&path)
    }

    /// Loads configuration from an explicit path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, exceeds the
    /// size cap, fails to parse, or fails [`GatewayConfig::validate`].
    pub fn load_from_path(path: &str) -> Result<Self, ConfigError> {
        let metadata = fs::metadata(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::TooLarge {
                path: path.to_string(),
                size: metadata.len(),
            });
        }
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        let config: Self = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects configurations that disable SSRF protection without an
    /// explicit test-mode opt-in.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::PrivateIpsRequireTestMode`] when
    /// `proxy.allow_private_ips` is `true` and `proxy.insecure_test_mode`
    /// is not.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.proxy.allow_private_ips && !self.proxy.insecure_test_mode {
            return Err(ConfigError::PrivateIpsRequireTestMode);
        }
        Ok(())
    }
}
