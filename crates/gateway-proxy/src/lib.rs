// crates/gateway-proxy/src/lib.rs
// ============================================================================
// Module: Proxy Client
// Description: SSRF-hardened outbound HTTP client for upstream MCP servers.
// Purpose: Forward a tool invocation to its upstream endpoint safely.
// Dependencies: reqwest, url, rand, serde_json, thiserror, tokio, tokio-util
// ============================================================================

//! ## Overview
//! [`forward`] wraps a tool invocation in a `tools/call` JSON-RPC envelope
//! and sends it to `server_endpoint`. The hostname is resolved once, every
//! candidate address is checked against the private/loopback/link-local
//! ranges, and the outbound connection is pinned to the address that was
//! actually checked — resolving again inside the HTTP client would let the
//! target rebind between the check and the dial. The response body is read
//! chunk by chunk and the read stops as soon as `max_response_bytes + 1`
//! bytes have arrived, so an oversized upstream response never has to be
//! materialized in full before the cap applies.
//! Security posture: redirects are never followed; a non-2xx status is not
//! a proxy error, only a dial/DNS/timeout/private-IP failure is. The call
//! also races against a [`CancellationToken`] so a caller can abort a
//! mid-flight dial or read.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::IpAddr;
use std::net::SocketAddr;
use std::time::Duration;
use std::time::Instant;

use rand::RngCore;
use rand::rngs::OsRng;
use reqwest::Client;
use reqwest::redirect::Policy;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use url::Url;

// ============================================================================
// SECTION: Public Types
// ============================================================================

/// Authentication scheme injected into the outbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthType {
    /// No `Authorization` header.
    None,
    /// `Authorization: Bearer <credential>`.
    Bearer,
    /// `Authorization: Basic <credential>` (credential already base64-encoded).
    Basic,
}

/// A single tool invocation to forward upstream.
#[derive(Debug, Clone)]
pub struct ProxyRequest {
    /// Absolute URL of the upstream MCP server.
    pub server_endpoint: String,
    /// Name of the tool being invoked.
    pub tool_name: String,
    /// Opaque JSON arguments, embedded verbatim in the outbound envelope.
    pub arguments: Value,
    /// Authentication scheme to inject.
    pub auth_type: AuthType,
    /// Plaintext credential (already decrypted), ignored when `auth_type` is `None`.
    pub auth_credential: Option<String>,
}

/// The result of a successful forward; a non-2xx status still produces one.
#[derive(Debug, Clone)]
pub struct ProxyResponse {
    /// HTTP status code returned by the upstream.
    pub status_code: u16,
    /// Raw response body, truncated to `max_response_bytes`.
    pub body: Vec<u8>,
    /// Wall-clock time from envelope construction to body read completion.
    pub latency: Duration,
    /// Length in bytes of the marshalled outbound envelope.
    pub request_size: usize,
    /// Length in bytes of the body actually read (post-truncation).
    pub response_size: usize,
}

/// Per-call proxy configuration.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// When false (the default), resolved addresses in private/loopback/
    /// link-local ranges are rejected. Must only be set `true` in tests.
    pub allow_private_ips: bool,
    /// Hard cap on bytes read from the response body.
    pub max_response_bytes: usize,
    /// Connect + total request timeout.
    pub request_timeout: Duration,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            allow_private_ips: false,
            max_response_bytes: 10 * 1024 * 1024,
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Errors that abort a forward without producing a [`ProxyResponse`].
#[derive(Debug, Error)]
pub enum ProxyError {
    /// `server_endpoint` is not a valid absolute `http`/`https` URL.
    #[error("invalid upstream endpoint: {0}")]
    InvalidEndpoint(String),
    /// `auth_type` was neither `none`, `bearer`, nor `basic`.
    #[error("invalid auth type")]
    InvalidAuth,
    /// Hostname resolution failed.
    #[error("dns lookup failed: {0}")]
    DnsFailure(String),
    /// Every resolved address, or the literal address in the URL, was
    /// private/loopback/link-local and `allow_private_ips` was false.
    #[error("upstream address blocked")]
    PrivateAddressBlocked,
    /// The underlying HTTP client could not be constructed.
    #[error("failed to build http client: {0}")]
    ClientBuild(String),
    /// The request failed to dial, timed out, or the connection was reset.
    #[error("upstream request failed: {0}")]
    RequestFailed(String),
    /// The caller's cancellation context fired before the forward completed.
    #[error("forward cancelled")]
    Cancelled,
}

// ============================================================================
// SECTION: Private-range classification
// ============================================================================

/// Returns true if the IP is private, loopback, link-local, or unspecified.
const fn is_private_or_link_local(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(addr) => {
            addr.is_private()
                || addr.is_loopback()
                || addr.is_link_local()
                || addr.is_unspecified()
        }
        IpAddr::V6(addr) => {
            addr.is_loopback()
                || addr.is_unique_local()
                || addr.is_unicast_link_local()
                || addr.is_unspecified()
        }
    }
}

// ============================================================================
// SECTION: Forward
// ============================================================================

/// Forwards `request` to its upstream endpoint under `config`.
///
/// `cancel` is raced against both the dial and the body read; firing it at
/// any point aborts the forward and returns [`ProxyError::Cancelled`].
///
/// # Errors
///
/// Returns [`ProxyError`] for any failure short of receiving an HTTP
/// response: invalid endpoint/auth, DNS failure, a resolved address in a
/// blocked range, client construction failure, a dial/timeout error, or
/// cancellation. A non-2xx HTTP status is returned as an ordinary
/// [`ProxyResponse`].
pub async fn forward(
    request: &ProxyRequest,
    config: &ProxyConfig,
    cancel: &CancellationToken,
) -> Result<ProxyResponse, ProxyError> {
    if cancel.is_cancelled() {
        return Err(ProxyError::Cancelled);
    }
    let started_at = Instant::now();

    let url = Url::parse(&request.server_endpoint)
        .map_err(|err| ProxyError::InvalidEndpoint(err.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(ProxyError::InvalidEndpoint(format!("unsupported scheme {other}"))),
    }
    let host = url.host_str().ok_or_else(|| ProxyError::InvalidEndpoint("missing host".to_string()))?;
    let port = url.port_or_known_default().ok_or_else(|| {
        ProxyError::InvalidEndpoint("no port and no scheme default".to_string())
    })?;

    let pinned_addr = resolve_and_pin(host, port, config.allow_private_ips).await?;

    let envelope = build_envelope(&request.tool_name, &request.arguments);
    let body = serde_json::to_vec(&envelope).map_err(|err| ProxyError::InvalidEndpoint(err.to_string()))?;
    let request_size = body.len();

    let client = Client::builder()
        .redirect(Policy::none())
        .timeout(config.request_timeout)
        .resolve(host, pinned_addr)
        .build()
        .map_err(|err| ProxyError::ClientBuild(err.to_string()))?;

    let mut builder = client.post(url.clone()).header("content-type", "application/json").body(body);
    builder = inject_auth(builder, request.auth_type, request.auth_credential.as_deref())?;

    let mut response = tokio::select! {
        biased;
        () = cancel.cancelled() => return Err(ProxyError::Cancelled),
        result = builder.send() => result.map_err(|err| ProxyError::RequestFailed(err.to_string()))?,
    };
    let status_code = response.status().as_u16();

    // Read chunk by chunk so an oversized body never has to be fully
    // materialized before the cap is enforced; stop as soon as one byte
    // past the cap has arrived.
    let limit = config.max_response_bytes.saturating_add(1);
    let mut body = Vec::new();
    loop {
        let chunk = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(ProxyError::Cancelled),
            chunk = response.chunk() => chunk.map_err(|err| ProxyError::RequestFailed(err.to_string()))?,
        };
        match chunk {
            Some(bytes) => {
                body.extend_from_slice(&bytes);
                if body.len() > limit {
                    break;
                }
            }
            None => break,
        }
    }
    body.truncate(config.max_response_bytes);
    let response_size = body.len();

    Ok(ProxyResponse {
        status_code,
        body,
        latency: started_at.elapsed(),
        request_size,
        response_size,
    })
}

/// Resolves `host` and returns a pinned [`SocketAddr`] once every candidate
/// has passed the private-range check (or the check is disabled).
async fn resolve_and_pin(host: &str, port: u16, allow_private_ips: bool) -> Result<SocketAddr, ProxyError> {
    if let Ok(literal) = host.parse::<IpAddr>() {
        if !allow_private_ips && is_private_or_link_local(&literal) {
            return Err(ProxyError::PrivateAddressBlocked);
        }
        return Ok(SocketAddr::new(literal, port));
    }

    let addrs: Vec<SocketAddr> = tokio::net::lookup_host((host, port))
        .await
        .map_err(|err| ProxyError::DnsFailure(err.to_string()))?
        .collect();
    if addrs.is_empty() {
        return Err(ProxyError::DnsFailure("no addresses returned".to_string()));
    }
    if !allow_private_ips && addrs.iter().any(|addr| is_private_or_link_local(&addr.ip())) {
        return Err(ProxyError::PrivateAddressBlocked);
    }
    Ok(addrs[0])
}

/// Builds the outbound `tools/call` JSON-RPC envelope with a random id.
fn build_envelope(tool_name: &str, arguments: &Value) -> Value {
    let id = (OsRng.next_u64() >> 1) as i64;
    json!({
        "jsonrpc": "2.0",
        "method": "tools/call",
        "id": id,
        "params": {
            "name": tool_name,
            "arguments": arguments,
        },
    })
}

fn inject_auth(
    builder: reqwest::RequestBuilder,
    auth_type: AuthType,
    credential: Option<&str>,
) -> Result<reqwest::RequestBuilder, ProxyError> {
    match auth_type {
        AuthType::None => Ok(builder),
        AuthType::Bearer => {
            let credential = credential.ok_or(ProxyError::InvalidAuth)?;
            Ok(builder.header("authorization", format!("Bearer {credential}")))
        }
        AuthType::Basic => {
            let credential = credential.ok_or(ProxyError::InvalidAuth)?;
            Ok(builder.header("authorization", format!("Basic {credential}")))
        }
    }
}
