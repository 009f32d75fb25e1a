// crates/gateway-cli/src/main.rs
// ============================================================================
// Module: Gateway CLI
// Description: Command-line entry point for the MCP gateway binary.
// Purpose: Parse arguments, load configuration, and run the HTTP server.
// Dependencies: clap, tokio, gateway-transport
// ============================================================================

mod config;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use clap::Subcommand;
use gateway_transport::ClassifyAndForwardHandler;
use gateway_transport::CorrelationIdGenerator;
use gateway_transport::EchoMethodHandler;
use gateway_transport::SessionStore;
use gateway_transport::StaticToolResolver;
use gateway_transport::http::GatewayState;
use gateway_transport::http::router;
use gateway_trust::StaticAgentTrustProvider;
use gateway_trust::StaticWorkspaceTrustProvider;
use gateway_trust::SystemTrustDefaultProviderStatic;

use crate::config::GatewayConfig;

/// MCP gateway: trust-classified, circuit-broken, SSRF-hardened tool proxy.
#[derive(Debug, Parser)]
#[command(name = "mcp-gateway", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Starts the HTTP server.
    Serve {
        /// Path to a TOML config file; defaults to `MCP_GATEWAY_CONFIG` or
        /// `mcp-gateway.toml` in the current directory.
        #[arg(long)]
        config: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("failed to start runtime: {err}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("mcp-gateway: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let Command::Serve { config } = cli.command;

    let gateway_config = match config {
        Some(path) => GatewayConfig::load_from_path(&path)?,
        None => GatewayConfig::load()?,
    };

    eprintln!(
        "mcp-gateway listening on {} ({}), allow_private_ips={}",
        gateway_config.listen_addr, gateway_config.endpoint_path, gateway_config.proxy.allow_private_ips
    );

    let handler = ClassifyAndForwardHandler::new(
        Box::new(StaticToolResolver::new(std::collections::HashMap::new())),
        Box::new(StaticAgentTrustProvider::new(std::collections::HashMap::new())),
        Box::new(StaticWorkspaceTrustProvider::new(std::collections::HashMap::new())),
        Box::new(SystemTrustDefaultProviderStatic::new(Vec::new())),
        gateway_config.breaker.to_breaker_config(),
        gateway_config.proxy.to_proxy_config(),
    )
    .with_fallback(Box::new(EchoMethodHandler))
    .with_metrics(Arc::new(gateway_transport::telemetry::StderrMetrics));

    let state = Arc::new(GatewayState {
        handler: Arc::new(handler),
        sessions: Some(SessionStore::new()),
        correlation: CorrelationIdGenerator::new(),
    });
    let app = router(&gateway_config.endpoint_path, state);

    let listener = tokio::net::TcpListener::bind(gateway_config.listen_addr).await?;
    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
