//! Transport configuration and server runner.
//!
//! Supports three transport modes:
//! - **Stdio**: default mode for local subprocess communication
//! - **HTTP**: streamable HTTP transport for web-based clients
//! - **SSE**: Server-Sent Events transport (same HTTP infrastructure)
//!
//! The runner blocks until the transport closes or an interrupt signal
//! arrives, then shuts down cleanly.

use std::fmt;

use clap::Args;
use rmcp::{ServerHandler, ServiceExt};
use thiserror::Error;

/// Errors that can occur when running the MCP server.
#[derive(Debug, Error)]
pub enum ServeError {
    /// Failed to bind to the specified port
    #[error("Failed to bind to port {port}: {message}")]
    BindFailed { port: u16, message: String },

    /// Transport error during communication
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Transport mode for MCP server communication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transport {
    /// Standard input/output transport (default)
    #[default]
    Stdio,
    /// HTTP streamable transport on the given port
    Http { port: u16 },
    /// Server-Sent Events transport on the given port
    Sse { port: u16 },
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Stdio => write!(f, "stdio"),
            Transport::Http { port } => write!(f, "http (port {port})"),
            Transport::Sse { port } => write!(f, "sse (port {port})"),
        }
    }
}

/// Command-line arguments for transport configuration.
#[derive(Args, Debug, Clone)]
pub struct TransportArgs {
    /// Transport mode: stdio, http, or sse
    #[arg(long, default_value = "stdio", value_parser = parse_transport_mode)]
    pub transport: TransportMode,

    /// Port for HTTP/SSE transport
    #[arg(long, env = "PORT", default_value = "8080")]
    pub port: u16,
}

/// Transport mode parsed from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportMode {
    #[default]
    Stdio,
    Http,
    Sse,
}

fn parse_transport_mode(s: &str) -> Result<TransportMode, String> {
    match s.to_lowercase().as_str() {
        "stdio" => Ok(TransportMode::Stdio),
        "http" => Ok(TransportMode::Http),
        "sse" => Ok(TransportMode::Sse),
        _ => Err(format!(
            "Invalid transport mode '{s}'. Valid options: stdio, http, sse"
        )),
    }
}

impl TransportArgs {
    /// Convert command-line arguments into a Transport configuration.
    pub fn into_transport(self) -> Transport {
        match self.transport {
            TransportMode::Stdio => Transport::Stdio,
            TransportMode::Http => Transport::Http { port: self.port },
            TransportMode::Sse => Transport::Sse { port: self.port },
        }
    }
}

/// Run the MCP server with the given transport until shutdown.
pub async fn run_server<H>(handler: H, transport: Transport) -> Result<(), ServeError>
where
    H: ServerHandler + Clone + Send + Sync + 'static,
{
    tracing::info!(transport = %transport, "Starting MCP server");

    match transport {
        Transport::Stdio => run_stdio(handler).await,
        // SSE rides on the same streamable HTTP server
        Transport::Http { port } | Transport::Sse { port } => run_http(handler, port).await,
    }
}

async fn run_stdio<H>(handler: H) -> Result<(), ServeError>
where
    H: ServerHandler + Send + Sync + 'static,
{
    use rmcp::transport::io::stdio;

    let service = handler
        .serve(stdio())
        .await
        .map_err(|e| ServeError::Transport(e.to_string()))?;

    tokio::select! {
        result = service.waiting() => {
            result.map_err(|e| ServeError::Transport(e.to_string()))?;
            Ok(())
        }
        _ = wait_for_shutdown_signal() => {
            tracing::info!("Received shutdown signal, stopping server");
            Ok(())
        }
    }
}

async fn run_http<H>(handler: H, port: u16) -> Result<(), ServeError>
where
    H: ServerHandler + Clone + Send + Sync + 'static,
{
    use rmcp::transport::streamable_http_server::{
        session::local::LocalSessionManager, StreamableHttpService,
    };

    let service = StreamableHttpService::new(
        move || Ok(handler.clone()),
        LocalSessionManager::default().into(),
        Default::default(),
    );

    let router = axum::Router::new().nest_service("/mcp", service);

    let bind_addr = format!("0.0.0.0:{port}");
    let tcp_listener =
        tokio::net::TcpListener::bind(&bind_addr)
            .await
            .map_err(|e| ServeError::BindFailed {
                port,
                message: e.to_string(),
            })?;

    tracing::info!(port, "HTTP server listening");

    axum::serve(tcp_listener, router)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
        .map_err(|e| ServeError::Transport(e.to_string()))?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

/// Wait for SIGTERM or SIGINT.
async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm =
            signal(SignalKind::terminate()).expect("Failed to register SIGTERM handler");
        let mut sigint =
            signal(SignalKind::interrupt()).expect("Failed to register SIGINT handler");

        tokio::select! {
            _ = sigterm.recv() => {
                tracing::info!("Received SIGTERM");
            }
            _ = sigint.recv() => {
                tracing::info!("Received SIGINT");
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to register Ctrl+C handler");
        tracing::info!("Received Ctrl+C");
    }
}
