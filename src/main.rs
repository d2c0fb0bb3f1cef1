//! OpenAI Image MCP Server
//!
//! MCP server exposing OpenAI image generation and editing as the
//! `create_image` tool.

use anyhow::Result;
use clap::Parser;
use openai_image_mcp::serve::{run_server, TransportArgs};
use openai_image_mcp::ImageServer;

/// Command-line arguments for the image server.
#[derive(Parser, Debug)]
#[command(name = "openai-image-mcp")]
#[command(about = "MCP server for image generation using the OpenAI image API")]
struct Args {
    /// Transport configuration
    #[command(flatten)]
    transport: TransportArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Stdout carries the stdio transport, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("openai-image-mcp server starting...");

    let args = Args::parse();

    // The API key is read lazily on the first tool call, so the server
    // starts without configuration and reports a missing key per request.
    let server = ImageServer::new();

    let transport = args.transport.into_transport();
    run_server(server, transport).await?;

    tracing::info!("Server stopped");
    Ok(())
}
