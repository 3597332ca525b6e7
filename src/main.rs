//! Binary entry point for confluence-mcp.
//!
//! Serves the Confluence tools over MCP stdio by default.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use confluence_mcp::mcp::{McpServer, ToolRegistry};
use confluence_mcp::observability::{self, InitOptions, LogFormat};
use confluence_mcp::{ConfluenceClient, ConfluenceConfig, HttpSettings};
use std::path::PathBuf;
use std::process::ExitCode;

/// Confluence MCP server - Confluence Data Center content as MCP tools.
#[derive(Parser)]
#[command(name = "confluence-mcp")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format: pretty or json.
    #[arg(long, global = true, value_parser = ["pretty", "json"])]
    log_format: Option<String>,

    /// Write logs to this file instead of stderr.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available commands.
#[derive(Subcommand, Clone, Copy)]
enum Commands {
    /// Run the MCP server over stdio (default).
    Serve,

    /// Print the tool definitions as JSON.
    Tools,

    /// Print the resolved configuration with the credential redacted.
    Config,
}

/// Main entry point.
#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let options = InitOptions {
        verbose: cli.verbose,
        format: cli.log_format.as_deref().and_then(LogFormat::parse),
        file: cli.log_file.clone(),
    };
    if let Err(e) = observability::init_from_env(&options) {
        eprintln!("Failed to initialize observability: {e}");
        return ExitCode::FAILURE;
    }

    match run_command(cli.command.unwrap_or(Commands::Serve)).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "confluence-mcp exited with error");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        },
    }
}

/// Runs the selected command.
async fn run_command(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Tools => cmd_tools(),
        Commands::Config => cmd_config(),
        Commands::Serve => cmd_serve().await,
    }
}

/// Serves MCP over stdio until stdin closes.
async fn cmd_serve() -> anyhow::Result<()> {
    let config = ConfluenceConfig::from_env().context("configuration error")?;
    let client = ConfluenceClient::new(config, HttpSettings::from_env())
        .context("failed to create Confluence client")?;
    tracing::info!(base_url = %client.base_url(), "Starting confluence-mcp");
    let server = McpServer::new(ToolRegistry::new(client));

    server.run_stdio().await.context("MCP server failed")?;
    tracing::info!("stdin closed, shutting down");
    Ok(())
}

/// Prints the tool definitions.
fn cmd_tools() -> anyhow::Result<()> {
    let tools: Vec<serde_json::Value> = ToolRegistry::definitions()
        .into_iter()
        .map(|t| {
            serde_json::json!({
                "name": t.name,
                "description": t.description,
                "inputSchema": t.input_schema
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&tools)?);
    Ok(())
}

/// Prints the resolved endpoint and timeouts.
fn cmd_config() -> anyhow::Result<()> {
    let config = ConfluenceConfig::from_env().context("configuration error")?;
    let http = HttpSettings::from_env();

    println!("Base URL:        {}", config.base_url());
    println!("API token:       [REDACTED]");
    println!("Timeout:         {} ms", http.timeout_ms);
    println!("Connect timeout: {} ms", http.connect_timeout_ms);
    Ok(())
}
