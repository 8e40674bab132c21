/// Main entry point for the MLB Stats MCP server
///
/// This file sets up logging, parses command line arguments, and starts the server
/// on the selected transport: line-delimited JSON-RPC over stdin/stdout, or
/// Streamable HTTP with chunked responses.

use clap::{Parser, Subcommand};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mlb_stats_mcp::stats::mlb::DEFAULT_API_BASE;
use mlb_stats_mcp::{ServerConfig, StatsServer, ToolTimeouts};

/// Command line arguments for the MLB Stats MCP server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Serve MCP over stdin/stdout instead of HTTP
    #[arg(
        long,
        env = "MCP_STDIO_MODE",
        value_parser = parse_flag,
        action = clap::ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true",
        default_value = "false"
    )]
    stdio: bool,

    /// Address to bind the HTTP transport to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port for the HTTP transport
    #[arg(long, env = "PORT", default_value_t = 8000)]
    port: u16,

    /// Seconds a cached result stays valid (0 disables the cache)
    #[arg(long, default_value_t = 300)]
    cache_ttl_secs: u64,

    /// Timeout for player_stats, standings, leaders and team statistics
    #[arg(long, default_value_t = 30)]
    stats_timeout_secs: u64,

    /// Timeout for player_recent_performance
    #[arg(long, default_value_t = 20)]
    recent_timeout_secs: u64,

    /// Timeout for search_players
    #[arg(long, default_value_t = 15)]
    search_timeout_secs: u64,

    /// Base URL of the MLB Stats API
    #[arg(long, default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable verbose output (implies debug)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Poll a running server's /health endpoint; exits 0 when healthy
    CheckHealth {
        /// Health URL (defaults to http://localhost:$PORT/health)
        url: Option<String>,

        /// Number of attempts before giving up
        #[arg(long, default_value_t = 5)]
        retries: u32,

        /// Seconds to wait between attempts
        #[arg(long, default_value_t = 5)]
        delay_secs: u64,
    },
}

/// Accept the usual spellings of a boolean environment flag
fn parse_flag(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        other => Err(format!("expected a boolean, got '{}'", other)),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Set up logging based on command line flags
    let log_level = if args.verbose {
        "debug"
    } else if args.debug {
        "info"
    } else {
        "warn"
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("mlb_stats_mcp={},tower_http={}", log_level, log_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr) // Send logs to stderr, not stdout
        .init();

    if let Some(Command::CheckHealth { url, retries, delay_secs }) = args.command {
        let url = url.unwrap_or_else(|| format!("http://localhost:{}/health", args.port));
        let healthy =
            mlb_stats_mcp::http::check_health(&url, retries, Duration::from_secs(delay_secs)).await;
        if healthy {
            eprintln!("Server at {} is healthy", url);
            return Ok(());
        }
        eprintln!("Server health check failed for {}", url);
        std::process::exit(1);
    }

    let config = ServerConfig {
        cache_ttl: Duration::from_secs(args.cache_ttl_secs),
        timeouts: ToolTimeouts {
            player_stats: Duration::from_secs(args.stats_timeout_secs),
            recent_performance: Duration::from_secs(args.recent_timeout_secs),
            search: Duration::from_secs(args.search_timeout_secs),
            other: Duration::from_secs(args.stats_timeout_secs),
        },
        api_base: args.api_base,
    };

    info!("Starting MLB Stats MCP server");
    let server = StatsServer::new(config)?;

    if args.stdio {
        server.run_stdio().await?;
    } else {
        server.run_http(&args.host, args.port).await?;
    }

    info!("MLB Stats MCP server shutdown complete");
    Ok(())
}
