/// Public library interface for the MLB Stats MCP server
///
/// This module exports the server implementation and the public types used
/// by the binary, other applications and the test suites.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub mod domain;
pub mod http;
pub mod mcp;
pub mod rpc;
pub mod stats;
pub mod stream;
pub mod tools;

// Re-export public modules and types
pub use domain::*;
pub use stats::{CacheInfo, MlbStatsApi, PlayerType, ProviderError, StatsCache, StatsProvider};
pub use tools::{ToolDescriptor, ToolInvoker, ToolKind, ToolRegistry, ToolSummary, ToolTimeouts};

/// Errors that can occur during server operation
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Statistics provider error: {0}")]
    Provider(#[from] ProviderError),
}

/// Runtime settings shared by both transports
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// How long successful query results stay cached; zero disables the cache
    pub cache_ttl: Duration,
    pub timeouts: ToolTimeouts,
    /// Base URL of the MLB Stats API
    pub api_base: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            cache_ttl: stats::cache::DEFAULT_CACHE_TTL,
            timeouts: ToolTimeouts::default(),
            api_base: stats::mlb::DEFAULT_API_BASE.to_string(),
        }
    }
}

/// MLB statistics server that implements the MCP protocol
///
/// One server owns one invoker; the stdio session and every HTTP request
/// dispatch through it and share its cache.
pub struct StatsServer {
    invoker: Arc<ToolInvoker>,
}

impl StatsServer {
    /// Create a server backed by the MLB Stats API
    pub fn new(config: ServerConfig) -> Result<Self, ServerError> {
        tracing::info!("Initializing MLB Stats server against {}", config.api_base);

        // Each HTTP request is bounded by the longest per-tool timeout
        let t = &config.timeouts;
        let request_timeout = t
            .player_stats
            .max(t.recent_performance)
            .max(t.search)
            .max(t.other);
        let provider = MlbStatsApi::new(config.api_base.clone(), request_timeout)?;

        Ok(Self::with_provider(Arc::new(provider), &config))
    }

    /// Create a server backed by any statistics provider
    pub fn with_provider(provider: Arc<dyn StatsProvider>, config: &ServerConfig) -> Self {
        let cache = if config.cache_ttl.is_zero() {
            StatsCache::disabled()
        } else {
            StatsCache::new(config.cache_ttl)
        };
        let invoker = ToolInvoker::new(provider, Arc::new(cache), config.timeouts);

        Self {
            invoker: Arc::new(invoker),
        }
    }

    pub fn invoker(&self) -> Arc<ToolInvoker> {
        Arc::clone(&self.invoker)
    }

    /// Run the MCP session over stdin/stdout until the client goes away
    pub async fn run_stdio(&self) -> Result<(), ServerError> {
        tracing::info!("Starting MCP server in stdio mode");
        let mut mcp_server = mcp::McpServer::new(self.invoker());
        mcp_server.run().await
    }

    /// Serve the Streamable HTTP transport until Ctrl-C
    pub async fn run_http(&self, host: &str, port: u16) -> Result<(), ServerError> {
        tracing::info!("Starting MCP server in Streamable HTTP mode on {}:{}", host, port);
        http::serve(host, port, self.invoker()).await
    }
}
