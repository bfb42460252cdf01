//! MCP server runners for quiz-mcp.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::get;
use quiz_core::control::QuizControlPlane;
use quiz_core::store::QuizStore;
use rmcp::serve_server;
use rmcp::transport::io::stdio;
use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig,
    StreamableHttpService,
    session::local::LocalSessionManager,
};
use tracing::info;

use crate::{HEALTHZ_STATUS, QuizMcp};

pub const DEFAULT_HTTP_PORT: u16 = 4020;

type ServeResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Configuration for the MCP streamable HTTP server.
#[derive(Debug, Clone)]
pub struct McpHttpServerConfig {
    pub addr: SocketAddr,
    pub stateful_mode: bool,
    pub sse_keep_alive: Option<Duration>,
    pub sse_retry: Option<Duration>,
}

impl McpHttpServerConfig {
    #[must_use]
    pub const fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            stateful_mode: true,
            sse_keep_alive: Some(Duration::from_secs(15)),
            sse_retry: Some(Duration::from_secs(3)),
        }
    }

    #[must_use]
    pub const fn with_stateful_mode(mut self, stateful_mode: bool) -> Self {
        self.stateful_mode = stateful_mode;
        self
    }

    #[must_use]
    pub const fn with_sse_keep_alive(mut self, sse_keep_alive: Option<Duration>) -> Self {
        self.sse_keep_alive = sse_keep_alive;
        self
    }
}

impl Default for McpHttpServerConfig {
    fn default() -> Self {
        Self::new(SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_HTTP_PORT)))
    }
}

/// Serves the MCP server over stdio until the client disconnects.
///
/// # Errors
/// Returns any transport or server error.
pub async fn serve_stdio<S: QuizStore>(control: Arc<QuizControlPlane<S>>) -> ServeResult {
    let service = QuizMcp::with_control(control);
    let (stdin, stdout) = stdio();
    info!("serving MCP over stdio");
    let running = serve_server(service, (stdin, stdout)).await?;
    let reason = running.waiting().await?;
    info!(?reason, "stdio session ended");
    Ok(())
}

/// Serves the MCP server using streamable HTTP transport.
///
/// `/health` answers plain liveness checks; MCP traffic goes to `/mcp`.
///
/// # Errors
/// Returns any listener or server error.
pub async fn serve_streamable_http<S: QuizStore>(
    control: Arc<QuizControlPlane<S>>,
    config: McpHttpServerConfig,
) -> ServeResult {
    let service: StreamableHttpService<QuizMcp<S>, LocalSessionManager> =
        StreamableHttpService::new(
            move || Ok(QuizMcp::with_control(control.clone())),
            Arc::new(LocalSessionManager::default()),
            StreamableHttpServerConfig {
                sse_keep_alive: config.sse_keep_alive,
                sse_retry: config.sse_retry,
                stateful_mode: config.stateful_mode,
                ..Default::default()
            },
        );

    let app = Router::new()
        .route("/health", get(|| async { HEALTHZ_STATUS }))
        .nest_service("/mcp", service);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!(addr = %config.addr, "serving MCP over streamable HTTP");
    axum::serve(listener, app).await?;
    Ok(())
}
