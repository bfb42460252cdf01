//! Daemon entry point for the quiz MCP server.
//!
//! Loads configuration from the command line, the environment and an optional
//! `.env` file, connects the quiz store, and serves the MCP protocol over stdio
//! and/or streamable HTTP.

mod config;
mod logging;
mod store;

use std::error::Error;
use std::sync::Arc;

use quiz_core::control::QuizControlPlane;
use quiz_core::store::QuizStore;
use quiz_mcp::server::{McpHttpServerConfig, serve_stdio, serve_streamable_http};
use tracing::{debug, info};

use crate::config::QuizConfig;
use crate::store::{QuizBackend, build_store};

type MainResult = Result<(), Box<dyn Error + Send + Sync>>;

#[tokio::main]
async fn main() -> MainResult {
    let dotenv_path = dotenvy::dotenv().ok();
    let config = QuizConfig::from_args()?;
    logging::init(&config.log_level);
    if let Some(path) = dotenv_path {
        debug!(path = %path.display(), "loaded environment file");
    }
    info!(
        stdio = config.enable_stdio,
        http = config.mcp_serve,
        "starting quiz-mcpd"
    );

    match build_store(&config).await? {
        QuizBackend::Postgres(store) => run(store, &config).await,
        QuizBackend::Memory(store) => run(store, &config).await,
    }
}

async fn run<S: QuizStore>(store: S, config: &QuizConfig) -> MainResult {
    let control = Arc::new(
        QuizControlPlane::new(store).with_creator_email(config.creator_email.clone()),
    );

    let http = config.mcp_serve.then(|| {
        let http_config = McpHttpServerConfig::new(config.mcp_http_addr)
            .with_stateful_mode(config.mcp_stateful)
            .with_sse_keep_alive(config.mcp_sse_keep_alive);
        tokio::spawn(serve_streamable_http(control.clone(), http_config))
    });

    if config.enable_stdio {
        serve_stdio(control).await?;
    }

    if let Some(handle) = http {
        handle.await??;
    }
    Ok(())
}
