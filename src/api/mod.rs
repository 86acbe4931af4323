//! HTTP host: `/health` plus the MCP endpoint at `/mcp`.

mod handlers;
mod routes;

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use miette::Diagnostic;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::chat::ChatService;
use crate::db::Database;
use crate::mcp::create_mcp_service;
use crate::tasks::TaskService;

pub use handlers::HealthResponse;
pub use routes::create_router;

pub const DEFAULT_PORT: u16 = 3838;

#[derive(Error, Diagnostic, Debug)]
pub enum ApiError {
    #[error("Failed to bind {addr}: {source}")]
    #[diagnostic(
        code(taskchat::api::bind),
        help("Is another process already listening on this port? Try --port.")
    )]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    #[diagnostic(code(taskchat::api::serve))]
    Serve(#[from] std::io::Error),
}

/// API server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Number of `-v` flags; selects the default log level
    pub verbosity: u8,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            verbosity: 0,
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Log filter used when `RUST_LOG` is not set.
pub fn default_filter(verbosity: u8) -> String {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    format!("taskchat={level},tower_http={level}")
}

/// Initialize tracing subscriber with env filter. Output goes to stderr.
pub fn init_tracing(verbosity: u8) {
    let _ = tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity))),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Run the API server until Ctrl-C.
///
/// The database must already be migrated. Shutdown cancels every open MCP
/// session before the listener closes.
pub async fn run<D: Database + 'static>(config: ServerConfig, db: D) -> Result<(), ApiError> {
    init_tracing(config.verbosity);

    let service = TaskService::new(db);
    let chat = ChatService::from_env(service.clone());
    if chat.agent().uses_llm() {
        info!("chat agent: LLM with rule-based fallback");
    } else {
        info!("chat agent: rule-based (no LLM API key configured)");
    }

    let ct = CancellationToken::new();
    let mcp = create_mcp_service(service, chat, ct.child_token());
    let app = create_router(mcp);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ApiError::Bind {
            addr: addr.to_string(),
            source,
        })?;
    info!("API server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(tokio::signal::ctrl_c(), ct))
        .await?;

    info!("API server stopped");
    Ok(())
}

/// Resolve once `signal` fires, cancelling `ct`. A signal that cannot be
/// listened for never resolves, leaving the server running.
async fn shutdown_signal<F>(signal: F, ct: CancellationToken)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        tracing::error!(error = %e, "failed to listen for Ctrl-C; graceful shutdown disabled");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
    ct.cancel();
}
