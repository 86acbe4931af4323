//! API route configuration.

use axum::Router;
use axum::routing::get;
use rmcp::transport::streamable_http_server::{StreamableHttpService, session::local::LocalSessionManager};
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::db::Database;
use crate::mcp::McpServer;

/// Create the router: `/health` and the MCP service nested at `/mcp`.
pub fn create_router<D: Database + 'static>(mcp: StreamableHttpService<McpServer<D>, LocalSessionManager>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .nest_service("/mcp", mcp)
        .layer(TraceLayer::new_for_http())
}
