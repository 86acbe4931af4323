//! MCP Streamable HTTP service creation
//!
//! This module provides the function that builds the MCP service
//! so it can be nested into an Axum router.

use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
};
use tokio_util::sync::CancellationToken;

use crate::chat::ChatService;
use crate::db::Database;
use crate::tasks::TaskService;

use super::server::McpServer;

/// Create the MCP Streamable HTTP service.
///
/// Every MCP session gets its own `McpServer`; all of them share `service`
/// and `chat`, and so the same database.
///
/// # Example
/// ```no_run
/// use axum::Router;
/// use tokio_util::sync::CancellationToken;
/// # use taskchat::chat::{ChatAgent, ChatService};
/// # use taskchat::db::SqliteDatabase;
/// # use taskchat::mcp::create_mcp_service;
/// # use taskchat::tasks::TaskService;
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// # let db = SqliteDatabase::in_memory().await?;
/// let service = TaskService::new(db);
/// let chat = ChatService::new(service.clone(), ChatAgent::new(service.clone()));
///
/// let ct = CancellationToken::new();
/// let mcp_service = create_mcp_service(service, chat, ct);
///
/// let app: Router = Router::new().nest_service("/mcp", mcp_service);
/// # Ok(())
/// # }
/// ```
pub fn create_mcp_service<D: Database + 'static>(
    service: TaskService<D>,
    chat: ChatService<D>,
    cancellation_token: CancellationToken,
) -> StreamableHttpService<McpServer<D>, LocalSessionManager> {
    // rmcp expects the factory to return io::Error
    let service_factory = move || -> Result<McpServer<D>, std::io::Error> {
        Ok(McpServer::new(service.clone(), chat.clone()))
    };

    let mut config = StreamableHttpServerConfig::default();
    config.stateful_mode = true;
    config.cancellation_token = cancellation_token;

    StreamableHttpService::new(
        service_factory,
        LocalSessionManager::default().into(),
        config,
    )
}
