//! Model Context Protocol (MCP) server
//!
//! The server runs over the Streamable HTTP transport and exposes the task
//! tools, `get_task`, `due_soon_tasks` and the natural-language `chat` tool.
//!
//! - **server**: `McpServer`, one `#[tool]` method per MCP tool
//! - **service**: the `StreamableHttpService` nested under `/mcp`

pub mod server;
mod service;


pub use server::{ChatParams, McpServer};
pub use service::create_mcp_service;
