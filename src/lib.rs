//! taskchat: a todo list driven by CLI commands, a chat assistant and MCP tools.

pub mod api;
pub mod chat;
pub mod cli;
pub mod config;
pub mod db;
pub mod mcp;
pub mod tasks;
pub mod tools;
