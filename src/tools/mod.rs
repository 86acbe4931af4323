//! Tool registry: the bridge between natural-language front-ends and the task service.
//!
//! - `registry`: name to async callable map with JSON schemas
//! - `params`: typed tool parameters (shared with the MCP server)
//! - `task_tools`: the five task tools

mod error;
pub mod params;
mod registry;
mod task_tools;


pub use error::ToolError;
pub use registry::{ToolCall, ToolDefinition, ToolRegistry};
pub use task_tools::{add_task, complete_task, delete_task, list_tasks, update_task};
