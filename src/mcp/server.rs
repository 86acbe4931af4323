//! MCP server exposing the task tools and the chat agent.

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    schemars,
    schemars::JsonSchema,
    tool, tool_handler, tool_router,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::chat::{ChatError, ChatService};
use crate::db::utils::today;
use crate::db::{Database, DbError, Id};
use crate::tasks::TaskService;
use crate::tools::params::{
    AddTaskParams, CompleteTaskParams, DeleteTaskParams, DueSoonParams, GetTaskParams,
    ListTasksParams, UpdateTaskParams,
};
use crate::tools::{self, ToolError};

/// Look-ahead of `due_soon_tasks` when `days` is omitted.
pub const DEFAULT_DUE_SOON_DAYS: u32 = 3;

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ChatParams {
    #[schemars(description = "Natural-language message, e.g. 'add a task to call mom tomorrow'")]
    pub message: String,
    #[schemars(description = "Conversation to continue (optional). Omit to start a new one.")]
    pub conversation_id: Option<Id>,
}

fn error_data(e: &impl ToString) -> Option<Value> {
    Some(json!({ "error": e.to_string() }))
}

fn map_tool_error(e: ToolError) -> McpError {
    match &e {
        ToolError::Db(DbError::NotFound { .. }) => {
            McpError::resource_not_found("task_not_found", error_data(&e))
        }
        ToolError::InvalidArguments { .. }
        | ToolError::UnknownTool { .. }
        | ToolError::Db(DbError::Validation { .. } | DbError::InvalidData { .. }) => {
            McpError::invalid_params("invalid_params", error_data(&e))
        }
        _ => McpError::internal_error("internal_error", error_data(&e)),
    }
}

fn map_chat_error(e: ChatError) -> McpError {
    match &e {
        ChatError::ConversationNotFound { .. } => {
            McpError::resource_not_found("conversation_not_found", error_data(&e))
        }
        ChatError::EmptyMessage => McpError::invalid_params("empty_message", error_data(&e)),
        ChatError::Db(_) => McpError::internal_error("internal_error", error_data(&e)),
    }
}

fn pretty<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error("encode_failed", error_data(&e)))?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

pub struct McpServer<D: Database> {
    service: TaskService<D>,
    chat: ChatService<D>,
    tool_router: ToolRouter<Self>,
}

impl<D: Database> Clone for McpServer<D> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            chat: self.chat.clone(),
            tool_router: self.tool_router.clone(),
        }
    }
}

#[tool_router]
impl<D: Database + 'static> McpServer<D> {
    pub fn new(service: TaskService<D>, chat: ChatService<D>) -> Self {
        Self {
            service,
            chat,
            tool_router: Self::tool_router(),
        }
    }

    pub fn router(&self) -> &ToolRouter<Self> {
        &self.tool_router
    }

    #[tool(
        description = "Create a new task. Supports priority (low, medium, high, urgent), a due date (YYYY-MM-DD or 'tomorrow', 'next friday'), tags and recurrence (daily, weekly, monthly, yearly)."
    )]
    pub async fn add_task(
        &self,
        params: Parameters<AddTaskParams>,
    ) -> Result<CallToolResult, McpError> {
        let task = tools::add_task(&self.service, params.0)
            .await
            .map_err(map_tool_error)?;
        pretty(&task)
    }

    #[tool(
        description = "List tasks. Filter by completion, priority, tags (all must match), due window in days, overdue, recurring or text search. Sort by created_at, updated_at, due_date, priority or title."
    )]
    pub async fn list_tasks(
        &self,
        params: Parameters<ListTasksParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = tools::list_tasks(&self.service, params.0)
            .await
            .map_err(map_tool_error)?;
        pretty(&result)
    }

    #[tool(description = "Get a task by ID with all of its fields.")]
    pub async fn get_task(
        &self,
        params: Parameters<GetTaskParams>,
    ) -> Result<CallToolResult, McpError> {
        let task = self
            .service
            .get(params.0.task_id)
            .await
            .map_err(|e| map_tool_error(e.into()))?;
        pretty(&task)
    }

    #[tool(
        description = "Update fields of a task by ID. Only the given fields change. Use 'none' as due_date or recurrence to clear it."
    )]
    pub async fn update_task(
        &self,
        params: Parameters<UpdateTaskParams>,
    ) -> Result<CallToolResult, McpError> {
        let task = tools::update_task(&self.service, params.0)
            .await
            .map_err(map_tool_error)?;
        pretty(&task)
    }

    #[tool(
        description = "Mark a task as complete. A recurring task with a due date gets its next occurrence created, returned as 'next'."
    )]
    pub async fn complete_task(
        &self,
        params: Parameters<CompleteTaskParams>,
    ) -> Result<CallToolResult, McpError> {
        let completion = tools::complete_task(&self.service, params.0)
            .await
            .map_err(map_tool_error)?;
        pretty(&completion)
    }

    #[tool(description = "Delete a task by ID.")]
    pub async fn delete_task(
        &self,
        params: Parameters<DeleteTaskParams>,
    ) -> Result<CallToolResult, McpError> {
        let deleted = tools::delete_task(&self.service, params.0)
            .await
            .map_err(map_tool_error)?;
        pretty(&deleted)
    }

    #[tool(
        description = "Incomplete tasks due within the next few days (default 3), overdue ones included, soonest first."
    )]
    pub async fn due_soon_tasks(
        &self,
        params: Parameters<DueSoonParams>,
    ) -> Result<CallToolResult, McpError> {
        let days = params.0.days.unwrap_or(DEFAULT_DUE_SOON_DAYS);
        let tasks = self
            .service
            .due_soon(days, today())
            .await
            .map_err(|e| map_tool_error(e.into()))?;
        pretty(&json!({ "days": days, "total": tasks.len(), "items": tasks }))
    }

    #[tool(
        description = "Talk to the task assistant in natural language. Returns its reply, the tool calls it made and the conversation ID to continue with."
    )]
    pub async fn chat(&self, params: Parameters<ChatParams>) -> Result<CallToolResult, McpError> {
        let reply = self
            .chat
            .send(params.0.conversation_id, &params.0.message)
            .await
            .map_err(map_chat_error)?;
        pretty(&reply)
    }
}

#[tool_handler]
impl<D: Database + 'static> ServerHandler for McpServer<D> {
    fn get_info(&self) -> ServerInfo {
        let mut info = ServerInfo::default();
        info.capabilities = ServerCapabilities::builder().enable_tools().build();
        info.instructions = Some(
            "taskchat MCP server - manage a todo list with task tools or the natural-language chat tool"
                .to_string(),
        );
        info
    }
}
