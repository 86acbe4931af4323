//! Typed parameters of the task tools.
//!
//! The same structs describe the registry tools to the LLM and the MCP tools
//! to MCP clients; their JSON schemas are derived with schemars.

use chrono::{Days, NaiveDate};
use rmcp::{schemars, schemars::JsonSchema};
use serde::{Deserialize, Serialize};

use super::ToolError;
use crate::chat::extract;
use crate::db::utils::normalize_tags;
use crate::db::{
    Id, NewTask, PageSort, Priority, Recurrence, SortOrder, TaskPatch, TaskQuery,
};

/// Default number of tasks returned by `list_tasks`.
pub const DEFAULT_LIST_LIMIT: usize = 50;
/// Upper bound on `list_tasks` page size.
pub const MAX_LIST_LIMIT: usize = 200;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AddTaskParams {
    #[schemars(description = "Task title")]
    pub title: String,
    #[schemars(description = "Longer description (optional)")]
    pub description: Option<String>,
    #[schemars(description = "Priority: 'low', 'medium' (default), 'high' or 'urgent'")]
    pub priority: Option<String>,
    #[schemars(
        description = "Due date as YYYY-MM-DD or a phrase such as 'tomorrow', 'next friday', 'in 3 days'"
    )]
    pub due_date: Option<String>,
    #[schemars(description = "Tags for categorization (e.g. 'work', 'home')")]
    pub tags: Option<Vec<String>>,
    #[schemars(description = "Recurrence: 'daily', 'weekly', 'monthly' or 'yearly'")]
    pub recurrence: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ListTasksParams {
    #[schemars(description = "true for completed tasks, false for pending ones, omit for all")]
    pub completed: Option<bool>,
    #[schemars(description = "Filter by priority: 'low', 'medium', 'high' or 'urgent'")]
    pub priority: Option<String>,
    #[schemars(description = "Only tasks carrying every one of these tags")]
    pub tags: Option<Vec<String>>,
    #[schemars(description = "Only tasks due within this many days (overdue included)")]
    pub due_within_days: Option<u32>,
    #[schemars(description = "Only incomplete tasks whose due date has passed")]
    pub overdue: Option<bool>,
    #[schemars(description = "true for recurring tasks only, false for one-off tasks only")]
    pub recurring: Option<bool>,
    #[schemars(description = "Case-insensitive text to find in title or description")]
    pub search: Option<String>,
    #[schemars(
        description = "Field to sort by (created_at, updated_at, due_date, priority, title). Default: created_at"
    )]
    pub sort_by: Option<String>,
    #[schemars(description = "Sort order (asc, desc). Default: asc")]
    pub sort_order: Option<String>,
    #[schemars(description = "Maximum number of tasks to return (default: 50, max: 200)")]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct UpdateTaskParams {
    #[schemars(description = "Task ID to update")]
    pub task_id: Id,
    #[schemars(description = "New title (optional)")]
    pub title: Option<String>,
    #[schemars(description = "New description (optional). Empty string clears it.")]
    pub description: Option<String>,
    #[schemars(description = "New priority: 'low', 'medium', 'high' or 'urgent' (optional)")]
    pub priority: Option<String>,
    #[schemars(
        description = "New due date as YYYY-MM-DD or a phrase like 'tomorrow' (optional). 'none' clears it."
    )]
    pub due_date: Option<String>,
    #[schemars(description = "Tags (optional). Replaces all existing tags when provided.")]
    pub tags: Option<Vec<String>>,
    #[schemars(
        description = "Recurrence: 'daily', 'weekly', 'monthly', 'yearly' (optional). 'none' stops it repeating."
    )]
    pub recurrence: Option<String>,
    #[schemars(description = "Set completion state (optional)")]
    pub completed: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CompleteTaskParams {
    #[schemars(description = "Task ID to mark as complete")]
    pub task_id: Id,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DeleteTaskParams {
    #[schemars(description = "Task ID to delete")]
    pub task_id: Id,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GetTaskParams {
    #[schemars(description = "Task ID")]
    pub task_id: Id,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DueSoonParams {
    #[schemars(description = "How many days ahead to look (default: 3)")]
    pub days: Option<u32>,
}

fn is_clear_word(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "" | "none" | "null" | "never" | "clear"
    )
}

fn parse_priority(tool: &str, value: &str) -> Result<Priority, ToolError> {
    value.parse().map_err(|e: String| ToolError::invalid(tool, e))
}

fn parse_recurrence(tool: &str, value: &str) -> Result<Recurrence, ToolError> {
    value
        .parse()
        .or_else(|e: String| extract::recurrence(value).ok_or(e))
        .map_err(|e| ToolError::invalid(tool, e))
}

fn parse_date(tool: &str, value: &str, today: NaiveDate) -> Result<NaiveDate, ToolError> {
    extract::due_date(value, today)
        .ok_or_else(|| ToolError::invalid(tool, format!("Unrecognised date: {}", value)))
}

impl AddTaskParams {
    pub fn into_new_task(self, today: NaiveDate) -> Result<NewTask, ToolError> {
        const TOOL: &str = "add_task";

        Ok(NewTask {
            title: self.title,
            description: self.description,
            priority: self
                .priority
                .as_deref()
                .map(|p| parse_priority(TOOL, p))
                .transpose()?
                .unwrap_or_default(),
            tags: self.tags.map(normalize_tags).unwrap_or_default(),
            due_date: self
                .due_date
                .as_deref()
                .map(|d| parse_date(TOOL, d, today))
                .transpose()?,
            recurrence: self
                .recurrence
                .as_deref()
                .map(|r| parse_recurrence(TOOL, r))
                .transpose()?,
            parent_task_id: None,
        })
    }
}

impl ListTasksParams {
    pub fn to_query(&self, today: NaiveDate) -> Result<TaskQuery, ToolError> {
        const TOOL: &str = "list_tasks";

        let sort_order = self
            .sort_order
            .as_deref()
            .map(|o| o.parse::<SortOrder>().map_err(|e| ToolError::invalid(TOOL, e)))
            .transpose()?;

        let mut query = TaskQuery {
            page: PageSort {
                limit: Some(self.limit.unwrap_or(DEFAULT_LIST_LIMIT).min(MAX_LIST_LIMIT)),
                offset: None,
                sort_by: self.sort_by.clone(),
                sort_order,
            },
            completed: self.completed,
            priority: self
                .priority
                .as_deref()
                .map(|p| parse_priority(TOOL, p))
                .transpose()?,
            tags: self
                .tags
                .as_ref()
                .map(normalize_tags)
                .filter(|tags| !tags.is_empty()),
            search: self.search.clone(),
            recurring: self.recurring,
            ..Default::default()
        };

        if let Some(days) = self.due_within_days {
            query.due_to = today.checked_add_days(Days::new(u64::from(days)));
        }

        if self.overdue == Some(true) {
            query.completed = Some(false);
            query.due_to = today.pred_opt();
        }

        Ok(query)
    }
}

impl UpdateTaskParams {
    pub fn to_patch(&self, today: NaiveDate) -> Result<TaskPatch, ToolError> {
        const TOOL: &str = "update_task";

        let due_date = match self.due_date.as_deref() {
            None => None,
            Some(d) if is_clear_word(d) => Some(None),
            Some(d) => Some(Some(parse_date(TOOL, d, today)?)),
        };

        let recurrence = match self.recurrence.as_deref() {
            None => None,
            Some(r) if is_clear_word(r) => Some(None),
            Some(r) => Some(Some(parse_recurrence(TOOL, r)?)),
        };

        Ok(TaskPatch {
            title: self.title.clone(),
            description: self.description.clone().map(Some),
            completed: self.completed,
            priority: self
                .priority
                .as_deref()
                .map(|p| parse_priority(TOOL, p))
                .transpose()?,
            tags: self.tags.as_ref().map(normalize_tags),
            due_date,
            recurrence,
        })
    }
}
