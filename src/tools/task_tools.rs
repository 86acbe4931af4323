//! The five task tools and their registration.

use serde_json::{Value, json};

use super::params::{
    AddTaskParams, CompleteTaskParams, DeleteTaskParams, ListTasksParams, UpdateTaskParams,
};
use super::{ToolError, ToolRegistry};
use crate::db::Database;
use crate::db::utils::today;
use crate::tasks::TaskService;

pub async fn add_task<D: Database>(
    service: &TaskService<D>,
    params: AddTaskParams,
) -> Result<Value, ToolError> {
    let new = params.into_new_task(today())?;
    let task = service.create(new).await?;
    Ok(serde_json::to_value(task)?)
}

pub async fn list_tasks<D: Database>(
    service: &TaskService<D>,
    params: ListTasksParams,
) -> Result<Value, ToolError> {
    let query = params.to_query(today())?;
    let result = service.list(&query).await?;
    Ok(json!({
        "items": result.items,
        "total": result.total,
        "limit": result.limit,
        "offset": result.offset,
    }))
}

pub async fn update_task<D: Database>(
    service: &TaskService<D>,
    params: UpdateTaskParams,
) -> Result<Value, ToolError> {
    let patch = params.to_patch(today())?;
    let task = service.update(params.task_id, patch).await?;
    Ok(serde_json::to_value(task)?)
}

pub async fn complete_task<D: Database>(
    service: &TaskService<D>,
    params: CompleteTaskParams,
) -> Result<Value, ToolError> {
    let completion = service.complete(params.task_id).await?;
    Ok(serde_json::to_value(completion)?)
}

pub async fn delete_task<D: Database>(
    service: &TaskService<D>,
    params: DeleteTaskParams,
) -> Result<Value, ToolError> {
    let task = service.delete(params.task_id).await?;
    Ok(json!({ "deleted": true, "task": task }))
}

impl ToolRegistry {
    /// Registry holding the task tools, backed by `service`.
    pub fn for_tasks<D: Database + 'static>(service: TaskService<D>) -> Self {
        let mut registry = ToolRegistry::new();

        let s = service.clone();
        registry.register(
            "add_task",
            "Create a new task. Supports priority, due date, tags and recurrence.",
            move |params: AddTaskParams| {
                let service = s.clone();
                async move { add_task(&service, params).await }
            },
        );

        let s = service.clone();
        registry.register(
            "list_tasks",
            "List tasks. Filter by completion, priority, tags, due window, overdue, recurrence or text.",
            move |params: ListTasksParams| {
                let service = s.clone();
                async move { list_tasks(&service, params).await }
            },
        );

        let s = service.clone();
        registry.register(
            "update_task",
            "Update fields of an existing task by ID. Only the given fields change.",
            move |params: UpdateTaskParams| {
                let service = s.clone();
                async move { update_task(&service, params).await }
            },
        );

        let s = service.clone();
        registry.register(
            "complete_task",
            "Mark a task as complete. Recurring tasks with a due date get their next occurrence created.",
            move |params: CompleteTaskParams| {
                let service = s.clone();
                async move { complete_task(&service, params).await }
            },
        );

        registry.register(
            "delete_task",
            "Delete a task by ID.",
            move |params: DeleteTaskParams| {
                let service = service.clone();
                async move { delete_task(&service, params).await }
            },
        );

        registry
    }
}
