//! Task service: domain rules on top of the task repository.

use std::sync::Arc;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use super::recurrence::next_occurrence;
use crate::db::utils::{current_timestamp, normalize_tags, today};
use crate::db::{
    Database, DbError, DbResult, Id, ListResult, NewTask, PageSort, SortOrder, Task, TaskPatch,
    TaskQuery, TaskRepository,
};

/// Outcome of completing a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    pub task: Task,
    /// The follow-up instance spawned for a recurring task with a due date.
    pub next: Option<Task>,
}

/// Task operations shared by the chat agent, the tool registry, MCP and the CLI.
pub struct TaskService<D: Database> {
    db: Arc<D>,
}

impl<D: Database> Clone for TaskService<D> {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
        }
    }
}

fn validation(message: impl Into<String>) -> DbError {
    DbError::Validation {
        message: message.into(),
    }
}

fn clean_title(title: &str) -> DbResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(validation("Task title cannot be empty"));
    }
    Ok(title.to_string())
}

fn clean_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

impl<D: Database> TaskService<D> {
    pub fn new(db: impl Into<Arc<D>>) -> Self {
        Self { db: db.into() }
    }

    pub fn db(&self) -> &Arc<D> {
        &self.db
    }

    #[instrument(skip(self, new), fields(title = %new.title))]
    pub async fn create(&self, mut new: NewTask) -> DbResult<Task> {
        new.title = clean_title(&new.title)?;
        new.description = clean_description(new.description);
        new.tags = normalize_tags(&new.tags);

        let task = self.db.tasks().create(&new).await?;
        info!(id = task.id, "created task");
        Ok(task)
    }

    pub async fn get(&self, id: Id) -> DbResult<Task> {
        self.db.tasks().get(id).await
    }

    pub async fn list(&self, query: &TaskQuery) -> DbResult<ListResult<Task>> {
        self.db.tasks().list(query).await
    }

    /// Apply the fields present in `patch`; everything else is left as stored.
    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: Id, patch: TaskPatch) -> DbResult<Task> {
        if patch.is_empty() {
            return Err(validation("No fields to update"));
        }

        let tasks = self.db.tasks();
        let mut task = tasks.get(id).await?;

        if let Some(title) = patch.title {
            task.title = clean_title(&title)?;
        }
        if let Some(description) = patch.description {
            task.description = clean_description(description);
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(tags) = patch.tags {
            task.tags = normalize_tags(&tags);
        }
        if let Some(due_date) = patch.due_date {
            task.due_date = due_date;
        }
        if let Some(recurrence) = patch.recurrence {
            task.recurrence = recurrence;
        }

        let now = current_timestamp();
        if let Some(completed) = patch.completed
            && completed != task.completed
        {
            task.completed = completed;
            task.completed_at = completed.then(|| now.clone());
        }
        task.updated_at = Some(now);

        tasks.update(&task).await?;
        info!(id, "updated task");
        Ok(task)
    }

    /// Delete a task, returning it as it was before removal.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Id) -> DbResult<Task> {
        let tasks = self.db.tasks();
        let task = tasks.get(id).await?;
        tasks.delete(id).await?;
        info!(id, "deleted task");
        Ok(task)
    }

    /// Mark a task done. Completing an already completed task changes nothing.
    ///
    /// A recurring task with a due date spawns its next occurrence. If that
    /// fails the task stays completed and `next` is `None`.
    #[instrument(skip(self))]
    pub async fn complete(&self, id: Id) -> DbResult<Completion> {
        let tasks = self.db.tasks();
        let mut task = tasks.get(id).await?;
        if task.completed {
            return Ok(Completion { task, next: None });
        }

        let now = current_timestamp();
        task.completed = true;
        task.completed_at = Some(now.clone());
        task.updated_at = Some(now);
        tasks.update(&task).await?;
        info!(id, "completed task");

        let next = if task.is_recurring() && task.due_date.is_some() {
            match self.spawn_next(&task, today()).await {
                Ok(next) => Some(next),
                Err(e) => {
                    warn!(id, error = %e, "failed to spawn next occurrence");
                    None
                }
            }
        } else {
            None
        };

        Ok(Completion { task, next })
    }

    /// Create the next occurrence of a recurring task.
    #[instrument(skip(self))]
    pub async fn create_recurring_instance(&self, id: Id) -> DbResult<Task> {
        let task = self.db.tasks().get(id).await?;
        self.spawn_next(&task, today()).await
    }

    async fn spawn_next(&self, task: &Task, today: NaiveDate) -> DbResult<Task> {
        let Some(recurrence) = task.recurrence else {
            return Err(validation(format!("Task {} is not recurring", task.id)));
        };

        let base = task.due_date.unwrap_or(today);
        let due_date = next_occurrence(base, recurrence)
            .ok_or_else(|| validation("Next occurrence is out of the supported date range"))?;

        let next = NewTask {
            title: task.title.clone(),
            description: task.description.clone(),
            priority: task.priority,
            tags: task.tags.clone(),
            due_date: Some(due_date),
            recurrence: Some(recurrence),
            parent_task_id: Some(task.id),
        };

        let created = self.db.tasks().create(&next).await?;
        info!(parent = task.id, id = created.id, due = %due_date, "spawned next occurrence");
        Ok(created)
    }

    /// Incomplete tasks due within `days_ahead` days of `today`, overdue ones
    /// included, soonest first.
    pub async fn due_soon(&self, days_ahead: u32, today: NaiveDate) -> DbResult<Vec<Task>> {
        let query = TaskQuery {
            page: PageSort {
                sort_by: Some("due_date".to_string()),
                sort_order: Some(SortOrder::Asc),
                ..Default::default()
            },
            completed: Some(false),
            due_to: Some(
                today
                    .checked_add_days(Days::new(u64::from(days_ahead)))
                    .unwrap_or(NaiveDate::MAX),
            ),
            ..Default::default()
        };
        Ok(self.db.tasks().list(&query).await?.items)
    }

    /// Every task that carries a recurrence pattern.
    pub async fn recurring(&self) -> DbResult<Vec<Task>> {
        let query = TaskQuery {
            recurring: Some(true),
            ..Default::default()
        };
        Ok(self.db.tasks().list(&query).await?.items)
    }
}
