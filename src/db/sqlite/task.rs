//! SQLite TaskRepository implementation.

use chrono::NaiveDate;
use sqlx::{Row, SqlitePool};

use super::helpers::{build_limit_offset_clause, build_order_clause, escape_like};
use crate::db::utils::current_timestamp;
use crate::db::{
    DbError, DbResult, Id, ListResult, NewTask, Priority, Recurrence, Task, TaskQuery,
    TaskRepository,
};

const TASK_COLUMNS: &str = "id, title, description, completed, priority, tags, due_date, \
     recurrence, parent_task_id, created_at, updated_at, completed_at";

const SORT_FIELDS: &[&str] = &["title", "created_at", "updated_at", "due_date", "priority"];

/// SQLx-backed task repository.
pub struct SqliteTaskRepository<'a> {
    pub(crate) pool: &'a SqlitePool,
}

impl<'a> TaskRepository for SqliteTaskRepository<'a> {
    async fn create(&self, task: &NewTask) -> DbResult<Task> {
        let created_at = current_timestamp();
        let tags_json = serde_json::to_string(&task.tags).unwrap_or_else(|_| "[]".to_string());

        let result = sqlx::query(
            r#"
            INSERT INTO task (title, description, completed, priority, tags, due_date, recurrence, parent_task_id, created_at)
            VALUES (?, ?, 0, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.priority.to_string())
        .bind(&tags_json)
        .bind(task.due_date.map(format_date))
        .bind(task.recurrence.map(|r| r.to_string()))
        .bind(task.parent_task_id)
        .bind(&created_at)
        .execute(self.pool)
        .await?;

        Ok(Task {
            id: result.last_insert_rowid(),
            title: task.title.clone(),
            description: task.description.clone(),
            completed: false,
            priority: task.priority,
            tags: task.tags.clone(),
            due_date: task.due_date,
            recurrence: task.recurrence,
            parent_task_id: task.parent_task_id,
            created_at,
            updated_at: None,
            completed_at: None,
        })
    }

    async fn get(&self, id: Id) -> DbResult<Task> {
        let sql = format!("SELECT {} FROM task WHERE id = ?", TASK_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Task", id))?;

        row_to_task(&row)
    }

    async fn list(&self, query: &TaskQuery) -> DbResult<ListResult<Task>> {
        let order_clause = build_order_clause(&query.page, SORT_FIELDS, "created_at");
        let limit_clause = build_limit_offset_clause(&query.page);

        // Build filter conditions
        let mut conditions: Vec<String> = Vec::new();
        let mut bind_values: Vec<String> = Vec::new();

        if let Some(completed) = query.completed {
            conditions.push(format!("completed = {}", i32::from(completed)));
        }

        if let Some(priority) = query.priority {
            conditions.push("priority = ?".to_string());
            bind_values.push(priority.to_string());
        }

        if let Some(tags) = &query.tags {
            for tag in tags {
                conditions.push(
                    "EXISTS (SELECT 1 FROM json_each(task.tags) WHERE json_each.value = ?)"
                        .to_string(),
                );
                bind_values.push(tag.clone());
            }
        }

        if let Some(from) = query.due_from {
            conditions.push("due_date IS NOT NULL AND due_date >= ?".to_string());
            bind_values.push(format_date(from));
        }

        if let Some(to) = query.due_to {
            conditions.push("due_date IS NOT NULL AND due_date <= ?".to_string());
            bind_values.push(format_date(to));
        }

        if let Some(search) = query.search.as_deref().map(str::trim)
            && !search.is_empty()
        {
            conditions.push(
                "(title LIKE ? ESCAPE '\\' OR IFNULL(description, '') LIKE ? ESCAPE '\\')"
                    .to_string(),
            );
            let pattern = format!("%{}%", escape_like(search));
            bind_values.push(pattern.clone());
            bind_values.push(pattern);
        }

        if let Some(recurring) = query.recurring {
            conditions.push(if recurring {
                "recurrence IS NOT NULL".to_string()
            } else {
                "recurrence IS NULL".to_string()
            });
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let sql = format!(
            "SELECT {} FROM task {} {}{}",
            TASK_COLUMNS, where_clause, order_clause, limit_clause
        );
        let count_sql = format!("SELECT COUNT(*) FROM task {}", where_clause);

        // Get paginated results
        let mut query_builder = sqlx::query(&sql);
        for value in &bind_values {
            query_builder = query_builder.bind(value);
        }

        let rows = query_builder.fetch_all(self.pool).await?;
        let items = rows.iter().map(row_to_task).collect::<DbResult<Vec<_>>>()?;

        // Get total count
        let mut count_query = sqlx::query_scalar(&count_sql);
        for value in &bind_values {
            count_query = count_query.bind(value);
        }

        let total: i64 = count_query.fetch_one(self.pool).await?;

        Ok(ListResult {
            items,
            total: total as usize,
            limit: query.page.limit,
            offset: query.page.offset.unwrap_or(0),
        })
    }

    async fn update(&self, task: &Task) -> DbResult<()> {
        let tags_json = serde_json::to_string(&task.tags).unwrap_or_else(|_| "[]".to_string());

        let result = sqlx::query(
            r#"
            UPDATE task
            SET title = ?, description = ?, completed = ?, priority = ?, tags = ?,
                due_date = ?, recurrence = ?, parent_task_id = ?, updated_at = ?, completed_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.completed)
        .bind(task.priority.to_string())
        .bind(&tags_json)
        .bind(task.due_date.map(format_date))
        .bind(task.recurrence.map(|r| r.to_string()))
        .bind(task.parent_task_id)
        .bind(&task.updated_at)
        .bind(&task.completed_at)
        .bind(task.id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Task", task.id));
        }

        Ok(())
    }

    async fn delete(&self, id: Id) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM task WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Task", id));
        }

        Ok(())
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Convert a database row to a Task model.
fn row_to_task(row: &sqlx::sqlite::SqliteRow) -> DbResult<Task> {
    let priority: String = row.try_get("priority")?;
    let priority = priority.parse::<Priority>().unwrap_or_default();

    let recurrence: Option<String> = row.try_get("recurrence")?;
    let recurrence = recurrence.and_then(|r| r.parse::<Recurrence>().ok());

    let tags_json: Option<String> = row.try_get("tags")?;
    let tags = tags_json
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default();

    let due_date: Option<String> = row.try_get("due_date")?;
    let due_date = due_date.and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok());

    Ok(Task {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        completed: row.try_get("completed")?,
        priority,
        tags,
        due_date,
        recurrence,
        parent_task_id: row.try_get("parent_task_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        completed_at: row.try_get("completed_at")?,
    })
}
