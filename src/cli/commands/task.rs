use tabled::{Table, Tabled, builder::Builder};

use super::OutputFormat;
use crate::cli::error::{CliError, CliResult};
use crate::cli::utils::{apply_table_style, format_tags, or_dash, truncate_with_ellipsis};
use crate::db::utils::today;
use crate::db::{Database, Id, Task};
use crate::tasks::TaskService;
use crate::tools::params::{AddTaskParams, ListTasksParams, UpdateTaskParams};

#[derive(Tabled)]
pub(crate) struct TaskDisplay {
    #[tabled(rename = "ID")]
    pub(crate) id: Id,
    #[tabled(rename = "Title")]
    pub(crate) title: String,
    #[tabled(rename = "Done")]
    pub(crate) done: String,
    #[tabled(rename = "Priority")]
    pub(crate) priority: String,
    #[tabled(rename = "Due")]
    pub(crate) due: String,
    #[tabled(rename = "Tags")]
    pub(crate) tags: String,
    #[tabled(rename = "Repeats")]
    pub(crate) repeats: String,
}

impl From<&Task> for TaskDisplay {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            title: truncate_with_ellipsis(&task.title, 50),
            done: if task.completed { "✓" } else { "" }.to_string(),
            priority: task.priority.to_string(),
            due: or_dash(task.due_date),
            tags: format_tags(&task.tags),
            repeats: or_dash(task.recurrence),
        }
    }
}

pub(crate) fn format_table(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return "No tasks found.".to_string();
    }

    let display_tasks: Vec<TaskDisplay> = tasks.iter().map(|t| t.into()).collect();
    let mut table = Table::new(display_tasks);
    apply_table_style(&mut table);
    table.to_string()
}

pub(crate) fn format_task(task: &Task) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    builder.push_record(["ID", &task.id.to_string()]);
    builder.push_record(["Title", &task.title]);
    if let Some(desc) = &task.description {
        builder.push_record(["Description", desc]);
    }
    builder.push_record(["Completed", if task.completed { "yes" } else { "no" }]);
    builder.push_record(["Priority", &task.priority.to_string()]);
    builder.push_record(["Due", &or_dash(task.due_date)]);
    builder.push_record(["Tags", &format_tags(&task.tags)]);
    builder.push_record(["Repeats", &or_dash(task.recurrence)]);
    if let Some(parent) = task.parent_task_id {
        builder.push_record(["Previous occurrence", &parent.to_string()]);
    }
    builder.push_record(["Created", &task.created_at]);
    builder.push_record(["Updated", task.updated_at.as_deref().unwrap_or("-")]);
    builder.push_record(["Completed at", task.completed_at.as_deref().unwrap_or("-")]);

    let mut table = builder.build();
    apply_table_style(&mut table);
    table.to_string()
}

fn render_list(tasks: &[Task], format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(tasks)?),
        OutputFormat::Table => Ok(format_table(tasks)),
    }
}

/// Create a new task
pub async fn add_task<D: Database>(
    service: &TaskService<D>,
    params: AddTaskParams,
) -> CliResult<String> {
    let task = service.create(params.into_new_task(today())?).await?;
    Ok(format!("✓ Created task #{}: {}", task.id, task.title))
}

/// List tasks with optional filtering
pub async fn list_tasks<D: Database>(
    service: &TaskService<D>,
    params: ListTasksParams,
    format: OutputFormat,
) -> CliResult<String> {
    let query = params.to_query(today())?;
    let result = service.list(&query).await?;

    let mut output = render_list(&result.items, format)?;
    if format == OutputFormat::Table && result.total > result.items.len() {
        output.push_str(&format!(
            "\nShowing {} of {} tasks (use --limit for more)",
            result.items.len(),
            result.total
        ));
    }
    Ok(output)
}

/// Get a single task by ID
pub async fn get_task<D: Database>(
    service: &TaskService<D>,
    id: Id,
    format: OutputFormat,
) -> CliResult<String> {
    let task = service.get(id).await?;

    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&task)?),
        OutputFormat::Table => Ok(format_task(&task)),
    }
}

/// Update a task
pub async fn update_task<D: Database>(
    service: &TaskService<D>,
    params: UpdateTaskParams,
) -> CliResult<String> {
    let patch = params.to_patch(today())?;
    if patch.is_empty() {
        return Err(CliError::NothingToUpdate);
    }

    let task = service.update(params.task_id, patch).await?;
    Ok(format!("✓ Updated task #{}: {}", task.id, task.title))
}

/// Mark a task as complete
pub async fn complete_task<D: Database>(service: &TaskService<D>, id: Id) -> CliResult<String> {
    let completion = service.complete(id).await?;

    let mut output = format!("✓ Task #{} marked as complete", completion.task.id);
    if let Some(next) = completion.next {
        output.push_str(&format!(
            "\n↻ Next occurrence: #{} due {}",
            next.id,
            or_dash(next.due_date)
        ));
    }
    Ok(output)
}

/// Delete a task
pub async fn delete_task<D: Database>(service: &TaskService<D>, id: Id) -> CliResult<String> {
    let task = service.delete(id).await?;
    Ok(format!("✓ Deleted task #{}: {}", task.id, task.title))
}

/// Create the next occurrence of a recurring task
pub async fn next_occurrence<D: Database>(service: &TaskService<D>, id: Id) -> CliResult<String> {
    let task = service.create_recurring_instance(id).await?;
    Ok(format!(
        "✓ Created task #{}: {} (due {})",
        task.id,
        task.title,
        or_dash(task.due_date)
    ))
}

/// Incomplete tasks due within `days`, overdue ones included
pub async fn due_soon<D: Database>(
    service: &TaskService<D>,
    days: u32,
    format: OutputFormat,
) -> CliResult<String> {
    let tasks = service.due_soon(days, today()).await?;
    render_list(&tasks, format)
}

/// Every recurring task
pub async fn recurring<D: Database>(
    service: &TaskService<D>,
    format: OutputFormat,
) -> CliResult<String> {
    let tasks = service.recurring().await?;
    render_list(&tasks, format)
}
