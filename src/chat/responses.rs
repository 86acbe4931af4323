//! Canned replies rendered from tool results.

use chrono::NaiveDateTime;

use super::intent::tokenize;
use crate::db::{Id, Priority, Task};
use crate::tasks::Completion;
use crate::tools::ToolError;
use crate::tools::params::ListTasksParams;

/// Example commands shown by `help`.
pub const HELP_COMMANDS: &[&str] = &[
    "Add a task to [task description]",
    "Create a [priority] priority task to [task description]",
    "Add a task to [description] due tomorrow tagged work, home",
    "Create a task to [description] every week",
    "Show me my tasks",
    "Show [priority] tasks (e.g. urgent, high, low)",
    "Show completed tasks / Show pending tasks",
    "What tasks are overdue? / Show tasks due this week",
    "Complete task [number] / Mark task [number] as done",
    "Update task [number] title to \"[new title]\"",
    "Change task [number] to [priority] priority",
    "Delete task [number]",
];

/// One bulleted line: `- [x] #3 Title (Priority: high, due 2025-03-14)`.
pub fn task_line(task: &Task) -> String {
    let mut details = vec![format!("Priority: {}", task.priority)];
    if let Some(due) = task.due_date {
        details.push(format!("due {}", due));
    }
    if let Some(recurrence) = task.recurrence {
        details.push(format!("repeats {}", recurrence));
    }
    if !task.tags.is_empty() {
        details.push(format!("tags: {}", task.tags.join(", ")));
    }

    format!(
        "- [{}] #{} {} ({})",
        if task.completed { "x" } else { " " },
        task.id,
        task.title,
        details.join(", ")
    )
}

fn list_label(filters: &ListTasksParams) -> (String, String) {
    let mut before: Vec<String> = Vec::new();
    let mut after: Vec<String> = Vec::new();

    if filters.overdue == Some(true) {
        before.push("overdue".to_string());
    } else {
        match filters.completed {
            Some(true) => before.push("completed".to_string()),
            Some(false) => before.push("pending".to_string()),
            None => {}
        }
    }
    if let Some(priority) = &filters.priority {
        before.push(format!("{} priority", priority));
    }
    if filters.recurring == Some(true) {
        before.push("recurring".to_string());
    }

    if let Some(tags) = &filters.tags {
        after.push(format!(
            "tagged {}",
            tags.iter()
                .map(|t| format!("#{}", t))
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }
    match filters.due_within_days {
        Some(0) => after.push("due today".to_string()),
        Some(1) => after.push("due by tomorrow".to_string()),
        Some(days) => after.push(format!("due within {} days", days)),
        None => {}
    }
    if let Some(search) = &filters.search {
        after.push(format!("matching '{}'", search));
    }

    let before = before
        .into_iter()
        .map(|w| format!("{} ", w))
        .collect::<String>();
    let after = after
        .into_iter()
        .map(|w| format!(" {}", w))
        .collect::<String>();
    (before, after)
}

/// Render a listing.
pub fn task_list(tasks: &[Task], total: usize, filters: &ListTasksParams) -> String {
    let (before, after) = list_label(filters);

    if tasks.is_empty() {
        return format!("You don't have any {}tasks{}.", before, after);
    }

    let lines = tasks.iter().map(task_line).collect::<Vec<_>>().join("\n");
    let noun = if total == 1 { "task" } else { "tasks" };
    let mut response = format!(
        "You have {} {}{}{}:\n{}",
        total, before, noun, after, lines
    );
    if total > tasks.len() {
        response.push_str(&format!("\n...and {} more.", total - tasks.len()));
    }
    response
}

pub fn task_added(task: &Task) -> String {
    let mut parts = vec![format!("I've created task #{}: '{}'", task.id, task.title)];
    if task.priority != Priority::Medium {
        parts.push(format!("with {} priority", task.priority));
    }
    if let Some(due) = task.due_date {
        parts.push(format!("due on {}", due));
    }
    if let Some(recurrence) = task.recurrence {
        parts.push(format!("recurring {}", recurrence));
    }
    if !task.tags.is_empty() {
        parts.push(format!("with tags {}", task.tags.join(", ")));
    }
    format!("{}.", parts.join(" "))
}

pub fn task_updated(task: &Task, changed: &[&str]) -> String {
    if changed.is_empty() {
        format!("I've updated task #{} '{}'.", task.id, task.title)
    } else {
        format!(
            "I've updated the {} of task #{} '{}'.",
            changed.join(", "),
            task.id,
            task.title
        )
    }
}

pub fn task_reopened(task: &Task) -> String {
    format!("I've marked task #{} '{}' as not done.", task.id, task.title)
}

pub fn task_completed(completion: &Completion) -> String {
    let task = &completion.task;
    let mut response = format!("I've marked task #{} '{}' as complete.", task.id, task.title);
    if let Some(next) = &completion.next {
        match next.due_date {
            Some(due) => response.push_str(&format!(
                " The next occurrence is task #{}, due {}.",
                next.id, due
            )),
            None => response.push_str(&format!(" The next occurrence is task #{}.", next.id)),
        }
    }
    response
}

pub fn task_deleted(task: &Task) -> String {
    format!("I've deleted task #{} '{}'.", task.id, task.title)
}

/// Reply for a failed tool call. `action` is a verb such as "add" or "delete".
pub fn tool_failed(action: &str, task_id: Option<Id>, error: &ToolError) -> String {
    match task_id {
        Some(id) if error.is_not_found() => format!("I couldn't find task #{}.", id),
        _ => format!("Sorry, I couldn't {} the task. Error: {}", action, error),
    }
}

pub fn list_failed(error: &ToolError) -> String {
    format!("Sorry, I couldn't list your tasks. Error: {}", error)
}

pub fn which_task(action: &str) -> String {
    format!(
        "Which task would you like to {}? Please specify the task number or name.",
        action
    )
}

pub fn no_task_matching(query: &str) -> String {
    format!(
        "I couldn't find a task matching '{}'. Try 'show my tasks' to see their numbers.",
        query
    )
}

pub fn ambiguous(query: &str, action: &str, candidates: &[Task]) -> String {
    let lines = candidates
        .iter()
        .map(task_line)
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "I found several tasks matching '{}'. Which one would you like to {}?\n{}",
        query, action, lines
    )
}

pub fn what_to_update(id: Id) -> String {
    format!(
        "What would you like to update for task #{}? You can change the title, description, priority, due date, tags or recurrence.",
        id
    )
}

/// Reply to a message that is not a task command.
pub fn general(message: &str, now: NaiveDateTime) -> String {
    let lower = message.to_lowercase();
    let tokens = tokenize(message);
    let has_any = |words: &[&str]| tokens.iter().any(|t| words.contains(&t.as_str()));

    if lower.contains("what time") {
        return format!(
            "The current time is {}. How can I help with your tasks?",
            now.format("%H:%M:%S")
        );
    }
    if lower.contains("what date") || lower.contains("today's date") || lower.contains("what day")
    {
        return format!(
            "Today's date is {}. What task would you like to manage?",
            now.format("%Y-%m-%d")
        );
    }
    if has_any(&["help", "commands"]) {
        let commands = HELP_COMMANDS
            .iter()
            .map(|c| format!("- {}", c))
            .collect::<Vec<_>>()
            .join("\n");
        return format!(
            "I can help you manage your tasks. Try one of these:\n{}",
            commands
        );
    }
    if has_any(&["hello", "hi", "hey", "greetings"])
        || lower.contains("good morning")
        || lower.contains("good afternoon")
        || lower.contains("good evening")
    {
        return "Hello! I'm your task assistant. You can ask me to add, list, update, complete, or delete tasks.".to_string();
    }
    if has_any(&["thanks", "thx"]) || lower.contains("thank you") {
        return "You're welcome! Let me know if there's anything else I can help you with."
            .to_string();
    }

    format!(
        "I'm not sure how to help with that. You can ask me to add, list, update, complete, or delete tasks. Your message: '{}'",
        message.trim()
    )
}
