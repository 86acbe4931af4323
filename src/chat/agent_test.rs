use chrono::{NaiveDate, NaiveDateTime};

use super::agent::RuleBasedAgent;
use crate::db::{Database, SqliteDatabase};
use crate::tasks::TaskService;

async fn setup() -> RuleBasedAgent<SqliteDatabase> {
    let db = SqliteDatabase::in_memory()
        .await
        .expect("Failed to create in-memory database");
    db.migrate().await.expect("Migration should succeed");
    RuleBasedAgent::new(TaskService::new(db))
}

/// Wednesday morning.
fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, 12)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn add_task_confirms_extracted_fields() {
    let agent = setup().await;

    let reply = agent
        .respond_at(
            "Add a high priority task to submit report by friday tagged work",
            now(),
        )
        .await;

    assert_eq!(
        reply.response,
        "I've created task #1: 'submit report' with high priority due on 2025-03-14 with tags work."
    );
    assert_eq!(reply.tool_calls.len(), 1);
    assert_eq!(reply.tool_calls[0].name, "add_task");
    assert_eq!(reply.tool_calls[0].arguments["title"], "submit report");
    assert_eq!(reply.tool_calls[0].result["id"], 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn list_tasks_renders_bullets() {
    let agent = setup().await;

    let empty = agent.respond_at("show my tasks", now()).await;
    assert_eq!(empty.response, "You don't have any tasks.");

    agent
        .respond_at("Add a task to buy groceries", now())
        .await;
    agent
        .respond_at("Add an urgent task to fix the leak", now())
        .await;

    let reply = agent.respond_at("show my tasks", now()).await;
    assert!(reply.response.starts_with("You have 2 tasks:\n"));
    assert!(reply.response.contains("- [ ] #1 buy groceries (Priority: medium)"));
    assert!(reply.response.contains("- [ ] #2 fix the leak (Priority: urgent)"));
    assert_eq!(reply.tool_calls[0].name, "list_tasks");

    let urgent = agent.respond_at("show urgent tasks", now()).await;
    assert!(urgent.response.starts_with("You have 1 urgent priority task:"));
}

#[tokio::test(flavor = "multi_thread")]
async fn complete_by_id_and_by_title() {
    let agent = setup().await;
    agent
        .respond_at("Add a task to submit report", now())
        .await;
    agent
        .respond_at("Add a task to do the laundry", now())
        .await;

    let reply = agent.respond_at("Mark task 1 as done", now()).await;
    assert_eq!(
        reply.response,
        "I've marked task #1 'submit report' as complete."
    );
    assert_eq!(reply.tool_calls[0].name, "complete_task");
    assert_eq!(reply.tool_calls[0].arguments["task_id"], 1);

    let reply = agent.respond_at("I finished the laundry task", now()).await;
    assert_eq!(
        reply.response,
        "I've marked task #2 'do the laundry' as complete."
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn completing_recurring_task_reports_next_occurrence() {
    let agent = setup().await;
    agent
        .respond_at("Create a task to pay rent every month due 2025-04-01", now())
        .await;

    let reply = agent.respond_at("complete task 1", now()).await;
    assert_eq!(
        reply.response,
        "I've marked task #1 'pay rent' as complete. The next occurrence is task #2, due 2025-05-01."
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_task_is_reported() {
    let agent = setup().await;

    let reply = agent.respond_at("delete task 42", now()).await;
    assert_eq!(reply.response, "I couldn't find task #42.");
    assert_eq!(reply.tool_calls.len(), 1);
    assert!(reply.tool_calls[0].result["error"].is_string());
}

#[tokio::test(flavor = "multi_thread")]
async fn ambiguous_title_asks_which_one() {
    let agent = setup().await;
    agent.respond_at("Add a task to call mom", now()).await;
    agent.respond_at("Add a task to call dad", now()).await;

    let reply = agent.respond_at("delete the call task", now()).await;
    assert!(
        reply
            .response
            .starts_with("I found several tasks matching 'call'. Which one would you like to delete?")
    );
    assert!(reply.response.contains("#1 call mom"));
    assert!(reply.response.contains("#2 call dad"));
    assert!(reply.tool_calls.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn reference_problems_ask_for_clarification() {
    let agent = setup().await;

    let reply = agent.respond_at("delete a task", now()).await;
    assert_eq!(
        reply.response,
        "Which task would you like to delete? Please specify the task number or name."
    );

    let reply = agent.respond_at("complete the unicorn task", now()).await;
    assert!(
        reply
            .response
            .starts_with("I couldn't find a task matching 'unicorn'.")
    );
    assert!(reply.tool_calls.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn update_changes_requested_fields() {
    let agent = setup().await;
    agent.respond_at("Add a task to buy milk", now()).await;

    let reply = agent
        .respond_at("Update task 1 title to \"Buy oat milk\"", now())
        .await;
    assert_eq!(
        reply.response,
        "I've updated the title of task #1 'Buy oat milk'."
    );

    let reply = agent
        .respond_at("change task 1 priority to urgent", now())
        .await;
    assert_eq!(
        reply.response,
        "I've updated the priority of task #1 'Buy oat milk'."
    );
    assert_eq!(reply.tool_calls[0].result["priority"], "urgent");

    let reply = agent.respond_at("edit task 1", now()).await;
    assert!(
        reply
            .response
            .starts_with("What would you like to update for task #1?")
    );
    assert!(reply.tool_calls.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn rename_with_command_word_in_new_title() {
    let agent = setup().await;
    agent.respond_at("Add a task to cook", now()).await;

    let reply = agent
        .respond_at("Rename task 1 to \"Make dinner\"", now())
        .await;
    assert_eq!(
        reply.response,
        "I've updated the title of task #1 'Make dinner'."
    );
    assert_eq!(reply.tool_calls.len(), 1);
    assert_eq!(reply.tool_calls[0].name, "update_task");
}

#[tokio::test(flavor = "multi_thread")]
async fn mark_not_done_reopens_task() {
    let agent = setup().await;
    agent.respond_at("Add a task to buy milk", now()).await;
    agent.respond_at("complete task 1", now()).await;

    let reply = agent.respond_at("mark task 1 as not done", now()).await;
    assert_eq!(reply.response, "I've marked task #1 'buy milk' as not done.");
    assert_eq!(reply.tool_calls[0].name, "update_task");
    assert_eq!(reply.tool_calls[0].result["completed"], false);
}

#[tokio::test(flavor = "multi_thread")]
async fn general_messages_use_templates() {
    let agent = setup().await;

    let reply = agent.respond_at("what time is it?", now()).await;
    assert_eq!(
        reply.response,
        "The current time is 09:30:00. How can I help with your tasks?"
    );
    assert!(reply.tool_calls.is_empty());

    let reply = agent.respond_at("what date is it", now()).await;
    assert!(reply.response.contains("2025-03-12"));

    let reply = agent.respond_at("help", now()).await;
    assert!(reply.response.contains("Show me my tasks"));

    let reply = agent.respond_at("hello there", now()).await;
    assert!(reply.response.starts_with("Hello!"));

    let reply = agent.respond_at("sing me a song", now()).await;
    assert!(reply.response.starts_with("I'm not sure how to help with that."));
    assert!(reply.response.ends_with("Your message: 'sing me a song'"));
}
