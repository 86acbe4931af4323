use serde_json::Value;

use super::OutputFormat;
use crate::chat::{ChatAgent, ChatError, ChatService};
use crate::cli::commands::conversation::*;
use crate::cli::error::CliError;
use crate::db::{Database, SqliteDatabase};
use crate::tasks::TaskService;

async fn setup() -> ChatService<SqliteDatabase> {
    let db = SqliteDatabase::in_memory()
        .await
        .expect("Failed to create in-memory database");
    db.migrate().await.expect("Migration should succeed");
    let service = TaskService::new(db);
    ChatService::new(service.clone(), ChatAgent::new(service))
}

#[tokio::test(flavor = "multi_thread")]
async fn test_list_conversations_empty() {
    let chat = setup().await;

    let output = list_conversations(&chat, OutputFormat::Table).await.unwrap();
    assert_eq!(output, "No conversations found.");

    let json = list_conversations(&chat, OutputFormat::Json).await.unwrap();
    assert_eq!(json, "[]");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_list_conversations_table() {
    let chat = setup().await;
    chat.send(None, "Add a task to renew insurance").await.unwrap();

    let output = list_conversations(&chat, OutputFormat::Table).await.unwrap();
    assert!(output.contains("Add a task to renew insurance"));
    assert!(output.contains("Started"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_show_conversation_lists_messages_and_tool_calls() {
    let chat = setup().await;
    chat.send(None, "Add a task to renew insurance").await.unwrap();

    let output = show_conversation(&chat, 1, OutputFormat::Table).await.unwrap();
    assert!(output.starts_with("Conversation #1: Add a task to renew insurance"));
    assert!(output.contains("[you]"));
    assert!(output.contains("[assistant]"));
    assert!(output.contains("I've created task #1: 'renew insurance'."));
    assert!(output.contains("↳ add_task"));

    let json = show_conversation(&chat, 1, OutputFormat::Json).await.unwrap();
    let history: Value = serde_json::from_str(&json).unwrap();
    assert_eq!(history["messages"].as_array().unwrap().len(), 2);
    assert_eq!(history["messages"][1]["role"], "assistant");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_show_unknown_conversation() {
    let chat = setup().await;

    let result = show_conversation(&chat, 5, OutputFormat::Table).await;
    assert!(matches!(
        result,
        Err(CliError::Chat(ChatError::ConversationNotFound { id: 5 }))
    ));
}
