use crate::chat::{ChatAgent, ChatError, ChatService};
use crate::cli::commands::chat::*;
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
async fn test_send_prints_reply_and_conversation() {
    let chat = setup().await;

    let output = send(&chat, None, "Add a task to book flights").await.unwrap();
    assert_eq!(
        output,
        "I've created task #1: 'book flights'.\n(conversation #1)"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_send_to_unknown_conversation_fails() {
    let chat = setup().await;

    let result = send(&chat, Some(9), "hello").await;
    assert!(matches!(
        result,
        Err(CliError::Chat(ChatError::ConversationNotFound { id: 9 }))
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_repl_keeps_one_conversation() {
    let chat = setup().await;
    let input: &[u8] = b"Add a task to buy stamps\n\nshow my tasks\nexit\nAdd a task to ignored\n";
    let mut output = Vec::new();

    let conversation = repl(&chat, None, input, &mut output).await.unwrap();
    assert_eq!(conversation, Some(1));

    let text = String::from_utf8(output).unwrap();
    assert!(text.contains("I've created task #1: 'buy stamps'."));
    assert!(text.contains("#1 buy stamps"));
    assert!(!text.contains("ignored"));

    let history = chat.history(1).await.unwrap();
    assert_eq!(history.messages.len(), 4);
    assert_eq!(chat.conversations().await.unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_repl_stops_at_end_of_input() {
    let chat = setup().await;
    let input: &[u8] = b"";
    let mut output = Vec::new();

    let conversation = repl(&chat, None, input, &mut output).await.unwrap();
    assert_eq!(conversation, None);
    assert!(String::from_utf8(output).unwrap().starts_with("taskchat"));
}
