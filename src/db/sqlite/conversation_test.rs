//! Tests for SqliteConversationRepository.

use serde_json::json;

use crate::db::{
    ConversationRepository, Database, DbError, MessageRole, NewMessage, SqliteDatabase,
    ToolCallRecord,
};

async fn setup_db() -> SqliteDatabase {
    let db = SqliteDatabase::in_memory()
        .await
        .expect("Failed to create in-memory database");
    db.migrate().await.expect("Migration should succeed");
    db
}

#[tokio::test(flavor = "multi_thread")]
async fn conversation_create_and_get() {
    let db = setup_db().await;
    let conversations = db.conversations();

    let created = conversations
        .create("Weekend plans")
        .await
        .expect("Create should succeed");
    assert!(created.id > 0);

    let retrieved = conversations.get(created.id).await.expect("get");
    assert_eq!(retrieved, created);
}

#[tokio::test(flavor = "multi_thread")]
async fn conversation_get_nonexistent_returns_not_found() {
    let db = setup_db().await;

    let result = db.conversations().get(12).await;
    assert!(matches!(result, Err(DbError::NotFound { .. })));
}

#[tokio::test(flavor = "multi_thread")]
async fn conversation_list_newest_first() {
    let db = setup_db().await;
    let conversations = db.conversations();

    let first = conversations.create("first").await.expect("create");
    let second = conversations.create("second").await.expect("create");

    let list = conversations.list().await.expect("list");
    let ids: Vec<_> = list.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
}

#[tokio::test(flavor = "multi_thread")]
async fn messages_round_trip_in_order_with_tool_calls() {
    let db = setup_db().await;
    let conversations = db.conversations();
    let conversation = conversations.create("chat").await.expect("create");

    conversations
        .add_message(&NewMessage {
            conversation_id: conversation.id,
            role: MessageRole::User,
            content: "add task buy milk".to_string(),
            tool_calls: vec![],
        })
        .await
        .expect("add user message");

    let call = ToolCallRecord {
        name: "add_task".to_string(),
        arguments: json!({"title": "buy milk"}),
        result: json!({"id": 1, "title": "buy milk"}),
    };
    conversations
        .add_message(&NewMessage {
            conversation_id: conversation.id,
            role: MessageRole::Assistant,
            content: "Added task 'buy milk'.".to_string(),
            tool_calls: vec![call.clone()],
        })
        .await
        .expect("add assistant message");

    let messages = conversations.messages(conversation.id).await.expect("messages");
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, MessageRole::User);
    assert!(messages[0].tool_calls.is_empty());
    assert_eq!(messages[1].role, MessageRole::Assistant);
    assert_eq!(messages[1].tool_calls, vec![call]);
}

#[tokio::test(flavor = "multi_thread")]
async fn add_message_to_missing_conversation_fails() {
    let db = setup_db().await;

    let result = db
        .conversations()
        .add_message(&NewMessage {
            conversation_id: 77,
            role: MessageRole::User,
            content: "hello".to_string(),
            tool_calls: vec![],
        })
        .await;
    assert!(matches!(result, Err(DbError::NotFound { .. })));
}

#[tokio::test(flavor = "multi_thread")]
async fn messages_of_other_conversations_are_isolated() {
    let db = setup_db().await;
    let conversations = db.conversations();
    let a = conversations.create("a").await.expect("create");
    let b = conversations.create("b").await.expect("create");

    conversations
        .add_message(&NewMessage {
            conversation_id: a.id,
            role: MessageRole::User,
            content: "in a".to_string(),
            tool_calls: vec![],
        })
        .await
        .expect("add");

    assert!(conversations.messages(b.id).await.expect("messages").is_empty());
}
