//! SQLite ConversationRepository implementation.

use sqlx::{Row, SqlitePool};

use crate::db::utils::current_timestamp;
use crate::db::{
    Conversation, ConversationRepository, DbError, DbResult, Id, Message, MessageRole,
    NewMessage,
};

/// SQLx-backed conversation repository.
pub struct SqliteConversationRepository<'a> {
    pub(crate) pool: &'a SqlitePool,
}

impl<'a> ConversationRepository for SqliteConversationRepository<'a> {
    async fn create(&self, title: &str) -> DbResult<Conversation> {
        let created_at = current_timestamp();

        let result = sqlx::query("INSERT INTO conversation (title, created_at) VALUES (?, ?)")
            .bind(title)
            .bind(&created_at)
            .execute(self.pool)
            .await?;

        Ok(Conversation {
            id: result.last_insert_rowid(),
            title: title.to_string(),
            created_at,
        })
    }

    async fn get(&self, id: Id) -> DbResult<Conversation> {
        let row = sqlx::query("SELECT id, title, created_at FROM conversation WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Conversation", id))?;

        row_to_conversation(&row)
    }

    async fn list(&self) -> DbResult<Vec<Conversation>> {
        let rows = sqlx::query(
            "SELECT id, title, created_at FROM conversation ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(self.pool)
        .await?;

        rows.iter().map(row_to_conversation).collect()
    }

    async fn add_message(&self, message: &NewMessage) -> DbResult<Message> {
        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM conversation WHERE id = ?")
            .bind(message.conversation_id)
            .fetch_optional(self.pool)
            .await?;
        if exists.is_none() {
            return Err(DbError::not_found("Conversation", message.conversation_id));
        }

        let created_at = current_timestamp();
        let tool_calls_json =
            serde_json::to_string(&message.tool_calls).map_err(|e| DbError::InvalidData {
                message: e.to_string(),
                help: "Tool call arguments and results must be valid JSON".to_string(),
            })?;

        let result = sqlx::query(
            r#"
            INSERT INTO message (conversation_id, role, content, tool_calls, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(message.conversation_id)
        .bind(message.role.to_string())
        .bind(&message.content)
        .bind(&tool_calls_json)
        .bind(&created_at)
        .execute(self.pool)
        .await?;

        Ok(Message {
            id: result.last_insert_rowid(),
            conversation_id: message.conversation_id,
            role: message.role,
            content: message.content.clone(),
            tool_calls: message.tool_calls.clone(),
            created_at,
        })
    }

    async fn messages(&self, conversation_id: Id) -> DbResult<Vec<Message>> {
        let rows = sqlx::query(
            r#"
            SELECT id, conversation_id, role, content, tool_calls, created_at
            FROM message
            WHERE conversation_id = ?
            ORDER BY id ASC
            "#,
        )
        .bind(conversation_id)
        .fetch_all(self.pool)
        .await?;

        rows.iter().map(row_to_message).collect()
    }
}

fn row_to_conversation(row: &sqlx::sqlite::SqliteRow) -> DbResult<Conversation> {
    Ok(Conversation {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        created_at: row.try_get("created_at")?,
    })
}

fn row_to_message(row: &sqlx::sqlite::SqliteRow) -> DbResult<Message> {
    let role: String = row.try_get("role")?;
    let role = role.parse::<MessageRole>().map_err(|e| DbError::InvalidData {
        message: e,
        help: "Message roles are 'user' or 'assistant'".to_string(),
    })?;

    let tool_calls: String = row.try_get("tool_calls")?;
    let tool_calls = serde_json::from_str(&tool_calls).unwrap_or_default();

    Ok(Message {
        id: row.try_get("id")?,
        conversation_id: row.try_get("conversation_id")?,
        role,
        content: row.try_get("content")?,
        tool_calls,
        created_at: row.try_get("created_at")?,
    })
}
