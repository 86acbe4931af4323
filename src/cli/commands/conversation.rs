use tabled::{Table, Tabled};

use super::OutputFormat;
use crate::chat::ChatService;
use crate::cli::error::CliResult;
use crate::cli::utils::{apply_table_style, truncate_with_ellipsis};
use crate::db::{Conversation, Database, Id, MessageRole};

#[derive(Tabled)]
pub(crate) struct ConversationDisplay {
    #[tabled(rename = "ID")]
    pub(crate) id: Id,
    #[tabled(rename = "Title")]
    pub(crate) title: String,
    #[tabled(rename = "Started")]
    pub(crate) created_at: String,
}

impl From<&Conversation> for ConversationDisplay {
    fn from(conversation: &Conversation) -> Self {
        Self {
            id: conversation.id,
            title: truncate_with_ellipsis(&conversation.title, 50),
            created_at: conversation.created_at.clone(),
        }
    }
}

/// List conversations
pub async fn list_conversations<D: Database + 'static>(
    chat: &ChatService<D>,
    format: OutputFormat,
) -> CliResult<String> {
    let conversations = chat.conversations().await?;

    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&conversations)?),
        OutputFormat::Table => {
            if conversations.is_empty() {
                return Ok("No conversations found.".to_string());
            }
            let rows: Vec<ConversationDisplay> = conversations.iter().map(|c| c.into()).collect();
            let mut table = Table::new(rows);
            apply_table_style(&mut table);
            Ok(table.to_string())
        }
    }
}

/// Show a conversation's messages
pub async fn show_conversation<D: Database + 'static>(
    chat: &ChatService<D>,
    id: Id,
    format: OutputFormat,
) -> CliResult<String> {
    let history = chat.history(id).await?;

    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(&history)?);
    }

    let mut lines = vec![format!(
        "Conversation #{}: {}",
        history.conversation.id, history.conversation.title
    )];
    for message in &history.messages {
        let speaker = match message.role {
            MessageRole::User => "you",
            MessageRole::Assistant => "assistant",
        };
        lines.push(String::new());
        lines.push(format!("[{}] {}", speaker, message.created_at));
        lines.push(message.content.clone());
        for call in &message.tool_calls {
            lines.push(format!("  ↳ {} {}", call.name, call.arguments));
        }
    }
    Ok(lines.join("\n"))
}
