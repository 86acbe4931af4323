//! Conversations: persist every exchange with the agent.

use std::sync::Arc;

use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument};

use super::agent::ChatAgent;
use crate::db::{
    Conversation, ConversationRepository, Database, DbError, Id, Message, MessageRole, NewMessage,
    ToolCallRecord,
};
use crate::tasks::TaskService;

/// Conversation titles are the opening message cut to this many characters.
const TITLE_CHARS: usize = 50;

#[derive(Error, Diagnostic, Debug)]
pub enum ChatError {
    #[error("Message cannot be empty")]
    #[diagnostic(code(taskchat::chat::empty_message))]
    EmptyMessage,

    #[error("Conversation not found: {id}")]
    #[diagnostic(
        code(taskchat::chat::conversation_not_found),
        help("Omit the conversation id to start a new one")
    )]
    ConversationNotFound { id: Id },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Db(#[from] DbError),
}

pub type ChatResult<T> = Result<T, ChatError>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatReply {
    pub conversation_id: Id,
    pub response: String,
    pub tool_calls: Vec<ToolCallRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationHistory {
    pub conversation: Conversation,
    pub messages: Vec<Message>,
}

pub struct ChatService<D: Database> {
    db: Arc<D>,
    agent: ChatAgent<D>,
}

impl<D: Database> Clone for ChatService<D> {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
            agent: self.agent.clone(),
        }
    }
}

fn conversation_title(message: &str) -> String {
    message.chars().take(TITLE_CHARS).collect()
}

impl<D: Database + 'static> ChatService<D> {
    /// Chat over `service` with the given agent.
    pub fn new(service: TaskService<D>, agent: ChatAgent<D>) -> Self {
        Self {
            db: Arc::clone(service.db()),
            agent,
        }
    }

    /// Chat with the LLM when the environment configures one.
    pub fn from_env(service: TaskService<D>) -> Self {
        let agent = ChatAgent::from_env(service.clone());
        Self::new(service, agent)
    }

    pub fn agent(&self) -> &ChatAgent<D> {
        &self.agent
    }

    async fn conversation(&self, id: Id) -> ChatResult<Conversation> {
        self.db
            .conversations()
            .get(id)
            .await
            .map_err(|e| match e {
                DbError::NotFound { .. } => ChatError::ConversationNotFound { id },
                other => other.into(),
            })
    }

    /// Send `message`, continuing `conversation_id` or starting a new conversation.
    #[instrument(skip(self, message))]
    pub async fn send(&self, conversation_id: Option<Id>, message: &str) -> ChatResult<ChatReply> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let conversation = match conversation_id {
            Some(id) => self.conversation(id).await?,
            None => {
                let created = self
                    .db
                    .conversations()
                    .create(&conversation_title(message))
                    .await?;
                info!(id = created.id, "started conversation");
                created
            }
        };

        self.db
            .conversations()
            .add_message(&NewMessage {
                conversation_id: conversation.id,
                role: MessageRole::User,
                content: message.to_string(),
                tool_calls: Vec::new(),
            })
            .await?;

        let reply = self.agent.respond(message).await;

        self.db
            .conversations()
            .add_message(&NewMessage {
                conversation_id: conversation.id,
                role: MessageRole::Assistant,
                content: reply.response.clone(),
                tool_calls: reply.tool_calls.clone(),
            })
            .await?;

        Ok(ChatReply {
            conversation_id: conversation.id,
            response: reply.response,
            tool_calls: reply.tool_calls,
        })
    }

    /// A conversation with its messages in the order they were written.
    pub async fn history(&self, id: Id) -> ChatResult<ConversationHistory> {
        let conversation = self.conversation(id).await?;
        let messages = self.db.conversations().messages(id).await?;
        Ok(ConversationHistory {
            conversation,
            messages,
        })
    }

    /// All conversations, newest first.
    pub async fn conversations(&self) -> ChatResult<Vec<Conversation>> {
        Ok(self.db.conversations().list().await?)
    }
}
