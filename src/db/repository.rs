//! Repository traits for data access abstraction.
//!
//! These traits define the contract for data access, allowing different
//! storage backends to be swapped without changing business logic.
//! Futures are required to be `Send` so callers can hold them across
//! axum handlers and spawned tasks.

use std::future::Future;

use crate::db::{
    DbResult,
    models::{
        Conversation, Id, ListResult, Message, NewMessage, NewTask, Task, TaskQuery,
    },
};

/// Repository for Task operations.
pub trait TaskRepository: Send + Sync {
    /// Create a new task and return it with its generated id and timestamps.
    fn create(&self, task: &NewTask) -> impl Future<Output = DbResult<Task>> + Send;

    /// Get a task by ID.
    fn get(&self, id: Id) -> impl Future<Output = DbResult<Task>> + Send;

    /// List tasks matching a query.
    fn list(&self, query: &TaskQuery) -> impl Future<Output = DbResult<ListResult<Task>>> + Send;

    /// Persist every mutable field of an existing task.
    fn update(&self, task: &Task) -> impl Future<Output = DbResult<()>> + Send;

    /// Delete a task by ID.
    fn delete(&self, id: Id) -> impl Future<Output = DbResult<()>> + Send;
}

/// Repository for conversations and their messages.
pub trait ConversationRepository: Send + Sync {
    /// Start a new conversation.
    fn create(&self, title: &str) -> impl Future<Output = DbResult<Conversation>> + Send;

    /// Get a conversation by ID.
    fn get(&self, id: Id) -> impl Future<Output = DbResult<Conversation>> + Send;

    /// All conversations, newest first.
    fn list(&self) -> impl Future<Output = DbResult<Vec<Conversation>>> + Send;

    /// Append a message to a conversation.
    fn add_message(&self, message: &NewMessage) -> impl Future<Output = DbResult<Message>> + Send;

    /// Messages of a conversation in the order they were written.
    fn messages(&self, conversation_id: Id) -> impl Future<Output = DbResult<Vec<Message>>> + Send;
}

/// Combined database interface.
pub trait Database: Send + Sync {
    type Tasks<'a>: TaskRepository
    where
        Self: 'a;
    type Conversations<'a>: ConversationRepository
    where
        Self: 'a;

    /// Run pending migrations.
    fn migrate(&self) -> impl Future<Output = DbResult<()>> + Send;

    /// Get the task repository.
    fn tasks(&self) -> Self::Tasks<'_>;

    /// Get the conversation repository.
    fn conversations(&self) -> Self::Conversations<'_>;
}
