//! SQLite implementation of the database traits.
//!
//! This module provides an SQLx-backed implementation of the repository
//! traits defined in the parent module.

mod connection;
mod conversation;
mod helpers;
mod task;

#[cfg(test)]
mod conversation_test;
#[cfg(test)]
mod task_test;

pub use connection::SqliteDatabase;
pub use conversation::SqliteConversationRepository;
pub use task::SqliteTaskRepository;
