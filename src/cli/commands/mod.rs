pub mod chat;
pub mod conversation;
pub mod serve;
pub mod task;

use clap::ValueEnum;

/// Output format of commands that print records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}


#[cfg(test)]
#[path = "chat_test.rs"]
mod chat_test;

#[cfg(test)]
#[path = "conversation_test.rs"]
mod conversation_test;

#[cfg(test)]
#[path = "serve_test.rs"]
mod serve_test;
