//! Tool registry errors.

use miette::Diagnostic;
use thiserror::Error;

use crate::db::DbError;

#[derive(Error, Diagnostic, Debug)]
pub enum ToolError {
    #[error("Unknown tool: {name}")]
    #[diagnostic(code(taskchat::tools::unknown_tool))]
    UnknownTool { name: String },

    #[error("Invalid arguments for {tool}: {message}")]
    #[diagnostic(code(taskchat::tools::invalid_arguments))]
    InvalidArguments { tool: String, message: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Db(#[from] DbError),

    #[error("Failed to encode tool result: {0}")]
    #[diagnostic(code(taskchat::tools::encode))]
    Encode(#[from] serde_json::Error),
}

impl ToolError {
    pub(crate) fn invalid(tool: &str, message: impl ToString) -> Self {
        ToolError::InvalidArguments {
            tool: tool.to_string(),
            message: message.to_string(),
        }
    }

    /// Whether the error means the referenced entity does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ToolError::Db(DbError::NotFound { .. }))
    }
}
