use miette::Diagnostic;
use thiserror::Error;

use crate::api::ApiError;
use crate::chat::ChatError;
use crate::db::DbError;
use crate::tools::ToolError;

#[derive(Error, Diagnostic, Debug)]
pub enum CliError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Tool(#[from] ToolError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Chat(#[from] ChatError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Api(#[from] ApiError),

    #[error("Failed to prepare data directory {path}: {source}")]
    #[diagnostic(
        code(taskchat::cli::data_dir),
        help("Pass --db to use another location, or set TASKCHAT_HOME")
    )]
    DataDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    #[diagnostic(code(taskchat::cli::io))]
    Io(#[from] std::io::Error),

    #[error("Failed to encode output: {0}")]
    #[diagnostic(code(taskchat::cli::encode))]
    Encode(#[from] serde_json::Error),

    #[error("Nothing to update")]
    #[diagnostic(
        code(taskchat::cli::nothing_to_update),
        help("Pass at least one of --title, --description, --priority, --due, --tags, --recurrence or --completed")
    )]
    NothingToUpdate,
}

pub type CliResult<T> = Result<T, CliError>;
