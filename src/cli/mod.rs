mod commands;
pub mod error;
pub mod utils;


use std::net::IpAddr;
use std::path::{Path, PathBuf};

use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use tokio::io::BufReader;
use tracing::debug;

use crate::api::{self, DEFAULT_PORT, ServerConfig};
use crate::chat::ChatService;
use crate::config;
use crate::db::{Database, Id, SqliteDatabase};
use crate::mcp::server::DEFAULT_DUE_SOON_DAYS;
use crate::tasks::TaskService;
use crate::tools::params::{AddTaskParams, ListTasksParams, UpdateTaskParams};

pub use commands::OutputFormat;
use error::{CliError, CliResult};
use utils::parse_tags;

#[derive(Parser)]
#[command(name = "taskchat")]
#[command(author, version, about = "Todo list with a chat assistant and an MCP server", long_about = None)]
pub struct Cli {
    /// Database file (default: $TASKCHAT_HOME/taskchat.db or ~/.local/share/taskchat/taskchat.db)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (health check and MCP endpoint)
    Serve {
        /// Host address to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: IpAddr,
        /// Port to listen on
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,
    },
    /// Task management commands
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },
    /// Talk to the assistant; starts a REPL when no message is given
    Chat {
        /// Message to send
        message: Vec<String>,
        /// Conversation to continue
        #[arg(short, long)]
        conversation: Option<Id>,
    },
    /// Conversation history
    Conversation {
        #[command(subcommand)]
        command: ConversationCommands,
    },
}

#[derive(Subcommand)]
enum TaskCommands {
    /// Create a task
    Add {
        /// Task title
        title: String,
        #[arg(short, long)]
        description: Option<String>,
        /// low, medium, high or urgent
        #[arg(short, long)]
        priority: Option<String>,
        /// YYYY-MM-DD or a phrase such as "tomorrow" or "next friday"
        #[arg(long)]
        due: Option<String>,
        /// Comma-separated tags
        #[arg(short, long)]
        tags: Option<String>,
        /// daily, weekly, monthly or yearly
        #[arg(short, long)]
        recurrence: Option<String>,
    },
    /// List tasks
    List {
        /// Only completed (true) or pending (false) tasks
        #[arg(long)]
        completed: Option<bool>,
        #[arg(short, long)]
        priority: Option<String>,
        /// Comma-separated tags; tasks must carry all of them
        #[arg(short, long)]
        tags: Option<String>,
        /// Only tasks due within this many days
        #[arg(long)]
        due_within: Option<u32>,
        /// Only overdue tasks
        #[arg(long)]
        overdue: bool,
        /// Only recurring tasks
        #[arg(long)]
        recurring: bool,
        /// Text to find in title or description
        #[arg(short, long)]
        search: Option<String>,
        /// created_at, updated_at, due_date, priority or title
        #[arg(long)]
        sort: Option<String>,
        /// asc or desc
        #[arg(long)]
        order: Option<String>,
        #[arg(short, long)]
        limit: Option<usize>,
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Show one task
    Get {
        id: Id,
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Change fields of a task
    Update {
        id: Id,
        #[arg(long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        priority: Option<String>,
        /// New due date, or "none" to clear it
        #[arg(long)]
        due: Option<String>,
        /// Comma-separated tags; replaces the current ones
        #[arg(short, long)]
        tags: Option<String>,
        /// New recurrence, or "none" to clear it
        #[arg(short, long)]
        recurrence: Option<String>,
        #[arg(long)]
        completed: Option<bool>,
    },
    /// Mark a task as complete
    Complete { id: Id },
    /// Delete a task
    Delete { id: Id },
    /// Create the next occurrence of a recurring task
    Next { id: Id },
    /// Pending tasks due soon, overdue ones included
    DueSoon {
        #[arg(long, default_value_t = DEFAULT_DUE_SOON_DAYS)]
        days: u32,
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// All recurring tasks
    Recurring {
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
}

#[derive(Subcommand)]
enum ConversationCommands {
    /// List conversations
    List {
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Show the messages of a conversation
    Show {
        id: Id,
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
}

/// Open the database file, creating its directory, and bring the schema up to date.
pub async fn open_database(path: &Path) -> CliResult<SqliteDatabase> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| CliError::DataDir {
            path: parent.display().to_string(),
            source,
        })?;
    }

    debug!(path = %path.display(), "opening database");
    let db = SqliteDatabase::open(path).await?;
    db.migrate().await?;
    Ok(db)
}

pub async fn run() -> miette::Result<()> {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        Cli::command().print_help().map_err(CliError::from)?;
        return Ok(());
    };

    api::init_tracing(cli.verbose);

    let db_path = cli.db.unwrap_or_else(config::db_path);
    let db = open_database(&db_path).await?;

    let output = execute(command, &db_path, db, cli.verbose).await?;
    if !output.is_empty() {
        println!("{}", output);
    }
    Ok(())
}

async fn execute<D: Database + 'static>(
    command: Commands,
    db_path: &Path,
    db: D,
    verbosity: u8,
) -> CliResult<String> {
    match command {
        Commands::Serve { host, port } => {
            let config = ServerConfig {
                host,
                port,
                verbosity,
            };
            commands::serve::run(config, db_path, db).await?;
            Ok(String::new())
        }
        Commands::Task { command } => run_task(command, TaskService::new(db)).await,
        Commands::Chat {
            message,
            conversation,
        } => {
            let chat = ChatService::from_env(TaskService::new(db));
            if message.is_empty() {
                let stdin = BufReader::new(tokio::io::stdin());
                let mut stdout = tokio::io::stdout();
                commands::chat::repl(&chat, conversation, stdin, &mut stdout).await?;
                Ok(String::new())
            } else {
                commands::chat::send(&chat, conversation, &message.join(" ")).await
            }
        }
        Commands::Conversation { command } => {
            let chat = ChatService::from_env(TaskService::new(db));
            match command {
                ConversationCommands::List { format } => {
                    commands::conversation::list_conversations(&chat, format).await
                }
                ConversationCommands::Show { id, format } => {
                    commands::conversation::show_conversation(&chat, id, format).await
                }
            }
        }
    }
}

async fn run_task<D: Database>(command: TaskCommands, service: TaskService<D>) -> CliResult<String> {
    use commands::task;

    match command {
        TaskCommands::Add {
            title,
            description,
            priority,
            due,
            tags,
            recurrence,
        } => {
            let params = AddTaskParams {
                title,
                description,
                priority,
                due_date: due,
                tags: parse_tags(tags.as_deref()),
                recurrence,
            };
            task::add_task(&service, params).await
        }
        TaskCommands::List {
            completed,
            priority,
            tags,
            due_within,
            overdue,
            recurring,
            search,
            sort,
            order,
            limit,
            format,
        } => {
            let params = ListTasksParams {
                completed,
                priority,
                tags: parse_tags(tags.as_deref()),
                due_within_days: due_within,
                overdue: overdue.then_some(true),
                recurring: recurring.then_some(true),
                search,
                sort_by: sort,
                sort_order: order,
                limit,
            };
            task::list_tasks(&service, params, format).await
        }
        TaskCommands::Get { id, format } => task::get_task(&service, id, format).await,
        TaskCommands::Update {
            id,
            title,
            description,
            priority,
            due,
            tags,
            recurrence,
            completed,
        } => {
            let params = UpdateTaskParams {
                task_id: id,
                title,
                description,
                priority,
                due_date: due,
                tags: parse_tags(tags.as_deref()),
                recurrence,
                completed,
            };
            task::update_task(&service, params).await
        }
        TaskCommands::Complete { id } => task::complete_task(&service, id).await,
        TaskCommands::Delete { id } => task::delete_task(&service, id).await,
        TaskCommands::Next { id } => task::next_occurrence(&service, id).await,
        TaskCommands::DueSoon { days, format } => task::due_soon(&service, days, format).await,
        TaskCommands::Recurring { format } => task::recurring(&service, format).await,
    }
}
