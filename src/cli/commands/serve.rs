//! Serve command - starts the HTTP host with `/health` and MCP

use std::path::Path;

use crate::api::{self, ServerConfig};
use crate::cli::error::CliResult;
use crate::db::Database;

/// Startup banner, printed before logging is initialized
pub fn banner(config: &ServerConfig, db_path: &Path) -> String {
    let addr = config.addr();
    [
        "🚀 taskchat server starting...".to_string(),
        format!("   MCP:      http://{}/mcp", addr),
        format!("   Health:   http://{}/health", addr),
        format!("   Database: {}", db_path.display()),
    ]
    .join("\n")
}

/// Run the server until Ctrl-C
pub async fn run<D: Database + 'static>(
    config: ServerConfig,
    db_path: &Path,
    db: D,
) -> CliResult<()> {
    println!("{}\n", banner(&config, db_path));
    api::run(config, db).await?;
    Ok(())
}
