//! Path resolution for taskchat data.
//!
//! Precedence: [`set_base_path`] > `TASKCHAT_HOME` > `$XDG_DATA_HOME/taskchat` >
//! `~/.local/share/taskchat`.

use std::env;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

const APP_DIR: &str = "taskchat";
const DB_FILE: &str = "taskchat.db";
pub const HOME_ENV: &str = "TASKCHAT_HOME";

static BASE_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Pin the data directory for the rest of the process.
///
/// Only the first call wins; returns `false` if a base path was already set.
pub fn set_base_path(path: impl Into<PathBuf>) -> bool {
    BASE_PATH.set(path.into()).is_ok()
}

/// Directory holding the database.
pub fn data_dir() -> PathBuf {
    resolve_data_dir(BASE_PATH.get().map(PathBuf::as_path))
}

/// Database file path (data_dir/taskchat.db).
pub fn db_path() -> PathBuf {
    data_dir().join(DB_FILE)
}

pub(crate) fn resolve_data_dir(base: Option<&Path>) -> PathBuf {
    if let Some(base) = base {
        return base.to_path_buf();
    }

    if let Some(home) = non_empty_var(HOME_ENV) {
        return PathBuf::from(home);
    }

    let data_home = non_empty_var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            non_empty_var("HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".local/share")
        });

    data_home.join(APP_DIR)
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
