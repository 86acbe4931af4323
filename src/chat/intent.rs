//! Keyword-based intent classification.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::extract::without_quotes;

static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-z0-9][a-z0-9'\-]*").expect("valid word regex"));

const TASK_NOUNS: &[&str] = &["task", "todo", "to-do", "item"];

const ADD_VERBS: &[&str] = &["add", "create", "new", "make"];
const LIST_VERBS: &[&str] = &["list", "show", "display", "view", "get", "what"];
const UPDATE_VERBS: &[&str] = &["update", "change", "modify", "edit", "rename"];
const COMPLETE_VERBS: &[&str] = &["complete", "done", "finish", "finished", "mark"];
const DELETE_VERBS: &[&str] = &["delete", "remove", "erase", "cancel"];

/// What the user wants to do with their tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    AddTask,
    ListTasks,
    UpdateTask,
    CompleteTask,
    DeleteTask,
    General,
}

impl Intent {
    pub fn as_str(self) -> &'static str {
        match self {
            Intent::AddTask => "add_task",
            Intent::ListTasks => "list_tasks",
            Intent::UpdateTask => "update_task",
            Intent::CompleteTask => "complete_task",
            Intent::DeleteTask => "delete_task",
            Intent::General => "general",
        }
    }

    /// The registry tool that carries out this intent, if any.
    pub fn tool_name(self) -> Option<&'static str> {
        match self {
            Intent::General => None,
            other => Some(other.as_str()),
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lower-cased word tokens of a message.
pub fn tokenize(message: &str) -> Vec<String> {
    let lower = message.to_lowercase();
    WORD.find_iter(&lower)
        .map(|m| m.as_str().trim_end_matches(['\'', '-']).to_string())
        .collect()
}

fn is_task_noun(token: &str) -> bool {
    TASK_NOUNS
        .iter()
        .any(|noun| token == *noun || token.strip_suffix('s') == Some(*noun))
}

/// Classify a message. Checks run in a fixed order and the first match wins.
///
/// Quoted text is a value, not a command, so its words are ignored.
pub fn classify(message: &str) -> Intent {
    let tokens = tokenize(&without_quotes(message));
    let has_any = |words: &[&str]| tokens.iter().any(|t| words.contains(&t.as_str()));
    let has_noun = tokens.iter().any(|t| is_task_noun(t));

    if has_any(ADD_VERBS) && has_noun {
        Intent::AddTask
    } else if has_any(LIST_VERBS) && (has_noun || has_any(&["all"])) {
        Intent::ListTasks
    } else if has_any(UPDATE_VERBS) && has_noun {
        Intent::UpdateTask
    } else if has_any(COMPLETE_VERBS) && has_noun {
        Intent::CompleteTask
    } else if has_any(DELETE_VERBS) && has_noun {
        Intent::DeleteTask
    } else {
        Intent::General
    }
}
