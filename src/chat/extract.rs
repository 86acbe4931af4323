//! Slot extraction: pull task fields out of free text.
//!
//! Every extractor is a pure function of the message (and, for dates, of an
//! injected `today`), so the agent can be tested against fixed calendars.

use std::borrow::Cow;
use std::sync::LazyLock;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use regex::Regex;

use super::intent::tokenize;
use crate::db::utils::normalize_tags;
use crate::db::{Id, Priority, Recurrence};
use crate::tasks::add_months;
use crate::tools::params::{AddTaskParams, ListTasksParams, UpdateTaskParams};

const WEEKDAY_NAMES: &str = "monday|tuesday|wednesday|thursday|friday|saturday|sunday";
const MONTH_NAMES: &str = "january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sept|sep|oct|nov|dec";
const PRIORITY_LEVELS: &str = "low|medium|normal|high|urgent";

/// Trailing clauses that end a task title.
static TITLE_STOP: LazyLock<String> = LazyLock::new(|| {
    [
        r"(?:\s+(?:",
        r"with\s+(?:an?\s+)?(?:(?:",
        PRIORITY_LEVELS,
        r")\b|priority|tags?\b|labels?\b|description|notes?\b|due\b|deadline|recurrence)",
        r"|(?:by|on)\s+(?:(?:today|tomorrow|tonight|next|this|",
        WEEKDAY_NAMES,
        "|",
        MONTH_NAMES,
        r")\b|the\s+\d|\d)",
        r"|(?:every|each)\s+(?:(?:day|week|month|year|",
        WEEKDAY_NAMES,
        r")\b)",
        r"|(?:due|everyday|daily|weekly|monthly|yearly|annually|tagged|tags?|labell?ed|priority|today|tomorrow|tonight)\b",
        r"|(?:",
        PRIORITY_LEVELS,
        r")[\s-]+priority\b",
        r"|(?:next|this)\s+(?:week|month|",
        WEEKDAY_NAMES,
        r")\b",
        r"|in\s+\d+\s+(?:day|week|month)s?\b",
        r"|to\s+(?:my\s+|the\s+)?(?:task\s+|todo\s+|to-do\s+)?list\b",
        r"|\d{4}-\d{1,2}-\d{1,2}\b",
        r")|\s+#[a-z]|\s*[.!?]*\s*$)",
    ]
    .concat()
});

fn stop_regex(head: &[&str]) -> Regex {
    let mut pattern = head.concat();
    pattern.push_str(&TITLE_STOP);
    Regex::new(&pattern).expect("valid title regex")
}

static TITLE_AFTER_NOUN: LazyLock<Regex> = LazyLock::new(|| {
    stop_regex(&[
        r"(?i)\b(?:add|create|make|new)\s+(?:(?:a|an|the|new|another|my|recurring|quick|",
        PRIORITY_LEVELS,
        r"|(?:",
        PRIORITY_LEVELS,
        r")[\s-]+priority|daily|weekly|monthly|yearly)\s+)*(?:task|todo|to-do|item)s?\b\s*[:\-]?\s*(?:(?:called|named|titled|to|for|about|that\s+says)\s+)?(.+?)",
    ])
});

static TITLE_TO_LIST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:add|put)\s+(.+?)\s+(?:to|on)\s+(?:my\s+|the\s+)?(?:task\s+|todo\s+|to-do\s+)?list\b",
    )
    .expect("valid title regex")
});

static TITLE_AFTER_COLON: LazyLock<Regex> =
    LazyLock::new(|| stop_regex(&[r"(?i)\b(?:task|todo|to-do|item)\s*:\s*(.+?)"]));

static TITLE_AFTER_VERB: LazyLock<Regex> =
    LazyLock::new(|| stop_regex(&[r"(?i)\b(?:add|create|make)\s+(?:(?:a|an|the|new)\s+)?(.+?)"]));

static COMMAND_PHRASES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:add|create|make|new)\s+(?:an?\s+)?(?:new\s+)?(?:task|todo|to-do|item)\b")
        .expect("valid command regex")
});

static QUOTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""([^"]+)"|“([^”]+)”|(?:^|\s)'([^']+)'(?:\s|$|[.,!?;:])"#)
        .expect("valid quote regex")
});

static PRIORITY_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        &[
            r"(?i)\b(",
            PRIORITY_LEVELS,
            r")[\s-]+priority\b|\bpriority\s*(?:of|is|to|as|=|:)?\s*(",
            PRIORITY_LEVELS,
            r")\b",
        ]
        .concat(),
    )
    .expect("valid priority regex")
});

static PRIORITY_TARGET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&[r"(?i)\b(?:to|as)\s+(", PRIORITY_LEVELS, r")\b"].concat())
        .expect("valid priority regex")
});

const URGENT_WORDS: &[&str] = &["urgent", "critical", "emergency", "asap", "immediately"];
const HIGH_WORDS: &[&str] = &["high", "important", "crucial"];
const LOW_WORDS: &[&str] = &["low", "minor", "optional"];

static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b").expect("valid date regex"));
static DAY_AFTER_TOMORROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bday\s+after\s+tomorrow\b").expect("valid date regex"));
static TOMORROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\btomorrow\b").expect("valid date regex"));
static TODAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:today|tonight)\b").expect("valid date regex"));
static IN_N_UNITS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\bin\s+(\d+|a\s+couple\s+of|a|an|one|two|three|four|five|six|seven|eight|nine|ten)\s+(day|week|month)s?\b",
    )
    .expect("valid date regex")
});
static NEXT_WEEK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bnext\s+week\b").expect("valid date regex"));
static NEXT_MONTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bnext\s+month\b").expect("valid date regex"));
static MONTH_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&[r"\b(", MONTH_NAMES, r")\.?\s+(\d{1,2})(?:st|nd|rd|th)?\b"].concat())
        .expect("valid date regex")
});
static WEEKDAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&[r"\b(?:(?:on|by|next|this|due)\s+)?(", WEEKDAY_NAMES, r")\b"].concat())
        .expect("valid date regex")
});

static HASHTAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[\s,(])#([A-Za-z][\w-]*)").expect("valid hashtag regex")
});
static TAG_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        &[
            r"(?i)\b(?:tagged|tags?|labell?ed)(?:\s+(?:as|with))?\s*:?\s+(.+?)(?:\s+(?:and\s+)?(?:with|due|by|on|every|each|priority|(?:",
            PRIORITY_LEVELS,
            r")\s+priority)\b|\s*[.!?]*\s*$)",
        ]
        .concat(),
    )
    .expect("valid tag regex")
});
static TAG_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",|\s+and\s+|\s+or\s+|\s*&\s*").expect("valid tag regex"));

static DAILY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:every\s*day|daily|each\s+day)\b").expect("valid recurrence regex")
});
static WEEKLY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&[r"\b(?:every\s+week|weekly|each\s+week|every\s+(?:", WEEKDAY_NAMES, r"))\b"].concat())
        .expect("valid recurrence regex")
});
static MONTHLY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:every\s+month|monthly|each\s+month)\b").expect("valid recurrence regex")
});
static YEARLY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:every\s+year|yearly|annually|each\s+year)\b").expect("valid recurrence regex")
});

static TASK_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:task|todo|to-do|item|number)\s*#?\s*(\d+)\b|(?:^|\s)#(\d+)\b")
        .expect("valid task id regex")
});
static TASK_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:complete|completed|finish|finished|done\s+with|mark|delete|remove|erase|cancel|update|change|modify|edit|rename)\s+(?:(?:the|my|a)\s+)?(?:(?:task|todo|to-do|item)s?\s+)?(?:(?:called|named|titled)\s+)?(.+?)(?:\s+as\s+(?:done|complete|completed|finished|not\s+done|incomplete|pending|open)\b|\s+(?:to|with|priority|due|by|on|tagged|tags?|from)\b|\s*[.!?]*\s*$)",
    )
    .expect("valid task phrase regex")
});
static STATUS_ONLY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:as\s+)?(?:done|complete|completed|finished|not\s+done|incomplete|pending|open)$")
        .expect("valid status regex")
});

static NEW_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(?:title|name|to)\s+(?:is\s+|as\s+|=\s*|:\s*)?(?:"([^"]+)"|“([^”]+)”|'([^']+)')"#)
        .expect("valid update regex")
});
static NEW_DESCRIPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(?:description|desc|details|notes?)\s+(?:to\s+|is\s+|as\s+|=\s*|:\s*)?(?:"([^"]+)"|“([^”]+)”|'([^']+)')"#)
        .expect("valid update regex")
});
static MARK_INCOMPLETE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:as|to)\s+(?:not\s+(?:yet\s+)?(?:done|complete|completed|finished)|incomplete|pending|undone|open)\b|\breopen\b",
    )
    .expect("valid status regex")
});
static MARK_COMPLETE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bas\s+(?:done|complete|completed|finished)\b").expect("valid status regex")
});

static PENDING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:pending|incomplete|open|remaining|unfinished|outstanding|uncompleted)\b|\bnot\s+(?:yet\s+)?(?:done|completed|complete|finished)\b",
    )
    .expect("valid filter regex")
});
static COMPLETED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:completed|done|finished)\b").expect("valid filter regex")
});
static OVERDUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:overdue|past\s+due)\b").expect("valid filter regex"));
static DUE_TODAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:due|for)\s+today\b|\btoday'?s\b").expect("valid filter regex")
});
static DUE_TOMORROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:due|for)\s+tomorrow\b").expect("valid filter regex")
});
static THIS_WEEK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bthis\s+week\b").expect("valid filter regex"));
static DUE_SOON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:due\s+soon|upcoming|soon)\b").expect("valid filter regex")
});
static RECURRING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:recurring|repeating)\b").expect("valid filter regex"));
static SEARCH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(?:about|matching|containing|mentioning)\s+(?:"([^"]+)"|“([^”]+)”|(.+?))\s*[.!?]*\s*$"#)
        .expect("valid filter regex")
});

fn first_group(caps: &regex::Captures<'_>) -> Option<String> {
    caps.iter()
        .skip(1)
        .flatten()
        .next()
        .map(|m| m.as_str().to_string())
}

/// `text` with every quoted span blanked out.
pub fn without_quotes(text: &str) -> Cow<'_, str> {
    QUOTED.replace_all(text, " ")
}

/// Quoted strings in order of appearance (`"..."`, `“...”` or `'...'`).
pub fn quoted(text: &str) -> Vec<String> {
    QUOTED
        .captures_iter(text)
        .filter_map(|caps| first_group(&caps))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn clean_phrase(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c: char| {
            c.is_whitespace() || matches!(c, '"' | '\'' | '“' | '”' | '.' | ',' | '!' | '?' | ';' | ':')
        })
        .to_string()
}

fn is_task_noun(word: &str) -> bool {
    matches!(
        word.to_lowercase().as_str(),
        "task" | "tasks" | "todo" | "todos" | "to-do" | "to-dos" | "item" | "items"
    )
}

// =============================================================================
// Title
// =============================================================================

/// Title of a task to create.
///
/// A quoted string wins; otherwise the text after the command phrase up to
/// the first trailing clause (due date, priority, tags, recurrence).
pub fn title(message: &str) -> String {
    let description = description(message);
    if let Some(q) = quoted(message)
        .into_iter()
        .find(|q| Some(q) != description.as_ref())
    {
        return q;
    }

    for pattern in [
        &*TITLE_AFTER_NOUN,
        &*TITLE_TO_LIST,
        &*TITLE_AFTER_COLON,
        &*TITLE_AFTER_VERB,
    ] {
        if let Some(caps) = pattern.captures(message)
            && let Some(m) = caps.get(1)
        {
            let candidate = clean_phrase(m.as_str());
            if !candidate.is_empty() && !is_task_noun(&candidate) {
                return candidate;
            }
        }
    }

    let fallback = clean_phrase(&COMMAND_PHRASES.replace_all(message, " "));
    let fallback = fallback.split_whitespace().collect::<Vec<_>>().join(" ");
    if fallback.is_empty() {
        "New Task".to_string()
    } else {
        fallback
    }
}

/// Quoted description, as in `description "..."`.
pub fn description(message: &str) -> Option<String> {
    NEW_DESCRIPTION
        .captures(message)
        .and_then(|caps| first_group(&caps))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

// =============================================================================
// Priority
// =============================================================================

/// Priority named in a `<level> priority` or `priority <level>` phrase.
pub fn explicit_priority(text: &str) -> Option<Priority> {
    let caps = PRIORITY_PHRASE.captures(text)?;
    caps.get(1).or_else(|| caps.get(2))?.as_str().parse().ok()
}

/// Priority implied by the message, if any. Explicit phrases win over loose keywords.
pub fn priority_mention(text: &str) -> Option<Priority> {
    if let Some(priority) = explicit_priority(text) {
        return Some(priority);
    }

    let tokens = tokenize(text);
    let has_any = |words: &[&str]| tokens.iter().any(|t| words.contains(&t.as_str()));
    if has_any(URGENT_WORDS) {
        Some(Priority::Urgent)
    } else if has_any(HIGH_WORDS) {
        Some(Priority::High)
    } else if has_any(LOW_WORDS) {
        Some(Priority::Low)
    } else {
        None
    }
}

/// Priority for a new task; medium unless the message says otherwise.
pub fn priority(text: &str) -> Priority {
    priority_mention(text).unwrap_or_default()
}

// =============================================================================
// Due date
// =============================================================================

fn amount(word: &str) -> Option<u32> {
    let word = word.split_whitespace().collect::<Vec<_>>().join(" ");
    match word.as_str() {
        "a" | "an" | "one" => Some(1),
        "a couple of" | "two" => Some(2),
        "three" => Some(3),
        "four" => Some(4),
        "five" => Some(5),
        "six" => Some(6),
        "seven" => Some(7),
        "eight" => Some(8),
        "nine" => Some(9),
        "ten" => Some(10),
        digits => digits.parse().ok(),
    }
}

fn month_number(name: &str) -> Option<u32> {
    let month = match name.get(..3)? {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

/// The first date strictly after `today` that falls on `weekday`.
pub fn next_weekday(today: NaiveDate, weekday: Weekday) -> NaiveDate {
    let ahead = (7 + weekday.num_days_from_monday() - today.weekday().num_days_from_monday()) % 7;
    let ahead = if ahead == 0 { 7 } else { ahead };
    today + Days::new(u64::from(ahead))
}

/// Due date expressed in the text, relative to `today`.
pub fn due_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let text = text.to_lowercase();

    if let Some(caps) = ISO_DATE.captures(&text) {
        let year = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        let day = caps[3].parse().ok()?;
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(date);
        }
    }

    if DAY_AFTER_TOMORROW.is_match(&text) {
        return today.checked_add_days(Days::new(2));
    }
    if TOMORROW.is_match(&text) {
        return today.checked_add_days(Days::new(1));
    }
    if TODAY.is_match(&text) {
        return Some(today);
    }

    if let Some(caps) = IN_N_UNITS.captures(&text) {
        let n = amount(&caps[1])?;
        return match &caps[2] {
            "day" => today.checked_add_days(Days::new(u64::from(n))),
            "week" => today.checked_add_days(Days::new(u64::from(n) * 7)),
            _ => add_months(today, n),
        };
    }

    if NEXT_WEEK.is_match(&text) {
        return today.checked_add_days(Days::new(7));
    }
    if NEXT_MONTH.is_match(&text) {
        return add_months(today, 1);
    }

    if let Some(caps) = MONTH_DAY.captures(&text)
        && let Some(month) = month_number(&caps[1])
        && let Ok(day) = caps[2].parse::<u32>()
        && let Some(date) = NaiveDate::from_ymd_opt(today.year(), month, day)
    {
        if date >= today {
            return Some(date);
        }
        return NaiveDate::from_ymd_opt(today.year() + 1, month, day)
            .or_else(|| NaiveDate::from_ymd_opt(today.year() + 1, month, day - 1));
    }

    if let Some(caps) = WEEKDAY.captures(&text)
        && let Ok(weekday) = caps[1].parse::<Weekday>()
    {
        return Some(next_weekday(today, weekday));
    }

    None
}

// =============================================================================
// Tags and recurrence
// =============================================================================

/// Tags from `#hashtags` and `tagged ...` / `tags ...` / `labeled as ...` phrases.
pub fn tags(text: &str) -> Vec<String> {
    let mut raw: Vec<String> = Vec::new();

    if let Some(caps) = TAG_PHRASE.captures(text)
        && let Some(list) = caps.get(1)
    {
        for item in TAG_SPLIT.split(list.as_str()) {
            if item.contains('#') {
                raw.extend(item.split_whitespace().map(str::to_string));
            } else {
                raw.push(clean_phrase(item));
            }
        }
    }

    raw.extend(HASHTAG.captures_iter(text).map(|caps| caps[1].to_string()));
    normalize_tags(raw)
}

/// Recurrence pattern named in the text.
pub fn recurrence(text: &str) -> Option<Recurrence> {
    let text = text.to_lowercase();
    if DAILY.is_match(&text) {
        Some(Recurrence::Daily)
    } else if WEEKLY.is_match(&text) {
        Some(Recurrence::Weekly)
    } else if MONTHLY.is_match(&text) {
        Some(Recurrence::Monthly)
    } else if YEARLY.is_match(&text) {
        Some(Recurrence::Yearly)
    } else {
        None
    }
}

// =============================================================================
// Task references
// =============================================================================

/// How a message points at an existing task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskRef {
    Id(Id),
    Title(String),
}

const TRAILING_FIELD_WORDS: &[&str] = &[
    "task",
    "tasks",
    "todo",
    "to-do",
    "item",
    "title",
    "name",
    "description",
    "priority",
];

fn clean_reference(raw: &str) -> Option<String> {
    let cleaned = clean_phrase(raw);
    let mut words: Vec<&str> = cleaned.split_whitespace().collect();

    while let Some(first) = words.first()
        && matches!(first.to_lowercase().as_str(), "the" | "my" | "a" | "an")
    {
        words.remove(0);
    }
    while let Some(last) = words.last()
        && TRAILING_FIELD_WORDS.contains(&last.to_lowercase().as_str())
    {
        words.pop();
    }

    let phrase = words.join(" ");
    if phrase.is_empty() || STATUS_ONLY.is_match(&phrase) || is_task_noun(&phrase) {
        None
    } else {
        Some(phrase)
    }
}

/// The task a message refers to: an id (`task 3`, `#3`, `number 3`), a quoted
/// title not listed in `exclude`, or the phrase following the verb.
pub fn task_ref(message: &str, exclude: &[&str]) -> Option<TaskRef> {
    if let Some(caps) = TASK_ID.captures(message)
        && let Some(id) = caps.get(1).or_else(|| caps.get(2))
        && let Ok(id) = id.as_str().parse()
    {
        return Some(TaskRef::Id(id));
    }

    if let Some(q) = quoted(message)
        .into_iter()
        .find(|q| !exclude.contains(&q.as_str()))
    {
        return Some(TaskRef::Title(q));
    }

    let unquoted = QUOTED.replace_all(message, " ");
    TASK_PHRASE
        .captures(&unquoted)
        .and_then(|caps| caps.get(1))
        .and_then(|m| clean_reference(m.as_str()))
        .map(TaskRef::Title)
}

// =============================================================================
// Intent-specific argument builders
// =============================================================================

fn iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Arguments for `add_task`.
pub fn add_task_params(message: &str, today: NaiveDate) -> AddTaskParams {
    let tags = tags(message);
    AddTaskParams {
        title: title(message),
        description: description(message),
        priority: Some(priority(message).to_string()),
        due_date: due_date(message, today).map(iso),
        tags: (!tags.is_empty()).then_some(tags),
        recurrence: recurrence(message).map(|r| r.to_string()),
    }
}

/// Fields a message asks to change on an existing task.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub due_date: Option<NaiveDate>,
    pub tags: Option<Vec<String>>,
    pub recurrence: Option<Recurrence>,
    pub completed: Option<bool>,
}

impl UpdateFields {
    pub fn is_empty(&self) -> bool {
        *self == UpdateFields::default()
    }

    /// Quoted values consumed as new field contents.
    pub fn quoted_values(&self) -> Vec<&str> {
        [self.title.as_deref(), self.description.as_deref()]
            .into_iter()
            .flatten()
            .collect()
    }

    pub fn into_params(self, task_id: Id) -> UpdateTaskParams {
        UpdateTaskParams {
            task_id,
            title: self.title,
            description: self.description,
            priority: self.priority.map(|p| p.to_string()),
            due_date: self.due_date.map(iso),
            tags: self.tags,
            recurrence: self.recurrence.map(|r| r.to_string()),
            completed: self.completed,
        }
    }
}

/// Whether the message asks for a task to be marked not done.
pub fn marks_incomplete(message: &str) -> bool {
    MARK_INCOMPLETE.is_match(message)
}

/// Changes requested by an update message.
pub fn update_fields(message: &str, today: NaiveDate) -> UpdateFields {
    let description = description(message);
    let title = NEW_TITLE
        .captures_iter(message)
        .filter_map(|caps| first_group(&caps))
        .map(|s| s.trim().to_string())
        .find(|s| !s.is_empty() && Some(s) != description.as_ref());

    let unquoted = QUOTED.replace_all(message, " ");
    let priority = explicit_priority(&unquoted).or_else(|| {
        PRIORITY_TARGET
            .captures(&unquoted)
            .and_then(|caps| caps[1].parse().ok())
    });
    let tags = tags(&unquoted);

    let completed = if marks_incomplete(&unquoted) {
        Some(false)
    } else if MARK_COMPLETE.is_match(&unquoted) {
        Some(true)
    } else {
        None
    };

    UpdateFields {
        title,
        description,
        priority,
        due_date: due_date(&unquoted, today),
        tags: (!tags.is_empty()).then_some(tags),
        recurrence: recurrence(&unquoted),
        completed,
    }
}

/// Filters for `list_tasks` implied by a listing request.
pub fn list_filters(message: &str) -> ListTasksParams {
    let text = message.to_lowercase();
    let mut params = ListTasksParams::default();

    if PENDING.is_match(&text) {
        params.completed = Some(false);
    } else if COMPLETED.is_match(&text) {
        params.completed = Some(true);
    }

    params.priority = priority_mention(message).map(|p| p.to_string());

    let tags = tags(message);
    if !tags.is_empty() {
        params.tags = Some(tags);
    }

    let due_window = if DUE_TODAY.is_match(&text) {
        Some(0)
    } else if DUE_TOMORROW.is_match(&text) {
        Some(1)
    } else if THIS_WEEK.is_match(&text) {
        Some(7)
    } else if DUE_SOON.is_match(&text) {
        Some(3)
    } else {
        None
    };

    if OVERDUE.is_match(&text) {
        params.overdue = Some(true);
        params.completed = Some(false);
    } else if let Some(days) = due_window {
        params.due_within_days = Some(days);
        params.completed.get_or_insert(false);
    }

    if params.overdue.is_some() || params.due_within_days.is_some() {
        params.sort_by = Some("due_date".to_string());
    }

    if RECURRING.is_match(&text) {
        params.recurring = Some(true);
    }

    if let Some(caps) = SEARCH.captures(message) {
        params.search = first_group(&caps).map(|s| clean_phrase(&s)).filter(|s| !s.is_empty());
    }

    params
}
