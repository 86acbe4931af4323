//! Database utility functions.

use chrono::{Local, NaiveDate, Utc};

/// Get current datetime as string in SQLite format.
pub fn current_timestamp() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Today's date in the local timezone.
///
/// Due dates are calendar dates as the user sees them, so they are
/// computed against local time rather than UTC.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Normalise a tag: trim, drop a leading `#`, lower-case.
pub fn normalize_tag(tag: &str) -> Option<String> {
    let tag = tag.trim().trim_start_matches('#').trim().to_lowercase();
    if tag.is_empty() { None } else { Some(tag) }
}

/// Normalise a list of tags, dropping empties and duplicates while keeping order.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        if let Some(tag) = normalize_tag(tag.as_ref())
            && !out.contains(&tag)
        {
            out.push(tag);
        }
    }
    out
}
