//! Date arithmetic for recurring tasks.

use chrono::{Days, Months, NaiveDate};

use crate::db::Recurrence;

/// Add whole calendar months, clamping to the last day of the target month.
pub fn add_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(months))
}

/// The due date of the next occurrence of a recurring task.
///
/// Monthly and yearly steps clamp to the end of the month, so Jan 31 is
/// followed by the last day of February and Feb 29 by Feb 28.
pub fn next_occurrence(date: NaiveDate, recurrence: Recurrence) -> Option<NaiveDate> {
    match recurrence {
        Recurrence::Daily => date.checked_add_days(Days::new(1)),
        Recurrence::Weekly => date.checked_add_days(Days::new(7)),
        Recurrence::Monthly => add_months(date, 1),
        Recurrence::Yearly => add_months(date, 12),
    }
}
