//! Task management on top of the database layer.
//!
//! - `service`: validation, tag normalisation, completion and recurrence rules
//! - `recurrence`: calendar arithmetic for repeating tasks

pub mod recurrence;
mod service;

#[cfg(test)]
mod service_test;

pub use recurrence::{add_months, next_occurrence};
pub use service::{Completion, TaskService};
