//! Tests for database error types.

use crate::db::{DbError, DbResult};

#[test]
fn not_found_error_displays_correctly() {
    let err = DbError::not_found("Task", 42);
    assert_eq!(err.to_string(), "Entity not found: Task with id '42'");
}

#[test]
fn invalid_data_error_displays_message_only() {
    let err = DbError::InvalidData {
        message: "unknown priority 'meh'".to_string(),
        help: "Use one of: low, medium, high, urgent".to_string(),
    };
    assert_eq!(err.to_string(), "Invalid data: unknown priority 'meh'");
}

#[test]
fn validation_error_displays_correctly() {
    let err = DbError::Validation {
        message: "title cannot be empty".to_string(),
    };
    assert_eq!(err.to_string(), "Validation error: title cannot be empty");
}

#[test]
fn sqlx_errors_map_to_database_variant() {
    let err: DbError = sqlx::Error::RowNotFound.into();
    assert!(matches!(err, DbError::Database { .. }));
}

#[test]
fn db_result_propagates_with_question_mark() {
    fn inner() -> DbResult<()> {
        Err(DbError::Validation {
            message: "boom".to_string(),
        })
    }
    fn outer() -> DbResult<u8> {
        inner()?;
        Ok(1)
    }
    assert!(outer().is_err());
}
