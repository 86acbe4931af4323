//! Tests for domain models.

use crate::db::models::*;

#[test]
fn priority_deserializes_from_database_format() {
    let urgent: Priority = serde_json::from_str("\"urgent\"").unwrap();
    assert_eq!(urgent, Priority::Urgent);

    let low: Priority = serde_json::from_str("\"low\"").unwrap();
    assert_eq!(low, Priority::Low);
}

#[test]
fn priority_defaults_to_medium() {
    assert_eq!(Priority::default(), Priority::Medium);
    assert_eq!(NewTask::titled("x").priority, Priority::Medium);
}

#[test]
fn priority_orders_by_rank() {
    assert!(Priority::Low < Priority::Medium);
    assert!(Priority::High < Priority::Urgent);
    assert_eq!(Priority::Urgent.rank(), 4);
}

#[test]
fn priority_parses_case_insensitively() {
    assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
    assert_eq!("normal".parse::<Priority>().unwrap(), Priority::Medium);
    assert!("meh".parse::<Priority>().is_err());
}

#[test]
fn recurrence_round_trips_through_display() {
    for r in [
        Recurrence::Daily,
        Recurrence::Weekly,
        Recurrence::Monthly,
        Recurrence::Yearly,
    ] {
        assert_eq!(r.to_string().parse::<Recurrence>().unwrap(), r);
    }
    assert_eq!(
        "annually".parse::<Recurrence>().unwrap(),
        Recurrence::Yearly
    );
}

#[test]
fn task_serializes_due_date_as_iso_string() {
    let task = Task {
        id: 7,
        title: "Pay rent".to_string(),
        description: None,
        completed: false,
        priority: Priority::High,
        tags: vec!["home".to_string()],
        due_date: chrono::NaiveDate::from_ymd_opt(2026, 11, 1),
        recurrence: Some(Recurrence::Monthly),
        parent_task_id: None,
        created_at: "2026-10-01 09:00:00".to_string(),
        updated_at: None,
        completed_at: None,
    };

    let json = serde_json::to_value(&task).unwrap();
    assert_eq!(json["due_date"], "2026-11-01");
    assert_eq!(json["priority"], "high");
    assert_eq!(json["recurrence"], "monthly");
    assert!(task.is_recurring());
}

#[test]
fn empty_patch_is_detected() {
    assert!(TaskPatch::default().is_empty());
    let patch = TaskPatch {
        completed: Some(true),
        ..Default::default()
    };
    assert!(!patch.is_empty());
}

#[test]
fn message_role_parses_database_strings() {
    assert_eq!("user".parse::<MessageRole>().unwrap(), MessageRole::User);
    assert_eq!(
        "assistant".parse::<MessageRole>().unwrap(),
        MessageRole::Assistant
    );
    assert!("system".parse::<MessageRole>().is_err());
}
