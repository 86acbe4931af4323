//! Tests for TaskService.

use chrono::NaiveDate;

use crate::db::utils::today;
use crate::db::{
    Database, DbError, NewTask, Priority, Recurrence, SqliteDatabase, TaskPatch, TaskQuery,
};
use crate::tasks::{TaskService, next_occurrence};

async fn setup() -> TaskService<SqliteDatabase> {
    let db = SqliteDatabase::in_memory()
        .await
        .expect("Failed to create in-memory database");
    db.migrate().await.expect("Migration should succeed");
    TaskService::new(db)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn create_trims_title_and_normalises_tags() {
    let service = setup().await;

    let task = service
        .create(NewTask {
            title: "  Buy milk  ".to_string(),
            description: Some("   ".to_string()),
            tags: vec![
                "#Shopping".to_string(),
                "shopping".to_string(),
                " ".to_string(),
                "Home".to_string(),
            ],
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(task.title, "Buy milk");
    assert_eq!(task.description, None);
    assert_eq!(task.tags, vec!["shopping", "home"]);
    assert_eq!(task.priority, Priority::Medium);
}

#[tokio::test(flavor = "multi_thread")]
async fn create_rejects_empty_title() {
    let service = setup().await;

    let result = service.create(NewTask::titled("   ")).await;
    assert!(matches!(result, Err(DbError::Validation { .. })));
}

#[tokio::test(flavor = "multi_thread")]
async fn update_applies_only_given_fields() {
    let service = setup().await;
    let task = service
        .create(NewTask {
            priority: Priority::Low,
            tags: vec!["home".to_string()],
            due_date: Some(date(2025, 5, 1)),
            ..NewTask::titled("Paint fence")
        })
        .await
        .unwrap();

    let updated = service
        .update(
            task.id,
            TaskPatch {
                priority: Some(Priority::High),
                due_date: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.title, "Paint fence");
    assert_eq!(updated.priority, Priority::High);
    assert_eq!(updated.tags, vec!["home"]);
    assert_eq!(updated.due_date, None);
    assert!(updated.updated_at.is_some());

    let stored = service.get(task.id).await.unwrap();
    assert_eq!(stored, updated);
}

#[tokio::test(flavor = "multi_thread")]
async fn update_toggles_completed_at() {
    let service = setup().await;
    let task = service.create(NewTask::titled("Laundry")).await.unwrap();

    let done = service
        .update(
            task.id,
            TaskPatch {
                completed: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(done.completed);
    assert!(done.completed_at.is_some());

    let reopened = service
        .update(
            task.id,
            TaskPatch {
                completed: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(!reopened.completed);
    assert_eq!(reopened.completed_at, None);
}

#[tokio::test(flavor = "multi_thread")]
async fn update_rejects_empty_patch_and_blank_title() {
    let service = setup().await;
    let task = service.create(NewTask::titled("Laundry")).await.unwrap();

    let result = service.update(task.id, TaskPatch::default()).await;
    assert!(matches!(result, Err(DbError::Validation { .. })));

    let result = service
        .update(
            task.id,
            TaskPatch {
                title: Some(" ".to_string()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(DbError::Validation { .. })));
}

#[tokio::test(flavor = "multi_thread")]
async fn update_missing_task_is_not_found() {
    let service = setup().await;

    let result = service
        .update(
            99,
            TaskPatch {
                title: Some("x".to_string()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(DbError::NotFound { .. })));
}

#[tokio::test(flavor = "multi_thread")]
async fn delete_returns_removed_task() {
    let service = setup().await;
    let task = service.create(NewTask::titled("Old note")).await.unwrap();

    let deleted = service.delete(task.id).await.unwrap();
    assert_eq!(deleted.title, "Old note");
    assert!(matches!(
        service.get(task.id).await,
        Err(DbError::NotFound { .. })
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn complete_plain_task() {
    let service = setup().await;
    let task = service.create(NewTask::titled("File taxes")).await.unwrap();

    let completion = service.complete(task.id).await.unwrap();
    assert!(completion.task.completed);
    assert!(completion.task.completed_at.is_some());
    assert!(completion.next.is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn complete_recurring_task_spawns_next_occurrence() {
    let service = setup().await;
    let task = service
        .create(NewTask {
            recurrence: Some(Recurrence::Monthly),
            due_date: Some(date(2025, 1, 31)),
            priority: Priority::High,
            tags: vec!["bills".to_string()],
            ..NewTask::titled("Pay rent")
        })
        .await
        .unwrap();

    let completion = service.complete(task.id).await.unwrap();
    let next = completion.next.expect("next occurrence");
    assert_eq!(next.title, "Pay rent");
    assert_eq!(next.due_date, Some(date(2025, 2, 28)));
    assert_eq!(next.parent_task_id, Some(task.id));
    assert_eq!(next.priority, Priority::High);
    assert_eq!(next.tags, vec!["bills"]);
    assert!(!next.completed);

    // Completing again is a no-op and spawns nothing
    let again = service.complete(task.id).await.unwrap();
    assert!(again.next.is_none());
    let all = service.list(&TaskQuery::default()).await.unwrap();
    assert_eq!(all.total, 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn complete_succeeds_when_next_occurrence_cannot_be_created() {
    let service = setup().await;
    let task = service
        .create(NewTask {
            recurrence: Some(Recurrence::Weekly),
            due_date: Some(date(2025, 3, 3)),
            ..NewTask::titled("Team sync")
        })
        .await
        .unwrap();

    sqlx::query(
        "CREATE TRIGGER block_next_occurrence BEFORE INSERT ON task \
         WHEN NEW.parent_task_id IS NOT NULL \
         BEGIN SELECT RAISE(ABORT, 'insert blocked'); END",
    )
    .execute(service.db().pool())
    .await
    .expect("Trigger should be created");

    let completion = service.complete(task.id).await.unwrap();
    assert!(completion.task.completed);
    assert!(completion.next.is_none());

    let stored = service.get(task.id).await.unwrap();
    assert!(stored.completed);
    assert_eq!(service.list(&TaskQuery::default()).await.unwrap().total, 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn complete_recurring_task_without_due_date_spawns_nothing() {
    let service = setup().await;
    let task = service
        .create(NewTask {
            recurrence: Some(Recurrence::Daily),
            ..NewTask::titled("Meditate")
        })
        .await
        .unwrap();

    let completion = service.complete(task.id).await.unwrap();
    assert!(completion.next.is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn create_recurring_instance_requires_recurrence() {
    let service = setup().await;
    let task = service.create(NewTask::titled("One-off")).await.unwrap();

    let result = service.create_recurring_instance(task.id).await;
    assert!(matches!(result, Err(DbError::Validation { .. })));
}

#[tokio::test(flavor = "multi_thread")]
async fn create_recurring_instance_without_due_date_counts_from_today() {
    let service = setup().await;
    let task = service
        .create(NewTask {
            recurrence: Some(Recurrence::Weekly),
            ..NewTask::titled("Team sync")
        })
        .await
        .unwrap();

    let next = service.create_recurring_instance(task.id).await.unwrap();
    assert_eq!(
        next.due_date,
        next_occurrence(today(), Recurrence::Weekly)
    );
    assert_eq!(next.recurrence, Some(Recurrence::Weekly));
}

#[tokio::test(flavor = "multi_thread")]
async fn due_soon_includes_overdue_and_excludes_completed() {
    let service = setup().await;
    let today = date(2025, 3, 10);

    for (title, due) in [
        ("overdue", date(2025, 3, 1)),
        ("tomorrow", date(2025, 3, 11)),
        ("far", date(2025, 4, 1)),
    ] {
        service
            .create(NewTask {
                due_date: Some(due),
                ..NewTask::titled(title)
            })
            .await
            .unwrap();
    }
    let done = service
        .create(NewTask {
            due_date: Some(date(2025, 3, 10)),
            ..NewTask::titled("done already")
        })
        .await
        .unwrap();
    service.complete(done.id).await.unwrap();
    service.create(NewTask::titled("undated")).await.unwrap();

    let titles: Vec<_> = service
        .due_soon(3, today)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.title)
        .collect();
    assert_eq!(titles, vec!["overdue", "tomorrow"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn recurring_lists_only_repeating_tasks() {
    let service = setup().await;
    service
        .create(NewTask {
            recurrence: Some(Recurrence::Yearly),
            ..NewTask::titled("Birthday card")
        })
        .await
        .unwrap();
    service.create(NewTask::titled("One-off")).await.unwrap();

    let recurring = service.recurring().await.unwrap();
    assert_eq!(recurring.len(), 1);
    assert_eq!(recurring[0].title, "Birthday card");
}
