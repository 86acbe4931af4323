//! Tests for SqliteTaskRepository.

use chrono::NaiveDate;

use crate::db::{
    Database, DbError, NewTask, PageSort, Priority, Recurrence, SortOrder, SqliteDatabase,
    TaskQuery, TaskRepository,
};

async fn setup_db() -> SqliteDatabase {
    let db = SqliteDatabase::in_memory()
        .await
        .expect("Failed to create in-memory database");
    db.migrate().await.expect("Migration should succeed");
    db
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn make_task(title: &str) -> NewTask {
    NewTask::titled(title)
}

#[tokio::test(flavor = "multi_thread")]
async fn task_create_and_get() {
    let db = setup_db().await;
    let tasks = db.tasks();

    let new = NewTask {
        title: "Buy groceries".to_string(),
        description: Some("milk and eggs".to_string()),
        priority: Priority::High,
        tags: vec!["shopping".to_string(), "home".to_string()],
        due_date: Some(date(2025, 3, 14)),
        recurrence: Some(Recurrence::Weekly),
        parent_task_id: None,
    };

    let created = tasks.create(&new).await.expect("Create should succeed");
    assert!(created.id > 0);
    assert!(!created.completed);
    assert!(created.updated_at.is_none());

    let retrieved = tasks.get(created.id).await.expect("Get should succeed");
    assert_eq!(retrieved, created);
    assert_eq!(retrieved.tags, vec!["shopping", "home"]);
    assert_eq!(retrieved.due_date, Some(date(2025, 3, 14)));
    assert_eq!(retrieved.recurrence, Some(Recurrence::Weekly));
}

#[tokio::test(flavor = "multi_thread")]
async fn task_get_nonexistent_returns_not_found() {
    let db = setup_db().await;

    let result = db.tasks().get(999).await;
    assert!(matches!(result, Err(DbError::NotFound { .. })));
}

#[tokio::test(flavor = "multi_thread")]
async fn task_ids_are_sequential() {
    let db = setup_db().await;
    let tasks = db.tasks();

    let first = tasks.create(&make_task("one")).await.expect("create");
    let second = tasks.create(&make_task("two")).await.expect("create");
    assert_eq!(second.id, first.id + 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn task_update_persists_all_fields() {
    let db = setup_db().await;
    let tasks = db.tasks();

    let mut task = tasks.create(&make_task("Draft report")).await.expect("create");
    task.title = "Final report".to_string();
    task.description = Some("quarterly".to_string());
    task.completed = true;
    task.priority = Priority::Urgent;
    task.tags = vec!["work".to_string()];
    task.due_date = Some(date(2025, 6, 1));
    task.recurrence = Some(Recurrence::Monthly);
    task.updated_at = Some("2025-01-02 10:00:00".to_string());
    task.completed_at = Some("2025-01-02 10:00:00".to_string());

    tasks.update(&task).await.expect("Update should succeed");

    let retrieved = tasks.get(task.id).await.expect("get");
    assert_eq!(retrieved, task);
}

#[tokio::test(flavor = "multi_thread")]
async fn task_update_nonexistent_returns_not_found() {
    let db = setup_db().await;
    let tasks = db.tasks();

    let mut task = tasks.create(&make_task("ghost")).await.expect("create");
    task.id = 4242;

    let result = tasks.update(&task).await;
    assert!(matches!(result, Err(DbError::NotFound { .. })));
}

#[tokio::test(flavor = "multi_thread")]
async fn task_delete() {
    let db = setup_db().await;
    let tasks = db.tasks();

    let task = tasks.create(&make_task("temporary")).await.expect("create");
    tasks.delete(task.id).await.expect("Delete should succeed");

    assert!(matches!(
        tasks.get(task.id).await,
        Err(DbError::NotFound { .. })
    ));
    assert!(matches!(
        tasks.delete(task.id).await,
        Err(DbError::NotFound { .. })
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn task_delete_parent_keeps_child() {
    let db = setup_db().await;
    let tasks = db.tasks();

    let parent = tasks.create(&make_task("water plants")).await.expect("create");
    let child = tasks
        .create(&NewTask {
            parent_task_id: Some(parent.id),
            ..make_task("water plants")
        })
        .await
        .expect("create");

    tasks.delete(parent.id).await.expect("delete");

    let child = tasks.get(child.id).await.expect("child survives");
    assert_eq!(child.parent_task_id, None);
}

#[tokio::test(flavor = "multi_thread")]
async fn task_list_filters_by_completed() {
    let db = setup_db().await;
    let tasks = db.tasks();

    let mut done = tasks.create(&make_task("done")).await.expect("create");
    tasks.create(&make_task("open")).await.expect("create");
    done.completed = true;
    tasks.update(&done).await.expect("update");

    let query = TaskQuery {
        completed: Some(false),
        ..Default::default()
    };
    let result = tasks.list(&query).await.expect("list");
    assert_eq!(result.total, 1);
    assert_eq!(result.items[0].title, "open");

    let query = TaskQuery {
        completed: Some(true),
        ..Default::default()
    };
    let result = tasks.list(&query).await.expect("list");
    assert_eq!(result.total, 1);
    assert_eq!(result.items[0].title, "done");
}

#[tokio::test(flavor = "multi_thread")]
async fn task_list_filters_by_priority() {
    let db = setup_db().await;
    let tasks = db.tasks();

    tasks
        .create(&NewTask {
            priority: Priority::High,
            ..make_task("important")
        })
        .await
        .expect("create");
    tasks.create(&make_task("ordinary")).await.expect("create");

    let query = TaskQuery {
        priority: Some(Priority::High),
        ..Default::default()
    };
    let result = tasks.list(&query).await.expect("list");
    assert_eq!(result.total, 1);
    assert_eq!(result.items[0].title, "important");
}

#[tokio::test(flavor = "multi_thread")]
async fn task_list_tag_filter_requires_every_tag() {
    let db = setup_db().await;
    let tasks = db.tasks();

    tasks
        .create(&NewTask {
            tags: vec!["work".to_string(), "urgent".to_string()],
            ..make_task("both")
        })
        .await
        .expect("create");
    tasks
        .create(&NewTask {
            tags: vec!["work".to_string()],
            ..make_task("work only")
        })
        .await
        .expect("create");

    let query = TaskQuery {
        tags: Some(vec!["work".to_string()]),
        ..Default::default()
    };
    assert_eq!(tasks.list(&query).await.expect("list").total, 2);

    let query = TaskQuery {
        tags: Some(vec!["work".to_string(), "urgent".to_string()]),
        ..Default::default()
    };
    let result = tasks.list(&query).await.expect("list");
    assert_eq!(result.total, 1);
    assert_eq!(result.items[0].title, "both");
}

#[tokio::test(flavor = "multi_thread")]
async fn task_list_due_range() {
    let db = setup_db().await;
    let tasks = db.tasks();

    for (title, due) in [
        ("past", Some(date(2025, 1, 1))),
        ("soon", Some(date(2025, 1, 5))),
        ("later", Some(date(2025, 2, 1))),
        ("undated", None),
    ] {
        tasks
            .create(&NewTask {
                due_date: due,
                ..make_task(title)
            })
            .await
            .expect("create");
    }

    let query = TaskQuery {
        due_from: Some(date(2025, 1, 2)),
        due_to: Some(date(2025, 1, 10)),
        ..Default::default()
    };
    let result = tasks.list(&query).await.expect("list");
    assert_eq!(result.total, 1);
    assert_eq!(result.items[0].title, "soon");

    let query = TaskQuery {
        due_to: Some(date(2025, 1, 10)),
        ..Default::default()
    };
    assert_eq!(tasks.list(&query).await.expect("list").total, 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn task_list_search_matches_title_and_description() {
    let db = setup_db().await;
    let tasks = db.tasks();

    tasks.create(&make_task("Call the Dentist")).await.expect("create");
    tasks
        .create(&NewTask {
            description: Some("ask the dentist about floss".to_string()),
            ..make_task("Errands")
        })
        .await
        .expect("create");
    tasks.create(&make_task("100% done")).await.expect("create");

    let query = TaskQuery {
        search: Some("dentist".to_string()),
        ..Default::default()
    };
    assert_eq!(tasks.list(&query).await.expect("list").total, 2);

    // LIKE wildcards in the term are literal
    let query = TaskQuery {
        search: Some("%".to_string()),
        ..Default::default()
    };
    let result = tasks.list(&query).await.expect("list");
    assert_eq!(result.total, 1);
    assert_eq!(result.items[0].title, "100% done");
}

#[tokio::test(flavor = "multi_thread")]
async fn task_list_recurring_filter() {
    let db = setup_db().await;
    let tasks = db.tasks();

    tasks
        .create(&NewTask {
            recurrence: Some(Recurrence::Daily),
            ..make_task("stretch")
        })
        .await
        .expect("create");
    tasks.create(&make_task("one-off")).await.expect("create");

    let query = TaskQuery {
        recurring: Some(true),
        ..Default::default()
    };
    let result = tasks.list(&query).await.expect("list");
    assert_eq!(result.total, 1);
    assert_eq!(result.items[0].title, "stretch");

    let query = TaskQuery {
        recurring: Some(false),
        ..Default::default()
    };
    let result = tasks.list(&query).await.expect("list");
    assert_eq!(result.items[0].title, "one-off");
}

#[tokio::test(flavor = "multi_thread")]
async fn task_list_sort_and_paginate() {
    let db = setup_db().await;
    let tasks = db.tasks();

    for (title, priority) in [
        ("b", Priority::Low),
        ("a", Priority::Urgent),
        ("c", Priority::Medium),
    ] {
        tasks
            .create(&NewTask {
                priority,
                ..make_task(title)
            })
            .await
            .expect("create");
    }

    let query = TaskQuery {
        page: PageSort {
            sort_by: Some("priority".to_string()),
            sort_order: Some(SortOrder::Desc),
            ..Default::default()
        },
        ..Default::default()
    };
    let titles: Vec<_> = tasks
        .list(&query)
        .await
        .expect("list")
        .items
        .into_iter()
        .map(|t| t.title)
        .collect();
    assert_eq!(titles, vec!["a", "c", "b"]);

    let query = TaskQuery {
        page: PageSort {
            limit: Some(2),
            offset: Some(1),
            sort_by: Some("title".to_string()),
            sort_order: Some(SortOrder::Asc),
        },
        ..Default::default()
    };
    let result = tasks.list(&query).await.expect("list");
    assert_eq!(result.total, 3);
    assert_eq!(result.limit, Some(2));
    assert_eq!(result.offset, 1);
    let titles: Vec<_> = result.items.into_iter().map(|t| t.title).collect();
    assert_eq!(titles, vec!["b", "c"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn malformed_tags_column_reads_as_no_tags() {
    let db = setup_db().await;
    let created = db
        .tasks()
        .create(&make_task("Legacy row"))
        .await
        .expect("Create should succeed");

    sqlx::query("UPDATE task SET tags = 'work, home' WHERE id = ?")
        .bind(created.id)
        .execute(db.pool())
        .await
        .expect("Raw update should succeed");

    let retrieved = db.tasks().get(created.id).await.expect("Get should succeed");
    assert_eq!(retrieved.title, "Legacy row");
    assert!(retrieved.tags.is_empty());

    let listed = db
        .tasks()
        .list(&TaskQuery::default())
        .await
        .expect("List should succeed");
    assert_eq!(listed.total, 1);
    assert!(listed.items[0].tags.is_empty());
}
