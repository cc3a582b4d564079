//! Integration tests for entity CRUD against a real database:
//! - Create then find returns the submitted values
//! - Partial updates, including clearing nullable columns
//! - Check, unique and foreign-key constraint violations

use std::str::FromStr;

use assert_matches::assert_matches;
use buildtrack_core::types::{Date, DbId, Money};
use buildtrack_db::models::attachment::FileAttachment;
use buildtrack_db::models::contract::CreateContract;
use buildtrack_db::models::document::{CreateDocument, UpdateDocument};
use buildtrack_db::models::project::{CreateProject, UpdateProject};
use buildtrack_db::models::role::{CreateRole, UpdateRole};
use buildtrack_db::models::schedule::CreateSchedule;
use buildtrack_db::models::task::{CreateTask, UpdateTask};
use buildtrack_db::models::user::CreateUser;
use buildtrack_db::repositories::{
    ContractRepo, DocumentRepo, ProjectRepo, ReferenceRepo, RoleRepo, ScheduleRepo, TaskRepo,
    UserRepo,
};
use buildtrack_core::validation::RefTable;
use chrono::{TimeZone, Utc};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_user(pool: &PgPool, email: &str) -> DbId {
    let role = RoleRepo::find_by_name(pool, "member").await.unwrap().unwrap();
    UserRepo::create(
        pool,
        &CreateUser {
            name: "Site Lead".to_string(),
            email: email.to_string(),
            password_hash: "not-a-real-hash".to_string(),
            role_id: role.id,
        },
    )
    .await
    .unwrap()
    .id
}

fn date(s: &str) -> Date {
    Date::from_str(s).unwrap()
}

fn money(s: &str) -> Money {
    Money::from_str(s).unwrap()
}

fn new_project(name: &str) -> CreateProject {
    CreateProject {
        name: name.to_string(),
        description: None,
        start_date: None,
        end_date: None,
        budget: None,
        status: None,
    }
}

fn new_task(title: &str) -> CreateTask {
    CreateTask {
        title: title.to_string(),
        description: None,
        status: None,
        due_date: None,
        order: None,
        assigned_to: None,
    }
}

fn attachment(path: &str) -> FileAttachment {
    FileAttachment {
        path: path.to_string(),
        size: 4,
        mime_type: Some("application/pdf".to_string()),
    }
}

fn db_code(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db) => db.code().map(|c| c.to_string()),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn project_round_trip(pool: PgPool) {
    let user = seed_user(&pool, "lead@example.com").await;
    let input = CreateProject {
        name: "Harbour Wall".to_string(),
        description: Some("Sea defence rebuild".to_string()),
        start_date: Some(date("2026-03-01")),
        end_date: Some(date("2026-11-30")),
        budget: Some(money("250000.00")),
        status: Some("on_hold".to_string()),
    };
    let created = ProjectRepo::create(&pool, user, &input).await.unwrap();

    let found = ProjectRepo::find_by_id(&pool, created.id).await.unwrap().unwrap();
    assert_eq!(found.name, "Harbour Wall");
    assert_eq!(found.description.as_deref(), Some("Sea defence rebuild"));
    assert_eq!(found.start_date, Some(date("2026-03-01")));
    assert_eq!(found.end_date, Some(date("2026-11-30")));
    assert_eq!(found.budget, money("250000"));
    assert_eq!(found.status, "on_hold");
    assert_eq!(found.created_by, user);
    assert!(found.deleted_at.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn project_defaults(pool: PgPool) {
    let user = seed_user(&pool, "lead@example.com").await;
    let project = ProjectRepo::create(&pool, user, &new_project("Depot")).await.unwrap();
    assert_eq!(project.status, "active");
    assert_eq!(project.budget, Money::ZERO);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn project_update_applies_only_supplied_fields(pool: PgPool) {
    let user = seed_user(&pool, "lead@example.com").await;
    let mut input = new_project("Depot");
    input.description = Some("Bus depot".to_string());
    input.start_date = Some(date("2026-01-10"));
    let project = ProjectRepo::create(&pool, user, &input).await.unwrap();

    let update = UpdateProject {
        status: Some("completed".to_string()),
        description: Some(None),
        ..Default::default()
    };
    let updated = ProjectRepo::update(&pool, project.id, &update)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.name, "Depot");
    assert_eq!(updated.status, "completed");
    assert_eq!(updated.description, None);
    assert_eq!(updated.start_date, Some(date("2026-01-10")));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn project_date_range_is_enforced_by_the_store(pool: PgPool) {
    let user = seed_user(&pool, "lead@example.com").await;
    let mut input = new_project("Backwards");
    input.start_date = Some(date("2026-06-01"));
    input.end_date = Some(date("2026-05-01"));

    let err = ProjectRepo::create(&pool, user, &input).await.unwrap_err();
    assert_eq!(db_code(&err).as_deref(), Some("23514"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn negative_budget_is_rejected_by_the_store(pool: PgPool) {
    let user = seed_user(&pool, "lead@example.com").await;
    let mut input = new_project("Overdrawn");
    input.budget = Some(money("-1"));
    let err = ProjectRepo::create(&pool, user, &input).await.unwrap_err();
    assert_eq!(db_code(&err).as_deref(), Some("23514"));
}

// ---------------------------------------------------------------------------
// Tasks and schedules
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn task_update_can_clear_assignee(pool: PgPool) {
    let user = seed_user(&pool, "lead@example.com").await;
    let project = ProjectRepo::create(&pool, user, &new_project("Depot")).await.unwrap();
    let mut input = new_task("Pour slab");
    input.assigned_to = Some(user);
    input.due_date = Some(date("2026-04-01"));
    let task = TaskRepo::create(&pool, project.id, user, &input)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(task.assigned_to, Some(user));

    let update = UpdateTask {
        assigned_to: Some(None),
        title: Some("Pour footing slab".to_string()),
        ..Default::default()
    };
    let updated = TaskRepo::update(&pool, task.id, &update).await.unwrap().unwrap();
    assert_eq!(updated.assigned_to, None);
    assert_eq!(updated.title, "Pour footing slab");
    assert_eq!(updated.due_date, Some(date("2026-04-01")));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn task_with_unknown_assignee_violates_foreign_key(pool: PgPool) {
    let user = seed_user(&pool, "lead@example.com").await;
    let project = ProjectRepo::create(&pool, user, &new_project("Depot")).await.unwrap();
    let mut input = new_task("Pour slab");
    input.assigned_to = Some(999_999);

    let err = TaskRepo::create(&pool, project.id, user, &input).await.unwrap_err();
    assert_eq!(db_code(&err).as_deref(), Some("23503"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn schedule_window_is_enforced_by_the_store(pool: PgPool) {
    let user = seed_user(&pool, "lead@example.com").await;
    let project = ProjectRepo::create(&pool, user, &new_project("Depot")).await.unwrap();
    let task = TaskRepo::create(&pool, project.id, user, &new_task("Erect frame"))
        .await
        .unwrap()
        .unwrap();

    let start = Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap();
    let input = CreateSchedule {
        task_id: task.id,
        assigned_to: Some(user),
        scheduled_start: start,
        scheduled_end: start - chrono::Duration::hours(1),
        status: None,
        notes: None,
    };
    let err = ScheduleRepo::create(&pool, user, &input).await.unwrap_err();
    assert_eq!(db_code(&err).as_deref(), Some("23514"));

    let input = CreateSchedule {
        scheduled_end: start + chrono::Duration::hours(9),
        ..input
    };
    let schedule = ScheduleRepo::create(&pool, user, &input).await.unwrap();
    assert_eq!(schedule.status, "scheduled");
    assert_eq!(schedule.scheduled_start, start);
}

// ---------------------------------------------------------------------------
// Contracts
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn contract_round_trip(pool: PgPool) {
    let user = seed_user(&pool, "lead@example.com").await;
    let project = ProjectRepo::create(&pool, user, &new_project("Depot")).await.unwrap();
    let input = CreateContract {
        title: "Groundworks".to_string(),
        parties_involved: "Buildtrack Ltd; Dig Co".to_string(),
        start_date: date("2026-02-01"),
        end_date: None,
        value: money("48000.50"),
        status: None,
    };
    let created = ContractRepo::create(&pool, project.id, user, &input, None)
        .await
        .unwrap();
    let found = ContractRepo::find_by_id(&pool, project.id, created.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.title, "Groundworks");
    assert_eq!(found.value, money("48000.50"));
    assert_eq!(found.status, "draft");
    assert_eq!(found.file_path, None);

    // Addressed through the wrong project, the contract does not exist.
    let other = ProjectRepo::create(&pool, user, &new_project("Other")).await.unwrap();
    assert!(ContractRepo::find_by_id(&pool, other.id, created.id)
        .await
        .unwrap()
        .is_none());
}

// ---------------------------------------------------------------------------
// Roles and references
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn roles_are_seeded_and_names_unique(pool: PgPool) {
    let names: Vec<String> = RoleRepo::list(&pool)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.name)
        .collect();
    assert_eq!(names, vec!["admin", "manager", "member"]);

    let err = RoleRepo::create(
        &pool,
        &CreateRole {
            name: "admin".to_string(),
            label: "Again".to_string(),
        },
    )
    .await
    .unwrap_err();
    assert_matches!(&err, sqlx::Error::Database(db) if db.constraint() == Some("uq_roles_name"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn role_in_use_cannot_be_deleted(pool: PgPool) {
    seed_user(&pool, "lead@example.com").await;
    let member = RoleRepo::find_by_name(&pool, "member").await.unwrap().unwrap();
    let err = RoleRepo::delete(&pool, member.id).await.unwrap_err();
    assert_eq!(db_code(&err).as_deref(), Some("23503"));

    let renamed = RoleRepo::update(
        &pool,
        member.id,
        &UpdateRole {
            label: Some("Crew".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(renamed.name, "member");
    assert_eq!(renamed.label, "Crew");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn references_respect_soft_delete(pool: PgPool) {
    let user = seed_user(&pool, "lead@example.com").await;
    let project = ProjectRepo::create(&pool, user, &new_project("Depot")).await.unwrap();
    let task = TaskRepo::create(&pool, project.id, user, &new_task("Survey"))
        .await
        .unwrap()
        .unwrap();

    assert!(ReferenceRepo::exists(&pool, RefTable::Users, user).await.unwrap());
    assert!(ReferenceRepo::exists(&pool, RefTable::Projects, project.id).await.unwrap());
    assert!(ReferenceRepo::exists(&pool, RefTable::Tasks, task.id).await.unwrap());
    assert!(!ReferenceRepo::exists(&pool, RefTable::Users, 424_242).await.unwrap());

    ProjectRepo::soft_delete(&pool, project.id).await.unwrap();
    assert!(!ReferenceRepo::exists(&pool, RefTable::Projects, project.id).await.unwrap());
    assert!(!ReferenceRepo::exists(&pool, RefTable::Tasks, task.id).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn document_update_reports_the_path_it_replaced(pool: PgPool) {
    let user = seed_user(&pool, "docs@example.com").await;
    let project = ProjectRepo::create(&pool, user, &new_project("Depot")).await.unwrap();
    let document = DocumentRepo::create(
        &pool,
        project.id,
        user,
        &CreateDocument {
            name: "Plan".to_string(),
            category: "plan".to_string(),
            version: None,
        },
        &attachment("documents/original.pdf"),
    )
    .await
    .unwrap();

    // Metadata only: nothing was replaced.
    let renamed = UpdateDocument {
        name: Some("Plan rev B".to_string()),
        ..Default::default()
    };
    let replaced = DocumentRepo::update(&pool, project.id, document.id, &renamed, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(replaced.previous_file, None);
    assert_eq!(replaced.row.file_path, "documents/original.pdf");

    // Two replacements racing: each reports the path it actually overwrote.
    let (project_id, document_id) = (project.id, document.id);
    let handles: Vec<_> = ["documents/a.pdf", "documents/b.pdf"]
        .into_iter()
        .map(|path| {
            let pool = pool.clone();
            let file = attachment(path);
            tokio::spawn(async move {
                let patch = UpdateDocument::default();
                DocumentRepo::update(&pool, project_id, document_id, &patch, Some(&file)).await
            })
        })
        .collect();

    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.unwrap().unwrap().unwrap());
    }
    let (first, second) = match results[0].previous_file.as_deref() {
        Some("documents/original.pdf") => (&results[0], &results[1]),
        _ => (&results[1], &results[0]),
    };
    assert_eq!(first.previous_file.as_deref(), Some("documents/original.pdf"));
    assert_eq!(second.previous_file.as_deref(), Some(first.row.file_path.as_str()));

    let missing = DocumentRepo::update(&pool, project.id, document.id + 1, &renamed, None)
        .await
        .unwrap();
    assert!(missing.is_none());
}
