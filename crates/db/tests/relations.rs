//! Integration tests for batched relation loading.

use buildtrack_core::types::DbId;
use buildtrack_db::models::contract::CreateContract;
use buildtrack_db::models::project::CreateProject;
use buildtrack_db::models::schedule::CreateSchedule;
use buildtrack_db::models::task::CreateTask;
use buildtrack_db::models::user::CreateUser;
use buildtrack_db::relations;
use buildtrack_db::repositories::{
    ContractRepo, ProjectRepo, RoleRepo, ScheduleRepo, TaskRepo, UserRepo,
};
use chrono::{Duration, TimeZone, Utc};
use sqlx::PgPool;

async fn user(pool: &PgPool, name: &str, email: &str) -> DbId {
    let role = RoleRepo::find_by_name(pool, "member").await.unwrap().unwrap();
    UserRepo::create(
        pool,
        &CreateUser {
            name: name.to_string(),
            email: email.to_string(),
            password_hash: "x".to_string(),
            role_id: role.id,
        },
    )
    .await
    .unwrap()
    .id
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

fn new_task(title: &str, assigned_to: Option<DbId>) -> CreateTask {
    CreateTask {
        title: title.to_string(),
        description: None,
        status: None,
        due_date: None,
        order: None,
        assigned_to,
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn project_detail_embeds_creator_and_board(pool: PgPool) {
    let owner = user(&pool, "Owner", "owner@example.com").await;
    let crew = user(&pool, "Crew", "crew@example.com").await;
    let project = ProjectRepo::create(&pool, owner, &new_project("Depot")).await.unwrap();
    TaskRepo::create(&pool, project.id, owner, &new_task("Survey", Some(crew)))
        .await
        .unwrap();
    TaskRepo::create(&pool, project.id, owner, &new_task("Dig", None))
        .await
        .unwrap();

    let detail = relations::project_detail(&pool, project).await.unwrap();
    assert_eq!(detail.creator.unwrap().name, "Owner");
    assert_eq!(detail.tasks.len(), 2);
    assert_eq!(detail.tasks[0].task.title, "Survey");
    assert_eq!(detail.tasks[0].assignee.as_ref().unwrap().id, crew);
    assert!(detail.tasks[1].assignee.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn schedule_details_nest_task_project_and_assignees(pool: PgPool) {
    let owner = user(&pool, "Owner", "owner@example.com").await;
    let crew = user(&pool, "Crew", "crew@example.com").await;
    let project = ProjectRepo::create(&pool, owner, &new_project("Depot")).await.unwrap();
    let task = TaskRepo::create(&pool, project.id, owner, &new_task("Frame", Some(crew)))
        .await
        .unwrap()
        .unwrap();

    let start = Utc.with_ymd_and_hms(2026, 7, 1, 8, 0, 0).unwrap();
    let mut schedules = Vec::new();
    for (offset, assignee) in [(0, Some(owner)), (1, None)] {
        let schedule = ScheduleRepo::create(
            &pool,
            owner,
            &CreateSchedule {
                task_id: task.id,
                assigned_to: assignee,
                scheduled_start: start + Duration::days(offset),
                scheduled_end: start + Duration::days(offset) + Duration::hours(8),
                status: None,
                notes: None,
            },
        )
        .await
        .unwrap();
        schedules.push(schedule);
    }

    let details = relations::schedule_details(&pool, schedules).await.unwrap();
    assert_eq!(details.len(), 2);

    let first = &details[0];
    let nested = first.task.as_ref().unwrap();
    assert_eq!(nested.task.id, task.id);
    assert_eq!(nested.project.as_ref().unwrap().name, "Depot");
    assert_eq!(nested.assignee.as_ref().unwrap().id, crew);
    assert_eq!(first.assignee.as_ref().unwrap().id, owner);

    assert!(details[1].assignee.is_none());
    assert_eq!(details[1].task.as_ref().unwrap().task.id, task.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn contract_details_embed_project_and_creator(pool: PgPool) {
    let owner = user(&pool, "Owner", "owner@example.com").await;
    let project = ProjectRepo::create(&pool, owner, &new_project("Depot")).await.unwrap();
    let contract = ContractRepo::create(
        &pool,
        project.id,
        owner,
        &CreateContract {
            title: "Roofing".to_string(),
            parties_involved: "Depot Ltd; RoofCo".to_string(),
            start_date: chrono::NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
            end_date: None,
            value: 12_000.into(),
            status: None,
        },
        None,
    )
    .await
    .unwrap();

    let details = relations::contract_details(&pool, vec![contract]).await.unwrap();
    assert_eq!(details[0].project.as_ref().unwrap().id, project.id);
    assert_eq!(details[0].creator.as_ref().unwrap().email, "owner@example.com");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn empty_pages_need_no_lookups(pool: PgPool) {
    assert!(relations::schedule_details(&pool, Vec::new()).await.unwrap().is_empty());
    assert!(relations::report_details(&pool, Vec::new()).await.unwrap().is_empty());
}
