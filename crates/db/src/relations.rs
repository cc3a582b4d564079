//! Batched relation loading.
//!
//! Each loader collects the foreign keys of a page of parent rows, fetches
//! every related row with a single `= ANY($1)` query per relation, and
//! stitches the results back together. The number of queries depends on the
//! number of relations, never on the number of rows.

use std::collections::HashMap;

use buildtrack_core::types::DbId;
use sqlx::PgPool;

use crate::models::contract::{Contract, ContractDetail};
use crate::models::document::{Document, DocumentDetail};
use crate::models::expense::{Expense, ExpenseDetail};
use crate::models::project::{Project, ProjectDetail, ProjectSummary};
use crate::models::report::{Report, ReportDetail};
use crate::models::schedule::{Schedule, ScheduleDetail, ScheduleTask};
use crate::models::task::{Task, TaskDetail, TaskWithAssignee};
use crate::models::user::UserSummary;
use crate::repositories::{ProjectRepo, TaskRepo, UserRepo};

/// Sorted, de-duplicated ids with `None`s dropped.
fn unique_ids(ids: impl IntoIterator<Item = Option<DbId>>) -> Vec<DbId> {
    let mut ids: Vec<DbId> = ids.into_iter().flatten().collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

async fn users_by_id(
    pool: &PgPool,
    ids: impl IntoIterator<Item = Option<DbId>>,
) -> Result<HashMap<DbId, UserSummary>, sqlx::Error> {
    let ids = unique_ids(ids);
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let users = UserRepo::find_summaries_by_ids(pool, &ids).await?;
    Ok(users.into_iter().map(|u| (u.id, u)).collect())
}

async fn projects_by_id(
    pool: &PgPool,
    ids: impl IntoIterator<Item = Option<DbId>>,
) -> Result<HashMap<DbId, ProjectSummary>, sqlx::Error> {
    let ids = unique_ids(ids);
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let projects = ProjectRepo::find_summaries_by_ids(pool, &ids).await?;
    Ok(projects.into_iter().map(|p| (p.id, p)).collect())
}

async fn tasks_by_id(
    pool: &PgPool,
    ids: impl IntoIterator<Item = Option<DbId>>,
) -> Result<HashMap<DbId, Task>, sqlx::Error> {
    let ids = unique_ids(ids);
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let tasks = TaskRepo::find_by_ids(pool, &ids).await?;
    Ok(tasks.into_iter().map(|t| (t.id, t)).collect())
}

fn lookup<T: Clone>(map: &HashMap<DbId, T>, id: Option<DbId>) -> Option<T> {
    id.and_then(|id| map.get(&id).cloned())
}

/// Tasks with their assignees, as listed on a project board.
pub async fn tasks_with_assignees(
    pool: &PgPool,
    tasks: Vec<Task>,
) -> Result<Vec<TaskWithAssignee>, sqlx::Error> {
    let users = users_by_id(pool, tasks.iter().map(|t| t.assigned_to)).await?;
    Ok(tasks
        .into_iter()
        .map(|task| TaskWithAssignee {
            assignee: lookup(&users, task.assigned_to),
            task,
        })
        .collect())
}

/// Tasks with project, assignee and creator.
pub async fn task_details(pool: &PgPool, tasks: Vec<Task>) -> Result<Vec<TaskDetail>, sqlx::Error> {
    let projects = projects_by_id(pool, tasks.iter().map(|t| Some(t.project_id))).await?;
    let users = users_by_id(
        pool,
        tasks
            .iter()
            .flat_map(|t| [t.assigned_to, Some(t.created_by)]),
    )
    .await?;
    Ok(tasks
        .into_iter()
        .map(|task| TaskDetail {
            project: lookup(&projects, Some(task.project_id)),
            assignee: lookup(&users, task.assigned_to),
            creator: lookup(&users, Some(task.created_by)),
            task,
        })
        .collect())
}

/// A project with its creator and its board (tasks with assignees).
pub async fn project_detail(pool: &PgPool, project: Project) -> Result<ProjectDetail, sqlx::Error> {
    let tasks = TaskRepo::list_by_project(pool, project.id, None).await?;
    let tasks = tasks_with_assignees(pool, tasks).await?;
    let users = users_by_id(pool, [Some(project.created_by)]).await?;
    Ok(ProjectDetail {
        creator: lookup(&users, Some(project.created_by)),
        tasks,
        project,
    })
}

/// Schedules with their task (and the task's project and assignee) and
/// their own assignee.
///
/// Three queries regardless of page size: tasks, projects, and one users
/// query covering both task and schedule assignees.
pub async fn schedule_details(
    pool: &PgPool,
    schedules: Vec<Schedule>,
) -> Result<Vec<ScheduleDetail>, sqlx::Error> {
    let tasks = tasks_by_id(pool, schedules.iter().map(|s| Some(s.task_id))).await?;
    let projects = projects_by_id(pool, tasks.values().map(|t| Some(t.project_id))).await?;
    let users = users_by_id(
        pool,
        schedules
            .iter()
            .map(|s| s.assigned_to)
            .chain(tasks.values().map(|t| t.assigned_to)),
    )
    .await?;

    Ok(schedules
        .into_iter()
        .map(|schedule| {
            let task = tasks.get(&schedule.task_id).cloned().map(|task| ScheduleTask {
                project: lookup(&projects, Some(task.project_id)),
                assignee: lookup(&users, task.assigned_to),
                task,
            });
            ScheduleDetail {
                task,
                assignee: lookup(&users, schedule.assigned_to),
                schedule,
            }
        })
        .collect())
}

/// Contracts with their project and creator.
pub async fn contract_details(
    pool: &PgPool,
    contracts: Vec<Contract>,
) -> Result<Vec<ContractDetail>, sqlx::Error> {
    let projects = projects_by_id(pool, contracts.iter().map(|c| Some(c.project_id))).await?;
    let users = users_by_id(pool, contracts.iter().map(|c| Some(c.created_by))).await?;
    Ok(contracts
        .into_iter()
        .map(|contract| ContractDetail {
            project: lookup(&projects, Some(contract.project_id)),
            creator: lookup(&users, Some(contract.created_by)),
            contract,
        })
        .collect())
}

/// Documents with their uploader.
pub async fn document_details(
    pool: &PgPool,
    documents: Vec<Document>,
) -> Result<Vec<DocumentDetail>, sqlx::Error> {
    let users = users_by_id(pool, documents.iter().map(|d| Some(d.uploaded_by))).await?;
    Ok(documents
        .into_iter()
        .map(|document| DocumentDetail {
            uploader: lookup(&users, Some(document.uploaded_by)),
            document,
        })
        .collect())
}

/// Expenses with their uploader.
pub async fn expense_details(
    pool: &PgPool,
    expenses: Vec<Expense>,
) -> Result<Vec<ExpenseDetail>, sqlx::Error> {
    let users = users_by_id(pool, expenses.iter().map(|e| Some(e.uploaded_by))).await?;
    Ok(expenses
        .into_iter()
        .map(|expense| ExpenseDetail {
            uploader: lookup(&users, Some(expense.uploaded_by)),
            expense,
        })
        .collect())
}

/// Reports with their project (while linked and live) and generator.
pub async fn report_details(
    pool: &PgPool,
    reports: Vec<Report>,
) -> Result<Vec<ReportDetail>, sqlx::Error> {
    let projects = projects_by_id(pool, reports.iter().map(|r| r.project_id)).await?;
    let users = users_by_id(pool, reports.iter().map(|r| Some(r.generated_by))).await?;
    Ok(reports
        .into_iter()
        .map(|report| ReportDetail {
            project: lookup(&projects, report.project_id),
            generator: lookup(&users, Some(report.generated_by)),
            report,
        })
        .collect())
}
