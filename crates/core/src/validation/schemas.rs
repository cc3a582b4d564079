//! Rule sets for each entity and operation.
//!
//! Create and update share one rule set; [`Mode`](super::Mode) decides whether
//! required fields must be present.

use super::rules::{Constraint, FieldKind, FieldRule, RefTable};
use crate::status::{
    ContractStatus, DocumentCategory, ProjectStatus, ReportType, ScheduleStatus, TaskStatus,
};

const NAME_MAX: usize = 255;

/// Money columns are `NUMERIC(14, 2)`.
const MONEY: FieldKind = FieldKind::Decimal {
    precision: 14,
    scale: 2,
};

/// Highest explicit task order. Leaves room for appends below the `INTEGER`
/// column limit.
pub const TASK_ORDER_MAX: i64 = 1_000_000;

pub fn project() -> Vec<FieldRule> {
    vec![
        FieldRule::required("name", FieldKind::Text { max: NAME_MAX }),
        FieldRule::nullable("description", FieldKind::LongText),
        FieldRule::nullable("start_date", FieldKind::Date),
        FieldRule::nullable("end_date", FieldKind::Date)
            .with(Constraint::AfterOrEqual("start_date")),
        FieldRule::nullable("budget", MONEY).with(Constraint::NonNegative),
        FieldRule::nullable("status", FieldKind::OneOf(ProjectStatus::ALL)),
    ]
}

pub fn task() -> Vec<FieldRule> {
    vec![
        FieldRule::required("title", FieldKind::Text { max: NAME_MAX }),
        FieldRule::nullable("description", FieldKind::LongText),
        FieldRule::nullable("status", FieldKind::OneOf(TaskStatus::ALL)),
        FieldRule::nullable("due_date", FieldKind::Date),
        FieldRule::nullable("order", FieldKind::Integer)
            .with(Constraint::NonNegative)
            .with(Constraint::AtMost(TASK_ORDER_MAX)),
        FieldRule::nullable("assigned_to", FieldKind::Id)
            .with(Constraint::Exists(RefTable::Users)),
    ]
}

/// Kanban drag-and-drop: only the status column changes.
pub fn task_status() -> Vec<FieldRule> {
    vec![FieldRule::required(
        "status",
        FieldKind::OneOf(TaskStatus::ALL),
    )]
}

pub fn schedule() -> Vec<FieldRule> {
    vec![
        FieldRule::required("task_id", FieldKind::Id).with(Constraint::Exists(RefTable::Tasks)),
        FieldRule::nullable("assigned_to", FieldKind::Id)
            .with(Constraint::Exists(RefTable::Users)),
        FieldRule::required("scheduled_start", FieldKind::DateTime),
        FieldRule::required("scheduled_end", FieldKind::DateTime)
            .with(Constraint::AfterOrEqual("scheduled_start")),
        FieldRule::nullable("status", FieldKind::OneOf(ScheduleStatus::ALL)),
        FieldRule::nullable("notes", FieldKind::LongText),
    ]
}

/// Document metadata. The file itself is checked against
/// [`DOCUMENT_POLICY`](crate::uploads::DOCUMENT_POLICY).
pub fn document() -> Vec<FieldRule> {
    vec![
        FieldRule::required("name", FieldKind::Text { max: NAME_MAX }),
        FieldRule::required("category", FieldKind::OneOf(DocumentCategory::ALL)),
        FieldRule::nullable("version", FieldKind::Text { max: 50 }),
    ]
}

pub fn expense() -> Vec<FieldRule> {
    vec![
        FieldRule::required("description", FieldKind::Text { max: NAME_MAX }),
        FieldRule::required("amount", MONEY).with(Constraint::NonNegative),
        FieldRule::required("category", FieldKind::Text { max: 100 }),
        FieldRule::required("spent_at", FieldKind::Date),
    ]
}

pub fn contract() -> Vec<FieldRule> {
    vec![
        FieldRule::required("title", FieldKind::Text { max: NAME_MAX }),
        FieldRule::required("parties_involved", FieldKind::LongText),
        FieldRule::required("start_date", FieldKind::Date),
        FieldRule::nullable("end_date", FieldKind::Date)
            .with(Constraint::AfterOrEqual("start_date")),
        FieldRule::required("value", MONEY).with(Constraint::NonNegative),
        FieldRule::nullable("status", FieldKind::OneOf(ContractStatus::ALL)),
    ]
}

pub fn report() -> Vec<FieldRule> {
    vec![
        FieldRule::nullable("project_id", FieldKind::Id)
            .with(Constraint::Exists(RefTable::Projects)),
        FieldRule::required("title", FieldKind::Text { max: NAME_MAX }),
        FieldRule::required("type", FieldKind::OneOf(ReportType::ALL)),
        FieldRule::nullable("content", FieldKind::LongText),
        FieldRule::required("report_date", FieldKind::Date),
    ]
}

/// Input for building a report from store state.
pub fn report_generation() -> Vec<FieldRule> {
    vec![
        FieldRule::required("project_id", FieldKind::Id)
            .with(Constraint::Exists(RefTable::Projects)),
        FieldRule::required("type", FieldKind::OneOf(ReportType::GENERATABLE)),
        FieldRule::nullable("title", FieldKind::Text { max: NAME_MAX }),
        FieldRule::nullable("report_date", FieldKind::Date),
    ]
}

pub fn role() -> Vec<FieldRule> {
    vec![
        FieldRule::required("name", FieldKind::Text { max: 50 }),
        FieldRule::required("label", FieldKind::Text { max: NAME_MAX }),
    ]
}
