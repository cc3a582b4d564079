//! Report content builders.
//!
//! Generated reports are stored as plain text. These functions turn a
//! snapshot of store state into that text; they do not read the store.

use std::fmt::Write;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::status::{ReportType, TaskStatus};
use crate::types::{Date, Money};

/// Task counts per kanban column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskStatusCounts {
    pub todo: i64,
    pub in_progress: i64,
    pub done: i64,
}

impl TaskStatusCounts {
    pub fn total(&self) -> i64 {
        self.todo + self.in_progress + self.done
    }

    /// Add `count` tasks with the given stored status.
    pub fn record(&mut self, status: TaskStatus, count: i64) {
        match status {
            TaskStatus::Todo => self.todo += count,
            TaskStatus::InProgress => self.in_progress += count,
            TaskStatus::Done => self.done += count,
        }
    }

    /// Share of tasks that are done, as a percentage rounded to one decimal.
    /// A project without tasks is 0% complete.
    pub fn completion_pct(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let pct = self.done as f64 * 100.0 / total as f64;
        (pct * 10.0).round() / 10.0
    }
}

/// Budget position of one project.
#[derive(Debug, Clone, Default)]
pub struct FinancialSnapshot {
    pub budget: Money,
    pub spent: Money,
    /// Spend per expense category, largest first.
    pub by_category: Vec<(String, Money)>,
}

impl FinancialSnapshot {
    pub fn remaining(&self) -> Money {
        self.budget - self.spent
    }

    /// Spent share of the budget in percent, `None` without a budget.
    pub fn usage_pct(&self) -> Option<Decimal> {
        if self.budget.is_zero() {
            return None;
        }
        Some((self.spent * Decimal::ONE_HUNDRED / self.budget).round_dp(1))
    }
}

/// One line of a task report.
#[derive(Debug, Clone)]
pub struct TaskLine {
    pub title: String,
    pub status: String,
    pub due_date: Option<Date>,
    pub assignee: Option<String>,
}

/// Title used when the caller does not supply one.
pub fn default_title(kind: ReportType, project_name: &str, date: Date) -> String {
    let kind = match kind {
        ReportType::Progress => "Progress",
        ReportType::Financial => "Financial",
        ReportType::Task => "Task",
        ReportType::Custom => "Custom",
    };
    format!("{kind} report: {project_name} ({})", date.format("%Y-%m-%d"))
}

pub fn progress_content(project_name: &str, counts: &TaskStatusCounts) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Progress report for {project_name}");
    let _ = writeln!(out);
    let _ = writeln!(out, "Total tasks: {}", counts.total());
    let _ = writeln!(out, "To do: {}", counts.todo);
    let _ = writeln!(out, "In progress: {}", counts.in_progress);
    let _ = writeln!(out, "Done: {}", counts.done);
    let _ = write!(out, "Completion: {:.1}%", counts.completion_pct());
    out
}

pub fn financial_content(project_name: &str, snapshot: &FinancialSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Financial report for {project_name}");
    let _ = writeln!(out);
    let _ = writeln!(out, "Budget: {}", snapshot.budget.round_dp(2));
    let _ = writeln!(out, "Spent: {}", snapshot.spent.round_dp(2));
    let _ = writeln!(out, "Remaining: {}", snapshot.remaining().round_dp(2));
    match snapshot.usage_pct() {
        Some(pct) => {
            let _ = writeln!(out, "Budget used: {pct}%");
        }
        None => {
            let _ = writeln!(out, "Budget used: n/a");
        }
    }
    if !snapshot.by_category.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Spend by category:");
        for (category, amount) in &snapshot.by_category {
            let _ = writeln!(out, "- {category}: {}", amount.round_dp(2));
        }
    }
    out.trim_end().to_string()
}

pub fn task_content(project_name: &str, tasks: &[TaskLine]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Task report for {project_name}");
    let _ = writeln!(out);
    if tasks.is_empty() {
        out.push_str("No tasks.");
        return out;
    }
    for task in tasks {
        let _ = write!(out, "- [{}] {}", task.status, task.title);
        if let Some(due) = task.due_date {
            let _ = write!(out, " (due {})", due.format("%Y-%m-%d"));
        }
        if let Some(assignee) = &task.assignee {
            let _ = write!(out, " assigned to {assignee}");
        }
        out.push('\n');
    }
    out.trim_end().to_string()
}
