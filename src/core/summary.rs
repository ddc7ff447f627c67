//! Dashboard figures computed from the cached collections.
//!
//! All functions are pure and work on whatever the stores currently hold.

use crate::entities::{BudgetModel, GuestModel, TaskModel, WeddingInfoModel};
use chrono::NaiveDate;

/// Headline numbers shown on the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary {
    /// Tasks marked completed
    pub completed_tasks: usize,
    /// All tasks
    pub total_tasks: usize,
    /// Completed share of all tasks, 0-100
    pub progress_percent: f64,
    /// Sum of planned budget amounts
    pub planned_total: f64,
    /// Sum of actual budget amounts
    pub spent_total: f64,
    /// Planned minus spent, negative when over budget
    pub remaining: f64,
    /// Guests who confirmed attendance
    pub confirmed_guests: usize,
    /// All guests
    pub total_guests: usize,
    /// Days from `today` to the wedding, negative once it has passed
    pub days_until_wedding: Option<i64>,
}

/// Percentage of `completed` over `total`, 0 when there is nothing to complete.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn calculate_progress(completed: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (completed as f64 / total as f64) * 100.0
}

/// Builds the dashboard figures.
#[must_use]
pub fn summarize(
    guests: &[GuestModel],
    tasks: &[TaskModel],
    budget: &[BudgetModel],
    wedding: Option<&WeddingInfoModel>,
    today: NaiveDate,
) -> DashboardSummary {
    let completed_tasks = tasks.iter().filter(|task| task.completed).count();
    let planned_total: f64 = budget.iter().map(|item| item.planned_amount).sum();
    let spent_total: f64 = budget.iter().map(|item| item.actual_amount).sum();

    DashboardSummary {
        completed_tasks,
        total_tasks: tasks.len(),
        progress_percent: calculate_progress(completed_tasks, tasks.len()),
        planned_total,
        spent_total,
        remaining: planned_total - spent_total,
        confirmed_guests: guests.iter().filter(|guest| guest.confirmed).count(),
        total_guests: guests.len(),
        days_until_wedding: wedding
            .and_then(|info| info.wedding_date)
            .map(|date| (date - today).num_days()),
    }
}

/// The first `limit` open tasks, in cache order (earliest due first).
#[must_use]
pub fn upcoming_tasks(tasks: &[TaskModel], limit: usize) -> Vec<&TaskModel> {
    tasks.iter().filter(|task| !task.completed).take(limit).collect()
}
