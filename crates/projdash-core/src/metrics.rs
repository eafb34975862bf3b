//! Metrics engine: pure functions of a [`FilteredView`].
//!
//! Everything here is recomputed from scratch on each call; there is no
//! cached state to invalidate. Project-level aggregates are taken over the
//! *filtered* set, never the full dataset. Degenerate inputs (empty view,
//! zero budget, zero actual cost) yield zero-valued metrics, not errors.
//!
//! # Earned Value conventions
//!
//! - EV = budget × percent_complete / 100 (planned value is the budget)
//! - SV = EV − budget, CV = EV − actual cost
//! - SPI = EV / budget, CPI = EV / actual cost, both defined as 0 when the
//!   denominator is 0
//! - Project SPI/CPI are ratios of *sums* (ΣEV / ΣPV, ΣEV / ΣAC), not
//!   averages of per-task indices

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{BudgetAlert, FilteredView, ProcurementRecord, TaskRecord, TaskStatus};

// ============================================================================
// Summary Types
// ============================================================================

/// Headline progress counters for the key-metrics section
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub total_tasks: usize,
    /// Tasks at exactly 100% complete
    pub tasks_completed: usize,
    /// Mean completion as a fraction in [0, 1]; 0 for an empty view
    pub overall_progress: f64,
}

/// Filtered financial totals
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FinancialSummary {
    pub total_budget: f64,
    pub total_actual_cost: f64,
    pub total_cost_variance: f64,
}

/// Per-task Earned Value metrics
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EvmMetrics {
    pub ev: f64,
    pub sv: f64,
    pub cv: f64,
    pub spi: f64,
    pub cpi: f64,
}

/// Project-level Earned Value metrics over a filtered view
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectEvm {
    pub sv: f64,
    pub cv: f64,
    pub spi: f64,
    pub cpi: f64,
}

/// Aggregates over the procurement log
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProcurementSummary {
    pub total_orders: usize,
    pub total_cost: f64,
    /// 0 when there are no orders
    pub average_cost_per_order: f64,
    /// Cost totals grouped by order-date month, keyed "YYYY-MM", ascending
    pub monthly_cost: Vec<(String, f64)>,
    /// Order counts per status label, ascending by label
    pub status_counts: BTreeMap<String, usize>,
}

// ============================================================================
// Operations
// ============================================================================

/// Ratio with a zero-denominator guard: 0 instead of NaN or infinity
fn guarded_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Headline counters for the view
pub fn project_summary(view: &FilteredView<'_>) -> ProjectSummary {
    let total_tasks = view.len();
    let tasks_completed = view.iter().filter(|t| t.is_complete()).count();
    let pct_sum: f64 = view.iter().map(|t| t.percent_complete).sum();
    let overall_progress = guarded_ratio(pct_sum / 100.0, total_tasks as f64);

    ProjectSummary {
        total_tasks,
        tasks_completed,
        overall_progress,
    }
}

/// Budget / actual-cost / variance totals for the view
pub fn financial_summary(view: &FilteredView<'_>) -> FinancialSummary {
    let total_budget: f64 = view.iter().map(|t| t.budget).sum();
    let total_actual_cost: f64 = view.iter().map(|t| t.actual_cost).sum();

    FinancialSummary {
        total_budget,
        total_actual_cost,
        total_cost_variance: total_budget - total_actual_cost,
    }
}

/// Classify a task as of `today`.
///
/// Rule priority matters: Overdue is checked first, so an unfinished task
/// past its end date is Overdue even if barely started; a task at 100% is
/// Completed even when its end date has passed.
pub fn task_status(task: &TaskRecord, today: NaiveDate) -> TaskStatus {
    if task.percent_complete < 100.0 && task.end < today {
        TaskStatus::Overdue
    } else if task.percent_complete > 0.0 && task.percent_complete < 100.0 {
        TaskStatus::InProgress
    } else if task.percent_complete == 0.0 {
        TaskStatus::NotStarted
    } else {
        TaskStatus::Completed
    }
}

/// Earned Value metrics for a single task
pub fn evm(task: &TaskRecord) -> EvmMetrics {
    let ev = task.budget * task.percent_complete / 100.0;

    EvmMetrics {
        ev,
        sv: ev - task.budget,
        cv: ev - task.actual_cost,
        spi: guarded_ratio(ev, task.budget),
        cpi: guarded_ratio(ev, task.actual_cost),
    }
}

/// Project-level EVM from summed EV, budget and actual cost across the view
pub fn project_evm(view: &FilteredView<'_>) -> ProjectEvm {
    let mut total_ev = 0.0;
    let mut total_budget = 0.0;
    let mut total_actual = 0.0;

    for task in view.iter() {
        total_ev += task.budget * task.percent_complete / 100.0;
        total_budget += task.budget;
        total_actual += task.actual_cost;
    }

    ProjectEvm {
        sv: total_ev - total_budget,
        cv: total_ev - total_actual,
        spi: guarded_ratio(total_ev, total_budget),
        cpi: guarded_ratio(total_ev, total_actual),
    }
}

/// Budget alert from the sign of the cost variance
pub fn budget_variance_alert(task: &TaskRecord) -> BudgetAlert {
    let variance = task.cost_variance();
    if variance == 0.0 {
        BudgetAlert::ExactlyOnBudget
    } else if variance < 0.0 {
        BudgetAlert::OverBudget(-variance)
    } else {
        BudgetAlert::UnderBudget(variance)
    }
}

/// Aggregate the procurement log: totals, monthly cost series, status counts
pub fn procurement_summary(records: &[ProcurementRecord]) -> ProcurementSummary {
    let total_orders = records.len();
    let total_cost: f64 = records.iter().map(|r| r.total_cost).sum();
    let average_cost_per_order = guarded_ratio(total_cost, total_orders as f64);

    let mut by_month: BTreeMap<String, f64> = BTreeMap::new();
    let mut status_counts: BTreeMap<String, usize> = BTreeMap::new();
    for record in records {
        let month = record.order_date.format("%Y-%m").to_string();
        *by_month.entry(month).or_insert(0.0) += record.total_cost;
        *status_counts.entry(record.status.as_str().to_string()).or_insert(0) += 1;
    }

    ProcurementSummary {
        total_orders,
        total_cost,
        average_cost_per_order,
        monthly_cost: by_month.into_iter().collect(),
        status_counts,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Dataset, OrderStatus};
    use pretty_assertions::assert_eq;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn task(name: &str, budget: f64, actual: f64, pct: f64) -> TaskRecord {
        TaskRecord::new(name, "General")
            .dates(date(2024, 1, 1), date(2024, 1, 31))
            .budget(budget)
            .actual_cost(actual)
            .percent_complete(pct)
    }

    #[test]
    fn project_summary_counts_and_mean() {
        let dataset = Dataset::from_tasks(vec![
            task("a", 100.0, 0.0, 100.0),
            task("b", 100.0, 0.0, 50.0),
            task("c", 100.0, 0.0, 0.0),
        ]);

        let summary = project_summary(&dataset.view_all());
        assert_eq!(summary.total_tasks, 3);
        assert_eq!(summary.tasks_completed, 1);
        assert_eq!(summary.overall_progress, 0.5);
    }

    #[test]
    fn project_summary_empty_view_is_zero() {
        let dataset = Dataset::default();
        let summary = project_summary(&dataset.view_all());
        assert_eq!(summary.total_tasks, 0);
        assert_eq!(summary.tasks_completed, 0);
        assert_eq!(summary.overall_progress, 0.0);
    }

    #[test]
    fn financial_summary_totals() {
        let dataset = Dataset::from_tasks(vec![
            task("a", 100.0, 50.0, 50.0),
            task("b", 200.0, 250.0, 100.0),
        ]);

        let totals = financial_summary(&dataset.view_all());
        assert_eq!(totals.total_budget, 300.0);
        assert_eq!(totals.total_actual_cost, 300.0);
        assert_eq!(totals.total_cost_variance, 0.0);
    }

    #[test]
    fn financial_summary_empty_view_is_zero() {
        let dataset = Dataset::default();
        let totals = financial_summary(&dataset.view_all());
        assert_eq!(totals.total_budget, 0.0);
        assert_eq!(totals.total_actual_cost, 0.0);
        assert_eq!(totals.total_cost_variance, 0.0);
    }

    #[test]
    fn status_overdue_beats_in_progress() {
        let today = date(2024, 6, 1);
        let t = task("late", 100.0, 0.0, 40.0); // ends 2024-01-31
        assert_eq!(task_status(&t, today), TaskStatus::Overdue);
    }

    #[test]
    fn status_completed_never_overdue() {
        // 100% complete with an end date in the past stays Completed.
        let today = date(2024, 6, 1);
        let t = task("done", 100.0, 80.0, 100.0);
        assert_eq!(task_status(&t, today), TaskStatus::Completed);
    }

    #[test]
    fn status_not_started_and_in_progress() {
        let today = date(2024, 1, 15); // before the fixture end date
        assert_eq!(task_status(&task("t", 100.0, 0.0, 0.0), today), TaskStatus::NotStarted);
        assert_eq!(task_status(&task("t", 100.0, 0.0, 30.0), today), TaskStatus::InProgress);
    }

    #[test]
    fn status_zero_percent_past_end_is_overdue() {
        let today = date(2024, 6, 1);
        assert_eq!(task_status(&task("t", 100.0, 0.0, 0.0), today), TaskStatus::Overdue);
    }

    #[test]
    fn evm_half_complete_task() {
        let metrics = evm(&task("a", 100.0, 50.0, 50.0));
        assert_eq!(metrics.ev, 50.0);
        assert_eq!(metrics.sv, -50.0);
        assert_eq!(metrics.cv, 0.0);
        assert_eq!(metrics.spi, 0.5);
        assert_eq!(metrics.cpi, 1.0);
    }

    #[test]
    fn evm_over_budget_complete_task() {
        let metrics = evm(&task("b", 200.0, 250.0, 100.0));
        assert_eq!(metrics.ev, 200.0);
        assert_eq!(metrics.sv, 0.0);
        assert_eq!(metrics.cv, -50.0);
        assert_eq!(metrics.spi, 1.0);
        assert_eq!(metrics.cpi, 0.8);
    }

    #[test]
    fn evm_zero_denominators_yield_zero_indices() {
        let metrics = evm(&task("zero-budget", 0.0, 40.0, 50.0));
        assert_eq!(metrics.spi, 0.0);

        let metrics = evm(&task("zero-cost", 100.0, 0.0, 0.0));
        assert_eq!(metrics.ev, 0.0);
        assert_eq!(metrics.cpi, 0.0);
        assert!(!metrics.cpi.is_nan());
    }

    #[test]
    fn project_evm_uses_ratio_of_sums() {
        // Two tasks with per-task SPI 0.5 and 1.0. An average would give
        // 0.75; the sum convention gives (50+200)/(100+200) = 0.8333...
        let dataset = Dataset::from_tasks(vec![
            task("a", 100.0, 50.0, 50.0),
            task("b", 200.0, 250.0, 100.0),
        ]);

        let evm = project_evm(&dataset.view_all());
        assert!((evm.spi - 250.0 / 300.0).abs() < 1e-9);
        assert!((evm.cpi - 250.0 / 300.0).abs() < 1e-9);
        assert_eq!(evm.sv, -50.0);
        assert_eq!(evm.cv, -50.0);
    }

    #[test]
    fn project_evm_empty_view() {
        let dataset = Dataset::default();
        let evm = project_evm(&dataset.view_all());
        assert_eq!(evm.spi, 0.0);
        assert_eq!(evm.cpi, 0.0);
        assert_eq!(evm.sv, 0.0);
        assert_eq!(evm.cv, 0.0);
    }

    #[test]
    fn budget_alerts_follow_variance_sign() {
        assert_eq!(
            budget_variance_alert(&task("t", 100.0, 150.0, 0.0)),
            BudgetAlert::OverBudget(50.0)
        );
        assert_eq!(
            budget_variance_alert(&task("t", 100.0, 40.0, 0.0)),
            BudgetAlert::UnderBudget(60.0)
        );
        assert_eq!(
            budget_variance_alert(&task("t", 100.0, 100.0, 0.0)),
            BudgetAlert::ExactlyOnBudget
        );
    }

    fn order(id: &str, ymd: (i32, u32, u32), cost: f64, status: &str) -> ProcurementRecord {
        ProcurementRecord {
            order_id: id.into(),
            order_date: date(ymd.0, ymd.1, ymd.2),
            delivery_date: date(ymd.0, ymd.1, ymd.2),
            total_cost: cost,
            status: OrderStatus::parse(status),
        }
    }

    #[test]
    fn procurement_summary_aggregates() {
        let records = vec![
            order("PO-1", (2024, 1, 10), 1000.0, "Open"),
            order("PO-2", (2024, 1, 20), 500.0, "Delivered"),
            order("PO-3", (2024, 3, 5), 1500.0, "Delivered"),
        ];

        let summary = procurement_summary(&records);
        assert_eq!(summary.total_orders, 3);
        assert_eq!(summary.total_cost, 3000.0);
        assert_eq!(summary.average_cost_per_order, 1000.0);
        assert_eq!(
            summary.monthly_cost,
            vec![("2024-01".to_string(), 1500.0), ("2024-03".to_string(), 1500.0)]
        );
        assert_eq!(summary.status_counts.get("Delivered"), Some(&2));
        assert_eq!(summary.status_counts.get("Open"), Some(&1));
    }

    #[test]
    fn procurement_summary_no_orders() {
        let summary = procurement_summary(&[]);
        assert_eq!(summary.total_orders, 0);
        assert_eq!(summary.total_cost, 0.0);
        assert_eq!(summary.average_cost_per_order, 0.0);
        assert!(summary.monthly_cost.is_empty());
        assert!(summary.status_counts.is_empty());
    }
}
