//! # projdash-core
//!
//! Core domain model for the projdash reporting engine.
//!
//! This crate provides:
//! - Domain types: `TaskRecord`, `Dataset`, `FilteredView`, `RiskRegister`,
//!   `ProcurementRecord`, `ProjectOverview`
//! - The filter engine ([`filter`]) and metrics engine ([`metrics`])
//! - Error types shared by the loader and report crates
//!
//! The model is deliberately stateless: a [`Dataset`] is an immutable
//! snapshot of loaded rows, filtering produces a borrowed view, and every
//! metric is a pure function of that view. Presentation layers call these
//! query functions on each refresh and own nothing but a snapshot handle
//! (see [`session::Session`]).
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use projdash_core::{Dataset, TaskRecord};
//! use projdash_core::metrics::financial_summary;
//!
//! let dataset = Dataset::from_tasks(vec![
//!     TaskRecord::new("Grading", "Civil")
//!         .dates(
//!             NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
//!             NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
//!         )
//!         .budget(100.0)
//!         .actual_cost(50.0)
//!         .percent_complete(50.0),
//! ]);
//!
//! let totals = financial_summary(&dataset.view_all());
//! assert_eq!(totals.total_cost_variance, 50.0);
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

pub mod filter;
pub mod metrics;
pub mod session;

pub use filter::{DateRange, FilterCriteria, FilteredView};
pub use session::Session;

// ============================================================================
// Task Records
// ============================================================================

/// A single task row from the project source.
///
/// `cost_variance` is not stored: it is always derived from the current
/// budget and actual cost so it can never go stale across snapshot rebuilds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Task name, unique within a dataset
    pub name: String,
    /// Category label (drives Gantt colors and budget allocation)
    pub category: String,
    /// Planned start date
    pub start: NaiveDate,
    /// Planned end date (start <= end is not enforced)
    pub end: NaiveDate,
    /// Budgeted cost, >= 0
    pub budget: f64,
    /// Actual cost to date, >= 0
    pub actual_cost: f64,
    /// Completion percentage, 0-100 expected but not clamped
    pub percent_complete: f64,
}

impl TaskRecord {
    /// Create a task with zeroed numerics and a placeholder date span
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        let placeholder = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        Self {
            name: name.into(),
            category: category.into(),
            start: placeholder,
            end: placeholder,
            budget: 0.0,
            actual_cost: 0.0,
            percent_complete: 0.0,
        }
    }

    /// Set the planned date span
    pub fn dates(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    /// Set the budget
    pub fn budget(mut self, budget: f64) -> Self {
        self.budget = budget;
        self
    }

    /// Set the actual cost
    pub fn actual_cost(mut self, actual_cost: f64) -> Self {
        self.actual_cost = actual_cost;
        self
    }

    /// Set the completion percentage
    pub fn percent_complete(mut self, pct: f64) -> Self {
        self.percent_complete = pct;
        self
    }

    /// Derived cost variance: budget minus actual cost
    pub fn cost_variance(&self) -> f64 {
        self.budget - self.actual_cost
    }

    /// Is the task fully complete?
    pub fn is_complete(&self) -> bool {
        self.percent_complete == 100.0
    }
}

// ============================================================================
// Dataset
// ============================================================================

/// Immutable snapshot of loaded task records, in source row order.
///
/// Downstream components never mutate a dataset in place; reloading produces
/// a fresh snapshot that the owning [`Session`] swaps in atomically.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    tasks: Vec<TaskRecord>,
}

impl Dataset {
    /// Build a snapshot from parsed rows (keeps source order)
    pub fn from_tasks(tasks: Vec<TaskRecord>) -> Self {
        Self { tasks }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaskRecord> {
        self.tasks.iter()
    }

    /// Look up a task by name
    pub fn get(&self, name: &str) -> Option<&TaskRecord> {
        self.tasks.iter().find(|t| t.name == name)
    }

    /// Distinct categories in first-seen order.
    ///
    /// Feeds the adapter's category multi-select, so order must be stable.
    pub fn categories(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for task in &self.tasks {
            if !seen.contains(&task.category) {
                seen.push(task.category.clone());
            }
        }
        seen
    }

    /// Earliest start and latest end across all tasks, `None` when empty.
    ///
    /// The adapter uses this as the default date-range filter bounds.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let start = self.tasks.iter().map(|t| t.start).min()?;
        let end = self.tasks.iter().map(|t| t.end).max()?;
        Some((start, end))
    }
}

// ============================================================================
// Risk Register
// ============================================================================

/// Ordinal probability / impact rating for a risk
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }

    /// Parse the ordinal label (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(RiskLevel::Low),
            "medium" => Some(RiskLevel::Medium),
            "high" => Some(RiskLevel::High),
            _ => None,
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single entry in the risk register. No derived fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskRecord {
    pub name: String,
    pub probability: RiskLevel,
    pub impact: RiskLevel,
    pub mitigation: String,
}

/// Loaded (or built-in) risk register
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskRegister {
    pub risks: Vec<RiskRecord>,
}

impl RiskRegister {
    pub fn new(risks: Vec<RiskRecord>) -> Self {
        Self { risks }
    }

    /// Built-in register used when no risk source is supplied
    pub fn sample() -> Self {
        let risk = |name: &str, probability, impact, mitigation: &str| RiskRecord {
            name: name.into(),
            probability,
            impact,
            mitigation: mitigation.into(),
        };
        Self {
            risks: vec![
                risk("Material delays", RiskLevel::Medium, RiskLevel::High, "Secure backup suppliers"),
                risk("Weather disruptions", RiskLevel::High, RiskLevel::Medium, "Contingency schedule"),
                risk("Permitting issues", RiskLevel::Low, RiskLevel::Medium, "Proactive communication"),
                risk("Labor shortage", RiskLevel::Medium, RiskLevel::Low, "Cross-training"),
            ],
        }
    }
}

// ============================================================================
// Procurement Log
// ============================================================================

/// Procurement order status.
///
/// Unknown labels are carried through rather than failing the load; the
/// status column is free-form in the source sheets.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OrderStatus {
    Open,
    Delivered,
    Cancelled,
    Other(String),
}

impl OrderStatus {
    /// Parse the status label (case-insensitive for the known variants)
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "open" => OrderStatus::Open,
            "delivered" => OrderStatus::Delivered,
            "cancelled" | "canceled" => OrderStatus::Cancelled,
            _ => OrderStatus::Other(s.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::Open => "Open",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
            OrderStatus::Other(s) => s,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A purchase order row from the procurement log
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProcurementRecord {
    pub order_id: String,
    pub order_date: NaiveDate,
    pub delivery_date: NaiveDate,
    pub total_cost: f64,
    pub status: OrderStatus,
}

// ============================================================================
// Project Overview
// ============================================================================

/// Flat field/value mapping loaded once and displayed verbatim.
///
/// Order is preserved so the report shows fields as the sheet lists them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectOverview {
    fields: Vec<(String, String)>,
}

impl ProjectOverview {
    pub fn from_fields(fields: Vec<(String, String)>) -> Self {
        Self { fields }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// ============================================================================
// Task Status & Budget Alerts
// ============================================================================

/// Classification of a task as of a given date.
///
/// See [`metrics::task_status`] for the classification rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    Overdue,
    InProgress,
    NotStarted,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Overdue => "Overdue",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::NotStarted => "Not Started",
            TaskStatus::Completed => "Completed",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Budget consumption alert derived from the cost-variance sign
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum BudgetAlert {
    /// Variance is exactly zero: the entire budget is consumed
    ExactlyOnBudget,
    /// Budget exceeded by the given amount (positive)
    OverBudget(f64),
    /// Budget underrun by the given amount (positive)
    UnderBudget(f64),
}

impl BudgetAlert {
    /// One-line alert message for the report's cost-variance section
    pub fn message(&self, task_name: &str) -> String {
        match self {
            BudgetAlert::ExactlyOnBudget => {
                format!("Task '{task_name}' has consumed its entire budget.")
            }
            BudgetAlert::OverBudget(amount) => {
                format!("Task '{task_name}' has exceeded its budget by ${amount:.2}.")
            }
            BudgetAlert::UnderBudget(amount) => {
                format!("Task '{task_name}' has saved ${amount:.2} of its budget.")
            }
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Loading error. Every variant is fatal for the load in question: no
/// partial dataset is ever produced, and the caller keeps whatever snapshot
/// it already holds.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Source file not found: {path}")]
    MissingSource { path: PathBuf },

    #[error("Required column missing: {column}")]
    Schema { column: String },

    #[error("Row {row}, column '{column}': {message}")]
    Parse {
        row: usize,
        column: String,
        message: String,
    },

    #[error("Malformed sheet: {0}")]
    Malformed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Chart or report generation failure. No partial export is emitted.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Chart error: {0}")]
    Chart(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn task_builder() {
        let task = TaskRecord::new("Grading", "Civil")
            .dates(date(2024, 1, 1), date(2024, 1, 31))
            .budget(100.0)
            .actual_cost(50.0)
            .percent_complete(50.0);

        assert_eq!(task.name, "Grading");
        assert_eq!(task.category, "Civil");
        assert_eq!(task.budget, 100.0);
        assert_eq!(task.actual_cost, 50.0);
        assert_eq!(task.percent_complete, 50.0);
    }

    #[test]
    fn cost_variance_is_derived() {
        let mut task = TaskRecord::new("t", "c").budget(100.0).actual_cost(30.0);
        assert_eq!(task.cost_variance(), 70.0);

        // Changing the inputs changes the variance; nothing is cached.
        task.actual_cost = 130.0;
        assert_eq!(task.cost_variance(), -30.0);
    }

    #[test]
    fn dataset_categories_first_seen_order() {
        let dataset = Dataset::from_tasks(vec![
            TaskRecord::new("a", "Electrical"),
            TaskRecord::new("b", "Civil"),
            TaskRecord::new("c", "Electrical"),
        ]);

        assert_eq!(dataset.categories(), vec!["Electrical", "Civil"]);
    }

    #[test]
    fn dataset_date_span() {
        let dataset = Dataset::from_tasks(vec![
            TaskRecord::new("a", "c").dates(date(2024, 2, 1), date(2024, 2, 28)),
            TaskRecord::new("b", "c").dates(date(2024, 1, 1), date(2024, 1, 31)),
        ]);

        assert_eq!(dataset.date_span(), Some((date(2024, 1, 1), date(2024, 2, 28))));
        assert_eq!(Dataset::default().date_span(), None);
    }

    #[test]
    fn dataset_get_by_name() {
        let dataset = Dataset::from_tasks(vec![
            TaskRecord::new("Grading", "Civil"),
            TaskRecord::new("Paving", "Civil"),
        ]);

        assert!(dataset.get("Paving").is_some());
        assert!(dataset.get("Excavation").is_none());
    }

    #[test]
    fn risk_level_parse() {
        assert_eq!(RiskLevel::parse("High"), Some(RiskLevel::High));
        assert_eq!(RiskLevel::parse(" medium "), Some(RiskLevel::Medium));
        assert_eq!(RiskLevel::parse("LOW"), Some(RiskLevel::Low));
        assert_eq!(RiskLevel::parse("severe"), None);
    }

    #[test]
    fn risk_level_ordering() {
        assert!(RiskLevel::Low < RiskLevel::Medium);
        assert!(RiskLevel::Medium < RiskLevel::High);
    }

    #[test]
    fn sample_risk_register() {
        let register = RiskRegister::sample();
        assert_eq!(register.risks.len(), 4);
        assert_eq!(register.risks[0].name, "Material delays");
        assert_eq!(register.risks[1].probability, RiskLevel::High);
    }

    #[test]
    fn order_status_parse() {
        assert_eq!(OrderStatus::parse("open"), OrderStatus::Open);
        assert_eq!(OrderStatus::parse("Delivered"), OrderStatus::Delivered);
        assert_eq!(OrderStatus::parse("canceled"), OrderStatus::Cancelled);
        assert_eq!(
            OrderStatus::parse("Back-ordered"),
            OrderStatus::Other("Back-ordered".into())
        );
    }

    #[test]
    fn order_status_display_passes_unknown_through() {
        assert_eq!(OrderStatus::parse("Back-ordered").to_string(), "Back-ordered");
        assert_eq!(OrderStatus::Cancelled.to_string(), "Cancelled");
    }

    #[test]
    fn project_overview_lookup() {
        let overview = ProjectOverview::from_fields(vec![
            ("Client".into(), "NEOM".into()),
            ("Project Name".into(), "NEOM Bay Airport".into()),
        ]);

        assert_eq!(overview.get("Client"), Some("NEOM"));
        assert_eq!(overview.get("Location"), None);
        let fields: Vec<_> = overview.iter().collect();
        assert_eq!(fields[1], ("Project Name", "NEOM Bay Airport"));
    }

    #[test]
    fn task_status_display() {
        assert_eq!(TaskStatus::Overdue.to_string(), "Overdue");
        assert_eq!(TaskStatus::InProgress.to_string(), "In Progress");
        assert_eq!(TaskStatus::NotStarted.to_string(), "Not Started");
        assert_eq!(TaskStatus::Completed.to_string(), "Completed");
    }

    #[test]
    fn budget_alert_messages() {
        assert_eq!(
            BudgetAlert::OverBudget(50.0).message("Paving"),
            "Task 'Paving' has exceeded its budget by $50.00."
        );
        assert_eq!(
            BudgetAlert::UnderBudget(25.5).message("Paving"),
            "Task 'Paving' has saved $25.50 of its budget."
        );
        assert_eq!(
            BudgetAlert::ExactlyOnBudget.message("Paving"),
            "Task 'Paving' has consumed its entire budget."
        );
    }

    #[test]
    fn load_error_display() {
        let err = LoadError::Schema { column: "Budget".into() };
        assert_eq!(err.to_string(), "Required column missing: Budget");

        let err = LoadError::Parse {
            row: 3,
            column: "Start Date".into(),
            message: "unparseable date 'soon'".into(),
        };
        assert!(err.to_string().contains("Row 3"));
        assert!(err.to_string().contains("Start Date"));
    }
}
