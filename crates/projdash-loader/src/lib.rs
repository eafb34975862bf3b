//! # projdash-loader
//!
//! Loaders for the four tabular sources projdash consumes: the task sheet,
//! the risk register, the procurement log and the project overview.
//!
//! Every loader follows the same contract: parse, validate the required
//! columns, normalize values, and return an immutable snapshot — or fail.
//! Loads are all-or-nothing: a single unparseable cell fails the whole load
//! with [`LoadError::Parse`] and no partial data is produced, so a caller
//! holding a previous snapshot keeps it.
//!
//! Numeric cells that are missing or empty default to 0. Date cells do not:
//! an empty or unparseable date is an error.
//!
//! ## Example
//!
//! ```rust,no_run
//! use projdash_loader::load_tasks;
//!
//! let dataset = load_tasks("project_data.csv".as_ref())?;
//! println!("{} tasks loaded", dataset.len());
//! # Ok::<(), projdash_core::LoadError>(())
//! ```

use chrono::NaiveDate;
use csv::StringRecord;
use std::path::Path;
use tracing::debug;

use projdash_core::{
    Dataset, LoadError, OrderStatus, ProcurementRecord, ProjectOverview, RiskLevel, RiskRecord,
    RiskRegister, TaskRecord,
};

/// Date formats accepted in source sheets, tried in order
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y"];

// ============================================================================
// Column access
// ============================================================================

/// Header-indexed access into one source sheet.
///
/// Resolves required column names once against the header row and reports
/// cell-level failures with their row and column for error messages.
struct Sheet {
    headers: StringRecord,
    rows: Vec<StringRecord>,
}

impl Sheet {
    fn open(path: &Path) -> Result<Self, LoadError> {
        if !path.exists() {
            return Err(LoadError::MissingSource { path: path.to_path_buf() });
        }
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(sheet_error)?;
        let headers = reader.headers().map_err(sheet_error)?.clone();
        let rows = reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .map_err(sheet_error)?;
        debug!(path = %path.display(), rows = rows.len(), "source sheet read");
        Ok(Self { headers, rows })
    }

    /// Resolve a required column, failing with a schema error when absent
    fn column(&self, name: &str) -> Result<usize, LoadError> {
        self.headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| LoadError::Schema { column: name.to_string() })
    }

    /// Raw cell text; short rows read as empty cells
    fn cell<'a>(&self, row: &'a StringRecord, col: usize) -> &'a str {
        row.get(col).unwrap_or("").trim()
    }

    /// Numeric cell with the missing-value default of 0
    fn number(
        &self,
        row: &StringRecord,
        row_index: usize,
        col: usize,
        name: &str,
    ) -> Result<f64, LoadError> {
        let text = self.cell(row, col);
        if text.is_empty() {
            return Ok(0.0);
        }
        text.parse::<f64>().map_err(|_| LoadError::Parse {
            row: row_index,
            column: name.to_string(),
            message: format!("unparseable number '{text}'"),
        })
    }

    /// Date cell; empty is an error, unlike numeric cells
    fn date(
        &self,
        row: &StringRecord,
        row_index: usize,
        col: usize,
        name: &str,
    ) -> Result<NaiveDate, LoadError> {
        let text = self.cell(row, col);
        parse_date(text).ok_or_else(|| LoadError::Parse {
            row: row_index,
            column: name.to_string(),
            message: format!("unparseable date '{text}'"),
        })
    }
}

/// Surface the underlying IO error when there is one; any other reader
/// failure means the sheet itself is broken
fn sheet_error(err: csv::Error) -> LoadError {
    let message = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(err) => LoadError::Io(err),
        _ => LoadError::Malformed(message),
    }
}

/// Try each accepted date format in order
fn parse_date(text: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

// ============================================================================
// Loaders
// ============================================================================

/// Load the primary task sheet into an immutable [`Dataset`] snapshot.
///
/// Required columns: Task, Start Date, End Date, Percent Complete, Category,
/// Budget, Actual Cost. Cost variance is derived, never read from the sheet.
pub fn load_tasks(path: &Path) -> Result<Dataset, LoadError> {
    let sheet = Sheet::open(path)?;
    let col_task = sheet.column("Task")?;
    let col_start = sheet.column("Start Date")?;
    let col_end = sheet.column("End Date")?;
    let col_pct = sheet.column("Percent Complete")?;
    let col_category = sheet.column("Category")?;
    let col_budget = sheet.column("Budget")?;
    let col_actual = sheet.column("Actual Cost")?;

    let mut tasks = Vec::with_capacity(sheet.rows.len());
    for (i, row) in sheet.rows.iter().enumerate() {
        let row_index = i + 1;
        tasks.push(TaskRecord {
            name: sheet.cell(row, col_task).to_string(),
            category: sheet.cell(row, col_category).to_string(),
            start: sheet.date(row, row_index, col_start, "Start Date")?,
            end: sheet.date(row, row_index, col_end, "End Date")?,
            budget: sheet.number(row, row_index, col_budget, "Budget")?,
            actual_cost: sheet.number(row, row_index, col_actual, "Actual Cost")?,
            percent_complete: sheet.number(row, row_index, col_pct, "Percent Complete")?,
        });
    }

    debug!(tasks = tasks.len(), "task dataset loaded");
    Ok(Dataset::from_tasks(tasks))
}

/// Load the risk register. Required columns: Risk, Probability, Impact,
/// Mitigation Plan. Probability/impact must be one of Low/Medium/High.
pub fn load_risk_register(path: &Path) -> Result<RiskRegister, LoadError> {
    let sheet = Sheet::open(path)?;
    let col_risk = sheet.column("Risk")?;
    let col_probability = sheet.column("Probability")?;
    let col_impact = sheet.column("Impact")?;
    let col_mitigation = sheet.column("Mitigation Plan")?;

    let ordinal = |sheet: &Sheet, row: &StringRecord, row_index: usize, col: usize, name: &str| {
        let text = sheet.cell(row, col);
        RiskLevel::parse(text).ok_or_else(|| LoadError::Parse {
            row: row_index,
            column: name.to_string(),
            message: format!("expected Low/Medium/High, got '{text}'"),
        })
    };

    let mut risks = Vec::with_capacity(sheet.rows.len());
    for (i, row) in sheet.rows.iter().enumerate() {
        let row_index = i + 1;
        risks.push(RiskRecord {
            name: sheet.cell(row, col_risk).to_string(),
            probability: ordinal(&sheet, row, row_index, col_probability, "Probability")?,
            impact: ordinal(&sheet, row, row_index, col_impact, "Impact")?,
            mitigation: sheet.cell(row, col_mitigation).to_string(),
        });
    }

    Ok(RiskRegister::new(risks))
}

/// Load the procurement log. Required columns: Order ID, Order Date,
/// Delivery Date, Total Cost, Status. Unknown status labels pass through as
/// [`OrderStatus::Other`].
pub fn load_procurement_log(path: &Path) -> Result<Vec<ProcurementRecord>, LoadError> {
    let sheet = Sheet::open(path)?;
    let col_id = sheet.column("Order ID")?;
    let col_order_date = sheet.column("Order Date")?;
    let col_delivery = sheet.column("Delivery Date")?;
    let col_cost = sheet.column("Total Cost")?;
    let col_status = sheet.column("Status")?;

    let mut records = Vec::with_capacity(sheet.rows.len());
    for (i, row) in sheet.rows.iter().enumerate() {
        let row_index = i + 1;
        records.push(ProcurementRecord {
            order_id: sheet.cell(row, col_id).to_string(),
            order_date: sheet.date(row, row_index, col_order_date, "Order Date")?,
            delivery_date: sheet.date(row, row_index, col_delivery, "Delivery Date")?,
            total_cost: sheet.number(row, row_index, col_cost, "Total Cost")?,
            status: OrderStatus::parse(sheet.cell(row, col_status)),
        });
    }

    Ok(records)
}

/// Load the project overview sheet: two columns, Field and Value, displayed
/// verbatim in sheet order.
pub fn load_project_overview(path: &Path) -> Result<ProjectOverview, LoadError> {
    let sheet = Sheet::open(path)?;
    let col_field = sheet.column("Field")?;
    let col_value = sheet.column("Value")?;

    let fields = sheet
        .rows
        .iter()
        .map(|row| {
            (
                sheet.cell(row, col_field).to_string(),
                sheet.cell(row, col_value).to_string(),
            )
        })
        .collect();

    Ok(ProjectOverview::from_fields(fields))
}

// ============================================================================
// Tests
// ============================================================================
