//! # projdash-report
//!
//! Report assembly and export for projdash.
//!
//! This crate provides:
//! - A structured report document model ([`Document`], [`Section`])
//! - The [`ReportBuilder`] composing metrics into a fixed section order
//! - SVG chart builders ([`charts`])
//! - A paginated HTML serializer producing export bytes ([`html`])
//!
//! Content assembly is kept separate from serialization: the builder turns a
//! filtered view plus metrics into a section tree, and a renderer turns that
//! tree into bytes. Alternate export formats only need a new renderer; the
//! metrics engine is never touched.
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use projdash_core::{Dataset, TaskRecord};
//! use projdash_report::{HtmlRenderer, ReportBuilder};
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
//! let view = dataset.view_all();
//! let today = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
//!
//! let document = ReportBuilder::new("Demo Project").build(&view, today)?;
//! let bytes = HtmlRenderer::default().render(&document)?;
//! assert!(!bytes.is_empty());
//! # Ok::<(), projdash_core::RenderError>(())
//! ```

pub mod charts;
pub mod html;

pub use charts::ChartStyle;
pub use html::{HtmlRenderer, PageMargins, PageOptions, PageSize};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use projdash_core::metrics::{
    budget_variance_alert, evm, financial_summary, procurement_summary, project_evm,
    project_summary, task_status, FinancialSummary, ProjectSummary,
};
use projdash_core::{
    FilteredView, ProcurementRecord, ProjectOverview, RenderError, RiskRegister, TaskStatus,
};

// ============================================================================
// Document Model
// ============================================================================

/// One row of the task-progress table
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProgressRow {
    pub task: String,
    /// Completion percentage driving the progress bar, 0-100
    pub percent_complete: f64,
    pub status: TaskStatus,
}

/// A report section. Variants carry content only; presentation is the
/// renderer's concern.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Section {
    /// Headline counters and financial totals
    KeyMetrics {
        summary: ProjectSummary,
        financial: FinancialSummary,
    },
    /// Verbatim field/value pairs (project overview)
    FieldList {
        title: String,
        fields: Vec<(String, String)>,
    },
    /// Generic data table
    Table {
        title: String,
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    /// Embedded SVG chart artifact
    Chart { title: String, svg: String },
    /// Task progress bars with status badges
    ProgressTable { rows: Vec<ProgressRow> },
    /// One alert line per task
    Alerts { title: String, lines: Vec<String> },
}

/// A fully assembled report, ready for serialization.
///
/// `generated_on` is supplied by the caller, never read from the clock, so
/// identical inputs produce byte-identical exports.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    pub generated_on: NaiveDate,
    pub sections: Vec<Section>,
}

// ============================================================================
// Report Builder
// ============================================================================

/// Composes report sections from a filtered view in a fixed order:
/// key metrics, financial table, Gantt chart, progress table, cost charts,
/// variance alerts, then the optional procurement, EVM and risk sections.
#[derive(Clone, Debug)]
pub struct ReportBuilder {
    /// Report title (project name)
    pub title: String,
    /// Chart geometry and styling
    pub style: ChartStyle,
    /// Include the EVM section (project + per-task tables, index chart)
    pub include_evm: bool,
    /// Project overview fields for the report header
    overview: Option<ProjectOverview>,
    /// Risk register appendix
    risks: Option<RiskRegister>,
    /// Procurement log for the procurement section
    procurement: Option<Vec<ProcurementRecord>>,
}

impl ReportBuilder {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            style: ChartStyle::default(),
            include_evm: true,
            overview: None,
            risks: None,
            procurement: None,
        }
    }

    /// Set the chart style
    pub fn style(mut self, style: ChartStyle) -> Self {
        self.style = style;
        self
    }

    /// Toggle the EVM section
    pub fn include_evm(mut self, include: bool) -> Self {
        self.include_evm = include;
        self
    }

    /// Add the project overview header fields
    pub fn overview(mut self, overview: ProjectOverview) -> Self {
        self.overview = Some(overview);
        self
    }

    /// Add the risk register appendix
    pub fn risks(mut self, risks: RiskRegister) -> Self {
        self.risks = Some(risks);
        self
    }

    /// Add the procurement section
    pub fn procurement(mut self, records: Vec<ProcurementRecord>) -> Self {
        self.procurement = Some(records);
        self
    }

    /// Assemble the report document.
    ///
    /// `today` drives status classification and becomes `generated_on`.
    /// Fails with [`RenderError`] when the view is empty (there is nothing
    /// to chart, so an empty selection never exports) or when any chart
    /// builder fails; no partial document is returned.
    pub fn build(&self, view: &FilteredView<'_>, today: NaiveDate) -> Result<Document, RenderError> {
        if view.is_empty() {
            return Err(RenderError::InvalidData(
                "no data to include in the report; adjust filters to select rows".into(),
            ));
        }

        let mut sections = Vec::new();

        // 1. Header: key metrics, then overview fields when present
        sections.push(Section::KeyMetrics {
            summary: project_summary(view),
            financial: financial_summary(view),
        });
        if let Some(overview) = &self.overview {
            sections.push(Section::FieldList {
                title: "Project Details".into(),
                fields: overview
                    .iter()
                    .map(|(f, v)| (f.to_string(), v.to_string()))
                    .collect(),
            });
        }

        // 2. Financial details table
        sections.push(Section::Table {
            title: "Financial Details".into(),
            headers: ["Task", "Budget", "Actual Cost", "Cost Variance"]
                .map(String::from)
                .to_vec(),
            rows: view
                .iter()
                .map(|t| {
                    vec![
                        t.name.clone(),
                        money(t.budget),
                        money(t.actual_cost),
                        money(t.cost_variance()),
                    ]
                })
                .collect(),
        });

        // 3. Gantt chart
        sections.push(Section::Chart {
            title: "Project Timeline".into(),
            svg: charts::gantt_chart(&self.style, view)?,
        });

        // 4. Task progress table
        sections.push(Section::ProgressTable {
            rows: view
                .iter()
                .map(|t| ProgressRow {
                    task: t.name.clone(),
                    percent_complete: t.percent_complete,
                    status: task_status(t, today),
                })
                .collect(),
        });

        // 5 + 6. Cost comparison and budget allocation charts
        sections.push(Section::Chart {
            title: "Cost Comparison".into(),
            svg: charts::cost_comparison_chart(&self.style, view)?,
        });
        sections.push(Section::Chart {
            title: "Budget Allocation".into(),
            svg: charts::budget_allocation_chart(&self.style, view)?,
        });

        // 7. Cost variance alerts
        sections.push(Section::Alerts {
            title: "Cost Variance Alerts".into(),
            lines: view
                .iter()
                .map(|t| budget_variance_alert(t).message(&t.name))
                .collect(),
        });

        // 8. Procurement summary (optional)
        if let Some(records) = &self.procurement {
            sections.extend(self.procurement_sections(records)?);
        }

        // 9. EVM section (optional)
        if self.include_evm {
            sections.extend(self.evm_sections(view)?);
        }

        // 10. Risk register appendix (optional)
        if let Some(register) = &self.risks {
            sections.push(Section::Table {
                title: "Risk Register".into(),
                headers: ["Risk", "Probability", "Impact", "Mitigation Plan"]
                    .map(String::from)
                    .to_vec(),
                rows: register
                    .risks
                    .iter()
                    .map(|r| {
                        vec![
                            r.name.clone(),
                            r.probability.to_string(),
                            r.impact.to_string(),
                            r.mitigation.clone(),
                        ]
                    })
                    .collect(),
            });
        }

        debug!(sections = sections.len(), title = %self.title, "report assembled");
        Ok(Document {
            title: self.title.clone(),
            generated_on: today,
            sections,
        })
    }

    fn procurement_sections(
        &self,
        records: &[ProcurementRecord],
    ) -> Result<Vec<Section>, RenderError> {
        let summary = procurement_summary(records);

        let mut rows = vec![
            vec!["Total Orders".to_string(), summary.total_orders.to_string()],
            vec!["Total Cost".to_string(), money(summary.total_cost)],
            vec![
                "Average Cost per Order".to_string(),
                money(summary.average_cost_per_order),
            ],
        ];
        for (status, count) in &summary.status_counts {
            rows.push(vec![format!("{status} Orders"), count.to_string()]);
        }

        let mut sections = vec![Section::Table {
            title: "Procurement Summary".into(),
            headers: ["Metric", "Value"].map(String::from).to_vec(),
            rows,
        }];

        // No orders: the summary table alone tells the story.
        if !summary.monthly_cost.is_empty() {
            sections.push(Section::Chart {
                title: "Monthly Procurement Cost".into(),
                svg: charts::monthly_cost_chart(&self.style, &summary.monthly_cost)?,
            });
        }

        Ok(sections)
    }

    fn evm_sections(&self, view: &FilteredView<'_>) -> Result<Vec<Section>, RenderError> {
        let project = project_evm(view);

        let mut sections = vec![Section::Table {
            title: "Earned Value: Project".into(),
            headers: ["SV", "CV", "SPI", "CPI"].map(String::from).to_vec(),
            rows: vec![vec![
                money(project.sv),
                money(project.cv),
                index(project.spi),
                index(project.cpi),
            ]],
        }];

        sections.push(Section::Table {
            title: "Earned Value: Tasks".into(),
            headers: ["Task", "EV", "SV", "CV", "SPI", "CPI"]
                .map(String::from)
                .to_vec(),
            rows: view
                .iter()
                .map(|t| {
                    let m = evm(t);
                    vec![
                        t.name.clone(),
                        money(m.ev),
                        money(m.sv),
                        money(m.cv),
                        index(m.spi),
                        index(m.cpi),
                    ]
                })
                .collect(),
        });

        sections.push(Section::Chart {
            title: "Performance Indices".into(),
            svg: charts::evm_index_chart(&self.style, view)?,
        });

        Ok(sections)
    }
}

/// Monetary cell formatting: sign before the symbol, two decimals
fn money(value: f64) -> String {
    if value < 0.0 {
        format!("-${:.2}", -value)
    } else {
        format!("${value:.2}")
    }
}

/// Index cell formatting
fn index(value: f64) -> String {
    format!("{value:.2}")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use projdash_core::{Dataset, OrderStatus, TaskRecord};

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn fixture() -> Dataset {
        Dataset::from_tasks(vec![
            TaskRecord::new("A", "Civil")
                .dates(date(2024, 1, 1), date(2024, 1, 31))
                .budget(100.0)
                .actual_cost(50.0)
                .percent_complete(50.0),
            TaskRecord::new("B", "Electrical")
                .dates(date(2024, 2, 1), date(2024, 2, 28))
                .budget(200.0)
                .actual_cost(250.0)
                .percent_complete(100.0),
        ])
    }

    fn section_titles(document: &Document) -> Vec<String> {
        document
            .sections
            .iter()
            .map(|s| match s {
                Section::KeyMetrics { .. } => "KeyMetrics".to_string(),
                Section::FieldList { title, .. }
                | Section::Table { title, .. }
                | Section::Chart { title, .. }
                | Section::Alerts { title, .. } => title.clone(),
                Section::ProgressTable { .. } => "ProgressTable".to_string(),
            })
            .collect()
    }

    #[test]
    fn sections_come_in_fixed_order() {
        let dataset = fixture();
        let document = ReportBuilder::new("Test")
            .risks(RiskRegister::sample())
            .build(&dataset.view_all(), date(2024, 3, 1))
            .unwrap();

        assert_eq!(
            section_titles(&document),
            vec![
                "KeyMetrics",
                "Financial Details",
                "Project Timeline",
                "ProgressTable",
                "Cost Comparison",
                "Budget Allocation",
                "Cost Variance Alerts",
                "Earned Value: Project",
                "Earned Value: Tasks",
                "Performance Indices",
                "Risk Register",
            ]
        );
    }

    #[test]
    fn empty_view_refuses_to_build() {
        let dataset = Dataset::default();
        let result = ReportBuilder::new("Test").build(&dataset.view_all(), date(2024, 3, 1));
        assert!(matches!(result, Err(RenderError::InvalidData(_))));
    }

    #[test]
    fn key_metrics_reflect_the_view() {
        let dataset = fixture();
        let document = ReportBuilder::new("Test")
            .include_evm(false)
            .build(&dataset.view_all(), date(2024, 3, 1))
            .unwrap();

        match &document.sections[0] {
            Section::KeyMetrics { summary, financial } => {
                assert_eq!(summary.total_tasks, 2);
                assert_eq!(summary.tasks_completed, 1);
                assert_eq!(financial.total_budget, 300.0);
                assert_eq!(financial.total_cost_variance, 0.0);
            }
            other => panic!("expected key metrics first, got {other:?}"),
        }
    }

    #[test]
    fn progress_table_carries_status_badges() {
        let dataset = fixture();
        let document = ReportBuilder::new("Test")
            .include_evm(false)
            .build(&dataset.view_all(), date(2024, 6, 1))
            .unwrap();

        let rows = document
            .sections
            .iter()
            .find_map(|s| match s {
                Section::ProgressTable { rows } => Some(rows),
                _ => None,
            })
            .unwrap();

        assert_eq!(rows[0].status, TaskStatus::Overdue);
        assert_eq!(rows[1].status, TaskStatus::Completed);
    }

    #[test]
    fn alerts_have_one_line_per_task() {
        let dataset = fixture();
        let document = ReportBuilder::new("Test")
            .include_evm(false)
            .build(&dataset.view_all(), date(2024, 3, 1))
            .unwrap();

        let lines = document
            .sections
            .iter()
            .find_map(|s| match s {
                Section::Alerts { lines, .. } => Some(lines),
                _ => None,
            })
            .unwrap();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("saved $50.00"));
        assert!(lines[1].contains("exceeded its budget by $50.00"));
    }

    #[test]
    fn procurement_section_is_optional_and_ordered_before_evm() {
        let dataset = fixture();
        let records = vec![ProcurementRecord {
            order_id: "PO-1".into(),
            order_date: date(2024, 1, 10),
            delivery_date: date(2024, 2, 1),
            total_cost: 1000.0,
            status: OrderStatus::Open,
        }];

        let document = ReportBuilder::new("Test")
            .procurement(records)
            .build(&dataset.view_all(), date(2024, 3, 1))
            .unwrap();

        let titles = section_titles(&document);
        let procurement = titles.iter().position(|t| t == "Procurement Summary").unwrap();
        let evm = titles.iter().position(|t| t == "Earned Value: Project").unwrap();
        assert!(procurement < evm);
        assert!(titles.contains(&"Monthly Procurement Cost".to_string()));
    }

    #[test]
    fn build_is_reproducible() {
        let dataset = fixture();
        let builder = ReportBuilder::new("Test").risks(RiskRegister::sample());
        let first = builder.build(&dataset.view_all(), date(2024, 3, 1)).unwrap();
        let second = builder.build(&dataset.view_all(), date(2024, 3, 1)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn money_formatting() {
        assert_eq!(money(50.0), "$50.00");
        assert_eq!(money(-50.0), "-$50.00");
        assert_eq!(money(0.0), "$0.00");
    }
}
