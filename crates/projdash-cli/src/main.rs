//! projdash CLI - Project Dashboard Reporting Engine
//!
//! Command-line adapter over the core: loads the tabular sources, applies
//! filters, prints summaries and writes the paginated report export. Each
//! invocation is one-shot (load, compute, print); long-lived adapters hold
//! their snapshot in a `projdash_core::Session` instead.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use projdash_core::metrics::{
    budget_variance_alert, evm, financial_summary, procurement_summary, project_evm,
    project_summary, task_status,
};
use projdash_core::{Dataset, FilterCriteria, ProcurementRecord, RiskRegister};
use projdash_loader::{load_procurement_log, load_project_overview, load_risk_register, load_tasks};
use projdash_report::{HtmlRenderer, PageMargins, PageOptions, PageSize, ReportBuilder};

#[derive(Parser)]
#[command(name = "projdash")]
#[command(author, version, about = "Project dashboard reporting engine", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct TaskSheetArg {
    /// Task sheet (required columns: Task, Start Date, End Date,
    /// Percent Complete, Category, Budget, Actual Cost)
    #[arg(long, value_name = "FILE", default_value = "project_data.csv")]
    tasks: PathBuf,
}

/// The optional sheets only feed report sections, so only `report` takes them
#[derive(Args)]
struct SourceArgs {
    #[command(flatten)]
    sheet: TaskSheetArg,

    /// Risk register sheet; the built-in sample register is used when omitted
    #[arg(long, value_name = "FILE")]
    risks: Option<PathBuf>,

    /// Procurement log sheet
    #[arg(long, value_name = "FILE")]
    procurement: Option<PathBuf>,

    /// Project overview sheet (Field/Value pairs)
    #[arg(long, value_name = "FILE")]
    overview: Option<PathBuf>,
}

#[derive(Args)]
struct FilterArgs {
    /// Restrict to a category (repeatable); default is every category
    #[arg(long = "category", value_name = "NAME")]
    categories: Vec<String>,

    /// Case-insensitive substring match on task names
    #[arg(long, value_name = "PATTERN")]
    search: Option<String>,

    /// Date-range filter: earliest task start (YYYY-MM-DD)
    #[arg(long, value_name = "DATE", requires = "to")]
    from: Option<NaiveDate>,

    /// Date-range filter: latest task end (YYYY-MM-DD)
    #[arg(long, value_name = "DATE", requires = "from")]
    to: Option<NaiveDate>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print project, financial and earned-value summaries
    Summary {
        #[command(flatten)]
        source: TaskSheetArg,

        #[command(flatten)]
        filters: FilterArgs,

        /// Machine-readable output
        #[arg(long)]
        json: bool,
    },

    /// Print per-task status and budget alerts
    Status {
        #[command(flatten)]
        source: TaskSheetArg,

        #[command(flatten)]
        filters: FilterArgs,

        /// Status date (defaults to today)
        #[arg(long, value_name = "DATE")]
        as_of: Option<NaiveDate>,
    },

    /// Build the consolidated report and write the paginated export
    Report {
        #[command(flatten)]
        sources: SourceArgs,

        #[command(flatten)]
        filters: FilterArgs,

        /// Output file path
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Report title
        #[arg(long, default_value = "Project Report")]
        title: String,

        /// Page size: letter, a4 or legal
        #[arg(long, default_value = "letter")]
        page_size: String,

        /// Uniform page margin in inches
        #[arg(long, default_value_t = 0.75)]
        margin: f64,

        /// Report date (defaults to today)
        #[arg(long, value_name = "DATE")]
        as_of: Option<NaiveDate>,

        /// Skip the earned-value section
        #[arg(long)]
        no_evm: bool,
    },
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Summary { source, filters, json } => summary(&source, &filters, json),
        Commands::Status { source, filters, as_of } => {
            status(&source, &filters, as_of.unwrap_or_else(today))
        }
        Commands::Report {
            sources,
            filters,
            output,
            title,
            page_size,
            margin,
            as_of,
            no_evm,
        } => report(
            &sources,
            &filters,
            &output,
            &title,
            &page_size,
            margin,
            as_of.unwrap_or_else(today),
            no_evm,
        ),
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Load the task sheet into an immutable snapshot
fn load_sheet(path: &Path) -> Result<Dataset> {
    let dataset = load_tasks(path)
        .with_context(|| format!("failed to load task sheet {}", path.display()))?;
    info!(tasks = dataset.len(), path = %path.display(), "task sheet loaded");
    Ok(dataset)
}

/// Build filter criteria from flags. No --category flag selects every
/// category; the empty "match nothing" selection is a library-level state
/// the CLI never produces on its own.
fn criteria(dataset: &Dataset, filters: &FilterArgs) -> FilterCriteria {
    let mut criteria = if filters.categories.is_empty() {
        FilterCriteria::for_dataset(dataset)
    } else {
        let mut c = FilterCriteria::new();
        for category in &filters.categories {
            c = c.category(category.clone());
        }
        c
    };
    if let Some(pattern) = &filters.search {
        criteria = criteria.search(pattern.clone());
    }
    if let (Some(from), Some(to)) = (filters.from, filters.to) {
        criteria = criteria.between(from, to);
    }
    criteria
}

fn summary(source: &TaskSheetArg, filters: &FilterArgs, json: bool) -> Result<()> {
    let dataset = load_sheet(&source.tasks)?;
    let view = dataset.filter(&criteria(&dataset, filters));

    let progress = project_summary(&view);
    let totals = financial_summary(&view);
    let earned = project_evm(&view);

    if json {
        let payload = serde_json::json!({
            "tasks": {
                "total": progress.total_tasks,
                "completed": progress.tasks_completed,
                "overall_progress": progress.overall_progress,
            },
            "financial": {
                "total_budget": totals.total_budget,
                "total_actual_cost": totals.total_actual_cost,
                "total_cost_variance": totals.total_cost_variance,
            },
            "evm": {
                "sv": earned.sv,
                "cv": earned.cv,
                "spi": earned.spi,
                "cpi": earned.cpi,
            },
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!("Tasks:        {} total, {} completed", progress.total_tasks, progress.tasks_completed);
    println!("Progress:     {:.1}%", progress.overall_progress * 100.0);
    println!("Budget:       ${:.2}", totals.total_budget);
    println!("Actual Cost:  ${:.2}", totals.total_actual_cost);
    println!("Variance:     ${:.2}", totals.total_cost_variance);
    println!("SPI: {:.2}  CPI: {:.2}  SV: ${:.2}  CV: ${:.2}", earned.spi, earned.cpi, earned.sv, earned.cv);
    Ok(())
}

fn status(source: &TaskSheetArg, filters: &FilterArgs, as_of: NaiveDate) -> Result<()> {
    let dataset = load_sheet(&source.tasks)?;
    let view = dataset.filter(&criteria(&dataset, filters));

    if view.is_empty() {
        println!("No tasks match the current filters.");
        return Ok(());
    }

    println!("Status as of {as_of}:");
    for task in view.iter() {
        let metrics = evm(task);
        println!(
            "  {:<30} {:>5.1}%  {:<11} SPI {:.2}  CPI {:.2}",
            task.name,
            task.percent_complete,
            task_status(task, as_of).to_string(),
            metrics.spi,
            metrics.cpi,
        );
        println!("    {}", budget_variance_alert(task).message(&task.name));
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn report(
    sources: &SourceArgs,
    filters: &FilterArgs,
    output: &std::path::Path,
    title: &str,
    page_size: &str,
    margin: f64,
    as_of: NaiveDate,
    no_evm: bool,
) -> Result<()> {
    let dataset = load_sheet(&sources.sheet.tasks)?;
    let view = dataset.filter(&criteria(&dataset, filters));

    let mut builder = ReportBuilder::new(title).include_evm(!no_evm);

    builder = match &sources.risks {
        Some(path) => builder.risks(
            load_risk_register(path)
                .with_context(|| format!("failed to load risk register {}", path.display()))?,
        ),
        None => builder.risks(RiskRegister::sample()),
    };

    if let Some(path) = &sources.procurement {
        let records: Vec<ProcurementRecord> = load_procurement_log(path)
            .with_context(|| format!("failed to load procurement log {}", path.display()))?;
        let totals = procurement_summary(&records);
        info!(orders = totals.total_orders, cost = totals.total_cost, "procurement log loaded");
        builder = builder.procurement(records);
    }

    if let Some(path) = &sources.overview {
        builder = builder.overview(
            load_project_overview(path)
                .with_context(|| format!("failed to load project overview {}", path.display()))?,
        );
    }

    let page_size = PageSize::parse(page_size)
        .with_context(|| format!("unknown page size '{page_size}' (letter, a4 or legal)"))?;
    let renderer = HtmlRenderer::new(PageOptions {
        page_size,
        margins: PageMargins::uniform(margin),
        encoding: "UTF-8".into(),
    });

    if view.len() < dataset.len() {
        warn!(
            selected = view.len(),
            total = dataset.len(),
            "report covers a filtered subset"
        );
    }

    let document = builder.build(&view, as_of).context("failed to assemble report")?;
    let bytes = renderer.render(&document).context("failed to render report")?;
    std::fs::write(output, &bytes)
        .with_context(|| format!("failed to write {}", output.display()))?;

    info!(path = %output.display(), bytes = bytes.len(), "report written");
    println!("Report written to {}", output.display());
    Ok(())
}
