//! SVG chart builders for report sections.
//!
//! Charts are produced as standalone SVG strings embedded into the report
//! document. Output is deterministic: the same inputs always serialize to
//! the same markup, so report bytes stay reproducible. The rendering backend
//! may change how the markup looks on screen, never what data it encodes.

use chrono::NaiveDate;
use svg::node::element::{Circle, Group, Line, Path, Rectangle, Text};
use svg::Document;

use projdash_core::metrics::evm;
use projdash_core::{FilteredView, RenderError};

/// Category color palette, assigned in first-seen order
const PALETTE: &[&str] = &[
    "#3498db", "#e67e22", "#2ecc71", "#9b59b6", "#e74c3c", "#1abc9c", "#f1c40f", "#34495e",
];

const BUDGET_COLOR: &str = "#3498db";
const ACTUAL_COLOR: &str = "#e67e22";
const SPI_COLOR: &str = "#2980b9";
const CPI_COLOR: &str = "#27ae60";

/// Shared chart geometry and styling
#[derive(Clone, Debug)]
pub struct ChartStyle {
    /// Width of the plot area (excluding labels) in pixels
    pub chart_width: u32,
    /// Height per row/bar group in pixels
    pub row_height: u32,
    /// Width of the label column in pixels
    pub label_width: u32,
    /// Padding around the chart
    pub padding: u32,
    /// Background color
    pub background_color: String,
    /// Grid line color
    pub grid_color: String,
    /// Text color
    pub text_color: String,
    /// Font family
    pub font_family: String,
    /// Font size in pixels
    pub font_size: u32,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            chart_width: 640,
            row_height: 26,
            label_width: 160,
            padding: 16,
            background_color: "#ffffff".into(),
            grid_color: "#ecf0f1".into(),
            text_color: "#2c3e50".into(),
            font_family: "system-ui, -apple-system, sans-serif".into(),
            font_size: 12,
        }
    }
}

impl ChartStyle {
    fn total_width(&self) -> u32 {
        self.padding * 2 + self.label_width + self.chart_width
    }

    fn total_height(&self, rows: usize) -> u32 {
        self.padding * 2 + rows as u32 * self.row_height
    }

    fn pixels_per_day(&self, start: NaiveDate, end: NaiveDate) -> f64 {
        let days = (end - start).num_days().max(1) as f64;
        self.chart_width as f64 / days
    }

    fn date_to_x(&self, date: NaiveDate, origin: NaiveDate, px_per_day: f64) -> f64 {
        let days = (date - origin).num_days() as f64;
        self.padding as f64 + self.label_width as f64 + days * px_per_day
    }

    fn label(&self, text: &str, x: f64, y: f64) -> Text {
        Text::new(truncate(text, 22))
            .set("x", x)
            .set("y", y)
            .set("font-family", self.font_family.as_str())
            .set("font-size", self.font_size)
            .set("fill", self.text_color.as_str())
    }

    fn canvas(&self, rows: usize) -> Document {
        let background = Rectangle::new()
            .set("x", 0)
            .set("y", 0)
            .set("width", self.total_width())
            .set("height", self.total_height(rows))
            .set("fill", self.background_color.as_str());
        Document::new()
            .set("width", self.total_width())
            .set("height", self.total_height(rows))
            .set(
                "viewBox",
                (0u32, 0u32, self.total_width(), self.total_height(rows)),
            )
            .add(background)
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

fn require_rows(len: usize, chart: &str) -> Result<(), RenderError> {
    if len == 0 {
        return Err(RenderError::InvalidData(format!(
            "{chart}: no rows to plot"
        )));
    }
    Ok(())
}

/// Color for a category by its position in the dataset's category order
fn category_color(categories: &[String], category: &str) -> &'static str {
    let index = categories
        .iter()
        .position(|c| c == category)
        .unwrap_or(0);
    PALETTE[index % PALETTE.len()]
}

// ============================================================================
// Gantt timeline
// ============================================================================

/// Project timeline: one bar per task spanning start..end, colored by category
pub fn gantt_chart(style: &ChartStyle, view: &FilteredView<'_>) -> Result<String, RenderError> {
    require_rows(view.len(), "gantt chart")?;

    let origin = view
        .iter()
        .map(|t| t.start)
        .min()
        .ok_or_else(|| RenderError::InvalidData("gantt chart: no start dates".into()))?;
    let horizon = view
        .iter()
        .map(|t| t.end)
        .max()
        .ok_or_else(|| RenderError::InvalidData("gantt chart: no end dates".into()))?;
    let px_per_day = style.pixels_per_day(origin, horizon);
    let categories = view.dataset().categories();

    let mut document = style.canvas(view.len());
    for (row, task) in view.iter().enumerate() {
        let y = style.padding + row as u32 * style.row_height;
        let bar_height = (style.row_height as f64 * 0.6) as u32;
        let bar_y = y + (style.row_height - bar_height) / 2;

        let mut group = Group::new().set("class", "task");
        group = group.add(style.label(
            &task.name,
            (style.padding + 4) as f64,
            (y + style.row_height / 2 + 4) as f64,
        ));

        let x_start = style.date_to_x(task.start, origin, px_per_day);
        let x_end = style.date_to_x(task.end, origin, px_per_day);
        let bar = Rectangle::new()
            .set("x", x_start)
            .set("y", bar_y)
            .set("width", (x_end - x_start).max(4.0))
            .set("height", bar_height)
            .set("rx", 3)
            .set("ry", 3)
            .set("fill", category_color(&categories, &task.category));
        group = group.add(bar);

        document = document.add(group);
    }

    Ok(document.to_string())
}

// ============================================================================
// Grouped bars: budget vs actual cost
// ============================================================================

/// Cost comparison: budget and actual-cost bars side by side per task
pub fn cost_comparison_chart(
    style: &ChartStyle,
    view: &FilteredView<'_>,
) -> Result<String, RenderError> {
    require_rows(view.len(), "cost comparison chart")?;

    let max_value = view
        .iter()
        .map(|t| t.budget.max(t.actual_cost))
        .fold(0.0f64, f64::max)
        .max(1.0);

    let mut document = style.canvas(view.len());
    for (row, task) in view.iter().enumerate() {
        let y = style.padding + row as u32 * style.row_height;
        let half = (style.row_height as f64 * 0.36) as u32;
        let x0 = (style.padding + style.label_width) as f64;
        let scale = style.chart_width as f64 / max_value;

        let mut group = Group::new().set("class", "cost-pair");
        group = group.add(style.label(
            &task.name,
            (style.padding + 4) as f64,
            (y + style.row_height / 2 + 4) as f64,
        ));
        group = group.add(
            Rectangle::new()
                .set("x", x0)
                .set("y", y + 2)
                .set("width", (task.budget * scale).max(1.0))
                .set("height", half)
                .set("fill", BUDGET_COLOR),
        );
        group = group.add(
            Rectangle::new()
                .set("x", x0)
                .set("y", y + 2 + half + 2)
                .set("width", (task.actual_cost * scale).max(1.0))
                .set("height", half)
                .set("fill", ACTUAL_COLOR),
        );

        document = document.add(group);
    }

    Ok(document.to_string())
}

// ============================================================================
// Pie: budget allocation by category
// ============================================================================

/// Budget allocation pie: one slice per category, weighted by summed budget
pub fn budget_allocation_chart(
    style: &ChartStyle,
    view: &FilteredView<'_>,
) -> Result<String, RenderError> {
    require_rows(view.len(), "budget allocation chart")?;

    let categories = view.dataset().categories();
    let mut totals: Vec<(String, f64)> = Vec::new();
    for category in &categories {
        let total: f64 = view
            .iter()
            .filter(|t| &t.category == category)
            .map(|t| t.budget)
            .sum();
        if total > 0.0 {
            totals.push((category.clone(), total));
        }
    }
    let grand_total: f64 = totals.iter().map(|(_, v)| v).sum();

    let size = 300.0;
    let cx = size / 2.0;
    let cy = size / 2.0;
    let radius = size / 2.0 - style.padding as f64;
    let legend_width = style.label_width;

    let mut document = Document::new()
        .set("width", size as u32 + legend_width)
        .set("height", size as u32)
        .set("viewBox", (0u32, 0u32, size as u32 + legend_width, size as u32))
        .add(
            Rectangle::new()
                .set("x", 0)
                .set("y", 0)
                .set("width", size as u32 + legend_width)
                .set("height", size as u32)
                .set("fill", style.background_color.as_str()),
        );

    // All-zero budgets are valid input; the pie just has nothing to slice.
    if grand_total <= 0.0 {
        document = document.add(style.label("No budget allocated", cx - 60.0, cy));
        return Ok(document.to_string());
    }

    // Slices start at 12 o'clock and run clockwise.
    let mut angle = -std::f64::consts::FRAC_PI_2;
    for (i, (category, total)) in totals.iter().enumerate() {
        let sweep = total / grand_total * std::f64::consts::TAU;
        let end = angle + sweep;
        let (x1, y1) = (cx + radius * angle.cos(), cy + radius * angle.sin());
        let (x2, y2) = (cx + radius * end.cos(), cy + radius * end.sin());
        let large_arc = i32::from(sweep > std::f64::consts::PI);

        let slice = if totals.len() == 1 {
            // A single category is a full disc; an arc with coincident
            // endpoints would collapse to nothing.
            Path::new().set(
                "d",
                format!(
                    "M{cx:.2},{top:.2} A{radius:.2},{radius:.2} 0 1 1 {cx:.2},{bottom:.2} \
                     A{radius:.2},{radius:.2} 0 1 1 {cx:.2},{top:.2} Z",
                    top = cy - radius,
                    bottom = cy + radius,
                ),
            )
        } else {
            Path::new().set(
                "d",
                format!(
                    "M{cx:.2},{cy:.2} L{x1:.2},{y1:.2} \
                     A{radius:.2},{radius:.2} 0 {large_arc} 1 {x2:.2},{y2:.2} Z"
                ),
            )
        };
        document = document.add(
            slice
                .set("fill", category_color(&categories, category))
                .set("stroke", style.background_color.as_str())
                .set("stroke-width", 1),
        );

        // Legend swatch and label
        let ly = style.padding as f64 + i as f64 * style.row_height as f64;
        document = document.add(
            Rectangle::new()
                .set("x", size + 4.0)
                .set("y", ly)
                .set("width", 10)
                .set("height", 10)
                .set("fill", category_color(&categories, category)),
        );
        document = document.add(style.label(category, size + 20.0, ly + 9.0));

        angle = end;
    }

    Ok(document.to_string())
}

// ============================================================================
// Line: monthly cost series
// ============================================================================

/// Monthly cost line chart for the procurement summary.
///
/// `series` is the ordered ("YYYY-MM", total) list from
/// [`projdash_core::metrics::procurement_summary`].
pub fn monthly_cost_chart(
    style: &ChartStyle,
    series: &[(String, f64)],
) -> Result<String, RenderError> {
    require_rows(series.len(), "monthly cost chart")?;

    let max_value = series.iter().map(|(_, v)| *v).fold(0.0f64, f64::max).max(1.0);
    let rows = 8usize; // fixed plot height in row units
    let plot_height = rows as f64 * style.row_height as f64;
    let x0 = (style.padding + style.label_width) as f64;
    let y0 = style.padding as f64;
    let step = if series.len() > 1 {
        style.chart_width as f64 / (series.len() - 1) as f64
    } else {
        0.0
    };

    let point = |i: usize, value: f64| {
        let x = x0 + i as f64 * step;
        let y = y0 + plot_height - value / max_value * plot_height;
        (x, y)
    };

    let mut document = style.canvas(rows + 1);

    // Baseline
    document = document.add(
        Line::new()
            .set("x1", x0)
            .set("y1", y0 + plot_height)
            .set("x2", x0 + style.chart_width as f64)
            .set("y2", y0 + plot_height)
            .set("stroke", style.grid_color.as_str())
            .set("stroke-width", 1),
    );

    let mut data = String::new();
    for (i, (_, value)) in series.iter().enumerate() {
        let (x, y) = point(i, *value);
        let op = if i == 0 { 'M' } else { 'L' };
        data.push_str(&format!("{op}{x:.2},{y:.2} "));
    }
    document = document.add(
        Path::new()
            .set("d", data.trim_end())
            .set("fill", "none")
            .set("stroke", BUDGET_COLOR)
            .set("stroke-width", 2),
    );

    for (i, (month, value)) in series.iter().enumerate() {
        let (x, y) = point(i, *value);
        document = document.add(
            Circle::new()
                .set("cx", x)
                .set("cy", y)
                .set("r", 3)
                .set("fill", BUDGET_COLOR),
        );
        document = document.add(style.label(month, x - 20.0, y0 + plot_height + 16.0));
    }

    Ok(document.to_string())
}

// ============================================================================
// EVM index chart
// ============================================================================

/// Per-task SPI/CPI bars with a reference line at 1.0
pub fn evm_index_chart(style: &ChartStyle, view: &FilteredView<'_>) -> Result<String, RenderError> {
    require_rows(view.len(), "evm index chart")?;

    let max_index = view
        .iter()
        .map(|t| {
            let m = evm(t);
            m.spi.max(m.cpi)
        })
        .fold(0.0f64, f64::max)
        .max(1.0);

    let x0 = (style.padding + style.label_width) as f64;
    let scale = style.chart_width as f64 / max_index;

    let mut document = style.canvas(view.len());

    // Reference line where an index reads exactly 1.0
    let x_one = x0 + scale;
    document = document.add(
        Line::new()
            .set("x1", x_one)
            .set("y1", style.padding)
            .set("x2", x_one)
            .set("y2", style.total_height(view.len()) - style.padding)
            .set("stroke", style.grid_color.as_str())
            .set("stroke-width", 1)
            .set("stroke-dasharray", "4 3"),
    );

    for (row, task) in view.iter().enumerate() {
        let metrics = evm(task);
        let y = style.padding + row as u32 * style.row_height;
        let half = (style.row_height as f64 * 0.36) as u32;

        let mut group = Group::new().set("class", "evm-pair");
        group = group.add(style.label(
            &task.name,
            (style.padding + 4) as f64,
            (y + style.row_height / 2 + 4) as f64,
        ));
        group = group.add(
            Rectangle::new()
                .set("x", x0)
                .set("y", y + 2)
                .set("width", (metrics.spi * scale).max(1.0))
                .set("height", half)
                .set("fill", SPI_COLOR),
        );
        group = group.add(
            Rectangle::new()
                .set("x", x0)
                .set("y", y + 2 + half + 2)
                .set("width", (metrics.cpi * scale).max(1.0))
                .set("height", half)
                .set("fill", CPI_COLOR),
        );

        document = document.add(group);
    }

    Ok(document.to_string())
}

// ============================================================================
// Tests
// ============================================================================
