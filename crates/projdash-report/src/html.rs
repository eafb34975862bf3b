//! Paginated HTML serializer.
//!
//! Turns a [`Document`](crate::Document) into UTF-8 export bytes with
//! `@page` CSS carrying the page size and margins, the shape a
//! print-to-PDF collaborator consumes. Serialization reads nothing but the
//! document and options, so identical inputs give byte-identical output.

use projdash_core::RenderError;
use serde::{Deserialize, Serialize};

use crate::{Document, Section};

/// Page size for the paginated export
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    Letter,
    A4,
    Legal,
}

impl PageSize {
    /// CSS `@page size` keyword
    pub fn as_css(&self) -> &'static str {
        match self {
            PageSize::Letter => "Letter",
            PageSize::A4 => "A4",
            PageSize::Legal => "Legal",
        }
    }

    /// Parse a size name (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "letter" => Some(PageSize::Letter),
            "a4" => Some(PageSize::A4),
            "legal" => Some(PageSize::Legal),
            _ => None,
        }
    }
}

/// Page margins in inches
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PageMargins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl PageMargins {
    /// The same margin on all four sides
    pub fn uniform(inches: f64) -> Self {
        Self {
            top: inches,
            right: inches,
            bottom: inches,
            left: inches,
        }
    }
}

impl Default for PageMargins {
    fn default() -> Self {
        Self::uniform(0.75)
    }
}

/// Export options: Letter, 0.75in margins, UTF-8 unless overridden
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PageOptions {
    pub page_size: PageSize,
    pub margins: PageMargins,
    pub encoding: String,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            page_size: PageSize::default(),
            margins: PageMargins::default(),
            encoding: "UTF-8".into(),
        }
    }
}

/// Serializes a report document to paginated HTML bytes
#[derive(Clone, Debug, Default)]
pub struct HtmlRenderer {
    pub options: PageOptions,
}

impl HtmlRenderer {
    pub fn new(options: PageOptions) -> Self {
        Self { options }
    }

    /// Render the document. The only supported text encoding is UTF-8;
    /// anything else is refused rather than emitted mislabeled.
    pub fn render(&self, document: &Document) -> Result<Vec<u8>, RenderError> {
        if !self.options.encoding.eq_ignore_ascii_case("utf-8") {
            return Err(RenderError::InvalidData(format!(
                "unsupported encoding '{}'",
                self.options.encoding
            )));
        }

        let mut out = String::with_capacity(16 * 1024);
        self.write_head(&mut out, document);
        for section in &document.sections {
            self.write_section(&mut out, section);
        }
        out.push_str("</body>\n</html>\n");
        Ok(out.into_bytes())
    }

    fn write_head(&self, out: &mut String, document: &Document) {
        let margins = &self.options.margins;
        out.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
        out.push_str(&format!(
            "<meta charset=\"{}\">\n",
            self.options.encoding.to_uppercase()
        ));
        out.push_str(&format!(
            "<title>Project Report - {}</title>\n",
            escape(&document.title)
        ));
        out.push_str("<style>\n");
        out.push_str(&format!(
            "@page {{ size: {}; margin: {:.2}in {:.2}in {:.2}in {:.2}in; }}\n",
            self.options.page_size.as_css(),
            margins.top,
            margins.right,
            margins.bottom,
            margins.left,
        ));
        out.push_str(concat!(
            "body { font-family: sans-serif; color: #333; }\n",
            "h1, h2 { color: #007bff; }\n",
            "table { border-collapse: collapse; width: 100%; }\n",
            "th, td { border: 1px solid #ccc; padding: 8px; }\n",
            "th { background-color: #f0f0f0; }\n",
            "section { page-break-inside: avoid; }\n",
            ".progress { background: #eee; width: 200px; height: 12px; }\n",
            ".progress > div { background: #007bff; height: 12px; }\n",
            ".alert { padding: 4px 8px; margin: 2px 0; background: #f8f9fa; }\n",
            "dt { font-weight: bold; }\n",
        ));
        out.push_str("</style>\n</head>\n<body>\n");
        out.push_str(&format!(
            "<h1>Project Report - {}</h1>\n",
            escape(&document.title)
        ));
        out.push_str(&format!(
            "<p class=\"generated\">Generated {}</p>\n",
            document.generated_on.format("%Y-%m-%d")
        ));
    }

    fn write_section(&self, out: &mut String, section: &Section) {
        out.push_str("<section>\n");
        match section {
            Section::KeyMetrics { summary, financial } => {
                out.push_str("<h2>Key Metrics</h2>\n<dl>\n");
                metric(out, "Total Tasks", &summary.total_tasks.to_string());
                metric(out, "Tasks Completed", &summary.tasks_completed.to_string());
                metric(
                    out,
                    "Overall Progress",
                    &format!("{:.1}%", summary.overall_progress * 100.0),
                );
                metric(out, "Total Budget", &dollars(financial.total_budget));
                metric(out, "Total Actual Cost", &dollars(financial.total_actual_cost));
                metric(
                    out,
                    "Total Cost Variance",
                    &dollars(financial.total_cost_variance),
                );
                out.push_str("</dl>\n");
            }
            Section::FieldList { title, fields } => {
                out.push_str(&format!("<h2>{}</h2>\n<dl>\n", escape(title)));
                for (field, value) in fields {
                    metric(out, field, value);
                }
                out.push_str("</dl>\n");
            }
            Section::Table { title, headers, rows } => {
                out.push_str(&format!("<h2>{}</h2>\n<table>\n<tr>", escape(title)));
                for header in headers {
                    out.push_str(&format!("<th>{}</th>", escape(header)));
                }
                out.push_str("</tr>\n");
                for row in rows {
                    out.push_str("<tr>");
                    for cell in row {
                        out.push_str(&format!("<td>{}</td>", escape(cell)));
                    }
                    out.push_str("</tr>\n");
                }
                out.push_str("</table>\n");
            }
            Section::Chart { title, svg } => {
                out.push_str(&format!("<h2>{}</h2>\n", escape(title)));
                // SVG markup is embedded as-is; it comes from our chart
                // builders, not from user input.
                out.push_str(svg);
                out.push('\n');
            }
            Section::ProgressTable { rows } => {
                out.push_str("<h2>Task Progress</h2>\n<table>\n");
                out.push_str("<tr><th>Task</th><th>Progress</th><th>%</th><th>Status</th></tr>\n");
                for row in rows {
                    let width = row.percent_complete.clamp(0.0, 100.0);
                    out.push_str(&format!(
                        "<tr><td>{}</td>\
                         <td><div class=\"progress\"><div style=\"width: {width:.1}%\"></div></div></td>\
                         <td>{:.1}%</td><td>{}</td></tr>\n",
                        escape(&row.task),
                        row.percent_complete,
                        row.status,
                    ));
                }
                out.push_str("</table>\n");
            }
            Section::Alerts { title, lines } => {
                out.push_str(&format!("<h2>{}</h2>\n", escape(title)));
                for line in lines {
                    out.push_str(&format!("<p class=\"alert\">{}</p>\n", escape(line)));
                }
            }
        }
        out.push_str("</section>\n");
    }
}

fn metric(out: &mut String, name: &str, value: &str) {
    out.push_str(&format!(
        "<dt>{}</dt><dd>{}</dd>\n",
        escape(name),
        escape(value)
    ));
}

fn dollars(value: f64) -> String {
    if value < 0.0 {
        format!("-${:.2}", -value)
    } else {
        format!("${value:.2}")
    }
}

/// Minimal HTML escaping for text content and attribute values
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// ============================================================================
// Tests
// ============================================================================
