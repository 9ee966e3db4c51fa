//! HTML rendering of record tables and standalone reports.
//!
//! Every piece of record text is escaped before it is placed in markup.
//! List cells show at most [`INLINE_ITEMS`] entries inline; longer lists
//! get a `<details>` disclosure listing every entry with its true count.

use std::fmt::Write as _;

use chrono::{DateTime, Local};

use crate::domain::{
    format_bmi, format_feedback, format_risks, FilterState, ListField, Record, Role,
};
use crate::ports::ChartSpec;

/// Number of list entries shown before the disclosure.
pub const INLINE_ITEMS: usize = 3;

/// Placeholder for an empty list cell.
const EMPTY_LIST: &str = "None";

/// Escape `& < > " '` for use in HTML text and attribute positions.
#[must_use]
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
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

/// A table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    /// Positional row number
    Index,
    Patient,
    Bmi,
    List(ListField),
    Feedback,
    Risks,
    AiExplanation,
}

impl Column {
    #[must_use]
    pub fn header(&self) -> &'static str {
        match self {
            Self::Index => "#",
            Self::Patient => "Patient",
            Self::Bmi => "BMI",
            Self::List(field) => field.label(),
            Self::Feedback => "Feedback",
            Self::Risks => "Risks",
            Self::AiExplanation => "AI Explanation",
        }
    }
}

/// Column set of a role's table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLayout {
    pub columns: Vec<Column>,
}

impl TableLayout {
    #[must_use]
    pub fn for_role(role: Role) -> Self {
        let columns = match role {
            Role::Clinician => vec![
                Column::Patient,
                Column::Bmi,
                Column::List(ListField::Diet),
                Column::List(ListField::Exercise),
                Column::List(ListField::General),
                Column::Feedback,
                Column::Risks,
                Column::AiExplanation,
            ],
            Role::Patient => vec![
                Column::Index,
                Column::Bmi,
                Column::List(ListField::Diet),
                Column::List(ListField::Exercise),
                Column::List(ListField::General),
                Column::Risks,
            ],
        };
        Self { columns }
    }
}

/// Plain-text value of a non-list cell.
#[must_use]
pub fn cell_text(column: Column, index: usize, record: &Record) -> String {
    match column {
        Column::Index => format!("{}", index + 1),
        Column::Patient => record.display_name().to_string(),
        Column::Bmi => format_bmi(record.bmi),
        Column::List(field) => {
            let items = record.list(field);
            if items.is_empty() {
                EMPTY_LIST.to_string()
            } else {
                items.join(", ")
            }
        }
        Column::Feedback => format_feedback(record.feedback),
        Column::Risks => format_risks(&record.derived_risks()),
        Column::AiExplanation => record
            .ai_explanation
            .clone()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "N/A".to_string()),
    }
}

fn render_list_cell(items: &[String]) -> String {
    if items.is_empty() {
        return EMPTY_LIST.to_string();
    }

    let mut out = String::from("<ul class=\"inline-list\">");
    for item in items.iter().take(INLINE_ITEMS) {
        let _ = write!(out, "<li>{}</li>", escape_html(item));
    }
    out.push_str("</ul>");

    if items.len() > INLINE_ITEMS {
        let _ = write!(
            out,
            "<details class=\"disclosure\"><summary>Show all ({})</summary><ul>",
            items.len()
        );
        for item in items {
            let _ = write!(out, "<li>{}</li>", escape_html(item));
        }
        out.push_str("</ul></details>");
    }

    out
}

/// Render `records` as an HTML table using `layout`.
///
/// Output depends only on the input, so identical input renders
/// identical markup.
#[must_use]
pub fn render_table(records: &[Record], layout: &TableLayout) -> String {
    let mut out = String::from("<table class=\"records\">\n<thead><tr>");
    for column in &layout.columns {
        let _ = write!(out, "<th>{}</th>", column.header());
    }
    out.push_str("</tr></thead>\n<tbody>\n");

    for (index, record) in records.iter().enumerate() {
        out.push_str("<tr>");
        for &column in &layout.columns {
            let cell = match column {
                Column::List(field) => render_list_cell(record.list(field)),
                _ => escape_html(&cell_text(column, index, record)),
            };
            let _ = write!(out, "<td>{cell}</td>");
        }
        out.push_str("</tr>\n");
    }

    out.push_str("</tbody>\n</table>");
    out
}

/// Inputs of a standalone report page.
pub struct Report<'a> {
    pub role: Role,
    pub viewer: &'a str,
    pub filter: &'a FilterState,
    pub records: &'a [Record],
    /// `(canvas id, spec)` pairs
    pub charts: Vec<(&'a str, ChartSpec)>,
    pub generated_at: DateTime<Local>,
}

/// Render a standalone HTML page with the table and Chart.js configurations.
#[must_use]
pub fn render_report(report: &Report<'_>) -> String {
    let mut out = String::from("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(
        out,
        "<title>{} Dashboard Report</title>",
        report.role
    );
    out.push_str("<script src=\"https://cdn.jsdelivr.net/npm/chart.js\"></script>\n</head>\n<body>\n");

    let _ = writeln!(out, "<h1>{} Dashboard Report</h1>", report.role);
    let _ = writeln!(
        out,
        "<p class=\"meta\">{} &middot; generated {}</p>",
        escape_html(report.viewer),
        report.generated_at.format("%Y-%m-%d %H:%M:%S")
    );
    if report.role == Role::Clinician {
        let _ = writeln!(
            out,
            "<p class=\"filters\">{}</p>",
            escape_html(&report.filter.summary())
        );
    }

    out.push_str(&render_table(report.records, &TableLayout::for_role(report.role)));
    out.push('\n');

    for (canvas, spec) in &report.charts {
        let id = escape_html(canvas);
        let _ = writeln!(out, "<canvas id=\"{id}\"></canvas>");
        // `</` inside a script block would end it early
        let config = spec.to_chartjs().to_string().replace("</", "<\\/");
        let _ = writeln!(
            out,
            "<script>new Chart(document.getElementById(\"{id}\"), {config});</script>"
        );
    }

    out.push_str("</body>\n</html>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::charts::bmi_line_spec;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn sample() -> Vec<Record> {
        vec![
            Record {
                name: Some("Ana <b>".to_string()),
                bmi: Some(31.456),
                diet: strings(&["Oats", "Lentils", "Greens", "Berries", "Nuts"]),
                exercise: strings(&["Walk 30 min"]),
                general: vec![],
                feedback: Some(2.0),
                risks: vec![],
                ai_explanation: Some("Low \"sugar\" & fibre's fine".to_string()),
            },
            Record {
                name: None,
                bmi: None,
                feedback: None,
                ..Default::default()
            },
        ]
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_render_is_deterministic() {
        let layout = TableLayout::for_role(Role::Clinician);
        let records = sample();
        assert_eq!(render_table(&records, &layout), render_table(&records, &layout));
    }

    #[test]
    fn test_field_content_is_escaped() {
        let records = vec![Record {
            name: Some("<script>alert('x')</script>".to_string()),
            diet: strings(&["a & b", "\"quoted\""]),
            ai_explanation: Some("x > y".to_string()),
            ..Default::default()
        }];
        let html = render_table(&records, &TableLayout::for_role(Role::Clinician));

        assert!(!html.contains("<script>"));
        assert!(!html.contains("'x'"));
        assert!(!html.contains("a & b"));
        assert!(!html.contains("\"quoted\""));
        assert!(!html.contains("x > y"));
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
    }

    #[test]
    fn test_long_list_shows_three_inline_and_full_disclosure() {
        let html = render_list_cell(&strings(&["a", "b", "c", "d", "e"]));
        let (inline, disclosure) = html.split_once("<details").expect("Has disclosure");

        assert_eq!(inline.matches("<li>").count(), 3);
        assert!(disclosure.contains("Show all (5)"));
        assert_eq!(disclosure.matches("<li>").count(), 5);
    }

    #[test]
    fn test_short_list_has_no_disclosure() {
        let html = render_list_cell(&strings(&["a", "b", "c"]));
        assert_eq!(html.matches("<li>").count(), 3);
        assert!(!html.contains("<details"));
        assert_eq!(render_list_cell(&[]), "None");
    }

    #[test]
    fn test_cell_formatting() {
        let records = sample();
        assert_eq!(cell_text(Column::Bmi, 0, &records[0]), "31.46");
        assert_eq!(cell_text(Column::Feedback, 0, &records[0]), "2.0/5");
        assert_eq!(
            cell_text(Column::Risks, 0, &records[0]),
            "High BMI, Low Feedback"
        );
        assert_eq!(cell_text(Column::Bmi, 1, &records[1]), "N/A");
        assert_eq!(cell_text(Column::Feedback, 1, &records[1]), "N/A");
        assert_eq!(cell_text(Column::Risks, 1, &records[1]), "None");
        assert_eq!(cell_text(Column::Index, 1, &records[1]), "2");
    }

    #[test]
    fn test_patient_layout_hides_clinician_columns() {
        let html = render_table(&sample(), &TableLayout::for_role(Role::Patient));
        assert!(!html.contains("<th>Feedback</th>"));
        assert!(!html.contains("<th>AI Explanation</th>"));
        assert!(html.contains("<th>#</th>"));
    }

    #[test]
    fn test_report_embeds_table_and_chart_configs() {
        let records = sample();
        let filter = FilterState::default();
        let report = Report {
            role: Role::Clinician,
            viewer: "Dr. O'Neil",
            filter: &filter,
            records: &records,
            charts: vec![("bmiChart", bmi_line_spec(&records))],
            generated_at: Local::now(),
        };

        let html = render_report(&report);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("Dr. O&#39;Neil"));
        assert!(html.contains("<canvas id=\"bmiChart\"></canvas>"));
        assert!(html.contains("\"type\":\"line\""));
        assert!(html.contains("BMI: All | Feedback: All"));
    }
}
