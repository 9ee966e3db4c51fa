//! Dashboard view: record table, filters, status banner and charts.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    symbols,
    text::{Line, Span},
    widgets::{
        Axis, Bar, BarChart, BarGroup, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph,
        Row, Table, TableState, Wrap,
    },
    Frame,
};

use crate::adapters::RetainedCharts;
use crate::application::charts::{BMI_CANVAS, FEEDBACK_CANVAS, TREND_CANVAS};
use crate::application::render::{cell_text, Column, TableLayout, INLINE_ITEMS};
use crate::application::DashboardController;
use crate::domain::{ListField, Record, Role};
use crate::ports::{ChartKind, ChartSpec};
use crate::tui::styles::DietTheme;

use super::render_footer;

/// Selection and disclosure state of the record table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardView {
    pub selected: usize,
    /// Whether the selected row's lists are shown in full
    pub expanded: bool,
}

impl DashboardView {
    pub fn select_next(&mut self, len: usize) {
        if len > 0 {
            self.selected = (self.selected + 1).min(len - 1);
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Keep the selection inside a table of `len` rows.
    pub fn clamp(&mut self, len: usize) {
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
            self.expanded = false;
        }
    }
}

/// At most [`INLINE_ITEMS`] items, with a "+N more" marker for the rest.
#[must_use]
pub fn inline_list(items: &[String]) -> String {
    if items.is_empty() {
        return "None".to_string();
    }

    let shown = items
        .iter()
        .take(INLINE_ITEMS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if items.len() > INLINE_ITEMS {
        format!("{shown} (+{} more)", items.len() - INLINE_ITEMS)
    } else {
        shown
    }
}

/// Render the dashboard screen
pub fn render_dashboard(
    f: &mut Frame,
    area: Rect,
    controller: &DashboardController<RetainedCharts>,
    view: &DashboardView,
    busy: Option<&str>,
) {
    let role = controller.role();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),      // Header
            Constraint::Length(1),      // Filters / status
            Constraint::Percentage(45), // Table
            Constraint::Min(8),         // Charts or details
            Constraint::Length(3),      // Footer
        ])
        .split(area);

    render_header(f, chunks[0], controller, busy);
    render_status_line(f, chunks[1], controller);
    render_table(f, chunks[2], controller, view);

    match controller.records().get(view.selected) {
        Some(record) if view.expanded => render_details(f, chunks[3], view.selected, record),
        _ => render_charts(f, chunks[3], controller.charts().backend(), role),
    }

    render_footer(f, chunks[4], key_hints(role), None);
}

fn key_hints(role: Role) -> &'static [(&'static str, &'static str)] {
    match role {
        Role::Clinician => &[
            ("B", "BMI band"),
            ("F", "Feedback band"),
            ("X", "Show all"),
            ("R", "Refresh"),
            ("P", "PDF"),
            ("H", "HTML"),
            ("L", "Logout"),
            ("Q", "Quit"),
        ],
        Role::Patient => &[
            ("N", "New recommendation"),
            ("F", "Feedback"),
            ("X", "Show all"),
            ("R", "Refresh"),
            ("H", "HTML"),
            ("L", "Logout"),
            ("Q", "Quit"),
        ],
    }
}

fn render_header(
    f: &mut Frame,
    area: Rect,
    controller: &DashboardController<RetainedCharts>,
    busy: Option<&str>,
) {
    let mut spans = vec![
        Span::styled(" ", DietTheme::text()),
        Span::styled("dietdash", DietTheme::title()),
        Span::styled(" │ ", DietTheme::text_muted()),
        Span::styled(format!("{} Dashboard", controller.role()), DietTheme::subtitle()),
        Span::styled(" │ ", DietTheme::text_muted()),
        Span::styled(controller.viewer_name(), DietTheme::text()),
    ];
    if let Some(label) = busy {
        spans.push(Span::styled(format!("   {label}..."), DietTheme::info()));
    }

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(DietTheme::border()),
    );
    f.render_widget(header, area);
}

fn render_status_line(f: &mut Frame, area: Rect, controller: &DashboardController<RetainedCharts>) {
    let mut spans = Vec::new();

    if controller.role() == Role::Clinician {
        spans.push(Span::styled(" Filters: ", DietTheme::text_secondary()));
        spans.push(Span::styled(controller.filter().summary(), DietTheme::text()));
        let count = if controller.filter().is_unfiltered() {
            format!("  ({} records)  ", controller.all_records().len())
        } else {
            format!(
                "  ({} of {})  ",
                controller.records().len(),
                controller.all_records().len()
            )
        };
        spans.push(Span::styled(count, DietTheme::text_muted()));
    }

    if let Some(status) = controller.status() {
        spans.push(Span::styled(
            format!(" {} ", status.text),
            DietTheme::status(status.level),
        ));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_table(
    f: &mut Frame,
    area: Rect,
    controller: &DashboardController<RetainedCharts>,
    view: &DashboardView,
) {
    let title = match controller.role() {
        Role::Clinician => " Latest Recommendations ",
        Role::Patient => " Your Last 3 Recommendations ",
    };
    let block = Block::default()
        .title(Span::styled(title, DietTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(DietTheme::border());

    let layout = TableLayout::for_role(controller.role());
    let header = Row::new(
        layout
            .columns
            .iter()
            .map(|c| Cell::from(c.header()).style(DietTheme::text_secondary())),
    );

    let rows = controller.records().iter().enumerate().map(|(i, record)| {
        Row::new(
            layout
                .columns
                .iter()
                .map(|&column| Cell::from(terminal_cell(column, i, record)).style(cell_style(column, record))),
        )
    });

    let widths = layout.columns.iter().map(|c| match c {
        Column::Index => Constraint::Length(3),
        Column::Bmi => Constraint::Length(7),
        Column::Feedback => Constraint::Length(9),
        Column::Patient => Constraint::Length(16),
        Column::Risks => Constraint::Length(22),
        Column::List(_) | Column::AiExplanation => Constraint::Fill(1),
    });

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(DietTheme::selected());

    let mut state = TableState::default().with_selected(if controller.records().is_empty() {
        None
    } else {
        Some(view.selected)
    });
    f.render_stateful_widget(table, area, &mut state);
}

fn terminal_cell(column: Column, index: usize, record: &Record) -> String {
    match column {
        Column::List(field) => inline_list(record.list(field)),
        _ => cell_text(column, index, record),
    }
}

fn cell_style(column: Column, record: &Record) -> Style {
    match column {
        Column::Bmi => DietTheme::bmi(record.bmi),
        Column::Feedback => DietTheme::feedback(record.feedback),
        Column::Risks => DietTheme::risks(record),
        _ => DietTheme::text(),
    }
}

/// Full lists of the selected record.
fn render_details(f: &mut Frame, area: Rect, index: usize, record: &Record) {
    let block = Block::default()
        .title(Span::styled(
            format!(" Record #{} ", index + 1),
            DietTheme::subtitle(),
        ))
        .borders(Borders::ALL)
        .border_style(DietTheme::border_focused());

    let mut lines = Vec::new();
    for field in ListField::ALL {
        let items = record.list(field);
        lines.push(Line::from(Span::styled(
            format!("{} ({})", field.label(), items.len()),
            DietTheme::subtitle(),
        )));
        if items.is_empty() {
            lines.push(Line::from(Span::styled("  None", DietTheme::text_muted())));
        }
        for item in items {
            lines.push(Line::from(vec![
                Span::styled("  • ", DietTheme::text_muted()),
                Span::styled(item.clone(), DietTheme::text()),
            ]));
        }
    }
    if let Some(explanation) = record.ai_explanation.as_deref().filter(|s| !s.trim().is_empty()) {
        lines.push(Line::from(Span::styled("AI Explanation", DietTheme::subtitle())));
        lines.push(Line::from(Span::styled(explanation.to_string(), DietTheme::text())));
    }

    let p = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    f.render_widget(p, area);
}

fn render_charts(f: &mut Frame, area: Rect, charts: &RetainedCharts, role: Role) {
    let mut canvases = vec![BMI_CANVAS, FEEDBACK_CANVAS];
    if role == Role::Patient && charts.spec_for(TREND_CANVAS).is_some() {
        canvases.push(TREND_CANVAS);
    }

    let constraints: Vec<Constraint> = canvases
        .iter()
        .map(|_| Constraint::Ratio(1, canvases.len() as u32))
        .collect();
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for (canvas, chunk) in canvases.iter().zip(chunks.iter()) {
        match charts.spec_for(canvas) {
            Some(spec) if spec.kind == ChartKind::Bar => render_bar_chart(f, *chunk, spec),
            Some(spec) => render_line_chart(f, *chunk, spec),
            None => {
                let block = Block::default()
                    .borders(Borders::ALL)
                    .border_style(DietTheme::border());
                f.render_widget(
                    Paragraph::new(Span::styled("No data", DietTheme::text_muted())).block(block),
                    *chunk,
                );
            }
        }
    }
}

fn chart_block(spec: &ChartSpec) -> Block<'static> {
    Block::default()
        .title(Span::styled(format!(" {} ", spec.title), DietTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(DietTheme::border())
}

fn render_line_chart(f: &mut Frame, area: Rect, spec: &ChartSpec) {
    let Some(series) = spec.series.first() else {
        return;
    };

    let points: Vec<(f64, f64)> = series
        .data
        .iter()
        .enumerate()
        .map(|(i, v)| ((i + 1) as f64, *v))
        .collect();
    let y_top = spec
        .y_max
        .unwrap_or_else(|| series.data.iter().copied().fold(0.0, f64::max) * 1.1)
        .max(1.0);
    let x_right = (points.len() as f64).max(2.0);

    let dataset = Dataset::default()
        .name(series.label.clone())
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(DietTheme::success())
        .data(&points);

    let chart = Chart::new(vec![dataset])
        .block(chart_block(spec))
        .x_axis(
            Axis::default()
                .style(DietTheme::text_muted())
                .bounds([1.0, x_right])
                .labels(vec![
                    Span::raw("#1"),
                    Span::raw(format!("#{}", points.len().max(1))),
                ]),
        )
        .y_axis(
            Axis::default()
                .style(DietTheme::text_muted())
                .bounds([0.0, y_top])
                .labels(vec![Span::raw("0"), Span::raw(format!("{y_top:.0}"))]),
        );

    f.render_widget(chart, area);
}

fn render_bar_chart(f: &mut Frame, area: Rect, spec: &ChartSpec) {
    let Some(series) = spec.series.first() else {
        return;
    };

    // Bars hold integers; scale one decimal place into the value.
    let bars: Vec<Bar> = series
        .data
        .iter()
        .zip(&spec.labels)
        .map(|(value, label)| {
            Bar::default()
                .value((value * 10.0).round().max(0.0) as u64)
                .text_value(format!("{value:.1}"))
                .label(Line::from(label.clone()))
                .style(if *value == 0.0 {
                    DietTheme::text_muted()
                } else {
                    DietTheme::info()
                })
        })
        .collect();

    let mut chart = BarChart::default()
        .block(chart_block(spec).title_bottom(Span::styled(
            format!(" {} ", series.label),
            DietTheme::text_muted(),
        )))
        .data(BarGroup::default().bars(&bars))
        .bar_width(4)
        .bar_gap(1);
    if let Some(max) = spec.y_max {
        chart = chart.max((max * 10.0) as u64);
    }

    f.render_widget(chart, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_inline_list_truncates() {
        assert_eq!(inline_list(&[]), "None");
        assert_eq!(inline_list(&strings(&["a", "b"])), "a, b");
        assert_eq!(
            inline_list(&strings(&["a", "b", "c", "d", "e"])),
            "a, b, c (+2 more)"
        );
    }

    #[test]
    fn test_selection_stays_in_bounds() {
        let mut view = DashboardView::default();
        view.select_next(2);
        view.select_next(2);
        assert_eq!(view.selected, 1);

        view.expanded = true;
        view.clamp(1);
        assert_eq!(view.selected, 0);
        assert!(!view.expanded);

        view.select_prev();
        assert_eq!(view.selected, 0);
    }

    #[test]
    fn test_renders_records_and_status() {
        let mut controller = DashboardController::new(Role::Clinician, RetainedCharts::new());
        controller.set_records(vec![Record {
            name: Some("Ana Silva".to_string()),
            bmi: Some(31.2),
            feedback: Some(2.5),
            diet: strings(&["Oats", "Lentils"]),
            ..Default::default()
        }]);

        let mut terminal = Terminal::new(TestBackend::new(140, 40)).expect("Terminal");
        terminal
            .draw(|f| {
                let area = f.area();
                render_dashboard(f, area, &controller, &DashboardView::default(), None);
            })
            .expect("Draw");

        let screen: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(screen.contains("Ana Silva"));
        assert!(screen.contains("31.20"));
        assert!(screen.contains("High BMI, Low Feedback"));
        assert!(screen.contains("BMI: All | Feedback: All"));
        assert!(screen.contains("(1 records)"));
    }
}
