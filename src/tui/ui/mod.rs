//! UI module: View components for the TUI.

pub mod dashboard;
pub mod feedback;
pub mod login;
pub mod recommend;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use zeroize::Zeroize;

use crate::tui::styles::DietTheme;

/// What a text field accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Digits only
    Integer,
    /// Digits and one decimal point
    Decimal,
    /// Digits only, rendered as `*`
    Secret,
}

/// Single-line text input.
#[derive(Debug, Clone)]
pub struct FormField {
    pub label: &'static str,
    pub hint: &'static str,
    pub kind: FieldKind,
    pub value: String,
    pub max_len: usize,
}

impl FormField {
    #[must_use]
    pub fn new(label: &'static str, hint: &'static str, kind: FieldKind, max_len: usize) -> Self {
        Self {
            label,
            hint,
            kind,
            value: String::new(),
            max_len,
        }
    }

    /// Append `c` if the field accepts it. Returns whether it was taken.
    pub fn input_char(&mut self, c: char) -> bool {
        if self.value.chars().count() >= self.max_len {
            return false;
        }

        let accepted = match self.kind {
            FieldKind::Text => !c.is_control(),
            FieldKind::Integer | FieldKind::Secret => c.is_ascii_digit(),
            FieldKind::Decimal => c.is_ascii_digit() || (c == '.' && !self.value.contains('.')),
        };
        if accepted {
            self.value.push(c);
        }
        accepted
    }

    pub fn delete_char(&mut self) {
        self.value.pop();
    }

    /// Wipe the buffer.
    pub fn clear(&mut self) {
        self.value.zeroize();
    }

    fn display(&self) -> String {
        match self.kind {
            FieldKind::Secret => "*".repeat(self.value.chars().count()),
            _ => self.value.clone(),
        }
    }
}

/// Render one bordered input box.
pub fn render_field(f: &mut Frame, area: Rect, field: &FormField, is_selected: bool) {
    let (border_style, title_style) = if is_selected {
        (DietTheme::border_focused(), DietTheme::focused())
    } else {
        (DietTheme::border(), DietTheme::text_secondary())
    };

    let block = Block::default()
        .title(Span::styled(format!(" {} ", field.label), title_style))
        .borders(Borders::ALL)
        .border_style(border_style);

    let value = if field.value.is_empty() {
        Span::styled(field.hint, DietTheme::text_muted())
    } else {
        Span::styled(field.display(), DietTheme::text())
    };

    let content = Paragraph::new(Line::from(vec![
        Span::raw(" "),
        value,
        if is_selected {
            Span::styled("▌", DietTheme::cursor())
        } else {
            Span::raw("")
        },
    ]))
    .block(block);

    f.render_widget(content, area);
}

/// Render a screen header: title plus a secondary caption.
pub fn render_header(f: &mut Frame, area: Rect, title: &str, caption: &str) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", DietTheme::text()),
        Span::styled(title.to_string(), DietTheme::title()),
        Span::styled(" │ ", DietTheme::text_muted()),
        Span::styled(caption.to_string(), DietTheme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(DietTheme::border()),
    );

    f.render_widget(header, area);
}

/// Render a footer of `[key] description` hints, or an error in their place.
pub fn render_footer(f: &mut Frame, area: Rect, hints: &[(&str, &str)], error: Option<&str>) {
    let content = match error {
        Some(err) => Line::from(vec![
            Span::styled("! ", DietTheme::danger()),
            Span::styled(err.to_string(), DietTheme::danger()),
        ]),
        None => Line::from(
            hints
                .iter()
                .flat_map(|(key, desc)| {
                    [
                        Span::styled(format!("[{key}] "), DietTheme::key_hint()),
                        Span::styled(format!("{desc} "), DietTheme::key_desc()),
                    ]
                })
                .collect::<Vec<_>>(),
        ),
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(DietTheme::border()),
    );

    f.render_widget(footer, area);
}

/// Blocking alert drawn over the current screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

pub fn render_alert(f: &mut Frame, alert: &Alert) {
    let area = centered_rect(60, 30, f.area());
    f.render_widget(Clear, area);

    let block = Block::default()
        .title(Span::styled(format!(" {} ", alert.title), DietTheme::danger()))
        .borders(Borders::ALL)
        .border_style(DietTheme::danger())
        .style(DietTheme::alert());

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(alert.message.clone(), DietTheme::text())),
        Line::from(""),
        Line::from(vec![
            Span::styled("[Enter] ", DietTheme::key_hint()),
            Span::styled("OK", DietTheme::key_desc()),
        ]),
    ];

    let p = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(p, area);
}

/// Rectangle of `percent_x` by `percent_y` centered in `area`.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_filters_input_by_kind() {
        let mut weight = FormField::new("Weight", "kg", FieldKind::Decimal, 6);
        for c in "7a5..5".chars() {
            weight.input_char(c);
        }
        assert_eq!(weight.value, "75.5");

        let mut code = FormField::new("Code", "6 digits", FieldKind::Secret, 6);
        for c in "12x34567".chars() {
            code.input_char(c);
        }
        assert_eq!(code.value, "123456");
        assert_eq!(code.display(), "******");

        code.clear();
        assert!(code.value.is_empty());
    }
}
