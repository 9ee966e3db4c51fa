//! Login screen: full name and 6-digit code.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::domain::{LoginCredentials, Role};
use crate::tui::styles::DietTheme;

use super::{render_field, render_footer, render_header, FieldKind, FormField};

/// Login form state
pub struct LoginFormState {
    pub fields: [FormField; 2],
    pub selected_field: usize,
    /// Why the login screen is shown (e.g. the redirect target)
    pub notice: Option<String>,
    pub error_message: Option<String>,
}

impl Default for LoginFormState {
    fn default() -> Self {
        Self {
            fields: [
                FormField::new("Full Name", "as registered", FieldKind::Text, 64),
                FormField::new("Code", "6 digits", FieldKind::Secret, 6),
            ],
            selected_field: 0,
            notice: None,
            error_message: None,
        }
    }
}

impl LoginFormState {
    pub fn next_field(&mut self) {
        self.selected_field = (self.selected_field + 1) % self.fields.len();
    }

    pub fn input_char(&mut self, c: char) {
        if self.fields[self.selected_field].input_char(c) {
            self.error_message = None;
        }
    }

    pub fn delete_char(&mut self) {
        self.fields[self.selected_field].delete_char();
    }

    /// Validate and take the credentials, wiping the code buffer.
    ///
    /// # Errors
    /// Returns a message naming the missing or malformed field.
    pub fn take_credentials(&mut self) -> Result<LoginCredentials, String> {
        let result = LoginCredentials::new(&self.fields[0].value, &self.fields[1].value);
        self.fields[1].clear();
        if result.is_err() {
            self.selected_field = 1;
        }
        result
    }

    /// Wipe both fields.
    pub fn clear(&mut self) {
        for field in &mut self.fields {
            field.clear();
        }
        self.selected_field = 0;
        self.error_message = None;
    }
}

/// Render the login screen
pub fn render_login(f: &mut Frame, area: Rect, state: &LoginFormState, role: Role, busy: Option<&str>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Form
            Constraint::Length(3), // Footer/error
        ])
        .split(area);

    render_header(f, chunks[0], &format!("{role} Login"), role.login_page().path());

    let form = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .horizontal_margin(4)
        .vertical_margin(1)
        .split(chunks[1]);

    let notice = match (busy, &state.notice) {
        (Some(label), _) => Span::styled(format!("{label}..."), DietTheme::info()),
        (None, Some(notice)) => Span::styled(notice.clone(), DietTheme::warning()),
        (None, None) => Span::styled(
            format!("Log in to open the {} dashboard.", role.as_str()),
            DietTheme::text_secondary(),
        ),
    };
    f.render_widget(
        Paragraph::new(Line::from(notice)).block(Block::default().borders(Borders::NONE)),
        form[0],
    );

    for (i, field) in state.fields.iter().enumerate() {
        render_field(f, form[i + 1], field, i == state.selected_field);
    }

    let hints: &[(&str, &str)] = match role {
        Role::Patient => &[
            ("Tab", "Next field"),
            ("Enter", "Log in"),
            ("F2", "Register"),
            ("Esc", "Quit"),
        ],
        Role::Clinician => &[("Tab", "Next field"), ("Enter", "Log in"), ("Esc", "Quit")],
    };
    render_footer(f, chunks[2], hints, state.error_message.as_deref());
}
