//! Feedback form (patient): a 1-5 score.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::domain::FeedbackScore;
use crate::tui::styles::DietTheme;

use super::{render_field, render_footer, render_header, FieldKind, FormField};

/// Feedback form state
pub struct FeedbackFormState {
    pub score: FormField,
    pub error_message: Option<String>,
}

impl Default for FeedbackFormState {
    fn default() -> Self {
        Self {
            score: FormField::new("Score", "1 (poor) to 5 (great)", FieldKind::Integer, 1),
            error_message: None,
        }
    }
}

impl FeedbackFormState {
    pub fn input_char(&mut self, c: char) {
        if self.score.input_char(c) {
            self.error_message = None;
        }
    }

    pub fn delete_char(&mut self) {
        self.score.delete_char();
    }

    /// # Errors
    /// Returns a message if the score is missing or outside 1-5.
    pub fn to_score(&self) -> Result<FeedbackScore, String> {
        FeedbackScore::parse(&self.score.value)
    }
}

/// Render the feedback form
pub fn render_feedback_form(f: &mut Frame, area: Rect, state: &FeedbackFormState, busy: Option<&str>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Form
            Constraint::Length(3), // Footer/error
        ])
        .split(area);

    let caption = busy.map_or_else(
        || "How useful was your last recommendation?".to_string(),
        |label| format!("{label}..."),
    );
    render_header(f, chunks[0], "Feedback", &caption);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(2), Constraint::Min(0)])
        .horizontal_margin(4)
        .vertical_margin(1)
        .split(chunks[1]);

    render_field(f, rows[0], &state.score, true);

    let stars = state
        .score
        .value
        .parse::<usize>()
        .map(|n| "★".repeat(n.min(5)) + &"☆".repeat(5 - n.min(5)))
        .unwrap_or_else(|_| "☆☆☆☆☆".to_string());
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::raw(" "),
            Span::styled(stars, DietTheme::warning()),
        ])),
        rows[1],
    );

    render_footer(
        f,
        chunks[2],
        &[("1-5", "Score"), ("Enter", "Submit"), ("Esc", "Cancel")],
        state.error_message.as_deref(),
    );
}
