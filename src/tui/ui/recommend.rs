//! Recommendation request form (patient).

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::domain::{ActivityLevel, DietPreference, RecommendationRequest};
use crate::tui::styles::DietTheme;

use super::{render_field, render_footer, render_header, FieldKind, FormField};

const AGE: usize = 0;
const WEIGHT: usize = 1;
const HEIGHT: usize = 2;
const ACTIVITY: usize = 3;
const DIET: usize = 4;
const FIELD_COUNT: usize = 5;

/// Recommendation form state
pub struct RecommendFormState {
    pub fields: [FormField; 3],
    pub activity_level: ActivityLevel,
    pub diet_preference: DietPreference,
    pub selected_field: usize,
    pub error_message: Option<String>,
}

impl Default for RecommendFormState {
    fn default() -> Self {
        Self {
            fields: [
                FormField::new("Age", "years", FieldKind::Integer, 3),
                FormField::new("Weight", "kg", FieldKind::Decimal, 6),
                FormField::new("Height", "cm", FieldKind::Decimal, 6),
            ],
            activity_level: ActivityLevel::Low,
            diet_preference: DietPreference::Vegetarian,
            selected_field: AGE,
            error_message: None,
        }
    }
}

impl RecommendFormState {
    pub fn next_field(&mut self) {
        self.selected_field = (self.selected_field + 1) % FIELD_COUNT;
    }

    pub fn prev_field(&mut self) {
        self.selected_field = (self.selected_field + FIELD_COUNT - 1) % FIELD_COUNT;
    }

    /// Type into a text field, or flip a choice field on space.
    pub fn input_char(&mut self, c: char) {
        match self.selected_field {
            ACTIVITY | DIET if c == ' ' => self.toggle_choice(),
            AGE | WEIGHT | HEIGHT => {
                if self.fields[self.selected_field].input_char(c) {
                    self.error_message = None;
                }
            }
            _ => {}
        }
    }

    /// Flip the selected choice field.
    pub fn toggle_choice(&mut self) {
        match self.selected_field {
            ACTIVITY => self.activity_level = self.activity_level.toggle(),
            DIET => self.diet_preference = self.diet_preference.toggle(),
            _ => {}
        }
    }

    pub fn delete_char(&mut self) {
        if let Some(field) = self.fields.get_mut(self.selected_field) {
            field.delete_char();
        }
    }

    /// Validate into a request body.
    ///
    /// # Errors
    /// Returns a message naming the first missing or non-numeric field.
    pub fn to_request(&self) -> Result<RecommendationRequest, String> {
        RecommendationRequest::parse(
            &self.fields[AGE].value,
            &self.fields[WEIGHT].value,
            &self.fields[HEIGHT].value,
            self.activity_level,
            self.diet_preference,
        )
    }
}

/// Render the recommendation form
pub fn render_recommend_form(f: &mut Frame, area: Rect, state: &RecommendFormState, busy: Option<&str>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Form
            Constraint::Length(3), // Footer/error
        ])
        .split(area);

    let caption = busy.map_or_else(|| "Diet & exercise plan".to_string(), |label| format!("{label}..."));
    render_header(f, chunks[0], "New Recommendation", &caption);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .horizontal_margin(4)
        .vertical_margin(1)
        .split(chunks[1]);

    for (i, field) in state.fields.iter().enumerate() {
        render_field(f, rows[i], field, i == state.selected_field);
    }
    render_choice(
        f,
        rows[ACTIVITY],
        "Activity Level",
        &state.activity_level.to_string(),
        state.selected_field == ACTIVITY,
    );
    render_choice(
        f,
        rows[DIET],
        "Diet Preference",
        &state.diet_preference.to_string(),
        state.selected_field == DIET,
    );

    render_footer(
        f,
        chunks[2],
        &[
            ("↑↓", "Navigate"),
            ("Space", "Toggle"),
            ("Enter", "Submit"),
            ("Esc", "Cancel"),
        ],
        state.error_message.as_deref(),
    );
}

fn render_choice(f: &mut Frame, area: Rect, label: &str, value: &str, is_selected: bool) {
    let (border_style, title_style) = if is_selected {
        (DietTheme::border_focused(), DietTheme::focused())
    } else {
        (DietTheme::border(), DietTheme::text_secondary())
    };

    let block = Block::default()
        .title(Span::styled(format!(" {label} "), title_style))
        .borders(Borders::ALL)
        .border_style(border_style);

    let p = Paragraph::new(Line::from(vec![
        Span::styled(" ◀ ", DietTheme::text_muted()),
        Span::styled(value.to_string(), DietTheme::text()),
        Span::styled(" ▶", DietTheme::text_muted()),
    ]))
    .block(block);
    f.render_widget(p, area);
}
