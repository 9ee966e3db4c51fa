//! Dashboard color palette and styles.

use ratatui::style::{Color, Modifier, Style};

use crate::application::StatusLevel;
use crate::domain::{Record, HIGH_BMI_THRESHOLD, LOW_FEEDBACK_THRESHOLD};

/// Dashboard theme color palette.
pub struct DietTheme;

impl DietTheme {
    // === Primary Colors ===

    /// Leaf green
    pub const PRIMARY: Color = Color::Rgb(22, 163, 74); // #16A34A

    /// Lighter green for highlights
    pub const PRIMARY_LIGHT: Color = Color::Rgb(74, 222, 128); // #4ADE80

    /// Darker green for the header bar
    pub const PRIMARY_DARK: Color = Color::Rgb(21, 128, 61); // #15803D

    /// Light slate for borders
    pub const SECONDARY_LIGHT: Color = Color::Rgb(148, 163, 184); // #94A3B8

    // === Semantic Colors ===

    pub const SUCCESS: Color = Color::Rgb(16, 185, 129); // #10B981
    pub const WARNING: Color = Color::Rgb(251, 191, 36); // #FBBF24
    pub const DANGER: Color = Color::Rgb(244, 63, 94); // #F43F5E
    pub const INFO: Color = Color::Rgb(59, 130, 246); // #3B82F6

    // === Background Colors ===

    pub const BG_DARK: Color = Color::Rgb(15, 23, 42); // #0F172A
    pub const BG_CARD: Color = Color::Rgb(51, 65, 85); // #334155

    // === Text Colors ===

    pub const TEXT_PRIMARY: Color = Color::Rgb(248, 250, 252); // #F8FAFC
    pub const TEXT_SECONDARY: Color = Color::Rgb(148, 163, 184); // #94A3B8
    pub const TEXT_MUTED: Color = Color::Rgb(100, 116, 139); // #64748B

    // === Preset Styles ===

    #[must_use]
    pub fn title() -> Style {
        Style::default()
            .fg(Self::TEXT_PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn subtitle() -> Style {
        Style::default()
            .fg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn text() -> Style {
        Style::default().fg(Self::TEXT_PRIMARY)
    }

    #[must_use]
    pub fn text_secondary() -> Style {
        Style::default().fg(Self::TEXT_SECONDARY)
    }

    #[must_use]
    pub fn text_muted() -> Style {
        Style::default().fg(Self::TEXT_MUTED)
    }

    #[must_use]
    pub fn success() -> Style {
        Style::default().fg(Self::SUCCESS)
    }

    #[must_use]
    pub fn warning() -> Style {
        Style::default().fg(Self::WARNING)
    }

    #[must_use]
    pub fn danger() -> Style {
        Style::default().fg(Self::DANGER)
    }

    #[must_use]
    pub fn info() -> Style {
        Style::default().fg(Self::INFO)
    }

    /// Highlighted table row
    #[must_use]
    pub fn selected() -> Style {
        Style::default()
            .fg(Self::BG_DARK)
            .bg(Self::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn focused() -> Style {
        Style::default()
            .fg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn cursor() -> Style {
        Style::default().fg(Self::PRIMARY_LIGHT)
    }

    #[must_use]
    pub fn border() -> Style {
        Style::default().fg(Self::SECONDARY_LIGHT)
    }

    #[must_use]
    pub fn border_focused() -> Style {
        Style::default().fg(Self::PRIMARY)
    }

    #[must_use]
    pub fn header() -> Style {
        Style::default()
            .fg(Self::TEXT_PRIMARY)
            .bg(Self::PRIMARY_DARK)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn key_hint() -> Style {
        Style::default()
            .fg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn key_desc() -> Style {
        Style::default().fg(Self::TEXT_SECONDARY)
    }

    /// Overlay panel for blocking alerts
    #[must_use]
    pub fn alert() -> Style {
        Style::default().fg(Self::TEXT_PRIMARY).bg(Self::BG_CARD)
    }

    /// Status banner style by severity
    #[must_use]
    pub fn status(level: StatusLevel) -> Style {
        match level {
            StatusLevel::Info => Self::info(),
            StatusLevel::Warning => Self::warning(),
            StatusLevel::Error => Self::danger(),
        }
    }

    /// BMI cell style: danger at or above the high-BMI threshold
    #[must_use]
    pub fn bmi(bmi: Option<f64>) -> Style {
        match bmi {
            Some(value) if value >= HIGH_BMI_THRESHOLD => Self::danger(),
            Some(value) if value >= 25.0 => Self::warning(),
            Some(_) => Self::success(),
            None => Self::text_muted(),
        }
    }

    /// Risk cell style
    #[must_use]
    pub fn risks(record: &Record) -> Style {
        if record.derived_risks().is_empty() {
            Self::success()
        } else {
            Self::danger()
        }
    }

    /// Feedback cell style
    #[must_use]
    pub fn feedback(feedback: Option<f64>) -> Style {
        match feedback {
            Some(value) if value < LOW_FEEDBACK_THRESHOLD => Self::danger(),
            Some(_) => Self::text(),
            None => Self::text_muted(),
        }
    }
}
