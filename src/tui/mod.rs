//! TUI module: Terminal User Interface using Ratatui.
//!
//! Screens:
//! - Login for the configured role
//! - Dashboard with records, filters and charts
//! - Recommendation and feedback forms (patient)

mod app;
mod styles;
mod ui;
mod worker;

pub use app::{App, Screen};
pub use styles::DietTheme;
pub use worker::{Task, TaskHandle, TaskOutcome, TaskWorker};
