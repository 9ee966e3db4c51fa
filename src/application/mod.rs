//! Application layer: the guarded-fetch pipeline and the page controller.
//!
//! - `session`: role check before a dashboard initializes
//! - `fetcher`: GET with bounded linear-backoff retries
//! - `api`: backend endpoints on top of the fetcher
//! - `render`: HTML table and report markup
//! - `charts`: chart specs and destroy-before-recreate instance ownership
//! - `dashboard`: filter state, retained records and status for one role
//! - `export`: report files

pub mod api;
pub mod charts;
pub mod dashboard;
pub mod export;
pub mod fetcher;
pub mod render;
pub mod session;

pub use api::{DashboardApi, DashboardData};
pub use charts::ChartBoard;
pub use dashboard::{DashboardController, StatusLevel, StatusMessage};
pub use export::ExportWriter;
pub use fetcher::{fetch_json_with_retry, RetryPolicy};
pub use render::{escape_html, render_table, TableLayout};
pub use session::{GuardOutcome, SessionGuard};
