//! Page controller: the state of one dashboard.
//!
//! The controller owns the retained full record set, the filtered view,
//! the filter selection, the patient history and the chart board. It does
//! no I/O; the caller feeds it the results of [`DashboardApi`] calls.
//!
//! [`DashboardApi`]: super::DashboardApi

use chrono::Local;

use crate::domain::{FilterState, History, Identity, Record, Role, UserCharts};
use crate::ports::ChartBackend;
use crate::DashError;

use super::api::DashboardData;
use super::charts::{
    bmi_line_spec, feedback_bar_spec, trend_line_spec, ChartBoard, BMI_CANVAS, FEEDBACK_CANVAS,
    TREND_CANVAS,
};
use super::render::{render_report, render_table, Report, TableLayout};

/// Shown when the filters leave nothing to display.
pub const NO_MATCH_MESSAGE: &str = "No patients match the selected filters.";
/// Shown on an empty patient history.
pub const NO_HISTORY_MESSAGE: &str = "No recommendations yet.";
/// Shown when the initial load gives up.
pub const LOAD_FAILED_MESSAGE: &str = "Could not load data. Please try again later.";

/// Severity of a status banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

/// Non-blocking status banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub level: StatusLevel,
    pub text: String,
}

impl StatusMessage {
    pub fn new(level: StatusLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }
}

/// State of one role's dashboard.
pub struct DashboardController<B: ChartBackend> {
    role: Role,
    identity: Option<Identity>,
    all_records: Vec<Record>,
    visible: Vec<Record>,
    filter: FilterState,
    history: History,
    trend: Option<UserCharts>,
    charts: ChartBoard<B>,
    status: Option<StatusMessage>,
}

impl<B: ChartBackend> DashboardController<B> {
    pub fn new(role: Role, backend: B) -> Self {
        Self {
            role,
            identity: None,
            all_records: Vec::new(),
            visible: Vec::new(),
            filter: FilterState::default(),
            history: History::new(),
            trend: None,
            charts: ChartBoard::new(backend),
            status: None,
        }
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn set_identity(&mut self, identity: Identity) {
        self.identity = Some(identity);
    }

    /// Name shown in the header and reports.
    #[must_use]
    pub fn viewer_name(&self) -> String {
        self.identity
            .as_ref()
            .map_or_else(|| "Unknown".to_string(), Identity::display_name)
    }

    /// Records currently displayed (after filtering).
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.visible
    }

    /// Retained full record set.
    #[must_use]
    pub fn all_records(&self) -> &[Record] {
        &self.all_records
    }

    #[must_use]
    pub fn filter(&self) -> FilterState {
        self.filter
    }

    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    #[must_use]
    pub fn trend(&self) -> Option<&UserCharts> {
        self.trend.as_ref()
    }

    #[must_use]
    pub fn charts(&self) -> &ChartBoard<B> {
        &self.charts
    }

    #[must_use]
    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn set_status(&mut self, level: StatusLevel, text: impl Into<String>) {
        self.status = Some(StatusMessage::new(level, text));
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    /// Apply a freshly loaded dashboard.
    pub fn load(&mut self, data: DashboardData) {
        match self.role {
            Role::Clinician => self.set_records(data.records),
            Role::Patient => self.set_history(data.records),
        }
        if let Some(trend) = data.trend {
            self.set_trend(trend);
        }
    }

    /// Replace the full record set and re-apply the current filters.
    pub fn set_records(&mut self, records: Vec<Record>) {
        tracing::info!("Loaded {} records", records.len());
        self.all_records = records;
        self.apply_filters(self.filter);
    }

    /// Filter the retained full set and redraw the table and charts.
    pub fn apply_filters(&mut self, state: FilterState) {
        self.filter = state;
        self.visible = state.apply(&self.all_records);
        self.charts.draw_charts(&self.visible);

        if self.visible.is_empty() {
            let text = match self.role {
                Role::Clinician => NO_MATCH_MESSAGE,
                Role::Patient => NO_HISTORY_MESSAGE,
            };
            self.set_status(StatusLevel::Info, text);
        } else if self
            .status
            .as_ref()
            .is_some_and(|s| s.text == NO_MATCH_MESSAGE || s.text == NO_HISTORY_MESSAGE)
        {
            self.status = None;
        }

        tracing::debug!(
            "{} of {} records match {}",
            self.visible.len(),
            self.all_records.len(),
            state.summary()
        );
    }

    /// Overwrite the history with a server-provided list.
    pub fn set_history(&mut self, records: Vec<Record>) {
        self.history.replace(records);
        self.set_records(self.history.to_vec());
    }

    /// Put a new recommendation at the front of the history.
    pub fn record_recommendation(&mut self, record: Record) {
        self.history.record(record);
        self.set_records(self.history.to_vec());
    }

    pub fn set_trend(&mut self, trend: UserCharts) {
        self.charts.draw_trend(&trend);
        self.trend = Some(trend);
    }

    /// Surface a load failure without blocking the UI.
    pub fn load_failed(&mut self, error: &DashError) {
        tracing::error!("Dashboard load failed: {}", error);
        self.set_status(StatusLevel::Error, LOAD_FAILED_MESSAGE);
    }

    /// HTML table of the visible records.
    #[must_use]
    pub fn table_markup(&self) -> String {
        render_table(&self.visible, &TableLayout::for_role(self.role))
    }

    /// Standalone HTML report of the visible records and their charts.
    #[must_use]
    pub fn report_markup(&self) -> String {
        let viewer = self.viewer_name();
        let mut charts = vec![
            (BMI_CANVAS, bmi_line_spec(&self.visible)),
            (FEEDBACK_CANVAS, feedback_bar_spec(&self.visible)),
        ];
        if let Some(trend) = &self.trend {
            charts.push((TREND_CANVAS, trend_line_spec(trend)));
        }

        render_report(&Report {
            role: self.role,
            viewer: &viewer,
            filter: &self.filter,
            records: &self.visible,
            charts,
            generated_at: Local::now(),
        })
    }

    /// Drop all session state and chart instances.
    pub fn reset(&mut self) {
        self.identity = None;
        self.all_records.clear();
        self.visible.clear();
        self.filter = FilterState::default();
        self.history.clear();
        self.trend = None;
        self.charts.clear();
        self.status = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::RetainedCharts;
    use crate::domain::{BmiBand, FeedbackBand};
    use crate::ports::TransportError;

    fn record(name: &str, bmi: Option<f64>, feedback: Option<f64>) -> Record {
        Record {
            name: Some(name.to_string()),
            bmi,
            feedback,
            ..Default::default()
        }
    }

    fn clinician() -> DashboardController<RetainedCharts> {
        let mut controller = DashboardController::new(Role::Clinician, RetainedCharts::new());
        controller.set_records(vec![
            record("a", Some(22.0), Some(4.5)),
            record("b", Some(27.5), Some(2.0)),
            record("c", Some(33.1), None),
            record("d", None, Some(1.0)),
        ]);
        controller
    }

    fn names<B: ChartBackend>(controller: &DashboardController<B>) -> Vec<&str> {
        controller.records().iter().map(Record::display_name).collect()
    }

    #[test]
    fn test_filters_always_apply_to_full_set() {
        let mut controller = clinician();

        controller.apply_filters(FilterState {
            bmi: BmiBand::High,
            feedback: FeedbackBand::All,
        });
        assert_eq!(names(&controller), vec!["c"]);

        controller.apply_filters(FilterState {
            bmi: BmiBand::Low,
            feedback: FeedbackBand::All,
        });
        assert_eq!(names(&controller), vec!["a"]);

        controller.apply_filters(FilterState::default());
        assert_eq!(controller.records().len(), 4);
        assert_eq!(controller.all_records().len(), 4);
    }

    #[test]
    fn test_low_feedback_excludes_absent() {
        let mut controller = clinician();
        controller.apply_filters(FilterState {
            bmi: BmiBand::All,
            feedback: FeedbackBand::Low,
        });

        assert_eq!(names(&controller), vec!["b", "d"]);
        assert!(controller.records().iter().all(|r| r.feedback.is_some_and(|f| f < 3.0)));
    }

    #[test]
    fn test_empty_result_sets_status_and_clears_on_match() {
        let mut controller = clinician();
        controller.apply_filters(FilterState {
            bmi: BmiBand::Medium,
            feedback: FeedbackBand::High,
        });

        assert!(controller.records().is_empty());
        let status = controller.status().expect("Status shown");
        assert_eq!(status.level, StatusLevel::Info);
        assert_eq!(status.text, NO_MATCH_MESSAGE);

        controller.apply_filters(FilterState::default());
        assert!(controller.status().is_none());
    }

    #[test]
    fn test_charts_follow_filtered_view() {
        let mut controller = clinician();
        controller.apply_filters(FilterState {
            bmi: BmiBand::High,
            feedback: FeedbackBand::All,
        });

        let backend = controller.charts().backend();
        assert_eq!(backend.live_instances(BMI_CANVAS), 1);
        let spec = backend.spec_for(FEEDBACK_CANVAS).expect("Feedback chart drawn");
        assert_eq!(spec.series[0].data, vec![0.0]);
    }

    #[test]
    fn test_patient_history_keeps_three_newest() {
        let mut controller = DashboardController::new(Role::Patient, RetainedCharts::new());
        controller.set_history(vec![
            record("r3", Some(24.0), None),
            record("r2", Some(25.0), None),
        ]);
        controller.record_recommendation(record("r4", Some(23.0), None));
        controller.record_recommendation(record("r5", Some(22.0), None));

        assert_eq!(controller.history().len(), 3);
        assert_eq!(names(&controller), vec!["r5", "r4", "r3"]);
    }

    #[test]
    fn test_load_failure_is_non_blocking_status() {
        let mut controller = clinician();
        controller.load_failed(&DashError::Transport(TransportError::Timeout));

        let status = controller.status().expect("Status shown");
        assert_eq!(status.level, StatusLevel::Error);
        assert_eq!(status.text, LOAD_FAILED_MESSAGE);
        assert_eq!(controller.records().len(), 4);
    }

    #[test]
    fn test_reset_destroys_charts() {
        let mut controller = DashboardController::new(Role::Patient, RetainedCharts::new());
        controller.load(DashboardData {
            records: vec![record("r1", Some(24.0), None)],
            trend: Some(UserCharts {
                bmi: vec![Some(24.0)],
                ..Default::default()
            }),
        });
        assert_eq!(controller.charts().backend().total_live(), 3);

        controller.reset();

        assert_eq!(controller.charts().backend().total_live(), 0);
        assert!(controller.records().is_empty());
        assert!(controller.history().is_empty());
        assert!(controller.identity().is_none());
    }

    #[test]
    fn test_table_markup_uses_role_layout() {
        let controller = clinician();
        let html = controller.table_markup();
        assert!(html.contains("<th>AI Explanation</th>"));
        assert_eq!(html.matches("<tr>").count(), 5);
    }
}
