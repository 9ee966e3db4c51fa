//! Chart board: builds chart specs from records and owns the live instances.
//!
//! Every draw destroys the instance previously bound to the same canvas
//! before creating the new one, so a canvas never holds more than one chart.

use std::collections::BTreeMap;

use crate::domain::{Record, UserCharts};
use crate::ports::{ChartBackend, ChartHandle, ChartKind, ChartSeries, ChartSpec};

pub const BMI_CANVAS: &str = "bmiChart";
pub const FEEDBACK_CANVAS: &str = "feedbackChart";
pub const TREND_CANVAS: &str = "bmiTrendChart";

/// Label of the feedback series; missing scores are plotted as zero.
pub const FEEDBACK_SERIES_LABEL: &str = "Feedback (0 = N/A)";

/// Owns one chart instance per canvas.
pub struct ChartBoard<B: ChartBackend> {
    backend: B,
    live: BTreeMap<String, ChartHandle>,
}

impl<B: ChartBackend> ChartBoard<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            live: BTreeMap::new(),
        }
    }

    /// Draw `spec` on `canvas`, destroying the previous instance first.
    pub fn draw(&mut self, canvas: &str, spec: &ChartSpec) -> ChartHandle {
        if let Some(previous) = self.live.remove(canvas) {
            self.backend.destroy(previous);
        }

        let handle = self.backend.create(canvas, spec);
        self.live.insert(canvas.to_string(), handle);
        handle
    }

    /// Redraw the BMI line and feedback bar charts from `records`.
    pub fn draw_charts(&mut self, records: &[Record]) {
        self.draw(BMI_CANVAS, &bmi_line_spec(records));
        self.draw(FEEDBACK_CANVAS, &feedback_bar_spec(records));
        tracing::debug!("Redrew charts for {} records", records.len());
    }

    /// Redraw the patient's BMI trend.
    pub fn draw_trend(&mut self, trend: &UserCharts) {
        self.draw(TREND_CANVAS, &trend_line_spec(trend));
    }

    /// Destroy every live instance.
    pub fn clear(&mut self) {
        for (_, handle) in std::mem::take(&mut self.live) {
            self.backend.destroy(handle);
        }
    }

    #[must_use]
    pub fn handle(&self, canvas: &str) -> Option<ChartHandle> {
        self.live.get(canvas).copied()
    }

    /// Canvases that currently hold a chart.
    pub fn canvases(&self) -> impl Iterator<Item = &str> {
        self.live.keys().map(String::as_str)
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }
}

fn positional_labels(count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("#{i}")).collect()
}

/// BMI line series in record order. Absent BMI values are plotted as zero.
#[must_use]
pub fn bmi_line_spec(records: &[Record]) -> ChartSpec {
    ChartSpec {
        kind: ChartKind::Line,
        title: "BMI".to_string(),
        labels: positional_labels(records.len()),
        series: vec![ChartSeries {
            label: "BMI".to_string(),
            data: records.iter().map(|r| r.bmi.unwrap_or(0.0)).collect(),
        }],
        y_max: None,
    }
}

/// Feedback bar series in record order; missing feedback becomes zero.
#[must_use]
pub fn feedback_bar_spec(records: &[Record]) -> ChartSpec {
    ChartSpec {
        kind: ChartKind::Bar,
        title: "Feedback".to_string(),
        labels: positional_labels(records.len()),
        series: vec![ChartSeries {
            label: FEEDBACK_SERIES_LABEL.to_string(),
            data: records.iter().map(|r| r.feedback.unwrap_or(0.0)).collect(),
        }],
        y_max: Some(5.0),
    }
}

/// BMI over every recommendation of one patient, oldest first.
#[must_use]
pub fn trend_line_spec(trend: &UserCharts) -> ChartSpec {
    ChartSpec {
        kind: ChartKind::Line,
        title: "BMI Trend".to_string(),
        labels: positional_labels(trend.bmi.len()),
        series: vec![ChartSeries {
            label: "BMI".to_string(),
            data: trend.bmi.iter().map(|b| b.unwrap_or(0.0)).collect(),
        }],
        y_max: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::RetainedCharts;

    fn record(bmi: Option<f64>, feedback: Option<f64>) -> Record {
        Record {
            bmi,
            feedback,
            ..Default::default()
        }
    }

    #[test]
    fn test_redraw_keeps_one_instance_per_canvas() {
        let mut board = ChartBoard::new(RetainedCharts::new());
        let records = vec![record(Some(22.0), Some(4.0)), record(Some(31.0), None)];

        board.draw_charts(&records);
        let first = board.handle(BMI_CANVAS).expect("Drawn");
        board.draw_charts(&records);
        board.draw_charts(&records[..1]);

        assert_eq!(board.backend().live_instances(BMI_CANVAS), 1);
        assert_eq!(board.backend().live_instances(FEEDBACK_CANVAS), 1);
        assert_ne!(board.handle(BMI_CANVAS), Some(first));
        assert_eq!(board.backend().total_live(), 2);
    }

    #[test]
    fn test_clear_destroys_everything() {
        let mut board = ChartBoard::new(RetainedCharts::new());
        board.draw_charts(&[record(Some(22.0), Some(4.0))]);
        board.draw_trend(&UserCharts {
            bmi: vec![Some(24.0), Some(23.5)],
            ..Default::default()
        });
        assert_eq!(board.backend().total_live(), 3);

        board.clear();

        assert_eq!(board.backend().total_live(), 0);
        assert_eq!(board.canvases().count(), 0);
    }

    #[test]
    fn test_feedback_series_zero_fills_missing() {
        let spec = feedback_bar_spec(&[record(Some(22.0), Some(4.5)), record(Some(31.0), None)]);

        assert_eq!(spec.kind, ChartKind::Bar);
        assert_eq!(spec.labels, vec!["#1", "#2"]);
        assert_eq!(spec.series[0].data, vec![4.5, 0.0]);
        assert!(spec.series[0].label.contains("0 = N/A"));
        assert_eq!(spec.y_max, Some(5.0));
    }

    #[test]
    fn test_bmi_series_follows_record_order() {
        let spec = bmi_line_spec(&[record(Some(31.2), None), record(Some(19.8), None)]);

        assert_eq!(spec.kind, ChartKind::Line);
        assert_eq!(spec.series[0].data, vec![31.2, 19.8]);
    }
}
