//! Chart port: render targets that hold chart instances.
//!
//! A backend binds a [`ChartSpec`] to a canvas and hands back a handle.
//! Instances stay alive until explicitly destroyed, so callers must destroy
//! the previous instance before drawing on the same canvas again.

use serde::Serialize;

/// Kind of chart drawn on a canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
}

/// One named data series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub label: String,
    pub data: Vec<f64>,
}

/// Everything needed to draw a chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    /// Positional x-axis labels (`#1`, `#2`, ...)
    pub labels: Vec<String>,
    pub series: Vec<ChartSeries>,
    /// Optional upper bound for the y axis
    pub y_max: Option<f64>,
}

impl ChartSpec {
    /// Chart.js configuration object for this spec.
    #[must_use]
    pub fn to_chartjs(&self) -> serde_json::Value {
        let datasets: Vec<serde_json::Value> = self
            .series
            .iter()
            .map(|s| {
                serde_json::json!({
                    "label": s.label,
                    "data": s.data,
                })
            })
            .collect();

        let mut y_axis = serde_json::json!({ "beginAtZero": true });
        if let Some(max) = self.y_max {
            y_axis["max"] = serde_json::json!(max);
        }

        serde_json::json!({
            "type": self.kind,
            "data": {
                "labels": self.labels,
                "datasets": datasets,
            },
            "options": {
                "plugins": { "title": { "display": true, "text": self.title } },
                "scales": { "y": y_axis },
            },
        })
    }
}

/// Opaque handle to a live chart instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChartHandle(pub u64);

/// Trait for chart render targets.
pub trait ChartBackend {
    /// Create a chart instance bound to `canvas`.
    fn create(&mut self, canvas: &str, spec: &ChartSpec) -> ChartHandle;

    /// Destroy an instance. Unknown handles are ignored.
    fn destroy(&mut self, handle: ChartHandle);

    /// Number of live instances bound to `canvas`.
    fn live_instances(&self, canvas: &str) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chartjs_config() {
        let spec = ChartSpec {
            kind: ChartKind::Bar,
            title: "Feedback".to_string(),
            labels: vec!["#1".to_string(), "#2".to_string()],
            series: vec![ChartSeries {
                label: "Feedback (0 = N/A)".to_string(),
                data: vec![4.5, 0.0],
            }],
            y_max: Some(5.0),
        };

        let config = spec.to_chartjs();
        assert_eq!(config["type"], "bar");
        assert_eq!(config["data"]["labels"][1], "#2");
        assert_eq!(config["data"]["datasets"][0]["data"][0], 4.5);
        assert_eq!(config["options"]["scales"]["y"]["max"], 5.0);
    }
}
