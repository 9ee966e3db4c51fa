//! In-memory [`ChartBackend`] that keeps the spec of every live instance.
//!
//! The terminal UI draws whatever is bound to a canvas here; the HTML
//! report serializes the same specs as Chart.js configurations.

use std::collections::BTreeMap;

use crate::ports::{ChartBackend, ChartHandle, ChartSpec};

#[derive(Debug, Clone)]
struct Instance {
    canvas: String,
    spec: ChartSpec,
}

/// Chart instances retained in memory until destroyed.
#[derive(Debug, Default)]
pub struct RetainedCharts {
    next_id: u64,
    instances: BTreeMap<ChartHandle, Instance>,
}

impl RetainedCharts {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spec of the newest live instance on `canvas`.
    #[must_use]
    pub fn spec_for(&self, canvas: &str) -> Option<&ChartSpec> {
        self.instances
            .values()
            .rev()
            .find(|i| i.canvas == canvas)
            .map(|i| &i.spec)
    }

    /// Live instances across all canvases.
    #[must_use]
    pub fn total_live(&self) -> usize {
        self.instances.len()
    }
}

impl ChartBackend for RetainedCharts {
    fn create(&mut self, canvas: &str, spec: &ChartSpec) -> ChartHandle {
        self.next_id += 1;
        let handle = ChartHandle(self.next_id);
        self.instances.insert(
            handle,
            Instance {
                canvas: canvas.to_string(),
                spec: spec.clone(),
            },
        );
        handle
    }

    fn destroy(&mut self, handle: ChartHandle) {
        self.instances.remove(&handle);
    }

    fn live_instances(&self, canvas: &str) -> usize {
        self.instances.values().filter(|i| i.canvas == canvas).count()
    }
}
