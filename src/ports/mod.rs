//! Ports layer: Trait definitions for external operations.
//!
//! Following Hexagonal Architecture, these traits define the boundaries
//! between the application and external systems (HTTP backend, chart
//! render targets).

mod chart;
mod transport;

pub use chart::{ChartBackend, ChartHandle, ChartKind, ChartSeries, ChartSpec};
pub use transport::{HttpResponse, HttpTransport, TransportError};
