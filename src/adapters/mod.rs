//! Adapters layer: Concrete implementations of ports.
//!
//! - `http`: reqwest transport with a cookie store
//! - `charts`: in-memory chart instances for the terminal and HTML report
//! - `sanitize`: secret redaction for logs

pub mod charts;
pub mod http;
pub mod sanitize;

pub use charts::RetainedCharts;
pub use http::ReqwestTransport;
