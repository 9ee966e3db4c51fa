//! # dietdash
//!
//! Terminal dashboard for the diet recommendation service.
//!
//! This crate provides:
//! - A session guard that admits only the expected role
//! - A resilient JSON fetcher with bounded linear-backoff retries
//! - HTML table rendering with escaping and "show all" disclosures
//! - Chart datasets with destroy-before-recreate instance management
//! - Client-side BMI / feedback band filters over the retained record set
//! - A terminal UI for patients and clinicians
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core types (Record, Identity, FilterState, History)
//! - `ports`: Trait definitions for external operations (HTTP, charts)
//! - `adapters`: Concrete implementations (reqwest, chart store, log sanitizer)
//! - `application`: The guarded-fetch pipeline and the page controller
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod tui;

#[cfg(test)]
pub(crate) mod testing;

pub use config::Config;
pub use domain::{FilterState, Identity, Record, Role};

/// Result type for dietdash operations
pub type Result<T> = std::result::Result<T, DashError>;

/// Main error type for dietdash
#[derive(Debug, thiserror::Error)]
pub enum DashError {
    #[error("Transport error: {0}")]
    Transport(#[from] ports::TransportError),

    #[error("{path} returned HTTP {status}")]
    Status {
        path: String,
        status: u16,
        message: Option<String>,
    },

    #[error("Malformed response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DashError {
    /// Message the backend attached to a rejected request, if any.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Whether the backend refused the session (401/403).
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status: 401 | 403, .. })
    }
}
