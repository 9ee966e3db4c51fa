//! Domain layer: records, identities, filters and request payloads.
//!
//! Pure types with no I/O. Wire decoding is lenient where the backend is
//! loose (numbers as strings, nulls, comma-joined lists).

mod filter;
mod history;
mod identity;
mod record;
mod requests;

pub use filter::{BmiBand, FeedbackBand, FilterState};
pub use history::{History, HISTORY_CAPACITY};
pub use identity::{Identity, LoginPage, Role};
pub use record::{
    format_bmi, format_feedback, format_risks, ListField, Record, HIGH_BMI_THRESHOLD,
    LOW_FEEDBACK_THRESHOLD, NOT_AVAILABLE,
};
pub use requests::{
    ActivityLevel, DietPreference, FeedbackScore, LoginCredentials, LoginResponse,
    RecommendationRequest, RecommendationResponse, UserCharts,
};
