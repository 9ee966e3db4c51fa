//! Payloads sent to the backend and the chart series it returns.
//!
//! Validation stays at presence and numeric checks; range rules live on
//! the server.

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::record::Record;

/// Activity level accepted by `/recommend`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityLevel {
    Low,
    High,
}

impl ActivityLevel {
    #[must_use]
    pub fn toggle(&self) -> Self {
        match self {
            Self::Low => Self::High,
            Self::High => Self::Low,
        }
    }
}

impl std::fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::High => write!(f, "High"),
        }
    }
}

/// Diet preference accepted by `/recommend`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DietPreference {
    Vegetarian,
    #[serde(rename = "Non-Vegetarian")]
    NonVegetarian,
}

impl DietPreference {
    #[must_use]
    pub fn toggle(&self) -> Self {
        match self {
            Self::Vegetarian => Self::NonVegetarian,
            Self::NonVegetarian => Self::Vegetarian,
        }
    }
}

impl std::fmt::Display for DietPreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vegetarian => write!(f, "Vegetarian"),
            Self::NonVegetarian => write!(f, "Non-Vegetarian"),
        }
    }
}

/// Body of `POST /recommend`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationRequest {
    pub age: u32,
    /// Weight in kilograms
    pub weight: f64,
    /// Height in centimetres
    pub height: f64,
    pub activity_level: ActivityLevel,
    pub diet_preference: DietPreference,
}

impl RecommendationRequest {
    /// Build from raw form input.
    ///
    /// # Errors
    /// Returns a message naming the first missing or non-numeric field.
    pub fn parse(
        age: &str,
        weight: &str,
        height: &str,
        activity_level: ActivityLevel,
        diet_preference: DietPreference,
    ) -> Result<Self, String> {
        Ok(Self {
            age: parse_field("Age", age)?,
            weight: parse_field("Weight", weight)?,
            height: parse_field("Height", height)?,
            activity_level,
            diet_preference,
        })
    }
}

/// Body of `POST /feedback`: an integer score from 1 to 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeedbackScore {
    pub score: u8,
}

impl FeedbackScore {
    /// # Errors
    /// Returns a message if the score is missing, non-numeric or outside 1-5.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let score: u8 = parse_field("Score", raw)?;
        if !(1..=5).contains(&score) {
            return Err("Score: Value must be between 1 and 5".to_string());
        }
        Ok(Self { score })
    }
}

/// Name + 6-digit code for `/patient-login` and `/clinician-login`.
///
/// The code is wiped from memory when the credentials are dropped.
#[derive(Clone, Serialize, Zeroize, ZeroizeOnDrop)]
pub struct LoginCredentials {
    pub name: String,
    pub code: String,
}

impl std::fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("name", &self.name)
            .field("code", &"******")
            .finish()
    }
}

impl LoginCredentials {
    /// # Errors
    /// Returns a message if the name is empty or the code is not 6 digits.
    pub fn new(name: &str, code: &str) -> Result<Self, String> {
        let name = name.trim();
        let code = code.trim();

        if name.is_empty() {
            return Err("Name: Required".to_string());
        }
        if code.len() != 6 || !code.chars().all(|c| c.is_ascii_digit()) {
            return Err("Code: Must be 6 digits".to_string());
        }

        Ok(Self {
            name: name.to_string(),
            code: code.to_string(),
        })
    }
}

/// Response of a successful login.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub clinician_id: Option<i64>,
}

/// Response of `GET /user-charts/:id`: every recommendation of one patient,
/// oldest first, with list fields flattened.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UserCharts {
    #[serde(default)]
    pub bmi: Vec<Option<f64>>,
    #[serde(default)]
    pub diet: Vec<String>,
    #[serde(default)]
    pub exercise: Vec<String>,
    #[serde(default)]
    pub general: Vec<String>,
}

impl UserCharts {
    /// Newest-first table rows built from the BMI series, at most `limit`.
    ///
    /// The list fields are flattened across recommendations, so the rows
    /// carry BMI only.
    #[must_use]
    pub fn recent_records(&self, limit: usize) -> Vec<Record> {
        self.bmi
            .iter()
            .rev()
            .take(limit)
            .map(|&bmi| Record {
                bmi,
                ..Default::default()
            })
            .collect()
    }
}

/// Response of `POST /recommend`: the record plus the owning user id.
#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationResponse {
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(flatten)]
    pub record: Record,
}

fn parse_field<T: std::str::FromStr>(label: &str, raw: &str) -> Result<T, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(format!("{label}: Required"));
    }
    raw.parse()
        .map_err(|_| format!("{label}: Invalid number"))
}
