//! Recommendation / patient record types.
//!
//! One shape serves both dashboards: clinician rows carry a patient name,
//! averaged feedback, risks and an explanation; patient history rows only
//! carry the BMI and the three recommendation lists.

use serde::{Deserialize, Deserializer, Serialize};

/// BMI at or above which a record is flagged "High BMI".
pub const HIGH_BMI_THRESHOLD: f64 = 30.0;

/// Feedback strictly below which a record is flagged "Low Feedback".
pub const LOW_FEEDBACK_THRESHOLD: f64 = 3.0;

/// Placeholder for absent numeric values.
pub const NOT_AVAILABLE: &str = "N/A";

/// A single record as returned by `/clinician-data`, `/history` or `/recommend`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Patient name (clinician view only)
    #[serde(default)]
    pub name: Option<String>,

    /// Body mass index; absent or non-numeric on the wire decodes as `None`
    #[serde(default, deserialize_with = "lenient_number")]
    pub bmi: Option<f64>,

    #[serde(default, deserialize_with = "lenient_list")]
    pub diet: Vec<String>,

    #[serde(default, deserialize_with = "lenient_list")]
    pub exercise: Vec<String>,

    #[serde(default, deserialize_with = "lenient_list")]
    pub general: Vec<String>,

    /// Average feedback score, roughly 0-5
    #[serde(default, deserialize_with = "lenient_number")]
    pub feedback: Option<f64>,

    /// Risks computed server-side; empty means "derive locally"
    #[serde(default, deserialize_with = "lenient_list")]
    pub risks: Vec<String>,

    #[serde(default)]
    pub ai_explanation: Option<String>,
}

/// Which list-valued field of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListField {
    Diet,
    Exercise,
    General,
}

impl ListField {
    pub const ALL: [ListField; 3] = [Self::Diet, Self::Exercise, Self::General];

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Diet => "Diet",
            Self::Exercise => "Exercise",
            Self::General => "General",
        }
    }
}

impl Record {
    /// Items of one of the list-valued fields.
    #[must_use]
    pub fn list(&self, field: ListField) -> &[String] {
        match field {
            ListField::Diet => &self.diet,
            ListField::Exercise => &self.exercise,
            ListField::General => &self.general,
        }
    }

    /// Display name, falling back to "Unknown".
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => "Unknown",
        }
    }

    /// Risk labels to display.
    ///
    /// Explicit risks win. Otherwise "High BMI" and "Low Feedback" are
    /// synthesized from the thresholds. Empty means "None".
    #[must_use]
    pub fn derived_risks(&self) -> Vec<String> {
        if !self.risks.is_empty() {
            return self.risks.clone();
        }

        let mut risks = Vec::new();
        if self.bmi.is_some_and(|bmi| bmi >= HIGH_BMI_THRESHOLD) {
            risks.push("High BMI".to_string());
        }
        if self
            .feedback
            .is_some_and(|feedback| feedback < LOW_FEEDBACK_THRESHOLD)
        {
            risks.push("Low Feedback".to_string());
        }
        risks
    }
}

/// BMI with two decimals, or "N/A".
#[must_use]
pub fn format_bmi(bmi: Option<f64>) -> String {
    match bmi {
        Some(value) => format!("{value:.2}"),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Feedback with one decimal and a "/5" suffix, or "N/A".
#[must_use]
pub fn format_feedback(feedback: Option<f64>) -> String {
    match feedback {
        Some(value) => format!("{value:.1}/5"),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Risk list joined for display, "None" when empty.
#[must_use]
pub fn format_risks(risks: &[String]) -> String {
    if risks.is_empty() {
        "None".to_string()
    } else {
        risks.join(", ")
    }
}

/// Accept numbers, numeric strings and null; anything else is absent.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
    .filter(|n| n.is_finite()))
}

/// Accept arrays of strings, a single comma-joined string, or null.
fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let items = match value {
        Some(serde_json::Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                serde_json::Value::String(s) => Some(s),
                serde_json::Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        Some(serde_json::Value::String(joined)) => joined
            .split(", ")
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    };
    Ok(items.into_iter().filter(|s| !s.trim().is_empty()).collect())
}
