//! Client-side band filters over the record set.

use super::record::Record;

/// BMI band selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BmiBand {
    #[default]
    All,
    /// BMI < 25
    Low,
    /// 25 <= BMI < 30
    Medium,
    /// BMI >= 30
    High,
}

/// Feedback band selection. There is no medium band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedbackBand {
    #[default]
    All,
    /// feedback < 3
    Low,
    /// feedback >= 4
    High,
}

impl BmiBand {
    /// Whether a BMI value falls into this band. Absent values only pass `All`.
    #[must_use]
    pub fn matches(&self, bmi: Option<f64>) -> bool {
        match (self, bmi) {
            (Self::All, _) => true,
            (_, None) => false,
            (Self::Low, Some(b)) => b < 25.0,
            (Self::Medium, Some(b)) => (25.0..30.0).contains(&b),
            (Self::High, Some(b)) => b >= 30.0,
        }
    }

    /// Next selection, for cycling through a form control.
    #[must_use]
    pub fn next(&self) -> Self {
        match self {
            Self::All => Self::Low,
            Self::Low => Self::Medium,
            Self::Medium => Self::High,
            Self::High => Self::All,
        }
    }

    /// Query parameter value used by `/export-pdf`.
    #[must_use]
    pub fn as_param(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Low => "Low (<25)",
            Self::Medium => "Medium (25-30)",
            Self::High => "High (30+)",
        }
    }
}

impl FeedbackBand {
    /// Whether a feedback value falls into this band. Absent values only pass `All`.
    #[must_use]
    pub fn matches(&self, feedback: Option<f64>) -> bool {
        match (self, feedback) {
            (Self::All, _) => true,
            (_, None) => false,
            (Self::Low, Some(f)) => f < 3.0,
            (Self::High, Some(f)) => f >= 4.0,
        }
    }

    #[must_use]
    pub fn next(&self) -> Self {
        match self {
            Self::All => Self::Low,
            Self::Low => Self::High,
            Self::High => Self::All,
        }
    }

    #[must_use]
    pub fn as_param(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Low => "low",
            Self::High => "high",
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Low => "Low (<3)",
            Self::High => "High (4+)",
        }
    }
}

/// The two independent filter selections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilterState {
    pub bmi: BmiBand,
    pub feedback: FeedbackBand,
}

impl FilterState {
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        self.bmi.matches(record.bmi) && self.feedback.matches(record.feedback)
    }

    /// Filter a record set, preserving order.
    #[must_use]
    pub fn apply(&self, records: &[Record]) -> Vec<Record> {
        records
            .iter()
            .filter(|record| self.matches(record))
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn is_unfiltered(&self) -> bool {
        self.bmi == BmiBand::All && self.feedback == FeedbackBand::All
    }

    /// Query string for `/export-pdf`.
    #[must_use]
    pub fn query_string(&self) -> String {
        format!(
            "bmi={}&feedback={}",
            self.bmi.as_param(),
            self.feedback.as_param()
        )
    }

    /// Human-readable summary, e.g. "BMI: High (30+) | Feedback: All".
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "BMI: {} | Feedback: {}",
            self.bmi.label(),
            self.feedback.label()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(bmi: Option<f64>, feedback: Option<f64>) -> Record {
        Record {
            bmi,
            feedback,
            ..Default::default()
        }
    }

    fn sample() -> Vec<Record> {
        vec![
            record(Some(22.0), Some(4.5)),
            record(Some(25.0), Some(2.0)),
            record(Some(29.99), None),
            record(Some(30.0), Some(3.5)),
            record(None, Some(1.0)),
            record(Some(41.2), Some(4.0)),
        ]
    }

    #[test]
    fn test_bmi_bands() {
        let records = sample();

        let high = FilterState {
            bmi: BmiBand::High,
            ..Default::default()
        }
        .apply(&records);
        assert_eq!(high.len(), 2);
        assert!(high.iter().all(|r| r.bmi.is_some_and(|b| b >= 30.0)));

        let medium = FilterState {
            bmi: BmiBand::Medium,
            ..Default::default()
        }
        .apply(&records);
        assert_eq!(medium.len(), 2);

        let low = FilterState {
            bmi: BmiBand::Low,
            ..Default::default()
        }
        .apply(&records);
        assert_eq!(low.len(), 1);
    }

    #[test]
    fn test_feedback_low_excludes_absent() {
        let records = sample();
        let low = FilterState {
            feedback: FeedbackBand::Low,
            ..Default::default()
        }
        .apply(&records);

        assert_eq!(low.len(), 2);
        assert!(low.iter().all(|r| r.feedback.is_some_and(|f| f < 3.0)));
    }

    #[test]
    fn test_feedback_high_and_combined() {
        let records = sample();
        let state = FilterState {
            bmi: BmiBand::High,
            feedback: FeedbackBand::High,
        };
        let filtered = state.apply(&records);
        assert_eq!(filtered, vec![record(Some(41.2), Some(4.0))]);
    }

    #[test]
    fn test_all_keeps_everything_in_order() {
        let records = sample();
        assert_eq!(FilterState::default().apply(&records), records);
        assert!(FilterState::default().is_unfiltered());
    }

    #[test]
    fn test_cycling_and_query() {
        assert_eq!(BmiBand::High.next(), BmiBand::All);
        assert_eq!(FeedbackBand::Low.next(), FeedbackBand::High);

        let state = FilterState {
            bmi: BmiBand::Medium,
            feedback: FeedbackBand::Low,
        };
        assert_eq!(state.query_string(), "bmi=medium&feedback=low");
    }
}
