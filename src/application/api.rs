//! Dashboard API service: the backend endpoints consumed by both dashboards.
//!
//! Reads go through the resilient fetcher. Writes (`POST`) and the PDF
//! download are single attempts: a failed form submission is reported to
//! the user rather than silently replayed.

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::domain::{
    FeedbackScore, FilterState, Identity, LoginCredentials, LoginResponse, Record,
    RecommendationRequest, RecommendationResponse, Role, UserCharts, HISTORY_CAPACITY,
};
use crate::ports::HttpTransport;
use crate::DashError;

use super::fetcher::{fetch_json_with_retry, RetryPolicy};
use super::session::{GuardOutcome, SessionGuard};

pub const CLINICIAN_DATA_PATH: &str = "/clinician-data";
pub const HISTORY_PATH: &str = "/history";
pub const RECOMMEND_PATH: &str = "/recommend";
pub const FEEDBACK_PATH: &str = "/feedback";
pub const EXPORT_PDF_PATH: &str = "/export-pdf";
pub const LOGOUT_PATH: &str = "/logout";
pub const REGISTER_PATH: &str = "/patient-register";

/// Data loaded for one dashboard.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardData {
    /// Table rows: clinician records, or the patient's recent history
    pub records: Vec<Record>,
    /// Patient BMI trend over every recommendation
    pub trend: Option<UserCharts>,
}

/// Service wrapping a shared transport with the retry policy.
pub struct DashboardApi<H: HttpTransport + ?Sized> {
    transport: Arc<H>,
    policy: RetryPolicy,
}

impl<H: HttpTransport + ?Sized> Clone for DashboardApi<H> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            policy: self.policy,
        }
    }
}

impl<H: HttpTransport + ?Sized> DashboardApi<H> {
    /// Create a new API service.
    pub fn new(transport: Arc<H>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    /// Run the session guard for `role`.
    pub async fn require_role(&self, role: Role) -> GuardOutcome {
        SessionGuard::new(self.transport.as_ref(), self.policy)
            .require_role(role)
            .await
    }

    /// Load everything a dashboard displays for an admitted session.
    ///
    /// # Errors
    /// Returns the fetch error if the table data cannot be loaded. For a
    /// patient either `/history` or the trend series is enough; the table
    /// falls back to rows built from the trend.
    pub async fn load_dashboard(
        &self,
        role: Role,
        identity: &Identity,
    ) -> Result<DashboardData, DashError> {
        match role {
            Role::Clinician => Ok(DashboardData {
                records: self.clinician_records().await?,
                trend: None,
            }),
            Role::Patient => {
                let trend = match identity.user_id {
                    Some(user_id) => match self.user_charts(user_id).await {
                        Ok(trend) => Some(trend),
                        Err(e) => {
                            tracing::warn!("Trend data unavailable: {}", e);
                            None
                        }
                    },
                    None => None,
                };
                let records = match (self.history().await, &trend) {
                    (Ok(records), _) => records,
                    (Err(e), Some(trend)) => {
                        tracing::warn!("History unavailable, using trend rows: {}", e);
                        trend.recent_records(HISTORY_CAPACITY)
                    }
                    (Err(e), None) => return Err(e),
                };
                Ok(DashboardData { records, trend })
            }
        }
    }

    /// Latest recommendations across patients (clinician view).
    ///
    /// # Errors
    /// Returns the last fetch error once retries are exhausted.
    pub async fn clinician_records(&self) -> Result<Vec<Record>, DashError> {
        fetch_json_with_retry(self.transport.as_ref(), CLINICIAN_DATA_PATH, self.policy).await
    }

    /// Latest recommendations, newest first.
    ///
    /// # Errors
    /// Returns the last fetch error once retries are exhausted.
    pub async fn history(&self) -> Result<Vec<Record>, DashError> {
        fetch_json_with_retry(self.transport.as_ref(), HISTORY_PATH, self.policy).await
    }

    /// Chart series for one patient.
    ///
    /// # Errors
    /// Returns the last fetch error once retries are exhausted.
    pub async fn user_charts(&self, user_id: i64) -> Result<UserCharts, DashError> {
        let path = format!("/user-charts/{user_id}");
        fetch_json_with_retry(self.transport.as_ref(), &path, self.policy).await
    }

    /// Request a new recommendation.
    ///
    /// # Errors
    /// Returns error if the request fails or the backend rejects it.
    pub async fn recommend(&self, request: &RecommendationRequest) -> Result<Record, DashError> {
        let body = serde_json::to_value(request)?;
        let response: RecommendationResponse = self.post_json(RECOMMEND_PATH, Some(&body)).await?;
        Ok(response.record)
    }

    /// Submit a feedback score.
    ///
    /// # Errors
    /// Returns error if the request fails or the backend rejects it.
    pub async fn submit_feedback(&self, score: FeedbackScore) -> Result<(), DashError> {
        let body = serde_json::to_value(score)?;
        let _: serde_json::Value = self.post_json(FEEDBACK_PATH, Some(&body)).await?;
        Ok(())
    }

    /// Log in with name and code for `role`.
    ///
    /// # Errors
    /// Returns error if the request fails or the credentials are refused.
    pub async fn login(
        &self,
        role: Role,
        credentials: &LoginCredentials,
    ) -> Result<LoginResponse, DashError> {
        let body = serde_json::to_value(credentials)?;
        self.post_json(role.login_endpoint(), Some(&body)).await
    }

    /// Register a new patient; the backend logs them in on success.
    ///
    /// # Errors
    /// Returns error if the request fails or the backend refuses the code
    /// (409 when it is already taken).
    pub async fn register(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<LoginResponse, DashError> {
        let body = serde_json::to_value(credentials)?;
        self.post_json(REGISTER_PATH, Some(&body)).await
    }

    /// End the session.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn logout(&self) -> Result<(), DashError> {
        let _: serde_json::Value = self.post_json(LOGOUT_PATH, None).await?;
        Ok(())
    }

    /// Download the filtered clinician report as PDF bytes.
    ///
    /// # Errors
    /// Returns error if the request fails or the backend refuses it.
    pub async fn export_pdf(&self, filter: &FilterState) -> Result<Vec<u8>, DashError> {
        let path = format!("{}?{}", EXPORT_PDF_PATH, filter.query_string());
        let response = self.transport.get(&path).await?;

        if !response.is_success() {
            return Err(DashError::Status {
                path,
                status: response.status,
                message: response.error_message(),
            });
        }

        tracing::info!("Downloaded report ({} bytes)", response.body.len());
        Ok(response.body)
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<T, DashError> {
        let response = self.transport.post(path, body).await?;

        if !response.is_success() {
            let message = response.error_message();
            tracing::warn!(
                "POST {} rejected with HTTP {}: {}",
                path,
                response.status,
                message.as_deref().unwrap_or("no message")
            );
            return Err(DashError::Status {
                path: path.to_string(),
                status: response.status,
                message,
            });
        }

        response.decode().map_err(|source| DashError::Decode {
            path: path.to_string(),
            source,
        })
    }
}
