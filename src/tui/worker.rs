//! Background worker for network actions.
//!
//! Each action runs as one task on the tokio runtime and reports back over
//! a channel the main loop polls between frames. The app keeps at most one
//! handle; while it exists the dashboard is busy and refuses new actions.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::application::{DashboardApi, DashboardData, ExportWriter, GuardOutcome};
use crate::domain::{
    FeedbackScore, FilterState, Identity, LoginCredentials, LoginPage, Record,
    RecommendationRequest, Role, UserCharts,
};
use crate::ports::HttpTransport;
use crate::DashError;

/// A network action requested by the UI.
#[derive(Debug)]
pub enum Task {
    /// Check the session and load the dashboard
    Guard,
    /// Log in, then check the session and load the dashboard
    Login(LoginCredentials),
    /// Register a new patient, then continue as after a login
    Register(LoginCredentials),
    /// Reload the dashboard for the admitted identity
    Refresh(Identity),
    Recommend {
        request: RecommendationRequest,
        user_id: Option<i64>,
    },
    Feedback(FeedbackScore),
    ExportPdf(FilterState),
    /// Save an already rendered HTML report
    ExportHtml(String),
    Logout,
}

impl Task {
    /// Short label for the busy indicator.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Guard => "Checking session",
            Self::Login(_) => "Logging in",
            Self::Register(_) => "Registering",
            Self::Refresh(_) => "Loading",
            Self::Recommend { .. } => "Requesting recommendation",
            Self::Feedback(_) => "Sending feedback",
            Self::ExportPdf(_) => "Downloading PDF",
            Self::ExportHtml(_) => "Saving report",
            Self::Logout => "Logging out",
        }
    }
}

/// Result of a finished task.
#[derive(Debug)]
pub enum TaskOutcome {
    /// Session admitted; the dashboard load may still have failed
    Admitted {
        identity: Identity,
        data: Result<DashboardData, DashError>,
    },
    Redirected(LoginPage),
    LoginRejected(String),
    Refreshed(Result<DashboardData, DashError>),
    Recommended {
        record: Record,
        /// Fresh server history, if the refresh succeeded
        history: Option<Vec<Record>>,
        trend: Option<UserCharts>,
    },
    RecommendFailed(String),
    FeedbackSent,
    FeedbackFailed(String),
    Exported(PathBuf),
    ExportFailed(String),
    LoggedOut,
}

/// Handle to a running task.
pub struct TaskHandle {
    /// Receiver for the outcome
    pub outcome_rx: Receiver<TaskOutcome>,
    label: &'static str,
    handle: JoinHandle<()>,
}

impl TaskHandle {
    /// Try to receive the outcome (non-blocking).
    #[must_use]
    pub fn try_recv(&self) -> Option<TaskOutcome> {
        self.outcome_rx.try_recv().ok()
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Whether the task has stopped, with or without sending an outcome.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Spawns tasks on the runtime.
pub struct TaskWorker;

impl TaskWorker {
    /// Spawn `task` for `role`.
    pub fn spawn<H>(
        runtime: &Handle,
        api: DashboardApi<H>,
        exports: ExportWriter,
        role: Role,
        task: Task,
    ) -> TaskHandle
    where
        H: HttpTransport + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let label = task.label();
        tracing::debug!("Starting task: {}", label);

        let handle = runtime.spawn(async move {
            Self::run(api, exports, role, task, tx).await;
        });

        TaskHandle {
            outcome_rx: rx,
            label,
            handle,
        }
    }

    async fn run<H>(
        api: DashboardApi<H>,
        exports: ExportWriter,
        role: Role,
        task: Task,
        tx: Sender<TaskOutcome>,
    ) where
        H: HttpTransport + 'static,
    {
        let outcome = match task {
            Task::Guard => Self::admit(&api, role).await,
            Task::Login(credentials) => match api.login(role, &credentials).await {
                Ok(response) => {
                    tracing::info!(
                        "Logged in as {}",
                        response.name.as_deref().unwrap_or(role.as_str())
                    );
                    Self::admit(&api, role).await
                }
                Err(e) => {
                    tracing::warn!("Login failed: {}", e);
                    rejected(&e, "Login failed. Check your name and code.")
                }
            },
            Task::Register(credentials) => match api.register(&credentials).await {
                Ok(response) => {
                    tracing::info!("Registered patient #{}", response.user_id.unwrap_or_default());
                    Self::admit(&api, role).await
                }
                Err(e) => {
                    tracing::warn!("Registration failed: {}", e);
                    rejected(&e, "Registration failed. Please try again.")
                }
            },
            Task::Refresh(identity) => {
                TaskOutcome::Refreshed(api.load_dashboard(role, &identity).await)
            }
            Task::Recommend { request, user_id } => match api.recommend(&request).await {
                Ok(record) => {
                    let history = match api.history().await {
                        Ok(history) => Some(history),
                        Err(e) => {
                            tracing::warn!("History refresh failed, keeping local history: {}", e);
                            None
                        }
                    };
                    let trend = match user_id {
                        Some(id) => match api.user_charts(id).await {
                            Ok(trend) => Some(trend),
                            Err(e) => {
                                tracing::warn!("Trend refresh failed, keeping previous chart: {}", e);
                                None
                            }
                        },
                        None => None,
                    };
                    TaskOutcome::Recommended {
                        record,
                        history,
                        trend,
                    }
                }
                Err(e) => {
                    tracing::error!("Recommendation failed: {}", e);
                    TaskOutcome::RecommendFailed(failure_reason(&e))
                }
            },
            Task::Feedback(score) => match api.submit_feedback(score).await {
                Ok(()) => TaskOutcome::FeedbackSent,
                Err(e) => {
                    tracing::error!("Feedback failed: {}", e);
                    TaskOutcome::FeedbackFailed(failure_reason(&e))
                }
            },
            Task::ExportPdf(filter) => {
                let result = match api.export_pdf(&filter).await {
                    Ok(bytes) => exports.save_pdf(&bytes).await,
                    Err(e) => Err(e),
                };
                Self::exported(result)
            }
            Task::ExportHtml(markup) => Self::exported(exports.save_html(&markup).await),
            Task::Logout => {
                if let Err(e) = api.logout().await {
                    tracing::warn!("Logout call failed, clearing local session anyway: {}", e);
                }
                TaskOutcome::LoggedOut
            }
        };

        // The app may have quit; nobody is listening then.
        let _ = tx.send(outcome);
    }

    async fn admit<H>(api: &DashboardApi<H>, role: Role) -> TaskOutcome
    where
        H: HttpTransport + 'static,
    {
        match api.require_role(role).await {
            GuardOutcome::Admitted(identity) => {
                let data = api.load_dashboard(role, &identity).await;
                TaskOutcome::Admitted { identity, data }
            }
            GuardOutcome::Redirected(page) => TaskOutcome::Redirected(page),
        }
    }

    fn exported(result: Result<PathBuf, DashError>) -> TaskOutcome {
        match result {
            Ok(path) => TaskOutcome::Exported(path),
            Err(e) => {
                tracing::error!("Export failed: {}", e);
                TaskOutcome::ExportFailed(failure_reason(&e))
            }
        }
    }
}

/// Login screen error: the backend message, else `fallback`.
fn rejected(error: &DashError, fallback: &str) -> TaskOutcome {
    TaskOutcome::LoginRejected(error.server_message().unwrap_or(fallback).to_string())
}

/// Generic reason shown in alerts; the backend message when it sent one.
fn failure_reason(error: &DashError) -> String {
    match error.server_message() {
        Some(message) => message.to_string(),
        None => match error {
            DashError::Validation(message) => message.clone(),
            DashError::Io(_) => "Could not write the file.".to_string(),
            _ => "The server could not be reached. Please try again.".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use crate::application::RetryPolicy;
    use crate::ports::{HttpResponse, TransportError};
    use crate::testing::ScriptedTransport;

    fn run_task(transport: ScriptedTransport, role: Role, task: Task) -> (TaskOutcome, Arc<ScriptedTransport>) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("Runtime");
        let transport = Arc::new(transport);
        let api = DashboardApi::new(
            transport.clone(),
            RetryPolicy::new(3, Duration::from_millis(1)),
        );
        let exports = ExportWriter::new(std::env::temp_dir().join("dietdash-worker-tests"));

        let handle = TaskWorker::spawn(runtime.handle(), api, exports, role, task);
        let outcome = runtime.block_on(async {
            loop {
                if let Some(outcome) = handle.try_recv() {
                    break outcome;
                }
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        });
        (outcome, transport)
    }

    #[test]
    fn test_guard_admits_and_loads() {
        let transport = ScriptedTransport::new()
            .ok_json("GET", "/whoami", serde_json::json!({"role": "clinician", "name": "Dr. Rao"}))
            .ok_json("GET", "/clinician-data", serde_json::json!([{"name": "Ana", "bmi": 31.0}]));

        let (outcome, _) = run_task(transport, Role::Clinician, Task::Guard);

        match outcome {
            TaskOutcome::Admitted { identity, data } => {
                assert_eq!(identity.display_name(), "Dr. Rao");
                assert_eq!(data.expect("Loaded").records.len(), 1);
            }
            other => panic!("Expected admission, got {other:?}"),
        }
    }

    #[test]
    fn test_guard_redirects_without_loading() {
        let transport = ScriptedTransport::new()
            .ok_json("GET", "/whoami", serde_json::json!({"role": "patient"}));

        let (outcome, transport) = run_task(transport, Role::Clinician, Task::Guard);

        assert!(matches!(outcome, TaskOutcome::Redirected(LoginPage::Clinician)));
        assert!(transport.calls_to("/clinician-data").is_empty());
    }

    #[test]
    fn test_recommend_falls_back_when_history_fails() {
        let transport = ScriptedTransport::new()
            .ok_json("POST", "/recommend", serde_json::json!({"bmi": 23.0, "diet": ["x"]}))
            .reply("GET", "/history", Err(TransportError::Timeout));
        let request = RecommendationRequest::parse(
            "30",
            "70",
            "175",
            crate::domain::ActivityLevel::Low,
            crate::domain::DietPreference::NonVegetarian,
        )
        .expect("Valid");

        let (outcome, _) = run_task(
            transport,
            Role::Patient,
            Task::Recommend {
                request,
                user_id: None,
            },
        );

        match outcome {
            TaskOutcome::Recommended { record, history, trend } => {
                assert_eq!(record.bmi, Some(23.0));
                assert!(history.is_none());
                assert!(trend.is_none());
            }
            other => panic!("Expected recommendation, got {other:?}"),
        }
    }

    #[test]
    fn test_register_reports_taken_code() {
        let transport = ScriptedTransport::new().reply(
            "POST",
            "/patient-register",
            Ok(HttpResponse::new(
                409,
                "{\"error\": \"This code is already used. Choose another 6-digit code.\"}",
            )),
        );
        let credentials = LoginCredentials::new("Ana Silva", "123456").expect("Valid");

        let (outcome, transport) = run_task(transport, Role::Patient, Task::Register(credentials));

        match outcome {
            TaskOutcome::LoginRejected(message) => {
                assert_eq!(message, "This code is already used. Choose another 6-digit code.");
            }
            other => panic!("Expected rejection, got {other:?}"),
        }
        assert!(transport.calls_to("/whoami").is_empty());
    }

    #[test]
    fn test_register_admits_new_patient() {
        let transport = ScriptedTransport::new()
            .ok_json(
                "POST",
                "/patient-register",
                serde_json::json!({"message": "Registered & logged in", "user_id": 12, "name": "Ana"}),
            )
            .ok_json(
                "GET",
                "/whoami",
                serde_json::json!({"role": "patient", "name": "Ana", "user_id": 12}),
            )
            .ok_json("GET", "/history", serde_json::json!([]));
        let credentials = LoginCredentials::new("Ana", "654321").expect("Valid");

        let (outcome, _) = run_task(transport, Role::Patient, Task::Register(credentials));

        match outcome {
            TaskOutcome::Admitted { identity, data } => {
                assert_eq!(identity.user_id, Some(12));
                assert!(data.expect("Loaded").records.is_empty());
            }
            other => panic!("Expected admission, got {other:?}"),
        }
    }

    #[test]
    fn test_logout_clears_even_when_call_fails() {
        let transport = ScriptedTransport::new().reply(
            "POST",
            "/logout",
            Ok(HttpResponse::new(500, "")),
        );

        let (outcome, _) = run_task(transport, Role::Patient, Task::Logout);
        assert!(matches!(outcome, TaskOutcome::LoggedOut));
    }

    #[test]
    fn test_failure_reason_prefers_server_message() {
        let rejected = DashError::Status {
            path: "/feedback".to_string(),
            status: 400,
            message: Some("Invalid feedback".to_string()),
        };
        assert_eq!(failure_reason(&rejected), "Invalid feedback");

        let unreachable = DashError::Transport(TransportError::Timeout);
        assert!(failure_reason(&unreachable).contains("could not be reached"));
    }
}
