//! Main TUI application state machine.
//!
//! Handles:
//! - Screen navigation
//! - Input event handling
//! - Network actions via the background worker, one at a time

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::adapters::{ReqwestTransport, RetainedCharts};
use crate::application::{DashboardApi, DashboardController, ExportWriter, StatusLevel};
use crate::config::Config;
use crate::domain::{FilterState, LoginCredentials, Role};
use crate::ports::HttpTransport;

use super::ui::{
    dashboard::{render_dashboard, DashboardView},
    feedback::{render_feedback_form, FeedbackFormState},
    login::{render_login, LoginFormState},
    recommend::{render_recommend_form, RecommendFormState},
    render_alert, Alert,
};
use super::worker::{Task, TaskHandle, TaskOutcome, TaskWorker};

/// Shown when an action is requested while another is in flight.
const BUSY_MESSAGE: &str = "Please wait for the current request to finish.";

/// Shown when a task stops without reporting an outcome.
const TASK_LOST_MESSAGE: &str = "The request stopped unexpectedly. Please try again.";

/// Current screen/view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Dashboard,
    Recommend,
    Feedback,
}

/// Main application state
pub struct App<H: HttpTransport + 'static = ReqwestTransport> {
    screen: Screen,
    should_quit: bool,

    /// Runtime the worker tasks run on
    runtime: tokio::runtime::Runtime,
    api: DashboardApi<H>,
    exports: ExportWriter,

    controller: DashboardController<RetainedCharts>,
    view: DashboardView,
    login_state: LoginFormState,
    recommend_state: RecommendFormState,
    feedback_state: FeedbackFormState,

    /// Blocking alert; swallows input until dismissed
    alert: Option<Alert>,

    /// In-flight task; `Some` means busy
    pending: Option<TaskHandle>,
}

impl App {
    /// Create the application from configuration.
    ///
    /// # Errors
    /// Returns error if the runtime or the HTTP client cannot be created.
    pub fn new(config: &Config) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;
        let transport = Arc::new(ReqwestTransport::new(&config.api_url, config.http_timeout)?);
        let api = DashboardApi::new(transport, config.retry);

        Ok(Self::with_dependencies(
            runtime,
            api,
            ExportWriter::new(config.export_dir.clone()),
            config.role,
        ))
    }
}

impl<H: HttpTransport + 'static> App<H> {
    /// Create application with injected dependencies.
    pub fn with_dependencies(
        runtime: tokio::runtime::Runtime,
        api: DashboardApi<H>,
        exports: ExportWriter,
        role: Role,
    ) -> Self {
        Self {
            screen: Screen::Dashboard,
            should_quit: false,
            runtime,
            api,
            exports,
            controller: DashboardController::new(role, RetainedCharts::new()),
            view: DashboardView::default(),
            login_state: LoginFormState::default(),
            recommend_state: RecommendFormState::default(),
            feedback_state: FeedbackFormState::default(),
            alert: None,
            pending: None,
        }
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        // Nothing initializes before the session guard has run.
        self.start(Task::Guard);

        let result = self.main_loop(&mut terminal);

        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            self.poll_worker();

            terminal.draw(|f| {
                let area = f.area();
                let busy = self.pending.as_ref().map(TaskHandle::label);
                let role = self.controller.role();

                match self.screen {
                    Screen::Login => render_login(f, area, &self.login_state, role, busy),
                    Screen::Dashboard => {
                        render_dashboard(f, area, &self.controller, &self.view, busy)
                    }
                    Screen::Recommend => {
                        render_recommend_form(f, area, &self.recommend_state, busy)
                    }
                    Screen::Feedback => render_feedback_form(f, area, &self.feedback_state, busy),
                }

                if let Some(alert) = &self.alert {
                    render_alert(f, alert);
                }
            })?;

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code, key.modifiers);
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Spawn `task` unless another one is still running.
    fn start(&mut self, task: Task) -> bool {
        if self.pending.is_some() {
            tracing::debug!("Refused '{}' while busy", task.label());
            self.controller.set_status(StatusLevel::Warning, BUSY_MESSAGE);
            return false;
        }

        self.pending = Some(TaskWorker::spawn(
            self.runtime.handle(),
            self.api.clone(),
            self.exports.clone(),
            self.controller.role(),
            task,
        ));
        true
    }

    /// Poll the background worker for its outcome.
    fn poll_worker(&mut self) {
        let Some(handle) = self.pending.as_ref() else {
            return;
        };
        // Checked before receiving: a finished task has already sent, if it ever will.
        let finished = handle.is_finished();
        let outcome = handle.try_recv();
        if outcome.is_none() && !finished {
            return;
        }

        let label = handle.label();
        self.pending = None;
        if self
            .controller
            .status()
            .is_some_and(|s| s.text == BUSY_MESSAGE)
        {
            self.controller.clear_status();
        }

        match outcome {
            Some(outcome) => self.apply_outcome(outcome),
            None => {
                tracing::error!("Task '{}' stopped without an outcome", label);
                self.controller.set_status(StatusLevel::Error, TASK_LOST_MESSAGE);
            }
        }
    }

    fn apply_outcome(&mut self, outcome: TaskOutcome) {
        match outcome {
            TaskOutcome::Admitted { identity, data } => {
                self.login_state.clear();
                self.login_state.notice = None;
                self.controller.set_identity(identity);
                match data {
                    Ok(data) => self.controller.load(data),
                    Err(e) => self.controller.load_failed(&e),
                }
                self.view = DashboardView::default();
                self.screen = Screen::Dashboard;
            }
            TaskOutcome::Redirected(page) => {
                self.controller.reset();
                self.login_state.notice = Some(format!(
                    "Please log in as {} ({}).",
                    page.role().as_str(),
                    page.path()
                ));
                self.screen = Screen::Login;
            }
            TaskOutcome::LoginRejected(message) => {
                self.login_state.error_message = Some(message);
            }
            TaskOutcome::Refreshed(Ok(data)) => {
                self.controller.load(data);
                self.view.clamp(self.controller.records().len());
            }
            TaskOutcome::Refreshed(Err(e)) => self.controller.load_failed(&e),
            TaskOutcome::Recommended {
                record,
                history,
                trend,
            } => {
                match history {
                    Some(history) => self.controller.set_history(history),
                    None => self.controller.record_recommendation(record),
                }
                if let Some(trend) = trend {
                    self.controller.set_trend(trend);
                }
                self.recommend_state = RecommendFormState::default();
                self.view = DashboardView::default();
                self.controller
                    .set_status(StatusLevel::Info, "New recommendation added.");
                self.screen = Screen::Dashboard;
            }
            TaskOutcome::RecommendFailed(reason) => {
                self.alert = Some(Alert {
                    title: "Failed to get recommendation".to_string(),
                    message: reason,
                });
            }
            TaskOutcome::FeedbackSent => {
                self.feedback_state = FeedbackFormState::default();
                self.controller
                    .set_status(StatusLevel::Info, "Thank you for your feedback!");
                self.screen = Screen::Dashboard;
            }
            TaskOutcome::FeedbackFailed(reason) => {
                self.alert = Some(Alert {
                    title: "Failed to submit feedback".to_string(),
                    message: reason,
                });
            }
            TaskOutcome::Exported(path) => {
                self.controller
                    .set_status(StatusLevel::Info, format!("Saved {}", path.display()));
            }
            TaskOutcome::ExportFailed(reason) => {
                self.alert = Some(Alert {
                    title: "Export failed".to_string(),
                    message: reason,
                });
            }
            TaskOutcome::LoggedOut => {
                self.controller.reset();
                self.view = DashboardView::default();
                self.login_state.clear();
                self.login_state.notice = Some("You have been logged out.".to_string());
                self.screen = Screen::Login;
            }
        }
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        if key == KeyCode::Char('q') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        if self.alert.is_some() {
            if matches!(key, KeyCode::Enter | KeyCode::Esc) {
                self.alert = None;
            }
            return;
        }

        match self.screen {
            Screen::Login => self.handle_login_key(key),
            Screen::Dashboard => self.handle_dashboard_key(key),
            Screen::Recommend => self.handle_recommend_key(key),
            Screen::Feedback => self.handle_feedback_key(key),
        }
    }

    fn handle_login_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab | KeyCode::Down | KeyCode::Up => self.login_state.next_field(),
            KeyCode::Char(c) => self.login_state.input_char(c),
            KeyCode::Backspace => self.login_state.delete_char(),
            KeyCode::Enter => self.submit_login(Task::Login),
            KeyCode::F(2) if self.controller.role() == Role::Patient => {
                self.submit_login(Task::Register);
            }
            _ => {}
        }
    }

    /// Validate the login form and start `task` with its credentials.
    fn submit_login(&mut self, task: fn(LoginCredentials) -> Task) {
        if self.pending.is_some() {
            return;
        }
        match self.login_state.take_credentials() {
            Ok(credentials) => {
                self.start(task(credentials));
            }
            Err(e) => self.login_state.error_message = Some(e),
        }
    }

    fn handle_dashboard_key(&mut self, key: KeyCode) {
        let role = self.controller.role();
        let len = self.controller.records().len();

        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            KeyCode::Down => {
                self.view.select_next(len);
                self.view.expanded = false;
            }
            KeyCode::Up => {
                self.view.select_prev();
                self.view.expanded = false;
            }
            KeyCode::Char('x') | KeyCode::Char('X') | KeyCode::Enter => {
                self.view.expanded = len > 0 && !self.view.expanded;
            }
            KeyCode::Char('r') | KeyCode::Char('R') => self.refresh(),
            KeyCode::Char('h') | KeyCode::Char('H') => {
                let markup = self.controller.report_markup();
                self.start(Task::ExportHtml(markup));
            }
            KeyCode::Char('l') | KeyCode::Char('L') => {
                self.start(Task::Logout);
            }
            KeyCode::Char('b') | KeyCode::Char('B') if role == Role::Clinician => {
                let filter = self.controller.filter();
                self.apply_filters(FilterState {
                    bmi: filter.bmi.next(),
                    ..filter
                });
            }
            KeyCode::Char('f') | KeyCode::Char('F') if role == Role::Clinician => {
                let filter = self.controller.filter();
                self.apply_filters(FilterState {
                    feedback: filter.feedback.next(),
                    ..filter
                });
            }
            KeyCode::Char('p') | KeyCode::Char('P') if role == Role::Clinician => {
                self.start(Task::ExportPdf(self.controller.filter()));
            }
            KeyCode::Char('n') | KeyCode::Char('N') if role == Role::Patient => {
                self.recommend_state = RecommendFormState::default();
                self.screen = Screen::Recommend;
            }
            KeyCode::Char('f') | KeyCode::Char('F') if role == Role::Patient => {
                self.feedback_state = FeedbackFormState::default();
                self.screen = Screen::Feedback;
            }
            _ => {}
        }
    }

    fn handle_recommend_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => self.screen = Screen::Dashboard,
            KeyCode::Up | KeyCode::BackTab => self.recommend_state.prev_field(),
            KeyCode::Down | KeyCode::Tab => self.recommend_state.next_field(),
            KeyCode::Left | KeyCode::Right => self.recommend_state.toggle_choice(),
            KeyCode::Char(c) => self.recommend_state.input_char(c),
            KeyCode::Backspace => self.recommend_state.delete_char(),
            KeyCode::Enter => match self.recommend_state.to_request() {
                Ok(request) => {
                    let user_id = self.controller.identity().and_then(|i| i.user_id);
                    if !self.start(Task::Recommend { request, user_id }) {
                        self.recommend_state.error_message = Some(BUSY_MESSAGE.to_string());
                    }
                }
                Err(e) => self.recommend_state.error_message = Some(e),
            },
            _ => {}
        }
    }

    fn handle_feedback_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => self.screen = Screen::Dashboard,
            KeyCode::Char(c) => self.feedback_state.input_char(c),
            KeyCode::Backspace => self.feedback_state.delete_char(),
            KeyCode::Enter => match self.feedback_state.to_score() {
                Ok(score) => {
                    if !self.start(Task::Feedback(score)) {
                        self.feedback_state.error_message = Some(BUSY_MESSAGE.to_string());
                    }
                }
                Err(e) => self.feedback_state.error_message = Some(e),
            },
            _ => {}
        }
    }

    fn refresh(&mut self) {
        match self.controller.identity().cloned() {
            Some(identity) => {
                self.start(Task::Refresh(identity));
            }
            None => {
                self.start(Task::Guard);
            }
        }
    }

    fn apply_filters(&mut self, state: FilterState) {
        self.controller.apply_filters(state);
        self.view.clamp(self.controller.records().len());
        tracing::info!("Filters applied: {}", state.summary());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::application::RetryPolicy;
    use crate::ports::{HttpResponse, TransportError};
    use crate::testing::ScriptedTransport;

    fn app_with<H: HttpTransport + 'static>(transport: Arc<H>, role: Role) -> App<H> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .expect("Runtime");
        let api = DashboardApi::new(transport, RetryPolicy::new(1, Duration::from_millis(1)));
        let exports = ExportWriter::new(std::env::temp_dir().join("dietdash-app-tests"));
        App::with_dependencies(runtime, api, exports, role)
    }

    fn wait_idle<H: HttpTransport + 'static>(app: &mut App<H>) {
        for _ in 0..1000 {
            app.poll_worker();
            if app.pending.is_none() {
                return;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        panic!("Task did not finish");
    }

    fn clinician_backend() -> Arc<ScriptedTransport> {
        Arc::new(
            ScriptedTransport::new()
                .ok_json(
                    "GET",
                    "/whoami",
                    serde_json::json!({"role": "clinician", "name": "Dr. Rao"}),
                )
                .ok_json(
                    "GET",
                    "/clinician-data",
                    serde_json::json!([{"name": "Ana", "bmi": 31.0}]),
                ),
        )
    }

    #[test]
    fn test_second_action_refused_while_busy() {
        let transport = clinician_backend();
        let mut app = app_with(transport.clone(), Role::Clinician);

        assert!(app.start(Task::Guard));
        app.handle_key(KeyCode::Char('l'), KeyModifiers::NONE);

        let status = app.controller.status().expect("Busy status");
        assert_eq!(status.level, StatusLevel::Warning);
        assert_eq!(status.text, BUSY_MESSAGE);

        wait_idle(&mut app);

        assert!(app.controller.status().is_none());
        assert_eq!(app.screen, Screen::Dashboard);
        assert_eq!(app.controller.records().len(), 1);
        assert!(transport.calls_to("/logout").is_empty());
    }

    #[test]
    fn test_accepts_actions_once_idle() {
        let transport = clinician_backend();
        let mut app = app_with(transport.clone(), Role::Clinician);

        assert!(app.start(Task::Guard));
        wait_idle(&mut app);
        app.handle_key(KeyCode::Char('r'), KeyModifiers::NONE);
        assert!(app.pending.is_some());
        wait_idle(&mut app);

        assert_eq!(transport.calls_to("/clinician-data").len(), 2);
    }

    #[test]
    fn test_redirect_shows_login_notice() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .ok_json("GET", "/whoami", serde_json::json!({"role": null})),
        );
        let mut app = app_with(transport, Role::Patient);

        app.start(Task::Guard);
        wait_idle(&mut app);

        assert_eq!(app.screen, Screen::Login);
        let notice = app.login_state.notice.clone().expect("Notice");
        assert!(notice.contains("/login.html"));
    }

    #[test]
    fn test_register_key_only_on_patient_login() {
        let transport = Arc::new(ScriptedTransport::new());
        let mut app = app_with(transport.clone(), Role::Clinician);
        app.screen = Screen::Login;

        app.handle_key(KeyCode::F(2), KeyModifiers::NONE);
        assert!(app.pending.is_none());
        assert!(app.login_state.error_message.is_none());
    }

    struct BrokenTransport;

    #[async_trait]
    impl HttpTransport for BrokenTransport {
        async fn get(&self, _path: &str) -> Result<HttpResponse, TransportError> {
            panic!("transport bug");
        }

        async fn post(
            &self,
            _path: &str,
            _body: Option<&serde_json::Value>,
        ) -> Result<HttpResponse, TransportError> {
            panic!("transport bug");
        }
    }

    #[test]
    fn test_crashed_task_clears_busy_flag() {
        let mut app = app_with(Arc::new(BrokenTransport), Role::Clinician);

        assert!(app.start(Task::Guard));
        wait_idle(&mut app);

        let status = app.controller.status().expect("Error status");
        assert_eq!(status.level, StatusLevel::Error);
        assert_eq!(status.text, TASK_LOST_MESSAGE);
        assert!(app.start(Task::Guard));
    }
}
