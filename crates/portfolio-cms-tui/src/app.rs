//! Application state management for the portfolio dashboard.
//!
//! This module contains the core `App` struct that manages all application
//! state, including UI state, fetched content, the login form, and
//! background task coordination. Session state is owned by the shared
//! `SessionStore`; the app only observes it.

use std::future::Future;
use std::sync::Arc;

use portfolio_cms_core::api::{ApiClient, ApiError};
use portfolio_cms_core::auth::{AuthError, GuardDecision, Route, RouteGuard, SessionState, SessionStore};
use portfolio_cms_core::config::Config;
use portfolio_cms_core::models::{
    apply_status, group_by_category, DashboardStats, Employment, Message, MessageStatus, Project,
    Skill, UserProfile,
};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use crate::form::{FormKind, FormState};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
/// A full refresh issues five requests; 32 leaves room for user actions.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Maximum length for email input
const MAX_EMAIL_LENGTH: usize = 100;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Number of items to scroll on page up/down
pub const PAGE_SCROLL_SIZE: usize = 10;

// ============================================================================
// UI State Types
// ============================================================================

/// Main navigation tabs, one per protected route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Dashboard,
    Projects,
    Skills,
    Messages,
    Employment,
    Settings,
}

impl Tab {
    pub const ALL: [Tab; 6] = [
        Tab::Dashboard,
        Tab::Projects,
        Tab::Skills,
        Tab::Messages,
        Tab::Employment,
        Tab::Settings,
    ];

    pub fn route(&self) -> Route {
        match self {
            Tab::Dashboard => Route::Dashboard,
            Tab::Projects => Route::Projects,
            Tab::Skills => Route::Skills,
            Tab::Messages => Route::Messages,
            Tab::Employment => Route::Employment,
            Tab::Settings => Route::Settings,
        }
    }

    pub fn title(&self) -> &'static str {
        self.route().title()
    }

    /// Get the next tab (wrapping around)
    pub fn next(&self) -> Self {
        match self {
            Tab::Dashboard => Tab::Projects,
            Tab::Projects => Tab::Skills,
            Tab::Skills => Tab::Messages,
            Tab::Messages => Tab::Employment,
            Tab::Employment => Tab::Settings,
            Tab::Settings => Tab::Dashboard,
        }
    }

    /// Get the previous tab (wrapping around)
    pub fn prev(&self) -> Self {
        match self {
            Tab::Dashboard => Tab::Settings,
            Tab::Projects => Tab::Dashboard,
            Tab::Skills => Tab::Projects,
            Tab::Messages => Tab::Skills,
            Tab::Employment => Tab::Messages,
            Tab::Settings => Tab::Employment,
        }
    }
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingHelp,
    EditingForm,
    ConfirmingDelete,
    ConfirmingLogout,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoginFocus {
    Email,
    Password,
    Button,
}

/// Content that can be deleted from a list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Project,
    Skill,
    Employment,
    Message,
}

impl ResourceKind {
    pub fn label(&self) -> &'static str {
        match self {
            ResourceKind::Project => "project",
            ResourceKind::Skill => "skill",
            ResourceKind::Employment => "employment entry",
            ResourceKind::Message => "message",
        }
    }
}

/// A delete waiting for y/n
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDelete {
    pub kind: ResourceKind,
    pub id: String,
    pub name: String,
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent from spawned API tasks back to the main loop.
/// Every spawned task sends exactly one.
#[derive(Debug)]
enum TaskResult {
    Stats(DashboardStats),
    Projects(Vec<Project>),
    ProjectSaved(Project),
    Skills(Vec<Skill>),
    SkillAdded(Skill),
    Employment(Vec<Employment>),
    Messages(Vec<Message>),
    MessageStatus(String, MessageStatus),
    Deleted(ResourceKind, String),
    ProfileSaved(UserProfile),
    LoginFinished(Result<UserProfile, AuthError>),
    Error(String),
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    // Core services
    pub config: Config,
    pub store: Arc<SessionStore>,
    pub api: ApiClient,

    // Last observed session state
    pub session: SessionState,
    session_rx: watch::Receiver<SessionState>,

    // UI State
    pub state: AppState,
    pub current_tab: Tab,

    // Login form state
    pub login_email: String,
    pub login_password: String,
    pub login_focus: LoginFocus,
    pub login_error: Option<String>,
    pub login_pending: bool,

    // Selection indices
    pub project_selection: usize,
    pub skill_selection: usize,
    pub message_selection: usize,
    pub employment_selection: usize,

    // Fetched content
    pub stats: Option<DashboardStats>,
    pub projects: Vec<Project>,
    pub skills: Vec<Skill>,
    pub employment: Vec<Employment>,
    pub messages: Vec<Message>,

    pub form: Option<FormState>,
    pub pending_delete: Option<PendingDelete>,

    // Background task channel
    task_rx: mpsc::Receiver<TaskResult>,
    task_tx: mpsc::Sender<TaskResult>,
    pub pending_tasks: usize,

    // Status message
    pub status_message: Option<String>,
}

impl App {
    pub fn new(config: Config, store: Arc<SessionStore>) -> Self {
        let api = store.api().clone();
        let session_rx = store.subscribe();
        let session = session_rx.borrow().clone();
        let (task_tx, task_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        let login_email = config.last_email.clone().unwrap_or_default();

        Self {
            config,
            store,
            api,

            session,
            session_rx,

            state: AppState::Normal,
            current_tab: Tab::Dashboard,

            login_focus: if login_email.is_empty() {
                LoginFocus::Email
            } else {
                LoginFocus::Password
            },
            login_email,
            login_password: String::new(),
            login_error: None,
            login_pending: false,

            project_selection: 0,
            skill_selection: 0,
            message_selection: 0,
            employment_selection: 0,

            stats: None,
            projects: Vec::new(),
            skills: Vec::new(),
            employment: Vec::new(),
            messages: Vec::new(),

            form: None,
            pending_delete: None,

            task_rx,
            task_tx,
            pending_tasks: 0,

            status_message: None,
        }
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// What the guard says about the current tab
    pub fn guard_decision(&self) -> GuardDecision {
        RouteGuard::decide(&self.session, self.current_tab.route())
    }

    pub fn shows_layout(&self) -> bool {
        RouteGuard::shows_layout(&self.session, self.current_tab.route())
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.session.user()
    }

    /// Pick up session transitions published by the store
    pub fn sync_session(&mut self) {
        if !self.session_rx.has_changed().unwrap_or(false) {
            return;
        }
        let next = self.session_rx.borrow_and_update().clone();
        let was_authenticated = self.session.is_authenticated();
        self.session = next;

        match (was_authenticated, self.session.is_authenticated()) {
            (false, true) => {
                debug!("Session became authenticated");
                self.refresh_all();
            }
            (true, false) => {
                debug!("Session ended");
                self.clear_content();
                self.start_login();
            }
            _ if !self.session.is_loading() && !self.session.is_authenticated() => {
                self.start_login();
            }
            _ => {}
        }
    }

    /// Reset the login form for a fresh attempt
    pub fn start_login(&mut self) {
        self.state = AppState::Normal;
        self.form = None;
        self.pending_delete = None;
        self.login_password.clear();
        self.login_focus = if self.login_email.is_empty() {
            LoginFocus::Email
        } else {
            LoginFocus::Password
        };
    }

    /// Submit the login form. The request runs in the background so the
    /// screen keeps drawing; the outcome arrives as `LoginFinished`.
    pub fn attempt_login(&mut self) {
        if self.login_pending {
            return;
        }
        let email = self.login_email.trim().to_string();
        if email.is_empty() || self.login_password.is_empty() {
            self.login_error = Some("Email and password required".to_string());
            return;
        }

        self.login_error = None;
        self.login_pending = true;
        self.status_message = Some("Signing in...".to_string());

        let store = Arc::clone(&self.store);
        let password = self.login_password.clone();
        self.spawn_task(async move { TaskResult::LoginFinished(store.login(&email, &password).await) });
    }

    fn finish_login(&mut self, result: Result<UserProfile, AuthError>) {
        self.login_pending = false;
        match result {
            Ok(user) => {
                self.login_password.clear();
                self.config.last_email = Some(self.login_email.trim().to_string());
                if let Err(e) = self.config.save() {
                    warn!(error = %e, "Failed to save config");
                }
                self.status_message = Some(format!("Welcome, {}", user.display_name()));
                self.current_tab = Tab::Dashboard;
                self.sync_session();
            }
            Err(e) => {
                error!(error = %e, "Login failed");
                self.status_message = None;
                self.login_error = Some(match e {
                    AuthError::Network(_) => "Unable to reach the server. Please try again.".to_string(),
                    other => other.to_string(),
                });
            }
        }
    }

    pub fn logout(&mut self) {
        self.store.logout();
        self.status_message = Some("Logged out".to_string());
        self.sync_session();
    }

    fn clear_content(&mut self) {
        self.stats = None;
        self.projects.clear();
        self.skills.clear();
        self.employment.clear();
        self.messages.clear();
        self.project_selection = 0;
        self.skill_selection = 0;
        self.message_selection = 0;
        self.employment_selection = 0;
        self.current_tab = Tab::Dashboard;
    }

    // =========================================================================
    // Background Tasks
    // =========================================================================

    /// Run `task` on the runtime; its result arrives via `check_background_tasks`
    fn spawn_task<F>(&mut self, task: F)
    where
        F: Future<Output = TaskResult> + Send + 'static,
    {
        let tx = self.task_tx.clone();
        self.pending_tasks += 1;
        tokio::spawn(async move {
            let result = task.await;
            if let Err(e) = tx.send(result).await {
                error!(error = %e, "Failed to send task result - channel closed");
            }
        });
    }

    /// Fetch everything shown in the dashboard
    pub fn refresh_all(&mut self) {
        info!("Refreshing all content");
        for tab in [Tab::Dashboard, Tab::Projects, Tab::Skills, Tab::Messages, Tab::Employment] {
            self.refresh_tab(tab);
        }
        self.status_message = Some("Refreshing...".to_string());
    }

    pub fn refresh_tab(&mut self, tab: Tab) {
        let api = self.api.clone();
        match tab {
            Tab::Dashboard => self.spawn_task(async move {
                api.fetch_dashboard_stats()
                    .await
                    .map_or_else(failure("load dashboard"), TaskResult::Stats)
            }),
            Tab::Projects => self.spawn_task(async move {
                api.fetch_projects()
                    .await
                    .map_or_else(failure("load projects"), TaskResult::Projects)
            }),
            Tab::Skills => self.spawn_task(async move {
                api.fetch_skills()
                    .await
                    .map_or_else(failure("load skills"), TaskResult::Skills)
            }),
            Tab::Messages => self.spawn_task(async move {
                api.fetch_messages()
                    .await
                    .map_or_else(failure("load messages"), TaskResult::Messages)
            }),
            Tab::Employment => self.spawn_task(async move {
                api.fetch_employment()
                    .await
                    .map_or_else(failure("load employment"), TaskResult::Employment)
            }),
            // The profile lives in the session store
            Tab::Settings => {}
        }
    }

    /// Drain finished background tasks
    pub fn check_background_tasks(&mut self) {
        self.sync_session();

        let mut results = Vec::new();
        while let Ok(result) = self.task_rx.try_recv() {
            results.push(result);
        }
        for result in results {
            self.pending_tasks = self.pending_tasks.saturating_sub(1);
            self.process_task_result(result);
        }
        if self.pending_tasks == 0 && self.status_message.as_deref() == Some("Refreshing...") {
            self.status_message = None;
        }
    }

    fn process_task_result(&mut self, result: TaskResult) {
        match result {
            TaskResult::Stats(stats) => {
                self.stats = Some(stats);
            }
            TaskResult::Projects(data) => {
                self.projects = data;
                self.project_selection = clamp(self.project_selection, self.projects.len());
            }
            TaskResult::ProjectSaved(project) => {
                match self.projects.iter_mut().find(|p| p.id == project.id) {
                    Some(existing) => *existing = project,
                    None => self.projects.push(project),
                }
                self.status_message = Some("Project saved".to_string());
                self.recompute_stats();
            }
            TaskResult::Skills(data) => {
                self.skills = data;
                self.skill_selection = clamp(self.skill_selection, self.skills.len());
            }
            TaskResult::SkillAdded(skill) => {
                self.status_message = Some(format!("Added {}", skill.name));
                self.skills.push(skill);
                self.recompute_stats();
            }
            TaskResult::Employment(data) => {
                self.employment = data;
                self.employment_selection = clamp(self.employment_selection, self.employment.len());
                self.recompute_stats();
            }
            TaskResult::Messages(data) => {
                self.messages = data;
                self.message_selection = clamp(self.message_selection, self.messages.len());
            }
            TaskResult::MessageStatus(id, status) => {
                if apply_status(&mut self.messages, &id, status) {
                    self.recompute_stats();
                }
            }
            TaskResult::Deleted(kind, id) => {
                self.remove_local(kind, &id);
                self.status_message = Some(format!("Deleted {}", kind.label()));
                self.recompute_stats();
            }
            TaskResult::ProfileSaved(user) => {
                info!(user_id = %user.id, "Profile saved");
                self.status_message = Some("Profile saved".to_string());
            }
            TaskResult::LoginFinished(result) => self.finish_login(result),
            TaskResult::Error(message) => {
                self.status_message = Some(message);
            }
        }
    }

    fn remove_local(&mut self, kind: ResourceKind, id: &str) {
        match kind {
            ResourceKind::Project => {
                self.projects.retain(|p| p.id != id);
                self.project_selection = clamp(self.project_selection, self.projects.len());
            }
            ResourceKind::Skill => {
                self.skills.retain(|s| s.id != id);
                self.skill_selection = clamp(self.skill_selection, self.skills.len());
            }
            ResourceKind::Employment => {
                self.employment.retain(|e| e.id != id);
                self.employment_selection = clamp(self.employment_selection, self.employment.len());
            }
            ResourceKind::Message => {
                self.messages.retain(|m| m.id != id);
                self.message_selection = clamp(self.message_selection, self.messages.len());
            }
        }
    }

    /// Keep dashboard counts in step with local edits
    fn recompute_stats(&mut self) {
        if self.stats.is_some() {
            self.stats = Some(DashboardStats::compute(
                &self.projects,
                &self.skills,
                &self.employment,
                &self.messages,
            ));
        }
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Skills in the order they are drawn: grouped by category, names sorted
    pub fn skills_in_display_order(&self) -> Vec<&Skill> {
        group_by_category(&self.skills).into_values().flatten().collect()
    }

    pub fn selected_project(&self) -> Option<&Project> {
        self.projects.get(self.project_selection)
    }

    pub fn selected_skill(&self) -> Option<&Skill> {
        self.skills_in_display_order().get(self.skill_selection).copied()
    }

    pub fn selected_message(&self) -> Option<&Message> {
        self.messages.get(self.message_selection)
    }

    pub fn selected_employment(&self) -> Option<&Employment> {
        self.employment.get(self.employment_selection)
    }

    fn current_list_len(&self) -> usize {
        match self.current_tab {
            Tab::Projects => self.projects.len(),
            Tab::Skills => self.skills.len(),
            Tab::Messages => self.messages.len(),
            Tab::Employment => self.employment.len(),
            Tab::Dashboard | Tab::Settings => 0,
        }
    }

    fn current_selection_mut(&mut self) -> Option<&mut usize> {
        match self.current_tab {
            Tab::Projects => Some(&mut self.project_selection),
            Tab::Skills => Some(&mut self.skill_selection),
            Tab::Messages => Some(&mut self.message_selection),
            Tab::Employment => Some(&mut self.employment_selection),
            Tab::Dashboard | Tab::Settings => None,
        }
    }

    /// Move the current tab's selection by `delta`, clamped to the list
    pub fn move_selection(&mut self, delta: isize) {
        let len = self.current_list_len();
        if let Some(selection) = self.current_selection_mut() {
            let next = (*selection as isize + delta).max(0) as usize;
            *selection = clamp(next, len);
        }
    }

    pub fn select_first(&mut self) {
        if let Some(selection) = self.current_selection_mut() {
            *selection = 0;
        }
    }

    pub fn select_last(&mut self) {
        let len = self.current_list_len();
        if let Some(selection) = self.current_selection_mut() {
            *selection = len.saturating_sub(1);
        }
    }

    // =========================================================================
    // Actions
    // =========================================================================

    /// Ask for confirmation before deleting the selected item
    pub fn request_delete(&mut self) {
        let pending = match self.current_tab {
            Tab::Projects => self.selected_project().map(|p| PendingDelete {
                kind: ResourceKind::Project,
                id: p.id.clone(),
                name: p.title.clone(),
            }),
            Tab::Skills => self.selected_skill().map(|s| PendingDelete {
                kind: ResourceKind::Skill,
                id: s.id.clone(),
                name: s.name.clone(),
            }),
            Tab::Messages => self.selected_message().map(|m| PendingDelete {
                kind: ResourceKind::Message,
                id: m.id.clone(),
                name: m.subject.clone(),
            }),
            Tab::Employment => self.selected_employment().map(|e| PendingDelete {
                kind: ResourceKind::Employment,
                id: e.id.clone(),
                name: format!("{} at {}", e.title, e.company),
            }),
            Tab::Dashboard | Tab::Settings => None,
        };
        if let Some(pending) = pending {
            self.pending_delete = Some(pending);
            self.state = AppState::ConfirmingDelete;
        }
    }

    pub fn confirm_delete(&mut self) {
        self.state = AppState::Normal;
        let Some(PendingDelete { kind, id, .. }) = self.pending_delete.take() else {
            return;
        };
        let api = self.api.clone();
        self.spawn_task(async move {
            let result = match kind {
                ResourceKind::Project => api.delete_project(&id).await,
                ResourceKind::Skill => api.delete_skill(&id).await,
                ResourceKind::Employment => api.delete_employment(&id).await,
                ResourceKind::Message => api.delete_message(&id).await,
            };
            match result {
                Ok(()) => TaskResult::Deleted(kind, id),
                Err(e) => failure("delete")(e),
            }
        });
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
        self.state = AppState::Normal;
    }

    pub fn toggle_selected_message(&mut self) {
        let Some(message) = self.selected_message().cloned() else {
            return;
        };
        let api = self.api.clone();
        self.spawn_task(async move {
            api.toggle_message_read(&message)
                .await
                .map_or_else(failure("update message"), |status| {
                    TaskResult::MessageStatus(message.id, status)
                })
        });
    }

    pub fn archive_selected_message(&mut self) {
        let Some(id) = self.selected_message().map(|m| m.id.clone()) else {
            return;
        };
        let api = self.api.clone();
        self.spawn_task(async move {
            api.archive_message(&id)
                .await
                .map_or_else(failure("archive message"), |status| {
                    TaskResult::MessageStatus(id, status)
                })
        });
    }

    // =========================================================================
    // Forms
    // =========================================================================

    /// Open the create form for the current tab
    pub fn open_new_form(&mut self) {
        let form = match self.current_tab {
            Tab::Projects => Some(FormState::new_project()),
            Tab::Skills => Some(FormState::new_skill()),
            Tab::Employment => Some(FormState::new_employment()),
            _ => None,
        };
        self.open_form(form);
    }

    /// Open the edit form for the current tab's selection
    pub fn open_edit_form(&mut self) {
        let form = match self.current_tab {
            Tab::Projects => self.selected_project().map(FormState::edit_project),
            Tab::Employment => self.selected_employment().map(FormState::edit_employment),
            Tab::Settings => self.user().map(FormState::profile),
            _ => None,
        };
        self.open_form(form);
    }

    fn open_form(&mut self, form: Option<FormState>) {
        if let Some(form) = form {
            self.form = Some(form);
            self.state = AppState::EditingForm;
        }
    }

    pub fn cancel_form(&mut self) {
        self.form = None;
        self.state = AppState::Normal;
    }

    /// Validate locally, then hand the request to a background task.
    /// Invalid input keeps the form open with the error shown.
    pub fn submit_form(&mut self) {
        let Some(mut form) = self.form.take() else {
            return;
        };
        match self.dispatch_form(&form) {
            Ok(()) => {
                self.state = AppState::Normal;
            }
            Err(message) => {
                form.error = Some(message);
                self.form = Some(form);
            }
        }
    }

    fn dispatch_form(&mut self, form: &FormState) -> Result<(), String> {
        let api = self.api.clone();
        let target = form.target_id.clone().unwrap_or_default();

        match form.kind {
            FormKind::Profile => {
                let current = self.user().cloned().ok_or("Not signed in")?;
                let update = form.profile_update(&current);
                let store = Arc::clone(&self.store);
                self.spawn_task(async move {
                    match store.update_profile(update).await {
                        Ok(user) => TaskResult::ProfileSaved(user),
                        Err(e) => TaskResult::Error(format!("Failed to save profile: {}", e)),
                    }
                });
            }
            FormKind::NewProject | FormKind::EditProject => {
                let draft = form.project_draft();
                draft.validate().map_err(|e| e.to_string())?;
                if form.kind == FormKind::EditProject {
                    let unchanged = self
                        .projects
                        .iter()
                        .find(|p| p.id == target)
                        .is_some_and(|p| !draft.differs_from(p));
                    if unchanged {
                        self.status_message = Some("No changes to save".to_string());
                        return Ok(());
                    }
                }
                let editing = form.kind == FormKind::EditProject;
                self.spawn_task(async move {
                    let result = if editing {
                        api.update_project(&target, draft).await
                    } else {
                        api.create_project(draft).await
                    };
                    result.map_or_else(failure("save project"), TaskResult::ProjectSaved)
                });
            }
            FormKind::NewSkill => {
                let skill = form.new_skill_value();
                skill.validate().map_err(|e| e.to_string())?;
                self.spawn_task(async move {
                    api.create_skill(&skill)
                        .await
                        .map_or_else(failure("add skill"), TaskResult::SkillAdded)
                });
            }
            FormKind::NewEmployment | FormKind::EditEmployment => {
                let draft = form.employment_draft();
                draft.validate().map_err(|e| e.to_string())?;
                let editing = form.kind == FormKind::EditEmployment;
                // The server answers without the saved entry, so refetch
                self.spawn_task(async move {
                    let saved = if editing {
                        api.update_employment(&target, &draft).await
                    } else {
                        api.create_employment(&draft).await
                    };
                    match saved {
                        Ok(()) => api
                            .fetch_employment()
                            .await
                            .map_or_else(failure("load employment"), TaskResult::Employment),
                        Err(e) => failure("save employment")(e),
                    }
                });
            }
        }
        Ok(())
    }
}

/// Map an API error to a status-bar message, logging it
fn failure(action: &'static str) -> impl Fn(ApiError) -> TaskResult {
    move |e| {
        warn!(error = %e, action, "Request failed");
        TaskResult::Error(format!("Failed to {}: {}", action, e))
    }
}

fn clamp(selection: usize, len: usize) -> usize {
    selection.min(len.saturating_sub(1))
}

// ============================================================================
// Input validation helpers (exported for use in input.rs)
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if an email character should be accepted
pub fn can_add_email_char(current_len: usize, c: char) -> bool {
    current_len < MAX_EMAIL_LENGTH && is_valid_input_char(c) && !c.is_whitespace()
}

/// Check if a password character should be accepted
pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use portfolio_cms_core::api::{ReqwestTransport, RequestGateway};
    use portfolio_cms_core::auth::MemoryStorage;

    /// App wired to an unreachable API; requests fail fast
    fn app() -> App {
        let transport = Arc::new(ReqwestTransport::new().unwrap());
        let gateway = Arc::new(
            RequestGateway::new(transport, "http://127.0.0.1:9/api").with_timeout(Duration::from_secs(1)),
        );
        let store = SessionStore::new(ApiClient::new(gateway), Arc::new(MemoryStorage::new()));
        App::new(Config::default(), Arc::new(store))
    }

    fn message(id: &str, status: MessageStatus) -> Message {
        Message {
            id: id.into(),
            status,
            ..Default::default()
        }
    }

    // -------------------------------------------------------------------------
    // Tab Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_tab_next() {
        assert_eq!(Tab::Dashboard.next(), Tab::Projects);
        assert_eq!(Tab::Projects.next(), Tab::Skills);
        assert_eq!(Tab::Skills.next(), Tab::Messages);
        assert_eq!(Tab::Messages.next(), Tab::Employment);
        assert_eq!(Tab::Employment.next(), Tab::Settings);
        assert_eq!(Tab::Settings.next(), Tab::Dashboard); // Wraps around
    }

    #[test]
    fn test_tab_prev() {
        for tab in Tab::ALL {
            assert_eq!(tab.next().prev(), tab);
        }
    }

    #[test]
    fn test_tabs_are_protected_routes() {
        for tab in Tab::ALL {
            assert!(tab.route().is_protected());
        }
    }

    // -------------------------------------------------------------------------
    // Session Tests
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_starts_loading() {
        let app = app();
        assert_eq!(app.guard_decision(), GuardDecision::Loading);
        assert!(!app.shows_layout());
    }

    #[tokio::test]
    async fn test_restore_without_token_shows_login() {
        let mut app = app();
        app.login_email = "jane@x.com".into();
        app.store.restore_session().await;
        app.sync_session();

        assert_eq!(app.guard_decision(), GuardDecision::Redirect(Route::Login));
        assert_eq!(app.login_focus, LoginFocus::Password);
    }

    #[tokio::test]
    async fn test_login_requires_both_fields() {
        let mut app = app();
        app.store.restore_session().await;
        app.sync_session();

        app.login_email = "jane@x.com".into();
        app.attempt_login();
        assert_eq!(app.login_error.as_deref(), Some("Email and password required"));
        assert!(!app.login_pending);
        assert_eq!(app.pending_tasks, 0);
        assert!(!app.store.is_authenticated());
    }

    #[tokio::test]
    async fn test_login_runs_in_background() {
        let mut app = app();
        app.store.restore_session().await;
        app.sync_session();

        app.login_email = "jane@x.com".into();
        app.login_password = "pw".into();
        app.attempt_login();

        // Control returns before the request resolves, with progress visible
        assert!(app.login_pending);
        assert_eq!(app.status_message.as_deref(), Some("Signing in..."));
        assert_eq!(app.pending_tasks, 1);

        // A second submit while waiting is ignored
        app.attempt_login();
        assert_eq!(app.pending_tasks, 1);

        tokio::time::timeout(Duration::from_secs(5), async {
            while app.login_pending {
                tokio::time::sleep(Duration::from_millis(10)).await;
                app.check_background_tasks();
            }
        })
        .await
        .unwrap();

        assert_eq!(
            app.login_error.as_deref(),
            Some("Unable to reach the server. Please try again.")
        );
        assert_eq!(app.status_message, None);
        assert!(!app.store.is_authenticated());
    }

    // -------------------------------------------------------------------------
    // Task Result Tests
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_deleted_item_removed_and_selection_clamped() {
        let mut app = app();
        app.current_tab = Tab::Messages;
        app.messages = vec![message("m1", MessageStatus::Read), message("m2", MessageStatus::Unread)];
        app.message_selection = 1;

        app.process_task_result(TaskResult::Deleted(ResourceKind::Message, "m2".into()));

        assert_eq!(app.messages.len(), 1);
        assert_eq!(app.message_selection, 0);
        assert_eq!(app.status_message.as_deref(), Some("Deleted message"));
    }

    #[tokio::test]
    async fn test_message_status_updates_stats() {
        let mut app = app();
        app.messages = vec![message("m1", MessageStatus::Unread)];
        app.stats = Some(DashboardStats::compute(&[], &[], &[], &app.messages));
        assert_eq!(app.stats.unwrap().unread_messages, 1);

        app.process_task_result(TaskResult::MessageStatus("m1".into(), MessageStatus::Read));

        assert!(!app.messages[0].is_unread());
        assert_eq!(app.stats.unwrap().unread_messages, 0);
    }

    #[tokio::test]
    async fn test_project_saved_replaces_existing() {
        let mut app = app();
        app.projects = vec![Project {
            id: "p1".into(),
            title: "Old".into(),
            ..Default::default()
        }];
        app.process_task_result(TaskResult::ProjectSaved(Project {
            id: "p1".into(),
            title: "New".into(),
            ..Default::default()
        }));
        assert_eq!(app.projects.len(), 1);
        assert_eq!(app.projects[0].title, "New");
    }

    // -------------------------------------------------------------------------
    // Selection / Action Tests
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_move_selection_clamps() {
        let mut app = app();
        app.current_tab = Tab::Projects;
        app.projects = vec![Project::default(), Project::default(), Project::default()];

        app.move_selection(PAGE_SCROLL_SIZE as isize);
        assert_eq!(app.project_selection, 2);
        app.move_selection(-1);
        assert_eq!(app.project_selection, 1);
        app.move_selection(-(PAGE_SCROLL_SIZE as isize));
        assert_eq!(app.project_selection, 0);
    }

    #[tokio::test]
    async fn test_skill_selection_follows_display_order() {
        let mut app = app();
        app.current_tab = Tab::Skills;
        app.skills = vec![
            Skill {
                id: "s1".into(),
                name: "Rust".into(),
                category: "Languages".into(),
                ..Default::default()
            },
            Skill {
                id: "s2".into(),
                name: "Docker".into(),
                category: "DevOps".into(),
                ..Default::default()
            },
        ];
        // "DevOps" sorts before "Languages"
        assert_eq!(app.selected_skill().unwrap().id, "s2");

        app.request_delete();
        assert_eq!(app.state, AppState::ConfirmingDelete);
        assert_eq!(app.pending_delete.as_ref().unwrap().id, "s2");

        app.cancel_delete();
        assert_eq!(app.state, AppState::Normal);
        assert!(app.pending_delete.is_none());
    }

    #[tokio::test]
    async fn test_invalid_form_stays_open() {
        let mut app = app();
        app.current_tab = Tab::Skills;
        app.open_new_form();
        assert_eq!(app.state, AppState::EditingForm);

        app.submit_form();

        assert_eq!(app.state, AppState::EditingForm);
        assert_eq!(app.form.as_ref().unwrap().error.as_deref(), Some("Name is required"));
        assert_eq!(app.pending_tasks, 0);
    }

    #[tokio::test]
    async fn test_unchanged_project_edit_is_not_sent() {
        let mut app = app();
        app.current_tab = Tab::Projects;
        app.projects = vec![Project {
            id: "p1".into(),
            title: "Site".into(),
            category: "Web".into(),
            description: "d".into(),
            tags: vec!["rust".into()],
            ..Default::default()
        }];
        app.open_edit_form();
        app.submit_form();

        assert_eq!(app.state, AppState::Normal);
        assert_eq!(app.pending_tasks, 0);
        assert_eq!(app.status_message.as_deref(), Some("No changes to save"));
    }

    #[tokio::test]
    async fn test_settings_edit_requires_session() {
        let mut app = app();
        app.current_tab = Tab::Settings;
        app.open_edit_form();
        assert!(app.form.is_none());
        assert_eq!(app.state, AppState::Normal);
    }

    // -------------------------------------------------------------------------
    // Input Validation Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_can_add_email_char() {
        assert!(can_add_email_char(0, 'a'));
        assert!(can_add_email_char(99, '@'));
        assert!(!can_add_email_char(100, 'a'));
        assert!(!can_add_email_char(0, ' '));
        assert!(!can_add_email_char(0, '\n'));
    }

    #[test]
    fn test_can_add_password_char() {
        assert!(can_add_password_char(0, 'a'));
        assert!(can_add_password_char(127, '!'));
        assert!(!can_add_password_char(128, 'a'));
        assert!(!can_add_password_char(0, '\x00'));
    }
}
