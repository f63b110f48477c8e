//! Route resolution and gating of protected views on session state.

use std::fmt;

use tokio::sync::watch;

use super::session::SessionState;

/// The dashboard's routes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Dashboard,
    Projects,
    Skills,
    Messages,
    Employment,
    Settings,
}

impl Route {
    /// Where `/` and an authenticated visit to `/login` land
    pub const HOME: Route = Route::Dashboard;

    pub const PROTECTED: [Route; 6] = [
        Route::Dashboard,
        Route::Projects,
        Route::Skills,
        Route::Messages,
        Route::Employment,
        Route::Settings,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Dashboard => "/dashboard",
            Route::Projects => "/projects",
            Route::Skills => "/skills",
            Route::Messages => "/messages",
            Route::Employment => "/employment",
            Route::Settings => "/settings",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Login => "Login",
            Route::Dashboard => "Dashboard",
            Route::Projects => "Projects",
            Route::Skills => "Skills",
            Route::Messages => "Messages",
            Route::Employment => "Employment",
            Route::Settings => "Settings",
        }
    }

    /// Exact path match; trailing slashes are ignored
    pub fn from_path(path: &str) -> Option<Route> {
        let trimmed = path.trim();
        let normalized = match trimmed.trim_end_matches('/') {
            "" if trimmed.starts_with('/') => "/",
            p => p,
        };
        match normalized {
            "/login" => Some(Route::Login),
            "/dashboard" => Some(Route::Dashboard),
            "/projects" => Some(Route::Projects),
            "/skills" => Some(Route::Skills),
            "/messages" => Some(Route::Messages),
            "/employment" => Some(Route::Employment),
            "/settings" => Some(Route::Settings),
            _ => None,
        }
    }

    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::Login)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// What to show for a requested route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session restoration still running: neutral placeholder, no navigation
    Loading,
    Render(Route),
    Redirect(Route),
    NotFound,
}

impl GuardDecision {
    pub fn is_settled(&self) -> bool {
        !matches!(self, GuardDecision::Loading)
    }
}

pub struct RouteGuard;

impl RouteGuard {
    /// Gate a protected view
    pub fn decide(state: &SessionState, route: Route) -> GuardDecision {
        if state.is_loading() {
            GuardDecision::Loading
        } else if state.is_authenticated() {
            GuardDecision::Render(route)
        } else {
            GuardDecision::Redirect(Route::Login)
        }
    }

    /// Resolve a raw path the way the dashboard's router does
    pub fn resolve(state: &SessionState, path: &str) -> GuardDecision {
        if path.trim() == "/" || path.trim().is_empty() {
            return GuardDecision::Redirect(Route::HOME);
        }
        match Route::from_path(path) {
            Some(Route::Login) if state.is_authenticated() => GuardDecision::Redirect(Route::HOME),
            Some(Route::Login) => GuardDecision::Render(Route::Login),
            Some(route) => Self::decide(state, route),
            None => GuardDecision::NotFound,
        }
    }

    /// Header and sidebar are drawn only around signed-in, non-login views
    pub fn shows_layout(state: &SessionState, route: Route) -> bool {
        state.is_authenticated() && route != Route::Login
    }

    /// Wait until restoration has finished, then decide.
    /// Returns `Loading` only if the store was dropped mid-restore.
    pub async fn settled(rx: &mut watch::Receiver<SessionState>, route: Route) -> GuardDecision {
        match rx.wait_for(|state| !state.is_loading()).await {
            Ok(state) => Self::decide(&state, route),
            Err(_) => GuardDecision::Loading,
        }
    }
}
