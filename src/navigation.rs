//! Route table, navigation guard and the session-end redirect.

use std::sync::{Arc, Mutex};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::events::SessionEventBus;

/// Something that can move the user to another route
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Navigator that only records where it was sent
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visited: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn last(&self) -> Option<String> {
        self.visited().pop()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.visited
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(path.to_string());
    }
}

/// Sends the user to the login route whenever the session ends
pub struct SessionRedirector;

impl SessionRedirector {
    /// Subscribe to `bus` and navigate to `login_path` on termination or
    /// sign-out. The task ends when every sender is gone.
    pub fn spawn(
        bus: &SessionEventBus,
        navigator: Arc<dyn Navigator>,
        login_path: impl Into<String>,
    ) -> JoinHandle<()> {
        let mut receiver = bus.subscribe();
        let login_path = login_path.into();

        tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(notice) => {
                        if notice.event.ends_session() {
                            info!(event = notice.event.kind(), path = %login_path, "Session ended, redirecting");
                            navigator.navigate(&login_path);
                        } else {
                            debug!(event = notice.event.kind(), "Session event ignored by redirector");
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Session redirector lagged behind the event bus");
                    }
                    Err(RecvError::Closed) => {
                        debug!("Session event bus closed, stopping redirector");
                        break;
                    }
                }
            }
        })
    }
}

/// Client-side route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    /// Pattern; `:name` segments match any single segment
    pub path: &'static str,
    pub name: &'static str,
    pub requires_auth: bool,
}

impl Route {
    const fn new(path: &'static str, name: &'static str, requires_auth: bool) -> Self {
        Self {
            path,
            name,
            requires_auth,
        }
    }

    /// True if `path` (without query or fragment) matches this route
    pub fn matches(&self, path: &str) -> bool {
        let pattern = segments(self.path);
        let actual = segments(path);
        pattern.len() == actual.len()
            && pattern
                .iter()
                .zip(&actual)
                .all(|(p, a)| p.starts_with(':') || p == a)
    }
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

pub const LOGIN_PATH: &str = "/login";
pub const REGISTER_PATH: &str = "/register";
pub const HOME_PATH: &str = "/";

pub const ROUTES: &[Route] = &[
    Route::new(LOGIN_PATH, "Login", false),
    Route::new(REGISTER_PATH, "Register", false),
    Route::new(HOME_PATH, "Home", true),
    Route::new("/dashboard", "Dashboard", true),
    Route::new("/analysis", "Analysis", true),
    Route::new("/analysis/1rm", "OneRMAnalysis", true),
    Route::new("/analysis/volume", "VolumeStats", true),
    Route::new("/analysis/progress", "Progress", true),
    Route::new("/profile", "Profile", true),
    Route::new("/settings", "Settings", true),
    Route::new("/exercises", "Exercises", true),
    Route::new("/exercises/:id", "ExerciseDetail", true),
    Route::new("/workouts", "Workouts", true),
    Route::new("/workouts/create", "WorkoutCreate", true),
    Route::new("/workouts/:id", "WorkoutDetail", true),
    Route::new("/templates", "Templates", true),
];

/// Look up the route for a full path
pub fn resolve(full_path: &str) -> Option<&'static Route> {
    let path = strip_query(full_path);
    // Literal routes win over parameterized ones
    ROUTES
        .iter()
        .find(|r| !r.path.contains(':') && r.matches(path))
        .or_else(|| ROUTES.iter().find(|r| r.matches(path)))
}

fn strip_query(full_path: &str) -> &str {
    let end = full_path.find(&['?', '#'][..]).unwrap_or(full_path.len());
    &full_path[..end]
}

/// Outcome of a navigation guard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Proceed,
    Redirect { path: String },
}

/// Decides whether navigation to a route may proceed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteGuard {
    login_path: String,
    home_path: String,
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::new(LOGIN_PATH, HOME_PATH)
    }
}

impl RouteGuard {
    pub fn new(login_path: impl Into<String>, home_path: impl Into<String>) -> Self {
        Self {
            login_path: login_path.into(),
            home_path: home_path.into(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.login_path.as_str(), config.home_path.as_str())
    }

    /// Protected routes send anonymous users to the login route with the
    /// target in `redirect`; the login and register routes send signed-in
    /// users home.
    pub fn check(&self, target: &str, authenticated: bool) -> Navigation {
        let path = strip_query(target);

        if let Some(route) = resolve(target) {
            if route.requires_auth && !authenticated {
                return Navigation::Redirect {
                    path: format!("{}?redirect={}", self.login_path, urlencoding::encode(target)),
                };
            }
        }

        if authenticated && (path == self.login_path || path == REGISTER_PATH) {
            debug!(path, home = %self.home_path, "Already signed in, sending home");
            return Navigation::Redirect {
                path: self.home_path.clone(),
            };
        }

        Navigation::Proceed
    }
}
