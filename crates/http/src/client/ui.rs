//! Collaborators supplied by the user interface
//!
//! The client never renders anything. It asks the UI whether the user is
//! currently on an authentication page, tells it where to navigate, and hands
//! it notifications to display.

use std::sync::{Mutex, PoisonError};
use tracing::{debug, error, info, warn};

/// Login view the client redirects to
pub const LOGIN_PATH: &str = "/login";

/// Query marker telling the login view the previous session expired
pub const SESSION_EXPIRED_QUERY: &str = "expired=true";

/// Paths on which an expired session must not trigger a redirect
pub const AUTH_PATHS: [&str; 3] = ["/login", "/register", "/forgot-password"];

pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";
pub const SERVER_ERROR_MESSAGE: &str = "Server error. Please try again later.";
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please check your connection.";

/// Whether `path` belongs to the authentication flow
pub fn is_auth_path(path: &str) -> bool {
    let route = path
        .split(['?', '#'])
        .next()
        .unwrap_or(path)
        .trim_end_matches('/');
    AUTH_PATHS
        .iter()
        .any(|auth| route == *auth || route.starts_with(&format!("{auth}/")))
}

/// Navigation target emitted when a session ends
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRedirect {
    pub path: String,
    pub session_expired: bool,
}

impl LoginRedirect {
    /// Redirect to the login view flagged as a session expiry
    pub fn session_expired() -> Self {
        Self {
            path: LOGIN_PATH.to_string(),
            session_expired: true,
        }
    }

    /// Relative URL including the expiry marker
    pub fn url(&self) -> String {
        if self.session_expired {
            format!("{}?{SESSION_EXPIRED_QUERY}", self.path)
        } else {
            self.path.clone()
        }
    }
}

/// Navigation hooks provided by the UI layer
#[cfg_attr(test, mockall::automock)]
pub trait Navigator: Send + Sync {
    /// Whether the user is currently on a login/registration page
    fn is_auth_page(&self) -> bool;

    /// Navigate to the login view
    fn redirect(&self, target: &LoginRedirect);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Warning,
    Error,
}

/// A toast-style message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

/// Notification sink provided by the UI layer
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Navigator for headless use
///
/// Tracks the path the embedding program says it is on. Redirects are only
/// logged; the program decides when to move.
#[derive(Debug)]
pub struct HeadlessNavigator {
    path: Mutex<String>,
}

impl HeadlessNavigator {
    pub fn at(path: impl Into<String>) -> Self {
        Self {
            path: Mutex::new(path.into()),
        }
    }

    pub fn current_path(&self) -> String {
        self.path.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn navigate(&self, path: impl Into<String>) {
        let path = path.into();
        debug!(%path, "Navigated");
        *self.path.lock().unwrap_or_else(PoisonError::into_inner) = path;
    }
}

impl Default for HeadlessNavigator {
    fn default() -> Self {
        Self::at("/")
    }
}

impl Navigator for HeadlessNavigator {
    fn is_auth_page(&self) -> bool {
        is_auth_path(&self.current_path())
    }

    fn redirect(&self, target: &LoginRedirect) {
        info!(target = %target.url(), "Login required");
    }
}

/// Notifier that forwards notifications to the tracing subscriber
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Warning => warn!("{}", notification.message),
            NotificationLevel::Error => error!("{}", notification.message),
        }
    }
}
