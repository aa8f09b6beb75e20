//! Persisted session state and its single owner
//!
//! A session is two string entries, the bearer token and the serialized user
//! record. They are written and cleared together. [`SessionGuard`] is the only
//! code that touches the store; the request and response interceptors share
//! one guard.

use crate::client::error::ClientError;
use crate::client::token::{inspect_at, Clock, SystemClock, TokenStatus};
use crate::client::ui::{LoginRedirect, Navigator, Notification, Notifier, SESSION_EXPIRED_MESSAGE};
use gstpro_core::User;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Storage key for the bearer token
pub const TOKEN_KEY: &str = "token";

/// Storage key for the serialized user record
pub const USER_KEY: &str = "user";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("session storage failed: {0}")]
pub struct StoreError(pub String);

/// Client-side persistent storage for the session entries
#[cfg_attr(test, mockall::automock)]
pub trait SessionStore: Send + Sync {
    fn token(&self) -> Result<Option<String>, StoreError>;

    fn user(&self) -> Result<Option<String>, StoreError>;

    /// Store both entries
    fn set(&self, token: &str, user: &str) -> Result<(), StoreError>;

    /// Remove both entries; clearing an empty store is a no-op
    fn clear(&self) -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
struct Entries {
    token: Option<String>,
    user: Option<String>,
}

/// In-process session store
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: Mutex<Entries>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with a session
    pub fn with_session(token: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            entries: Mutex::new(Entries {
                token: Some(token.into()),
                user: Some(user.into()),
            }),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Entries>, StoreError> {
        self.entries
            .lock()
            .map_err(|_| StoreError("session lock poisoned".into()))
    }
}

impl SessionStore for MemorySessionStore {
    fn token(&self) -> Result<Option<String>, StoreError> {
        Ok(self.lock()?.token.clone())
    }

    fn user(&self) -> Result<Option<String>, StoreError> {
        Ok(self.lock()?.user.clone())
    }

    fn set(&self, token: &str, user: &str) -> Result<(), StoreError> {
        let mut entries = self.lock()?;
        entries.token = Some(token.to_string());
        entries.user = Some(user.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.lock()? = Entries::default();
        Ok(())
    }
}

/// Where a stored token sits in its lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Absent,
    Fresh(TokenStatus),
    Expired(TokenStatus),
}

impl SessionState {
    pub fn is_fresh(&self) -> bool {
        matches!(self, Self::Fresh(_))
    }
}

/// Owner of the session store and the UI side effects of ending a session
pub struct SessionGuard {
    store: Arc<dyn SessionStore>,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    /// Set once a redirect has been issued; reset when that navigation lands
    /// or a new session is established
    redirect_triggered: AtomicBool,
}

impl SessionGuard {
    pub fn new(
        store: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            navigator,
            notifier,
            clock: Arc::new(SystemClock),
            redirect_triggered: AtomicBool::new(false),
        }
    }

    /// Replace the clock used for expiry checks
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Stored token, if any; unreadable storage counts as no token
    pub fn token(&self) -> Option<String> {
        match self.store.token() {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!("Failed to read stored token: {e}");
                None
            }
        }
    }

    /// Stored user record, if present and decodable
    pub fn user(&self) -> Option<User> {
        let raw = match self.store.user() {
            Ok(raw) => raw?,
            Err(e) => {
                warn!("Failed to read stored user: {e}");
                return None;
            }
        };
        serde_json::from_str(&raw)
            .inspect_err(|e| warn!("Stored user record is not valid JSON: {e}"))
            .ok()
    }

    /// Inspect a token against this guard's clock
    pub fn inspect(&self, token: &str) -> TokenStatus {
        inspect_at(token, self.clock.now())
    }

    /// Current lifecycle state of the stored token
    pub fn state(&self) -> SessionState {
        match self.token() {
            None => SessionState::Absent,
            Some(token) => match self.inspect(&token) {
                status @ TokenStatus::Fresh(_) => SessionState::Fresh(status),
                status => SessionState::Expired(status),
            },
        }
    }

    /// Persist a new session after a successful login
    pub fn establish(&self, token: &str, user: &User) -> Result<(), ClientError> {
        let user = serde_json::to_string(user)?;
        self.store
            .set(token, &user)
            .map_err(|e| ClientError::Storage(e.to_string()))?;
        self.redirect_triggered.store(false, Ordering::SeqCst);
        info!("Session established");
        Ok(())
    }

    /// Remove the token and user record together
    pub fn clear(&self) {
        match self.store.clear() {
            Ok(()) => debug!("Session cleared"),
            Err(e) => error!("Failed to clear session: {e}"),
        }
    }

    /// Clear the session and send the user to the login view
    ///
    /// Notification and redirect happen at most once per navigation; racing
    /// callers only clear. Nothing is shown while already on an auth page,
    /// which also means any earlier redirect has landed.
    /// Returns whether this call issued the redirect.
    pub fn end_session(&self) -> bool {
        self.clear();

        if self.navigator.is_auth_page() {
            debug!("Session ended on an auth page, not redirecting");
            self.redirect_triggered.store(false, Ordering::SeqCst);
            return false;
        }

        if self.redirect_triggered.swap(true, Ordering::SeqCst) {
            debug!("Login redirect already triggered");
            return false;
        }

        let target = LoginRedirect::session_expired();
        warn!(target = %target.url(), "Session expired, redirecting to login");
        self.notifier
            .notify(Notification::warning(SESSION_EXPIRED_MESSAGE));
        self.navigator.redirect(&target);
        true
    }

    /// Re-arm the login redirect once the UI has moved to another page
    pub fn navigated(&self) {
        if self.redirect_triggered.swap(false, Ordering::SeqCst) {
            debug!("Navigation completed, login redirect re-armed");
        }
    }

    pub fn is_auth_page(&self) -> bool {
        self.navigator.is_auth_page()
    }

    pub fn redirect_triggered(&self) -> bool {
        self.redirect_triggered.load(Ordering::SeqCst)
    }

    pub fn notify(&self, notification: Notification) {
        self.notifier.notify(notification);
    }
}

impl std::fmt::Debug for SessionGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGuard")
            .field("redirect_triggered", &self.redirect_triggered())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ui::{MockNavigator, MockNotifier, NotificationLevel};
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};

    struct FixedClock(i64);

    impl Clock for FixedClock {
        fn now(&self) -> i64 {
            self.0
        }
    }

    fn token(exp: i64) -> String {
        let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"1","exp":{exp}}}"#));
        format!("eyJhbGciOiJIUzI1NiJ9.{payload}.sig")
    }

    fn guard(
        store: Arc<dyn SessionStore>,
        navigator: MockNavigator,
        notifier: MockNotifier,
    ) -> SessionGuard {
        SessionGuard::new(store, Arc::new(navigator), Arc::new(notifier))
            .with_clock(Arc::new(FixedClock(1_000)))
    }

    #[test]
    fn test_state_machine() {
        let store = Arc::new(MemorySessionStore::new());
        let guard = guard(store.clone(), MockNavigator::new(), MockNotifier::new());
        assert_eq!(guard.state(), SessionState::Absent);

        store.set(&token(2_000), "{}").unwrap();
        assert!(guard.state().is_fresh());

        store.set(&token(1_000), "{}").unwrap();
        assert!(matches!(guard.state(), SessionState::Expired(_)));

        store.set("garbage", "{}").unwrap();
        assert!(matches!(
            guard.state(),
            SessionState::Expired(TokenStatus::Invalid(_))
        ));
    }

    #[test]
    fn test_end_session_redirects_once() {
        let store = Arc::new(MemorySessionStore::with_session(token(10), "{}"));

        let mut navigator = MockNavigator::new();
        navigator.expect_is_auth_page().return_const(false);
        navigator
            .expect_redirect()
            .withf(|target| target.url() == "/login?expired=true")
            .times(1)
            .return_const(());

        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .withf(|n| n.level == NotificationLevel::Warning && n.message == SESSION_EXPIRED_MESSAGE)
            .times(1)
            .return_const(());

        let guard = guard(store.clone(), navigator, notifier);
        assert!(guard.end_session());
        assert!(!guard.end_session());
        assert_eq!(store.token().unwrap(), None);
        assert_eq!(store.user().unwrap(), None);
    }

    #[test]
    fn test_navigation_rearms_redirect() {
        let store = Arc::new(MemorySessionStore::with_session(token(10), "{}"));

        let mut navigator = MockNavigator::new();
        navigator.expect_is_auth_page().return_const(false);
        navigator.expect_redirect().times(2).return_const(());
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().times(2).return_const(());

        let guard = guard(store, navigator, notifier);
        assert!(guard.end_session());
        assert!(!guard.end_session());

        guard.navigated();
        assert!(!guard.redirect_triggered());
        assert!(guard.end_session());
        assert!(guard.redirect_triggered());
    }

    #[test]
    fn test_landing_on_auth_page_rearms_redirect() {
        let store = Arc::new(MemorySessionStore::with_session(token(10), "{}"));
        let on_auth_page = Arc::new(AtomicBool::new(false));

        let mut navigator = MockNavigator::new();
        let page = on_auth_page.clone();
        navigator
            .expect_is_auth_page()
            .returning(move || page.load(Ordering::SeqCst));
        navigator.expect_redirect().times(2).return_const(());
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().times(2).return_const(());

        let guard = guard(store, navigator, notifier);
        assert!(guard.end_session());

        on_auth_page.store(true, Ordering::SeqCst);
        assert!(!guard.end_session());
        assert!(!guard.redirect_triggered());

        on_auth_page.store(false, Ordering::SeqCst);
        assert!(guard.end_session());
    }

    #[test]
    fn test_end_session_on_auth_page_only_clears() {
        let store = Arc::new(MemorySessionStore::with_session(token(10), "{}"));

        let mut navigator = MockNavigator::new();
        navigator.expect_is_auth_page().return_const(true);
        navigator.expect_redirect().never();
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().never();

        let guard = guard(store.clone(), navigator, notifier);
        assert!(!guard.end_session());
        assert_eq!(store.token().unwrap(), None);
        assert!(!guard.redirect_triggered());
    }

    #[test]
    fn test_clear_failure_is_absorbed() {
        let mut store = MockSessionStore::new();
        store
            .expect_clear()
            .returning(|| Err(StoreError("disk full".into())));
        let guard = guard(Arc::new(store), MockNavigator::new(), MockNotifier::new());
        guard.clear();
    }

    #[test]
    fn test_unreadable_store_counts_as_absent() {
        let mut store = MockSessionStore::new();
        store
            .expect_token()
            .returning(|| Err(StoreError("locked".into())));
        let guard = guard(Arc::new(store), MockNavigator::new(), MockNotifier::new());
        assert_eq!(guard.state(), SessionState::Absent);
    }
}
