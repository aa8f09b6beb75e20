//! Session gating and status notification interceptors

use crate::client::error::{CancelReason, ClientError};
use crate::client::middleware::{
    ApiRequest, ApiResponse, RequestInterceptor, RequestOutcome, ResponseInterceptor,
};
use crate::client::session::SessionGuard;
use crate::client::token::TokenStatus;
use crate::client::ui::{Notification, NETWORK_ERROR_MESSAGE, SERVER_ERROR_MESSAGE};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Attaches the stored bearer token, or ends the session if it is stale
///
/// A request that already carries an `Authorization` header is left as is.
#[derive(Debug, Clone)]
pub struct BearerAuth {
    session: Arc<SessionGuard>,
}

impl BearerAuth {
    pub fn new(session: Arc<SessionGuard>) -> Self {
        Self { session }
    }

    fn cancel(&self, reason: CancelReason) -> RequestOutcome {
        warn!(%reason, "Dropping request with unusable session");
        self.session.end_session();
        RequestOutcome::Cancel(reason)
    }
}

impl RequestInterceptor for BearerAuth {
    fn intercept(&self, mut request: ApiRequest) -> RequestOutcome {
        if request.has_authorization() {
            return RequestOutcome::Proceed(request);
        }

        let Some(token) = self.session.token() else {
            debug!(path = %request.path, "No stored token, sending unauthenticated");
            return RequestOutcome::Proceed(request);
        };

        match self.session.inspect(&token) {
            TokenStatus::Fresh(_) => match request.set_bearer(&token) {
                Ok(()) => {
                    debug!(path = %request.path, "Attached bearer token");
                    RequestOutcome::Proceed(request)
                }
                Err(e) => self.cancel(CancelReason::TokenInvalid(e.to_string())),
            },
            TokenStatus::Expired(_) => self.cancel(CancelReason::TokenExpired),
            TokenStatus::Invalid(e) => self.cancel(CancelReason::TokenInvalid(e.to_string())),
        }
    }
}

/// Turns error outcomes into user notifications and session side effects
///
/// The error itself is always handed back unchanged.
#[derive(Debug, Clone)]
pub struct StatusNotifier {
    session: Arc<SessionGuard>,
}

impl StatusNotifier {
    pub fn new(session: Arc<SessionGuard>) -> Self {
        Self { session }
    }

    fn handle(&self, err: &ClientError) {
        match err {
            ClientError::SessionExpired(detail) => {
                if self.session.is_auth_page() {
                    // Failed login: nothing to redirect away from
                    self.session.clear();
                    self.session.notify(Notification::error(detail.clone()));
                } else {
                    self.session.end_session();
                }
            }
            ClientError::ValidationFailed { message, .. } => {
                warn!("Validation failed: {message}");
                self.session.notify(Notification::error(message.clone()));
            }
            ClientError::NotFound(message) | ClientError::Rejected { message, .. } => {
                warn!(status = ?err.status(), "{message}");
                self.session.notify(Notification::error(message.clone()));
            }
            ClientError::ServerFault { status, message } => {
                error!(status, "Server error: {message}");
                self.session.notify(Notification::error(SERVER_ERROR_MESSAGE));
            }
            ClientError::NetworkUnreachable(e) => {
                error!("Network error: {e}");
                self.session.notify(Notification::error(NETWORK_ERROR_MESSAGE));
            }
            ClientError::RequestCancelled(_)
            | ClientError::InvalidInput(_)
            | ClientError::Serialization(_)
            | ClientError::Storage(_)
            | ClientError::Configuration(_) => {}
        }
    }
}

impl ResponseInterceptor for StatusNotifier {
    fn intercept(&self, result: Result<ApiResponse, ClientError>) -> Result<ApiResponse, ClientError> {
        if let Err(err) = &result {
            self.handle(err);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::session::{MemorySessionStore, SessionStore};
    use crate::client::token::Clock;
    use crate::client::transport::TransportError;
    use crate::client::ui::{MockNavigator, MockNotifier, NotificationLevel};
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
    use http::header::AUTHORIZATION;

    struct FixedClock;

    impl Clock for FixedClock {
        fn now(&self) -> i64 {
            1_000
        }
    }

    fn token(exp: i64) -> String {
        let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"exp":{exp}}}"#));
        format!("h.{payload}.s")
    }

    fn session(
        store: Arc<MemorySessionStore>,
        navigator: MockNavigator,
        notifier: MockNotifier,
    ) -> Arc<SessionGuard> {
        Arc::new(
            SessionGuard::new(store, Arc::new(navigator), Arc::new(notifier))
                .with_clock(Arc::new(FixedClock)),
        )
    }

    #[test]
    fn test_fresh_token_attached() {
        let store = Arc::new(MemorySessionStore::with_session(token(2_000), "{}"));
        let auth = BearerAuth::new(session(store, MockNavigator::new(), MockNotifier::new()));

        let RequestOutcome::Proceed(request) = auth.intercept(ApiRequest::get("/customers/")) else {
            panic!("request was cancelled");
        };
        assert_eq!(
            request.headers.get(AUTHORIZATION).unwrap().to_str().unwrap(),
            format!("Bearer {}", token(2_000))
        );
    }

    #[test]
    fn test_no_token_proceeds_unauthenticated() {
        let store = Arc::new(MemorySessionStore::new());
        let auth = BearerAuth::new(session(store, MockNavigator::new(), MockNotifier::new()));

        let RequestOutcome::Proceed(request) = auth.intercept(ApiRequest::get("/health/")) else {
            panic!("request was cancelled");
        };
        assert!(!request.has_authorization());
    }

    #[test]
    fn test_expired_token_cancels_and_redirects() {
        let store = Arc::new(MemorySessionStore::with_session(token(1_000), "{}"));
        let mut navigator = MockNavigator::new();
        navigator.expect_is_auth_page().return_const(false);
        navigator.expect_redirect().times(1).return_const(());
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().times(1).return_const(());

        let auth = BearerAuth::new(session(store.clone(), navigator, notifier));
        assert!(matches!(
            auth.intercept(ApiRequest::get("/invoices/")),
            RequestOutcome::Cancel(CancelReason::TokenExpired)
        ));
        assert_eq!(store.token().unwrap(), None);
    }

    #[test]
    fn test_garbage_token_cancels_as_invalid() {
        let store = Arc::new(MemorySessionStore::with_session("not-a-token", "{}"));
        let mut navigator = MockNavigator::new();
        navigator.expect_is_auth_page().return_const(true);
        navigator.expect_redirect().never();

        let auth = BearerAuth::new(session(store.clone(), navigator, MockNotifier::new()));
        assert!(matches!(
            auth.intercept(ApiRequest::get("/invoices/")),
            RequestOutcome::Cancel(CancelReason::TokenInvalid(_))
        ));
        assert_eq!(store.token().unwrap(), None);
    }

    #[test]
    fn test_explicit_authorization_is_kept() {
        let store = Arc::new(MemorySessionStore::with_session(token(1), "{}"));
        let auth = BearerAuth::new(session(store.clone(), MockNavigator::new(), MockNotifier::new()));

        let request = ApiRequest::get("/users/me").with_bearer("issued").unwrap();
        assert!(matches!(auth.intercept(request), RequestOutcome::Proceed(_)));
        assert!(store.token().unwrap().is_some());
    }

    #[test]
    fn test_network_error_notified() {
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .withf(|n| n.level == NotificationLevel::Error && n.message == NETWORK_ERROR_MESSAGE)
            .times(1)
            .return_const(());
        let notifier = StatusNotifier::new(session(
            Arc::new(MemorySessionStore::new()),
            MockNavigator::new(),
            notifier,
        ));

        let result = notifier.intercept(Err(ClientError::NetworkUnreachable(TransportError::new(
            "connection failed",
        ))));
        assert!(matches!(result, Err(ClientError::NetworkUnreachable(_))));
    }

    #[test]
    fn test_server_fault_uses_generic_message() {
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .withf(|n| n.message == SERVER_ERROR_MESSAGE)
            .times(1)
            .return_const(());
        let notifier = StatusNotifier::new(session(
            Arc::new(MemorySessionStore::new()),
            MockNavigator::new(),
            notifier,
        ));

        let result = notifier.intercept(Err(ClientError::from_response(500, b"Traceback ...")));
        assert!(matches!(result, Err(ClientError::ServerFault { status: 500, .. })));
    }

    #[test]
    fn test_failed_login_shows_detail_without_redirect() {
        let mut navigator = MockNavigator::new();
        navigator.expect_is_auth_page().return_const(true);
        navigator.expect_redirect().never();
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .withf(|n| n.message == "Incorrect email or password")
            .times(1)
            .return_const(());
        let notifier = StatusNotifier::new(session(
            Arc::new(MemorySessionStore::new()),
            navigator,
            notifier,
        ));

        let body = br#"{"detail":"Incorrect email or password"}"#;
        let result = notifier.intercept(Err(ClientError::from_response(401, body)));
        assert!(matches!(result, Err(ClientError::SessionExpired(_))));
    }

    #[test]
    fn test_cancellation_is_silent() {
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().never();
        let notifier = StatusNotifier::new(session(
            Arc::new(MemorySessionStore::new()),
            MockNavigator::new(),
            notifier,
        ));

        let result = notifier.intercept(Err(ClientError::RequestCancelled(CancelReason::TokenExpired)));
        assert!(matches!(result, Err(ClientError::RequestCancelled(_))));
    }
}
