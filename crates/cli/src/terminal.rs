//! Terminal stand-ins for the UI collaborators

use gstpro_http::client::ui::{LoginRedirect, Navigator, Notification, NotificationLevel, Notifier};

/// Prints notifications to stderr
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, notification: Notification) {
        let label = match notification.level {
            NotificationLevel::Warning => "warning",
            NotificationLevel::Error => "error",
        };
        for line in notification.message.lines() {
            eprintln!("{label}: {line}");
        }
    }
}

/// The CLI has no pages; the login command plays the role of the auth page
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalNavigator {
    on_auth_page: bool,
}

impl TerminalNavigator {
    pub fn new(on_auth_page: bool) -> Self {
        Self { on_auth_page }
    }
}

impl Navigator for TerminalNavigator {
    fn is_auth_page(&self) -> bool {
        self.on_auth_page
    }

    fn redirect(&self, _target: &LoginRedirect) {
        eprintln!("Run `gstpro login` to sign in again.");
    }
}
