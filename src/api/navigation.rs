//! Navigation seam used by the session expiry handler.

use mockall::automock;
use parking_lot::Mutex;

use crate::guard::{LoginRedirect, RouteGuard};

/// Where the user currently is, and how to send them elsewhere.
#[automock]
pub trait Navigator: Send + Sync {
    /// Path of the current page, including any query string.
    fn current_path(&self) -> String;

    /// Navigate to `location`.
    fn redirect(&self, location: &str);
}

/// Navigator with no UI behind it. Redirects update the current path and
/// are recorded in order.
#[derive(Debug)]
pub struct HeadlessNavigator {
    current: Mutex<String>,
    redirects: Mutex<Vec<String>>,
}

impl HeadlessNavigator {
    /// Start at `path`.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            current: Mutex::new(path.into()),
            redirects: Mutex::new(Vec::new()),
        }
    }

    /// Move to `path` without recording a redirect.
    pub fn visit(&self, path: impl Into<String>) {
        *self.current.lock() = path.into();
    }

    /// Most recent redirect, if any.
    #[must_use]
    pub fn last_redirect(&self) -> Option<String> {
        self.redirects.lock().last().cloned()
    }

    /// All redirects so far, oldest first.
    #[must_use]
    pub fn redirects(&self) -> Vec<String> {
        self.redirects.lock().clone()
    }
}

impl Default for HeadlessNavigator {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for HeadlessNavigator {
    fn current_path(&self) -> String {
        self.current.lock().clone()
    }

    fn redirect(&self, location: &str) {
        *self.current.lock() = location.to_string();

        self.redirects.lock().push(location.to_string());
    }
}

/// Where to send the user after the backend rejected their session.
///
/// Returns `None` on an authentication page, so a failed login never loops
/// back to itself.
#[must_use]
pub fn expiry_redirect(guard: &RouteGuard, current_path: &str) -> Option<LoginRedirect> {
    if guard.is_auth_page(current_path) {
        return None;
    }

    Some(guard.redirect_for(current_path))
}
