//! Route guard

use smallvec::{SmallVec, smallvec};
use url::form_urlencoded;

use crate::session::{Session, SessionContext};

/// Query parameter carrying the resume path on the login page.
pub const RESUME_PARAM: &str = "redirect";

/// Access level required by a route.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteAccess {
    /// Open to everyone.
    Public,

    /// Requires a session.
    Protected,

    /// Requires an administrator session.
    Admin,
}

/// A redirect to the login page that remembers where the user was going.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoginRedirect {
    /// Login entry point
    pub login_path: String,

    /// Originally requested location, restored after login
    pub resume_path: String,
}

impl LoginRedirect {
    /// Location to navigate to, e.g. `/login?redirect=%2Forders`.
    #[must_use]
    pub fn location(&self) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair(RESUME_PARAM, &self.resume_path)
            .finish();

        format!("{}?{query}", self.login_path)
    }
}

/// Outcome of a navigation check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    /// Navigation may proceed.
    Allow,

    /// No session; go to login and come back afterwards.
    RedirectTo(LoginRedirect),

    /// Signed in, but not allowed here.
    Forbidden {
        /// Where to send the user instead
        fallback: String,
    },
}

/// Decides whether a navigation is allowed for a session.
#[derive(Clone, Debug)]
pub struct RouteGuard {
    login_path: String,
    register_path: String,
    home_path: String,
    protected: SmallVec<[String; 8]>,
    admin: SmallVec<[String; 4]>,
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self {
            login_path: "/login".to_string(),
            register_path: "/register".to_string(),
            home_path: "/".to_string(),
            protected: smallvec![
                "/checkout".to_string(),
                "/orders".to_string(),
                "/order".to_string(),
                "/profile".to_string(),
            ],
            admin: smallvec!["/admin".to_string()],
        }
    }
}

impl RouteGuard {
    /// Guard with the storefront's default routes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Require a session under `prefix`.
    #[must_use]
    pub fn protect(mut self, prefix: impl Into<String>) -> Self {
        self.protected.push(prefix.into());
        self
    }

    /// Require an administrator under `prefix`.
    #[must_use]
    pub fn restrict_to_admin(mut self, prefix: impl Into<String>) -> Self {
        self.admin.push(prefix.into());
        self
    }

    /// Login entry point.
    #[must_use]
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// Whether `path` is one of the authentication pages.
    #[must_use]
    pub fn is_auth_page(&self, path: &str) -> bool {
        let path = route_of(path);

        path == self.login_path || path == self.register_path
    }

    /// Access level of `path`, matched by prefix on segment boundaries.
    #[must_use]
    pub fn access(&self, path: &str) -> RouteAccess {
        let path = route_of(path);

        if self.admin.iter().any(|prefix| under(path, prefix)) {
            RouteAccess::Admin
        } else if self.protected.iter().any(|prefix| under(path, prefix)) {
            RouteAccess::Protected
        } else {
            RouteAccess::Public
        }
    }

    /// Decide whether `session` may navigate to `requested`.
    ///
    /// `requested` may include a query string, which is kept in the resume path.
    #[must_use]
    pub fn check(&self, session: Option<&Session>, requested: &str) -> GuardDecision {
        match (self.access(requested), session) {
            (RouteAccess::Public, _) => GuardDecision::Allow,
            (RouteAccess::Protected | RouteAccess::Admin, None) => {
                GuardDecision::RedirectTo(self.redirect_for(requested))
            }
            (RouteAccess::Protected, Some(_)) => GuardDecision::Allow,
            (RouteAccess::Admin, Some(session)) if session.is_admin() => GuardDecision::Allow,
            (RouteAccess::Admin, Some(_)) => GuardDecision::Forbidden {
                fallback: self.home_path.clone(),
            },
        }
    }

    /// [`RouteGuard::check`] against a shared session context.
    #[must_use]
    pub fn check_context(&self, context: &SessionContext, requested: &str) -> GuardDecision {
        context.with_session(|session| self.check(session, requested))
    }

    /// Login redirect that resumes at `resume_path`.
    #[must_use]
    pub fn redirect_for(&self, resume_path: &str) -> LoginRedirect {
        LoginRedirect {
            login_path: self.login_path.clone(),
            resume_path: resume_path.to_string(),
        }
    }
}

/// Read the resume path from a login page query string.
///
/// Only local absolute paths are accepted, so a crafted link cannot bounce
/// the user to another site after login.
#[must_use]
pub fn resume_path_from_query(query: &str) -> Option<String> {
    let query = query.strip_prefix('?').unwrap_or(query);

    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == RESUME_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|path| is_local_path(path))
}

fn is_local_path(path: &str) -> bool {
    path.starts_with('/') && !path.starts_with("//") && !path.contains('\\')
}

fn route_of(path: &str) -> &str {
    path.split(['?', '#']).next().unwrap_or(path)
}

fn under(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}
