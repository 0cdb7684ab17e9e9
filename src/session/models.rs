//! Session data models.

use serde::{Deserialize, Serialize};

use crate::{ids::TypedId, session::AuthToken};

/// User identifier.
pub type UserId = TypedId<UserProfile>;

/// Profile of the signed-in user, as returned by the auth backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// User identifier
    #[serde(alias = "_id")]
    pub id: UserId,

    /// Display name
    pub name: String,

    /// Email address
    pub email: String,

    /// Phone number
    #[serde(default)]
    pub phone: Option<String>,

    /// Default delivery address
    #[serde(default)]
    pub address: Option<String>,

    /// Avatar image reference
    #[serde(default)]
    pub avatar: Option<String>,

    /// Whether the user may use the admin surface
    #[serde(default)]
    pub is_admin: bool,
}

/// An authenticated session. The token's presence is what makes it authenticated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    /// Bearer credential
    pub token: AuthToken,

    /// Cached profile; may be absent when only the token survived a restart.
    pub user: Option<UserProfile>,
}

impl Session {
    /// Whether the session belongs to an administrator.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(|user| user.is_admin)
    }
}
