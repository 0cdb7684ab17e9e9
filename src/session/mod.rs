//! Session
//!
//! The session is shared process-wide through a cloneable [`SessionContext`].
//! Readers (the route guard, the API client) take a read lock; the only
//! writers are login, logout and the expiry handler, each of which holds the
//! write lock across both the in-memory and the persisted update.

use std::{fmt, sync::Arc};

use parking_lot::RwLock;
use tracing::{debug, info, warn};

mod models;
mod storage;
mod token;

pub use models::{Session, UserId, UserProfile};
pub use storage::{FileStorage, MemoryStorage, MockStorage, Storage, StorageError};
pub use token::AuthToken;

/// Storage key for the bearer token.
pub const TOKEN_KEY: &str = "token";

/// Storage key for the serialized user profile.
pub const USER_KEY: &str = "user";

/// Storage key for the demo profile cache, independent of the session.
pub const PROFILE_CACHE_KEY: &str = "userProfile";

/// Shared handle to the current session and its persistent store.
#[derive(Clone)]
pub struct SessionContext {
    current: Arc<RwLock<Option<Session>>>,
    storage: Arc<dyn Storage>,
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("current", &*self.current.read())
            .finish_non_exhaustive()
    }
}

impl SessionContext {
    /// Create a signed-out context backed by `storage`, ignoring anything
    /// already stored.
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            current: Arc::new(RwLock::new(None)),
            storage,
        }
    }

    /// Create a context from whatever session `storage` holds.
    ///
    /// A stored profile that can no longer be parsed is dropped from storage;
    /// the token alone still counts as a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be read.
    pub fn restore(storage: Arc<dyn Storage>) -> Result<Self, StorageError> {
        let token = storage.get(TOKEN_KEY)?.and_then(AuthToken::new);

        let user = match storage.get(USER_KEY)? {
            Some(raw) => match serde_json::from_str::<UserProfile>(&raw) {
                Ok(user) => Some(user),
                Err(error) => {
                    warn!("discarding malformed stored profile: {error}");

                    storage.remove(USER_KEY)?;

                    None
                }
            },
            None => None,
        };

        let session = token.map(|token| Session { token, user });

        Ok(Self {
            current: Arc::new(RwLock::new(session)),
            storage,
        })
    }

    /// Store a new session, replacing any current one.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be persisted; the in-memory
    /// session is left unchanged in that case.
    pub fn login(&self, session: Session) -> Result<(), StorageError> {
        let mut current = self.current.write();

        let user_json = session
            .user
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|source| StorageError::Malformed {
                key: USER_KEY.to_string(),
                source,
            })?;

        self.storage.set(TOKEN_KEY, session.token.expose())?;

        match user_json {
            Some(json) => self.storage.set(USER_KEY, &json)?,
            None => self.storage.remove(USER_KEY)?,
        }

        info!(
            user = session.user.as_ref().map(|user| user.email.as_str()),
            "session started"
        );

        *current = Some(session);

        Ok(())
    }

    /// Sign out.
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted session cannot be removed. The
    /// in-memory session is cleared regardless.
    pub fn logout(&self) -> Result<(), StorageError> {
        self.clear("logout")
    }

    /// Drop a session the backend no longer accepts.
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted session cannot be removed. The
    /// in-memory session is cleared regardless.
    pub fn expire(&self) -> Result<(), StorageError> {
        self.clear("expired")
    }

    /// Drop the session only if it is still the one that sent `sent`.
    ///
    /// A rejection that arrives after a newer login leaves the newer session
    /// alone. Returns whether the session was (or already is) the rejected
    /// one.
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted session cannot be removed. The
    /// in-memory session is cleared regardless.
    pub fn expire_if(&self, sent: Option<&AuthToken>) -> Result<bool, StorageError> {
        let mut current = self.current.write();

        if current.as_ref().map(|session| &session.token) != sent {
            debug!("rejected token is no longer current, keeping session");

            return Ok(false);
        }

        self.clear_locked(&mut current, "expired")?;

        Ok(true)
    }

    /// Current bearer token, if signed in.
    #[must_use]
    pub fn token(&self) -> Option<AuthToken> {
        self.current
            .read()
            .as_ref()
            .map(|session| session.token.clone())
    }

    /// Whether a token is present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.current.read().is_some()
    }

    /// Whether the signed-in user is an administrator.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.current.read().as_ref().is_some_and(Session::is_admin)
    }

    /// Profile of the signed-in user.
    #[must_use]
    pub fn user(&self) -> Option<UserProfile> {
        self.current
            .read()
            .as_ref()
            .and_then(|session| session.user.clone())
    }

    /// Run `f` against the current session under a read lock.
    pub fn with_session<R>(&self, f: impl FnOnce(Option<&Session>) -> R) -> R {
        f(self.current.read().as_ref())
    }

    fn clear(&self, reason: &'static str) -> Result<(), StorageError> {
        self.clear_locked(&mut self.current.write(), reason)
    }

    fn clear_locked(
        &self,
        current: &mut Option<Session>,
        reason: &'static str,
    ) -> Result<(), StorageError> {
        let was_signed_in = current.take().is_some();

        self.storage.remove(TOKEN_KEY)?;
        self.storage.remove(USER_KEY)?;

        if was_signed_in {
            info!(reason, "session cleared");
        }

        Ok(())
    }
}

/// Demo profile cache, stored under its own key and left alone by logout.
#[derive(Clone)]
pub struct ProfileCache {
    storage: Arc<dyn Storage>,
}

impl fmt::Debug for ProfileCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfileCache").finish_non_exhaustive()
    }
}

impl ProfileCache {
    /// Create a cache over `storage`.
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Read the cached profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be read or the value is malformed.
    pub fn get(&self) -> Result<Option<UserProfile>, StorageError> {
        self.storage
            .get(PROFILE_CACHE_KEY)?
            .map(|raw| {
                serde_json::from_str(&raw).map_err(|source| StorageError::Malformed {
                    key: PROFILE_CACHE_KEY.to_string(),
                    source,
                })
            })
            .transpose()
    }

    /// Replace the cached profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile cannot be written.
    pub fn set(&self, profile: &UserProfile) -> Result<(), StorageError> {
        let json = serde_json::to_string(profile).map_err(|source| StorageError::Malformed {
            key: PROFILE_CACHE_KEY.to_string(),
            source,
        })?;

        self.storage.set(PROFILE_CACHE_KEY, &json)
    }

    /// Remove the cached profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be written.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove(PROFILE_CACHE_KEY)
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use mockall::predicate::eq;
    use testresult::TestResult;

    use super::*;

    fn profile(admin: bool) -> UserProfile {
        UserProfile {
            id: UserId::new("u-1"),
            name: "Sita".to_string(),
            email: "sita@example.com".to_string(),
            phone: Some("9800000000".to_string()),
            address: None,
            avatar: None,
            is_admin: admin,
        }
    }

    fn session(admin: bool) -> Result<Session, &'static str> {
        Ok(Session {
            token: AuthToken::new("tok").ok_or("blank token")?,
            user: Some(profile(admin)),
        })
    }

    #[test]
    fn login_persists_token_and_user() -> TestResult {
        let storage = Arc::new(MemoryStorage::new());
        let context = SessionContext::new(storage.clone());

        context.login(session(false)?)?;

        assert!(context.is_authenticated());
        assert_eq!(storage.get(TOKEN_KEY)?, Some("tok".to_string()));
        assert!(storage.get(USER_KEY)?.is_some());

        Ok(())
    }

    #[test]
    fn restore_reads_persisted_session() -> TestResult {
        let storage = Arc::new(MemoryStorage::new());

        SessionContext::new(storage.clone()).login(session(true)?)?;

        let restored = SessionContext::restore(storage)?;

        assert!(restored.is_authenticated());
        assert!(restored.is_admin());
        assert_eq!(restored.user().map(|user| user.email), Some("sita@example.com".to_string()));

        Ok(())
    }

    #[test]
    fn restore_drops_malformed_profile_but_keeps_token() -> TestResult {
        let storage = Arc::new(MemoryStorage::new());

        storage.set(TOKEN_KEY, "tok")?;
        storage.set(USER_KEY, "{not json")?;

        let restored = SessionContext::restore(storage.clone())?;

        assert!(restored.is_authenticated());
        assert!(restored.user().is_none());
        assert_eq!(storage.get(USER_KEY)?, None);

        Ok(())
    }

    #[test]
    fn restore_without_token_is_signed_out() -> TestResult {
        let storage = Arc::new(MemoryStorage::new());

        storage.set(TOKEN_KEY, "")?;

        let restored = SessionContext::restore(storage)?;

        assert!(!restored.is_authenticated());

        Ok(())
    }

    #[test]
    fn logout_clears_memory_and_storage() -> TestResult {
        let storage = Arc::new(MemoryStorage::new());
        let context = SessionContext::new(storage.clone());

        context.login(session(false)?)?;
        context.logout()?;

        assert!(!context.is_authenticated());
        assert!(context.token().is_none());
        assert_eq!(storage.get(TOKEN_KEY)?, None);
        assert_eq!(storage.get(USER_KEY)?, None);

        Ok(())
    }

    #[test]
    fn expire_clears_memory_even_when_storage_fails() -> TestResult {
        let mut storage = MockStorage::new();

        storage.expect_set().returning(|_, _| Ok(()));
        storage
            .expect_remove()
            .with(eq(TOKEN_KEY))
            .returning(|key| {
                Err(StorageError::Io {
                    key: key.to_string(),
                    source: io::Error::other("disk full"),
                })
            });

        let context = SessionContext::new(Arc::new(storage));

        context.login(session(false)?)?;

        assert!(context.expire().is_err());
        assert!(!context.is_authenticated());

        Ok(())
    }

    #[test]
    fn expire_if_clears_the_session_that_sent_the_token() -> TestResult {
        let storage = Arc::new(MemoryStorage::new());
        let context = SessionContext::new(storage.clone());

        context.login(session(false)?)?;

        let sent = context.token();

        assert!(context.expire_if(sent.as_ref())?);
        assert!(!context.is_authenticated());
        assert_eq!(storage.get(TOKEN_KEY)?, None);

        Ok(())
    }

    #[test]
    fn expire_if_keeps_a_newer_session() -> TestResult {
        let storage = Arc::new(MemoryStorage::new());
        let context = SessionContext::new(storage.clone());
        let stale = AuthToken::new("old-token").ok_or("blank token")?;

        context.login(session(false)?)?;

        assert!(!context.expire_if(Some(&stale))?);
        assert!(!context.expire_if(None)?);
        assert!(context.is_authenticated());
        assert_eq!(storage.get(TOKEN_KEY)?, Some("tok".to_string()));

        Ok(())
    }

    #[test]
    fn failed_login_leaves_session_unchanged() -> TestResult {
        let mut storage = MockStorage::new();

        storage.expect_set().returning(|key, _| {
            Err(StorageError::Io {
                key: key.to_string(),
                source: io::Error::other("read-only"),
            })
        });

        let context = SessionContext::new(Arc::new(storage));

        assert!(context.login(session(false)?).is_err());
        assert!(!context.is_authenticated());

        Ok(())
    }

    #[test]
    fn profile_cache_survives_logout() -> TestResult {
        let storage = Arc::new(MemoryStorage::new());
        let context = SessionContext::new(storage.clone());
        let cache = ProfileCache::new(storage);

        context.login(session(false)?)?;
        cache.set(&profile(false))?;
        context.logout()?;

        assert_eq!(cache.get()?, Some(profile(false)));

        cache.clear()?;

        assert_eq!(cache.get()?, None);

        Ok(())
    }
}
