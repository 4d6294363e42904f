//! Session management.
//!
//! One authoritative session per profile directory. The session record
//! lives under its own id; a pointer key names the current one so logout
//! and 401 invalidation only have to drop the pointer and the record.

use basket_cache::{cache_key, Cache, SessionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::user::User;
use crate::AuthError;

const SESSION_NAMESPACE: &str = "auth";
const CURRENT_KEY: &str = "auth:current";

/// An authenticated session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthSession {
    /// Session ID.
    pub id: SessionId,
    pub user: User,
    /// Bearer token, when the backend issues one.
    pub token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
}

impl AuthSession {
    /// Create a new session for an authenticated user.
    pub fn authenticated(user: User, token: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: SessionId::generate(),
            user,
            token: token.filter(|t| !t.trim().is_empty()),
            created_at: now,
            last_activity_at: now,
        }
    }

    /// Update last activity timestamp.
    pub fn touch(&mut self) {
        self.last_activity_at = Utc::now();
    }

    /// `Authorization` header value, if there is a token.
    pub fn bearer(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {}", t))
    }
}

/// Persists the current [`AuthSession`].
#[derive(Clone)]
pub struct SessionStore {
    cache: Cache,
}

impl SessionStore {
    pub fn new(cache: Cache) -> Self {
        Self { cache }
    }

    fn record_key(id: &SessionId) -> String {
        cache_key!(SESSION_NAMESPACE, id)
    }

    /// Store a fresh login, replacing any previous session.
    pub fn save(&self, session: &AuthSession) -> Result<(), AuthError> {
        self.clear()?;
        self.cache.set(&Self::record_key(&session.id), session)?;
        self.cache.set(CURRENT_KEY, &session.id)?;
        tracing::info!(user = %session.user.email, role = %session.user.role, "session saved");
        Ok(())
    }

    /// The logged-in session, if any.
    pub fn current(&self) -> Result<Option<AuthSession>, AuthError> {
        let Some(id) = self.cache.get::<SessionId>(CURRENT_KEY)? else {
            return Ok(None);
        };
        Ok(self.cache.get(&Self::record_key(&id))?)
    }

    /// The logged-in session, or [`AuthError::NotLoggedIn`].
    pub fn require(&self) -> Result<AuthSession, AuthError> {
        self.current()?.ok_or(AuthError::NotLoggedIn)
    }

    /// Bearer token of the current session.
    pub fn token(&self) -> Result<Option<String>, AuthError> {
        Ok(self.current()?.and_then(|s| s.token))
    }

    /// Record activity on the current session.
    pub fn touch(&self) -> Result<(), AuthError> {
        if let Some(mut session) = self.current()? {
            session.touch();
            self.cache.set(&Self::record_key(&session.id), &session)?;
        }
        Ok(())
    }

    /// Drop the session after the backend rejected it.
    pub fn invalidate(&self) -> Result<(), AuthError> {
        if self.clear()? {
            tracing::warn!("session invalidated by backend, login required");
        }
        Ok(())
    }

    /// Log out.
    pub fn logout(&self) -> Result<bool, AuthError> {
        let had_session = self.clear()?;
        if had_session {
            tracing::info!("logged out");
        }
        Ok(had_session)
    }

    fn clear(&self) -> Result<bool, AuthError> {
        let Some(id) = self.cache.get::<SessionId>(CURRENT_KEY)? else {
            return Ok(false);
        };
        self.cache.delete(&Self::record_key(&id))?;
        self.cache.delete(CURRENT_KEY)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;
    use basket_commerce::ids::UserId;

    fn user(role: Role) -> User {
        User {
            id: UserId::new("1"),
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            phone: None,
            role,
        }
    }

    #[test]
    fn test_save_and_load() {
        let store = SessionStore::new(Cache::in_memory());
        assert!(store.current().unwrap().is_none());

        let session = AuthSession::authenticated(user(Role::Customer), Some("tok".to_string()));
        store.save(&session).unwrap();
        assert_eq!(store.current().unwrap(), Some(session));
        assert_eq!(store.token().unwrap().as_deref(), Some("tok"));
    }

    #[test]
    fn test_new_login_replaces_old() {
        let cache = Cache::in_memory();
        let store = SessionStore::new(cache.clone());
        let first = AuthSession::authenticated(user(Role::Customer), None);
        store.save(&first).unwrap();
        let second = AuthSession::authenticated(user(Role::Admin), None);
        store.save(&second).unwrap();

        assert_eq!(store.require().unwrap().id, second.id);
        let auth_keys = cache
            .keys()
            .unwrap()
            .into_iter()
            .filter(|k| k.starts_with("auth:") && k != CURRENT_KEY)
            .count();
        assert_eq!(auth_keys, 1);
    }

    #[test]
    fn test_invalidate() {
        let store = SessionStore::new(Cache::in_memory());
        store
            .save(&AuthSession::authenticated(user(Role::Customer), Some("t".into())))
            .unwrap();
        store.invalidate().unwrap();
        assert!(store.current().unwrap().is_none());
        assert!(matches!(store.require(), Err(AuthError::NotLoggedIn)));
        // Idempotent.
        store.invalidate().unwrap();
        assert!(!store.logout().unwrap());
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let session = AuthSession::authenticated(user(Role::Admin), Some("t".into()));
        SessionStore::new(Cache::open(dir.path()).unwrap())
            .save(&session)
            .unwrap();

        let reopened = SessionStore::new(Cache::open(dir.path()).unwrap());
        assert_eq!(reopened.require().unwrap().user.role, Role::Admin);
    }

    #[test]
    fn test_blank_token_dropped() {
        let session = AuthSession::authenticated(user(Role::Customer), Some("  ".to_string()));
        assert_eq!(session.bearer(), None);
    }
}
