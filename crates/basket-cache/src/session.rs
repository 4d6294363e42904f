//! Versioned session records on top of the key-value store.

use crate::{Cache, CacheError};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// A unique session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Create a new session ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new random session ID.
    pub fn generate() -> Self {
        use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
        use rand::Rng;

        let bytes: [u8; 18] = rand::thread_rng().gen();
        Self(format!("sess_{}", URL_SAFE_NO_PAD.encode(bytes)))
    }

    /// Get the session ID as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Session record stored in the cache.
///
/// Generic over the user data type `T`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData<T> {
    /// The session ID.
    pub id: SessionId,
    /// User-defined session data.
    pub data: T,
    /// Number of writes so far.
    pub version: u64,
    /// When the record was first written (Unix timestamp).
    pub created_at: u64,
    /// When the record was last written (Unix timestamp).
    pub last_accessed: u64,
}

/// Namespaced, versioned records keyed by session.
///
/// # Example
///
/// ```rust,ignore
/// use basket_cache::{Cache, Session, SessionId};
///
/// let carts = Session::<CartRecord>::new(Cache::in_memory(), "cart");
/// let id = SessionId::generate();
///
/// let mut cart = carts.get(&id)?.unwrap_or_default();
/// cart.items.push(item);
/// carts.set(&id, &cart)?;
/// ```
#[derive(Clone)]
pub struct Session<T> {
    cache: Cache,
    namespace: &'static str,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Session<T>
where
    T: Serialize + DeserializeOwned + Default + Clone,
{
    /// Create a session manager over `cache`, storing records under `namespace`.
    pub fn new(cache: Cache, namespace: &'static str) -> Self {
        Self {
            cache,
            namespace,
            _phantom: std::marker::PhantomData,
        }
    }

    /// Get session data if it exists.
    pub fn get(&self, id: &SessionId) -> Result<Option<T>, CacheError> {
        Ok(self.get_versioned(id)?.map(|s| s.data))
    }

    fn get_versioned(&self, id: &SessionId) -> Result<Option<SessionData<T>>, CacheError> {
        self.cache.get::<SessionData<T>>(&self.session_key(id))
    }

    /// Set session data (unconditional write).
    pub fn set(&self, id: &SessionId, data: &T) -> Result<(), CacheError> {
        let current = self.get_versioned(id)?;
        let version = current.as_ref().map(|s| s.version + 1).unwrap_or(1);
        let created_at = current.map(|s| s.created_at);
        self.write(id, data, version, created_at)
    }

    fn write(
        &self,
        id: &SessionId,
        data: &T,
        version: u64,
        created_at: Option<u64>,
    ) -> Result<(), CacheError> {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        let session_data = SessionData {
            id: id.clone(),
            data: data.clone(),
            version,
            created_at: created_at.unwrap_or(now),
            last_accessed: now,
        };

        self.cache.set(&self.session_key(id), &session_data)
    }

    fn session_key(&self, id: &SessionId) -> String {
        crate::cache_key!(self.namespace, id)
    }
}
