//! Key-Value store wrapper with automatic serialization.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::CacheError;
use serde::{de::DeserializeOwned, Serialize};

const FILE_EXTENSION: &str = "json";

/// Type-safe cache backed by memory or a directory of JSON files.
///
/// Provides automatic JSON serialization for any type that implements
/// `Serialize` and `DeserializeOwned`. Cloning a `Cache` yields another
/// handle onto the same store.
#[derive(Clone)]
pub struct Cache {
    backend: Arc<Backend>,
}

enum Backend {
    Memory(Mutex<HashMap<String, Vec<u8>>>),
    Directory(PathBuf),
}

impl Cache {
    /// Open an in-memory store. Nothing outlives the process.
    pub fn in_memory() -> Self {
        Self {
            backend: Arc::new(Backend::Memory(Mutex::new(HashMap::new()))),
        }
    }

    /// Open a directory-backed store, creating the directory if needed.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let cache = Cache::open("/tmp/basket")?;
    /// ```
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, CacheError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .map_err(|e| CacheError::OpenError(format!("{}: {}", dir.display(), e)))?;
        tracing::debug!(dir = %dir.display(), "opened cache directory");
        Ok(Self {
            backend: Arc::new(Backend::Directory(dir.to_path_buf())),
        })
    }

    /// Get a value from the cache.
    ///
    /// Returns `None` if the key doesn't exist.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        match self.get_bytes(key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Set a value in the cache.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec(value)?;
        self.set_bytes(key, bytes)
    }

    /// Delete a value from the cache. Deleting a missing key is not an error.
    pub fn delete(&self, key: &str) -> Result<(), CacheError> {
        validate_key(key)?;
        match self.backend.as_ref() {
            Backend::Memory(map) => {
                lock(map)?.remove(key);
                Ok(())
            }
            Backend::Directory(dir) => match fs::remove_file(file_for(dir, key)) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            },
        }
    }

    fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        validate_key(key)?;
        match self.backend.as_ref() {
            Backend::Memory(map) => Ok(lock(map)?.get(key).cloned()),
            Backend::Directory(dir) => match fs::read(file_for(dir, key)) {
                Ok(bytes) => Ok(Some(bytes)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                Err(e) => Err(e.into()),
            },
        }
    }

    fn set_bytes(&self, key: &str, bytes: Vec<u8>) -> Result<(), CacheError> {
        validate_key(key)?;
        match self.backend.as_ref() {
            Backend::Memory(map) => {
                lock(map)?.insert(key.to_string(), bytes);
                Ok(())
            }
            Backend::Directory(dir) => {
                // Write-then-rename so a crash never leaves a truncated record.
                let target = file_for(dir, key);
                let staging = target.with_extension("json.tmp");
                fs::write(&staging, bytes)?;
                fs::rename(&staging, &target)?;
                Ok(())
            }
        }
    }
}

fn lock(
    map: &Mutex<HashMap<String, Vec<u8>>>,
) -> Result<std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>>, CacheError> {
    map.lock()
        .map_err(|_| CacheError::StoreError("memory store lock poisoned".to_string()))
}

fn file_for(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("{}.{}", key.replace(':', "."), FILE_EXTENSION))
}

/// Keys map one-to-one onto file names, so only a conservative alphabet is allowed.
fn validate_key(key: &str) -> Result<(), CacheError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':'));
    if valid {
        Ok(())
    } else {
        Err(CacheError::InvalidKey(key.to_string()))
    }
}

/// Helper to build cache keys with namespacing.
///
/// # Example
///
/// ```rust,ignore
/// let key = cache_key!("cart", session_id);
/// // Returns "cart:sess_abc"
/// ```
#[macro_export]
macro_rules! cache_key {
    ($prefix:expr, $($part:expr),+) => {{
        let mut key = String::from($prefix);
        $(
            key.push(':');
            key.push_str(&$part.to_string());
        )+
        key
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Record {
        name: String,
        count: u32,
    }

    fn record() -> Record {
        Record {
            name: "ghee".to_string(),
            count: 2,
        }
    }

    #[test]
    fn test_memory_round_trip() {
        let cache = Cache::in_memory();
        cache.set("cart:one", &record()).unwrap();
        assert_eq!(cache.get::<Record>("cart:one").unwrap(), Some(record()));

        cache.delete("cart:one").unwrap();
        assert_eq!(cache.get::<Record>("cart:one").unwrap(), None);
    }

    #[test]
    fn test_directory_persists_across_handles() {
        let dir = tempfile::tempdir().unwrap();
        {
            let cache = Cache::open(dir.path()).unwrap();
            cache.set("session:sess_x", &record()).unwrap();
        }
        let reopened = Cache::open(dir.path()).unwrap();
        assert_eq!(
            reopened.get::<Record>("session:sess_x").unwrap(),
            Some(record())
        );
        assert!(dir.path().join("session.sess_x.json").is_file());
    }

    #[test]
    fn test_delete_missing_key_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::open(dir.path()).unwrap();
        assert!(cache.delete("nothing:here").is_ok());
    }

    #[test]
    fn test_invalid_key_rejected() {
        let cache = Cache::in_memory();
        let err = cache.set("../escape", &record()).unwrap_err();
        assert!(matches!(err, CacheError::InvalidKey(_)));
        assert!(matches!(
            cache.get::<Record>("").unwrap_err(),
            CacheError::InvalidKey(_)
        ));
    }

    #[test]
    fn test_clones_share_store() {
        let cache = Cache::in_memory();
        let other = cache.clone();
        cache.set("k", &1u32).unwrap();
        assert_eq!(other.get::<u32>("k").unwrap(), Some(1));
    }

    #[test]
    fn test_cache_key_macro() {
        let id = 42;
        assert_eq!(cache_key!("order", id), "order:42");
        assert_eq!(cache_key!("cart", "sess", 7), "cart:sess:7");
    }
}
