//! CLI execution context.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use basket_auth::{AuthError, AuthSession, SessionStore};
use basket_cache::{Cache, SessionId};
use basket_commerce::cart::CartStore;
use basket_data::{ApiClient, TimeoutConfig};

use crate::config::{CliConfig, CONFIG_NAMES};
use crate::output::Output;

/// Cache key of the id that owns this profile's cart.
const CLIENT_ID_KEY: &str = "client:id";

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: CliConfig,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
    /// Where the config was read from, if anywhere.
    pub config_path: Option<PathBuf>,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, api_url: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (mut config, config_path) = match config_path {
            Some(path) => {
                let path = PathBuf::from(path);
                (CliConfig::load(&path)?, Some(path))
            }
            None => match Self::find_config(&cwd) {
                Some(path) => (CliConfig::load(&path)?, Some(path)),
                None => (CliConfig::default(), None),
            },
        };

        if let Some(url) = api_url {
            config.api.base_url = url.to_string();
        }

        Ok(Self {
            config,
            output,
            cwd,
            config_path,
        })
    }

    /// Find config file in directory tree.
    fn find_config(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            for name in &CONFIG_NAMES {
                let candidate = current.join(name);
                if candidate.exists() {
                    return Some(candidate);
                }
            }

            if !current.pop() {
                return None;
            }
        }
    }

    /// Directory holding the session and cart.
    pub fn data_dir(&self) -> PathBuf {
        match &self.config.store.data_dir {
            Some(dir) => self.resolve_path(dir),
            None => dirs_path().join("basket"),
        }
    }

    /// Open the local store.
    pub fn cache(&self) -> Result<Cache> {
        let dir = self.data_dir();
        Cache::open(&dir).with_context(|| format!("Failed to open data directory {}", dir.display()))
    }

    /// Persisted login session.
    pub fn sessions(&self) -> Result<SessionStore> {
        Ok(SessionStore::new(self.cache()?))
    }

    /// Backend client carrying the stored session.
    pub fn client(&self) -> Result<ApiClient> {
        let timeout = TimeoutConfig::from_secs(self.config.api.timeout_secs);
        let client = ApiClient::new(&self.config.api.base_url, timeout)
            .with_context(|| format!("Invalid API base URL: {}", self.config.api.base_url))?;
        Ok(client.with_sessions(self.sessions()?))
    }

    /// The cart for this profile. Survives login and logout.
    pub fn cart_store(&self) -> Result<Arc<CartStore>> {
        let cache = self.cache()?;
        let owner = match cache.get::<SessionId>(CLIENT_ID_KEY)? {
            Some(id) => id,
            None => {
                let id = SessionId::generate();
                cache.set(CLIENT_ID_KEY, &id)?;
                tracing::debug!(client_id = %id.as_str(), "new client id");
                id
            }
        };
        Ok(Arc::new(CartStore::open(cache, owner)?))
    }

    /// The signed-in session, or a "not logged in" error.
    pub fn require_session(&self) -> Result<AuthSession> {
        Ok(self.sessions()?.require()?)
    }

    /// The signed-in session, if it belongs to an administrator.
    pub fn require_admin(&self) -> Result<AuthSession> {
        let session = self.sessions()?.current()?.ok_or(AuthError::NotLoggedIn)?;
        basket_auth::require_admin(Some(&session))?;
        Ok(session)
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }
}

/// Get the platform-specific data directory.
fn dirs_path() -> PathBuf {
    if let Some(home) = std::env::var_os("HOME") {
        PathBuf::from(home).join(".local").join("share")
    } else {
        PathBuf::from("/tmp")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(dir: &Path) -> Context {
        let mut config = CliConfig::default();
        config.store.data_dir = Some(dir.to_path_buf());
        Context {
            config,
            output: Output::new(false, true),
            cwd: dir.to_path_buf(),
            config_path: None,
        }
    }

    #[test]
    fn test_find_config_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(".basket.toml"), "").unwrap();

        let found = Context::find_config(&nested).unwrap();
        assert_eq!(found, dir.path().join(".basket.toml"));
    }

    #[test]
    fn test_cart_owner_is_stable_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());

        let first = ctx.cache().unwrap().get::<SessionId>(CLIENT_ID_KEY).unwrap();
        assert!(first.is_none());
        ctx.cart_store().unwrap();
        let owner = ctx.cache().unwrap().get::<SessionId>(CLIENT_ID_KEY).unwrap();
        ctx.cart_store().unwrap();
        let again = ctx.cache().unwrap().get::<SessionId>(CLIENT_ID_KEY).unwrap();
        assert!(owner.is_some());
        assert_eq!(owner, again);
    }

    #[test]
    fn test_admin_check_requires_login() {
        let dir = tempfile::tempdir().unwrap();
        let err = context(dir.path()).require_admin().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AuthError>(),
            Some(AuthError::NotLoggedIn)
        ));
    }
}
