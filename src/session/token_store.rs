use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use super::SessionError;

/// Storage key of the bearer token, the only client-side persisted state.
pub const TOKEN_KEY: &str = "strapi_jwt";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TokenStore trait
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Pluggable storage back-end. Production writes to disk; tests use
/// an in-memory implementation.
pub trait TokenStore: Send + Sync {
    fn save(&self, token: &str) -> Result<(), SessionError>;
    fn load(&self) -> Result<Option<String>, SessionError>;
    fn delete(&self) -> Result<(), SessionError>;
}

impl<T: TokenStore + ?Sized> TokenStore for Box<T> {
    fn save(&self, token: &str) -> Result<(), SessionError> {
        (**self).save(token)
    }

    fn load(&self) -> Result<Option<String>, SessionError> {
        (**self).load()
    }

    fn delete(&self) -> Result<(), SessionError> {
        (**self).delete()
    }
}

/// On-disk layout: `{ "strapi_jwt": "<token>" }`.
#[derive(Debug, Serialize, Deserialize)]
struct StoredToken {
    #[serde(rename = "strapi_jwt")]
    token: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// FileTokenStore: XDG config dir, one JSON file
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Stores the token in `<config_dir>/leftorium/session.json`.
///
/// On Linux: `~/.config/leftorium/session.json`
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Falls back to `./leftorium/session.json` if no home directory is known.
    pub fn default_path() -> PathBuf {
        let base = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|_| std::env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
            .unwrap_or_else(|_| PathBuf::from("."));

        base.join("leftorium").join("session.json")
    }

    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn with_default_path() -> Self {
        Self::new(Self::default_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn save(&self, token: &str) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(&StoredToken {
            token: token.to_string(),
        })
        .map_err(|e| SessionError::Storage(format!("Failed to serialize token: {e}")))?;

        std::fs::write(&self.path, json)?;

        // Restrict permissions on Unix (owner read/write only)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.path, perms)?;
        }

        Ok(())
    }

    fn load(&self) -> Result<Option<String>, SessionError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path)?;
        let stored: StoredToken = serde_json::from_str(&content)
            .map_err(|e| SessionError::Storage(format!("Corrupt session file: {e}")))?;

        Ok(Some(stored.token).filter(|t| !t.is_empty()))
    }

    fn delete(&self) -> Result<(), SessionError> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// MemoryTokenStore: process-local
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Clones share the same slot.
#[derive(Clone, Default)]
pub struct MemoryTokenStore {
    inner: Arc<Mutex<Option<String>>>,
}

impl MemoryTokenStore {
    pub fn with_token(token: &str) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Some(token.to_string()))),
        }
    }

    pub fn current(&self) -> Option<String> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl TokenStore for MemoryTokenStore {
    fn save(&self, token: &str) -> Result<(), SessionError> {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        Ok(())
    }

    fn load(&self) -> Result<Option<String>, SessionError> {
        Ok(self.current())
    }

    fn delete(&self) -> Result<(), SessionError> {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
