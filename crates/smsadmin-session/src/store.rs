//! Token persistence.
//!
//! The browser keeps the raw token in local storage; the console keeps it
//! in a small file (or in memory for tests). Reads never error: an
//! unreadable store is an absent token, which downstream code already
//! treats as "not authenticated".

use std::path::PathBuf;
use std::sync::RwLock;

use tracing::warn;

/// Storage for the single raw bearer token.
///
/// Exactly one token lives in a store at a time; writes are full
/// overwrites and `clear` removes it entirely. No partial updates exist.
pub trait TokenStore: Send + Sync {
    /// Return the persisted token, if any. Never errors.
    fn load(&self) -> Option<String>;

    /// Persist the token, overwriting any prior value.
    fn save(&self, token: &str);

    /// Remove the persisted token.
    fn clear(&self);
}

/// In-memory token store, used by tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<String> {
        self.token.read().ok().and_then(|t| t.clone())
    }

    fn save(&self, token: &str) {
        if let Ok(mut slot) = self.token.write() {
            *slot = Some(token.to_string());
        }
    }

    fn clear(&self) {
        if let Ok(mut slot) = self.token.write() {
            *slot = None;
        }
    }
}

/// File-backed token store.
///
/// IO failures are logged and swallowed: a failed read means no session,
/// a failed write means the session will not survive a restart. Both
/// degrade, neither crashes.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Create a store backed by the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Option<String> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => {
                let token = raw.trim().to_string();
                if token.is_empty() { None } else { Some(token) }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read token file");
                None
            }
        }
    }

    fn save(&self, token: &str) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!(path = %parent.display(), error = %e, "Failed to create token directory");
                return;
            }
        }
        if let Err(e) = std::fs::write(&self.path, token) {
            warn!(path = %self.path.display(), error = %e, "Failed to persist token");
        }
    }

    fn clear(&self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to remove token file");
            }
        }
    }
}
