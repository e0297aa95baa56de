//! Session token store.
//!
//! A [`Session`] owns the single bearer token slot and, optionally, a
//! durable [`TokenPersistence`] backend holding the same value under the
//! `authToken` key. The token is stored with its `Bearer ` prefix and sent
//! verbatim as the `Authorization` header.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// Durable storage key for the session token.
pub const AUTH_TOKEN_STORAGE_KEY: &str = "authToken";

/// In-memory single-slot token holder.
///
/// Read-many, write-rare. A poisoned lock is recovered rather than
/// propagated since the slot holds plain data.
#[derive(Debug, Default)]
pub struct TokenStore {
    slot: RwLock<Option<String>>,
}

impl TokenStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current token.
    #[must_use]
    pub fn get(&self) -> Option<String> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the current token; `None` clears it.
    pub fn set(&self, token: Option<String>) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = token;
    }

    /// Returns `true` if a token is held.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

/// Durable backing for the session token.
pub trait TokenPersistence: Send + Sync + fmt::Debug {
    /// Reads the stored token.
    ///
    /// # Errors
    ///
    /// Returns error if the storage cannot be read.
    fn load(&self) -> io::Result<Option<String>>;

    /// Writes the token.
    ///
    /// # Errors
    ///
    /// Returns error if the storage cannot be written.
    fn store(&self, token: &str) -> io::Result<()>;

    /// Removes the token. Removing an absent token is not an error.
    ///
    /// # Errors
    ///
    /// Returns error if the storage cannot be modified.
    fn remove(&self) -> io::Result<()>;
}

/// Stores the token in a single file named `authToken`.
#[derive(Debug, Clone)]
pub struct FileTokenPersistence {
    path: PathBuf,
}

impl FileTokenPersistence {
    /// Stores the token under `dir`.
    #[must_use]
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(AUTH_TOKEN_STORAGE_KEY),
        }
    }

    /// Stores the token in the user data directory
    /// (`~/.local/share/apiproxy` on Linux).
    ///
    /// Returns `None` when the platform has no data directory.
    #[must_use]
    pub fn default_location() -> Option<Self> {
        dirs::data_dir().map(|dir| Self::in_dir(dir.join("apiproxy")))
    }

    /// Returns the token file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenPersistence for FileTokenPersistence {
    fn load(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => {
                let token = content.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn store(&self, token: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path)?;

        // `mode` only applies on creation; tighten a file left by an older run.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))?;
        }

        file.write_all(token.as_bytes())
    }

    fn remove(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

/// Process-local persistence, shared between sessions through an [`Arc`].
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    value: Mutex<Option<String>>,
}

impl MemoryPersistence {
    /// Creates empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenPersistence for MemoryPersistence {
    fn load(&self) -> io::Result<Option<String>> {
        Ok(self
            .value
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn store(&self, token: &str) -> io::Result<()> {
        *self.value.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        Ok(())
    }

    fn remove(&self) -> io::Result<()> {
        *self.value.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Authentication state for one client.
///
/// Storage failures are logged and never fail the caller; the in-memory
/// slot stays authoritative.
///
/// # Examples
///
/// ```
/// use apiproxy_client::{MemoryPersistence, Session};
/// use std::sync::Arc;
///
/// let storage = Arc::new(MemoryPersistence::new());
///
/// let first = Session::with_persistence(storage.clone());
/// first.set_auth_token("Bearer abc");
/// assert!(first.is_authenticated());
///
/// let second = Session::with_persistence(storage);
/// assert!(!second.is_authenticated());
/// assert!(second.restore());
/// assert_eq!(second.auth_token().as_deref(), Some("Bearer abc"));
/// ```
#[derive(Debug, Default)]
pub struct Session {
    store: TokenStore,
    persistence: Option<Arc<dyn TokenPersistence>>,
}

impl Session {
    /// Creates a memory-only session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session backed by durable storage.
    #[must_use]
    pub fn with_persistence(persistence: Arc<dyn TokenPersistence>) -> Self {
        Self {
            store: TokenStore::new(),
            persistence: Some(persistence),
        }
    }

    /// Returns the current token, including its scheme prefix.
    #[must_use]
    pub fn auth_token(&self) -> Option<String> {
        self.store.get()
    }

    /// Returns `true` if a token is held in memory.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.store.is_set()
    }

    /// Stores a token in memory and in durable storage.
    pub fn set_auth_token(&self, token: impl Into<String>) {
        let token = token.into();
        if let Some(persistence) = &self.persistence
            && let Err(e) = persistence.store(&token)
        {
            tracing::warn!(error = %e, "failed to persist auth token");
        }
        self.store.set(Some(token));
        tracing::debug!("auth token set");
    }

    /// Loads a previously stored token. Call once at start-up.
    ///
    /// Returns `true` if a token was restored.
    pub fn restore(&self) -> bool {
        let Some(persistence) = &self.persistence else {
            return false;
        };
        match persistence.load() {
            Ok(Some(token)) => {
                self.store.set(Some(token));
                tracing::info!("auth token restored from storage");
                true
            }
            Ok(None) => false,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read stored auth token");
                false
            }
        }
    }

    /// Ends the session: clears memory and durable storage.
    pub fn logout(&self) {
        self.clear_local_auth();
        tracing::info!("logged out");
    }

    /// Clears the token from memory and durable storage.
    pub fn clear_local_auth(&self) {
        self.store.set(None);
        if let Some(persistence) = &self.persistence
            && let Err(e) = persistence.remove()
        {
            tracing::warn!(error = %e, "failed to remove stored auth token");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_store_set_and_clear() {
        let store = TokenStore::new();
        assert!(!store.is_set());

        store.set(Some("Bearer x".to_string()));
        assert_eq!(store.get().as_deref(), Some("Bearer x"));

        store.set(None);
        assert!(store.get().is_none());
    }

    #[test]
    fn test_store_survives_poisoning() {
        let store = Arc::new(TokenStore::new());
        let poisoner = Arc::clone(&store);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.slot.write().unwrap();
            panic!("poison the lock");
        })
        .join();

        store.set(Some("Bearer y".to_string()));
        assert_eq!(store.get().as_deref(), Some("Bearer y"));
    }

    #[test]
    fn test_file_persistence_round_trip() {
        let dir = TempDir::new().unwrap();
        let persistence = FileTokenPersistence::in_dir(dir.path().join("nested"));

        assert_eq!(persistence.load().unwrap(), None);
        persistence.store("Bearer abc").unwrap();
        assert!(persistence.path().ends_with(AUTH_TOKEN_STORAGE_KEY));
        assert_eq!(persistence.load().unwrap().as_deref(), Some("Bearer abc"));

        persistence.remove().unwrap();
        assert_eq!(persistence.load().unwrap(), None);
        persistence.remove().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_file_persistence_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let persistence = FileTokenPersistence::in_dir(dir.path());
        fs::write(persistence.path(), "stale").unwrap();
        fs::set_permissions(persistence.path(), fs::Permissions::from_mode(0o644)).unwrap();

        persistence.store("Bearer secret").unwrap();

        let mode = fs::metadata(persistence.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(persistence.load().unwrap().as_deref(), Some("Bearer secret"));

        let fresh = FileTokenPersistence::in_dir(dir.path().join("fresh"));
        fresh.store("Bearer other").unwrap();
        let mode = fs::metadata(fresh.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_logout_clears_storage() {
        let storage = Arc::new(MemoryPersistence::new());
        let session = Session::with_persistence(storage.clone());

        session.set_auth_token("Bearer abc");
        assert_eq!(storage.load().unwrap().as_deref(), Some("Bearer abc"));

        session.logout();
        assert!(!session.is_authenticated());
        assert_eq!(storage.load().unwrap(), None);
        assert!(!session.restore());
    }

    #[test]
    fn test_restore_without_persistence() {
        let session = Session::new();
        assert!(!session.restore());
    }
}
