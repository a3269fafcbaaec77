//! Session token storage and the shared session state.
//!
//! A session is the token + username pair handed out by a successful login.
//! Stores persist the two keys; [`SessionState`] wraps a store and publishes
//! every change on a watch channel so clients and controllers always read the
//! latest session. Tokens are never logged or displayed in full.

use std::collections::HashMap;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::config::paths;

/// Storage key for the session token.
pub const TOKEN_KEY: &str = "auth-token";
/// Storage key for the signed-in username.
pub const USER_KEY: &str = "auth-user";

/// Key/value storage for the two session keys.
///
/// Every save overwrites the previous value under the same key. There is no
/// expiry: a stale token is only detected by the API rejecting it.
pub trait SessionStore: Send {
    fn save_token(&mut self, token: &str) -> Result<()>;
    fn token(&self) -> Option<String>;
    fn save_user(&mut self, user: &str) -> Result<()>;
    fn user(&self) -> Option<String>;
    fn clear(&mut self) -> Result<()>;
}

/// Signed-in caller.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub username: String,
}

impl Session {
    pub fn new(token: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            username: username.into(),
        }
    }

    /// Reads a session out of a store.
    ///
    /// Token presence decides; a missing username reads as empty.
    pub fn from_store(store: &dyn SessionStore) -> Option<Self> {
        let token = store.token()?;
        Some(Self {
            token,
            username: store.user().unwrap_or_default(),
        })
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &mask_token(&self.token))
            .field("username", &self.username)
            .finish()
    }
}

/// Returns a masked version of a token for display (first 12 chars + ...).
pub fn mask_token(token: &str) -> String {
    if token.len() <= 16 || !token.is_char_boundary(12) {
        return "***".to_string();
    }
    format!("{}...", &token[..12])
}

/// Session storage that lives as long as the process.
#[derive(Debug, Default, Clone)]
pub struct MemorySessionStore {
    entries: HashMap<String, String>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn save_token(&mut self, token: &str) -> Result<()> {
        self.entries.remove(TOKEN_KEY);
        self.entries.insert(TOKEN_KEY.to_string(), token.to_string());
        Ok(())
    }

    fn token(&self) -> Option<String> {
        self.entries.get(TOKEN_KEY).cloned()
    }

    fn save_user(&mut self, user: &str) -> Result<()> {
        self.entries.remove(USER_KEY);
        self.entries.insert(USER_KEY.to_string(), user.to_string());
        Ok(())
    }

    fn user(&self) -> Option<String> {
        self.entries.get(USER_KEY).cloned()
    }

    fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        Ok(())
    }
}

/// On-disk layout of the session file.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct SessionFile {
    #[serde(flatten)]
    entries: HashMap<String, String>,
}

/// Session storage backed by `<base>/session.json` with restricted
/// permissions (0600).
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    file: SessionFile,
}

impl FileSessionStore {
    /// Opens the session file at the default location.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open_default() -> Result<Self> {
        Self::open(paths::session_path())
    }

    /// Opens the session file at `path`.
    /// A missing file is an empty store.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read session from {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse session from {}", path.display()))?
        } else {
            SessionFile::default()
        };
        Ok(Self { path, file })
    }

    /// Deletes the session file at `path` without reading it.
    ///
    /// Returns whether a file was removed.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be removed.
    pub fn discard(path: &Path) -> Result<bool> {
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
        tracing::info!(path = %path.display(), "session file discarded");
        Ok(true)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.file.entries.remove(key);
        self.file
            .entries
            .insert(key.to_string(), value.to_string());
        self.write()
    }

    fn write(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let contents =
            serde_json::to_string_pretty(&self.file).context("Failed to serialize session")?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&self.path)
                .with_context(|| format!("Failed to open {} for writing", self.path.display()))?;
            file.write_all(contents.as_bytes())
                .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        }

        #[cfg(not(unix))]
        {
            fs::write(&self.path, contents)
                .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        }

        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn save_token(&mut self, token: &str) -> Result<()> {
        self.set(TOKEN_KEY, token)
    }

    fn token(&self) -> Option<String> {
        self.file.entries.get(TOKEN_KEY).cloned()
    }

    fn save_user(&mut self, user: &str) -> Result<()> {
        self.set(USER_KEY, user)
    }

    fn user(&self) -> Option<String> {
        self.file.entries.get(USER_KEY).cloned()
    }

    fn clear(&mut self) -> Result<()> {
        self.file.entries.clear();
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("Failed to remove {}", self.path.display()))?;
        }
        Ok(())
    }
}

struct Shared {
    store: Mutex<Box<dyn SessionStore>>,
    tx: watch::Sender<Option<Session>>,
}

/// Shared, observable session.
///
/// Cloning is cheap; all clones see the same store and channel.
#[derive(Clone)]
pub struct SessionState {
    shared: Arc<Shared>,
}

impl SessionState {
    pub fn new(store: impl SessionStore + 'static) -> Self {
        let initial = Session::from_store(&store);
        let (tx, _rx) = watch::channel(initial);
        Self {
            shared: Arc::new(Shared {
                store: Mutex::new(Box::new(store)),
                tx,
            }),
        }
    }

    /// Session state over a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::new(MemorySessionStore::new())
    }

    /// Latest published session.
    pub fn current(&self) -> Option<Session> {
        self.shared.tx.borrow().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.shared.tx.borrow().as_ref().map(|s| s.token.clone())
    }

    pub fn username(&self) -> Option<String> {
        self.shared.tx.borrow().as_ref().map(|s| s.username.clone())
    }

    pub fn is_signed_in(&self) -> bool {
        self.shared.tx.borrow().is_some()
    }

    /// Receiver notified on every sign-in and sign-out.
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.shared.tx.subscribe()
    }

    /// Persists the session and publishes it.
    ///
    /// # Errors
    /// Returns an error if the underlying store fails to save.
    pub fn sign_in(&self, session: Session) -> Result<()> {
        {
            let mut store = self
                .shared
                .store
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let saved = store
                .save_token(&session.token)
                .and_then(|()| store.save_user(&session.username));
            if let Err(err) = saved {
                // token and user are stored together or not at all
                if let Err(clear_err) = store.clear() {
                    tracing::warn!(error = %clear_err, "could not clear partial session");
                }
                return Err(err);
            }
        }
        tracing::info!(
            username = %session.username,
            token = %mask_token(&session.token),
            "session started"
        );
        self.shared.tx.send_replace(Some(session));
        Ok(())
    }

    /// Clears the store and publishes the signed-out state.
    ///
    /// Returns whether a session was present.
    ///
    /// # Errors
    /// Returns an error if the underlying store fails to clear.
    pub fn sign_out(&self) -> Result<bool> {
        {
            let mut store = self
                .shared
                .store
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            store.clear()?;
        }
        let previous = self.shared.tx.send_replace(None);
        if previous.is_some() {
            tracing::info!("session cleared");
        }
        Ok(previous.is_some())
    }
}

impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionState")
            .field("session", &self.current())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_memory_store_overwrites_and_clears() {
        let mut store = MemorySessionStore::new();
        assert_eq!(store.token(), None);
        assert_eq!(store.user(), None);

        store.save_token("first").unwrap();
        store.save_token("second").unwrap();
        store.save_user("bob").unwrap();
        assert_eq!(store.token().as_deref(), Some("second"));
        assert_eq!(store.user().as_deref(), Some("bob"));

        store.clear().unwrap();
        assert_eq!(store.token(), None);
        assert_eq!(store.user(), None);
    }

    #[test]
    fn test_file_store_persists_between_opens() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let mut store = FileSessionStore::open(&path).unwrap();
        store.save_token("abc").unwrap();
        store.save_user("bob").unwrap();

        let reopened = FileSessionStore::open(&path).unwrap();
        assert_eq!(reopened.token().as_deref(), Some("abc"));
        assert_eq!(reopened.user().as_deref(), Some("bob"));

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains(TOKEN_KEY));
        assert!(contents.contains(USER_KEY));
    }

    #[cfg(unix)]
    #[test]
    fn test_file_store_restricts_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        let mut store = FileSessionStore::open(&path).unwrap();
        store.save_token("abc").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_file_store_clear_removes_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        let mut store = FileSessionStore::open(&path).unwrap();
        store.save_token("abc").unwrap();

        store.clear().unwrap();
        assert!(!path.exists());
        assert_eq!(store.token(), None);
    }

    #[test]
    fn test_session_requires_token() {
        let mut store = MemorySessionStore::new();
        store.save_user("bob").unwrap();
        assert!(Session::from_store(&store).is_none());

        store.save_token("abc").unwrap();
        assert_eq!(
            Session::from_store(&store),
            Some(Session::new("abc", "bob"))
        );
    }

    #[test]
    fn test_session_state_publishes_sign_in_and_out() {
        let state = SessionState::in_memory();
        let mut rx = state.subscribe();
        assert!(!state.is_signed_in());

        state.sign_in(Session::new("abc", "bob")).unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(
            rx.borrow_and_update().as_ref().map(|s| s.username.clone()),
            Some("bob".to_string())
        );
        assert_eq!(state.token().as_deref(), Some("abc"));

        assert!(state.sign_out().unwrap());
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_none());
        assert!(!state.sign_out().unwrap());
    }

    /// Store whose user key can never be written.
    struct UserWriteFails {
        inner: Arc<Mutex<MemorySessionStore>>,
    }

    impl SessionStore for UserWriteFails {
        fn save_token(&mut self, token: &str) -> Result<()> {
            self.inner.lock().unwrap().save_token(token)
        }

        fn token(&self) -> Option<String> {
            self.inner.lock().unwrap().token()
        }

        fn save_user(&mut self, _user: &str) -> Result<()> {
            anyhow::bail!("disk full")
        }

        fn user(&self) -> Option<String> {
            self.inner.lock().unwrap().user()
        }

        fn clear(&mut self) -> Result<()> {
            self.inner.lock().unwrap().clear()
        }
    }

    #[test]
    fn test_failed_sign_in_leaves_no_token_behind() {
        let inner = Arc::new(Mutex::new(MemorySessionStore::new()));
        let state = SessionState::new(UserWriteFails {
            inner: Arc::clone(&inner),
        });

        let err = state.sign_in(Session::new("abc", "bob")).unwrap_err();
        assert!(err.to_string().contains("disk full"));
        assert!(!state.is_signed_in());
        assert_eq!(inner.lock().unwrap().token(), None);
    }

    #[test]
    fn test_discard_removes_unreadable_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "not json").unwrap();
        assert!(FileSessionStore::open(&path).is_err());

        assert!(FileSessionStore::discard(&path).unwrap());
        assert!(!path.exists());
        assert!(!FileSessionStore::discard(&path).unwrap());
    }

    #[test]
    fn test_session_state_reads_existing_store() {
        let mut store = MemorySessionStore::new();
        store.save_token("abc").unwrap();
        store.save_user("bob").unwrap();

        let state = SessionState::new(store);
        assert_eq!(state.username().as_deref(), Some("bob"));
    }

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("eyJhbGciOiJIUzI1NiJ9.payload"), "eyJhbGciOiJI...");
        assert_eq!(mask_token("short"), "***");
    }

    #[test]
    fn test_session_debug_masks_token() {
        let session = Session::new("eyJhbGciOiJIUzI1NiJ9.payload", "bob");
        let debug = format!("{session:?}");
        assert!(!debug.contains("payload"));
    }
}
