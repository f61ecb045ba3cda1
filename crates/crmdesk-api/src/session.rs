// Session storage: where the bearer token lives between requests.
//
// The client never reads ambient global state; it is handed an
// `Arc<dyn SessionStore>` and asks it for the token on every request.

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Error;
use crate::models::User;

/// Single source of truth for "are we authenticated, and with what token".
///
/// Reads and writes are single-value operations; implementations must be
/// safe to share across tasks without external locking. No expiry and no
/// token-shape validation happen here.
pub trait SessionStore: Send + Sync + fmt::Debug {
    /// Current bearer token. `None` means unauthenticated.
    fn token(&self) -> Option<SecretString>;

    /// Persist a token; every later request attaches it.
    fn set_token(&self, token: SecretString) -> Result<(), Error>;

    /// Forget the token (and the remembered user).
    fn clear_token(&self) -> Result<(), Error>;

    /// The account returned by the last successful login, if any.
    fn user(&self) -> Option<User>;

    /// Remember the authenticated account alongside the token.
    fn set_user(&self, user: &User) -> Result<(), Error>;
}

// ── In-memory store ─────────────────────────────────────────────────

/// Process-local session. Lost when the process exits.
#[derive(Default)]
pub struct MemorySessionStore {
    token: ArcSwapOption<SecretString>,
    user: ArcSwapOption<User>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds a token, for embedding and tests.
    pub fn with_token(token: impl Into<String>) -> Self {
        let store = Self::new();
        store
            .token
            .store(Some(Arc::new(SecretString::from(token.into()))));
        store
    }
}

impl fmt::Debug for MemorySessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemorySessionStore")
            .field("authenticated", &self.token.load().is_some())
            .finish_non_exhaustive()
    }
}

impl SessionStore for MemorySessionStore {
    fn token(&self) -> Option<SecretString> {
        self.token.load_full().map(|token| (*token).clone())
    }

    fn set_token(&self, token: SecretString) -> Result<(), Error> {
        self.token.store(Some(Arc::new(token)));
        Ok(())
    }

    fn clear_token(&self) -> Result<(), Error> {
        self.token.store(None);
        self.user.store(None);
        Ok(())
    }

    fn user(&self) -> Option<User> {
        self.user.load_full().map(|user| (*user).clone())
    }

    fn set_user(&self, user: &User) -> Result<(), Error> {
        self.user.store(Some(Arc::new(user.clone())));
        Ok(())
    }
}

// ── Durable file store ──────────────────────────────────────────────

#[derive(Default, Serialize, Deserialize)]
struct SessionFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user: Option<User>,
}

/// Session persisted as a small JSON document on disk.
///
/// Survives restarts. Each write replaces the whole file in one rename,
/// so a reader never observes a half-written session.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> SessionFile {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    debug!(path = %self.path.display(), error = %e, "session file unreadable");
                }
                return SessionFile::default();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            debug!(path = %self.path.display(), error = %e, "session file corrupt, ignoring");
            SessionFile::default()
        })
    }

    fn write(&self, session: &SessionFile) -> Result<(), Error> {
        if session.token.is_none() && session.user.is_none() {
            return self.remove();
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| io_error("create session dir", &e))?;
        }

        let body = serde_json::to_vec_pretty(session)
            .map_err(|e| Error::Session(format!("failed to encode session: {e}")))?;

        let tmp = self.path.with_extension("json.tmp");
        {
            let mut file = open_private(&tmp).map_err(|e| io_error("write session", &e))?;
            file.write_all(&body)
                .map_err(|e| io_error("write session", &e))?;
        }
        std::fs::rename(&tmp, &self.path).map_err(|e| io_error("replace session", &e))
    }

    fn remove(&self) -> Result<(), Error> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error("remove session", &e)),
        }
    }
}

impl fmt::Debug for FileSessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileSessionStore")
            .field("path", &self.path)
            .finish()
    }
}

impl SessionStore for FileSessionStore {
    fn token(&self) -> Option<SecretString> {
        self.read().token.map(SecretString::from)
    }

    fn set_token(&self, token: SecretString) -> Result<(), Error> {
        let mut session = self.read();
        session.token = Some(token.expose_secret().to_owned());
        self.write(&session)
    }

    fn clear_token(&self) -> Result<(), Error> {
        self.remove()
    }

    fn user(&self) -> Option<User> {
        self.read().user
    }

    fn set_user(&self, user: &User) -> Result<(), Error> {
        let mut session = self.read();
        session.user = Some(user.clone());
        self.write(&session)
    }
}

fn io_error(action: &str, err: &std::io::Error) -> Error {
    Error::Session(format!("failed to {action}: {err}"))
}

#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<std::fs::File> {
    use std::os::unix::fs::OpenOptionsExt;
    std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<std::fs::File> {
    std::fs::File::create(path)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn sample_user() -> User {
        User {
            id: 1,
            name: "Ana".into(),
            email: "ana@crm.example".into(),
            phone: 1199,
            role: Role::Admin,
            create_date: "2024-01-01".into(),
        }
    }

    #[test]
    fn memory_store_roundtrips_token_and_user() {
        let store = MemorySessionStore::new();
        assert!(store.token().is_none());

        store.set_token(SecretString::from("t1".to_string())).unwrap();
        store.set_user(&sample_user()).unwrap();
        assert_eq!(store.token().unwrap().expose_secret(), "t1");
        assert_eq!(store.user().unwrap().id, 1);

        store.clear_token().unwrap();
        assert!(store.token().is_none());
        assert!(store.user().is_none());
    }

    #[test]
    fn memory_store_debug_hides_token() {
        let store = MemorySessionStore::with_token("super-secret");
        let debug = format!("{store:?}");
        assert!(debug.contains("authenticated: true"));
        assert!(!debug.contains("super-secret"));
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let store = FileSessionStore::new(&path);
        store.set_token(SecretString::from("t1".to_string())).unwrap();
        store.set_user(&sample_user()).unwrap();

        let reopened = FileSessionStore::new(&path);
        assert_eq!(reopened.token().unwrap().expose_secret(), "t1");
        assert_eq!(reopened.user().unwrap(), sample_user());
    }

    #[test]
    fn file_store_clear_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let store = FileSessionStore::new(&path);
        store.set_token(SecretString::from("t1".to_string())).unwrap();
        assert!(path.exists());

        store.clear_token().unwrap();
        assert!(!path.exists());
        assert!(store.token().is_none());
        // Clearing twice is fine.
        store.clear_token().unwrap();
    }

    #[test]
    fn file_store_treats_corrupt_file_as_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = FileSessionStore::new(&path);
        assert!(store.token().is_none());
        assert!(store.user().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn file_store_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = FileSessionStore::new(&path);
        store.set_token(SecretString::from("t1".to_string())).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
