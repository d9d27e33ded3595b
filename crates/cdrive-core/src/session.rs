//! Session token storage.
//!
//! The session is a single opaque token. Components that need it receive a
//! `SessionStore` explicitly; nothing reads it from ambient global state.
//! `FileSessionStore` persists the token in a small JSON key/value document so
//! it survives restarts, the way browser storage survives page reloads.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use directories::ProjectDirs;
use tempfile::NamedTempFile;

/// Key under which the token is stored in the durable document.
pub const TOKEN_KEY: &str = "token";

const SESSION_FILE_NAME: &str = "session.json";

/// Lifecycle operations on the authentication session.
pub trait SessionStore: Send + Sync {
    /// Store the token. Subsequent reads on this instance observe it.
    fn set_token(&self, token: &str);

    /// Current token, if any. Never fails.
    fn token(&self) -> Option<String>;

    /// Remove the token. Clearing an absent token is a no-op.
    fn clear_token(&self);

    fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }
}

fn non_empty(token: &str) -> Option<String> {
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// In-process session, lost when the process exits.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    token: RwLock<Option<String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn set_token(&self, token: &str) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = non_empty(token);
    }

    fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn clear_token(&self) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// Durable session backed by a JSON document on disk.
///
/// The document is loaded once at open and kept in memory; every change is
/// written through. Write failures are logged and do not affect the in-memory
/// view, so the current instance always observes its own writes.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl FileSessionStore {
    /// Default location in the platform data directory, e.g.
    /// `~/.local/share/cdrive/session.json` on Linux.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "cdrive", "cdrive")
            .map(|dirs| dirs.data_dir().join(SESSION_FILE_NAME))
    }

    /// Open the store at `path`. A missing or unreadable document opens empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = load_entries(&path);
        Self {
            path,
            entries: RwLock::new(entries),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) {
        if let Err(e) = write_entries(&self.path, entries) {
            tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "Failed to persist session document"
            );
        }
    }
}

impl SessionStore for FileSessionStore {
    fn set_token(&self, token: &str) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        match non_empty(token) {
            Some(token) => {
                entries.insert(TOKEN_KEY.to_string(), token);
            }
            None => {
                entries.remove(TOKEN_KEY);
            }
        }
        self.persist(&entries);
    }

    fn token(&self) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(TOKEN_KEY)
            .and_then(|t| non_empty(t))
    }

    fn clear_token(&self) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.remove(TOKEN_KEY).is_some() {
            self.persist(&entries);
        }
    }
}

fn load_entries(path: &Path) -> BTreeMap<String, String> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return BTreeMap::new(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to read session document");
            return BTreeMap::new();
        }
    };

    serde_json::from_str(&raw).unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), error = %e, "Ignoring corrupt session document");
        BTreeMap::new()
    })
}

/// Replace the document atomically. The file is readable by the owner only.
fn write_entries(path: &Path, entries: &BTreeMap<String, String>) -> anyhow::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }
    serde_json::to_writer_pretty(&mut tmp, entries)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;
    Ok(())
}
