//! Where the logged-in session lives between requests.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use eyre::{Result, WrapErr};
use tracing::warn;

use padelup_core::models::account::Session;

/// Storage for the current session, injected wherever a token is needed.
pub trait SessionStore: Send + Sync {
    fn get(&self) -> Option<Session>;

    fn set(&self, session: Session) -> Result<()>;

    fn clear(&self) -> Result<()>;
}

impl<T: SessionStore + ?Sized> SessionStore for Box<T> {
    fn get(&self) -> Option<Session> {
        (**self).get()
    }

    fn set(&self, session: Session) -> Result<()> {
        (**self).set(session)
    }

    fn clear(&self) -> Result<()> {
        (**self).clear()
    }
}

impl<T: SessionStore + ?Sized> SessionStore for Arc<T> {
    fn get(&self) -> Option<Session> {
        (**self).get()
    }

    fn set(&self, session: Session) -> Result<()> {
        (**self).set(session)
    }

    fn clear(&self) -> Result<()> {
        (**self).clear()
    }
}

/// Keeps the session for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: RwLock<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self) -> Option<Session> {
        match self.session.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn set(&self, session: Session) -> Result<()> {
        let mut guard = self
            .session
            .write()
            .map_err(|_| eyre::eyre!("Session lock poisoned"))?;
        *guard = Some(session);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut guard = self
            .session
            .write()
            .map_err(|_| eyre::eyre!("Session lock poisoned"))?;
        *guard = None;
        Ok(())
    }
}

/// Persists the session as JSON so it survives restarts.
#[derive(Debug, Clone)]
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
}

impl SessionStore for FileSessionStore {
    /// A missing file means no session. An unreadable one is logged and
    /// treated the same way, so the user simply logs in again.
    fn get(&self) -> Option<Session> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read session file");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Ignoring corrupt session file");
                None
            }
        }
    }

    fn set(&self, session: Session) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .wrap_err_with(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(&session).wrap_err("Failed to encode session")?;
        fs::write(&self.path, json)
            .wrap_err_with(|| format!("Failed to write {}", self.path.display()))?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).wrap_err_with(|| format!("Failed to remove {}", self.path.display())),
        }
    }
}
