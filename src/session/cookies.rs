//! Login cookies kept between runs
//!
//! The jar is shared with the HTTP client. When backed by a file it is read
//! once at startup and written after every successful login, so the next run
//! finds an authenticated session and skips the login form.

use crate::storage::{write_bytes_atomic, StorageError};
use cookie_store::CookieStore;
use reqwest_cookie_store::CookieStoreMutex;
use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Cookie jar of the HTTP session, optionally persisted to `path`
#[derive(Clone)]
pub struct SessionState {
    jar: Arc<CookieStoreMutex>,
    path: Option<PathBuf>,
}

impl SessionState {
    /// A jar that lives only as long as the process
    pub fn in_memory() -> Self {
        Self {
            jar: Arc::new(CookieStoreMutex::new(CookieStore::default())),
            path: None,
        }
    }

    /// Loads the jar saved at `path`
    ///
    /// A missing or unreadable file yields an empty jar; the session then
    /// logs in again and overwrites it.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();

        let store = match File::open(&path) {
            Ok(file) => match CookieStore::load_json(BufReader::new(file)) {
                Ok(store) => {
                    tracing::info!("Loaded saved session from {}", path.display());
                    store
                }
                Err(e) => {
                    tracing::warn!("Ignoring unreadable session state {}: {}", path.display(), e);
                    CookieStore::default()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => CookieStore::default(),
            Err(e) => {
                tracing::warn!("Unable to open session state {}: {}", path.display(), e);
                CookieStore::default()
            }
        };

        Self {
            jar: Arc::new(CookieStoreMutex::new(store)),
            path: Some(path),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The jar to hand to the HTTP client
    pub fn jar(&self) -> Arc<CookieStoreMutex> {
        Arc::clone(&self.jar)
    }

    /// Number of unexpired cookies in the jar
    pub fn cookie_count(&self) -> usize {
        self.jar
            .lock()
            .map(|store| store.iter_unexpired().count())
            .unwrap_or(0)
    }

    /// Writes the jar to its file, session cookies included
    ///
    /// Does nothing for an in-memory jar.
    pub fn save(&self) -> crate::Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let failure = |reason: String| StorageError::SessionState {
            path: path.clone(),
            reason,
        };

        let mut bytes = Vec::new();
        {
            let store = self
                .jar
                .lock()
                .map_err(|_| failure("cookie jar lock poisoned".to_string()))?;
            store
                .save_incl_expired_and_nonpersistent_json(&mut bytes)
                .map_err(|e| failure(e.to_string()))?;
        }

        write_bytes_atomic(path, &bytes)?;
        tracing::debug!("Saved session state to {}", path.display());
        Ok(())
    }
}
