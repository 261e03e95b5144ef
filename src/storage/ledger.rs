use crate::storage::{write_json_atomic, StorageError, StorageResult};
use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Identifiers of every record ingested so far, kept sorted
pub type SeenIdSet = BTreeSet<String>;

/// The ledger file: a sorted JSON array of ingested record IDs
#[derive(Debug, Clone)]
pub struct SeenIdStore {
    path: PathBuf,
}

impl SeenIdStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the ledger, returning an empty set on first run
    ///
    /// Duplicate entries in the file collapse into one.
    pub fn load(&self) -> StorageResult<SeenIdSet> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(SeenIdSet::new()),
            Err(e) => return Err(StorageError::io(&self.path, e)),
        };

        let ids: Vec<String> =
            serde_json::from_slice(&bytes).map_err(|e| StorageError::json(&self.path, e))?;
        Ok(ids.into_iter().collect())
    }

    /// Replaces the ledger with `seen`
    pub fn save(&self, seen: &SeenIdSet) -> StorageResult<()> {
        let ids: Vec<&String> = seen.iter().collect();
        write_json_atomic(&self.path, &ids, false)?;
        tracing::debug!("Wrote {} IDs to {}", ids.len(), self.path.display());
        Ok(())
    }
}
