use crate::storage::{StorageError, StorageResult};
use crate::IntegrityError;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

const RAW_CONTENT_EXTENSION: &str = "html";

/// Raw detail pages, one `<id>.html` file per ingested record
///
/// Files are created once and never rewritten.
#[derive(Debug, Clone)]
pub struct RawContentStore {
    dir: PathBuf,
}

impl RawContentStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, record_id: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{}", record_id, RAW_CONTENT_EXTENSION))
    }

    pub fn ensure_dir(&self) -> StorageResult<()> {
        fs::create_dir_all(&self.dir).map_err(|e| StorageError::io(&self.dir, e))
    }

    pub fn exists(&self, record_id: &str) -> bool {
        self.path_for(record_id).exists()
    }

    /// Persists the raw content of a newly seen record
    ///
    /// Fails with [`IntegrityError::RawContentExists`] if an artifact for the
    /// identifier is already on disk; the existing file is left untouched.
    pub fn save(&self, record_id: &str, content: &str) -> crate::Result<PathBuf> {
        self.ensure_dir()?;
        let path = self.path_for(record_id);

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(IntegrityError::RawContentExists {
                    record_id: record_id.to_string(),
                }
                .into());
            }
            Err(e) => return Err(StorageError::io(&path, e).into()),
        };

        if let Err(e) = file
            .write_all(content.as_bytes())
            .and_then(|_| file.sync_all())
        {
            // An empty or truncated artifact must not count as ingested
            let _ = fs::remove_file(&path);
            return Err(StorageError::io(&path, e).into());
        }

        Ok(path)
    }

    /// Deletes the artifact for a record, if present
    pub fn remove(&self, record_id: &str) -> StorageResult<()> {
        let path = self.path_for(record_id);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::io(&path, e)),
        }
    }

    /// Counts persisted raw-content artifacts (zero if the directory is missing)
    pub fn count(&self) -> StorageResult<usize> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(StorageError::io(&self.dir, e)),
        };

        let mut count = 0;
        for entry in entries {
            let path = entry.map_err(|e| StorageError::io(&self.dir, e))?.path();
            let is_artifact = path.is_file()
                && path.extension().and_then(|ext| ext.to_str()) == Some(RAW_CONTENT_EXTENSION);
            if is_artifact {
                count += 1;
            }
        }
        Ok(count)
    }
}
