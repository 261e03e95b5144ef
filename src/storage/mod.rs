//! Storage module for persisting ingest state
//!
//! This module owns everything the ingest writes to disk:
//! - the ledger of already ingested record IDs (`ledger`)
//! - one raw HTML artifact per record (`content`)
//! - per-record asset directories with their manifests (`manifest`)
//!
//! JSON state files are replaced atomically (temp file + rename) so a reader
//! always sees either the previous complete document or the new one.

mod content;
mod ledger;
mod manifest;

pub use content::RawContentStore;
pub use ledger::{SeenIdSet, SeenIdStore};
pub use manifest::{AssetEntry, AssetManifest, AssetManifestStore, MANIFEST_FILE_NAME};

use crate::config::StorageConfig;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while reading or writing persisted state
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Unable to write session state to {}: {reason}", .path.display())]
    SessionState { path: PathBuf, reason: String },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl StorageError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn json(path: &Path, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Serializes `value` as JSON and replaces `path` with it atomically
pub(crate) fn write_json_atomic<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
    pretty: bool,
) -> StorageResult<()> {
    let bytes = if pretty {
        serde_json::to_vec_pretty(value)
    } else {
        serde_json::to_vec(value)
    }
    .map_err(|e| StorageError::json(path, e))?;

    write_bytes_atomic(path, &bytes)
}

/// Replaces `path` with `bytes` through a sibling temp file and a rename
pub(crate) fn write_bytes_atomic(path: &Path, bytes: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
    }

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    fs::write(&tmp_path, bytes).map_err(|e| StorageError::io(&tmp_path, e))?;
    fs::rename(&tmp_path, path).map_err(|e| StorageError::io(path, e))?;
    Ok(())
}

/// Removes all ingest output so the next run starts from an empty ledger
///
/// Deletes the content directory, the asset directory, the ledger file and
/// the saved login session, then recreates the two directories empty.
pub fn reset_data(config: &StorageConfig) -> StorageResult<()> {
    for dir in [&config.content_dir, &config.asset_dir] {
        let dir = Path::new(dir);
        if dir.exists() {
            fs::remove_dir_all(dir).map_err(|e| StorageError::io(dir, e))?;
        }
        fs::create_dir_all(dir).map_err(|e| StorageError::io(dir, e))?;
    }

    for file in [&config.ledger_path, &config.session_state_path] {
        let file = Path::new(file);
        if file.exists() {
            fs::remove_file(file).map_err(|e| StorageError::io(file, e))?;
        }
    }

    tracing::info!("Removed raw content, assets, ledger and session state");
    Ok(())
}
