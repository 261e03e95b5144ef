//! Per-record asset manifests
//!
//! Every record with assets gets `<asset-dir>/<id>/`, holding the downloaded
//! files and a `manifest.json` that maps each file to the absolute URL it was
//! downloaded from. The source URL is the dedup key: reconciling the same page
//! again downloads nothing new.

use crate::extract::asset_urls;
use crate::session::PageSession;
use crate::storage::{write_json_atomic, StorageError, StorageResult};
use crate::url::{file_name_from_url, split_extension};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// A downloaded asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetEntry {
    /// File name inside the record's asset directory
    pub filename: String,

    /// Absolute URL the file was downloaded from
    #[serde(alias = "source_url")]
    pub source_url: String,
}

/// The assets downloaded for one record, in download order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetManifest {
    #[serde(alias = "rt_id")]
    pub record_id: String,

    #[serde(default)]
    pub assets: Vec<AssetEntry>,
}

impl AssetManifest {
    pub fn new(record_id: &str) -> Self {
        Self {
            record_id: record_id.to_string(),
            assets: Vec::new(),
        }
    }

    pub fn contains_source(&self, source_url: &str) -> bool {
        self.assets.iter().any(|a| a.source_url == source_url)
    }

    pub fn contains_filename(&self, filename: &str) -> bool {
        self.assets.iter().any(|a| a.filename == filename)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

/// Root of all per-record asset directories
#[derive(Debug, Clone)]
pub struct AssetManifestStore {
    root: PathBuf,
}

impl AssetManifestStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn record_dir(&self, record_id: &str) -> PathBuf {
        self.root.join(record_id)
    }

    pub fn manifest_path(&self, record_id: &str) -> PathBuf {
        self.record_dir(record_id).join(MANIFEST_FILE_NAME)
    }

    /// Loads a record's manifest, or an empty one if none was written yet
    pub fn load(&self, record_id: &str) -> StorageResult<AssetManifest> {
        let path = self.manifest_path(record_id);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(AssetManifest::new(record_id)),
            Err(e) => return Err(StorageError::io(&path, e)),
        };
        serde_json::from_slice(&bytes).map_err(|e| StorageError::json(&path, e))
    }

    pub fn save(&self, manifest: &AssetManifest) -> StorageResult<()> {
        write_json_atomic(&self.manifest_path(&manifest.record_id), manifest, true)
    }

    /// Record IDs that have a manifest on disk, sorted
    pub fn list_record_ids(&self) -> StorageResult<Vec<String>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::io(&self.root, e)),
        };

        let mut ids = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| StorageError::io(&self.root, e))?.path();
            if !path.join(MANIFEST_FILE_NAME).is_file() {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                ids.push(name.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// Downloads every asset of `content` not yet in the record's manifest
    ///
    /// Asset URLs are resolved through the session and compared against the
    /// manifest's source URLs, so extraction order across runs does not
    /// matter. The manifest is rewritten after each download, which keeps
    /// every file on disk listed even if a later download aborts the run.
    /// A page without assets leaves the filesystem untouched.
    pub async fn reconcile<S>(
        &self,
        session: &S,
        record_id: &str,
        content: &str,
    ) -> crate::Result<AssetManifest>
    where
        S: PageSession + ?Sized,
    {
        let mut manifest = self.load(record_id)?;

        let urls = asset_urls(content);
        if urls.is_empty() {
            return Ok(manifest);
        }

        let dir = self.record_dir(record_id);
        fs::create_dir_all(&dir).map_err(|e| StorageError::io(&dir, e))?;

        let mut sources: HashSet<String> =
            manifest.assets.iter().map(|a| a.source_url.clone()).collect();
        let mut downloaded = 0usize;

        for (index, url) in urls.iter().enumerate() {
            let absolute_url = session.build_absolute_url(url);
            if sources.contains(&absolute_url) {
                continue;
            }

            let fallback = format!("{}_{}", record_id, index + 1);
            let filename = pick_file_name(&absolute_url, &dir, &manifest, &fallback);

            let bytes = session.download_binary(&absolute_url).await?;
            let path = dir.join(&filename);
            fs::write(&path, &bytes).map_err(|e| StorageError::io(&path, e))?;

            tracing::debug!(
                "Saved asset {} ({} bytes) for {}",
                filename,
                bytes.len(),
                record_id
            );

            manifest.assets.push(AssetEntry {
                filename,
                source_url: absolute_url.clone(),
            });
            sources.insert(absolute_url);
            self.save(&manifest)?;
            downloaded += 1;
        }

        if downloaded > 0 {
            tracing::info!(
                "Downloaded {} new assets for {} ({} total)",
                downloaded,
                record_id,
                manifest.len()
            );
        }

        Ok(manifest)
    }
}

/// Whether `name` belongs to the manifest itself or its in-flight temp file
fn is_reserved(name: &str) -> bool {
    name == MANIFEST_FILE_NAME || name == format!("{}.tmp", MANIFEST_FILE_NAME)
}

/// Chooses a file name for `url` that is free both on disk and in the manifest
///
/// Collisions get `_1`, `_2`, … inserted before the extension; names without
/// an extension get `.bin`. The manifest's own file names are never handed out.
fn pick_file_name(url: &str, dir: &Path, manifest: &AssetManifest, fallback: &str) -> String {
    let candidate = file_name_from_url(url).unwrap_or_else(|| format!("{}.bin", fallback));
    let is_taken = |name: &str| {
        is_reserved(name) || dir.join(name).exists() || manifest.contains_filename(name)
    };

    if !is_taken(&candidate) {
        return candidate;
    }

    let (stem, extension) = split_extension(&candidate);
    let stem = if stem.is_empty() { fallback } else { stem };
    let extension = if extension.is_empty() { ".bin" } else { extension };

    let mut counter = 1;
    loop {
        let filename = format!("{}_{}{}", stem, counter, extension);
        if !is_taken(&filename) {
            return filename;
        }
        counter += 1;
    }
}
