//! Persistent cache of discovered functions.
//!
//! The cache holds a single [`CacheEntry`] serialized to
//! `<cache_dir>/functions.json`. An entry is only valid while the checksum of
//! the backend source tree matches the one recorded when it was written, so
//! any edit under the backend directory invalidates it.
//!
//! Caching is an optimization. The fail-soft accessors ([`DiscoveryCache::get`],
//! [`DiscoveryCache::set`], [`DiscoveryCache::clear`]) log and swallow every
//! error; the `Result`-returning variants exist for callers and tests that
//! need to tell "absent" from "broken".

use crate::error::CacheError;
use chrono::{DateTime, Utc};
use convex_schema::ParsedFunction;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Name of the cache file inside the cache directory.
pub const FILE_NAME: &str = "functions.json";

/// Subdirectory of the backend holding generated code; never checksummed.
pub const GENERATED_DIR: &str = "_generated";

/// File extensions included in the source checksum.
const SOURCE_EXTENSIONS: &[&str] = &["ts", "js"];

/// The persisted cache document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub functions: Vec<ParsedFunction>,

    /// When the entry was written, stored as epoch milliseconds.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,

    /// Checksum of the backend source tree at write time.
    pub directory_checksum: String,
}

/// Checksum-validated cache of discovery results for one backend directory.
#[derive(Debug, Clone)]
pub struct DiscoveryCache {
    cache_dir: PathBuf,
    source_dir: PathBuf,
}

impl DiscoveryCache {
    /// Create a cache storing its entry under `cache_dir` and validating
    /// against the sources in `source_dir`.
    pub fn new(cache_dir: impl Into<PathBuf>, source_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            source_dir: source_dir.into(),
        }
    }

    /// Path of the cache file.
    pub fn path(&self) -> PathBuf {
        self.cache_dir.join(FILE_NAME)
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Cached functions, if a valid entry exists.
    pub fn get(&self) -> Option<Vec<ParsedFunction>> {
        match self.load() {
            Ok(Some(entry)) => {
                tracing::debug!(
                    "Cache hit: {} functions from {}",
                    entry.functions.len(),
                    self.path().display()
                );
                Some(entry.functions)
            }
            Ok(None) => {
                tracing::debug!("Cache miss for {}", self.source_dir.display());
                None
            }
            Err(e) => {
                tracing::warn!("Ignoring discovery cache: {}", e);
                None
            }
        }
    }

    /// Load the stored entry if it matches the current source tree.
    ///
    /// Returns `Ok(None)` when there is no cache file or the checksum differs.
    ///
    /// # Errors
    /// Returns an error if the cache file is unreadable or not valid JSON, or
    /// if the source tree cannot be checksummed.
    pub fn load(&self) -> Result<Option<CacheEntry>, CacheError> {
        let path = self.path();
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)?;
        let entry: CacheEntry = serde_json::from_str(&content)?;

        let current = source_checksum(&self.source_dir)?;
        if entry.directory_checksum.is_empty() || entry.directory_checksum != current {
            tracing::debug!("Cache checksum mismatch, discarding {}", path.display());
            return Ok(None);
        }

        Ok(Some(entry))
    }

    /// Store `functions`, swallowing any failure.
    pub fn set(&self, functions: &[ParsedFunction]) {
        if let Err(e) = self.store(functions) {
            tracing::warn!("Failed to write discovery cache: {}", e);
        }
    }

    /// Replace the stored entry with `functions` and the current checksum.
    ///
    /// # Errors
    /// Returns an error if the source tree cannot be checksummed or the cache
    /// file cannot be written.
    pub fn store(&self, functions: &[ParsedFunction]) -> Result<(), CacheError> {
        let directory_checksum = source_checksum(&self.source_dir)?;

        let entry = CacheEntry {
            functions: functions.to_vec(),
            timestamp: Utc::now(),
            directory_checksum,
        };

        std::fs::create_dir_all(&self.cache_dir)?;
        let content = serde_json::to_string_pretty(&entry)?;
        std::fs::write(self.path(), content)?;

        tracing::debug!(
            "Cached {} functions at {}",
            functions.len(),
            self.path().display()
        );
        Ok(())
    }

    /// Delete the stored entry, swallowing any failure.
    pub fn clear(&self) {
        if let Err(e) = self.remove() {
            tracing::warn!("Failed to clear discovery cache: {}", e);
        }
    }

    /// Delete the stored entry. A missing file is not an error.
    pub fn remove(&self) -> Result<(), CacheError> {
        match std::fs::remove_file(self.path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// SHA-256 over every source file under `dir`, excluding generated code.
///
/// Files are visited in lexicographic order of their path relative to `dir`;
/// each contributes its relative path followed by its full contents.
///
/// # Errors
/// Returns [`CacheError::MissingSourceDir`] if `dir` does not exist, and an
/// I/O or walk error if any file or directory cannot be read.
pub fn source_checksum(dir: &Path) -> Result<String, CacheError> {
    if !dir.is_dir() {
        return Err(CacheError::MissingSourceDir(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .into_iter()
        .filter_entry(|e| !(e.file_type().is_dir() && e.file_name() == GENERATED_DIR))
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let ext = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        if !SOURCE_EXTENSIONS.contains(&ext) {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(dir)
            .unwrap_or(entry.path())
            .to_string_lossy()
            .replace('\\', "/");
        files.push((relative, entry.into_path()));
    }
    files.sort();

    let mut hasher = Sha256::new();
    for (relative, path) in &files {
        hasher.update(relative.as_bytes());
        hasher.update(std::fs::read(path)?);
    }

    Ok(format!("{:x}", hasher.finalize()))
}
