//! File-based storage implementation.

use super::{BoxFuture, Storage, StorageError, StorageResult, document_from_json, document_to_json};
use crate::shapes::Primitive;
use std::fs;
use std::path::{Path, PathBuf};

/// File-based storage.
///
/// Stores each canvas as `<base>/<key>.json`.
pub struct FileStorage {
    /// Base directory for document storage.
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a new file storage with the given base directory.
    ///
    /// Creates the directory if it doesn't exist.
    pub fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StorageError::Io(format!("Failed to create storage directory: {}", e))
            })?;
        }
        Ok(Self { base_path })
    }

    /// Directory used when none is configured.
    ///
    /// On Linux: `~/.local/share/ucanvas/`
    /// On macOS: `~/Library/Application Support/ucanvas/`
    /// On Windows: `%LOCALAPPDATA%\ucanvas\`
    pub fn default_dir() -> StorageResult<PathBuf> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;
        Ok(base.join("ucanvas"))
    }

    /// Create file storage in the default location.
    pub fn default_location() -> StorageResult<Self> {
        Self::new(Self::default_dir()?)
    }

    /// Get the file path for a document key.
    fn document_path(&self, key: &str) -> PathBuf {
        // Sanitize key to be safe for filenames
        let safe_key: String = key
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.base_path.join(format!("{}.json", safe_key))
    }

    /// Get the base path.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

/// Write to a sibling temp file, then rename it over `path`.
fn write_atomically(path: &Path, contents: &str) -> StorageResult<()> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, contents)
        .map_err(|e| StorageError::Io(format!("Failed to write {}: {}", tmp.display(), e)))?;
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        StorageError::Io(format!("Failed to replace {}: {}", path.display(), e))
    })
}

impl Storage for FileStorage {
    fn save(&self, key: &str, primitives: &[Primitive]) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.document_path(key);
        let json = match document_to_json(primitives) {
            Ok(j) => j,
            Err(e) => return Box::pin(async move { Err(e) }),
        };

        Box::pin(async move {
            write_atomically(&path, &json)?;
            log::debug!("Wrote {} bytes to {}", json.len(), path.display());
            Ok(())
        })
    }

    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<Vec<Primitive>>> {
        let path = self.document_path(key);
        let key_owned = key.to_string();

        Box::pin(async move {
            if !path.exists() {
                return Err(StorageError::NotFound(key_owned));
            }

            let json = fs::read_to_string(&path).map_err(|e| {
                StorageError::Io(format!("Failed to read {}: {}", path.display(), e))
            })?;

            document_from_json(&json).map_err(|e| {
                StorageError::Serialization(format!("Failed to parse {}: {}", path.display(), e))
            })
        })
    }

    fn delete(&self, key: &str) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.document_path(key);

        Box::pin(async move {
            if path.exists() {
                fs::remove_file(&path).map_err(|e| {
                    StorageError::Io(format!("Failed to delete {}: {}", path.display(), e))
                })?;
            }
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        let base = self.base_path.clone();

        Box::pin(async move {
            if !base.exists() {
                return Ok(vec![]);
            }

            let entries = fs::read_dir(&base)
                .map_err(|e| StorageError::Io(format!("Failed to read directory: {}", e)))?;

            let mut keys = Vec::new();
            for entry in entries.flatten() {
                let path = entry.path();
                // Only include .json files
                if path.extension().is_some_and(|e| e == "json") {
                    if let Some(name) = path.file_stem().and_then(|s| s.to_str()) {
                        keys.push(name.to_string());
                    }
                }
            }
            keys.sort();
            Ok(keys)
        })
    }

    fn exists(&self, key: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let path = self.document_path(key);
        Box::pin(async move { Ok(path.exists()) })
    }
}
