//! In-memory storage implementation.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use crate::shapes::Primitive;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral use.
///
/// Besides the current documents it keeps every document ever written, so
/// tests can assert on the exact sequence of saves.
#[derive(Default)]
pub struct MemoryStorage {
    documents: RwLock<HashMap<String, Vec<Primitive>>>,
    history: RwLock<Vec<(String, Vec<Primitive>)>>,
}

fn lock_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Lock error: {}", e))
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every document saved under `key`, oldest first.
    pub fn saved_documents(&self, key: &str) -> Vec<Vec<Primitive>> {
        self.history
            .read()
            .map(|history| {
                history
                    .iter()
                    .filter(|(k, _)| k == key)
                    .map(|(_, doc)| doc.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Total number of successful saves.
    pub fn save_count(&self) -> usize {
        self.history.read().map(|h| h.len()).unwrap_or(0)
    }
}

impl Storage for MemoryStorage {
    fn save(&self, key: &str, primitives: &[Primitive]) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        let document = primitives.to_vec();
        Box::pin(async move {
            let mut docs = self.documents.write().map_err(lock_error)?;
            let mut history = self.history.write().map_err(lock_error)?;
            history.push((key.clone(), document.clone()));
            docs.insert(key, document);
            Ok(())
        })
    }

    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<Vec<Primitive>>> {
        let key = key.to_string();
        Box::pin(async move {
            let docs = self.documents.read().map_err(lock_error)?;
            docs.get(&key).cloned().ok_or(StorageError::NotFound(key))
        })
    }

    fn delete(&self, key: &str) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        Box::pin(async move {
            let mut docs = self.documents.write().map_err(lock_error)?;
            docs.remove(&key);
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let docs = self.documents.read().map_err(lock_error)?;
            Ok(docs.keys().cloned().collect())
        })
    }

    fn exists(&self, key: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let key = key.to_string();
        Box::pin(async move {
            let docs = self.documents.read().map_err(lock_error)?;
            Ok(docs.contains_key(&key))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{RgbaColor, Stroke};
    use kurbo::Point;
    use pollster::block_on;

    fn stroke_at(x: f64) -> Primitive {
        Primitive::Stroke(Stroke::from_points(vec![Point::new(x, 0.0)], RgbaColor::black(), 1.0))
    }

    #[test]
    fn test_memory_storage_save_load() {
        let storage = MemoryStorage::new();
        let doc = vec![stroke_at(1.0)];

        block_on(storage.save("canvas", &doc)).unwrap();
        let loaded = block_on(storage.load("canvas")).unwrap();
        assert_eq!(loaded, doc);
    }

    #[test]
    fn test_memory_storage_not_found() {
        let storage = MemoryStorage::new();
        let result = block_on(storage.load("missing"));
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_memory_storage_delete_and_list() {
        let storage = MemoryStorage::new();
        block_on(storage.save("a", &[])).unwrap();
        block_on(storage.save("b", &[])).unwrap();

        let mut keys = block_on(storage.list()).unwrap();
        keys.sort();
        assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);

        block_on(storage.delete("a")).unwrap();
        assert!(!block_on(storage.exists("a")).unwrap());
        assert!(block_on(storage.exists("b")).unwrap());
    }

    #[test]
    fn test_memory_storage_history() {
        let storage = MemoryStorage::new();
        block_on(storage.save("canvas", &[stroke_at(1.0)])).unwrap();
        block_on(storage.save("other", &[])).unwrap();
        block_on(storage.save("canvas", &[])).unwrap();

        let saved = storage.saved_documents("canvas");
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[0].len(), 1);
        assert!(saved[1].is_empty());
        assert_eq!(storage.save_count(), 3);
    }
}
