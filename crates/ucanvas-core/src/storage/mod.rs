//! Storage abstraction for persistence.

mod autosave;
mod file;
mod memory;

pub use autosave::{AutoSaver, load_or_default};
pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::shapes::Primitive;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Document not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Serialization(e.to_string())
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Trait for canvas storage backends.
///
/// A canvas is persisted as one document: the flat list of committed
/// primitives, keyed by name.
pub trait Storage: Send + Sync {
    /// Replace the document stored under `key`.
    fn save(&self, key: &str, primitives: &[Primitive]) -> BoxFuture<'_, StorageResult<()>>;

    /// Load a document.
    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<Vec<Primitive>>>;

    /// Delete a document.
    fn delete(&self, key: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// List all document keys.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;

    /// Check if a document exists.
    fn exists(&self, key: &str) -> BoxFuture<'_, StorageResult<bool>>;
}

/// Serialize primitives into the persisted document format.
pub fn document_to_json(primitives: &[Primitive]) -> StorageResult<String> {
    Ok(serde_json::to_string_pretty(primitives)?)
}

/// Parse a persisted document.
pub fn document_from_json(json: &str) -> StorageResult<Vec<Primitive>> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{RgbaColor, Shape, ShapeKind, Stroke};
    use kurbo::Point;

    #[test]
    fn test_document_roundtrip_keeps_order() {
        let primitives = vec![
            Primitive::Shape(Shape::from_corners(
                ShapeKind::Circle,
                Point::ZERO,
                Point::new(4.0, 4.0),
                RgbaColor::blue(),
                1.0,
            )),
            Primitive::Stroke(Stroke::from_points(vec![Point::new(1.0, 1.0)], RgbaColor::red(), 2.0)),
        ];
        let json = document_to_json(&primitives).unwrap();
        assert_eq!(document_from_json(&json).unwrap(), primitives);
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(document_to_json(&[]).unwrap(), "[]");
        assert!(document_from_json("[]").unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_document() {
        let result = document_from_json(r#"{"not": "a list"}"#);
        assert!(matches!(result, Err(StorageError::Serialization(_))));
    }
}
