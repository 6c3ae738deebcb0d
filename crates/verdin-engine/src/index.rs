//! The shared handle binding a referential evaluator to the sorted
//! reference index its target uniqueness evaluator publishes.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use verdin_core::errors::{ValidationError, ValidationResult};

/// Publish-once handle to a sorted reference index.
///
/// The producing uniqueness evaluator publishes the index path during its
/// finalization; consumers read it during theirs. The file itself stays
/// owned by the producer and is deleted by the producer's `close`, so
/// consumers must be finalized before the producer closes.
#[derive(Debug)]
pub struct ReferenceIndex {
    key: String,
    path: OnceLock<PathBuf>,
}

impl ReferenceIndex {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            path: OnceLock::new(),
        }
    }

    /// Key of the producing evaluator.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Publish the sorted index path. Later calls are ignored.
    pub fn publish(&self, path: PathBuf) {
        let _ = self.path.set(path);
    }

    /// Path of the sorted index, once published.
    pub fn path(&self) -> ValidationResult<&Path> {
        self.path
            .get()
            .map(PathBuf::as_path)
            .ok_or_else(|| ValidationError::IndexUnavailable {
                key: self.key.clone(),
            })
    }

    pub fn is_published(&self) -> bool {
        self.path.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unpublished_index_reports_its_key() {
        let index = ReferenceIndex::new("field_uniqueness");
        let err = index.path().unwrap_err();
        assert!(err.to_string().contains("field_uniqueness"));
    }

    #[test]
    fn first_publish_wins() {
        let index = ReferenceIndex::new("field_uniqueness");
        index.publish(PathBuf::from("/tmp/a_sorted.txt"));
        index.publish(PathBuf::from("/tmp/b_sorted.txt"));
        assert_eq!(index.path().unwrap(), Path::new("/tmp/a_sorted.txt"));
    }
}
