//! Cached view of which entries are coded
//!
//! The dashboard reads the coded index on every listing. The cache is
//! refreshed only after `invalidate()` (called after every write) or when
//! the store's backing file has a different modification time than when
//! the index was loaded. External writers are not noticed until then.

use std::time::SystemTime;

use crate::dashboard::CodedIndex;
use crate::error::StoreError;
use crate::persistence::AnnotationStore;

/// Coded-index cache with explicit invalidation.
#[derive(Debug, Default)]
pub struct CodedIndexCache {
    index: Option<CodedIndex>,
    loaded_mtime: Option<SystemTime>,
    skip_file_check: bool,
    loads: usize,
}

impl CodedIndexCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only reload after `invalidate()`, never on file changes.
    pub fn without_file_check() -> Self {
        Self {
            skip_file_check: true,
            ..Self::default()
        }
    }

    /// Drop the cached index; the next `get` reloads it.
    pub fn invalidate(&mut self) {
        self.index = None;
    }

    /// Whether the next `get` would reload from the store.
    pub fn is_stale(&self, store: &dyn AnnotationStore) -> bool {
        self.index.is_none() || (!self.skip_file_check && store.modified_at() != self.loaded_mtime)
    }

    /// Cached index, reloaded first if stale.
    pub fn get(&mut self, store: &dyn AnnotationStore) -> Result<&CodedIndex, StoreError> {
        if self.is_stale(store) {
            let keys = store.coded_keys()?;
            self.loaded_mtime = store.modified_at();
            self.loads += 1;
            tracing::debug!("Loaded coded index: {} entries", keys.len());
            self.index = Some(CodedIndex::new(keys));
        }
        Ok(self.index.get_or_insert_with(CodedIndex::default))
    }

    /// Number of reloads so far.
    pub fn load_count(&self) -> usize {
        self.loads
    }
}
