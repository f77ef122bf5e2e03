//! Annotation store abstraction

use std::collections::BTreeSet;
use std::time::SystemTime;

use crate::annotation::{AnnotationKey, AnnotationRecord};
use crate::error::StoreError;

/// The trait that annotation storage backends implement.
///
/// Every write is its own short transaction: it either commits completely
/// or leaves the store untouched.
pub trait AnnotationStore: Send + Sync {
    /// All records, ordered by insertion.
    fn get_all(&self) -> Result<Vec<AnnotationRecord>, StoreError>;

    /// Get the record for a composite key.
    fn get(&self, key: &AnnotationKey) -> Result<Option<AnnotationRecord>, StoreError>;

    /// Insert a new record. Fails with `AlreadyExists` if the key is taken.
    fn insert(&self, record: &AnnotationRecord) -> Result<(), StoreError>;

    /// Overwrite the metadata and every value present in `record` on the
    /// row identified by `key`. Values absent from `record` are kept.
    /// Fails with `NotFound` if no row matches.
    fn update(&self, key: &AnnotationKey, record: &AnnotationRecord) -> Result<(), StoreError>;

    /// Keys of every stored record.
    fn coded_keys(&self) -> Result<BTreeSet<AnnotationKey>, StoreError> {
        Ok(self.get_all()?.iter().map(AnnotationRecord::key).collect())
    }

    /// Distinct article indexes with at least one record.
    fn coded_articles(&self) -> Result<BTreeSet<String>, StoreError> {
        Ok(self
            .coded_keys()?
            .into_iter()
            .map(|k| k.article_index)
            .collect())
    }

    /// Last modification time of the backing file, if there is one.
    fn modified_at(&self) -> Option<SystemTime> {
        None
    }
}
