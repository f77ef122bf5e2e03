//! Persistence layer for annotation records
//!
//! Provides the `AnnotationStore` trait and its SQLite implementation.

mod schema;
mod sqlite_store;
mod store;

pub use schema::{Schema, SCHEMA_VERSION};
pub use sqlite_store::SqliteAnnotationStore;
pub use store::AnnotationStore;
