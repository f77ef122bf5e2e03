//! Annot Core - codebook-driven annotation of research articles
//!
//! This crate provides the core functionality for the annot coding tool:
//!
//! - **Codebook**: CSV schema that defines every annotatable field, its control and options
//! - **Catalog**: Candidate articles grouped by journal, with derived article indexes
//! - **Dashboard**: One row per (article, experiment), coding status, filtering and sorting
//! - **Annotation**: Records keyed by (article_index, experiment_number) with typed field values
//! - **Persistence**: SQLite-backed annotation store behind the `AnnotationStore` trait
//! - **Form**: Codebook-driven form model with prefill and clearing
//! - **Session**: UI mode state machine (Dashboard → AddEntry/ReviewEntry → Dashboard)
//! - **Export**: Timestamped CSV dump of the annotation table
//! - **Annotator**: The interaction boundary that turns failures into user notices
//!
//! # Data flow
//!
//! ```text
//! Codebook ─┐
//!           ├→ FormModel ⇄ AnnotationStore → CodedIndexCache → Dashboard
//! Catalog ──┘
//! ```

pub mod annotation;
pub mod annotator;
pub mod cache;
pub mod catalog;
pub mod codebook;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod form;
pub mod persistence;
pub mod session;
pub mod text;

pub use annotation::{AnnotationKey, AnnotationRecord, ArticleMetadata, FieldValue, METADATA_FIELDS};
pub use annotator::{Annotator, DashboardPage, Notice, NoticeLevel};
pub use cache::CodedIndexCache;
pub use catalog::{
    abbreviate_authors, abbreviate_title, derive_article_index, ArticleGroup, ArticleRecord,
    Catalog,
};
pub use codebook::{Codebook, CodebookField, FieldKind, FieldSummary};
pub use config::AnnotConfig;
pub use dashboard::{
    expand_article, expand_articles, CodedIndex, CodingStatus, DashboardQuery, ExpandedRow,
    GroupSummary, GroupView, SortKey, StatusFilter,
};
pub use error::{
    AnnotError, CatalogError, CodebookError, ConfigError, ExportError, FormError, Result,
    SessionError, StoreError,
};
pub use export::{export_csv, export_filename, write_csv};
pub use form::{Control, EntryMode, FormControl, FormModel, FormSection, FormSettings};
pub use persistence::{AnnotationStore, Schema, SqliteAnnotationStore, SCHEMA_VERSION};
pub use session::{Mode, Session, View};
