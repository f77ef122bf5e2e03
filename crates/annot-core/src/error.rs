//! Error types for annot-core

use thiserror::Error;

use crate::annotation::AnnotationKey;

/// Result type alias for annot operations
pub type Result<T> = std::result::Result<T, AnnotError>;

/// Main error type for annot operations
#[derive(Error, Debug)]
pub enum AnnotError {
    /// Codebook loading errors
    #[error("Codebook error: {0}")]
    Codebook(#[from] CodebookError),

    /// Article catalog errors
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Annotation store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Form editing errors
    #[error("Form error: {0}")]
    Form(#[from] FormError),

    /// UI mode errors
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// CSV export errors
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Codebook-specific errors
#[derive(Error, Debug)]
pub enum CodebookError {
    /// The codebook table could not be read
    #[error("Cannot read codebook {path}: {reason}")]
    Read { path: String, reason: String },

    /// A required column is missing from the header row
    #[error("Codebook is missing column: {0}")]
    MissingColumn(String),

    /// A row has no code
    #[error("Codebook row {0} has an empty code")]
    EmptyCode(usize),

    /// The same code appears twice
    #[error("Duplicate codebook code: {0}")]
    DuplicateCode(String),
}

/// Article catalog errors
#[derive(Error, Debug)]
pub enum CatalogError {
    /// A group file could not be read
    #[error("Cannot read catalog group {group}: {reason}")]
    Read { group: String, reason: String },

    /// A group lacks a column needed to build article indexes
    #[error("Group '{group}' is missing the '{column}' column")]
    SchemaMismatch { group: String, column: String },
}

/// Annotation store errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// No record exists for the key
    #[error("Annotation not found: {0}")]
    NotFound(AnnotationKey),

    /// A record already exists for the key
    #[error("Annotation already exists: {0}")]
    AlreadyExists(AnnotationKey),

    /// Connection, constraint, or serialization failure
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Form editing errors
#[derive(Error, Debug)]
pub enum FormError {
    /// The code is not part of the codebook
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// The value is not one of the field's options
    #[error("Value '{value}' is not allowed for {code}")]
    InvalidOption { code: String, value: String },

    /// The field cannot be edited in the current mode
    #[error("Field is read-only: {0}")]
    ReadOnly(String),
}

/// UI mode errors
#[derive(Error, Debug)]
pub enum SessionError {
    /// Invalid mode transition
    #[error("Invalid mode transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    /// The mode query value is not recognized
    #[error("Unknown mode: {0}")]
    UnknownMode(String),

    /// A form action was requested with no form open
    #[error("No entry is open")]
    NoOpenEntry,
}

/// CSV export errors
#[derive(Error, Debug)]
pub enum ExportError {
    /// IO error
    #[error("IO error: {0}")]
    Io(String),

    /// CSV writer error
    #[error("CSV error: {0}")]
    Csv(String),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read
    #[error("IO error: {0}")]
    Io(String),

    /// The config file could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// A required value is empty
    #[error("Missing field: {0}")]
    MissingField(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Storage(err.to_string())
    }
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        ExportError::Io(err.to_string())
    }
}

impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        ExportError::Csv(err.to_string())
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

impl From<rusqlite::Error> for AnnotError {
    fn from(err: rusqlite::Error) -> Self {
        AnnotError::Store(StoreError::from(err))
    }
}
