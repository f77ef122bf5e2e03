//! Annotation records
//!
//! A record is identified by `(article_index, experiment_number)` and holds
//! fixed article metadata plus one string value per codebook code. Values
//! are kept in a generic code -> string map, so adding a code to the
//! codebook never changes this type.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::ArticleRecord;
use crate::codebook::{Codebook, FieldKind};
use crate::text::{join_list, split_list};

/// Metadata columns stored alongside the codebook values, in export order
pub const METADATA_FIELDS: [&str; 7] = [
    "article_index",
    "authors",
    "year",
    "title",
    "journal",
    "url",
    "searchterms",
];

/// Composite identity of an annotation record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnnotationKey {
    pub article_index: String,
    /// 1-based
    pub experiment_number: u32,
}

impl AnnotationKey {
    pub fn new(article_index: impl Into<String>, experiment_number: u32) -> Self {
        Self {
            article_index: article_index.into(),
            experiment_number,
        }
    }
}

impl std::fmt::Display for AnnotationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (experiment {})", self.article_index, self.experiment_number)
    }
}

/// Article metadata copied into every record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleMetadata {
    pub article_index: String,
    pub authors: String,
    pub year: String,
    pub title: String,
    pub journal: String,
    pub url: String,
    pub searchterms: String,
}

impl ArticleMetadata {
    /// Value of a metadata field by column name.
    pub fn get(&self, name: &str) -> Option<&str> {
        let value = match name {
            "article_index" => &self.article_index,
            "authors" => &self.authors,
            "year" => &self.year,
            "title" => &self.title,
            "journal" => &self.journal,
            "url" => &self.url,
            "searchterms" => &self.searchterms,
            _ => return None,
        };
        Some(value)
    }

    /// Mutable access to a metadata field by column name.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut String> {
        let value = match name {
            "article_index" => &mut self.article_index,
            "authors" => &mut self.authors,
            "year" => &mut self.year,
            "title" => &mut self.title,
            "journal" => &mut self.journal,
            "url" => &mut self.url,
            "searchterms" => &mut self.searchterms,
            _ => return None,
        };
        Some(value)
    }
}

impl From<&ArticleRecord> for ArticleMetadata {
    fn from(article: &ArticleRecord) -> Self {
        Self {
            article_index: article.article_index.clone(),
            authors: article.author.clone(),
            year: article.date.clone(),
            title: article.title.clone(),
            journal: article.journal.clone(),
            url: article.url.clone(),
            searchterms: article.searchterms.clone(),
        }
    }
}

/// One coded experiment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    pub metadata: ArticleMetadata,
    pub experiment_number: u32,
    /// Codebook code -> stored string
    pub values: BTreeMap<String, String>,
}

impl AnnotationRecord {
    pub fn new(metadata: ArticleMetadata, experiment_number: u32) -> Self {
        Self {
            metadata,
            experiment_number,
            values: BTreeMap::new(),
        }
    }

    pub fn key(&self) -> AnnotationKey {
        AnnotationKey::new(self.metadata.article_index.clone(), self.experiment_number)
    }

    /// Stored value for a code; codes never written read as empty.
    pub fn value(&self, code: &str) -> &str {
        self.values.get(code).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, code: impl Into<String>, value: impl Into<String>) {
        self.values.insert(code.into(), value.into());
    }

    /// Whether two records agree on every code in the codebook.
    pub fn same_coding(&self, other: &AnnotationRecord, codebook: &Codebook) -> bool {
        codebook.codes().all(|code| self.value(code) == other.value(code))
    }
}

/// A codebook value in its typed form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldValue {
    /// Free text, single or multi-line
    Text(String),
    /// One option, or none
    Choice(Option<String>),
    /// Any subset of the options
    MultiChoice(Vec<String>),
}

impl FieldValue {
    /// Stored string form: multi-choice values are joined with `"; "`.
    pub fn to_stored(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Choice(choice) => choice.clone().unwrap_or_default(),
            FieldValue::MultiChoice(items) => join_list(items),
        }
    }

    /// Parse a stored string according to the field kind.
    pub fn from_stored(kind: FieldKind, stored: &str) -> Self {
        match kind {
            FieldKind::MultiSelect => FieldValue::MultiChoice(split_list(stored)),
            FieldKind::SingleChoice => {
                let trimmed = stored.trim();
                FieldValue::Choice((!trimmed.is_empty()).then(|| trimmed.to_string()))
            }
            FieldKind::LongText | FieldKind::Text => FieldValue::Text(stored.to_string()),
        }
    }
}
