//! Record expansion: one dashboard row per (article, experiment)

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::annotation::{AnnotationKey, ArticleMetadata};
use crate::catalog::ArticleRecord;

/// Article-level coding status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CodingStatus {
    /// At least one experiment of the article has a record
    Coded,
    NotCoded,
}

impl std::fmt::Display for CodingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodingStatus::Coded => write!(f, "Coded"),
            CodingStatus::NotCoded => write!(f, "Not coded"),
        }
    }
}

/// What the store holds, reduced to keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodedIndex {
    pub keys: BTreeSet<AnnotationKey>,
}

impl CodedIndex {
    pub fn new(keys: BTreeSet<AnnotationKey>) -> Self {
        Self { keys }
    }

    /// Distinct article indexes with at least one record.
    pub fn articles(&self) -> BTreeSet<&str> {
        self.keys.iter().map(|k| k.article_index.as_str()).collect()
    }

    pub fn is_article_coded(&self, article_index: &str) -> bool {
        self.keys.iter().any(|k| k.article_index == article_index)
    }

    pub fn is_entry_coded(&self, key: &AnnotationKey) -> bool {
        self.keys.contains(key)
    }
}

/// One dashboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpandedRow {
    /// Source row, copied verbatim
    pub article: ArticleRecord,
    /// 1..=n_experiments
    pub experiment_number: u32,
    /// Article granularity: coded if any experiment is coded
    pub status: CodingStatus,
    /// Whether this exact (article, experiment) has a record
    pub entry_coded: bool,
}

impl ExpandedRow {
    pub fn key(&self) -> AnnotationKey {
        AnnotationKey::new(self.article.article_index.clone(), self.experiment_number)
    }

    pub fn metadata(&self) -> ArticleMetadata {
        ArticleMetadata::from(&self.article)
    }
}

/// Expand one article into `n_experiments` rows.
pub fn expand_article(article: &ArticleRecord, coded: &CodedIndex) -> Vec<ExpandedRow> {
    let status = if coded.is_article_coded(&article.article_index) {
        CodingStatus::Coded
    } else {
        CodingStatus::NotCoded
    };

    (1..=article.n_experiments.max(1))
        .map(|experiment_number| {
            let key = AnnotationKey::new(article.article_index.clone(), experiment_number);
            ExpandedRow {
                article: article.clone(),
                experiment_number,
                status,
                entry_coded: coded.is_entry_coded(&key),
            }
        })
        .collect()
}

/// Expand a list of articles, keeping catalog order.
pub fn expand_articles(articles: &[ArticleRecord], coded: &CodedIndex) -> Vec<ExpandedRow> {
    articles
        .iter()
        .flat_map(|a| expand_article(a, coded))
        .collect()
}
