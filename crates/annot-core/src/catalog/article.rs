//! Article catalog rows

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One article from the catalog. Read-only once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    /// Provided by the catalog or derived from author, date, and title
    pub article_index: String,
    pub title: String,
    pub author: String,
    /// Name of the group (journal) the article was listed under
    pub journal: String,
    pub date: String,
    pub url: String,
    pub searchterms: String,
    /// Always at least 1
    pub n_experiments: u32,
    /// Remaining catalog columns, copied verbatim
    pub extra: BTreeMap<String, String>,
}

impl ArticleRecord {
    /// Create a single-experiment article with empty optional cells.
    pub fn new(
        article_index: impl Into<String>,
        title: impl Into<String>,
        author: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            article_index: article_index.into(),
            title: title.into(),
            author: author.into(),
            journal: String::new(),
            date: date.into(),
            url: String::new(),
            searchterms: String::new(),
            n_experiments: 1,
            extra: BTreeMap::new(),
        }
    }
}

/// Articles listed under one journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleGroup {
    pub name: String,
    pub articles: Vec<ArticleRecord>,
}

/// Parse an experiment count cell.
///
/// Absent, unparseable, or non-positive values become 1. Integral floats
/// such as `2.0` are accepted.
pub fn parse_n_experiments(cell: Option<&str>) -> u32 {
    let Some(cell) = cell.map(str::trim).filter(|s| !s.is_empty()) else {
        return 1;
    };

    let count = cell.parse::<i64>().ok().or_else(|| {
        cell.parse::<f64>()
            .ok()
            .filter(|f| f.fract() == 0.0 && f.is_finite())
            .map(|f| f as i64)
    });

    match count {
        Some(n) if n >= 1 => u32::try_from(n).unwrap_or(u32::MAX),
        _ => 1,
    }
}
