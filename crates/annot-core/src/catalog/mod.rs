//! Article catalog: the candidate studies to annotate, grouped by journal

mod article;
mod index;
mod loader;

pub use article::{parse_n_experiments, ArticleGroup, ArticleRecord};
pub use index::{abbreviate_authors, abbreviate_title, derive_article_index};
pub use loader::{load_group, normalize_column};

use serde::{Deserialize, Serialize};

/// All catalog groups, in file-name order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub groups: Vec<ArticleGroup>,
    /// Problems found while loading: missing source, skipped groups
    pub warnings: Vec<String>,
}

impl Catalog {
    pub fn new(groups: Vec<ArticleGroup>) -> Self {
        Self {
            groups,
            warnings: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn group(&self, name: &str) -> Option<&ArticleGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Find an article by index across all groups.
    pub fn article(&self, article_index: &str) -> Option<&ArticleRecord> {
        self.groups
            .iter()
            .flat_map(|g| g.articles.iter())
            .find(|a| a.article_index == article_index)
    }
}
