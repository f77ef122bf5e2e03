//! Article dashboard: expanded rows, coding status, and listing queries

mod expand;
mod query;

pub use expand::{expand_article, expand_articles, CodedIndex, CodingStatus, ExpandedRow};
pub use query::{matches_search, DashboardQuery, SortKey, StatusFilter};

use serde::{Deserialize, Serialize};

use crate::catalog::ArticleGroup;

/// Coding progress for one group, counted per article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub name: String,
    pub coded: usize,
    pub total: usize,
}

impl std::fmt::Display for GroupSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Articles coded in {} so far: {} / {}",
            self.name, self.coded, self.total
        )
    }
}

/// One group's listing: progress plus the filtered, sorted rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupView {
    pub summary: GroupSummary,
    pub rows: Vec<ExpandedRow>,
}

impl GroupView {
    /// Expand a group against the coded index and apply the query.
    pub fn build(group: &ArticleGroup, coded: &CodedIndex, query: &DashboardQuery) -> Self {
        let summary = GroupSummary {
            name: group.name.clone(),
            coded: group
                .articles
                .iter()
                .filter(|a| coded.is_article_coded(&a.article_index))
                .count(),
            total: group.articles.len(),
        };
        let rows = query.apply(expand_articles(&group.articles, coded));
        Self { summary, rows }
    }
}
