//! Dashboard filtering, search, and sorting

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::expand::{CodingStatus, ExpandedRow};

/// Coding status filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusFilter {
    #[default]
    All,
    Coded,
    NotCoded,
}

impl StatusFilter {
    pub fn accepts(&self, status: CodingStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Coded => status == CodingStatus::Coded,
            StatusFilter::NotCoded => status == CodingStatus::NotCoded,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', '_'], " ").as_str() {
            "all" => Ok(StatusFilter::All),
            "coded" => Ok(StatusFilter::Coded),
            "not coded" | "notcoded" | "uncoded" => Ok(StatusFilter::NotCoded),
            other => Err(format!("unknown status filter: {}", other)),
        }
    }
}

/// Sortable dashboard columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKey {
    #[default]
    Date,
    Author,
    Title,
}

impl SortKey {
    fn value<'a>(&self, row: &'a ExpandedRow) -> &'a str {
        match self {
            SortKey::Date => &row.article.date,
            SortKey::Author => &row.article.author,
            SortKey::Title => &row.article.title,
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "date" => Ok(SortKey::Date),
            "author" => Ok(SortKey::Author),
            "title" => Ok(SortKey::Title),
            other => Err(format!("unknown sort column: {}", other)),
        }
    }
}

/// Filter, search, and sort settings for one dashboard listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardQuery {
    pub status: StatusFilter,
    /// Case-insensitive substring over title, author, and article index
    pub search: Option<String>,
    pub sort: SortKey,
    pub descending: bool,
}

impl DashboardQuery {
    /// Apply the query. The sort is stable: ties keep their input order
    /// in both directions.
    pub fn apply(&self, rows: Vec<ExpandedRow>) -> Vec<ExpandedRow> {
        let needle = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let mut rows: Vec<ExpandedRow> = rows
            .into_iter()
            .filter(|row| self.status.accepts(row.status))
            .filter(|row| needle.as_deref().map_or(true, |n| matches_search(row, n)))
            .collect();

        rows.sort_by(|a, b| {
            let ordering = compare_cells(self.sort.value(a), self.sort.value(b));
            if self.descending {
                ordering.reverse()
            } else {
                ordering
            }
        });
        rows
    }
}

/// Whether the lowercased `needle` occurs in the row's title, author, or
/// article index.
pub fn matches_search(row: &ExpandedRow, needle: &str) -> bool {
    let haystack = format!(
        "{} {} {}",
        row.article.title, row.article.author, row.article.article_index
    )
    .to_lowercase();
    haystack.contains(needle)
}

/// Finite numeric value of a cell; "NaN" and "inf" count as text.
fn numeric(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|x| x.is_finite())
}

/// Numbers (years) compare numerically and sort before all text cells;
/// text compares lexically. This is a total order.
fn compare_cells(a: &str, b: &str) -> Ordering {
    match (numeric(a), numeric(b)) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}
