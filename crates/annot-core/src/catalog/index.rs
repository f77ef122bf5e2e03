//! Article index derivation
//!
//! An article index looks like `Doe, Smith_2020_a_quick_brown`: abbreviated
//! authors, the date cell, and the abbreviated title joined by underscores.

use crate::text::title_case;

/// Surnames kept before " et al." is appended
const MAX_AUTHORS: usize = 3;

/// Title words kept in the abbreviation
const MAX_TITLE_WORDS: usize = 3;

/// Abbreviate a title: first three punctuation-stripped words, lowercased
/// and joined with underscores. A word made only of punctuation still
/// counts and leaves an empty slot. Returns `no_title` when absent.
pub fn abbreviate_title(title: Option<&str>) -> String {
    let Some(title) = title else {
        return "no_title".to_string();
    };

    title
        .split_whitespace()
        .map(|w| w.chars().filter(|c| !c.is_ascii_punctuation()).collect::<String>())
        .take(MAX_TITLE_WORDS)
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}

/// Abbreviate a `"; "`-separated author list to its title-cased surnames.
///
/// The surname is the last space-separated word of each author. More than
/// three authors keeps the first three and appends " et al.". Returns
/// `no_authors` when absent.
pub fn abbreviate_authors(authors: Option<&str>) -> String {
    let Some(authors) = authors else {
        return "no_authors".to_string();
    };

    let surnames: Vec<String> = authors
        .split("; ")
        .map(|name| title_case(name.trim().rsplit(' ').next().unwrap_or_default()))
        .collect();

    if surnames.len() <= MAX_AUTHORS {
        surnames.join(", ")
    } else {
        format!("{} et al.", surnames[..MAX_AUTHORS].join(", "))
    }
}

/// Derive an article index from author, date, and title cells.
pub fn derive_article_index(author: Option<&str>, date: &str, title: Option<&str>) -> String {
    format!(
        "{}_{}_{}",
        abbreviate_authors(author),
        date,
        abbreviate_title(title)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abbreviate_title() {
        assert_eq!(abbreviate_title(Some("A, Quick: Brown Fox!")), "a_quick_brown");
        assert_eq!(abbreviate_title(Some("Islands")), "islands");
        assert_eq!(abbreviate_title(Some("Wh - islands and gaps")), "wh__islands");
        assert_eq!(abbreviate_title(Some("-- ... Islands")), "__islands");
        assert_eq!(abbreviate_title(None), "no_title");
    }

    #[test]
    fn test_abbreviate_authors() {
        assert_eq!(abbreviate_authors(Some("Jane Doe; John Q. Smith")), "Doe, Smith");
        assert_eq!(abbreviate_authors(Some("jane DOE")), "Doe");
        assert_eq!(abbreviate_authors(None), "no_authors");
    }

    #[test]
    fn test_abbreviate_many_authors() {
        let abbr = abbreviate_authors(Some("A Alpha; B Beta; C Gamma; D Delta"));
        assert_eq!(abbr, "Alpha, Beta, Gamma et al.");
        assert!(!abbr.contains("Delta"));
    }

    #[test]
    fn test_derive_article_index() {
        let index = derive_article_index(
            Some("Jane Doe; John Q. Smith"),
            "2020",
            Some("A, Quick: Brown Fox!"),
        );
        assert_eq!(index, "Doe, Smith_2020_a_quick_brown");
    }
}
