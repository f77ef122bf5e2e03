//! Catalog CSV loading
//!
//! Every CSV file in the catalog directory is one group, named after the
//! file stem. A single CSV file is loaded as one group.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use super::article::{parse_n_experiments, ArticleGroup, ArticleRecord};
use super::index::derive_article_index;
use super::Catalog;
use crate::error::CatalogError;
use crate::text::non_empty;

const ARTICLE_INDEX: &str = "article_index";
const TITLE: &str = "title";
const AUTHOR: &str = "author";
const DATE: &str = "date";
const URL: &str = "url";
const SEARCHTERMS: &str = "searchterms";
const SEARCHTERM: &str = "searchterm";
const N_EXPERIMENTS: &str = "n_experiments";
const INCLUDE: &str = "include";

/// Marker in the include column that excludes a row
const EXCLUDED: &str = "x";

impl Catalog {
    /// Load the catalog from a directory of CSV files or a single CSV file.
    ///
    /// A missing path yields an empty catalog. Groups that cannot be read
    /// or lack required columns are skipped with a warning.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            let warning = format!("No article file found at '{}'", path.display());
            tracing::warn!("{}", warning);
            return Self::with_warning(warning);
        }

        let files = if path.is_dir() {
            match csv_files(path) {
                Ok(files) => files,
                Err(e) => {
                    let warning = format!("Cannot list catalog directory '{}': {}", path.display(), e);
                    tracing::warn!("{}", warning);
                    return Self::with_warning(warning);
                }
            }
        } else {
            vec![path.to_path_buf()]
        };

        let mut catalog = Self::default();
        for file in files {
            let name = file
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            match load_group_file(&name, &file) {
                Ok(group) => {
                    tracing::debug!("Loaded {} articles for group '{}'", group.articles.len(), name);
                    catalog.groups.push(group);
                }
                Err(e) => {
                    tracing::warn!("Skipping catalog group: {}", e);
                    catalog.warnings.push(e.to_string());
                }
            }
        }

        tracing::info!("Loaded {} catalog groups from {:?}", catalog.groups.len(), path);
        catalog
    }

    fn with_warning(warning: String) -> Self {
        Self {
            groups: Vec::new(),
            warnings: vec![warning],
        }
    }
}

fn csv_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        })
        .collect();
    files.sort();
    Ok(files)
}

fn load_group_file(name: &str, path: &Path) -> Result<ArticleGroup, CatalogError> {
    let file = File::open(path).map_err(|e| CatalogError::Read {
        group: name.to_string(),
        reason: e.to_string(),
    })?;
    load_group(name, BufReader::new(file))
}

/// Normalize a header cell: trimmed, lowercased, spaces to underscores.
pub fn normalize_column(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

/// Parse one group from CSV text.
pub fn load_group<R: Read>(name: &str, reader: R) -> Result<ArticleGroup, CatalogError> {
    let read_error = |e: csv::Error| CatalogError::Read {
        group: name.to_string(),
        reason: e.to_string(),
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()
        .map_err(read_error)?
        .iter()
        .map(normalize_column)
        .collect();
    let columns: HashMap<&str, usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.as_str(), i))
        .collect();

    let has_index = columns.contains_key(ARTICLE_INDEX);
    if !has_index {
        for required in [TITLE, DATE] {
            if !columns.contains_key(required) {
                return Err(CatalogError::SchemaMismatch {
                    group: name.to_string(),
                    column: required.to_string(),
                });
            }
        }
    }

    let mut articles = Vec::new();
    for record in reader.records() {
        let record = record.map_err(read_error)?;
        let cell = |column: &str| columns.get(column).and_then(|&i| non_empty(record.get(i)));

        if cell(INCLUDE).as_deref() == Some(EXCLUDED) {
            continue;
        }

        let title = cell(TITLE);
        let author = cell(AUTHOR);
        let date = cell(DATE).unwrap_or_default();
        let article_index = cell(ARTICLE_INDEX).unwrap_or_else(|| {
            derive_article_index(author.as_deref(), &date, title.as_deref())
        });

        let extra: BTreeMap<String, String> = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| !is_known_column(h))
            .filter_map(|(i, h)| record.get(i).map(|v| (h.clone(), v.to_string())))
            .collect();

        articles.push(ArticleRecord {
            article_index,
            title: title.unwrap_or_default(),
            author: author.unwrap_or_default(),
            journal: name.to_string(),
            date,
            url: cell(URL).unwrap_or_default(),
            searchterms: cell(SEARCHTERMS).or_else(|| cell(SEARCHTERM)).unwrap_or_default(),
            n_experiments: parse_n_experiments(cell(N_EXPERIMENTS).as_deref()),
            extra,
        });
    }

    Ok(ArticleGroup {
        name: name.to_string(),
        articles,
    })
}

fn is_known_column(name: &str) -> bool {
    matches!(
        name,
        ARTICLE_INDEX | TITLE | AUTHOR | DATE | URL | SEARCHTERMS | SEARCHTERM | N_EXPERIMENTS | INCLUDE
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_column() {
        assert_eq!(normalize_column(" N_experiments "), "n_experiments");
        assert_eq!(normalize_column("Article Index"), "article_index");
    }

    #[test]
    fn test_load_group_derives_index() {
        let csv = "\
Title,Author,Date,URL,N_experiments,Include,Notes
\"A, Quick: Brown Fox!\",Jane Doe; John Q. Smith,2020,http://x,2,,first
Dropped,Some One,2019,,,x,
";
        let group = load_group("Language", csv.as_bytes()).unwrap();
        assert_eq!(group.articles.len(), 1);

        let article = &group.articles[0];
        assert_eq!(article.article_index, "Doe, Smith_2020_a_quick_brown");
        assert_eq!(article.journal, "Language");
        assert_eq!(article.n_experiments, 2);
        assert_eq!(article.url, "http://x");
        assert_eq!(article.extra.get("notes").map(String::as_str), Some("first"));
        assert!(!article.extra.contains_key("include"));
    }

    #[test]
    fn test_only_lowercase_x_excludes() {
        let csv = "\
title,author,date,include
Kept upper,A B,2001,X
Kept yes,C D,2002,yes
Dropped,E F,2003, x 
";
        let group = load_group("Language", csv.as_bytes()).unwrap();
        let titles: Vec<&str> = group.articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["Kept upper", "Kept yes"]);
    }

    #[test]
    fn test_load_group_keeps_given_index() {
        let csv = "article_index,title,author,date,searchterm\nidx_1,T,A B,2001,islands\n";
        let group = load_group("Syntax", csv.as_bytes()).unwrap();
        assert_eq!(group.articles[0].article_index, "idx_1");
        assert_eq!(group.articles[0].searchterms, "islands");
        assert_eq!(group.articles[0].n_experiments, 1);
    }

    #[test]
    fn test_load_group_schema_mismatch() {
        let csv = "author,url\nA B,http://x\n";
        let err = load_group("Broken", csv.as_bytes()).unwrap_err();
        assert!(matches!(err, CatalogError::SchemaMismatch { ref group, .. } if group == "Broken"));
    }
}
