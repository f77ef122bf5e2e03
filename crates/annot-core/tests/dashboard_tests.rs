//! Catalog loading and dashboard integration tests
//!
//! Enhanced with property-based testing

mod common;

use std::collections::BTreeSet;

use annot_core::{
    expand_article, expand_articles, AnnotationKey, ArticleRecord, CodedIndex, CodingStatus,
    DashboardQuery, GroupView, SortKey, StatusFilter,
};
use common::fixtures::load_catalog;
use proptest::prelude::*;
use rstest::rstest;

fn coded(keys: &[(&str, u32)]) -> CodedIndex {
    CodedIndex::new(
        keys.iter()
            .map(|(index, n)| AnnotationKey::new(*index, *n))
            .collect(),
    )
}

// === Catalog ===

#[test]
fn test_catalog_groups_and_skips() {
    let catalog = load_catalog();

    let names: Vec<&str> = catalog.groups.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["language", "syntax"]);
    assert_eq!(catalog.warnings.len(), 1);
    assert!(catalog.warnings[0].contains("broken"));
}

#[test]
fn test_catalog_excludes_and_derives() {
    let catalog = load_catalog();
    let language = catalog.group("language").unwrap();

    let indexes: Vec<&str> = language
        .articles
        .iter()
        .map(|a| a.article_index.as_str())
        .collect();
    assert_eq!(
        indexes,
        vec![
            "Doe, Smith_2020_a_quick_brown",
            "Roe_2018_island_constraints_revisited"
        ]
    );
    assert_eq!(language.articles[0].n_experiments, 2);
    assert_eq!(language.articles[1].n_experiments, 1);

    let binding = catalog.article("poe_2021_binding").unwrap();
    assert_eq!(binding.n_experiments, 3);
    assert_eq!(binding.searchterms, "binding");
    assert_eq!(binding.journal, "syntax");
}

#[test]
fn test_missing_catalog_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = annot_core::Catalog::load(dir.path().join("nope"));
    assert!(catalog.is_empty());
    assert_eq!(catalog.warnings.len(), 1);
}

// === Dashboard ===

#[test]
fn test_group_view_counts() {
    let catalog = load_catalog();
    let language = catalog.group("language").unwrap();
    let view = GroupView::build(
        language,
        &coded(&[("Doe, Smith_2020_a_quick_brown", 2)]),
        &DashboardQuery::default(),
    );

    assert_eq!(view.rows.len(), 3);
    assert_eq!(view.summary.coded, 1);
    assert_eq!(view.summary.total, 2);
}

#[test]
fn test_coded_filter_matches_store_articles() {
    let catalog = load_catalog();
    let index = coded(&[("poe_2021_binding", 3), ("Roe_2018_island_constraints_revisited", 1)]);
    let coded_articles: BTreeSet<&str> = index.articles();

    let query = DashboardQuery {
        status: StatusFilter::Coded,
        ..Default::default()
    };
    let rows: Vec<_> = catalog
        .groups
        .iter()
        .flat_map(|g| query.apply(expand_articles(&g.articles, &index)))
        .collect();

    assert_eq!(rows.len(), 4);
    assert!(rows
        .iter()
        .all(|r| coded_articles.contains(r.article.article_index.as_str())));

    let entry_flags: Vec<bool> = rows
        .iter()
        .filter(|r| r.article.article_index == "poe_2021_binding")
        .map(|r| r.entry_coded)
        .collect();
    assert_eq!(entry_flags, vec![false, false, true]);
}

#[rstest]
#[case(SortKey::Date, false, vec!["roe", "doe", "poe"])]
#[case(SortKey::Date, true, vec!["poe", "doe", "roe"])]
#[case(SortKey::Author, false, vec!["poe", "doe", "roe"])]
#[case(SortKey::Title, false, vec!["doe", "poe", "roe"])]
fn test_sort_orders(#[case] sort: SortKey, #[case] descending: bool, #[case] expected: Vec<&str>) {
    let articles = vec![
        ArticleRecord::new("doe", "Agreement", "Jane Doe", "2020"),
        ArticleRecord::new("roe", "Islands", "Rick Roe", "2018"),
        ArticleRecord::new("poe", "Binding", "Ed Poe", "2021"),
    ];
    let query = DashboardQuery {
        sort,
        descending,
        ..Default::default()
    };
    let rows = query.apply(expand_articles(&articles, &CodedIndex::default()));
    let order: Vec<&str> = rows.iter().map(|r| r.article.article_index.as_str()).collect();
    assert_eq!(order, expected);
}

// === Properties ===

proptest! {
    #[test]
    fn test_expansion_yields_k_rows(k in 1u32..60) {
        let mut article = ArticleRecord::new("idx", "Title", "Jane Doe", "2020");
        article.n_experiments = k;
        let rows = expand_article(&article, &CodedIndex::default());

        prop_assert_eq!(rows.len(), k as usize);
        for (i, row) in rows.iter().enumerate() {
            prop_assert_eq!(row.experiment_number, i as u32 + 1);
            prop_assert_eq!(&row.article, &article);
            prop_assert_eq!(row.status, CodingStatus::NotCoded);
        }
    }

    #[test]
    fn test_search_is_case_insensitive_substring(
        title in "[a-z]{8,16}",
        start in 0usize..4,
        len in 1usize..4,
    ) {
        let articles = vec![
            ArticleRecord::new("target_idx", &title, "Jane Doe", "2020"),
            ArticleRecord::new("other_idx", "0000", "Rick Roe", "2019"),
        ];
        let needle = title[start..start + len].to_uppercase();
        let query = DashboardQuery {
            search: Some(needle),
            ..Default::default()
        };

        let rows = query.apply(expand_articles(&articles, &CodedIndex::default()));
        prop_assert!(rows.iter().any(|r| r.article.article_index == "target_idx"));
    }

    #[test]
    fn test_search_without_match_is_empty(needle in "[0-9]{6}") {
        let articles = vec![ArticleRecord::new("abc", "Islands", "Jane Doe", "2020")];
        let query = DashboardQuery {
            search: Some(needle),
            ..Default::default()
        };
        prop_assert!(query.apply(expand_articles(&articles, &CodedIndex::default())).is_empty());
    }
}
