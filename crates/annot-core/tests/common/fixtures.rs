//! Test fixture loading utilities

use std::path::PathBuf;

use annot_core::{AnnotConfig, Catalog, Codebook};
use tempfile::TempDir;

/// Get the path to a fixture file
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("test_fixtures")
        .join(name)
}

/// The fixture codebook: task (choice), n_participants (text),
/// evidence (multi-select), instructions and coder_comments (long text)
#[allow(dead_code)]
pub fn load_codebook() -> Codebook {
    Codebook::load(fixture_path("codebook.csv")).expect("fixture codebook loads")
}

/// The fixture catalog: groups `language` and `syntax`; `broken` is skipped
#[allow(dead_code)]
pub fn load_catalog() -> Catalog {
    Catalog::load(fixture_path("articles"))
}

/// Config using the fixture codebook and catalog, with the database and
/// exports in a fresh temporary directory. Keep the `TempDir` alive for
/// the duration of the test.
#[allow(dead_code)]
pub fn temp_config() -> (TempDir, AnnotConfig) {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = AnnotConfig {
        codebook_path: fixture_path("codebook.csv"),
        catalog_path: fixture_path("articles"),
        database_path: dir.path().join("annotations.db"),
        export_dir: dir.path().join("exports"),
        ..AnnotConfig::default()
    };
    (dir, config)
}
