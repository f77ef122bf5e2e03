//! Interaction boundary
//!
//! `Annotator` owns the codebook, catalog, store and coded-index cache, and
//! performs one user action per call. Failures never escape as errors:
//! each action reports a [`Notice`] and leaves the caller's form untouched,
//! so input survives a failed submit.

use std::path::PathBuf;

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::annotation::{AnnotationKey, AnnotationRecord, ArticleMetadata};
use crate::cache::CodedIndexCache;
use crate::catalog::Catalog;
use crate::codebook::{Codebook, FieldSummary};
use crate::config::AnnotConfig;
use crate::dashboard::{expand_article, CodedIndex, DashboardQuery, ExpandedRow, GroupView};
use crate::error::{Result, SessionError, StoreError};
use crate::export::{export_csv, NO_ANNOTATIONS};
use crate::form::{EntryMode, FormModel, FormSettings};
use crate::persistence::{AnnotationStore, SqliteAnnotationStore};
use crate::session::{Mode, Session, View};

/// Severity of a user-visible message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoticeLevel::Success => write!(f, "success"),
            NoticeLevel::Info => write!(f, "info"),
            NoticeLevel::Warning => write!(f, "warning"),
            NoticeLevel::Error => write!(f, "error"),
        }
    }
}

/// A message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, message)
    }

    pub fn is_success(&self) -> bool {
        self.level == NoticeLevel::Success
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.level, self.message)
    }
}

/// Dashboard listing for every group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardPage {
    pub groups: Vec<GroupView>,
    /// Set when the coded index could not be read
    pub notice: Option<Notice>,
}

/// Owns the loaded data and performs user actions.
pub struct Annotator {
    codebook: Codebook,
    catalog: Catalog,
    store: Box<dyn AnnotationStore>,
    cache: CodedIndexCache,
    settings: FormSettings,
    export_dir: PathBuf,
}

impl Annotator {
    pub fn new(
        codebook: Codebook,
        catalog: Catalog,
        store: Box<dyn AnnotationStore>,
        config: &AnnotConfig,
    ) -> Self {
        Self {
            codebook,
            catalog,
            store,
            cache: CodedIndexCache::new(),
            settings: config.form_settings(),
            export_dir: config.export_dir.clone(),
        }
    }

    /// Load everything named by the configuration.
    ///
    /// Fails only when the codebook is structurally invalid or the store
    /// cannot be opened. A missing codebook or catalog degrades to empty
    /// data; see [`Annotator::startup_notices`].
    pub fn open(config: &AnnotConfig) -> Result<Self> {
        config.validate()?;
        let codebook = Codebook::load(&config.codebook_path)?;
        let catalog = Catalog::load(&config.catalog_path);
        let store = SqliteAnnotationStore::open(&config.database_path)?;
        Ok(Self::new(codebook, catalog, Box::new(store), config))
    }

    /// Warnings collected while loading.
    pub fn startup_notices(&self) -> Vec<Notice> {
        let mut notices: Vec<Notice> = self
            .catalog
            .warnings
            .iter()
            .map(|w| Notice::warning(w.clone()))
            .collect();
        if self.codebook.is_empty() {
            notices.push(Notice::warning("The codebook has no fields."));
        }
        notices
    }

    pub fn codebook(&self) -> &Codebook {
        &self.codebook
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn settings(&self) -> &FormSettings {
        &self.settings
    }

    /// Section-by-section codebook listing.
    pub fn codebook_listing(&self) -> Vec<(String, Vec<FieldSummary>)> {
        self.codebook.listing(&self.settings.long_text_fields)
    }

    fn coded_index(&mut self) -> std::result::Result<CodedIndex, StoreError> {
        self.cache.get(self.store.as_ref()).cloned()
    }

    /// List every group under `query`.
    pub fn dashboard(&mut self, query: &DashboardQuery) -> DashboardPage {
        let (coded, notice) = match self.coded_index() {
            Ok(index) => (index, None),
            Err(e) => {
                tracing::warn!("Cannot read coded entries: {}", e);
                (
                    CodedIndex::default(),
                    Some(Notice::error(format!("Could not read annotations: {}", e))),
                )
            }
        };

        let groups = self
            .catalog
            .groups
            .iter()
            .map(|group| GroupView::build(group, &coded, query))
            .collect();
        DashboardPage { groups, notice }
    }

    /// Dashboard row for a key, with current coding flags.
    pub fn find_row(&mut self, key: &AnnotationKey) -> Option<ExpandedRow> {
        let coded = self.coded_index().unwrap_or_else(|e| {
            tracing::warn!("Cannot read coded entries for {}: {}", key, e);
            CodedIndex::default()
        });
        let article = self.catalog.article(&key.article_index)?;
        expand_article(article, &coded)
            .into_iter()
            .find(|row| row.experiment_number == key.experiment_number)
    }

    /// Build the form for the session's current view.
    pub fn open_entry(&self, session: &Session) -> std::result::Result<FormModel, Notice> {
        match session.view() {
            View::Dashboard => Err(Notice::warning(SessionError::NoOpenEntry.to_string())),
            View::Halted { warning } => Err(Notice::warning(warning)),
            View::Entry {
                mode: Mode::ReviewEntry,
                selection: Some(row),
            } => self.review_form(&row.key()),
            View::Entry {
                selection: Some(row),
                ..
            } => Ok(FormModel::for_new_entry(&self.codebook, &self.settings, row)),
            View::Entry { selection: None, .. } => Ok(FormModel::build(
                &self.codebook,
                &self.settings,
                EntryMode::Add,
                ArticleMetadata::default(),
                1,
                None,
            )),
        }
    }

    /// Form prefilled from the stored record for `key`.
    pub fn review_form(&self, key: &AnnotationKey) -> std::result::Result<FormModel, Notice> {
        match self.store.get(key) {
            Ok(Some(record)) => Ok(FormModel::for_review(&self.codebook, &self.settings, &record)),
            Ok(None) => Err(Notice::warning(format!(
                "Could not find annotation for {} in database.",
                key
            ))),
            Err(e) => Err(Notice::error(format!("Could not read annotation: {}", e))),
        }
    }

    /// Save the form: insert for new entries, update for reviewed ones.
    /// The cache is invalidated after every successful write.
    pub fn submit(&mut self, form: &FormModel) -> Notice {
        let record = form.collect();
        let key = form.key();
        if key.article_index.trim().is_empty() {
            return Notice::error("An article index is required.");
        }

        let result = match form.mode() {
            EntryMode::Add => self.store.insert(&record),
            EntryMode::Review => self.store.update(&key, &record),
        };

        match result {
            Ok(()) => {
                self.cache.invalidate();
                tracing::info!("Saved annotation {}", key);
                match form.mode() {
                    EntryMode::Add => Notice::success(format!("Annotation added for {}.", key)),
                    EntryMode::Review => {
                        Notice::success(format!("Annotation updated for {}.", key))
                    }
                }
            }
            Err(e) => {
                tracing::warn!("Failed to save annotation {}: {}", key, e);
                Notice::error(match e {
                    StoreError::NotFound(_) => format!("{}. Nothing was saved.", e),
                    StoreError::AlreadyExists(_) => {
                        format!("{}. Open it for review to change it.", e)
                    }
                    StoreError::Storage(_) => format!("Could not save: {}", e),
                })
            }
        }
    }

    /// All stored records, in insertion order.
    pub fn records(&self) -> std::result::Result<Vec<AnnotationRecord>, Notice> {
        self.store
            .get_all()
            .map_err(|e| Notice::error(format!("Could not read annotations: {}", e)))
    }

    /// Export the store as a timestamped CSV in the export directory.
    pub fn export(&self) -> Notice {
        let records = match self.records() {
            Ok(records) => records,
            Err(notice) => return notice,
        };
        match export_csv(&self.export_dir, &records, &self.codebook, Local::now()) {
            Ok(Some(path)) => Notice::success(format!(
                "Exported {} annotations to {}",
                records.len(),
                path.display()
            )),
            Ok(None) => Notice::info(NO_ANNOTATIONS),
            Err(e) => Notice::error(format!("Export failed: {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ArticleGroup, ArticleRecord};
    use crate::codebook::CodebookField;
    use crate::dashboard::StatusFilter;

    fn annotator(export_dir: PathBuf) -> Annotator {
        let mut task = CodebookField::text("task", "Design");
        task.allowed_values = Some(vec!["Likert".into(), "Magnitude".into()]);
        let codebook = Codebook::from_fields(vec![task]).unwrap();

        let mut article = ArticleRecord::new("doe_2020", "Islands", "Jane Doe", "2020");
        article.n_experiments = 2;
        let catalog = Catalog::new(vec![ArticleGroup {
            name: "Language".into(),
            articles: vec![article],
        }]);

        let store = SqliteAnnotationStore::open_in_memory().unwrap();
        let config = AnnotConfig {
            export_dir,
            ..AnnotConfig::default()
        };
        Annotator::new(codebook, catalog, Box::new(store), &config)
    }

    struct UnreadableStore;

    impl AnnotationStore for UnreadableStore {
        fn get_all(&self) -> std::result::Result<Vec<AnnotationRecord>, StoreError> {
            Err(StoreError::Storage("disk I/O error".into()))
        }

        fn get(
            &self,
            _: &AnnotationKey,
        ) -> std::result::Result<Option<AnnotationRecord>, StoreError> {
            Err(StoreError::Storage("disk I/O error".into()))
        }

        fn insert(&self, _: &AnnotationRecord) -> std::result::Result<(), StoreError> {
            Err(StoreError::Storage("disk I/O error".into()))
        }

        fn update(
            &self,
            _: &AnnotationKey,
            _: &AnnotationRecord,
        ) -> std::result::Result<(), StoreError> {
            Err(StoreError::Storage("disk I/O error".into()))
        }
    }

    #[test]
    fn test_unreadable_store_degrades() {
        let dir = tempfile::tempdir().unwrap();
        let base = annotator(dir.path().to_path_buf());
        let config = AnnotConfig {
            export_dir: dir.path().to_path_buf(),
            ..AnnotConfig::default()
        };
        let mut annotator = Annotator::new(
            base.codebook.clone(),
            base.catalog.clone(),
            Box::new(UnreadableStore),
            &config,
        );

        let row = annotator.find_row(&AnnotationKey::new("doe_2020", 1)).unwrap();
        assert!(!row.entry_coded);

        let page = annotator.dashboard(&DashboardQuery::default());
        assert_eq!(page.notice.map(|n| n.level), Some(NoticeLevel::Error));
        assert_eq!(page.groups[0].rows.len(), 2);
    }

    #[test]
    fn test_add_then_review_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let mut annotator = annotator(dir.path().to_path_buf());
        let mut session = Session::new();

        let row = annotator.find_row(&AnnotationKey::new("doe_2020", 2)).unwrap();
        assert_eq!(session.select(row).unwrap(), Mode::AddEntry);

        let mut form = annotator.open_entry(&session).unwrap();
        form.set_from_str("task", "Magnitude").unwrap();
        assert!(annotator.submit(&form).is_success());
        session.return_to_dashboard().unwrap();

        let coded = DashboardQuery {
            status: StatusFilter::Coded,
            ..Default::default()
        };
        let page = annotator.dashboard(&coded);
        assert_eq!(page.groups[0].rows.len(), 2);
        assert_eq!(page.groups[0].summary.coded, 1);

        let row = annotator.find_row(&AnnotationKey::new("doe_2020", 2)).unwrap();
        assert!(row.entry_coded);
        assert_eq!(session.select(row).unwrap(), Mode::ReviewEntry);
        let form = annotator.open_entry(&session).unwrap();
        assert_eq!(form.collect().value("task"), "Magnitude");
    }

    #[test]
    fn test_duplicate_insert_reports_error_and_keeps_form() {
        let dir = tempfile::tempdir().unwrap();
        let mut annotator = annotator(dir.path().to_path_buf());
        let row = annotator.find_row(&AnnotationKey::new("doe_2020", 1)).unwrap();
        let mut form = FormModel::for_new_entry(annotator.codebook(), annotator.settings(), &row);
        form.set_from_str("task", "Likert").unwrap();

        assert!(annotator.submit(&form).is_success());
        let notice = annotator.submit(&form);
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(form.value("task").unwrap().to_stored(), "Likert");
    }

    #[test]
    fn test_review_without_selection_warns() {
        let dir = tempfile::tempdir().unwrap();
        let annotator = annotator(dir.path().to_path_buf());
        let session = Session::from_query(Some("Review Entry"));
        let notice = annotator.open_entry(&session).unwrap_err();
        assert_eq!(notice.level, NoticeLevel::Warning);
        assert_eq!(notice.message, "No article selected for review.");
    }

    #[test]
    fn test_export_empty_and_filled() {
        let dir = tempfile::tempdir().unwrap();
        let mut annotator = annotator(dir.path().to_path_buf());
        assert_eq!(annotator.export(), Notice::info(NO_ANNOTATIONS));

        let row = annotator.find_row(&AnnotationKey::new("doe_2020", 1)).unwrap();
        let form = FormModel::for_new_entry(annotator.codebook(), annotator.settings(), &row);
        annotator.submit(&form);
        assert!(annotator.export().is_success());
    }
}
