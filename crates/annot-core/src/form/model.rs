//! Form model: codebook-driven controls plus the entry's metadata

use serde::{Deserialize, Serialize};

use super::control::{Control, FormControl};
use crate::annotation::{AnnotationKey, AnnotationRecord, ArticleMetadata, FieldValue};
use crate::catalog::abbreviate_authors;
use crate::codebook::{Codebook, CodebookField, FieldKind};
use crate::dashboard::ExpandedRow;
use crate::error::FormError;
use crate::text::split_list;

/// Form-building options taken from the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSettings {
    /// Codes edited as multi-line text
    pub long_text_fields: Vec<String>,
    /// Initial multi-select selection when nothing is stored
    pub multi_select_fallback: Vec<String>,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            long_text_fields: vec!["instructions".into(), "coder_comments".into()],
            multi_select_fallback: vec!["Not Reported".into()],
        }
    }
}

/// Whether the form creates a record or edits a stored one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryMode {
    Add,
    Review,
}

/// Controls grouped under one codebook section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSection {
    pub title: String,
    pub controls: Vec<FormControl>,
}

/// Editable state of one annotation entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormModel {
    mode: EntryMode,
    metadata: ArticleMetadata,
    experiment_number: u32,
    sections: Vec<FormSection>,
    clear_pending: bool,
}

impl FormModel {
    /// Build the form for `metadata`/`experiment_number`, prefilled from
    /// `prefill` when a stored record exists.
    pub fn build(
        codebook: &Codebook,
        settings: &FormSettings,
        mode: EntryMode,
        metadata: ArticleMetadata,
        experiment_number: u32,
        prefill: Option<&AnnotationRecord>,
    ) -> Self {
        let sections = codebook
            .sections()
            .iter()
            .map(|(title, codes)| FormSection {
                title: title.clone(),
                controls: codes
                    .iter()
                    .filter_map(|code| codebook.field(code))
                    .map(|field| build_control(field, settings, prefill))
                    .collect(),
            })
            .collect();

        Self {
            mode,
            metadata,
            experiment_number,
            sections,
            clear_pending: false,
        }
    }

    /// Empty form for a dashboard row that has no record yet.
    pub fn for_new_entry(codebook: &Codebook, settings: &FormSettings, row: &ExpandedRow) -> Self {
        Self::build(
            codebook,
            settings,
            EntryMode::Add,
            row.metadata(),
            row.experiment_number,
            None,
        )
    }

    /// Form prefilled from a stored record.
    pub fn for_review(
        codebook: &Codebook,
        settings: &FormSettings,
        record: &AnnotationRecord,
    ) -> Self {
        Self::build(
            codebook,
            settings,
            EntryMode::Review,
            record.metadata.clone(),
            record.experiment_number,
            Some(record),
        )
    }

    pub fn mode(&self) -> EntryMode {
        self.mode
    }

    pub fn metadata(&self) -> &ArticleMetadata {
        &self.metadata
    }

    pub fn experiment_number(&self) -> u32 {
        self.experiment_number
    }

    pub fn key(&self) -> AnnotationKey {
        AnnotationKey::new(self.metadata.article_index.clone(), self.experiment_number)
    }

    pub fn sections(&self) -> &[FormSection] {
        &self.sections
    }

    pub fn heading(&self) -> String {
        match self.mode {
            EntryMode::Add => {
                let authors = self.metadata.authors.trim();
                let year = self.metadata.year.trim();
                if authors.is_empty() || year.is_empty() {
                    "Add New Annotation".to_string()
                } else {
                    format!(
                        "Add New Annotation — {} ({})",
                        abbreviate_authors(Some(authors)),
                        year
                    )
                }
            }
            EntryMode::Review => format!("Update Annotation — {}", self.metadata.article_index),
        }
    }

    pub fn control(&self, code: &str) -> Option<&FormControl> {
        self.controls().find(|c| c.code == code)
    }

    fn control_mut(&mut self, code: &str) -> Result<&mut FormControl, FormError> {
        self.sections
            .iter_mut()
            .flat_map(|s| s.controls.iter_mut())
            .find(|c| c.code == code)
            .ok_or_else(|| FormError::UnknownField(code.to_string()))
    }

    /// All controls in codebook order.
    pub fn controls(&self) -> impl Iterator<Item = &FormControl> {
        self.sections.iter().flat_map(|s| s.controls.iter())
    }

    pub fn value(&self, code: &str) -> Option<FieldValue> {
        self.control(code).map(FormControl::value)
    }

    pub fn set_value(&mut self, code: &str, value: FieldValue) -> Result<(), FormError> {
        self.control_mut(code)?.set(value)
    }

    /// Set a value from raw text (multi-select values separated by `;`).
    pub fn set_from_str(&mut self, code: &str, raw: &str) -> Result<(), FormError> {
        self.control_mut(code)?.set_from_str(raw)
    }

    /// Edit a metadata column. The article index is fixed once a record
    /// exists.
    pub fn set_metadata(&mut self, name: &str, value: &str) -> Result<(), FormError> {
        if name == "article_index" && self.mode == EntryMode::Review {
            return Err(FormError::ReadOnly(name.to_string()));
        }
        let slot = self
            .metadata
            .get_mut(name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))?;
        *slot = value.to_string();
        Ok(())
    }

    /// Arm "clear annotation fields"; nothing changes until confirmed.
    pub fn request_clear(&mut self) {
        self.clear_pending = true;
    }

    pub fn cancel_clear(&mut self) {
        self.clear_pending = false;
    }

    pub fn is_clear_pending(&self) -> bool {
        self.clear_pending
    }

    /// Empty every codebook control, keeping metadata. Returns whether a
    /// clear was armed.
    pub fn confirm_clear(&mut self) -> bool {
        if !self.clear_pending {
            return false;
        }
        self.sections
            .iter_mut()
            .flat_map(|s| s.controls.iter_mut())
            .for_each(FormControl::clear);
        self.clear_pending = false;
        true
    }

    /// The record to submit: metadata plus one stored string per code.
    pub fn collect(&self) -> AnnotationRecord {
        let mut record = AnnotationRecord::new(self.metadata.clone(), self.experiment_number);
        for control in self.controls() {
            record.set(control.code.clone(), control.value().to_stored());
        }
        record
    }
}

fn build_control(
    field: &CodebookField,
    settings: &FormSettings,
    prefill: Option<&AnnotationRecord>,
) -> FormControl {
    // A code present in the record is used as stored, even when empty;
    // only missing codes fall back to the codebook default.
    let present = prefill.and_then(|r| r.values.get(&field.code)).map(String::as_str);
    let stored = present.map(str::trim).filter(|v| !v.is_empty());
    let default = field.default.as_deref().filter(|d| !d.trim().is_empty());

    let control = match field.kind(&settings.long_text_fields) {
        FieldKind::MultiSelect => {
            let wanted = match stored {
                Some(value) => split_list(value),
                None => settings.multi_select_fallback.clone(),
            };
            let (selected, dropped): (Vec<String>, Vec<String>) =
                wanted.into_iter().partition(|v| field.allows(v));
            if stored.is_some() && !dropped.is_empty() {
                tracing::warn!(
                    "Dropping stored values of {} not in the codebook: {}",
                    field.code,
                    dropped.join("; ")
                );
            }
            Control::MultiSelect {
                options: field.options().to_vec(),
                selected: field
                    .options()
                    .iter()
                    .filter(|o| selected.contains(*o))
                    .cloned()
                    .collect(),
            }
        }
        FieldKind::SingleChoice => {
            if let Some(value) = stored.filter(|v| !field.allows(v)) {
                tracing::warn!("Stored value {:?} of {} is not an option", value, field.code);
            }
            let fallback = default.filter(|d| field.allows(d));
            let selected = match (present, stored) {
                (Some(_), Some(value)) if field.allows(value) => Some(value),
                (Some(_), Some(_)) => fallback,
                (Some(_), None) => None,
                (None, _) => fallback,
            }
            .map(str::to_string);
            Control::SingleChoice {
                options: field.options().to_vec(),
                selected,
            }
        }
        FieldKind::LongText => Control::TextArea {
            value: text_value(present, default),
        },
        FieldKind::Text => Control::TextInput {
            value: text_value(present, default),
        },
    };

    FormControl {
        code: field.code.clone(),
        label: field.label(),
        help: field.help.clone(),
        control,
    }
}

/// Stored text (untrimmed, possibly empty), else the codebook default.
fn text_value(present: Option<&str>, default: Option<&str>) -> String {
    present.or(default).unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ArticleRecord;
    use crate::dashboard::CodingStatus;

    fn codebook() -> Codebook {
        let mut evidence = CodebookField::text("evidence", "Results");
        evidence.allowed_values = Some(vec![
            "A".into(),
            "B".into(),
            "C".into(),
            "Not Reported".into(),
        ]);
        evidence.is_multi_select = true;

        let mut task = CodebookField::text("task", "Design");
        task.allowed_values = Some(vec!["Likert".into(), "Magnitude".into()]);
        task.default = Some("Likert".into());

        let mut n_items = CodebookField::text("n_items", "Design");
        n_items.default = Some("0".into());

        let comments = CodebookField::text("coder_comments", "Notes");

        Codebook::from_fields(vec![task, evidence, n_items, comments]).unwrap()
    }

    fn row() -> ExpandedRow {
        ExpandedRow {
            article: ArticleRecord::new("doe_2020_islands", "Islands", "Jane Doe; John Q. Smith", "2020"),
            experiment_number: 2,
            status: CodingStatus::NotCoded,
            entry_coded: false,
        }
    }

    #[test]
    fn test_new_entry_defaults() {
        let form = FormModel::for_new_entry(&codebook(), &FormSettings::default(), &row());

        let titles: Vec<_> = form.sections().iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Design", "Results", "Notes"]);

        assert_eq!(form.value("task"), Some(FieldValue::Choice(Some("Likert".into()))));
        assert_eq!(
            form.value("evidence"),
            Some(FieldValue::MultiChoice(vec!["Not Reported".into()]))
        );
        assert_eq!(form.value("n_items"), Some(FieldValue::Text("0".into())));
        assert_eq!(form.control("coder_comments").unwrap().kind(), FieldKind::LongText);
        assert_eq!(form.key(), AnnotationKey::new("doe_2020_islands", 2));
    }

    #[test]
    fn test_heading() {
        let settings = FormSettings::default();
        let form = FormModel::for_new_entry(&codebook(), &settings, &row());
        assert_eq!(form.heading(), "Add New Annotation — Doe, Smith (2020)");

        let review = FormModel::for_review(&codebook(), &settings, &form.collect());
        assert_eq!(review.heading(), "Update Annotation — doe_2020_islands");

        let mut bare = row();
        bare.article.date.clear();
        let form = FormModel::for_new_entry(&codebook(), &settings, &bare);
        assert_eq!(form.heading(), "Add New Annotation");
    }

    #[test]
    fn test_multi_select_survives_reload() {
        let codebook = codebook();
        let settings = FormSettings::default();
        let mut form = FormModel::for_new_entry(&codebook, &settings, &row());
        form.set_value(
            "evidence",
            FieldValue::MultiChoice(vec!["C".into(), "A".into()]),
        )
        .unwrap();

        let record = form.collect();
        assert_eq!(record.value("evidence"), "A; C");

        let reloaded = FormModel::for_review(&codebook, &settings, &record);
        assert_eq!(
            reloaded.value("evidence"),
            Some(FieldValue::MultiChoice(vec!["A".into(), "C".into()]))
        );
    }

    #[test]
    fn test_prefill_wins_over_default() {
        let codebook = codebook();
        let mut record = AnnotationRecord::new(row().metadata(), 2);
        record.set("task", "Magnitude");
        record.set("n_items", "24");
        record.set("evidence", "B; Retired option");

        let form = FormModel::for_review(&codebook, &FormSettings::default(), &record);
        assert_eq!(form.value("task"), Some(FieldValue::Choice(Some("Magnitude".into()))));
        assert_eq!(form.value("n_items"), Some(FieldValue::Text("24".into())));
        assert_eq!(form.value("evidence"), Some(FieldValue::MultiChoice(vec!["B".into()])));
    }

    #[test]
    fn test_invalid_stored_choice_falls_back_to_default() {
        let mut record = AnnotationRecord::new(row().metadata(), 2);
        record.set("task", "Ranking");
        let form = FormModel::for_review(&codebook(), &FormSettings::default(), &record);
        assert_eq!(form.value("task"), Some(FieldValue::Choice(Some("Likert".into()))));
    }

    #[test]
    fn test_unknown_field_and_invalid_option() {
        let mut form = FormModel::for_new_entry(&codebook(), &FormSettings::default(), &row());
        assert!(matches!(
            form.set_from_str("nope", "x"),
            Err(FormError::UnknownField(_))
        ));
        assert!(matches!(
            form.set_from_str("task", "Ranking"),
            Err(FormError::InvalidOption { .. })
        ));
    }

    #[test]
    fn test_metadata_editing() {
        let settings = FormSettings::default();
        let mut form = FormModel::for_new_entry(&codebook(), &settings, &row());
        form.set_metadata("journal", "Language").unwrap();
        form.set_metadata("article_index", "doe_2020_renamed").unwrap();
        assert_eq!(form.collect().metadata.journal, "Language");
        assert_eq!(form.key().article_index, "doe_2020_renamed");

        let mut review = FormModel::for_review(&codebook(), &settings, &form.collect());
        assert!(matches!(
            review.set_metadata("article_index", "other"),
            Err(FormError::ReadOnly(_))
        ));
        assert!(matches!(
            review.set_metadata("color", "blue"),
            Err(FormError::UnknownField(_))
        ));
    }

    #[test]
    fn test_clear_requires_confirmation() {
        let mut form = FormModel::for_new_entry(&codebook(), &FormSettings::default(), &row());
        assert!(!form.confirm_clear());

        form.request_clear();
        form.cancel_clear();
        assert!(!form.confirm_clear());
        assert_eq!(form.value("n_items"), Some(FieldValue::Text("0".into())));

        form.request_clear();
        assert!(form.confirm_clear());
        let record = form.collect();
        assert!(record.values.values().all(String::is_empty));
        assert_eq!(record.metadata.title, "Islands");
    }

    #[test]
    fn test_cleared_values_stay_empty_on_review() {
        let codebook = codebook();
        let settings = FormSettings::default();
        let mut form = FormModel::for_new_entry(&codebook, &settings, &row());
        form.request_clear();
        form.confirm_clear();
        let record = form.collect();
        assert_eq!(record.value("task"), "");

        let review = FormModel::for_review(&codebook, &settings, &record).collect();
        assert_eq!(review.value("task"), "");
        assert_eq!(review.value("n_items"), "");
        assert_eq!(review.value("coder_comments"), "");
    }

    #[test]
    fn test_missing_code_uses_default_on_review() {
        // Codes added to the codebook after the record was saved
        let record = AnnotationRecord::new(row().metadata(), 2);
        let form = FormModel::for_review(&codebook(), &FormSettings::default(), &record);
        assert_eq!(form.value("task"), Some(FieldValue::Choice(Some("Likert".into()))));
        assert_eq!(form.value("n_items"), Some(FieldValue::Text("0".into())));
    }
}
