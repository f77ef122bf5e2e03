//! Codebook field definitions

use serde::{Deserialize, Serialize};

use crate::text::title_case;

/// One annotatable field, as declared by a codebook row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodebookField {
    /// Unique identifier, also the storage key
    pub code: String,
    /// Form section the field is rendered under
    pub section: String,
    pub description: Option<String>,
    pub help: Option<String>,
    /// Only kept when it is one of `allowed_values` (or the field is free text)
    pub default: Option<String>,
    /// `None` means free text
    pub allowed_values: Option<Vec<String>>,
    /// "Select all that apply"
    pub is_multi_select: bool,
}

/// How a field is edited, derived from its codebook row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    /// Any subset of the allowed values
    MultiSelect,
    /// One of the allowed values, or nothing
    SingleChoice,
    /// Multi-line free text
    LongText,
    /// Single-line free text
    Text,
}

impl CodebookField {
    /// Create a free-text field with no description, help, or default.
    pub fn text(code: impl Into<String>, section: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            section: section.into(),
            description: None,
            help: None,
            default: None,
            allowed_values: None,
            is_multi_select: false,
        }
    }

    /// Display label: the description, or the code with underscores
    /// replaced by spaces and title-cased.
    pub fn label(&self) -> String {
        match &self.description {
            Some(d) => d.clone(),
            None => title_case(&self.code.replace('_', " ")),
        }
    }

    /// Control kind for this field. `long_text_fields` lists the codes
    /// edited as multi-line text.
    pub fn kind(&self, long_text_fields: &[String]) -> FieldKind {
        if self.is_multi_select {
            FieldKind::MultiSelect
        } else if self.allowed_values.is_some() {
            FieldKind::SingleChoice
        } else if long_text_fields.iter().any(|c| c == &self.code) {
            FieldKind::LongText
        } else {
            FieldKind::Text
        }
    }

    /// Allowed values, empty for free-text fields.
    pub fn options(&self) -> &[String] {
        self.allowed_values.as_deref().unwrap_or(&[])
    }

    /// Whether `value` is one of the allowed values.
    pub fn allows(&self, value: &str) -> bool {
        self.options().iter().any(|v| v == value)
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldKind::MultiSelect => write!(f, "multi-select"),
            FieldKind::SingleChoice => write!(f, "choice"),
            FieldKind::LongText => write!(f, "long text"),
            FieldKind::Text => write!(f, "text"),
        }
    }
}
