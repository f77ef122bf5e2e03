//! Codebook: the schema that drives the coding form and the stored record
//!
//! A codebook is a CSV table with the columns
//! `section, code, description, help, default, values, checkall`.
//! It is validated once when loaded and never mutated afterwards.

mod field;
mod loader;

pub use field::{CodebookField, FieldKind};

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::CodebookError;

/// One line of the codebook listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSummary {
    pub code: String,
    pub label: String,
    pub kind: FieldKind,
    pub options: Vec<String>,
}

/// Validated, in-memory codebook.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Codebook {
    fields: Vec<CodebookField>,
    by_code: HashMap<String, usize>,
    /// Section name -> codes, both in file order
    sections: Vec<(String, Vec<String>)>,
}

impl Codebook {
    /// An empty codebook (zero fields).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a codebook from fields in file order.
    ///
    /// Fails on a duplicate code.
    pub fn from_fields(fields: Vec<CodebookField>) -> Result<Self, CodebookError> {
        let mut codebook = Self::default();
        for field in fields {
            codebook.push(field)?;
        }
        Ok(codebook)
    }

    fn push(&mut self, field: CodebookField) -> Result<(), CodebookError> {
        if self.by_code.contains_key(&field.code) {
            return Err(CodebookError::DuplicateCode(field.code));
        }

        match self.sections.iter_mut().find(|(s, _)| *s == field.section) {
            Some((_, codes)) => codes.push(field.code.clone()),
            None => self
                .sections
                .push((field.section.clone(), vec![field.code.clone()])),
        }

        self.by_code.insert(field.code.clone(), self.fields.len());
        self.fields.push(field);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// All fields in file order.
    pub fn fields(&self) -> &[CodebookField] {
        &self.fields
    }

    pub fn field(&self, code: &str) -> Option<&CodebookField> {
        self.by_code.get(code).map(|&i| &self.fields[i])
    }

    pub fn contains(&self, code: &str) -> bool {
        self.by_code.contains_key(code)
    }

    /// All codes in file order.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.code.as_str())
    }

    /// Sections with their codes, in first-appearance order.
    pub fn sections(&self) -> &[(String, Vec<String>)] {
        &self.sections
    }

    /// Label for a code; falls back to the title-cased code.
    pub fn description(&self, code: &str) -> Option<String> {
        self.field(code).map(CodebookField::label)
    }

    pub fn help(&self, code: &str) -> Option<&str> {
        self.field(code).and_then(|f| f.help.as_deref())
    }

    pub fn default_value(&self, code: &str) -> Option<&str> {
        self.field(code).and_then(|f| f.default.as_deref())
    }

    pub fn allowed_values(&self, code: &str) -> Option<&[String]> {
        self.field(code).and_then(|f| f.allowed_values.as_deref())
    }

    pub fn is_multi_select(&self, code: &str) -> bool {
        self.field(code).is_some_and(|f| f.is_multi_select)
    }

    /// Codes flagged "select all that apply".
    pub fn multi_select_codes(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|f| f.is_multi_select)
            .map(|f| f.code.as_str())
    }

    /// Section-by-section listing of every field.
    pub fn listing(&self, long_text_fields: &[String]) -> Vec<(String, Vec<FieldSummary>)> {
        self.sections
            .iter()
            .map(|(section, codes)| {
                let fields = codes
                    .iter()
                    .filter_map(|code| self.field(code))
                    .map(|f| FieldSummary {
                        code: f.code.clone(),
                        label: f.label(),
                        kind: f.kind(long_text_fields),
                        options: f.options().to_vec(),
                    })
                    .collect();
                (section.clone(), fields)
            })
            .collect()
    }
}
