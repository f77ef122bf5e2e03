//! Form controls, one per codebook field

use serde::{Deserialize, Serialize};

use crate::annotation::FieldValue;
use crate::codebook::FieldKind;
use crate::error::FormError;
use crate::text::split_list;

/// Editable state of a single control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Control {
    /// Any subset of `options`, kept in option order
    MultiSelect {
        options: Vec<String>,
        selected: Vec<String>,
    },
    /// One of `options`, or the empty choice (`None`)
    SingleChoice {
        options: Vec<String>,
        selected: Option<String>,
    },
    /// Multi-line text
    TextArea { value: String },
    /// Single-line text
    TextInput { value: String },
}

/// A labelled control bound to a codebook code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormControl {
    pub code: String,
    pub label: String,
    pub help: Option<String>,
    pub control: Control,
}

impl FormControl {
    pub fn kind(&self) -> FieldKind {
        match self.control {
            Control::MultiSelect { .. } => FieldKind::MultiSelect,
            Control::SingleChoice { .. } => FieldKind::SingleChoice,
            Control::TextArea { .. } => FieldKind::LongText,
            Control::TextInput { .. } => FieldKind::Text,
        }
    }

    /// Current value in typed form.
    pub fn value(&self) -> FieldValue {
        match &self.control {
            Control::MultiSelect { selected, .. } => FieldValue::MultiChoice(selected.clone()),
            Control::SingleChoice { selected, .. } => FieldValue::Choice(selected.clone()),
            Control::TextArea { value } | Control::TextInput { value } => {
                FieldValue::Text(value.clone())
            }
        }
    }

    /// Choices offered by a single-choice control: the empty choice first,
    /// then the options.
    pub fn choices(&self) -> Vec<&str> {
        match &self.control {
            Control::SingleChoice { options, .. } => std::iter::once("")
                .chain(options.iter().map(String::as_str))
                .collect(),
            Control::MultiSelect { options, .. } => options.iter().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// Replace the value. Choice values must be among the options.
    pub fn set(&mut self, value: FieldValue) -> Result<(), FormError> {
        let code = self.code.clone();
        let invalid = |value: &str| FormError::InvalidOption {
            code: code.clone(),
            value: value.to_string(),
        };

        match (&mut self.control, value) {
            (Control::MultiSelect { options, selected }, FieldValue::MultiChoice(items)) => {
                if let Some(bad) = items.iter().find(|i| !options.contains(*i)) {
                    return Err(invalid(bad));
                }
                *selected = options
                    .iter()
                    .filter(|o| items.contains(*o))
                    .cloned()
                    .collect();
            }
            (Control::SingleChoice { options, selected }, FieldValue::Choice(choice)) => {
                match choice {
                    Some(c) if !options.contains(&c) => return Err(invalid(&c)),
                    other => *selected = other,
                }
            }
            (Control::TextArea { value } | Control::TextInput { value }, FieldValue::Text(text)) => {
                *value = text;
            }
            (_, other) => return Err(invalid(&other.to_stored())),
        }
        Ok(())
    }

    /// Set from raw text, parsed according to the control kind.
    pub fn set_from_str(&mut self, raw: &str) -> Result<(), FormError> {
        let value = match self.kind() {
            FieldKind::MultiSelect => FieldValue::MultiChoice(split_list(raw)),
            kind => FieldValue::from_stored(kind, raw),
        };
        self.set(value)
    }

    /// Reset to the empty value.
    pub fn clear(&mut self) {
        match &mut self.control {
            Control::MultiSelect { selected, .. } => selected.clear(),
            Control::SingleChoice { selected, .. } => *selected = None,
            Control::TextArea { value } | Control::TextInput { value } => value.clear(),
        }
    }
}
