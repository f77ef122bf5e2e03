//! Configuration for annot
//!
//! Paths to the codebook, the article catalog, the annotation database and
//! the export directory, plus form-building options. Loaded from TOML.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::form::FormSettings;

/// Config file looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "annot.toml";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotConfig {
    /// Codebook CSV
    pub codebook_path: PathBuf,
    /// Directory of group CSVs, or a single CSV
    pub catalog_path: PathBuf,
    /// SQLite annotation database
    pub database_path: PathBuf,
    /// Where exports are written
    pub export_dir: PathBuf,
    /// Codes edited as multi-line text
    pub long_text_fields: Vec<String>,
    /// Initial multi-select selection for entries with nothing stored
    pub multi_select_fallback: Vec<String>,
}

impl Default for AnnotConfig {
    fn default() -> Self {
        let form = FormSettings::default();
        Self {
            codebook_path: PathBuf::from("codebook_for_app.csv"),
            catalog_path: PathBuf::from("articles"),
            database_path: PathBuf::from("annotations.db"),
            export_dir: PathBuf::from("."),
            long_text_fields: form.long_text_fields,
            multi_select_fallback: form.multi_select_fallback,
        }
    }
}

impl AnnotConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize configuration to TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load configuration from a JSON string
    pub fn from_json(json_str: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json_str)
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Read a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&text)
    }

    /// User-level config file: `<config dir>/annot/config.toml`.
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("annot").join("config.toml"))
    }

    /// Resolve configuration: the explicit path if given, else `annot.toml`
    /// in the working directory, else the user config file, else defaults.
    ///
    /// An explicit path that does not exist is an error; the implicit
    /// locations are simply skipped.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let candidates = std::iter::once(PathBuf::from(LOCAL_CONFIG_FILE))
            .chain(Self::user_config_path());
        for candidate in candidates {
            if candidate.is_file() {
                tracing::info!("Using config {}", candidate.display());
                return Self::from_file(&candidate);
            }
        }

        tracing::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let paths = [
            ("codebook_path", &self.codebook_path),
            ("catalog_path", &self.catalog_path),
            ("database_path", &self.database_path),
            ("export_dir", &self.export_dir),
        ];
        for (name, path) in paths {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::MissingField(name.to_string()));
            }
        }
        Ok(())
    }

    pub fn form_settings(&self) -> FormSettings {
        FormSettings {
            long_text_fields: self.long_text_fields.clone(),
            multi_select_fallback: self.multi_select_fallback.clone(),
        }
    }
}
