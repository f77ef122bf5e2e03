//! Codebook CSV loading

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::{Codebook, CodebookField};
use crate::error::CodebookError;
use crate::text::{non_empty, split_list};

/// Column names, as they appear in the header row
const SECTION: &str = "section";
const CODE: &str = "code";
const DESCRIPTION: &str = "description";
const HELP: &str = "help";
const DEFAULT: &str = "default";
const VALUES: &str = "values";
const CHECKALL: &str = "checkall";

impl Codebook {
    /// Load a codebook file.
    ///
    /// A missing file yields an empty codebook, so the form shows zero
    /// fields rather than failing.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CodebookError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::warn!("Codebook not found at {:?}, using an empty codebook", path);
            return Ok(Self::empty());
        }

        let file = File::open(path).map_err(|e| CodebookError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let codebook = Self::from_reader(BufReader::new(file)).map_err(|e| match e {
            CodebookError::Read { reason, .. } => CodebookError::Read {
                path: path.display().to_string(),
                reason,
            },
            other => other,
        })?;

        tracing::info!(
            "Loaded codebook from {:?}: {} fields in {} sections",
            path,
            codebook.len(),
            codebook.sections().len()
        );
        Ok(codebook)
    }

    /// Parse a codebook from CSV text.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CodebookError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let columns: HashMap<String, usize> = reader
            .headers()
            .map_err(read_error)?
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim().to_lowercase(), i))
            .collect();

        for required in [SECTION, CODE] {
            if !columns.contains_key(required) {
                return Err(CodebookError::MissingColumn(required.to_string()));
            }
        }

        let mut fields = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record.map_err(read_error)?;
            let cell = |name: &str| {
                columns
                    .get(name)
                    .and_then(|&i| non_empty(record.get(i)))
            };

            // Row numbers are 1-based and skip the header
            let code = cell(CODE).ok_or(CodebookError::EmptyCode(row + 2))?;
            fields.push(build_field(
                code,
                cell(SECTION).unwrap_or_default(),
                cell(DESCRIPTION),
                cell(HELP),
                cell(DEFAULT),
                cell(VALUES),
                cell(CHECKALL),
            ));
        }

        Self::from_fields(fields)
    }
}

fn read_error(e: csv::Error) -> CodebookError {
    CodebookError::Read {
        path: String::new(),
        reason: e.to_string(),
    }
}

fn build_field(
    code: String,
    section: String,
    description: Option<String>,
    help: Option<String>,
    default: Option<String>,
    values: Option<String>,
    checkall: Option<String>,
) -> CodebookField {
    let allowed_values = values.map(|v| split_list(&v)).filter(|v| !v.is_empty());

    let mut is_multi_select = checkall.as_deref().is_some_and(is_flag_set);
    if is_multi_select && allowed_values.is_none() {
        tracing::warn!("Codebook field '{}' is checkall but has no values, editing as text", code);
        is_multi_select = false;
    }

    let default = match (default, &allowed_values) {
        (Some(d), Some(options)) if !options.contains(&d) => {
            tracing::warn!(
                "Default '{}' for codebook field '{}' is not an allowed value, ignoring it",
                d,
                code
            );
            None
        }
        (d, _) => d,
    };

    CodebookField {
        code,
        section,
        description,
        help,
        default,
        allowed_values,
        is_multi_select,
    }
}

fn is_flag_set(cell: &str) -> bool {
    matches!(cell.trim().to_lowercase().as_str(), "yes" | "y" | "true" | "x" | "1")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
section,code,description,help,default,values,checkall
Design,task,Task type,What participants did,Likert,Likert; Forced choice; Magnitude,
Design,n_items,,,,,
Results,evidence,Evidence reported,,,A; B; C,yes
Results,stat_scale,,,Ordinal,Interval; Ratio,
Notes,coder_comments,Comments,,,,
";

    #[test]
    fn test_parse_sample() {
        let codebook = Codebook::from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(codebook.len(), 5);

        let task = codebook.field("task").unwrap();
        assert_eq!(task.section, "Design");
        assert_eq!(task.default.as_deref(), Some("Likert"));
        assert_eq!(task.options(), ["Likert", "Forced choice", "Magnitude"]);
        assert!(!task.is_multi_select);

        let n_items = codebook.field("n_items").unwrap();
        assert_eq!(n_items.description, None);
        assert_eq!(n_items.allowed_values, None);
        assert_eq!(codebook.description("n_items").as_deref(), Some("N Items"));

        assert!(codebook.is_multi_select("evidence"));
    }

    #[test]
    fn test_default_outside_allowed_values_is_dropped() {
        let codebook = Codebook::from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(codebook.default_value("stat_scale"), None);
        assert!(codebook.allowed_values("stat_scale").is_some());
    }

    #[test]
    fn test_checkall_without_values_is_text() {
        let csv = "section,code,values,checkall\nA,flags,,yes\n";
        let codebook = Codebook::from_reader(csv.as_bytes()).unwrap();
        assert!(!codebook.is_multi_select("flags"));
    }

    #[test]
    fn test_missing_optional_columns() {
        let csv = "section,code\nA,one\nB,two\n";
        let codebook = Codebook::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(codebook.codes().collect::<Vec<_>>(), vec!["one", "two"]);
    }

    #[test]
    fn test_missing_code_column() {
        let csv = "section,description\nA,x\n";
        let err = Codebook::from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, CodebookError::MissingColumn(c) if c == "code"));
    }

    #[test]
    fn test_empty_code_reports_row() {
        let csv = "section,code\nA,one\nA,\n";
        let err = Codebook::from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, CodebookError::EmptyCode(3)));
    }

    #[test]
    fn test_missing_file_is_empty() {
        let codebook = Codebook::load("/definitely/not/here/codebook.csv").unwrap();
        assert!(codebook.is_empty());
        assert!(codebook.sections().is_empty());
    }
}
