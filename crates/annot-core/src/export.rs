//! CSV export of the annotation table

use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::annotation::{AnnotationRecord, METADATA_FIELDS};
use crate::codebook::Codebook;
use crate::error::ExportError;

/// Notice given instead of a file when the store is empty
pub const NO_ANNOTATIONS: &str = "No annotations available yet.";

/// `annotations_from_articles_<YYYY-MM-DD_HH-MM>.csv`
pub fn export_filename(now: DateTime<Local>) -> String {
    format!(
        "annotations_from_articles_{}.csv",
        now.format("%Y-%m-%d_%H-%M")
    )
}

/// Header row: metadata, `experiment_number`, every codebook code, then
/// stored codes the codebook no longer lists (sorted).
pub fn export_columns(records: &[AnnotationRecord], codebook: &Codebook) -> Vec<String> {
    let mut columns: Vec<String> = METADATA_FIELDS.iter().map(|s| s.to_string()).collect();
    columns.insert(1, "experiment_number".to_string());
    columns.extend(codebook.codes().map(str::to_string));

    let retired: BTreeSet<&str> = records
        .iter()
        .flat_map(|r| r.values.keys())
        .map(String::as_str)
        .filter(|code| !codebook.contains(code))
        .collect();
    columns.extend(retired.into_iter().map(str::to_string));
    columns
}

/// Write every record as CSV.
pub fn write_csv<W: Write>(
    writer: W,
    records: &[AnnotationRecord],
    codebook: &Codebook,
) -> Result<(), ExportError> {
    let columns = export_columns(records, codebook);
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(&columns)?;

    for record in records {
        let experiment = record.experiment_number.to_string();
        let row = columns.iter().map(|column| {
            if column == "experiment_number" {
                experiment.as_str()
            } else {
                record
                    .metadata
                    .get(column)
                    .unwrap_or_else(|| record.value(column))
            }
        });
        csv.write_record(row)?;
    }

    csv.flush()?;
    Ok(())
}

/// Export into `dir` with a timestamped file name. Returns `None` without
/// creating a file when there is nothing to export.
pub fn export_csv(
    dir: &Path,
    records: &[AnnotationRecord],
    codebook: &Codebook,
    now: DateTime<Local>,
) -> Result<Option<PathBuf>, ExportError> {
    if records.is_empty() {
        tracing::info!("{}", NO_ANNOTATIONS);
        return Ok(None);
    }

    std::fs::create_dir_all(dir)?;
    let path = dir.join(export_filename(now));
    let file = std::fs::File::create(&path)?;
    write_csv(file, records, codebook)?;

    tracing::info!("Exported {} annotations to {}", records.len(), path.display());
    Ok(Some(path))
}
