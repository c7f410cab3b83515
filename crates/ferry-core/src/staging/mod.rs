//! Flat-file staging: the `data/` directory layout, CSV tables, and
//! describe archives.
//!
//! Input tables are plain CSV with at least an `Id` column; every cell is
//! read as a string, empty cells included, and the migrator decides what
//! counts as absent. Output tables serialize non-string values as JSON so
//! per-row statuses and nested query values survive the trip through CSV.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use ferry_api::{FieldMap, ObjectDescribe, SaveResult};
use serde_json::Value;
use thiserror::Error;

/// Column under which per-row save statuses are attached.
pub const STATUS_COLUMN: &str = "status";

/// Errors from reading or writing staging artifacts.
#[derive(Debug, Error)]
pub enum StagingError {
    /// Filesystem error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parse or write error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The fixed staging directory convention rooted at a base directory.
///
/// Input tables live under `import/`, per-run status tables under
/// `success/`, query exports under `export/`, and describe archives under
/// `describe/`. Paths are namespaced by object type; success tables also
/// carry the operation name and a UTC timestamp so runs never collide.
#[derive(Debug, Clone)]
pub struct DataLayout {
    base: PathBuf,
}

impl DataLayout {
    /// Create a layout rooted at the given base directory.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Create every staging directory that does not exist yet.
    pub fn ensure(&self) -> Result<(), StagingError> {
        for dir in [
            self.import_dir(),
            self.success_dir(),
            self.export_dir(),
            self.describe_dir(),
        ] {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    /// Directory for input tables.
    pub fn import_dir(&self) -> PathBuf {
        self.base.join("import")
    }

    /// Directory for per-run status tables.
    pub fn success_dir(&self) -> PathBuf {
        self.base.join("success")
    }

    /// Directory for query exports.
    pub fn export_dir(&self) -> PathBuf {
        self.base.join("export")
    }

    /// Directory for describe archives.
    pub fn describe_dir(&self) -> PathBuf {
        self.base.join("describe")
    }

    /// Input table for one object type.
    pub fn import_path(&self, object: &str) -> PathBuf {
        self.import_dir().join(format!("{object}.csv"))
    }

    /// Export table for one object type.
    pub fn export_path(&self, object: &str) -> PathBuf {
        self.export_dir().join(format!("{object}.csv"))
    }

    /// Describe archive for one object type.
    pub fn describe_path(&self, object: &str) -> PathBuf {
        self.describe_dir().join(format!("{object}.json"))
    }

    /// Status table for one operation run on one object type.
    pub fn success_path(&self, object: &str, operation: &str) -> PathBuf {
        let stamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
        self.success_dir()
            .join(format!("{object}_{operation}_{stamp}.csv"))
    }
}

/// Read an input table into field maps, one per row.
///
/// Every cell becomes a JSON string keyed by its header; empty cells are
/// preserved as empty strings rather than skipped.
pub fn read_rows(path: &Path) -> Result<Vec<FieldMap>, StagingError> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut row = FieldMap::new();
        for (header, cell) in headers.iter().zip(record.iter()) {
            row.insert(header.to_string(), Value::String(cell.to_string()));
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Write field maps as a CSV table.
///
/// The header is the sorted union of all row keys; missing values become
/// empty cells.
pub fn write_rows(path: &Path, rows: &[FieldMap]) -> Result<(), StagingError> {
    let columns = column_union(rows);
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&columns)?;
    for row in rows {
        writer.write_record(row_cells(row, &columns)?)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write field maps with their per-row save statuses attached.
///
/// Statuses must align positionally with rows; each status is serialized
/// as JSON into a trailing `status` column.
pub fn write_status_rows(
    path: &Path,
    rows: &[FieldMap],
    statuses: &[SaveResult],
) -> Result<(), StagingError> {
    let mut columns = column_union(rows);
    columns.push(STATUS_COLUMN.to_string());

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&columns)?;
    for (row, status) in rows.iter().zip(statuses) {
        let mut cells = row_cells(row, &columns[..columns.len() - 1])?;
        cells.push(serde_json::to_string(status)?);
        writer.write_record(&cells)?;
    }
    writer.flush()?;
    Ok(())
}

/// Archive one describe payload as pretty-printed JSON.
pub fn write_describe(path: &Path, describe: &ObjectDescribe) -> Result<(), StagingError> {
    let json = serde_json::to_string_pretty(describe)?;
    fs::write(path, json)?;
    Ok(())
}

fn column_union(rows: &[FieldMap]) -> Vec<String> {
    let columns: BTreeSet<&str> = rows
        .iter()
        .flat_map(|row| row.keys().map(String::as_str))
        .collect();
    columns.into_iter().map(str::to_string).collect()
}

fn row_cells(row: &FieldMap, columns: &[String]) -> Result<Vec<String>, StagingError> {
    let mut cells = Vec::with_capacity(columns.len());
    for column in columns {
        let cell = match row.get(column) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => serde_json::to_string(other)?,
        };
        cells.push(cell);
    }
    Ok(cells)
}
