//! Best-effort loading of labeled training rows from comma-separated text.
//!
//! Each row is `sepal_length,sepal_width,petal_length,petal_width,label`.
//! Rows that do not fit that shape (a header, a truncated line, a typo in a
//! number) are skipped with a warning; only failing to open or read the
//! source aborts the load.

use std::fs::File;
use std::io;
use std::path::Path;

use csv::{ByteRecord, ReaderBuilder};
use tracing::{info, warn};

use crate::common_types::{FEATURE_COUNT, LabeledPoint};
use crate::error::{LoadError, RowError};
use crate::knn::store::ExampleStore;

/// Features plus the label.
pub const FIELD_COUNT: usize = FEATURE_COUNT + 1;

/// One input row that was not loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRow {
    /// 1-based line number in the source.
    pub line: u64,
    /// The row's fields, re-joined with commas.
    pub content: String,
    pub reason: RowError,
}

/// Outcome of a load: how many points were appended and which rows were dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadSummary {
    pub loaded: usize,
    pub skipped: Vec<SkippedRow>,
}

/// Opens `path` and appends every valid row to `store`.
///
/// # Errors
/// `LoadError::Open` if the file cannot be opened, `LoadError::Read` if
/// reading fails part way. Malformed rows are not errors.
pub fn load_from_path<P: AsRef<Path>>(
    path: P,
    store: &mut ExampleStore,
) -> Result<LoadSummary, LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let summary = load_from_reader(file, store).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    info!(
        path = %path.display(),
        loaded = summary.loaded,
        skipped = summary.skipped.len(),
        "loaded training data"
    );
    Ok(summary)
}

/// Reads rows from `reader` and appends every valid one to `store`.
///
/// No header is assumed; a non-numeric header row is skipped like any other
/// malformed row. Quotes have no special meaning, so every physical line is
/// one row. Blank lines are dropped by the reader without a diagnostic, the
/// one exception to warning on every row without 5 fields.
pub fn load_from_reader<R: io::Read>(
    reader: R,
    store: &mut ExampleStore,
) -> Result<LoadSummary, csv::Error> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(reader);

    let mut summary = LoadSummary::default();
    let mut record = ByteRecord::new();

    while csv_reader.read_byte_record(&mut record)? {
        let line = record.position().map_or(0, |position| position.line());
        match parse_row(&record) {
            Ok(point) => {
                store.append(point);
                summary.loaded += 1;
            }
            Err(reason) => {
                let content = row_content(&record);
                warn!(line, content = %content, reason = %reason, "skipping malformed training row");
                summary.skipped.push(SkippedRow { line, content, reason });
            }
        }
    }

    Ok(summary)
}

/// Parses one row into a point. Surrounding whitespace is ignored in every field.
pub fn parse_row(record: &ByteRecord) -> Result<LabeledPoint, RowError> {
    if record.len() != FIELD_COUNT {
        return Err(RowError::FieldCount { found: record.len() });
    }

    let mut features = [0.0; FEATURE_COUNT];
    for (index, (slot, raw)) in features.iter_mut().zip(record.iter()).enumerate() {
        let text = String::from_utf8_lossy(raw);
        let text = text.trim();
        let value: f64 = text.parse().map_err(|_| RowError::InvalidNumber {
            index,
            value: text.to_string(),
        })?;
        // "NaN" and "inf" parse, but stored features must be finite
        if !value.is_finite() {
            return Err(RowError::NonFinite {
                index,
                value: text.to_string(),
            });
        }
        *slot = value;
    }

    let label = record
        .get(FEATURE_COUNT)
        .map(|raw| String::from_utf8_lossy(raw).trim().to_string())
        .unwrap_or_default();
    if label.is_empty() {
        return Err(RowError::EmptyLabel);
    }

    Ok(LabeledPoint::new(features, label))
}

fn row_content(record: &ByteRecord) -> String {
    record
        .iter()
        .map(String::from_utf8_lossy)
        .collect::<Vec<_>>()
        .join(",")
}
