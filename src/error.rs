//! Error types for prediction and training-data loading.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures of a k-NN prediction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KnnError {
    /// The example store holds no training points.
    #[error("cannot predict: the example store is empty")]
    EmptyStore,

    /// `k` was zero.
    #[error("k must be at least 1, got 0")]
    ZeroNeighbors,

    /// `k` exceeds the number of stored points.
    #[error("k = {k} exceeds the {available} available training points")]
    TooManyNeighbors { k: usize, available: usize },

    /// A query feature is NaN or infinite.
    #[error("query feature {index} is not a finite number: {value}")]
    NonFiniteQuery { index: usize, value: f64 },
}

/// Fatal failures while loading training data.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to open training data {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read training data {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Why a single input row was skipped. Recovered by the loader, never returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RowError {
    #[error("expected 5 fields, found {found}")]
    FieldCount { found: usize },

    #[error("field {index} is not a number: {value:?}")]
    InvalidNumber { index: usize, value: String },

    #[error("field {index} is not finite: {value:?}")]
    NonFinite { index: usize, value: String },

    #[error("label is empty")]
    EmptyLabel,
}
