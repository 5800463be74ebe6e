//! k-nearest-neighbors classification of Iris specimens from four
//! morphological measurements.
//!
//! ```
//! use iris_knn::{ExampleStore, LabeledPoint, QueryPoint, predict};
//!
//! let mut store = ExampleStore::new();
//! store.append(LabeledPoint::new([1.0, 1.0, 1.0, 1.0], "X".to_string()));
//! store.append(LabeledPoint::new([2.0, 2.0, 2.0, 2.0], "X".to_string()));
//! store.append(LabeledPoint::new([10.0, 10.0, 10.0, 10.0], "Y".to_string()));
//!
//! let label = predict(&store, &QueryPoint::new([1.1, 1.1, 1.1, 1.1]), 2).unwrap();
//! assert_eq!(label, "X");
//! ```

pub mod common_types;
pub mod error;
pub mod knn;
pub mod loader;

#[cfg(feature = "python")]
mod python;

pub use common_types::{FEATURE_COUNT, LabeledPoint, NeighborResult, QueryPoint};
pub use error::{KnnError, LoadError, RowError};
pub use knn::store::ExampleStore;
pub use knn::{KnnClassifier, euclidean_distance, majority_vote, nearest_neighbors, predict, predict_batch};
pub use loader::{LoadSummary, SkippedRow, load_from_path, load_from_reader};
