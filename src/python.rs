//! Python bindings, built with `--features python` (e.g. through maturin).

use pyo3::exceptions::{PyOSError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use crate::common_types::{FEATURE_COUNT, LabeledPoint, QueryPoint};
use crate::error::{KnnError, LoadError};
use crate::knn::{self, KnnClassifier};
use crate::loader;

impl From<KnnError> for PyErr {
    fn from(err: KnnError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

impl From<LoadError> for PyErr {
    fn from(err: LoadError) -> PyErr {
        PyOSError::new_err(err.to_string())
    }
}

fn to_features(values: Vec<f64>) -> PyResult<[f64; FEATURE_COUNT]> {
    let found = values.len();
    values.try_into().map_err(|_| {
        PyValueError::new_err(format!("expected {FEATURE_COUNT} features, got {found}"))
    })
}

/// Calculates the Euclidean distance between two 4-feature vectors.
#[pyfunction]
fn euclidean_distance(a: Vec<f64>, b: Vec<f64>) -> PyResult<f64> {
    Ok(knn::euclidean_distance(&to_features(a)?, &to_features(b)?))
}

#[pyclass(name = "KnnClassifier")]
struct PyKnnClassifier {
    classifier: KnnClassifier<f64, String>,
}

#[pymethods]
impl PyKnnClassifier {
    #[new]
    fn new(k: usize) -> Self {
        PyKnnClassifier {
            classifier: KnnClassifier::new(k),
        }
    }

    /// Replaces the training data. Items are `{'features': [...], 'label': '...'}`
    /// dictionaries or `([...], '...')` tuples.
    fn fit(&mut self, training_data_py: &Bound<'_, PyList>) -> PyResult<()> {
        let mut training_data = Vec::with_capacity(training_data_py.len());

        for item_py in training_data_py {
            let (features, label) = if let Ok(dict) = item_py.downcast::<PyDict>() {
                let features = dict
                    .get_item("features")?
                    .ok_or_else(|| PyValueError::new_err("Missing 'features' key"))?
                    .extract::<Vec<f64>>()?;
                let label = dict
                    .get_item("label")?
                    .ok_or_else(|| PyValueError::new_err("Missing 'label' key"))?
                    .extract::<String>()?;
                (features, label)
            } else {
                item_py.extract::<(Vec<f64>, String)>()?
            };
            training_data.push(LabeledPoint::new(to_features(features)?, label));
        }

        self.classifier.fit(training_data);
        Ok(())
    }

    /// Loads training data from a CSV file, replacing any previous data.
    /// Returns the number of skipped rows.
    fn load_csv(&mut self, path: &str) -> PyResult<usize> {
        let mut store = crate::knn::store::ExampleStore::new();
        let summary = loader::load_from_path(path, &mut store)?;
        self.classifier.fit_store(store);
        Ok(summary.skipped.len())
    }

    fn predict_single(&self, features: Vec<f64>) -> PyResult<String> {
        let query = QueryPoint::new(to_features(features)?);
        Ok(self.classifier.predict_single(&query)?)
    }

    fn predict(&self, test_data: Vec<Vec<f64>>) -> PyResult<Vec<String>> {
        let queries = test_data
            .into_iter()
            .map(|features| to_features(features).map(QueryPoint::new))
            .collect::<PyResult<Vec<_>>>()?;
        Ok(self.classifier.predict(&queries)?)
    }

    #[getter]
    fn k(&self) -> usize {
        self.classifier.k()
    }

    fn __len__(&self) -> usize {
        self.classifier.store().len()
    }
}

/// The function name must match `lib.name` in `Cargo.toml`.
#[pymodule]
fn iris_knn(_py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(euclidean_distance, m)?)?;
    m.add_class::<PyKnnClassifier>()?;
    Ok(())
}
