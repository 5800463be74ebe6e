//! This module contains the data structures shared by the store, the classifier and the loader.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of morphological measurements per specimen:
/// sepal length, sepal width, petal length, petal width.
pub const FEATURE_COUNT: usize = 4;

/// Represents a single training example, with its features and a label.
///
/// - `F`: The type of the features (e.g., `f64`, `f32`, `i32`).
/// - `L`: The type of the label (e.g., `String`, an enum).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LabeledPoint<F = f64, L = String> {
    pub features: [F; FEATURE_COUNT],
    pub label: L,
}

impl<F, L> LabeledPoint<F, L> {
    pub fn new(features: [F; FEATURE_COUNT], label: L) -> Self {
        LabeledPoint { features, label }
    }
}

/// An unlabeled point supplied by the caller for a single prediction.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct QueryPoint<F = f64> {
    pub features: [F; FEATURE_COUNT],
}

impl<F> QueryPoint<F> {
    pub fn new(features: [F; FEATURE_COUNT]) -> Self {
        QueryPoint { features }
    }
}

impl<F> From<[F; FEATURE_COUNT]> for QueryPoint<F> {
    fn from(features: [F; FEATURE_COUNT]) -> Self {
        QueryPoint::new(features)
    }
}

/// A stored point paired with its distance to one query.
///
/// Only lives for the duration of a single prediction; the stored point is
/// borrowed, never annotated.
#[derive(Debug, Clone, Copy)]
pub struct NeighborResult<'a, F, L> {
    pub point: &'a LabeledPoint<F, L>,
    pub distance: f64,
}

impl<F, L> NeighborResult<'_, F, L> {
    pub fn label(&self) -> &L {
        &self.point.label
    }
}
