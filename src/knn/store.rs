//! Insertion-ordered storage for labeled training points.

use std::slice;

use crate::common_types::LabeledPoint;

/// Holds the training examples in the order they were added.
///
/// Duplicates are kept. The store is filled once by the loader and then only
/// read; `&ExampleStore` can be shared across threads without locking.
#[derive(Debug, Clone, PartialEq)]
pub struct ExampleStore<F = f64, L = String> {
    points: Vec<LabeledPoint<F, L>>,
}

impl<F, L> Default for ExampleStore<F, L> {
    fn default() -> Self {
        ExampleStore { points: Vec::new() }
    }
}

impl<F, L> ExampleStore<F, L> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        ExampleStore { points: Vec::with_capacity(capacity) }
    }

    /// Adds one point at the end. No validation is done here.
    pub fn append(&mut self, point: LabeledPoint<F, L>) {
        self.points.push(point);
    }

    /// All stored points in insertion order.
    pub fn all(&self) -> &[LabeledPoint<F, L>] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, LabeledPoint<F, L>> {
        self.points.iter()
    }
}

impl<F, L> FromIterator<LabeledPoint<F, L>> for ExampleStore<F, L> {
    fn from_iter<I: IntoIterator<Item = LabeledPoint<F, L>>>(iter: I) -> Self {
        ExampleStore { points: iter.into_iter().collect() }
    }
}

impl<F, L> Extend<LabeledPoint<F, L>> for ExampleStore<F, L> {
    fn extend<I: IntoIterator<Item = LabeledPoint<F, L>>>(&mut self, iter: I) {
        self.points.extend(iter);
    }
}

impl<'a, F, L> IntoIterator for &'a ExampleStore<F, L> {
    type Item = &'a LabeledPoint<F, L>;
    type IntoIter = slice::Iter<'a, LabeledPoint<F, L>>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
