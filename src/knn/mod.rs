//! Brute-force k-nearest-neighbors classification under Euclidean distance.

pub mod store;

use std::collections::HashMap;
use std::hash::Hash;

use num_traits::AsPrimitive;
use ordered_float::OrderedFloat;
use tracing::debug;

use crate::common_types::{FEATURE_COUNT, LabeledPoint, NeighborResult, QueryPoint};
use crate::error::KnnError;
use store::ExampleStore;

/// Euclidean distance between two feature vectors.
///
/// Every coordinate is widened to `f64` before subtracting, so integer or
/// `f32` measurements never lose precision or truncate.
pub fn euclidean_distance<F>(a: &[F; FEATURE_COUNT], b: &[F; FEATURE_COUNT]) -> f64
where
    F: AsPrimitive<f64>,
{
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let diff = x.as_() - y.as_();
            diff * diff
        })
        .sum::<f64>()
        .sqrt()
}

fn validate_k(k: usize, available: usize) -> Result<(), KnnError> {
    if available == 0 {
        return Err(KnnError::EmptyStore);
    }
    if k == 0 {
        return Err(KnnError::ZeroNeighbors);
    }
    if k > available {
        return Err(KnnError::TooManyNeighbors { k, available });
    }
    Ok(())
}

fn validate_query<F>(query: &QueryPoint<F>) -> Result<(), KnnError>
where
    F: AsPrimitive<f64>,
{
    for (index, &feature) in query.features.iter().enumerate() {
        let value: f64 = feature.as_();
        if !value.is_finite() {
            return Err(KnnError::NonFiniteQuery { index, value });
        }
    }
    Ok(())
}

/// Returns the `k` stored points closest to `query`, nearest first.
///
/// Every stored point is scanned. Points at exactly the same distance keep
/// their insertion order (the sort is stable).
///
/// # Errors
/// `EmptyStore` if there is nothing to search, `ZeroNeighbors` / `TooManyNeighbors`
/// if `k` is outside `1..=store.len()`, `NonFiniteQuery` for a NaN or infinite query.
pub fn nearest_neighbors<'a, F, L>(
    store: &'a ExampleStore<F, L>,
    query: &QueryPoint<F>,
    k: usize,
) -> Result<Vec<NeighborResult<'a, F, L>>, KnnError>
where
    F: AsPrimitive<f64>,
{
    validate_k(k, store.len())?;
    validate_query(query)?;

    let mut neighbors: Vec<NeighborResult<'a, F, L>> = store
        .iter()
        .map(|point| NeighborResult {
            point,
            distance: euclidean_distance(&query.features, &point.features),
        })
        .collect();

    // sort_by_key is stable; OrderedFloat gives f64 a total order
    neighbors.sort_by_key(|neighbor| OrderedFloat(neighbor.distance));
    neighbors.truncate(k);
    Ok(neighbors)
}

/// Picks the most frequent label among `neighbors`.
///
/// Labels are tallied in the order given. The leader only changes when a
/// label's count becomes strictly greater than the current maximum, so on a
/// tie the label that reached the maximum first wins.
/// Returns `None` for an empty slice.
pub fn majority_vote<'a, F, L>(neighbors: &[NeighborResult<'a, F, L>]) -> Option<&'a L>
where
    L: Eq + Hash,
{
    let mut label_counts: HashMap<&'a L, usize> = HashMap::with_capacity(neighbors.len());
    let mut leader: Option<(&'a L, usize)> = None;

    for neighbor in neighbors {
        let point: &'a LabeledPoint<F, L> = neighbor.point;
        let count = label_counts.entry(&point.label).or_insert(0);
        *count += 1;
        if leader.is_none_or(|(_, max_count)| *count > max_count) {
            leader = Some((&point.label, *count));
        }
    }

    leader.map(|(label, _)| label)
}

/// Predicts the label of `query` by majority vote among its `k` nearest
/// stored points.
///
/// # Errors
/// Same as [`nearest_neighbors`]. A label is never invented: an invalid `k`
/// or an empty store is reported, not clamped.
pub fn predict<F, L>(store: &ExampleStore<F, L>, query: &QueryPoint<F>, k: usize) -> Result<L, KnnError>
where
    F: AsPrimitive<f64>,
    L: Clone + Eq + Hash + std::fmt::Debug,
{
    let neighbors = nearest_neighbors(store, query, k)?;
    for neighbor in &neighbors {
        debug!(label = ?neighbor.label(), distance = neighbor.distance, "neighbor");
    }

    // validate_k guarantees 1 <= k <= store.len(), so the vote always has a winner
    debug_assert!(!neighbors.is_empty());
    majority_vote(&neighbors)
        .cloned()
        .ok_or(KnnError::EmptyStore)
}

/// Predicts every query in order, stopping at the first error.
pub fn predict_batch<F, L>(
    store: &ExampleStore<F, L>,
    queries: &[QueryPoint<F>],
    k: usize,
) -> Result<Vec<L>, KnnError>
where
    F: AsPrimitive<f64>,
    L: Clone + Eq + Hash + std::fmt::Debug,
{
    queries.iter().map(|query| predict(store, query, k)).collect()
}

/// The K-Nearest Neighbors Classifier: a fixed `k` plus the training data it votes over.
#[derive(Debug, Clone)]
pub struct KnnClassifier<F = f64, L = String> {
    k: usize,
    store: ExampleStore<F, L>,
}

impl<F, L> KnnClassifier<F, L>
where
    F: AsPrimitive<f64>,
    L: Clone + Eq + Hash + std::fmt::Debug,
{
    /// `k` is checked at prediction time, against the size of the fitted store.
    pub fn new(k: usize) -> Self {
        Self { k, store: ExampleStore::new() }
    }

    /// Replaces the training data.
    pub fn fit<I>(&mut self, training_data: I)
    where
        I: IntoIterator<Item = LabeledPoint<F, L>>,
    {
        self.store = training_data.into_iter().collect();
    }

    /// Uses an already populated store as training data.
    pub fn fit_store(&mut self, store: ExampleStore<F, L>) {
        self.store = store;
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn store(&self) -> &ExampleStore<F, L> {
        &self.store
    }

    pub fn predict_single(&self, query: &QueryPoint<F>) -> Result<L, KnnError> {
        predict(&self.store, query, self.k)
    }

    pub fn predict(&self, queries: &[QueryPoint<F>]) -> Result<Vec<L>, KnnError> {
        predict_batch(&self.store, queries, self.k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn point(features: [f64; 4], label: &str) -> LabeledPoint {
        LabeledPoint::new(features, label.to_string())
    }

    /// Points on the diagonal, so the distance from the origin grows with `x`.
    fn diagonal_store(entries: &[(f64, &str)]) -> ExampleStore {
        entries.iter().map(|&(x, label)| point([x; 4], label)).collect()
    }

    fn origin() -> QueryPoint {
        QueryPoint::new([0.0; 4])
    }

    #[test]
    fn test_euclidean_distance() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let b = [4.0, 6.0, 3.0, 4.0];
        let epsilon = 1e-12;

        // sqrt(3^2 + 4^2) = 5
        assert!((euclidean_distance(&a, &b) - 5.0).abs() < epsilon);
        assert_eq!(euclidean_distance(&a, &a), 0.0);
        assert!((euclidean_distance(&a, &b) - euclidean_distance(&b, &a)).abs() < epsilon);
    }

    #[test]
    fn test_euclidean_distance_widens_integers() {
        // (1 - 0)^2 * 4 = 4 -> 2.0, computed in f64 rather than integer arithmetic
        assert_eq!(euclidean_distance(&[0i32; 4], &[1i32; 4]), 2.0);
        // sqrt(3) has no integer representation
        let d = euclidean_distance(&[0u8, 0, 0, 0], &[1u8, 1, 1, 0]);
        assert!((d - 3.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_euclidean_distance_f32_features() {
        let d = euclidean_distance(&[0.5f32; 4], &[1.5f32; 4]);
        assert!((d - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_end_to_end_example() {
        let store: ExampleStore = vec![
            point([1.0, 1.0, 1.0, 1.0], "X"),
            point([2.0, 2.0, 2.0, 2.0], "X"),
            point([10.0, 10.0, 10.0, 10.0], "Y"),
        ]
        .into_iter()
        .collect();
        let query = QueryPoint::new([1.1, 1.1, 1.1, 1.1]);
        assert_eq!(predict(&store, &query, 2), Ok("X".to_string()));
    }

    #[test]
    fn test_majority_wins() {
        let store = diagonal_store(&[(1.0, "A"), (2.0, "A"), (3.0, "B"), (50.0, "B"), (60.0, "B")]);
        assert_eq!(predict(&store, &origin(), 3), Ok("A".to_string()));
    }

    #[test]
    fn test_count_tie_goes_to_first_label_seen() {
        // B is strictly closer, each label ends with one vote
        let store = diagonal_store(&[(2.0, "A"), (1.0, "B")]);
        assert_eq!(predict(&store, &origin(), 2), Ok("B".to_string()));

        // A reaches 2 before B does
        let store = diagonal_store(&[(1.0, "A"), (2.0, "B"), (3.0, "A"), (4.0, "B")]);
        assert_eq!(predict(&store, &origin(), 4), Ok("A".to_string()));
    }

    #[test]
    fn test_later_label_overtakes_with_strictly_more_votes() {
        let store = diagonal_store(&[(1.0, "A"), (2.0, "B"), (3.0, "B")]);
        assert_eq!(predict(&store, &origin(), 3), Ok("B".to_string()));
    }

    #[test]
    fn test_equal_distance_keeps_insertion_order() {
        let features = [5.1, 3.5, 1.4, 0.2];
        let query = QueryPoint::new(features);

        let store: ExampleStore = vec![point(features, "first"), point(features, "second")].into_iter().collect();
        assert_eq!(predict(&store, &query, 1), Ok("first".to_string()));

        let store: ExampleStore = vec![point(features, "second"), point(features, "first")].into_iter().collect();
        assert_eq!(predict(&store, &query, 1), Ok("second".to_string()));
    }

    #[test]
    fn test_nearest_neighbors_sorted_and_truncated() {
        let store = diagonal_store(&[(3.0, "C"), (1.0, "A"), (2.0, "B"), (1.0, "D")]);
        let neighbors = nearest_neighbors(&store, &origin(), 3).unwrap();
        let labels: Vec<&str> = neighbors.iter().map(|n| n.label().as_str()).collect();
        assert_eq!(labels, vec!["A", "D", "B"]);
        assert!((neighbors[2].distance - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_k_equal_to_store_size_uses_every_point_once() {
        let store = diagonal_store(&[(4.0, "A"), (1.0, "B"), (3.0, "A"), (2.0, "C")]);
        let neighbors = nearest_neighbors(&store, &origin(), store.len()).unwrap();
        assert_eq!(neighbors.len(), store.len());
        for stored in store.iter() {
            let hits = neighbors.iter().filter(|n| std::ptr::eq(n.point, stored)).count();
            assert_eq!(hits, 1);
        }
        assert_eq!(predict(&store, &origin(), 4), Ok("A".to_string()));
    }

    #[test]
    fn test_k_larger_than_store_fails() {
        let store = diagonal_store(&[(1.0, "A"), (2.0, "B")]);
        assert_eq!(
            predict(&store, &origin(), 3),
            Err(KnnError::TooManyNeighbors { k: 3, available: 2 })
        );
    }

    #[test]
    fn test_zero_k_fails() {
        let store = diagonal_store(&[(1.0, "A")]);
        assert_eq!(predict(&store, &origin(), 0), Err(KnnError::ZeroNeighbors));
    }

    #[test]
    fn test_empty_store_fails() {
        let store: ExampleStore = ExampleStore::new();
        assert_eq!(predict(&store, &origin(), 1), Err(KnnError::EmptyStore));
        assert_eq!(predict(&store, &origin(), 0), Err(KnnError::EmptyStore));
    }

    #[test]
    fn test_non_finite_query_fails() {
        let store = diagonal_store(&[(1.0, "A")]);
        let query = QueryPoint::new([1.0, f64::NAN, 1.0, 1.0]);
        assert!(matches!(
            predict(&store, &query, 1),
            Err(KnnError::NonFiniteQuery { index: 1, .. })
        ));
        let query = QueryPoint::new([1.0, 1.0, 1.0, f64::INFINITY]);
        assert!(matches!(
            predict(&store, &query, 1),
            Err(KnnError::NonFiniteQuery { index: 3, .. })
        ));
    }

    #[test]
    fn test_majority_vote_empty() {
        let neighbors: Vec<NeighborResult<'_, f64, String>> = Vec::new();
        assert_eq!(majority_vote(&neighbors), None);
    }

    #[test]
    fn test_integer_features() {
        let store: ExampleStore<i32, &str> = vec![
            LabeledPoint::new([0, 0, 0, 0], "low"),
            LabeledPoint::new([1, 1, 1, 1], "low"),
            LabeledPoint::new([9, 9, 9, 9], "high"),
        ]
        .into_iter()
        .collect();
        assert_eq!(predict(&store, &QueryPoint::new([8, 8, 8, 9]), 1), Ok("high"));
        assert_eq!(predict(&store, &QueryPoint::new([1, 0, 1, 0]), 2), Ok("low"));
    }

    #[test]
    fn test_predict_batch() {
        let store = diagonal_store(&[(0.0, "X"), (10.0, "Y")]);
        let queries = vec![QueryPoint::new([1.0; 4]), QueryPoint::new([9.0; 4]), QueryPoint::new([-1.0; 4])];
        let predictions = predict_batch(&store, &queries, 1).unwrap();
        assert_eq!(predictions, vec!["X".to_string(), "Y".to_string(), "X".to_string()]);

        assert_eq!(predict_batch(&store, &queries, 5), Err(KnnError::TooManyNeighbors { k: 5, available: 2 }));
        assert_eq!(predict_batch(&store, &[], 1), Ok(Vec::new()));
    }

    #[test]
    fn test_classifier_wrapper() {
        let mut classifier: KnnClassifier = KnnClassifier::new(1);
        assert_eq!(classifier.predict_single(&origin()), Err(KnnError::EmptyStore));

        classifier.fit(vec![point([0.0; 4], "X"), point([10.0; 4], "Y")]);
        assert_eq!(classifier.k(), 1);
        assert_eq!(classifier.store().len(), 2);
        assert_eq!(classifier.predict_single(&QueryPoint::new([1.0; 4])), Ok("X".to_string()));
        assert_eq!(
            classifier.predict(&[QueryPoint::new([9.0; 4])]),
            Ok(vec!["Y".to_string()])
        );

        // Refitting replaces, never appends
        classifier.fit(vec![point([0.0; 4], "Z")]);
        assert_eq!(classifier.store().len(), 1);
        assert_eq!(classifier.predict_single(&QueryPoint::new([9.0; 4])), Ok("Z".to_string()));
    }

    #[test]
    fn test_concurrent_predictions_share_store() {
        let store = diagonal_store(&[(1.0, "A"), (2.0, "A"), (8.0, "B"), (9.0, "B")]);
        let results: Vec<String> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let store = &store;
                    let x = if i % 2 == 0 { 0.0 } else { 10.0 };
                    scope.spawn(move || predict(store, &QueryPoint::new([x; 4]), 2).unwrap())
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        for (i, label) in results.iter().enumerate() {
            assert_eq!(label, if i % 2 == 0 { "A" } else { "B" });
        }
    }

    #[test]
    fn test_random_stores_vote_within_neighbor_set() {
        let mut rng = StdRng::seed_from_u64(0x1215);
        let labels = ["setosa", "versicolor", "virginica"];

        for _ in 0..200 {
            let n = rng.gen_range(1..40);
            let store: ExampleStore = (0..n)
                .map(|_| {
                    // Coarse grid so exact distance ties actually happen
                    let features = [0; 4].map(|_| rng.gen_range(0..4) as f64);
                    point(features, labels[rng.gen_range(0..labels.len())])
                })
                .collect();
            let query = QueryPoint::new([0; 4].map(|_| rng.gen_range(0.0..4.0)));
            let k = rng.gen_range(1..=n);

            let neighbors = nearest_neighbors(&store, &query, k).unwrap();
            assert_eq!(neighbors.len(), k);
            assert!(neighbors.windows(2).all(|w| w[0].distance <= w[1].distance));

            let label = predict(&store, &query, k).unwrap();
            assert!(neighbors.iter().any(|n| n.label() == &label));
            assert_eq!(predict(&store, &query, k).unwrap(), label);

            for a in store.iter() {
                assert_eq!(euclidean_distance(&a.features, &a.features), 0.0);
                let b = &store.all()[0];
                let d_ab = euclidean_distance(&a.features, &b.features);
                let d_ba = euclidean_distance(&b.features, &a.features);
                assert!((d_ab - d_ba).abs() < 1e-12);
            }
        }
    }
}
