use crate::geometry::Pose;
use crate::maneuver::{Maneuver, ManeuverOracle};
use crate::rrt::NodeId;
use num_traits::Float;
use std::collections::HashMap;

/// Memoizes maneuvers between committed nodes, keyed by `(start id, end id)`.
///
/// Node ids are only stable within one planning run, so the cache must be cleared between runs.
pub struct ManeuverCache<F: Float, const N: usize> {
    entries: HashMap<(NodeId, NodeId), Option<Maneuver<F, N>>>,
    hits: usize,
    misses: usize,
}

impl<F: Float, const N: usize> ManeuverCache<F, N> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// Returns the maneuver from `start` to `end`, asking `oracle` only on the first request.
    ///
    /// Parameters:
    /// - `oracle`: The maneuver oracle to fall back on.
    /// - `start`: Id and pose of the start node.
    /// - `end`: Id and pose of the end node.
    pub fn connect(
        &mut self,
        oracle: &dyn ManeuverOracle<F, N>,
        start: (NodeId, &Pose<F, N>),
        end: (NodeId, &Pose<F, N>),
    ) -> Option<Maneuver<F, N>> {
        let key = (start.0, end.0);
        if let Some(entry) = self.entries.get(&key) {
            self.hits += 1;
            return entry.clone();
        }
        self.misses += 1;
        let maneuver = oracle.connect(start.1, end.1);
        self.entries.insert(key, maneuver.clone());
        maneuver
    }

    /// Drops every entry that starts or ends at `id`.
    pub fn forget(&mut self, id: NodeId) {
        self.entries.retain(|&(a, b), _| a != id && b != id);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(hits, misses)` since the last clear.
    pub fn stats(&self) -> (usize, usize) {
        (self.hits, self.misses)
    }
}

impl<F: Float, const N: usize> Default for ManeuverCache<F, N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::RealVectorState;
    use std::cell::Cell;

    struct CountingOracle {
        calls: Cell<usize>,
    }

    impl ManeuverOracle<f64, 2> for CountingOracle {
        fn connect(&self, start: &Pose<f64, 2>, end: &Pose<f64, 2>) -> Option<Maneuver<f64, 2>> {
            self.calls.set(self.calls.get() + 1);
            Some(Maneuver::new(start.distance(end), vec![*start, *end]))
        }
    }

    #[test]
    fn repeated_pairs_hit_the_cache() {
        let oracle = CountingOracle { calls: Cell::new(0) };
        let mut cache = ManeuverCache::new();
        let a = Pose::at(RealVectorState::new([0.0, 0.0]));
        let b = Pose::at(RealVectorState::new([1.0, 0.0]));

        cache.connect(&oracle, (1, &a), (2, &b));
        cache.connect(&oracle, (1, &a), (2, &b));
        // Direction matters
        cache.connect(&oracle, (2, &b), (1, &a));

        assert_eq!(oracle.calls.get(), 2);
        assert_eq!(cache.stats(), (1, 2));

        cache.forget(2);
        assert!(cache.is_empty());
        cache.connect(&oracle, (1, &a), (2, &b));
        assert_eq!(oracle.calls.get(), 3);

        cache.clear();
        assert_eq!(cache.stats(), (0, 0));
    }
}
