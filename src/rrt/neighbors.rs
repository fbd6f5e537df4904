use crate::geometry::RealVectorState;
use crate::rrt::NodeId;
use kiddo::float::{distance::SquaredEuclidean, kdtree::Axis, kdtree::KdTree};
use num_traits::Float;
use std::cmp::Ordering;

/// A trait for a nearest neighbor data structure that supports nearest neighbors and radius queries.
/// Stores RealVectorStates and a node id along with them.
///
/// Radius queries are strict (`distance < radius`) and return ids in ascending order,
/// which is the order nodes were committed to the graph.
pub trait NearestNeighbors<F: Float, const N: usize> {
    /// Constructs a new nearest neighbor data structure.
    /// The data structure is empty initially.
    fn new() -> Self;

    /// Adds a state to the data structure.
    ///
    /// Parameters:
    /// - `state`: The RealVectorState to add.
    /// - `item`: The id of the node at that state.
    fn add(&mut self, state: RealVectorState<F, N>, item: NodeId);

    /// Removes a previously added state.
    ///
    /// Parameters:
    /// - `state`: The RealVectorState the item was added with.
    /// - `item`: The id of the node to remove.
    fn remove(&mut self, state: &RealVectorState<F, N>, item: NodeId);

    /// Number of stored states.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Gets the nearest neighbor to the given RealVectorState.
    ///
    /// Parameters:
    /// - `state`: The RealVectorState to find the nearest neighbor to.
    ///
    /// Returns:
    /// The id of the nearest neighbor, if any.
    fn nearest_one(&self, state: &RealVectorState<F, N>) -> Option<NodeId> {
        self.nearest_k(state, 1).first().copied()
    }

    /// Gets the k nearest neighbors to the given RealVectorState, nearest first.
    fn nearest_k(&self, state: &RealVectorState<F, N>, k: usize) -> Vec<NodeId>;

    /// Gets all RealVectorStates strictly within a given radius of the given RealVectorState.
    ///
    /// Parameters:
    /// - `state`: The RealVectorState to find the neighbors of.
    /// - `radius`: The radius within which to find neighbors.
    ///
    /// Returns:
    /// The ids of the neighbors in ascending id order.
    fn within_radius(&self, state: &RealVectorState<F, N>, radius: F) -> Vec<NodeId>;

    /// Gets all RealVectorStates strictly within a given radius, nearest first.
    /// Equidistant neighbors keep ascending id order.
    fn within_radius_sorted(&self, state: &RealVectorState<F, N>, radius: F) -> Vec<NodeId>;
}

fn compare<F: Float>(a: F, b: F) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// A nearest neighbor data structure that uses a linear search to find the nearest neighbors.
/// Scans in storage order, so ties always resolve to the earliest committed node.
pub struct LinearNearestNeighbors<F: Float, const N: usize> {
    states: Vec<(RealVectorState<F, N>, NodeId)>,
}

impl<F: Float, const N: usize> NearestNeighbors<F, N> for LinearNearestNeighbors<F, N> {
    fn new() -> Self {
        Self { states: Vec::new() }
    }

    fn add(&mut self, state: RealVectorState<F, N>, item: NodeId) {
        debug_assert!(self.states.last().map_or(true, |&(_, last)| last < item));
        self.states.push((state, item));
    }

    fn remove(&mut self, _state: &RealVectorState<F, N>, item: NodeId) {
        if let Some(index) = self.states.iter().position(|&(_, i)| i == item) {
            self.states.remove(index);
        }
    }

    fn len(&self) -> usize {
        self.states.len()
    }

    fn nearest_one(&self, state: &RealVectorState<F, N>) -> Option<NodeId> {
        // min_by keeps the first of equal minima
        let nearest = self.states.iter().min_by(|a, b| {
            compare(
                state.euclidean_distance_squared(&a.0),
                state.euclidean_distance_squared(&b.0),
            )
        });
        nearest.map(|(_, i)| *i)
    }

    fn nearest_k(&self, state: &RealVectorState<F, N>, k: usize) -> Vec<NodeId> {
        let mut nearest = self
            .states
            .iter()
            .map(|(p, i)| (state.euclidean_distance_squared(p), *i))
            .collect::<Vec<_>>();
        nearest.sort_by(|a, b| compare(a.0, b.0));
        nearest.into_iter().take(k).map(|(_, i)| i).collect()
    }

    fn within_radius(&self, state: &RealVectorState<F, N>, radius: F) -> Vec<NodeId> {
        let radius_squared = radius * radius;
        self.states
            .iter()
            .filter(|(p, _)| state.euclidean_distance_squared(p) < radius_squared)
            .map(|(_, i)| *i)
            .collect()
    }

    fn within_radius_sorted(&self, state: &RealVectorState<F, N>, radius: F) -> Vec<NodeId> {
        let radius_squared = radius * radius;
        let mut within = self
            .states
            .iter()
            .map(|(p, i)| (state.euclidean_distance_squared(p), *i))
            .filter(|(d, _)| *d < radius_squared)
            .collect::<Vec<_>>();
        within.sort_by(|a, b| compare(a.0, b.0));
        within.into_iter().map(|(_, i)| i).collect()
    }
}

/// A kd-tree backed index for large trees.
pub struct KdTreeNearestNeighbors<F: Float + Axis, const N: usize> {
    kdtree: KdTree<F, usize, N, 32, u32>,
    len: usize,
}

impl<F: Float + Axis, const N: usize> NearestNeighbors<F, N> for KdTreeNearestNeighbors<F, N> {
    fn new() -> Self {
        Self {
            kdtree: KdTree::new(),
            len: 0,
        }
    }

    fn add(&mut self, state: RealVectorState<F, N>, item: NodeId) {
        self.kdtree.add(state.values(), item);
        self.len += 1;
    }

    fn remove(&mut self, state: &RealVectorState<F, N>, item: NodeId) {
        let removed = self.kdtree.remove(state.values(), item);
        self.len -= removed;
    }

    fn len(&self) -> usize {
        self.len
    }

    fn nearest_one(&self, state: &RealVectorState<F, N>) -> Option<NodeId> {
        if self.len == 0 {
            return None;
        }
        let neighbor = self.kdtree.nearest_one::<SquaredEuclidean>(state.values());
        Some(neighbor.item)
    }

    fn nearest_k(&self, state: &RealVectorState<F, N>, k: usize) -> Vec<NodeId> {
        if self.len == 0 || k == 0 {
            return Vec::new();
        }
        self.kdtree
            .nearest_n::<SquaredEuclidean>(state.values(), k)
            .iter()
            .map(|n| n.item)
            .collect()
    }

    fn within_radius(&self, state: &RealVectorState<F, N>, radius: F) -> Vec<NodeId> {
        let radius_squared = radius * radius;
        let mut within = self
            .kdtree
            .within_unsorted::<SquaredEuclidean>(state.values(), radius_squared)
            .iter()
            .filter(|n| n.distance < radius_squared)
            .map(|n| n.item)
            .collect::<Vec<_>>();
        within.sort_unstable();
        within
    }

    fn within_radius_sorted(&self, state: &RealVectorState<F, N>, radius: F) -> Vec<NodeId> {
        let radius_squared = radius * radius;
        let mut within = self
            .kdtree
            .within_unsorted::<SquaredEuclidean>(state.values(), radius_squared)
            .iter()
            .filter(|n| n.distance < radius_squared)
            .map(|n| (n.distance, n.item))
            .collect::<Vec<_>>();
        within.sort_by(|a, b| compare(a.0, b.0).then(a.1.cmp(&b.1)));
        within.into_iter().map(|(_, i)| i).collect()
    }
}
