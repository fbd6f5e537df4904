use std::collections::HashSet;

use crate::error::{PlannerError, Result};
use crate::geometry::{unit_ball_volume, Pose};
use crate::maneuver::{Maneuver, ManeuverCache, ManeuverOracle};
use crate::planner::{DistanceMetric, NeighborPolicy};
use crate::rrt::{Edge, GraphNode, NearestNeighbors, NodeId, SamplingDistribution};
use crate::util::ordered_float::OrderedFloat;
use crate::workspace::{GoalRegion, Workspace};
use log::{error, trace};
use num_traits::Float;

/// The RRT# search tree.
///
/// Nodes live in an arena indexed by [`NodeId`]. Removed nodes leave an empty slot, so ids are
/// never reused within a run. Each node keeps its children list, which drives cost propagation
/// and subtree trimming. The edge list is a reporting snapshot kept in step with it.
pub struct ConfigspaceGraph<F: Float, const N: usize, NN: NearestNeighbors<F, N>> {
    nodes: Vec<Option<GraphNode<F, N>>>,
    root: NodeId,
    node_count: usize,
    edges: Vec<Edge<F, N>>,
    nearest_neighbors: NN,
    sampling_distribution: Box<dyn SamplingDistribution<F, N>>,
    oracle: Box<dyn ManeuverOracle<F, N>>,
    cache: ManeuverCache<F, N>,
    gamma_star: F,
    dimension: usize,
    distance_metric: DistanceMetric,
    neighbor_policy: NeighborPolicy,
}

impl<F: Float, const N: usize, NN: NearestNeighbors<F, N>> ConfigspaceGraph<F, N, NN> {
    /// Constructs a graph holding only the root node.
    ///
    /// Parameters:
    /// - `root`: The start pose.
    /// - `sampling_distribution`: Source of random poses.
    /// - `oracle`: The maneuver oracle defining edge cost.
    /// - `free_volume`: Freespace volume minus obstacle volume, feeding `gamma_star`.
    /// - `distance_metric`: Metric for the closest-node search.
    /// - `neighbor_policy`: Which near neighbors are kept when more than `k` qualify.
    pub fn new(
        root: Pose<F, N>,
        sampling_distribution: Box<dyn SamplingDistribution<F, N>>,
        oracle: Box<dyn ManeuverOracle<F, N>>,
        free_volume: F,
        distance_metric: DistanceMetric,
        neighbor_policy: NeighborPolicy,
    ) -> Self {
        let mut nearest_neighbors = NN::new();
        nearest_neighbors.add(root.position, 0);
        Self {
            nodes: vec![Some(GraphNode::root(root))],
            root: 0,
            node_count: 1,
            edges: Vec::new(),
            nearest_neighbors,
            sampling_distribution,
            oracle,
            cache: ManeuverCache::new(),
            gamma_star: optimal_gamma(free_volume, N),
            dimension: N,
            distance_metric,
            neighbor_policy,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes currently in the tree.
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// The id the next committed node will receive.
    pub fn next_id(&self) -> NodeId {
        self.nodes.len()
    }

    pub fn gamma_star(&self) -> F {
        self.gamma_star
    }

    pub fn edges(&self) -> &[Edge<F, N>] {
        &self.edges
    }

    pub fn contains(&self, id: NodeId) -> bool {
        matches!(self.nodes.get(id), Some(Some(_)))
    }

    /// Returns the node with the given id.
    pub fn get(&self, id: NodeId) -> Result<&GraphNode<F, N>> {
        self.nodes
            .get(id)
            .and_then(|slot| slot.as_ref())
            .ok_or(PlannerError::NodeNotFound(id))
    }

    /// Returns the node with the given id.
    ///
    /// Panics if the node has been removed.
    pub fn node(&self, id: NodeId) -> &GraphNode<F, N> {
        self.nodes
            .get(id)
            .and_then(|slot| slot.as_ref())
            .unwrap_or_else(|| panic!("node {} is not in the graph", id))
    }

    fn node_mut(&mut self, id: NodeId) -> &mut GraphNode<F, N> {
        self.nodes
            .get_mut(id)
            .and_then(|slot| slot.as_mut())
            .unwrap_or_else(|| panic!("node {} is not in the graph", id))
    }

    /// Iterates over the live nodes in id order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &GraphNode<F, N>)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(id, slot)| slot.as_ref().map(|node| (id, node)))
    }

    // Sampling
    // --------

    /// Draws a pose uniformly within the freespace.
    pub fn generate_random_node(&mut self) -> Pose<F, N> {
        self.sampling_distribution.sample()
    }

    /// Returns the goal pose itself, pulling the tree toward the goal.
    pub fn generate_biased_node(&self, goal: &GoalRegion<F, N>) -> Pose<F, N> {
        goal.pose
    }

    // Neighborhood queries
    // --------------------

    /// Finds the node closest to `sample`. Ties resolve to the lowest id.
    pub fn find_closest_node(&self, sample: &Pose<F, N>) -> Option<NodeId> {
        match self.distance_metric {
            DistanceMetric::Position => self.nearest_neighbors.nearest_one(&sample.position),
            DistanceMetric::Weighted => {
                let half = F::from(0.5).unwrap();
                let mut best: Option<(NodeId, F)> = None;
                for (id, node) in self.iter() {
                    let distance = half * node.pose.distance(sample)
                        + node.pose.heading_difference(sample)
                        + (node.pose.speed - sample.speed).abs();
                    if best.map_or(true, |(_, d)| distance < d) {
                        best = Some((id, distance));
                    }
                }
                best.map(|(id, _)| id)
            }
        }
    }

    /// Near-neighbor radius for the current node count.
    pub fn compute_radius(&self, epsilon: F) -> F {
        self.radius_for(self.node_count, epsilon)
    }

    /// `min(epsilon, gamma_star * (ln n / n)^(1/d))`, or epsilon while `n < 3`.
    pub fn radius_for(&self, node_count: usize, epsilon: F) -> F {
        if node_count < 3 {
            return epsilon;
        }
        let n = F::from(node_count).unwrap();
        let d = F::from(self.dimension).unwrap();
        let radius = self.gamma_star * (n.ln() / n).powf(F::one() / d);
        radius.min(epsilon)
    }

    /// Collects up to `k` nodes strictly within `radius` of `center`, skipping `exclude`.
    ///
    /// With [`NeighborPolicy::FirstInStorageOrder`] these are the first `k` found in id order,
    /// not the `k` nearest.
    pub fn find_neighbors(
        &self,
        center: &Pose<F, N>,
        exclude: Option<NodeId>,
        radius: F,
        k: usize,
    ) -> Vec<NodeId> {
        let within = match self.neighbor_policy {
            NeighborPolicy::FirstInStorageOrder => {
                self.nearest_neighbors.within_radius(&center.position, radius)
            }
            NeighborPolicy::Nearest => self
                .nearest_neighbors
                .within_radius_sorted(&center.position, radius),
        };
        within
            .into_iter()
            .filter(|&id| Some(id) != exclude)
            .take(k)
            .collect()
    }

    /// Picks the candidate minimizing `cost(neighbor) + maneuver length`. Ties go to the first.
    ///
    /// Returns:
    /// The index into `candidates`, or `None` if it is empty.
    pub fn find_best_neighbor(&self, candidates: &[(NodeId, Maneuver<F, N>)]) -> Option<usize> {
        candidates
            .iter()
            .enumerate()
            .min_by_key(|(_, (id, maneuver))| OrderedFloat(self.cost_through(*id, maneuver)))
            .map(|(index, _)| index)
    }

    /// Finds the cheapest node satisfying the goal predicate. Ties go to the lowest id.
    pub fn find_best_node(&self, workspace: &mut Workspace<F, N>) -> Option<NodeId> {
        let mut best: Option<(NodeId, F)> = None;
        for (id, node) in self.iter() {
            if !workspace.check_at_goal(&node.pose) {
                continue;
            }
            if best.map_or(true, |(_, cost)| node.cost < cost) {
                best = Some((id, node.cost));
            }
        }
        best.map(|(id, _)| id)
    }

    // Edge cost
    // ---------

    /// Maneuver from a committed node to an arbitrary pose. Not cached.
    pub fn connect_to_pose(&self, from: NodeId, pose: &Pose<F, N>) -> Option<Maneuver<F, N>> {
        self.oracle.connect(&self.node(from).pose, pose)
    }

    /// Maneuver between two committed nodes, memoized by id pair.
    pub fn connect(&mut self, from: NodeId, to: NodeId) -> Option<Maneuver<F, N>> {
        let start = self.node(from).pose;
        let end = self.node(to).pose;
        self.cache
            .connect(self.oracle.as_ref(), (from, &start), (to, &end))
    }

    /// Edge cost of a maneuver: its traveled arc length.
    pub fn compute_cost(&self, maneuver: &Maneuver<F, N>) -> F {
        maneuver.length
    }

    /// Cost of reaching the end of `maneuver` through the committed node `from`.
    pub fn cost_through(&self, from: NodeId, maneuver: &Maneuver<F, N>) -> F {
        self.node(from).cost + self.compute_cost(maneuver)
    }

    /// Drops the memoized maneuvers starting or ending at `id`.
    pub fn forget_connections(&mut self, id: NodeId) {
        self.cache.forget(id);
    }

    /// Number of memoized maneuvers.
    pub fn cached_connections(&self) -> usize {
        self.cache.len()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// `(hits, misses)` of the maneuver cache since it was last cleared.
    pub fn cache_stats(&self) -> (usize, usize) {
        self.cache.stats()
    }

    // Tree mutation
    // -------------

    /// Commits a node, computing its cost from its parent.
    ///
    /// Returns:
    /// The id assigned to the node.
    pub fn add_node(&mut self, mut node: GraphNode<F, N>) -> NodeId {
        let id = self.nodes.len();
        node.children.clear();
        node.cost = match node.parent {
            Some(parent) => self.node(parent).cost + node.edge_cost,
            None => F::zero(),
        };
        let parent = node.parent;
        self.nearest_neighbors.add(node.pose.position, id);
        self.nodes.push(Some(node));
        self.node_count += 1;
        if let Some(parent) = parent {
            self.node_mut(parent).add_child(id);
        }
        id
    }

    /// Swaps the stored attributes of `id` for those of `node`, keeping its children.
    /// The child registration moves from the old parent to the new one and the cost is
    /// recomputed from the new parent. Descendants are not updated; see [`Self::propagate_cost`].
    pub fn replace_node(&mut self, id: NodeId, node: GraphNode<F, N>) {
        let old_position = self.node(id).pose.position;
        self.set_node_parent(id, node.parent);

        let cost = match node.parent {
            Some(parent) => self.node(parent).cost + node.edge_cost,
            None => F::zero(),
        };
        let moved = old_position != node.pose.position;
        let new_position = node.pose.position;
        {
            let current = self.node_mut(id);
            current.pose = node.pose;
            current.edge_cost = node.edge_cost;
            current.path_from_parent = node.path_from_parent;
            current.cost = cost;
        }
        if moved {
            self.nearest_neighbors.remove(&old_position, id);
            self.nearest_neighbors.add(new_position, id);
            self.cache.forget(id);
        }
    }

    /// Recomputes the cost of every descendant of `updated`, one generation at a time.
    pub fn propagate_cost(&mut self, updated: &[NodeId]) {
        let mut generation: Vec<NodeId> = updated.to_vec();
        while !generation.is_empty() {
            let mut next = Vec::new();
            for &parent_id in &generation {
                let parent_cost = self.node(parent_id).cost;
                let children = self.node(parent_id).children.clone();
                for child_id in children {
                    let child = self.node_mut(child_id);
                    child.cost = parent_cost + child.edge_cost;
                    next.push(child_id);
                }
            }
            generation = next;
        }
    }

    /// Records the edge `start -> end` for reporting.
    pub fn add_edge(&mut self, start: NodeId, end: NodeId) {
        let edge = Edge::new(start, self.node(start).pose, end, self.node(end).pose);
        self.edges.push(edge);
    }

    /// Deletes the reported edge `start -> end`, if present.
    pub fn remove_edge(&mut self, start: NodeId, end: NodeId) {
        if let Some(index) = self
            .edges
            .iter()
            .position(|e| e.start_id == start && e.end_id == end)
        {
            self.edges.remove(index);
        }
    }

    /// Removes every node in `remove` together with all of its descendants, deepest first.
    ///
    /// The `save` node and its own subtree survive. If its parent is removed it becomes the
    /// root with zero cost, and the costs below it are re-based.
    pub fn trim_tree_children(&mut self, remove: &[NodeId], save: Option<NodeId>) {
        let mut generations: Vec<Vec<NodeId>> = vec![remove
            .iter()
            .copied()
            .filter(|&id| self.contains(id))
            .collect()];
        loop {
            let next: Vec<NodeId> = generations
                .last()
                .into_iter()
                .flatten()
                .filter(|&&id| Some(id) != save)
                .flat_map(|&id| self.node(id).children.iter().copied())
                .collect();
            if next.is_empty() {
                break;
            }
            generations.push(next);
        }

        let mut removed = 0;
        for generation in generations.iter().rev() {
            for &id in generation {
                if Some(id) == save || !self.contains(id) {
                    continue;
                }
                self.delete_node(id);
                removed += 1;
            }
        }
        trace!("Trimmed {} nodes", removed);

        if let Some(save) = save {
            if self.contains(save) {
                let orphaned = self.node(save).parent.map_or(true, |p| !self.contains(p));
                if orphaned {
                    self.make_root(save);
                }
            }
        }
    }

    /// Re-roots the tree at `chain[0]` and keeps only the nodes of `chain`.
    ///
    /// Parameters:
    /// - `chain`: Consecutive tree nodes, each the parent of the next.
    pub fn retain_chain(&mut self, chain: &[NodeId]) -> Result<()> {
        let Some(&boundary) = chain.first() else {
            return Err(PlannerError::InvalidParameter(
                "cannot retain an empty chain".to_string(),
            ));
        };
        for &id in chain {
            self.get(id)?;
        }
        for pair in chain.windows(2) {
            if self.node(pair[1]).parent != Some(pair[0]) {
                return Err(PlannerError::InvalidParameter(format!(
                    "node {} is not the parent of node {}",
                    pair[0], pair[1]
                )));
            }
        }

        let old_root = self.root;
        if let Some(parent) = self.node(boundary).parent {
            self.remove_edge(parent, boundary);
            self.set_node_parent(boundary, None);
        }

        let mut off_chain = Vec::new();
        for (i, &id) in chain.iter().enumerate() {
            let keep = chain.get(i + 1).copied();
            off_chain.extend(
                self.node(id)
                    .children
                    .iter()
                    .copied()
                    .filter(|&child| Some(child) != keep),
            );
        }
        if old_root != boundary {
            off_chain.push(old_root);
        }
        self.trim_tree_children(&off_chain, Some(boundary));
        self.make_root(boundary);
        self.cache.clear();

        debug_assert!(self.debug_check_tree_consistency());
        debug_assert!(self.debug_check_costs());
        Ok(())
    }

    /// Node ids from the root to `id`.
    pub fn path_to(&self, id: NodeId) -> Result<Vec<NodeId>> {
        let mut path = vec![id];
        let mut current = self.get(id)?;
        while let Some(parent) = current.parent {
            path.push(parent);
            current = self.get(parent)?;
            if path.len() > self.node_count {
                return Err(PlannerError::InvalidParameter(format!(
                    "parent chain of node {} does not reach the root",
                    id
                )));
            }
        }
        path.reverse();
        Ok(path)
    }

    /// Poses of the given nodes, in order.
    pub fn poses(&self, ids: &[NodeId]) -> Vec<Pose<F, N>> {
        ids.iter().map(|&id| self.node(id).pose).collect()
    }

    /// Concatenated maneuver samples along a root-ward path, for high-fidelity export.
    pub fn sampled_path(&self, ids: &[NodeId]) -> Vec<Pose<F, N>> {
        let mut samples = Vec::new();
        for (i, &id) in ids.iter().enumerate() {
            let node = self.node(id);
            if i == 0 || node.path_from_parent.is_empty() {
                samples.push(node.pose);
            } else {
                // The first sample repeats the previous node
                samples.extend(node.path_from_parent.iter().skip(1).copied());
            }
        }
        samples
    }

    /// Sets the parent of a node, including by updating the new and old parent's child list.
    fn set_node_parent(&mut self, id: NodeId, parent: Option<NodeId>) {
        if let Some(old_parent) = self.node(id).parent {
            if self.contains(old_parent) {
                self.node_mut(old_parent).remove_child(id);
            }
        }
        self.node_mut(id).parent = parent;
        if let Some(parent) = parent {
            self.node_mut(parent).add_child(id);
        }
    }

    fn make_root(&mut self, id: NodeId) {
        let node = self.node_mut(id);
        node.parent = None;
        node.cost = F::zero();
        node.edge_cost = F::zero();
        node.path_from_parent.clear();
        self.root = id;
        self.propagate_cost(&[id]);
    }

    fn delete_node(&mut self, id: NodeId) {
        let node = self.nodes[id]
            .take()
            .unwrap_or_else(|| panic!("node {} is not in the graph", id));
        if let Some(parent) = node.parent {
            if self.contains(parent) {
                self.node_mut(parent).remove_child(id);
            }
        }
        for &child in &node.children {
            if self.contains(child) {
                self.node_mut(child).parent = None;
            }
        }
        self.edges.retain(|e| e.start_id != id && e.end_id != id);
        self.nearest_neighbors.remove(&node.pose.position, id);
        self.cache.forget(id);
        self.node_count -= 1;
    }

    // Debugging Assertion Functions
    // -----------------------------

    /// Checks the consistency of the tree.
    /// This checks the following:
    /// 1. Parent consistency: The parent of a node should have the node as a child.
    /// 2. Child consistency: The children of a node should have the node as a parent.
    /// 3. Single root: Only the root has no parent.
    /// 4. Cycle detection: Walking up from any node reaches the root.
    pub fn debug_check_tree_consistency(&self) -> bool {
        if !self.contains(self.root) {
            error!("Root {} is not in the graph", self.root);
            return false;
        }
        for (id, node) in self.iter() {
            match node.parent {
                Some(parent_id) => match self.get(parent_id) {
                    Ok(parent) if parent.children.contains(&id) => {}
                    Ok(_) => {
                        error!(
                            "Parent inconsistency! Node {} has parent {} but parent does not have child {}",
                            id, parent_id, id
                        );
                        return false;
                    }
                    Err(_) => {
                        error!("Node {} has dangling parent {}", id, parent_id);
                        return false;
                    }
                },
                None if id != self.root => {
                    error!("Node {} has no parent but the root is {}", id, self.root);
                    return false;
                }
                None => {}
            }

            for &child_id in &node.children {
                if self.get(child_id).ok().and_then(|c| c.parent) != Some(id) {
                    error!("Child inconsistency! Node {} lists child {}", id, child_id);
                    return false;
                }
            }

            let mut seen = HashSet::new();
            let mut current = id;
            while let Some(parent) = self.node(current).parent {
                if !seen.insert(current) {
                    error!("Cycle detected in tree! Node {} is visited twice", current);
                    return false;
                }
                current = parent;
            }
            if current != self.root {
                error!("Node {} does not reach the root", id);
                return false;
            }
        }
        true
    }

    /// Checks that every cumulative cost equals the parent's cost plus the edge cost.
    pub fn debug_check_costs(&self) -> bool {
        let tolerance = F::from(1e-4).unwrap();
        for (id, node) in self.iter() {
            let Some(parent_id) = node.parent else {
                if node.cost != F::zero() {
                    error!("Root {} has non-zero cost", id);
                    return false;
                }
                continue;
            };
            let parent = self.node(parent_id);
            let expected = parent.cost + node.edge_cost;
            if (expected - node.cost).abs() > tolerance || node.cost < parent.cost {
                error!(
                    "Cost mismatch for node {}: expected {}, but got {}",
                    id,
                    expected.to_f64().unwrap_or(f64::NAN),
                    node.cost.to_f64().unwrap_or(f64::NAN)
                );
                return false;
            }
        }
        true
    }
}

/// Computes the percolation radius constant `gamma_star`.
///
/// Parameters:
/// - `free_volume`: Freespace volume minus obstacle volume.
/// - `dimension`: The dimension of the position space.
///
/// Returns:
/// `2 * ((1 + 1/d) * free_volume / (zeta_d * d))^(1/d)`, or zero for a non-positive volume.
pub fn optimal_gamma<F: Float>(free_volume: F, dimension: usize) -> F {
    if free_volume <= F::zero() || dimension == 0 {
        return F::zero();
    }
    let d = F::from(dimension).unwrap();
    let zeta = F::from(unit_ball_volume(dimension)).unwrap();
    let two = F::from(2.0).unwrap();
    two * ((F::one() + F::one() / d) * (free_volume / (zeta * d))).powf(F::one() / d)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::RealVectorState;
    use crate::maneuver::DirectPath;
    use crate::obstacles::StaticRectangularObstacle;
    use crate::rrt::{LinearNearestNeighbors, UniformPoseDistribution};
    use crate::workspace::Freespace;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    type Graph = ConfigspaceGraph<f64, 2, LinearNearestNeighbors<f64, 2>>;

    fn graph(policy: NeighborPolicy) -> Graph {
        graph_with(DistanceMetric::Position, policy)
    }

    fn graph_with(metric: DistanceMetric, policy: NeighborPolicy) -> Graph {
        let freespace = Freespace::new(StaticRectangularObstacle::new(
            RealVectorState::new([0.0, 0.0]),
            RealVectorState::new([100.0, 100.0]),
        ));
        ConfigspaceGraph::new(
            Pose::at(RealVectorState::new([0.0, 0.0])),
            Box::new(UniformPoseDistribution::new(freespace, Some(1))),
            Box::new(DirectPath),
            100.0 * 100.0,
            metric,
            policy,
        )
    }

    fn attach(graph: &mut Graph, parent: NodeId, x: f64, y: f64) -> NodeId {
        let pose = Pose::at(RealVectorState::new([x, y]));
        let maneuver = graph.connect_to_pose(parent, &pose).unwrap();
        let id = graph.add_node(GraphNode::new(pose, parent, maneuver.length, maneuver.samples));
        graph.add_edge(parent, id);
        id
    }

    /// Re-derives every cost by walking to the root and summing edge costs.
    fn costs_match_root_walk(graph: &Graph) -> bool {
        graph.iter().all(|(id, node)| {
            let path = graph.path_to(id).unwrap();
            let walked: f64 = path.iter().skip(1).map(|&n| graph.node(n).edge_cost).sum();
            (walked - node.cost).abs() < 1e-9
        })
    }

    #[test]
    fn first_k_neighbors_in_storage_order() {
        let mut storage = graph(NeighborPolicy::FirstInStorageOrder);
        let mut nearest = graph(NeighborPolicy::Nearest);
        for i in 1..10 {
            let x = 1.0 - 0.1 * i as f64;
            attach(&mut storage, 0, x, 0.0);
            attach(&mut nearest, 0, x, 0.0);
        }
        let center = Pose::at(RealVectorState::new([0.0, 0.05]));

        assert_eq!(storage.find_neighbors(&center, Some(0), 5.0, 3), vec![1, 2, 3]);
        assert_eq!(storage.find_neighbors(&center, None, 5.0, 3), vec![0, 1, 2]);
        assert_eq!(nearest.find_neighbors(&center, Some(0), 5.0, 3), vec![9, 8, 7]);
        // Strictly inside the radius
        assert_eq!(storage.find_neighbors(&center, Some(0), 0.1, 10), Vec::<NodeId>::new());
    }

    #[test]
    fn weighted_metric_prefers_matching_heading_and_speed() {
        let mut position = graph(NeighborPolicy::FirstInStorageOrder);
        let mut weighted = graph_with(DistanceMetric::Weighted, NeighborPolicy::FirstInStorageOrder);
        for graph in [&mut position, &mut weighted] {
            let turned = Pose::new(RealVectorState::new([10.0, 0.0]), PI);
            let aligned = Pose::at(RealVectorState::new([14.0, 0.0])).with_velocity(2.0, 0.0);
            for pose in [turned, aligned] {
                let maneuver = graph.connect_to_pose(0, &pose).unwrap();
                let id = graph.add_node(GraphNode::new(pose, 0, maneuver.length, maneuver.samples));
                graph.add_edge(0, id);
            }
        }
        let sample = Pose::at(RealVectorState::new([11.0, 0.0])).with_velocity(2.0, 0.0);

        // 1.0 away but turned around, against 3.0 away with matching heading and speed
        assert_eq!(position.find_closest_node(&sample), Some(1));
        assert_eq!(weighted.find_closest_node(&sample), Some(2));

        // Turned around and stopped, the nearer node wins again
        let stopped = Pose::new(RealVectorState::new([11.0, 0.0]), PI);
        assert_eq!(weighted.find_closest_node(&stopped), Some(1));
    }

    #[test]
    fn radius_never_grows_with_node_count() {
        let graph = graph(NeighborPolicy::FirstInStorageOrder);
        assert_relative_eq!(graph.radius_for(1, 5.0), 5.0);
        assert_relative_eq!(graph.radius_for(2, 5.0), 5.0);
        let mut previous = f64::INFINITY;
        for n in 1..20_000 {
            let radius = graph.radius_for(n, 50.0);
            assert!(radius <= previous, "radius grew at n = {}", n);
            previous = radius;
        }
        assert!(graph.radius_for(20_000, 50.0) < 50.0);
    }

    #[test]
    fn gamma_star_matches_closed_form() {
        let expected = 2.0 * (1.5 * 10_000.0 / (std::f64::consts::PI * 2.0)).sqrt();
        assert_relative_eq!(optimal_gamma(10_000.0, 2), expected, epsilon = 1e-9);
        assert_eq!(optimal_gamma(0.0, 2), 0.0);
    }

    #[test]
    fn add_node_accumulates_cost() {
        let mut graph = graph(NeighborPolicy::FirstInStorageOrder);
        let a = attach(&mut graph, 0, 3.0, 4.0);
        let b = attach(&mut graph, a, 3.0, 10.0);
        assert_relative_eq!(graph.node(a).cost, 5.0);
        assert_relative_eq!(graph.node(b).cost, 11.0);
        assert_eq!(graph.node(0).children, vec![a]);
        assert_eq!(graph.edges().len(), 2);
        assert!(graph.debug_check_tree_consistency());
        assert!(graph.debug_check_costs());
    }

    #[test]
    fn replace_and_propagate_keeps_costs_closed() {
        let mut graph = graph(NeighborPolicy::FirstInStorageOrder);
        let a = attach(&mut graph, 0, 10.0, 0.0);
        let b = attach(&mut graph, a, 20.0, 0.0);
        let c = attach(&mut graph, b, 30.0, 0.0);
        let d = attach(&mut graph, 0, 5.0, 5.0);

        let maneuver = graph.connect(d, b).unwrap();
        let pose = graph.node(b).pose;
        graph.remove_edge(a, b);
        graph.add_edge(d, b);
        graph.replace_node(b, GraphNode::new(pose, d, maneuver.length, maneuver.samples));
        graph.propagate_cost(&[b]);

        assert!(graph.node(a).children.is_empty());
        assert_eq!(graph.node(d).children, vec![b]);
        assert_eq!(graph.node(b).children, vec![c]);
        let expected = 50f64.sqrt() + (15f64 * 15.0 + 25.0).sqrt() + 10.0;
        assert_relative_eq!(graph.node(c).cost, expected, epsilon = 1e-9);
        assert!(costs_match_root_walk(&graph));
        assert!(graph.debug_check_tree_consistency());
        assert!(graph.debug_check_costs());
    }

    #[test]
    fn best_neighbor_ties_go_to_first() {
        let mut graph = graph(NeighborPolicy::FirstInStorageOrder);
        let a = attach(&mut graph, 0, 0.0, 2.0);
        let b = attach(&mut graph, 0, 2.0, 0.0);
        let target = Pose::at(RealVectorState::new([2.0, 2.0]));
        let mut candidates = vec![
            (b, graph.connect_to_pose(b, &target).unwrap()),
            (a, graph.connect_to_pose(a, &target).unwrap()),
        ];
        assert_eq!(graph.find_best_neighbor(&candidates), Some(0));

        // The diagonal from the root is cheaper than either detour
        candidates.push((0, graph.connect_to_pose(0, &target).unwrap()));
        assert_eq!(graph.find_best_neighbor(&candidates), Some(2));
        assert_eq!(graph.find_best_neighbor(&[]), None);
    }

    #[test]
    fn trim_removes_descendants_but_keeps_saved_subtree() {
        let mut graph = graph(NeighborPolicy::FirstInStorageOrder);
        let a = attach(&mut graph, 0, 10.0, 0.0);
        let b = attach(&mut graph, a, 20.0, 0.0);
        let c = attach(&mut graph, b, 30.0, 0.0);
        let e = attach(&mut graph, a, 10.0, 10.0);

        graph.trim_tree_children(&[0], Some(b));

        assert_eq!(graph.node_count(), 2);
        assert!(!graph.contains(0) && !graph.contains(a) && !graph.contains(e));
        assert_eq!(graph.root(), b);
        assert_relative_eq!(graph.node(b).cost, 0.0);
        assert_relative_eq!(graph.node(c).cost, 10.0);
        assert_eq!(graph.edges().len(), 1);
        assert_eq!((graph.edges()[0].start_id, graph.edges()[0].end_id), (b, c));
        assert!(matches!(graph.get(a), Err(PlannerError::NodeNotFound(id)) if id == a));
        assert!(graph.debug_check_tree_consistency());

        // Removed ids are never handed out again
        let f = attach(&mut graph, c, 40.0, 0.0);
        assert_eq!(f, 5);
        assert_eq!(graph.find_closest_node(&Pose::at(RealVectorState::new([0.0, 0.0]))), Some(b));
    }

    #[test]
    fn retain_chain_reroots_at_the_boundary() {
        let mut graph = graph(NeighborPolicy::FirstInStorageOrder);
        let a = attach(&mut graph, 0, 10.0, 0.0);
        let b = attach(&mut graph, a, 20.0, 0.0);
        let c = attach(&mut graph, b, 30.0, 0.0);
        let _e = attach(&mut graph, a, 10.0, 10.0);
        let _f = attach(&mut graph, b, 20.0, 10.0);
        let _g = attach(&mut graph, c, 30.0, 10.0);

        graph.retain_chain(&[b, c]).unwrap();

        let remaining: Vec<NodeId> = graph.iter().map(|(id, _)| id).collect();
        assert_eq!(remaining, vec![b, c]);
        assert_eq!(graph.root(), b);
        assert!(graph.node(b).path_from_parent.is_empty());
        assert_relative_eq!(graph.node(c).cost, 10.0);
        assert_eq!(graph.path_to(c).unwrap(), vec![b, c]);

        assert!(graph.retain_chain(&[c, b]).is_err());
        assert!(graph.retain_chain(&[]).is_err());
    }

    #[test]
    fn cached_connections_are_reused() {
        let mut graph = graph(NeighborPolicy::FirstInStorageOrder);
        let a = attach(&mut graph, 0, 10.0, 0.0);
        let first = graph.connect(0, a);
        let second = graph.connect(0, a);
        assert_eq!(first, second);
        assert_eq!(graph.cache_stats(), (1, 1));
        assert_eq!(graph.cached_connections(), 1);
        graph.forget_connections(a);
        assert_eq!(graph.cached_connections(), 0);
        graph.clear_cache();
        assert_eq!(graph.cache_stats(), (0, 0));
    }

    #[test]
    fn cost_through_adds_the_edge_cost() {
        let mut graph = graph(NeighborPolicy::FirstInStorageOrder);
        let a = attach(&mut graph, 0, 3.0, 4.0);
        let maneuver = graph.connect_to_pose(a, &Pose::at(RealVectorState::new([3.0, 10.0]))).unwrap();
        assert_relative_eq!(graph.compute_cost(&maneuver), 6.0);
        assert_relative_eq!(graph.cost_through(a, &maneuver), 11.0);
    }

    #[test]
    fn sampled_path_concatenates_maneuvers() {
        let mut graph = graph(NeighborPolicy::FirstInStorageOrder);
        let a = attach(&mut graph, 0, 10.0, 0.0);
        let b = attach(&mut graph, a, 20.0, 0.0);
        let samples = graph.sampled_path(&graph.path_to(b).unwrap());
        assert_eq!(samples.len(), 1 + 2 * (crate::maneuver::NUM_SAMPLES - 1));
        assert_eq!(samples.first().unwrap().position, RealVectorState::new([0.0, 0.0]));
        assert_eq!(samples.last().unwrap().position, RealVectorState::new([20.0, 0.0]));
    }
}
