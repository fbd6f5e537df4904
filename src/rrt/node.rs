use crate::geometry::Pose;
use num_traits::Float;
use serde::{Deserialize, Serialize};

/// Index of a node in the graph arena. Ids are never reused within a run.
pub type NodeId = usize;

/// A node in the RRT# tree.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GraphNode<F: Float, const N: usize> {
    /// The pose of the vehicle centroid.
    pub pose: Pose<F, N>,
    /// The id of the parent node (None if the node is the root).
    pub parent: Option<NodeId>,
    /// The ids of the children nodes.
    pub children: Vec<NodeId>,
    /// The cost from the parent to this node.
    pub edge_cost: F,
    /// Cost from the root to this node.
    pub cost: F,
    /// Maneuver samples from the parent to this node, empty for the root.
    pub path_from_parent: Vec<Pose<F, N>>,
}

impl<F: Float, const N: usize> GraphNode<F, N> {
    /// Constructs a root node with zero cost.
    pub fn root(pose: Pose<F, N>) -> Self {
        Self {
            pose,
            parent: None,
            children: Vec::new(),
            edge_cost: F::zero(),
            cost: F::zero(),
            path_from_parent: Vec::new(),
        }
    }

    /// Constructs a node attached to `parent`. The cumulative cost is filled in when it is added to the graph.
    pub fn new(pose: Pose<F, N>, parent: NodeId, edge_cost: F, path_from_parent: Vec<Pose<F, N>>) -> Self {
        Self {
            pose,
            parent: Some(parent),
            children: Vec::new(),
            edge_cost,
            cost: F::zero(),
            path_from_parent,
        }
    }

    pub fn add_child(&mut self, child: NodeId) {
        debug_assert!(!self.children.contains(&child));
        self.children.push(child);
    }

    pub fn remove_child(&mut self, child: NodeId) {
        if let Some(index) = self.children.iter().position(|&x| x == child) {
            self.children.remove(index);
        } else {
            #[cfg(debug_assertions)]
            {
                panic!("The child node {} does not exist on this node.", child);
            }
        }
    }

    pub fn pose(&self) -> &Pose<F, N> {
        &self.pose
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Snapshot of a tree edge for reporting. The parent/child index, not this list, drives planning.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge<F: Float, const N: usize> {
    pub start_id: NodeId,
    pub start: Pose<F, N>,
    pub end_id: NodeId,
    pub end: Pose<F, N>,
}

impl<F: Float, const N: usize> Edge<F, N> {
    pub fn new(start_id: NodeId, start: Pose<F, N>, end_id: NodeId, end: Pose<F, N>) -> Self {
        Self {
            start_id,
            start,
            end_id,
            end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::RealVectorState;

    #[test]
    fn children_bookkeeping() {
        let mut node = GraphNode::<f64, 2>::root(Pose::at(RealVectorState::new([0.0, 0.0])));
        assert!(node.is_root());
        node.add_child(3);
        node.add_child(5);
        node.remove_child(3);
        assert_eq!(node.children, vec![5]);
    }
}
