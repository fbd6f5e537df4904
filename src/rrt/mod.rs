pub mod graph;
pub mod neighbors;
pub mod node;
pub mod sampling;
pub mod termination;
pub mod validity_checker;

pub use graph::{optimal_gamma, ConfigspaceGraph};
pub use neighbors::{KdTreeNearestNeighbors, LinearNearestNeighbors, NearestNeighbors};
pub use node::{Edge, GraphNode, NodeId};
pub use sampling::{SamplingDistribution, UniformPoseDistribution};
pub use termination::{
    AnyTermination, MaxIterationsTermination, MaxTimeTermination, TerminationCondition,
};
pub use validity_checker::{AlwaysValid, ValidityChecker};
