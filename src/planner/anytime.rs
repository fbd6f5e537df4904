use std::path::PathBuf;

use crate::error::{PlannerError, Result};
use crate::geometry::Pose;
use crate::io::write_run_outputs;
use crate::planner::{ArrtsEngine, PlanningResult};
use crate::rrt::NearestNeighbors;
use crate::workspace::GoalRegion;
use log::{info, warn};
use num_traits::Float;

/// Route through a sequence of gates, assembled from chained runs.
#[derive(Debug, Clone)]
pub struct AnytimeResult<F: Float, const N: usize> {
    /// One result per attempted gate.
    pub runs: Vec<PlanningResult<F, N>>,
    /// Committed poses from the start to the last reached gate.
    pub route: Vec<Pose<F, N>>,
    /// True if every gate was reached.
    pub completed: bool,
    pub gates_reached: usize,
}

impl<F: Float, const N: usize> AnytimeResult<F, N> {
    pub fn route_length(&self) -> F {
        self.route
            .windows(2)
            .fold(F::zero(), |length, pair| length + pair[0].distance(&pair[1]))
    }
}

/// Plans gate by gate, re-seeding every run from the tail of the previous best path.
pub struct AnytimePlanner<F: Float, const N: usize, NN: NearestNeighbors<F, N>> {
    engine: ArrtsEngine<F, N, NN>,
    tail_length: usize,
    output_dir: Option<PathBuf>,
}

impl<F: Float, const N: usize, NN: NearestNeighbors<F, N>> AnytimePlanner<F, N, NN> {
    pub fn new(engine: ArrtsEngine<F, N, NN>) -> Self {
        let tail_length = engine.config().tail_length.max(1);
        Self {
            engine,
            tail_length,
            output_dir: None,
        }
    }

    /// Writes the node, edge, search tree and path files of every run into `dir`.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn engine(&self) -> &ArrtsEngine<F, N, NN> {
        &self.engine
    }

    pub fn tail_length(&self) -> usize {
        self.tail_length
    }

    /// Runs the engine once per gate, in order.
    ///
    /// After each intermediate gate the last `tail_length` nodes of the best path are kept,
    /// the tree is re-rooted at the first of them, and everything before it is committed to
    /// the route. Chaining stops at the first gate that is not reached.
    pub fn plan(&mut self, gates: &[GoalRegion<F, N>]) -> Result<AnytimeResult<F, N>> {
        if gates.is_empty() {
            return Err(PlannerError::InvalidParameter(
                "anytime planning needs at least one gate".to_string(),
            ));
        }

        let mut result = AnytimeResult {
            runs: Vec::with_capacity(gates.len()),
            route: Vec::new(),
            completed: false,
            gates_reached: 0,
        };

        for (index, gate) in gates.iter().enumerate() {
            let last = index + 1 == gates.len();
            self.engine.workspace_mut().update_goal_region(*gate);
            let run = self.engine.run()?;

            let Some(ids) = run.path_ids.clone() else {
                warn!(
                    "Gate {} of {} at {} was not reached, stopping",
                    index + 1,
                    gates.len(),
                    gate.center()
                );
                result.runs.push(run);
                break;
            };
            result.gates_reached += 1;

            if let Some(dir) = &self.output_dir {
                write_run_outputs(dir, index + 1, self.engine.graph(), &ids)?;
            }

            if last {
                result.route.extend(self.engine.graph().poses(&ids));
                result.completed = true;
                result.runs.push(run);
                break;
            }

            let tail_start = ids.len().saturating_sub(self.tail_length);
            result
                .route
                .extend(self.engine.graph().poses(&ids[..tail_start]));
            self.engine.graph_mut().retain_chain(&ids[tail_start..])?;
            info!(
                "Gate {} reached, re-rooted at node {} keeping {} nodes",
                index + 1,
                ids[tail_start],
                self.engine.graph().node_count()
            );
            result.runs.push(run);
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::RealVectorState;
    use crate::maneuver::DirectPath;
    use crate::obstacles::StaticRectangularObstacle;
    use crate::planner::PlannerConfig;
    use crate::rrt::{ConfigspaceGraph, LinearNearestNeighbors, UniformPoseDistribution};
    use crate::vehicle::Vehicle;
    use crate::workspace::{Freespace, GoalPredicate, Workspace};

    fn planner(tail_length: usize) -> AnytimePlanner<f64, 2, LinearNearestNeighbors<f64, 2>> {
        let freespace = Freespace::new(StaticRectangularObstacle::new(
            RealVectorState::new([0.0, 0.0]),
            RealVectorState::new([100.0, 100.0]),
        ));
        let start = Pose::at(RealVectorState::new([0.0, 0.0]));
        let goal = GoalRegion::new(Pose::at(RealVectorState::new([90.0, 90.0])), 5.0);
        let workspace = Workspace::new(
            freespace.clone(),
            goal,
            GoalPredicate::BoundingRadius,
            Vehicle::point(),
        );
        let graph = ConfigspaceGraph::new(
            start,
            Box::new(UniformPoseDistribution::new(freespace, Some(7))),
            Box::new(DirectPath),
            workspace.free_volume(),
            Default::default(),
            Default::default(),
        );
        let config = PlannerConfig {
            min_node_count: 200,
            tail_length,
            seed: Some(7),
            ..PlannerConfig::default()
        };
        AnytimePlanner::new(ArrtsEngine::new(graph, workspace, config))
    }

    fn gates() -> Vec<GoalRegion<f64, 2>> {
        vec![
            GoalRegion::new(Pose::at(RealVectorState::new([50.0, 50.0])), 5.0),
            GoalRegion::new(Pose::at(RealVectorState::new([90.0, 90.0])), 5.0),
        ]
    }

    #[test]
    fn chains_through_every_gate() {
        let mut planner = planner(3);
        let result = planner.plan(&gates()).unwrap();

        assert!(result.completed);
        assert_eq!(result.gates_reached, 2);
        assert_eq!(result.runs.len(), 2);
        assert_eq!(result.route[0].position, RealVectorState::new([0.0, 0.0]));
        let end = result.route.last().unwrap();
        assert!(end.position.euclidean_distance(&RealVectorState::new([90.0, 90.0])) < 5.0);
        // Consecutive route poses are distinct tree nodes
        assert!(result.route.windows(2).all(|p| p[0] != p[1]));
        assert!(planner.engine().graph().debug_check_tree_consistency());
    }

    #[test]
    fn tail_longer_than_path_keeps_the_root() {
        let mut planner = planner(1000);
        let result = planner.plan(&gates()).unwrap();
        assert!(result.completed);
        assert_eq!(result.route[0].position, RealVectorState::new([0.0, 0.0]));
        assert_eq!(planner.engine().graph().root(), 0);
    }

    #[test]
    fn no_gates_is_an_error() {
        assert!(planner(3).plan(&[]).is_err());
    }
}
