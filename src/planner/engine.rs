use std::time::Instant;

use crate::error::Result;
use crate::geometry::Pose;
use crate::maneuver::Maneuver;
use crate::planner::{PlannerConfig, PlanningResult};
use crate::rrt::{
    AnyTermination, ConfigspaceGraph, GraphNode, MaxIterationsTermination, MaxTimeTermination,
    NearestNeighbors, NodeId, TerminationCondition, ValidityChecker,
};
use crate::workspace::Workspace;
use log::{debug, info, trace};
use num_traits::Float;

/// Runs the RRT# loop over a graph and a workspace.
pub struct ArrtsEngine<F: Float, const N: usize, NN: NearestNeighbors<F, N>> {
    graph: ConfigspaceGraph<F, N, NN>,
    workspace: Workspace<F, N>,
    config: PlannerConfig<F>,
    /// Set once a committed node satisfies the goal predicate. Never unset within a run.
    goal_reached: bool,
    /// Iterations of the current run.
    iterations: usize,
}

impl<F: Float, const N: usize, NN: NearestNeighbors<F, N>> ArrtsEngine<F, N, NN> {
    pub fn new(
        graph: ConfigspaceGraph<F, N, NN>,
        workspace: Workspace<F, N>,
        config: PlannerConfig<F>,
    ) -> Self {
        Self {
            graph,
            workspace,
            config,
            goal_reached: false,
            iterations: 0,
        }
    }

    pub fn graph(&self) -> &ConfigspaceGraph<F, N, NN> {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut ConfigspaceGraph<F, N, NN> {
        &mut self.graph
    }

    pub fn workspace(&self) -> &Workspace<F, N> {
        &self.workspace
    }

    pub fn workspace_mut(&mut self) -> &mut Workspace<F, N> {
        &mut self.workspace
    }

    pub fn config(&self) -> &PlannerConfig<F> {
        &self.config
    }

    pub fn goal_reached(&self) -> bool {
        self.goal_reached
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Grows the tree until the goal is reached with at least `min_node_count` nodes,
    /// or until the iteration or time budget runs out.
    pub fn run(&mut self) -> Result<PlanningResult<F, N>> {
        let started = Instant::now();
        let mut termination = self.termination();
        self.iterations = 0;
        self.graph.clear_cache();
        self.goal_reached = self.graph.find_best_node(&mut self.workspace).is_some();

        let min_node_count = self.config.min_node_count;
        let progress_step = (min_node_count / 10).max(1);
        let mut next_progress = self.graph.node_count() + progress_step;

        info!(
            "Planning from {} toward {} (radius {:.3}) with a budget of {} nodes",
            self.graph.node(self.graph.root()).pose.position,
            self.workspace.goal().center(),
            self.workspace.goal().radius.to_f64().unwrap_or(f64::NAN),
            min_node_count
        );

        loop {
            if self.goal_reached && self.graph.node_count() >= min_node_count {
                break;
            }
            if termination.evaluate() {
                debug!("Termination condition met after {} iterations", self.iterations);
                break;
            }
            self.iteration();

            if self.graph.node_count() >= next_progress {
                debug!(
                    "{} nodes after {} iterations, goal reached: {}",
                    self.graph.node_count(),
                    self.iterations,
                    self.goal_reached
                );
                next_progress += progress_step;
            }
        }

        debug_assert!(self.graph.debug_check_tree_consistency());
        debug_assert!(self.graph.debug_check_costs());

        let result = self.result(started)?;
        info!("{}", result.summary());
        Ok(result)
    }

    /// Runs one sample, extend, connect and rewire step.
    ///
    /// Returns:
    /// The id of the committed node, or `None` if the iteration was skipped.
    pub fn iteration(&mut self) -> Option<NodeId> {
        let biased = self.iterations % self.config.goal_bias_interval() == 0;
        self.iterations += 1;
        let sample = if biased {
            self.graph.generate_biased_node(self.workspace.goal())
        } else {
            self.graph.generate_random_node()
        };

        let mut parent = self.graph.find_closest_node(&sample)?;
        let parent_pose = self.graph.node(parent).pose;
        if self.workspace.check_at_goal(&parent_pose) {
            trace!("Closest node {} already satisfies the goal", parent);
            return None;
        }

        let Some(pose) = self.config.extension.extend(
            &parent_pose,
            &sample,
            self.config.epsilon,
            &self.workspace,
        ) else {
            trace!("Extension from node {} blocked", parent);
            return None;
        };

        let Some(mut maneuver) = self.feasible(self.graph.connect_to_pose(parent, &pose)) else {
            trace!("No feasible maneuver from node {}", parent);
            return None;
        };

        let radius = self.graph.compute_radius(self.config.epsilon);
        let mut neighbors: Vec<NodeId> = self
            .graph
            .find_neighbors(&pose, Some(parent), radius, self.config.max_neighbors)
            .into_iter()
            .filter(|&n| self.workspace.path_is_safe(&self.graph.node(n).pose, &pose))
            .collect();

        let mut candidates: Vec<(NodeId, Maneuver<F, N>)> = Vec::with_capacity(neighbors.len());
        for &n in &neighbors {
            if let Some(m) = self.feasible(self.graph.connect_to_pose(n, &pose)) {
                candidates.push((n, m));
            }
        }
        if let Some(best) = self.graph.find_best_neighbor(&candidates) {
            let best_id = candidates[best].0;
            let through_best = self.graph.cost_through(best_id, &candidates[best].1);
            if through_best < self.graph.cost_through(parent, &maneuver) {
                parent = best_id;
                maneuver = candidates.swap_remove(best).1;
                neighbors.retain(|&n| n != best_id);
            }
        }

        let edge_cost = self.graph.compute_cost(&maneuver);
        let id = self.graph.add_node(GraphNode::new(pose, parent, edge_cost, maneuver.samples));
        self.graph.add_edge(parent, id);

        if !self.goal_reached && self.workspace.check_at_goal(&pose) {
            self.goal_reached = true;
            info!(
                "Goal region reached by node {} after {} iterations",
                id, self.iterations
            );
        }

        self.rewire(id, &neighbors);
        Some(id)
    }

    /// Re-parents every neighbor that becomes strictly cheaper through `id`.
    ///
    /// Maneuvers out of `id` are only memoized for the duration of the pass.
    fn rewire(&mut self, id: NodeId, neighbors: &[NodeId]) {
        for &n in neighbors {
            let maneuver = self.graph.connect(id, n);
            let Some(maneuver) = self.feasible(maneuver) else {
                continue;
            };
            let new_cost = self.graph.cost_through(id, &maneuver);
            if new_cost >= self.graph.node(n).cost {
                continue;
            }

            let neighbor_pose = self.graph.node(n).pose;
            let old_parent = self.graph.node(n).parent;
            if let Some(old_parent) = old_parent {
                self.graph.remove_edge(old_parent, n);
            }
            self.graph.add_edge(id, n);
            let edge_cost = self.graph.compute_cost(&maneuver);
            self.graph.replace_node(
                n,
                GraphNode::new(neighbor_pose, id, edge_cost, maneuver.samples),
            );
            self.graph.propagate_cost(&[n]);
            trace!("Rewired node {} through node {}", n, id);
        }
        self.graph.forget_connections(id);
    }

    /// Keeps a maneuver only if it can be committed and stays clear of obstacles.
    fn feasible(&self, maneuver: Option<Maneuver<F, N>>) -> Option<Maneuver<F, N>> {
        maneuver.filter(|m| m.is_extendable() && self.workspace.is_maneuver_valid(m))
    }

    fn termination(&self) -> AnyTermination {
        let mut termination = AnyTermination::new().with(Box::new(MaxIterationsTermination::new(
            self.config.max_iterations(),
        )));
        if let Some(max_time) = self.config.max_time() {
            termination = termination.with(Box::new(MaxTimeTermination::new(max_time)));
        }
        termination
    }

    fn result(&mut self, started: Instant) -> Result<PlanningResult<F, N>> {
        let best = if self.goal_reached {
            self.graph.find_best_node(&mut self.workspace)
        } else {
            None
        };
        let (path_ids, path, final_cost) = match best {
            Some(best) => {
                let ids = self.graph.path_to(best)?;
                let poses: Vec<Pose<F, N>> = self.graph.poses(&ids);
                let cost = self.graph.node(best).cost;
                (Some(ids), Some(poses), Some(cost))
            }
            None => (None, None, None),
        };
        Ok(PlanningResult {
            goal_reached: self.goal_reached,
            path,
            path_ids,
            final_cost,
            node_count: self.graph.node_count(),
            iterations: self.iterations,
            elapsed: started.elapsed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::RealVectorState;
    use crate::maneuver::DirectPath;
    use crate::obstacles::{StaticRectangularObstacle, StaticSphericalObstacle};
    use crate::rrt::{LinearNearestNeighbors, UniformPoseDistribution};
    use crate::vehicle::Vehicle;
    use crate::workspace::{Freespace, GoalPredicate, GoalRegion};

    type Engine = ArrtsEngine<f64, 2, LinearNearestNeighbors<f64, 2>>;

    fn engine(obstacles: Vec<StaticSphericalObstacle<f64, 2>>, config: PlannerConfig<f64>) -> Engine {
        let freespace = Freespace::new(StaticRectangularObstacle::new(
            RealVectorState::new([0.0, 0.0]),
            RealVectorState::new([100.0, 100.0]),
        ));
        let goal = GoalRegion::new(Pose::at(RealVectorState::new([90.0, 90.0])), 5.0);
        let mut workspace = Workspace::new(
            freespace.clone(),
            goal,
            GoalPredicate::BoundingRadius,
            Vehicle::point(),
        );
        workspace.add_obstacles(obstacles);
        let graph = ConfigspaceGraph::new(
            Pose::at(RealVectorState::new([1.0, 1.0])),
            Box::new(UniformPoseDistribution::new(freespace, config.seed)),
            Box::new(DirectPath),
            workspace.free_volume(),
            config.distance_metric,
            config.neighbor_policy,
        );
        ArrtsEngine::new(graph, workspace, config)
    }

    fn config(min_node_count: usize) -> PlannerConfig<f64> {
        PlannerConfig {
            min_node_count,
            seed: Some(5),
            ..PlannerConfig::default()
        }
    }

    #[test]
    fn first_iteration_steps_toward_goal() {
        let mut engine = engine(Vec::new(), config(100));
        // Iteration 0 is goal biased
        let id = engine.iteration().unwrap();
        let node = engine.graph().node(id);
        assert_eq!(node.parent, Some(0));
        assert!((node.cost - 5.0).abs() < 1e-9);
        assert!(node.pose.position[0] > 1.0 && node.pose.position[1] > 1.0);
    }

    #[test]
    fn run_stops_once_goal_and_budget_are_met() {
        let mut engine = engine(Vec::new(), config(150));
        let result = engine.run().unwrap();
        assert!(result.goal_reached);
        assert!(result.node_count >= 150);
        assert!(result.iterations < engine.config().max_iterations());
        let ids = result.path_ids.unwrap();
        assert_eq!(ids[0], engine.graph().root());
        assert!((engine.graph().node(*ids.last().unwrap()).cost - result.final_cost.unwrap()).abs() < 1e-9);
        assert!(engine.graph().debug_check_costs());
    }

    #[test]
    fn rewire_maneuvers_are_not_retained() {
        let mut engine = engine(Vec::new(), config(500));
        for _ in 0..300 {
            engine.iteration();
            assert_eq!(engine.graph().cached_connections(), 0);
        }
        let (_, misses) = engine.graph().cache_stats();
        assert!(misses > 0);
    }

    #[test]
    fn blocked_start_never_grows() {
        let cover = vec![StaticSphericalObstacle::new(RealVectorState::new([50.0, 50.0]), 100.0)];
        let config = PlannerConfig {
            max_iterations: Some(200),
            ..config(100)
        };
        let mut engine = engine(cover, config);
        let result = engine.run().unwrap();
        assert!(!result.goal_reached);
        assert!(result.path.is_none());
        assert_eq!(result.node_count, 1);
        assert_eq!(result.iterations, 200);
    }

    #[test]
    fn time_budget_ends_the_run() {
        let config = PlannerConfig {
            max_time_secs: Some(0.0),
            ..config(100)
        };
        let mut engine = engine(Vec::new(), config);
        let result = engine.run().unwrap();
        assert_eq!(result.iterations, 0);
        assert_eq!(result.node_count, 1);
    }
}
