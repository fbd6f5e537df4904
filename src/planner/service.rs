use std::path::{Path, PathBuf};

use crate::error::{PlannerError, Result};
use crate::geometry::Pose;
use crate::io::{
    read_obstacles_or_default, read_states, read_vehicle_or_default, write_run_outputs,
    DEFAULT_OBSTACLES_FILE, DEFAULT_STATES_FILE, DEFAULT_VEHICLE_FILE,
};
use crate::obstacles::{RectangularObstacle, StaticSphericalObstacle};
use crate::planner::{
    AnytimePlanner, AnytimeResult, ArrtsEngine, PlannerConfig, PlanningResult, SpatialIndex,
};
use crate::rrt::{
    ConfigspaceGraph, KdTreeNearestNeighbors, LinearNearestNeighbors, NearestNeighbors,
    UniformPoseDistribution,
};
use crate::vehicle::Vehicle;
use crate::workspace::{ExtensionStrategy, Freespace, GoalRegion, Workspace};
use kiddo::float::kdtree::Axis;
use log::{info, warn};
use num_traits::Float;

/// Everything that describes one planning problem, independent of tuning.
#[derive(Debug, Clone)]
pub struct PlanningProblem<F: Float, const N: usize> {
    pub start: Pose<F, N>,
    pub goal: GoalRegion<F, N>,
    /// Gates visited in order before the goal when planning a route.
    pub gates: Vec<GoalRegion<F, N>>,
    pub obstacles: Vec<StaticSphericalObstacle<F, N>>,
    pub vehicle: Vehicle<F, N>,
    /// Sampling bounds. Derived from the start, gates and goal when unset.
    pub freespace: Option<Freespace<F, N>>,
}

impl<F: Float, const N: usize> PlanningProblem<F, N> {
    /// A problem with a point vehicle and no obstacles.
    pub fn new(start: Pose<F, N>, goal: GoalRegion<F, N>) -> Self {
        Self {
            start,
            goal,
            gates: Vec::new(),
            obstacles: Vec::new(),
            vehicle: Vehicle::point(),
            freespace: None,
        }
    }

    pub fn with_obstacles(mut self, obstacles: Vec<StaticSphericalObstacle<F, N>>) -> Self {
        self.obstacles = obstacles;
        self
    }

    pub fn with_vehicle(mut self, vehicle: Vehicle<F, N>) -> Self {
        self.vehicle = vehicle;
        self
    }

    pub fn with_gates(mut self, gates: Vec<GoalRegion<F, N>>) -> Self {
        self.gates = gates;
        self
    }

    pub fn with_freespace(mut self, freespace: Freespace<F, N>) -> Self {
        self.freespace = Some(freespace);
        self
    }

    /// Loads `states.txt`, `obstacles.txt` and `robot.txt` from `dir`.
    /// The obstacle and vehicle files are optional.
    ///
    /// Parameters:
    /// - `dir`: The data directory.
    /// - `goal_radius`: Goal radius used when the states file does not give one.
    pub fn from_data_directory(dir: impl AsRef<Path>, goal_radius: F) -> Result<Self> {
        let dir = dir.as_ref();
        let (start, goal) = read_states(&dir.join(DEFAULT_STATES_FILE), goal_radius)?;
        let obstacles = read_obstacles_or_default(&dir.join(DEFAULT_OBSTACLES_FILE))?;
        let vehicle = read_vehicle_or_default(&dir.join(DEFAULT_VEHICLE_FILE))?;
        Ok(Self::new(start, goal)
            .with_obstacles(obstacles)
            .with_vehicle(vehicle))
    }

    /// Gates followed by the goal.
    pub fn route(&self) -> Vec<GoalRegion<F, N>> {
        let mut route = self.gates.clone();
        route.push(self.goal);
        route
    }

    /// The explicit freespace, or the box around every route point grown by `buffer_ratio`.
    pub fn freespace(&self, buffer_ratio: F) -> Freespace<F, N> {
        if let Some(freespace) = &self.freespace {
            return freespace.clone();
        }
        let mut min_corner = self.start.position;
        let mut max_corner = self.start.position;
        let points = self
            .gates
            .iter()
            .chain(std::iter::once(&self.goal))
            .map(|g| g.center());
        for point in points {
            for i in 0..N {
                min_corner[i] = min_corner[i].min(point[i]);
                max_corner[i] = max_corner[i].max(point[i]);
            }
        }
        Freespace::around(&min_corner, &max_corner, buffer_ratio)
    }
}

/// The invocation surface: assembles problems and runs the planner on them.
pub struct ArrtsService<F: Float, const N: usize> {
    config: PlannerConfig<F>,
    output_dir: Option<PathBuf>,
}

impl<F: Float + Axis + 'static, const N: usize> ArrtsService<F, N> {
    pub fn new(config: PlannerConfig<F>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            output_dir: None,
        })
    }

    /// Writes the node, edge, search tree and path files of every run into `dir`.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn config(&self) -> &PlannerConfig<F> {
        &self.config
    }

    /// Plans from the start to the goal in a single run, ignoring any gates.
    pub fn calculate_path(&self, problem: &PlanningProblem<F, N>) -> Result<PlanningResult<F, N>> {
        match self.config.spatial_index {
            SpatialIndex::Linear => self.solve::<LinearNearestNeighbors<F, N>>(problem),
            SpatialIndex::KdTree => self.solve::<KdTreeNearestNeighbors<F, N>>(problem),
        }
    }

    /// Plans through every gate and then to the goal, chaining runs.
    pub fn calculate_route(&self, problem: &PlanningProblem<F, N>) -> Result<AnytimeResult<F, N>> {
        match self.config.spatial_index {
            SpatialIndex::Linear => self.solve_route::<LinearNearestNeighbors<F, N>>(problem),
            SpatialIndex::KdTree => self.solve_route::<KdTreeNearestNeighbors<F, N>>(problem),
        }
    }

    /// Assembles the freespace, workspace and graph of `problem`.
    ///
    /// The engine starts out aiming at the first gate, or at the goal if there are none.
    pub fn build_engine<NN: NearestNeighbors<F, N>>(
        &self,
        problem: &PlanningProblem<F, N>,
    ) -> Result<ArrtsEngine<F, N, NN>> {
        let mut freespace = problem.freespace(self.config.buffer_ratio);
        if let Some((min, max)) = self.config.speed_range {
            freespace = freespace.with_speed(min, max);
        }
        if let Some((min, max)) = self.config.yaw_rate_range {
            freespace = freespace.with_yaw_rate(min, max);
        }
        if matches!(self.config.extension, ExtensionStrategy::Kinematic { .. })
            && freespace.speed.0 == F::zero()
            && freespace.speed.1 == F::zero()
        {
            return Err(PlannerError::InvalidParameter(
                "kinematic extension needs a non-zero speed range".to_string(),
            ));
        }
        info!(
            "Freespace spans {} to {}",
            freespace.bounds.min_corner(),
            freespace.bounds.max_corner()
        );

        let first_goal = problem.gates.first().copied().unwrap_or(problem.goal);
        let mut workspace = Workspace::new(
            freespace.clone(),
            first_goal,
            self.config.goal_predicate,
            problem.vehicle.clone(),
        );
        workspace.add_obstacles(problem.obstacles.clone());
        if !workspace.node_is_safe(&problem.start) {
            warn!(
                "Start {} is outside the freespace or in collision",
                problem.start.position
            );
        }

        let graph = ConfigspaceGraph::new(
            problem.start,
            Box::new(UniformPoseDistribution::new(freespace, self.config.seed)),
            self.config.maneuver.build(),
            workspace.free_volume(),
            self.config.distance_metric,
            self.config.neighbor_policy,
        );
        Ok(ArrtsEngine::new(graph, workspace, self.config.clone()))
    }

    fn solve<NN: NearestNeighbors<F, N>>(
        &self,
        problem: &PlanningProblem<F, N>,
    ) -> Result<PlanningResult<F, N>> {
        let single = PlanningProblem {
            gates: Vec::new(),
            ..problem.clone()
        };
        let mut engine = self.build_engine::<NN>(&single)?;
        let result = engine.run()?;
        if let Some(dir) = &self.output_dir {
            let path_ids = result.path_ids.clone().unwrap_or_default();
            write_run_outputs(dir, 1, engine.graph(), &path_ids)?;
        }
        Ok(result)
    }

    fn solve_route<NN: NearestNeighbors<F, N>>(
        &self,
        problem: &PlanningProblem<F, N>,
    ) -> Result<AnytimeResult<F, N>> {
        let mut planner = AnytimePlanner::new(self.build_engine::<NN>(problem)?);
        if let Some(dir) = &self.output_dir {
            planner = planner.with_output_dir(dir.clone());
        }
        planner.plan(&problem.route())
    }
}

/// Plans a single run of `problem` with `config`.
pub fn calculate_path<F: Float + Axis + 'static, const N: usize>(
    problem: &PlanningProblem<F, N>,
    config: PlannerConfig<F>,
) -> Result<PlanningResult<F, N>> {
    ArrtsService::new(config)?.calculate_path(problem)
}
