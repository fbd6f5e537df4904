use crate::geometry::{Pose, RealVectorState};
use crate::obstacles::{obstacles_within, SphericalObstacle, StaticSphericalObstacle};
use crate::rrt::ValidityChecker;
use crate::vehicle::Vehicle;
use crate::workspace::{Freespace, GoalPredicate, GoalRegion};
use log::{debug, info};
use num_traits::Float;

/// Obstacles, freespace, goal region and vehicle of one planning problem.
pub struct Workspace<F: Float, const N: usize> {
    freespace: Freespace<F, N>,
    obstacles: Vec<StaticSphericalObstacle<F, N>>,
    obstacle_volume: F,
    goal: GoalRegion<F, N>,
    goal_predicate: GoalPredicate<F>,
    vehicle: Vehicle<F, N>,
}

impl<F: Float, const N: usize> Workspace<F, N> {
    /// Constructs a workspace with no obstacles.
    ///
    /// Parameters:
    /// - `freespace`: Sampling bounds. Obstacles outside them are ignored.
    /// - `goal`: The goal region.
    /// - `goal_predicate`: The arrival rule evaluated by `check_at_goal`.
    /// - `vehicle`: The vehicle outline.
    pub fn new(
        freespace: Freespace<F, N>,
        goal: GoalRegion<F, N>,
        goal_predicate: GoalPredicate<F>,
        vehicle: Vehicle<F, N>,
    ) -> Self {
        Self {
            freespace,
            obstacles: Vec::new(),
            obstacle_volume: F::zero(),
            goal,
            goal_predicate,
            vehicle,
        }
    }

    /// Adds obstacles, dropping those that do not touch the freespace bounds.
    pub fn add_obstacles(&mut self, obstacles: Vec<StaticSphericalObstacle<F, N>>) {
        let offered = obstacles.len();
        let (kept, volume) = obstacles_within(obstacles, &self.freespace.bounds);
        if kept.len() < offered {
            debug!(
                "Dropped {} obstacles outside the freespace bounds",
                offered - kept.len()
            );
        }
        self.obstacles.extend(kept);
        self.obstacle_volume = self.obstacle_volume + volume;
        info!(
            "Workspace has {} obstacles, obstacle volume {:.3}",
            self.obstacles.len(),
            self.obstacle_volume.to_f64().unwrap_or(f64::NAN)
        );
    }

    pub fn obstacles(&self) -> &[StaticSphericalObstacle<F, N>] {
        &self.obstacles
    }

    pub fn obstacle_volume(&self) -> F {
        self.obstacle_volume
    }

    /// Freespace volume minus obstacle volume, never below zero.
    pub fn free_volume(&self) -> F {
        (self.freespace.volume() - self.obstacle_volume).max(F::zero())
    }

    pub fn freespace(&self) -> &Freespace<F, N> {
        &self.freespace
    }

    pub fn goal(&self) -> &GoalRegion<F, N> {
        &self.goal
    }

    pub fn goal_predicate(&self) -> &GoalPredicate<F> {
        &self.goal_predicate
    }

    pub fn vehicle(&self) -> &Vehicle<F, N> {
        &self.vehicle
    }

    /// Replaces the goal region, as done between chained runs.
    pub fn update_goal_region(&mut self, goal: GoalRegion<F, N>) {
        self.goal = goal;
    }

    /// True if the vehicle placed at `pose` stays in the freespace and keeps all body points
    /// out of every obstacle.
    pub fn node_is_safe(&self, pose: &Pose<F, N>) -> bool {
        if !self.freespace.contains(pose) {
            return false;
        }
        let reach = self.vehicle.bounding_radius();
        let mut body_points: Option<Vec<RealVectorState<F, N>>> = None;
        for obstacle in &self.obstacles {
            let distance = pose.position.euclidean_distance(obstacle.center());
            if distance >= obstacle.radius() + reach {
                continue;
            }
            if SphericalObstacle::contains(obstacle, &pose.position) {
                return false;
            }
            let points = body_points.get_or_insert_with(|| self.vehicle.body_points_at(pose));
            if points
                .iter()
                .any(|p| SphericalObstacle::contains(obstacle, p))
            {
                return false;
            }
        }
        true
    }

    /// True if the straight segment between the two centroids misses every obstacle.
    pub fn path_is_safe(&self, a: &Pose<F, N>, b: &Pose<F, N>) -> bool {
        self.obstacles
            .iter()
            .all(|o| !SphericalObstacle::intersects_edge(o, &a.position, &b.position))
    }

    /// Moves the vehicle to `pose` and evaluates the goal predicate.
    pub fn check_at_goal(&mut self, pose: &Pose<F, N>) -> bool {
        self.vehicle.update_state(pose);
        self.goal.is_reached(
            pose,
            self.vehicle.world_points(),
            self.vehicle.bounding_radius(),
            &self.goal_predicate,
        )
    }
}

impl<F: Float, const N: usize> ValidityChecker<F, N> for Workspace<F, N> {
    fn is_pose_valid(&self, pose: &Pose<F, N>) -> bool {
        self.node_is_safe(pose)
    }

    fn is_segment_valid(&self, a: &Pose<F, N>, b: &Pose<F, N>) -> bool {
        self.path_is_safe(a, b)
    }
}
