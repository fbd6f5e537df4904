//! Anytime RRT# motion planning for kinematically constrained vehicles among spherical obstacles.
//!
//! The tree lives in [`rrt::ConfigspaceGraph`], the sample/extend/rewire loop in
//! [`planner::ArrtsEngine`], and gate-by-gate chaining in [`planner::AnytimePlanner`].
//! [`planner::ArrtsService`] assembles a problem and runs it.

pub mod error;
pub mod geometry;
pub mod io;
pub mod maneuver;
pub mod obstacles;
pub mod planner;
pub mod rrt;
pub mod util;
pub mod vehicle;
pub mod workspace;

pub use error::{PlannerError, Result};
pub use planner::{
    calculate_path, AnytimePlanner, ArrtsEngine, ArrtsService, PlannerConfig, PlanningProblem,
    PlanningResult,
};
