pub mod anytime;
pub mod config;
pub mod engine;
pub mod result;
pub mod service;

pub use anytime::{AnytimePlanner, AnytimeResult};
pub use config::{DistanceMetric, NeighborPolicy, PlannerConfig, SpatialIndex};
pub use engine::ArrtsEngine;
pub use result::PlanningResult;
pub use service::{calculate_path, ArrtsService, PlanningProblem};
