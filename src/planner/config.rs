use std::path::Path;
use std::time::Duration;

use crate::error::{PlannerError, Result};
use crate::maneuver::ManeuverKind;
use crate::workspace::{ExtensionStrategy, GoalPredicate};
use json::JsonValue;
use num_traits::Float;
use serde::{Deserialize, Serialize};

/// Which near neighbors are kept when more than `k` lie within the radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NeighborPolicy {
    /// The first `k` in node id order.
    #[default]
    FirstInStorageOrder,
    /// The `k` nearest, nearest first.
    Nearest,
}

/// Metric used to pick the closest tree node to a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DistanceMetric {
    /// Euclidean distance between positions.
    #[default]
    Position,
    /// `0.5 * position distance + heading difference + speed difference`.
    Weighted,
}

/// Backing structure of the neighbor index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpatialIndex {
    #[default]
    Linear,
    KdTree,
}

/// Tuning parameters of one planner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig<F> {
    /// Maximum extension distance, also the cap on the neighbor radius.
    pub epsilon: F,
    /// Maximum number of near neighbors considered per iteration (k).
    pub max_neighbors: usize,
    /// The loop keeps improving the tree until it holds this many nodes.
    pub min_node_count: usize,
    /// Number of path nodes retained between chained runs (m).
    pub tail_length: usize,
    /// Every n-th iteration samples the goal. Derived from `min_node_count` when unset.
    pub goal_bias_interval: Option<usize>,
    /// Iteration cap. Derived from `min_node_count` when unset.
    pub max_iterations: Option<usize>,
    /// Optional wall-clock cap per run, in seconds.
    pub max_time_secs: Option<f64>,
    /// Seed for the sampler. Seeded from the OS when unset.
    pub seed: Option<u64>,
    pub neighbor_policy: NeighborPolicy,
    pub distance_metric: DistanceMetric,
    pub goal_predicate: GoalPredicate<F>,
    pub maneuver: ManeuverKind<F>,
    pub extension: ExtensionStrategy<F>,
    pub spatial_index: SpatialIndex,
    /// Growth of the derived freespace box, relative to the start/goal separation.
    pub buffer_ratio: F,
    /// Sampled speed range. Overrides the freespace's when set.
    pub speed_range: Option<(F, F)>,
    /// Sampled yaw rate range. Overrides the freespace's when set.
    pub yaw_rate_range: Option<(F, F)>,
}

impl<F: Float> Default for PlannerConfig<F> {
    fn default() -> Self {
        Self {
            epsilon: F::from(5.0).unwrap(),
            max_neighbors: 10,
            min_node_count: 2000,
            tail_length: 40,
            goal_bias_interval: None,
            max_iterations: None,
            max_time_secs: None,
            seed: None,
            neighbor_policy: NeighborPolicy::default(),
            distance_metric: DistanceMetric::default(),
            goal_predicate: GoalPredicate::default(),
            maneuver: ManeuverKind::default(),
            extension: ExtensionStrategy::default(),
            spatial_index: SpatialIndex::default(),
            buffer_ratio: F::from(0.5).unwrap(),
            speed_range: None,
            yaw_rate_range: None,
        }
    }
}

impl<F: Float> PlannerConfig<F> {
    /// Goal-biased sampling cadence, at least every iteration.
    pub fn goal_bias_interval(&self) -> usize {
        self.goal_bias_interval
            .unwrap_or_else(|| (self.min_node_count as f64 * 0.01).ceil() as usize)
            .max(1)
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
            .unwrap_or_else(|| self.min_node_count.saturating_mul(50))
    }

    pub fn max_time(&self) -> Option<Duration> {
        self.max_time_secs.map(Duration::from_secs_f64)
    }

    /// Rejects parameter combinations the planner cannot run with.
    pub fn validate(&self) -> Result<()> {
        if !(self.epsilon > F::zero()) || !self.epsilon.is_finite() {
            return Err(PlannerError::InvalidParameter(
                "epsilon must be positive and finite".to_string(),
            ));
        }
        if self.tail_length == 0 {
            return Err(PlannerError::InvalidParameter(
                "tail_length must be at least 1".to_string(),
            ));
        }
        if self.buffer_ratio < F::zero() {
            return Err(PlannerError::InvalidParameter(
                "buffer_ratio must not be negative".to_string(),
            ));
        }
        for (name, range) in [
            ("speed_range", self.speed_range),
            ("yaw_rate_range", self.yaw_rate_range),
        ] {
            if let Some((min, max)) = range {
                if !min.is_finite() || !max.is_finite() || min > max {
                    return Err(PlannerError::InvalidParameter(format!(
                        "{} must be a finite [min, max] pair",
                        name
                    )));
                }
            }
        }
        if let Some(secs) = self.max_time_secs {
            if !(secs >= 0.0) || !secs.is_finite() {
                return Err(PlannerError::InvalidParameter(format!(
                    "max_time_secs must be a non-negative number, got {}",
                    secs
                )));
            }
        }
        if let ManeuverKind::Dubins {
            turning_radius,
            min_pitch,
            max_pitch,
        } = self.maneuver
        {
            if !(turning_radius > F::zero()) || min_pitch > max_pitch {
                return Err(PlannerError::InvalidParameter(
                    "Dubins maneuvers need a positive turning radius and min_pitch <= max_pitch"
                        .to_string(),
                ));
            }
        }
        if let ExtensionStrategy::Kinematic {
            step_time,
            max_steps,
            ..
        } = self.extension
        {
            if !(step_time > F::zero()) || max_steps == 0 {
                return Err(PlannerError::InvalidParameter(
                    "kinematic extension needs a positive step_time and max_steps".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Loads a configuration from a JSON document. Missing fields keep their defaults.
    ///
    /// ```json
    /// {
    ///     "epsilon": 5.0,
    ///     "min_node_count": 2000,
    ///     "seed": 7,
    ///     "neighbor_policy": "nearest",
    ///     "maneuver": { "kind": "dubins", "turning_radius": 5.0 },
    ///     "goal_predicate": { "kind": "pose_tolerance", "heading_tolerance": 0.26, "speed_tolerance": 0.5 }
    /// }
    /// ```
    pub fn from_json(text: &str) -> Result<Self> {
        let value = json::parse(text)?;
        if !value.is_object() {
            return Err(PlannerError::InvalidParameter(
                "planner configuration must be a JSON object".to_string(),
            ));
        }

        let mut config = Self::default();
        if let Some(epsilon) = float_field(&value, "epsilon")? {
            config.epsilon = epsilon;
        }
        if let Some(buffer_ratio) = float_field(&value, "buffer_ratio")? {
            config.buffer_ratio = buffer_ratio;
        }
        if let Some(k) = usize_field(&value, "max_neighbors")? {
            config.max_neighbors = k;
        }
        if let Some(min_node_count) = usize_field(&value, "min_node_count")? {
            config.min_node_count = min_node_count;
        }
        if let Some(tail_length) = usize_field(&value, "tail_length")? {
            config.tail_length = tail_length;
        }
        config.speed_range = range_field(&value, "speed_range")?;
        config.yaw_rate_range = range_field(&value, "yaw_rate_range")?;
        config.goal_bias_interval = usize_field(&value, "goal_bias_interval")?;
        config.max_iterations = usize_field(&value, "max_iterations")?;
        config.max_time_secs = float_field::<f64>(&value, "max_time_secs")?;
        config.seed = match &value["seed"] {
            JsonValue::Null => None,
            seed => Some(seed.as_u64().ok_or_else(|| invalid("seed", seed))?),
        };

        if let Some(policy) = str_field(&value, "neighbor_policy")? {
            config.neighbor_policy = match policy {
                "first_in_storage_order" => NeighborPolicy::FirstInStorageOrder,
                "nearest" => NeighborPolicy::Nearest,
                other => return Err(unknown("neighbor_policy", other)),
            };
        }
        if let Some(metric) = str_field(&value, "distance_metric")? {
            config.distance_metric = match metric {
                "position" => DistanceMetric::Position,
                "weighted" => DistanceMetric::Weighted,
                other => return Err(unknown("distance_metric", other)),
            };
        }
        if let Some(index) = str_field(&value, "spatial_index")? {
            config.spatial_index = match index {
                "linear" => SpatialIndex::Linear,
                "kdtree" => SpatialIndex::KdTree,
                other => return Err(unknown("spatial_index", other)),
            };
        }

        let predicate = &value["goal_predicate"];
        if !predicate.is_null() {
            config.goal_predicate = match kind(predicate, "goal_predicate")? {
                "bounding_radius" => GoalPredicate::BoundingRadius,
                "pose_tolerance" => GoalPredicate::PoseTolerance {
                    heading_tolerance: float_field(predicate, "heading_tolerance")?
                        .unwrap_or_else(|| F::from(15f64.to_radians()).unwrap()),
                    speed_tolerance: float_field(predicate, "speed_tolerance")?
                        .unwrap_or_else(|| F::from(0.5).unwrap()),
                },
                other => return Err(unknown("goal_predicate", other)),
            };
        }

        let maneuver = &value["maneuver"];
        if !maneuver.is_null() {
            config.maneuver = match kind(maneuver, "maneuver")? {
                "direct" => ManeuverKind::DirectPath,
                "dubins" => {
                    let pitch = F::from(20f64.to_radians()).unwrap();
                    ManeuverKind::Dubins {
                        turning_radius: float_field(maneuver, "turning_radius")?
                            .unwrap_or_else(|| F::from(5.0).unwrap()),
                        min_pitch: float_field(maneuver, "min_pitch")?.unwrap_or(-pitch),
                        max_pitch: float_field(maneuver, "max_pitch")?.unwrap_or(pitch),
                    }
                }
                other => return Err(unknown("maneuver", other)),
            };
        }

        let extension = &value["extension"];
        if !extension.is_null() {
            config.extension = match kind(extension, "extension")? {
                "straight_line" => ExtensionStrategy::StraightLine,
                "kinematic" => ExtensionStrategy::Kinematic {
                    step_time: float_field(extension, "step_time")?
                        .unwrap_or_else(|| F::from(0.1).unwrap()),
                    max_steps: usize_field(extension, "max_steps")?.unwrap_or(50),
                    max_linear_accel: float_field(extension, "max_linear_accel")?
                        .unwrap_or_else(F::one),
                    max_angular_accel: float_field(extension, "max_angular_accel")?
                        .unwrap_or_else(F::one),
                },
                other => return Err(unknown("extension", other)),
            };
        }

        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| PlannerError::io(path, e))?;
        Self::from_json(&text)
    }
}

fn invalid(field: &str, value: &JsonValue) -> PlannerError {
    PlannerError::InvalidParameter(format!("{} has an invalid value: {}", field, value.dump()))
}

fn unknown(field: &str, value: &str) -> PlannerError {
    PlannerError::InvalidParameter(format!("unknown {} '{}'", field, value))
}

fn float_field<F: Float>(object: &JsonValue, field: &str) -> Result<Option<F>> {
    match &object[field] {
        JsonValue::Null => Ok(None),
        value => value
            .as_f64()
            .and_then(F::from)
            .map(Some)
            .ok_or_else(|| invalid(field, value)),
    }
}

/// A `[min, max]` array.
fn range_field<F: Float>(object: &JsonValue, field: &str) -> Result<Option<(F, F)>> {
    let value = &object[field];
    if value.is_null() {
        return Ok(None);
    }
    if !value.is_array() || value.len() != 2 {
        return Err(invalid(field, value));
    }
    let bound = |i: usize| value[i].as_f64().and_then(F::from).ok_or_else(|| invalid(field, value));
    Ok(Some((bound(0)?, bound(1)?)))
}

fn usize_field(object: &JsonValue, field: &str) -> Result<Option<usize>> {
    match &object[field] {
        JsonValue::Null => Ok(None),
        value => value.as_usize().map(Some).ok_or_else(|| invalid(field, value)),
    }
}

fn str_field<'a>(object: &'a JsonValue, field: &str) -> Result<Option<&'a str>> {
    match &object[field] {
        JsonValue::Null => Ok(None),
        value => value.as_str().map(Some).ok_or_else(|| invalid(field, value)),
    }
}

fn kind<'a>(object: &'a JsonValue, field: &str) -> Result<&'a str> {
    if let Some(kind) = object.as_str() {
        return Ok(kind);
    }
    object["kind"].as_str().ok_or_else(|| invalid(field, object))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn defaults_match_reference_parameters() {
        let config = PlannerConfig::<f64>::default();
        assert_relative_eq!(config.epsilon, 5.0);
        assert_eq!(config.max_neighbors, 10);
        assert_eq!(config.min_node_count, 2000);
        assert_eq!(config.tail_length, 40);
        assert_eq!(config.goal_bias_interval(), 20);
        assert_eq!(config.max_iterations(), 100_000);
        assert_eq!(config.max_time(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn goal_bias_interval_is_at_least_one() {
        let config = PlannerConfig::<f64> {
            min_node_count: 0,
            ..Default::default()
        };
        assert_eq!(config.goal_bias_interval(), 1);
    }

    #[test]
    fn loads_json_with_defaults_for_missing_fields() {
        let config = PlannerConfig::<f64>::from_json(
            r#"{
                "epsilon": 2.5,
                "min_node_count": 500,
                "seed": 11,
                "neighbor_policy": "nearest",
                "spatial_index": "kdtree",
                "maneuver": { "kind": "dubins", "turning_radius": 3.0 },
                "goal_predicate": { "kind": "pose_tolerance", "speed_tolerance": 1.0 },
                "extension": "straight_line"
            }"#,
        )
        .unwrap();
        assert_relative_eq!(config.epsilon, 2.5);
        assert_eq!(config.min_node_count, 500);
        assert_eq!(config.max_neighbors, 10);
        assert_eq!(config.seed, Some(11));
        assert_eq!(config.neighbor_policy, NeighborPolicy::Nearest);
        assert_eq!(config.spatial_index, SpatialIndex::KdTree);
        assert_eq!(config.goal_bias_interval(), 5);
        match config.maneuver {
            ManeuverKind::Dubins {
                turning_radius,
                max_pitch,
                ..
            } => {
                assert_relative_eq!(turning_radius, 3.0);
                assert_relative_eq!(max_pitch, 20f64.to_radians());
            }
            other => panic!("unexpected maneuver {:?}", other),
        }
        match config.goal_predicate {
            GoalPredicate::PoseTolerance {
                heading_tolerance,
                speed_tolerance,
            } => {
                assert_relative_eq!(heading_tolerance, 15f64.to_radians());
                assert_relative_eq!(speed_tolerance, 1.0);
            }
            other => panic!("unexpected predicate {:?}", other),
        }
    }

    #[test]
    fn loads_velocity_ranges() {
        let config = PlannerConfig::<f64>::from_json(
            r#"{
                "speed_range": [0.5, 4],
                "yaw_rate_range": [-0.3, 0.3],
                "extension": { "kind": "kinematic", "step_time": 0.2 }
            }"#,
        )
        .unwrap();
        assert_eq!(config.speed_range, Some((0.5, 4.0)));
        assert_eq!(config.yaw_rate_range, Some((-0.3, 0.3)));
        assert!(matches!(
            config.extension,
            ExtensionStrategy::Kinematic { max_steps: 50, .. }
        ));

        assert!(matches!(
            PlannerConfig::<f64>::from_json(r#"{ "speed_range": [4, 1] }"#),
            Err(PlannerError::InvalidParameter(_))
        ));
        assert!(matches!(
            PlannerConfig::<f64>::from_json(r#"{ "yaw_rate_range": [1] }"#),
            Err(PlannerError::InvalidParameter(_))
        ));
    }

    #[test]
    fn rejects_bad_json() {
        assert!(matches!(
            PlannerConfig::<f64>::from_json("{ not json"),
            Err(PlannerError::Json(_))
        ));
        assert!(matches!(
            PlannerConfig::<f64>::from_json(r#"{ "epsilon": "far" }"#),
            Err(PlannerError::InvalidParameter(_))
        ));
        assert!(matches!(
            PlannerConfig::<f64>::from_json(r#"{ "epsilon": -1.0 }"#),
            Err(PlannerError::InvalidParameter(_))
        ));
        assert!(matches!(
            PlannerConfig::<f64>::from_json(r#"{ "maneuver": "teleport" }"#),
            Err(PlannerError::InvalidParameter(_))
        ));
    }
}
