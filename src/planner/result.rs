use std::fmt;
use std::time::Duration;

use crate::geometry::Pose;
use crate::rrt::NodeId;
use json::JsonValue;
use num_traits::Float;
use serde::{Deserialize, Serialize};

/// Outcome of one planning run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanningResult<F: Float, const N: usize> {
    /// Whether any committed node satisfied the goal predicate.
    pub goal_reached: bool,
    /// Poses from the root to the cheapest goal node, if the goal was reached.
    pub path: Option<Vec<Pose<F, N>>>,
    /// Node ids along `path`. Only meaningful for the graph that produced them.
    pub path_ids: Option<Vec<NodeId>>,
    /// Cost of the cheapest goal node.
    pub final_cost: Option<F>,
    pub node_count: usize,
    pub iterations: usize,
    pub elapsed: Duration,
}

impl<F: Float, const N: usize> PlanningResult<F, N> {
    /// Sum of straight-line distances between consecutive path poses.
    pub fn path_length(&self) -> Option<F> {
        self.path.as_ref().map(|path| {
            path.windows(2)
                .fold(F::zero(), |length, pair| length + pair[0].distance(&pair[1]))
        })
    }

    /// One-line description for logs.
    pub fn summary(&self) -> String {
        format!(
            "goal reached: {}, cost: {}, nodes: {}, iterations: {}, runtime: {:.3}s",
            self.goal_reached,
            self.final_cost
                .and_then(|c| c.to_f64())
                .map_or_else(|| "none".to_string(), |c| format!("{:.3}", c)),
            self.node_count,
            self.iterations,
            self.elapsed.as_secs_f64()
        )
    }

    pub fn to_json(&self) -> JsonValue {
        let path = match &self.path {
            Some(path) => {
                let mut array = JsonValue::new_array();
                for pose in path {
                    let _ = array.push(pose_to_json(pose));
                }
                array
            }
            None => JsonValue::Null,
        };
        json::object! {
            goal_reached: self.goal_reached,
            final_cost: self.final_cost.and_then(|c| c.to_f64()),
            path_length: self.path_length().and_then(|l| l.to_f64()),
            node_count: self.node_count,
            iterations: self.iterations,
            elapsed_secs: self.elapsed.as_secs_f64(),
            path: path,
        }
    }
}

impl<F: Float, const N: usize> fmt::Display for PlanningResult<F, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Goal Reached: {}\nFinal Cost: {}\nPath Length: {}\nPath Poses: {}\nNode Count: {}\nIterations: {}\nRuntime: {:?}",
            self.goal_reached,
            self.final_cost
                .and_then(|c| c.to_f64())
                .map_or_else(|| "-".to_string(), |c| c.to_string()),
            self.path_length()
                .and_then(|l| l.to_f64())
                .map_or_else(|| "-".to_string(), |l| l.to_string()),
            self.path.as_ref().map_or(0, Vec::len),
            self.node_count,
            self.iterations,
            self.elapsed
        )
    }
}

pub(crate) fn pose_to_json<F: Float, const N: usize>(pose: &Pose<F, N>) -> JsonValue {
    let mut position = JsonValue::new_array();
    for v in pose.position.values() {
        let _ = position.push(v.to_f64().unwrap_or(f64::NAN));
    }
    json::object! {
        position: position,
        heading: pose.heading.to_f64().unwrap_or(f64::NAN),
        pitch: pose.pitch.to_f64().unwrap_or(f64::NAN),
        speed: pose.speed.to_f64().unwrap_or(f64::NAN),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::RealVectorState;
    use approx::assert_relative_eq;

    fn result() -> PlanningResult<f64, 2> {
        PlanningResult {
            goal_reached: true,
            path: Some(vec![
                Pose::at(RealVectorState::new([0.0, 0.0])),
                Pose::at(RealVectorState::new([3.0, 4.0])),
                Pose::at(RealVectorState::new([3.0, 10.0])),
            ]),
            path_ids: Some(vec![0, 4, 9]),
            final_cost: Some(11.0),
            node_count: 10,
            iterations: 12,
            elapsed: Duration::from_millis(1500),
        }
    }

    #[test]
    fn path_length_sums_segments() {
        assert_relative_eq!(result().path_length().unwrap(), 11.0);
    }

    #[test]
    fn json_export_has_summary_fields() {
        let json = result().to_json();
        assert_eq!(json["goal_reached"].as_bool(), Some(true));
        assert_eq!(json["node_count"].as_usize(), Some(10));
        assert_eq!(json["path"].len(), 3);
        assert_eq!(json["path"][1]["position"][1].as_f64(), Some(4.0));
        assert_eq!(json["elapsed_secs"].as_f64(), Some(1.5));
    }

    #[test]
    fn failed_run_has_no_path() {
        let failed = PlanningResult::<f64, 2> {
            goal_reached: false,
            path: None,
            path_ids: None,
            final_cost: None,
            ..result()
        };
        assert!(failed.to_json()["path"].is_null());
        assert!(failed.to_string().contains("Goal Reached: false"));
        assert!(failed.summary().contains("cost: none"));
    }
}
