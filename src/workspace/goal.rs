use crate::geometry::{Pose, RealVectorState};
use num_traits::Float;
use serde::{Deserialize, Serialize};

/// How arrival at the goal region is decided.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GoalPredicate<F> {
    /// Centroid strictly within `goal radius + vehicle bounding radius` of the goal center.
    BoundingRadius,
    /// Any body point (the centroid for a point vehicle) within the goal radius,
    /// heading within `heading_tolerance` and speed within `speed_tolerance` of the goal pose.
    PoseTolerance {
        heading_tolerance: F,
        speed_tolerance: F,
    },
}

impl<F: Float> Default for GoalPredicate<F> {
    fn default() -> Self {
        GoalPredicate::BoundingRadius
    }
}

/// Goal pose plus the radius of the arrival region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalRegion<F: Float, const N: usize> {
    pub pose: Pose<F, N>,
    pub radius: F,
}

impl<F: Float, const N: usize> GoalRegion<F, N> {
    pub fn new(pose: Pose<F, N>, radius: F) -> Self {
        Self { pose, radius }
    }

    pub fn center(&self) -> &RealVectorState<F, N> {
        &self.pose.position
    }

    /// Evaluates `predicate` for a vehicle at `pose`.
    ///
    /// Parameters:
    /// - `pose`: The vehicle pose (its position is the centroid).
    /// - `body_points`: World-frame body points at `pose`, empty for a point vehicle.
    /// - `bounding_radius`: The vehicle bounding radius.
    /// - `predicate`: The arrival rule.
    pub fn is_reached(
        &self,
        pose: &Pose<F, N>,
        body_points: &[RealVectorState<F, N>],
        bounding_radius: F,
        predicate: &GoalPredicate<F>,
    ) -> bool {
        match *predicate {
            GoalPredicate::BoundingRadius => {
                pose.position.euclidean_distance(self.center()) < self.radius + bounding_radius
            }
            GoalPredicate::PoseTolerance {
                heading_tolerance,
                speed_tolerance,
            } => {
                let inside = if body_points.is_empty() {
                    pose.position.euclidean_distance(self.center()) <= self.radius
                } else {
                    body_points
                        .iter()
                        .any(|p| p.euclidean_distance(self.center()) <= self.radius)
                };
                inside
                    && pose.heading_difference(&self.pose) <= heading_tolerance
                    && (pose.speed - self.pose.speed).abs() < speed_tolerance
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goal() -> GoalRegion<f64, 2> {
        GoalRegion::new(Pose::new(RealVectorState::new([90.0, 90.0]), 0.0), 5.0)
    }

    #[test]
    fn bounding_radius_widens_the_region() {
        let pose = Pose::at(RealVectorState::new([90.0, 96.0]));
        assert!(!goal().is_reached(&pose, &[], 0.0, &GoalPredicate::BoundingRadius));
        assert!(goal().is_reached(&pose, &[], 1.5, &GoalPredicate::BoundingRadius));
    }

    #[test]
    fn pose_tolerance_checks_heading_and_speed() {
        let predicate = GoalPredicate::PoseTolerance {
            heading_tolerance: 15f64.to_radians(),
            speed_tolerance: 0.5,
        };
        let aligned = Pose::new(RealVectorState::new([91.0, 91.0]), 0.1);
        let turned = Pose::new(RealVectorState::new([91.0, 91.0]), 1.0);
        let fast = aligned.with_velocity(2.0, 0.0);
        assert!(goal().is_reached(&aligned, &[], 0.0, &predicate));
        assert!(!goal().is_reached(&turned, &[], 0.0, &predicate));
        assert!(!goal().is_reached(&fast, &[], 0.0, &predicate));
    }

    #[test]
    fn pose_tolerance_accepts_any_body_point() {
        let predicate = GoalPredicate::PoseTolerance {
            heading_tolerance: 0.3,
            speed_tolerance: 0.5,
        };
        let pose = Pose::at(RealVectorState::new([80.0, 90.0]));
        let nose = [RealVectorState::new([86.0, 90.0])];
        assert!(!goal().is_reached(&pose, &[], 6.0, &predicate));
        assert!(goal().is_reached(&pose, &nose, 6.0, &predicate));
    }
}
