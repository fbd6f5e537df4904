use crate::geometry::Pose;
use crate::maneuver::Maneuver;
use num_traits::Float;

/// Checks if a pose or motion is valid (i.e., not in collision).
pub trait ValidityChecker<F: Float, const N: usize> {
    /// Checks if a pose is valid (i.e., the vehicle does not collide with obstacles).
    ///
    /// Parameters:
    /// - `pose`: The pose to check.
    ///
    /// Returns:
    /// Whether the pose is valid.
    fn is_pose_valid(&self, pose: &Pose<F, N>) -> bool;

    /// Checks if the straight segment between two poses is valid.
    ///
    /// Parameters:
    /// - `a`: The start of the segment.
    /// - `b`: The end of the segment.
    ///
    /// Returns:
    /// Whether the segment is valid.
    fn is_segment_valid(&self, a: &Pose<F, N>, b: &Pose<F, N>) -> bool;

    /// Checks every sampled pose of a maneuver and the segments joining consecutive samples.
    fn is_maneuver_valid(&self, maneuver: &Maneuver<F, N>) -> bool {
        maneuver.samples.iter().all(|pose| self.is_pose_valid(pose))
            && maneuver
                .samples
                .windows(2)
                .all(|pair| self.is_segment_valid(&pair[0], &pair[1]))
    }
}

/// A simple validity checker that always returns true (i.e., all poses and segments are valid).
pub struct AlwaysValid;

impl<F: Float, const N: usize> ValidityChecker<F, N> for AlwaysValid {
    fn is_pose_valid(&self, _pose: &Pose<F, N>) -> bool {
        true
    }

    fn is_segment_valid(&self, _a: &Pose<F, N>, _b: &Pose<F, N>) -> bool {
        true
    }
}
