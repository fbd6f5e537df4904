use crate::geometry::{wrap_angle, Pose};
use crate::rrt::ValidityChecker;
use num_traits::Float;
use serde::{Deserialize, Serialize};

/// How a candidate pose is grown from a tree node toward a sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ExtensionStrategy<F> {
    /// Truncate the straight line toward the sample to at most epsilon.
    /// Heading, pitch and velocities are taken from the sample.
    StraightLine,
    /// Forward-integrate a unicycle with acceleration-limited speed and yaw rate.
    Kinematic {
        /// Duration of one integration sub-step.
        step_time: F,
        /// Upper bound on the number of sub-steps per extension.
        max_steps: usize,
        max_linear_accel: F,
        max_angular_accel: F,
    },
}

impl<F: Float> Default for ExtensionStrategy<F> {
    fn default() -> Self {
        ExtensionStrategy::StraightLine
    }
}

impl<F: Float> ExtensionStrategy<F> {
    /// Produces a collision-free candidate pose between `parent` and `target`.
    ///
    /// Parameters:
    /// - `parent`: The tree node to extend from.
    /// - `target`: The sample to extend toward.
    /// - `epsilon`: The maximum travel distance.
    /// - `checker`: Validity checks for poses and segments.
    ///
    /// Returns:
    /// The candidate pose, or `None` if the extension was blocked before making any progress.
    pub fn extend<const N: usize>(
        &self,
        parent: &Pose<F, N>,
        target: &Pose<F, N>,
        epsilon: F,
        checker: &dyn ValidityChecker<F, N>,
    ) -> Option<Pose<F, N>> {
        match *self {
            ExtensionStrategy::StraightLine => Self::extend_straight(parent, target, epsilon, checker),
            ExtensionStrategy::Kinematic {
                step_time,
                max_steps,
                max_linear_accel,
                max_angular_accel,
            } => {
                let limits = KinematicLimits {
                    step_time,
                    max_steps,
                    max_linear_accel,
                    max_angular_accel,
                };
                limits.integrate(parent, target, epsilon, checker)
            }
        }
    }

    fn extend_straight<const N: usize>(
        parent: &Pose<F, N>,
        target: &Pose<F, N>,
        epsilon: F,
        checker: &dyn ValidityChecker<F, N>,
    ) -> Option<Pose<F, N>> {
        let direction = target.position - parent.position;
        let distance = direction.norm();
        if distance <= F::epsilon() {
            return None;
        }

        let mut candidate = *target;
        if distance > epsilon {
            candidate.position = parent.position + direction / distance * epsilon;
        }

        if checker.is_pose_valid(&candidate) && checker.is_segment_valid(parent, &candidate) {
            Some(candidate)
        } else {
            None
        }
    }
}

struct KinematicLimits<F> {
    step_time: F,
    max_steps: usize,
    max_linear_accel: F,
    max_angular_accel: F,
}

impl<F: Float> KinematicLimits<F> {
    fn integrate<const N: usize>(
        &self,
        parent: &Pose<F, N>,
        target: &Pose<F, N>,
        epsilon: F,
        checker: &dyn ValidityChecker<F, N>,
    ) -> Option<Pose<F, N>> {
        let dt = self.step_time;
        let max_dv = self.max_linear_accel * dt;
        let max_dw = self.max_angular_accel * dt;

        let mut current = *parent;
        let mut traveled = F::zero();
        let mut progressed = false;

        for _ in 0..self.max_steps {
            if traveled >= epsilon {
                break;
            }

            let speed = current.speed + (target.speed - current.speed).max(-max_dv).min(max_dv);
            let yaw_rate =
                current.yaw_rate + (target.yaw_rate - current.yaw_rate).max(-max_dw).min(max_dw);

            // Never overshoot the epsilon budget on the last sub-step
            let arc = (speed * dt).min(epsilon - traveled);
            if arc.abs() <= F::epsilon() && yaw_rate.abs() <= F::epsilon() {
                break;
            }

            let heading = current.heading;
            let mut next = current;
            next.speed = speed;
            next.yaw_rate = yaw_rate;
            next.heading = wrap_angle(heading + yaw_rate * dt);
            next.pitch = target.pitch;
            let (sin_p, cos_p) = next.pitch.sin_cos();
            next.position[0] = next.position[0] + arc * cos_p * heading.cos();
            if N > 1 {
                next.position[1] = next.position[1] + arc * cos_p * heading.sin();
            }
            if N > 2 {
                next.position[2] = next.position[2] + arc * sin_p;
            }

            if !checker.is_pose_valid(&next) || !checker.is_segment_valid(&current, &next) {
                break;
            }

            traveled = traveled + arc.abs();
            progressed = progressed || arc.abs() > F::epsilon();
            current = next;
        }

        // Turning in place alone is not progress
        progressed.then_some(current)
    }
}
