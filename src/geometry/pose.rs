use crate::geometry::RealVectorState;
use num_traits::Float;
use serde::{Deserialize, Serialize};

/// An oriented configuration of the vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose<F: Float, const N: usize> {
    /// Position of the vehicle centroid.
    pub position: RealVectorState<F, N>,
    /// Heading in the x-y plane, radians in [0, 2pi).
    pub heading: F,
    /// Pitch (climb) angle, only meaningful with three position axes.
    pub pitch: F,
    /// Translational velocity.
    pub speed: F,
    /// Rotational velocity.
    pub yaw_rate: F,
}

impl<F: Float, const N: usize> Pose<F, N> {
    pub fn new(position: RealVectorState<F, N>, heading: F) -> Self {
        Self {
            position,
            heading: wrap_angle(heading),
            pitch: F::zero(),
            speed: F::zero(),
            yaw_rate: F::zero(),
        }
    }

    /// A pose at `position` with zero heading.
    pub fn at(position: RealVectorState<F, N>) -> Self {
        Self::new(position, F::zero())
    }

    pub fn with_pitch(mut self, pitch: F) -> Self {
        self.pitch = pitch;
        self
    }

    pub fn with_velocity(mut self, speed: F, yaw_rate: F) -> Self {
        self.speed = speed;
        self.yaw_rate = yaw_rate;
        self
    }

    pub fn distance(&self, other: &Self) -> F {
        self.position.euclidean_distance(&other.position)
    }

    /// Absolute heading difference folded into [0, pi].
    pub fn heading_difference(&self, other: &Self) -> F {
        let pi = F::from(std::f64::consts::PI).unwrap();
        let diff = wrap_angle(self.heading - other.heading);
        if diff > pi {
            pi + pi - diff
        } else {
            diff
        }
    }
}

/// Wraps an angle into [0, 2pi).
pub fn wrap_angle<F: Float>(angle: F) -> F {
    let two_pi = F::from(std::f64::consts::TAU).unwrap();
    let mut wrapped = angle % two_pi;
    if wrapped < F::zero() {
        wrapped = wrapped + two_pi;
    }
    // A tiny negative remainder rounds up to exactly 2pi
    if wrapped >= two_pi {
        F::zero()
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn heading_is_wrapped_on_construction() {
        let pose = Pose::new(RealVectorState::new([0.0, 0.0]), -PI / 2.0);
        assert_relative_eq!(pose.heading, 1.5 * PI);
    }

    #[test]
    fn wrap_angle_stays_below_two_pi() {
        assert_eq!(wrap_angle(-1e-17), 0.0);
        assert_eq!(wrap_angle(2.0 * PI), 0.0);
        assert!(wrap_angle(-1e-17f32) < 2.0 * std::f32::consts::PI);
        assert_relative_eq!(wrap_angle(-0.5), 2.0 * PI - 0.5);
        assert_relative_eq!(wrap_angle(7.0), 7.0 - 2.0 * PI);
    }

    #[test]
    fn heading_difference_takes_the_short_way_round() {
        let a = Pose::new(RealVectorState::new([0.0, 0.0]), 0.1);
        let b = Pose::new(RealVectorState::new([0.0, 0.0]), 2.0 * PI - 0.1);
        assert_relative_eq!(a.heading_difference(&b), 0.2, epsilon = 1e-12);
        assert_relative_eq!(b.heading_difference(&a), 0.2, epsilon = 1e-12);
    }
}
