use crate::geometry::{Pose, RealVectorState};
use crate::obstacles::{AnalyticObstacle, RectangularObstacle, StaticRectangularObstacle};
use num_traits::Float;
use serde::{Deserialize, Serialize};

/// Sampling bounds over position, heading, pitch and velocity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Freespace<F: Float, const N: usize> {
    pub bounds: StaticRectangularObstacle<F, N>,
    pub heading: (F, F),
    pub pitch: (F, F),
    pub speed: (F, F),
    pub yaw_rate: (F, F),
}

impl<F: Float, const N: usize> Freespace<F, N> {
    /// Freespace over `bounds` with the full heading circle.
    /// Pitch spans +/- pi/6 when there is an altitude axis. Velocities are fixed at zero.
    pub fn new(bounds: StaticRectangularObstacle<F, N>) -> Self {
        let pitch_limit = if N > 2 {
            F::from(std::f64::consts::FRAC_PI_6).unwrap()
        } else {
            F::zero()
        };
        Self {
            bounds,
            heading: (F::zero(), F::from(std::f64::consts::TAU).unwrap()),
            pitch: (-pitch_limit, pitch_limit),
            speed: (F::zero(), F::zero()),
            yaw_rate: (F::zero(), F::zero()),
        }
    }

    /// Bounding box of `start` and `goal`, grown on every side by
    /// `buffer_ratio` times the largest per-axis separation.
    pub fn around(
        start: &RealVectorState<F, N>,
        goal: &RealVectorState<F, N>,
        buffer_ratio: F,
    ) -> Self {
        let separation = (0..N)
            .map(|i| (start[i] - goal[i]).abs())
            .fold(F::zero(), F::max);
        let buffer = separation * buffer_ratio;
        let mut min_corner = *start;
        let mut max_corner = *start;
        for i in 0..N {
            min_corner[i] = start[i].min(goal[i]) - buffer;
            max_corner[i] = start[i].max(goal[i]) + buffer;
        }
        Self::new(StaticRectangularObstacle::new(min_corner, max_corner))
    }

    pub fn with_speed(mut self, min: F, max: F) -> Self {
        self.speed = (min, max);
        self
    }

    pub fn with_yaw_rate(mut self, min: F, max: F) -> Self {
        self.yaw_rate = (min, max);
        self
    }

    pub fn contains(&self, pose: &Pose<F, N>) -> bool {
        RectangularObstacle::contains(&self.bounds, &pose.position)
    }

    /// Volume of the position box.
    pub fn volume(&self) -> F {
        self.bounds.volume()
    }
}
