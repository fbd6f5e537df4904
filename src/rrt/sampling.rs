use crate::geometry::{Pose, RealVectorState};
use crate::obstacles::RectangularObstacle;
use crate::workspace::Freespace;
use num_traits::Float;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// A source of candidate poses for tree growth.
pub trait SamplingDistribution<F: Float, const N: usize> {
    /// Draws one pose.
    fn sample(&mut self) -> Pose<F, N>;
}

/// Draws every pose dimension independently and uniformly within a freespace.
pub struct UniformPoseDistribution<F: Float, const N: usize> {
    freespace: Freespace<F, N>,
    rng: ChaCha8Rng,
}

impl<F: Float, const N: usize> UniformPoseDistribution<F, N> {
    /// Parameters:
    /// - `freespace`: The sampling bounds.
    /// - `seed`: Fixed seed for reproducible runs, or `None` to seed from the OS.
    pub fn new(freespace: Freespace<F, N>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self { freespace, rng }
    }

    pub fn freespace(&self) -> &Freespace<F, N> {
        &self.freespace
    }

    fn uniform(&mut self, (low, high): (F, F)) -> F {
        let low_f = low.to_f64().unwrap_or(0.0);
        let high_f = high.to_f64().unwrap_or(low_f);
        if high_f <= low_f {
            return low;
        }
        F::from(self.rng.gen_range(low_f..high_f)).unwrap_or(low)
    }
}

impl<F: Float, const N: usize> SamplingDistribution<F, N> for UniformPoseDistribution<F, N> {
    fn sample(&mut self) -> Pose<F, N> {
        let min_corner = *self.freespace.bounds.min_corner();
        let max_corner = *self.freespace.bounds.max_corner();
        let mut position = RealVectorState::zeros();
        for i in 0..N {
            position[i] = self.uniform((min_corner[i], max_corner[i]));
        }
        let heading = self.uniform(self.freespace.heading);
        let pitch = self.uniform(self.freespace.pitch);
        let speed = self.uniform(self.freespace.speed);
        let yaw_rate = self.uniform(self.freespace.yaw_rate);
        Pose::new(position, heading)
            .with_pitch(pitch)
            .with_velocity(speed, yaw_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obstacles::StaticRectangularObstacle;

    fn freespace() -> Freespace<f64, 3> {
        Freespace::new(StaticRectangularObstacle::new(
            RealVectorState::new([-10.0, 0.0, 5.0]),
            RealVectorState::new([10.0, 100.0, 5.0]),
        ))
        .with_speed(1.0, 3.0)
    }

    #[test]
    fn samples_stay_within_the_freespace() {
        let mut sampler = UniformPoseDistribution::new(freespace(), Some(7));
        for _ in 0..1000 {
            let pose = sampler.sample();
            assert!(sampler.freespace().contains(&pose));
            assert_eq!(pose.position[2], 5.0);
            assert!(pose.heading >= 0.0 && pose.heading < std::f64::consts::TAU);
            assert!(pose.pitch.abs() <= std::f64::consts::FRAC_PI_6);
            assert!((1.0..3.0).contains(&pose.speed));
            assert_eq!(pose.yaw_rate, 0.0);
        }
    }

    #[test]
    fn same_seed_same_samples() {
        let mut a = UniformPoseDistribution::new(freespace(), Some(42));
        let mut b = UniformPoseDistribution::new(freespace(), Some(42));
        for _ in 0..10 {
            assert_eq!(a.sample(), b.sample());
        }
    }
}
