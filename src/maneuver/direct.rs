use crate::geometry::Pose;
use crate::maneuver::{Maneuver, ManeuverOracle, NUM_SAMPLES};
use num_traits::Float;

/// Straight-line maneuver. Always feasible; the length is the Euclidean distance.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectPath;

impl<F: Float, const N: usize> ManeuverOracle<F, N> for DirectPath {
    fn connect(&self, start: &Pose<F, N>, end: &Pose<F, N>) -> Option<Maneuver<F, N>> {
        let last = F::from(NUM_SAMPLES - 1).unwrap();
        let samples = (0..NUM_SAMPLES)
            .map(|i| {
                if i == 0 {
                    return *start;
                }
                let t = F::from(i).unwrap() / last;
                Pose {
                    position: start.position.lerp(&end.position, t),
                    ..*end
                }
            })
            .collect();
        Some(Maneuver::new(start.distance(end), samples))
    }
}
