pub mod cache;
pub mod direct;
pub mod dubins;

pub use cache::ManeuverCache;
pub use direct::DirectPath;
pub use dubins::DubinsManeuver;

use crate::geometry::Pose;
use num_traits::Float;
use serde::{Deserialize, Serialize};

/// Number of poses sampled along every maneuver, endpoints included.
pub const NUM_SAMPLES: usize = 100;

/// A feasible steering curve between two poses.
#[derive(Debug, Clone, PartialEq)]
pub struct Maneuver<F: Float, const N: usize> {
    /// Traveled arc length.
    pub length: F,
    /// Densely sampled poses from start to end.
    pub samples: Vec<Pose<F, N>>,
}

impl<F: Float, const N: usize> Maneuver<F, N> {
    pub fn new(length: F, samples: Vec<Pose<F, N>>) -> Self {
        Self { length, samples }
    }

    /// A maneuver with no positive length cannot be committed as an edge.
    pub fn is_extendable(&self) -> bool {
        self.length.is_finite() && self.length > F::zero()
    }

    pub fn end(&self) -> Option<&Pose<F, N>> {
        self.samples.last()
    }
}

/// Produces steering curves between ordered pairs of poses.
pub trait ManeuverOracle<F: Float, const N: usize> {
    /// Returns the curve from `start` to `end`, or `None` when no curve honors the kinematic limits.
    fn connect(&self, start: &Pose<F, N>, end: &Pose<F, N>) -> Option<Maneuver<F, N>>;
}

/// Selects the maneuver oracle once, at configuration time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ManeuverKind<F> {
    /// Straight segments, cost is Euclidean distance.
    DirectPath,
    /// Planar Dubins curve with a bounded linear climb.
    Dubins {
        turning_radius: F,
        min_pitch: F,
        max_pitch: F,
    },
}

impl<F: Float + 'static> ManeuverKind<F> {
    pub fn build<const N: usize>(&self) -> Box<dyn ManeuverOracle<F, N>> {
        match *self {
            ManeuverKind::DirectPath => Box::new(DirectPath),
            ManeuverKind::Dubins {
                turning_radius,
                min_pitch,
                max_pitch,
            } => Box::new(DubinsManeuver::new(turning_radius, min_pitch, max_pitch)),
        }
    }
}

impl<F: Float> Default for ManeuverKind<F> {
    fn default() -> Self {
        ManeuverKind::DirectPath
    }
}
