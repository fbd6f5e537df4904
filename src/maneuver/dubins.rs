use crate::geometry::{wrap_angle, Pose};
use crate::maneuver::{Maneuver, ManeuverOracle, NUM_SAMPLES};
use dubins_paths::f64::{DubinsPath, PosRot};
use num_traits::Float;

/// Dubins-airplane style maneuver: a shortest planar Dubins curve in the first two axes with a
/// linear altitude profile along it.
///
/// The climb angle over the whole curve must stay within the pitch limits, otherwise the
/// maneuver is infeasible.
#[derive(Debug, Clone, Copy)]
pub struct DubinsManeuver<F: Float> {
    turning_radius: F,
    min_pitch: F,
    max_pitch: F,
}

impl<F: Float> DubinsManeuver<F> {
    /// Parameters:
    /// - `turning_radius`: Minimum turning radius in the x-y plane.
    /// - `min_pitch`: Steepest allowed descent angle (negative, radians).
    /// - `max_pitch`: Steepest allowed climb angle (radians).
    pub fn new(turning_radius: F, min_pitch: F, max_pitch: F) -> Self {
        Self {
            turning_radius,
            min_pitch,
            max_pitch,
        }
    }

    pub fn turning_radius(&self) -> F {
        self.turning_radius
    }

    fn planar_path<const N: usize>(&self, start: &Pose<F, N>, end: &Pose<F, N>) -> Option<DubinsPath> {
        let y = |p: &Pose<F, N>| if N > 1 { p.position[1] } else { F::zero() };
        let q0 = PosRot::from_floats(
            to_dubins(start.position[0])?,
            to_dubins(y(start))?,
            to_dubins(start.heading)?,
        );
        let q1 = PosRot::from_floats(
            to_dubins(end.position[0])?,
            to_dubins(y(end))?,
            to_dubins(end.heading)?,
        );
        DubinsPath::shortest_from(q0, q1, to_dubins(self.turning_radius)?).ok()
    }
}

fn to_dubins<F: Float>(value: F) -> Option<f64> {
    value.to_f64()
}

impl<F: Float, const N: usize> ManeuverOracle<F, N> for DubinsManeuver<F> {
    fn connect(&self, start: &Pose<F, N>, end: &Pose<F, N>) -> Option<Maneuver<F, N>> {
        let path = self.planar_path(start, end)?;
        let planar_length = F::from(path.length())?;

        let climb = if N > 2 {
            end.position[2] - start.position[2]
        } else {
            F::zero()
        };
        let pitch = climb.atan2(planar_length);
        if pitch < self.min_pitch || pitch > self.max_pitch {
            return None;
        }

        let last = F::from(NUM_SAMPLES - 1)?;
        let mut samples = Vec::with_capacity(NUM_SAMPLES);
        for i in 0..NUM_SAMPLES {
            let fraction = F::from(i)? / last;
            let q = path.sample(to_dubins(planar_length * fraction)?);
            let mut pose = *end;
            pose.position[0] = F::from(q.x())?;
            if N > 1 {
                pose.position[1] = F::from(q.y())?;
            }
            if N > 2 {
                pose.position[2] = start.position[2] + climb * fraction;
            }
            pose.heading = wrap_angle(F::from(q.rot())?);
            pose.pitch = pitch;
            samples.push(pose);
        }

        Some(Maneuver::new(planar_length.hypot(climb), samples))
    }
}
