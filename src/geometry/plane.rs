use crate::geometry::{Line, RealVectorState};
use num_traits::Float;

/// A hyperplane through `point` with normal `normal`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane<F: Float, const N: usize> {
    pub point: RealVectorState<F, N>,
    pub normal: RealVectorState<F, N>,
}

impl<F: Float, const N: usize> Plane<F, N> {
    pub fn new(point: RealVectorState<F, N>, normal: RealVectorState<F, N>) -> Self {
        Self { point, normal }
    }

    /// Signed distance scaled by the normal length.
    pub fn signed_offset(&self, point: &RealVectorState<F, N>) -> F {
        (*point - self.point).dot(&self.normal)
    }

    /// Parameter along `line` where it crosses the plane.
    ///
    /// Returns `None` when the line is parallel to the plane or the crossing lies outside [0, 1].
    pub fn intersection_parameter(&self, line: &Line<F, N>) -> Option<F> {
        let denominator = line.direction().dot(&self.normal);
        if denominator.abs() <= F::epsilon() {
            return None;
        }
        let t = (self.point - line.start).dot(&self.normal) / denominator;
        if t < F::zero() || t > F::one() {
            None
        } else {
            Some(t)
        }
    }
}
