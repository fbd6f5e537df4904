use crate::geometry::RealVectorState;
use num_traits::Float;

/// A directed line segment from `start` to `end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line<F: Float, const N: usize> {
    pub start: RealVectorState<F, N>,
    pub end: RealVectorState<F, N>,
}

impl<F: Float, const N: usize> Line<F, N> {
    pub fn new(start: RealVectorState<F, N>, end: RealVectorState<F, N>) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> F {
        self.start.euclidean_distance(&self.end)
    }

    pub fn is_degenerate(&self) -> bool {
        self.length() <= F::epsilon()
    }

    /// Unnormalized direction `end - start`.
    pub fn direction(&self) -> RealVectorState<F, N> {
        self.end - self.start
    }

    /// Unit tangent, or `None` for a zero-length segment.
    pub fn tangent(&self) -> Option<RealVectorState<F, N>> {
        let length = self.length();
        if length <= F::epsilon() {
            None
        } else {
            Some(self.direction() / length)
        }
    }

    /// Point at parameter `t` (`0` is the start, `1` the end).
    pub fn point_at(&self, t: F) -> RealVectorState<F, N> {
        self.start.lerp(&self.end, t)
    }

    /// Parameter in [0, 1] of the point on the segment closest to `point`.
    pub fn closest_parameter(&self, point: &RealVectorState<F, N>) -> F {
        let direction = self.direction();
        let length_squared = direction.dot(&direction);
        if length_squared <= F::epsilon() {
            return F::zero();
        }
        let t = (*point - self.start).dot(&direction) / length_squared;
        t.max(F::zero()).min(F::one())
    }

    pub fn distance_to_point(&self, point: &RealVectorState<F, N>) -> F {
        self.point_at(self.closest_parameter(point))
            .euclidean_distance(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn closest_point_is_clamped_to_segment() {
        let line = Line::new(RealVectorState::new([0.0, 0.0]), RealVectorState::new([10.0, 0.0]));
        assert_relative_eq!(line.closest_parameter(&RealVectorState::new([5.0, 3.0])), 0.5);
        assert_relative_eq!(line.closest_parameter(&RealVectorState::new([-4.0, 3.0])), 0.0);
        assert_relative_eq!(line.distance_to_point(&RealVectorState::new([13.0, 4.0])), 5.0);
    }

    #[test]
    fn zero_length_segment_has_no_tangent() {
        let p = RealVectorState::new([1.0, 1.0, 1.0]);
        let line = Line::new(p, p);
        assert!(line.is_degenerate());
        assert!(line.tangent().is_none());
        assert_relative_eq!(line.distance_to_point(&RealVectorState::new([1.0, 1.0, 3.0])), 2.0);
    }
}
