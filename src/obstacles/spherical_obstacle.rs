use crate::geometry::{ball_volume, Line, RealVectorState};
use crate::obstacles::{AnalyticObstacle, StaticRectangularObstacle};
use num_traits::Float;
use serde::{Deserialize, Serialize};

/// A trait for spherical obstacles (disks in 2D)
pub trait SphericalObstacle<F: Float, const N: usize>: AnalyticObstacle<F, N> {
    /// Returns the center of the obstacle.
    fn center(&self) -> &RealVectorState<F, N>;
    /// Returns the radius of the obstacle.
    fn radius(&self) -> F;

    /// Checks if a point is strictly inside the sphere.
    fn contains(&self, point: &RealVectorState<F, N>) -> bool {
        let distance_squared = self.center().euclidean_distance_squared(point);
        distance_squared < self.radius().powi(2)
    }

    /// Check if an edge intersects with the sphere.
    fn intersects_edge(&self, start: &RealVectorState<F, N>, end: &RealVectorState<F, N>) -> bool {
        if SphericalObstacle::contains(self, start) || SphericalObstacle::contains(self, end) {
            return true; // One of the endpoints is inside the sphere
        }

        let direction = end - start;
        let a = direction.dot(&direction);
        if a <= F::epsilon() {
            // Zero-length edge, only the coincident point could have hit
            return false;
        }

        let center_to_start = start - self.center();
        let b = F::from(2.0).unwrap() * center_to_start.dot(&direction);
        let c = center_to_start.dot(&center_to_start) - self.radius().powi(2);
        let discriminant = b * b - F::from(4.0).unwrap() * a * c;

        if discriminant < F::zero() {
            return false; // No real roots; no intersection
        }

        let sqrt_discriminant = discriminant.sqrt();
        let two_a = F::from(2.0).unwrap() * a;

        let t1 = (-b - sqrt_discriminant) / two_a;
        let t2 = (-b + sqrt_discriminant) / two_a;

        // Check if either intersection point is within the segment [0, 1]
        (t1 >= F::zero() && t1 <= F::one()) || (t2 >= F::zero() && t2 <= F::one())
    }

    /// Minimum distance from the sphere surface to a segment (negative when the segment enters it).
    fn clearance(&self, line: &Line<F, N>) -> F {
        line.distance_to_point(self.center()) - self.radius()
    }

    /// Exact sphere/box overlap: the box point closest to the center must be inside the sphere.
    fn intersects_rectangle(&self, bounds: &StaticRectangularObstacle<F, N>) -> bool {
        let closest = bounds.clamp(self.center());
        closest.euclidean_distance_squared(self.center()) <= self.radius().powi(2)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticSphericalObstacle<F: Float, const N: usize> {
    center: RealVectorState<F, N>,
    radius: F,
}

impl<F: Float, const N: usize> StaticSphericalObstacle<F, N> {
    pub fn new(center: RealVectorState<F, N>, radius: F) -> Self {
        Self { center, radius }
    }
}

impl<F: Float, const N: usize> SphericalObstacle<F, N> for StaticSphericalObstacle<F, N> {
    fn center(&self) -> &RealVectorState<F, N> {
        &self.center
    }

    fn radius(&self) -> F {
        self.radius
    }
}

impl<F: Float, const N: usize> AnalyticObstacle<F, N> for StaticSphericalObstacle<F, N> {
    fn contains(&self, state: &RealVectorState<F, N>) -> bool {
        SphericalObstacle::contains(self, state)
    }

    fn intersects_edge(&self, start: &RealVectorState<F, N>, end: &RealVectorState<F, N>) -> bool {
        SphericalObstacle::intersects_edge(self, start, end)
    }

    fn intersects_box(&self, bounds: &StaticRectangularObstacle<F, N>) -> bool {
        self.intersects_rectangle(bounds)
    }

    fn volume(&self) -> F {
        ball_volume(self.radius, N)
    }

    fn bounding_center(&self) -> RealVectorState<F, N> {
        self.center
    }

    fn bounding_radius(&self) -> F {
        self.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sphere() -> StaticSphericalObstacle<f64, 2> {
        StaticSphericalObstacle::new(RealVectorState::new([50.0, 50.0]), 20.0)
    }

    #[test]
    fn point_containment_is_strict() {
        let s = sphere();
        assert!(AnalyticObstacle::contains(&s, &RealVectorState::new([55.0, 55.0])));
        assert!(!AnalyticObstacle::contains(&s, &RealVectorState::new([70.0, 50.0])));
    }

    #[test]
    fn segment_through_sphere_intersects() {
        let s = sphere();
        let a = RealVectorState::new([0.0, 0.0]);
        let b = RealVectorState::new([100.0, 100.0]);
        assert!(AnalyticObstacle::intersects_edge(&s, &a, &b));
        // Passes well below the disk
        let c = RealVectorState::new([100.0, 0.0]);
        assert!(!AnalyticObstacle::intersects_edge(&s, &a, &c));
        assert!(s.clearance(&Line::new(a, c)) > 0.0);
    }

    #[test]
    fn degenerate_inputs_do_not_panic() {
        let s = sphere();
        let outside = RealVectorState::new([0.0, 0.0]);
        let inside = RealVectorState::new([50.0, 50.0]);
        assert!(!AnalyticObstacle::intersects_edge(&s, &outside, &outside));
        assert!(AnalyticObstacle::intersects_edge(&s, &inside, &inside));

        let point = StaticSphericalObstacle::new(RealVectorState::new([1.0, 1.0]), 0.0);
        assert!(!AnalyticObstacle::contains(&point, &RealVectorState::new([1.0, 1.0])));
        assert_relative_eq!(point.volume(), 0.0);
    }

    #[test]
    fn sphere_box_overlap() {
        let s = sphere();
        // Closest corner (35, 35) is ~21.2 from the center
        let corner_miss = StaticRectangularObstacle::new(
            RealVectorState::new([0.0, 0.0]),
            RealVectorState::new([35.0, 35.0]),
        );
        assert!(!s.intersects_rectangle(&corner_miss));
        // Edge x = 31 is 19 from the center along the axis
        let side_hit = StaticRectangularObstacle::new(
            RealVectorState::new([0.0, 45.0]),
            RealVectorState::new([31.0, 55.0]),
        );
        assert!(s.intersects_rectangle(&side_hit));
        let overlapping = StaticRectangularObstacle::new(
            RealVectorState::new([0.0, 0.0]),
            RealVectorState::new([40.0, 40.0]),
        );
        assert!(s.intersects_rectangle(&overlapping));
    }
}
