use crate::geometry::RealVectorState;
use crate::obstacles::{RectangularObstacle, StaticRectangularObstacle};
use num_traits::Float;

/// A trait for analytic obstacles in N-dimensional space.
/// Analytic obstacles have exact functions for containment and intersection checks.
/// They do not require discrete sampling or approximation.
pub trait AnalyticObstacle<F: Float, const N: usize> {
    fn contains(&self, state: &RealVectorState<F, N>) -> bool;
    fn intersects_edge(&self, start: &RealVectorState<F, N>, end: &RealVectorState<F, N>) -> bool;

    /// Checks if any part of the obstacle lies inside the axis-aligned box.
    fn intersects_box(&self, bounds: &StaticRectangularObstacle<F, N>) -> bool;

    /// Volume (area in 2D) occupied by the obstacle.
    fn volume(&self) -> F;

    /// Center and radius of a ball enclosing the obstacle.
    fn bounding_center(&self) -> RealVectorState<F, N>;
    fn bounding_radius(&self) -> F;
}

/// Sums the volume of every obstacle that touches `bounds`, and returns the touching ones.
pub fn obstacles_within<F, const N: usize, O>(
    obstacles: Vec<O>,
    bounds: &StaticRectangularObstacle<F, N>,
) -> (Vec<O>, F)
where
    F: Float,
    O: AnalyticObstacle<F, N>,
{
    let kept: Vec<O> = obstacles
        .into_iter()
        .filter(|o| o.intersects_box(bounds))
        .collect();
    let volume = kept.iter().fold(F::zero(), |acc, o| acc + o.volume());
    debug_assert!(kept
        .iter()
        .all(|o| RectangularObstacle::intersects_sphere(bounds, &o.bounding_center(), o.bounding_radius())));
    (kept, volume)
}
