use crate::geometry::{Line, Plane, RealVectorState};
use crate::obstacles::AnalyticObstacle;
use num_traits::Float;
use serde::{Deserialize, Serialize};

/// A trait for axis-aligned rectangular (hyper‐rectangle) regions
pub trait RectangularObstacle<F: Float, const N: usize>: AnalyticObstacle<F, N> {
    /// Returns the minimum corner of the obstacle (smallest coordinates).
    fn min_corner(&self) -> &RealVectorState<F, N>;
    /// Returns the maximum corner of the obstacle (largest coordinates).
    fn max_corner(&self) -> &RealVectorState<F, N>;

    /// Checks if a point lies inside the rectangle.
    fn contains(&self, point: &RealVectorState<F, N>) -> bool {
        // for every dimension, point[i] ∈ [min[i], max[i]]
        (0..N).all(|i| {
            let x = point[i];
            x >= self.min_corner()[i] && x <= self.max_corner()[i]
        })
    }

    /// Checks if a segment [start,end] intersects the rectangle.
    ///
    /// Uses the Liang–Barsky algorithm: for each axis (“slab”) it computes the
    /// entry and exit parameters t₁, t₂ along the parametric line p(t)=start + t*(end-start),
    /// then accumulates a global t_min, t_max. If they overlap within [0,1], there is an intersection.
    fn intersects_edge(&self, start: &RealVectorState<F, N>, end: &RealVectorState<F, N>) -> bool {
        let dir = *end - *start;
        let mut t_min = F::zero();
        let mut t_max = F::one();

        for i in 0..N {
            let s = start[i];
            let d = dir[i];
            let min_i = self.min_corner()[i];
            let max_i = self.max_corner()[i];

            if d == F::zero() {
                // Parallel to slab: if start is outside, no intersection
                if s < min_i || s > max_i {
                    return false;
                }
            } else {
                let inv_d = F::one() / d;
                let t1 = (min_i - s) * inv_d;
                let t2 = (max_i - s) * inv_d;
                t_min = t_min.max(t1.min(t2));
                t_max = t_max.min(t1.max(t2));
                if t_min > t_max {
                    return false;
                }
            }
        }

        !(t_max < F::zero() || t_min > F::one())
    }

    /// Loose sphere test against the box grown by `sphere_radius` on every side.
    fn intersects_sphere(&self, sphere_center: &RealVectorState<F, N>, sphere_radius: F) -> bool {
        for i in 0..N {
            if sphere_center[i] < self.min_corner()[i] - sphere_radius
                || sphere_center[i] > self.max_corner()[i] + sphere_radius
            {
                return false;
            }
        }

        true
    }

    /// The 2N bounding planes, outward normals, ordered min face then max face per axis.
    fn surfaces(&self) -> Vec<Plane<F, N>> {
        let mut planes = Vec::with_capacity(2 * N);
        for i in 0..N {
            let mut normal = RealVectorState::zeros();
            normal[i] = -F::one();
            planes.push(Plane::new(*self.min_corner(), normal));
            normal[i] = F::one();
            planes.push(Plane::new(*self.max_corner(), normal));
        }
        planes
    }

    /// First parameter along `line` at which it crosses one of the surfaces while on the box.
    ///
    /// Returns `None` when the segment never touches the boundary.
    fn surface_crossing(&self, line: &Line<F, N>) -> Option<F> {
        let tolerance = F::from(1e-9).unwrap();
        self.surfaces()
            .iter()
            .enumerate()
            .filter_map(|(face, plane)| {
                let t = plane.intersection_parameter(line)?;
                let point = line.point_at(t);
                let axis = face / 2;
                let on_face = (0..N).filter(|&i| i != axis).all(|i| {
                    point[i] >= self.min_corner()[i] - tolerance
                        && point[i] <= self.max_corner()[i] + tolerance
                });
                on_face.then_some(t)
            })
            .fold(None, |best: Option<F>, t| match best {
                Some(b) if b <= t => Some(b),
                _ => Some(t),
            })
    }
}

/// An axis-aligned box. Used both as an obstacle shape and as the freespace position bounds.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StaticRectangularObstacle<F: Float, const N: usize> {
    min_corner: RealVectorState<F, N>,
    max_corner: RealVectorState<F, N>,
}

impl<F: Float, const N: usize> StaticRectangularObstacle<F, N> {
    /// Creates a new box with the given corners. The corners are sorted per axis.
    pub fn new(a: RealVectorState<F, N>, b: RealVectorState<F, N>) -> Self {
        let mut min_corner = a;
        let mut max_corner = b;
        for i in 0..N {
            min_corner[i] = a[i].min(b[i]);
            max_corner[i] = a[i].max(b[i]);
        }
        Self {
            min_corner,
            max_corner,
        }
    }

    /// Extent along each axis.
    pub fn extent(&self) -> RealVectorState<F, N> {
        self.max_corner - self.min_corner
    }

    /// The point of the box closest to `point`.
    pub fn clamp(&self, point: &RealVectorState<F, N>) -> RealVectorState<F, N> {
        let mut clamped = *point;
        for i in 0..N {
            clamped[i] = point[i].max(self.min_corner[i]).min(self.max_corner[i]);
        }
        clamped
    }
}

impl<F: Float, const N: usize> RectangularObstacle<F, N> for StaticRectangularObstacle<F, N> {
    fn min_corner(&self) -> &RealVectorState<F, N> {
        &self.min_corner
    }

    fn max_corner(&self) -> &RealVectorState<F, N> {
        &self.max_corner
    }
}

impl<F: Float, const N: usize> AnalyticObstacle<F, N> for StaticRectangularObstacle<F, N> {
    fn contains(&self, state: &RealVectorState<F, N>) -> bool {
        RectangularObstacle::contains(self, state)
    }

    fn intersects_edge(&self, start: &RealVectorState<F, N>, end: &RealVectorState<F, N>) -> bool {
        RectangularObstacle::intersects_edge(self, start, end)
    }

    fn intersects_box(&self, bounds: &StaticRectangularObstacle<F, N>) -> bool {
        (0..N).all(|i| {
            self.min_corner[i] <= bounds.max_corner[i] && self.max_corner[i] >= bounds.min_corner[i]
        })
    }

    fn volume(&self) -> F {
        self.extent()
            .values()
            .iter()
            .fold(F::one(), |acc, &side| acc * side)
    }

    fn bounding_center(&self) -> RealVectorState<F, N> {
        self.min_corner.lerp(&self.max_corner, F::from(0.5).unwrap())
    }

    fn bounding_radius(&self) -> F {
        self.extent().norm() / F::from(2.0).unwrap()
    }
}
