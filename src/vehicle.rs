use crate::geometry::{Pose, RealVectorState};
use num_traits::Float;
use serde::{Deserialize, Serialize};

/// Rigid-body outline of the vehicle.
///
/// The outline is a list of planar offset points around the centroid. Offsets rotate with the
/// heading in the x-y plane; any further axes (altitude) follow the centroid.
/// An empty outline is a point vehicle with a bounding radius of zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle<F: Float, const N: usize> {
    offsets: Vec<[F; 2]>,
    bounding_radius: F,
    /// World-frame body points for the most recent pose.
    #[serde(skip)]
    world_points: Vec<RealVectorState<F, N>>,
    #[serde(skip)]
    centroid: Option<RealVectorState<F, N>>,
}

impl<F: Float, const N: usize> Vehicle<F, N> {
    /// Constructs a vehicle from offset points relative to its centroid.
    pub fn new(offsets: Vec<[F; 2]>) -> Self {
        let bounding_radius = offsets
            .iter()
            .map(|o| o[0].hypot(o[1]))
            .fold(F::zero(), F::max);
        Self {
            offsets,
            bounding_radius,
            world_points: Vec::new(),
            centroid: None,
        }
    }

    /// A vehicle with no outline.
    pub fn point() -> Self {
        Self::new(Vec::new())
    }

    pub fn offsets(&self) -> &[[F; 2]] {
        &self.offsets
    }

    pub fn is_point(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Max distance from the centroid to any outline point.
    pub fn bounding_radius(&self) -> F {
        self.bounding_radius
    }

    /// Moves the vehicle to `pose` and recomputes the world-frame body points.
    pub fn update_state(&mut self, pose: &Pose<F, N>) {
        self.world_points = self.body_points_at(pose);
        self.centroid = Some(pose.position);
    }

    /// Body points for the last pose given to `update_state`.
    pub fn world_points(&self) -> &[RealVectorState<F, N>] {
        &self.world_points
    }

    pub fn centroid(&self) -> Option<&RealVectorState<F, N>> {
        self.centroid.as_ref()
    }

    /// World-frame body points at `pose`: `centroid + R(heading) * offset`.
    pub fn body_points_at(&self, pose: &Pose<F, N>) -> Vec<RealVectorState<F, N>> {
        let (sin, cos) = pose.heading.sin_cos();
        self.offsets
            .iter()
            .map(|&[ox, oy]| {
                let mut point = pose.position;
                point[0] = point[0] + cos * ox - sin * oy;
                if N > 1 {
                    point[1] = point[1] + sin * ox + cos * oy;
                }
                point
            })
            .collect()
    }
}
