pub mod line;
pub mod plane;
pub mod pose;
pub mod state;
pub mod volume;

pub use line::Line;
pub use plane::Plane;
pub use pose::{wrap_angle, Pose};
pub use state::RealVectorState;
pub use volume::{ball_volume, unit_ball_volume};
