use num_traits::Float;

/// Volume of the unit ball in `dimension` dimensions.
pub fn unit_ball_volume(dimension: usize) -> f64 {
    let d = dimension as f64;
    std::f64::consts::PI.powf(d / 2.0) / special::Gamma::gamma(1.0 + d / 2.0)
}

/// Volume of a ball of `radius` in `dimension` dimensions (area of a disk in 2D).
pub fn ball_volume<F: Float>(radius: F, dimension: usize) -> F {
    F::from(unit_ball_volume(dimension)).unwrap() * radius.powi(dimension as i32)
}
