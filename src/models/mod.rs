pub mod contribution;
pub mod orientation;

pub use contribution::{Contribution, OrbitalId, DEFAULT_WEIGHT};
pub use orientation::{EulerAngle, Orientation, ANGLE_MAX, ANGLE_MIN};
