//! Rotation axis resolver.
//!
//! The orientation `(phi, theta, psi)` is an intrinsic z-x'-z'' sequence:
//! the first rotation turns about the world up axis, the second about the
//! line of nodes that the first rotation produced, the third about the
//! body axis tilted by the first two. [`resolve_axes`] computes those three
//! axes; `psi` never influences them.
//!
//! Near `theta = ±90°` the third axis lies in the xy-plane and the sequence
//! approaches a gimbal-adjacent configuration. Precision degrades there but
//! every returned axis is still finite and unit length.

use glam::{DQuat, DVec3};

use crate::models::Orientation;

/// Axes shorter than this (before normalisation) are replaced by a fallback.
const MIN_AXIS_NORM: f64 = 1e-12;

/// The three unit axes of one intrinsic rotation step, in application order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisTriple {
    pub first: DVec3,
    pub second: DVec3,
    pub third: DVec3,
}

impl AxisTriple {
    pub fn as_array(&self) -> [DVec3; 3] {
        [self.first, self.second, self.third]
    }
}

/// Compute the rotation axes for the orientation `(phi, theta, ·)`.
///
/// Pure and deterministic. Angles are in degrees.
pub fn resolve_axes(phi: f64, theta: f64) -> AxisTriple {
    let (sin_phi, cos_phi) = phi.to_radians().sin_cos();
    let (sin_theta, cos_theta) = theta.to_radians().sin_cos();

    let first = DVec3::Z;
    let second = unit_or(DVec3::new(cos_phi, -sin_phi, 0.0), DVec3::X);
    let third = unit_or(
        DVec3::new(sin_phi * sin_theta, cos_phi * sin_theta, cos_theta),
        first,
    );

    AxisTriple {
        first,
        second,
        third,
    }
}

/// Cumulative visual rotation of `orientation`, applied to a primitive in
/// its reference pose.
///
/// Rotations are composed in the primitive's local frame (post-multiplied)
/// in forward order `phi, theta, psi`, each with the negated stored angle.
pub fn forward_rotation(orientation: &Orientation) -> DQuat {
    let axes = resolve_axes(orientation.phi, orientation.theta);
    local_rotation(axes.first, -orientation.phi)
        * local_rotation(axes.second, -orientation.theta)
        * local_rotation(axes.third, -orientation.psi)
}

/// Rotation by `degrees` about the unit `axis`.
pub(crate) fn local_rotation(axis: DVec3, degrees: f64) -> DQuat {
    DQuat::from_axis_angle(axis, degrees.to_radians())
}

fn unit_or(v: DVec3, fallback: DVec3) -> DVec3 {
    let len = v.length();
    if len.is_finite() && len >= MIN_AXIS_NORM {
        v / len
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-12;

    fn approx_eq(a: DVec3, b: DVec3) {
        assert!((a - b).length() <= EPSILON, "{a} != {b}");
    }

    #[test]
    fn identity_axes_are_z_x_z() {
        let axes = resolve_axes(0.0, 0.0);
        approx_eq(axes.first, DVec3::Z);
        approx_eq(axes.second, DVec3::X);
        approx_eq(axes.third, DVec3::Z);
    }

    #[test]
    fn phi_turns_line_of_nodes() {
        let axes = resolve_axes(90.0, 0.0);
        approx_eq(axes.second, DVec3::new(0.0, -1.0, 0.0));
    }

    #[test]
    fn axes_are_unit_length_over_full_range() {
        for phi in (-90..=90).step_by(15) {
            for theta in (-90..=90).step_by(15) {
                let axes = resolve_axes(f64::from(phi), f64::from(theta));
                for axis in axes.as_array() {
                    assert!((axis.length() - 1.0).abs() < 1e-12, "phi {phi} theta {theta}");
                    assert!(axis.is_finite());
                }
            }
        }
    }

    #[test]
    fn second_axis_is_orthogonal_to_first_and_third() {
        let axes = resolve_axes(33.0, -71.0);
        assert!(axes.first.dot(axes.second).abs() < EPSILON);
        assert!(axes.second.dot(axes.third).abs() < EPSILON);
    }

    #[test]
    fn gimbal_adjacent_theta_stays_finite() {
        let axes = resolve_axes(45.0, 90.0);
        assert!(axes.third.is_finite());
        assert!(axes.third.z.abs() < 1e-12);
    }

    #[test]
    fn non_finite_input_falls_back_to_unit_axes() {
        let axes = resolve_axes(f64::NAN, f64::NAN);
        approx_eq(axes.second, DVec3::X);
        approx_eq(axes.third, DVec3::Z);
    }

    #[test]
    fn identity_orientation_has_identity_rotation() {
        let q = forward_rotation(&Orientation::IDENTITY);
        assert!(q.abs_diff_eq(DQuat::IDENTITY, EPSILON));
    }

    #[test]
    fn pure_phi_spins_about_world_z() {
        let o = Orientation::new(90.0, 0.0, 0.0).unwrap();
        let q = forward_rotation(&o);
        // Visual rotation is the negative of the stored angle.
        approx_eq(q * DVec3::X, DVec3::new(0.0, -1.0, 0.0));
        approx_eq(q * DVec3::Z, DVec3::Z);
    }
}
