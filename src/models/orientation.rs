//! Euler-angle orientation data model.
//!
//! An [`Orientation`] is the `(phi, theta, psi)` triple, in degrees, that
//! describes the cumulative intrinsic rotation of one orbital. Each angle is
//! bounded to `[ANGLE_MIN, ANGLE_MAX]`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Smallest accepted Euler angle in degrees.
pub const ANGLE_MIN: f64 = -90.0;
/// Largest accepted Euler angle in degrees.
pub const ANGLE_MAX: f64 = 90.0;

/// Selects one of the three Euler angles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EulerAngle {
    Phi,
    Theta,
    Psi,
}

impl EulerAngle {
    pub const ALL: [EulerAngle; 3] = [EulerAngle::Phi, EulerAngle::Theta, EulerAngle::Psi];

    pub fn name(self) -> &'static str {
        match self {
            EulerAngle::Phi => "phi",
            EulerAngle::Theta => "theta",
            EulerAngle::Psi => "psi",
        }
    }
}

impl fmt::Display for EulerAngle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Intrinsic Euler orientation `(phi, theta, psi)` in degrees.
///
/// Fields are public so the type can be built literally and deserialized;
/// every engine entry point re-validates with [`Orientation::validate`]
/// before using a value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Orientation {
    pub phi: f64,
    pub theta: f64,
    pub psi: f64,
}

impl Orientation {
    /// The unrotated reference orientation `(0, 0, 0)`.
    pub const IDENTITY: Orientation = Orientation {
        phi: 0.0,
        theta: 0.0,
        psi: 0.0,
    };

    /// Build a validated orientation.
    ///
    /// Returns [`EngineError::OutOfRange`] if any angle lies outside
    /// `[-90, 90]` or is not finite.
    pub fn new(phi: f64, theta: f64, psi: f64) -> Result<Self, EngineError> {
        let orientation = Self { phi, theta, psi };
        orientation.validate()?;
        Ok(orientation)
    }

    /// Check all three angles against `[ANGLE_MIN, ANGLE_MAX]`.
    pub fn validate(&self) -> Result<(), EngineError> {
        for axis in EulerAngle::ALL {
            check_angle(axis, self.angle(axis))?;
        }
        Ok(())
    }

    pub fn angle(&self, axis: EulerAngle) -> f64 {
        match axis {
            EulerAngle::Phi => self.phi,
            EulerAngle::Theta => self.theta,
            EulerAngle::Psi => self.psi,
        }
    }

    /// Return a copy with one angle replaced, validating only the new angle.
    pub fn with_angle(self, axis: EulerAngle, degrees: f64) -> Result<Self, EngineError> {
        check_angle(axis, degrees)?;
        let mut next = self;
        match axis {
            EulerAngle::Phi => next.phi = degrees,
            EulerAngle::Theta => next.theta = degrees,
            EulerAngle::Psi => next.psi = degrees,
        }
        Ok(next)
    }

    /// Bit-exact key, used to cache kernel output per orientation.
    pub(crate) fn cache_key(&self) -> [u64; 3] {
        [self.phi.to_bits(), self.theta.to_bits(), self.psi.to_bits()]
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(phi {:.1}°, theta {:.1}°, psi {:.1}°)",
            self.phi, self.theta, self.psi
        )
    }
}

fn check_angle(axis: EulerAngle, degrees: f64) -> Result<(), EngineError> {
    if !degrees.is_finite() || !(ANGLE_MIN..=ANGLE_MAX).contains(&degrees) {
        return Err(EngineError::OutOfRange(format!(
            "{axis} = {degrees} is outside [{ANGLE_MIN}, {ANGLE_MAX}]"
        )));
    }
    Ok(())
}
