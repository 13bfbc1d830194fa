//! Interface to the external numeric kernel.
//!
//! The kernel turns one orbital, its orientation and one sweep point into a
//! real-valued `(ky, kx)` intensity map. The physics lives outside this
//! crate; builds call the kernel concurrently from rayon workers, so
//! implementations must be [`Sync`].

use ndarray::Array2;

use crate::models::{OrbitalId, Orientation};

use super::axis::SweepPoint;

/// Failure reported by a kernel implementation.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct KernelError(pub String);

impl KernelError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

pub trait OrbitalKernel: Sync {
    /// `(rows, columns)` of every map this kernel produces.
    fn map_shape(&self) -> (usize, usize);

    fn compute_orbital_slice(
        &self,
        orbital: &OrbitalId,
        orientation: &Orientation,
        point: &SweepPoint,
    ) -> Result<Array2<f64>, KernelError>;
}

/// Adapter turning a closure into an [`OrbitalKernel`].
pub struct FnKernel<F> {
    shape: (usize, usize),
    compute: F,
}

impl<F> FnKernel<F>
where
    F: Fn(&OrbitalId, &Orientation, &SweepPoint) -> Result<Array2<f64>, KernelError> + Sync,
{
    pub fn new(shape: (usize, usize), compute: F) -> Self {
        Self { shape, compute }
    }
}

impl<F> OrbitalKernel for FnKernel<F>
where
    F: Fn(&OrbitalId, &Orientation, &SweepPoint) -> Result<Array2<f64>, KernelError> + Sync,
{
    fn map_shape(&self) -> (usize, usize) {
        self.shape
    }

    fn compute_orbital_slice(
        &self,
        orbital: &OrbitalId,
        orientation: &Orientation,
        point: &SweepPoint,
    ) -> Result<Array2<f64>, KernelError> {
        (self.compute)(orbital, orientation, point)
    }
}
