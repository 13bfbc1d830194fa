//! Swept-parameter axes.
//!
//! A [`SweepGrid`] is the Cartesian product of one or more [`SweepAxis`]
//! value lists. Grid points are flattened in row-major order: the first axis
//! varies slowest, the last axis fastest.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::EngineError;

/// Steps closer to `upper` than this (in units of `step`) still count as
/// reaching it.
const RANGE_TOLERANCE: f64 = 1e-9;

/// Upper bound on the values of one axis and on the points of a grid.
pub const MAX_SWEEP_POINTS: usize = 1_000_000;

/// One swept parameter and its ordered discrete values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepAxis {
    name: String,
    values: Vec<f64>,
}

impl SweepAxis {
    /// Returns [`EngineError::InvalidValue`] for an empty name, an empty
    /// or oversized value list, or a non-finite value.
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Result<Self, EngineError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(EngineError::InvalidValue(
                "sweep axis name must not be empty".to_string(),
            ));
        }
        if values.is_empty() {
            return Err(EngineError::InvalidValue(format!(
                "sweep axis {name} has no values"
            )));
        }
        if values.len() > MAX_SWEEP_POINTS {
            return Err(EngineError::InvalidValue(format!(
                "sweep axis {name} has {} values; at most {MAX_SWEEP_POINTS} are allowed",
                values.len()
            )));
        }
        if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(EngineError::InvalidValue(format!(
                "sweep axis {name} contains non-finite value {bad}"
            )));
        }
        Ok(Self { name, values })
    }

    /// `lower, lower + step, ...` up to and including `upper`. Ranges with
    /// more than [`MAX_SWEEP_POINTS`] values are rejected before anything
    /// is allocated.
    pub fn from_range(
        name: impl Into<String>,
        lower: f64,
        upper: f64,
        step: f64,
    ) -> Result<Self, EngineError> {
        let name = name.into();
        if !(step.is_finite() && step > 0.0) {
            return Err(EngineError::InvalidValue(format!(
                "sweep axis {name}: step {step} must be > 0"
            )));
        }
        if !(lower.is_finite() && upper.is_finite()) || upper < lower {
            return Err(EngineError::InvalidValue(format!(
                "sweep axis {name}: range [{lower}, {upper}] is empty"
            )));
        }

        let steps = ((upper - lower) / step + RANGE_TOLERANCE).floor();
        if steps >= MAX_SWEEP_POINTS as f64 {
            return Err(EngineError::InvalidValue(format!(
                "sweep axis {name}: range [{lower}, {upper}] with step {step} exceeds {MAX_SWEEP_POINTS} values"
            )));
        }
        let steps = steps as usize;
        let values = (0..=steps).map(|i| lower + i as f64 * step).collect();
        Self::new(name, values)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Parameters handed to the kernel for one grid point.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepPoint {
    /// Flat row-major index of the point.
    pub index: usize,
    /// Fixed parameters overlaid with this point's swept values.
    pub parameters: BTreeMap<String, f64>,
}

impl SweepPoint {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.parameters.get(name).copied()
    }
}

/// Cartesian product of swept axes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepGrid {
    axes: Vec<SweepAxis>,
}

impl SweepGrid {
    /// Returns [`EngineError::InvalidValue`] when `axes` is empty or the
    /// grid would exceed [`MAX_SWEEP_POINTS`] points, and
    /// [`EngineError::Duplicate`] when two axes share a name.
    pub fn new(axes: Vec<SweepAxis>) -> Result<Self, EngineError> {
        if axes.is_empty() {
            return Err(EngineError::InvalidValue(
                "at least one sweep axis is required".to_string(),
            ));
        }
        for (i, axis) in axes.iter().enumerate() {
            if axes[..i].iter().any(|a| a.name == axis.name) {
                return Err(EngineError::Duplicate(format!(
                    "sweep axis {} is defined twice",
                    axis.name
                )));
            }
        }
        match checked_total(&axes) {
            Some(total) if total <= MAX_SWEEP_POINTS => Ok(Self { axes }),
            _ => Err(EngineError::InvalidValue(format!(
                "sweep grid has more than {MAX_SWEEP_POINTS} points"
            ))),
        }
    }

    pub fn axes(&self) -> &[SweepAxis] {
        &self.axes
    }

    pub fn axis_count(&self) -> usize {
        self.axes.len()
    }

    pub fn axis(&self, name: &str) -> Option<&SweepAxis> {
        self.axes.iter().find(|a| a.name == name)
    }

    /// Number of grid points: the product of all axis lengths.
    pub fn total_count(&self) -> usize {
        checked_total(&self.axes).unwrap_or(usize::MAX)
    }

    /// Per-axis cardinalities, in axis order.
    pub fn shape(&self) -> Vec<usize> {
        self.axes.iter().map(SweepAxis::len).collect()
    }

    /// Split a flat index into one index per axis. `flat` must be below
    /// [`Self::total_count`].
    pub fn unravel(&self, flat: usize) -> Vec<usize> {
        let mut remainder = flat;
        let mut indices = vec![0; self.axes.len()];
        for (slot, axis) in indices.iter_mut().zip(&self.axes).rev() {
            *slot = remainder % axis.len();
            remainder /= axis.len();
        }
        indices
    }

    /// Combine one index per axis into a flat index.
    pub fn ravel(&self, indices: &[usize]) -> Result<usize, EngineError> {
        if indices.len() != self.axes.len() {
            return Err(EngineError::InvalidValue(format!(
                "expected {} axis indices, got {}",
                self.axes.len(),
                indices.len()
            )));
        }
        let mut flat = 0;
        for (&index, axis) in indices.iter().zip(&self.axes) {
            if index >= axis.len() {
                return Err(EngineError::IndexOutOfRange {
                    index: index as i64,
                    len: axis.len(),
                });
            }
            flat = flat * axis.len() + index;
        }
        Ok(flat)
    }

    /// Swept coordinates of the point at `flat`.
    pub fn coordinates(&self, flat: usize) -> BTreeMap<String, f64> {
        self.unravel(flat)
            .into_iter()
            .zip(&self.axes)
            .map(|(i, axis)| (axis.name.clone(), axis.values[i]))
            .collect()
    }

    /// Every grid point in flat order, with `fixed` parameters underneath
    /// the swept values.
    pub fn points(&self, fixed: &BTreeMap<String, f64>) -> Vec<SweepPoint> {
        (0..self.total_count())
            .map(|index| {
                let mut parameters = fixed.clone();
                parameters.extend(self.coordinates(index));
                SweepPoint { index, parameters }
            })
            .collect()
    }
}

fn checked_total(axes: &[SweepAxis]) -> Option<usize> {
    axes.iter()
        .try_fold(1usize, |total, axis| total.checked_mul(axis.len()))
}
