//! Built intensity datacube.
//!
//! Storage is a `(points, rows, columns)` array where `points` runs over the
//! flattened sweep grid. [`Datacube::to_ndarray`] exposes the full
//! N-dimensional view `(n_1, ..., n_k, rows, columns)`.

use std::collections::BTreeMap;

use ndarray::{Array3, ArrayD, ArrayView2, Axis};

use crate::error::EngineError;

use super::axis::SweepGrid;

#[derive(Debug, Clone)]
pub struct Datacube {
    grid: SweepGrid,
    data: Array3<f64>,
}

impl Datacube {
    /// `data` must hold exactly one map per grid point.
    pub(crate) fn new(grid: SweepGrid, data: Array3<f64>) -> Result<Self, EngineError> {
        if data.len_of(Axis(0)) != grid.total_count() {
            return Err(EngineError::InvalidValue(format!(
                "cube holds {} maps but the sweep grid has {} points",
                data.len_of(Axis(0)),
                grid.total_count()
            )));
        }
        Ok(Self { grid, data })
    }

    pub fn grid(&self) -> &SweepGrid {
        &self.grid
    }

    pub fn axis_count(&self) -> usize {
        self.grid.axis_count()
    }

    /// Ordered values of the swept axis called `name`.
    pub fn swept_axis(&self, name: &str) -> Option<&[f64]> {
        self.grid.axis(name).map(|axis| axis.values())
    }

    /// Number of 2-D slices.
    pub fn len(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(rows, columns)` of every slice.
    pub fn map_shape(&self) -> (usize, usize) {
        let (_, rows, columns) = self.data.dim();
        (rows, columns)
    }

    /// Full N-dimensional shape: the sweep axes followed by the map shape.
    pub fn shape(&self) -> Vec<usize> {
        let (rows, columns) = self.map_shape();
        let mut shape = self.grid.shape();
        shape.extend([rows, columns]);
        shape
    }

    /// The 2-D map at flat, row-major index `index`.
    ///
    /// Returns [`EngineError::IndexOutOfRange`] outside `[0, len)`.
    pub fn slice_from_index(&self, index: i64) -> Result<ArrayView2<'_, f64>, EngineError> {
        let len = self.len();
        match usize::try_from(index) {
            Ok(i) if i < len => Ok(self.data.index_axis(Axis(0), i)),
            _ => Err(EngineError::IndexOutOfRange { index, len }),
        }
    }

    /// The 2-D map at one index per swept axis.
    pub fn slice_from_indices(&self, indices: &[usize]) -> Result<ArrayView2<'_, f64>, EngineError> {
        let flat = self.grid.ravel(indices)?;
        Ok(self.data.index_axis(Axis(0), flat))
    }

    /// Swept coordinates of the slice at `index`.
    pub fn point(&self, index: i64) -> Result<BTreeMap<String, f64>, EngineError> {
        let len = self.len();
        match usize::try_from(index) {
            Ok(i) if i < len => Ok(self.grid.coordinates(i)),
            _ => Err(EngineError::IndexOutOfRange { index, len }),
        }
    }

    /// Copy of the data reshaped to [`Self::shape`].
    pub fn to_ndarray(&self) -> Result<ArrayD<f64>, EngineError> {
        self.data
            .as_standard_layout()
            .into_owned()
            .into_shape_with_order(self.shape())
            .map_err(|e| EngineError::InvalidValue(format!("cannot reshape cube: {e}")))
    }
}
