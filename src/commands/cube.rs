//! Datacube commands: build, sweep edits and slice queries.

use std::collections::BTreeMap;
use std::sync::RwLock;

use serde::Serialize;

use crate::cube::{OrbitalKernel, SweepGrid};
use crate::error::EngineError;
use crate::state::Session;

use super::{read_session, write_session};

// ── Types ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisSummary {
    pub name: String,
    pub values: Vec<f64>,
}

/// Shape and axes of the built cube.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CubeSummary {
    /// Sweep axis lengths followed by `(rows, columns)`.
    pub shape: Vec<usize>,
    pub axes: Vec<AxisSummary>,
    pub slice_count: usize,
}

/// One 2-D map, row-major.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SliceData {
    pub index: i64,
    pub coordinates: BTreeMap<String, f64>,
    pub rows: usize,
    pub columns: usize,
    pub data: Vec<f64>,
}

// ── build_cube ───────────────────────────────────────────────────────────────

/// Superpose the enabled contributions with `kernel` and store the cube.
///
/// On failure the previous cube is kept.
pub fn build_cube<K>(kernel: &K, session_lock: &RwLock<Session>) -> Result<CubeSummary, EngineError>
where
    K: OrbitalKernel + ?Sized,
{
    let mut session = write_session(session_lock)?;
    // The builder skips disabled entries but keeps their cached maps.
    let contributions: Vec<_> = session.ledger.iter().cloned().collect();
    let cube = session.builder.build(&contributions, kernel)?;
    session.cube = Some(cube);
    summary(&session)
}

// ── get_cube_summary ─────────────────────────────────────────────────────────

/// Shape and axes of the current cube, or `NotFound` before the first build.
pub fn get_cube_summary(session_lock: &RwLock<Session>) -> Result<CubeSummary, EngineError> {
    summary(&*read_session(session_lock)?)
}

// ── get_slice ────────────────────────────────────────────────────────────────

/// Map at flat index `index` of the built cube.
pub fn get_slice(index: i64, session_lock: &RwLock<Session>) -> Result<SliceData, EngineError> {
    let session = read_session(session_lock)?;
    let cube = session.cube()?;
    let slice = cube.slice_from_index(index)?;
    let (rows, columns) = slice.dim();
    Ok(SliceData {
        index,
        coordinates: cube.point(index)?,
        rows,
        columns,
        data: slice.iter().copied().collect(),
    })
}

// ── get_axis_count ───────────────────────────────────────────────────────────

/// Number of swept axes of the built cube.
pub fn get_axis_count(session_lock: &RwLock<Session>) -> Result<usize, EngineError> {
    Ok(read_session(session_lock)?.cube()?.axis_count())
}

// ── get_swept_axis ───────────────────────────────────────────────────────────

/// Values of the swept axis `name`.
pub fn get_swept_axis(name: &str, session_lock: &RwLock<Session>) -> Result<Vec<f64>, EngineError> {
    let session = read_session(session_lock)?;
    session
        .cube()?
        .swept_axis(name)
        .map(<[f64]>::to_vec)
        .ok_or_else(|| EngineError::NotFound(format!("no swept axis named {name}")))
}

// ── set_sweep ────────────────────────────────────────────────────────────────

/// Replace the sweep grid. The cube and cached maps are dropped.
pub fn set_sweep(grid: SweepGrid, session_lock: &RwLock<Session>) -> Result<(), EngineError> {
    let mut session = write_session(session_lock)?;
    session.builder.set_grid(grid);
    session.invalidate_cube();
    Ok(())
}

// ── set_parameters ───────────────────────────────────────────────────────────

/// Replace the fixed kernel parameters. The cube and cached maps are
/// dropped.
pub fn set_parameters(
    parameters: BTreeMap<String, f64>,
    session_lock: &RwLock<Session>,
) -> Result<(), EngineError> {
    if let Some((name, value)) = parameters.iter().find(|(_, v)| !v.is_finite()) {
        return Err(EngineError::InvalidValue(format!(
            "parameter {name} = {value} must be finite"
        )));
    }
    let mut session = write_session(session_lock)?;
    session.builder.set_parameters(parameters);
    session.invalidate_cube();
    Ok(())
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn summary(session: &Session) -> Result<CubeSummary, EngineError> {
    let cube = session.cube()?;
    Ok(CubeSummary {
        shape: cube.shape(),
        axes: cube
            .grid()
            .axes()
            .iter()
            .map(|axis| AxisSummary {
                name: axis.name().to_string(),
                values: axis.values().to_vec(),
            })
            .collect(),
        slice_count: cube.len(),
    })
}

// ── Tests ────────────────────────────────────────────────────────────────────
