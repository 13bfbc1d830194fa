//! Orbital selection and orientation commands.
//!
//! One ledger entry at a time drives the 3-D preview. Selecting it rebuilds
//! the preview primitives at the entry's stored orientation; editing that
//! entry's angles re-orients the preview in step with the ledger.

use std::sync::RwLock;

use serde::Serialize;
use uuid::Uuid;

use crate::error::EngineError;
use crate::models::{EulerAngle, OrbitalId, Orientation};
use crate::rotation::{PrimitiveGenerator, PrimitiveRegistry, SubGroup};
use crate::state::Session;

use super::{read_session, write_session};

// ── Types ────────────────────────────────────────────────────────────────────

/// What the preview currently shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewSnapshot {
    pub selected: Option<Uuid>,
    pub orbital: Option<OrbitalId>,
    pub orientation: Orientation,
    pub iso_value: f64,
    pub mesh_count: usize,
    pub bond_count: usize,
    pub show_mesh: bool,
    pub show_bonds: bool,
}

impl From<&Session> for PreviewSnapshot {
    fn from(s: &Session) -> Self {
        Self {
            selected: s.selected,
            orbital: s.scene.orbital().cloned(),
            orientation: s.scene.orientation(),
            iso_value: s.display.iso_value,
            mesh_count: s.scene.members(SubGroup::Mesh).len(),
            bond_count: s.scene.members(SubGroup::Bonds).len(),
            show_mesh: s.scene.is_visible(SubGroup::Mesh),
            show_bonds: s.scene.is_visible(SubGroup::Bonds),
        }
    }
}

// ── select_orbital ───────────────────────────────────────────────────────────

/// Point the preview at `handle` (or at nothing).
pub fn select_orbital(
    handle: Option<Uuid>,
    generator: &dyn PrimitiveGenerator,
    session_lock: &RwLock<Session>,
) -> Result<PreviewSnapshot, EngineError> {
    let mut session = write_session(session_lock)?;
    show(&mut session, handle, generator)?;
    Ok(PreviewSnapshot::from(&*session))
}

// ── show ─────────────────────────────────────────────────────────────────────

/// Rebuild the preview for `handle` at its stored orientation.
///
/// The new scene is generated on the side and swapped in only once both
/// sub-groups are ready, so a generator failure keeps the previous
/// selection and preview.
pub(crate) fn show(
    session: &mut Session,
    handle: Option<Uuid>,
    generator: &dyn PrimitiveGenerator,
) -> Result<(), EngineError> {
    let target = match handle {
        Some(h) => {
            let entry = session
                .ledger
                .get(h)
                .ok_or_else(|| EngineError::NotFound(format!("contribution {h} not found")))?;
            Some((entry.orbital.clone(), entry.orientation))
        }
        None => None,
    };

    let (orbital, orientation) = match target {
        Some((orbital, orientation)) => (Some(orbital), orientation),
        None => (None, Orientation::IDENTITY),
    };
    let display = session.display;
    let mut scene = PrimitiveRegistry::new();
    scene.set_orbital(orbital, orientation)?;
    scene.set_visible(SubGroup::Mesh, display.show_mesh);
    scene.set_visible(SubGroup::Bonds, display.show_bonds);
    scene.regenerate_mesh(generator, display.iso_value)?;
    scene.regenerate_bonds(generator)?;

    session.scene = scene;
    session.selected = handle;
    Ok(())
}

// ── set_orientation_angle ────────────────────────────────────────────────────

/// Set one Euler angle of `handle`. The ledger and, for the selected
/// entry, the preview change together or not at all.
pub fn set_orientation_angle(
    handle: Uuid,
    axis: EulerAngle,
    degrees: f64,
    session_lock: &RwLock<Session>,
) -> Result<Orientation, EngineError> {
    let mut session = write_session(session_lock)?;
    let current = session
        .ledger
        .get(handle)
        .map(|c| c.orientation)
        .ok_or_else(|| EngineError::NotFound(format!("contribution {handle} not found")))?;
    let next = current.with_angle(axis, degrees)?;
    apply(&mut session, handle, next)?;
    Ok(next)
}

// ── set_orientation ──────────────────────────────────────────────────────────

/// Replace the whole orientation triple of `handle`.
pub fn set_orientation(
    handle: Uuid,
    orientation: Orientation,
    session_lock: &RwLock<Session>,
) -> Result<Orientation, EngineError> {
    orientation.validate()?;
    let mut session = write_session(session_lock)?;
    if session.ledger.get(handle).is_none() {
        return Err(EngineError::NotFound(format!("contribution {handle} not found")));
    }
    apply(&mut session, handle, orientation)?;
    Ok(orientation)
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Caller has validated `orientation` and `handle`.
fn apply(session: &mut Session, handle: Uuid, orientation: Orientation) -> Result<(), EngineError> {
    if session.selected == Some(handle) {
        session.scene.reorient(orientation)?;
    }
    session.ledger.set_orientation(handle, orientation)?;
    session.invalidate_cube();
    Ok(())
}

// ── set_iso_value ────────────────────────────────────────────────────────────

/// Change the iso level and regenerate the preview meshes.
pub fn set_iso_value(
    iso_value: f64,
    generator: &dyn PrimitiveGenerator,
    session_lock: &RwLock<Session>,
) -> Result<PreviewSnapshot, EngineError> {
    let mut session = write_session(session_lock)?;
    session.scene.regenerate_mesh(generator, iso_value)?;
    session.display.iso_value = iso_value;
    Ok(PreviewSnapshot::from(&*session))
}

// ── set_group_visible ────────────────────────────────────────────────────────

/// Show or hide the mesh or bond sub-group. The choice persists across
/// reselection.
pub fn set_group_visible(
    group: SubGroup,
    visible: bool,
    session_lock: &RwLock<Session>,
) -> Result<PreviewSnapshot, EngineError> {
    let mut session = write_session(session_lock)?;
    session.scene.set_visible(group, visible);
    match group {
        SubGroup::Mesh => session.display.show_mesh = visible,
        SubGroup::Bonds => session.display.show_bonds = visible,
    }
    Ok(PreviewSnapshot::from(&*session))
}

// ── get_preview ──────────────────────────────────────────────────────────────

/// Snapshot of the preview.
pub fn get_preview(session_lock: &RwLock<Session>) -> Result<PreviewSnapshot, EngineError> {
    let session = read_session(session_lock)?;
    Ok(PreviewSnapshot::from(&*session))
}

// ── Tests ────────────────────────────────────────────────────────────────────
