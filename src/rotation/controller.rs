//! Orientation state machine for one group of visual primitives.
//!
//! [`OrientationController`] owns the current [`Orientation`] and the set
//! of primitives it governs. Re-orienting first undoes the cumulative
//! rotation that the stored orientation produced, then applies the rotation
//! of the target orientation, so every member ends in the same pose no
//! matter when it joined the group.
//!
//! All methods take `&mut self`; the borrow checker guarantees that the
//! membership set cannot change while a re-orientation is in progress.

use std::collections::HashMap;

use crate::error::EngineError;
use crate::models::Orientation;

use super::axes::{resolve_axes, AxisTriple};
use super::primitive::{PrimitiveId, VisualPrimitive};

#[derive(Debug, Default)]
pub struct OrientationController {
    orientation: Orientation,
    members: HashMap<PrimitiveId, Box<dyn VisualPrimitive>>,
    next_id: u64,
}

impl OrientationController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current stored orientation.
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Rotate every member from the stored orientation to
    /// `(phi, theta, psi)`.
    ///
    /// Returns [`EngineError::OutOfRange`] without touching any primitive if
    /// an angle lies outside `[-90, 90]`. Re-orienting to the stored
    /// orientation is a no-op.
    pub fn reorient(&mut self, phi: f64, theta: f64, psi: f64) -> Result<(), EngineError> {
        let target = Orientation::new(phi, theta, psi)?;
        if target == self.orientation {
            return Ok(());
        }

        let current = self.orientation;
        let old_axes = resolve_axes(current.phi, current.theta);
        let new_axes = resolve_axes(target.phi, target.theta);

        for primitive in self.members.values_mut() {
            undo_rotation(primitive.as_mut(), &old_axes, &current);
            apply_rotation(primitive.as_mut(), &new_axes, &target);
        }

        tracing::debug!(
            from = %current,
            to = %target,
            primitives = self.members.len(),
            "re-oriented primitive group"
        );
        self.orientation = target;
        Ok(())
    }

    /// Add a primitive given in its reference pose and bring it to the
    /// stored orientation immediately.
    pub fn add_primitive(&mut self, mut primitive: Box<dyn VisualPrimitive>) -> PrimitiveId {
        let axes = resolve_axes(self.orientation.phi, self.orientation.theta);
        apply_rotation(primitive.as_mut(), &axes, &self.orientation);

        let id = PrimitiveId(self.next_id);
        self.next_id += 1;
        self.members.insert(id, primitive);
        id
    }

    /// Remove a primitive from the group, returning it in its current pose.
    pub fn remove_primitive(&mut self, id: PrimitiveId) -> Option<Box<dyn VisualPrimitive>> {
        self.members.remove(&id)
    }

    pub fn get(&self, id: PrimitiveId) -> Option<&dyn VisualPrimitive> {
        self.members.get(&id).map(|p| p.as_ref())
    }

    pub fn get_mut(&mut self, id: PrimitiveId) -> Option<&mut (dyn VisualPrimitive + 'static)> {
        self.members.get_mut(&id).map(|p| p.as_mut())
    }

    pub fn contains(&self, id: PrimitiveId) -> bool {
        self.members.contains_key(&id)
    }

    /// Drop every member. The stored orientation is kept.
    pub fn clear(&mut self) {
        self.members.clear();
    }
}

/// Undo `orientation`: reverse order, positive angles.
fn undo_rotation(primitive: &mut dyn VisualPrimitive, axes: &AxisTriple, orientation: &Orientation) {
    primitive.rotate_local(orientation.psi, axes.third);
    primitive.rotate_local(orientation.theta, axes.second);
    primitive.rotate_local(orientation.phi, axes.first);
}

/// Apply `orientation`: forward order, negated angles.
fn apply_rotation(primitive: &mut dyn VisualPrimitive, axes: &AxisTriple, orientation: &Orientation) {
    primitive.rotate_local(-orientation.phi, axes.first);
    primitive.rotate_local(-orientation.theta, axes.second);
    primitive.rotate_local(-orientation.psi, axes.third);
}
