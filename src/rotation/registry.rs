//! Mesh and bond sub-groups of one orbital's 3-D preview.
//!
//! Both sub-groups share a single [`OrientationController`]. Regenerating a
//! sub-group (e.g. after an iso-value change) swaps its primitives for
//! freshly generated ones, which the controller brings to the current
//! orientation on insertion.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::models::{OrbitalId, Orientation};

use super::controller::OrientationController;
use super::primitive::{IsoSign, PrimitiveId, VisualPrimitive};

/// Source of primitives in their unrotated reference pose.
///
/// Iso-surface triangulation and bond detection live outside this crate;
/// a host implements this trait on top of them.
pub trait PrimitiveGenerator {
    /// Iso-surface of one lobe. `iso_value` is a fraction of the orbital's
    /// maximum amplitude; `sign` selects the lobe.
    fn generate_mesh(
        &self,
        orbital: &OrbitalId,
        iso_value: f64,
        sign: IsoSign,
    ) -> Result<Box<dyn VisualPrimitive>, EngineError>;

    fn generate_bonds(&self, orbital: &OrbitalId)
        -> Result<Vec<Box<dyn VisualPrimitive>>, EngineError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubGroup {
    Mesh,
    Bonds,
}

#[derive(Debug)]
pub struct PrimitiveRegistry {
    controller: OrientationController,
    orbital: Option<OrbitalId>,
    members: HashMap<SubGroup, Vec<PrimitiveId>>,
    hidden: HashMap<SubGroup, bool>,
}

impl Default for PrimitiveRegistry {
    fn default() -> Self {
        Self {
            controller: OrientationController::new(),
            orbital: None,
            members: HashMap::new(),
            hidden: HashMap::new(),
        }
    }
}

impl PrimitiveRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Orbital whose primitives are currently shown, if any.
    pub fn orbital(&self) -> Option<&OrbitalId> {
        self.orbital.as_ref()
    }

    pub fn orientation(&self) -> Orientation {
        self.controller.orientation()
    }

    pub fn controller(&self) -> &OrientationController {
        &self.controller
    }

    /// Switch to another orbital (or none). All primitives are dropped and
    /// the stored orientation becomes `orientation`; call the `regenerate_*`
    /// methods afterwards to populate the sub-groups.
    pub fn set_orbital(
        &mut self,
        orbital: Option<OrbitalId>,
        orientation: Orientation,
    ) -> Result<(), EngineError> {
        orientation.validate()?;
        self.controller.clear();
        self.members.clear();
        self.controller
            .reorient(orientation.phi, orientation.theta, orientation.psi)?;
        self.orbital = orbital;
        Ok(())
    }

    /// Re-orient both sub-groups.
    pub fn reorient(&mut self, orientation: Orientation) -> Result<(), EngineError> {
        self.controller
            .reorient(orientation.phi, orientation.theta, orientation.psi)
    }

    /// Rebuild the plus and minus iso-surfaces at `iso_value`.
    ///
    /// Both meshes are generated before the old ones are removed, so a
    /// generator failure leaves the previous geometry in place.
    pub fn regenerate_mesh(
        &mut self,
        generator: &dyn PrimitiveGenerator,
        iso_value: f64,
    ) -> Result<(), EngineError> {
        if !(iso_value > 0.0 && iso_value <= 1.0) {
            return Err(EngineError::InvalidValue(format!(
                "iso value {iso_value} is outside (0, 1]"
            )));
        }
        let Some(orbital) = self.orbital.clone() else {
            self.clear(SubGroup::Mesh);
            return Ok(());
        };

        let fresh = [IsoSign::Plus, IsoSign::Minus]
            .into_iter()
            .map(|sign| generator.generate_mesh(&orbital, iso_value, sign))
            .collect::<Result<Vec<_>, _>>()?;

        self.replace(SubGroup::Mesh, fresh);
        tracing::debug!(%orbital, iso_value, "regenerated iso meshes");
        Ok(())
    }

    /// Rebuild the bond segments of the current orbital.
    pub fn regenerate_bonds(&mut self, generator: &dyn PrimitiveGenerator) -> Result<(), EngineError> {
        let Some(orbital) = self.orbital.clone() else {
            self.clear(SubGroup::Bonds);
            return Ok(());
        };
        let fresh = generator.generate_bonds(&orbital)?;
        self.replace(SubGroup::Bonds, fresh);
        Ok(())
    }

    /// Show or hide a sub-group. Hidden primitives keep following the
    /// group orientation.
    pub fn set_visible(&mut self, group: SubGroup, visible: bool) {
        self.hidden.insert(group, !visible);
        for id in self.members.get(&group).into_iter().flatten() {
            if let Some(primitive) = self.controller.get_mut(*id) {
                primitive.set_visible(visible);
            }
        }
    }

    pub fn is_visible(&self, group: SubGroup) -> bool {
        !self.hidden.get(&group).copied().unwrap_or(false)
    }

    pub fn members(&self, group: SubGroup) -> &[PrimitiveId] {
        self.members.get(&group).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn primitives(&self, group: SubGroup) -> impl Iterator<Item = &dyn VisualPrimitive> + '_ {
        self.members(group)
            .iter()
            .filter_map(|id| self.controller.get(*id))
    }

    /// Remove every primitive of one sub-group.
    pub fn clear(&mut self, group: SubGroup) {
        for id in self.members.remove(&group).unwrap_or_default() {
            self.controller.remove_primitive(id);
        }
    }

    fn replace(&mut self, group: SubGroup, fresh: Vec<Box<dyn VisualPrimitive>>) {
        self.clear(group);
        let visible = self.is_visible(group);
        let ids = fresh
            .into_iter()
            .map(|mut primitive| {
                primitive.set_visible(visible);
                self.controller.add_primitive(primitive)
            })
            .collect();
        self.members.insert(group, ids);
    }
}
