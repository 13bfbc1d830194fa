//! Orbital contribution ledger.
//!
//! [`ContributionLedger`] is the working superposition set: an ordered list
//! of [`Contribution`]s keyed by handle. Insertion order is kept for
//! display only; superposition does not depend on it. Every mutation
//! validates its input before touching the list, so a failed call leaves
//! the ledger unchanged.

use uuid::Uuid;

use crate::error::EngineError;
use crate::models::{Contribution, EulerAngle, OrbitalId, Orientation, DEFAULT_WEIGHT};

#[derive(Debug, Clone, Default)]
pub struct ContributionLedger {
    entries: Vec<Contribution>,
}

impl ContributionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a ledger from stored entries, e.g. a loaded session.
    ///
    /// Every entry is validated the way the individual setters would; the
    /// first invalid or duplicate entry fails the whole call.
    pub fn from_entries(entries: Vec<Contribution>) -> Result<Self, EngineError> {
        let mut ledger = Self::new();
        for entry in entries {
            entry.orientation.validate()?;
            check_weight(entry.weight)?;
            if ledger.contains_orbital(&entry.orbital) {
                return Err(EngineError::Duplicate(format!(
                    "orbital {} appears twice",
                    entry.orbital
                )));
            }
            if ledger.get(entry.handle).is_some() {
                return Err(EngineError::Duplicate(format!(
                    "handle {} appears twice",
                    entry.handle
                )));
            }
            ledger.entries.push(entry);
        }
        Ok(ledger)
    }

    /// Add `orbital` with weight 1.0, enabled, at `initial_orientation`.
    ///
    /// Returns [`EngineError::Duplicate`] if the orbital is already live in
    /// the ledger, or [`EngineError::OutOfRange`] for an invalid orientation.
    pub fn add(
        &mut self,
        orbital: OrbitalId,
        initial_orientation: Orientation,
    ) -> Result<Uuid, EngineError> {
        initial_orientation.validate()?;
        if self.contains_orbital(&orbital) {
            return Err(EngineError::Duplicate(format!(
                "orbital {orbital} is already in the ledger"
            )));
        }

        let handle = Uuid::new_v4();
        tracing::debug!(%orbital, %handle, "contribution added");
        self.entries.push(Contribution {
            handle,
            label: orbital.to_string(),
            orbital,
            weight: DEFAULT_WEIGHT,
            orientation: initial_orientation,
            enabled: true,
        });
        Ok(handle)
    }

    /// Remove the entry behind `handle` and return it.
    pub fn remove(&mut self, handle: Uuid) -> Result<Contribution, EngineError> {
        let index = self.index_of(handle)?;
        let removed = self.entries.remove(index);
        tracing::debug!(orbital = %removed.orbital, %handle, "contribution removed");
        Ok(removed)
    }

    /// Returns [`EngineError::InvalidValue`] for a negative or non-finite
    /// weight.
    pub fn set_weight(&mut self, handle: Uuid, weight: f64) -> Result<(), EngineError> {
        check_weight(weight)?;
        self.entry_mut(handle)?.weight = weight;
        Ok(())
    }

    /// Replace one Euler angle and return the resulting orientation.
    pub fn set_orientation_angle(
        &mut self,
        handle: Uuid,
        axis: EulerAngle,
        degrees: f64,
    ) -> Result<Orientation, EngineError> {
        let entry = self.entry_mut(handle)?;
        let next = entry.orientation.with_angle(axis, degrees)?;
        entry.orientation = next;
        Ok(next)
    }

    /// Replace the whole orientation triple.
    pub fn set_orientation(
        &mut self,
        handle: Uuid,
        orientation: Orientation,
    ) -> Result<(), EngineError> {
        orientation.validate()?;
        self.entry_mut(handle)?.orientation = orientation;
        Ok(())
    }

    pub fn set_enabled(&mut self, handle: Uuid, enabled: bool) -> Result<(), EngineError> {
        self.entry_mut(handle)?.enabled = enabled;
        Ok(())
    }

    pub fn set_label(&mut self, handle: Uuid, label: impl Into<String>) -> Result<(), EngineError> {
        self.entry_mut(handle)?.label = label.into();
        Ok(())
    }

    /// Enabled entries in insertion order.
    pub fn list_enabled(&self) -> Vec<Contribution> {
        self.entries.iter().filter(|c| c.enabled).cloned().collect()
    }

    /// All entries in insertion order, enabled or not.
    pub fn iter(&self) -> impl Iterator<Item = &Contribution> {
        self.entries.iter()
    }

    pub fn get(&self, handle: Uuid) -> Option<&Contribution> {
        self.entries.iter().find(|c| c.handle == handle)
    }

    pub fn find_by_orbital(&self, orbital: &OrbitalId) -> Option<&Contribution> {
        self.entries.iter().find(|c| &c.orbital == orbital)
    }

    pub fn contains_orbital(&self, orbital: &OrbitalId) -> bool {
        self.find_by_orbital(orbital).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn index_of(&self, handle: Uuid) -> Result<usize, EngineError> {
        self.entries
            .iter()
            .position(|c| c.handle == handle)
            .ok_or_else(|| EngineError::NotFound(format!("contribution {handle} not found")))
    }

    fn entry_mut(&mut self, handle: Uuid) -> Result<&mut Contribution, EngineError> {
        let index = self.index_of(handle)?;
        Ok(&mut self.entries[index])
    }
}

fn check_weight(weight: f64) -> Result<(), EngineError> {
    if !weight.is_finite() || weight < 0.0 {
        return Err(EngineError::InvalidValue(format!(
            "weight {weight} must be a finite number >= 0"
        )));
    }
    Ok(())
}
