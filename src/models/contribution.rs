//! Orbital contribution data model.
//!
//! A [`Contribution`] is one orbital's entry in the working superposition
//! set: its identity, weight, orientation and whether it takes part in the
//! next cube build.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Orientation;

/// Weight assigned to a freshly added contribution.
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// Stable, unique identity of an orbital (e.g. a database key or URL).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrbitalId(String);

impl OrbitalId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrbitalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OrbitalId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// One orbital's record in the contribution ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contribution {
    /// Ledger handle, unique per live entry.
    pub handle: Uuid,
    /// Identity of the orbital this entry contributes.
    pub orbital: OrbitalId,
    /// Display label (orbital name, e.g. `"HOMO"`).
    #[serde(default)]
    pub label: String,
    /// Non-negative weight applied to the orbital's intensity map.
    pub weight: f64,
    pub orientation: Orientation,
    /// Disabled entries stay in the ledger but are skipped by cube builds.
    pub enabled: bool,
}
