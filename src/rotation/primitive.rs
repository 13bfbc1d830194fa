//! Rotatable visual primitives.
//!
//! A [`VisualPrimitive`] is anything that can be rotated about an axis in
//! its own local frame: iso-surface meshes and bond segments here, a GPU
//! scene node in a rendering host. Primitives are created in their
//! unrotated reference pose and accumulate rotations afterwards.

use std::fmt;

use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};

use super::axes::local_rotation;

/// Identifier of a primitive inside one [`super::OrientationController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PrimitiveId(pub u64);

impl fmt::Display for PrimitiveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which lobe of an orbital an iso-surface encloses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IsoSign {
    Plus,
    Minus,
}

impl IsoSign {
    /// `+1.0` or `-1.0`, the factor applied to the iso value.
    pub fn factor(self) -> f64 {
        match self {
            IsoSign::Plus => 1.0,
            IsoSign::Minus => -1.0,
        }
    }
}

/// An object with an external "rotate by angle about axis, in local frame"
/// operation.
pub trait VisualPrimitive: Send + Sync + fmt::Debug {
    /// Rotate by `degrees` about the unit vector `axis`, post-multiplied onto
    /// the current transform (i.e. in the primitive's local frame).
    fn rotate_local(&mut self, degrees: f64, axis: DVec3);

    /// Cumulative rotation applied since the reference pose.
    fn rotation(&self) -> DQuat;

    fn set_visible(&mut self, visible: bool);

    fn is_visible(&self) -> bool;
}

/// Triangulated iso-surface of one orbital lobe, centred on the origin.
#[derive(Debug, Clone)]
pub struct IsoMesh {
    pub vertices: Vec<DVec3>,
    pub faces: Vec<[u32; 3]>,
    pub sign: IsoSign,
    rotation: DQuat,
    visible: bool,
}

impl IsoMesh {
    /// Create a mesh in its reference pose.
    pub fn new(vertices: Vec<DVec3>, faces: Vec<[u32; 3]>, sign: IsoSign) -> Self {
        Self {
            vertices,
            faces,
            sign,
            rotation: DQuat::IDENTITY,
            visible: true,
        }
    }

    /// Vertices with the cumulative rotation applied.
    pub fn world_vertices(&self) -> Vec<DVec3> {
        self.vertices.iter().map(|v| self.rotation * *v).collect()
    }
}

impl VisualPrimitive for IsoMesh {
    fn rotate_local(&mut self, degrees: f64, axis: DVec3) {
        self.rotation = (self.rotation * local_rotation(axis, degrees)).normalize();
    }

    fn rotation(&self) -> DQuat {
        self.rotation
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn is_visible(&self) -> bool {
        self.visible
    }
}

/// A single bond drawn as a line between two atom centres.
#[derive(Debug, Clone)]
pub struct BondSegment {
    pub start: DVec3,
    pub end: DVec3,
    rotation: DQuat,
    visible: bool,
}

impl BondSegment {
    pub fn new(start: DVec3, end: DVec3) -> Self {
        Self {
            start,
            end,
            rotation: DQuat::IDENTITY,
            visible: true,
        }
    }

    pub fn world_endpoints(&self) -> [DVec3; 2] {
        [self.rotation * self.start, self.rotation * self.end]
    }
}

impl VisualPrimitive for BondSegment {
    fn rotate_local(&mut self, degrees: f64, axis: DVec3) {
        self.rotation = (self.rotation * local_rotation(axis, degrees)).normalize();
    }

    fn rotation(&self) -> DQuat {
        self.rotation
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn is_visible(&self) -> bool {
        self.visible
    }
}
