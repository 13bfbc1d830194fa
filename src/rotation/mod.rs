//! 3-D orientation of an orbital's visual primitives.
//!
//! # Module structure
//!
//! ```text
//! rotation/
//! ├── axes.rs       - axis resolver: (phi, theta) → AxisTriple
//! ├── primitive.rs  - VisualPrimitive trait plus mesh and bond primitives
//! ├── controller.rs - OrientationController: undo-old / apply-new re-orientation
//! └── registry.rs   - mesh / bond sub-groups and their regeneration
//! ```

pub mod axes;
pub mod controller;
pub mod primitive;
pub mod registry;

pub use axes::{forward_rotation, resolve_axes, AxisTriple};
pub use controller::OrientationController;
pub use primitive::{BondSegment, IsoMesh, IsoSign, PrimitiveId, VisualPrimitive};
pub use registry::{PrimitiveGenerator, PrimitiveRegistry, SubGroup};
