//! Sliceable intensity datacube.
//!
//! # Module structure
//!
//! ```text
//! cube/
//! ├── axis.rs     - SweepAxis, SweepGrid (row-major flattening), SweepPoint
//! ├── kernel.rs   - OrbitalKernel: the external per-orbital intensity kernel
//! ├── datacube.rs - Datacube: index-based 2-D slice access
//! └── builder.rs  - parallel weighted superposition with a per-map cache
//! ```

pub mod axis;
pub mod builder;
pub mod datacube;
pub mod kernel;

pub use axis::{SweepAxis, SweepGrid, SweepPoint, MAX_SWEEP_POINTS};
pub use builder::{build_datacube, DatacubeBuilder};
pub use datacube::Datacube;
pub use kernel::{FnKernel, KernelError, OrbitalKernel};
