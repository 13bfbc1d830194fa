//! .kmap session file I/O.
//!
//! A `.kmap` file is a ZIP archive holding a `session.json` manifest:
//!
//! - [`types`] - serializable types mirroring the `session.json` schema
//! - [`serialization`] - atomic save and validated load

pub mod serialization;
pub mod types;

pub use serialization::{load, save};
