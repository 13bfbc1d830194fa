//! Caller-facing engine state.
//!
//! [`AppState`] owns the active [`Session`] behind a [`RwLock`]; the
//! functions in [`crate::commands`] take the lock, run one operation and
//! release it.

use std::collections::BTreeMap;
use std::sync::RwLock;

use uuid::Uuid;

use crate::config::{BuildConfig, DisplayConfig, EngineConfig};
use crate::cube::{Datacube, DatacubeBuilder, SweepGrid};
use crate::error::EngineError;
use crate::ledger::ContributionLedger;
use crate::rotation::PrimitiveRegistry;

/// Current on-disk session schema.
pub const SCHEMA_VERSION: u32 = 1;

/// The working session: the contribution ledger, the sweep it is built
/// over, the last built cube and the 3-D preview of the selected orbital.
#[derive(Debug)]
pub struct Session {
    pub name: String,
    pub schema_version: u32,
    /// RFC 3339 creation timestamp (empty until first saved).
    pub created_at: String,
    /// RFC 3339 last-modified timestamp (empty until first saved).
    pub modified_at: String,
    pub ledger: ContributionLedger,
    pub builder: DatacubeBuilder,
    /// Last successful build. Cleared by any ledger or sweep change.
    pub cube: Option<Datacube>,
    /// Preview primitives of the selected orbital.
    pub scene: PrimitiveRegistry,
    /// Ledger handle driving the preview.
    pub selected: Option<Uuid>,
    pub display: DisplayConfig,
}

impl Session {
    pub fn new(builder: DatacubeBuilder, display: DisplayConfig) -> Self {
        Self {
            name: String::new(),
            schema_version: SCHEMA_VERSION,
            created_at: String::new(),
            modified_at: String::new(),
            ledger: ContributionLedger::new(),
            builder,
            cube: None,
            scene: PrimitiveRegistry::new(),
            selected: None,
            display,
        }
    }

    /// Fresh session with the sweep, parameters and options from `config`.
    pub fn from_config(config: &EngineConfig) -> Result<Self, EngineError> {
        let builder = make_builder(config.sweep_grid()?, config.parameters.clone(), config.build)?;
        Ok(Self::new(builder, config.display))
    }

    /// Drop the built cube; the next query needs a rebuild.
    pub fn invalidate_cube(&mut self) {
        self.cube = None;
    }

    pub fn cube(&self) -> Result<&Datacube, EngineError> {
        self.cube
            .as_ref()
            .ok_or_else(|| EngineError::NotFound("no datacube has been built".to_string()))
    }
}

/// Builder over `grid` honouring the `[build]` options.
pub fn make_builder(
    grid: SweepGrid,
    parameters: BTreeMap<String, f64>,
    build: BuildConfig,
) -> Result<DatacubeBuilder, EngineError> {
    DatacubeBuilder::new(grid, parameters)
        .with_cache(build.cache)
        .with_threads(build.threads)
}

/// Root engine state shared by all commands.
#[derive(Debug)]
pub struct AppState {
    pub session: RwLock<Session>,
    pub config: EngineConfig,
}

impl AppState {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let session = Session::from_config(&config)?;
        Ok(Self {
            session: RwLock::new(session),
            config,
        })
    }
}
