//! Engine configuration loaded from TOML.
//!
//! A config file names the swept axes, the fixed kernel parameters, the
//! preview display settings and the build options. Anything omitted falls
//! back to [`EngineConfig::builtin`].

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cube::{SweepAxis, SweepGrid};
use crate::error::EngineError;

/// Configuration applied when no file is given: a photon-energy sweep from
/// 20 to 100 eV in 2 eV steps.
const BUILTIN_TOML: &str = r#"
[[sweep]]
name = "photon_energy"
range = [20.0, 100.0, 2.0]

[parameters]
fermi_energy = 0.0
dk = 0.02
alpha = 0.0
beta = 0.0
"#;

/// `[[sweep]]` - one swept axis, given either as `range = [lower, upper,
/// step]` or as an explicit `values` list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SweepConfig {
    pub name: String,
    pub range: Option<[f64; 3]>,
    pub values: Option<Vec<f64>>,
}

impl SweepConfig {
    pub fn to_axis(&self) -> Result<SweepAxis, EngineError> {
        match (&self.range, &self.values) {
            (Some([lower, upper, step]), None) => {
                SweepAxis::from_range(self.name.clone(), *lower, *upper, *step)
            }
            (None, Some(values)) => SweepAxis::new(self.name.clone(), values.clone()),
            _ => Err(EngineError::Config(format!(
                "sweep axis {} must set exactly one of range or values",
                self.name
            ))),
        }
    }
}

/// `[display]` - 3-D preview settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct DisplayConfig {
    /// Iso-surface level as a fraction of the orbital's maximum, in (0, 1].
    pub iso_value: f64,
    pub show_mesh: bool,
    pub show_bonds: bool,
}

impl DisplayConfig {
    /// Returns [`EngineError::InvalidValue`] when `iso_value` is outside
    /// (0, 1].
    pub fn validate(&self) -> Result<(), EngineError> {
        let iso = self.iso_value;
        if !(iso > 0.0 && iso <= 1.0) {
            return Err(EngineError::InvalidValue(format!(
                "display.iso_value = {iso} must lie in (0, 1]"
            )));
        }
        Ok(())
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            iso_value: 0.2,
            show_mesh: true,
            show_bonds: true,
        }
    }
}

/// `[build]` - datacube build options.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct BuildConfig {
    /// Worker threads for cube builds; 0 uses the global rayon pool.
    pub threads: usize,
    pub cache: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            threads: 0,
            cache: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EngineConfig {
    pub sweep: Vec<SweepConfig>,
    #[serde(default)]
    pub parameters: BTreeMap<String, f64>,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub build: BuildConfig,
}

impl EngineConfig {
    pub fn builtin() -> Self {
        parse(BUILTIN_TOML).unwrap_or_else(|e| {
            tracing::error!(error = %e, "built-in config is invalid");
            Self {
                sweep: Vec::new(),
                parameters: BTreeMap::new(),
                display: DisplayConfig::default(),
                build: BuildConfig::default(),
            }
        })
    }

    /// Read and validate a config file.
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            EngineError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        parse(&text)
    }

    /// The sweep grid described by the `[[sweep]]` tables.
    pub fn sweep_grid(&self) -> Result<SweepGrid, EngineError> {
        let axes = self
            .sweep
            .iter()
            .map(SweepConfig::to_axis)
            .collect::<Result<Vec<_>, _>>()?;
        SweepGrid::new(axes)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Parse a TOML string into an [`EngineConfig`], running validation.
pub fn parse(toml_str: &str) -> Result<EngineConfig, EngineError> {
    let cfg: EngineConfig =
        toml::from_str(toml_str).map_err(|e| EngineError::Config(e.to_string()))?;
    validate(&cfg)?;
    Ok(cfg)
}

fn validate(cfg: &EngineConfig) -> Result<(), EngineError> {
    if cfg.sweep.is_empty() {
        return Err(EngineError::Config(
            "at least one [[sweep]] axis is required".to_string(),
        ));
    }

    // Axis construction checks ranges, steps and duplicate names.
    cfg.sweep_grid().map_err(|e| match e {
        EngineError::Config(_) => e,
        other => EngineError::Config(other.to_string()),
    })?;

    if let Some((name, value)) = cfg.parameters.iter().find(|(_, v)| !v.is_finite()) {
        return Err(EngineError::Config(format!(
            "parameters.{name} = {value} must be finite"
        )));
    }

    cfg.display
        .validate()
        .map_err(|e| EngineError::Config(e.to_string()))
}
