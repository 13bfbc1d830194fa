//! On-disk shape of `session.json` inside a `.kmap` archive.
//!
//! The in-memory counterpart is [`crate::state::Session`]. The built cube
//! and the preview primitives are never stored; both are recomputed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::DisplayConfig;
use crate::models::Contribution;

/// One swept axis with its explicit values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepAxisRecord {
    pub name: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionFile {
    /// Format version; only `1` is understood.
    pub schema_version: u32,
    /// Crate version that wrote the file.
    pub app_version: String,
    pub created_at: String,
    pub modified_at: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub contributions: Vec<Contribution>,
    pub sweep: Vec<SweepAxisRecord>,
    #[serde(default)]
    pub parameters: BTreeMap<String, f64>,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<Uuid>,
}
