//! Contribution ledger commands.
//!
//! Any change that affects the superposition (add, remove, weight, enable)
//! drops the built cube. Label edits do not.

use std::sync::RwLock;

use uuid::Uuid;

use crate::error::EngineError;
use crate::models::{Contribution, OrbitalId, Orientation};
use crate::state::Session;

use super::{read_session, write_session};

// ── Types ────────────────────────────────────────────────────────────────────

/// Fields required to add an orbital. Angles default to 0°.
#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionInput {
    pub orbital: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub orientation: Orientation,
}

// ── add_orbital ──────────────────────────────────────────────────────────────

/// Add an orbital to the ledger with weight 1, enabled. The label defaults
/// to the orbital id.
pub fn add_orbital(
    input: ContributionInput,
    session_lock: &RwLock<Session>,
) -> Result<Contribution, EngineError> {
    let mut session = write_session(session_lock)?;
    let handle = session
        .ledger
        .add(OrbitalId::new(input.orbital), input.orientation)?;
    if let Some(label) = input.label {
        session.ledger.set_label(handle, label)?;
    }
    session.invalidate_cube();
    contribution(&session, handle)
}

// ── remove_orbital ───────────────────────────────────────────────────────────

/// Remove an orbital. If it drove the preview, the preview is cleared.
pub fn remove_orbital(
    handle: Uuid,
    session_lock: &RwLock<Session>,
) -> Result<Contribution, EngineError> {
    let mut session = write_session(session_lock)?;
    let removed = session.ledger.remove(handle)?;
    if session.selected == Some(handle) {
        session.selected = None;
        session.scene.set_orbital(None, Orientation::IDENTITY)?;
    }
    session.invalidate_cube();
    Ok(removed)
}

// ── set_weight ───────────────────────────────────────────────────────────────

/// Set the weight of one entry. The weight must be finite and >= 0.
pub fn set_weight(
    handle: Uuid,
    weight: f64,
    session_lock: &RwLock<Session>,
) -> Result<Contribution, EngineError> {
    let mut session = write_session(session_lock)?;
    session.ledger.set_weight(handle, weight)?;
    session.invalidate_cube();
    contribution(&session, handle)
}

// ── set_enabled ──────────────────────────────────────────────────────────────

/// Include or exclude an entry from the superposition. The entry keeps
/// its weight and orientation either way.
pub fn set_enabled(
    handle: Uuid,
    enabled: bool,
    session_lock: &RwLock<Session>,
) -> Result<Contribution, EngineError> {
    let mut session = write_session(session_lock)?;
    session.ledger.set_enabled(handle, enabled)?;
    session.invalidate_cube();
    contribution(&session, handle)
}

// ── set_label ────────────────────────────────────────────────────────────────

/// Rename an entry. The cube is unaffected.
pub fn set_label(
    handle: Uuid,
    label: String,
    session_lock: &RwLock<Session>,
) -> Result<Contribution, EngineError> {
    let mut session = write_session(session_lock)?;
    session.ledger.set_label(handle, label)?;
    contribution(&session, handle)
}

// ── list_contributions ───────────────────────────────────────────────────────

/// All entries in insertion order.
pub fn list_contributions(
    session_lock: &RwLock<Session>,
) -> Result<Vec<Contribution>, EngineError> {
    let session = read_session(session_lock)?;
    Ok(session.ledger.iter().cloned().collect())
}

// ── list_enabled ─────────────────────────────────────────────────────────────

/// Entries that take part in the next build, in insertion order.
pub fn list_enabled(session_lock: &RwLock<Session>) -> Result<Vec<Contribution>, EngineError> {
    Ok(read_session(session_lock)?.ledger.list_enabled())
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn contribution(session: &Session, handle: Uuid) -> Result<Contribution, EngineError> {
    session
        .ledger
        .get(handle)
        .cloned()
        .ok_or_else(|| EngineError::NotFound(format!("contribution {handle} not found")))
}

// ── Tests ────────────────────────────────────────────────────────────────────
