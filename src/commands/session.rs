//! Session lifecycle commands: new, save, load.

use std::path::Path;

use serde::Serialize;
use uuid::Uuid;

use crate::error::EngineError;
use crate::rotation::PrimitiveGenerator;
use crate::state::{AppState, Session};

use super::{orientation, read_session, write_session};

// ── Types ────────────────────────────────────────────────────────────────────

/// Lightweight view of the session for a title bar or status line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub name: String,
    pub modified_at: String,
    pub contribution_count: usize,
    pub enabled_count: usize,
    pub selected: Option<Uuid>,
    pub has_cube: bool,
}

impl From<&Session> for SessionSnapshot {
    fn from(s: &Session) -> Self {
        Self {
            name: s.name.clone(),
            modified_at: s.modified_at.clone(),
            contribution_count: s.ledger.len(),
            enabled_count: s.ledger.iter().filter(|c| c.enabled).count(),
            selected: s.selected,
            has_cube: s.cube.is_some(),
        }
    }
}

// ── new_session ──────────────────────────────────────────────────────────────

/// Replace the session with a fresh one built from the engine config.
pub fn new_session(state: &AppState) -> Result<SessionSnapshot, EngineError> {
    let fresh = Session::from_config(&state.config)?;
    let snapshot = SessionSnapshot::from(&fresh);
    *write_session(&state.session)? = fresh;
    Ok(snapshot)
}

// ── save_session ─────────────────────────────────────────────────────────────

/// Stamp `modified_at` (and `created_at` on first save) and write the
/// session to `path`.
pub fn save_session(path: &Path, state: &AppState) -> Result<(), EngineError> {
    let now = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    let mut session = write_session(&state.session)?;
    let created_at = session.created_at.clone();
    let modified_at = session.modified_at.clone();
    if session.created_at.is_empty() {
        session.created_at = now.clone();
    }
    session.modified_at = now;

    if let Err(e) = crate::session::save(&session, path) {
        session.created_at = created_at;
        session.modified_at = modified_at;
        return Err(e);
    }
    Ok(())
}

// ── load_session ─────────────────────────────────────────────────────────────

/// Load a `.kmap` file and replace the active session. If the file names a
/// selected entry, its preview is rebuilt with `generator`.
pub fn load_session(
    path: &Path,
    generator: &dyn PrimitiveGenerator,
    state: &AppState,
) -> Result<SessionSnapshot, EngineError> {
    let mut loaded = crate::session::load(path, state.config.build)?;
    if let Some(handle) = loaded.selected {
        orientation::show(&mut loaded, Some(handle), generator)?;
    }
    let snapshot = SessionSnapshot::from(&loaded);
    *write_session(&state.session)? = loaded;
    Ok(snapshot)
}

// ── get_session_snapshot ─────────────────────────────────────────────────────

pub fn get_session_snapshot(state: &AppState) -> Result<SessionSnapshot, EngineError> {
    let session = read_session(&state.session)?;
    Ok(SessionSnapshot::from(&*session))
}

// ── Tests ────────────────────────────────────────────────────────────────────
