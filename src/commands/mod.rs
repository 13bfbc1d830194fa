//! Caller-facing operations on the shared session.
//!
//! Every function takes the session lock (or the whole [`AppState`] when it
//! needs the config), validates its input, then mutates. Sub-modules are
//! grouped by concern:
//! - [`orbitals`]    - contribution ledger CRUD
//! - [`orientation`] - orbital selection, Euler angles, preview settings
//! - [`cube`]        - datacube build and slice queries
//! - [`session`]     - new / save / load session
//!
//! [`AppState`]: crate::state::AppState

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use uuid::Uuid;

use crate::error::EngineError;
use crate::state::Session;

pub mod cube;
pub mod orbitals;
pub mod orientation;
pub mod session;

pub(crate) fn read_session(
    lock: &RwLock<Session>,
) -> Result<RwLockReadGuard<'_, Session>, EngineError> {
    lock.read()
        .map_err(|e| EngineError::Io(format!("session lock poisoned: {e}")))
}

pub(crate) fn write_session(
    lock: &RwLock<Session>,
) -> Result<RwLockWriteGuard<'_, Session>, EngineError> {
    lock.write()
        .map_err(|e| EngineError::Io(format!("session lock poisoned: {e}")))
}

/// Parse a contribution handle sent as a string.
pub fn parse_handle(id: &str) -> Result<Uuid, EngineError> {
    Uuid::parse_str(id).map_err(|e| EngineError::InvalidValue(format!("invalid handle {id}: {e}")))
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn parse_handle_rejects_garbage() {
        assert_eq!(parse_handle("not-a-uuid").unwrap_err().kind(), ErrorKind::InvalidValue);
        let id = Uuid::new_v4();
        assert_eq!(parse_handle(&id.to_string()).unwrap(), id);
    }
}
