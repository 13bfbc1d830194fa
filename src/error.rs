//! Engine-level error type returned by every fallible operation.
//!
//! `EngineError` is serialized to `{ kind, message }` JSON payloads so a GUI
//! layer can pattern-match on a stable `kind` string.

use serde::Serialize;

use crate::models::OrbitalId;

/// Coarse classification of an [`EngineError`].
///
/// Matches the serialized `kind` string one-to-one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    OutOfRange,
    InvalidValue,
    Duplicate,
    IndexOutOfRange,
    KernelFailure,
    Generation,
    NotFound,
    Config,
    Io,
    SessionLoad,
    SessionSave,
}

/// Top-level error returned by engine operations.
///
/// Serialized with serde's adjacently-tagged representation:
/// `{ "kind": "<variant>", "message": <payload> }`
#[derive(Debug, thiserror::Error, Serialize)]
#[serde(tag = "kind", content = "message")]
pub enum EngineError {
    /// An Euler angle lies outside [-90, 90] degrees or is not finite.
    #[error("{0}")]
    OutOfRange(String),

    /// A value failed validation (negative weight, empty sweep axis, ...).
    #[error("{0}")]
    InvalidValue(String),

    /// An identity that must be unique was inserted twice.
    #[error("{0}")]
    Duplicate(String),

    /// A slice index lies outside the cube extent.
    #[error("slice index {index} is outside [0, {len})")]
    IndexOutOfRange { index: i64, len: usize },

    /// The numeric kernel failed or returned unusable data for one
    /// orbital at one sweep point. The whole build is rejected.
    #[error("kernel failed for orbital {orbital} at sweep point {point}: {message}")]
    KernelFailure {
        orbital: OrbitalId,
        point: usize,
        message: String,
    },

    /// The mesh or bond generator could not produce primitives.
    #[error("{0}")]
    Generation(String),

    /// A requested resource (contribution, cube, selection) was not found.
    #[error("{0}")]
    NotFound(String),

    /// The engine configuration could not be parsed or validated.
    #[error("config error: {0}")]
    Config(String),

    /// A generic I/O error, stringified so it remains serializable.
    #[error("{0}")]
    Io(String),

    /// The session archive could not be loaded or parsed.
    #[error("{0}")]
    SessionLoad(String),

    /// The session archive could not be written.
    #[error("{0}")]
    SessionSave(String),
}

impl EngineError {
    /// Return the [`ErrorKind`] of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::OutOfRange(_) => ErrorKind::OutOfRange,
            Self::InvalidValue(_) => ErrorKind::InvalidValue,
            Self::Duplicate(_) => ErrorKind::Duplicate,
            Self::IndexOutOfRange { .. } => ErrorKind::IndexOutOfRange,
            Self::KernelFailure { .. } => ErrorKind::KernelFailure,
            Self::Generation(_) => ErrorKind::Generation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Config(_) => ErrorKind::Config,
            Self::Io(_) => ErrorKind::Io,
            Self::SessionLoad(_) => ErrorKind::SessionLoad,
            Self::SessionSave(_) => ErrorKind::SessionSave,
        }
    }
}

impl From<std::io::Error> for EngineError {
    /// Convert an [`std::io::Error`] into an [`EngineError::Io`].
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_serializes_to_kind_message() {
        let err = EngineError::OutOfRange("phi = 120 is outside [-90, 90]".to_string());
        let value = serde_json::to_value(&err).expect("serialize EngineError::OutOfRange");
        assert_eq!(value["kind"], "OutOfRange");
        assert_eq!(value["message"], "phi = 120 is outside [-90, 90]");
    }

    #[test]
    fn index_out_of_range_carries_index_and_len() {
        let err = EngineError::IndexOutOfRange { index: -1, len: 5 };
        let value = serde_json::to_value(&err).expect("serialize");
        assert_eq!(value["kind"], "IndexOutOfRange");
        assert_eq!(value["message"]["index"], -1);
        assert_eq!(value["message"]["len"], 5);
        assert_eq!(err.to_string(), "slice index -1 is outside [0, 5)");
    }

    #[test]
    fn kernel_failure_names_orbital_and_point() {
        let err = EngineError::KernelFailure {
            orbital: OrbitalId::new("pentacene/HOMO"),
            point: 3,
            message: "NaN at pixel (2, 7)".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("pentacene/HOMO"), "got: {text}");
        assert!(text.contains("sweep point 3"), "got: {text}");
        assert_eq!(err.kind(), ErrorKind::KernelFailure);
    }

    #[test]
    fn from_io_error_produces_io_variant() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = EngineError::from(io_err);
        assert!(matches!(err, EngineError::Io(_)));
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn kind_matches_serialized_kind_string() {
        let errors = [
            EngineError::InvalidValue("w".into()),
            EngineError::Duplicate("d".into()),
            EngineError::NotFound("n".into()),
            EngineError::SessionSave("s".into()),
        ];
        for err in errors {
            let value = serde_json::to_value(&err).expect("serialize");
            let kind = serde_json::to_value(err.kind()).expect("serialize kind");
            assert_eq!(value["kind"], kind);
        }
    }

    #[test]
    fn config_error_display_is_prefixed() {
        assert_eq!(
            EngineError::Config("missing [[sweep]]".to_string()).to_string(),
            "config error: missing [[sweep]]"
        );
    }
}
