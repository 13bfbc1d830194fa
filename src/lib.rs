//! kMap engine library.
//!
//! Orients orbital previews by Euler angles and superposes weighted orbital
//! intensity maps over a parameter sweep into a sliceable datacube. The
//! numeric kernel and the mesh/bond generators are supplied by the host
//! through [`cube::OrbitalKernel`] and [`rotation::PrimitiveGenerator`].

pub mod commands;
pub mod config;
pub mod cube;
pub mod error;
pub mod ledger;
pub mod models;
pub mod rotation;
pub mod session;
pub mod state;

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;

pub use config::EngineConfig;
pub use error::{EngineError, ErrorKind};
pub use state::AppState;

/// Directory holding `kmap.log`:
///   Linux    ~/.local/share/kmap
///   macOS    ~/Library/Application Support/kmap
///   Windows  %LOCALAPPDATA%\kmap
pub fn default_log_dir() -> PathBuf {
    dirs::data_local_dir().unwrap_or_default().join("kmap")
}

/// Install the global tracing subscriber writing to `<log_dir>/kmap.log`.
///
/// The level comes from `RUST_LOG` and defaults to `info`. Keep the
/// returned guard alive for as long as logs should be flushed.
pub fn init_tracing(log_dir: &Path) -> Result<WorkerGuard, EngineError> {
    // tracing_appender::rolling::never panics if it cannot open the file.
    std::fs::create_dir_all(log_dir)?;

    let file_appender = tracing_appender::rolling::never(log_dir, "kmap.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(non_blocking)
        .try_init()
        .map_err(|e| EngineError::Io(format!("cannot install tracing subscriber: {e}")))?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "kMap engine starting");
    Ok(guard)
}
