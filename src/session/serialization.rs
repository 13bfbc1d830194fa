//! Atomic save and validated load for the `.kmap` session format.
//!
//! # Save
//! The archive is written in full to `<target>.tmp` next to the target and
//! then renamed over it. On any failure the temp file is removed and the
//! target is left as it was.
//!
//! # Load
//! `session.json` is read, its `schema_version` checked, and the ledger and
//! sweep grid rebuilt through their validating constructors. The returned
//! session has no cube and an empty preview.

use std::io::{Read, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

use super::types::{SessionFile, SweepAxisRecord};
use crate::config::BuildConfig;
use crate::cube::{SweepAxis, SweepGrid};
use crate::error::EngineError;
use crate::ledger::ContributionLedger;
use crate::state::{make_builder, Session, SCHEMA_VERSION};

/// Name of the manifest inside every `.kmap` ZIP.
const SESSION_JSON: &str = "session.json";

const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Save `session` to `path` atomically.
pub fn save(session: &Session, path: &Path) -> Result<(), EngineError> {
    let file_name = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned();
    let tmp_path = path.with_file_name(format!("{file_name}.tmp"));

    if let Err(e) = write_archive(session, &tmp_path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e);
    }

    std::fs::rename(&tmp_path, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp_path);
        EngineError::SessionSave(format!("rename to final path failed: {e}"))
    })?;
    tracing::info!(path = %path.display(), contributions = session.ledger.len(), "session saved");
    Ok(())
}

/// Load a `.kmap` file. `build` supplies the cache and thread options,
/// which are machine settings and not part of the file.
pub fn load(path: &Path, build: BuildConfig) -> Result<Session, EngineError> {
    let file = std::fs::File::open(path)
        .map_err(|e| EngineError::SessionLoad(format!("cannot open file: {e}")))?;

    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| EngineError::SessionLoad(format!("not a valid ZIP archive: {e}")))?;

    let json_str = {
        let mut entry = archive.by_name(SESSION_JSON).map_err(|e| {
            EngineError::SessionLoad(format!("{SESSION_JSON} not found in archive: {e}"))
        })?;
        let mut s = String::new();
        entry
            .read_to_string(&mut s)
            .map_err(|e| EngineError::SessionLoad(format!("cannot read {SESSION_JSON}: {e}")))?;
        s
    };

    let sf: SessionFile = serde_json::from_str(&json_str)
        .map_err(|e| EngineError::SessionLoad(format!("cannot parse {SESSION_JSON}: {e}")))?;

    if sf.schema_version != SCHEMA_VERSION {
        return Err(EngineError::SessionLoad(format!(
            "unsupported schema version {}; only schema version {SCHEMA_VERSION} is supported",
            sf.schema_version
        )));
    }

    let invalid = |e: EngineError| EngineError::SessionLoad(format!("invalid session: {e}"));
    let axes = sf
        .sweep
        .into_iter()
        .map(|r| SweepAxis::new(r.name, r.values))
        .collect::<Result<Vec<_>, _>>()
        .map_err(invalid)?;
    let grid = SweepGrid::new(axes).map_err(invalid)?;
    if let Some((name, value)) = sf.parameters.iter().find(|(_, v)| !v.is_finite()) {
        return Err(EngineError::SessionLoad(format!(
            "invalid session: parameter {name} = {value} is not finite"
        )));
    }
    sf.display.validate().map_err(invalid)?;
    let ledger = ContributionLedger::from_entries(sf.contributions).map_err(invalid)?;
    let builder = make_builder(grid, sf.parameters, build)?;

    let mut session = Session::new(builder, sf.display);
    session.name = sf.name;
    session.created_at = sf.created_at;
    session.modified_at = sf.modified_at;
    session.selected = sf.selected.filter(|h| ledger.get(*h).is_some());
    session.ledger = ledger;

    tracing::info!(path = %path.display(), contributions = session.ledger.len(), "session loaded");
    Ok(session)
}

fn write_archive(session: &Session, path: &Path) -> Result<(), EngineError> {
    let file = std::fs::File::create(path)
        .map_err(|e| EngineError::SessionSave(format!("cannot create temp file: {e}")))?;

    let mut zip = zip::ZipWriter::new(file);
    let opts = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let sf = SessionFile {
        schema_version: SCHEMA_VERSION,
        app_version: APP_VERSION.to_string(),
        created_at: session.created_at.clone(),
        modified_at: session.modified_at.clone(),
        name: session.name.clone(),
        contributions: session.ledger.iter().cloned().collect(),
        sweep: session
            .builder
            .grid()
            .axes()
            .iter()
            .map(|axis| SweepAxisRecord {
                name: axis.name().to_string(),
                values: axis.values().to_vec(),
            })
            .collect(),
        parameters: session.builder.parameters().clone(),
        display: session.display,
        selected: session.selected,
    };

    let json = serde_json::to_string_pretty(&sf)
        .map_err(|e| EngineError::SessionSave(format!("cannot serialize session: {e}")))?;

    zip.start_file(SESSION_JSON, opts)
        .map_err(|e| EngineError::SessionSave(format!("cannot create {SESSION_JSON} entry: {e}")))?;
    zip.write_all(json.as_bytes())
        .map_err(|e| EngineError::SessionSave(format!("cannot write {SESSION_JSON}: {e}")))?;

    zip.finish()
        .map_err(|e| EngineError::SessionSave(format!("cannot finalize ZIP: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::config::{DisplayConfig, EngineConfig};
    use crate::models::{EulerAngle, OrbitalId, Orientation};

    fn sample_session() -> Session {
        let mut session = Session::from_config(&EngineConfig::builtin()).unwrap();
        session.name = "pentacene".to_string();
        session.created_at = "2026-01-01T00:00:00Z".to_string();
        session.modified_at = "2026-01-02T12:00:00Z".to_string();
        let homo = session
            .ledger
            .add(OrbitalId::new("pentacene/HOMO"), Orientation::IDENTITY)
            .unwrap();
        let lumo = session
            .ledger
            .add(OrbitalId::new("pentacene/LUMO"), Orientation::new(10.0, 20.0, 30.0).unwrap())
            .unwrap();
        session.ledger.set_weight(lumo, 0.5).unwrap();
        session.ledger.set_enabled(homo, false).unwrap();
        session.selected = Some(lumo);
        session
    }

    fn write_raw(path: &Path, json: &str) {
        let file = std::fs::File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let opts = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        zip.start_file(SESSION_JSON, opts).unwrap();
        zip.write_all(json.as_bytes()).unwrap();
        zip.finish().unwrap();
    }

    #[test]
    fn round_trip_keeps_ledger_sweep_and_selection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.kmap");
        let session = sample_session();

        save(&session, &path).expect("save should succeed");
        let loaded = load(&path, BuildConfig::default()).expect("load should succeed");

        assert_eq!(loaded.name, "pentacene");
        assert_eq!(loaded.created_at, session.created_at);
        assert_eq!(loaded.modified_at, session.modified_at);
        let before: Vec<_> = session.ledger.iter().cloned().collect();
        let after: Vec<_> = loaded.ledger.iter().cloned().collect();
        assert_eq!(before, after);
        assert_eq!(loaded.builder.grid(), session.builder.grid());
        assert_eq!(loaded.builder.parameters(), session.builder.parameters());
        assert_eq!(loaded.selected, session.selected);
        assert!(loaded.cube.is_none());
        assert!(loaded.scene.controller().is_empty());
        assert_eq!(
            after[1].orientation.angle(EulerAngle::Theta),
            20.0,
            "orientation must survive"
        );
    }

    #[test]
    fn save_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.kmap");
        save(&sample_session(), &path).unwrap();
        assert!(path.exists());
        assert!(!dir.path().join("s.kmap.tmp").exists());

        let file = std::fs::File::open(&path).unwrap();
        let mut archive = zip::ZipArchive::new(file).expect("valid ZIP");
        assert!(archive.by_name(SESSION_JSON).is_ok());
    }

    #[test]
    fn load_rejects_unknown_schema_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.kmap");
        write_raw(
            &path,
            r#"{
                "schema_version": 99,
                "app_version": "0.1.0",
                "created_at": "",
                "modified_at": "",
                "sweep": [{ "name": "photon_energy", "values": [30.0] }]
            }"#,
        );

        match load(&path, BuildConfig::default()).expect_err("schema 99 must fail") {
            EngineError::SessionLoad(msg) => {
                assert!(msg.contains("schema"), "got: {msg}");
            }
            other => panic!("expected SessionLoad, got {other:?}"),
        }
    }

    #[test]
    fn load_rejects_out_of_range_orientation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("angles.kmap");
        write_raw(
            &path,
            r#"{
                "schema_version": 1,
                "app_version": "0.1.0",
                "created_at": "",
                "modified_at": "",
                "contributions": [{
                    "handle": "3f8a2b00-0000-0000-0000-000000000001",
                    "orbital": "a",
                    "weight": 1.0,
                    "orientation": { "phi": 120.0, "theta": 0.0, "psi": 0.0 },
                    "enabled": true
                }],
                "sweep": [{ "name": "photon_energy", "values": [30.0] }]
            }"#,
        );
        let err = load(&path, BuildConfig::default()).expect_err("phi 120 must fail");
        assert!(matches!(err, EngineError::SessionLoad(_)));
    }

    #[test]
    fn load_rejects_iso_value_outside_unit_interval() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("iso.kmap");
        write_raw(
            &path,
            r#"{
                "schema_version": 1,
                "app_version": "0.1.0",
                "created_at": "",
                "modified_at": "",
                "sweep": [{ "name": "photon_energy", "values": [30.0] }],
                "display": { "iso_value": 5.0, "show_mesh": true, "show_bonds": true }
            }"#,
        );
        match load(&path, BuildConfig::default()).expect_err("iso 5.0 must fail") {
            EngineError::SessionLoad(msg) => assert!(msg.contains("iso_value"), "got: {msg}"),
            other => panic!("expected SessionLoad, got {other:?}"),
        }
    }

    #[test]
    fn minimal_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("min.kmap");
        write_raw(
            &path,
            r#"{
                "schema_version": 1,
                "app_version": "0.1.0",
                "created_at": "",
                "modified_at": "",
                "sweep": [{ "name": "photon_energy", "values": [30.0, 40.0] }]
            }"#,
        );
        let session = load(&path, BuildConfig::default()).unwrap();
        assert!(session.ledger.is_empty());
        assert_eq!(session.display, DisplayConfig::default());
        assert_eq!(session.builder.parameters(), &BTreeMap::new());
        assert_eq!(session.builder.grid().total_count(), 2);
    }

    #[test]
    fn load_fails_gracefully_on_missing_file() {
        let result = load(Path::new("/nonexistent/path/session.kmap"), BuildConfig::default());
        assert!(matches!(result, Err(EngineError::SessionLoad(_))));
    }
}
