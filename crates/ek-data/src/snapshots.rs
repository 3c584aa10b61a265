//! JSON snapshots of problem units and batch loading into a collection.

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use ek_engine::{AlgorithmCollection, ProblemUnit};
use ek_types::{DataError, EkResult, TestbedSettings};

const SNAPSHOT_EXTENSION: &str = "json";

/// Read a file holding exactly one unit.
pub fn read_unit_snapshot<P: AsRef<Path>>(path: P) -> EkResult<ProblemUnit> {
    let path = path.as_ref();
    let unit: ProblemUnit = serde_json::from_str(&fs::read_to_string(path)?)?;
    tracing::debug!("Read {} from {}", unit.header(), path.display());
    Ok(unit)
}

pub fn write_unit_snapshot<P: AsRef<Path>>(unit: &ProblemUnit, path: P) -> EkResult<()> {
    let path = path.as_ref();
    create_parent(path)?;
    fs::write(path, serde_json::to_string_pretty(unit)?)?;
    tracing::debug!("Wrote {} to {}", unit.header(), path.display());
    Ok(())
}

/// Write all units of `collection` as one JSON array.
pub fn write_collection<P: AsRef<Path>>(collection: &AlgorithmCollection, path: P) -> EkResult<()> {
    let path = path.as_ref();
    create_parent(path)?;
    let units: Vec<&ProblemUnit> = collection.iter().collect();
    fs::write(path, serde_json::to_string_pretty(&units)?)?;
    tracing::info!("Wrote {} problem units to {}", units.len(), path.display());
    Ok(())
}

/// Units of one snapshot file, which holds a single unit or an array of
/// units. Malformed units are skipped with a warning.
pub fn read_snapshot_file<P: AsRef<Path>>(path: P) -> EkResult<Vec<ProblemUnit>> {
    let path = path.as_ref();
    let value: Value = serde_json::from_str(&fs::read_to_string(path)?)?;
    let items = match value {
        Value::Array(items) => items,
        item @ Value::Object(_) => vec![item],
        _ => {
            return Err(DataError::InvalidFormat {
                message: format!("{}: expected a unit or an array of units", path.display()),
            }
            .into())
        }
    };

    let mut units = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<ProblemUnit>(item) {
            Ok(unit) => units.push(unit),
            Err(e) => tracing::warn!("Skipping unit #{} of {}: {}", i, path.display(), e),
        }
    }
    Ok(units)
}

/// Load snapshot files, and every snapshot file below the given folders,
/// into one collection.
///
/// Units without precision take the testbed's default precision, trials
/// outside its instances of interest are dropped and each unit is checked
/// against the expected instances. Duplicate units are
/// merged. Unreadable files and malformed units are skipped with a warning;
/// a path that does not exist is an error.
pub fn load_collection<P: AsRef<Path>>(paths: &[P], settings: &TestbedSettings) -> EkResult<AlgorithmCollection> {
    let mut collection = AlgorithmCollection::new();
    for path in paths {
        for file in snapshot_files(path.as_ref())? {
            let units = match read_snapshot_file(&file) {
                Ok(units) => units,
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", file.display(), e);
                    continue;
                }
            };
            for mut unit in units {
                unit.apply_default_precision(settings);
                let name = unit.header().to_string();
                if let Err(e) = unit.retain_instances(settings) {
                    tracing::warn!("Skipping {} from {}: {}", name, file.display(), e);
                    continue;
                }
                unit.consistency_check(settings);
                if let Err(e) = collection.push(unit) {
                    tracing::warn!("Could not add {} from {}: {}", name, file.display(), e);
                }
            }
        }
    }

    tracing::info!(
        "Loaded {} problem units of {} algorithms",
        collection.len(),
        collection.algorithms().len()
    );
    Ok(collection)
}

/// `path` itself when it is a file, else all snapshot files below it, sorted.
fn snapshot_files(path: &Path) -> EkResult<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        return Err(DataError::LoadingFailed {
            message: format!("{} does not exist", path.display()),
        }
        .into());
    }

    let mut files = Vec::new();
    let mut pending = vec![path.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir)? {
            let entry = entry?.path();
            if entry.is_dir() {
                pending.push(entry);
            } else if entry.extension().is_some_and(|ext| ext == SNAPSHOT_EXTENSION) {
                files.push(entry);
            }
        }
    }
    files.sort();
    Ok(files)
}

fn create_parent(path: &Path) -> EkResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}
