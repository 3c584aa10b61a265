//! Reference data sets stored as snapshot folders or files.

use std::path::{Path, PathBuf};

use ek_targets::{ReferenceLoader, ReferenceMap};
use ek_types::{ComputationError, EkResult, TestbedSettings};

use crate::snapshots::load_collection;

/// Loads reference data by name from a directory of snapshots: the name
/// maps to a sub-folder `<root>/<name>` or a file `<root>/<name>.json`.
#[derive(Debug, Clone)]
pub struct SnapshotReferenceLoader {
    root: PathBuf,
    settings: TestbedSettings,
}

impl SnapshotReferenceLoader {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            settings: TestbedSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: TestbedSettings) -> Self {
        self.settings = settings;
        self
    }

    /// `<data dir>/ertkit/references`, or `./ertkit/references` without a
    /// platform data directory.
    pub fn default_root() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ertkit")
            .join("references")
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn locate(&self, name: &str) -> Option<PathBuf> {
        let folder = self.root.join(name);
        if folder.is_dir() {
            return Some(folder);
        }
        let file = self.root.join(format!("{name}.json"));
        file.is_file().then_some(file)
    }
}

impl Default for SnapshotReferenceLoader {
    fn default() -> Self {
        Self::new(Self::default_root())
    }
}

impl ReferenceLoader for SnapshotReferenceLoader {
    fn load_named(&self, name: &str) -> EkResult<ReferenceMap> {
        let path = self.locate(name).ok_or_else(|| ComputationError::MissingReferenceData {
            message: format!("no reference data named {} in {}", name, self.root.display()),
        })?;
        tracing::info!("Loading reference data {} from {}", name, path.display());
        self.load_folders(&[path])
    }

    fn load_folders(&self, folders: &[PathBuf]) -> EkResult<ReferenceMap> {
        let collection = load_collection(folders, &self.settings)?;
        if collection.algorithms().len() > 1 {
            tracing::warn!(
                "Reference data mixes algorithms {:?}; later units replace earlier ones",
                collection.algorithms()
            );
        }
        Ok(ReferenceMap::from(collection))
    }
}
