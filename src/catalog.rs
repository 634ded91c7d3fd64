//! Named snapshots of an output directory.
//!
//! Each `*.json` snapshot is registered under a cleaned name (`.` and `-`
//! replaced by `_`, extension dropped) and loaded only when first used.
//!
//! ```rust,ignore
//! let mut catalog = OutputCatalog::scan(Path::new("results/"))?;
//! let store = catalog.load("run_1_vadere")?;
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{DcdError, Result};
use crate::map::Lazy;
use crate::store::{DataStore, load_store};

/// One snapshot file and its lazily loaded store.
#[derive(Debug)]
pub struct StoreHandle {
    path: PathBuf,
    store: Lazy<DataStore>,
}

impl StoreHandle {
    /// Handle for a snapshot file; nothing is read yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            store: Lazy::empty(),
        }
    }

    /// Snapshot path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the snapshot has been read.
    pub fn is_loaded(&self) -> bool {
        self.store.is_loaded()
    }

    /// The store, read from disk on first access.
    pub fn store(&mut self) -> Result<&DataStore> {
        let path = &self.path;
        self.store.get_or_load(|| load_store(path))
    }
}

/// Logical name to snapshot mapping for one directory.
#[derive(Debug, Default)]
pub struct OutputCatalog {
    root: PathBuf,
    handles: BTreeMap<String, StoreHandle>,
}

impl OutputCatalog {
    /// Register every `*.json` file directly inside `dir`.
    pub fn scan(dir: &Path) -> Result<Self> {
        let mut handles = BTreeMap::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_file() || path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                log::warn!("skipping non UTF-8 file name {}", path.display());
                continue;
            };
            let name = clean_name(stem);
            if let Some(previous) = handles.insert(name.clone(), StoreHandle::new(&path)) {
                log::warn!(
                    "{} shadows {} as '{}'",
                    path.display(),
                    previous.path.display(),
                    name
                );
            }
        }
        log::info!("Found {} snapshots in {}", handles.len(), dir.display());
        Ok(Self {
            root: dir.to_path_buf(),
            handles,
        })
    }

    /// Scanned directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Registered names in order.
    pub fn names(&self) -> Vec<&str> {
        self.handles.keys().map(String::as_str).collect()
    }

    /// Handle by name.
    pub fn get(&self, name: &str) -> Option<&StoreHandle> {
        self.handles.get(name)
    }

    /// Store by name, read on first access.
    pub fn load(&mut self, name: &str) -> Result<&DataStore> {
        let known = self.names().join(", ");
        self.handles
            .get_mut(name)
            .ok_or_else(|| DcdError::Config(format!("no snapshot '{name}' (known: {known})")))?
            .store()
    }

    /// Number of registered snapshots.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Whether no snapshot was found.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

/// `run-1.vadere` -> `run_1_vadere`
fn clean_name(stem: &str) -> String {
    stem.replace(['.', '-'], "_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{TableGroup, save_store};
    use tempfile::tempdir;

    #[test]
    fn test_clean_name() {
        assert_eq!(clean_name("run-1.vadere"), "run_1_vadere");
        assert_eq!(clean_name("plain"), "plain");
    }

    #[test]
    fn test_scan_and_lazy_load() {
        let dir = tempdir().unwrap();
        let store = DataStore::new().with_group(TableGroup::new("global_map", &["simtime"], &["count"]));
        save_store(&store, &dir.path().join("run-1.vadere.json")).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut catalog = OutputCatalog::scan(dir.path()).unwrap();
        assert_eq!(catalog.names(), vec!["run_1_vadere"]);
        assert!(!catalog.get("run_1_vadere").unwrap().is_loaded());

        let loaded = catalog.load("run_1_vadere").unwrap();
        assert!(loaded.contains("global_map"));
        assert!(catalog.get("run_1_vadere").unwrap().is_loaded());
    }

    #[test]
    fn test_unknown_name() {
        let dir = tempdir().unwrap();
        let mut catalog = OutputCatalog::scan(dir.path()).unwrap();
        assert!(catalog.is_empty());
        assert!(catalog.load("missing").unwrap_err().is_configuration());
    }
}
