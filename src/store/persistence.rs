//! JSON snapshots of a [`DataStore`].
//!
//! The snapshot is the whole store as one document:
//!
//! ```text
//! { "version": 1, "groups": [ { "name", "key_order", "columns", "rows", "attributes" }, ... ] }
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{DataStore, TableGroup};
use crate::error::{DcdError, Result};

const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    groups: Vec<&'a TableGroup>,
}

#[derive(Deserialize)]
struct Snapshot {
    version: u32,
    groups: Vec<TableGroup>,
}

/// Write a store snapshot to any writer.
pub fn write_store<W: Write>(store: &DataStore, writer: W) -> Result<()> {
    let snapshot = SnapshotRef {
        version: SNAPSHOT_VERSION,
        groups: store.groups().collect(),
    };
    serde_json::to_writer(writer, &snapshot)?;
    Ok(())
}

/// Read a store snapshot from any reader.
pub fn read_store<R: Read>(reader: R) -> Result<DataStore> {
    let snapshot: Snapshot = serde_json::from_reader(reader)?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(DcdError::Config(format!(
            "unsupported snapshot version {} (expected {})",
            snapshot.version, SNAPSHOT_VERSION
        )));
    }

    let mut store = DataStore::new();
    for mut group in snapshot.groups {
        group.validate()?;
        store.insert_group(group);
    }
    Ok(store)
}

/// Save a store snapshot to a file.
pub fn save_store(store: &DataStore, path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_store(store, &mut writer)?;
    writer.flush()?;
    log::info!("Saved store snapshot to {}", path.display());
    Ok(())
}

/// Load a store snapshot from a file.
pub fn load_store(path: &Path) -> Result<DataStore> {
    let reader = BufReader::new(File::open(path)?);
    let store = read_store(reader)?;
    log::info!(
        "Loaded store snapshot {} ({} groups)",
        path.display(),
        store.group_names().len()
    );
    Ok(store)
}
