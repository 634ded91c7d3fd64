//! Snapshot and catalog integration tests.

mod common;

use dcd_map::config::DcdConfig;
use dcd_map::store::groups::GroupNames;
use dcd_map::{
    AttributeValue, CellCoord, DcdMap2D, InfoValue, OutputCatalog, TimeRange, load_store,
    save_store,
};
use tempfile::tempdir;

#[test]
fn test_snapshot_preserves_groups_and_attributes() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("run.json");
    let store = common::synthetic_store();
    save_store(&store, &path).unwrap();

    let loaded = load_store(&path).unwrap();
    assert_eq!(loaded.group_names(), store.group_names());
    for name in store.group_names() {
        assert_eq!(loaded.group(&name), store.group(&name));
    }
    assert_eq!(
        loaded.group("count_map").unwrap().attribute("offset"),
        Some(&AttributeValue::Vector(common::OFFSET.to_vec()))
    );
}

#[test]
fn test_map_from_loaded_snapshot() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("run.json");
    save_store(&common::synthetic_store(), &path).unwrap();

    let store = load_store(&path).unwrap();
    let mut dcd = DcdMap2D::from_store(common::metadata(), &store, &GroupNames::default()).unwrap();
    assert_eq!(dcd.valid_times(TimeRange::all()).unwrap().len(), 3);
    let info = dcd.info_dict(CellCoord::new(2, 2), 0.0, 3);
    assert_eq!(info.get("count"), Some(&InfoValue::Int(2)));
}

#[test]
fn test_corrupt_snapshot() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{\"version\": 1, \"groups\": [").unwrap();
    assert!(matches!(load_store(&path), Err(dcd_map::DcdError::Json(_))));

    std::fs::write(&path, "{\"version\": 7, \"groups\": []}").unwrap();
    assert!(load_store(&path).unwrap_err().is_configuration());

    assert!(matches!(
        load_store(&dir.path().join("missing.json")),
        Err(dcd_map::DcdError::Io(_))
    ));
}

#[test]
fn test_catalog_over_output_dir() {
    let dir = tempdir().unwrap();
    save_store(&common::synthetic_store(), &dir.path().join("vadere-run.1.json")).unwrap();
    save_store(&dcd_map::DataStore::new(), &dir.path().join("empty.json")).unwrap();

    let mut catalog = OutputCatalog::scan(dir.path()).unwrap();
    assert_eq!(catalog.names(), vec!["empty", "vadere_run_1"]);

    let store = catalog.load("vadere_run_1").unwrap();
    assert!(store.contains("dcd_map_all"));
    assert!(catalog.load("vadere-run.1").is_err());
}

#[test]
fn test_config_file_drives_store_path() {
    let dir = tempdir().unwrap();
    let snapshot = dir.path().join("snap.json");
    save_store(&common::synthetic_store(), &snapshot).unwrap();

    let config_path = dir.path().join("config.yaml");
    std::fs::write(
        &config_path,
        format!(
            "grid:\n  cell_size: 5.0\n  x_dim: 6\n  y_dim: 6\nstore:\n  path: {}\n",
            snapshot.display()
        ),
    )
    .unwrap();

    let config = DcdConfig::load(&config_path).unwrap();
    let store = load_store(&config.store.path()).unwrap();
    let metadata = config.grid.to_grid_metadata().unwrap();
    assert_eq!(metadata, common::metadata());

    let dcd = DcdMap2D::from_store(metadata, &store, &config.store.groups).unwrap();
    assert_eq!(dcd.update_area(0.0, 1, "count").unwrap().sum(), 1.0);
}
