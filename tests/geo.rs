//! Geo-reprojection integration tests.

mod common;

use std::sync::Arc;

use approx::assert_relative_eq;
use dcd_map::provider::{CountMapSchema, GeoFrame};
use dcd_map::store::groups::{ATTR_CELL_SIZE, ATTR_EPSG, ATTR_OFFSET};
use dcd_map::{
    CellCoord, Crs, DcdError, DcdMapCount, GlobalMapProvider, Operation, TableGroup, TableSchema,
    WorldPoint,
};

fn count() -> DcdMapCount {
    DcdMapCount::from_store(&common::synthetic_store()).unwrap()
}

#[test]
fn test_cells_round_trip_through_offset() {
    let p = count();
    let metadata = common::metadata();
    let frame = p.select_simtime_and_node_id_exact(1.0, 3, Operation::Eq).unwrap();
    let geo = p.to_geo(&frame, None).unwrap();
    assert_eq!(geo.crs, "EPSG:32632");
    assert_eq!(geo.len(), frame.len());

    let geo_frame = GeoFrame::from_table(p.table()).unwrap();
    for (cell, row) in geo.cells.iter().zip(frame.iter()) {
        // x/y levels are 1 and 2 in the count map
        let back = geo_frame.to_raster_point(WorldPoint::new(cell.key[1], cell.key[2]));
        assert_relative_eq!(back.x, row.key[1]);
        assert_relative_eq!(back.y, row.key[2]);
        assert_eq!(cell.values, row.values);
        assert_eq!(cell.polygon[0], cell.polygon[4]);
        assert_relative_eq!(cell.polygon[2].x - cell.polygon[0].x, common::CELL_SIZE);
    }

    let own = &geo.cells[0];
    let raster = geo_frame.to_raster_point(own.polygon[0]);
    assert_eq!(metadata.cell_of_corner(raster), CellCoord::new(2, 2));
}

#[test]
fn test_reprojection_round_trip() {
    let p = GlobalMapProvider::from_store(&common::synthetic_store()).unwrap();
    let frame = p.select_simtime_exact(0.0, Operation::Eq).unwrap();
    let utm = p.to_geo(&frame, None).unwrap();
    let wgs = p.to_geo(&frame, Some("EPSG:4326")).unwrap();
    assert_eq!(wgs.crs, "EPSG:4326");

    let from = Crs::Wgs84;
    let to = Crs::parse("32632").unwrap();
    for (u, w) in utm.cells.iter().zip(wgs.cells.iter()) {
        // Munich
        assert!((11.0..12.0).contains(&w.polygon[0].x));
        assert!((48.0..49.0).contains(&w.polygon[0].y));
        for (a, b) in u.polygon.iter().zip(w.polygon.iter()) {
            let back = from.transform(*b, &to);
            assert_relative_eq!(back.x, a.x, epsilon = 1e-3);
            assert_relative_eq!(back.y, a.y, epsilon = 1e-3);
        }
    }
}

#[test]
fn test_unsupported_target_crs() {
    let p = count();
    let frame = p.select_all().unwrap();
    assert!(matches!(
        p.to_geo(&frame, Some("EPSG:2056")),
        Err(DcdError::UnsupportedCrs(_))
    ));
}

#[test]
fn test_missing_attributes_fail() {
    let bare = TableGroup::new(
        CountMapSchema::GROUP,
        CountMapSchema::KEY_ORDER,
        CountMapSchema::COLUMNS,
    )
    .with_attribute(ATTR_OFFSET, common::OFFSET)
    .with_attribute(ATTR_CELL_SIZE, common::CELL_SIZE);
    let p = DcdMapCount::attach(Arc::new(bare)).unwrap();
    let frame = p.select_all().unwrap();

    match p.to_geo(&frame, None) {
        Err(DcdError::AttributeNotFound { name, .. }) => assert_eq!(name, ATTR_EPSG),
        other => panic!("expected AttributeNotFound, got {other:?}"),
    }
}

#[test]
fn test_invalid_cell_size() {
    let group = TableGroup::new(
        CountMapSchema::GROUP,
        CountMapSchema::KEY_ORDER,
        CountMapSchema::COLUMNS,
    )
    .with_attribute(ATTR_OFFSET, common::OFFSET)
    .with_attribute(ATTR_EPSG, common::EPSG)
    .with_attribute(ATTR_CELL_SIZE, -5.0);
    let p = DcdMapCount::attach(Arc::new(group)).unwrap();
    assert!(matches!(
        GeoFrame::from_table(p.table()),
        Err(DcdError::InvalidAttribute { .. })
    ));
}
