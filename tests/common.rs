//! Test utilities for the DCD map integration tests.
//!
//! Builds a small synthetic run on a 6x6 grid of 5 m cells:
//!
//! - node 1 walks east along row 0: cells (0,0), (1,0), (2,0) at t = 0, 1, 2
//! - node 2 stays in cell (5,1)
//! - node 3 stays in cell (2,2)
//! - ground truth: 2 pedestrians in (2,2), 1 in node 1's cell
//!
//! Every node reports its own cell and the far cell (5,5), which is empty.

#![allow(dead_code)]

use dcd_map::core::WorldPoint;
use dcd_map::provider::{
    CountMapSchema, DcdMapRawSchema, DcdMapSchema, GlobalMapSchema, PositionSchema,
};
use dcd_map::store::groups::{ATTR_CELL_SIZE, ATTR_EPSG, ATTR_OFFSET};
use dcd_map::{CellCoord, DataStore, GridMetadata, TableGroup, TableSchema};

pub const CELL_SIZE: f64 = 5.0;
pub const TIMES: [f64; 3] = [0.0, 1.0, 2.0];
pub const NODES: [i64; 3] = [1, 2, 3];
pub const FAR_CELL: CellCoord = CellCoord { x: 5, y: 5 };

/// Raster offset: raster frame minus this is UTM 32N around Munich.
pub const OFFSET: [f64; 2] = [-691_000.0, -5_334_000.0];
pub const EPSG: i64 = 32632;

pub fn metadata() -> GridMetadata {
    GridMetadata::new(CELL_SIZE, WorldPoint::ZERO, 6, 6).unwrap()
}

/// Position of a node at a time.
pub fn position(node: i64, t: f64) -> WorldPoint {
    match node {
        1 => WorldPoint::new(2.5 + CELL_SIZE * t, 2.5),
        2 => WorldPoint::new(27.5, 7.5),
        _ => WorldPoint::new(12.5, 12.5),
    }
}

/// Ground-truth count of a cell at a time.
pub fn ground_truth(cell: CellCoord, t: f64) -> f64 {
    let walker = metadata().cell_of(position(1, t));
    if cell == CellCoord::new(2, 2) {
        2.0
    } else if cell == walker {
        1.0
    } else {
        0.0
    }
}

/// Count a node reports for a cell.
pub fn node_count(node: i64, own: bool) -> f64 {
    match (node, own) {
        (3, true) => 2.0,
        (_, true) => 1.0,
        (_, false) => 0.0,
    }
}

fn corner(cell: CellCoord) -> WorldPoint {
    metadata().corner_of(cell)
}

fn with_geo(group: TableGroup) -> TableGroup {
    group
        .with_attribute(ATTR_OFFSET, OFFSET)
        .with_attribute(ATTR_EPSG, EPSG)
        .with_attribute(ATTR_CELL_SIZE, CELL_SIZE)
}

/// Cells a node reports at a time: own cell first.
pub fn reported_cells(node: i64, t: f64) -> [CellCoord; 2] {
    [metadata().cell_of(position(node, t)), FAR_CELL]
}

pub fn position_group() -> TableGroup {
    let mut g = TableGroup::new(
        PositionSchema::GROUP,
        PositionSchema::KEY_ORDER,
        PositionSchema::COLUMNS,
    );
    for t in TIMES {
        for node in NODES {
            let p = position(node, t);
            g.insert(vec![t, node as f64], vec![p.x, p.y]).unwrap();
        }
    }
    g
}

pub fn global_group() -> TableGroup {
    let mut g = with_geo(TableGroup::new(
        GlobalMapSchema::GROUP,
        GlobalMapSchema::KEY_ORDER,
        GlobalMapSchema::COLUMNS,
    ));
    for t in TIMES {
        for cell in metadata().iter_cells() {
            let count = ground_truth(cell, t);
            if count > 0.0 {
                let c = corner(cell);
                g.insert(vec![t, c.x, c.y], vec![count]).unwrap();
            }
        }
    }
    g
}

pub fn dcd_map_group() -> TableGroup {
    let mut g = with_geo(TableGroup::new(
        DcdMapSchema::GROUP,
        DcdMapSchema::KEY_ORDER,
        DcdMapSchema::COLUMNS,
    ));
    for node in NODES {
        for t in TIMES {
            let p = position(node, t);
            for (i, cell) in reported_cells(node, t).into_iter().enumerate() {
                let own = i == 0;
                let c = corner(cell);
                let measured_t = if own { t - 0.5 } else { t - 1.5 };
                let owner_dist = p.distance(&metadata().center_of(cell));
                g.insert(
                    vec![node as f64, t, c.x, c.y],
                    vec![
                        node_count(node, own),
                        measured_t,
                        t,
                        node as f64,
                        if own { 1.0 } else { 0.0 },
                        t - measured_t,
                        t - measured_t,
                        0.0,
                        owner_dist,
                    ],
                )
                .unwrap();
            }
        }
    }
    g
}

pub fn count_map_group() -> TableGroup {
    let mut g = with_geo(TableGroup::new(
        CountMapSchema::GROUP,
        CountMapSchema::KEY_ORDER,
        CountMapSchema::COLUMNS,
    ));
    for t in TIMES {
        for cell in metadata().iter_cells() {
            let gt = ground_truth(cell, t);
            if gt > 0.0 {
                let c = corner(cell);
                g.insert(vec![t, c.x, c.y, 0.0], vec![gt, 0.0, 0.0, 0.0])
                    .unwrap();
            }
        }
        for node in NODES {
            let p = position(node, t);
            for (i, cell) in reported_cells(node, t).into_iter().enumerate() {
                let c = corner(cell);
                let count = node_count(node, i == 0);
                let err = count - ground_truth(cell, t);
                let owner_dist = p.distance(&metadata().center_of(cell));
                g.insert(vec![t, c.x, c.y, node as f64], vec![count, err, owner_dist, err * err])
                    .unwrap();
            }
        }
    }
    g
}

/// Node 3 at t = 1 holds readings from sources 1 and 3 for cell (2,2).
pub fn raw_group() -> TableGroup {
    let mut g = TableGroup::new(
        DcdMapRawSchema::GROUP,
        DcdMapRawSchema::KEY_ORDER,
        DcdMapRawSchema::COLUMNS,
    );
    let c = corner(CellCoord::new(2, 2));
    g.insert(vec![3.0, 1.0, c.x, c.y, 1.0], vec![1.0, 0.2, 0.7])
        .unwrap();
    g.insert(vec![3.0, 1.0, c.x, c.y, 3.0], vec![2.0, 0.5, 1.0])
        .unwrap();
    g
}

/// Store with every group.
pub fn synthetic_store() -> DataStore {
    DataStore::new()
        .with_group(position_group())
        .with_group(global_group())
        .with_group(dcd_map_group())
        .with_group(count_map_group())
        .with_group(raw_group())
}
