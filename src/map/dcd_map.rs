//! Node-centric and global views over one simulation run.

use std::collections::BTreeMap;

use serde::Serialize;

use super::info::{InfoDict, InfoValue};
use super::lazy::Lazy;
use super::position::PositionTable;
use super::stats::{Aggregation, ColumnSummary, DistanceProfile, Histogram, mean, sample_std};
use crate::core::{CellCoord, GROUND_TRUTH_ID, NodeId, SimTime, TimeRange, WorldPoint};
use crate::error::{DcdError, Result};
use crate::grid::{DenseGrid, GridMetadata};
use crate::provider::{
    CountMapKey, DcdMapCount, DcdMapKey, DcdMapProvider, DcdMapSchema, GlobalMapProvider,
    PositionProvider,
};
use crate::query::{CompositeKey, Condition, Operation, Row, Table, TableSchema};
use crate::store::DataStore;
use crate::store::groups::GroupNames;

/// Returned by [`DcdMap2D::get_location`] when the position is unknown.
pub const LOCATION_UNKNOWN: WorldPoint = WorldPoint { x: -1.0, y: -1.0 };

/// Per-time node count statistics against ground truth.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CountDiff {
    /// Simulation time
    pub simtime: f64,
    /// Mean of the per-node total counts
    pub mean: f64,
    /// Sample standard deviation of the per-node totals
    pub std: f64,
    /// Ground-truth total count
    pub actual: f64,
}

/// Decentralized crowd density map of one run.
///
/// Combines grid metadata, the ground-truth table and the position trace
/// with two lazily materialized provider views: the density map (`map`)
/// and the count/error map (`count_map`). Each is loaded on first access
/// with the slice given at construction and cached for the lifetime of
/// the instance.
///
/// # Example
///
/// ```rust,ignore
/// let mut dcd = DcdMap2D::from_store(metadata, &store, &GroupNames::default())?;
/// let area = dcd.update_area(2.0, 3, "err")?;
/// assert_eq!(area.shape(), (metadata.y_dim(), metadata.x_dim()));
/// ```
#[derive(Debug)]
pub struct DcdMap2D {
    metadata: GridMetadata,
    global: Table,
    positions: PositionTable,

    map: Lazy<Table>,
    map_source: Option<(DcdMapProvider, Vec<Condition>)>,

    count_map: Lazy<Table>,
    count_source: Option<(DcdMapCount, Vec<Condition>)>,
}

impl DcdMap2D {
    /// Map over a ground-truth table (`[simtime, x, y] -> [count]`) and a
    /// position trace. Density and count views are attached separately.
    pub fn new(metadata: GridMetadata, global: Table, positions: PositionTable) -> Self {
        Self {
            metadata,
            global,
            positions,
            map: Lazy::empty(),
            map_source: None,
            count_map: Lazy::empty(),
            count_source: None,
        }
    }

    /// Bind every group found in a store. Density and count views are
    /// optional and left unconfigured when their group is missing.
    pub fn from_store(metadata: GridMetadata, store: &DataStore, names: &GroupNames) -> Result<Self> {
        let global = GlobalMapProvider::from_store_named(store, &names.global_map)?.select_all()?;
        let positions =
            PositionTable::from_provider(&PositionProvider::from_store_named(store, &names.position)?)?;

        let mut dcd = Self::new(metadata, global, positions);
        if store.contains(&names.dcd_map) {
            dcd = dcd.with_map_provider(
                DcdMapProvider::from_store_named(store, &names.dcd_map)?,
                Vec::new(),
            );
        }
        if store.contains(&names.count_map) {
            dcd = dcd.with_count_provider(
                DcdMapCount::from_store_named(store, &names.count_map)?,
                Vec::new(),
            );
        }
        Ok(dcd)
    }

    /// Use an already materialized density map (`dcd_map` schema).
    pub fn with_map_table(mut self, map: Table) -> Self {
        self.map = Lazy::loaded(map);
        self
    }

    /// Load the density map from a provider on first access.
    pub fn with_map_provider(mut self, provider: DcdMapProvider, slice: Vec<Condition>) -> Self {
        self.map = Lazy::empty();
        self.map_source = Some((provider, slice));
        self
    }

    /// Load the count map from a provider on first access.
    pub fn with_count_provider(mut self, provider: DcdMapCount, slice: Vec<Condition>) -> Self {
        self.count_map = Lazy::empty();
        self.count_source = Some((provider, slice));
        self
    }

    // === Views ===

    /// Grid metadata.
    pub fn metadata(&self) -> &GridMetadata {
        &self.metadata
    }

    /// Ground-truth table.
    pub fn glb_map(&self) -> &Table {
        &self.global
    }

    /// Position trace.
    pub fn positions(&self) -> &PositionTable {
        &self.positions
    }

    /// Density map, loaded on first access.
    pub fn map(&mut self) -> Result<&Table> {
        let source = &self.map_source;
        self.map.get_or_load(|| {
            let (provider, slice) = source
                .as_ref()
                .ok_or_else(|| DcdError::Config("density map is not set up".to_string()))?;
            log::info!("load map");
            provider.select_where(slice)
        })
    }

    /// Count provider.
    pub fn count_p(&self) -> Result<&DcdMapCount> {
        self.count_source
            .as_ref()
            .map(|(provider, _)| provider)
            .ok_or_else(|| DcdError::Config("count map is not set up".to_string()))
    }

    /// Count map, loaded on first access.
    pub fn count_map(&mut self) -> Result<&Table> {
        let source = &self.count_source;
        self.count_map.get_or_load(|| {
            let (provider, slice) = source
                .as_ref()
                .ok_or_else(|| DcdError::Config("count map is not set up".to_string()))?;
            log::info!("load count map");
            provider.select_where(slice)
        })
    }

    /// Whether the density map has been materialized.
    pub fn is_map_loaded(&self) -> bool {
        self.map.is_loaded()
    }

    /// Whether the count map has been materialized.
    pub fn is_count_map_loaded(&self) -> bool {
        self.count_map.is_loaded()
    }

    // === Positions and Index Values ===

    /// Position of a node, [`LOCATION_UNKNOWN`] when not recorded.
    ///
    /// With `as_cell` the position is quantized to its cell index.
    pub fn get_location(&self, simtime: f64, node_id: NodeId, as_cell: bool) -> WorldPoint {
        match self.positions.get(simtime, node_id) {
            Some(p) if as_cell => {
                let cell = self.metadata.cell_of(p);
                WorldPoint::new(cell.x as f64, cell.y as f64)
            }
            Some(p) => p,
            None => LOCATION_UNKNOWN,
        }
    }

    /// Sorted distinct node ids of the position trace.
    pub fn all_ids(&self, include_ground_truth: bool) -> Vec<NodeId> {
        let mut ids = self.positions.node_ids();
        if include_ground_truth {
            if ids.first() != Some(&GROUND_TRUTH_ID) {
                ids.insert(0, GROUND_TRUTH_ID);
                ids.sort_unstable();
            }
        } else {
            ids.retain(|id| *id != GROUND_TRUTH_ID);
        }
        ids
    }

    /// Sorted distinct times of the density and ground-truth maps inside `range`.
    pub fn valid_times(&mut self, range: TimeRange) -> Result<Vec<f64>> {
        let mut times = self.map()?.unique_key_values(DcdMapKey::SIMTIME)?;
        times.extend(self.global.unique_key_values("simtime")?);
        times.sort_by(f64::total_cmp);
        times.dedup();
        times.retain(|t| range.contains(*t));
        Ok(times)
    }

    /// Distinct values of a density-map level, optionally for one node only.
    pub fn unique_level_values(&mut self, level: &str, node_id: Option<NodeId>) -> Result<Vec<f64>> {
        let map = self.map()?;
        let pos = map.key_position(level)?;
        let id_pos = map.key_position(DcdMapKey::ID)?;

        let mut values: Vec<f64> = map
            .iter()
            .filter(|r| node_id.is_none_or(|id| r.key[id_pos] == id as f64))
            .map(|r| r.key[pos])
            .collect();
        values.sort_by(f64::total_cmp);
        values.dedup();
        Ok(values)
    }

    /// Per-row flag `column <= threshold` over the density map.
    pub fn age_mask(&mut self, column: &str, threshold: f64) -> Result<Vec<bool>> {
        Ok(self
            .map()?
            .column(column)?
            .into_iter()
            .map(|v| v <= threshold)
            .collect())
    }

    /// Density map split per node, for nodes `>= first_node_id`.
    pub fn iter_nodes(&mut self, first_node_id: NodeId) -> Result<Vec<(NodeId, Table)>> {
        let map = self.map()?;
        let id_pos = map.key_position(DcdMapKey::ID)?;

        let mut per_node: BTreeMap<NodeId, Vec<Row>> = BTreeMap::new();
        for row in map.iter().filter(|r| r.key[id_pos] >= first_node_id as f64) {
            per_node
                .entry(row.key[id_pos] as NodeId)
                .or_default()
                .push(row.clone());
        }

        Ok(per_node
            .into_iter()
            .map(|(id, rows)| {
                let table = Table::from_sorted(map.key_names().to_vec(), map.columns().to_vec(), rows);
                (id, table)
            })
            .collect())
    }

    // === Area and Point Views ===

    /// Dense `(y_dim, x_dim)` grid of `value_column` for one node and time.
    ///
    /// Cells without a record are 0.
    pub fn update_area(&self, time: f64, node_id: NodeId, value_column: &str) -> Result<DenseGrid> {
        let frame = self
            .count_p()?
            .select_simtime_and_node_id_exact(time, node_id, Operation::Eq)?;
        let value_idx = frame.column_index(value_column)?;
        let x_pos = frame.key_position(CountMapKey::X)?;
        let y_pos = frame.key_position(CountMapKey::Y)?;

        let sparse: BTreeMap<CellCoord, f64> = frame
            .iter()
            .map(|row| {
                let corner = WorldPoint::new(row.key[x_pos], row.key[y_pos]);
                (self.metadata.cell_of_corner(corner), row.values[value_idx])
            })
            .collect();

        let cells = self.metadata.fill_missing(&sparse, 0.0);
        DenseGrid::from_cells(self.metadata.x_dim(), self.metadata.y_dim(), cells)
    }

    /// Every density-map column of one cell, time and node.
    ///
    /// Never fails: without a record `count` is 0, `source` and every other
    /// column are `"n/a"` and `_node_id` is -1.
    pub fn info_dict(&mut self, cell: CellCoord, time: f64, node_id: NodeId) -> InfoDict {
        let mut info = InfoDict::new();
        for column in DcdMapSchema::COLUMNS {
            info.insert(column, InfoValue::not_available());
        }
        info.insert(DcdMapKey::COUNT, InfoValue::Int(0));
        info.insert("_node_id", InfoValue::Int(-1));
        info.insert("_cell_coord", InfoValue::Text(cell.to_string()));

        let corner = self.metadata.corner_of(cell);
        let map = match self.map() {
            Ok(map) => map,
            Err(e) => {
                log::warn!("info_dict: {e}");
                return info;
            }
        };

        let key = [node_id as f64, time, corner.x, corner.y];
        let Some(row) = map.get(&key) else {
            log::debug!("info_dict: no record for node {node_id} at {time} in cell {cell}");
            return info;
        };

        for (column, value) in map.columns().iter().zip(row.values.iter().copied()) {
            let entry = match column.as_str() {
                DcdMapKey::COUNT | DcdMapKey::SOURCE if value.is_finite() => {
                    InfoValue::Int(value as i64)
                }
                _ if value.is_nan() => InfoValue::not_available(),
                DcdMapKey::COUNT | DcdMapKey::SOURCE => InfoValue::not_available(),
                _ => InfoValue::Float(value),
            };
            info.insert(column, entry);
        }
        info.insert("_node_id", InfoValue::Int(node_id));
        info
    }

    /// Owner-location cells: `[ID, simtime] -> [x, y]` for every row
    /// flagged `own_cell == 1`.
    pub fn own_cell(&mut self) -> Result<Table> {
        let map = self.map()?;
        let own_idx = map.column_index(DcdMapKey::OWN_CELL)?;
        let id_pos = map.key_position(DcdMapKey::ID)?;
        let t_pos = map.key_position(DcdMapKey::SIMTIME)?;
        let x_pos = map.key_position(DcdMapKey::X)?;
        let y_pos = map.key_position(DcdMapKey::Y)?;

        let rows = map
            .iter()
            .filter(|r| r.values[own_idx] == 1.0)
            .map(|r| {
                Row::new(
                    CompositeKey::new(vec![r.key[id_pos], r.key[t_pos]]),
                    vec![r.key[x_pos], r.key[y_pos]],
                )
            })
            .collect();

        Table::from_rows(
            [DcdMapKey::ID, DcdMapKey::SIMTIME],
            [DcdMapKey::X, DcdMapKey::Y],
            rows,
        )
    }

    /// Trajectory of one node reconstructed from its own-cell flags.
    pub fn trajectory(&mut self, node_id: NodeId) -> Result<Vec<(f64, CellCoord)>> {
        let own = self.own_cell()?;
        Ok(own
            .iter()
            .filter(|r| r.key[0] == node_id as f64)
            .map(|r| {
                let corner = WorldPoint::new(r.values[0], r.values[1]);
                (r.key[1], self.metadata.cell_of_corner(corner))
            })
            .collect())
    }

    // === Summaries ===

    /// Summary of `count`, `delay`, `measurement_age` and `update_age`
    /// (where present) over the density map or the ground truth.
    pub fn describe_raw(&mut self, global_only: bool) -> Result<Vec<ColumnSummary>> {
        let data = if global_only {
            &self.global
        } else {
            self.map()?
        };

        [
            DcdMapKey::COUNT,
            DcdMapKey::DELAY,
            DcdMapKey::MEASUREMENT_AGE,
            DcdMapKey::UPDATE_AGE,
        ]
        .iter()
        .filter(|c| data.has_column(c))
        .map(|c| -> Result<ColumnSummary> {
            Ok(ColumnSummary::from_values(c, &data.column(c)?))
        })
        .collect()
    }

    /// Total count per time for every node and for the ground truth (id 0).
    pub fn count_over_time(&mut self) -> Result<BTreeMap<NodeId, Vec<(f64, f64)>>> {
        let mut series: BTreeMap<NodeId, BTreeMap<SimTime, f64>> = self
            .node_totals()?
            .into_iter()
            .fold(BTreeMap::new(), |mut acc, ((id, t), total)| {
                acc.entry(id).or_default().insert(t, total);
                acc
            });
        series.insert(GROUND_TRUTH_ID, self.global_totals()?);

        Ok(series
            .into_iter()
            .map(|(id, totals)| (id, totals.into_iter().map(|(t, v)| (t.seconds(), v)).collect()))
            .collect())
    }

    /// Mean and spread of per-node totals against the ground-truth total.
    pub fn count_diff(&mut self) -> Result<Vec<CountDiff>> {
        let mut per_time: BTreeMap<SimTime, Vec<f64>> = BTreeMap::new();
        for ((_, t), total) in self.node_totals()? {
            per_time.entry(t).or_default().push(total);
        }
        let actual = self.global_totals()?;
        for t in actual.keys() {
            per_time.entry(*t).or_default();
        }

        Ok(per_time
            .into_iter()
            .map(|(t, totals)| CountDiff {
                simtime: t.seconds(),
                mean: mean(&totals),
                std: sample_std(&totals),
                actual: actual.get(&t).copied().unwrap_or(0.0),
            })
            .collect())
    }

    /// Summed density-map count per `(node, time)`, ground truth excluded.
    fn node_totals(&mut self) -> Result<BTreeMap<(NodeId, SimTime), f64>> {
        let map = self.map()?;
        let id_pos = map.key_position(DcdMapKey::ID)?;
        let t_pos = map.key_position(DcdMapKey::SIMTIME)?;
        let count_idx = map.column_index(DcdMapKey::COUNT)?;

        let mut totals = BTreeMap::new();
        for row in map.iter().filter(|r| r.key[id_pos] > GROUND_TRUTH_ID as f64) {
            *totals
                .entry((row.key[id_pos] as NodeId, SimTime(row.key[t_pos])))
                .or_insert(0.0) += row.values[count_idx];
        }
        Ok(totals)
    }

    /// Summed ground-truth count per time.
    fn global_totals(&self) -> Result<BTreeMap<SimTime, f64>> {
        let t_pos = self.global.key_position("simtime")?;
        let count_idx = self.global.column_index("count")?;

        let mut totals = BTreeMap::new();
        for row in self.global.iter() {
            *totals.entry(SimTime(row.key[t_pos])).or_insert(0.0) += row.values[count_idx];
        }
        Ok(totals)
    }

    // === Error Analysis ===

    /// Count-map rows of all nodes (ground truth excluded) inside `range`.
    fn node_error_frame(&self, range: TimeRange) -> Result<Table> {
        let mut conditions = time_conditions(range)?;
        conditions.push(DcdMapCount::build_exact(
            CountMapKey::ID,
            (GROUND_TRUTH_ID + 1) as f64,
            Operation::Ge,
        )?);
        self.count_p()?.select_where(&conditions)
    }

    /// Per-cell aggregate of `value` over all nodes inside `range`.
    ///
    /// Returns `[x, y] -> [name]` with one row per distinct cell; `name`
    /// defaults to `value`.
    pub fn update_cell_error(
        &self,
        range: TimeRange,
        value: &str,
        agg: &Aggregation,
        name: Option<&str>,
    ) -> Result<Table> {
        let frame = self.node_error_frame(range)?;
        let groups = frame.group_by_levels(&[CountMapKey::X, CountMapKey::Y], value)?;
        let rows = groups
            .into_iter()
            .map(|(key, values)| Row::new(key, vec![agg.apply(&values)]))
            .collect();
        Ok(Table::from_sorted(
            vec![CountMapKey::X.to_string(), CountMapKey::Y.to_string()],
            vec![name.unwrap_or(value).to_string()],
            rows,
        ))
    }

    /// Per-time aggregate of `value` over all nodes and cells inside `range`.
    pub fn error_over_time(&self, range: TimeRange, value: &str, agg: &Aggregation) -> Result<Table> {
        let frame = self.node_error_frame(range)?;
        let groups = frame.group_by_levels(&[CountMapKey::SIMTIME], value)?;
        let rows = groups
            .into_iter()
            .map(|(key, values)| Row::new(key, vec![agg.apply(&values)]))
            .collect();
        Ok(Table::from_sorted(
            vec![CountMapKey::SIMTIME.to_string()],
            vec![value.to_string()],
            rows,
        ))
    }

    /// Histogram of the per-cell aggregated error.
    pub fn error_histogram(
        &self,
        range: TimeRange,
        value: &str,
        agg: &Aggregation,
        bins: usize,
    ) -> Result<Histogram> {
        let cells = self.update_cell_error(range, value, agg, None)?;
        Ok(Histogram::new(&cells.column(value)?, bins))
    }

    /// Per-cell error over the whole run (`"All"`) and per equal time slice.
    ///
    /// The last slice is open at the top so it contains the final time step.
    pub fn cell_error_by_time_quantile(
        &self,
        value: &str,
        agg: &Aggregation,
        quantiles: usize,
    ) -> Result<Vec<(String, Table)>> {
        let mut out = vec![(
            "All".to_string(),
            self.update_cell_error(TimeRange::all(), value, agg, Some("All"))?,
        )];

        let Some((tmin, tmax)) = self.count_p()?.time_interval()? else {
            return Ok(out);
        };
        let width = (tmax - tmin) / quantiles.max(1) as f64;
        for i in 0..quantiles {
            let start = tmin + width * i as f64;
            let range = if i + 1 == quantiles {
                TimeRange::from(start)
            } else {
                TimeRange::between(start, start + width)
            };
            let name = format!("Time Quantile {}", i + 1);
            let table = self.update_cell_error(range, value, agg, Some(&name))?;
            out.push((name, table));
        }
        Ok(out)
    }

    /// `value` over owner distance for one node at one time.
    ///
    /// With `bins_width > 0` cells are averaged in fixed-width distance bins.
    pub fn update_error_over_distance(
        &self,
        time: f64,
        node_id: NodeId,
        value: &str,
        bins_width: f64,
    ) -> Result<DistanceProfile> {
        let frame = self
            .count_p()?
            .select_simtime_and_node_id_exact(time, node_id, Operation::Eq)?;
        let dist_idx = frame.column_index(CountMapKey::OWNER_DIST)?;
        let value_idx = frame.column_index(value)?;

        let samples: Vec<(f64, f64)> = frame
            .iter()
            .map(|r| (r.values[dist_idx], r.values[value_idx]))
            .collect();
        Ok(DistanceProfile::from_samples(value, &samples, bins_width))
    }

    /// Delay column over owner distance at one time.
    ///
    /// With `bins_width > 0` all nodes are averaged per distance bin;
    /// otherwise only `node_id`'s cells are returned. `remove_null` drops
    /// cells with count 0.
    pub fn update_delay_over_distance(
        &mut self,
        time: f64,
        node_id: NodeId,
        delay_kind: &str,
        remove_null: bool,
        bins_width: f64,
    ) -> Result<DistanceProfile> {
        let map = self.map()?;
        let id_pos = map.key_position(DcdMapKey::ID)?;
        let t_pos = map.key_position(DcdMapKey::SIMTIME)?;
        let count_idx = map.column_index(DcdMapKey::COUNT)?;
        let dist_idx = map.column_index(DcdMapKey::OWNER_DIST)?;
        let value_idx = map.column_index(delay_kind)?;

        let samples: Vec<(f64, f64)> = map
            .iter()
            .filter(|r| r.key[t_pos] == time)
            .filter(|r| bins_width > 0.0 || r.key[id_pos] == node_id as f64)
            .filter(|r| !remove_null || r.values[count_idx] != 0.0)
            .map(|r| (r.values[dist_idx], r.values[value_idx]))
            .collect();
        Ok(DistanceProfile::from_samples(delay_kind, &samples, bins_width))
    }
}

/// Count-map conditions for a time window.
fn time_conditions(range: TimeRange) -> Result<Vec<Condition>> {
    let key = CountMapKey::SIMTIME;
    Ok(match (range.start, range.end) {
        (Some(start), Some(end)) => vec![DcdMapCount::build_range(key, start, end)?],
        (Some(start), None) => vec![DcdMapCount::build_exact(key, start, Operation::Ge)?],
        (None, Some(end)) => vec![DcdMapCount::build_exact(key, end, Operation::Lt)?],
        (None, None) => Vec::new(),
    })
}
