//! CLI tool for probing a DCD map snapshot.
//!
//! # Usage
//!
//! ```bash
//! # Times present in the density and ground-truth maps
//! dcd-inspect --store results/run.json times --from 10 --to 20
//!
//! # Everything known about one cell
//! dcd-inspect info --cell 2 2 --time 12 --node 3 --multi
//!
//! # Dense error grid of one node
//! dcd-inspect area --time 12 --node 3 --value err
//!
//! # Error over owner distance, binned by 2.5 m
//! dcd-inspect error-distance --time 12 --node 3 --bins-width 2.5
//!
//! # Mean absolute error per cell over the whole run
//! dcd-inspect cell-error --value err --aggregation mean
//!
//! # Delay over owner distance, empty cells kept
//! dcd-inspect delay-distance --time 12 --node 3 --delay update_age --keep-null
//!
//! # Histogram of the per-cell error
//! dcd-inspect histogram --bins 20
//!
//! # Per-cell error split into equal time slices
//! dcd-inspect quantiles --quantiles 4
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use dcd_map::config::DcdConfig;
use dcd_map::{CellCoord, DcdMap2D, DcdMap2DMulti, TimeRange, load_store};

#[derive(Parser)]
#[command(name = "dcd-inspect", about = "Inspect a DCD map snapshot")]
struct Cli {
    /// YAML config (defaults to configs/config.yaml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Snapshot path, overrides the config
    #[arg(short, long)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List valid simulation times
    Times {
        /// Lower bound, -1 for none
        #[arg(long, default_value_t = -1.0, allow_negative_numbers = true)]
        from: f64,
        /// Upper bound (exclusive), -1 for none
        #[arg(long, default_value_t = -1.0, allow_negative_numbers = true)]
        to: f64,
    },
    /// Print every column of one cell
    Info {
        /// Cell index (x y)
        #[arg(long, num_args = 2, required = true, value_names = ["X", "Y"])]
        cell: Vec<i32>,
        /// Simulation time
        #[arg(long, allow_negative_numbers = true)]
        time: f64,
        /// Node id
        #[arg(long)]
        node: i64,
        /// Include per-source readings
        #[arg(long)]
        multi: bool,
    },
    /// Print the dense area grid of one node
    Area {
        /// Simulation time
        #[arg(long)]
        time: f64,
        /// Node id
        #[arg(long)]
        node: i64,
        /// Count-map column
        #[arg(long)]
        value: Option<String>,
    },
    /// Print a value over owner distance
    ErrorDistance {
        /// Simulation time
        #[arg(long)]
        time: f64,
        /// Node id
        #[arg(long)]
        node: i64,
        /// Count-map column
        #[arg(long)]
        value: Option<String>,
        /// Bin width, 0 disables binning
        #[arg(long)]
        bins_width: Option<f64>,
    },
    /// Print the per-cell aggregated error
    CellError {
        /// Lower bound, -1 for none
        #[arg(long, default_value_t = -1.0, allow_negative_numbers = true)]
        from: f64,
        /// Upper bound (exclusive), -1 for none
        #[arg(long, default_value_t = -1.0, allow_negative_numbers = true)]
        to: f64,
        /// Count-map column
        #[arg(long)]
        value: Option<String>,
        /// Aggregation name
        #[arg(long)]
        aggregation: Option<String>,
    },
    /// Print a delay column over owner distance
    DelayDistance {
        /// Simulation time
        #[arg(long)]
        time: f64,
        /// Node id
        #[arg(long)]
        node: i64,
        /// Density-map delay column
        #[arg(long, default_value = "delay")]
        delay: String,
        /// Keep cells with count 0
        #[arg(long)]
        keep_null: bool,
        /// Bin width, 0 disables binning
        #[arg(long)]
        bins_width: Option<f64>,
    },
    /// Print a histogram of the per-cell aggregated error
    Histogram {
        /// Lower bound, -1 for none
        #[arg(long, default_value_t = -1.0, allow_negative_numbers = true)]
        from: f64,
        /// Upper bound (exclusive), -1 for none
        #[arg(long, default_value_t = -1.0, allow_negative_numbers = true)]
        to: f64,
        /// Count-map column
        #[arg(long)]
        value: Option<String>,
        /// Aggregation name
        #[arg(long)]
        aggregation: Option<String>,
        /// Number of bins
        #[arg(long)]
        bins: Option<usize>,
    },
    /// Print the per-cell error for the whole run and each time slice
    Quantiles {
        /// Count-map column
        #[arg(long)]
        value: Option<String>,
        /// Aggregation name
        #[arg(long)]
        aggregation: Option<String>,
        /// Number of time slices
        #[arg(long)]
        quantiles: Option<usize>,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &cli.config {
        Some(path) => DcdConfig::load(path)?,
        None => DcdConfig::load_default()?,
    };
    let store_path = cli.store.clone().unwrap_or_else(|| config.store.path());
    let store = load_store(&store_path)?;
    let metadata = config.grid.to_grid_metadata()?;
    let analysis = &config.analysis;

    match cli.command {
        Command::Times { from, to } => {
            let mut dcd = DcdMap2D::from_store(metadata, &store, &config.store.groups)?;
            for t in dcd.valid_times(TimeRange::from_sentinels(from, to))? {
                println!("{t}");
            }
        }
        Command::Info {
            cell,
            time,
            node,
            multi,
        } => {
            let cell = CellCoord::new(cell[0], cell[1]);
            let info = if multi {
                DcdMap2DMulti::from_store(metadata, &store, &config.store.groups)?
                    .info_dict(cell, time, node)
            } else {
                DcdMap2D::from_store(metadata, &store, &config.store.groups)?
                    .info_dict(cell, time, node)
            };
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        Command::Area { time, node, value } => {
            let dcd = DcdMap2D::from_store(metadata, &store, &config.store.groups)?;
            let value = value.as_deref().unwrap_or(&analysis.value_column);
            let area = dcd.update_area(time, node, value)?;
            let (y_dim, _) = area.shape();
            // top row first
            for y in (0..y_dim).rev() {
                if let Some(row) = area.row(y) {
                    let line: Vec<String> = row.iter().map(|v| format!("{v:6.2}")).collect();
                    println!("{}", line.join(" "));
                }
            }
        }
        Command::ErrorDistance {
            time,
            node,
            value,
            bins_width,
        } => {
            let dcd = DcdMap2D::from_store(metadata, &store, &config.store.groups)?;
            let value = value.as_deref().unwrap_or(&analysis.value_column);
            let profile = dcd.update_error_over_distance(
                time,
                node,
                value,
                bins_width.unwrap_or(analysis.bins_width),
            )?;
            println!("{}", serde_json::to_string_pretty(&profile)?);
        }
        Command::CellError {
            from,
            to,
            value,
            aggregation,
        } => {
            let dcd = DcdMap2D::from_store(metadata, &store, &config.store.groups)?;
            let value = value.as_deref().unwrap_or(&analysis.value_column);
            let agg = analysis.aggregation_or(aggregation.as_deref())?;
            let cells =
                dcd.update_cell_error(TimeRange::from_sentinels(from, to), value, &agg, None)?;
            println!("x,y,{value}");
            for row in &cells {
                println!("{},{},{}", row.key[0], row.key[1], row.values[0]);
            }
        }
        Command::DelayDistance {
            time,
            node,
            delay,
            keep_null,
            bins_width,
        } => {
            let mut dcd = DcdMap2D::from_store(metadata, &store, &config.store.groups)?;
            let profile = dcd.update_delay_over_distance(
                time,
                node,
                &delay,
                analysis.remove_null && !keep_null,
                bins_width.unwrap_or(analysis.bins_width),
            )?;
            println!("{}", serde_json::to_string_pretty(&profile)?);
        }
        Command::Histogram {
            from,
            to,
            value,
            aggregation,
            bins,
        } => {
            let dcd = DcdMap2D::from_store(metadata, &store, &config.store.groups)?;
            let value = value.as_deref().unwrap_or(&analysis.value_column);
            let agg = analysis.aggregation_or(aggregation.as_deref())?;
            let hist = dcd.error_histogram(
                TimeRange::from_sentinels(from, to),
                value,
                &agg,
                bins.unwrap_or(analysis.histogram_bins),
            )?;
            println!("lo,hi,count");
            for (edge, count) in hist.edges.windows(2).zip(&hist.counts) {
                println!("{},{},{}", edge[0], edge[1], count);
            }
        }
        Command::Quantiles {
            value,
            aggregation,
            quantiles,
        } => {
            let dcd = DcdMap2D::from_store(metadata, &store, &config.store.groups)?;
            let value = value.as_deref().unwrap_or(&analysis.value_column);
            let agg = analysis.aggregation_or(aggregation.as_deref())?;
            let parts = dcd.cell_error_by_time_quantile(
                value,
                &agg,
                quantiles.unwrap_or(analysis.time_quantiles),
            )?;
            println!("slice,x,y,{value}");
            for (name, cells) in &parts {
                for row in cells {
                    println!("{name},{},{},{}", row.key[0], row.key[1], row.values[0]);
                }
            }
        }
    }
    Ok(())
}
