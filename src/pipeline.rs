//! End-to-end run: load, aggregate, filter, render.
//!
//! A run owns everything it creates and shares nothing with other runs, so
//! concurrent callers need no coordination.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use crate::analyzers::aggregate::aggregate_cells;
use crate::analyzers::filter::RangeFilter;
use crate::error::PipelineError;
use crate::grid::GridIndexer;
use crate::loader::{LoadSummary, Reading, load_readings, read_readings};
use crate::render::{FeatureCollection, render_features};

pub const DEFAULT_RESOLUTION: u8 = 8;

/// Parameters for one map request.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct MapQuery {
    pub resolution: u8,
    pub min_soc: f64,
    pub max_soc: f64,
    pub min_assets: u64,
}

impl Default for MapQuery {
    fn default() -> Self {
        let filter = RangeFilter::default();
        Self {
            resolution: DEFAULT_RESOLUTION,
            min_soc: filter.min_soc,
            max_soc: filter.max_soc,
            min_assets: filter.min_assets,
        }
    }
}

impl MapQuery {
    pub fn filter(&self) -> RangeFilter {
        RangeFilter {
            min_soc: self.min_soc,
            max_soc: self.max_soc,
            min_assets: self.min_assets,
        }
    }
}

/// Runs the pipeline over the CSV file at `path`.
///
/// # Errors
///
/// Missing file, missing columns, malformed CSV, or a grid error. No partial
/// output is produced on error.
#[tracing::instrument(skip_all, fields(source = %path.display(), resolution = query.resolution))]
pub fn run_file<G>(
    path: &Path,
    query: &MapQuery,
    grid: &G,
) -> Result<FeatureCollection, PipelineError>
where
    G: GridIndexer + ?Sized,
{
    let (readings, summary) = load_readings(path)?;
    run_readings(&readings, summary, query, grid)
}

/// Runs the pipeline over an in-memory or streamed CSV source.
pub fn run_reader<R, G>(
    reader: R,
    query: &MapQuery,
    grid: &G,
) -> Result<FeatureCollection, PipelineError>
where
    R: Read,
    G: GridIndexer + ?Sized,
{
    let (readings, summary) = read_readings(reader)?;
    run_readings(&readings, summary, query, grid)
}

fn run_readings<G>(
    readings: &[Reading],
    summary: LoadSummary,
    query: &MapQuery,
    grid: &G,
) -> Result<FeatureCollection, PipelineError>
where
    G: GridIndexer + ?Sized,
{
    if summary.rows_dropped > 0 {
        debug!(rows_dropped = summary.rows_dropped, "Rows without coordinates or SOC skipped");
    }

    let cells = aggregate_cells(readings, query.resolution, grid)?;
    let total_cells = cells.len();

    let kept = query.filter().apply(cells);
    debug!(total_cells, kept_cells = kept.len(), "Cells filtered");

    let collection = render_features(&kept, grid)?;

    info!(
        readings = readings.len(),
        features = collection.features.len(),
        "Map layer built"
    );
    Ok(collection)
}
