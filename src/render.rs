//! GeoJSON rendering of cell aggregates.
//!
//! Each aggregate becomes a polygon feature whose ring comes from the grid,
//! converted to `[longitude, latitude]` order and closed. Collections can be
//! serialized to a string or written to disk, optionally gzip-compressed.

use anyhow::Result;
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

use crate::analyzers::color::soc_color;
use crate::analyzers::types::CellAggregate;
use crate::error::GridError;
use crate::grid::GridIndexer;

/// A closed ring of `[longitude, latitude]` positions.
pub type Ring = Vec<[f64; 2]>;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "FeatureCollection")]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct Feature {
    pub geometry: Polygon,
    pub properties: CellProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "Polygon")]
pub struct Polygon {
    pub coordinates: Vec<Ring>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellProperties {
    pub h3_index: String,
    pub avg_soc: f64,
    pub min_soc: f64,
    pub max_soc: f64,
    pub count: u64,
    pub soc_color: &'static str,
}

/// Converts a grid boundary of `(lat, lon)` vertices into a closed GeoJSON ring.
pub fn closed_ring(boundary: &[(f64, f64)]) -> Ring {
    let mut ring: Ring = boundary.iter().map(|&(lat, lon)| [lon, lat]).collect();
    if let Some(&first) = ring.first() {
        ring.push(first);
    }
    ring
}

/// Builds the polygon feature for one aggregate.
pub fn render_feature<G>(cell: &CellAggregate, grid: &G) -> Result<Feature, GridError>
where
    G: GridIndexer + ?Sized,
{
    let boundary = grid.boundary(&cell.cell_id)?;

    Ok(Feature {
        geometry: Polygon {
            coordinates: vec![closed_ring(&boundary)],
        },
        properties: CellProperties {
            h3_index: cell.cell_id.clone(),
            avg_soc: cell.avg_soc,
            min_soc: cell.min_soc,
            max_soc: cell.max_soc,
            count: cell.count,
            soc_color: soc_color(cell.avg_soc),
        },
    })
}

/// Renders every aggregate into a feature collection, preserving order.
pub fn render_features<G>(cells: &[CellAggregate], grid: &G) -> Result<FeatureCollection, GridError>
where
    G: GridIndexer + ?Sized,
{
    let features = cells
        .iter()
        .map(|cell| render_feature(cell, grid))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(features = features.len(), "Features rendered");

    Ok(FeatureCollection { features })
}

/// Serializes a collection as JSON, pretty-printed when `pretty` is set.
pub fn to_json(collection: &FeatureCollection, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(collection)?
    } else {
        serde_json::to_string(collection)?
    };
    Ok(json)
}

/// Writes a collection to `path` as JSON, gzip-compressed when `gzip` is set.
///
/// Overwrites any existing file.
pub fn write_geojson(
    path: &Path,
    collection: &FeatureCollection,
    pretty: bool,
    gzip: bool,
) -> Result<()> {
    let json = to_json(collection, pretty)?;
    let mut file = BufWriter::new(File::create(path)?);

    if gzip {
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(json.as_bytes())?;
        encoder.finish()?.flush()?;
    } else {
        file.write_all(json.as_bytes())?;
        file.flush()?;
    }

    debug!(path = %path.display(), bytes = json.len(), gzip, "GeoJSON written");
    Ok(())
}
