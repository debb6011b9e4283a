//! Hexagonal grid capability consumed by the aggregator and renderer.
//!
//! [`GridIndexer`] is the seam: the pipeline only ever asks for a cell id at a
//! resolution and for a cell's boundary. [`H3Grid`] implements it on top of
//! `h3o`; tests substitute their own grids.

use h3o::{CellIndex, LatLng, Resolution};

use crate::error::GridError;

/// Maps coordinates to cells and cells to their boundary rings.
pub trait GridIndexer {
    /// Returns the id of the cell containing `(lat, lon)` at `resolution`.
    fn index(&self, lat: f64, lon: f64, resolution: u8) -> Result<String, GridError>;

    /// Returns the cell's boundary vertices as `(lat, lon)` pairs.
    ///
    /// The ring is ordered but not closed: the first vertex is not repeated.
    fn boundary(&self, cell_id: &str) -> Result<Vec<(f64, f64)>, GridError>;
}

/// H3 grid backed by the `h3o` crate. Resolutions 0 through 15.
#[derive(Debug, Default, Clone, Copy)]
pub struct H3Grid;

impl GridIndexer for H3Grid {
    fn index(&self, lat: f64, lon: f64, resolution: u8) -> Result<String, GridError> {
        let res = Resolution::try_from(resolution).map_err(|e| GridError::InvalidResolution {
            resolution,
            reason: e.to_string(),
        })?;
        let latlng = LatLng::new(lat, lon).map_err(|e| GridError::InvalidCoordinate {
            lat,
            lon,
            reason: e.to_string(),
        })?;

        Ok(latlng.to_cell(res).to_string())
    }

    fn boundary(&self, cell_id: &str) -> Result<Vec<(f64, f64)>, GridError> {
        let cell = cell_id
            .parse::<CellIndex>()
            .map_err(|e| GridError::InvalidCell {
                cell_id: cell_id.to_string(),
                reason: e.to_string(),
            })?;

        Ok(cell
            .boundary()
            .iter()
            .map(|vertex| (vertex.lat(), vertex.lng()))
            .collect())
    }
}
