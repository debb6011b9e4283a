//! CSV loader for SOC readings.
//!
//! Checks the header for the required columns, then keeps every row whose
//! latitude, longitude and SOC parse as numbers. Other rows are dropped
//! silently; only the totals in [`LoadSummary`] record them.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Serialize;
use tracing::debug;

use crate::error::PipelineError;

/// Columns every source must carry, by header name.
pub const REQUIRED_COLUMNS: [&str; 5] = ["latitude", "longitude", "soc", "timestamp", "asset_id"];

/// One reading that survived validation.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub latitude: f64,
    pub longitude: f64,
    pub soc: f64,
    pub timestamp: String,
    pub asset_id: String,
}

/// Row counts for a single load.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub rows_read: usize,
    pub rows_dropped: usize,
}

impl LoadSummary {
    pub fn rows_kept(&self) -> usize {
        self.rows_read - self.rows_dropped
    }
}

/// Header positions of the required columns.
#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    latitude: usize,
    longitude: usize,
    soc: usize,
    timestamp: usize,
    asset_id: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &StringRecord) -> Result<Self, PipelineError> {
        let position = |name: &str| headers.iter().position(|h| h == name);

        match (
            position("latitude"),
            position("longitude"),
            position("soc"),
            position("timestamp"),
            position("asset_id"),
        ) {
            (Some(latitude), Some(longitude), Some(soc), Some(timestamp), Some(asset_id)) => {
                Ok(Self {
                    latitude,
                    longitude,
                    soc,
                    timestamp,
                    asset_id,
                })
            }
            _ => Err(PipelineError::MissingColumns(
                REQUIRED_COLUMNS
                    .into_iter()
                    .filter(|&name| position(name).is_none())
                    .map(String::from)
                    .collect(),
            )),
        }
    }

    fn reading(&self, record: &StringRecord) -> Option<Reading> {
        Some(Reading {
            latitude: parse_number(record.get(self.latitude))?,
            longitude: parse_number(record.get(self.longitude))?,
            soc: parse_number(record.get(self.soc))?,
            timestamp: record.get(self.timestamp).unwrap_or_default().to_string(),
            asset_id: record.get(self.asset_id).unwrap_or_default().to_string(),
        })
    }
}

/// Empty, unparseable and `NaN` values all count as null.
fn parse_number(field: Option<&str>) -> Option<f64> {
    field?.parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Loads readings from the CSV file at `path`.
///
/// # Errors
///
/// [`PipelineError::SourceNotFound`] if the file does not exist,
/// [`PipelineError::MissingColumns`] if the header lacks a required column.
pub fn load_readings(path: &Path) -> Result<(Vec<Reading>, LoadSummary), PipelineError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => PipelineError::SourceNotFound(path.to_path_buf()),
        _ => PipelineError::Io(e),
    })?;
    read_readings(file)
}

/// Reads readings from any CSV source with a header row.
pub fn read_readings<R: Read>(reader: R) -> Result<(Vec<Reading>, LoadSummary), PipelineError> {
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let columns = ColumnIndex::from_headers(rdr.headers()?)?;

    let mut readings = Vec::new();
    let mut summary = LoadSummary::default();

    for result in rdr.records() {
        let record = result?;
        summary.rows_read += 1;

        match columns.reading(&record) {
            Some(reading) => readings.push(reading),
            None => summary.rows_dropped += 1,
        }
    }

    debug!(
        rows_read = summary.rows_read,
        rows_dropped = summary.rows_dropped,
        "Readings loaded"
    );

    Ok((readings, summary))
}
