//! Data types produced by the aggregation stage.

use serde::Serialize;

/// Summary statistics for every reading that fell into one grid cell.
///
/// `min_soc <= avg_soc <= max_soc` and `count >= 1` always hold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellAggregate {
    pub cell_id: String,
    pub avg_soc: f64,
    pub min_soc: f64,
    pub max_soc: f64,
    pub count: u64,
}
