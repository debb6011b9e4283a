use crate::analyzers::types::CellAggregate;
use crate::analyzers::utility::{mean, min_max};
use crate::error::GridError;
use crate::grid::GridIndexer;
use crate::loader::Reading;
use std::collections::BTreeMap;
use tracing::debug;

/// Groups readings by grid cell and computes SOC statistics per cell.
///
/// Every reading is placed with `grid` at `resolution`. Readings from the
/// same asset are not deduplicated. The result is ordered by cell id.
///
/// # Errors
///
/// Propagates the grid's error for an unsupported resolution or coordinate.
pub fn aggregate_cells<G>(
    readings: &[Reading],
    resolution: u8,
    grid: &G,
) -> Result<Vec<CellAggregate>, GridError>
where
    G: GridIndexer + ?Sized,
{
    let mut cell_series: BTreeMap<String, Vec<f64>> = BTreeMap::new();

    for reading in readings {
        let cell_id = grid.index(reading.latitude, reading.longitude, resolution)?;
        cell_series.entry(cell_id).or_default().push(reading.soc);
    }

    let aggregates: Vec<CellAggregate> = cell_series
        .into_iter()
        .filter_map(|(cell_id, series)| {
            let (min_soc, max_soc) = min_max(&series)?;
            // Rounding in the sum can push the mean a hair outside its bounds.
            let avg_soc = mean(&series).clamp(min_soc, max_soc);

            Some(CellAggregate {
                cell_id,
                avg_soc,
                min_soc,
                max_soc,
                count: series.len() as u64,
            })
        })
        .collect();

    debug!(
        readings = readings.len(),
        cells = aggregates.len(),
        resolution,
        "Readings aggregated"
    );

    Ok(aggregates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::test_support::SquareGrid;

    fn reading(lat: f64, lon: f64, soc: f64, asset: &str) -> Reading {
        Reading {
            latitude: lat,
            longitude: lon,
            soc,
            timestamp: "2024-01-01T00:00:00Z".into(),
            asset_id: asset.into(),
        }
    }

    #[test]
    fn test_empty_input_yields_no_cells() {
        let cells = aggregate_cells(&[], 8, &SquareGrid).unwrap();
        assert!(cells.is_empty());
    }

    #[test]
    fn test_two_readings_one_cell() {
        let readings = vec![
            reading(1.0, 1.0, 90.0, "a1"),
            reading(1.00001, 1.00001, 70.0, "a2"),
        ];
        let cells = aggregate_cells(&readings, 2, &SquareGrid).unwrap();

        assert_eq!(
            cells,
            vec![CellAggregate {
                cell_id: "2:4:4".into(),
                avg_soc: 80.0,
                min_soc: 70.0,
                max_soc: 90.0,
                count: 2,
            }]
        );
    }

    #[test]
    fn test_readings_split_across_cells() {
        let readings = vec![
            reading(0.1, 0.1, 10.0, "a1"),
            reading(0.2, 0.2, 30.0, "a2"),
            reading(5.1, 5.1, 60.0, "a3"),
        ];
        let cells = aggregate_cells(&readings, 0, &SquareGrid).unwrap();

        assert_eq!(cells.len(), 2);
        let first = cells.iter().find(|c| c.cell_id == "0:0:0").unwrap();
        assert_eq!((first.avg_soc, first.count), (20.0, 2));
        let second = cells.iter().find(|c| c.cell_id == "0:5:5").unwrap();
        assert_eq!((second.avg_soc, second.count), (60.0, 1));
    }

    #[test]
    fn test_same_asset_counts_every_reading() {
        let readings = vec![
            reading(0.1, 0.1, 50.0, "a1"),
            reading(0.1, 0.1, 52.0, "a1"),
            reading(0.1, 0.1, 54.0, "a1"),
        ];
        let cells = aggregate_cells(&readings, 0, &SquareGrid).unwrap();
        assert_eq!(cells[0].count, 3);
    }

    #[test]
    fn test_counts_sum_to_readings_and_bounds_hold() {
        let readings: Vec<Reading> = (0..200)
            .map(|i| {
                let f = i as f64;
                reading(f * 0.013, f * 0.007, (f * 37.0) % 101.0, "a")
            })
            .collect();
        let cells = aggregate_cells(&readings, 4, &SquareGrid).unwrap();

        let total: u64 = cells.iter().map(|c| c.count).sum();
        assert_eq!(total, readings.len() as u64);
        for c in &cells {
            assert!(c.count >= 1);
            assert!(c.min_soc <= c.avg_soc && c.avg_soc <= c.max_soc, "{c:?}");
        }
    }

    #[test]
    fn test_mean_rounding_stays_within_bounds() {
        // 0.1 + 0.1 + 0.1 divided by 3 rounds above 0.1.
        let readings = vec![
            reading(0.5, 0.5, 0.1, "a1"),
            reading(0.5, 0.5, 0.1, "a2"),
            reading(0.5, 0.5, 0.1, "a3"),
        ];
        let cells = aggregate_cells(&readings, 0, &SquareGrid).unwrap();
        assert_eq!(cells[0].avg_soc, 0.1);
    }

    #[test]
    fn test_grid_error_propagates() {
        let readings = vec![reading(1.0, 1.0, 50.0, "a1")];
        let err = aggregate_cells(&readings, 16, &SquareGrid).unwrap_err();
        assert!(matches!(
            err,
            GridError::InvalidResolution { resolution: 16, .. }
        ));
    }

    #[test]
    fn test_deterministic() {
        let readings = vec![
            reading(3.3, 1.1, 40.0, "a1"),
            reading(0.2, 7.9, 80.0, "a2"),
            reading(3.3, 1.1, 20.0, "a3"),
        ];
        let a = aggregate_cells(&readings, 1, &SquareGrid).unwrap();
        let b = aggregate_cells(&readings, 1, &SquareGrid).unwrap();
        assert_eq!(a, b);
    }
}
