use crate::analyzers::types::CellAggregate;
use serde::{Deserialize, Serialize};

/// Inclusive bounds applied to already-computed cell aggregates.
///
/// `min_soc` and `max_soc` bound `avg_soc`; `min_assets` is a lower bound on
/// `count`. There is no upper bound on `count`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeFilter {
    pub min_soc: f64,
    pub max_soc: f64,
    pub min_assets: u64,
}

impl Default for RangeFilter {
    fn default() -> Self {
        Self {
            min_soc: 0.0,
            max_soc: 100.0,
            min_assets: 0,
        }
    }
}

impl RangeFilter {
    pub fn matches(&self, cell: &CellAggregate) -> bool {
        cell.avg_soc >= self.min_soc && cell.avg_soc <= self.max_soc && cell.count >= self.min_assets
    }

    /// Keeps the aggregates that match, untouched and in their original order.
    pub fn apply(&self, cells: Vec<CellAggregate>) -> Vec<CellAggregate> {
        cells.into_iter().filter(|c| self.matches(c)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(id: &str, avg: f64, count: u64) -> CellAggregate {
        CellAggregate {
            cell_id: id.into(),
            avg_soc: avg,
            min_soc: avg - 5.0,
            max_soc: avg + 5.0,
            count,
        }
    }

    #[test]
    fn test_default_bounds() {
        let f = RangeFilter::default();
        assert!(f.matches(&cell("a", 0.0, 1)));
        assert!(f.matches(&cell("b", 100.0, 1)));
        assert!(!f.matches(&cell("c", 100.5, 1)));
        assert!(!f.matches(&cell("d", -0.5, 1)));
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let f = RangeFilter {
            min_soc: 20.0,
            max_soc: 60.0,
            min_assets: 3,
        };
        assert!(f.matches(&cell("a", 20.0, 3)));
        assert!(f.matches(&cell("b", 60.0, 10)));
        assert!(!f.matches(&cell("c", 19.99, 3)));
        assert!(!f.matches(&cell("d", 40.0, 2)));
    }

    #[test]
    fn test_apply_is_subset_with_identical_values() {
        let cells = vec![cell("a", 10.0, 1), cell("b", 50.0, 4), cell("c", 90.0, 7)];
        let f = RangeFilter {
            min_soc: 40.0,
            max_soc: 100.0,
            min_assets: 2,
        };
        let kept = f.apply(cells.clone());

        assert_eq!(kept, vec![cells[1].clone(), cells[2].clone()]);
    }

    #[test]
    fn test_empty_result_is_fine() {
        let f = RangeFilter {
            min_soc: 90.0,
            max_soc: 10.0,
            min_assets: 0,
        };
        assert!(f.apply(vec![cell("a", 50.0, 1)]).is_empty());
        assert!(f.apply(Vec::new()).is_empty());
    }
}
