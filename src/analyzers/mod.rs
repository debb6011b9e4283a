//! Cell aggregation, range filtering and SOC color bands.
//!
//! Readings are grouped by grid cell, each group is reduced to a
//! [`CellAggregate`](types::CellAggregate), and the aggregates are filtered
//! before rendering.

pub mod aggregate;
pub mod color;
pub mod filter;
pub mod types;
pub mod utility;
