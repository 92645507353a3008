//! Domain types: bars and the keyed rows each pipeline stage produces.

pub mod bar;
pub mod rows;

pub use bar::{row_id, Bar};
pub use rows::{round_to, DecisionRow, IndicatorRow, Row, SignalRow, Table};
