//! Production accumulators. The in-memory test accumulator lives in
//! verdin-core next to the trait.

pub mod csv_writer;

pub use csv_writer::{CsvAccumulator, CsvWriteStats};
