//! # verdin-engine
//!
//! Streaming set-membership and cross-stream integrity engine for
//! biodiversity record archives. One pass over the archive, bounded memory:
//! evaluators spill candidate values to disk, externally sort them at
//! end-of-stream, and report duplicates and dangling references from a
//! merge-style scan over the sorted files.

pub mod accumulators;
pub mod driver;
pub mod evaluators;
pub mod index;
pub mod recorder;
pub mod sort;

pub use accumulators::{CsvAccumulator, CsvWriteStats};
pub use driver::{EvaluationDriver, RunStats};
pub use evaluators::referential::{ReferentialIntegrityEvaluator, REFERENTIAL_KEY};
pub use evaluators::registry::EvaluatorRegistry;
pub use evaluators::uniqueness::{UniquenessEvaluator, UNIQUENESS_KEY};
pub use index::ReferenceIndex;
pub use recorder::{SpillFile, ValueRecorder};
pub use sort::ExternalSorter;
