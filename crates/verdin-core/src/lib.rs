//! # verdin-core
//!
//! Foundation crate for the Verdin archive validation engine.
//! Defines the record and term model, findings, accumulators, errors,
//! config, messages, and the evaluator dispatch traits.
//! The engine crate depends on this.

pub mod config;
pub mod errors;
pub mod findings;
pub mod logging;
pub mod messages;
pub mod traits;
pub mod types;

// Re-export the most commonly used types at the crate root.
pub use config::{RecorderConfig, ReferentialConfig, SortConfig, UniquenessConfig};
pub use errors::{ErrorCode, ValidationError, ValidationResult};
pub use findings::{Finding, FindingAccumulator, FindingKind, InMemoryAccumulator, Severity};
pub use messages::MessageCatalog;
pub use traits::{FinalizeStage, RecordEvaluator, Restriction, StatefulEvaluator};
pub use types::collections::{FxHashMap, FxHashSet};
pub use types::record::{MapRecord, Record, RecordSource, VecRecordSource};
pub use types::row_type::{EvaluationContext, RowType};
pub use types::term::Term;
