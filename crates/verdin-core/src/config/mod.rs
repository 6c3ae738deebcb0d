//! Configuration records for the engine.
//!
//! Plain serde records with required-field validation at construction;
//! optional knobs default through `effective_*()` accessors.

pub mod engine_config;
pub mod evaluator_config;

pub use engine_config::{RecorderConfig, SortConfig};
pub use evaluator_config::{ReferentialConfig, UniquenessConfig};
