//! Error types shared across Verdin crates.

pub mod error_code;
pub mod validation_error;

pub use error_code::ErrorCode;
pub use validation_error::{ValidationError, ValidationResult};
