//! Configuration records for the two stateful evaluators.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::{ValidationError, ValidationResult};
use crate::types::row_type::{EvaluationContext, RowType};
use crate::types::term::Term;

use super::engine_config::{RecorderConfig, SortConfig};

/// Configuration of a uniqueness evaluator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UniquenessConfig {
    /// Which stream the evaluator watches.
    pub context: EvaluationContext,
    /// Optional row-type restriction, compared case-insensitively.
    pub row_type: Option<RowType>,
    /// Term whose values must be unique. When absent, the record's primary
    /// identifier is checked instead.
    pub term: Option<Term>,
    /// Directory for the spill file and the sorted index.
    pub working_dir: PathBuf,
    /// Compare adjacent sorted values ignoring ASCII case. Default: true.
    pub case_insensitive: Option<bool>,
    /// Values containing this substring are rejected at intake. Set this to
    /// the multi-value separator of a downstream referential evaluator.
    pub forbidden_separator: Option<String>,
    #[serde(default)]
    pub sort: SortConfig,
    #[serde(default)]
    pub recorder: RecorderConfig,
}

impl UniquenessConfig {
    /// Minimal configuration over the primary identifier.
    pub fn on_id(context: EvaluationContext, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            context,
            row_type: None,
            term: None,
            working_dir: working_dir.into(),
            case_insensitive: None,
            forbidden_separator: None,
            sort: SortConfig::default(),
            recorder: RecorderConfig::default(),
        }
    }

    /// Minimal configuration over a term.
    pub fn on_term(
        context: EvaluationContext,
        term: Term,
        working_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            term: Some(term),
            ..Self::on_id(context, working_dir)
        }
    }

    pub fn effective_case_insensitive(&self) -> bool {
        self.case_insensitive.unwrap_or(true)
    }

    /// Name of the checked field, for messages and finding rows.
    pub fn checked_field(&self) -> &str {
        self.term.as_ref().map_or("id", Term::simple_name)
    }

    pub fn validate(&self) -> ValidationResult<()> {
        if self.working_dir.as_os_str().is_empty() {
            return Err(ValidationError::InvalidConfig {
                message: "working_dir must not be empty".to_string(),
            });
        }
        if matches!(self.forbidden_separator.as_deref(), Some("")) {
            return Err(ValidationError::InvalidConfig {
                message: "forbidden_separator must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Configuration of a referential-integrity evaluator. The binding to the
/// target uniqueness evaluator is passed separately as a shared index handle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferentialConfig {
    /// Term whose values must resolve in the target.
    pub source_term: Term,
    pub context: EvaluationContext,
    pub row_type: RowType,
    /// When set and present in a value, the value is split into tokens on
    /// this separator and each token is checked independently.
    pub multi_value_separator: Option<String>,
    /// Directory for the spill file and its sorted variant.
    pub working_dir: PathBuf,
    #[serde(default)]
    pub sort: SortConfig,
    #[serde(default)]
    pub recorder: RecorderConfig,
}

impl ReferentialConfig {
    pub fn new(
        source_term: Term,
        context: EvaluationContext,
        row_type: RowType,
        working_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source_term,
            context,
            row_type,
            multi_value_separator: None,
            working_dir: working_dir.into(),
            sort: SortConfig::default(),
            recorder: RecorderConfig::default(),
        }
    }

    /// Builder-style separator assignment.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.multi_value_separator = Some(separator.into());
        self
    }

    pub fn validate(&self) -> ValidationResult<()> {
        if self.working_dir.as_os_str().is_empty() {
            return Err(ValidationError::InvalidConfig {
                message: "working_dir must not be empty".to_string(),
            });
        }
        if matches!(self.multi_value_separator.as_deref(), Some("")) {
            return Err(ValidationError::InvalidConfig {
                message: "multi_value_separator must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
