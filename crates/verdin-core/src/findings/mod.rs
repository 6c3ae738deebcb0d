//! Findings: the structured reports emitted by evaluators.

pub mod accumulator;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::row_type::{EvaluationContext, RowType};

pub use accumulator::{FindingAccumulator, InMemoryAccumulator};

/// How bad a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => f.write_str("ERROR"),
            Self::Warning => f.write_str("WARNING"),
        }
    }
}

/// What a finding is about. Closed set; content findings come from the two
/// integrity evaluators, `EvaluationFailure` carries terminal diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FindingKind {
    FieldUniqueness,
    FieldReferentialIntegrity,
    EvaluationFailure,
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FieldUniqueness => f.write_str("FIELD_UNIQUENESS"),
            Self::FieldReferentialIntegrity => f.write_str("FIELD_REFERENTIAL_INTEGRITY"),
            Self::EvaluationFailure => f.write_str("EVALUATION_FAILURE"),
        }
    }
}

/// A single validation violation, immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// The offending value, e.g. the duplicated or dangling identifier.
    pub value: String,
    /// Key of the evaluator that produced this finding.
    pub evaluator_key: String,
    pub context: EvaluationContext,
    /// Row-type restriction of the producing evaluator, when one was set.
    pub row_type: Option<RowType>,
    pub kind: FindingKind,
    pub severity: Severity,
    /// Rendered message, already formatted by the evaluator's catalog.
    pub message: String,
}

impl Finding {
    pub fn new(
        value: impl Into<String>,
        evaluator_key: impl Into<String>,
        context: EvaluationContext,
        row_type: Option<RowType>,
        kind: FindingKind,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            value: value.into(),
            evaluator_key: evaluator_key.into(),
            context,
            row_type,
            kind,
            severity,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_serializes_screaming_snake() {
        let json = serde_json::to_string(&FindingKind::FieldUniqueness).unwrap();
        assert_eq!(json, "\"FIELD_UNIQUENESS\"");
    }

    #[test]
    fn finding_round_trips_through_json() {
        let finding = Finding::new(
            "urn:lsid:x:1",
            "field_uniqueness",
            EvaluationContext::Core,
            Some(RowType::new("Taxon")),
            FindingKind::FieldUniqueness,
            Severity::Error,
            "urn:lsid:x:1 is not unique for taxonID",
        );
        let json = serde_json::to_string(&finding).unwrap();
        let back: Finding = serde_json::from_str(&json).unwrap();
        assert_eq!(back, finding);
    }
}
